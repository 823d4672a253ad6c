use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// How the queue manager hands notifications to the platform
    ///
    /// Serialized in text formats as flag names joined with `|`,
    /// e.g. `"QUEUE | CLEAR_ON_FOREGROUNDING"`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OperatingMode: u8 {
        /// Hold notifications in memory until the application is backgrounded
        const QUEUE = 0b0001;
        /// Cancel every scheduled notification at the OS when foregrounding
        const CLEAR_ON_FOREGROUNDING = 0b0010;
        /// After clearing, re-arm pending notifications flagged for rescheduling
        const RESCHEDULE_AFTER_CLEARING = 0b0100;

        const QUEUE_AND_CLEAR = Self::QUEUE.bits() | Self::CLEAR_ON_FOREGROUNDING.bits();
        const QUEUE_CLEAR_AND_RESCHEDULE = Self::QUEUE.bits()
            | Self::CLEAR_ON_FOREGROUNDING.bits()
            | Self::RESCHEDULE_AFTER_CLEARING.bits();
    }
}

impl OperatingMode {
    /// Schedule immediately, no buffering
    pub const NO_QUEUE: Self = Self::empty();

    pub fn queues(&self) -> bool {
        self.contains(Self::QUEUE)
    }

    pub fn clears_on_foregrounding(&self) -> bool {
        self.contains(Self::CLEAR_ON_FOREGROUNDING)
    }

    /// Rescheduling only has an effect together with clearing
    pub fn reschedules_after_clearing(&self) -> bool {
        self.contains(Self::CLEAR_ON_FOREGROUNDING | Self::RESCHEDULE_AFTER_CLEARING)
    }

    /// Parse the `A | B` text form, also accepting composite names
    pub fn parse(text: &str) -> Option<Self> {
        bitflags::parser::from_str::<Self>(text).ok()
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail
        let _ = bitflags::parser::to_writer(self, &mut text);
        text
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::QUEUE_CLEAR_AND_RESCHEDULE
    }
}
