// Platform backends
// Native Android/iOS bridges live in the host engine and implement `NotificationPlatform`;
// the simulated backend stands in for them in headless builds, tools and tests

pub mod simulated;

pub use simulated::{PermissionAnswer, SimulatedPlatform};

use crate::components::platform::{NotificationPlatform, Platform};

/// Factory for creating platform backends
pub struct PlatformBackendFactory;

impl PlatformBackendFactory {
    /// Create a backend for the specified platform
    pub fn create_backend(platform: Platform) -> Box<dyn NotificationPlatform> {
        Box::new(SimulatedPlatform::new(platform))
    }

    /// Create a backend for the platform of the current build target
    pub fn create_for_current_target() -> Box<dyn NotificationPlatform> {
        Self::create_backend(Platform::current())
    }
}
