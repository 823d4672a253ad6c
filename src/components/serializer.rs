//! Persistence of pending notifications across process restarts
//!
//! The on-disk layout is little-endian:
//!
//! ```text
//! [version:u8][count:i32][count x record]
//! record = [hasId:bool][id:i32?][title][body][subtitle][group][data (v>=1)]
//!          [hasBadge:bool][badge:i32?][deliveryTimeTicks:i64]
//! ```
//!
//! Strings carry a 7-bit variable-length byte count followed by UTF-8 bytes.
//! Delivery times are 100ns ticks since 0001-01-01T00:00:00 local time, with
//! zero standing for "no delivery time".

use std::fs;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, NaiveDateTime};

use super::{NotificationId, NotificationPlatform, NotificationRecord, NotificationResult, PendingNotification};

/// Version written by this crate
pub const FORMAT_VERSION: u8 = 1;

/// First version that stores the `data` payload
const DATA_FIELD_VERSION: u8 = 1;

const TICKS_PER_SECOND: i64 = 10_000_000;
const NANOS_PER_TICK: i64 = 100;
/// Ticks between 0001-01-01 and 1970-01-01
const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;

/// Longest variable-length prefix for a 32-bit length
const MAX_LENGTH_PREFIX_BYTES: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported format version {found} (newest known is {supported})")]
    UnsupportedVersion { found: u8, supported: u8 },
    #[error("invalid length: {0}")]
    InvalidLength(String),
    #[error("string is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("delivery time out of range: {0}")]
    InvalidTicks(String),
}

/// Saves and restores the pending set for a queue manager
pub trait PendingNotificationsSerializer: Send {
    /// Save the given notifications, replacing anything saved before
    fn serialize(&self, notifications: &[&PendingNotification]) -> NotificationResult<()>;

    /// Restore saved notifications, `None` when nothing was ever saved
    ///
    /// Records are created through the platform so platform defaults are initialized.
    fn deserialize(
        &self,
        platform: &dyn NotificationPlatform,
    ) -> NotificationResult<Option<Vec<NotificationRecord>>>;
}

/// Default file-backed serializer
#[derive(Debug, Clone)]
pub struct BinarySerializer {
    path: PathBuf,
}

impl BinarySerializer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PendingNotificationsSerializer for BinarySerializer {
    fn serialize(&self, notifications: &[&PendingNotification]) -> NotificationResult<()> {
        let mut buffer = Vec::new();
        write_records(&mut buffer, notifications.iter().map(|p| &p.notification))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(SerializerError::from)?;
        }
        fs::write(&self.path, &buffer).map_err(SerializerError::from)?;

        tracing::debug!(
            path = %self.path.display(),
            count = notifications.len(),
            "Saved pending notifications"
        );
        Ok(())
    }

    fn deserialize(
        &self,
        platform: &dyn NotificationPlatform,
    ) -> NotificationResult<Option<Vec<NotificationRecord>>> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SerializerError::from(e).into()),
        };

        let records = read_records(BufReader::new(file), || platform.create_notification())?;
        tracing::debug!(
            path = %self.path.display(),
            count = records.len(),
            "Loaded pending notifications"
        );
        Ok(Some(records))
    }
}

/// Write records in the current format version
pub fn write_records<'a, W, I>(writer: W, records: I) -> Result<(), SerializerError>
where
    W: Write,
    I: IntoIterator<Item = &'a NotificationRecord>,
    I::IntoIter: ExactSizeIterator,
{
    write_records_with_version(writer, FORMAT_VERSION, records)
}

fn write_records_with_version<'a, W, I>(
    mut writer: W,
    version: u8,
    records: I,
) -> Result<(), SerializerError>
where
    W: Write,
    I: IntoIterator<Item = &'a NotificationRecord>,
    I::IntoIter: ExactSizeIterator,
{
    let records = records.into_iter();
    let count = i32::try_from(records.len())
        .map_err(|_| SerializerError::InvalidLength(format!("{} records", records.len())))?;

    writer.write_u8(version)?;
    writer.write_i32::<LittleEndian>(count)?;

    for record in records {
        writer.write_u8(u8::from(record.id.is_some()))?;
        if let Some(id) = record.id {
            writer.write_i32::<LittleEndian>(id.get())?;
        }
        write_string(&mut writer, &record.title)?;
        write_string(&mut writer, &record.body)?;
        write_string(&mut writer, &record.subtitle)?;
        write_string(&mut writer, &record.group)?;
        if version >= DATA_FIELD_VERSION {
            write_string(&mut writer, &record.data)?;
        }
        writer.write_u8(u8::from(record.badge_number.is_some()))?;
        if let Some(badge) = record.badge_number {
            writer.write_i32::<LittleEndian>(badge)?;
        }
        let ticks = match record.delivery_time {
            Some(time) => to_ticks(time)?,
            None => 0,
        };
        writer.write_i64::<LittleEndian>(ticks)?;
    }

    writer.flush()?;
    Ok(())
}

/// Read records written by any version up to [`FORMAT_VERSION`]
///
/// `create` supplies the blank record each entry is read into.
pub fn read_records<R, F>(mut reader: R, mut create: F) -> Result<Vec<NotificationRecord>, SerializerError>
where
    R: Read,
    F: FnMut() -> NotificationRecord,
{
    let version = reader.read_u8()?;
    if version > FORMAT_VERSION {
        return Err(SerializerError::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    let count = reader.read_i32::<LittleEndian>()?;
    let count = usize::try_from(count)
        .map_err(|_| SerializerError::InvalidLength(format!("record count {}", count)))?;

    // The count is untrusted, so only reserve a bounded amount up front
    let mut records = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        let mut record = create();
        record.scheduled = false;

        record.id = if reader.read_u8()? != 0 {
            Some(NotificationId::new(reader.read_i32::<LittleEndian>()?))
        } else {
            None
        };
        record.title = read_string(&mut reader)?;
        record.body = read_string(&mut reader)?;
        record.subtitle = read_string(&mut reader)?;
        record.group = read_string(&mut reader)?;
        if version >= DATA_FIELD_VERSION {
            record.data = read_string(&mut reader)?;
        }
        record.badge_number = if reader.read_u8()? != 0 {
            Some(reader.read_i32::<LittleEndian>()?)
        } else {
            None
        };
        record.delivery_time = from_ticks(reader.read_i64::<LittleEndian>()?)?;

        records.push(record);
    }

    Ok(records)
}

fn to_ticks(time: NaiveDateTime) -> Result<i64, SerializerError> {
    let utc = time.and_utc();
    utc.timestamp()
        .checked_mul(TICKS_PER_SECOND)
        .and_then(|ticks| ticks.checked_add(i64::from(utc.timestamp_subsec_nanos()) / NANOS_PER_TICK))
        .and_then(|ticks| ticks.checked_add(TICKS_AT_UNIX_EPOCH))
        .filter(|ticks| *ticks > 0)
        .ok_or_else(|| SerializerError::InvalidTicks(time.to_string()))
}

fn from_ticks(ticks: i64) -> Result<Option<NaiveDateTime>, SerializerError> {
    if ticks == 0 {
        return Ok(None);
    }
    if ticks < 0 {
        return Err(SerializerError::InvalidTicks(ticks.to_string()));
    }

    let since_epoch = ticks - TICKS_AT_UNIX_EPOCH;
    let seconds = since_epoch.div_euclid(TICKS_PER_SECOND);
    let nanos = (since_epoch.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK) as u32;

    DateTime::from_timestamp(seconds, nanos)
        .map(|time| Some(time.naive_utc()))
        .ok_or_else(|| SerializerError::InvalidTicks(ticks.to_string()))
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<(), SerializerError> {
    let bytes = value.as_bytes();
    let mut length = u32::try_from(bytes.len())
        .ok()
        .filter(|len| *len <= i32::MAX as u32)
        .ok_or_else(|| SerializerError::InvalidLength(format!("string of {} bytes", bytes.len())))?;

    while length >= 0x80 {
        writer.write_u8((length as u8) | 0x80)?;
        length >>= 7;
    }
    writer.write_u8(length as u8)?;
    writer.write_all(bytes)?;
    Ok(())
}

fn read_string<R: Read>(reader: &mut R) -> Result<String, SerializerError> {
    let mut length: u32 = 0;
    let mut shift = 0;
    loop {
        if shift >= 7 * MAX_LENGTH_PREFIX_BYTES {
            return Err(SerializerError::InvalidLength(
                "string length prefix too long".to_string(),
            ));
        }
        let byte = reader.read_u8()?;
        length |= u32::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            break;
        }
    }
    if length > i32::MAX as u32 {
        return Err(SerializerError::InvalidLength(format!("string of {} bytes", length)));
    }

    let mut bytes = Vec::new();
    reader.take(u64::from(length)).read_to_end(&mut bytes)?;
    if bytes.len() != length as usize {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated string").into());
    }
    Ok(String::from_utf8(bytes)?)
}
