use crate::{
    domain::{StatusRecord, StatusTag},
    Result,
};

/// Hexagonal port for the single persisted status record.
///
/// The dispatcher only talks to this trait; the file-backed implementation
/// lives in [`crate::store`].
pub trait StatusStore: Send + Sync {
    /// Write the default record if nothing is persisted yet. Never touches an
    /// existing record.
    fn ensure_initialized(&self) -> Result<()>;

    /// Replace the persisted record with the one derived from `tag`.
    fn write(&self, tag: StatusTag) -> Result<StatusRecord>;

    /// Read the persisted record as-is. Malformed content is an error, not repaired.
    fn read(&self) -> Result<StatusRecord>;

    /// Validate an operator-supplied mode, then write it.
    ///
    /// Unknown modes fail with `Error::InvalidTag` before storage is touched.
    fn write_mode(&self, mode: &str) -> Result<StatusRecord> {
        let tag: StatusTag = mode.parse()?;
        self.write(tag)
    }
}
