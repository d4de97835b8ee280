//! File-backed status store.
//!
//! The JSON file is the single source of truth: every read goes to disk and
//! every write replaces the whole file via temp-file + rename, so a concurrent
//! reader observes either the previous record or the new one.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    domain::{StatusRecord, StatusTag},
    errors::Error,
    ports::StatusStore,
    Result,
};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug)]
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, record: &StatusRecord) -> Result<()> {
        let mut txt = serde_json::to_string_pretty(record)?;
        txt.push('\n');
        write_atomic(&self.path, txt.as_bytes())
    }

    fn corrupt(&self, reason: impl Into<String>) -> Error {
        Error::CorruptRecord {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl StatusStore for FileStatusStore {
    fn ensure_initialized(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        let record = StatusRecord::default();
        self.persist(&record)?;
        tracing::info!(path = %self.path.display(), "created default status record");
        Ok(())
    }

    fn write(&self, tag: StatusTag) -> Result<StatusRecord> {
        let record = StatusRecord::from_tag(tag);
        self.persist(&record)?;
        Ok(record)
    }

    fn read(&self) -> Result<StatusRecord> {
        let bytes = fs::read(&self.path)?;
        let record: StatusRecord =
            serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e.to_string()))?;
        if !record.is_consistent() {
            return Err(self.corrupt(format!(
                "statusText {:?} does not match status {:?}",
                record.status_text,
                record.status.as_str()
            )));
        }
        Ok(record)
    }
}

/// Write `bytes` to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("status file path has no file name: {}", path.display()),
            ))
        })?;
    let tmp = dir.join(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    let result = (|| -> Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
