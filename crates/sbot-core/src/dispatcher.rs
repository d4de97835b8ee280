//! Maps operator commands onto the status store.
//!
//! Raw command text is decoded exactly once into [`StatusCommand`]; everything
//! after that works on the closed variant type.

use std::sync::Arc;

use crate::{audit::truncate_text, errors::Error, ports::StatusStore};

/// Top-level command name operators use.
pub const COMMAND_NAME: &str = "status";

pub const CHECK_FAILED_REPLY: &str = "⚠️ Could not read current status.";
pub const SET_FAILED_REPLY: &str = "⚠️ Could not update status.";

/// Longest slice of a rejected mode echoed back to the operator.
const MAX_ECHOED_MODE: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusCommand {
    /// Operator-supplied mode, validated when dispatched.
    Set(String),
    Check,
}

impl StatusCommand {
    /// Decode `name` + free-form `args` (e.g. `set down`, `set mode=risk`, `check`).
    ///
    /// Returns `None` for anything that is not a `status` command with a known
    /// subcommand; such input is ignored rather than answered.
    pub fn decode(name: &str, args: &str) -> Option<Self> {
        if !name.trim().eq_ignore_ascii_case(COMMAND_NAME) {
            return None;
        }

        let mut parts = args.split_whitespace();
        let sub = parts.next()?.to_lowercase();
        match sub.as_str() {
            "set" => {
                let raw = parts.next().unwrap_or("");
                Some(StatusCommand::Set(strip_mode_key(raw).to_string()))
            }
            "check" => Some(StatusCommand::Check),
            _ => None,
        }
    }
}

fn strip_mode_key(raw: &str) -> &str {
    for sep in ['=', ':'] {
        if let Some((key, value)) = raw.split_once(sep) {
            if key.eq_ignore_ascii_case("mode") {
                return value;
            }
        }
    }
    raw
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Failed,
}

/// Text reply carried back to the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
}

impl Reply {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: Outcome::Ok,
        }
    }

    fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: Outcome::Failed,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }
}

/// Stateless router from [`StatusCommand`] to store operations.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn StatusStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn StatusStore>) -> Self {
        Self { store }
    }

    /// Decode and dispatch raw command input. `None` means the input was ignored.
    pub fn handle(&self, name: &str, args: &str) -> Option<Reply> {
        let cmd = StatusCommand::decode(name, args)?;
        Some(self.dispatch(&cmd))
    }

    pub fn dispatch(&self, cmd: &StatusCommand) -> Reply {
        match cmd {
            StatusCommand::Set(mode) => self.set(mode),
            StatusCommand::Check => self.check(),
        }
    }

    fn set(&self, mode: &str) -> Reply {
        match self.store.write_mode(mode) {
            Ok(record) => {
                tracing::info!("{}", record.status_text);
                Reply::ok(record.status_text)
            }
            Err(Error::InvalidTag(raw)) => {
                let shown = truncate_text(&raw, MAX_ECHOED_MODE);
                tracing::warn!(mode = %shown, "rejected invalid status mode");
                Reply::failed(format!(
                    "⚠️ Invalid status mode \"{shown}\". Choose one of: down, risk, good."
                ))
            }
            Err(e) => {
                tracing::error!("failed to write status record: {e}");
                Reply::failed(SET_FAILED_REPLY)
            }
        }
    }

    fn check(&self) -> Reply {
        let record = self
            .store
            .ensure_initialized()
            .and_then(|()| self.store.read());
        match record {
            Ok(record) => {
                tracing::info!("{}", record.status_text);
                Reply::ok(record.status_text)
            }
            Err(e) => {
                tracing::error!("error reading status record: {e}");
                Reply::failed(CHECK_FAILED_REPLY)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::StatusTag, store::FileStatusStore};
    use std::{fs, path::PathBuf};

    fn tmp_dispatcher(prefix: &str) -> (PathBuf, Arc<FileStatusStore>, Dispatcher) {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = PathBuf::from(format!("/tmp/{prefix}-{}-{ts}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let store = Arc::new(FileStatusStore::new(dir.join("status.json")));
        let dispatcher = Dispatcher::new(store.clone());
        (dir, store, dispatcher)
    }

    #[test]
    fn decode_accepts_known_forms() {
        assert_eq!(
            StatusCommand::decode("status", "set down"),
            Some(StatusCommand::Set("down".to_string()))
        );
        assert_eq!(
            StatusCommand::decode("STATUS", "Set mode=risk"),
            Some(StatusCommand::Set("risk".to_string()))
        );
        assert_eq!(
            StatusCommand::decode("status", "set mode:good"),
            Some(StatusCommand::Set("good".to_string()))
        );
        assert_eq!(
            StatusCommand::decode("status", "  check  "),
            Some(StatusCommand::Check)
        );
        assert_eq!(
            StatusCommand::decode("status", "set"),
            Some(StatusCommand::Set(String::new()))
        );
    }

    #[test]
    fn decode_ignores_unrelated_input() {
        assert_eq!(StatusCommand::decode("help", "set down"), None);
        assert_eq!(StatusCommand::decode("status", ""), None);
        assert_eq!(StatusCommand::decode("status", "reset down"), None);
    }

    #[test]
    fn handle_ignores_unrelated_commands_without_touching_store() {
        let (dir, store, d) = tmp_dispatcher("sbot-disp-ignore");
        assert_eq!(d.handle("start", ""), None);
        assert_eq!(d.handle("status", "delete"), None);
        assert!(!store.path().exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn check_on_fresh_store_reports_default() {
        let (dir, store, d) = tmp_dispatcher("sbot-disp-fresh");
        let reply = d.dispatch(&StatusCommand::Check);
        assert!(reply.is_ok());
        assert_eq!(reply.text, "Undetected - Working Fine");
        assert!(store.path().exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn set_replies_with_status_text_and_persists() {
        let (dir, store, d) = tmp_dispatcher("sbot-disp-set");
        let reply = d.handle("status", "set down").unwrap();
        assert_eq!(reply, Reply::ok("Status: DOWN"));
        assert_eq!(store.read().unwrap().status, StatusTag::Down);

        let reply = d.handle("status", "check").unwrap();
        assert_eq!(reply.text, "Status: DOWN");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn set_with_invalid_mode_fails_and_leaves_record_unchanged() {
        let (dir, store, d) = tmp_dispatcher("sbot-disp-invalid");
        store.write(StatusTag::Risk).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let reply = d.dispatch(&StatusCommand::Set("maybe".to_string()));
        assert!(!reply.is_ok());
        assert!(reply.text.contains("Invalid status mode"));
        assert!(reply.text.contains("maybe"));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_mode_reply_stays_short_for_huge_input() {
        let (dir, store, d) = tmp_dispatcher("sbot-disp-long");
        let reply = d
            .handle("status", &format!("set {}", "x".repeat(4084)))
            .unwrap();
        assert_eq!(reply.outcome, Outcome::Failed);
        assert!(reply.text.chars().count() < 120, "{}", reply.text);
        assert!(reply.text.contains("..."));
        assert!(!store.path().exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn set_with_missing_mode_fails() {
        let (dir, store, d) = tmp_dispatcher("sbot-disp-missing");
        let reply = d.handle("status", "set").unwrap();
        assert_eq!(reply.outcome, Outcome::Failed);
        assert!(!store.path().exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn check_on_corrupt_record_returns_fixed_failure() {
        let (dir, store, d) = tmp_dispatcher("sbot-disp-corrupt");
        fs::write(store.path(), "{ definitely not json").unwrap();
        let reply = d.dispatch(&StatusCommand::Check);
        assert_eq!(reply, Reply::failed("⚠️ Could not read current status."));
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "{ definitely not json"
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn set_storage_failure_is_surfaced() {
        let (dir, _, _) = tmp_dispatcher("sbot-disp-io");
        // Parent "directory" is a regular file, so the write cannot succeed.
        let blocker = dir.join("blocker");
        fs::write(&blocker, "x").unwrap();
        let d = Dispatcher::new(Arc::new(FileStatusStore::new(blocker.join("status.json"))));
        let reply = d.handle("status", "set good").unwrap();
        assert_eq!(reply, Reply::failed(SET_FAILED_REPLY));
        let _ = fs::remove_dir_all(&dir);
    }
}
