//! Append-only audit trail of operator commands.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use crate::{
    dispatcher::{Outcome, Reply},
    errors::Error,
    Result,
};

const AUDIT_MAX_TEXT: usize = 500;

#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized: Option<bool>,
}

impl AuditEvent {
    fn base(event: &str, user_id: i64, username: &str) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            event: event.to_string(),
            user_id: Some(user_id),
            username: Some(username.to_string()),
            command: None,
            reply: None,
            ok: None,
            authorized: None,
        }
    }

    pub fn command(user_id: i64, username: &str, command: &str, reply: &Reply) -> Self {
        Self {
            command: Some(command.to_string()),
            reply: Some(reply.text.clone()),
            ok: Some(reply.outcome == Outcome::Ok),
            ..Self::base("command", user_id, username)
        }
    }

    pub fn auth(user_id: i64, username: &str, authorized: bool) -> Self {
        Self {
            authorized: Some(authorized),
            ..Self::base("auth", user_id, username)
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditLogger {
    path: PathBuf,
    json: bool,
}

impl AuditLogger {
    pub fn new(path: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            path: path.into(),
            json,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, mut event: AuditEvent) -> Result<()> {
        if let Some(s) = &event.command {
            event.command = Some(truncate_text(s, AUDIT_MAX_TEXT));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if self.json {
            let line = serde_json::to_string(&event)?;
            writeln!(file, "{line}")?;
            return Ok(());
        }

        // Plain text format for readability.
        let mut out = String::new();
        out.push('\n');
        out.push_str(&"=".repeat(60));

        let value = serde_json::to_value(&event)?;
        let Some(obj) = value.as_object() else {
            return Err(Error::External(
                "audit event is not a JSON object".to_string(),
            ));
        };
        for (k, v) in obj {
            out.push('\n');
            out.push_str(k);
            out.push_str(": ");
            match v {
                serde_json::Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
        }
        out.push('\n');

        file.write_all(out.as_bytes())?;
        Ok(())
    }
}

pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}
