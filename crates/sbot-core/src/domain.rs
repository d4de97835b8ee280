use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// One of the three operational states an operator can broadcast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTag {
    Down,
    Risk,
    #[default]
    Good,
}

impl StatusTag {
    pub const ALL: [StatusTag; 3] = [StatusTag::Down, StatusTag::Risk, StatusTag::Good];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusTag::Down => "down",
            StatusTag::Risk => "risk",
            StatusTag::Good => "good",
        }
    }

    /// Display text shown to operators and on the dashboard.
    pub fn status_text(self) -> &'static str {
        match self {
            StatusTag::Down => "Status: DOWN",
            StatusTag::Risk => "Risk: Being Banned",
            StatusTag::Good => "Undetected - Working Fine",
        }
    }
}

impl fmt::Display for StatusTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "down" => Ok(StatusTag::Down),
            "risk" => Ok(StatusTag::Risk),
            "good" => Ok(StatusTag::Good),
            _ => Err(Error::InvalidTag(s.to_string())),
        }
    }
}

/// The single persisted status record.
///
/// `status_text` is always derived from `status`; build records with
/// [`StatusRecord::from_tag`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: StatusTag,
    #[serde(rename = "statusText")]
    pub status_text: String,
}

impl StatusRecord {
    pub fn from_tag(tag: StatusTag) -> Self {
        Self {
            status: tag,
            status_text: tag.status_text().to_string(),
        }
    }

    /// True when `status_text` matches the fixed table entry for `status`.
    pub fn is_consistent(&self) -> bool {
        self.status_text == self.status.status_text()
    }
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self::from_tag(StatusTag::default())
    }
}
