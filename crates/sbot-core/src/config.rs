use std::{
    env, fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Typed configuration for the bot and the dashboard.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub telegram_allowed_users: Vec<i64>,

    // Status record
    pub status_file: PathBuf,

    // Dashboard
    pub dashboard_dir: PathBuf,
    pub dashboard_file: PathBuf,
    pub dashboard_host: IpAddr,
    pub dashboard_port: u16,

    // Audit
    pub audit_log_path: Option<PathBuf>,
    pub audit_log_json: bool,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        let telegram_allowed_users = parse_csv_i64(get("TELEGRAM_ALLOWED_USERS"))?;

        let status_file = get("STATUS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("status.json"));

        let dashboard_dir = get("DASHBOARD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let dashboard_file = dashboard_dir.join(
            get("DASHBOARD_FILE").unwrap_or_else(|| "dashboard.html".to_string()),
        );
        let dashboard_host = match get("DASHBOARD_HOST") {
            Some(h) => h
                .trim()
                .parse::<IpAddr>()
                .map_err(|e| Error::Config(format!("DASHBOARD_HOST {h:?} is invalid: {e}")))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let dashboard_port = match get("PORT") {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("PORT {p:?} is invalid: {e}")))?,
            None => 3000,
        };

        let audit_log_path = get("AUDIT_LOG_PATH").map(PathBuf::from);
        let audit_log_json = get("AUDIT_LOG_JSON").map(|s| parse_bool(&s)).unwrap_or(false);

        Ok(Self {
            telegram_bot_token,
            telegram_allowed_users,
            status_file,
            dashboard_dir,
            dashboard_file,
            dashboard_host,
            dashboard_port,
            audit_log_path,
            audit_log_json,
        })
    }

    pub fn dashboard_addr(&self) -> SocketAddr {
        SocketAddr::new(self.dashboard_host, self.dashboard_port)
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return &val[1..val.len() - 1];
    }
    val
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_csv_i64(v: Option<String>) -> Result<Vec<i64>> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                Error::Config(format!("TELEGRAM_ALLOWED_USERS contains a non-numeric id: {s}"))
            })
        })
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(cfg_from(&[]), Err(Error::Config(_))));
        assert!(matches!(
            cfg_from(&[("TELEGRAM_BOT_TOKEN", "  ")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn defaults_point_at_working_dir() {
        let cfg = cfg_from(&[("TELEGRAM_BOT_TOKEN", "t")]).unwrap();
        assert_eq!(cfg.status_file, PathBuf::from("status.json"));
        assert_eq!(cfg.dashboard_file, PathBuf::from("./dashboard.html"));
        assert_eq!(cfg.dashboard_port, 3000);
        assert_eq!(cfg.dashboard_addr().to_string(), "0.0.0.0:3000");
        assert!(cfg.telegram_allowed_users.is_empty());
        assert!(cfg.audit_log_path.is_none());
        assert!(!cfg.audit_log_json);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = cfg_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_ALLOWED_USERS", "1, 2,,3"),
            ("STATUS_FILE", "/var/lib/sbot/status.json"),
            ("DASHBOARD_DIR", "/srv/www"),
            ("DASHBOARD_FILE", "index.html"),
            ("DASHBOARD_HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("AUDIT_LOG_PATH", "/tmp/sbot-audit.log"),
            ("AUDIT_LOG_JSON", "yes"),
        ])
        .unwrap();
        assert_eq!(cfg.telegram_allowed_users, vec![1, 2, 3]);
        assert_eq!(cfg.status_file, PathBuf::from("/var/lib/sbot/status.json"));
        assert_eq!(cfg.dashboard_file, PathBuf::from("/srv/www/index.html"));
        assert_eq!(cfg.dashboard_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.audit_log_path, Some(PathBuf::from("/tmp/sbot-audit.log")));
        assert!(cfg.audit_log_json);
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(cfg_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("PORT", "http")]).is_err());
        assert!(cfg_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("DASHBOARD_HOST", "nope")]).is_err());
        assert!(cfg_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("TELEGRAM_ALLOWED_USERS", "12,bob")
        ])
        .is_err());
    }

    #[test]
    fn unquote_strips_matching_quotes_only() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("\"abc'"), "\"abc'");
        assert_eq!(unquote("abc"), "abc");
    }
}
