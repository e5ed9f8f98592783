//! Runtime configuration resolved from the environment.
//!
//! | variable            | meaning                                   |
//! |---------------------|-------------------------------------------|
//! | `BIZDESK_DB_PATH`   | store file path; unset means in-memory    |
//! | `BIZDESK_LOG_LEVEL` | `trace|debug|info|warn|error`             |
//! | `BIZDESK_LOG_DIR`   | absolute directory for rolling log files  |

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "BIZDESK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BIZDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BIZDESK_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// `None` selects an in-memory store.
    pub store_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` leaves file logging disabled.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            store_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_DB_PATH, ENV_LOG_LEVEL};
    use std::path::PathBuf;

    #[test]
    fn lookup_overrides_defaults_and_ignores_blank_values() {
        let config = CoreConfig::from_lookup(|name| match name {
            ENV_DB_PATH => Some(" /tmp/bizdesk.sqlite3 ".to_string()),
            ENV_LOG_LEVEL => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(
            config.store_path,
            Some(PathBuf::from("/tmp/bizdesk.sqlite3"))
        );
        assert_eq!(config.log_level, CoreConfig::default().log_level);
        assert_eq!(config.log_dir, None);
    }
}
