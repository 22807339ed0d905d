//! Configuration types for the tanebi adapter.
//!
//! The runtime reads this section from `brass.toml`:
//!
//! ```toml
//! [adapters.tanebi]
//! uin = 10001
//! sign_api_url = "https://sign.lagrangecore.org/api/sign/30366"
//!
//! [adapters.tanebi.logging]
//! message = true   # log every message the bot sees or sends
//! event = false    # log notices and requests
//! ```

use serde::{Deserialize, Serialize};

/// Signing endpoint used when none is configured.
pub const DEFAULT_SIGN_API_URL: &str = "https://sign.lagrangecore.org/api/sign/30366";

/// Tanebi adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TanebiConfig {
    /// QQ number of the bot account.
    pub uin: i64,

    /// Signing service URL.
    pub sign_api_url: String,

    /// Which protocol activity to log.
    pub logging: LoggingToggles,
}

impl Default for TanebiConfig {
    fn default() -> Self {
        Self {
            uin: 0,
            sign_api_url: DEFAULT_SIGN_API_URL.to_string(),
            logging: LoggingToggles::default(),
        }
    }
}

/// Switches for the message and event loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingToggles {
    /// Log private and group messages.
    pub message: bool,

    /// Log notices (pokes, recalls, mutes, ...) and requests.
    pub event: bool,
}

impl Default for LoggingToggles {
    fn default() -> Self {
        Self {
            message: true,
            event: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
uin: 10001
sign_api_url: http://127.0.0.1:8080/api/sign
logging:
  event: false
"#;

        let config: TanebiConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.uin, 10001);
        assert_eq!(config.sign_api_url, "http://127.0.0.1:8080/api/sign");
        assert!(config.logging.message);
        assert!(!config.logging.event);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: TanebiConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, TanebiConfig::default());
        assert_eq!(config.uin, 0);
        assert_eq!(config.sign_api_url, DEFAULT_SIGN_API_URL);
        assert!(config.logging.message && config.logging.event);
    }
}
