//! Server configuration.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL.
    pub database_url: String,
    /// Maximum accepted contact batch size; `None` disables the cap.
    pub max_contact_batch: Option<usize>,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("PARLEY_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PARLEY_SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:parley.db?mode=rwc".to_string()),
            max_contact_batch: parse_batch_cap(env::var("PARLEY_MAX_CONTACT_BATCH").ok()),
            log_level: env::var("PARLEY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses the optional contact batch cap; unset, empty, zero, or
/// unparseable values disable it.
fn parse_batch_cap(raw: Option<String>) -> Option<usize> {
    raw.and_then(|v| v.parse().ok()).filter(|&cap| cap > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_cap_parsing() {
        assert_eq!(parse_batch_cap(None), None);
        assert_eq!(parse_batch_cap(Some("".to_string())), None);
        assert_eq!(parse_batch_cap(Some("0".to_string())), None);
        assert_eq!(parse_batch_cap(Some("abc".to_string())), None);
        assert_eq!(parse_batch_cap(Some("100".to_string())), Some(100));
    }
}
