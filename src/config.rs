//! Environment-driven configuration.
//!
//! Everything is read once at startup (after `dotenvy` has loaded `.env`).

use std::net::SocketAddr;
use std::time::Duration;

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// `None` when `SUPABASE_URL` is unset or empty
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("SUPABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())?;

        Some(Self {
            url,
            anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
            timeout_secs: env_parse("HTTP_TIMEOUT_SECS").unwrap_or(10),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub backend: Option<BackendConfig>,
    /// Period of the image-track auto-advance timer
    pub auto_advance: Duration,
    /// Idle time after which a viewer session is evicted
    pub viewer_ttl: Duration,
    /// Upper bound on live viewer sessions
    pub max_viewers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: "development".to_string(),
            backend: None,
            auto_advance: Duration::from_secs(5),
            viewer_ttl: Duration::from_secs(1800),
            max_viewers: 1000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            backend: BackendConfig::from_env(),
            auto_advance: env_parse::<u64>("AUTO_ADVANCE_SECS")
                .map(|secs| Duration::from_secs(secs.clamp(4, 5)))
                .unwrap_or(defaults.auto_advance),
            viewer_ttl: env_parse::<u64>("VIEWER_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.viewer_ttl),
            max_viewers: env_parse::<usize>("MAX_VIEWER_SESSIONS")
                .filter(|&max| max > 0)
                .unwrap_or(defaults.max_viewers),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3001);
        assert!(config.backend.is_none());
        assert_eq!(config.auto_advance, Duration::from_secs(5));
        assert_eq!(config.max_viewers, 1000);
        assert!(!config.is_production());
    }

    #[test]
    fn test_socket_addr_parses() {
        let config = AppConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 3001);

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }
}
