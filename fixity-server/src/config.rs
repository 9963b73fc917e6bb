//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: IpAddr,
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 50)
    pub body_limit_mb: usize,
    /// Maximum file size per upload in MB (default: 25)
    pub max_file_size_mb: usize,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Registry database URL; empty selects the in-memory store
    pub database_url: Option<String>,
    /// Database connection pool maximum connections (default: 20)
    pub database_max_connections: u32,
    /// Database connection pool minimum connections (default: 2)
    pub database_min_connections: u32,
    /// Page size used when a listing request omits `limit` (default: 20)
    pub default_page_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 50,
            max_file_size_mb: 25,
            timeout_secs: 30,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            database_url: None,
            database_max_connections: 20,
            database_min_connections: 2,
            default_page_limit: 20,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env_parse("PORT").unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|raw| parse_host(&raw))
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|origins| parse_origins(&origins));

        // Rate limiting enabled by default in production, can be disabled with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = std::env::var("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let default_page_limit = env_parse("DEFAULT_PAGE_LIMIT")
            .filter(|limit: &i64| *limit > 0)
            .unwrap_or(20);

        Self {
            port,
            host,
            allowed_origins,
            body_limit_mb: env_parse("BODY_LIMIT_MB").unwrap_or(50),
            max_file_size_mb: env_parse("MAX_FILE_SIZE_MB").unwrap_or(25),
            timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(30),
            rate_limit_enabled,
            rate_limit_per_sec: env_parse("RATE_LIMIT_PER_SEC").unwrap_or(10),
            rate_limit_burst: env_parse("RATE_LIMIT_BURST").unwrap_or(20),
            database_url,
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(20),
            database_min_connections: env_parse("DATABASE_MIN_CONNECTIONS").unwrap_or(2),
            default_page_limit,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Per-file size ceiling in bytes
    pub fn max_file_bytes(&self) -> u64 {
        (self.max_file_size_mb as u64) * 1024 * 1024
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse a listen address, warning (and returning `None`) on anything that
/// is not an IPv4 or IPv6 literal.
fn parse_host(raw: &str) -> Option<IpAddr> {
    match raw.trim().parse() {
        Ok(ip) => Some(ip),
        Err(_) => {
            tracing::warn!(host = %raw, "HOST is not an IP address, falling back to 127.0.0.1");
            None
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
        assert!(!config.rate_limit_enabled);
        assert_eq!(config.default_page_limit, 20);
    }

    #[test]
    fn test_max_file_bytes() {
        let config = Config {
            max_file_size_mb: 2,
            ..Config::default()
        };
        assert_eq!(config.max_file_bytes(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://registry.example.com,,"),
            vec![
                "http://localhost:3000".to_string(),
                "https://registry.example.com".to_string()
            ]
        );
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = Config {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            ..Config::default()
        };
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");

        let config = Config {
            host: IpAddr::V6(std::net::Ipv6Addr::LOCALHOST),
            port: 8000,
            ..Config::default()
        };
        assert_eq!(config.socket_addr().to_string(), "[::1]:8000");
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(parse_host("0.0.0.0"), Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)));
        assert_eq!(
            parse_host(" 10.1.2.3 "),
            Some(IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3)))
        );
        assert_eq!(
            parse_host("::"),
            Some(IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED))
        );
        assert_eq!(parse_host("localhost"), None);
        assert_eq!(parse_host("0.0.0.0:3000"), None);
    }
}
