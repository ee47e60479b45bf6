//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: LIBRARY_, nested keys split on `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/library-api/{service_name}/config.toml
//! 4. System directory: /etc/library-api/{service_name}/config.toml
//! 5. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const ENV_PREFIX: &str = "LIBRARY_";
const XDG_PREFIX: &str = "library-api";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Collection paging limits
    #[serde(default)]
    pub paging: PagingConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// HTTP caching configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Backing store configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Absolute base for generated links, e.g. `https://library.example.com`
    ///
    /// When unset, links are built from the request's `Host` header.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            environment: default_environment(),
            public_url: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Paging limits for collection endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Page size when the client sends none
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Larger requested sizes are capped to this
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl PagingConfig {
    /// Clamp a requested page size into `1..=max_page_size`
    pub fn effective_page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Every rule must admit a request for it to pass
    #[serde(default = "default_rate_limit_rules")]
    pub rules: Vec<RateLimitRule>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules: default_rate_limit_rules(),
        }
    }
}

/// `requests` per `period_secs`, counted per client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub requests: u32,
    pub period_secs: u64,
}

impl RateLimitRule {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

/// HTTP caching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// `max-age` of the Cache-Control header
    #[serde(default = "default_cache_max_age")]
    pub max_age_secs: u64,

    /// Add `must-revalidate` to the Cache-Control header
    #[serde(default = "default_true")]
    pub must_revalidate: bool,

    /// Serve repeated GETs from the in-process response cache
    #[serde(default = "default_true")]
    pub response_cache_enabled: bool,

    /// Lifetime of a stored response
    #[serde(default = "default_cache_max_age")]
    pub response_cache_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: default_cache_max_age(),
            must_revalidate: true,
            response_cache_enabled: true,
            response_cache_ttl_secs: default_cache_max_age(),
        }
    }
}

impl CacheConfig {
    pub fn response_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.response_cache_ttl_secs)
    }

    /// Value of the Cache-Control header on cacheable responses
    pub fn cache_control(&self) -> String {
        if self.must_revalidate {
            format!("public, max-age={}, must-revalidate", self.max_age_secs)
        } else {
            format!("public, max-age={}", self.max_age_secs)
        }
    }
}

/// Middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable compression
    #[serde(default = "default_true")]
    pub compression: bool,

    /// CORS configuration (permissive, restrictive, disabled)
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            compression: true,
            cors_mode: default_cors_mode(),
        }
    }
}

/// Backing store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Load the demo authors at startup
    #[serde(default = "default_true")]
    pub seed: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

// Default value functions
fn default_service_name() -> String {
    "library-api".to_string()
}

fn default_port() -> u16 {
    6058
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    20
}

fn default_rate_limit_rules() -> Vec<RateLimitRule> {
    vec![
        RateLimitRule {
            requests: 1000,
            period_secs: 300,
        },
        RateLimitRule {
            requests: 200,
            period_secs: 10,
        },
    ]
}

fn default_cache_max_age() -> u64 {
    600
}

fn default_true() -> bool {
    true
}

fn default_body_limit_mb() -> usize {
    10 // 10 MB
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// Searches for config files in this order (first found is used):
    /// 1. Current working directory: ./config.toml
    /// 2. XDG config directory: ~/.config/library-api/{service_name}/config.toml
    /// 3. System directory: /etc/library-api/{service_name}/config.toml
    ///
    /// Environment variables (LIBRARY_ prefix) override all file-based configs.
    pub fn load() -> Result<Self> {
        Self::load_for_service(&default_service_name())
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first so later merges override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses XDG directories and loads directly from the given path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Find all possible config file paths for a service, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(XDG_PREFIX);
        let config_file_path = Path::new(service_name).join("config.toml");
        if let Ok(path) = xdg_dirs.place_config_file(&config_file_path) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(XDG_PREFIX)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.name, "library-api");
        assert_eq!(config.service.port, 6058);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.paging.max_page_size, 20);
        assert_eq!(config.rate_limit.rules.len(), 2);
        assert!(config.storage.seed);
    }

    #[test]
    fn test_effective_page_size() {
        let paging = PagingConfig::default();
        assert_eq!(paging.effective_page_size(None), 10);
        assert_eq!(paging.effective_page_size(Some(15)), 15);
        assert_eq!(paging.effective_page_size(Some(500)), 20);
        assert_eq!(paging.effective_page_size(Some(0)), 1);
    }

    #[test]
    fn test_cache_control_value() {
        let mut cache = CacheConfig::default();
        assert_eq!(cache.cache_control(), "public, max-age=600, must-revalidate");
        cache.must_revalidate = false;
        assert_eq!(cache.cache_control(), "public, max-age=600");
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "library-test"
port = 7000

[paging]
max_page_size = 50

[[rate_limit.rules]]
requests = 5
period_secs = 1
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "library-test");
        assert_eq!(config.service.port, 7000);
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.paging.max_page_size, 50);
        assert_eq!(config.paging.default_page_size, 10);
        assert_eq!(
            config.rate_limit.rules,
            vec![RateLimitRule {
                requests: 5,
                period_secs: 1
            }]
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.service.port, 6058);
    }
}
