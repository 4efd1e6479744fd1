//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Referral lookup behavior.
    #[serde(default)]
    pub lookup: LookupConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Referral lookup behavior.
///
/// The conflict-severity threshold and the search cap are product choices,
/// not derived invariants, so they stay configurable.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Whether lookups append audit-log rows.
    #[serde(default)]
    pub audit_log_enabled: bool,
    /// Hard cap on client search results.
    #[serde(default = "default_search_limit")]
    pub search_limit: u64,
    /// Results shown per page in the admin UI.
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    /// Whether the admin UI re-runs the current search every 30 seconds.
    #[serde(default)]
    pub auto_refresh: bool,
    /// Maximum recursion depth for the referral tree.
    #[serde(default = "default_tree_max_depth")]
    pub tree_max_depth: u32,
    /// Distinct-affiliate count above which a conflict is High severity.
    #[serde(default = "default_conflict_high_threshold")]
    pub conflict_high_threshold: usize,
}

fn default_search_limit() -> u64 {
    50
}

fn default_results_per_page() -> u32 {
    20
}

fn default_tree_max_depth() -> u32 {
    3
}

fn default_conflict_high_threshold() -> usize {
    2
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            audit_log_enabled: false,
            search_limit: default_search_limit(),
            results_per_page: default_results_per_page(),
            auto_refresh: false,
            tree_max_depth: default_tree_max_depth(),
            conflict_high_threshold: default_conflict_high_threshold(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REFLENS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_lookup_defaults() {
        let lookup = LookupConfig::default();
        assert!(!lookup.audit_log_enabled);
        assert_eq!(lookup.search_limit, 50);
        assert_eq!(lookup.results_per_page, 20);
        assert!(!lookup.auto_refresh);
        assert_eq!(lookup.tree_max_depth, 3);
        assert_eq!(lookup.conflict_high_threshold, 2);
    }

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("REFLENS__DATABASE__URL", Some("postgres://localhost/test")),
                ("REFLENS__SERVER__PORT", Some("9090")),
                ("REFLENS__LOOKUP__AUDIT_LOG_ENABLED", Some("true")),
            ],
            || {
                let config = AppConfig::load().expect("config should load from env");
                assert_eq!(config.database.url, "postgres://localhost/test");
                assert_eq!(config.server.port, 9090);
                assert!(config.lookup.audit_log_enabled);
                // Untouched sections fall back to defaults
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.lookup.search_limit, 50);
            },
        );
    }

    #[rstest]
    #[case("development")]
    #[case("production")]
    fn test_load_tolerates_missing_files(#[case] run_mode: &str) {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some(run_mode)),
                ("REFLENS__DATABASE__URL", Some("postgres://localhost/test")),
            ],
            || {
                assert!(AppConfig::load().is_ok());
            },
        );
    }
}
