use shared_types::{AppConfig, FeatureFlags, SearchSettings};
use std::sync::OnceLock;

static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Path to the config file, relative to the project root.
const CONFIG_PATH: &str = "config.toml";

/// Parse config file contents. Invalid TOML falls back to defaults.
pub fn parse_config(contents: &str) -> AppConfig {
    toml::from_str(contents).unwrap_or_else(|e| {
        tracing::warn!(path = CONFIG_PATH, error = %e, "Failed to parse config, using defaults");
        AppConfig::default()
    })
}

/// Read `config.toml` once and keep it for the life of the process.
/// Safe to call multiple times; only the first call reads the file.
pub fn load_config() -> &'static AppConfig {
    CONFIG.get_or_init(|| match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => {
            let config = parse_config(&contents);
            tracing::info!(features = ?config.features, search = ?config.search, "Loaded {CONFIG_PATH}");
            config
        }
        Err(e) => {
            tracing::info!(error = %e, "{CONFIG_PATH} not found, using defaults");
            AppConfig::default()
        }
    })
}

/// Loaded feature flags, or all-off defaults before `load_config()` runs.
pub fn feature_flags() -> &'static FeatureFlags {
    static DEFAULT: FeatureFlags = FeatureFlags { telemetry: false };
    CONFIG.get().map(|c| &c.features).unwrap_or(&DEFAULT)
}

/// Loaded search settings, reading the config file on first use.
pub fn search_settings() -> &'static SearchSettings {
    &load_config().search
}
