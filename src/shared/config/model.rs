use std::env;

use serde::Deserialize;

use crate::engine::topn::query::TieBreak;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Worker threads for segment expansion and bucket processing (0 = one per core)
    #[serde(default)]
    pub worker_threads: usize,
    /// Process buckets concurrently instead of one after another
    #[serde(default = "default_parallel_buckets")]
    pub parallel_buckets: bool,
    /// Tie-break applied when a query does not choose one
    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            parallel_buckets: default_parallel_buckets(),
            tie_break: TieBreak::default(),
        }
    }
}

fn default_parallel_buckets() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            stdout_level: "info".to_string(),
            file_level: "debug".to_string(),
        }
    }
}

/// Loads the file named by `ZFTOPN_CONFIG` (default `config/default`), then
/// `ZFTOPN__SECTION__KEY` environment overrides.
pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("ZFTOPN_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    load_settings_from(&config_path)
}

/// A missing file is not an error; absent sections take their defaults.
pub fn load_settings_from(config_path: &str) -> Result<Settings, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(config_path).required(false))
        .add_source(config::Environment::with_prefix("ZFTOPN").separator("__"))
        .build()?
        .try_deserialize()
}
