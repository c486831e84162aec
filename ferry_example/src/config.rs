use config::{Config as ConfigLoader, ConfigError, Environment, File};
use ferry_sink::ClientOptions;
use ferry_types::AppbaseConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub appbase: AppbaseConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline path of the sink node, used in errors and logs
    pub path: String,
    /// Regex over message namespaces; non-matching messages are skipped
    pub type_match: String,
    /// Capacity of the channel between stdin reader and adaptor
    pub buffer: usize,
    /// Write into memory instead of the configured endpoint
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            path: "ndjson/appbase".to_string(),
            type_match: ".*".to_string(),
            buffer: 1024,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Per-request timeout in seconds, 0 disables it
    pub timeout_secs: u64,
    pub healthcheck: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            healthcheck: true,
        }
    }
}

impl From<&ClientConfig> for ClientOptions {
    fn from(config: &ClientConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        ClientOptions::default()
            .with_timeout(timeout)
            .with_healthcheck(config.healthcheck)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{FERRY_ENV}.toml (FERRY_ENV defaults to "dev")
    /// 3. Environment variables prefixed with FERRY_, nested with `__`
    ///    (e.g. FERRY_APPBASE__PASSWORD, FERRY_PIPELINE__DRY_RUN)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("FERRY_ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // 3. Environment variables override everything
            .add_source(
                Environment::with_prefix("FERRY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            [appbase]
            uri = "https://scalr.api.appbase.io"
            username = "user"
            password = "secret"
            namespace = "shop.products"
            bulksize = 256000
            debug = true

            [pipeline]
            path = "orders/appbase"
            type_match = "^db\\.orders$"
            buffer = 64

            [client]
            timeout_secs = 0
            healthcheck = false

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.appbase.bulk_size, Some(256_000));
        assert_eq!(config.pipeline.path, "orders/appbase");
        assert!(!config.pipeline.dry_run);

        let options = ClientOptions::from(&config.client);
        assert_eq!(options.timeout, None);
        assert!(!options.healthcheck);

        let settings = config.appbase.validate().unwrap();
        assert_eq!(settings.thresholds.max_byte_size, 256_000);
    }

    #[test]
    fn test_sections_default_when_missing() {
        let config: Config = toml::from_str("[appbase]\nnamespace = \"a.b\"\n").unwrap();
        assert_eq!(config.pipeline.type_match, ".*");
        assert_eq!(config.client.timeout_secs, 60);
        assert_eq!(config.logging.level, "info");
    }
}
