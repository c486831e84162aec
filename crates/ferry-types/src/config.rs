use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};
use crate::Namespace;

/// Endpoint used when no uri is configured
pub const DEFAULT_URI: &str = "https://scalr.api.appbase.io";

/// Byte threshold (~500kb) used when `bulksize` is absent or zero
pub const DEFAULT_BULK_SIZE: usize = 512_000;

/// Maximum number of operations held in a single bulk request
pub const MAX_BULK_OPERATIONS: usize = 2000;

/// Raw adaptor configuration, as it appears in a pipeline definition
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppbaseConfig {
    /// The uri to connect to, in the form https://scalr.api.appbase.io
    #[serde(default)]
    pub uri: Option<String>,
    /// Appbase application username
    #[serde(default)]
    pub username: String,
    /// Appbase application password
    #[serde(default)]
    pub password: String,
    /// Appbase application name and type to write, as "app.type"
    #[serde(default)]
    pub namespace: String,
    /// Display debug information about every batch
    #[serde(default)]
    pub debug: bool,
    /// Size in bytes of the buffer used for bulk operations
    #[serde(default, rename = "bulksize")]
    pub bulk_size: Option<usize>,
}

impl std::fmt::Debug for AppbaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppbaseConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("debug", &self.debug)
            .field("bulk_size", &self.bulk_size)
            .finish()
    }
}

impl AppbaseConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_bulk_size(mut self, bytes: usize) -> Self {
        self.bulk_size = Some(bytes);
        self
    }

    /// Check every construction-time requirement and resolve defaults
    pub fn validate(&self) -> Result<BulkSettings> {
        let raw_uri = self
            .uri
            .as_deref()
            .filter(|uri| !uri.is_empty())
            .unwrap_or(DEFAULT_URI);

        if self.namespace.is_empty() {
            return Err(ConfigError::MissingNamespace);
        }

        if self.username.is_empty() || self.password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }

        let mut endpoint = Url::parse(raw_uri).map_err(|e| ConfigError::InvalidUri {
            uri: raw_uri.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUri {
                uri: raw_uri.to_string(),
                reason: format!("unsupported scheme {:?}", endpoint.scheme()),
            });
        }

        let credentials_rejected = || ConfigError::InvalidUri {
            uri: raw_uri.to_string(),
            reason: "cannot carry credentials".to_string(),
        };
        endpoint
            .set_username(&self.username)
            .map_err(|_| credentials_rejected())?;
        endpoint
            .set_password(Some(&self.password))
            .map_err(|_| credentials_rejected())?;

        let namespace = Namespace::parse(&self.namespace)?;

        let max_byte_size = match self.bulk_size {
            Some(0) | None => DEFAULT_BULK_SIZE,
            Some(bytes) => bytes,
        };

        Ok(BulkSettings {
            endpoint,
            namespace,
            debug: self.debug,
            thresholds: Thresholds::default().with_max_byte_size(max_byte_size),
        })
    }
}

/// Flush thresholds; a batch is sent as soon as either is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub max_byte_size: usize,
    pub max_operation_count: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_byte_size: DEFAULT_BULK_SIZE,
            max_operation_count: MAX_BULK_OPERATIONS,
        }
    }
}

impl Thresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_byte_size(mut self, bytes: usize) -> Self {
        self.max_byte_size = bytes;
        self
    }

    pub fn with_max_operation_count(mut self, count: usize) -> Self {
        self.max_operation_count = count;
        self
    }
}

/// Validated, immutable settings the adaptor runs with
#[derive(Clone)]
pub struct BulkSettings {
    /// Endpoint with credentials embedded as userinfo
    pub endpoint: Url,
    pub namespace: Namespace,
    pub debug: bool,
    pub thresholds: Thresholds,
}

impl std::fmt::Debug for BulkSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut endpoint = self.endpoint.clone();
        let _ = endpoint.set_password(None);
        f.debug_struct("BulkSettings")
            .field("endpoint", &endpoint.as_str())
            .field("namespace", &self.namespace)
            .field("debug", &self.debug)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults() {
        let settings = AppbaseConfig::new("user", "secret", "shop.products")
            .validate()
            .unwrap();

        assert_eq!(settings.endpoint.host_str(), Some("scalr.api.appbase.io"));
        assert_eq!(settings.endpoint.username(), "user");
        assert_eq!(settings.endpoint.password(), Some("secret"));
        assert_eq!(settings.namespace, Namespace::new("shop", "products"));
        assert_eq!(settings.thresholds.max_byte_size, DEFAULT_BULK_SIZE);
        assert_eq!(settings.thresholds.max_operation_count, MAX_BULK_OPERATIONS);
        assert!(!settings.debug);
    }

    #[test]
    fn test_validate_zero_bulk_size_uses_default() {
        let settings = AppbaseConfig::new("user", "secret", "shop.products")
            .with_bulk_size(0)
            .validate()
            .unwrap();
        assert_eq!(settings.thresholds.max_byte_size, DEFAULT_BULK_SIZE);

        let settings = AppbaseConfig::new("user", "secret", "shop.products")
            .with_bulk_size(1024)
            .validate()
            .unwrap();
        assert_eq!(settings.thresholds.max_byte_size, 1024);
    }

    #[test]
    fn test_validate_errors() {
        let missing_ns = AppbaseConfig::new("user", "secret", "");
        assert_eq!(missing_ns.validate().unwrap_err(), ConfigError::MissingNamespace);

        let missing_password = AppbaseConfig::new("user", "", "shop.products");
        assert_eq!(
            missing_password.validate().unwrap_err(),
            ConfigError::MissingCredentials
        );

        let bad_uri = AppbaseConfig::new("user", "secret", "shop.products").with_uri("not a uri");
        assert!(matches!(
            bad_uri.validate(),
            Err(ConfigError::InvalidUri { .. })
        ));

        let bad_scheme =
            AppbaseConfig::new("user", "secret", "shop.products").with_uri("ftp://example.com");
        assert!(matches!(
            bad_scheme.validate(),
            Err(ConfigError::InvalidUri { .. })
        ));

        let bad_ns = AppbaseConfig::new("user", "secret", "products");
        assert!(matches!(
            bad_ns.validate(),
            Err(ConfigError::MalformedNamespace(_))
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = AppbaseConfig::new("user", "hunter2", "shop.products");
        assert!(!format!("{:?}", config).contains("hunter2"));

        let settings = config.validate().unwrap();
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[test]
    fn test_deserialize_bulksize_key() {
        let config: AppbaseConfig = serde_json::from_str(
            r#"{"username":"u","password":"p","namespace":"a.b","bulksize":2048,"debug":true}"#,
        )
        .unwrap();
        assert_eq!(config.bulk_size, Some(2048));
        assert!(config.debug);
        assert_eq!(config.uri, None);
    }
}
