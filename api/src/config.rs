//! Server configuration

use serde::{Deserialize, Serialize};

/// Default location of the JSON config file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/openforms/api.json";

/// Server settings, read from a JSON file with environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Socket address to bind.
    pub listen_addr: String,
    /// HMAC secret for signing session tokens.
    pub jwt_secret: String,
    /// Session token lifetime.
    pub token_ttl_hours: i64,
    /// bcrypt work factor for stored passwords.
    pub bcrypt_cost: u32,
    /// Allow any origin, method and header.
    pub cors_permissive: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            jwt_secret: "openforms-secret-key-change-in-production".into(),
            token_ttl_hours: 8,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_permissive: true,
        }
    }
}

impl ApiConfig {
    /// Load from file
    pub fn load(path: &str) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Reads the file named by `OPENFORMS_CONFIG`, falling back to defaults,
    /// then applies `OPENFORMS_LISTEN_ADDR` and `OPENFORMS_JWT_SECRET`.
    pub fn from_env() -> Self {
        let path =
            std::env::var("OPENFORMS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

        let config = Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!(path = %path, error = %e, "Config not loaded, using defaults");
            Self::default()
        });
        config.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(addr) = lookup("OPENFORMS_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(secret) = lookup("OPENFORMS_JWT_SECRET") {
            self.jwt_secret = secret;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"listen_addr": "127.0.0.1:9000", "token_ttl_hours": 1}}"#).unwrap();

        let config = ApiConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.token_ttl_hours, 1);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "listen_addr = 1").unwrap();
        let err = ApiConfig::load(file.path().to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_env_overrides() {
        let config = ApiConfig::default().with_overrides(|key| match key {
            "OPENFORMS_JWT_SECRET" => Some("s3cret".into()),
            _ => None,
        });
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
    }
}
