use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level server configuration (loaded from vaultwire.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VwConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP listen address (default: 127.0.0.1:8080)
    pub listen: String,
    /// Log level (default: info)
    pub log_level: String,
    /// Log format: "json" or "text"
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".into(),
            log_level: "info".into(),
            log_format: "text".into(),
        }
    }
}

/// Durable backend selection for the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind: "fs" or "s3"
    pub backend: String,
    /// Root directory for the fs backend
    pub root: PathBuf,
    /// S3 endpoint (s3 backend only)
    pub endpoint: String,
    /// S3 region (default: us-east-1)
    pub region: String,
    /// S3 bucket name
    pub bucket: String,
    /// S3 access key id
    pub access_key_id: String,
    /// S3 secret access key
    pub secret_access_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "fs".into(),
            root: PathBuf::from("/var/lib/vaultwire"),
            endpoint: String::new(),
            region: "us-east-1".into(),
            bucket: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }
}

impl VwConfig {
    /// Parse a TOML config string. Unknown keys are ignored; missing keys
    /// take defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("parsing config: {e}"))
    }
}
