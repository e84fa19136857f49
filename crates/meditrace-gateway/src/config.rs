//! Gateway configuration.
//!
//! The caller identity that used to live in process-global session state
//! (org, channel, contract name) is configuration here, loaded from a TOML
//! file and turned into one explicit [`TxContext`] per process. Every
//! field has a default, so a missing or partial file still yields a
//! working gateway.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use meditrace_core::TxContext;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub identity: IdentityConfig,
    pub server: ServerConfig,
}

/// Who invocations through this gateway are attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub org: String,
    pub channel: String,
    pub contract: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            org: "Org1MSP".to_string(),
            channel: "pharmachannel".to_string(),
            contract: "drugtraceability".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: PathBuf::from("/var/lib/meditrace"),
        }
    }
}

impl GatewayConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Invocation context carrying this gateway's identity.
    pub fn context(&self) -> TxContext {
        TxContext::new(
            &self.identity.org,
            &self.identity.channel,
            &self.identity.contract,
        )
    }
}
