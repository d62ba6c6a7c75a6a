use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required config field: {0}")]
    MissingField(&'static str),
}

/// Failure talking to the downstream completion server. Terminal for the
/// in-flight request only; handlers convert it into a fixed-shape JSON
/// error response.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("invalid JSON from downstream: {0}")]
    Decode(String),
}

/// Final, merged gateway configuration used by the running process.
///
/// Merge order: CLI > ENV > defaults. Read once at startup, no hot reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    /// Downstream OpenAI-compatible base URL, e.g. `http://127.0.0.1:11434/v1`.
    pub target_url: String,
    /// Lowers the default log filter to debug.
    pub debug: bool,
}

/// Optional layer used for merging gateway config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub target_url: Option<String>,
    pub debug: Option<bool>,
}

impl BridgeConfigPatch {
    pub fn overlay(&mut self, other: BridgeConfigPatch) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.target_url.is_some() {
            self.target_url = other.target_url;
        }
        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }

    pub fn into_config(self) -> Result<BridgeConfig, ConfigError> {
        let target_url = self
            .target_url
            .ok_or(ConfigError::MissingField("target_url"))?;
        Ok(BridgeConfig {
            host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(8080),
            target_url: target_url.trim_end_matches('/').to_string(),
            debug: self.debug.unwrap_or(false),
        })
    }
}

/// Forwarding-tap configuration. The tap relays everything it receives to
/// a single fixed upstream host and port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapConfig {
    pub port: u16,
    pub upstream_host: String,
    pub upstream_port: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapConfigPatch {
    pub port: Option<u16>,
    pub upstream_host: Option<String>,
    pub upstream_port: Option<u16>,
}

impl TapConfigPatch {
    pub fn overlay(&mut self, other: TapConfigPatch) {
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.upstream_host.is_some() {
            self.upstream_host = other.upstream_host;
        }
        if other.upstream_port.is_some() {
            self.upstream_port = other.upstream_port;
        }
    }

    pub fn into_config(self) -> TapConfig {
        TapConfig {
            port: self.port.unwrap_or(8080),
            upstream_host: self
                .upstream_host
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            upstream_port: self.upstream_port.unwrap_or(8443),
        }
    }
}
