//! Configuration schema for Cadre.

use serde::{Deserialize, Serialize};

/// Root config for the Cadre delegation backend.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CadreConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub completion: CompletionConfig,
    #[serde(default)]
    pub interactions: InteractionsConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl CadreConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> CadreConfigBuilder {
        CadreConfigBuilder::new()
    }
}

/// Builder for assembling a `CadreConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct CadreConfigBuilder {
    config: CadreConfig,
}

impl CadreConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: CadreConfig::default(),
        }
    }

    /// Replace the completion endpoint configuration.
    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.config.completion = completion;
        self
    }

    /// Replace the interaction persistence configuration.
    pub fn interactions(mut self, interactions: InteractionsConfig) -> Self {
        self.config.interactions = interactions;
        self
    }

    /// Replace the broadcast channel configuration.
    pub fn broadcast(mut self, broadcast: BroadcastConfig) -> Self {
        self.config.broadcast = broadcast;
        self
    }

    /// Replace the server listen configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Finalize and return the built `CadreConfig`.
    pub fn build(self) -> CadreConfig {
        self.config
    }
}

/// Completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Default completion endpoint base URL.
fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

/// Default completion model name.
fn default_model() -> String {
    "deepseek-chat".to_string()
}

/// Default environment variable consulted for the API key.
fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

/// Default per-request timeout in seconds.
fn default_timeout_secs() -> u64 {
    60
}

/// Default completion token budget.
fn default_max_tokens() -> u32 {
    1024
}

/// Interaction persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionsConfig {
    #[serde(default = "default_interactions_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for InteractionsConfig {
    fn default() -> Self {
        Self {
            enabled: default_interactions_enabled(),
            path: None,
        }
    }
}

/// Persistence is on unless explicitly disabled.
fn default_interactions_enabled() -> bool {
    true
}

/// Broadcast channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_broadcast_buffer")]
    pub buffer: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            buffer: default_broadcast_buffer(),
        }
    }
}

/// Default broadcast channel buffer size.
fn default_broadcast_buffer() -> usize {
    512
}

/// Server listen settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Default server bind address.
fn default_host() -> String {
    "127.0.0.1".to_string()
}

/// Default server listen port.
fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::{CadreConfig, CompletionConfig, ServerConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_cover_every_section() {
        let config = CadreConfig::default();
        assert_eq!(config.completion.base_url, "https://api.deepseek.com");
        assert_eq!(config.completion.model, "deepseek-chat");
        assert_eq!(config.completion.api_key_env, "DEEPSEEK_API_KEY");
        assert_eq!(config.interactions.enabled, true);
        assert_eq!(config.interactions.path, None);
        assert_eq!(config.broadcast.buffer, 512);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn builder_overrides_sections() {
        let config = CadreConfig::builder()
            .completion(CompletionConfig {
                model: "deepseek-reasoner".to_string(),
                ..CompletionConfig::default()
            })
            .server(ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 9090,
            })
            .build();
        assert_eq!(config.completion.model, "deepseek-reasoner");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.broadcast.buffer, 512);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CadreConfig =
            serde_json::from_str(r#"{"completion": {"model": "deepseek-coder"}}"#)
                .expect("decode");
        assert_eq!(config.completion.model, "deepseek-coder");
        assert_eq!(config.completion.base_url, "https://api.deepseek.com");
        assert_eq!(config.interactions.enabled, true);
    }
}
