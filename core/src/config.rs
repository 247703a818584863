//! Client settings.

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://connpass.com/api/v1";

/// `connpass-rs/<version> (+<repository>)`, fixed at compile time.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "connpass-rs/",
    env!("CARGO_PKG_VERSION"),
    " (+",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

/// Where to send requests and how to identify ourselves.
///
/// Deserializable so it can be embedded in an application's own config
/// file; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_user_agent_carries_version() {
        assert!(DEFAULT_USER_AGENT.starts_with(&format!("connpass-rs/{} (+", env!("CARGO_PKG_VERSION"))));
        assert!(DEFAULT_USER_AGENT.ends_with(')'));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"base_url": "http://localhost:3000"}"#).unwrap();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
