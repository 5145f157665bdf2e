//! Layered suite configuration.
//!
//! Sources, later wins: built-in defaults, an optional `planboard-e2e.toml`
//! next to the suite, then `PLANBOARD__`-prefixed environment variables
//! (`PLANBOARD__BASE_URL`, `PLANBOARD__DRIVER__HEADLESS`, ...).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use grid_bridge::BridgeConfig;
use page_driver::DriverConfig;
use response_watch::ListenerConfig;
use ui_wait::WaitConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub wait: WaitConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
}

fn default_base_url() -> Url {
    Url::parse("http://localhost:4200/").expect("literal url")
}

fn default_username() -> String {
    "qa@planboard.test".to_string()
}

fn default_password() -> String {
    "planboard-qa".to_string()
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_username(),
            password: default_password(),
            driver: DriverConfig::default(),
            wait: WaitConfig::default(),
            listener: ListenerConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl SuiteConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("planboard-e2e").required(false))
            .add_source(
                Environment::with_prefix("PLANBOARD")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:4200/");
        assert!(config.driver.headless);
        assert_eq!(config.listener.grace_window_ms, 5_000);
        assert_eq!(config.wait.poll_interval_ms, 100);
    }

    #[test]
    fn empty_sources_fall_back_to_defaults() {
        let config: SuiteConfig = Config::builder()
            .build()
            .and_then(Config::try_deserialize)
            .expect("defaults deserialize");
        assert_eq!(config.username, "qa@planboard.test");
        assert_eq!(config.bridge.input_retry_attempts, 10);
    }
}
