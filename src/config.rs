// config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Process configuration, read from the environment once at startup.
///
/// - `GITHUB_WEBHOOK_SECRET`: shared secret configured on the GitHub webhook (required)
/// - `BIND_ADDRESS`: listen address, defaults to `0.0.0.0:3000`
#[derive(Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github_webhook_secret: String,
    pub bind_address: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("github_webhook_secret", &"[redacted]")
            .field("bind_address", &self.bind_address)
            .finish()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_environment(::config::Environment::default())
    }

    pub fn from_environment(environment: ::config::Environment) -> Result<Self> {
        let config: Config = ::config::Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .add_source(environment)
            .build()
            .and_then(|settings| settings.try_deserialize::<Config>())
            .context("Failed to read configuration")?;

        if config.github_webhook_secret.trim().is_empty() {
            anyhow::bail!("GITHUB_WEBHOOK_SECRET not set");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(vars: &[(&str, &str)]) -> ::config::Environment {
        let vars: ::config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ::config::Environment::default().source(Some(vars))
    }

    #[test]
    fn test_loads_secret_and_default_bind_address() {
        let config =
            Config::from_environment(environment(&[("GITHUB_WEBHOOK_SECRET", "hunter2")]))
                .unwrap();

        assert_eq!(config.github_webhook_secret, "hunter2");
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_bind_address_override() {
        let config = Config::from_environment(environment(&[
            ("GITHUB_WEBHOOK_SECRET", "hunter2"),
            ("BIND_ADDRESS", "127.0.0.1:8080"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let err = Config::from_environment(environment(&[])).unwrap_err();
        assert!(err.to_string().contains("GITHUB_WEBHOOK_SECRET"));
    }

    #[test]
    fn test_blank_secret_is_an_error() {
        assert!(Config::from_environment(environment(&[("GITHUB_WEBHOOK_SECRET", "  ")])).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config =
            Config::from_environment(environment(&[("GITHUB_WEBHOOK_SECRET", "hunter2")]))
                .unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
