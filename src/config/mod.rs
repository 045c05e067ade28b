mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub async fn load() -> Result<Config> {
    let (config_path, explicit) = match env::var("CONFIG_PATH") {
        Ok(path) => (path, true),
        Err(_) => (DEFAULT_CONFIG_PATH.to_string(), false),
    };

    let config = if explicit || Path::new(&config_path).exists() {
        load_from(&config_path).await?
    } else {
        info!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
        Config::default()
    };

    let config = apply_overrides(config, |key| env::var(key).ok());
    validate(&config)?;

    Ok(config)
}

pub async fn load_from(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

/// Applies `RELAY_*` overrides on top of the file configuration.
pub fn apply_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(origin) = lookup("RELAY_ALLOWED_ORIGIN") {
        config.server.allowed_origin = origin;
    }
    if let Some(url) = lookup("RELAY_UPSTREAM_URL") {
        config.upstream.base_url = url;
    }
    if let Some(model) = lookup("RELAY_MODEL") {
        config.upstream.model = model;
    }
    config
}

pub fn validate(config: &Config) -> Result<()> {
    if config.upstream.base_url.trim().is_empty() {
        return Err(Error::config("upstream.base_url must not be empty"));
    }
    if config.upstream.model.trim().is_empty() {
        return Err(Error::config("upstream.model must not be empty"));
    }
    if config.server.allowed_origin.trim().is_empty() {
        return Err(Error::config("server.allowed_origin must not be empty"));
    }
    Ok(())
}
