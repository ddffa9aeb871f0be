use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml},
    Figment,
};
use std::path::Path;

/// Default location of the TOML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from [`DEFAULT_CONFIG_PATH`] merged with the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration by merging a TOML file, an optional JSON sibling
    /// and `ARBWATCH_`-prefixed environment variables (`__` separates sections,
    /// e.g. `ARBWATCH_FEED__WS_URL`). Missing files fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let path = path.as_ref();
        let config: AppConfig = Self::base(path)
            .merge(Env::prefixed("ARBWATCH_").split("__"))
            .extract()?;

        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads configuration with a profile overlay (`Config.<profile>.toml`
    /// next to `path`).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        let path = path.as_ref();
        let overlay = path.with_file_name(format!("Config.{profile}.toml"));
        let config: AppConfig = Self::base(path)
            .merge(Toml::file(&overlay))
            .merge(Env::prefixed("ARBWATCH_").split("__"))
            .extract()?;

        tracing::debug!(path = %path.display(), profile, "Loaded configuration");
        Ok(config)
    }

    fn base(path: &Path) -> Figment {
        Figment::from(figment::providers::Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Json::file(path.with_extension("json")))
    }
}
