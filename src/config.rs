//! Configuration lookup for Sentinel
//!
//! A key/value view over layered sources: an optional TOML file, `SENTINEL_*`
//! environment variables, then programmatic overrides (highest precedence).
//!
//! Camel-case keys can be written with underscores in the environment:
//! `driversRoot` is read from `SENTINEL_DRIVERS_ROOT` or `SENTINEL_DRIVERSROOT`.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "conf/sentinel.toml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_FILE_ENV: &str = "SENTINEL_CONFIG";

/// Prefix for environment overrides (`SENTINEL_BROWSER=chrome`)
pub const ENV_PREFIX: &str = "SENTINEL";

/// Element timeout used when `timeout` is not configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Layered configuration
#[derive(Debug, Clone)]
pub struct Configuration {
    inner: config::Config,
}

/// Builder for [`Configuration`]
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    file: Option<(PathBuf, bool)>,
    env_prefix: Option<String>,
    overrides: Vec<(String, String)>,
}

impl ConfigurationBuilder {
    /// Read a configuration file; format follows the extension
    pub fn file<P: Into<PathBuf>>(mut self, path: P, required: bool) -> Self {
        self.file = Some((path.into(), required));
        self
    }

    /// Read environment variables with the given prefix
    pub fn environment<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Set a value that wins over every other source
    pub fn set<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Configuration> {
        let mut builder = config::Config::builder();

        if let Some((path, required)) = &self.file {
            debug!("Reading configuration file {}", path.display());
            builder = builder.add_source(config::File::from(path.as_path()).required(*required));
        }

        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(config::Environment::with_prefix(prefix));
        }

        for (key, value) in self.overrides {
            builder = builder.set_override(normalize_key(&key), value)?;
        }

        Ok(Configuration {
            inner: builder.build()?,
        })
    }
}

/// Keys are matched case-insensitively
fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

/// `driversRoot` as the environment source stores `SENTINEL_DRIVERS_ROOT`
fn snake_key(key: &str) -> String {
    let mut snake = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            snake.push('_');
        }
        snake.push(c.to_ascii_lowercase());
    }
    snake
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Load the default file (or `$SENTINEL_CONFIG`) plus the environment
    pub fn load() -> Result<Self> {
        let (path, required) = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        Self::builder()
            .file(path, required)
            .environment(ENV_PREFIX)
            .build()
    }

    /// Configuration made only of the given pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::builder(), |builder, (k, v)| builder.set(k, v))
            .build()
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.inner
            .get_string(key)
            .or_else(|_| self.inner.get_string(&normalize_key(key)))
            .or_else(|_| self.inner.get_string(&snake_key(key)))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    /// Value of a required key
    pub fn get_property(&self, key: &str) -> Result<String> {
        self.lookup(key)
            .ok_or_else(|| Error::missing_configuration(key))
    }

    /// Value of an optional key; empty values count as absent
    pub fn get_optional_property(&self, key: &str) -> Option<String> {
        self.lookup(key)
    }

    /// Boolean flag, `false` when absent or unparseable
    pub fn get_flag(&self, key: &str) -> bool {
        self.lookup(key)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "yes" | "1"))
            .unwrap_or(false)
    }

    /// Default element timeout from the `timeout` key, in seconds
    pub fn default_timeout(&self) -> Duration {
        let secs = match self.lookup("timeout") {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!("Invalid timeout '{}', using {} seconds", raw, DEFAULT_TIMEOUT_SECS);
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_required_and_optional_lookup() {
        let config = Configuration::from_pairs([("browser", "chrome"), ("download", "  ")]).unwrap();

        assert_eq!(config.get_property("browser").unwrap(), "chrome");
        assert!(matches!(
            config.get_property("os"),
            Err(Error::MissingRequiredConfiguration(key)) if key == "os"
        ));
        assert_eq!(config.get_optional_property("download"), None);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let config = Configuration::from_pairs([("saucelabsUserName", "sally")]).unwrap();
        assert_eq!(
            config.get_optional_property("saucelabsUserName").as_deref(),
            Some("sally")
        );
        assert_eq!(
            config.get_optional_property("SAUCELABSUSERNAME").as_deref(),
            Some("sally")
        );
    }

    #[test]
    fn test_default_timeout() {
        let unset = Configuration::from_pairs(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(unset.default_timeout(), Duration::from_secs(10));

        let set = Configuration::from_pairs([("timeout", "3")]).unwrap();
        assert_eq!(set.default_timeout(), Duration::from_secs(3));

        let bad = Configuration::from_pairs([("timeout", "soon")]).unwrap();
        assert_eq!(bad.default_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_flags() {
        let config = Configuration::from_pairs([("headless", "TRUE"), ("other", "nope")]).unwrap();
        assert!(config.get_flag("headless"));
        assert!(!config.get_flag("other"));
        assert!(!config.get_flag("missing"));
    }

    #[test]
    fn test_file_then_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "browser = \"firefox\"\nos = \"linux\"\ntimeout = 5").unwrap();

        let config = Configuration::builder()
            .file(file.path(), true)
            .set("browser", "chrome")
            .build()
            .unwrap();

        assert_eq!(config.get_property("browser").unwrap(), "chrome");
        assert_eq!(config.get_property("os").unwrap(), "linux");
        assert_eq!(config.default_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result = Configuration::builder()
            .file("/nonexistent/sentinel.toml", true)
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_camel_case_keys_from_environment() {
        std::env::set_var("SENTINELCFGTEST_DRIVERS_ROOT", "/opt/drivers");
        std::env::set_var("SENTINELCFGTEST_SAUCELABSACCESSKEY", "key-1");

        let config = Configuration::builder()
            .environment("SENTINELCFGTEST")
            .build()
            .unwrap();

        assert_eq!(config.get_property("driversRoot").unwrap(), "/opt/drivers");
        assert_eq!(
            config.get_optional_property("saucelabsAccessKey").as_deref(),
            Some("key-1")
        );
    }

    #[test]
    fn test_snake_key() {
        assert_eq!(snake_key("driversRoot"), "drivers_root");
        assert_eq!(snake_key("saucelabsUserName"), "saucelabs_user_name");
        assert_eq!(snake_key("browser"), "browser");
    }
}
