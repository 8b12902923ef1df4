use crate::domain::ports::ConfigSource;
use crate::error::Result;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Prefix of environment variables overriding file settings, e.g.
/// `PAYGATE_PAYMENT_PAY_URL` for `payment_pay_url`.
pub const ENV_PREFIX: &str = "PAYGATE";

/// Gateway settings from an optional JSON file, overridden by `PAYGATE_*`
/// environment variables.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    inner: Config,
}

impl LayeredConfig {
    /// Loads the file (if given) and the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_sources(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Builds from an explicit environment source. Later sources win.
    pub fn from_sources(file: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            // An absent file leaves its keys to the environment or to `MissingConfig`.
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Json).required(false),
            );
        }
        let inner = builder.add_source(environment).build()?;
        Ok(Self { inner })
    }
}

impl ConfigSource for LayeredConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_string(key).ok()
    }
}
