//! Processor configuration, represented by [ProcessorConfig].
//!
//! By default, the config is created with opinionated default values, which can then be overwritten
//! by environment variables prefixed with `SABRE_` or `sabre.json` file.

use config::{Config, ConfigError, Environment, File};
use sabre_di::validator::ValidatorConfig;
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "SABRE";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "sabre.json";

/// Processor configuration.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct ProcessorConfig {
    /// Should a default tracing logger be installed when processing starts.
    pub install_tracing_logger: bool,
    /// Don't require dependencies injected through a provider or lazy handle to be resolvable.
    pub omit_wrapped_dependencies: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            install_tracing_logger: true,
            omit_wrapped_dependencies: false,
        }
    }
}

impl From<OptionalProcessorConfig> for ProcessorConfig {
    fn from(value: OptionalProcessorConfig) -> Self {
        let default = Self::default();
        Self {
            install_tracing_logger: value
                .install_tracing_logger
                .unwrap_or(default.install_tracing_logger),
            omit_wrapped_dependencies: value
                .omit_wrapped_dependencies
                .unwrap_or(default.omit_wrapped_dependencies),
        }
    }
}

impl ProcessorConfig {
    /// Reads the config from [CONFIG_FILE], if present, and the environment.
    pub fn init_from_environment() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalProcessorConfig>())
            .map(|config| config.into())
    }

    pub fn validator_config(&self) -> ValidatorConfig {
        ValidatorConfig {
            omit_wrapped_dependencies: self.omit_wrapped_dependencies,
        }
    }
}

#[derive(Deserialize)]
struct OptionalProcessorConfig {
    install_tracing_logger: Option<bool>,
    omit_wrapped_dependencies: Option<bool>,
}

#[cfg(test)]
mod tests {
    use crate::config::{OptionalProcessorConfig, ProcessorConfig};

    #[test]
    fn should_fill_missing_values_with_defaults() {
        let config: ProcessorConfig = OptionalProcessorConfig {
            install_tracing_logger: None,
            omit_wrapped_dependencies: Some(true),
        }
        .into();

        assert!(config.install_tracing_logger);
        assert!(config.omit_wrapped_dependencies);
        assert!(config.validator_config().omit_wrapped_dependencies);
    }

    #[test]
    fn should_be_strict_by_default() {
        assert!(!ProcessorConfig::default().omit_wrapped_dependencies);
    }
}
