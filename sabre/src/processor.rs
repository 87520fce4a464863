//! Core processing functionality.

use crate::config::ProcessorConfig;
use config::ConfigError;
use derive_more::Constructor;
use sabre_di::analyzer::Analyzer;
use sabre_di::metadata::ClassRegistry;
use sabre_di::model::InjectionContext;
use sabre_di::validator::Validator;
use sabre_di::{CollectingErrorReporter, ReportedError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Processing failed with {} error(s)", .0.len())]
    ProcessingFailed(Vec<ReportedError>),
    #[error("Error reading configuration: {0}")]
    Configuration(#[from] ConfigError),
}

/// Main entrypoint for processing. Analyzes all classes from a [ClassRegistry] and validates the
/// resulting [InjectionContext].
#[derive(Constructor)]
pub struct Processor {
    config: ProcessorConfig,
}

impl Processor {
    /// Creates a processor configured from the environment.
    pub fn from_environment() -> Result<Self, ProcessorError> {
        Ok(Self::new(ProcessorConfig::init_from_environment()?))
    }

    #[inline]
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Runs analysis and validation. All problems found are returned at once.
    pub fn process(&self, registry: &dyn ClassRegistry) -> Result<InjectionContext, ProcessorError> {
        if self.config.install_tracing_logger {
            install_tracing_logger();
        }

        let mut reporter = CollectingErrorReporter::default();

        info!("Analyzing classes...");
        let context = Analyzer::new(registry).analyze(&mut reporter);

        info!("Validating injection context...");
        Validator::new(self.config.validator_config()).validate(&context, registry, &mut reporter);

        let errors = reporter.into_errors();
        if errors.is_empty() {
            info!("Processing finished successfully.");
            Ok(context)
        } else {
            Err(ProcessorError::ProcessingFailed(errors))
        }
    }
}

fn install_tracing_logger() {
    // another global subscriber might already be installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
