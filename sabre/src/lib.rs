//! Dependency injection processor based on the [sabre_di] model.
//!
//! [sabre_di] provides the building blocks - class metadata, the analyzer and the validator. This
//! crate ties them together into a single [Processor](processor::Processor) run, driven by a
//! [ProcessorConfig](config::ProcessorConfig), and configures supporting infrastructure, e.g.
//! logging.

pub mod config;
pub mod processor;
