//! Application services

pub mod generator;

pub use generator::{GenerationReport, GeneratorService, OutputTarget};
