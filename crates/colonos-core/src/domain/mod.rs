//! Domain models for Colonos.
//!
//! - `ResidentInput` / `GenerationOptions`: what the operator submits
//! - `Artifact` / `BatchResult`: what one generation produces
//! - `ColonosError`: the error taxonomy

pub mod artifact;
pub mod error;
pub mod resident;

pub use artifact::{Artifact, BatchResult, BatchStatus, ResidentFailure};
pub use error::{ColonosError, Result};
pub use resident::{residents_from_names, GenerationOptions, ResidentInput, DEFAULT_CODE_PREFIX};
