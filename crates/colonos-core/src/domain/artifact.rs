//! Batch outputs: per-resident artifacts, failures and the batch result.

use chrono::{DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encoder::{png_bytes, EncoderPath};

use super::error::Result;

/// One resident's rendered QR image plus the data it was derived from.
///
/// Never mutated after the orchestrator creates it.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub ordinal: u32,
    pub name: String,
    pub code: String,
    pub file_name: String,
    pub image: RgbImage,
    pub encoder_path: EncoderPath,
}

impl Artifact {
    /// PNG bytes for an individual download.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        png_bytes(&self.image)
    }
}

/// A resident the batch could not render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentFailure {
    pub ordinal: u32,
    pub name: String,
    pub reason: String,
}

/// Overall outcome of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Succeeded,
    PartiallySucceeded,
    Failed,
}

/// Everything one "generate" action produced.
///
/// Owned by the caller; holding it between actions and clearing it on reset
/// is the caller's job.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub batch_id: Uuid,
    pub address: String,
    pub generated_at: DateTime<Utc>,
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<ResidentFailure>,
}

impl BatchResult {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            address: address.into(),
            generated_at: Utc::now(),
            artifacts: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Success means at least one artifact, even with failures alongside.
    pub fn is_success(&self) -> bool {
        !self.artifacts.is_empty()
    }

    pub fn status(&self) -> BatchStatus {
        match (self.artifacts.is_empty(), self.failures.is_empty()) {
            (true, _) => BatchStatus::Failed,
            (false, true) => BatchStatus::Succeeded,
            (false, false) => BatchStatus::PartiallySucceeded,
        }
    }

    /// Number of residents attempted.
    pub fn attempted(&self) -> usize {
        self.artifacts.len() + self.failures.len()
    }

    /// `(image, file name)` pairs in ordinal order, ready for the archive.
    pub fn archive_entries(&self) -> impl Iterator<Item = (&RgbImage, &str)> {
        self.artifacts
            .iter()
            .map(|a| (&a.image, a.file_name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(ordinal: u32) -> Artifact {
        Artifact {
            ordinal,
            name: format!("Resident {ordinal}"),
            code: format!("x{ordinal}"),
            file_name: format!("QR_Resident_{ordinal}.png"),
            image: RgbImage::new(1, 1),
            encoder_path: EncoderPath::Fixed,
        }
    }

    fn failure(ordinal: u32) -> ResidentFailure {
        ResidentFailure {
            ordinal,
            name: "Bad".to_string(),
            reason: "data too long".to_string(),
        }
    }

    #[test]
    fn status_reflects_artifacts_and_failures() {
        let mut result = BatchResult::new("Calle 10");
        assert_eq!(result.status(), BatchStatus::Failed);
        assert!(!result.is_success());

        result.failures.push(failure(1));
        assert_eq!(result.status(), BatchStatus::Failed);

        result.artifacts.push(artifact(2));
        assert_eq!(result.status(), BatchStatus::PartiallySucceeded);
        assert!(result.is_success());

        result.failures.clear();
        assert_eq!(result.status(), BatchStatus::Succeeded);
    }

    #[test]
    fn archive_entries_follow_artifact_order() {
        let mut result = BatchResult::new("Calle 10");
        result.artifacts.push(artifact(1));
        result.artifacts.push(artifact(3));
        let names: Vec<_> = result.archive_entries().map(|(_, name)| name).collect();
        assert_eq!(names, ["QR_Resident_1.png", "QR_Resident_3.png"]);
    }
}
