use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::Digest;
use crate::domain::{BatchResult, BatchStatus, ResidentFailure, Result};

/// One generated code in the persisted manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestEntry {
    pub ordinal: u32,
    pub name: String,
    pub code: String,
    pub file_name: String,
    /// SHA-256 of the PNG bytes written for this resident.
    pub png_sha256: String,
}

/// Codes summary for one batch, written next to the downloads as manifest.json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchManifest {
    pub schema_version: String,
    pub batch_id: Uuid,
    pub address: String,
    pub generated_at: DateTime<Utc>,
    pub status: BatchStatus,
    pub entries: Vec<ManifestEntry>,
    pub failures: Vec<ResidentFailure>,
    pub archive_file_name: Option<String>,
    pub archive_sha256: Option<String>,
}

impl BatchManifest {
    /// Build the manifest, encoding each artifact to PNG to checksum it.
    pub fn from_result(result: &BatchResult) -> Result<Self> {
        let entries = result
            .artifacts
            .iter()
            .map(|a| {
                Ok(ManifestEntry {
                    ordinal: a.ordinal,
                    name: a.name.clone(),
                    code: a.code.clone(),
                    file_name: a.file_name.clone(),
                    png_sha256: Digest::compute(&a.to_png()?).to_hex(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            schema_version: "1.0".to_string(),
            batch_id: result.batch_id,
            address: result.address.clone(),
            generated_at: result.generated_at,
            status: result.status(),
            entries,
            failures: result.failures.clone(),
            archive_file_name: None,
            archive_sha256: None,
        })
    }

    /// Move a generated entry to the failure list when its PNG could not be saved.
    ///
    /// Unknown ordinals are ignored. Status is recomputed from what remains.
    pub fn record_write_failure(&mut self, ordinal: u32, reason: impl Into<String>) {
        let Some(pos) = self.entries.iter().position(|e| e.ordinal == ordinal) else {
            return;
        };
        let entry = self.entries.remove(pos);
        self.failures.push(ResidentFailure {
            ordinal,
            name: entry.name,
            reason: reason.into(),
        });
        self.failures.sort_by_key(|f| f.ordinal);
        self.status = match (self.entries.is_empty(), self.failures.is_empty()) {
            (true, _) => BatchStatus::Failed,
            (false, true) => BatchStatus::Succeeded,
            (false, false) => BatchStatus::PartiallySucceeded,
        };
    }

    pub fn with_archive(mut self, file_name: &str, digest: &Digest) -> Self {
        self.archive_file_name = Some(file_name.to_string());
        self.archive_sha256 = Some(digest.to_hex());
        self
    }
}

/// Write manifest.json in pretty JSON format.
pub fn write_manifest_json(path: &Path, manifest: &BatchManifest) -> Result<()> {
    let content = serde_json::to_string_pretty(manifest)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Render the operator-facing pass/fail summary.
pub fn render_summary_md(manifest: &BatchManifest) -> String {
    let mut out = String::new();
    out.push_str("# QR Batch Summary\n\n");
    out.push_str(&format!("- address: {}\n", manifest.address));
    out.push_str(&format!(
        "- generated: {} of {}\n",
        manifest.entries.len(),
        manifest.entries.len() + manifest.failures.len()
    ));
    let verdict = match manifest.status {
        BatchStatus::Succeeded => "PASS",
        BatchStatus::PartiallySucceeded => "PASS (with failures)",
        BatchStatus::Failed => "FAIL",
    };
    out.push_str(&format!("- result: {}\n", verdict));
    if let Some(name) = &manifest.archive_file_name {
        out.push_str(&format!("- archive: `{}`\n", name));
    }
    out.push('\n');

    if !manifest.entries.is_empty() {
        out.push_str("## Codes\n");
        for e in &manifest.entries {
            out.push_str(&format!(
                "- **{}** (#{}): `{}` -> {}\n",
                e.name, e.ordinal, e.code, e.file_name
            ));
        }
        out.push('\n');
    }

    if !manifest.failures.is_empty() {
        out.push_str("## Failures\n");
        for f in &manifest.failures {
            out.push_str(&format!("- #{} {}: {}\n", f.ordinal, f.name, f.reason));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::run_batch;
    use crate::domain::{residents_from_names, GenerationOptions};
    use serde_json::json;

    fn sample_manifest() -> BatchManifest {
        let residents = residents_from_names(["Ana", "Beto"]);
        let result = run_batch(&residents, &GenerationOptions::new("Calle 10").with_prefix("g"))
            .expect("batch");
        BatchManifest::from_result(&result).expect("manifest")
    }

    #[test]
    fn manifest_schema_has_expected_keys() {
        let manifest = sample_manifest();
        let raw = serde_json::to_value(&manifest).expect("serialize manifest");
        let obj = raw.as_object().expect("manifest object");
        for key in [
            "schema_version",
            "batch_id",
            "address",
            "generated_at",
            "status",
            "entries",
            "failures",
        ] {
            assert!(obj.contains_key(key), "missing key: {key}");
        }
        assert_eq!(raw["status"], json!("succeeded"));
        assert_eq!(raw["entries"][0]["code"], json!("gana10"));
        assert_eq!(raw["entries"][1]["file_name"], json!("QR_Beto.png"));
    }

    #[test]
    fn manifest_png_checksums_match_downloads() {
        let residents = residents_from_names(["Ana"]);
        let result = run_batch(&residents, &GenerationOptions::new("Calle 10")).expect("batch");
        let manifest = BatchManifest::from_result(&result).expect("manifest");
        let png = result.artifacts[0].to_png().expect("png");
        assert_eq!(manifest.entries[0].png_sha256, Digest::compute(&png).to_hex());
    }

    #[test]
    fn summary_lists_codes_and_failures() {
        let mut manifest = sample_manifest();
        manifest.failures.push(ResidentFailure {
            ordinal: 3,
            name: "Carla".to_string(),
            reason: "data too long".to_string(),
        });
        manifest.status = BatchStatus::PartiallySucceeded;

        let md = render_summary_md(&manifest);
        assert!(md.contains("- generated: 2 of 3"));
        assert!(md.contains("PASS (with failures)"));
        assert!(md.contains("`gana10`"));
        assert!(md.contains("## Failures"));
        assert!(md.contains("#3 Carla: data too long"));
    }

    #[test]
    fn write_failure_moves_entry_to_failures() {
        let mut manifest = sample_manifest();
        manifest.record_write_failure(2, "permission denied");
        assert_eq!(manifest.status, BatchStatus::PartiallySucceeded);
        assert_eq!(manifest.entries.len(), 1);
        assert_eq!(manifest.entries[0].ordinal, 1);
        assert_eq!(manifest.failures[0].name, "Beto");
        assert_eq!(manifest.failures[0].reason, "permission denied");

        manifest.record_write_failure(9, "ignored");
        assert_eq!(manifest.failures.len(), 1);

        manifest.record_write_failure(1, "disk full");
        assert_eq!(manifest.status, BatchStatus::Failed);
        let ordinals: Vec<_> = manifest.failures.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, [1, 2]);
    }

    #[test]
    fn manifest_written_to_disk_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("manifest.json");
        let manifest = sample_manifest()
            .with_archive("QRs_Colonos_20260101_0000.zip", &Digest::compute(b"zip"));
        write_manifest_json(&path, &manifest).expect("write");

        let raw = std::fs::read_to_string(&path).expect("read");
        let back: BatchManifest = serde_json::from_str(&raw).expect("parse");
        assert_eq!(back, manifest);
    }
}
