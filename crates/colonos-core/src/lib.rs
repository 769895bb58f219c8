//! Colonos Core Library
//!
//! Turns an address and a list of resident names into one access code and
//! one QR image per resident, and packs the batch into a checksummed archive.

pub mod archive;
pub mod batch;
pub mod code;
pub mod digest;
pub mod domain;
pub mod encoder;
pub mod metrics;
pub mod naming;
pub mod obs;
pub mod reporting;
pub mod telemetry;

pub use archive::{assemble, assemble_at, ArchiveBlob};
pub use batch::{run_batch, BatchOrchestrator};
pub use code::{derive, lot_number, normalize_name};
pub use digest::Digest;
pub use domain::{
    residents_from_names, Artifact, BatchResult, BatchStatus, ColonosError, GenerationOptions,
    ResidentFailure, ResidentInput, Result, DEFAULT_CODE_PREFIX,
};
pub use encoder::{
    png_bytes, EncodeOutcome, EncoderConfig, EncoderPath, ErrorCorrection, QrSymbolEncoder,
    Renderer, Sizing, SymbolEncoder, SymbolError, SymbolMatrix,
};
pub use naming::{archive_file_name, name_for, PNG_MIME, ZIP_MIME};
pub use reporting::{render_summary_md, write_manifest_json, BatchManifest, ManifestEntry};

pub use metrics::METRICS;
pub use obs::BatchSpan;
pub use telemetry::init_tracing;

/// Colonos version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
