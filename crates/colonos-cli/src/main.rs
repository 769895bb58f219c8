//! Colonos QR - resident access-code generator
//!
//! ## Commands
//!
//! - `generate`: derive codes, render QR images and write the individual
//!   PNGs, the bulk archive and a manifest to an output directory
//! - `codes`: preview the codes a batch would get, without rendering

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, Level};

use colonos_core::{
    assemble, render_summary_md, residents_from_names, run_batch, write_manifest_json,
    BatchManifest, BatchResult, GenerationOptions, ResidentInput, DEFAULT_CODE_PREFIX, METRICS,
};

#[derive(Parser)]
#[command(name = "colonos-qr")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate per-resident QR access codes for an address", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
struct BatchArgs {
    /// Address or lot shared by every resident (e.g. "Calle Girasol #203, Lote 15")
    #[arg(short, long, env = "COLONOS_ADDRESS")]
    address: String,

    /// Resident full name; repeat for each resident
    #[arg(short, long = "resident")]
    residents: Vec<String>,

    /// File with one resident name per line
    #[arg(long)]
    residents_file: Option<PathBuf>,

    /// Prefix shared by every code
    #[arg(short, long, env = "COLONOS_CODE_PREFIX", default_value = DEFAULT_CODE_PREFIX)]
    prefix: String,

    /// Use the resident's position instead of the address lot number as suffix
    #[arg(long)]
    no_lot_number: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate QR images, archive and manifest for one batch
    Generate {
        #[command(flatten)]
        batch: BatchArgs,

        /// Output directory
        #[arg(short, long, env = "COLONOS_OUT_DIR", default_value = "qr-out")]
        out: PathBuf,

        /// Skip the bulk archive
        #[arg(long)]
        no_archive: bool,
    },

    /// Print the codes a batch would get
    Codes {
        #[command(flatten)]
        batch: BatchArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    colonos_core::init_tracing(cli.json, level);

    let outcome = match cli.command {
        Commands::Generate {
            batch,
            out,
            no_archive,
        } => cmd_generate(&batch, &out, !no_archive),
        Commands::Codes { batch } => cmd_codes(&batch),
    };
    METRICS.flush();
    outcome
}

/// Gather names from flags and the optional file, then filter and number them.
fn collect_residents(args: &BatchArgs) -> Result<Vec<ResidentInput>> {
    let mut names = args.residents.clone();
    if let Some(path) = &args.residents_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read residents file {:?}", path))?;
        names.extend(content.lines().map(str::to_string));
    }
    Ok(residents_from_names(names))
}

fn options_from(args: &BatchArgs) -> GenerationOptions {
    GenerationOptions::new(args.address.trim())
        .with_prefix(args.prefix.clone())
        .with_lot_number(!args.no_lot_number)
}

fn cmd_codes(args: &BatchArgs) -> Result<()> {
    let residents = collect_residents(args)?;
    if residents.is_empty() {
        bail!("at least one resident is required");
    }
    let options = options_from(args);
    for r in &residents {
        let code = colonos_core::derive(
            &options.address,
            &r.name,
            r.ordinal,
            &options.code_prefix,
            options.include_lot_number,
        )?;
        println!("{}\t{}\t{}", r.ordinal, r.name, code);
    }
    Ok(())
}

fn cmd_generate(args: &BatchArgs, out: &Path, with_archive: bool) -> Result<()> {
    let residents = collect_residents(args)?;
    let options = options_from(args);
    let result = run_batch(&residents, &options).context("batch rejected")?;

    let manifest = write_outputs(&result, out, with_archive)?;
    print!("{}", render_summary_md(&manifest));

    if manifest.entries.is_empty() {
        bail!("no QR code could be generated ({} failures)", manifest.failures.len());
    }
    Ok(())
}

/// Write PNGs, the archive (unless disabled) and manifest.json into `out`.
///
/// A PNG that cannot be saved is logged and moved to the manifest's failures;
/// the remaining images, the archive and the manifest are still written. An
/// archive failure is logged and leaves the individual PNGs in place.
fn write_outputs(result: &BatchResult, out: &Path, with_archive: bool) -> Result<BatchManifest> {
    std::fs::create_dir_all(out).with_context(|| format!("create {:?}", out))?;

    let mut manifest = BatchManifest::from_result(result).context("build manifest")?;

    let mut written = 0usize;
    for artifact in &result.artifacts {
        let path = out.join(&artifact.file_name);
        let saved = artifact
            .to_png()
            .map_err(anyhow::Error::from)
            .and_then(|png| std::fs::write(&path, png).map_err(anyhow::Error::from));
        match saved {
            Ok(()) => written += 1,
            Err(e) => {
                error!(
                    ordinal = artifact.ordinal,
                    file_name = %artifact.file_name,
                    error = %e,
                    "failed to write QR image"
                );
                manifest.record_write_failure(artifact.ordinal, format!("write {:?}: {e}", path));
            }
        }
    }
    info!(count = written, dir = ?out, "wrote individual QR images");

    if with_archive && result.is_success() {
        match assemble(result.archive_entries()) {
            Ok(blob) => {
                let path = out.join(&blob.file_name);
                std::fs::write(&path, &blob.bytes).with_context(|| format!("write {:?}", path))?;
                manifest = manifest.with_archive(&blob.file_name, &blob.digest);
            }
            Err(e) => error!(error = %e, "archive assembly failed; individual images are still available"),
        }
    }

    let manifest_path = out.join("manifest.json");
    write_manifest_json(&manifest_path, &manifest)
        .with_context(|| format!("write {:?}", manifest_path))?;
    Ok(manifest)
}
