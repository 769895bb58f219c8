//! Bulk-download archive assembly.
//!
//! Each entry is the artifact's PNG stored under its file name and the
//! container is deflate-compressed. Entry timestamps are pinned so the same
//! artifacts always produce the same bytes (and the same checksum).
//!
//! Duplicate file names are last-write-wins: the entry keeps the position of
//! its first occurrence and the content of its last.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use chrono::{DateTime, Local, TimeZone};
use image::RgbImage;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::digest::Digest;
use crate::domain::{ColonosError, Result};
use crate::encoder::png_bytes;
use crate::naming::{archive_file_name, ZIP_MIME};

/// An assembled archive, ready for download.
#[derive(Debug, Clone)]
pub struct ArchiveBlob {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub digest: Digest,
    /// Entries actually written, after duplicate names collapsed.
    pub entries: usize,
}

impl ArchiveBlob {
    pub fn mime(&self) -> &'static str {
        ZIP_MIME
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Assemble `(image, file name)` pairs, naming the archive after the local time.
pub fn assemble<'a, I>(entries: I) -> Result<ArchiveBlob>
where
    I: IntoIterator<Item = (&'a RgbImage, &'a str)>,
{
    assemble_at(entries, &Local::now())
}

/// Assemble `(image, file name)` pairs, naming the archive after `at`.
pub fn assemble_at<'a, I, Tz>(entries: I, at: &DateTime<Tz>) -> Result<ArchiveBlob>
where
    I: IntoIterator<Item = (&'a RgbImage, &'a str)>,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut files: Vec<(&str, Vec<u8>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (image, name) in entries {
        let png = png_bytes(image)
            .map_err(|e| ColonosError::Archive(format!("encode {name}: {e}")))?;
        match index.get(name) {
            Some(&pos) => {
                tracing::warn!(file_name = %name, "duplicate archive entry, keeping the later image");
                files[pos].1 = png;
            }
            None => {
                index.insert(name, files.len());
                files.push((name, png));
            }
        }
    }

    let bytes = write_zip(&files)?;
    let blob = ArchiveBlob {
        file_name: archive_file_name(at),
        digest: Digest::compute(&bytes),
        entries: files.len(),
        bytes,
    };
    crate::obs::emit_archive_assembled(&blob.file_name, blob.entries, blob.len(), &blob.digest);
    crate::metrics::METRICS.inc_archives();
    Ok(blob)
}

fn write_zip(files: &[(&str, Vec<u8>)]) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, png) in files {
        writer.start_file(*name, options)?;
        writer
            .write_all(png)
            .map_err(|e| ColonosError::Archive(format!("write {name}: {e}")))?;
    }
    Ok(writer.finish()?.into_inner())
}
