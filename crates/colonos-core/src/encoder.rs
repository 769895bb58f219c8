//! QR symbol rendering.
//!
//! The bit-level QR algorithm lives behind [`SymbolEncoder`]; this module
//! only decides which configuration to ask for and turns the resulting
//! module matrix into an RGB raster.
//!
//! Attempt policy:
//! 1. Fixed preferred configuration (version 1, EC level M).
//! 2. If the payload does not fit, auto-sized version at the same EC level.
//!
//! Rasters smaller than the target size are upscaled by whole-number
//! nearest-neighbor replication so module edges stay crisp.

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::domain::{ColonosError, Result};

const DARK: Rgb<u8> = Rgb([0x00, 0x00, 0x00]);
const LIGHT: Rgb<u8> = Rgb([0xFF, 0xFF, 0xFF]);

/// Error-correction strength requested from the symbol encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    Low,
    Medium,
    Quartile,
    High,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::Low => qrcode::EcLevel::L,
            ErrorCorrection::Medium => qrcode::EcLevel::M,
            ErrorCorrection::Quartile => qrcode::EcLevel::Q,
            ErrorCorrection::High => qrcode::EcLevel::H,
        }
    }
}

/// How the encoder may size the symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// Exactly this symbol version; fails if the payload does not fit.
    Fixed(i16),
    /// Smallest version that fits the payload.
    Auto,
}

/// Square matrix of QR modules, row-major, `true` = dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl SymbolMatrix {
    pub fn new(width: usize, modules: Vec<bool>) -> Self {
        debug_assert_eq!(width * width, modules.len());
        Self { width, modules }
    }

    /// Modules per side, quiet zone excluded.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.width + x]
    }
}

/// Failure reported by a [`SymbolEncoder`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct SymbolError(pub String);

/// External QR-encoding capability.
pub trait SymbolEncoder: Send + Sync {
    fn encode(
        &self,
        text: &str,
        sizing: Sizing,
        level: ErrorCorrection,
    ) -> std::result::Result<SymbolMatrix, SymbolError>;
}

/// [`SymbolEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrSymbolEncoder;

impl SymbolEncoder for QrSymbolEncoder {
    fn encode(
        &self,
        text: &str,
        sizing: Sizing,
        level: ErrorCorrection,
    ) -> std::result::Result<SymbolMatrix, SymbolError> {
        let code = match sizing {
            Sizing::Fixed(version) => {
                qrcode::QrCode::with_version(text, qrcode::Version::Normal(version), level.into())
            }
            Sizing::Auto => qrcode::QrCode::with_error_correction_level(text, level.into()),
        }
        .map_err(|e| SymbolError(e.to_string()))?;

        let modules = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        Ok(SymbolMatrix::new(code.width(), modules))
    }
}

/// Rendering parameters. The defaults are the fixed preferred configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    pub version: i16,
    pub error_correction: ErrorCorrection,
    /// Pixels per module side.
    pub module_size: u32,
    /// Quiet zone width in modules.
    pub border: u32,
    /// Rasters below this side length are upscaled.
    pub target_min_size: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            version: 1,
            error_correction: ErrorCorrection::Medium,
            module_size: 12,
            border: 4,
            target_min_size: 400,
        }
    }
}

/// Which configuration produced a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncoderPath {
    Fixed,
    Auto,
}

/// Result of the two-step attempt policy.
#[derive(Debug, Clone)]
pub enum EncodeOutcome {
    FixedConfigSucceeded(RgbImage),
    AutoConfigSucceeded(RgbImage),
    Failed(String),
}

impl EncodeOutcome {
    /// Split into the raster and the path that produced it.
    pub fn into_result(self, code: &str) -> Result<(RgbImage, EncoderPath)> {
        match self {
            EncodeOutcome::FixedConfigSucceeded(img) => Ok((img, EncoderPath::Fixed)),
            EncodeOutcome::AutoConfigSucceeded(img) => Ok((img, EncoderPath::Auto)),
            EncodeOutcome::Failed(reason) => Err(ColonosError::Encoding {
                code: code.to_string(),
                reason,
            }),
        }
    }
}

/// Turns code strings into normalized QR rasters.
pub struct Renderer {
    encoder: Box<dyn SymbolEncoder>,
    config: EncoderConfig,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(Box::new(QrSymbolEncoder), EncoderConfig::default())
    }
}

impl Renderer {
    pub fn new(encoder: Box<dyn SymbolEncoder>, config: EncoderConfig) -> Self {
        Self { encoder, config }
    }

    /// Run the fixed-then-auto attempt policy for `code`.
    pub fn attempt(&self, code: &str) -> EncodeOutcome {
        let level = self.config.error_correction;
        match self
            .encoder
            .encode(code, Sizing::Fixed(self.config.version), level)
        {
            Ok(matrix) => return EncodeOutcome::FixedConfigSucceeded(self.rasterize(&matrix)),
            Err(e) => tracing::debug!(
                code = %code,
                version = self.config.version,
                reason = %e,
                "fixed configuration rejected payload, retrying auto-sized"
            ),
        }

        match self.encoder.encode(code, Sizing::Auto, level) {
            Ok(matrix) => EncodeOutcome::AutoConfigSucceeded(self.rasterize(&matrix)),
            Err(e) => EncodeOutcome::Failed(e.to_string()),
        }
    }

    /// Render `code`, surfacing any failure as [`ColonosError::Encoding`].
    pub fn encode(&self, code: &str) -> Result<RgbImage> {
        self.attempt(code).into_result(code).map(|(img, _)| img)
    }

    fn rasterize(&self, matrix: &SymbolMatrix) -> RgbImage {
        let module = self.config.module_size.max(1);
        let border = self.config.border;
        let side_modules = matrix.width() as u32 + 2 * border;
        let side = side_modules * module;

        let img = RgbImage::from_fn(side, side, |px, py| {
            let (mx, my) = (px / module, py / module);
            let inside = mx >= border
                && my >= border
                && mx < border + matrix.width() as u32
                && my < border + matrix.width() as u32;
            if inside && matrix.is_dark((mx - border) as usize, (my - border) as usize) {
                DARK
            } else {
                LIGHT
            }
        });

        upscale_to_target(img, self.config.target_min_size)
    }
}

/// Whole-number upscale factor that keeps `side * factor <= target`.
pub fn upscale_factor(side: u32, target: u32) -> u32 {
    if side == 0 || side >= target {
        1
    } else {
        target / side
    }
}

/// Nearest-neighbor replication up to (but not past) `target` pixels per side.
pub fn upscale_to_target(img: RgbImage, target: u32) -> RgbImage {
    let factor = upscale_factor(img.width(), target);
    if factor <= 1 {
        return img;
    }
    RgbImage::from_fn(img.width() * factor, img.height() * factor, |x, y| {
        *img.get_pixel(x / factor, y / factor)
    })
}

/// Encode a raster as PNG with deflate compression turned off.
pub fn png_bytes(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new_with_quality(&mut buf, CompressionType::Uncompressed, FilterType::NoFilter)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgb8)?;
    Ok(buf.into_inner())
}
