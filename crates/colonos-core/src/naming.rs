//! File names for individual and bulk downloads.

use chrono::{DateTime, TimeZone};

use crate::domain::ResidentInput;

pub const PNG_MIME: &str = "image/png";
pub const ZIP_MIME: &str = "application/zip";

/// `QR_<name with spaces as underscores>.png`.
///
/// Residents with the same display name get the same file name; the
/// archive keeps the later one.
pub fn name_for(resident: &ResidentInput) -> String {
    format!("QR_{}.png", resident.name.replace(' ', "_"))
}

/// `QRs_Colonos_<YYYYMMDD_HHMM>.zip` for the given moment.
pub fn archive_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("QRs_Colonos_{}.zip", at.format("%Y%m%d_%H%M"))
}
