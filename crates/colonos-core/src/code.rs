//! Access-code derivation.
//!
//! A code is `prefix + normalized name + suffix`, where the suffix is either
//! the first digit run found in the address (the lot number) or the
//! resident's ordinal.
//!
//! With the lot number enabled and a digit run present, every resident of
//! the batch shares the same suffix and only the normalized name tells two
//! codes apart. Residents whose names normalize identically collide.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ColonosError, Result};

fn digit_run() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit-run pattern is valid"))
}

/// Lowercase the name and strip all whitespace, inner and outer.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// First maximal run of decimal digits in `address`, scanning left to right.
pub fn lot_number(address: &str) -> Option<&str> {
    digit_run().find(address).map(|m| m.as_str())
}

/// Derive the access code for one resident.
///
/// Fails with [`ColonosError::InvalidInput`] when `address` or `name` is
/// blank after trimming.
pub fn derive(
    address: &str,
    name: &str,
    ordinal: u32,
    prefix: &str,
    include_lot_number: bool,
) -> Result<String> {
    if address.trim().is_empty() {
        return Err(ColonosError::InvalidInput(
            "address must not be empty".to_string(),
        ));
    }
    if name.trim().is_empty() {
        return Err(ColonosError::InvalidInput(format!(
            "resident #{ordinal} has an empty name"
        )));
    }

    let base = format!("{prefix}{}", normalize_name(name));
    let suffix = if include_lot_number {
        lot_number(address.trim())
            .map(str::to_string)
            .unwrap_or_else(|| ordinal.to_string())
    } else {
        ordinal.to_string()
    };

    Ok(base + &suffix)
}
