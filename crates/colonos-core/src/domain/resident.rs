//! Batch inputs: residents and per-batch generation options.

use serde::{Deserialize, Serialize};

/// Prefix applied to every code when the operator does not supply one.
pub const DEFAULT_CODE_PREFIX: &str = "girasol";

/// One resident as handed to the pipeline.
///
/// `ordinal` is the 1-based position in the filtered (non-empty) list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentInput {
    pub name: String,
    pub ordinal: u32,
}

impl ResidentInput {
    pub fn new(name: impl Into<String>, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            ordinal,
        }
    }
}

/// Options shared by every resident in one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub address: String,
    pub code_prefix: String,
    pub include_lot_number: bool,
}

impl GenerationOptions {
    /// Options for `address` with the default prefix and lot number enabled.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            code_prefix: DEFAULT_CODE_PREFIX.to_string(),
            include_lot_number: true,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.code_prefix = prefix.into();
        self
    }

    pub fn with_lot_number(mut self, include: bool) -> Self {
        self.include_lot_number = include;
        self
    }
}

/// Trim raw operator-entered names, drop empty ones and number the rest.
///
/// Ordinals follow the filtered order, so `["Ana", "", "Beto"]` yields
/// `Ana#1` and `Beto#2`.
pub fn residents_from_names<I, S>(names: I) -> Vec<ResidentInput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|raw| {
            let trimmed = raw.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .enumerate()
        .map(|(i, name)| ResidentInput::new(name, i as u32 + 1))
        .collect()
}
