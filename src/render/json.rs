//! JSON rendering for compositions.

use crate::error::{Error, Result};
use crate::model::Composition;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a composition to its persisted JSON shape.
pub fn to_json(composition: &Composition, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(composition),
        JsonFormat::Compact => serde_json::to_string(composition),
    };

    result.map_err(|e| Error::InvalidComposition(format!("JSON serialization error: {}", e)))
}
