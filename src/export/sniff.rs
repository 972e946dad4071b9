//! Numeric-versus-text inference for cell values.

use crate::workbook::Cell;
use regex::Regex;
use std::sync::LazyLock;

/// Canonical decimal form: optional sign, digits with optional point, optional exponent.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("decimal pattern is valid")
});

/// Classifies a textual value as a numeric or text cell.
///
/// Only canonical decimal text becomes numeric; everything else, including
/// the empty string, is kept as text unchanged. Values that overflow `f64`
/// stay text.
pub fn sniff(text: &str) -> Cell {
    if DECIMAL.is_match(text) {
        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() {
                return Cell::Numeric(value);
            }
        }
    }

    Cell::Text(text.to_string())
}
