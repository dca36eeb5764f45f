//! Region layout decoding: one row per line, comma-separated zone glyphs.

use crate::world::{City, LayoutError, ZoneKind};

/// Decode layout text into a city. Blank lines and empty tokens are skipped;
/// only the first character of each token is significant.
pub fn decode(text: &str) -> Result<City, LayoutError> {
    let rows: Vec<Vec<ZoneKind>> = text
        .lines()
        .map(|line| {
            line.trim_end_matches('\r')
                .split(',')
                .filter_map(|token| token.chars().next())
                .map(ZoneKind::from_glyph)
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect();
    City::from_rows(rows)
}
