//! Theme file parsing.
//!
//! The theme file is a sequence of fixed-size records: a NUL-padded name
//! field followed by twelve NUL-padded `RRR;GGG;BBB` color fields, one per
//! palette slot in declaration order. Lookup is a linear scan by exact
//! name match.

use anyhow::{bail, Context, Result};
use crossterm::style::Color;

use crate::Theme;

pub const THEME_NAME_LEN: usize = 32;
pub const COLOR_FIELD_LEN: usize = 12;
pub const COLOR_SLOTS: usize = 12;
pub const RECORD_LEN: usize = THEME_NAME_LEN + COLOR_FIELD_LEN * COLOR_SLOTS;

/// Scan `data` for the record named `name`. Returns `Ok(None)` when no
/// record matches, `Err` when a matching record is malformed.
pub fn lookup(data: &[u8], name: &str) -> Result<Option<Theme>> {
    for record in data.chunks_exact(RECORD_LEN) {
        let record_name = field_str(&record[..THEME_NAME_LEN]);
        if record_name != name {
            continue;
        }

        let mut colors = [Color::Reset; COLOR_SLOTS];
        for (slot, color) in colors.iter_mut().enumerate() {
            let at = THEME_NAME_LEN + slot * COLOR_FIELD_LEN;
            *color = parse_color(&record[at..at + COLOR_FIELD_LEN])
                .with_context(|| format!("theme '{name}': bad color in slot {slot}"))?;
        }

        return Ok(Some(Theme {
            name: name.to_string(),
            bg0: colors[0],
            bg1: colors[1],
            bg2: colors[2],
            fg0: colors[3],
            grey: colors[4],
            yellow: colors[5],
            blue: colors[6],
            red: colors[7],
            green: colors[8],
            orange: colors[9],
            aqua: colors[10],
            purple: colors[11],
        }));
    }
    Ok(None)
}

/// NUL-padded field to string slice.
fn field_str(field: &[u8]) -> &str {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    std::str::from_utf8(&field[..end]).unwrap_or("")
}

/// Parse one `RRR;GGG;BBB` field.
fn parse_color(field: &[u8]) -> Result<Color> {
    let text = field_str(field);
    let mut parts = text.split(';');
    let mut next = || -> Result<u8> {
        let part = match parts.next() {
            Some(p) => p,
            None => bail!("expected three ';'-separated components, got '{text}'"),
        };
        part.trim()
            .parse::<u8>()
            .with_context(|| format!("bad color component '{part}'"))
    };
    let (r, g, b) = (next()?, next()?, next()?);
    Ok(Color::Rgb { r, g, b })
}
