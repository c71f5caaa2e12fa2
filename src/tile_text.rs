//! Plain-text tile notation
//!
//! Tiles are written one row per line, using `0`-`3` for pixel values and
//! `.` as a readable alias for 0:
//!
//! ```text
//! # $00 solid border
//! 33333333
//! 3......3
//! 3.1111.3
//! 3.1221.3
//! 3.1221.3
//! 3.1111.3
//! 3......3
//! 33333333
//! ```
//!
//! Any other character (spaces, separators) is ignored. Rows shorter than 8
//! values are padded with 0, longer rows are cut at 8. Lines starting with
//! `#` are comments.

use thiserror::Error;

use crate::tile::{Tile, TileError, TILE_SIZE};

/// Error type for tile text parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileTextError {
    /// A single tile did not have exactly 8 rows
    #[error("tile needs 8 rows, got {rows}")]
    WrongRowCount { rows: usize },
    /// Sheet ended in the middle of a tile
    #[error("incomplete tile ending at line {line}: {rows} of 8 rows")]
    IncompleteTile { line: usize, rows: usize },
    /// No rows at all
    #[error("no tile rows found")]
    Empty,
    #[error(transparent)]
    Tile(#[from] TileError),
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Parse one row of pixel characters.
///
/// Returns `None` when the line contains no pixel characters.
pub fn parse_row(line: &str) -> Option<[u8; TILE_SIZE]> {
    let values: Vec<u8> = line
        .chars()
        .filter_map(|c| match c {
            '.' => Some(0),
            '0'..='3' => Some(c as u8 - b'0'),
            _ => None,
        })
        .collect();
    if values.is_empty() {
        return None;
    }

    let mut row = [0u8; TILE_SIZE];
    for (dst, &value) in row.iter_mut().zip(&values) {
        *dst = value;
    }
    Some(row)
}

/// Parse exactly one tile.
pub fn parse_tile(text: &str) -> Result<Tile, TileTextError> {
    let rows: Vec<[u8; TILE_SIZE]> =
        text.lines().filter(|line| !is_comment(line)).filter_map(parse_row).collect();
    if rows.len() != TILE_SIZE {
        return Err(TileTextError::WrongRowCount { rows: rows.len() });
    }
    Ok(Tile::from_rows(&rows)?)
}

/// Parse a sheet of tiles, grouping rows 8 at a time in file order.
pub fn parse_sheet(text: &str) -> Result<Vec<Tile>, TileTextError> {
    let mut tiles = Vec::new();
    let mut pending: Vec<[u8; TILE_SIZE]> = Vec::with_capacity(TILE_SIZE);
    let mut last_line = 0;

    for (index, line) in text.lines().enumerate() {
        if is_comment(line) {
            continue;
        }
        let Some(row) = parse_row(line) else {
            continue;
        };
        pending.push(row);
        last_line = index + 1;
        if pending.len() == TILE_SIZE {
            tiles.push(Tile::from_rows(&pending)?);
            pending.clear();
        }
    }

    if !pending.is_empty() {
        return Err(TileTextError::IncompleteTile { line: last_line, rows: pending.len() });
    }
    if tiles.is_empty() {
        return Err(TileTextError::Empty);
    }
    Ok(tiles)
}

/// Render a tile in tile notation, `.` for 0, one line per row.
pub fn format_tile(tile: &Tile) -> String {
    let mut out = String::with_capacity(TILE_SIZE * (TILE_SIZE + 1));
    for row in tile.rows() {
        for &value in row {
            out.push(if value == 0 { '.' } else { char::from(b'0' + value) });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BORDER: &str = "\
33333333
3......3
3.1111.3
3.1221.3
3.1221.3
3.1111.3
3......3
33333333
";

    #[test]
    fn test_parse_row_variants() {
        assert_eq!(parse_row("0123.321"), Some([0, 1, 2, 3, 0, 3, 2, 1]));
        assert_eq!(parse_row("1 2 3"), Some([1, 2, 3, 0, 0, 0, 0, 0]));
        assert_eq!(parse_row("3333333333"), Some([3; 8]));
        assert_eq!(parse_row("........"), Some([0; 8]));
        assert_eq!(parse_row("   "), None);
        assert_eq!(parse_row("abc"), None);
    }

    #[test]
    fn test_parse_tile() {
        let tile = parse_tile(BORDER).unwrap();
        assert_eq!(tile.get(0, 0), 3);
        assert_eq!(tile.get(1, 1), 0);
        assert_eq!(tile.get(3, 3), 2);
        assert_eq!(format_tile(&tile), BORDER);
    }

    #[test]
    fn test_parse_tile_wrong_row_count() {
        assert_eq!(parse_tile("3333\n3333\n"), Err(TileTextError::WrongRowCount { rows: 2 }));
        let nine = format!("{BORDER}11111111\n");
        assert_eq!(parse_tile(&nine), Err(TileTextError::WrongRowCount { rows: 9 }));
    }

    #[test]
    fn test_parse_sheet_with_comments() {
        let text = format!("# $00\n{BORDER}\n# $01 blank\n{}", "........\n".repeat(8));
        let tiles = parse_sheet(&text).unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[1], Tile::BLANK);
        assert_eq!(tiles[0], parse_tile(BORDER).unwrap());
    }

    #[test]
    fn test_parse_sheet_incomplete_tile() {
        let text = format!("{BORDER}\n1111\n2222\n");
        assert_eq!(
            parse_sheet(&text),
            Err(TileTextError::IncompleteTile { line: 11, rows: 2 })
        );
    }

    #[test]
    fn test_parse_sheet_empty() {
        assert_eq!(parse_sheet("# nothing here\n\n"), Err(TileTextError::Empty));
    }
}
