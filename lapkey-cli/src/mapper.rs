//! Derive the matrix rows and columns from a parsed transcript and render
//! them as a firmware `keymap.rs`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use lapkey_core::Keycode;
use log::warn;

use crate::transcript::{Entry, MapError, Transcript};

/// FPC pins carrying the matrix lines, each list ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    pub rows: Vec<u8>,
    pub cols: Vec<u8>,
}

impl Matrix {
    /// Split the connected pins into rows and columns.
    ///
    /// Pins are visited from most to fewest connections; every pin still
    /// standing when visited claims its neighbours as columns. The pins left
    /// over are the rows.
    pub fn derive(entries: &[Entry]) -> Result<Self, MapError> {
        let mut adjacency: BTreeMap<u8, BTreeSet<u8>> = BTreeMap::new();
        for entry in entries {
            let (a, b) = entry.pins;
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }

        let mut by_degree: Vec<u8> = adjacency.keys().copied().collect();
        // Stable: ties keep ascending pin order.
        by_degree.sort_by_key(|pin| std::cmp::Reverse(adjacency[pin].len()));

        let mut remaining: BTreeSet<u8> = adjacency.keys().copied().collect();
        for pin in by_degree {
            if remaining.contains(&pin) {
                for neighbour in &adjacency[&pin] {
                    remaining.remove(neighbour);
                }
            }
        }

        let cols: BTreeSet<u8> = remaining
            .iter()
            .flat_map(|row| adjacency[row].iter().copied())
            .collect();

        if remaining.is_empty() {
            return Err(MapError::Empty("row"));
        }
        if cols.is_empty() {
            return Err(MapError::Empty("column"));
        }

        Ok(Self {
            rows: remaining.into_iter().collect(),
            cols: cols.into_iter().collect(),
        })
    }

    /// Pins missing from the run between the lowest and highest used pin.
    pub fn gaps(&self) -> Vec<u8> {
        let used: BTreeSet<u8> = self.rows.iter().chain(&self.cols).copied().collect();
        match (used.first(), used.last()) {
            (Some(&low), Some(&high)) => (low..=high).filter(|pin| !used.contains(pin)).collect(),
            _ => Vec::new(),
        }
    }

    fn place(&self, entry: &Entry) -> Option<(usize, usize)> {
        let (a, b) = entry.pins;
        let find = |row: u8, col: u8| {
            let r = self.rows.binary_search(&row).ok()?;
            let c = self.cols.binary_search(&col).ok()?;
            Some((r, c))
        };
        find(a, b).or_else(|| find(b, a))
    }
}

type Grid = Vec<Vec<Keycode>>;

/// Render the three classification maps and the wiring as Rust source.
pub fn render(transcript: &Transcript, matrix: &Matrix) -> Result<String, MapError> {
    let board = transcript.board;
    let fpc = board.fpc_map();
    let physical = |pin: u8, line: usize| -> Result<u8, MapError> {
        match usize::from(pin).checked_sub(1).and_then(|i| fpc.get(i)) {
            Some(&p) => Ok(p),
            None => Err(MapError::PinOutOfRange {
                line,
                pin,
                board: board.name(),
                count: fpc.len(),
            }),
        }
    };

    let empty: Grid = vec![vec![Keycode::No; matrix.cols.len()]; matrix.rows.len()];
    let (mut normal, mut modifier, mut overlay) = (empty.clone(), empty.clone(), empty);

    for entry in &transcript.entries {
        physical(entry.pins.0, entry.line)?;
        physical(entry.pins.1, entry.line)?;

        let Some((row, col)) = matrix.place(entry) else {
            warn!(
                "line {}: {} joins pins {} and {}, which are both columns; dropped",
                entry.line,
                entry.key.name(),
                entry.pins.0,
                entry.pins.1
            );
            continue;
        };

        let grid = if entry.fn_layer {
            &mut overlay
        } else if entry.key.is_modifier() || entry.key.is_fn() {
            &mut modifier
        } else {
            &mut normal
        };
        let cell = &mut grid[row][col];
        if cell.is_assigned() {
            warn!(
                "line {}: {} replaces {} at row {}, column {}",
                entry.line,
                entry.key.name(),
                cell.name(),
                row,
                col
            );
        }
        *cell = entry.key;
    }

    let row_pins = matrix
        .rows
        .iter()
        .map(|&pin| physical(pin, 0))
        .collect::<Result<Vec<_>, _>>()?;
    let col_pins = matrix
        .cols
        .iter()
        .map(|&pin| physical(pin, 0))
        .collect::<Result<Vec<_>, _>>()?;

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_source(
        &mut out,
        board.name(),
        matrix,
        [("normal", &normal), ("modifier", &modifier), ("overlay", &overlay)],
        &row_pins,
        &col_pins,
    );
    Ok(out)
}

fn write_source(
    out: &mut String,
    board: &str,
    matrix: &Matrix,
    maps: [(&str, &Grid); 3],
    row_pins: &[u8],
    col_pins: &[u8],
) -> std::fmt::Result {
    writeln!(out, "//! Keymap and wiring generated by `lapkey map` for a {}.", board)?;
    writeln!(out)?;
    writeln!(out, "use lapkey_core::{{Keycode, Keymap, Wiring}};")?;
    writeln!(out)?;
    writeln!(out, "pub const ROWS: usize = {};", matrix.rows.len())?;
    writeln!(out, "pub const COLS: usize = {};", matrix.cols.len())?;
    writeln!(out)?;
    writeln!(out, "/// Unassigned matrix position.")?;
    writeln!(out, "const ___: Keycode = Keycode::No;")?;
    writeln!(out)?;
    writeln!(out, "#[rustfmt::skip]")?;
    writeln!(out, "pub static KEYMAP: Keymap<ROWS, COLS> = Keymap {{")?;
    for (name, grid) in maps {
        writeln!(out, "    {}: [", name)?;
        for row in grid {
            let cells: Vec<String> = row
                .iter()
                .map(|key| match key {
                    Keycode::No => "___".to_string(),
                    key => format!("Keycode::{}", key.name()),
                })
                .collect();
            writeln!(out, "        [{}],", cells.join(", "))?;
        }
        writeln!(out, "    ],")?;
    }
    writeln!(out, "}};")?;
    writeln!(out)?;
    writeln!(out, "pub static WIRING: Wiring<ROWS, COLS> = Wiring {{")?;
    writeln!(out, "    // FPC {}", join(&matrix.rows))?;
    writeln!(out, "    row_pins: [{}],", join(row_pins))?;
    writeln!(out, "    // FPC {}", join(&matrix.cols))?;
    writeln!(out, "    col_pins: [{}],", join(col_pins))?;
    writeln!(out, "}};")?;
    Ok(())
}

fn join(pins: &[u8]) -> String {
    pins.iter()
        .map(|pin| pin.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::parse;
    use lapkey_core::Board;

    /// Two rows (1, 2) crossing three columns (5, 6, 7).
    const SMALL: &str = "\
Teensy2
A       1   5
B       1   6
C       1   7
D       2   5
LShift  2   6
Fn      2   7
MediaNext FN 1 5
";

    fn matrix_of(input: &str) -> Matrix {
        let transcript = parse(input, Board::Teensy2).unwrap();
        Matrix::derive(&transcript.entries).unwrap()
    }

    #[test]
    fn test_rows_and_columns() {
        let matrix = matrix_of(SMALL);
        assert_eq!(matrix.rows, vec![1, 2]);
        assert_eq!(matrix.cols, vec![5, 6, 7]);
    }

    #[test]
    fn test_busiest_pins_become_rows() {
        // Pin 9 reaches four pins, the others one or two.
        let input = "A 9 1\nB 9 2\nC 9 3\nD 9 4\nE 10 1\nF 10 2\n";
        let matrix = matrix_of(input);
        assert_eq!(matrix.rows, vec![9, 10]);
        assert_eq!(matrix.cols, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_gaps() {
        let matrix = Matrix {
            rows: vec![1, 2],
            cols: vec![5, 6],
        };
        assert_eq!(matrix.gaps(), vec![3, 4]);
        assert!(matrix_of(SMALL).gaps().contains(&3));
    }

    #[test]
    fn test_empty_transcript() {
        assert_eq!(Matrix::derive(&[]), Err(MapError::Empty("row")));
    }

    #[test]
    fn test_render_classifies_keys() {
        let transcript = parse(SMALL, Board::Teensy2).unwrap();
        let matrix = Matrix::derive(&transcript.entries).unwrap();
        let source = render(&transcript, &matrix).unwrap();

        assert!(source.contains("pub const ROWS: usize = 2;"));
        assert!(source.contains("pub const COLS: usize = 3;"));
        // normal, modifier and overlay maps, in that order
        let normal = source.find("[Keycode::A, Keycode::B, Keycode::C],").unwrap();
        let modifier = source.find("[___, Keycode::LShift, Keycode::Fn],").unwrap();
        let overlay = source.find("[Keycode::MediaNext, ___, ___],").unwrap();
        assert!(normal < modifier && modifier < overlay);
        assert!(source.contains("[Keycode::D, ___, ___],"));
    }

    #[test]
    fn test_render_translates_pins() {
        let transcript = parse(SMALL, Board::Teensy2).unwrap();
        let matrix = Matrix::derive(&transcript.entries).unwrap();
        let source = render(&transcript, &matrix).unwrap();

        let fpc = Board::Teensy2.fpc_map();
        assert!(source.contains(&format!("row_pins: [{}, {}],", fpc[0], fpc[1])));
        assert!(source.contains(&format!(
            "col_pins: [{}, {}, {}],",
            fpc[4], fpc[5], fpc[6]
        )));
    }

    #[test]
    fn test_pin_beyond_connector() {
        let transcript = parse("A 1 30\nB 2 30\n", Board::Teensy2).unwrap();
        let matrix = Matrix::derive(&transcript.entries).unwrap();
        assert_eq!(
            render(&transcript, &matrix),
            Err(MapError::PinOutOfRange {
                line: 1,
                pin: 30,
                board: "Teensy2",
                count: 24,
            })
        );
    }
}
