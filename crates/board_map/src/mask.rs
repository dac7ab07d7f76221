use thiserror::Error;

/// Flag rows for the board outline. Each lattice row owns two mask rows
/// (upper wedges, then lower wedges) and each lattice column owns four
/// characters per mask row.
pub const BOARD_SHAPE: [&str; 14] = [
    "        *****           ",
    "        *****           ",
    "    *****************   ",
    "    *****************   ",
    "*********************   ",
    "*********************   ",
    "  ********************* ",
    "    *****************   ",
    "*********************   ",
    "*********************   ",
    "  ********************* ",
    "        *********       ",
    "      *********         ",
    "                        ",
];

pub const MASK_ROWS: usize = 14;
pub const MASK_WIDTH: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    #[error("mask has {0} rows, expected 14")]
    WrongRowCount(usize),
    #[error("mask row {row} is {width} characters wide, expected 24")]
    WrongRowWidth { row: usize, width: usize },
    #[error("mask row {row} contains '{found}' at column {col}, expected '*' or ' '")]
    InvalidCharacter { row: usize, col: usize, found: char },
}

/// Parsed occupancy flags. `true` means the half-cell at that mask position
/// is part of the board outline and gets a polygon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMask {
    cells: [[bool; MASK_WIDTH]; MASK_ROWS],
}

impl OccupancyMask {
    /// Parses `*`/space rows into flags, rejecting malformed shapes.
    pub fn parse(rows: &[&str]) -> Result<Self, MaskError> {
        if rows.len() != MASK_ROWS {
            return Err(MaskError::WrongRowCount(rows.len()));
        }
        let mut cells = [[false; MASK_WIDTH]; MASK_ROWS];
        for (row, text) in rows.iter().enumerate() {
            let width = text.chars().count();
            if width != MASK_WIDTH {
                return Err(MaskError::WrongRowWidth { row, width });
            }
            for (col, ch) in text.chars().enumerate() {
                cells[row][col] = match ch {
                    '*' => true,
                    ' ' => false,
                    found => return Err(MaskError::InvalidCharacter { row, col, found }),
                };
            }
        }
        Ok(Self { cells })
    }

    /// The mask for the contest board shipped with this crate. Built
    /// directly from the ASCII rows, so it cannot fail; tests assert it
    /// agrees with `parse(&BOARD_SHAPE)`.
    pub fn board() -> Self {
        let mut cells = [[false; MASK_WIDTH]; MASK_ROWS];
        for (row, text) in BOARD_SHAPE.iter().enumerate() {
            for (col, byte) in text.bytes().take(MASK_WIDTH).enumerate() {
                cells[row][col] = byte == b'*';
            }
        }
        Self { cells }
    }

    /// Whether the half-cell at (row, col) is filled. Out-of-range lookups
    /// are empty rather than a panic.
    pub fn filled(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Total number of filled half-cells.
    pub fn filled_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&f| f)
            .count()
    }
}

#[cfg(test)]
#[path = "tests/mask_tests.rs"]
mod tests;
