use std::fmt::Write as _;

use serde::Serialize;

use crate::mask::OccupancyMask;

pub const LATTICE_ROWS: usize = 7;
pub const LATTICE_COLUMNS: usize = 6;

/// SVG view box that frames the full tiled board.
pub const VIEW_BOX: ViewBox = ViewBox {
    width: 14.7,
    height: 15.6,
};

const ROW_ADVANCE: f64 = 2.366;
const ROW_SHEAR: f64 = -1.366;
const COLUMN_ADVANCE: f64 = 2.732;

/// Local vertex sets for one lattice cell, before the row/column transform.
/// Four wedges tile the upper mask row of the cell, two the lower.
const UPPER_WEDGES: [&[(f64, f64)]; 4] = [
    &[(0.5, 0.5), (1.0, 1.366), (0.0, 1.366)],
    &[(0.5, 0.5), (1.366, 0.0), (1.866, 0.866), (1.0, 1.366)],
    &[(1.366, 0.0), (2.366, 0.0), (1.866, 0.866)],
    &[(2.366, 0.0), (3.232, 0.5), (2.732, 1.366), (1.866, 0.866)],
];
const LOWER_WEDGES: [&[(f64, f64)]; 2] = [
    &[(0.0, 1.366), (1.0, 1.366), (1.0, 2.366), (0.0, 2.366)],
    &[
        (1.0, 1.366),
        (1.866, 0.866),
        (2.732, 1.366),
        (2.732, 2.366),
        (1.866, 2.866),
        (1.0, 2.366),
    ],
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBox {
    pub width: f64,
    pub height: f64,
}

/// One filled wedge polygon in board coordinates. `wedge` is 0..=3 for the
/// upper mask row of the cell and 4..=5 for the lower.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellPolygon {
    pub row: usize,
    pub col: usize,
    pub wedge: usize,
    pub points: Vec<(f64, f64)>,
}

impl CellPolygon {
    /// Vertices formatted for an SVG `points` attribute.
    pub fn svg_points(&self) -> String {
        let mut out = String::new();
        for (i, (x, y)) in self.points.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{x},{y}");
        }
        out
    }
}

/// Tiles the lattice, emitting one polygon per filled half-cell. Output
/// order is row-major, then column, then wedge index; two runs over the
/// same mask produce identical output.
pub fn tile(mask: &OccupancyMask) -> Vec<CellPolygon> {
    let mut polygons = Vec::new();
    for row in 0..LATTICE_ROWS {
        let dy = row as f64 * ROW_ADVANCE;
        let dx_row = if row % 2 == 1 { ROW_SHEAR } else { 0.0 };
        for col in 0..LATTICE_COLUMNS {
            let dx = dx_row + col as f64 * COLUMN_ADVANCE;
            for (i, vertices) in UPPER_WEDGES.iter().enumerate() {
                if mask.filled(row * 2, col * 4 + i) {
                    polygons.push(CellPolygon {
                        row,
                        col,
                        wedge: i,
                        points: translate(vertices, dx, dy),
                    });
                }
            }
            for (i, vertices) in LOWER_WEDGES.iter().enumerate() {
                if mask.filled(row * 2 + 1, col * 4 + i) {
                    polygons.push(CellPolygon {
                        row,
                        col,
                        wedge: UPPER_WEDGES.len() + i,
                        points: translate(vertices, dx, dy),
                    });
                }
            }
        }
    }
    polygons
}

fn translate(vertices: &[(f64, f64)], dx: f64, dy: f64) -> Vec<(f64, f64)> {
    vertices.iter().map(|&(x, y)| (x + dx, y + dy)).collect()
}

#[cfg(test)]
#[path = "tests/lattice_tests.rs"]
mod tests;
