//! Pure geometry for the contest board: the occupancy mask, the hexagonal
//! lattice tiling, and label placement over projected face positions.
//!
//! Nothing here does I/O or holds state; every function is deterministic
//! over its inputs so the view layer can re-run them per frame.

pub mod labels;
pub mod lattice;
pub mod mask;

pub use labels::{place_labels, FacePosition, LabelPlacement, CULL_DEPTH, LABEL_SCALE};
pub use lattice::{tile, CellPolygon, ViewBox, LATTICE_COLUMNS, LATTICE_ROWS, VIEW_BOX};
pub use mask::{OccupancyMask, MaskError, BOARD_SHAPE};
