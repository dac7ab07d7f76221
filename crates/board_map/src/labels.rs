use serde::Serialize;
use shared::domain::LabelTone;
use shared::protocol::LanguageEntry;

/// Faces at or beyond this depth face away from the viewer and get no label.
pub const CULL_DEPTH: f64 = 0.99915;
/// Converts remaining depth into the label's scale factor.
pub const LABEL_SCALE: f64 = 3000.0;

/// Projected position of one board face in screen space. `z` is depth;
/// smaller is closer to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FacePosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// One visible label, ready for the view layer to paint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelPlacement {
    /// Index of the pair in the input sequence, before culling.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub name: String,
    pub solution_bytes: Option<u64>,
    pub tone: LabelTone,
}

/// Places one label per entry/face pair, dropping faces at or beyond
/// [`CULL_DEPTH`]. A shorter face list ends the output early; excess faces
/// carry no entry to label.
pub fn place_labels<'a, I>(pairs: I) -> Vec<LabelPlacement>
where
    I: IntoIterator<Item = (&'a LanguageEntry, FacePosition)>,
{
    pairs
        .into_iter()
        .enumerate()
        .filter(|(_, (_, face))| face.z < CULL_DEPTH)
        .map(|(index, (entry, face))| LabelPlacement {
            index,
            x: face.x,
            y: face.y,
            scale: (CULL_DEPTH - face.z) * LABEL_SCALE,
            name: entry.name.clone(),
            solution_bytes: entry.solution_bytes(),
            tone: entry.label_tone(),
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/labels_tests.rs"]
mod tests;
