use super::*;
use shared::domain::{SubmissionId, Team};
use shared::protocol::{LanguageEntry, SolutionSummary};

fn entry(slug: &str, team: Option<Team>, solution_bytes: Option<u64>) -> LanguageEntry {
    LanguageEntry {
        slug: slug.to_string(),
        name: slug.to_uppercase(),
        kind: Default::default(),
        team,
        available: true,
        solution: solution_bytes.map(|byte_size| SolutionSummary {
            submission_id: SubmissionId::new(format!("sol-{slug}")),
            owner: "someone".to_string(),
            byte_size,
        }),
        detail_link: None,
    }
}

fn face(z: f64) -> FacePosition {
    FacePosition { x: 10.0, y: 20.0, z }
}

#[test]
fn culls_at_the_depth_threshold() {
    let entries = vec![entry("rust", None, None); 3];
    let faces = [face(CULL_DEPTH), face(CULL_DEPTH - 1e-6), face(1.5)];
    let placed = place_labels(entries.iter().zip(faces.iter().copied()));
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].index, 1);
}

#[test]
fn scale_grows_as_depth_shrinks() {
    let entries = vec![entry("rust", None, None); 2];
    let faces = [face(0.0), face(0.5)];
    let placed = place_labels(entries.iter().zip(faces.iter().copied()));
    assert_eq!(placed[0].scale, CULL_DEPTH * LABEL_SCALE);
    assert_eq!(placed[1].scale, (CULL_DEPTH - 0.5) * LABEL_SCALE);
    assert!(placed[0].scale > placed[1].scale);
}

#[test]
fn index_counts_culled_pairs() {
    let entries: Vec<_> = ["a", "b", "c"].iter().map(|s| entry(s, None, None)).collect();
    let faces = [face(0.0), face(2.0), face(0.0)];
    let placed = place_labels(entries.iter().zip(faces.iter().copied()));
    let indices: Vec<_> = placed.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 2]);
}

#[test]
fn zipping_stops_at_the_shorter_side() {
    let entries: Vec<_> = ["a", "b", "c"].iter().map(|s| entry(s, None, None)).collect();
    let faces = [face(0.0)];
    let placed = place_labels(entries.iter().zip(faces.iter().copied()));
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].name, "A");
}

#[test]
fn label_content_follows_the_entry() {
    let claimed = entry("rust", Some(Team::Blue), Some(42));
    let open = entry("ada", None, None);
    let faces = [face(0.0), face(0.0)];
    let placed = place_labels([&claimed, &open].into_iter().zip(faces.iter().copied()));
    assert_eq!(placed[0].name, "RUST");
    assert_eq!(placed[0].solution_bytes, Some(42));
    assert_eq!(placed[0].tone, shared::domain::LabelTone::Light);
    assert_eq!(placed[1].solution_bytes, None);
    assert_eq!(placed[1].tone, shared::domain::LabelTone::Dark);
    assert_eq!(placed[0].x, 10.0);
    assert_eq!(placed[0].y, 20.0);
}
