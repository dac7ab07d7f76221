//! Wire-facing types shared between the gateway client and the event feed.
//!
//! Field renames track the contest server's JSON exactly; everything the
//! client computes locally lives in the consuming crates instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CellColor, LabelTone, LanguageKind, SubmissionId, SubmissionStatus, Team};

/// The claimed solution attached to a language entry, as the catalog
/// endpoint reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSummary {
    #[serde(rename = "_id")]
    pub submission_id: SubmissionId,
    #[serde(rename = "user")]
    pub owner: String,
    #[serde(rename = "size")]
    pub byte_size: u64,
}

/// One catalog row. Index order in the catalog array is the board cell
/// order; the client never reorders entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub slug: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: LanguageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<SolutionSummary>,
    #[serde(rename = "link", default, skip_serializing_if = "Option::is_none")]
    pub detail_link: Option<String>,
}

impl LanguageEntry {
    /// Fill color for this entry's board cell.
    pub fn cell_color(&self) -> CellColor {
        if self.kind == LanguageKind::Unknown {
            return CellColor::Black;
        }
        match self.team {
            Some(team) => team.color(),
            None if self.available => CellColor::White,
            None => CellColor::Grey,
        }
    }

    pub fn label_tone(&self) -> LabelTone {
        if self.team.is_some() {
            LabelTone::Light
        } else {
            LabelTone::Dark
        }
    }

    /// Size of the claimed solution, when one exists.
    pub fn solution_bytes(&self) -> Option<u64> {
        self.solution.as_ref().map(|s| s.byte_size)
    }

    /// Cross-field consistency checks. Violations are logged by the catalog
    /// store rather than rejected, so a skewed server snapshot still renders.
    pub fn validate(&self) -> Result<(), EntryError> {
        if self.kind == LanguageKind::Unknown {
            if self.team.is_some() {
                return Err(EntryError::UnknownWithTeam(self.slug.clone()));
            }
            if self.solution.is_some() {
                return Err(EntryError::UnknownWithSolution(self.slug.clone()));
            }
        } else if self.team.is_some() && self.solution.is_none() {
            return Err(EntryError::ClaimedWithoutSolution(self.slug.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("unknown-kind language '{0}' carries a team")]
    UnknownWithTeam(String),
    #[error("unknown-kind language '{0}' carries a solution")]
    UnknownWithSolution(String),
    #[error("claimed language '{0}' has no solution")]
    ClaimedWithoutSolution(String),
}

/// Attempt body the user staged before submitting. Exactly one form is
/// carried per request; the HTTP layer owns the encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPayload {
    Code(String),
    File(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub language: String,
    pub payload: SubmitPayload,
}

/// Intake verdict for a submit call. `Rejected` is the server's in-band
/// refusal (still HTTP 200); transport failures surface as errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReply {
    Accepted { id: SubmissionId },
    Rejected { message: String },
}

/// Judge-side state of one attempt, as reported by the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(rename = "_id")]
    pub id: SubmissionId,
    pub status: SubmissionStatus,
}

/// Push frame from the reconciliation feed. A push never carries authoritative
/// state; it only tells the client what to go fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum BoardEvent {
    SubmissionUpdated {
        #[serde(rename = "_id")]
        id: SubmissionId,
    },
    CatalogUpdated,
}
