use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier issued by the submission intake for one attempt. The client
/// never mints these; it only correlates pushes and pulls against them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("team index {0} is out of range (0..=2)")]
pub struct InvalidTeam(pub u8);

/// Contest team. The wire carries the bare index 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Team {
    Red,
    Blue,
    Green,
}

impl Team {
    pub const ALL: [Team; 3] = [Team::Red, Team::Blue, Team::Green];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn color(self) -> CellColor {
        match self {
            Team::Red => CellColor::Red,
            Team::Blue => CellColor::Blue,
            Team::Green => CellColor::Green,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Team::Red => "Red",
            Team::Blue => "Blue",
            Team::Green => "Green",
        }
    }
}

impl From<Team> for u8 {
    fn from(team: Team) -> u8 {
        team as u8
    }
}

impl TryFrom<u8> for Team {
    type Error = InvalidTeam;

    fn try_from(index: u8) -> Result<Self, InvalidTeam> {
        match index {
            0 => Ok(Team::Red),
            1 => Ok(Team::Blue),
            2 => Ok(Team::Green),
            other => Err(InvalidTeam(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageKind {
    #[default]
    Normal,
    /// Decorative cell that can never be claimed.
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Success,
    Failed,
    Error,
}

impl SubmissionStatus {
    /// Whether the judge is done with the attempt, one way or the other.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SubmissionStatus::Pending)
    }
}

/// Fill color of one board cell, derived from ownership and availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellColor {
    Red,
    Blue,
    Green,
    /// Unclaimed and currently open for attempts.
    White,
    /// Unclaimed and closed.
    Grey,
    /// Unclaimable decorative cell.
    Black,
}

impl CellColor {
    pub fn css(self) -> &'static str {
        match self {
            CellColor::Red => "red",
            CellColor::Blue => "blue",
            CellColor::Green => "green",
            CellColor::White => "white",
            CellColor::Grey => "grey",
            CellColor::Black => "black",
        }
    }
}

/// Text tone for a face label: claimed cells get light text on their team
/// color, unclaimed cells get dark text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelTone {
    Light,
    Dark,
}

impl LabelTone {
    pub fn css(self) -> &'static str {
        match self {
            LabelTone::Light => "white",
            LabelTone::Dark => "#222",
        }
    }
}
