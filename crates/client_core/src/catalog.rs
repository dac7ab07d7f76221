//! Catalog snapshot store: pulls the full language list, derives the board
//! coloring and team counts, and publishes everything as one atomic unit.

use std::sync::Arc;

use shared::{
    domain::{CellColor, Team},
    protocol::LanguageEntry,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, warn};

use crate::{ClientEvent, ContestGateway};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog pull failed: {0}")]
    Transport(anyhow::Error),
}

/// Per-team claimed-cell tally, index-aligned with [`Team::ALL`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamCellCounts(pub [usize; 3]);

impl TeamCellCounts {
    pub fn count(&self, team: Team) -> usize {
        self.0[team.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    /// Share of claimed cells per team. `None` when nothing is claimed yet,
    /// so the score bar renders empty instead of dividing by zero.
    pub fn proportions(&self) -> Option<[f64; 3]> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.0.map(|count| count as f64 / total as f64))
    }
}

/// One immutable publication of the catalog. `face_colors` and
/// `cell_counts` are derived from `entries` at build time so every reader
/// sees one consistent view.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub entries: Vec<LanguageEntry>,
    pub cell_counts: TeamCellCounts,
    pub face_colors: Vec<CellColor>,
}

impl CatalogSnapshot {
    pub fn from_entries(entries: Vec<LanguageEntry>) -> Self {
        let mut counts = [0usize; 3];
        for entry in &entries {
            if let Some(team) = entry.team {
                counts[team.index()] += 1;
            }
        }
        let face_colors = entries.iter().map(LanguageEntry::cell_color).collect();
        Self {
            entries,
            cell_counts: TeamCellCounts(counts),
            face_colors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    dirty: bool,
}

/// Owns the published [`CatalogSnapshot`]. Readers clone an `Arc`; writers
/// replace the whole snapshot, so nobody observes a half-updated sequence.
pub struct CatalogStore {
    gateway: Arc<dyn ContestGateway>,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    refresh_state: Mutex<RefreshState>,
    events: broadcast::Sender<ClientEvent>,
}

impl CatalogStore {
    pub fn new(
        gateway: Arc<dyn ContestGateway>,
        events: broadcast::Sender<ClientEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
            refresh_state: Mutex::new(RefreshState::default()),
            events,
        })
    }

    /// Latest published snapshot.
    pub async fn current(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn cell_counts(&self) -> TeamCellCounts {
        self.snapshot.read().await.cell_counts
    }

    /// Pulls the catalog and publishes a fresh snapshot. Calls are
    /// coalesced: a trigger that lands while a pull is in flight marks the
    /// store dirty and returns, and the in-flight worker pulls once more
    /// after finishing, so one refresh always completes after the last
    /// trigger. On pull failure the previous snapshot stays published.
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        {
            let mut state = self.refresh_state.lock().await;
            if state.in_flight {
                state.dirty = true;
                debug!("catalog refresh already in flight, coalescing");
                return Ok(());
            }
            state.in_flight = true;
        }

        loop {
            let result = self.pull_once().await;
            let mut state = self.refresh_state.lock().await;
            if result.is_ok() && state.dirty {
                state.dirty = false;
                continue;
            }
            state.in_flight = false;
            state.dirty = false;
            return result;
        }
    }

    async fn pull_once(&self) -> Result<(), CatalogError> {
        let entries = match self.gateway.fetch_languages().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "catalog pull failed, keeping previous snapshot");
                return Err(CatalogError::Transport(err));
            }
        };

        for entry in &entries {
            if let Err(err) = entry.validate() {
                warn!(slug = %entry.slug, error = %err, "catalog entry fails consistency check");
            }
        }

        {
            let previous = self.snapshot.read().await;
            if !previous.is_empty() && previous.entries.len() != entries.len() {
                warn!(
                    previous = previous.entries.len(),
                    current = entries.len(),
                    "catalog length changed, face alignment may shift"
                );
            }
        }

        let snapshot = Arc::new(CatalogSnapshot::from_entries(entries));
        *self.snapshot.write().await = snapshot;
        let _ = self.events.send(ClientEvent::CatalogUpdated);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
