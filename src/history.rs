//! Match history
//!
//! Every committed action is appended here together with the phase and turn
//! transitions it caused. Replaying the recorded actions against the initial
//! state of a match reproduces it exactly (shuffles use the match's own
//! serialized RNG).

use crate::core::PlayerId;
use crate::game::{GameAction, Phase};
use serde::{Deserialize, Serialize};

/// Entries of the match history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    /// A committed player action
    Action {
        turn: u32,
        phase: Phase,
        action: GameAction,
    },

    /// Phase transition. `synthetic` marks transitions the engine took on the
    /// player's behalf (e.g. skipping BLOCK/DAMAGE when nobody attacked).
    PhaseChange {
        turn: u32,
        from: Phase,
        to: Phase,
        synthetic: bool,
    },

    /// Turn swap
    TurnChange {
        from_player: PlayerId,
        to_player: PlayerId,
        turn: u32,
        round: u32,
    },
}

/// Append-only history of a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionHistory {
    entries: Vec<HistoryEntry>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Move every entry of `other` onto the end of this history
    pub fn append(&mut self, other: &mut ActionHistory) {
        self.entries.append(&mut other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Recorded actions in commit order, for replay
    pub fn actions(&self) -> impl Iterator<Item = &GameAction> {
        self.entries.iter().filter_map(|entry| match entry {
            HistoryEntry::Action { action, .. } => Some(action),
            _ => None,
        })
    }

    /// Phase transitions in order, as (from, to, synthetic)
    pub fn phase_changes(&self) -> Vec<(Phase, Phase, bool)> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                HistoryEntry::PhaseChange {
                    from, to, synthetic, ..
                } => Some((*from, *to, *synthetic)),
                _ => None,
            })
            .collect()
    }
}
