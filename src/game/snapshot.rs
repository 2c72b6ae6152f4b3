//! Match snapshots for save and resume
//!
//! A snapshot is the full match state plus the actions recorded so far.
//! The state alone is enough to resume; the action list lets a caller that
//! also kept the initial state verify it by replay.

use crate::core::CardLookup;
use crate::game::dispatch::replay;
use crate::game::{GameAction, GameState};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// The complete match state at the time of the snapshot
    pub game_state: GameState,

    /// Turn number when this snapshot was created
    pub turn_number: u32,

    /// Every action committed before the snapshot, in order
    pub actions: Vec<GameAction>,
}

impl MatchSnapshot {
    /// Snapshot a match, taking the action list from its history
    pub fn capture(game: &GameState) -> Self {
        MatchSnapshot {
            game_state: game.clone(),
            turn_number: game.turn,
            actions: game.history.actions().cloned().collect(),
        }
    }

    /// Save this snapshot to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SnapshotError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        std::fs::write(path.as_ref(), json).map_err(|e| SnapshotError::Io(e.to_string()))?;

        Ok(())
    }

    /// Load a snapshot from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let json =
            std::fs::read_to_string(path.as_ref()).map_err(|e| SnapshotError::Io(e.to_string()))?;

        let snapshot: MatchSnapshot = serde_json::from_str(&json)
            .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;

        snapshot
            .game_state
            .validate()
            .map_err(|e| SnapshotError::InvalidState(e.to_string()))?;

        Ok(snapshot)
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Replay the recorded actions on `initial` and check the result lands
    /// on the same board as the saved state
    pub fn verify_against(
        &self,
        initial: &GameState,
        catalog: &dyn CardLookup,
    ) -> Result<(), SnapshotError> {
        let replayed = replay(initial, catalog, &self.actions)
            .map_err(|e| SnapshotError::InvalidState(format!("replay failed: {e}")))?;

        let expected = serde_json::to_value(&self.game_state.players)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        let actual = serde_json::to_value(&replayed.players)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        if expected != actual
            || replayed.phase != self.game_state.phase
            || replayed.turn != self.game_state.turn
        {
            return Err(SnapshotError::InvalidState(
                "replayed actions do not reproduce the saved state".to_string(),
            ));
        }
        Ok(())
    }

    /// Resume play from the saved state
    pub fn into_game_state(self) -> GameState {
        self.game_state
    }
}

/// Errors that can occur during snapshot operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialization(String),

    #[error("Failed to deserialize snapshot: {0}")]
    Deserialization(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid snapshot state: {0}")]
    InvalidState(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefId, CardDefinition, CardInstance, InstanceId, PlayerId};
    use crate::game::{ActionKind, MatchConfig};
    use crate::loader::CardCatalog;

    fn setup() -> (GameState, CardCatalog) {
        let mut catalog = CardCatalog::new();
        catalog.insert(CardDefinition::new("forest", "Forest", "Basic Land — Forest"));

        let mut game = GameState::new_two_player(
            "snap",
            (PlayerId::new(0), "Alice"),
            (PlayerId::new(1), "Bob"),
            &MatchConfig::default().with_seed(3),
        );
        for n in 1..=10 {
            game.players[0].zones.library.push(CardInstance::new(
                InstanceId::new(n),
                CardDefId::new("forest"),
                PlayerId::new(0),
            ));
        }
        (game, catalog)
    }

    #[test]
    fn test_save_load_and_verify() {
        let (initial, catalog) = setup();
        let mut game = initial.clone();
        let p0 = PlayerId::new(0);
        for kind in [ActionKind::ShuffleLibrary, ActionKind::PassPhase, ActionKind::PassPhase] {
            game.process_action(&catalog, &GameAction::new(p0, kind)).unwrap();
        }

        let dir = std::env::temp_dir().join(format!("mtg-snapshot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("match.json");

        let snapshot = MatchSnapshot::capture(&game);
        assert_eq!(snapshot.action_count(), 3);
        snapshot.save_to_file(&path).unwrap();

        let loaded = MatchSnapshot::load_from_file(&path).unwrap();
        assert_eq!(loaded.turn_number, game.turn);
        loaded.verify_against(&initial, &catalog).unwrap();

        let resumed = loaded.into_game_state();
        assert_eq!(resumed.players[0].zones.hand.ids(), game.players[0].zones.hand.ids());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_verify_detects_divergence() {
        let (initial, catalog) = setup();
        let mut game = initial.clone();
        game.process_action(
            &catalog,
            &GameAction::new(PlayerId::new(0), ActionKind::PassPhase),
        )
        .unwrap();

        let mut snapshot = MatchSnapshot::capture(&game);
        snapshot.actions.clear();
        assert!(snapshot.verify_against(&initial, &catalog).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            MatchSnapshot::load_from_file("/nonexistent/snapshot.json"),
            Err(SnapshotError::Io(_))
        ));
    }
}
