//! Match configuration
//!
//! The session collaborator picks a format and a phase mode when it creates
//! a match; everything else defaults from the format.

use serde::{Deserialize, Serialize};

/// Game format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameFormat {
    #[default]
    Standard,
    Commander,
}

impl GameFormat {
    pub fn starting_life(&self) -> i32 {
        match self {
            GameFormat::Standard => 20,
            GameFormat::Commander => 40,
        }
    }

    pub fn uses_commanders(&self) -> bool {
        matches!(self, GameFormat::Commander)
    }
}

/// How strictly plays go through the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMode {
    /// Non-land permanents go straight to the battlefield
    #[default]
    Relaxed,
    /// Every non-land spell uses the stack
    Strict,
}

/// Configuration for a single match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub format: GameFormat,
    pub phase_mode: PhaseMode,
    pub starting_life: i32,
    pub opening_hand_size: usize,
    pub min_deck_size: usize,
    /// Seed for library shuffles
    pub seed: u64,
}

impl MatchConfig {
    pub fn new(format: GameFormat) -> Self {
        MatchConfig {
            format,
            phase_mode: PhaseMode::default(),
            starting_life: format.starting_life(),
            opening_hand_size: 7,
            min_deck_size: 40,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_phase_mode(mut self, phase_mode: PhaseMode) -> Self {
        self.phase_mode = phase_mode;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(GameFormat::default())
    }
}
