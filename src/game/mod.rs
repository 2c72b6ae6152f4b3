//! Match state, turn structure and the action dispatcher

pub mod actions;
pub mod board;
pub mod combat;
pub mod config;
pub mod counters;
pub mod dispatch;
pub mod library;
pub mod logger;
pub mod phase;
pub mod relocate;
pub mod snapshot;
pub mod stack;
pub mod state;
pub mod turn;

pub use actions::{ActionKind, GameAction, WireAction};
pub use board::TokenSpec;
pub use combat::{AttackOutcome, CombatPass, CombatState};
pub use config::{GameFormat, MatchConfig, PhaseMode};
pub use dispatch::{replay, ActionResult};
pub use logger::{GameLogger, LogEntry, VerbosityLevel};
pub use phase::{CombatStep, Phase};
pub use relocate::MoveReport;
pub use snapshot::{MatchSnapshot, SnapshotError};
pub use stack::{PlayOutcome, PriorityOutcome, Resolution};
pub use state::{GameState, ZoneRef};
pub use turn::{EndStepPass, PhaseOutcome};
