//! Turn phases and combat steps

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro-phases of a turn, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Pregame,
    Begin,
    Main1,
    Attack,
    Block,
    Damage,
    Main2,
    End,
}

impl Phase {
    /// Next phase in the cycle; `None` after END (the turn swaps)
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Pregame => Some(Phase::Begin),
            Phase::Begin => Some(Phase::Main1),
            Phase::Main1 => Some(Phase::Attack),
            Phase::Attack => Some(Phase::Block),
            Phase::Block => Some(Phase::Damage),
            Phase::Damage => Some(Phase::Main2),
            Phase::Main2 => Some(Phase::End),
            Phase::End => None,
        }
    }

    pub fn is_combat(&self) -> bool {
        matches!(self, Phase::Attack | Phase::Block | Phase::Damage)
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Pregame => "PREGAME",
            Phase::Begin => "BEGIN",
            Phase::Main1 => "MAIN1",
            Phase::Attack => "ATTACK",
            Phase::Block => "BLOCK",
            Phase::Damage => "DAMAGE",
            Phase::Main2 => "MAIN2",
            Phase::End => "END",
        };
        write!(f, "{name}")
    }
}

/// Steps of the combat sub-state-machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatStep {
    #[default]
    None,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndOfCombat,
}

impl fmt::Display for CombatStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CombatStep::None => "NONE",
            CombatStep::DeclareAttackers => "DECLARE_ATTACKERS",
            CombatStep::DeclareBlockers => "DECLARE_BLOCKERS",
            CombatStep::CombatDamage => "COMBAT_DAMAGE",
            CombatStep::EndOfCombat => "END_OF_COMBAT",
        };
        write!(f, "{name}")
    }
}
