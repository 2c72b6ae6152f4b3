//! Phase advancement and turn swaps

use crate::core::{InstanceId, PlayerId};
use crate::game::{CombatStep, GameState, Phase};
use crate::history::HistoryEntry;
use crate::Result;
use serde::{Deserialize, Serialize};

/// What a phase pass did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseOutcome {
    pub from: Phase,
    pub to: Phase,
    /// True when the pass ended the turn
    pub turn_ended: bool,
    /// Cards drawn on entering BEGIN
    pub drawn: Vec<InstanceId>,
}

/// State of the two-step END negotiation after a priority pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndStepPass {
    /// Active player passed; the opponent now holds priority
    HandedOff,
    /// Opponent passed after the active player; the turn swapped
    TurnEnded,
    /// Out-of-order pass; nothing changed
    Ignored,
}

impl GameState {
    /// Move to the next phase in the cycle; from END the turn swaps
    pub fn pass_phase(&mut self) -> Result<PhaseOutcome> {
        let from = self.phase;
        match from.next() {
            Some(to) => {
                let drawn = self.enter_phase(to, false)?;
                Ok(PhaseOutcome {
                    from,
                    to,
                    turn_ended: false,
                    drawn,
                })
            }
            None => {
                let drawn = self.end_turn()?;
                Ok(PhaseOutcome {
                    from,
                    to: self.phase,
                    turn_ended: true,
                    drawn,
                })
            }
        }
    }

    /// Switch to `to` and run its entry effects. Returns the cards drawn
    /// (only BEGIN draws).
    pub(crate) fn enter_phase(&mut self, to: Phase, synthetic: bool) -> Result<Vec<InstanceId>> {
        let from = self.phase;
        self.phase = to;
        self.record_phase_change(from, to, synthetic);

        let mut drawn = Vec::new();
        match to {
            Phase::Pregame => {}
            Phase::Begin => {
                drawn = self.draw_cards(self.active_player, 1)?;
                self.priority_player = self.active_player;
            }
            Phase::Main1 => self.priority_player = self.active_player,
            Phase::Attack => self.begin_combat(),
            Phase::Block => {
                let defender = self.defending_idx();
                self.combat_state.step = CombatStep::DeclareBlockers;
                self.combat_state.expected_player = Some(self.players[defender].id);
                self.priority_player = defender;
            }
            Phase::Damage => {
                self.combat_state.step = CombatStep::CombatDamage;
                self.combat_state.expected_player = Some(self.active_player_id());
                self.priority_player = self.active_player;
            }
            Phase::Main2 => {
                if from.is_combat() {
                    self.reset_combat();
                }
                self.priority_player = self.active_player;
            }
            Phase::End => {
                self.end_step_priority_passed = false;
                self.priority_player = self.active_player;
            }
        }
        Ok(drawn)
    }

    /// Hand the turn to the other player and enter their BEGIN phase.
    ///
    /// `turn` goes up on every swap, so it counts individual player turns
    /// (half-rounds). `round` goes up only once both players have had a turn.
    pub(crate) fn end_turn(&mut self) -> Result<Vec<InstanceId>> {
        let from = self.active_player;
        let to = self.other_idx(from);

        self.players_played_this_round[from] = true;
        if self.players_played_this_round.iter().all(|&played| played) {
            self.round += 1;
            self.players_played_this_round = [false; 2];
        }
        self.turn += 1;
        self.active_player = to;
        self.end_step_priority_passed = false;
        self.reset_combat();

        let (from_player, to_player) = (self.players[from].id, self.players[to].id);
        self.history.log(HistoryEntry::TurnChange {
            from_player,
            to_player,
            turn: self.turn,
            round: self.round,
        });
        self.logger.turn(self.turn, self.round, to_player);

        self.enter_phase(Phase::Begin, false)
    }

    /// Priority pass in END with an empty stack
    pub(crate) fn end_step_pass(&mut self, player: PlayerId) -> Result<EndStepPass> {
        let passer = self.player_idx(player)?;
        let active = self.active_player;

        if passer == active {
            if self.end_step_priority_passed {
                return Ok(EndStepPass::Ignored);
            }
            self.end_step_priority_passed = true;
            self.priority_player = self.other_idx(active);
            return Ok(EndStepPass::HandedOff);
        }

        if self.end_step_priority_passed {
            self.end_turn()?;
            Ok(EndStepPass::TurnEnded)
        } else {
            Ok(EndStepPass::Ignored)
        }
    }
}
