//! Action dispatch
//!
//! `process_action` runs the handler against a working copy of the state and
//! commits it only when the handler succeeds, so a rejected action never
//! leaves a half-applied state behind. The working copy starts with an empty
//! history; its entries are appended to the committed history on success.

use crate::core::{CardLookup, InstanceId, PlayerId};
use crate::game::actions::*;
use crate::game::board::TokenSpec;
use crate::game::combat::CombatPass;
use crate::game::stack::PriorityOutcome;
use crate::game::turn::EndStepPass;
use crate::game::{CombatStep, GameState, Phase};
use crate::history::HistoryEntry;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured result relayed to subscribers after a committed action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub action: String,
    pub player_id: PlayerId,
    /// Action-specific fields
    pub details: Value,
}

impl GameState {
    /// Apply one action. `Ok(None)` means the action was accepted but had
    /// nothing to report (e.g. a preview outside its step).
    pub fn process_action(
        &mut self,
        catalog: &dyn CardLookup,
        action: &GameAction,
    ) -> Result<Option<ActionResult>> {
        let player_idx = self.player_idx(action.player_id)?;

        let committed = std::mem::take(&mut self.history);
        let mut working = self.clone();
        self.history = committed;
        working.history.log(HistoryEntry::Action {
            turn: working.turn,
            phase: working.phase,
            action: action.clone(),
        });

        let details = working.apply_action(catalog, player_idx, action)?;

        let subject = action.kind.subject().map(|id| id.to_string());
        working
            .logger
            .action(action.player_id, action.action_type(), subject.as_deref());

        let mut recorded =
            std::mem::replace(&mut working.history, std::mem::take(&mut self.history));
        working.history.append(&mut recorded);
        *self = working;
        Ok(details.map(|details| ActionResult {
            action: action.action_type().to_string(),
            player_id: action.player_id,
            details,
        }))
    }

    /// Parse a wire action and apply it
    pub fn process_wire_action(
        &mut self,
        catalog: &dyn CardLookup,
        raw: Value,
    ) -> Result<Option<ActionResult>> {
        let action = GameAction::from_value(raw)?;
        self.process_action(catalog, &action)
    }

    fn apply_action(
        &mut self,
        catalog: &dyn CardLookup,
        player_idx: usize,
        action: &GameAction,
    ) -> Result<Option<Value>> {
        let actor = action.player_id;
        let details = match &action.kind {
            ActionKind::PassPhase => {
                let outcome = self.pass_phase()?;
                json!({
                    "from": outcome.from,
                    "to": outcome.to,
                    "turn_ended": outcome.turn_ended,
                    "drawn": outcome.drawn,
                    "active_player": self.active_player_id(),
                })
            }

            ActionKind::DeclareAttackers(p) => {
                let outcome = self.declare_attackers(catalog, actor, &p.attacking_creatures)?;
                json!(outcome)
            }
            ActionKind::DeclareBlockers(p) => {
                let blockers = self.declare_blockers(actor, &p.blocking_assignments)?;
                json!({ "blocking_assignments": blockers })
            }
            ActionKind::PreviewAttackers(p) => {
                if self.phase != Phase::Attack
                    || self.combat_state.step != CombatStep::DeclareAttackers
                {
                    return Ok(None);
                }
                json!({ "pending_attackers": self.preview_attackers(&p.attacking_creatures) })
            }
            ActionKind::PreviewBlockers(p) => {
                if self.phase != Phase::Block
                    || self.combat_state.step != CombatStep::DeclareBlockers
                {
                    return Ok(None);
                }
                json!({ "pending_blockers": self.preview_blockers(&p.blocking_assignments) })
            }
            ActionKind::CombatDamage => {
                self.resolve_combat_damage(actor)?;
                json!({ "phase": self.phase })
            }

            ActionKind::PlayCard(p) => {
                json!(self.play_card(catalog, actor, p.unique_id, p.source_zone, p.face_down)?)
            }
            ActionKind::ResolveStack => json!(self.resolve_stack(catalog)?),
            ActionKind::ResolveAllStack => {
                json!({ "resolved": self.resolve_all_stack(catalog)? })
            }
            ActionKind::PassPriority => match self.pass_priority(catalog, actor)? {
                PriorityOutcome::Passed
                | PriorityOutcome::Combat(CombatPass::Idle)
                | PriorityOutcome::EndStep {
                    pass: EndStepPass::Ignored,
                } => return Ok(None),
                outcome => json!(outcome),
            },

            ActionKind::MoveCard(p) => json!(self.move_card(
                actor,
                p.unique_id,
                p.source_player,
                p.source_zone,
                p.destination_player,
                p.destination_zone,
                p.position,
            )?),
            ActionKind::DrawCard(p) => json!({ "drawn": self.draw_cards(player_idx, p.count)? }),
            ActionKind::Mill(p) => json!({ "milled": self.mill(player_idx, p.count)? }),
            ActionKind::TapCard(p) => json!({
                "unique_id": p.unique_id,
                "tapped": self.tap_card(p.unique_id, p.tapped)?,
            }),
            ActionKind::UntapAll => json!({ "untapped": self.untap_all(player_idx) }),
            ActionKind::ShuffleLibrary => {
                self.shuffle_library(player_idx);
                json!({ "library_size": self.players[player_idx].zones.library.len() })
            }
            ActionKind::Mulligan => {
                let drawn = self.mulligan(player_idx, self.opening_hand_size)?;
                json!({ "drawn": drawn, "mulligans": self.players[player_idx].mulligans })
            }
            ActionKind::LookAtTop(p) => json!({ "cards": self.look_at_top(player_idx, p.count)? }),
            ActionKind::RevealTop(p) => json!({ "cards": self.reveal_top(player_idx, p.count)? }),
            ActionKind::RevealCard(p) => {
                self.reveal_card(actor, p.unique_id, p.source_zone)?;
                json!({ "unique_id": p.unique_id })
            }

            ActionKind::AddCounter(p) => counter_result(
                p.unique_id,
                &p.counter_name,
                self.add_card_counter(catalog, p.unique_id, p.counter_name.clone(), p.amount)?,
            ),
            ActionKind::RemoveCounter(p) => {
                if p.amount < 0 {
                    return Err(MtgError::InvalidInput(
                        "remove_counter amount must not be negative".to_string(),
                    ));
                }
                counter_result(
                    p.unique_id,
                    &p.counter_name,
                    self.add_card_counter(catalog, p.unique_id, p.counter_name.clone(), -p.amount)?,
                )
            }
            ActionKind::SetCounter(p) => counter_result(
                p.unique_id,
                &p.counter_name,
                self.set_card_counter(catalog, p.unique_id, p.counter_name.clone(), p.value)?,
            ),
            ActionKind::AddPlayerCounter(p) => {
                let target = p.target_player.unwrap_or(actor);
                let value = self.add_player_counter(target, p.counter_name.clone(), p.amount)?;
                json!({ "target_player": target, "counter_name": p.counter_name, "value": value })
            }
            ActionKind::SetPlayerCounter(p) => {
                let target = p.target_player.unwrap_or(actor);
                let value = self.set_player_counter(target, p.counter_name.clone(), p.value)?;
                json!({ "target_player": target, "counter_name": p.counter_name, "value": value })
            }
            ActionKind::ModifyLife(p) => json!({
                "target_player": p.target_player,
                "life": self.modify_life(p.target_player, p.amount)?,
            }),
            ActionKind::SetLife(p) => json!({
                "target_player": p.target_player,
                "life": self.set_life(p.target_player, p.life)?,
            }),
            ActionKind::AdjustCommanderTax(p) => {
                let target = p.target_player.unwrap_or(actor);
                json!({
                    "target_player": target,
                    "commander_tax": self.adjust_commander_tax(target, p.amount)?,
                })
            }
            ActionKind::AddKeyword(p) => json!({
                "unique_id": p.unique_id,
                "changed": self.add_keyword(p.unique_id, &p.keyword)?,
            }),
            ActionKind::RemoveKeyword(p) => json!({
                "unique_id": p.unique_id,
                "changed": self.remove_keyword(p.unique_id, &p.keyword)?,
            }),
            ActionKind::AddType(p) => json!({
                "unique_id": p.unique_id,
                "changed": self.add_type(p.unique_id, &p.card_type)?,
            }),
            ActionKind::RemoveType(p) => json!({
                "unique_id": p.unique_id,
                "changed": self.remove_type(p.unique_id, &p.card_type)?,
            }),
            ActionKind::SetPowerToughness(p) => {
                self.set_power_toughness(p.unique_id, p.power.clone(), p.toughness.clone())?;
                let card = self.card(p.unique_id)?;
                json!({
                    "unique_id": p.unique_id,
                    "power": card.current_power,
                    "toughness": card.current_toughness,
                })
            }
            ActionKind::FlipCard(p) => json!({
                "unique_id": p.unique_id,
                "current_face": self.flip_card(catalog, p.unique_id)?,
            }),
            ActionKind::RevealFaceDown(p) => {
                self.reveal_face_down(p.unique_id)?;
                json!({ "unique_id": p.unique_id, "card_id": self.card(p.unique_id)?.card_id })
            }
            ActionKind::TargetCard(p) => json!({
                "unique_id": p.unique_id,
                "targeted": self.target_card(p.unique_id, p.targeted)?,
            }),
            ActionKind::AddMana(p) => json!({
                "color": p.color,
                "amount": self.add_mana(actor, p.color, p.amount)?,
            }),
            ActionKind::ClearManaPool => {
                self.clear_mana_pool(actor)?;
                json!({})
            }

            ActionKind::CreateToken(p) => {
                let spec = TokenSpec {
                    card_id: p.card_id.clone(),
                    controller: p.target_player.unwrap_or(actor),
                    count: p.count,
                    power: p.power.clone(),
                    toughness: p.toughness.clone(),
                    tapped: p.tapped,
                };
                json!({ "created": self.create_tokens(catalog, spec)? })
            }
            ActionKind::DuplicateCard(p) => json!({
                "original": p.unique_id,
                "copy": self.duplicate_card(p.unique_id)?,
            }),
            ActionKind::DeleteToken(p) => {
                self.delete_token(p.unique_id)?;
                json!({ "unique_id": p.unique_id })
            }
            ActionKind::AttachCard(p) => {
                self.attach_card(p.unique_id, p.host_unique_id, p.order)?;
                json!({
                    "unique_id": p.unique_id,
                    "host_unique_id": p.host_unique_id,
                    "attachments": self.attachments_of(p.host_unique_id),
                })
            }
            ActionKind::DetachCard(p) => json!(self.detach_card(p.unique_id)?),
        };
        Ok(Some(details))
    }
}

fn counter_result(id: InstanceId, name: &crate::core::CounterName, value: i32) -> Value {
    json!({ "unique_id": id, "counter_name": name, "value": value })
}

/// Rebuild a match by applying recorded actions to its initial state
pub fn replay<'a>(
    initial: &GameState,
    catalog: &dyn CardLookup,
    actions: impl IntoIterator<Item = &'a GameAction>,
) -> Result<GameState> {
    let mut game = initial.clone();
    for action in actions {
        game.process_action(catalog, action)?;
    }
    Ok(game)
}
