//! Casting, the stack and priority passes

use crate::core::{CardLookup, CardType, InstanceId, PlayerId};
use crate::game::combat::CombatPass;
use crate::game::turn::EndStepPass;
use crate::game::{CombatStep, GameState, Phase, PhaseMode, ZoneRef};
use crate::zones::Zone;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};

/// Where a played card went
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayOutcome {
    pub unique_id: InstanceId,
    pub destination: Zone,
    /// New commander tax when the card was cast from the command zone
    pub commander_tax: Option<u32>,
}

/// A resolved stack object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub unique_id: InstanceId,
    pub owner: PlayerId,
    pub destination: Zone,
}

/// Result of a priority pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PriorityOutcome {
    Resolved(Resolution),
    Combat(CombatPass),
    EndStep { pass: EndStepPass },
    Passed,
}

impl GameState {
    /// Play a card from one of the player's zones.
    ///
    /// Lands enter the battlefield directly; instants, sorceries and
    /// face-down plays use the stack; other permanents use the stack only in
    /// strict mode.
    pub fn play_card(
        &mut self,
        catalog: &dyn CardLookup,
        player: PlayerId,
        id: InstanceId,
        source_zone: Zone,
        face_down: bool,
    ) -> Result<PlayOutcome> {
        if matches!(source_zone, Zone::Stack | Zone::Battlefield) {
            return Err(MtgError::InvalidInput(format!(
                "cannot play a card from the {source_zone}"
            )));
        }
        let from = ZoneRef::Player(player, source_zone);
        let card = self
            .zone(from)?
            .get(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id} in {from}")))?;

        let destination = if face_down {
            Zone::Stack
        } else {
            let definition = GameState::require_definition(catalog, card)?;
            let types = card.types(Some(definition));
            if types.contains(&CardType::Land) {
                Zone::Battlefield
            } else if types.contains(&CardType::Instant)
                || types.contains(&CardType::Sorcery)
                || self.phase_mode == PhaseMode::Strict
            {
                Zone::Stack
            } else {
                Zone::Battlefield
            }
        };
        let from_command_zone = source_zone == Zone::CommanderZone && card.is_commander;

        let to = match destination {
            Zone::Stack => ZoneRef::Stack,
            zone => ZoneRef::Player(player, zone),
        };
        self.relocate(id, from, to, None)?;

        if face_down {
            let card = self.card_mut(id)?;
            card.face_down = true;
            card.face_down_owner = Some(player);
        }

        let commander_tax = if from_command_zone {
            let player = self.get_player_mut(player)?;
            Some(player.adjust_commander_tax(2))
        } else {
            None
        };

        self.update_priority();
        Ok(PlayOutcome {
            unique_id: id,
            destination,
            commander_tax,
        })
    }

    /// Resolve the top of the stack into its owner's zones.
    /// Instants and sorceries go to the graveyard, everything else (and any
    /// face-down card) to the battlefield untapped.
    pub fn resolve_stack(&mut self, catalog: &dyn CardLookup) -> Result<Resolution> {
        let top = self
            .stack
            .peek_top()
            .ok_or_else(|| MtgError::IllegalState("the stack is empty".to_string()))?;
        let (id, owner) = (top.unique_id, top.owner_id);

        let destination = if top.face_down {
            Zone::Battlefield
        } else {
            let definition = GameState::require_definition(catalog, top)?;
            let types = top.types(Some(definition));
            if types.contains(&CardType::Instant) || types.contains(&CardType::Sorcery) {
                Zone::Graveyard
            } else {
                Zone::Battlefield
            }
        };

        self.relocate(id, ZoneRef::Stack, ZoneRef::Player(owner, destination), None)?;
        if destination == Zone::Battlefield {
            let card = self.card_mut(id)?;
            card.untap();
            card.targeted = false;
        }
        self.update_priority();

        Ok(Resolution {
            unique_id: id,
            owner,
            destination,
        })
    }

    /// Resolve until the stack is empty, top first
    pub fn resolve_all_stack(&mut self, catalog: &dyn CardLookup) -> Result<Vec<Resolution>> {
        let mut resolved = Vec::with_capacity(self.stack.len());
        while !self.stack.is_empty() {
            resolved.push(self.resolve_stack(catalog)?);
        }
        self.update_priority();
        Ok(resolved)
    }

    /// Pass priority.
    ///
    /// A non-empty stack resolves its top. Otherwise an open combat step
    /// commits (or redirects), END runs its two-step negotiation, and
    /// anywhere else priority simply returns to the active player.
    pub fn pass_priority(
        &mut self,
        catalog: &dyn CardLookup,
        player: PlayerId,
    ) -> Result<PriorityOutcome> {
        self.player_idx(player)?;

        if !self.stack.is_empty() {
            return Ok(PriorityOutcome::Resolved(self.resolve_stack(catalog)?));
        }

        if self.phase.is_combat() && self.combat_state.step != CombatStep::None {
            return Ok(PriorityOutcome::Combat(self.combat_pass(catalog, player)?));
        }

        if self.phase == Phase::End {
            let pass = self.end_step_pass(player)?;
            return Ok(PriorityOutcome::EndStep { pass });
        }

        self.priority_player = self.active_player;
        Ok(PriorityOutcome::Passed)
    }
}
