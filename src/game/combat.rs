//! Combat sub-state-machine
//!
//! ATTACK, BLOCK and DAMAGE each own one combat step. Declarations are only
//! accepted from the expected player in the matching step; previews stage a
//! selection that a priority pass from that player commits.

use crate::core::{CardLookup, InstanceId, PlayerId};
use crate::game::logger::log_if_verbose;
use crate::game::{CombatStep, GameState, Phase};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Combat bookkeeping for the current turn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub step: CombatStep,
    pub attackers_declared: bool,
    pub blockers_declared: bool,
    pub damage_resolved: bool,

    /// Whose declaration (or pass) the current step is waiting on
    pub expected_player: Option<PlayerId>,

    /// Staged attackers, committed by a pass from the expected player
    pub pending_attackers: Vec<InstanceId>,

    /// Staged blocker -> attacker assignments
    pub pending_blockers: BTreeMap<InstanceId, InstanceId>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = CombatState::default();
    }

    pub fn is_waiting_on(&self, player: PlayerId) -> bool {
        self.expected_player == Some(player)
    }
}

/// What a committed attack declaration did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub attackers: Vec<InstanceId>,
    /// Attackers that tapped (no vigilance)
    pub tapped: Vec<InstanceId>,
    /// True when nobody attacked and the engine moved straight to MAIN2
    pub skipped_to_main2: bool,
}

/// Result of a priority pass inside combat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "combat", rename_all = "snake_case")]
pub enum CombatPass {
    /// The passer was not the expected player; priority returns to them
    Redirected { expected_player: PlayerId },
    AttackersCommitted(AttackOutcome),
    BlockersCommitted { blockers: BTreeMap<InstanceId, InstanceId> },
    DamageResolved,
    Idle,
}

impl GameState {
    /// Clear attacking/blocking on every battlefield
    pub(crate) fn clear_combat_flags(&mut self) {
        for card in self.all_battlefield_cards_mut() {
            card.clear_combat();
        }
    }

    /// Entering ATTACK: fresh combat waiting on the active player
    pub(crate) fn begin_combat(&mut self) {
        self.clear_combat_flags();
        self.combat_state = CombatState {
            step: CombatStep::DeclareAttackers,
            expected_player: Some(self.active_player_id()),
            ..CombatState::default()
        };
        self.priority_player = self.active_player;
    }

    pub(crate) fn reset_combat(&mut self) {
        self.clear_combat_flags();
        self.combat_state.reset();
    }

    fn require_step(&self, player: PlayerId, phase: Phase, step: CombatStep) -> Result<()> {
        if self.phase != phase || self.combat_state.step != step {
            return Err(MtgError::IllegalState(format!(
                "{step} is not open (phase {}, combat step {})",
                self.phase, self.combat_state.step
            )));
        }
        if !self.combat_state.is_waiting_on(player) {
            return Err(MtgError::IllegalState(format!(
                "{step} is waiting on {}, not {player}",
                self.combat_state
                    .expected_player
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "nobody".to_string())
            )));
        }
        Ok(())
    }

    /// Commit the attacking creatures. Attackers without vigilance tap.
    /// An empty declaration ends combat and moves to MAIN2.
    pub fn declare_attackers(
        &mut self,
        catalog: &dyn CardLookup,
        player: PlayerId,
        attackers: &[InstanceId],
    ) -> Result<AttackOutcome> {
        self.require_step(player, Phase::Attack, CombatStep::DeclareAttackers)?;
        let idx = self.player_idx(player)?;

        let mut chosen: Vec<InstanceId> = Vec::with_capacity(attackers.len());
        for &id in attackers {
            if !self.players[idx].zones.battlefield.contains(id) {
                return Err(MtgError::NotFound(format!(
                    "attacker {id} on {player}'s battlefield"
                )));
            }
            if !chosen.contains(&id) {
                chosen.push(id);
            }
        }

        let mut tapped = Vec::new();
        for card in self.players[idx].zones.battlefield.iter_mut() {
            card.attacking = false;
            if !chosen.contains(&card.unique_id) {
                continue;
            }
            card.attacking = true;
            let definition = GameState::definition(catalog, card);
            if !card.has_keyword_text(definition, "vigilance") {
                card.tap();
                tapped.push(card.unique_id);
            }
        }

        self.combat_state.attackers_declared = true;
        self.combat_state.pending_attackers.clear();
        log_if_verbose!(self.logger, "{player} attacks with {} creature(s)", chosen.len());

        let skipped_to_main2 = chosen.is_empty();
        if skipped_to_main2 {
            self.combat_state.step = CombatStep::EndOfCombat;
            self.enter_phase(Phase::Main2, true)?;
        } else {
            self.enter_phase(Phase::Block, false)?;
        }

        Ok(AttackOutcome {
            attackers: chosen,
            tapped,
            skipped_to_main2,
        })
    }

    /// Commit blocker -> attacker assignments and move to DAMAGE
    pub fn declare_blockers(
        &mut self,
        player: PlayerId,
        assignments: &BTreeMap<InstanceId, InstanceId>,
    ) -> Result<BTreeMap<InstanceId, InstanceId>> {
        self.require_step(player, Phase::Block, CombatStep::DeclareBlockers)?;
        let defender = self.player_idx(player)?;
        let attacker_side = self.active_player;

        for (&blocker, &attacker) in assignments {
            if !self.players[defender].zones.battlefield.contains(blocker) {
                return Err(MtgError::NotFound(format!(
                    "blocker {blocker} on {player}'s battlefield"
                )));
            }
            let attacking = self.players[attacker_side]
                .zones
                .battlefield
                .get(attacker)
                .is_some_and(|card| card.attacking);
            if !attacking {
                return Err(MtgError::InvalidInput(format!(
                    "{attacker} is not an attacking creature"
                )));
            }
        }

        for card in self.players[defender].zones.battlefield.iter_mut() {
            card.blocking = assignments.get(&card.unique_id).copied();
        }

        self.combat_state.blockers_declared = true;
        self.combat_state.pending_blockers.clear();
        log_if_verbose!(self.logger, "{player} blocks with {} creature(s)", assignments.len());

        self.enter_phase(Phase::Damage, false)?;
        Ok(assignments.clone())
    }

    /// Mark damage resolved, close combat and move to MAIN2.
    /// Damage itself is applied by the players.
    pub fn resolve_combat_damage(&mut self, player: PlayerId) -> Result<()> {
        self.require_step(player, Phase::Damage, CombatStep::CombatDamage)?;
        self.combat_state.damage_resolved = true;
        self.combat_state.step = CombatStep::EndOfCombat;
        self.enter_phase(Phase::Main2, false)?;
        Ok(())
    }

    /// Stage attackers. Outside DECLARE_ATTACKERS this does nothing.
    pub fn preview_attackers(&mut self, attackers: &[InstanceId]) -> Vec<InstanceId> {
        if self.phase != Phase::Attack || self.combat_state.step != CombatStep::DeclareAttackers {
            return Vec::new();
        }
        let battlefield = &self.players[self.active_player].zones.battlefield;
        let mut staged: Vec<InstanceId> = Vec::new();
        for &id in attackers {
            if battlefield.contains(id) && !staged.contains(&id) {
                staged.push(id);
            }
        }
        self.combat_state.pending_attackers = staged.clone();
        staged
    }

    /// Stage blocks. Outside DECLARE_BLOCKERS this does nothing.
    pub fn preview_blockers(
        &mut self,
        assignments: &BTreeMap<InstanceId, InstanceId>,
    ) -> BTreeMap<InstanceId, InstanceId> {
        if self.phase != Phase::Block || self.combat_state.step != CombatStep::DeclareBlockers {
            return BTreeMap::new();
        }
        let staged = self.legal_blocks(assignments);
        self.combat_state.pending_blockers = staged.clone();
        staged
    }

    fn legal_blocks(
        &self,
        assignments: &BTreeMap<InstanceId, InstanceId>,
    ) -> BTreeMap<InstanceId, InstanceId> {
        let defenders = &self.players[self.defending_idx()].zones.battlefield;
        let attackers = &self.players[self.active_player].zones.battlefield;
        assignments
            .iter()
            .filter(|(&blocker, &attacker)| {
                defenders.contains(blocker)
                    && attackers.get(attacker).is_some_and(|card| card.attacking)
            })
            .map(|(&blocker, &attacker)| (blocker, attacker))
            .collect()
    }

    /// A priority pass while a combat step is open
    pub(crate) fn combat_pass(
        &mut self,
        catalog: &dyn CardLookup,
        player: PlayerId,
    ) -> Result<CombatPass> {
        let Some(expected) = self.combat_state.expected_player else {
            self.priority_player = self.active_player;
            return Ok(CombatPass::Idle);
        };

        if expected != player {
            self.priority_player = self.player_idx(expected)?;
            return Ok(CombatPass::Redirected {
                expected_player: expected,
            });
        }

        match self.combat_state.step {
            CombatStep::DeclareAttackers => {
                let battlefield = &self.players[self.active_player].zones.battlefield;
                let pending: Vec<InstanceId> = self
                    .combat_state
                    .pending_attackers
                    .iter()
                    .copied()
                    .filter(|&id| battlefield.contains(id))
                    .collect();
                let outcome = self.declare_attackers(catalog, player, &pending)?;
                Ok(CombatPass::AttackersCommitted(outcome))
            }
            CombatStep::DeclareBlockers => {
                let pending = self.legal_blocks(&self.combat_state.pending_blockers);
                let blockers = self.declare_blockers(player, &pending)?;
                Ok(CombatPass::BlockersCommitted { blockers })
            }
            CombatStep::CombatDamage => {
                self.resolve_combat_damage(player)?;
                Ok(CombatPass::DamageResolved)
            }
            CombatStep::None | CombatStep::EndOfCombat => {
                self.priority_player = self.active_player;
                Ok(CombatPass::Idle)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefId, CardDefinition, CardInstance};
    use crate::game::MatchConfig;
    use crate::loader::CardCatalog;

    fn catalog() -> CardCatalog {
        let mut catalog = CardCatalog::new();
        catalog.insert(
            CardDefinition::new("bear", "Grizzly Bears", "Creature — Bear")
                .with_power_toughness("2", "2"),
        );
        catalog.insert(
            CardDefinition::new("angel", "Serra Angel", "Creature — Angel")
                .with_text("Flying, vigilance")
                .with_power_toughness("4", "4"),
        );
        catalog
    }

    /// P0 has a bear (#1) and an angel (#2); P1 has a bear (#3). Phase ATTACK.
    fn combat_game() -> GameState {
        let mut game = GameState::new_two_player(
            "combat",
            (PlayerId::new(0), "Alice"),
            (PlayerId::new(1), "Bob"),
            &MatchConfig::default(),
        );
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);
        game.players[0]
            .zones
            .battlefield
            .push(CardInstance::new(InstanceId::new(1), CardDefId::new("bear"), p0));
        game.players[0]
            .zones
            .battlefield
            .push(CardInstance::new(InstanceId::new(2), CardDefId::new("angel"), p0));
        game.players[1]
            .zones
            .battlefield
            .push(CardInstance::new(InstanceId::new(3), CardDefId::new("bear"), p1));
        game.phase = Phase::Attack;
        game.begin_combat();
        game
    }

    #[test]
    fn test_vigilance_attacker_stays_untapped() {
        let mut game = combat_game();
        let outcome = game
            .declare_attackers(
                &catalog(),
                PlayerId::new(0),
                &[InstanceId::new(1), InstanceId::new(2)],
            )
            .unwrap();

        assert_eq!(outcome.tapped, vec![InstanceId::new(1)]);
        let bf = &game.players[0].zones.battlefield;
        assert!(bf.get(InstanceId::new(1)).unwrap().tapped);
        assert!(!bf.get(InstanceId::new(2)).unwrap().tapped);
        assert!(bf.get(InstanceId::new(2)).unwrap().attacking);

        assert_eq!(game.phase, Phase::Block);
        assert_eq!(game.combat_state.step, CombatStep::DeclareBlockers);
        assert_eq!(game.combat_state.expected_player, Some(PlayerId::new(1)));
        assert_eq!(game.priority_player, 1);
    }

    #[test]
    fn test_no_attackers_skips_to_main2() {
        let mut game = combat_game();
        let outcome = game
            .declare_attackers(&catalog(), PlayerId::new(0), &[])
            .unwrap();

        assert!(outcome.skipped_to_main2);
        assert_eq!(game.phase, Phase::Main2);
        assert_eq!(game.combat_state, CombatState::default());
        assert_eq!(
            game.history.phase_changes().last(),
            Some(&(Phase::Attack, Phase::Main2, true))
        );
    }

    #[test]
    fn test_wrong_player_cannot_declare() {
        let mut game = combat_game();
        let err = game
            .declare_attackers(&catalog(), PlayerId::new(1), &[InstanceId::new(3)])
            .unwrap_err();
        assert!(matches!(err, MtgError::IllegalState(_)));
        assert_eq!(game.phase, Phase::Attack);
    }

    #[test]
    fn test_full_combat_sequence() {
        let mut game = combat_game();
        let catalog = catalog();
        game.declare_attackers(&catalog, PlayerId::new(0), &[InstanceId::new(1)])
            .unwrap();

        let mut blocks = BTreeMap::new();
        blocks.insert(InstanceId::new(3), InstanceId::new(1));
        game.declare_blockers(PlayerId::new(1), &blocks).unwrap();
        assert_eq!(game.phase, Phase::Damage);
        assert_eq!(
            game.players[1]
                .zones
                .battlefield
                .get(InstanceId::new(3))
                .unwrap()
                .blocking,
            Some(InstanceId::new(1))
        );
        assert_eq!(game.combat_state.expected_player, Some(PlayerId::new(0)));

        game.resolve_combat_damage(PlayerId::new(0)).unwrap();
        assert_eq!(game.phase, Phase::Main2);
        assert_eq!(game.combat_state.step, CombatStep::None);
        assert!(game
            .players
            .iter()
            .flat_map(|p| p.zones.battlefield.iter())
            .all(|c| !c.attacking && c.blocking.is_none()));
    }

    #[test]
    fn test_block_must_target_attacker() {
        let mut game = combat_game();
        game.declare_attackers(&catalog(), PlayerId::new(0), &[InstanceId::new(1)])
            .unwrap();
        let mut blocks = BTreeMap::new();
        blocks.insert(InstanceId::new(3), InstanceId::new(2));
        assert!(game.declare_blockers(PlayerId::new(1), &blocks).is_err());
    }

    #[test]
    fn test_preview_then_pass_commits() {
        let mut game = combat_game();
        let catalog = catalog();

        let staged = game.preview_attackers(&[InstanceId::new(2), InstanceId::new(3)]);
        assert_eq!(staged, vec![InstanceId::new(2)]);

        // the defender passing just hands priority back
        let pass = game.combat_pass(&catalog, PlayerId::new(1)).unwrap();
        assert_eq!(
            pass,
            CombatPass::Redirected {
                expected_player: PlayerId::new(0)
            }
        );
        assert_eq!(game.phase, Phase::Attack);

        let pass = game.combat_pass(&catalog, PlayerId::new(0)).unwrap();
        assert!(matches!(
            pass,
            CombatPass::AttackersCommitted(ref o) if o.attackers == vec![InstanceId::new(2)]
        ));
        assert_eq!(game.phase, Phase::Block);
    }

    #[test]
    fn test_blocker_preview_drops_illegal_entries() {
        let mut game = combat_game();
        let catalog = catalog();
        let p1 = PlayerId::new(1);
        game.players[1]
            .zones
            .battlefield
            .push(CardInstance::new(InstanceId::new(4), CardDefId::new("bear"), p1));
        game.declare_attackers(&catalog, PlayerId::new(0), &[InstanceId::new(1)])
            .unwrap();

        let mut proposed = BTreeMap::new();
        proposed.insert(InstanceId::new(3), InstanceId::new(1));
        // #2 is on the battlefield but not attacking
        proposed.insert(InstanceId::new(4), InstanceId::new(2));
        // #1 belongs to the attacker, #99 does not exist
        proposed.insert(InstanceId::new(1), InstanceId::new(1));
        proposed.insert(InstanceId::new(99), InstanceId::new(1));

        let staged = game.preview_blockers(&proposed);
        let expected: BTreeMap<_, _> = [(InstanceId::new(3), InstanceId::new(1))].into();
        assert_eq!(staged, expected);
        assert_eq!(game.combat_state.pending_blockers, expected);

        // Entries that became illegal after staging are dropped on commit
        game.combat_state
            .pending_blockers
            .insert(InstanceId::new(4), InstanceId::new(2));

        let pass = game.combat_pass(&catalog, PlayerId::new(0)).unwrap();
        assert_eq!(pass, CombatPass::Redirected { expected_player: p1 });
        assert_eq!(game.phase, Phase::Block);

        let pass = game.combat_pass(&catalog, p1).unwrap();
        assert_eq!(pass, CombatPass::BlockersCommitted { blockers: expected });
        assert_eq!(game.phase, Phase::Damage);
        assert!(game.combat_state.pending_blockers.is_empty());

        let defenders = &game.players[1].zones.battlefield;
        assert_eq!(defenders.get(InstanceId::new(3)).unwrap().blocking, Some(InstanceId::new(1)));
        assert_eq!(defenders.get(InstanceId::new(4)).unwrap().blocking, None);
    }

    #[test]
    fn test_preview_outside_step_is_ignored() {
        let mut game = combat_game();
        game.phase = Phase::Main1;
        assert!(game.preview_attackers(&[InstanceId::new(1)]).is_empty());
        assert!(game.combat_state.pending_attackers.is_empty());
    }
}
