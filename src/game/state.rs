//! Main game state structure

use crate::core::{
    CardDefinition, CardInstance, CardLookup, InstanceId, MatchId, Player, PlayerId,
};
use crate::game::{CombatState, GameFormat, GameLogger, MatchConfig, Phase, PhaseMode};
use crate::history::{ActionHistory, HistoryEntry};
use crate::zones::{CardZone, Zone};
use crate::{MtgError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed reference to one zone: a player's zone or the shared stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneRef {
    Player(PlayerId, Zone),
    Stack,
}

impl ZoneRef {
    /// Build from the loose (player, zone) pair used on the wire.
    /// Every zone but the stack needs a player.
    pub fn new(player: Option<PlayerId>, zone: Zone) -> Result<ZoneRef> {
        match (zone, player) {
            (Zone::Stack, _) => Ok(ZoneRef::Stack),
            (zone, Some(player)) => Ok(ZoneRef::Player(player, zone)),
            (zone, None) => Err(MtgError::InvalidInput(format!(
                "zone '{zone}' needs a player"
            ))),
        }
    }

    pub fn zone(&self) -> Zone {
        match self {
            ZoneRef::Player(_, zone) => *zone,
            ZoneRef::Stack => Zone::Stack,
        }
    }

    pub fn player(&self) -> Option<PlayerId> {
        match self {
            ZoneRef::Player(player, _) => Some(*player),
            ZoneRef::Stack => None,
        }
    }
}

impl fmt::Display for ZoneRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneRef::Player(player, zone) => write!(f, "{player} {zone}"),
            ZoneRef::Stack => write!(f, "stack"),
        }
    }
}

fn default_hand_size() -> usize {
    7
}

/// Complete state of one match
///
/// Plain data: cloning it is how the dispatcher gets all-or-nothing actions,
/// and serializing it is all persistence needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub id: MatchId,

    /// Exactly two players, in seat order
    pub players: Vec<Player>,

    /// Index into `players` of the player whose turn it is
    pub active_player: usize,

    /// Index into `players` of the player who may act next
    pub priority_player: usize,

    pub phase: Phase,

    pub combat_state: CombatState,

    pub turn: u32,
    pub round: u32,
    pub players_played_this_round: [bool; 2],

    /// The stack; the last element resolves first
    pub stack: CardZone,

    pub end_step_priority_passed: bool,

    pub game_format: GameFormat,
    pub phase_mode: PhaseMode,

    /// Hand size a mulligan redraws to
    #[serde(default = "default_hand_size")]
    pub opening_hand_size: usize,

    /// Allocator for instance ids of tokens and duplicates
    next_instance_id: u32,

    /// Shuffle RNG; serialized so a restored match shuffles identically
    pub rng: ChaCha12Rng,

    pub history: ActionHistory,

    pub logger: GameLogger,
}

impl GameState {
    /// Create an empty two-player match in PREGAME
    pub fn new_two_player(
        id: impl Into<MatchId>,
        player1: (PlayerId, &str),
        player2: (PlayerId, &str),
        config: &MatchConfig,
    ) -> Self {
        let players = vec![
            Player::new(player1.0, player1.1, config.starting_life),
            Player::new(player2.0, player2.1, config.starting_life),
        ];

        GameState {
            id: id.into(),
            players,
            active_player: 0,
            priority_player: 0,
            phase: Phase::Pregame,
            combat_state: CombatState::new(),
            turn: 1,
            round: 1,
            players_played_this_round: [false; 2],
            stack: CardZone::new(),
            end_step_priority_passed: false,
            game_format: config.format,
            phase_mode: config.phase_mode,
            opening_hand_size: config.opening_hand_size,
            next_instance_id: 1,
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            history: ActionHistory::new(),
            logger: GameLogger::new(),
        }
    }

    /// Allocate an instance id not used anywhere in the match
    pub fn next_instance_id(&mut self) -> InstanceId {
        loop {
            let id = InstanceId::new(self.next_instance_id);
            self.next_instance_id += 1;
            if self.locate(id).is_none() {
                return id;
            }
        }
    }

    // ---- players -------------------------------------------------------

    pub fn player_idx(&self, id: PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| MtgError::NotFound(format!("player {id}")))
    }

    pub fn get_player(&self, id: PlayerId) -> Result<&Player> {
        let idx = self.player_idx(id)?;
        Ok(&self.players[idx])
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        let idx = self.player_idx(id)?;
        Ok(&mut self.players[idx])
    }

    /// The other seat (two-player matches only)
    pub fn other_idx(&self, idx: usize) -> usize {
        (idx + 1) % self.players.len()
    }

    pub fn active_player_id(&self) -> PlayerId {
        self.players[self.active_player].id
    }

    pub fn priority_player_id(&self) -> PlayerId {
        self.players[self.priority_player].id
    }

    pub fn defending_idx(&self) -> usize {
        self.other_idx(self.active_player)
    }

    // ---- zones ---------------------------------------------------------

    pub fn zone(&self, zone_ref: ZoneRef) -> Result<&CardZone> {
        match zone_ref {
            ZoneRef::Stack => Ok(&self.stack),
            ZoneRef::Player(player, zone) => self
                .get_player(player)?
                .zones
                .get_zone(zone)
                .ok_or_else(|| MtgError::NotFound(format!("zone {zone_ref}"))),
        }
    }

    pub fn zone_mut(&mut self, zone_ref: ZoneRef) -> Result<&mut CardZone> {
        match zone_ref {
            ZoneRef::Stack => Ok(&mut self.stack),
            ZoneRef::Player(player, zone) => self
                .get_player_mut(player)?
                .zones
                .get_zone_mut(zone)
                .ok_or_else(|| MtgError::NotFound(format!("zone {zone_ref}"))),
        }
    }

    /// Where an instance currently is
    pub fn locate(&self, id: InstanceId) -> Option<ZoneRef> {
        if self.stack.contains(id) {
            return Some(ZoneRef::Stack);
        }
        self.players.iter().find_map(|player| {
            player
                .zones
                .locate(id)
                .map(|zone| ZoneRef::Player(player.id, zone))
        })
    }

    /// Look a card up anywhere in the match
    pub fn card(&self, id: InstanceId) -> Result<&CardInstance> {
        let location = self
            .locate(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))?;
        self.zone(location)?
            .get(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))
    }

    pub fn card_mut(&mut self, id: InstanceId) -> Result<&mut CardInstance> {
        let location = self
            .locate(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))?;
        self.zone_mut(location)?
            .get_mut(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))
    }

    /// Index of the player whose battlefield holds the instance
    pub fn battlefield_of(&self, id: InstanceId) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.zones.battlefield.contains(id))
    }

    pub fn battlefield_card_mut(&mut self, id: InstanceId) -> Result<&mut CardInstance> {
        let idx = self
            .battlefield_of(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id} on any battlefield")))?;
        self.players[idx]
            .zones
            .battlefield
            .get_mut(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))
    }

    pub fn all_battlefield_cards_mut(&mut self) -> impl Iterator<Item = &mut CardInstance> {
        self.players
            .iter_mut()
            .flat_map(|p| p.zones.battlefield.iter_mut())
    }

    /// Static definition for an instance, if the catalog has it
    pub fn definition<'c>(
        catalog: &'c dyn CardLookup,
        card: &CardInstance,
    ) -> Option<&'c CardDefinition> {
        catalog.definition(&card.card_id)
    }

    /// Static definition, required
    pub fn require_definition<'c>(
        catalog: &'c dyn CardLookup,
        card: &CardInstance,
    ) -> Result<&'c CardDefinition> {
        catalog.definition(&card.card_id).ok_or_else(|| {
            MtgError::NotFound(format!("definition '{}' for card {}", card.card_id, card.unique_id))
        })
    }

    // ---- priority & phase bookkeeping -----------------------------------

    /// Non-empty stack: the opponent of the top card's owner.
    /// Empty stack: the active player.
    pub fn update_priority(&mut self) {
        self.priority_player = match self.stack.peek_top() {
            Some(top) => match self.player_idx(top.owner_id) {
                Ok(owner_idx) => self.other_idx(owner_idx),
                Err(_) => self.active_player,
            },
            None => self.active_player,
        };
    }

    pub(crate) fn record_phase_change(&mut self, from: Phase, to: Phase, synthetic: bool) {
        self.history.log(HistoryEntry::PhaseChange {
            turn: self.turn,
            from,
            to,
            synthetic,
        });
        self.logger.phase(self.turn, from, to);
    }

    /// Check the structural invariants of the match
    pub fn validate(&self) -> Result<()> {
        if self.players.len() != 2 {
            return Err(MtgError::InvalidInput(format!(
                "a match needs exactly two players, got {}",
                self.players.len()
            )));
        }
        if self.active_player >= self.players.len() || self.priority_player >= self.players.len()
        {
            return Err(MtgError::InvalidInput(
                "active/priority player index out of range".to_string(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        let all_cards = self
            .stack
            .iter()
            .chain(self.players.iter().flat_map(|p| {
                Zone::PLAYER_ZONES
                    .into_iter()
                    .filter_map(|zone| p.zones.get_zone(zone))
                    .flat_map(|z| z.iter())
            }));
        for card in all_cards {
            if !seen.insert(card.unique_id) {
                return Err(MtgError::InvalidInput(format!(
                    "card {} is in more than one zone",
                    card.unique_id
                )));
            }
        }
        Ok(())
    }
}
