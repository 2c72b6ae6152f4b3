//! Game zones (Library, Hand, Graveyard, Battlefield, etc.)

use crate::core::{CardInstance, InstanceId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Named zones a card instance can be in
///
/// Every zone except `Stack` belongs to a player; the stack is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Hand,
    Battlefield,
    Graveyard,
    Exile,
    Library,
    CommanderZone,
    RevealZone,
    LookZone,
    Stack,
}

impl Zone {
    pub const PLAYER_ZONES: [Zone; 8] = [
        Zone::Hand,
        Zone::Battlefield,
        Zone::Graveyard,
        Zone::Exile,
        Zone::Library,
        Zone::CommanderZone,
        Zone::RevealZone,
        Zone::LookZone,
    ];

    /// Zones whose contents always belong to the card's owner
    pub fn forces_owner(&self) -> bool {
        matches!(self, Zone::Graveyard | Zone::Exile | Zone::Library)
    }

    /// Zones that reset `tapped` and `targeted` on entry
    pub fn resets_tapped(&self) -> bool {
        matches!(
            self,
            Zone::Graveyard | Zone::Exile | Zone::Library | Zone::RevealZone | Zone::CommanderZone
        )
    }

    /// Zones through which face-down identity persists
    pub fn keeps_face_down(&self) -> bool {
        matches!(self, Zone::Stack | Zone::Battlefield)
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Exile => "exile",
            Zone::Library => "library",
            Zone::CommanderZone => "commander_zone",
            Zone::RevealZone => "reveal_zone",
            Zone::LookZone => "look_zone",
            Zone::Stack => "stack",
        };
        write!(f, "{name}")
    }
}

/// Where to insert a card in its destination zone
///
/// On the wire this is `"top"`, `"bottom"` or a plain index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonePosition {
    /// Top of the zone; for the library this is where draws come from
    Top,
    Bottom,
    Index(usize),
}

impl Serialize for ZonePosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ZonePosition::Top => serializer.serialize_str("top"),
            ZonePosition::Bottom => serializer.serialize_str("bottom"),
            ZonePosition::Index(idx) => serializer.serialize_u64(*idx as u64),
        }
    }
}

impl<'de> Deserialize<'de> for ZonePosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Index(usize),
            Named(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Index(idx) => Ok(ZonePosition::Index(idx)),
            Raw::Named(name) => match name.to_lowercase().as_str() {
                "top" => Ok(ZonePosition::Top),
                "bottom" => Ok(ZonePosition::Bottom),
                other => other
                    .parse::<usize>()
                    .map(ZonePosition::Index)
                    .map_err(|_| serde::de::Error::custom(format!("invalid position '{name}'"))),
            },
        }
    }
}

/// An ordered zone of card instances
///
/// The end of the vector is the "top" (library draws pop from the end).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardZone {
    pub cards: Vec<CardInstance>,
}

impl CardZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn position(&self, id: InstanceId) -> Option<usize> {
        self.cards.iter().position(|c| c.unique_id == id)
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: InstanceId) -> Option<&CardInstance> {
        self.cards.iter().find(|c| c.unique_id == id)
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        self.cards.iter_mut().find(|c| c.unique_id == id)
    }

    pub fn remove(&mut self, id: InstanceId) -> Option<CardInstance> {
        // remove() rather than swap_remove(): zone order is visible to players
        self.position(id).map(|pos| self.cards.remove(pos))
    }

    pub fn push(&mut self, card: CardInstance) {
        self.cards.push(card);
    }

    /// Insert honoring a requested position; `None` appends
    pub fn insert_at(&mut self, card: CardInstance, position: Option<ZonePosition>) {
        match position {
            None | Some(ZonePosition::Top) => self.cards.push(card),
            Some(ZonePosition::Bottom) => self.cards.insert(0, card),
            Some(ZonePosition::Index(idx)) => {
                let idx = idx.min(self.cards.len());
                self.cards.insert(idx, card);
            }
        }
    }

    /// Draw from top (for Library)
    pub fn draw_top(&mut self) -> Option<CardInstance> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<&CardInstance> {
        self.cards.last()
    }

    /// Ids of the top `count` cards, topmost first
    pub fn top_ids(&self, count: usize) -> Vec<InstanceId> {
        self.cards
            .iter()
            .rev()
            .take(count)
            .map(|c| c.unique_id)
            .collect()
    }

    pub fn ids(&self) -> Vec<InstanceId> {
        self.cards.iter().map(|c| c.unique_id).collect()
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardInstance> {
        self.cards.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, CardInstance> {
        self.cards.iter_mut()
    }
}

/// Collection of all zones for a player, addressed by `Zone`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerZones {
    pub hand: CardZone,
    pub battlefield: CardZone,
    pub graveyard: CardZone,
    pub exile: CardZone,
    pub library: CardZone,
    pub commander_zone: CardZone,
    pub reveal_zone: CardZone,
    pub look_zone: CardZone,
}

impl PlayerZones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns None for the shared stack
    pub fn get_zone(&self, zone: Zone) -> Option<&CardZone> {
        match zone {
            Zone::Hand => Some(&self.hand),
            Zone::Battlefield => Some(&self.battlefield),
            Zone::Graveyard => Some(&self.graveyard),
            Zone::Exile => Some(&self.exile),
            Zone::Library => Some(&self.library),
            Zone::CommanderZone => Some(&self.commander_zone),
            Zone::RevealZone => Some(&self.reveal_zone),
            Zone::LookZone => Some(&self.look_zone),
            Zone::Stack => None,
        }
    }

    pub fn get_zone_mut(&mut self, zone: Zone) -> Option<&mut CardZone> {
        match zone {
            Zone::Hand => Some(&mut self.hand),
            Zone::Battlefield => Some(&mut self.battlefield),
            Zone::Graveyard => Some(&mut self.graveyard),
            Zone::Exile => Some(&mut self.exile),
            Zone::Library => Some(&mut self.library),
            Zone::CommanderZone => Some(&mut self.commander_zone),
            Zone::RevealZone => Some(&mut self.reveal_zone),
            Zone::LookZone => Some(&mut self.look_zone),
            Zone::Stack => None,
        }
    }

    /// Which of this player's zones holds the instance
    pub fn locate(&self, id: InstanceId) -> Option<Zone> {
        Zone::PLAYER_ZONES
            .into_iter()
            .find(|&zone| self.get_zone(zone).is_some_and(|z| z.contains(id)))
    }

    pub fn card_count(&self) -> usize {
        Zone::PLAYER_ZONES
            .iter()
            .filter_map(|&zone| self.get_zone(zone))
            .map(CardZone::len)
            .sum()
    }
}
