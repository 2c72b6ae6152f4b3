//! Card definitions (static, owned by the catalog) and card instances
//! (the dynamic overlay the engine owns)

use crate::core::{CardDefId, CardName, CounterName, InstanceId, PlayerId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Card types in MTG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Creature,
    Instant,
    Sorcery,
    Enchantment,
    Artifact,
    Land,
    Planeswalker,
    Battle,
}

impl CardType {
    fn from_word(word: &str) -> Option<CardType> {
        match word.to_ascii_lowercase().as_str() {
            "creature" => Some(CardType::Creature),
            "instant" => Some(CardType::Instant),
            "sorcery" => Some(CardType::Sorcery),
            "enchantment" => Some(CardType::Enchantment),
            "artifact" => Some(CardType::Artifact),
            "land" => Some(CardType::Land),
            "planeswalker" => Some(CardType::Planeswalker),
            "battle" => Some(CardType::Battle),
            _ => None,
        }
    }

    /// Parse the card types out of a type line such as
    /// "Legendary Artifact Creature — Golem". Supertypes and subtypes are ignored.
    pub fn parse_type_line(type_line: &str) -> SmallVec<[CardType; 2]> {
        let main = type_line
            .split(['—', '-'])
            .next()
            .unwrap_or_default();
        let mut types = SmallVec::new();
        for card_type in main.split_whitespace().filter_map(CardType::from_word) {
            if !types.contains(&card_type) {
                types.push(card_type);
            }
        }
        types
    }
}

/// One face of a double-faced card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardFace {
    pub name: CardName,
    #[serde(default)]
    pub mana_cost: String,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(default)]
    pub loyalty: Option<String>,
}

/// Static card definition supplied by the catalog collaborator
///
/// The engine never stores these on the board; instances only carry the
/// `CardDefId` and look the definition up when a rule needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardDefId,
    pub name: CardName,
    #[serde(default)]
    pub mana_cost: String,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(default)]
    pub loyalty: Option<String>,
    /// Faces of a double-faced card, front first. Empty for normal cards.
    #[serde(default)]
    pub faces: Vec<CardFace>,
    #[serde(default)]
    pub image_uris: Vec<String>,
}

impl CardDefinition {
    pub fn new(id: impl Into<CardDefId>, name: impl Into<CardName>, type_line: &str) -> Self {
        CardDefinition {
            id: id.into(),
            name: name.into(),
            mana_cost: String::new(),
            type_line: type_line.to_string(),
            text: String::new(),
            power: None,
            toughness: None,
            loyalty: None,
            faces: Vec::new(),
            image_uris: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_power_toughness(mut self, power: &str, toughness: &str) -> Self {
        self.power = Some(power.to_string());
        self.toughness = Some(toughness.to_string());
        self
    }

    pub fn is_double_faced(&self) -> bool {
        self.faces.len() >= 2
    }

    pub fn type_line_for(&self, face: usize) -> &str {
        self.faces
            .get(face)
            .map(|f| f.type_line.as_str())
            .unwrap_or(&self.type_line)
    }

    pub fn text_for(&self, face: usize) -> &str {
        self.faces
            .get(face)
            .map(|f| f.text.as_str())
            .unwrap_or(&self.text)
    }

    pub fn types_for(&self, face: usize) -> SmallVec<[CardType; 2]> {
        CardType::parse_type_line(self.type_line_for(face))
    }
}

/// Read access to static card definitions
///
/// Implemented by the catalog collaborator; the engine only ever borrows it.
pub trait CardLookup {
    fn definition(&self, card_id: &CardDefId) -> Option<&CardDefinition>;
}

/// A card instance during a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    pub unique_id: InstanceId,

    /// Static definition reference
    pub card_id: CardDefId,

    /// Owner never changes, whoever controls the card
    pub owner_id: PlayerId,

    pub tapped: bool,
    pub attacking: bool,
    /// Attacker this creature is blocking
    pub blocking: Option<InstanceId>,
    pub targeted: bool,

    /// Named counters; entries are removed once they reach 0
    pub counters: BTreeMap<CounterName, i32>,

    pub face_down: bool,
    pub face_down_owner: Option<PlayerId>,

    /// Host this card is attached to (battlefield only)
    pub attached_to: Option<InstanceId>,
    /// Position among the host's attachments, dense from 0
    pub attachment_order: Option<u32>,

    /// Overrides of printed power/toughness; None means "use the definition"
    pub current_power: Option<String>,
    pub current_toughness: Option<String>,
    pub loyalty: Option<i32>,

    pub is_token: bool,
    pub is_commander: bool,
    pub current_face: usize,

    pub custom_keywords: SmallVec<[String; 2]>,
    pub custom_types: SmallVec<[String; 2]>,
}

impl CardInstance {
    pub fn new(unique_id: InstanceId, card_id: CardDefId, owner_id: PlayerId) -> Self {
        CardInstance {
            unique_id,
            card_id,
            owner_id,
            tapped: false,
            attacking: false,
            blocking: None,
            targeted: false,
            counters: BTreeMap::new(),
            face_down: false,
            face_down_owner: None,
            attached_to: None,
            attachment_order: None,
            current_power: None,
            current_toughness: None,
            loyalty: None,
            is_token: false,
            is_commander: false,
            current_face: 0,
            custom_keywords: SmallVec::new(),
            custom_types: SmallVec::new(),
        }
    }

    pub fn tap(&mut self) {
        self.tapped = true;
    }

    pub fn untap(&mut self) {
        self.tapped = false;
    }

    pub fn get_counter(&self, name: &CounterName) -> i32 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Add a (possibly negative) number of counters and return the new value.
    /// Saturates at `i32::MAX`.
    /// The entry is removed once it drops to 0 or below.
    pub fn add_counter(&mut self, name: CounterName, delta: i32) -> i32 {
        let value = self.get_counter(&name).saturating_add(delta);
        self.set_counter(name, value)
    }

    /// Force a counter to an absolute value; values <= 0 delete the entry
    pub fn set_counter(&mut self, name: CounterName, value: i32) -> i32 {
        if value <= 0 {
            self.counters.remove(&name);
            0
        } else {
            self.counters.insert(name, value);
            value
        }
    }

    pub fn clear_combat(&mut self) {
        self.attacking = false;
        self.blocking = None;
    }

    pub fn clear_attachment(&mut self) {
        self.attached_to = None;
        self.attachment_order = None;
    }

    pub fn turn_face_up(&mut self) {
        self.face_down = false;
        self.face_down_owner = None;
    }

    /// Types this instance currently has. Face-down cards are plain creatures.
    pub fn types(&self, definition: Option<&CardDefinition>) -> SmallVec<[CardType; 2]> {
        if self.face_down {
            return smallvec::smallvec![CardType::Creature];
        }
        let mut types = definition
            .map(|def| def.types_for(self.current_face))
            .unwrap_or_default();
        for extra in &self.custom_types {
            for card_type in CardType::parse_type_line(extra) {
                if !types.contains(&card_type) {
                    types.push(card_type);
                }
            }
        }
        types
    }

    pub fn is_type(&self, definition: Option<&CardDefinition>, card_type: CardType) -> bool {
        self.types(definition).contains(&card_type)
    }

    /// Plain case-insensitive substring check against the rules text of the
    /// current face and any custom keywords. A face-down card has no text.
    pub fn has_keyword_text(&self, definition: Option<&CardDefinition>, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        if self
            .custom_keywords
            .iter()
            .any(|k| k.to_lowercase().contains(&needle))
        {
            return true;
        }
        if self.face_down {
            return false;
        }
        definition
            .map(|def| def.text_for(self.current_face).to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}
