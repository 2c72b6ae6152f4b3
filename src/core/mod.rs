//! Core game types and entities

pub mod card;
pub mod entity;
pub mod mana;
pub mod player;
pub mod types;

pub use card::{CardDefinition, CardFace, CardInstance, CardLookup, CardType};
pub use entity::{InstanceId, MatchId, PlayerId};
pub use mana::{Color, ManaPool};
pub use player::Player;
pub use types::{CardDefId, CardName, CounterName, PlayerName};
