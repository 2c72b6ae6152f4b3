//! Player representation

use crate::core::{CounterName, ManaPool, PlayerId, PlayerName};
use crate::zones::PlayerZones;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Represents a player in the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    pub name: PlayerName,

    /// Life total, never below 0
    pub life: i32,

    /// Hand, battlefield, graveyard, exile, library, command, reveal and look zones
    pub zones: PlayerZones,

    pub mana_pool: ManaPool,

    /// Player counters (poison, energy, experience, ...); no zero entries
    pub counters: BTreeMap<CounterName, i32>,

    /// Commander tax, never below 0
    pub commander_tax: u32,

    /// Mulligans taken this match
    pub mulligans: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>, starting_life: i32) -> Self {
        Player {
            id,
            name: name.into(),
            life: starting_life.max(0),
            zones: PlayerZones::new(),
            mana_pool: ManaPool::new(),
            counters: BTreeMap::new(),
            commander_tax: 0,
            mulligans: 0,
        }
    }

    /// Apply a life delta; the result is clamped at 0
    pub fn modify_life(&mut self, amount: i32) -> i32 {
        self.life = self.life.saturating_add(amount).max(0);
        self.life
    }

    pub fn set_life(&mut self, life: i32) -> i32 {
        self.life = life.max(0);
        self.life
    }

    pub fn get_counter(&self, name: &CounterName) -> i32 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn add_counter(&mut self, name: CounterName, delta: i32) -> i32 {
        let value = self.get_counter(&name).saturating_add(delta);
        self.set_counter(name, value)
    }

    pub fn set_counter(&mut self, name: CounterName, value: i32) -> i32 {
        if value <= 0 {
            self.counters.remove(&name);
            0
        } else {
            self.counters.insert(name, value);
            value
        }
    }

    /// Signed adjustment, clamped to `0..=u32::MAX`
    pub fn adjust_commander_tax(&mut self, delta: i32) -> u32 {
        self.commander_tax = self.commander_tax.saturating_add_signed(delta);
        self.commander_tax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let player = Player::new(PlayerId::new(1), "Alice", 20);
        assert_eq!(player.name.as_str(), "Alice");
        assert_eq!(player.life, 20);
        assert_eq!(player.commander_tax, 0);
        assert!(player.zones.hand.is_empty());
    }

    #[test]
    fn test_life_floor() {
        let mut player = Player::new(PlayerId::new(1), "Bob", 20);
        assert_eq!(player.modify_life(-25), 0);
        assert_eq!(player.modify_life(3), 3);
        assert_eq!(player.set_life(-4), 0);
    }

    #[test]
    fn test_player_counters() {
        let mut player = Player::new(PlayerId::new(1), "Charlie", 20);
        let poison = CounterName::new("poison");

        player.add_counter(poison.clone(), 2);
        assert_eq!(player.get_counter(&poison), 2);
        player.add_counter(poison.clone(), -2);
        assert!(!player.counters.contains_key(&poison));

        player.set_counter(poison.clone(), 0);
        assert!(player.counters.is_empty());
    }

    #[test]
    fn test_commander_tax_floor() {
        let mut player = Player::new(PlayerId::new(1), "Dana", 40);
        assert_eq!(player.adjust_commander_tax(2), 2);
        assert_eq!(player.adjust_commander_tax(-5), 0);

        player.commander_tax = u32::MAX - 1;
        assert_eq!(player.adjust_commander_tax(i32::MAX), u32::MAX);
    }

    #[test]
    fn test_player_counter_saturates() {
        let mut player = Player::new(PlayerId::new(1), "Eve", 20);
        let energy = CounterName::new("energy");
        assert_eq!(player.add_counter(energy.clone(), i32::MAX), i32::MAX);
        assert_eq!(player.add_counter(energy.clone(), i32::MAX), i32::MAX);
        assert_eq!(player.add_counter(energy.clone(), -1), i32::MAX - 1);
    }
}
