//! Mana colors and the per-player mana pool

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mana colors in MTG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
    Colorless,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "W"),
            Color::Blue => write!(f, "U"),
            Color::Black => write!(f, "B"),
            Color::Red => write!(f, "R"),
            Color::Green => write!(f, "G"),
            Color::Colorless => write!(f, "C"),
        }
    }
}

/// Mana pool for a player
///
/// Pure bookkeeping: the engine does not pay costs, players adjust the pool
/// by hand the way they would on a physical table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    pub white: u32,
    pub blue: u32,
    pub black: u32,
    pub red: u32,
    pub green: u32,
    pub colorless: u32,
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, color: Color) -> &mut u32 {
        match color {
            Color::White => &mut self.white,
            Color::Blue => &mut self.blue,
            Color::Black => &mut self.black,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Colorless => &mut self.colorless,
        }
    }

    pub fn amount(&self, color: Color) -> u32 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Colorless => self.colorless,
        }
    }

    /// Add (or, with a negative amount, remove) mana of one color, clamped
    /// to `0..=u32::MAX`
    pub fn adjust(&mut self, color: Color, amount: i32) {
        let slot = self.slot_mut(color);
        *slot = slot.saturating_add_signed(amount);
    }

    pub fn total(&self) -> u32 {
        [self.white, self.blue, self.black, self.red, self.green, self.colorless]
            .into_iter()
            .fold(0u32, u32::saturating_add)
    }

    pub fn clear(&mut self) {
        *self = ManaPool::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_and_clear() {
        let mut pool = ManaPool::new();
        pool.adjust(Color::Red, 2);
        pool.adjust(Color::Green, 1);
        assert_eq!(pool.amount(Color::Red), 2);
        assert_eq!(pool.total(), 3);

        pool.adjust(Color::Red, -5);
        assert_eq!(pool.amount(Color::Red), 0);

        pool.clear();
        assert_eq!(pool.total(), 0);
    }

    #[test]
    fn test_adjust_saturates_at_u32_max() {
        let mut pool = ManaPool::new();
        pool.adjust(Color::Green, i32::MAX);
        pool.adjust(Color::Green, i32::MAX);
        pool.adjust(Color::Green, i32::MAX);
        assert_eq!(pool.amount(Color::Green), u32::MAX);

        pool.adjust(Color::Blue, 5);
        assert_eq!(pool.total(), u32::MAX);

        pool.adjust(Color::Green, i32::MIN);
        assert_eq!(pool.amount(Color::Green), u32::MAX - (1 << 31));
    }

    #[test]
    fn test_color_wire_names() {
        let c: Color = serde_json::from_str("\"colorless\"").unwrap();
        assert_eq!(c, Color::Colorless);
        assert_eq!(Color::Blue.to_string(), "U");
    }
}
