//! Deck list loader
//!
//! Text format, one entry per line as "count card_id", split into sections:
//!
//! ```text
//! [Commander]
//! 1 atraxa
//! [Main]
//! 20 forest
//! 20 bear
//! ```
//!
//! Lines outside a section belong to the main deck. `#` starts a comment.

use crate::core::CardDefId;
use crate::game::MatchConfig;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Deck loader for text deck lists
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a file; `.json` files are read as a serialized `DeckList`
    pub fn load_from_file(path: &Path) -> Result<DeckList> {
        let content = fs::read_to_string(path)?;
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            return serde_json::from_str(&content)
                .map_err(|e| MtgError::InvalidInput(format!("deck {}: {e}", path.display())));
        }
        Self::parse(&content)
    }

    /// Parse a deck from its text content
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut main = Vec::new();
        let mut commanders = Vec::new();
        let mut in_commander = false;

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                in_commander = line.eq_ignore_ascii_case("[commander]");
                continue;
            }

            let (count_str, card_id) = line.split_once(' ').ok_or_else(|| {
                MtgError::InvalidInput(format!("line {}: expected 'count card_id'", line_no + 1))
            })?;
            let count = count_str.parse::<u8>().map_err(|_| {
                MtgError::InvalidInput(format!("line {}: bad count '{count_str}'", line_no + 1))
            })?;

            let entry = DeckEntry {
                card_id: CardDefId::new(card_id.trim()),
                count,
            };
            if in_commander {
                commanders.push(entry);
            } else {
                main.push(entry);
            }
        }

        if main.is_empty() {
            return Err(MtgError::InvalidInput("empty deck".to_string()));
        }

        Ok(DeckList { main, commanders })
    }
}

/// A deck entry (card id and count)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card_id: CardDefId,
    pub count: u8,
}

/// A complete deck list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub main: Vec<DeckEntry>,
    #[serde(default)]
    pub commanders: Vec<DeckEntry>,
}

impl DeckList {
    /// Total cards in the main deck
    pub fn total_cards(&self) -> usize {
        self.main.iter().map(|e| e.count as usize).sum()
    }

    pub fn commander_count(&self) -> usize {
        self.commanders.iter().map(|e| e.count as usize).sum()
    }

    /// Format checks done before a match is created
    pub fn validate(&self, config: &MatchConfig) -> Result<()> {
        let total = self.total_cards();
        if total < config.min_deck_size {
            return Err(MtgError::InvalidInput(format!(
                "deck has {total} main cards, needs at least {}",
                config.min_deck_size
            )));
        }
        let commanders = self.commander_count();
        if config.format.uses_commanders() && commanders != 1 {
            return Err(MtgError::InvalidInput(format!(
                "commander decks need exactly one commander, found {commanders}"
            )));
        }
        Ok(())
    }
}
