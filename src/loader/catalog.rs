//! In-memory card catalog
//!
//! Holds the static card definitions a match looks up by `CardDefId`.
//! Catalog files are JSON arrays of definitions.

use crate::core::{CardDefId, CardDefinition, CardLookup};
use crate::{MtgError, Result};
use rustc_hash::FxHashMap;
use std::path::Path;

/// Card definitions keyed by id
#[derive(Debug, Clone, Default)]
pub struct CardCatalog {
    cards: FxHashMap<CardDefId, CardDefinition>,
}

impl CardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a definition
    pub fn insert(&mut self, definition: CardDefinition) {
        self.cards.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, card_id: &CardDefId) -> Option<&CardDefinition> {
        self.cards.get(card_id)
    }

    pub fn contains(&self, card_id: &CardDefId) -> bool {
        self.cards.contains_key(card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Parse a JSON array of definitions
    pub fn from_json(json: &str) -> Result<Self> {
        let definitions: Vec<CardDefinition> = serde_json::from_str(json)
            .map_err(|e| MtgError::InvalidInput(format!("card catalog: {e}")))?;
        let mut catalog = CardCatalog::new();
        for definition in definitions {
            catalog.insert(definition);
        }
        Ok(catalog)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Async variant for the match server
    pub async fn load_from_file_async(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }
}

impl CardLookup for CardCatalog {
    fn definition(&self, card_id: &CardDefId) -> Option<&CardDefinition> {
        self.cards.get(card_id)
    }
}
