//! Board annotations and token lifecycle

use crate::core::{CardDefId, CardInstance, CardLookup, InstanceId, PlayerId};
use crate::game::GameState;
use crate::zones::Zone;
use crate::{MtgError, Result};
use smallvec::SmallVec;

/// Token creation parameters
#[derive(Debug, Clone)]
pub struct TokenSpec {
    pub card_id: CardDefId,
    pub controller: PlayerId,
    pub count: usize,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub tapped: bool,
}

fn add_unique(list: &mut SmallVec<[String; 2]>, value: &str) -> bool {
    if list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_matching(list: &mut SmallVec<[String; 2]>, value: &str) -> bool {
    let before = list.len();
    list.retain(|v| !v.eq_ignore_ascii_case(value));
    list.len() != before
}

impl GameState {
    /// Set (or toggle, when `tapped` is None) a battlefield card's tapped flag
    pub fn tap_card(&mut self, id: InstanceId, tapped: Option<bool>) -> Result<bool> {
        let card = self.battlefield_card_mut(id)?;
        card.tapped = tapped.unwrap_or(!card.tapped);
        Ok(card.tapped)
    }

    /// Untap everything on the player's battlefield; returns what changed
    pub fn untap_all(&mut self, player_idx: usize) -> Vec<InstanceId> {
        let mut untapped = Vec::new();
        for card in self.players[player_idx].zones.battlefield.iter_mut() {
            if card.tapped {
                card.untap();
                untapped.push(card.unique_id);
            }
        }
        untapped
    }

    /// Set (or toggle) the targeted marker
    pub fn target_card(&mut self, id: InstanceId, targeted: Option<bool>) -> Result<bool> {
        let card = self.card_mut(id)?;
        card.targeted = targeted.unwrap_or(!card.targeted);
        Ok(card.targeted)
    }

    pub fn add_keyword(&mut self, id: InstanceId, keyword: &str) -> Result<bool> {
        let keyword = non_empty(keyword, "keyword")?;
        Ok(add_unique(&mut self.card_mut(id)?.custom_keywords, keyword))
    }

    pub fn remove_keyword(&mut self, id: InstanceId, keyword: &str) -> Result<bool> {
        Ok(remove_matching(&mut self.card_mut(id)?.custom_keywords, keyword))
    }

    pub fn add_type(&mut self, id: InstanceId, card_type: &str) -> Result<bool> {
        let card_type = non_empty(card_type, "card_type")?;
        Ok(add_unique(&mut self.card_mut(id)?.custom_types, card_type))
    }

    pub fn remove_type(&mut self, id: InstanceId, card_type: &str) -> Result<bool> {
        Ok(remove_matching(&mut self.card_mut(id)?.custom_types, card_type))
    }

    /// Override power and/or toughness; `None` leaves that side unchanged.
    /// An empty string clears the override back to the printed value.
    pub fn set_power_toughness(
        &mut self,
        id: InstanceId,
        power: Option<String>,
        toughness: Option<String>,
    ) -> Result<()> {
        let card = self.card_mut(id)?;
        if let Some(power) = power {
            card.current_power = (!power.is_empty()).then_some(power);
        }
        if let Some(toughness) = toughness {
            card.current_toughness = (!toughness.is_empty()).then_some(toughness);
        }
        Ok(())
    }

    /// Turn a double-faced card to its next face
    pub fn flip_card(&mut self, catalog: &dyn CardLookup, id: InstanceId) -> Result<usize> {
        let card = self.card(id)?;
        let definition = GameState::require_definition(catalog, card)?;
        if !definition.is_double_faced() {
            return Err(MtgError::InvalidInput(format!(
                "{} is not double-faced",
                definition.name
            )));
        }
        let faces = definition.faces.len();
        let card = self.card_mut(id)?;
        card.current_face = (card.current_face + 1) % faces;
        Ok(card.current_face)
    }

    pub fn reveal_face_down(&mut self, id: InstanceId) -> Result<()> {
        let card = self.card_mut(id)?;
        if !card.face_down {
            return Err(MtgError::IllegalState(format!("card {id} is not face down")));
        }
        card.turn_face_up();
        Ok(())
    }

    /// Create tokens on the controller's battlefield
    pub fn create_tokens(
        &mut self,
        catalog: &dyn CardLookup,
        spec: TokenSpec,
    ) -> Result<Vec<InstanceId>> {
        if catalog.definition(&spec.card_id).is_none() {
            return Err(MtgError::NotFound(format!("token definition '{}'", spec.card_id)));
        }
        if spec.count == 0 {
            return Err(MtgError::InvalidInput("token count must be at least 1".to_string()));
        }
        let idx = self.player_idx(spec.controller)?;

        let mut created = Vec::with_capacity(spec.count);
        for _ in 0..spec.count {
            let id = self.next_instance_id();
            let mut token = CardInstance::new(id, spec.card_id.clone(), spec.controller);
            token.is_token = true;
            token.tapped = spec.tapped;
            token.current_power = spec.power.clone();
            token.current_toughness = spec.toughness.clone();
            self.players[idx].zones.battlefield.push(token);
            created.push(id);
        }
        Ok(created)
    }

    /// Copy a battlefield card as a token next to the original.
    /// Counters and annotations are copied; combat, attachment and
    /// commander status are not.
    pub fn duplicate_card(&mut self, id: InstanceId) -> Result<InstanceId> {
        let side = self
            .battlefield_of(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id} on any battlefield")))?;
        let original = self.players[side]
            .zones
            .battlefield
            .get(id)
            .cloned()
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))?;

        let copy_id = self.next_instance_id();
        let mut copy = original;
        copy.unique_id = copy_id;
        copy.is_token = true;
        copy.is_commander = false;
        copy.targeted = false;
        copy.clear_combat();
        copy.clear_attachment();

        let battlefield = &mut self.players[side].zones.battlefield;
        let pos = battlefield.position(id).map_or(battlefield.len(), |p| p + 1);
        battlefield.cards.insert(pos, copy);
        Ok(copy_id)
    }

    /// Remove a token from the game entirely. Anything attached to it falls
    /// off into the owners' reveal zones.
    pub fn delete_token(&mut self, id: InstanceId) -> Result<()> {
        let location = self
            .locate(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))?;
        if !self.card(id)?.is_token {
            return Err(MtgError::IllegalState(format!("card {id} is not a token")));
        }

        if location.zone() == Zone::Battlefield {
            // route through relocate so the chain and host orders are handled
            let owner = self.card(id)?.owner_id;
            let reveal = crate::game::ZoneRef::Player(owner, Zone::RevealZone);
            self.relocate(id, location, reveal, None)?;
            self.zone_mut(reveal)?.remove(id);
        } else {
            self.zone_mut(location)?.remove(id);
        }
        self.update_priority();
        Ok(())
    }
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MtgError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(value)
}
