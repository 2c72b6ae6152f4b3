//! Moving cards between zones
//!
//! Every zone change in the engine goes through [`GameState::relocate`], so
//! the clearing rules and attachment-chain handling live in one place.

use crate::core::{CardInstance, InstanceId, PlayerId};
use crate::game::logger::log_if_verbose;
use crate::game::{GameState, ZoneRef};
use crate::zones::{Zone, ZonePosition};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};

/// What a relocation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    pub unique_id: InstanceId,
    pub destination: ZoneRef,
    /// Attachments that followed the card (battlefield to battlefield)
    pub carried: Vec<InstanceId>,
    /// Attachments that fell off into their owners' reveal zones
    pub detached: Vec<InstanceId>,
}

/// Reset the fields a zone change clears
fn prepare_for_zone(card: &mut CardInstance, zone: Zone) {
    if zone != Zone::Battlefield {
        card.clear_combat();
        card.clear_attachment();
    }
    if zone.resets_tapped() {
        card.untap();
        card.targeted = false;
    }
    if !zone.keeps_face_down() {
        card.turn_face_up();
    }
}

impl GameState {
    /// Move a card from `from` to `to`.
    ///
    /// Graveyard, exile and library always resolve to the card's owner.
    /// A battlefield card takes its attachment chain along when it stays on
    /// a battlefield; otherwise the chain detaches into the attachments'
    /// owners' reveal zones.
    pub fn relocate(
        &mut self,
        id: InstanceId,
        from: ZoneRef,
        to: ZoneRef,
        position: Option<ZonePosition>,
    ) -> Result<MoveReport> {
        // validate everything before the first mutation
        if !self.zone(from)?.contains(id) {
            return Err(MtgError::NotFound(format!("card {id} in {from}")));
        }
        let owner = self.zone(from)?.get(id).map(|c| c.owner_id);
        let to = match (to, owner) {
            (ZoneRef::Player(_, zone), Some(owner)) if zone.forces_owner() => {
                ZoneRef::Player(owner, zone)
            }
            _ => to,
        };
        self.zone(to)?;

        let mut card = self
            .zone_mut(from)?
            .remove(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id} in {from}")))?;
        let previous_host = card.attached_to;

        let chain = if from.zone() == Zone::Battlefield {
            self.extract_attachment_chain(id)
        } else {
            Vec::new()
        };

        prepare_for_zone(&mut card, to.zone());

        let mut report = MoveReport {
            unique_id: id,
            destination: to,
            carried: Vec::new(),
            detached: Vec::new(),
        };

        if to.zone() == Zone::Battlefield {
            let zone = self.zone_mut(to)?;
            zone.insert_at(card, position);
            let host_pos = zone.position(id).unwrap_or(0);
            for (offset, attachment) in chain.into_iter().enumerate() {
                report.carried.push(attachment.unique_id);
                zone.cards.insert(host_pos + 1 + offset, attachment);
            }
        } else {
            self.zone_mut(to)?.insert_at(card, position);
            for mut attachment in chain {
                prepare_for_zone(&mut attachment, Zone::RevealZone);
                report.detached.push(attachment.unique_id);
                let reveal = ZoneRef::Player(attachment.owner_id, Zone::RevealZone);
                self.zone_mut(reveal)?.push(attachment);
            }
        }

        if let Some(host) = previous_host {
            self.compact_attachments(host);
        }

        log_if_verbose!(self.logger, "{id} moves from {from} to {to}");
        Ok(report)
    }

    /// Ids attached directly to `host`, in attachment order
    pub fn attachments_of(&self, host: InstanceId) -> Vec<InstanceId> {
        let mut attached: Vec<(Option<u32>, InstanceId)> = self
            .players
            .iter()
            .flat_map(|p| p.zones.battlefield.iter())
            .filter(|c| c.attached_to == Some(host))
            .map(|c| (c.attachment_order, c.unique_id))
            .collect();
        // unordered entries sort after ordered ones
        attached.sort_by_key(|&(order, id)| (order.is_none(), order, id));
        attached.into_iter().map(|(_, id)| id).collect()
    }

    /// Every card transitively attached to `host`, depth first
    pub fn attachment_chain(&self, host: InstanceId) -> Vec<InstanceId> {
        let mut chain = Vec::new();
        let mut pending = self.attachments_of(host);
        pending.reverse();
        while let Some(id) = pending.pop() {
            if id == host || chain.contains(&id) {
                continue;
            }
            chain.push(id);
            let mut children = self.attachments_of(id);
            children.reverse();
            pending.extend(children);
        }
        chain
    }

    /// Pull the whole chain under `host` off the battlefields, depth first
    fn extract_attachment_chain(&mut self, host: InstanceId) -> Vec<CardInstance> {
        let mut extracted = Vec::new();
        for child in self.attachments_of(host) {
            let Some(idx) = self.battlefield_of(child) else {
                continue;
            };
            if let Some(card) = self.players[idx].zones.battlefield.remove(child) {
                extracted.push(card);
                extracted.extend(self.extract_attachment_chain(child));
            }
        }
        extracted
    }

    /// Renumber the host's attachments densely from 0
    pub(crate) fn compact_attachments(&mut self, host: InstanceId) {
        for (order, id) in self.attachments_of(host).into_iter().enumerate() {
            if let Ok(card) = self.battlefield_card_mut(id) {
                card.attachment_order = Some(order as u32);
            }
        }
    }

    /// Move a card between any two zones on behalf of `actor`.
    /// Missing players default to `actor`; the stack needs none.
    #[allow(clippy::too_many_arguments)]
    pub fn move_card(
        &mut self,
        actor: PlayerId,
        id: InstanceId,
        source_player: Option<PlayerId>,
        source_zone: Zone,
        destination_player: Option<PlayerId>,
        destination_zone: Zone,
        position: Option<ZonePosition>,
    ) -> Result<MoveReport> {
        let from = ZoneRef::new(Some(source_player.unwrap_or(actor)), source_zone)?;
        let to = ZoneRef::new(Some(destination_player.unwrap_or(actor)), destination_zone)?;
        let report = self.relocate(id, from, to, position)?;
        if from == ZoneRef::Stack || to == ZoneRef::Stack {
            self.update_priority();
        }
        Ok(report)
    }

    /// Attach a battlefield card to a battlefield host.
    ///
    /// The card (and anything attached to it) is moved next to the host on
    /// the host's battlefield. `order` is clamped into the host's existing
    /// attachments; `None` appends.
    pub fn attach_card(
        &mut self,
        id: InstanceId,
        host: InstanceId,
        order: Option<u32>,
    ) -> Result<()> {
        if id == host {
            return Err(MtgError::InvalidInput(format!(
                "card {id} cannot attach to itself"
            )));
        }
        let card_side = self
            .battlefield_of(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id} on any battlefield")))?;
        if self.battlefield_of(host).is_none() {
            return Err(MtgError::NotFound(format!("host {host} on any battlefield")));
        }
        if self.attachment_chain(id).contains(&host) {
            return Err(MtgError::InvalidInput(format!(
                "attaching {id} to {host} would create a cycle"
            )));
        }

        let mut card = self.players[card_side]
            .zones
            .battlefield
            .remove(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))?;
        let previous_host = card.attached_to;
        let chain = self.extract_attachment_chain(id);

        let siblings: Vec<InstanceId> = self
            .attachments_of(host)
            .into_iter()
            .filter(|&sibling| sibling != id)
            .collect();
        let slot = order
            .map(|o| (o as usize).min(siblings.len()))
            .unwrap_or(siblings.len());
        for (n, sibling) in siblings.iter().enumerate() {
            let shifted = if n >= slot { n + 1 } else { n };
            self.battlefield_card_mut(*sibling)?.attachment_order = Some(shifted as u32);
        }

        card.attached_to = Some(host);
        card.attachment_order = Some(slot as u32);

        let host_side = self
            .battlefield_of(host)
            .ok_or_else(|| MtgError::NotFound(format!("host {host}")))?;
        let battlefield = &mut self.players[host_side].zones.battlefield;
        let host_pos = battlefield
            .position(host)
            .ok_or_else(|| MtgError::NotFound(format!("host {host}")))?;
        battlefield.cards.insert(host_pos + 1, card);
        for (offset, attachment) in chain.into_iter().enumerate() {
            battlefield.cards.insert(host_pos + 2 + offset, attachment);
        }

        self.compact_attachments(host);
        if let Some(previous) = previous_host.filter(|&p| p != host) {
            self.compact_attachments(previous);
        }
        Ok(())
    }

    /// Detach a card; it leaves the battlefield for its owner's reveal zone
    pub fn detach_card(&mut self, id: InstanceId) -> Result<MoveReport> {
        let side = self
            .battlefield_of(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id} on any battlefield")))?;
        let card = self.players[side]
            .zones
            .battlefield
            .get(id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id}")))?;
        if card.attached_to.is_none() {
            return Err(MtgError::IllegalState(format!("card {id} is not attached")));
        }
        let owner = card.owner_id;
        let from = ZoneRef::Player(self.players[side].id, Zone::Battlefield);
        self.relocate(id, from, ZoneRef::Player(owner, Zone::RevealZone), None)
    }
}
