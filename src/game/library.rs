//! Library operations: draw, mill, shuffle, mulligan, look and reveal

use crate::core::{InstanceId, PlayerId};
use crate::game::{GameState, ZoneRef};
use crate::zones::{Zone, ZonePosition};
use crate::{MtgError, Result};

impl GameState {
    /// Move up to `count` cards from the top of `from` into `to`, one at a
    /// time. Stops quietly when the zone runs out.
    fn move_from_top(
        &mut self,
        player_idx: usize,
        from: Zone,
        to: Zone,
        count: usize,
    ) -> Result<Vec<InstanceId>> {
        let player = self.players[player_idx].id;
        let source = ZoneRef::Player(player, from);
        let mut moved = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(top) = self.zone(source)?.peek_top().map(|c| c.unique_id) else {
                break;
            };
            self.relocate(top, source, ZoneRef::Player(player, to), None)?;
            moved.push(top);
        }
        Ok(moved)
    }

    /// Draw cards from library to hand. Drawing from an empty library draws
    /// nothing; losing the game is left to the players.
    pub fn draw_cards(&mut self, player_idx: usize, count: usize) -> Result<Vec<InstanceId>> {
        self.move_from_top(player_idx, Zone::Library, Zone::Hand, count)
    }

    pub fn mill(&mut self, player_idx: usize, count: usize) -> Result<Vec<InstanceId>> {
        self.move_from_top(player_idx, Zone::Library, Zone::Graveyard, count)
    }

    /// Put the top cards into the player's private look zone
    pub fn look_at_top(&mut self, player_idx: usize, count: usize) -> Result<Vec<InstanceId>> {
        self.move_from_top(player_idx, Zone::Library, Zone::LookZone, count)
    }

    /// Put the top cards into the player's public reveal zone
    pub fn reveal_top(&mut self, player_idx: usize, count: usize) -> Result<Vec<InstanceId>> {
        self.move_from_top(player_idx, Zone::Library, Zone::RevealZone, count)
    }

    /// Reveal one card from any of the player's zones
    pub fn reveal_card(
        &mut self,
        player: PlayerId,
        id: InstanceId,
        source_zone: Zone,
    ) -> Result<()> {
        if source_zone == Zone::RevealZone {
            return Err(MtgError::IllegalState(format!("card {id} is already revealed")));
        }
        let from = ZoneRef::new(Some(player), source_zone)?;
        let owner = self
            .zone(from)?
            .get(id)
            .map(|c| c.owner_id)
            .ok_or_else(|| MtgError::NotFound(format!("card {id} in {from}")))?;
        self.relocate(id, from, ZoneRef::Player(owner, Zone::RevealZone), None)?;
        if from == ZoneRef::Stack {
            self.update_priority();
        }
        Ok(())
    }

    pub fn shuffle_library(&mut self, player_idx: usize) {
        let player = &mut self.players[player_idx];
        player.zones.library.shuffle(&mut self.rng);
    }

    /// Hand goes back into the library, which is shuffled, then a fresh
    /// hand of `hand_size` is drawn
    pub fn mulligan(&mut self, player_idx: usize, hand_size: usize) -> Result<Vec<InstanceId>> {
        let player = self.players[player_idx].id;
        for id in self.players[player_idx].zones.hand.ids() {
            self.relocate(
                id,
                ZoneRef::Player(player, Zone::Hand),
                ZoneRef::Player(player, Zone::Library),
                Some(ZonePosition::Top),
            )?;
        }
        self.shuffle_library(player_idx);
        let drawn = self.draw_cards(player_idx, hand_size)?;
        self.players[player_idx].mulligans += 1;
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefId, CardInstance};
    use crate::game::MatchConfig;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn game_with_library(size: u32) -> GameState {
        let mut game = GameState::new_two_player(
            "library",
            (P0, "Alice"),
            (P1, "Bob"),
            &MatchConfig::default().with_seed(7),
        );
        for n in 1..=size {
            game.players[0]
                .zones
                .library
                .push(CardInstance::new(InstanceId::new(n), CardDefId::new("c"), P0));
        }
        game
    }

    #[test]
    fn test_draw_takes_from_top() {
        let mut game = game_with_library(5);
        let drawn = game.draw_cards(0, 2).unwrap();
        assert_eq!(drawn, vec![InstanceId::new(5), InstanceId::new(4)]);
        assert_eq!(game.players[0].zones.hand.len(), 2);
        assert_eq!(game.players[0].zones.library.len(), 3);
    }

    #[test]
    fn test_draw_past_empty_library_stops() {
        let mut game = game_with_library(1);
        let drawn = game.draw_cards(0, 3).unwrap();
        assert_eq!(drawn.len(), 1);
        assert!(game.players[0].zones.library.is_empty());
    }

    #[test]
    fn test_mill_look_and_reveal_zones() {
        let mut game = game_with_library(6);
        game.mill(0, 2).unwrap();
        game.look_at_top(0, 1).unwrap();
        game.reveal_top(0, 1).unwrap();

        let zones = &game.players[0].zones;
        assert_eq!(zones.graveyard.ids(), vec![InstanceId::new(6), InstanceId::new(5)]);
        assert_eq!(zones.look_zone.ids(), vec![InstanceId::new(4)]);
        assert_eq!(zones.reveal_zone.ids(), vec![InstanceId::new(3)]);
    }

    #[test]
    fn test_reveal_card_from_hand() {
        let mut game = game_with_library(3);
        game.draw_cards(0, 1).unwrap();
        game.reveal_card(P0, InstanceId::new(3), Zone::Hand).unwrap();
        assert!(game.players[0].zones.reveal_zone.contains(InstanceId::new(3)));
        assert!(game.reveal_card(P0, InstanceId::new(3), Zone::Hand).is_err());
    }

    #[test]
    fn test_mulligan_redraws_full_hand() {
        let mut game = game_with_library(20);
        game.draw_cards(0, 7).unwrap();

        let drawn = game.mulligan(0, 7).unwrap();
        assert_eq!(drawn.len(), 7);
        assert_eq!(game.players[0].zones.hand.len(), 7);
        assert_eq!(game.players[0].zones.library.len(), 13);
        assert_eq!(game.players[0].mulligans, 1);
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let mut a = game_with_library(30);
        let mut b = game_with_library(30);
        a.shuffle_library(0);
        b.shuffle_library(0);
        assert_eq!(a.players[0].zones.library.ids(), b.players[0].zones.library.ids());
        assert_eq!(a.players[0].zones.library.len(), 30);
    }
}
