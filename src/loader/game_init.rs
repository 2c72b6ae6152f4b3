//! Match creation from deck lists

use crate::core::{CardInstance, CardLookup, MatchId, PlayerId};
use crate::game::{GameState, MatchConfig};
use crate::loader::DeckList;
use crate::{MtgError, Result};

/// One seat at the table
#[derive(Debug, Clone)]
pub struct Seat {
    pub player_id: PlayerId,
    pub name: String,
    pub deck: DeckList,
}

impl Seat {
    pub fn new(player_id: PlayerId, name: impl Into<String>, deck: DeckList) -> Self {
        Seat {
            player_id,
            name: name.into(),
            deck,
        }
    }
}

/// Builds a ready-to-play match from two validated decks
pub struct GameInitializer<'a> {
    catalog: &'a dyn CardLookup,
}

impl<'a> GameInitializer<'a> {
    pub fn new(catalog: &'a dyn CardLookup) -> Self {
        GameInitializer { catalog }
    }

    /// Validate both decks, instantiate every card, shuffle the libraries,
    /// draw opening hands and seed the command zones
    pub fn init_game(
        &self,
        match_id: impl Into<MatchId>,
        config: &MatchConfig,
        seats: [Seat; 2],
    ) -> Result<GameState> {
        if seats[0].player_id == seats[1].player_id {
            return Err(MtgError::InvalidInput(format!(
                "both seats use player id {}",
                seats[0].player_id
            )));
        }
        for seat in &seats {
            seat.deck
                .validate(config)
                .map_err(|e| MtgError::InvalidInput(format!("{}: {e}", seat.name)))?;
            self.check_cards_exist(&seat.deck)?;
        }

        let [first, second] = seats;
        let mut game = GameState::new_two_player(
            match_id,
            (first.player_id, &first.name),
            (second.player_id, &second.name),
            config,
        );

        for (idx, seat) in [first, second].iter().enumerate() {
            self.load_deck_into_game(&mut game, idx, seat);
        }

        for idx in 0..game.players.len() {
            game.shuffle_library(idx);
            game.draw_cards(idx, config.opening_hand_size)?;
        }

        Ok(game)
    }

    fn check_cards_exist(&self, deck: &DeckList) -> Result<()> {
        for entry in deck.main.iter().chain(deck.commanders.iter()) {
            if self.catalog.definition(&entry.card_id).is_none() {
                return Err(MtgError::NotFound(format!(
                    "card '{}' is not in the catalog",
                    entry.card_id
                )));
            }
        }
        Ok(())
    }

    fn load_deck_into_game(&self, game: &mut GameState, idx: usize, seat: &Seat) {
        for entry in &seat.deck.main {
            for _ in 0..entry.count {
                let id = game.next_instance_id();
                let card = CardInstance::new(id, entry.card_id.clone(), seat.player_id);
                game.players[idx].zones.library.push(card);
            }
        }
        for entry in &seat.deck.commanders {
            for _ in 0..entry.count {
                let id = game.next_instance_id();
                let mut card = CardInstance::new(id, entry.card_id.clone(), seat.player_id);
                card.is_commander = true;
                game.players[idx].zones.commander_zone.push(card);
            }
        }
    }
}
