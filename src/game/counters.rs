//! Life, counters, commander tax and mana

use crate::core::{CardLookup, CardType, Color, CounterName, InstanceId, PlayerId};
use crate::game::GameState;
use crate::Result;

impl GameState {
    /// Adjust a card counter by `delta` and return the new value.
    ///
    /// The loyalty counter of a planeswalker is mirrored into its `loyalty`.
    pub fn add_card_counter(
        &mut self,
        catalog: &dyn CardLookup,
        id: InstanceId,
        name: CounterName,
        delta: i32,
    ) -> Result<i32> {
        let card = self.card_mut(id)?;
        let value = card.add_counter(name.clone(), delta);
        sync_loyalty(catalog, card, &name, value);
        Ok(value)
    }

    /// Force a card counter to an absolute value
    pub fn set_card_counter(
        &mut self,
        catalog: &dyn CardLookup,
        id: InstanceId,
        name: CounterName,
        value: i32,
    ) -> Result<i32> {
        let card = self.card_mut(id)?;
        let value = card.set_counter(name.clone(), value);
        sync_loyalty(catalog, card, &name, value);
        Ok(value)
    }

    pub fn add_player_counter(
        &mut self,
        player: PlayerId,
        name: CounterName,
        delta: i32,
    ) -> Result<i32> {
        Ok(self.get_player_mut(player)?.add_counter(name, delta))
    }

    pub fn set_player_counter(
        &mut self,
        player: PlayerId,
        name: CounterName,
        value: i32,
    ) -> Result<i32> {
        Ok(self.get_player_mut(player)?.set_counter(name, value))
    }

    /// Life never drops below 0
    pub fn modify_life(&mut self, player: PlayerId, amount: i32) -> Result<i32> {
        Ok(self.get_player_mut(player)?.modify_life(amount))
    }

    pub fn set_life(&mut self, player: PlayerId, life: i32) -> Result<i32> {
        Ok(self.get_player_mut(player)?.set_life(life))
    }

    pub fn adjust_commander_tax(&mut self, player: PlayerId, delta: i32) -> Result<u32> {
        Ok(self.get_player_mut(player)?.adjust_commander_tax(delta))
    }

    pub fn add_mana(&mut self, player: PlayerId, color: Color, amount: i32) -> Result<u32> {
        let pool = &mut self.get_player_mut(player)?.mana_pool;
        pool.adjust(color, amount);
        Ok(pool.amount(color))
    }

    pub fn clear_mana_pool(&mut self, player: PlayerId) -> Result<()> {
        self.get_player_mut(player)?.mana_pool.clear();
        Ok(())
    }
}

fn sync_loyalty(
    catalog: &dyn CardLookup,
    card: &mut crate::core::CardInstance,
    name: &CounterName,
    value: i32,
) {
    if !name.is_loyalty() {
        return;
    }
    let definition = GameState::definition(catalog, card);
    if card.is_type(definition, CardType::Planeswalker) {
        card.loyalty = Some(value);
    }
}
