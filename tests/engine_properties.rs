//! Rules properties exercised through the wire dispatcher
//!
//! Every test drives the match with the same JSON actions a client would
//! send, then inspects the resulting state.

use mtg_tabletop::{
    core::{CardDefId, CardDefinition, CardInstance, CounterName, InstanceId, PlayerId},
    game::{GameState, MatchConfig, Phase},
    loader::CardCatalog,
    MtgError,
};
use serde_json::{json, Value};
use similar_asserts::assert_eq;

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn catalog() -> CardCatalog {
    let mut catalog = CardCatalog::new();
    catalog.insert(CardDefinition::new("forest", "Forest", "Basic Land — Forest"));
    catalog.insert(CardDefinition::new("bolt", "Lightning Bolt", "Instant"));
    catalog.insert(
        CardDefinition::new("bear", "Grizzly Bears", "Creature — Bear")
            .with_power_toughness("2", "2"),
    );
    catalog.insert(
        CardDefinition::new("angel", "Serra Angel", "Creature — Angel")
            .with_text("Flying, vigilance")
            .with_power_toughness("4", "4"),
    );
    catalog.insert(
        CardDefinition::new("pacifism", "Pacifism", "Enchantment — Aura")
            .with_text("Enchant creature"),
    );
    catalog
}

/// Both players with a small library, starting in P0's MAIN1
fn new_game() -> GameState {
    let mut game = GameState::new_two_player(
        "props",
        (P0, "Alice"),
        (P1, "Bob"),
        &MatchConfig::default().with_seed(11),
    );
    for (idx, owner) in [P0, P1].into_iter().enumerate() {
        for _ in 0..10 {
            let id = game.next_instance_id();
            game.players[idx]
                .zones
                .library
                .push(CardInstance::new(id, CardDefId::new("forest"), owner));
        }
    }
    game.phase = Phase::Main1;
    game
}

fn put(game: &mut GameState, idx: usize, card: &str, battlefield: bool) -> InstanceId {
    let id = game.next_instance_id();
    let owner = game.players[idx].id;
    let instance = CardInstance::new(id, CardDefId::new(card), owner);
    let zones = &mut game.players[idx].zones;
    if battlefield {
        zones.battlefield.push(instance);
    } else {
        zones.hand.push(instance);
    }
    id
}

fn send(game: &mut GameState, catalog: &CardCatalog, action: Value) -> Option<Value> {
    game.process_wire_action(catalog, action)
        .unwrap()
        .map(|result| result.details)
}

#[test]
fn stack_resolves_last_in_first_out() {
    let catalog = catalog();
    let mut game = new_game();
    let first = put(&mut game, 0, "bolt", false);
    let second = put(&mut game, 1, "bolt", false);

    let cast = |player: u32, card: InstanceId| {
        json!({"player_id": player, "action_type": "play_card", "card_id": card})
    };
    send(&mut game, &catalog, cast(0, first));
    assert_eq!(game.priority_player_id(), P1);
    send(&mut game, &catalog, cast(1, second));
    assert_eq!(game.priority_player_id(), P0);
    assert_eq!(game.stack.ids(), vec![first, second]);

    let details = send(&mut game, &catalog, json!({"player_id": 0, "action_type": "pass_priority"}))
        .unwrap();
    assert_eq!(details["outcome"], "resolved");
    assert_eq!(details["unique_id"], json!(second));
    assert!(game.players[1].zones.graveyard.contains(second));
    assert_eq!(game.stack.ids(), vec![first]);

    send(&mut game, &catalog, json!({"player_id": 1, "action_type": "resolve_stack"}));
    assert!(game.stack.is_empty());
    assert!(game.players[0].zones.graveyard.contains(first));
    assert_eq!(game.priority_player_id(), P0);
}

#[test]
fn declaring_no_attackers_skips_to_main2() {
    let catalog = catalog();
    let mut game = new_game();
    put(&mut game, 0, "bear", true);

    send(&mut game, &catalog, json!({"player_id": 0, "action_type": "pass_phase"}));
    assert_eq!(game.phase, Phase::Attack);

    let details = send(
        &mut game,
        &catalog,
        json!({"player_id": 0, "action_type": "declare_attackers",
               "additional_data": {"attacking_creatures": []}}),
    )
    .unwrap();
    assert_eq!(details["skipped_to_main2"], true);
    assert_eq!(game.phase, Phase::Main2);
    assert!(game
        .history
        .phase_changes()
        .contains(&(Phase::Attack, Phase::Main2, true)));
}

#[test]
fn vigilance_attackers_stay_untapped() {
    let catalog = catalog();
    let mut game = new_game();
    let bear = put(&mut game, 0, "bear", true);
    let angel = put(&mut game, 0, "angel", true);

    send(&mut game, &catalog, json!({"player_id": 0, "action_type": "pass_phase"}));
    send(
        &mut game,
        &catalog,
        json!({"player_id": 0, "action_type": "declare_attackers",
               "additional_data": {"attacking_creatures": [bear, angel]}}),
    );

    let battlefield = &game.players[0].zones.battlefield;
    assert!(battlefield.get(bear).unwrap().tapped);
    assert!(!battlefield.get(angel).unwrap().tapped);
    assert!(battlefield.get(angel).unwrap().attacking);
    assert_eq!(game.phase, Phase::Block);
    assert_eq!(game.priority_player_id(), P1);
}

#[test]
fn full_combat_through_priority_passes() {
    let catalog = catalog();
    let mut game = new_game();
    let bear = put(&mut game, 0, "bear", true);
    let blocker = put(&mut game, 1, "bear", true);

    send(&mut game, &catalog, json!({"player_id": 0, "action_type": "pass_phase"}));
    send(
        &mut game,
        &catalog,
        json!({"player_id": 0, "action_type": "preview_attackers",
               "additional_data": {"attacking_creatures": [bear]}}),
    );
    // Wrong player passes: priority goes back to the attacker
    let details = send(&mut game, &catalog, json!({"player_id": 1, "action_type": "pass_priority"}))
        .unwrap();
    assert_eq!(details["combat"], "redirected");
    assert_eq!(game.phase, Phase::Attack);

    send(&mut game, &catalog, json!({"player_id": 0, "action_type": "pass_priority"}));
    assert_eq!(game.phase, Phase::Block);

    send(
        &mut game,
        &catalog,
        json!({"player_id": 1, "action_type": "declare_blockers",
               "additional_data": {"blocking_assignments": {blocker.to_string(): bear}}}),
    );
    assert_eq!(game.phase, Phase::Damage);
    assert_eq!(
        game.players[1].zones.battlefield.get(blocker).unwrap().blocking,
        Some(bear)
    );

    send(&mut game, &catalog, json!({"player_id": 0, "action_type": "combat_damage"}));
    assert_eq!(game.phase, Phase::Main2);
    assert!(!game.players[0].zones.battlefield.get(bear).unwrap().attacking);
    assert_eq!(game.players[1].zones.battlefield.get(blocker).unwrap().blocking, None);
}

#[test]
fn attachments_leave_with_their_host() {
    let catalog = catalog();
    let mut game = new_game();
    let bear = put(&mut game, 1, "bear", true);
    let aura = put(&mut game, 0, "pacifism", true);

    send(
        &mut game,
        &catalog,
        json!({"player_id": 0, "action_type": "attach_card", "card_id": aura,
               "additional_data": {"host_unique_id": bear}}),
    );
    assert_eq!(game.card(aura).unwrap().attached_to, Some(bear));
    assert!(game.players[1].zones.battlefield.contains(aura));

    send(
        &mut game,
        &catalog,
        json!({"player_id": 1, "action_type": "move_card", "card_id": bear,
               "additional_data": {"source_zone": "battlefield", "destination_zone": "graveyard"}}),
    );
    assert!(game.players[1].zones.graveyard.contains(bear));
    let aura_card = game.players[0].zones.reveal_zone.get(aura).unwrap();
    assert_eq!(aura_card.attached_to, None);
    assert_eq!(aura_card.attachment_order, None);
}

#[test]
fn end_step_needs_both_passes_to_swap_turns() {
    let catalog = catalog();
    let mut game = new_game();
    game.phase = Phase::End;

    let details = send(&mut game, &catalog, json!({"player_id": 0, "action_type": "pass_priority"}))
        .unwrap();
    assert_eq!(details["pass"], "handed_off");
    assert_eq!(game.priority_player_id(), P1);
    assert_eq!(game.active_player_id(), P0);

    // A repeated pass by the active player changes nothing
    assert_eq!(
        send(&mut game, &catalog, json!({"player_id": 0, "action_type": "pass_priority"})),
        None
    );

    let hand_before = game.players[1].zones.hand.len();
    send(&mut game, &catalog, json!({"player_id": 1, "action_type": "pass_priority"}));
    assert_eq!(game.active_player_id(), P1);
    assert_eq!(game.phase, Phase::Begin);
    assert_eq!(game.turn, 2);
    assert_eq!(game.round, 1);
    assert_eq!(game.players[1].zones.hand.len(), hand_before + 1);
}

#[test]
fn life_never_drops_below_zero() {
    let catalog = catalog();
    let mut game = new_game();

    let details = send(
        &mut game,
        &catalog,
        json!({"player_id": 0, "action_type": "modify_life", "target": 1,
               "additional_data": {"amount": -25}}),
    )
    .unwrap();
    assert_eq!(details["life"], 0);
    assert_eq!(game.players[1].life, 0);

    send(
        &mut game,
        &catalog,
        json!({"player_id": 0, "action_type": "set_life",
               "additional_data": {"target_player": 0, "life": -3}}),
    );
    assert_eq!(game.players[0].life, 0);
}

#[test]
fn removing_counters_past_zero_is_idempotent() {
    let catalog = catalog();
    let mut game = new_game();
    let bear = put(&mut game, 0, "bear", true);
    let plus = CounterName::new("+1/+1");

    let add = json!({"player_id": 0, "action_type": "add_counter", "card_id": bear,
                     "additional_data": {"counter_name": "+1/+1", "amount": 2}});
    let remove = json!({"player_id": 0, "action_type": "remove_counter", "card_id": bear,
                        "additional_data": {"counter_name": "+1/+1", "amount": 5}});

    send(&mut game, &catalog, add);
    assert_eq!(game.card(bear).unwrap().get_counter(&plus), 2);

    send(&mut game, &catalog, remove.clone());
    assert!(!game.card(bear).unwrap().counters.contains_key(&plus));
    let before = serde_json::to_value(&game.players).unwrap();

    let details = send(&mut game, &catalog, remove).unwrap();
    assert_eq!(details["value"], 0);
    assert_eq!(serde_json::to_value(&game.players).unwrap(), before);
}

#[test]
fn huge_counter_additions_saturate() {
    let catalog = catalog();
    let mut game = new_game();
    let bear = put(&mut game, 0, "bear", true);

    let card_counter = json!({"player_id": 0, "action_type": "add_counter", "card_id": bear,
                              "additional_data": {"counter_name": "charge", "amount": i32::MAX}});
    let player_counter = json!({"player_id": 0, "action_type": "add_player_counter",
                                "additional_data": {"counter_name": "energy", "amount": i32::MAX}});

    for _ in 0..2 {
        let details = send(&mut game, &catalog, card_counter.clone()).unwrap();
        assert_eq!(details["value"], i32::MAX);
        let details = send(&mut game, &catalog, player_counter.clone()).unwrap();
        assert_eq!(details["value"], i32::MAX);
    }
    assert_eq!(game.card(bear).unwrap().get_counter(&CounterName::new("charge")), i32::MAX);
    assert_eq!(game.players[0].get_counter(&CounterName::new("energy")), i32::MAX);
}

#[test]
fn rejected_actions_leave_state_untouched() {
    let catalog = catalog();
    let mut game = new_game();
    put(&mut game, 0, "bear", true);
    let before = serde_json::to_value(&game).unwrap();

    let unknown = game
        .process_wire_action(&catalog, json!({"player_id": 0, "action_type": "cast_fireball"}))
        .unwrap_err();
    assert!(matches!(unknown, MtgError::UnknownAction(_)));

    let missing = game
        .process_wire_action(&catalog, json!({"player_id": 0, "action_type": "modify_life",
                                             "additional_data": {"amount": 3}}))
        .unwrap_err();
    assert!(matches!(missing, MtgError::InvalidInput(_)));

    let absent = game
        .process_wire_action(
            &catalog,
            json!({"player_id": 0, "action_type": "move_card", "card_id": 999,
                   "additional_data": {"source_zone": "hand", "destination_zone": "graveyard"}}),
        )
        .unwrap_err();
    assert!(matches!(absent, MtgError::NotFound(_)));

    let out_of_step = game
        .process_wire_action(&catalog, json!({"player_id": 0, "action_type": "combat_damage"}))
        .unwrap_err();
    assert!(matches!(out_of_step, MtgError::IllegalState(_)));

    assert_eq!(serde_json::to_value(&game).unwrap(), before);
}
