//! Action throughput benchmarks
//!
//! Measures how fast the dispatcher commits actions:
//!
//! 1. **Turn cycle** - full turns of phase passes, draws and END negotiation
//! 2. **Combat** - attack, block and damage with a board of creatures
//! 3. **Wire parsing** - JSON action parsing alone

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mtg_tabletop::{
    core::{CardDefId, CardDefinition, CardInstance, PlayerId},
    game::{GameAction, GameState, MatchConfig, Phase, VerbosityLevel},
    loader::{CardCatalog, DeckLoader, GameInitializer, Seat},
};
use serde_json::json;

fn catalog() -> CardCatalog {
    let mut catalog = CardCatalog::new();
    catalog.insert(CardDefinition::new("forest", "Forest", "Basic Land — Forest"));
    catalog.insert(
        CardDefinition::new("bear", "Grizzly Bears", "Creature — Bear")
            .with_power_toughness("2", "2"),
    );
    catalog
}

fn new_game(catalog: &CardCatalog, seed: u64) -> GameState {
    let deck = DeckLoader::parse("20 forest\n20 bear").expect("bench deck");
    let config = MatchConfig::default().with_seed(seed);
    let mut game = GameInitializer::new(catalog)
        .init_game(
            "bench",
            &config,
            [
                Seat::new(PlayerId::new(0), "Player 1", deck.clone()),
                Seat::new(PlayerId::new(1), "Player 2", deck),
            ],
        )
        .expect("bench game");
    game.logger.set_verbosity(VerbosityLevel::Silent);
    game
}

fn action(value: serde_json::Value) -> GameAction {
    GameAction::from_value(value).expect("bench action")
}

/// One full turn from BEGIN: six phase passes, then both END passes
fn turn_script(active: u32) -> Vec<GameAction> {
    let other = 1 - active;
    let mut script: Vec<GameAction> = (0..6)
        .map(|_| action(json!({"player_id": active, "action_type": "pass_phase"})))
        .collect();
    script.push(action(json!({"player_id": active, "action_type": "pass_priority"})));
    script.push(action(json!({"player_id": other, "action_type": "pass_priority"})));
    script
}

fn bench_turn_cycle(c: &mut Criterion) {
    let catalog = catalog();
    let mut group = c.benchmark_group("turn_cycle");

    for turns in [1u32, 10] {
        let mut script = vec![action(json!({"player_id": 0, "action_type": "pass_phase"}))];
        for turn in 0..turns {
            script.extend(turn_script(turn % 2));
        }

        group.bench_with_input(BenchmarkId::new("turns", turns), &script, |b, script| {
            let initial = new_game(&catalog, 42);
            b.iter(|| {
                let mut game = initial.clone();
                for action in script {
                    game.process_action(&catalog, action).expect("turn action");
                }
                black_box(game.turn)
            })
        });
    }
    group.finish();
}

fn bench_combat(c: &mut Criterion) {
    let catalog = catalog();
    let mut initial = new_game(&catalog, 7);
    for idx in 0..2 {
        for _ in 0..10 {
            let id = initial.next_instance_id();
            let owner = initial.players[idx].id;
            initial.players[idx]
                .zones
                .battlefield
                .push(CardInstance::new(id, CardDefId::new("bear"), owner));
        }
    }
    initial.phase = Phase::Main1;

    let attackers = initial.players[0].zones.battlefield.ids();
    let blockers = initial.players[1].zones.battlefield.ids();
    let assignments: serde_json::Map<String, serde_json::Value> = blockers
        .iter()
        .zip(&attackers)
        .map(|(b, a)| (b.to_string(), json!(a)))
        .collect();
    let script = vec![
        action(json!({"player_id": 0, "action_type": "pass_phase"})),
        action(json!({"player_id": 0, "action_type": "declare_attackers",
                      "additional_data": {"attacking_creatures": attackers}})),
        action(json!({"player_id": 1, "action_type": "declare_blockers",
                      "additional_data": {"blocking_assignments": assignments}})),
        action(json!({"player_id": 0, "action_type": "combat_damage"})),
    ];

    c.bench_function("combat_ten_on_ten", |b| {
        b.iter(|| {
            let mut game = initial.clone();
            for action in &script {
                game.process_action(&catalog, action).expect("combat action");
            }
            black_box(game.phase)
        })
    });
}

fn bench_wire_parsing(c: &mut Criterion) {
    let raw = json!({"player_id": 0, "action_type": "move_card", "card_id": 12,
                     "additional_data": {"source_zone": "hand", "destination_zone": "battlefield",
                                         "position": "top"}});
    c.bench_function("parse_move_card", |b| {
        b.iter(|| black_box(GameAction::from_value(raw.clone()).expect("parse")))
    });
}

criterion_group!(benches, bench_turn_cycle, bench_combat, bench_wire_parsing);
criterion_main!(benches);
