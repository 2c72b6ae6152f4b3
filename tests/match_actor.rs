//! Match actors under concurrent submissions

use mtg_tabletop::{
    core::{CardDefId, CardDefinition, CardInstance, MatchId, PlayerId},
    game::{actions::LifePayload, ActionKind, GameAction, GameState, MatchConfig, Phase},
    loader::CardCatalog,
    session::{MatchEvent, MatchHandle, MatchRegistry, SharedCatalog},
    MtgError,
};
use serde_json::json;
use std::sync::Arc;

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn shared_catalog() -> SharedCatalog {
    let mut catalog = CardCatalog::new();
    catalog.insert(CardDefinition::new("forest", "Forest", "Basic Land — Forest"));
    Arc::new(catalog)
}

fn new_state(id: &str) -> GameState {
    let mut game =
        GameState::new_two_player(id, (P0, "Alice"), (P1, "Bob"), &MatchConfig::default());
    for (idx, owner) in [P0, P1].into_iter().enumerate() {
        for _ in 0..5 {
            let card_id = game.next_instance_id();
            game.players[idx]
                .zones
                .library
                .push(CardInstance::new(card_id, CardDefId::new("forest"), owner));
        }
    }
    game
}

fn drain(amount: i32, target: PlayerId) -> GameAction {
    GameAction::new(
        P0,
        ActionKind::ModifyLife(LifePayload {
            target_player: target,
            amount,
        }),
    )
}

#[tokio::test]
async fn concurrent_submissions_are_serialized() {
    let handle = MatchHandle::spawn(new_state("race"), shared_catalog());

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.submit(drain(-1, P1)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let state = handle.snapshot().await.unwrap();
    assert_eq!(state.players[1].life, 0);
    assert_eq!(state.history.actions().count(), 20);
}

#[tokio::test]
async fn subscribers_see_committed_actions_only() {
    let handle = MatchHandle::spawn(new_state("events"), shared_catalog());
    let mut events = handle.subscribe();

    let rejected = handle
        .submit_wire(json!({"player_id": 7, "action_type": "pass_phase"}))
        .await
        .unwrap_err();
    assert!(matches!(rejected, MtgError::NotFound(_)));

    handle
        .submit_wire(json!({"player_id": 0, "action_type": "pass_phase"}))
        .await
        .unwrap();

    match events.recv().await.unwrap() {
        MatchEvent::Action { match_id, result } => {
            assert_eq!(match_id.as_str(), "events");
            assert_eq!(result.action, "pass_phase");
            assert_eq!(result.player_id, P0);
            assert_eq!(result.details["to"], "BEGIN");
        }
        other => panic!("unexpected event {other:?}"),
    }
    match events.recv().await.unwrap() {
        MatchEvent::Log { match_id, lines } => {
            assert_eq!(match_id.as_str(), "events");
            assert_eq!(lines.first().map(String::as_str), Some("Turn 1: PREGAME -> BEGIN"));
            assert_eq!(lines.last().map(String::as_str), Some("P0 pass_phase"));
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn registry_runs_matches_independently() {
    let registry = MatchRegistry::new(shared_catalog());
    let a = registry.create(new_state("a")).await.unwrap();
    registry.create(new_state("b")).await.unwrap();

    a.submit(GameAction::new(P0, ActionKind::PassPhase)).await.unwrap();
    let b = MatchId::new("b");
    registry.submit(&b, drain(-5, P0)).await.unwrap();

    let a_state = a.snapshot().await.unwrap();
    let b_state = registry.get(&b).await.unwrap().snapshot().await.unwrap();
    assert_eq!(a_state.phase, Phase::Begin);
    assert_eq!(a_state.players[0].life, 20);
    assert_eq!(b_state.phase, Phase::Pregame);
    assert_eq!(b_state.players[0].life, 15);

    let final_a = registry.remove(&MatchId::new("a")).await.unwrap();
    assert_eq!(final_a.players[0].zones.hand.len(), 1);
    assert!(matches!(
        a.submit(GameAction::new(P0, ActionKind::PassPhase)).await,
        Err(MtgError::MatchClosed(_))
    ));
    assert_eq!(registry.list().await.len(), 1);
}
