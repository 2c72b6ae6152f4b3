//! Match actors
//!
//! Each running match lives in its own tokio task that exclusively owns the
//! `GameState`. Callers talk to it through a [`MatchHandle`]; submissions are
//! queued on an mpsc channel and answered over a oneshot, so two players
//! acting at once are serialized instead of raced. Every committed action is
//! published on a broadcast channel for spectators and transports, followed
//! by the log lines it produced.

use crate::core::{CardLookup, MatchId};
use crate::game::{ActionResult, GameAction, GameState};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

/// Shared card catalog used by match actors
pub type SharedCatalog = Arc<dyn CardLookup + Send + Sync>;

const COMMAND_QUEUE: usize = 64;
const EVENT_BUFFER: usize = 256;

/// Published by a match after each committed action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MatchEvent {
    Action {
        match_id: MatchId,
        result: ActionResult,
    },
    /// Log lines captured while the last action was applied
    Log {
        match_id: MatchId,
        lines: Vec<String>,
    },
    Closed {
        match_id: MatchId,
    },
}

enum Command {
    Submit {
        action: GameAction,
        reply: oneshot::Sender<Result<Option<ActionResult>>>,
    },
    SubmitWire {
        raw: Value,
        reply: oneshot::Sender<Result<Option<ActionResult>>>,
    },
    Snapshot {
        reply: oneshot::Sender<GameState>,
    },
    Shutdown {
        reply: oneshot::Sender<GameState>,
    },
}

/// Cloneable handle to a running match
#[derive(Debug, Clone)]
pub struct MatchHandle {
    match_id: MatchId,
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<MatchEvent>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::Submit { .. } => "Submit",
            Command::SubmitWire { .. } => "SubmitWire",
            Command::Snapshot { .. } => "Snapshot",
            Command::Shutdown { .. } => "Shutdown",
        };
        f.write_str(name)
    }
}

impl MatchHandle {
    /// Spawn the actor task for `state`. Must be called inside a tokio runtime.
    pub fn spawn(state: GameState, catalog: SharedCatalog) -> MatchHandle {
        let (commands, rx) = mpsc::channel(COMMAND_QUEUE);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let handle = MatchHandle {
            match_id: state.id.clone(),
            commands,
            events: events.clone(),
        };
        tokio::spawn(run_match(state, catalog, rx, events));
        handle
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    /// Queue an action and wait for its outcome
    pub async fn submit(&self, action: GameAction) -> Result<Option<ActionResult>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { action, reply }).await?;
        rx.await.map_err(|_| self.closed())?
    }

    /// Queue a raw wire action; parsing happens on the actor
    pub async fn submit_wire(&self, raw: Value) -> Result<Option<ActionResult>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SubmitWire { raw, reply }).await?;
        rx.await.map_err(|_| self.closed())?
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> Result<GameState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| self.closed())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MatchEvent> {
        self.events.subscribe()
    }

    /// Stop the actor and take back the final state
    pub async fn shutdown(&self) -> Result<GameState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply }).await?;
        rx.await.map_err(|_| self.closed())
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands.send(command).await.map_err(|_| self.closed())
    }

    fn closed(&self) -> MtgError {
        MtgError::MatchClosed(self.match_id.to_string())
    }
}

async fn run_match(
    mut state: GameState,
    catalog: SharedCatalog,
    mut rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<MatchEvent>,
) {
    state.logger.enable_capture();
    while let Some(command) = rx.recv().await {
        match command {
            Command::Submit { action, reply } => {
                let outcome = state.process_action(catalog.as_ref(), &action);
                publish(&events, &state, &outcome);
                let _ = reply.send(outcome);
            }
            Command::SubmitWire { raw, reply } => {
                let outcome = state.process_wire_action(catalog.as_ref(), raw);
                publish(&events, &state, &outcome);
                let _ = reply.send(outcome);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(state.clone());
            }
            Command::Shutdown { reply } => {
                let _ = events.send(MatchEvent::Closed {
                    match_id: state.id.clone(),
                });
                let _ = reply.send(state);
                return;
            }
        }
    }
}

fn publish(
    events: &broadcast::Sender<MatchEvent>,
    state: &GameState,
    outcome: &Result<Option<ActionResult>>,
) {
    // No subscribers is fine
    if let Ok(Some(result)) = outcome {
        let _ = events.send(MatchEvent::Action {
            match_id: state.id.clone(),
            result: result.clone(),
        });
    }
    let lines: Vec<String> = state
        .logger
        .take_logs()
        .into_iter()
        .map(|entry| entry.message)
        .collect();
    if !lines.is_empty() {
        let _ = events.send(MatchEvent::Log {
            match_id: state.id.clone(),
            lines,
        });
    }
}

/// All running matches of a server, keyed by match id
#[derive(Clone)]
pub struct MatchRegistry {
    catalog: SharedCatalog,
    matches: Arc<RwLock<HashMap<MatchId, MatchHandle>>>,
}

impl MatchRegistry {
    pub fn new(catalog: SharedCatalog) -> Self {
        MatchRegistry {
            catalog,
            matches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start an actor for `state`. Fails if the match id is already running.
    pub async fn create(&self, state: GameState) -> Result<MatchHandle> {
        state.validate()?;
        let mut matches = self.matches.write().await;
        if matches.get(&state.id).is_some_and(|h| !h.is_closed()) {
            return Err(MtgError::InvalidInput(format!(
                "match {} already exists",
                state.id
            )));
        }
        let handle = MatchHandle::spawn(state, Arc::clone(&self.catalog));
        matches.insert(handle.match_id().clone(), handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, match_id: &MatchId) -> Result<MatchHandle> {
        self.matches
            .read()
            .await
            .get(match_id)
            .cloned()
            .ok_or_else(|| MtgError::NotFound(format!("match {match_id}")))
    }

    pub async fn submit(
        &self,
        match_id: &MatchId,
        action: GameAction,
    ) -> Result<Option<ActionResult>> {
        self.get(match_id).await?.submit(action).await
    }

    /// Shut a match down and return its final state
    pub async fn remove(&self, match_id: &MatchId) -> Result<GameState> {
        let handle = self
            .matches
            .write()
            .await
            .remove(match_id)
            .ok_or_else(|| MtgError::NotFound(format!("match {match_id}")))?;
        handle.shutdown().await
    }

    pub async fn list(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> = self.matches.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
