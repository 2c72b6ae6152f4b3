//! Player actions
//!
//! On the wire an action is `{player_id, action_type, additional_data}` with
//! a free-form data map. It is parsed exactly once, at the boundary, into a
//! closed [`ActionKind`] with one typed payload per action; everything past
//! that point matches exhaustively on the enum.

use crate::core::{CardDefId, Color, CounterName, InstanceId, PlayerId};
use crate::zones::{Zone, ZonePosition};
use crate::{MtgError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

fn one() -> usize {
    1
}

fn one_i32() -> i32 {
    1
}

fn hand() -> Zone {
    Zone::Hand
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackersPayload {
    pub attacking_creatures: Vec<InstanceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockersPayload {
    /// blocker -> attacker
    pub blocking_assignments: BTreeMap<InstanceId, InstanceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayCardPayload {
    pub unique_id: InstanceId,
    #[serde(default = "hand")]
    pub source_zone: Zone,
    #[serde(default)]
    pub face_down: bool,
}

/// Players default to the acting player when omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCardPayload {
    pub unique_id: InstanceId,
    #[serde(default)]
    pub source_player: Option<PlayerId>,
    pub source_zone: Zone,
    #[serde(default)]
    pub destination_player: Option<PlayerId>,
    pub destination_zone: Zone,
    #[serde(default)]
    pub position: Option<ZonePosition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountPayload {
    #[serde(default = "one")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPayload {
    pub unique_id: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealCardPayload {
    pub unique_id: InstanceId,
    #[serde(default = "hand")]
    pub source_zone: Zone,
}

/// `tapped`/`targeted` omitted means toggle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TapPayload {
    pub unique_id: InstanceId,
    #[serde(default)]
    pub tapped: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPayload {
    pub unique_id: InstanceId,
    #[serde(default)]
    pub targeted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCounterPayload {
    pub unique_id: InstanceId,
    pub counter_name: CounterName,
    #[serde(default = "one_i32")]
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCardCounterPayload {
    pub unique_id: InstanceId,
    pub counter_name: CounterName,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCounterPayload {
    #[serde(default)]
    pub target_player: Option<PlayerId>,
    pub counter_name: CounterName,
    #[serde(default = "one_i32")]
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPlayerCounterPayload {
    #[serde(default)]
    pub target_player: Option<PlayerId>,
    pub counter_name: CounterName,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifePayload {
    pub target_player: PlayerId,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLifePayload {
    pub target_player: PlayerId,
    pub life: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommanderTaxPayload {
    #[serde(default)]
    pub target_player: Option<PlayerId>,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordPayload {
    pub unique_id: InstanceId,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypePayload {
    pub unique_id: InstanceId,
    pub card_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerToughnessPayload {
    pub unique_id: InstanceId,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManaPayload {
    pub color: Color,
    #[serde(default = "one_i32")]
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTokenPayload {
    pub card_id: CardDefId,
    #[serde(default)]
    pub target_player: Option<PlayerId>,
    #[serde(default = "one")]
    pub count: usize,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(default)]
    pub tapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachPayload {
    pub unique_id: InstanceId,
    pub host_unique_id: InstanceId,
    #[serde(default)]
    pub order: Option<u32>,
}

/// Every action the engine understands
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    PassPhase,

    DeclareAttackers(AttackersPayload),
    DeclareBlockers(BlockersPayload),
    PreviewAttackers(AttackersPayload),
    PreviewBlockers(BlockersPayload),
    CombatDamage,

    PlayCard(PlayCardPayload),
    ResolveStack,
    ResolveAllStack,
    PassPriority,

    MoveCard(MoveCardPayload),
    DrawCard(CountPayload),
    Mill(CountPayload),
    TapCard(TapPayload),
    UntapAll,
    ShuffleLibrary,
    Mulligan,
    LookAtTop(CountPayload),
    RevealTop(CountPayload),
    RevealCard(RevealCardPayload),

    AddCounter(CardCounterPayload),
    RemoveCounter(CardCounterPayload),
    SetCounter(SetCardCounterPayload),
    AddPlayerCounter(PlayerCounterPayload),
    SetPlayerCounter(SetPlayerCounterPayload),
    ModifyLife(LifePayload),
    SetLife(SetLifePayload),
    AdjustCommanderTax(CommanderTaxPayload),
    AddKeyword(KeywordPayload),
    RemoveKeyword(KeywordPayload),
    AddType(TypePayload),
    RemoveType(TypePayload),
    SetPowerToughness(PowerToughnessPayload),
    FlipCard(CardPayload),
    RevealFaceDown(CardPayload),
    TargetCard(TargetPayload),
    AddMana(ManaPayload),
    ClearManaPool,

    CreateToken(CreateTokenPayload),
    DuplicateCard(CardPayload),
    DeleteToken(CardPayload),
    AttachCard(AttachPayload),
    DetachCard(CardPayload),
}

fn payload<T: DeserializeOwned>(action_type: &str, data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| MtgError::InvalidInput(format!("{action_type}: {e}")))
}

fn encode<T: Serialize>(payload: &T) -> Value {
    serde_json::to_value(payload).unwrap_or(Value::Null)
}

impl ActionKind {
    /// Parse a wire tag and its data map. Unknown tags fail before the data
    /// is looked at.
    pub fn from_wire(action_type: &str, data: Value) -> Result<ActionKind> {
        let t = action_type;
        let kind = match t {
            "pass_phase" => ActionKind::PassPhase,

            "declare_attackers" => ActionKind::DeclareAttackers(payload(t, data)?),
            "declare_blockers" => ActionKind::DeclareBlockers(payload(t, data)?),
            "preview_attackers" => ActionKind::PreviewAttackers(payload(t, data)?),
            "preview_blockers" => ActionKind::PreviewBlockers(payload(t, data)?),
            "combat_damage" => ActionKind::CombatDamage,

            "play_card" => ActionKind::PlayCard(payload(t, data)?),
            "resolve_stack" => ActionKind::ResolveStack,
            "resolve_all_stack" => ActionKind::ResolveAllStack,
            "pass_priority" => ActionKind::PassPriority,

            "move_card" => ActionKind::MoveCard(payload(t, data)?),
            "draw_card" => ActionKind::DrawCard(payload(t, data)?),
            "mill" => ActionKind::Mill(payload(t, data)?),
            "tap_card" => ActionKind::TapCard(payload(t, data)?),
            "untap_all" => ActionKind::UntapAll,
            "shuffle_library" => ActionKind::ShuffleLibrary,
            "mulligan" => ActionKind::Mulligan,
            "look_at_top" => ActionKind::LookAtTop(payload(t, data)?),
            "reveal_top" => ActionKind::RevealTop(payload(t, data)?),
            "reveal_card" => ActionKind::RevealCard(payload(t, data)?),

            "add_counter" => ActionKind::AddCounter(payload(t, data)?),
            "remove_counter" => ActionKind::RemoveCounter(payload(t, data)?),
            "set_counter" => ActionKind::SetCounter(payload(t, data)?),
            "add_player_counter" => ActionKind::AddPlayerCounter(payload(t, data)?),
            "set_player_counter" => ActionKind::SetPlayerCounter(payload(t, data)?),
            "modify_life" => ActionKind::ModifyLife(payload(t, data)?),
            "set_life" => ActionKind::SetLife(payload(t, data)?),
            "adjust_commander_tax" => ActionKind::AdjustCommanderTax(payload(t, data)?),
            "add_keyword" => ActionKind::AddKeyword(payload(t, data)?),
            "remove_keyword" => ActionKind::RemoveKeyword(payload(t, data)?),
            "add_type" => ActionKind::AddType(payload(t, data)?),
            "remove_type" => ActionKind::RemoveType(payload(t, data)?),
            "set_power_toughness" => ActionKind::SetPowerToughness(payload(t, data)?),
            "flip_card" => ActionKind::FlipCard(payload(t, data)?),
            "reveal_face_down" => ActionKind::RevealFaceDown(payload(t, data)?),
            "target_card" => ActionKind::TargetCard(payload(t, data)?),
            "add_mana" => ActionKind::AddMana(payload(t, data)?),
            "clear_mana_pool" => ActionKind::ClearManaPool,

            "create_token" => ActionKind::CreateToken(payload(t, data)?),
            "duplicate_card" => ActionKind::DuplicateCard(payload(t, data)?),
            "delete_token" => ActionKind::DeleteToken(payload(t, data)?),
            "attach_card" => ActionKind::AttachCard(payload(t, data)?),
            "detach_card" => ActionKind::DetachCard(payload(t, data)?),

            other => return Err(MtgError::UnknownAction(other.to_string())),
        };
        Ok(kind)
    }

    /// Wire tag of this action
    pub fn action_type(&self) -> &'static str {
        match self {
            ActionKind::PassPhase => "pass_phase",
            ActionKind::DeclareAttackers(_) => "declare_attackers",
            ActionKind::DeclareBlockers(_) => "declare_blockers",
            ActionKind::PreviewAttackers(_) => "preview_attackers",
            ActionKind::PreviewBlockers(_) => "preview_blockers",
            ActionKind::CombatDamage => "combat_damage",
            ActionKind::PlayCard(_) => "play_card",
            ActionKind::ResolveStack => "resolve_stack",
            ActionKind::ResolveAllStack => "resolve_all_stack",
            ActionKind::PassPriority => "pass_priority",
            ActionKind::MoveCard(_) => "move_card",
            ActionKind::DrawCard(_) => "draw_card",
            ActionKind::Mill(_) => "mill",
            ActionKind::TapCard(_) => "tap_card",
            ActionKind::UntapAll => "untap_all",
            ActionKind::ShuffleLibrary => "shuffle_library",
            ActionKind::Mulligan => "mulligan",
            ActionKind::LookAtTop(_) => "look_at_top",
            ActionKind::RevealTop(_) => "reveal_top",
            ActionKind::RevealCard(_) => "reveal_card",
            ActionKind::AddCounter(_) => "add_counter",
            ActionKind::RemoveCounter(_) => "remove_counter",
            ActionKind::SetCounter(_) => "set_counter",
            ActionKind::AddPlayerCounter(_) => "add_player_counter",
            ActionKind::SetPlayerCounter(_) => "set_player_counter",
            ActionKind::ModifyLife(_) => "modify_life",
            ActionKind::SetLife(_) => "set_life",
            ActionKind::AdjustCommanderTax(_) => "adjust_commander_tax",
            ActionKind::AddKeyword(_) => "add_keyword",
            ActionKind::RemoveKeyword(_) => "remove_keyword",
            ActionKind::AddType(_) => "add_type",
            ActionKind::RemoveType(_) => "remove_type",
            ActionKind::SetPowerToughness(_) => "set_power_toughness",
            ActionKind::FlipCard(_) => "flip_card",
            ActionKind::RevealFaceDown(_) => "reveal_face_down",
            ActionKind::TargetCard(_) => "target_card",
            ActionKind::AddMana(_) => "add_mana",
            ActionKind::ClearManaPool => "clear_mana_pool",
            ActionKind::CreateToken(_) => "create_token",
            ActionKind::DuplicateCard(_) => "duplicate_card",
            ActionKind::DeleteToken(_) => "delete_token",
            ActionKind::AttachCard(_) => "attach_card",
            ActionKind::DetachCard(_) => "detach_card",
        }
    }

    /// Payload back in wire form (an object; empty for payload-less actions)
    pub fn payload(&self) -> Value {
        match self {
            ActionKind::PassPhase
            | ActionKind::CombatDamage
            | ActionKind::ResolveStack
            | ActionKind::ResolveAllStack
            | ActionKind::PassPriority
            | ActionKind::UntapAll
            | ActionKind::ShuffleLibrary
            | ActionKind::Mulligan
            | ActionKind::ClearManaPool => Value::Object(Map::new()),
            ActionKind::DeclareAttackers(p) | ActionKind::PreviewAttackers(p) => encode(p),
            ActionKind::DeclareBlockers(p) | ActionKind::PreviewBlockers(p) => encode(p),
            ActionKind::PlayCard(p) => encode(p),
            ActionKind::MoveCard(p) => encode(p),
            ActionKind::DrawCard(p)
            | ActionKind::Mill(p)
            | ActionKind::LookAtTop(p)
            | ActionKind::RevealTop(p) => encode(p),
            ActionKind::TapCard(p) => encode(p),
            ActionKind::RevealCard(p) => encode(p),
            ActionKind::AddCounter(p) | ActionKind::RemoveCounter(p) => encode(p),
            ActionKind::SetCounter(p) => encode(p),
            ActionKind::AddPlayerCounter(p) => encode(p),
            ActionKind::SetPlayerCounter(p) => encode(p),
            ActionKind::ModifyLife(p) => encode(p),
            ActionKind::SetLife(p) => encode(p),
            ActionKind::AdjustCommanderTax(p) => encode(p),
            ActionKind::AddKeyword(p) | ActionKind::RemoveKeyword(p) => encode(p),
            ActionKind::AddType(p) | ActionKind::RemoveType(p) => encode(p),
            ActionKind::SetPowerToughness(p) => encode(p),
            ActionKind::FlipCard(p)
            | ActionKind::RevealFaceDown(p)
            | ActionKind::DuplicateCard(p)
            | ActionKind::DeleteToken(p)
            | ActionKind::DetachCard(p) => encode(p),
            ActionKind::TargetCard(p) => encode(p),
            ActionKind::AddMana(p) => encode(p),
            ActionKind::CreateToken(p) => encode(p),
            ActionKind::AttachCard(p) => encode(p),
        }
    }

    /// The card instance this action is about, if any (used for log lines)
    pub fn subject(&self) -> Option<InstanceId> {
        match self {
            ActionKind::PlayCard(p) => Some(p.unique_id),
            ActionKind::MoveCard(p) => Some(p.unique_id),
            ActionKind::TapCard(p) => Some(p.unique_id),
            ActionKind::RevealCard(p) => Some(p.unique_id),
            ActionKind::AddCounter(p) | ActionKind::RemoveCounter(p) => Some(p.unique_id),
            ActionKind::SetCounter(p) => Some(p.unique_id),
            ActionKind::AddKeyword(p) | ActionKind::RemoveKeyword(p) => Some(p.unique_id),
            ActionKind::AddType(p) | ActionKind::RemoveType(p) => Some(p.unique_id),
            ActionKind::SetPowerToughness(p) => Some(p.unique_id),
            ActionKind::FlipCard(p)
            | ActionKind::RevealFaceDown(p)
            | ActionKind::DuplicateCard(p)
            | ActionKind::DeleteToken(p)
            | ActionKind::DetachCard(p) => Some(p.unique_id),
            ActionKind::TargetCard(p) => Some(p.unique_id),
            ActionKind::AttachCard(p) => Some(p.unique_id),
            _ => None,
        }
    }
}

/// Loose wire shape of an action.
///
/// Top-level `card_id` and `target` are shorthands for `unique_id` and
/// `target_player` inside `additional_data`; explicit data keys win.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireAction {
    pub player_id: PlayerId,
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<InstanceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PlayerId>,
    #[serde(default)]
    pub additional_data: Map<String, Value>,
}

/// A parsed player action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireAction", into = "WireAction")]
pub struct GameAction {
    pub player_id: PlayerId,
    pub kind: ActionKind,
}

impl GameAction {
    pub fn new(player_id: PlayerId, kind: ActionKind) -> Self {
        GameAction { player_id, kind }
    }

    /// Parse from a JSON value, keeping the error kind
    /// (`UnknownAction` vs `InvalidInput`) intact
    pub fn from_value(value: Value) -> Result<GameAction> {
        let wire: WireAction = serde_json::from_value(value)
            .map_err(|e| MtgError::InvalidInput(format!("malformed action: {e}")))?;
        GameAction::try_from(wire)
    }

    pub fn from_json(json: &str) -> Result<GameAction> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| MtgError::InvalidInput(format!("malformed action: {e}")))?;
        GameAction::from_value(value)
    }

    pub fn action_type(&self) -> &'static str {
        self.kind.action_type()
    }
}

impl TryFrom<WireAction> for GameAction {
    type Error = MtgError;

    fn try_from(wire: WireAction) -> Result<Self> {
        let mut data = wire.additional_data;
        if let Some(card) = wire.card_id {
            data.entry("unique_id").or_insert_with(|| encode(&card));
        }
        if let Some(target) = wire.target {
            data.entry("target_player").or_insert_with(|| encode(&target));
        }
        let kind = ActionKind::from_wire(&wire.action_type, Value::Object(data))?;
        Ok(GameAction {
            player_id: wire.player_id,
            kind,
        })
    }
}

impl From<GameAction> for WireAction {
    fn from(action: GameAction) -> Self {
        let additional_data = match action.kind.payload() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        WireAction {
            player_id: action.player_id,
            action_type: action.kind.action_type().to_string(),
            card_id: None,
            target: None,
            additional_data,
        }
    }
}
