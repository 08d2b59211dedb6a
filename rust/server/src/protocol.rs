//! Wire message types for the bot protocol.
//!
//! Every frame carries exactly one JSON object tagged by a `type`
//! field. Field names and layouts here are the external contract and
//! must not change; bots written against other servers of this
//! protocol interoperate byte-for-byte.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pokerd_engine::rules::{Action, ValidActions};

/// Error codes of the bot protocol. Registration errors close the
/// channel; the rest keep it open.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    BadJoin,
    BadName,
    TournamentFull,
    TournamentStarted,
    BadJson,
    UnknownType,
    BadAction,
}

/// A player entry inside `game_state`, already projected for one
/// recipient: `hole_cards` are cleartext only when `hole_cards_known`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
    pub seat: usize,
    pub name: String,
    pub stack: u32,
    pub current_bet: u32,
    pub is_active: bool,
    pub is_all_in: bool,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub hole_cards: Vec<String>,
    pub hole_cards_known: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PotEntry {
    pub amount: u32,
    pub eligible_seats: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PotView {
    pub total: u32,
    pub pots: Vec<PotEntry>,
}

/// One entry of the advertised legal action set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidActionView {
    Fold,
    Check,
    Call { amount: u32 },
    Raise { min_amount: u32, max_amount: u32 },
}

/// Flatten the engine's legal-action summary into the wire list.
/// Fold always leads; the order is fixed for bit-stable output.
pub fn valid_action_views(v: &ValidActions) -> Vec<ValidActionView> {
    let mut out = vec![ValidActionView::Fold];
    if v.can_check {
        out.push(ValidActionView::Check);
    }
    if let Some(amount) = v.call_amount {
        out.push(ValidActionView::Call { amount });
    }
    if let Some((min_amount, max_amount)) = v.raise_bounds {
        out.push(ValidActionView::Raise {
            min_amount,
            max_amount,
        });
    }
    out
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateView {
    pub street: String,
    pub hand_number: u32,
    pub community_cards: Vec<String>,
    pub pot: PotView,
    pub players: Vec<PlayerView>,
    pub actor_seat: Option<usize>,
    pub valid_actions: Vec<ValidActionView>,
    pub dealer_seat: usize,
    pub small_blind_seat: usize,
    pub big_blind_seat: usize,
    pub small_blind_amount: u32,
    pub big_blind_amount: u32,
}

/// The acted-upon decision echoed in `action_result`. `amount` is null
/// for fold and check, the clamped total for a raise, and whatever the
/// bot supplied (if anything) for a call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionEcho {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnerEntry {
    pub seat: usize,
    pub name: String,
    pub amount_won: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevealedEntry {
    pub seat: usize,
    pub name: String,
    pub hole_cards: Vec<String>,
}

/// Server-to-bot messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Waiting {
        current_players: usize,
        min_players: usize,
        max_players: usize,
    },
    GameStart {
        player_names: Vec<String>,
        starting_stacks: Vec<u32>,
        small_blind: u32,
        big_blind: u32,
    },
    HandStart {
        hand_number: u32,
        dealer_seat: usize,
        small_blind_seat: usize,
        big_blind_seat: usize,
        small_blind_amount: u32,
        big_blind_amount: u32,
        player_names: Vec<String>,
        stacks: Vec<u32>,
        hole_cards: Vec<String>,
    },
    ActionRequest {
        actor_seat: usize,
        timeout_seconds: u64,
        game_state: GameStateView,
    },
    ActionResult {
        actor_seat: usize,
        player_name: String,
        action: ActionEcho,
        timed_out: bool,
        game_state: GameStateView,
    },
    HandEnd {
        hand_number: u32,
        winners: Vec<WinnerEntry>,
        hole_cards_revealed: Vec<RevealedEntry>,
        community_cards: Vec<String>,
        final_stacks: Vec<u32>,
        player_names: Vec<String>,
        eliminated_seats: Vec<usize>,
    },
    GameEnd {
        winner: String,
        winner_seat: usize,
        final_stacks: Vec<u32>,
        player_names: Vec<String>,
        total_hands: u32,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        ServerMessage::Error {
            code,
            message: message.into(),
        }
    }
}

/// How an inbound frame should be routed, decided at the connection
/// layer before the coordinator sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Join { name: String },
    Action { payload: Value },
    /// Valid JSON object with a missing or unrecognized `type`.
    UnknownType { found: Option<String> },
    /// Not JSON, or not a JSON object.
    BadJson,
}

/// Classify one text frame. Join names arrive trimmed of surrounding
/// whitespace; shape validation (length, uniqueness) happens later.
pub fn classify_frame(text: &str) -> InboundFrame {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => return InboundFrame::BadJson,
    };
    let Some(obj) = value.as_object() else {
        return InboundFrame::BadJson;
    };
    match obj.get("type").and_then(Value::as_str) {
        Some("join") => {
            let name = obj
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string();
            InboundFrame::Join { name }
        }
        Some("action") => InboundFrame::Action { payload: value },
        found => InboundFrame::UnknownType {
            found: found.map(str::to_string),
        },
    }
}

/// Why an actor's answer could not be honored; always answered with
/// BAD_ACTION and an auto-fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRejected {
    pub message: String,
}

/// Validate the actor's `action` payload against the advertised legal
/// set and produce the engine action plus the amount to echo.
///
/// A call may omit its amount (the owed value is computed server-side);
/// a raise must carry an integer amount, which is later clamped rather
/// than rejected when slightly off-range.
pub fn parse_action(
    payload: &Value,
    valid: &ValidActions,
) -> Result<(Action, Option<u32>), ActionRejected> {
    let action = payload.get("action").and_then(Value::as_object).ok_or({
        ActionRejected {
            message: "Malformed action object.".to_string(),
        }
    })?;
    let kind = action
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ActionRejected {
            message: "Malformed action object.".to_string(),
        })?;
    let amount = match action.get("amount") {
        None | Some(Value::Null) => None,
        Some(v) => {
            let n = v.as_u64().ok_or(ActionRejected {
                message: "Action 'amount' must be an integer.".to_string(),
            })?;
            // absurd amounts saturate; the engine clamps to the legal range
            Some(n.min(u64::from(u32::MAX)) as u32)
        }
    };

    let views = valid_action_views(valid);
    let allowed = |k: &str| {
        views.iter().any(|v| match v {
            ValidActionView::Fold => k == "fold",
            ValidActionView::Check => k == "check",
            ValidActionView::Call { .. } => k == "call",
            ValidActionView::Raise { .. } => k == "raise",
        })
    };
    if !allowed(kind) {
        let mut names: Vec<&str> = views
            .iter()
            .map(|v| match v {
                ValidActionView::Fold => "fold",
                ValidActionView::Check => "check",
                ValidActionView::Call { .. } => "call",
                ValidActionView::Raise { .. } => "raise",
            })
            .collect();
        names.sort_unstable();
        return Err(ActionRejected {
            message: format!(
                "Action type {kind:?} is not valid. Valid types right now: {names:?}."
            ),
        });
    }

    match kind {
        "fold" => Ok((Action::Fold, None)),
        "check" => Ok((Action::Check, None)),
        "call" => Ok((Action::Call, amount)),
        "raise" => {
            let (min_amount, max_amount) = valid
                .raise_bounds
                .expect("raise advertised implies bounds");
            let amount = amount.ok_or(ActionRejected {
                message: format!(
                    "Raise requires an 'amount'. Valid range: [{min_amount}, {max_amount}]."
                ),
            })?;
            Ok((Action::Raise { amount }, Some(amount)))
        }
        _ => unreachable!("allowed() covers the action vocabulary"),
    }
}
