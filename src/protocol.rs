use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        room: RoomCode,
        name: String,
    },
    StartGame {
        #[serde(default)]
        mode: Option<GameMode>,
    },
    /// `room` is optional; when given it must match the sender's room or the intent is dropped
    StartVoting {
        #[serde(default)]
        room: Option<RoomCode>,
    },
    Vote {
        #[serde(default)]
        room: Option<RoomCode>,
        target: String,
    },
    SubmitGuess {
        guess: String,
    },
    PlayAgain {
        #[serde(default)]
        room: Option<RoomCode>,
    },
    LeaveRoom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        connection_id: ConnectionId,
        server_now: String,
    },
    /// Full room state, sent to every member
    State {
        room: RoomSnapshot,
    },
    /// Running tally, sent to every member after each accepted vote
    Votes {
        counts: HashMap<String, u32>,
    },
    /// Private role reveal, sent once per dealt round
    Role {
        role: VisibleRole,
        word: Option<String>,
    },
    /// Private state recovery for a player who rejoined mid-round
    PlayerState {
        player_id: ConnectionId,
        role: VisibleRole,
        word: Option<String>,
    },
    /// Hard mode: the eliminated undercover player may now guess the majority word
    GuessingStarted {
        player_id: ConnectionId,
        name: String,
    },
    Error {
        code: String,
        msg: String,
    },
}

/// Public room view. Carries no roles and no words.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub host_id: ConnectionId,
    pub phase: PhaseKind,
    pub mode: GameMode,
    pub message: String,
    pub players: Vec<PlayerInfo>,
    pub vote_count: HashMap<String, u32>,
    pub speaking_order: Vec<SpeakingSlot>,
    pub guessing_player_id: Option<ConnectionId>,
    pub is_guessing_phase: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerInfo {
    pub id: ConnectionId,
    pub name: String,
    pub alive: bool,
    pub score: u32,
    pub connected: bool,
    pub speaking_number: Option<u32>,
    pub is_host: bool,
}

/// Room listing entry for the HTTP API (no names, roles or words)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSummary {
    pub code: RoomCode,
    pub phase: PhaseKind,
    pub players: usize,
    pub connected: usize,
}
