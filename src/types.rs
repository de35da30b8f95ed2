use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type ConnectionId = String;
pub type RoomCode = String;

/// Minimum number of registered players needed to deal a round
pub const MIN_PLAYERS: usize = 3;

/// Maximum display name length (in characters, after trimming)
pub const MAX_NAME_CHARS: usize = 24;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Normal,
    /// The undercover player is told they are a civilian
    Hard,
}

/// Phase names as they appear on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseKind {
    Lobby,
    Playing,
    Voting,
    Guessing,
    Ended,
}

/// Engine-internal role. Never serialized; what a player is told is a `VisibleAssignment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrueRole {
    #[default]
    None,
    Civilian,
    Undercover,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisibleRole {
    Civilian,
    Undercover,
}

/// What a player is privately told at the start of a round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VisibleAssignment {
    pub role: VisibleRole,
    /// `None` when the undercover player has no word at all
    pub word: Option<String>,
}

impl TrueRole {
    /// Compute what the holder of this role gets to see.
    ///
    /// | true role  | minority empty | mode   | visible                     |
    /// |------------|----------------|--------|-----------------------------|
    /// | civilian   | -              | -      | civilian + majority         |
    /// | undercover | yes            | any    | undercover, no word         |
    /// | undercover | no             | normal | undercover + minority       |
    /// | undercover | no             | hard   | civilian + minority         |
    ///
    /// Returns `None` for players who were not dealt into the round.
    pub fn visible(self, pair: &WordPair, mode: GameMode) -> Option<VisibleAssignment> {
        match self {
            TrueRole::None => None,
            TrueRole::Civilian => Some(VisibleAssignment {
                role: VisibleRole::Civilian,
                word: Some(pair.majority.clone()),
            }),
            TrueRole::Undercover => match (pair.minority(), mode) {
                (None, _) => Some(VisibleAssignment {
                    role: VisibleRole::Undercover,
                    word: None,
                }),
                (Some(word), GameMode::Normal) => Some(VisibleAssignment {
                    role: VisibleRole::Undercover,
                    word: Some(word.to_string()),
                }),
                (Some(word), GameMode::Hard) => Some(VisibleAssignment {
                    role: VisibleRole::Civilian,
                    word: Some(word.to_string()),
                }),
            },
        }
    }
}

/// A (majority, minority) word pair; an empty minority means "no word"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordPair {
    pub majority: String,
    #[serde(default)]
    pub minority: String,
}

impl WordPair {
    pub fn new(majority: impl Into<String>, minority: impl Into<String>) -> Self {
        Self {
            majority: majority.into(),
            minority: minority.into(),
        }
    }

    pub fn minority(&self) -> Option<&str> {
        let word = self.minority.trim();
        (!word.is_empty()).then_some(word)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: ConnectionId,
    /// Stable identity across reconnects
    pub name: String,
    pub alive: bool,
    pub role: TrueRole,
    pub score: u32,
    pub connected: bool,
    pub speaking_number: Option<u32>,
}

impl Player {
    pub fn new(id: ConnectionId, name: String) -> Self {
        Self {
            id,
            name,
            alive: true,
            role: TrueRole::None,
            score: 0,
            connected: true,
            speaking_number: None,
        }
    }

    /// Alive and currently connected; only these players vote
    pub fn is_active(&self) -> bool {
        self.alive && self.connected
    }
}

/// One entry of the discussion order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpeakingSlot {
    pub player_id: ConnectionId,
    pub name: String,
    pub order: u32,
}
