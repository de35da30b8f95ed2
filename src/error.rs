//! Errors surfaced privately to the connection that caused them.

use crate::protocol::ServerMessage;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Minimum {min} players required")]
    NotEnoughPlayers { min: usize },
    #[error("Game in progress, join next round")]
    GameInProgress,
    #[error("Room is full ({max} players)")]
    RoomFull { max: usize },
    #[error("{0}")]
    WrongPhase(&'static str),
    #[error("Name must be 1-{max} characters")]
    InvalidName { max: usize },
    #[error("Room code must not be empty")]
    InvalidRoom,
    #[error("Invalid word catalogue: {0}")]
    InvalidCatalogue(String),
}

impl GameError {
    /// Stable machine-readable code sent alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            GameError::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            GameError::GameInProgress => "GAME_IN_PROGRESS",
            GameError::RoomFull { .. } => "ROOM_FULL",
            GameError::WrongPhase(_) => "WRONG_PHASE",
            GameError::InvalidName { .. } => "INVALID_NAME",
            GameError::InvalidRoom => "INVALID_ROOM",
            GameError::InvalidCatalogue(_) => "INVALID_CATALOGUE",
        }
    }
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
