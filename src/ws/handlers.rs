//! WebSocket message dispatch
//!
//! Each intent is applied through `AppState`; room broadcasts and private
//! messages go out over the session channels. Only a rejected intent produces
//! a direct reply.

use crate::error::GameError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

/// Handle a client message and return an optional reply for the sender
pub async fn handle_message(
    msg: ClientMessage,
    connection_id: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    let result: Result<(), GameError> = match msg {
        ClientMessage::Join { room, name } => {
            tracing::info!("Join request: room={:?}, name={:?}", room, name);
            state.join_room(connection_id, &room, &name).await
        }

        ClientMessage::StartGame { mode } => state.start_game(connection_id, mode).await,

        ClientMessage::StartVoting { room } => {
            state.start_voting(connection_id, room.as_deref()).await
        }

        ClientMessage::Vote { room, target } => {
            state.vote(connection_id, room.as_deref(), &target).await
        }

        ClientMessage::SubmitGuess { guess } => state.submit_guess(connection_id, &guess).await,

        ClientMessage::PlayAgain { room } => state.play_again(connection_id, room.as_deref()).await,

        ClientMessage::LeaveRoom => {
            state.leave_room(connection_id).await;
            Ok(())
        }
    };

    match result {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!(connection = %connection_id, code = e.code(), "Intent rejected: {}", e);
            Some(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhaseKind;

    async fn connect(state: &Arc<AppState>, room: &str, name: &str) -> String {
        let (id, _rx) = state.register_connection().await;
        let reply = handle_message(
            ClientMessage::Join {
                room: room.to_string(),
                name: name.to_string(),
            },
            &id,
            state,
        )
        .await;
        assert!(reply.is_none());
        id
    }

    #[tokio::test]
    async fn test_join_with_blank_name_is_rejected() {
        let state = Arc::new(AppState::default());
        let (id, _rx) = state.register_connection().await;

        let reply = handle_message(
            ClientMessage::Join {
                room: "R1".to_string(),
                name: "   ".to_string(),
            },
            &id,
            &state,
        )
        .await;

        match reply {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "INVALID_NAME"),
            other => panic!("Expected INVALID_NAME, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_game_needs_three_players() {
        let state = Arc::new(AppState::default());
        let ana = connect(&state, "R1", "Ana").await;
        connect(&state, "R1", "Bo").await;

        let reply = handle_message(ClientMessage::StartGame { mode: None }, &ana, &state).await;

        match reply {
            Some(ServerMessage::Error { code, msg }) => {
                assert_eq!(code, "NOT_ENOUGH_PLAYERS");
                assert_eq!(msg, "Minimum 3 players required");
            }
            other => panic!("Expected NOT_ENOUGH_PLAYERS, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_late_join_is_rejected() {
        let state = Arc::new(AppState::default());
        let ana = connect(&state, "R1", "Ana").await;
        connect(&state, "R1", "Bo").await;
        connect(&state, "R1", "Cy").await;
        assert!(handle_message(ClientMessage::StartGame { mode: None }, &ana, &state)
            .await
            .is_none());

        let (late, _rx) = state.register_connection().await;
        let reply = handle_message(
            ClientMessage::Join {
                room: "R1".to_string(),
                name: "Dee".to_string(),
            },
            &late,
            &state,
        )
        .await;

        match reply {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "GAME_IN_PROGRESS"),
            other => panic!("Expected GAME_IN_PROGRESS, got {:?}", other),
        }
        assert_eq!(state.room_snapshot("R1").await.unwrap().players.len(), 3);
    }

    #[tokio::test]
    async fn test_start_voting_in_lobby_is_wrong_phase() {
        let state = Arc::new(AppState::default());
        let ana = connect(&state, "R1", "Ana").await;

        let reply =
            handle_message(ClientMessage::StartVoting { room: None }, &ana, &state).await;

        match reply {
            Some(ServerMessage::Error { code, .. }) => assert_eq!(code, "WRONG_PHASE"),
            other => panic!("Expected WRONG_PHASE, got {:?}", other),
        }
        assert_eq!(
            state.room_snapshot("R1").await.unwrap().phase,
            PhaseKind::Lobby
        );
    }

    #[tokio::test]
    async fn test_leave_room_has_no_reply() {
        let state = Arc::new(AppState::default());
        let ana = connect(&state, "R1", "Ana").await;

        assert!(handle_message(ClientMessage::LeaveRoom, &ana, &state)
            .await
            .is_none());
        assert!(state.room_snapshot("R1").await.is_none());
    }
}
