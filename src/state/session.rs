use super::AppState;
use crate::protocol::ServerMessage;
use crate::room::Outbound;
use crate::types::*;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// One open connection
#[derive(Debug)]
pub struct Session {
    pub room: Option<RoomCode>,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

impl AppState {
    /// Allocate a connection id and the channel its socket task drains
    pub async fn register_connection(
        &self,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let connection_id = ulid::Ulid::new().to_string();
        let (tx, rx) = mpsc::unbounded_channel();

        self.sessions
            .write()
            .await
            .insert(connection_id.clone(), Session { room: None, tx });

        tracing::debug!(connection = %connection_id, "Connection registered");
        (connection_id, rx)
    }

    /// The room a connection is currently bound to
    pub async fn session_room(&self, connection_id: &str) -> Option<RoomCode> {
        self.sessions
            .read()
            .await
            .get(connection_id)
            .and_then(|s| s.room.clone())
    }
}

/// Hand each message to its recipients, in order.
///
/// Room broadcasts reach every session bound to `code`. A closed receiver is skipped.
pub(super) fn deliver(
    sessions: &HashMap<ConnectionId, Session>,
    code: &str,
    outbound: Vec<Outbound>,
) {
    for item in outbound {
        match item {
            Outbound::Room(msg) => {
                for session in sessions
                    .values()
                    .filter(|s| s.room.as_deref() == Some(code))
                {
                    let _ = session.tx.send(msg.clone());
                }
            }
            Outbound::Direct(to, msg) => match sessions.get(&to) {
                Some(session) => {
                    let _ = session.tx.send(msg);
                }
                None => tracing::debug!(connection = %to, "Dropping message for closed connection"),
            },
        }
    }
}
