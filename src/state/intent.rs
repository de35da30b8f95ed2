use super::session::deliver;
use super::{AppState, RoomStore, Session};
use crate::error::GameError;
use crate::protocol::{RoomSnapshot, RoomSummary};
use crate::room::{normalize_name, Outbound, Room};
use crate::types::*;
use rand::rngs::ThreadRng;
use std::collections::HashMap;

type Sessions = HashMap<ConnectionId, Session>;

/// Run one room operation, deliver what it produced, and drop the room if it emptied.
/// Unknown rooms are a no-op.
fn apply_to_room<F>(
    rooms: &mut RoomStore,
    sessions: &Sessions,
    code: &str,
    op: F,
) -> Result<(), GameError>
where
    F: FnOnce(&mut Room, &mut ThreadRng) -> Result<Vec<Outbound>, GameError>,
{
    let Some(room) = rooms.get_mut(code) else {
        tracing::debug!(room = %code, "Intent for unknown room ignored");
        return Ok(());
    };

    let outbound = op(room, &mut rand::rng())?;
    let emptied = room.is_empty();
    deliver(sessions, code, outbound);

    if emptied {
        rooms.delete(code);
    }
    Ok(())
}

/// Take a connection out of its room, if any
fn leave_current_room(rooms: &mut RoomStore, sessions: &mut Sessions, connection_id: &str) {
    let Some(code) = sessions
        .get_mut(connection_id)
        .and_then(|s| s.room.take())
    else {
        return;
    };

    tracing::info!(room = %code, connection = %connection_id, "Leaving room");
    let _ = apply_to_room(rooms, sessions, &code, |room, rng| {
        Ok(room.leave(connection_id, rng))
    });
}

impl AppState {
    /// Apply `op` to the caller's current room. A `room` hint naming a
    /// different room makes the intent a no-op.
    async fn apply_in_room<F>(
        &self,
        connection_id: &str,
        room_hint: Option<&str>,
        op: F,
    ) -> Result<(), GameError>
    where
        F: FnOnce(&mut Room, &mut ThreadRng) -> Result<Vec<Outbound>, GameError>,
    {
        let mut rooms = self.rooms.write().await;
        let sessions = self.sessions.read().await;

        let Some(code) = sessions.get(connection_id).and_then(|s| s.room.clone()) else {
            tracing::debug!(connection = %connection_id, "Intent outside any room ignored");
            return Ok(());
        };

        if let Some(hint) = room_hint.map(str::trim) {
            if hint != code {
                tracing::debug!(room = %code, hint, "Intent for another room ignored");
                return Ok(());
            }
        }

        apply_to_room(&mut rooms, &sessions, &code, op)
    }

    /// Join (or rejoin) a room, creating it if needed. Any other room is left
    /// only once the join is accepted.
    pub async fn join_room(
        &self,
        connection_id: &str,
        room_code: &str,
        name: &str,
    ) -> Result<(), GameError> {
        let code = room_code.trim();
        if code.is_empty() {
            return Err(GameError::InvalidRoom);
        }
        let name = normalize_name(name)?;

        let mut rooms = self.rooms.write().await;
        let mut sessions = self.sessions.write().await;

        let current = match sessions.get(connection_id) {
            Some(session) => session.room.clone(),
            None => {
                tracing::debug!(connection = %connection_id, "Join from closed connection ignored");
                return Ok(());
            }
        };
        let switching = current.as_deref().is_some_and(|c| c != code);

        // Validate against the target room before touching the current one
        let created = !rooms.contains(code);
        let room = rooms.create(code, connection_id, self.catalogue.deck());
        let outbound = match room.join(
            connection_id.to_string(),
            &name,
            self.config.max_players_per_room,
        ) {
            Ok(outbound) => outbound,
            Err(e) => {
                if created && room.is_empty() {
                    rooms.delete(code);
                }
                return Err(e);
            }
        };

        if switching {
            leave_current_room(&mut rooms, &mut sessions, connection_id);
        }
        if let Some(session) = sessions.get_mut(connection_id) {
            session.room = Some(code.to_string());
        }
        deliver(&sessions, code, outbound);
        Ok(())
    }

    pub async fn start_game(
        &self,
        connection_id: &str,
        mode: Option<GameMode>,
    ) -> Result<(), GameError> {
        self.apply_in_room(connection_id, None, |room, rng| room.start_game(mode, rng))
            .await
    }

    pub async fn start_voting(
        &self,
        connection_id: &str,
        room_hint: Option<&str>,
    ) -> Result<(), GameError> {
        self.apply_in_room(connection_id, room_hint, |room, rng| room.start_voting(rng))
            .await
    }

    pub async fn vote(
        &self,
        connection_id: &str,
        room_hint: Option<&str>,
        target: &str,
    ) -> Result<(), GameError> {
        self.apply_in_room(connection_id, room_hint, |room, rng| {
            Ok(room.cast_vote(connection_id, target, rng))
        })
        .await
    }

    pub async fn submit_guess(&self, connection_id: &str, guess: &str) -> Result<(), GameError> {
        self.apply_in_room(connection_id, None, |room, _| {
            Ok(room.submit_guess(connection_id, guess))
        })
        .await
    }

    pub async fn play_again(
        &self,
        connection_id: &str,
        room_hint: Option<&str>,
    ) -> Result<(), GameError> {
        self.apply_in_room(connection_id, room_hint, |room, _| Ok(room.play_again()))
            .await
    }

    /// Explicit leave: the slot is released immediately
    pub async fn leave_room(&self, connection_id: &str) {
        let mut rooms = self.rooms.write().await;
        let mut sessions = self.sessions.write().await;
        leave_current_room(&mut rooms, &mut sessions, connection_id);
    }

    /// Socket closed. The player keeps their slot, marked disconnected.
    ///
    /// Returns the room the slot is held in, if any, so the caller can schedule expiry.
    pub async fn disconnect(&self, connection_id: &str) -> Option<RoomCode> {
        let mut rooms = self.rooms.write().await;
        let mut sessions = self.sessions.write().await;

        let code = sessions.remove(connection_id)?.room?;
        let holds_slot = rooms
            .get(&code)
            .is_some_and(|room| room.player(connection_id).is_some());

        tracing::info!(room = %code, connection = %connection_id, "Player disconnected");
        let _ = apply_to_room(&mut rooms, &sessions, &code, |room, rng| {
            Ok(room.disconnect(connection_id, rng))
        });

        holds_slot.then_some(code)
    }

    /// Release a disconnected slot whose grace period ran out. No-op if it was reclaimed.
    pub async fn expire_slot(&self, connection_id: &str, code: &str) {
        let mut rooms = self.rooms.write().await;
        let sessions = self.sessions.read().await;

        let _ = apply_to_room(&mut rooms, &sessions, code, |room, rng| {
            Ok(room.expire(connection_id, rng))
        });
    }

    pub async fn room_snapshot(&self, code: &str) -> Option<RoomSnapshot> {
        self.rooms.read().await.get(code).map(Room::snapshot)
    }

    pub async fn room_summaries(&self) -> Vec<RoomSummary> {
        self.rooms.read().await.summaries()
    }
}
