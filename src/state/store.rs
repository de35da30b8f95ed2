use crate::deck::WordDeck;
use crate::protocol::RoomSummary;
use crate::room::Room;
use crate::types::*;
use std::collections::HashMap;

/// Every live room, keyed by code
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomStore {
    pub fn get(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &str) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rooms.contains_key(code)
    }

    /// Create a room with `host_id` as host. An existing room is returned untouched.
    pub fn create(&mut self, code: &str, host_id: &str, deck: WordDeck) -> &mut Room {
        self.rooms.entry(code.to_string()).or_insert_with(|| {
            tracing::info!(room = %code, "Room created");
            Room::new(code.to_string(), host_id.to_string(), deck)
        })
    }

    pub fn delete(&mut self, code: &str) -> Option<Room> {
        let removed = self.rooms.remove(code);
        if removed.is_some() {
            tracing::info!(room = %code, "Room deleted");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Public listing, sorted by code
    pub fn summaries(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .values()
            .map(|room| RoomSummary {
                code: room.code.clone(),
                phase: room.phase.kind(),
                players: room.players.len(),
                connected: room.connected_count(),
            })
            .collect();
        summaries.sort_by(|a, b| a.code.cmp(&b.code));
        summaries
    }
}
