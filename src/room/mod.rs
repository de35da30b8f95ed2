//! Room aggregate and game state machine.
//!
//! Every intent is a method on `Room` that mutates it in full and returns the
//! notifications to deliver. Nothing in here touches the network; delivery is
//! the gateway's job (see `state`).

mod membership;
mod outcome;
mod round;
mod vote;

pub use membership::normalize_name;
pub use vote::{Ballot, Tally};

use crate::deck::WordDeck;
use crate::protocol::{PlayerInfo, RoomSnapshot, ServerMessage};
use crate::types::*;
use std::collections::HashMap;

/// A notification produced by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Sent to every member of the room
    Room(ServerMessage),
    /// Sent to one connection only
    Direct(ConnectionId, ServerMessage),
}

/// Data that only exists while a round is dealt
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub pair: WordPair,
    pub speaking_order: Vec<SpeakingSlot>,
}

impl Round {
    fn rekey(&mut self, old: &str, new: &str) {
        for slot in self.speaking_order.iter_mut().filter(|s| s.player_id == old) {
            slot.player_id = new.to_string();
        }
    }
}

/// Phase with exactly the data that is meaningful in it
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Lobby,
    Playing(Round),
    Voting(Round, Ballot),
    Guessing { round: Round, guesser: ConnectionId },
    Ended,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Lobby => PhaseKind::Lobby,
            Phase::Playing(_) => PhaseKind::Playing,
            Phase::Voting(..) => PhaseKind::Voting,
            Phase::Guessing { .. } => PhaseKind::Guessing,
            Phase::Ended => PhaseKind::Ended,
        }
    }

    pub fn round(&self) -> Option<&Round> {
        match self {
            Phase::Playing(round) | Phase::Voting(round, _) | Phase::Guessing { round, .. } => {
                Some(round)
            }
            Phase::Lobby | Phase::Ended => None,
        }
    }

    pub fn ballot(&self) -> Option<&Ballot> {
        match self {
            Phase::Voting(_, ballot) => Some(ballot),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    /// Insertion order; not the speaking order
    pub players: Vec<Player>,
    pub host_id: ConnectionId,
    pub phase: Phase,
    pub mode: GameMode,
    pub message: String,
    deck: WordDeck,
}

impl Room {
    /// Create an empty room in the lobby; `host_id` becomes host once they join
    pub fn new(code: RoomCode, host_id: ConnectionId, deck: WordDeck) -> Self {
        Self {
            code,
            players: Vec::new(),
            host_id,
            phase: Phase::Lobby,
            mode: GameMode::Normal,
            message: String::new(),
            deck,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    #[cfg(test)]
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Alive and connected
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    fn undercover_alive(&self) -> bool {
        self.players
            .iter()
            .any(|p| p.alive && p.role == TrueRole::Undercover)
    }

    /// Majority word of the dealt round
    pub fn current_word(&self) -> Option<&str> {
        self.phase.round().map(|r| r.pair.majority.as_str())
    }

    pub fn guessing_player_id(&self) -> Option<&ConnectionId> {
        match &self.phase {
            Phase::Guessing { guesser, .. } => Some(guesser),
            _ => None,
        }
    }

    /// What the player at `idx` was told this round, if a round is dealt
    fn visible_assignment(&self, idx: usize) -> Option<VisibleAssignment> {
        let round = self.phase.round()?;
        self.players[idx].role.visible(&round.pair, self.mode)
    }

    /// Point every reference to `old` at `new` after a rejoin
    fn rekey(&mut self, old: &str, new: &str) {
        if self.host_id == old {
            self.host_id = new.to_string();
        }
        match &mut self.phase {
            Phase::Playing(round) => round.rekey(old, new),
            Phase::Voting(round, ballot) => {
                round.rekey(old, new);
                ballot.rekey(old, new);
            }
            Phase::Guessing { round, guesser } => {
                round.rekey(old, new);
                if guesser == old {
                    *guesser = new.to_string();
                }
            }
            Phase::Lobby | Phase::Ended => {}
        }
    }

    fn clear_speaking_numbers(&mut self) {
        for player in &mut self.players {
            player.speaking_number = None;
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let vote_count = self
            .phase
            .ballot()
            .map(Ballot::counts)
            .unwrap_or_else(HashMap::new);
        let speaking_order = self
            .phase
            .round()
            .map(|r| r.speaking_order.clone())
            .unwrap_or_default();
        let guessing_player_id = self.guessing_player_id().cloned();

        RoomSnapshot {
            code: self.code.clone(),
            host_id: self.host_id.clone(),
            phase: self.phase.kind(),
            mode: self.mode,
            message: self.message.clone(),
            players: self
                .players
                .iter()
                .map(|p| PlayerInfo {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    alive: p.alive,
                    score: p.score,
                    connected: p.connected,
                    speaking_number: p.speaking_number,
                    is_host: p.id == self.host_id,
                })
                .collect(),
            vote_count,
            speaking_order,
            is_guessing_phase: guessing_player_id.is_some(),
            guessing_player_id,
        }
    }

    fn state_broadcast(&self) -> Outbound {
        Outbound::Room(ServerMessage::State {
            room: self.snapshot(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::deck::WordCatalogue;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub const MAX_PLAYERS: usize = 12;

    pub fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    pub fn conn(name: &str) -> ConnectionId {
        format!("conn-{}", name.to_lowercase())
    }

    /// Lobby room with the given players joined in order; the first is host
    pub fn room_with(names: &[&str]) -> Room {
        let catalogue = WordCatalogue::new(vec![WordPair::new("Coffee", "Tea")]).unwrap();
        let mut room = Room::new("R1".to_string(), conn(names[0]), catalogue.deck());
        for name in names {
            room.join(conn(name), name, MAX_PLAYERS).unwrap();
        }
        room
    }

    pub fn undercover(room: &Room) -> &Player {
        room.players
            .iter()
            .find(|p| p.role == TrueRole::Undercover)
            .unwrap()
    }

    pub fn civilians(room: &Room) -> Vec<Player> {
        room.players
            .iter()
            .filter(|p| p.role == TrueRole::Civilian)
            .cloned()
            .collect()
    }

    pub fn room_messages(out: &[Outbound]) -> Vec<&ServerMessage> {
        out.iter()
            .filter_map(|o| match o {
                Outbound::Room(msg) => Some(msg),
                Outbound::Direct(..) => None,
            })
            .collect()
    }
}
