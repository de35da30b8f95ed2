use super::{Outbound, Phase, Room};
use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::Rng;

/// Trim a display name and check its length
pub fn normalize_name(raw: &str) -> Result<String, GameError> {
    let name = raw.trim();
    let chars = name.chars().count();
    if chars == 0 || chars > MAX_NAME_CHARS {
        return Err(GameError::InvalidName {
            max: MAX_NAME_CHARS,
        });
    }
    Ok(name.to_string())
}

impl Room {
    /// Join or rejoin. A name already in the registry takes that slot over,
    /// keeping score, role and liveness, and skips phase and capacity checks.
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        raw_name: &str,
        max_players: usize,
    ) -> Result<Vec<Outbound>, GameError> {
        let name = normalize_name(raw_name)?;

        // Same connection joining twice: nothing to add
        if self.player(&connection_id).is_some() {
            return Ok(vec![self.state_broadcast()]);
        }

        if let Some(idx) = self.players.iter().position(|p| p.name == name) {
            let previous = std::mem::replace(&mut self.players[idx].id, connection_id.clone());
            self.players[idx].connected = true;
            self.rekey(&previous, &connection_id);
            self.message = format!("🔌 {} reconnected.", name);

            tracing::info!(room = %self.code, player = %name, "Player rejoined");

            let mut out = vec![self.state_broadcast()];
            if let Some(seen) = self.visible_assignment(idx) {
                out.push(Outbound::Direct(
                    connection_id.clone(),
                    ServerMessage::PlayerState {
                        player_id: connection_id,
                        role: seen.role,
                        word: seen.word,
                    },
                ));
            }
            return Ok(out);
        }

        if !matches!(self.phase, Phase::Lobby) {
            return Err(GameError::GameInProgress);
        }
        if self.players.len() >= max_players {
            return Err(GameError::RoomFull { max: max_players });
        }

        self.players.push(Player::new(connection_id, name.clone()));
        self.message = format!("👋 {} joined.", name);
        tracing::info!(room = %self.code, player = %name, count = self.players.len(), "Player joined");

        Ok(vec![self.state_broadcast()])
    }

    /// Transport loss: keep the slot, mark it disconnected
    pub fn disconnect(&mut self, connection_id: &str, rng: &mut impl Rng) -> Vec<Outbound> {
        let Some(player) = self.players.iter_mut().find(|p| p.id == connection_id) else {
            return Vec::new();
        };
        player.connected = false;
        self.message = format!("📴 {} disconnected.", player.name);
        tracing::info!(room = %self.code, player = %player.name, "Player disconnected");

        let mut out = vec![self.state_broadcast()];
        // The missing player must not hold up an open vote
        out.extend(self.check_voting_complete(rng));
        out
    }

    /// Intentional leave: drop the slot entirely and migrate host if needed.
    /// When this empties the room nothing is returned; the caller deletes it.
    pub fn leave(&mut self, connection_id: &str, rng: &mut impl Rng) -> Vec<Outbound> {
        let Some(idx) = self.players.iter().position(|p| p.id == connection_id) else {
            return Vec::new();
        };
        let departed = self.players.remove(idx);
        tracing::info!(room = %self.code, player = %departed.name, "Player left");

        if self.players.is_empty() {
            return Vec::new();
        }

        let guesser_left = matches!(
            &self.phase,
            Phase::Guessing { guesser, .. } if guesser == connection_id
        );
        let undercover_left = departed.role == TrueRole::Undercover
            && matches!(self.phase, Phase::Playing(_) | Phase::Voting(..));

        match &mut self.phase {
            Phase::Playing(round) => round
                .speaking_order
                .retain(|slot| slot.player_id != connection_id),
            Phase::Voting(round, ballot) => {
                round
                    .speaking_order
                    .retain(|slot| slot.player_id != connection_id);
                ballot.withdraw(connection_id);
            }
            _ => {}
        }

        if guesser_left {
            self.end_game(format!(
                "🏳️ {} left without guessing. Civilians win!",
                departed.name
            ));
        } else if undercover_left {
            self.end_game(format!(
                "🏳️ {} was the UNDERCOVER and left. Civilians win!",
                departed.name
            ));
        } else {
            self.message = format!("🚪 {} left the room.", departed.name);
        }

        if self.host_id == connection_id {
            self.host_id = self.players[0].id.clone();
            let notice = format!("👑 Host left. {} is now the host.", self.players[0].name);
            if matches!(self.phase, Phase::Ended) {
                self.message = format!("{} {}", self.message, notice);
            } else {
                self.message = notice;
            }
        }

        let mut out = vec![self.state_broadcast()];
        out.extend(self.check_voting_complete(rng));
        out
    }

    /// Release a slot whose reconnect grace ran out. Only acts if the slot is
    /// still held by `connection_id` and still disconnected.
    pub fn expire(&mut self, connection_id: &str, rng: &mut impl Rng) -> Vec<Outbound> {
        match self.player(connection_id) {
            Some(player) if !player.connected => self.leave(connection_id, rng),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_join_appends_players_in_order() {
        let room = room_with(&["Ana", "Bo", "Cy"]);
        let names: Vec<_> = room.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bo", "Cy"]);
        assert!(room.players.iter().all(|p| p.alive && p.connected));
        assert!(room.players.iter().all(|p| p.role == TrueRole::None));
    }

    #[test]
    fn test_join_rejects_blank_and_long_names() {
        let mut room = room_with(&["Ana"]);
        let err = room.join("c2".to_string(), "   ", MAX_PLAYERS).unwrap_err();
        assert_eq!(err.code(), "INVALID_NAME");

        let long = "x".repeat(MAX_NAME_CHARS + 1);
        assert!(room.join("c3".to_string(), &long, MAX_PLAYERS).is_err());
        assert_eq!(room.players.len(), 1);
    }

    #[test]
    fn test_join_trims_name() {
        let mut room = room_with(&["Ana"]);
        room.join("c2".to_string(), "  Bo ", MAX_PLAYERS).unwrap();
        assert!(room.player_by_name("Bo").is_some());
    }

    #[test]
    fn test_join_rejected_during_game() {
        let mut room = room_with(&["Ana", "Bo", "Cy"]);
        room.start_game(None, &mut rng()).unwrap();

        let err = room
            .join("late".to_string(), "Dee", MAX_PLAYERS)
            .unwrap_err();
        assert_eq!(err, GameError::GameInProgress);
        assert_eq!(room.players.len(), 3);
    }

    #[test]
    fn test_join_rejected_when_full() {
        let mut room = room_with(&["Ana", "Bo"]);
        let err = room.join("c3".to_string(), "Cy", 2).unwrap_err();
        assert_eq!(err.code(), "ROOM_FULL");
    }

    #[test]
    fn test_rejoin_restores_slot() {
        let mut room = room_with(&["Ana", "Bo", "Cy"]);
        let mut rng = rng();
        room.start_game(None, &mut rng).unwrap();
        room.players[1].score = 7;

        room.disconnect(&conn("Bo"), &mut rng);
        assert!(!room.player(&conn("Bo")).unwrap().connected);

        let out = room.join("bo-2".to_string(), "Bo", MAX_PLAYERS).unwrap();
        let bo = room.player("bo-2").unwrap();
        assert!(bo.connected);
        assert!(bo.alive);
        assert_eq!(bo.score, 7);
        assert_eq!(room.players.len(), 3);
        assert!(room.player(&conn("Bo")).is_none());

        // The rejoining player gets their assignment back privately
        assert!(out.iter().any(|o| matches!(
            o,
            Outbound::Direct(to, ServerMessage::PlayerState { .. }) if to == "bo-2"
        )));
        // Speaking order follows the new connection
        let round = room.phase.round().unwrap();
        assert!(round.speaking_order.iter().any(|s| s.player_id == "bo-2"));
    }

    #[test]
    fn test_rejoin_in_lobby_sends_no_assignment() {
        let mut room = room_with(&["Ana", "Bo"]);
        let out = room.join("bo-2".to_string(), "Bo", MAX_PLAYERS).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_rejoin_skips_capacity_check() {
        let mut room = room_with(&["Ana", "Bo"]);
        room.disconnect(&conn("Bo"), &mut rng());
        assert!(room.join("bo-2".to_string(), "Bo", 2).is_ok());
    }

    #[test]
    fn test_host_rejoin_keeps_host() {
        let mut room = room_with(&["Ana", "Bo"]);
        room.disconnect(&conn("Ana"), &mut rng());
        room.join("ana-2".to_string(), "Ana", MAX_PLAYERS).unwrap();
        assert_eq!(room.host_id, "ana-2");
    }

    #[test]
    fn test_same_connection_joining_twice_is_ignored() {
        let mut room = room_with(&["Ana"]);
        room.join(conn("Ana"), "Other", MAX_PLAYERS).unwrap();
        assert_eq!(room.players.len(), 1);
        assert_eq!(room.players[0].name, "Ana");
    }

    #[test]
    fn test_leave_migrates_host() {
        let mut room = room_with(&["Ana", "Bo", "Cy"]);
        let out = room.leave(&conn("Ana"), &mut rng());

        assert_eq!(room.host_id, conn("Bo"));
        assert!(room.message.contains("Bo is now the host"));
        assert_eq!(out.len(), 1);
        assert!(room.player_by_name("Ana").is_none());
    }

    #[test]
    fn test_last_leave_empties_room() {
        let mut room = room_with(&["Ana"]);
        let out = room.leave(&conn("Ana"), &mut rng());
        assert!(out.is_empty());
        assert!(room.is_empty());
    }

    #[test]
    fn test_leave_unknown_connection_is_noop() {
        let mut room = room_with(&["Ana"]);
        assert!(room.leave("nobody", &mut rng()).is_empty());
        assert_eq!(room.players.len(), 1);
    }

    #[test]
    fn test_expire_only_releases_disconnected_slot() {
        let mut room = room_with(&["Ana", "Bo"]);
        let mut rng = rng();

        assert!(room.expire(&conn("Bo"), &mut rng).is_empty());
        assert_eq!(room.players.len(), 2);

        room.disconnect(&conn("Bo"), &mut rng);
        room.expire(&conn("Bo"), &mut rng);
        assert!(room.player_by_name("Bo").is_none());
    }

    #[test]
    fn test_expire_ignores_stale_id_after_rejoin() {
        let mut room = room_with(&["Ana", "Bo"]);
        let mut rng = rng();
        room.disconnect(&conn("Bo"), &mut rng);
        room.join("bo-2".to_string(), "Bo", MAX_PLAYERS).unwrap();

        assert!(room.expire(&conn("Bo"), &mut rng).is_empty());
        assert!(room.player_by_name("Bo").is_some());
    }
}
