use super::{Outbound, Phase, Room, Round};
use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::seq::SliceRandom;
use rand::Rng;

impl Room {
    /// Deal a new round: draw words, pick the undercover, reveal privately.
    ///
    /// Scores carry over; everyone comes back to life.
    pub fn start_game(
        &mut self,
        mode: Option<GameMode>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Outbound>, GameError> {
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers { min: MIN_PLAYERS });
        }

        let mode = mode.unwrap_or_default();
        self.mode = mode;

        let pair = self.deck.draw(rng);
        let undercover_idx = rng.random_range(0..self.players.len());

        let mut out = Vec::with_capacity(self.players.len() + 1);
        for (idx, player) in self.players.iter_mut().enumerate() {
            player.role = if idx == undercover_idx {
                TrueRole::Undercover
            } else {
                TrueRole::Civilian
            };
            player.alive = true;

            if let Some(seen) = player.role.visible(&pair, mode) {
                out.push(Outbound::Direct(
                    player.id.clone(),
                    ServerMessage::Role {
                        role: seen.role,
                        word: seen.word,
                    },
                ));
            }
        }

        self.message = match mode {
            GameMode::Normal => "🎮 Game started! Discuss carefully.".to_string(),
            GameMode::Hard => {
                "🎭 Hard mode! The undercover may not know who they are.".to_string()
            }
        };

        let speaking_order = self.assign_speaking_order(rng);
        self.phase = Phase::Playing(Round {
            pair,
            speaking_order,
        });

        tracing::info!(
            room = %self.code,
            players = self.players.len(),
            ?mode,
            "Round started"
        );
        tracing::debug!(room = %self.code, undercover = %self.players[undercover_idx].name, "Roles dealt");

        out.push(self.state_broadcast());
        Ok(out)
    }

    /// Random discussion order over the alive players, numbered from 1
    pub(super) fn assign_speaking_order(&mut self, rng: &mut impl Rng) -> Vec<SpeakingSlot> {
        self.clear_speaking_numbers();

        let mut alive: Vec<usize> = (0..self.players.len())
            .filter(|&idx| self.players[idx].alive)
            .collect();
        alive.shuffle(rng);

        alive
            .into_iter()
            .zip(1u32..)
            .map(|(idx, order)| {
                let player = &mut self.players[idx];
                player.speaking_number = Some(order);
                SpeakingSlot {
                    player_id: player.id.clone(),
                    name: player.name.clone(),
                    order,
                }
            })
            .collect()
    }

    /// Back to the lobby with scores kept. Calling it twice changes nothing more.
    pub fn play_again(&mut self) -> Vec<Outbound> {
        for player in &mut self.players {
            player.alive = true;
            player.role = TrueRole::None;
            player.speaking_number = None;
        }
        self.phase = Phase::Lobby;
        self.message = "Play again: waiting in lobby.".to_string();

        tracing::info!(room = %self.code, "Room reset to lobby");
        vec![self.state_broadcast()]
    }
}
