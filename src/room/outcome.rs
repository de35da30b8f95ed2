//! Elimination scoring, win detection and the hard-mode guess.

use super::{Outbound, Phase, Room, Round};
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::Rng;

/// Every alive civilian, when the undercover is voted out
const CATCH_POINTS: u32 = 3;
/// The undercover, when a civilian is voted out
const SURVIVE_POINTS: u32 = 2;
/// The undercover, when they outlast the civilians
const UNDERCOVER_WIN_POINTS: u32 = 5;
/// The eliminated undercover, for naming the civilians' word
const GUESS_POINTS: u32 = 5;
/// Every civilian, when the undercover's guess misses
const GUESS_MISS_POINTS: u32 = 2;

fn normalize_guess(word: &str) -> String {
    word.trim().to_lowercase()
}

impl Room {
    /// Vote out the player at `idx`, award points and see if the game is over
    pub(super) fn eliminate(
        &mut self,
        idx: usize,
        round: Round,
        rng: &mut impl Rng,
    ) -> Vec<Outbound> {
        let eliminated = &mut self.players[idx];
        eliminated.alive = false;
        eliminated.speaking_number = None;
        let name = eliminated.name.clone();
        let id = eliminated.id.clone();
        let role = eliminated.role;

        tracing::info!(room = %self.code, player = %name, "Player eliminated");

        let caught = if role == TrueRole::Undercover {
            for player in self
                .players
                .iter_mut()
                .filter(|p| p.alive && p.role == TrueRole::Civilian)
            {
                player.score += CATCH_POINTS;
            }
            self.message = format!("🎉 {} was the UNDERCOVER!", name);
            Some(id)
        } else {
            if let Some(undercover) = self
                .players
                .iter_mut()
                .find(|p| p.alive && p.role == TrueRole::Undercover)
            {
                undercover.score += SURVIVE_POINTS;
            }
            self.message = format!("☠️ {} was a CIVILIAN and eliminated.", name);
            None
        };

        self.evaluate_round(round, caught, rng)
    }

    /// Decide whether the round goes on.
    ///
    /// `caught` is the id of an undercover player who was just voted out; in
    /// hard mode they get to guess before the game ends.
    pub(super) fn evaluate_round(
        &mut self,
        mut round: Round,
        caught: Option<ConnectionId>,
        rng: &mut impl Rng,
    ) -> Vec<Outbound> {
        if !self.undercover_alive() {
            if let (GameMode::Hard, Some(guesser)) = (self.mode, caught) {
                let name = self
                    .player(&guesser)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                self.message = format!(
                    "{} Civilians found them, but {} gets one guess at the civilians' word.",
                    self.message, name
                );
                self.phase = Phase::Guessing {
                    round,
                    guesser: guesser.clone(),
                };
                tracing::info!(room = %self.code, player = %name, "Guessing phase opened");

                return vec![
                    self.state_broadcast(),
                    Outbound::Room(ServerMessage::GuessingStarted {
                        player_id: guesser,
                        name,
                    }),
                ];
            }

            let message = format!("{} Civilians win!", self.message);
            self.end_game(message);
            return vec![self.state_broadcast()];
        }

        if self.alive_count() <= 2 {
            if let Some(undercover) = self
                .players
                .iter_mut()
                .find(|p| p.alive && p.role == TrueRole::Undercover)
            {
                undercover.score += UNDERCOVER_WIN_POINTS;
            }
            let message = format!("{} Undercover wins!", self.message);
            self.end_game(message);
            return vec![self.state_broadcast()];
        }

        round.speaking_order = self.assign_speaking_order(rng);
        self.phase = Phase::Playing(round);
        vec![self.state_broadcast()]
    }

    pub(super) fn end_game(&mut self, message: String) {
        self.phase = Phase::Ended;
        self.clear_speaking_numbers();
        self.message = message.trim().to_string();
        tracing::info!(room = %self.code, message = %self.message, "Game ended");
    }

    /// Hard mode only: the eliminated undercover names the majority word.
    /// Anyone else, or any other phase, is ignored.
    pub fn submit_guess(&mut self, connection_id: &str, guess: &str) -> Vec<Outbound> {
        let Phase::Guessing { round, guesser } = &self.phase else {
            tracing::debug!(room = %self.code, "Guess outside guessing phase ignored");
            return Vec::new();
        };
        if guesser != connection_id {
            tracing::debug!(room = %self.code, connection_id, "Guess from non-guesser ignored");
            return Vec::new();
        }

        let word = round.pair.majority.clone();
        let correct = normalize_guess(guess) == normalize_guess(&word);
        let name = self
            .player(connection_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        let message = if correct {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == connection_id) {
                player.score += GUESS_POINTS;
            }
            format!("🎯 {} guessed \"{}\" correctly!", name, word)
        } else {
            for player in self
                .players
                .iter_mut()
                .filter(|p| p.role == TrueRole::Civilian)
            {
                player.score += GUESS_MISS_POINTS;
            }
            format!(
                "❌ {} guessed \"{}\", but the word was \"{}\". Civilians win!",
                name,
                guess.trim(),
                word
            )
        };

        tracing::info!(room = %self.code, player = %name, correct, "Guess submitted");
        self.end_game(message);
        vec![self.state_broadcast()]
    }
}
