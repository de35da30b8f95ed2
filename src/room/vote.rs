use super::{Outbound, Phase, Room};
use crate::error::GameError;
use crate::protocol::ServerMessage;
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;

/// Votes of one voting round.
///
/// `votes` and `tally` always change together, so every target's tally equals
/// the number of voters who picked it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ballot {
    /// voter connection id -> target name, in casting order
    votes: Vec<(ConnectionId, String)>,
    /// target name -> count, ordered by when the target got its first vote
    tally: Vec<(String, u32)>,
}

/// Result of counting a finished ballot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tally {
    Empty,
    /// Top count shared by two or more targets
    Tie,
    Plurality(String),
}

impl Ballot {
    pub fn has_voted(&self, voter: &str) -> bool {
        self.votes.iter().any(|(id, _)| id == voter)
    }

    fn len(&self) -> usize {
        self.votes.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a vote; a voter who already voted is ignored
    pub fn cast(&mut self, voter: &str, target: &str) -> bool {
        if self.has_voted(voter) {
            return false;
        }
        self.votes.push((voter.to_string(), target.to_string()));
        match self.tally.iter_mut().find(|(name, _)| name == target) {
            Some((_, count)) => *count += 1,
            None => self.tally.push((target.to_string(), 1)),
        }
        true
    }

    /// Take back a departed voter's vote
    pub fn withdraw(&mut self, voter: &str) {
        let Some(pos) = self.votes.iter().position(|(id, _)| id == voter) else {
            return;
        };
        let (_, target) = self.votes.remove(pos);
        if let Some((_, count)) = self.tally.iter_mut().find(|(name, _)| *name == target) {
            *count -= 1;
        }
        self.tally.retain(|(_, count)| *count > 0);
    }

    pub(super) fn rekey(&mut self, old: &str, new: &str) {
        for (voter, _) in self.votes.iter_mut().filter(|(id, _)| id == old) {
            *voter = new.to_string();
        }
    }

    pub fn counts(&self) -> HashMap<String, u32> {
        self.tally.iter().cloned().collect()
    }

    /// Targets by descending count; equal counts keep first-vote order
    pub fn ranked(&self) -> Vec<(String, u32)> {
        let mut ranked = self.tally.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn outcome(&self) -> Tally {
        let ranked = self.ranked();
        match ranked.as_slice() {
            [] => Tally::Empty,
            [(_, top), (_, second), ..] if top == second => Tally::Tie,
            [(name, _), ..] => Tally::Plurality(name.clone()),
        }
    }
}

impl Room {
    /// Open a vote. With two or fewer active players there is nothing to vote
    /// on and the round is evaluated straight away.
    pub fn start_voting(&mut self, rng: &mut impl Rng) -> Result<Vec<Outbound>, GameError> {
        let round = match std::mem::replace(&mut self.phase, Phase::Lobby) {
            Phase::Playing(round) => round,
            other => {
                self.phase = other;
                return Err(GameError::WrongPhase(
                    "Voting can only start during discussion",
                ));
            }
        };

        let active = self.active_count();
        if active <= 2 {
            self.message = format!("📉 Only {} players can vote.", active);
            tracing::info!(room = %self.code, active, "Too few voters, evaluating round");
            return Ok(self.evaluate_round(round, None, rng));
        }

        self.phase = Phase::Voting(round, Ballot::default());
        self.message = "🗳️ Voting has started!".to_string();
        tracing::info!(room = %self.code, voters = active, "Voting opened");
        Ok(vec![self.state_broadcast()])
    }

    /// Accept one vote. Everything invalid is dropped without a reply.
    pub fn cast_vote(&mut self, voter_id: &str, target: &str, rng: &mut impl Rng) -> Vec<Outbound> {
        let Phase::Voting(_, ballot) = &mut self.phase else {
            tracing::debug!(room = %self.code, "Vote outside voting phase ignored");
            return Vec::new();
        };
        let target = target.trim();

        let Some(voter) = self.players.iter().find(|p| p.id == voter_id) else {
            tracing::debug!(room = %self.code, voter_id, "Vote from unknown connection ignored");
            return Vec::new();
        };
        if !voter.is_active() || voter.name == target || ballot.has_voted(voter_id) {
            tracing::debug!(room = %self.code, voter = %voter.name, "Vote rejected");
            return Vec::new();
        }

        ballot.cast(voter_id, target);
        let counts = ballot.counts();
        tracing::info!(room = %self.code, voter = %voter.name, target, "Vote cast");

        let mut out = vec![Outbound::Room(ServerMessage::Votes { counts })];
        out.extend(self.check_voting_complete(rng));
        out
    }

    /// Resolve once every alive, connected player has voted
    pub(super) fn check_voting_complete(&mut self, rng: &mut impl Rng) -> Vec<Outbound> {
        let Phase::Voting(_, ballot) = &self.phase else {
            return Vec::new();
        };

        let mut active = self.players.iter().filter(|p| p.is_active()).peekable();
        if active.peek().is_none() || !active.all(|p| ballot.has_voted(&p.id)) {
            return Vec::new();
        }

        self.resolve_votes(rng)
    }

    fn resolve_votes(&mut self, rng: &mut impl Rng) -> Vec<Outbound> {
        let (round, ballot) = match std::mem::replace(&mut self.phase, Phase::Lobby) {
            Phase::Voting(round, ballot) => (round, ballot),
            other => {
                self.phase = other;
                return Vec::new();
            }
        };

        let target = match ballot.outcome() {
            Tally::Empty => {
                self.message = "No votes cast. Discussion continues.".to_string();
                None
            }
            Tally::Tie => {
                self.message = "🤝 No majority. No one was eliminated.".to_string();
                None
            }
            Tally::Plurality(name) => {
                let idx = self.players.iter().position(|p| p.alive && p.name == name);
                if idx.is_none() {
                    self.message = format!("{} is not in the game. No one was eliminated.", name);
                }
                idx
            }
        };

        tracing::info!(room = %self.code, votes = ballot.len(), ?target, "Voting resolved");

        match target {
            Some(idx) => self.eliminate(idx, round, rng),
            None => {
                self.phase = Phase::Playing(round);
                vec![self.state_broadcast()]
            }
        }
    }
}
