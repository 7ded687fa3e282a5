use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::TournamentError,
    identifiers::MatchId,
    matches::Match,
    teams::Team,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// The struct that creates and manages all matches. Matches are stored in
/// creation order, which the pairing log and the elimination bracket both
/// rely on.
pub struct MatchRegistry {
    /// All matches across all rounds, in creation order
    pub matches: Vec<Match>,
    /// The id the next created match will receive
    pub next_match_id: u64,
}

impl MatchRegistry {
    /// Creates a new match registry with no matches
    pub fn new() -> Self {
        MatchRegistry {
            matches: Vec::new(),
            next_match_id: 1,
        }
    }

    /// Creates a match between the given teams, freezing their display names
    pub fn create_match(&mut self, round_num: u32, aff: &Team, neg: &Team) -> MatchId {
        let id = MatchId(self.next_match_id);
        self.next_match_id += 1;
        self.matches.push(Match {
            id,
            round_num,
            aff_id: aff.id,
            neg_id: neg.id,
            aff_name: aff.name.clone(),
            neg_name: neg.name.clone(),
            result: None,
            judge_id: None,
            speaker_points: None,
            paired_at: Utc::now(),
        });
        id
    }

    /// Inserts a match carrying an externally assigned id, as when
    /// rebuilding from a pairing log. The monotone counter is advanced past
    /// the imported id.
    pub fn import_match(&mut self, m: Match) -> Result<MatchId, TournamentError> {
        if self.matches.iter().any(|held| held.id == m.id) {
            return Err(TournamentError::MatchIdCollision);
        }
        let id = m.id;
        if id.0 >= self.next_match_id {
            self.next_match_id = id.0 + 1;
        }
        self.matches.push(m);
        Ok(id)
    }

    /// Given a match id, returns a reference to that match if found
    pub fn get_match(&self, id: MatchId) -> Result<&Match, TournamentError> {
        self.matches
            .iter()
            .find(|m| m.id == id)
            .ok_or(TournamentError::MatchLookup)
    }

    /// Given a match id, returns a mutable reference to that match if found
    pub fn get_mut_match(&mut self, id: MatchId) -> Result<&mut Match, TournamentError> {
        self.matches
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(TournamentError::MatchLookup)
    }

    /// The matches of one round, in creation (bracket) order
    pub fn round_matches(&self, round_num: u32) -> Vec<&Match> {
        self.matches
            .iter()
            .filter(|m| m.round_num == round_num)
            .collect()
    }

    /// The highest round any match has been paired for, or 0
    pub fn max_paired_round(&self) -> u32 {
        self.matches.iter().map(|m| m.round_num).max().unwrap_or(0)
    }

    /// Calculates if every match of the given round has a reported result
    pub fn round_fully_reported(&self, round_num: u32) -> bool {
        self.matches
            .iter()
            .filter(|m| m.round_num == round_num)
            .all(|m| m.is_reported())
    }

    /// Counts the matches with a reported result
    pub fn reported_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_reported()).count()
    }

    /// Calculates the number of matches
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Calculates if no matches have been created
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        MatchRegistry::new()
    }
}
