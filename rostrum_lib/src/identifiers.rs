use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(transparent)]
/// A team's id, dense over `0..num_teams` and stable for the tournament's
/// lifetime
pub struct TeamId(pub u32);

#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(transparent)]
/// A match's id, globally unique and monotonically assigned starting at 1
pub struct MatchId(pub u64);

#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(transparent)]
/// A judge's id, monotonically assigned starting at 1
pub struct JudgeId(pub u32);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[serde(transparent)]
/// A tournament's id
pub struct TournamentId(pub Uuid);

impl TournamentId {
    /// Creates a fresh, random tournament id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TournamentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<u32> for TeamId {
    fn from(other: u32) -> TeamId {
        TeamId(other)
    }
}

impl From<u64> for MatchId {
    fn from(other: u64) -> MatchId {
        MatchId(other)
    }
}

impl From<u32> for JudgeId {
    fn from(other: u32) -> JudgeId {
        JudgeId(other)
    }
}

impl Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for JudgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for TournamentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
