use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::identifiers::MatchId;
use crate::{
    error::TournamentError,
    identifiers::{JudgeId, TeamId},
    r64,
    teams::Side,
};

mod match_registry;
pub use match_registry::MatchRegistry;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// The per-match speaker-point ballot: `[aff0, aff1, neg0, neg1]`, each
/// component optional, each present value in `[0, 30]`
pub struct SpeakerPoints(pub [Option<r64>; 4]);

impl SpeakerPoints {
    /// Wraps a ballot after range-checking every present component
    pub fn new(points: [Option<r64>; 4]) -> Result<Self, TournamentError> {
        let zero = r64::from_integer(0);
        let max = r64::from_integer(30);
        for pt in points.iter().flatten() {
            if *pt < zero || *pt > max {
                return Err(TournamentError::InvalidSpeakerPoints);
            }
        }
        Ok(SpeakerPoints(points))
    }

    /// The Affirmative half of the ballot
    pub fn aff(&self) -> [Option<r64>; 2] {
        [self.0[0], self.0[1]]
    }

    /// The Negative half of the ballot
    pub fn neg(&self) -> [Option<r64>; 2] {
        [self.0[2], self.0[3]]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// The pairing decision for one debate plus its mutable outcome. The pairing
/// half (ids, frozen names, round) never changes after creation; the result,
/// judge, and ballot may be set, corrected, or cleared.
pub struct Match {
    /// The match's id
    pub id: MatchId,
    /// The 1-based round this match belongs to
    pub round_num: u32,
    /// The Affirmative team's id
    pub aff_id: TeamId,
    /// The Negative team's id
    pub neg_id: TeamId,
    /// The Affirmative team's name, frozen at pairing time
    pub aff_name: String,
    /// The Negative team's name, frozen at pairing time
    pub neg_name: String,
    /// The winning side, once reported
    pub result: Option<Side>,
    /// The assigned judge, if any
    pub judge_id: Option<JudgeId>,
    /// The speaker-point ballot, if any
    pub speaker_points: Option<SpeakerPoints>,
    /// When the pairing was created
    pub paired_at: DateTime<Utc>,
}

impl Match {
    /// Calculates which side the given team debates in this match
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.aff_id {
            Some(Side::Aff)
        } else if team == self.neg_id {
            Some(Side::Neg)
        } else {
            None
        }
    }

    /// Calculates if the given team debates in this match
    pub fn contains_team(&self, team: TeamId) -> bool {
        self.side_of(team).is_some()
    }

    /// The id of the winning team, once a result is in
    pub fn winner_id(&self) -> Option<TeamId> {
        self.result.map(|side| match side {
            Side::Aff => self.aff_id,
            Side::Neg => self.neg_id,
        })
    }

    /// Calculates if a result has been recorded
    pub fn is_reported(&self) -> bool {
        self.result.is_some()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// A bye awarded during pairing. Byes are not matches: they never appear in
/// the textual projections, carry no side, and exist so the stat recomputer
/// can replay them alongside the match log.
pub struct Bye {
    /// The round the bye was awarded in
    pub round_num: u32,
    /// The team sitting out with a free win
    pub team_id: TeamId,
}
