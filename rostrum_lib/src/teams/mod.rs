use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Seq};

pub use crate::identifiers::TeamId;
use crate::r64;

mod team_registry;
pub use team_registry::TeamRegistry;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// The two sides of a policy debate match
pub enum Side {
    /// The Affirmative side
    Aff,
    /// The Negative side
    Neg,
}

impl Side {
    /// Returns the other side
    pub fn opposite(self) -> Side {
        match self {
            Side::Aff => Side::Neg,
            Side::Neg => Side::Aff,
        }
    }

    /// Returns the one-letter token used by the result log
    pub fn token(self) -> &'static str {
        match self {
            Side::Aff => "A",
            Side::Neg => "N",
        }
    }

    /// Parses the one-letter result-log token
    pub fn from_token(tok: &str) -> Option<Side> {
        match tok {
            "A" => Some(Side::Aff),
            "N" => Some(Side::Neg),
            _ => None,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Aff => "Aff",
                Side::Neg => "Neg",
            }
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// One of a team's two debaters
pub struct TeamMember {
    /// The member's display name
    pub name: String,
    /// The member's slot on the team (0 or 1)
    pub slot: u8,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// The core team model. The identity fields are fixed at registration; every
/// stat below them is derived and rebuilt from the match log by the
/// recomputer, never edited by hand.
pub struct Team {
    /// The team's id
    pub id: TeamId,
    /// The team's display name
    pub name: String,
    /// The institution the team represents
    pub institution: String,
    /// The team's two debaters
    pub members: [TeamMember; 2],
    /// One point per win (byes included)
    pub score: u32,
    /// Win count. Currently always equal to `score`; kept separate so a
    /// future half-point rule doesn't have to split the field
    pub wins: u32,
    /// Sum of current opponents' scores
    pub buchholz: u32,
    /// Rounds debated on the Affirmative
    pub aff_count: u32,
    /// Rounds debated on the Negative
    pub neg_count: u32,
    /// The side taken in the most recent paired round, if any
    pub last_side: Option<Side>,
    /// Opponent ids in round order; `None` marks a bye
    pub opponents: Vec<Option<TeamId>>,
    /// For each opponent faced, the sides taken against them in round order
    #[serde_as(as = "Seq<(_, _)>")]
    pub side_history: BTreeMap<TeamId, Vec<Side>>,
    /// Per-round speaker points for the two members, keyed by round number
    #[serde_as(as = "Seq<(_, _)>")]
    pub speaker_points_history: BTreeMap<u32, [Option<r64>; 2]>,
    /// 1-based seed earned on breaking to elimination rounds
    pub break_seed: Option<u32>,
}

impl Team {
    /// Creates a new team with zeroed stats
    pub fn new(id: TeamId, name: String, institution: String, members: [TeamMember; 2]) -> Self {
        Team {
            id,
            name,
            institution,
            members,
            score: 0,
            wins: 0,
            buchholz: 0,
            aff_count: 0,
            neg_count: 0,
            last_side: None,
            opponents: Vec::new(),
            side_history: BTreeMap::new(),
            speaker_points_history: BTreeMap::new(),
            break_seed: None,
        }
    }

    /// Resets every derived stat ahead of a replay of the match log. The
    /// break seed survives; it is assigned at the break, not derivable from
    /// the log.
    pub(crate) fn clear_stats(&mut self) {
        self.score = 0;
        self.wins = 0;
        self.buchholz = 0;
        self.aff_count = 0;
        self.neg_count = 0;
        self.last_side = None;
        self.opponents.clear();
        self.side_history.clear();
        self.speaker_points_history.clear();
    }

    /// Records being paired against `opponent` on `side`. Rounds must be
    /// applied in ascending order so `last_side` and the history sequences
    /// end up in round order.
    pub(crate) fn record_pairing(&mut self, opponent: TeamId, side: Side) {
        match side {
            Side::Aff => self.aff_count += 1,
            Side::Neg => self.neg_count += 1,
        }
        self.opponents.push(Some(opponent));
        self.last_side = Some(side);
        self.side_history.entry(opponent).or_default().push(side);
    }

    /// Records a bye: a free win with no opponent and no side
    pub(crate) fn record_bye(&mut self) {
        self.opponents.push(None);
        self.score += 1;
        self.wins += 1;
    }

    /// Records winning a paired match
    pub(crate) fn record_win(&mut self) {
        self.score += 1;
        self.wins += 1;
    }

    /// Writes the round's speaker-point entry, replacing any prior entry so
    /// a corrected ballot doesn't leave a duplicate behind
    pub(crate) fn record_speaker_points(&mut self, round_num: u32, points: [Option<r64>; 2]) {
        self.speaker_points_history.insert(round_num, points);
    }

    /// Calculates whether this team has already faced `other`
    pub fn has_played(&self, other: TeamId) -> bool {
        self.side_history.contains_key(&other)
    }

    /// Calculates whether this team has faced `other` without yet having
    /// taken both sides against them
    pub fn can_swap_sides_against(&self, other: TeamId) -> bool {
        match self.side_history.get(&other) {
            Some(sides) => {
                !(sides.contains(&Side::Aff) && sides.contains(&Side::Neg))
            }
            None => false,
        }
    }

    /// Number of rounds this team has been placed in (byes included)
    pub fn rounds_played(&self) -> usize {
        self.opponents.len()
    }

    /// Number of byes this team has received
    pub fn byes(&self) -> usize {
        self.opponents.iter().filter(|o| o.is_none()).count()
    }

    /// The team's appetite for the Affirmative side. The sign carries the
    /// side balance; the ±2.0 adjustment makes last-round alternation
    /// outweigh a one-match imbalance but not a two-match one. The
    /// magnitudes are load-bearing.
    pub fn side_preference(&self) -> f64 {
        let mut pref = self.neg_count as f64 - self.aff_count as f64;
        match self.last_side {
            Some(Side::Neg) => pref += 2.0,
            Some(Side::Aff) => pref -= 2.0,
            None => {}
        }
        pref
    }
}
