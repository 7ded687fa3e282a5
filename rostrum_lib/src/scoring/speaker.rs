use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::TournamentError,
    identifiers::TeamId,
    r64,
    teams::TeamRegistry,
};

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
/// How a participant's speaker-point total is adjusted for ranking
pub enum AdjustMethod {
    /// Sum every recorded round
    #[default]
    Total,
    /// With three or more rounds recorded, drop the single lowest and the
    /// single highest round before summing
    DropOne,
    /// With five or more rounds recorded, drop the two lowest and the two
    /// highest rounds before summing
    DropTwo,
}

impl FromStr for AdjustMethod {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "total" => Ok(AdjustMethod::Total),
            "drop-1" => Ok(AdjustMethod::DropOne),
            "drop-2" => Ok(AdjustMethod::DropTwo),
            _ => Err(TournamentError::UnknownAdjustMethod),
        }
    }
}

impl Display for AdjustMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AdjustMethod::Total => "total",
                AdjustMethod::DropOne => "drop-1",
                AdjustMethod::DropTwo => "drop-2",
            }
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// One debater's place in the participant standings
pub struct ParticipantStanding {
    /// The team the debater belongs to
    pub team_id: TeamId,
    /// The debater's slot on the team (0 or 1)
    pub slot: u8,
    /// The debater's name
    pub name: String,
    /// Sum of every recorded prelim round
    pub total: r64,
    /// The total after the method's drops
    pub adjusted: r64,
    /// How many prelim rounds had points recorded for this debater
    pub rounds_recorded: u32,
}

/// Ranks individual debaters by speaker points over the preliminary rounds,
/// ordered `(adjusted desc, total desc, name asc)`
pub fn participant_standings(
    teams: &TeamRegistry,
    prelim_rounds: u32,
    method: AdjustMethod,
) -> Vec<ParticipantStanding> {
    let mut digest = Vec::with_capacity(teams.len() * 2);
    for team in teams.iter() {
        for member in &team.members {
            let mut values: Vec<r64> = team
                .speaker_points_history
                .iter()
                .filter(|(round, _)| **round <= prelim_rounds)
                .filter_map(|(_, points)| points[member.slot as usize])
                .collect();
            let total: r64 = values.iter().copied().sum();
            values.sort();
            let kept: &[r64] = match method {
                AdjustMethod::DropOne if values.len() >= 3 => &values[1..values.len() - 1],
                AdjustMethod::DropTwo if values.len() >= 5 => &values[2..values.len() - 2],
                _ => &values,
            };
            let adjusted: r64 = kept.iter().copied().sum();
            digest.push(ParticipantStanding {
                team_id: team.id,
                slot: member.slot,
                name: member.name.clone(),
                total,
                adjusted,
                rounds_recorded: values.len() as u32,
            });
        }
    }
    digest.sort_by(|a, b| {
        b.adjusted
            .cmp(&a.adjusted)
            .then(b.total.cmp(&a.total))
            .then(a.name.cmp(&b.name))
    });
    digest
}
