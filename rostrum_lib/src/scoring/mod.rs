use serde::{Deserialize, Serialize};

use crate::{identifiers::TeamId, teams::TeamRegistry};

/// Participant (individual speaker) standings
pub mod speaker;
/// The full-rebuild stat recomputer
pub mod stats;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// One team's place in a standings view
pub struct TeamStanding {
    /// The team's id
    pub team_id: TeamId,
    /// The team's name
    pub name: String,
    /// The team's score over the rounds in view
    pub score: u32,
    /// The team's win count over the rounds in view
    pub wins: u32,
    /// The team's Buchholz over the rounds in view
    pub buchholz: u32,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
/// An ordered collection of team standings
pub struct Standings {
    /// The placings, best first
    pub places: Vec<TeamStanding>,
}

/// Ranks the registry's teams by `(score desc, buchholz desc, wins desc)`,
/// with team id as the stable final tiebreak
pub fn standings(teams: &TeamRegistry) -> Standings {
    let mut places: Vec<TeamStanding> = teams
        .iter()
        .map(|t| TeamStanding {
            team_id: t.id,
            name: t.name.clone(),
            score: t.score,
            wins: t.wins,
            buchholz: t.buchholz,
        })
        .collect();
    places.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.buchholz.cmp(&a.buchholz))
            .then(b.wins.cmp(&a.wins))
            .then(a.team_id.cmp(&b.team_id))
    });
    Standings { places }
}
