use serde::{Deserialize, Serialize};

use crate::{
    error::TournamentError,
    identifiers::TeamId,
    teams::{Team, TeamMember},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
/// The struct that creates and manages all teams. Teams are keyed by dense
/// ids, so the backing store is a plain vector indexed by `TeamId`.
pub struct TeamRegistry {
    /// All teams in the tournament, indexed by id
    pub teams: Vec<Team>,
}

impl TeamRegistry {
    /// Creates a new team registry with no teams
    pub fn new() -> Self {
        TeamRegistry { teams: Vec::new() }
    }

    /// Registers a team, assigning it the next dense id
    pub fn register_team(
        &mut self,
        name: String,
        institution: String,
        member_names: [String; 2],
    ) -> TeamId {
        let id = TeamId(self.teams.len() as u32);
        let [first, second] = member_names;
        let members = [
            TeamMember {
                name: first,
                slot: 0,
            },
            TeamMember {
                name: second,
                slot: 1,
            },
        ];
        self.teams.push(Team::new(id, name, institution, members));
        id
    }

    /// Given a team id, returns a reference to that team if found
    pub fn get_team(&self, id: TeamId) -> Result<&Team, TournamentError> {
        self.teams
            .get(id.0 as usize)
            .ok_or(TournamentError::TeamLookup)
    }

    /// Given a team id, returns a mutable reference to that team if found
    pub fn get_mut_team(&mut self, id: TeamId) -> Result<&mut Team, TournamentError> {
        self.teams
            .get_mut(id.0 as usize)
            .ok_or(TournamentError::TeamLookup)
    }

    /// Calculates the number of registered teams
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Calculates if there are no teams registered
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Returns every team id in id order
    pub fn ids(&self) -> Vec<TeamId> {
        self.teams.iter().map(|t| t.id).collect()
    }

    /// Iterates over all teams in id order
    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    /// Iterates mutably over all teams in id order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Team> {
        self.teams.iter_mut()
    }
}
