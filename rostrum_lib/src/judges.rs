use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Seq};

pub use crate::identifiers::JudgeId;
use crate::{error::TournamentError, identifiers::MatchId};

/// The institution recorded for judges registered without one
pub const DEFAULT_JUDGE_INSTITUTION: &str = "Tournament Hire";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// The core model for a tournament judge. The assignment ledger mirrors the
/// matches' `judge_id` fields; the consistency layer cross-checks the two on
/// every mutation.
pub struct Judge {
    /// The judge's id
    pub id: JudgeId,
    /// The judge's name
    pub name: String,
    /// The institution the judge is affiliated with
    pub institution: String,
    /// The ids of the matches this judge is assigned to
    pub matches_judged: BTreeSet<MatchId>,
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// The struct that creates and manages all judges
pub struct JudgeRegistry {
    /// All judges, keyed by id
    #[serde_as(as = "Seq<(_, _)>")]
    pub judges: BTreeMap<JudgeId, Judge>,
    /// The id the next registered judge will receive
    pub next_judge_id: u32,
}

impl JudgeRegistry {
    /// Creates a new judge registry with no judges
    pub fn new() -> Self {
        JudgeRegistry {
            judges: BTreeMap::new(),
            next_judge_id: 1,
        }
    }

    /// Registers a judge. Names are unique case-insensitively; a missing
    /// institution defaults to a tournament hire.
    pub fn add_judge(
        &mut self,
        name: String,
        institution: Option<String>,
    ) -> Result<JudgeId, TournamentError> {
        let folded = name.to_lowercase();
        if self
            .judges
            .values()
            .any(|j| j.name.to_lowercase() == folded)
        {
            return Err(TournamentError::JudgeNameTaken);
        }
        let id = JudgeId(self.next_judge_id);
        self.next_judge_id += 1;
        self.judges.insert(
            id,
            Judge {
                id,
                name,
                institution: institution
                    .unwrap_or_else(|| DEFAULT_JUDGE_INSTITUTION.to_string()),
                matches_judged: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    /// Removes a judge. Judges still assigned to matches can't be removed.
    pub fn remove_judge(&mut self, id: JudgeId) -> Result<(), TournamentError> {
        let judge = self.get_judge(id)?;
        if !judge.matches_judged.is_empty() {
            return Err(TournamentError::JudgeHasAssignments);
        }
        self.judges.remove(&id);
        Ok(())
    }

    /// Given a judge id, returns a reference to that judge if found
    pub fn get_judge(&self, id: JudgeId) -> Result<&Judge, TournamentError> {
        self.judges.get(&id).ok_or(TournamentError::JudgeLookup)
    }

    /// Given a judge id, returns a mutable reference to that judge if found
    pub fn get_mut_judge(&mut self, id: JudgeId) -> Result<&mut Judge, TournamentError> {
        self.judges.get_mut(&id).ok_or(TournamentError::JudgeLookup)
    }

    /// Calculates the number of registered judges
    pub fn len(&self) -> usize {
        self.judges.len()
    }

    /// Calculates if there are no judges registered
    pub fn is_empty(&self) -> bool {
        self.judges.is_empty()
    }
}

impl Default for JudgeRegistry {
    fn default() -> Self {
        JudgeRegistry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_case_insensitively() {
        let mut reg = JudgeRegistry::new();
        let id = reg.add_judge("Robin Vale".into(), None).unwrap();
        assert_eq!(id, JudgeId(1));
        assert_eq!(
            reg.add_judge("robin vale".into(), Some("West".into())),
            Err(TournamentError::JudgeNameTaken)
        );
        assert_eq!(
            reg.get_judge(id).unwrap().institution,
            DEFAULT_JUDGE_INSTITUTION
        );
    }

    #[test]
    fn removal_requires_an_empty_ledger() {
        let mut reg = JudgeRegistry::new();
        let id = reg.add_judge("Robin Vale".into(), None).unwrap();
        reg.get_mut_judge(id)
            .unwrap()
            .matches_judged
            .insert(MatchId(1));
        assert_eq!(
            reg.remove_judge(id),
            Err(TournamentError::JudgeHasAssignments)
        );
        reg.get_mut_judge(id)
            .unwrap()
            .matches_judged
            .remove(&MatchId(1));
        assert!(reg.remove_judge(id).is_ok());
        assert!(reg.get_judge(id).is_err());
    }
}
