use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    consistency,
    error::TournamentError,
    identifiers::{JudgeId, MatchId, TeamId, TournamentId},
    judges::{Judge, JudgeRegistry, DEFAULT_JUDGE_INSTITUTION},
    matches::{Bye, Match, MatchRegistry, SpeakerPoints},
    pairings::{bracket, swiss, LiveRng, PairingRng, RoundPairings},
    scoring::{
        self,
        speaker::{participant_standings, AdjustMethod, ParticipantStanding},
        stats, Standings,
    },
    teams::{Side, TeamRegistry},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
/// The fixed shape of a tournament: how many teams enter, how many Swiss
/// rounds they debate, and how deep the elimination bracket runs
pub struct TournamentConfig {
    /// The number of competing teams
    pub num_teams: u32,
    /// The number of preliminary (Swiss) rounds
    pub num_prelim_rounds: u32,
    /// The number of elimination rounds; the top `2^n` teams break
    pub num_elim_rounds: u32,
}

impl TournamentConfig {
    /// The total number of rounds
    pub fn num_rounds(&self) -> u32 {
        self.num_prelim_rounds + self.num_elim_rounds
    }

    /// The number of teams that break
    pub fn break_size(&self) -> u32 {
        1 << self.num_elim_rounds
    }

    /// Calculates if the given round is an elimination round
    pub fn is_elim_round(&self, round_num: u32) -> bool {
        round_num > self.num_prelim_rounds
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// The registration details for one team
pub struct TeamDetails {
    /// The team's display name
    pub name: String,
    /// The institution the team represents
    pub institution: String,
    /// The two debaters' names, in slot order
    pub members: [String; 2],
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
/// The top-level aggregate: registries, the recorded byes, the counters,
/// and the two redundant textual projections. Every public mutation ends in
/// a full stat rebuild followed by a consistency check, so the struct is
/// always either unchanged or in a validated state.
///
/// Serializing the whole struct is the persistence boundary; re-ingesting a
/// snapshot goes through [`Tournament::from_snapshot`], which rejects
/// anything whose derived state disagrees with its match log.
pub struct Tournament {
    /// The tournament's id
    pub id: TournamentId,
    /// The tournament's name
    pub name: String,
    /// The fixed configuration
    pub config: TournamentConfig,
    /// The highest round R such that rounds 1..=R are fully reported
    pub current_round: u32,
    /// The team registry
    pub teams: TeamRegistry,
    /// The match registry
    pub matches: MatchRegistry,
    /// The judge registry
    pub judges: JudgeRegistry,
    /// Every bye awarded, in creation order
    pub byes: Vec<Bye>,
    /// The pairing log projection
    pub pairing_text: String,
    /// The result log projection (append-plus-audit)
    pub result_text: String,
}

impl Tournament {
    /// Initializes a tournament from its configuration and roster
    pub fn new(
        name: String,
        config: TournamentConfig,
        details: Vec<TeamDetails>,
    ) -> Result<Self, TournamentError> {
        if config.num_teams < 2 || details.len() as u32 != config.num_teams {
            return Err(TournamentError::RosterSizeMismatch);
        }
        let mut teams = TeamRegistry::new();
        for d in details {
            teams.register_team(d.name, d.institution, d.members);
        }
        let matches = MatchRegistry::new();
        let digest = Tournament {
            id: TournamentId::new(),
            name,
            config,
            current_round: 0,
            pairing_text: consistency::render_pairing_log(&matches),
            result_text: consistency::empty_result_log(),
            teams,
            matches,
            judges: JudgeRegistry::new(),
            byes: Vec::new(),
        };
        digest.check_consistency()?;
        Ok(digest)
    }

    /// Pairs the given round, which must be the next unpaired one.
    ///
    /// Round 2 may be paired before round 1's results arrive (the draw is
    /// random either way); every later round requires all earlier rounds to
    /// be fully reported. Prelim rounds go through the Swiss pairer;
    /// elimination rounds through the bracket seeder. Returns the created
    /// match ids in bracket order.
    pub fn pair_round(&mut self, round_num: u32) -> Result<Vec<MatchId>, TournamentError> {
        if round_num != self.matches.max_paired_round() + 1 {
            return Err(TournamentError::RoundOutOfSequence);
        }
        if round_num > self.config.num_rounds() {
            return Err(TournamentError::PastFinalRound);
        }
        if round_num > 2 || self.config.is_elim_round(round_num) {
            for earlier in 1..round_num {
                if !self.matches.round_fully_reported(earlier) {
                    return Err(TournamentError::PriorRoundIncomplete);
                }
            }
        }

        let mut rng = LiveRng::new();
        let pairings = if self.config.is_elim_round(round_num) {
            let elim_index = round_num - self.config.num_prelim_rounds;
            if elim_index == 1 {
                self.pair_break(&mut rng)?
            } else {
                self.pair_winners(round_num, &mut rng)?
            }
        } else {
            swiss::pair_round(&mut self.teams, round_num, true, &mut rng)
        };

        let mut ids = Vec::with_capacity(pairings.pairs.len());
        for (aff, neg) in &pairings.pairs {
            let aff_team = &self.teams.teams[aff.0 as usize];
            let neg_team = &self.teams.teams[neg.0 as usize];
            ids.push(self.matches.create_match(round_num, aff_team, neg_team));
        }
        if let Some(team_id) = pairings.bye {
            self.byes.push(Bye { round_num, team_id });
        }
        self.refresh()?;
        info!(
            round = round_num,
            matches = ids.len(),
            bye = pairings.bye.map(|t| t.0),
            "paired round"
        );
        Ok(ids)
    }

    /// Records a fresh result. Matches that already have one must go
    /// through [`Tournament::update_result`] instead.
    pub fn report_result(
        &mut self,
        match_id: MatchId,
        winner: Side,
        speaker_points: Option<SpeakerPoints>,
    ) -> Result<(), TournamentError> {
        if self.matches.get_match(match_id)?.is_reported() {
            return Err(TournamentError::DuplicateResult);
        }
        let m = self.matches.get_mut_match(match_id)?;
        m.result = Some(winner);
        if speaker_points.is_some() {
            m.speaker_points = speaker_points;
        }
        let m = self.matches.get_match(match_id)?;
        consistency::append_result_line(&mut self.result_text, m);
        self.refresh()?;
        debug!(match_id = match_id.0, winner = %winner, "reported result");
        Ok(())
    }

    /// Forcibly rewrites a match's outcome: a correction when `new_winner`
    /// is set, a clear when it is `None`. The speaker-point argument
    /// replaces the stored ballot outright. The old result-log line is kept
    /// as an audit comment.
    pub fn update_result(
        &mut self,
        match_id: MatchId,
        new_winner: Option<Side>,
        speaker_points: Option<SpeakerPoints>,
    ) -> Result<(), TournamentError> {
        if self.matches.get_match(match_id)?.is_reported() {
            consistency::retire_result_lines(&mut self.result_text, match_id, "Corrected");
        }
        let m = self.matches.get_mut_match(match_id)?;
        m.result = new_winner;
        m.speaker_points = speaker_points;
        let m = self.matches.get_match(match_id)?;
        consistency::append_result_line(&mut self.result_text, m);
        self.refresh()?;
        debug!(match_id = match_id.0, "updated result");
        Ok(())
    }

    /// Assigns a judge to a match, replacing and cleaning up any prior
    /// assignment on both sides of the relation
    pub fn assign_judge(
        &mut self,
        match_id: MatchId,
        judge_id: JudgeId,
    ) -> Result<(), TournamentError> {
        self.judges.get_judge(judge_id)?;
        let prior = self.matches.get_match(match_id)?.judge_id;
        if prior == Some(judge_id) {
            return Ok(());
        }
        if let Some(prior_id) = prior {
            self.judges
                .get_mut_judge(prior_id)?
                .matches_judged
                .remove(&match_id);
        }
        self.judges
            .get_mut_judge(judge_id)?
            .matches_judged
            .insert(match_id);
        self.matches.get_mut_match(match_id)?.judge_id = Some(judge_id);
        self.refresh_result_line(match_id)?;
        self.refresh()
    }

    /// Removes a match's judge assignment, if any
    pub fn unassign_judge(&mut self, match_id: MatchId) -> Result<(), TournamentError> {
        let prior = self.matches.get_match(match_id)?.judge_id;
        let Some(prior_id) = prior else {
            return Ok(());
        };
        self.judges
            .get_mut_judge(prior_id)?
            .matches_judged
            .remove(&match_id);
        self.matches.get_mut_match(match_id)?.judge_id = None;
        self.refresh_result_line(match_id)?;
        self.refresh()
    }

    /// Registers a judge; names are unique case-insensitively
    pub fn add_judge(
        &mut self,
        name: String,
        institution: Option<String>,
    ) -> Result<JudgeId, TournamentError> {
        let id = self.judges.add_judge(name, institution)?;
        self.check_consistency()?;
        Ok(id)
    }

    /// Removes a judge with no remaining assignments
    pub fn remove_judge(&mut self, judge_id: JudgeId) -> Result<(), TournamentError> {
        self.judges.remove_judge(judge_id)?;
        self.check_consistency()
    }

    /// The overall standings across every reported round
    pub fn standings(&self) -> Standings {
        scoring::standings(&self.teams)
    }

    /// The standings considering only rounds up to `round_num`
    pub fn standings_through(&self, round_num: u32) -> Result<Standings, TournamentError> {
        let mut view = self.teams.clone();
        stats::recompute_through(&mut view, &self.matches, &self.byes, round_num)?;
        Ok(scoring::standings(&view))
    }

    /// The standings over the preliminary rounds only; this ranking decides
    /// who breaks and in what seed order
    pub fn preliminary_standings(&self) -> Result<Standings, TournamentError> {
        self.standings_through(self.config.num_prelim_rounds)
    }

    /// Individual speaker standings over the preliminary rounds
    pub fn participant_standings(&self, method: AdjustMethod) -> Vec<ParticipantStanding> {
        participant_standings(&self.teams, self.config.num_prelim_rounds, method)
    }

    /// The matches of one round, in bracket order
    pub fn round_matches(&self, round_num: u32) -> Vec<Match> {
        self.matches
            .round_matches(round_num)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Applies every line of a result log to the matching matches. The
    /// whole batch is validated before anything is committed, so a bad line
    /// leaves the tournament untouched.
    pub fn apply_result_log(&mut self, text: &str) -> Result<(), TournamentError> {
        let lines = consistency::parse_result_log(text)?;
        let mut batch_ids = std::collections::BTreeSet::new();
        for line in &lines {
            let m = self.matches.get_match(line.match_id)?;
            if m.round_num != line.round_num
                || m.aff_id != line.aff_id
                || m.neg_id != line.neg_id
            {
                return Err(TournamentError::MalformedLog);
            }
            if m.is_reported() || !batch_ids.insert(line.match_id) {
                return Err(TournamentError::DuplicateResult);
            }
        }
        for line in lines {
            if let Some(judge_id) = line.judge_id {
                self.ensure_judge(judge_id);
                self.judges
                    .get_mut_judge(judge_id)?
                    .matches_judged
                    .insert(line.match_id);
            }
            let m = self.matches.get_mut_match(line.match_id)?;
            m.result = Some(line.outcome);
            m.judge_id = line.judge_id;
            m.speaker_points = line.speaker_points;
            let m = self.matches.get_match(line.match_id)?;
            consistency::append_result_line(&mut self.result_text, m);
        }
        self.refresh()
    }

    /// Rebuilds a tournament from its textual projections: the `reinit`
    /// surface. Prelim-round byes are inferred from the single unpaired
    /// team of each round; judges referenced by the result log are
    /// materialized as placeholder registrations.
    pub fn from_logs(
        name: String,
        config: TournamentConfig,
        details: Vec<TeamDetails>,
        pairing_text: &str,
        result_text: Option<&str>,
    ) -> Result<Self, TournamentError> {
        let mut digest = Tournament::new(name, config, details)?;
        let lines = consistency::parse_pairing_log(pairing_text)?;
        for line in &lines {
            if line.round_num == 0
                || line.round_num > config.num_rounds()
                || line.aff_id == line.neg_id
            {
                return Err(TournamentError::MalformedLog);
            }
            let aff = digest.teams.get_team(line.aff_id)?;
            let neg = digest.teams.get_team(line.neg_id)?;
            let m = Match {
                id: line.match_id,
                round_num: line.round_num,
                aff_id: aff.id,
                neg_id: neg.id,
                aff_name: aff.name.clone(),
                neg_name: neg.name.clone(),
                result: None,
                judge_id: None,
                speaker_points: None,
                paired_at: Utc::now(),
            };
            digest.matches.import_match(m)?;
        }
        let last_prelim = digest
            .matches
            .max_paired_round()
            .min(config.num_prelim_rounds);
        for round in 1..=last_prelim {
            let paired: std::collections::BTreeSet<TeamId> = digest
                .matches
                .round_matches(round)
                .iter()
                .flat_map(|m| [m.aff_id, m.neg_id])
                .collect();
            let mut unpaired = digest
                .teams
                .ids()
                .into_iter()
                .filter(|id| !paired.contains(id));
            match (unpaired.next(), unpaired.next()) {
                (None, _) => {}
                (Some(team_id), None) => digest.byes.push(Bye { round_num: round, team_id }),
                (Some(_), Some(_)) => return Err(TournamentError::MalformedLog),
            }
        }
        digest.refresh()?;
        if let Some(text) = result_text {
            digest.apply_result_log(text)?;
        }
        // A log that reaches the break also fixes the seeds: they fall out
        // of the prelim standings once every prelim result is in
        let broke = digest.matches.max_paired_round() > config.num_prelim_rounds;
        if broke
            && (1..=config.num_prelim_rounds)
                .all(|r| digest.matches.round_fully_reported(r))
        {
            let prelim = digest.preliminary_standings()?;
            for (at, place) in prelim
                .places
                .iter()
                .take(config.break_size() as usize)
                .enumerate()
            {
                digest.teams.get_mut_team(place.team_id)?.break_seed = Some(at as u32 + 1);
            }
        }
        Ok(digest)
    }

    /// Re-ingests a deserialized snapshot, rejecting any whose derived
    /// state disagrees with a fresh replay of its match log or whose
    /// projections disagree with its records
    pub fn from_snapshot(snapshot: Tournament) -> Result<Tournament, TournamentError> {
        let mut replayed = snapshot.clone();
        replayed.current_round =
            stats::recompute(&mut replayed.teams, &replayed.matches, &replayed.byes)?;
        if replayed != snapshot {
            error!("snapshot derived state disagrees with its match log");
            return Err(TournamentError::SnapshotDrift);
        }
        snapshot.check_consistency()?;
        Ok(snapshot)
    }

    fn pair_break<R: PairingRng>(
        &mut self,
        rng: &mut R,
    ) -> Result<RoundPairings, TournamentError> {
        let break_size = self.config.break_size();
        if self.config.num_teams < break_size {
            return Err(TournamentError::BreakSizeExceedsField);
        }
        let prelim = self.preliminary_standings()?;
        let seeded: Vec<TeamId> = prelim
            .places
            .iter()
            .take(break_size as usize)
            .map(|p| p.team_id)
            .collect();
        for (at, id) in seeded.iter().enumerate() {
            self.teams.get_mut_team(*id)?.break_seed = Some(at as u32 + 1);
        }
        info!(break_size, "teams broke to elimination rounds");
        Ok(bracket::pair_break_round(&self.teams, &seeded, rng))
    }

    fn pair_winners<R: PairingRng>(
        &self,
        round_num: u32,
        rng: &mut R,
    ) -> Result<RoundPairings, TournamentError> {
        let mut winners = Vec::new();
        for m in self.matches.round_matches(round_num - 1) {
            winners.push(m.winner_id().ok_or(TournamentError::PriorRoundIncomplete)?);
        }
        Ok(bracket::pair_winners_round(&self.teams, &winners, rng))
    }

    /// Rewrites a reported match's result-log line after a judge or ballot
    /// change so the projection keeps agreeing with the record
    fn refresh_result_line(&mut self, match_id: MatchId) -> Result<(), TournamentError> {
        let m = self.matches.get_match(match_id)?;
        if m.is_reported() {
            consistency::retire_result_lines(&mut self.result_text, match_id, "Updated");
            let m = self.matches.get_match(match_id)?;
            consistency::append_result_line(&mut self.result_text, m);
        }
        Ok(())
    }

    fn ensure_judge(&mut self, judge_id: JudgeId) {
        if self.judges.get_judge(judge_id).is_err() {
            self.judges.judges.insert(
                judge_id,
                Judge {
                    id: judge_id,
                    name: format!("Judge {}", judge_id),
                    institution: DEFAULT_JUDGE_INSTITUTION.to_string(),
                    matches_judged: Default::default(),
                },
            );
            if judge_id.0 >= self.judges.next_judge_id {
                self.judges.next_judge_id = judge_id.0 + 1;
            }
        }
    }

    /// Rebuilds derived state, regenerates the pairing projection, and runs
    /// the consistency validator
    fn refresh(&mut self) -> Result<(), TournamentError> {
        self.current_round = stats::recompute(&mut self.teams, &self.matches, &self.byes)?;
        self.pairing_text = consistency::render_pairing_log(&self.matches);
        self.check_consistency()
    }

    fn check_consistency(&self) -> Result<(), TournamentError> {
        consistency::validate(
            &self.teams,
            &self.matches,
            &self.judges,
            &self.pairing_text,
            &self.result_text,
        )
        .map_err(|e| {
            error!(error = %e, "state failed consistency validation");
            e
        })
    }
}
