//! The Monte-Carlo harness: drives the Swiss pairing core over an
//! all-virtual roster where team id `i` has true rank `i + 1`, draws
//! outcomes from a win model through the seeded generator, and aggregates
//! the analyzer queries over many complete tournaments.
//!
//! A tournament is the unit of work: each run owns its own registry and
//! histories, so callers that want parallelism can shard seeds across
//! workers and merge the reports.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    error::TournamentError,
    identifiers::TeamId,
    pairings::swiss,
    scoring::stats,
    teams::{Side, TeamRegistry},
};

/// The seeded generator
pub mod rng;
/// The win-probability models
pub mod win_model;

pub use rng::Lcg;
pub use win_model::WinModel;

/// A progress callback, invoked every `observe_every` tournaments with the
/// count completed so far. Returning `false` stops the run; the query then
/// returns its partial aggregates.
pub type Observer<'a> = &'a mut dyn FnMut(u64) -> bool;

/// How many tournaments each head-to-head batch runs before re-checking
/// the stopping rule
const HEAD_TO_HEAD_BATCH: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The shape of a simulated tournament and the knobs of the run
pub struct SimConfig {
    /// The number of virtual teams; team id `i` has true rank `i + 1`
    pub num_teams: u32,
    /// The number of Swiss rounds per tournament
    pub num_rounds: u32,
    /// The win-probability model outcomes are drawn from
    pub win_model: WinModel,
    /// Whether the pairer's bracket sort uses the Buchholz tiebreak
    pub use_buchholz: bool,
    /// The seed for the run's generator
    pub seed: u32,
    /// How many tournaments between observer callbacks
    pub observe_every: u64,
}

impl SimConfig {
    /// Creates a config with the default model, tiebreak, and seed
    pub fn new(num_teams: u32, num_rounds: u32) -> Self {
        SimConfig {
            num_teams,
            num_rounds,
            win_model: WinModel::default(),
            use_buchholz: true,
            seed: 12345,
            observe_every: 100,
        }
    }
}

#[derive(Debug, Clone)]
/// One completed virtual tournament: final team state plus each team's
/// win/loss history string in round order
pub struct SimTournament {
    /// The virtual roster with its final stats
    pub teams: TeamRegistry,
    /// Per-team `W`/`L` strings, indexed by team id; byes count as wins
    pub histories: Vec<String>,
}

impl SimTournament {
    /// The finishing order: `(score desc, buchholz desc)`, stable on id
    pub fn final_order(&self) -> Vec<TeamId> {
        let mut order = self.teams.ids();
        order.sort_by(|a, b| {
            let ta = &self.teams.teams[a.0 as usize];
            let tb = &self.teams.teams[b.0 as usize];
            tb.score
                .cmp(&ta.score)
                .then(tb.buchholz.cmp(&ta.buchholz))
        });
        order
    }
}

/// Runs one complete tournament, committing every outcome through the same
/// team mutators the live recomputer replays with
pub fn run_tournament(cfg: &SimConfig, rng: &mut Lcg) -> SimTournament {
    let mut teams = TeamRegistry::new();
    for i in 0..cfg.num_teams {
        teams.register_team(
            format!("Team {}", i + 1),
            String::new(),
            [format!("Team {} A", i + 1), format!("Team {} B", i + 1)],
        );
    }
    let mut histories = vec![String::new(); cfg.num_teams as usize];
    for round in 1..=cfg.num_rounds {
        let pairings = swiss::pair_round(&mut teams, round, cfg.use_buchholz, rng);
        for (aff, neg) in &pairings.pairs {
            teams.teams[aff.0 as usize].record_pairing(*neg, Side::Aff);
            teams.teams[neg.0 as usize].record_pairing(*aff, Side::Neg);
            let p = cfg.win_model.p_win(aff.0 + 1, neg.0 + 1);
            let (winner, loser) = if rng.next_f64() < p {
                (*aff, *neg)
            } else {
                (*neg, *aff)
            };
            teams.teams[winner.0 as usize].record_win();
            histories[winner.0 as usize].push('W');
            histories[loser.0 as usize].push('L');
        }
        if let Some(team) = pairings.bye {
            teams.teams[team.0 as usize].record_bye();
            histories[team.0 as usize].push('W');
        }
    }
    stats::recompute_buchholz(&mut teams);
    SimTournament { teams, histories }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-true-rank counts of top-N finishes
pub struct TopNReport {
    /// `counts[r - 1]` is how often true rank `r` finished in the top N
    pub counts: Vec<u64>,
    /// How many tournaments actually ran
    pub tournaments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A histogram of final win counts for one true rank
pub struct WinDistribution {
    /// `wins -> tournaments` for the target rank
    pub counts: BTreeMap<u32, u64>,
    /// How many tournaments actually ran
    pub tournaments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A histogram of true ranks matching some condition on final state
pub struct RankDistribution {
    /// `true rank -> matching teams` summed over tournaments
    pub counts: BTreeMap<u32, u64>,
    /// How many tournaments actually ran
    pub tournaments: u64,
}

#[derive(Debug, Clone, PartialEq)]
/// The aggregate of the history-cohort head-to-head query
pub struct HeadToHeadReport {
    /// How many cohort matchups were observed
    pub matchups: u64,
    /// Matchups won by the first cohort
    pub wins_a: u64,
    /// Matchups won by the second cohort
    pub wins_b: u64,
    /// Mean true rank on the first cohort's side of the matchups
    pub mean_rank_a: f64,
    /// Mean true rank on the second cohort's side of the matchups
    pub mean_rank_b: f64,
    /// How many tournaments actually ran
    pub tournaments: u64,
}

/// Counts, per true rank, how often that rank finishes in the top N
pub fn top_n_counts(
    cfg: &SimConfig,
    n: u32,
    iterations: u64,
    observer: Option<Observer<'_>>,
) -> TopNReport {
    let mut counts = vec![0u64; cfg.num_teams as usize];
    let tournaments = run_many(cfg, iterations, observer, |tourn| {
        for id in tourn.final_order().iter().take(n as usize) {
            counts[id.0 as usize] += 1;
        }
    });
    TopNReport {
        counts,
        tournaments,
    }
}

/// The distribution of final win counts for the team of the given true rank
pub fn win_distribution(
    cfg: &SimConfig,
    true_rank: u32,
    iterations: u64,
    observer: Option<Observer<'_>>,
) -> Result<WinDistribution, TournamentError> {
    if true_rank == 0 || true_rank > cfg.num_teams {
        return Err(TournamentError::TeamLookup);
    }
    let target = (true_rank - 1) as usize;
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    let tournaments = run_many(cfg, iterations, observer, |tourn| {
        *counts.entry(tourn.teams.teams[target].wins).or_default() += 1;
    });
    Ok(WinDistribution {
        counts,
        tournaments,
    })
}

/// The distribution of true ranks over teams finishing with the given win
/// count
pub fn rank_distribution_from_wins(
    cfg: &SimConfig,
    wins: u32,
    iterations: u64,
    observer: Option<Observer<'_>>,
) -> RankDistribution {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    let tournaments = run_many(cfg, iterations, observer, |tourn| {
        for team in tourn.teams.iter() {
            if team.wins == wins {
                *counts.entry(team.id.0 + 1).or_default() += 1;
            }
        }
    });
    RankDistribution {
        counts,
        tournaments,
    }
}

/// The distribution of true ranks over teams whose win/loss history starts
/// with the given `W`/`L` prefix
pub fn rank_distribution_from_history(
    cfg: &SimConfig,
    prefix: &str,
    iterations: u64,
    observer: Option<Observer<'_>>,
) -> Result<RankDistribution, TournamentError> {
    check_history(prefix, cfg.num_rounds)?;
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    let tournaments = run_many(cfg, iterations, observer, |tourn| {
        for team in tourn.teams.iter() {
            if tourn.histories[team.id.0 as usize].starts_with(prefix) {
                *counts.entry(team.id.0 + 1).or_default() += 1;
            }
        }
    });
    Ok(RankDistribution {
        counts,
        tournaments,
    })
}

/// Observes matchups between two history cohorts: teams whose first
/// `len` rounds read `history_a` against teams reading `history_b`, meeting
/// in round `len + 1`.
///
/// The run is adaptive: tournaments execute in batches until at least
/// `min_matchups` have been observed or `max_tournaments` have run,
/// whichever comes first, so rare cohorts don't starve and common ones
/// don't overpay.
pub fn head_to_head(
    cfg: &SimConfig,
    history_a: &str,
    history_b: &str,
    min_matchups: u64,
    max_tournaments: u64,
    mut observer: Option<Observer<'_>>,
) -> Result<HeadToHeadReport, TournamentError> {
    check_history(history_a, cfg.num_rounds)?;
    check_history(history_b, cfg.num_rounds)?;
    let depth = history_a.len();
    if depth != history_b.len() || depth == 0 || depth >= cfg.num_rounds as usize {
        return Err(TournamentError::InvalidHistory);
    }

    let mut rng = Lcg::new(cfg.seed);
    let mut report = HeadToHeadReport {
        matchups: 0,
        wins_a: 0,
        wins_b: 0,
        mean_rank_a: 0.0,
        mean_rank_b: 0.0,
        tournaments: 0,
    };
    let mut rank_sum_a = 0u64;
    let mut rank_sum_b = 0u64;
    'run: while report.matchups < min_matchups && report.tournaments < max_tournaments {
        for _ in 0..HEAD_TO_HEAD_BATCH {
            if report.tournaments >= max_tournaments {
                break;
            }
            let tourn = run_tournament(cfg, &mut rng);
            report.tournaments += 1;
            let cohort_a: Vec<TeamId> = cohort(&tourn, history_a);
            let cohort_b: Vec<TeamId> = cohort(&tourn, history_b);
            for a in &cohort_a {
                for b in &cohort_b {
                    if a == b {
                        continue;
                    }
                    if tourn.teams.teams[a.0 as usize].opponents[depth] == Some(*b) {
                        report.matchups += 1;
                        rank_sum_a += (a.0 + 1) as u64;
                        rank_sum_b += (b.0 + 1) as u64;
                        if tourn.histories[a.0 as usize].as_bytes()[depth] == b'W' {
                            report.wins_a += 1;
                        } else {
                            report.wins_b += 1;
                        }
                    }
                }
            }
            if cfg.observe_every > 0 && report.tournaments % cfg.observe_every == 0 {
                if let Some(cb) = observer.as_mut() {
                    if !cb(report.tournaments) {
                        break 'run;
                    }
                }
            }
        }
    }
    if report.matchups > 0 {
        report.mean_rank_a = rank_sum_a as f64 / report.matchups as f64;
        report.mean_rank_b = rank_sum_b as f64 / report.matchups as f64;
    }
    debug!(
        matchups = report.matchups,
        tournaments = report.tournaments,
        "head-to-head run finished"
    );
    Ok(report)
}

fn cohort(tourn: &SimTournament, prefix: &str) -> Vec<TeamId> {
    tourn
        .teams
        .ids()
        .into_iter()
        .filter(|id| tourn.histories[id.0 as usize].starts_with(prefix))
        .collect()
}

fn check_history(history: &str, num_rounds: u32) -> Result<(), TournamentError> {
    if history.is_empty()
        || history.len() > num_rounds as usize
        || !history.bytes().all(|b| b == b'W' || b == b'L')
    {
        return Err(TournamentError::InvalidHistory);
    }
    Ok(())
}

fn run_many<F>(
    cfg: &SimConfig,
    iterations: u64,
    mut observer: Option<Observer<'_>>,
    mut visit: F,
) -> u64
where
    F: FnMut(&SimTournament),
{
    let mut rng = Lcg::new(cfg.seed);
    let mut done = 0;
    while done < iterations {
        let tourn = run_tournament(cfg, &mut rng);
        visit(&tourn);
        done += 1;
        if cfg.observe_every > 0 && done % cfg.observe_every == 0 {
            if let Some(cb) = observer.as_mut() {
                if !cb(done) {
                    break;
                }
            }
        }
    }
    done
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_are_reproducible_from_the_seed() {
        let cfg = SimConfig::new(8, 3);
        let first = top_n_counts(&cfg, 4, 50, None);
        let second = top_n_counts(&cfg, 4, 50, None);
        assert_eq!(first, second, "Same seed must give the same aggregates");
    }

    #[test]
    fn deterministic_model_always_crowns_rank_one() {
        // Four teams over three rounds is a forced round robin, so rank 1
        // holds a strict score lead every time
        let cfg = SimConfig {
            win_model: WinModel::Deterministic,
            ..SimConfig::new(4, 3)
        };
        let report = top_n_counts(&cfg, 1, 25, None);
        assert_eq!(report.tournaments, 25);
        assert_eq!(
            report.counts[0], 25,
            "True rank 1 never loses under the deterministic model"
        );
        assert!(report.counts[1..].iter().all(|c| *c == 0));
    }

    #[test]
    fn deterministic_wins_pile_up_on_the_round_count() {
        let cfg = SimConfig {
            win_model: WinModel::Deterministic,
            ..SimConfig::new(8, 3)
        };
        let report = win_distribution(&cfg, 1, 10, None).unwrap();
        assert_eq!(report.counts, BTreeMap::from([(3, 10)]));
        assert_eq!(
            win_distribution(&cfg, 9, 10, None).unwrap_err(),
            TournamentError::TeamLookup
        );
    }

    #[test]
    fn full_round_robin_pins_rank_from_wins() {
        // Four teams over three rounds is a forced round robin, so under
        // the deterministic model the win count identifies the rank
        let cfg = SimConfig {
            win_model: WinModel::Deterministic,
            ..SimConfig::new(4, 3)
        };
        let report = rank_distribution_from_wins(&cfg, 3, 20, None);
        assert_eq!(report.counts, BTreeMap::from([(1, 20)]));
        let winless = rank_distribution_from_wins(&cfg, 0, 20, None);
        assert_eq!(winless.counts, BTreeMap::from([(4, 20)]));
    }

    #[test]
    fn history_prefix_counts_cover_round_one_winners() {
        let cfg = SimConfig::new(6, 3);
        let report = rank_distribution_from_history(&cfg, "W", 30, None).unwrap();
        let total: u64 = report.counts.values().sum();
        assert_eq!(
            total, 90,
            "Six teams produce three round-1 winners per tournament"
        );
    }

    #[test]
    fn observer_cancellation_returns_partials() {
        let cfg = SimConfig {
            observe_every: 10,
            ..SimConfig::new(4, 2)
        };
        let mut calls = 0;
        let mut stop = |_done: u64| {
            calls += 1;
            false
        };
        let report = top_n_counts(&cfg, 2, 1000, Some(&mut stop));
        assert_eq!(calls, 1);
        assert_eq!(report.tournaments, 10, "The run must stop at the first callback");
    }

    #[test]
    fn head_to_head_observes_cohort_meetings() {
        let cfg = SimConfig::new(16, 3);
        let report = head_to_head(&cfg, "WW", "WL", 20, 3000, None).unwrap();
        assert!(report.tournaments > 0);
        assert!(
            report.matchups >= 20 || report.tournaments == 3000,
            "Either the quota is met or the cap was exhausted"
        );
        assert_eq!(report.wins_a + report.wins_b, report.matchups);
        if report.matchups > 0 {
            assert!(report.mean_rank_a >= 1.0 && report.mean_rank_b >= 1.0);
        }
    }

    #[test]
    fn head_to_head_rejects_bad_histories() {
        let cfg = SimConfig::new(8, 3);
        assert_eq!(
            head_to_head(&cfg, "WW", "L", 10, 100, None).unwrap_err(),
            TournamentError::InvalidHistory
        );
        assert_eq!(
            head_to_head(&cfg, "WX", "WL", 10, 100, None).unwrap_err(),
            TournamentError::InvalidHistory
        );
        assert_eq!(
            head_to_head(&cfg, "WWW", "WWW", 10, 100, None).unwrap_err(),
            TournamentError::InvalidHistory,
        );
    }

    #[test]
    fn byes_extend_histories_with_wins() {
        let cfg = SimConfig {
            win_model: WinModel::Deterministic,
            ..SimConfig::new(5, 2)
        };
        let mut rng = Lcg::new(7);
        let tourn = run_tournament(&cfg, &mut rng);
        for history in &tourn.histories {
            assert_eq!(history.len(), 2, "Every team logs one letter per round");
        }
        let total_wins: u32 = tourn.teams.iter().map(|t| t.wins).sum();
        // Two pairs and a bye per round over two rounds
        assert_eq!(total_wins, 6);
    }
}
