//! The stat recomputer: the single source of truth for every derived team
//! field. All mutations replay the ordered match log from scratch rather
//! than patching incrementally, which makes result corrections and
//! out-of-order reporting drift-free at the cost of an O(matches) rebuild
//! per mutation.

use crate::{
    error::TournamentError,
    matches::{Bye, MatchRegistry},
    teams::{Side, TeamRegistry},
};

/// Rebuilds every team's derived stats from the match log and the recorded
/// byes, then returns the new `current_round`
pub fn recompute(
    teams: &mut TeamRegistry,
    matches: &MatchRegistry,
    byes: &[Bye],
) -> Result<u32, TournamentError> {
    recompute_through(teams, matches, byes, u32::MAX)?;
    Ok(current_round(matches))
}

/// Rebuilds every team's derived stats considering only rounds up to
/// `max_round`. Matches replay in `(round, match id)` order with each
/// round's byes woven in, so `opponents`, `side_history`, and `last_side`
/// always end up in round order no matter when results arrived.
pub fn recompute_through(
    teams: &mut TeamRegistry,
    matches: &MatchRegistry,
    byes: &[Bye],
    max_round: u32,
) -> Result<(), TournamentError> {
    for team in teams.iter_mut() {
        team.clear_stats();
    }
    let mut ordered: Vec<_> = matches
        .matches
        .iter()
        .filter(|m| m.round_num <= max_round)
        .collect();
    ordered.sort_by_key(|m| (m.round_num, m.id));
    let top = ordered
        .last()
        .map(|m| m.round_num)
        .unwrap_or(0)
        .max(
            byes.iter()
                .map(|b| b.round_num)
                .filter(|r| *r <= max_round)
                .max()
                .unwrap_or(0),
        );
    let mut at = 0;
    for round in 1..=top {
        while at < ordered.len() && ordered[at].round_num == round {
            let m = ordered[at];
            at += 1;
            teams
                .get_mut_team(m.aff_id)?
                .record_pairing(m.neg_id, Side::Aff);
            teams
                .get_mut_team(m.neg_id)?
                .record_pairing(m.aff_id, Side::Neg);
            if let Some(points) = m.speaker_points {
                teams
                    .get_mut_team(m.aff_id)?
                    .record_speaker_points(m.round_num, points.aff());
                teams
                    .get_mut_team(m.neg_id)?
                    .record_speaker_points(m.round_num, points.neg());
            }
            if let Some(winner) = m.winner_id() {
                teams.get_mut_team(winner)?.record_win();
            }
        }
        for bye in byes.iter().filter(|b| b.round_num == round) {
            teams.get_mut_team(bye.team_id)?.record_bye();
        }
    }
    recompute_buchholz(teams);
    Ok(())
}

/// Rewrites every team's Buchholz as the sum of its current opponents'
/// scores, byes excluded
pub fn recompute_buchholz(teams: &mut TeamRegistry) {
    let scores: Vec<u32> = teams.iter().map(|t| t.score).collect();
    for team in teams.iter_mut() {
        team.buchholz = team
            .opponents
            .iter()
            .flatten()
            .map(|opp| scores[opp.0 as usize])
            .sum();
    }
}

/// The largest round R such that every round up to R is fully reported, or
/// 0 when round 1 is still open
pub fn current_round(matches: &MatchRegistry) -> u32 {
    let mut digest = 0;
    for round in 1..=matches.max_paired_round() {
        if matches.round_matches(round).is_empty() || !matches.round_fully_reported(round) {
            break;
        }
        digest = round;
    }
    digest
}
