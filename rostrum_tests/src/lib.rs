//! Spoofing helpers shared by the integration suites.

use rostrum_lib::{
    matches::Match,
    teams::Side,
    tournament::{TeamDetails, Tournament, TournamentConfig},
};

/// Builds a roster of `count` teams with predictable names
pub fn spoof_details(count: u32) -> Vec<TeamDetails> {
    (0..count)
        .map(|i| TeamDetails {
            name: format!("Team {}", i + 1),
            institution: format!("School {}", i % 4 + 1),
            members: [format!("Team {} A", i + 1), format!("Team {} B", i + 1)],
        })
        .collect()
}

/// Builds a ready-to-pair tournament
pub fn spoof_tournament(num_teams: u32, num_prelim_rounds: u32, num_elim_rounds: u32) -> Tournament {
    Tournament::new(
        "Spoofed Open".into(),
        TournamentConfig {
            num_teams,
            num_prelim_rounds,
            num_elim_rounds,
        },
        spoof_details(num_teams),
    )
    .unwrap()
}

/// Reports every match of a round, choosing each winner with `pick`
pub fn report_round<F>(tourn: &mut Tournament, round_num: u32, mut pick: F)
where
    F: FnMut(&Match) -> Side,
{
    for m in tourn.round_matches(round_num) {
        let winner = pick(&m);
        tourn.report_result(m.id, winner, None).unwrap();
    }
}

/// A deterministic outcome rule: the lower team id (the stronger seed in
/// spoofed rosters) always wins
pub fn lower_id_wins(m: &Match) -> Side {
    if m.aff_id.0 < m.neg_id.0 {
        Side::Aff
    } else {
        Side::Neg
    }
}

/// The break seed of a match's Affirmative and Negative teams
pub fn match_seeds(tourn: &Tournament, m: &Match) -> (u32, u32) {
    let aff = tourn.teams.get_team(m.aff_id).unwrap();
    let neg = tourn.teams.get_team(m.neg_id).unwrap();
    (aff.break_seed.unwrap(), neg.break_seed.unwrap())
}

/// Reports an elimination round with the better (numerically lower) break
/// seed always advancing
pub fn report_round_by_seed(tourn: &mut Tournament, round_num: u32) {
    for m in tourn.round_matches(round_num) {
        let (aff_seed, neg_seed) = match_seeds(tourn, &m);
        let winner = if aff_seed < neg_seed {
            Side::Aff
        } else {
            Side::Neg
        };
        tourn.report_result(m.id, winner, None).unwrap();
    }
}
