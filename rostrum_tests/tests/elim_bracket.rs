//! Break and elimination-round scenarios over a full 8-team bracket.

use rostrum_lib::error::TournamentError;
use rostrum_tests::{
    lower_id_wins, match_seeds, report_round, report_round_by_seed, spoof_tournament,
};

/// Runs the four prelim rounds with deterministic lower-id outcomes
fn through_prelims() -> rostrum_lib::tournament::Tournament {
    let mut tourn = spoof_tournament(8, 4, 3);
    for round in 1..=4 {
        tourn.pair_round(round).unwrap();
        report_round(&mut tourn, round, lower_id_wins);
    }
    tourn
}

#[test]
fn the_top_eight_break_in_standings_order() {
    let mut tourn = through_prelims();
    let prelim = tourn.preliminary_standings().unwrap();
    tourn.pair_round(5).unwrap();

    for (at, place) in prelim.places.iter().enumerate() {
        let team = tourn.teams.get_team(place.team_id).unwrap();
        assert_eq!(
            team.break_seed,
            Some(at as u32 + 1),
            "standings position {} takes that seed",
            at + 1
        );
    }
}

#[test]
fn round_of_eight_emits_the_standard_bracket() {
    let mut tourn = through_prelims();
    tourn.pair_round(5).unwrap();
    let seeds: Vec<(u32, u32)> = tourn
        .round_matches(5)
        .iter()
        .map(|m| {
            let (a, n) = match_seeds(&tourn, m);
            (a.min(n), a.max(n))
        })
        .collect();
    assert_eq!(
        seeds,
        vec![(1, 8), (4, 5), (3, 6), (2, 7)],
        "The round-of-8 must emit the non-swapped bracket order"
    );
}

#[test]
fn semifinals_and_final_follow_the_bracket_paths() {
    let mut tourn = through_prelims();
    tourn.pair_round(5).unwrap();
    report_round_by_seed(&mut tourn, 5);

    tourn.pair_round(6).unwrap();
    let semi_seeds: Vec<(u32, u32)> = tourn
        .round_matches(6)
        .iter()
        .map(|m| {
            let (a, n) = match_seeds(&tourn, m);
            (a.min(n), a.max(n))
        })
        .collect();
    assert_eq!(
        semi_seeds,
        vec![(1, 4), (2, 3)],
        "With higher seeds advancing, the semis are 1v4 then 3v2"
    );

    report_round_by_seed(&mut tourn, 6);
    tourn.pair_round(7).unwrap();
    let final_seeds: Vec<(u32, u32)> = tourn
        .round_matches(7)
        .iter()
        .map(|m| {
            let (a, n) = match_seeds(&tourn, m);
            (a.min(n), a.max(n))
        })
        .collect();
    assert_eq!(final_seeds, vec![(1, 2)]);

    report_round_by_seed(&mut tourn, 7);
    assert_eq!(tourn.current_round, 7);
}

#[test]
fn breaking_requires_enough_teams() {
    let mut tourn = spoof_tournament(6, 2, 3);
    for round in 1..=2 {
        tourn.pair_round(round).unwrap();
        report_round(&mut tourn, round, lower_id_wins);
    }
    assert_eq!(
        tourn.pair_round(3).unwrap_err(),
        TournamentError::BreakSizeExceedsField,
        "Six teams cannot fill a bracket of eight"
    );
}

#[test]
fn elim_rounds_require_the_previous_round_reported() {
    let mut tourn = through_prelims();
    tourn.pair_round(5).unwrap();
    assert_eq!(
        tourn.pair_round(6).unwrap_err(),
        TournamentError::PriorRoundIncomplete
    );
}

#[test]
fn the_break_waits_for_every_prelim_result() {
    let mut tourn = spoof_tournament(8, 4, 3);
    for round in 1..=3 {
        tourn.pair_round(round).unwrap();
        report_round(&mut tourn, round, lower_id_wins);
    }
    tourn.pair_round(4).unwrap();
    assert_eq!(
        tourn.pair_round(5).unwrap_err(),
        TournamentError::PriorRoundIncomplete
    );
}
