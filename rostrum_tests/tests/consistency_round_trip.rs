//! Persistence-boundary laws: snapshot round-trips, projection stability,
//! tamper detection, and reinitialization from the textual logs.

use rostrum_lib::{
    consistency,
    error::TournamentError,
    matches::SpeakerPoints,
    r64,
    teams::Side,
    tournament::{TeamDetails, Tournament, TournamentConfig},
};
use rostrum_tests::{lower_id_wins, report_round, spoof_details, spoof_tournament};

fn played_tournament() -> Tournament {
    let mut tourn = spoof_tournament(4, 3, 0);
    tourn.pair_round(1).unwrap();
    report_round(&mut tourn, 1, lower_id_wins);
    tourn.pair_round(2).unwrap();
    let second = tourn.round_matches(2)[0].clone();
    let points = SpeakerPoints::new([
        Some(r64::new(55, 2)),
        Some(r64::from_integer(26)),
        Some(r64::new(51, 2)),
        None,
    ])
    .unwrap();
    tourn
        .report_result(second.id, Side::Neg, Some(points))
        .unwrap();
    let judge = tourn.add_judge("Robin Vale".into(), None).unwrap();
    tourn.assign_judge(second.id, judge).unwrap();
    tourn
}

#[test]
fn snapshots_round_trip_exactly() {
    let tourn = played_tournament();
    let blob = serde_json::to_string(&tourn).unwrap();
    let restored: Tournament = serde_json::from_str(&blob).unwrap();
    assert_eq!(restored, tourn, "import(export(T)) must equal T");
    let restored = Tournament::from_snapshot(restored).unwrap();
    assert_eq!(restored, tourn);
    assert_eq!(serde_json::to_string(&restored).unwrap(), blob);
}

#[test]
fn projections_reserialize_byte_identically() {
    let tourn = played_tournament();
    let pairing_lines = consistency::parse_pairing_log(&tourn.pairing_text).unwrap();
    assert_eq!(pairing_lines.len(), tourn.matches.len());
    let regenerated = consistency::render_pairing_log(&tourn.matches);
    assert_eq!(tourn.pairing_text, regenerated);
}

#[test]
fn tampered_team_stats_are_rejected_on_import() {
    let mut snapshot = played_tournament();
    snapshot.teams.teams[0].score += 1;
    snapshot.teams.teams[0].wins += 1;
    assert_eq!(
        Tournament::from_snapshot(snapshot).unwrap_err(),
        TournamentError::SnapshotDrift
    );
}

#[test]
fn a_tampered_pairing_projection_is_rejected_on_import() {
    let mut snapshot = played_tournament();
    snapshot.pairing_text = snapshot.pairing_text.replacen("1 1 ", "1 9 ", 1);
    assert_eq!(
        Tournament::from_snapshot(snapshot).unwrap_err(),
        TournamentError::PairingLogDrift
    );
}

#[test]
fn reinit_from_logs_reproduces_the_tournament() {
    let tourn = played_tournament();
    let rebuilt = Tournament::from_logs(
        tourn.name.clone(),
        tourn.config,
        spoof_details(4),
        &tourn.pairing_text,
        Some(&tourn.result_text),
    )
    .unwrap();

    assert_eq!(rebuilt.matches.len(), tourn.matches.len());
    for (a, b) in rebuilt.matches.matches.iter().zip(tourn.matches.matches.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.round_num, b.round_num);
        assert_eq!(a.aff_id, b.aff_id);
        assert_eq!(a.neg_id, b.neg_id);
        assert_eq!(a.result, b.result);
        assert_eq!(a.speaker_points, b.speaker_points);
    }
    assert_eq!(rebuilt.standings(), tourn.standings());
    assert_eq!(rebuilt.current_round, tourn.current_round);
    // The judge comes back as a placeholder registration with the same id
    let judge = rebuilt.judges.get_judge(rostrum_lib::identifiers::JudgeId(1)).unwrap();
    assert_eq!(judge.matches_judged.len(), 1);
}

#[test]
fn reinit_rejects_unknown_teams_and_duplicate_ids() {
    let config = TournamentConfig {
        num_teams: 4,
        num_prelim_rounds: 2,
        num_elim_rounds: 0,
    };
    let header = "# Format: Round MatchID AffID NegID\n";
    let unknown_team = format!("{}1 1 0 9\n", header);
    assert_eq!(
        Tournament::from_logs(
            "Bad".into(),
            config,
            spoof_details(4),
            &unknown_team,
            None
        )
        .unwrap_err(),
        TournamentError::TeamLookup
    );
    let duplicate = format!("{}1 1 0 3\n1 1 1 2\n", header);
    assert_eq!(
        Tournament::from_logs("Bad".into(), config, spoof_details(4), &duplicate, None)
            .unwrap_err(),
        TournamentError::MatchIdCollision
    );
}

#[test]
fn reinit_infers_the_prelim_bye() {
    let config = TournamentConfig {
        num_teams: 5,
        num_prelim_rounds: 2,
        num_elim_rounds: 0,
    };
    let pairing = "# Format: Round MatchID AffID NegID\n1 1 0 3\n1 2 1 2\n";
    let rebuilt =
        Tournament::from_logs("Odd".into(), config, spoof_details(5), pairing, None).unwrap();
    assert_eq!(rebuilt.byes.len(), 1);
    assert_eq!(rebuilt.byes[0].team_id, rostrum_lib::identifiers::TeamId(4));
    assert_eq!(rebuilt.teams.get_team(rebuilt.byes[0].team_id).unwrap().score, 1);
}

#[test]
fn batch_result_application_is_atomic() {
    let mut tourn = spoof_tournament(4, 2, 0);
    tourn.pair_round(1).unwrap();
    let matches = tourn.round_matches(1);
    let good = consistency::result_line(&{
        let mut m = matches[0].clone();
        m.result = Some(Side::Aff);
        m
    })
    .unwrap();
    // Second line disagrees with the recorded pairing
    let text = format!(
        "{}\n{} {} 9 9 A -1\n",
        good, matches[1].round_num, matches[1].id
    );
    assert_eq!(
        tourn.apply_result_log(&text).unwrap_err(),
        TournamentError::MalformedLog
    );
    assert_eq!(
        tourn.matches.get_match(matches[0].id).unwrap().result,
        None,
        "A failing batch must not report anything"
    );

    let ok = format!("{}\n", good);
    tourn.apply_result_log(&ok).unwrap();
    assert_eq!(
        tourn.matches.get_match(matches[0].id).unwrap().result,
        Some(Side::Aff)
    );
}

#[test]
fn an_initial_tournament_has_header_only_projections() {
    let details: Vec<TeamDetails> = spoof_details(2);
    let tourn = Tournament::new(
        "Fresh".into(),
        TournamentConfig {
            num_teams: 2,
            num_prelim_rounds: 1,
            num_elim_rounds: 0,
        },
        details,
    )
    .unwrap();
    assert_eq!(tourn.pairing_text, "# Format: Round MatchID AffID NegID\n");
    assert!(tourn.result_text.starts_with("# Format: Round MatchID AffID NegID Outcome"));
    assert_eq!(consistency::parse_pairing_log(&tourn.pairing_text).unwrap().len(), 0);
}
