use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    identifiers::TeamId,
    pairings::{determine_sides, PairingRng, RoundPairings},
    scoring::stats::recompute_buchholz,
    teams::{Team, TeamRegistry},
};

/// Pairs one Swiss round.
///
/// Teams are partitioned into score brackets (rounds 1 and 2 use a single
/// synthetic bracket, so the draw is random), each bracket is paired
/// greedily from the top, and teams that can't be placed float down to the
/// next bracket. Whatever floats out of the last bracket is paired without a
/// repeat check, and a final odd team is returned as the bye.
///
/// Always terminates and always places every team. The caller commits the
/// pairs and the bye to tournament state.
pub fn pair_round<R: PairingRng>(
    teams: &mut TeamRegistry,
    round_num: u32,
    use_buchholz: bool,
    rng: &mut R,
) -> RoundPairings {
    recompute_buchholz(teams);

    let mut ids = teams.ids();
    rng.shuffle(&mut ids);

    // Rounds 1 and 2 ignore score entirely
    let brackets: Vec<Vec<TeamId>> = if round_num <= 2 {
        vec![ids]
    } else {
        ids.into_iter()
            .into_group_map_by(|id| teams.teams[id.0 as usize].score)
            .into_iter()
            .sorted_by(|a, b| b.0.cmp(&a.0))
            .map(|(_, bracket)| bracket)
            .collect()
    };
    debug!(
        round = round_num,
        brackets = brackets.len(),
        "partitioned score brackets"
    );

    let mut digest = RoundPairings::new();
    let mut floats: Vec<TeamId> = Vec::new();
    for bracket in brackets {
        let mut working: Vec<TeamId> = floats.drain(..).collect();
        working.extend(bracket);
        if round_num > 2 {
            working.sort_by(|a, b| {
                let ta = &teams.teams[a.0 as usize];
                let tb = &teams.teams[b.0 as usize];
                let by_score = tb.score.cmp(&ta.score);
                let by_tiebreak = if use_buchholz {
                    tb.buchholz.cmp(&ta.buchholz)
                } else {
                    std::cmp::Ordering::Equal
                };
                by_score.then(by_tiebreak).then(ta.id.cmp(&tb.id))
            });
        }
        while !working.is_empty() {
            let head = working.remove(0);
            let seeker = &teams.teams[head.0 as usize];
            match best_opponent(seeker, &working) {
                Some((idx, swappable)) => {
                    let found = working.remove(idx);
                    if swappable {
                        warn!(
                            round = round_num,
                            first = head.0,
                            second = found.0,
                            "no fresh opponent; pairing a side-swap rematch"
                        );
                    }
                    let pair = determine_sides(
                        &teams.teams[head.0 as usize],
                        &teams.teams[found.0 as usize],
                        swappable,
                        rng,
                    );
                    digest.pairs.push(pair);
                }
                None => floats.push(head),
            }
        }
    }

    // Floats are the last resort: pair them in order, repeats allowed
    while floats.len() >= 2 {
        let first = floats.remove(0);
        let second = floats.remove(0);
        if teams.teams[first.0 as usize].has_played(second) {
            warn!(
                round = round_num,
                first = first.0,
                second = second.0,
                "float drain emitted a rematch"
            );
        }
        let pair = determine_sides(
            &teams.teams[first.0 as usize],
            &teams.teams[second.0 as usize],
            false,
            rng,
        );
        digest.pairs.push(pair);
    }
    digest.bye = floats.pop();
    if let Some(team) = digest.bye {
        debug!(round = round_num, team = team.0, "awarding a bye");
    }
    digest
}

/// Scans the working list for the head team's best opponent, returning the
/// candidate's index and whether the pairing is a side-swap rematch.
///
/// A fresh opponent anywhere in the list beats every rematch. Only when no
/// fresh candidate exists is a rematch considered, and then only against a
/// candidate the seeker hasn't played both sides against. Removal and pair
/// emission are the caller's side effects.
pub(crate) fn best_opponent(seeker: &Team, pool: &[TeamId]) -> Option<(usize, bool)> {
    if let Some(idx) = pool.iter().position(|c| !seeker.has_played(*c)) {
        return Some((idx, false));
    }
    pool.iter()
        .position(|c| seeker.can_swap_sides_against(*c))
        .map(|idx| (idx, true))
}
