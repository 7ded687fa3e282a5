use tracing::debug;

use crate::{
    identifiers::TeamId,
    pairings::{determine_sides, PairingRng, RoundPairings},
    teams::TeamRegistry,
};

/// Emits the standard single-elimination pairings for a bracket of
/// `bracket_size` seeds, as 1-based `(high, low)` seed pairs in match order.
///
/// The list is built by recursive halving: seeds split into a top and a
/// bottom half on a modulo-4 pattern, both halves recurse, and the bottom
/// half's sequence is reversed before concatenation. Seed 1 opens the round,
/// seed 2 closes it, every first-round pair sums to `bracket_size + 1`, and
/// top seeds can only meet in later rounds.
pub fn seed_pairs(bracket_size: u32) -> Vec<(u32, u32)> {
    debug_assert!(bracket_size >= 2 && bracket_size.is_power_of_two());
    let seeds: Vec<u32> = (1..=bracket_size).collect();
    halve(&seeds)
}

fn halve(seeds: &[u32]) -> Vec<(u32, u32)> {
    if seeds.len() == 2 {
        return vec![(seeds[0], seeds[1])];
    }
    let mut top = Vec::with_capacity(seeds.len() / 2);
    let mut bottom = Vec::with_capacity(seeds.len() / 2);
    for (i, seed) in seeds.iter().enumerate() {
        match i % 4 {
            0 | 3 => top.push(*seed),
            _ => bottom.push(*seed),
        }
    }
    let mut digest = halve(&top);
    let mut bottom_pairs = halve(&bottom);
    bottom_pairs.reverse();
    digest.extend(bottom_pairs);
    digest
}

/// Pairs the first elimination round from the breaking teams.
///
/// `seeded` holds the breaking teams in seed order (`seeded[0]` is seed 1);
/// the caller has already stamped their `break_seed` fields. Sides follow
/// the usual preference logic; everyone in a well-formed bracket is a fresh
/// opponent.
pub fn pair_break_round<R: PairingRng>(
    teams: &TeamRegistry,
    seeded: &[TeamId],
    rng: &mut R,
) -> RoundPairings {
    let mut digest = RoundPairings::new();
    for (high, low) in seed_pairs(seeded.len() as u32) {
        let first = &teams.teams[seeded[(high - 1) as usize].0 as usize];
        let second = &teams.teams[seeded[(low - 1) as usize].0 as usize];
        digest
            .pairs
            .push(determine_sides(first, second, false, rng));
    }
    debug!(pairs = digest.pairs.len(), "seeded break round");
    digest
}

/// Pairs a later elimination round from the previous round's winners.
///
/// `winners` must be in the previous round's bracket (emission) order; the
/// ordering already encodes the bracket path, so adjacent winners meet and
/// nothing is re-sorted.
pub fn pair_winners_round<R: PairingRng>(
    teams: &TeamRegistry,
    winners: &[TeamId],
    rng: &mut R,
) -> RoundPairings {
    let mut digest = RoundPairings::new();
    for chunk in winners.chunks_exact(2) {
        let first = &teams.teams[chunk[0].0 as usize];
        let second = &teams.teams[chunk[1].0 as usize];
        digest
            .pairs
            .push(determine_sides(first, second, false, rng));
    }
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairings::test_rng::ScriptedRng;

    #[test]
    fn bracket_of_four() {
        assert_eq!(seed_pairs(4), vec![(1, 4), (2, 3)]);
    }

    #[test]
    fn bracket_of_eight() {
        assert_eq!(
            seed_pairs(8),
            vec![(1, 8), (4, 5), (3, 6), (2, 7)],
            "The round-of-8 emission order is fixed"
        );
    }

    #[test]
    fn bracket_invariants_hold_up_to_thirty_two() {
        for exp in 1..=5u32 {
            let size = 1 << exp;
            let pairs = seed_pairs(size);
            assert_eq!(pairs.len() as u32, size / 2);
            assert!(
                pairs[0].0 == 1,
                "Seed 1 must open the round of {}",
                size
            );
            assert!(
                pairs[pairs.len() - 1].0 == 2 || pairs[pairs.len() - 1].1 == 2,
                "Seed 2 must close the round of {}",
                size
            );
            for (high, low) in &pairs {
                assert_eq!(
                    high + low,
                    size + 1,
                    "First-round seed sums must equal {}",
                    size + 1
                );
            }
        }
    }

    #[test]
    fn winners_pair_adjacent() {
        let mut teams = TeamRegistry::new();
        for i in 0..4 {
            teams.register_team(
                format!("Team {}", i + 1),
                "Test".into(),
                [format!("T{} A", i + 1), format!("T{} B", i + 1)],
            );
        }
        let winners = vec![TeamId(2), TeamId(0), TeamId(3), TeamId(1)];
        let mut rng = ScriptedRng::new(vec![0.9]);
        let pairings = pair_winners_round(&teams, &winners, &mut rng);
        assert_eq!(pairings.pairs.len(), 2);
        let flat: Vec<TeamId> = pairings
            .pairs
            .iter()
            .flat_map(|(a, n)| [*a, *n])
            .collect();
        assert!(flat[..2].contains(&TeamId(2)) && flat[..2].contains(&TeamId(0)));
        assert!(flat[2..].contains(&TeamId(3)) && flat[2..].contains(&TeamId(1)));
    }
}
