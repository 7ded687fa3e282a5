use rand::{rngs::ThreadRng, seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::TeamId,
    teams::{Side, Team},
};

/// The single-elimination bracket seeder
pub mod bracket;
/// The score-group + floating Swiss pairer
pub mod swiss;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
/// A struct for communicating a round's pairing decisions. Pairs are in
/// emission order and already side-assigned; the caller creates the match
/// records and commits the bye.
pub struct RoundPairings {
    /// The paired teams as `(aff, neg)`, in emission order
    pub pairs: Vec<(TeamId, TeamId)>,
    /// The team awarded a bye, when the field is odd
    pub bye: Option<TeamId>,
}

impl RoundPairings {
    /// Creates empty pairings
    pub fn new() -> Self {
        RoundPairings {
            pairs: Vec::new(),
            bye: None,
        }
    }

    /// Calculates the number of teams placed (byes included)
    pub fn len(&self) -> usize {
        self.pairs.len() * 2 + usize::from(self.bye.is_some())
    }

    /// Calculates if no team was placed
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The randomness a pairing invocation draws on: the round-1/2 shuffle and
/// the side-preference coin flip. The live manager passes [`LiveRng`]
/// (platform entropy); the simulator passes its seeded generator. The two
/// sources are never mixed.
pub trait PairingRng {
    /// Draws a uniform value in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Fisher-Yates shuffles the slice using this source
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_f64() * (i as f64 + 1.0)) as usize;
            items.swap(i, j.min(i));
        }
    }

    /// Draws a fair coin flip
    fn coin_flip(&mut self) -> bool {
        self.next_f64() < 0.5
    }
}

#[derive(Debug, Default)]
/// The live manager's randomness source, backed by the platform generator
pub struct LiveRng {
    rng: ThreadRng,
}

impl LiveRng {
    /// Creates a new live source
    pub fn new() -> Self {
        Self::default()
    }
}

impl PairingRng for LiveRng {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Orders a pair onto sides, returning `(aff, neg)`.
///
/// When the pair is a side-swap rematch, the unused side is forced for
/// `first` if exactly one side remains unused. Otherwise both teams state a
/// preference and the stronger one takes the Affirmative, coin-flipping
/// exact ties.
pub(crate) fn determine_sides<R: PairingRng + ?Sized>(
    first: &Team,
    second: &Team,
    swappable: bool,
    rng: &mut R,
) -> (TeamId, TeamId) {
    if swappable {
        if let Some(sides) = first.side_history.get(&second.id) {
            let aff_unused = !sides.contains(&Side::Aff);
            let neg_unused = !sides.contains(&Side::Neg);
            if aff_unused != neg_unused {
                return if aff_unused {
                    (first.id, second.id)
                } else {
                    (second.id, first.id)
                };
            }
        }
    }
    let first_pref = first.side_preference();
    let second_pref = second.side_preference();
    if first_pref > second_pref {
        (first.id, second.id)
    } else if second_pref > first_pref {
        (second.id, first.id)
    } else if rng.coin_flip() {
        (first.id, second.id)
    } else {
        (second.id, first.id)
    }
}
