use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::TournamentError;

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
/// The model turning a pair of true ranks into a win probability
pub enum WinModel {
    /// Logistic win probability from synthetic Elo ratings
    /// (`2000 - 50 * rank`)
    #[default]
    Elo,
    /// A linear spread clamped to `[0, 1]`
    Linear,
    /// The better rank always wins
    Deterministic,
}

impl WinModel {
    /// The probability that the team of true rank `rank_a` (1 is best)
    /// defeats the team of true rank `rank_b`
    pub fn p_win(&self, rank_a: u32, rank_b: u32) -> f64 {
        match self {
            WinModel::Elo => {
                let rating_a = 2000.0 - 50.0 * rank_a as f64;
                let rating_b = 2000.0 - 50.0 * rank_b as f64;
                1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
            }
            WinModel::Linear => {
                let spread = (rank_b as f64 - rank_a as f64)
                    / (2.0 * rank_a.max(rank_b) as f64);
                (0.5 + spread).clamp(0.0, 1.0)
            }
            WinModel::Deterministic => {
                if rank_a < rank_b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl FromStr for WinModel {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elo" => Ok(WinModel::Elo),
            "linear" => Ok(WinModel::Linear),
            "deterministic" => Ok(WinModel::Deterministic),
            _ => Err(TournamentError::UnknownWinModel),
        }
    }
}

impl Display for WinModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WinModel::Elo => "elo",
                WinModel::Linear => "linear",
                WinModel::Deterministic => "deterministic",
            }
        )
    }
}
