use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// The broad classes of failure an operation can produce. Callers use this
/// to decide how to react: validation, configuration, and numeric errors are
/// the caller's fault and fully recoverable; consistency errors indicate a
/// broken invariant and are not recoverable by retry.
pub enum ErrorCategory {
    /// The caller asked for something the current state does not permit
    Validation,
    /// The redundant state representations disagree
    Consistency,
    /// The tournament configuration cannot support the requested operation
    Config,
    /// A numeric input was outside its permitted range
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// All the errors that can occur when applying a tournament operation
pub enum TournamentError {
    /// The specified team couldn't be found
    TeamLookup,
    /// The specified match couldn't be found
    MatchLookup,
    /// The specified judge couldn't be found
    JudgeLookup,
    /// The requested round isn't the next unpaired round
    RoundOutOfSequence,
    /// The requested round is beyond the tournament's final round
    PastFinalRound,
    /// An earlier round still has unreported matches
    PriorRoundIncomplete,
    /// The match already has a result and no force semantic was requested
    DuplicateResult,
    /// The outcome token wasn't recognized
    IllegalOutcome,
    /// The team roster doesn't match the configured team count
    RosterSizeMismatch,
    /// A match id was reused during reinitialization
    MatchIdCollision,
    /// A judge with that name (case-insensitively) already exists
    JudgeNameTaken,
    /// The judge still has matches assigned and can't be removed
    JudgeHasAssignments,
    /// A pairing or result log line couldn't be parsed
    MalformedLog,
    /// The speaker-point adjustment token wasn't recognized
    UnknownAdjustMethod,
    /// A win/loss history string was malformed or impossible for the
    /// simulated tournament shape
    InvalidHistory,
    /// The pairing log disagrees with the match records
    PairingLogDrift,
    /// The result log disagrees with the match records
    ResultLogDrift,
    /// A judge's assignment ledger disagrees with the match records
    JudgeLedgerDrift,
    /// A stored tiebreaker value disagrees with its recomputation
    TiebreakDrift,
    /// A restored snapshot's derived state disagrees with its match log
    SnapshotDrift,
    /// Fewer teams than the elimination bracket requires
    BreakSizeExceedsField,
    /// The win-model token wasn't recognized
    UnknownWinModel,
    /// A speaker point was outside the 0 to 30 range
    InvalidSpeakerPoints,
}

impl TournamentError {
    /// Returns the broad class this error belongs to
    pub fn category(&self) -> ErrorCategory {
        use TournamentError::*;
        match self {
            TeamLookup | MatchLookup | JudgeLookup | RoundOutOfSequence | PastFinalRound
            | PriorRoundIncomplete | DuplicateResult | IllegalOutcome | RosterSizeMismatch
            | MatchIdCollision | JudgeNameTaken | JudgeHasAssignments | MalformedLog
            | UnknownAdjustMethod | InvalidHistory => ErrorCategory::Validation,
            PairingLogDrift | ResultLogDrift | JudgeLedgerDrift | TiebreakDrift
            | SnapshotDrift => ErrorCategory::Consistency,
            BreakSizeExceedsField | UnknownWinModel => ErrorCategory::Config,
            InvalidSpeakerPoints => ErrorCategory::Numeric,
        }
    }
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TournamentError::*;
        let s = match &self {
            TeamLookup => "TeamLookup",
            MatchLookup => "MatchLookup",
            JudgeLookup => "JudgeLookup",
            RoundOutOfSequence => "RoundOutOfSequence",
            PastFinalRound => "PastFinalRound",
            PriorRoundIncomplete => "PriorRoundIncomplete",
            DuplicateResult => "DuplicateResult",
            IllegalOutcome => "IllegalOutcome",
            RosterSizeMismatch => "RosterSizeMismatch",
            MatchIdCollision => "MatchIdCollision",
            JudgeNameTaken => "JudgeNameTaken",
            JudgeHasAssignments => "JudgeHasAssignments",
            MalformedLog => "MalformedLog",
            UnknownAdjustMethod => "UnknownAdjustMethod",
            InvalidHistory => "InvalidHistory",
            PairingLogDrift => "PairingLogDrift",
            ResultLogDrift => "ResultLogDrift",
            JudgeLedgerDrift => "JudgeLedgerDrift",
            TiebreakDrift => "TiebreakDrift",
            SnapshotDrift => "SnapshotDrift",
            BreakSizeExceedsField => "BreakSizeExceedsField",
            UnknownWinModel => "UnknownWinModel",
            InvalidSpeakerPoints => "InvalidSpeakerPoints",
        };
        write!(f, "{}", s)
    }
}

impl std::error::Error for TournamentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_partition_the_taxonomy() {
        assert_eq!(
            TournamentError::MatchLookup.category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            TournamentError::ResultLogDrift.category(),
            ErrorCategory::Consistency
        );
        assert_eq!(
            TournamentError::BreakSizeExceedsField.category(),
            ErrorCategory::Config
        );
        assert_eq!(
            TournamentError::InvalidSpeakerPoints.category(),
            ErrorCategory::Numeric
        );
    }
}
