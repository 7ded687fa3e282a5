//! The core pairing and state engine for Swiss-system debate tournaments.
//!
//! The engine pairs preliminary rounds with a score-group + floating Swiss
//! algorithm under Affirmative/Negative side constraints, seeds a standard
//! single-elimination bracket for out-rounds, recomputes all derived team
//! statistics from the ordered match log, and mirrors its state into two
//! textual projections that are cross-checked on every mutation. The same
//! pairing core drives a seeded Monte-Carlo simulator for probabilistic
//! queries over tournament outcomes.
//!
//! Everything here is synchronous and in-memory. Persistence, file I/O, and
//! any user interface are the caller's concern; the engine exposes typed
//! operations, serde-serializable state, and plain-text log formats.

pub mod consistency;
pub mod error;
pub mod identifiers;
pub mod judges;
pub mod matches;
pub mod pairings;
pub mod scoring;
pub mod sim;
pub mod teams;
pub mod tournament;

#[allow(non_camel_case_types)]
/// The rational type used for speaker-point arithmetic
pub type r64 = num_rational::Rational64;
