//! The redundant textual projections of tournament state and their
//! validator.
//!
//! The match records are authoritative. The pairing log is regenerated from
//! them on every mutation; the result log is append-only with corrected
//! lines commented out in place for audit. After every mutation both texts
//! are re-parsed and compared field-for-field against the records; any
//! disagreement is a fatal consistency error, not a recoverable condition.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::{
    error::TournamentError,
    identifiers::{JudgeId, MatchId, TeamId},
    judges::JudgeRegistry,
    matches::{Match, MatchRegistry, SpeakerPoints},
    r64,
    teams::{Side, TeamRegistry},
};

/// The pairing log's header comment
pub const PAIRING_HEADER: &str = "# Format: Round MatchID AffID NegID";
/// The result log's header comment
pub const RESULT_HEADER: &str =
    "# Format: Round MatchID AffID NegID Outcome JudgeID [Aff1 Aff2 Neg1 Neg2]";

/// One parsed pairing-log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingLine {
    /// The 1-based round number
    pub round_num: u32,
    /// The match's id
    pub match_id: MatchId,
    /// The Affirmative team's id
    pub aff_id: TeamId,
    /// The Negative team's id
    pub neg_id: TeamId,
}

/// One parsed result-log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLine {
    /// The 1-based round number
    pub round_num: u32,
    /// The match's id
    pub match_id: MatchId,
    /// The Affirmative team's id
    pub aff_id: TeamId,
    /// The Negative team's id
    pub neg_id: TeamId,
    /// The reported winner
    pub outcome: Side,
    /// The assigned judge, `-1` in text when absent
    pub judge_id: Option<JudgeId>,
    /// The ballot, when the line carries the four point tokens
    pub speaker_points: Option<SpeakerPoints>,
}

/// Regenerates the pairing log from the match records
pub fn render_pairing_log(matches: &MatchRegistry) -> String {
    let mut digest = String::from(PAIRING_HEADER);
    digest.push('\n');
    for m in &matches.matches {
        let _ = writeln!(
            digest,
            "{} {} {} {}",
            m.round_num, m.id, m.aff_id, m.neg_id
        );
    }
    digest
}

/// An empty result log: just the header
pub fn empty_result_log() -> String {
    let mut digest = String::from(RESULT_HEADER);
    digest.push('\n');
    digest
}

/// Renders the result-log line for a reported match, or `None` when the
/// match has no result
pub fn result_line(m: &Match) -> Option<String> {
    let outcome = m.result?;
    let judge = match m.judge_id {
        Some(id) => id.0 as i64,
        None => -1,
    };
    let mut digest = format!(
        "{} {} {} {} {} {}",
        m.round_num,
        m.id,
        m.aff_id,
        m.neg_id,
        outcome.token(),
        judge
    );
    if let Some(points) = &m.speaker_points {
        for pt in &points.0 {
            digest.push(' ');
            match pt {
                Some(v) => digest.push_str(&format_points(*v)),
                None => digest.push_str("null"),
            }
        }
    }
    Some(digest)
}

/// Appends a reported match's line to the result log
pub fn append_result_line(text: &mut String, m: &Match) {
    if let Some(line) = result_line(m) {
        text.push_str(&line);
        text.push('\n');
    }
}

/// Comments out the active result-log line(s) for a match, keeping them in
/// place for audit with the given note (e.g. `Corrected`)
pub fn retire_result_lines(text: &mut String, match_id: MatchId, note: &str) {
    let mut digest = String::with_capacity(text.len());
    for line in text.lines() {
        let trimmed = line.trim();
        let retire = !trimmed.is_empty()
            && !trimmed.starts_with('#')
            && trimmed.split_whitespace().nth(1) == Some(&match_id.to_string());
        if retire {
            let _ = writeln!(digest, "# {}  # {}", line, note);
        } else {
            digest.push_str(line);
            digest.push('\n');
        }
    }
    *text = digest;
}

/// Parses a pairing log, ignoring comments and blank lines
pub fn parse_pairing_log(text: &str) -> Result<Vec<PairingLine>, TournamentError> {
    let mut digest = Vec::new();
    for line in active_lines(text) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(TournamentError::MalformedLog);
        }
        digest.push(PairingLine {
            round_num: parse_u32(tokens[0])?,
            match_id: MatchId(parse_u64(tokens[1])?),
            aff_id: TeamId(parse_u32(tokens[2])?),
            neg_id: TeamId(parse_u32(tokens[3])?),
        });
    }
    Ok(digest)
}

/// Parses a result log, ignoring comments and blank lines
pub fn parse_result_log(text: &str) -> Result<Vec<ResultLine>, TournamentError> {
    let mut digest = Vec::new();
    for line in active_lines(text) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 6 && tokens.len() != 10 {
            return Err(TournamentError::MalformedLog);
        }
        let outcome =
            Side::from_token(tokens[4]).ok_or(TournamentError::IllegalOutcome)?;
        let judge_id = match tokens[5] {
            "-1" => None,
            tok => Some(JudgeId(parse_u32(tok)?)),
        };
        let speaker_points = if tokens.len() == 10 {
            let mut points = [None; 4];
            for (slot, tok) in tokens[6..].iter().enumerate() {
                points[slot] = match *tok {
                    "null" => None,
                    tok => Some(parse_points(tok)?),
                };
            }
            Some(SpeakerPoints::new(points)?)
        } else {
            None
        };
        digest.push(ResultLine {
            round_num: parse_u32(tokens[0])?,
            match_id: MatchId(parse_u64(tokens[1])?),
            aff_id: TeamId(parse_u32(tokens[2])?),
            neg_id: TeamId(parse_u32(tokens[3])?),
            outcome,
            judge_id,
            speaker_points,
        });
    }
    Ok(digest)
}

/// Checks both textual projections and the judge ledger against the match
/// records and recomputes the Buchholz column. Total: every mismatch is an
/// error, never a repair.
pub fn validate(
    teams: &TeamRegistry,
    matches: &MatchRegistry,
    judges: &JudgeRegistry,
    pairing_text: &str,
    result_text: &str,
) -> Result<(), TournamentError> {
    let pairing_lines =
        parse_pairing_log(pairing_text).map_err(|_| TournamentError::PairingLogDrift)?;
    if pairing_lines.len() != matches.len() {
        return Err(TournamentError::PairingLogDrift);
    }
    for (line, m) in pairing_lines.iter().zip(matches.matches.iter()) {
        if line.round_num != m.round_num
            || line.match_id != m.id
            || line.aff_id != m.aff_id
            || line.neg_id != m.neg_id
        {
            return Err(TournamentError::PairingLogDrift);
        }
    }

    let result_lines =
        parse_result_log(result_text).map_err(|_| TournamentError::ResultLogDrift)?;
    if result_lines.len() != matches.reported_count() {
        return Err(TournamentError::ResultLogDrift);
    }
    let mut seen: BTreeSet<MatchId> = BTreeSet::new();
    for line in &result_lines {
        if !seen.insert(line.match_id) {
            return Err(TournamentError::ResultLogDrift);
        }
        let m = matches
            .get_match(line.match_id)
            .map_err(|_| TournamentError::ResultLogDrift)?;
        if m.round_num != line.round_num
            || m.aff_id != line.aff_id
            || m.neg_id != line.neg_id
            || m.result != Some(line.outcome)
            || m.judge_id != line.judge_id
            || m.speaker_points != line.speaker_points
        {
            return Err(TournamentError::ResultLogDrift);
        }
    }

    for m in &matches.matches {
        if let Some(judge_id) = m.judge_id {
            let judge = judges
                .get_judge(judge_id)
                .map_err(|_| TournamentError::JudgeLedgerDrift)?;
            if !judge.matches_judged.contains(&m.id) {
                return Err(TournamentError::JudgeLedgerDrift);
            }
        }
    }
    for judge in judges.judges.values() {
        for match_id in &judge.matches_judged {
            let m = matches
                .get_match(*match_id)
                .map_err(|_| TournamentError::JudgeLedgerDrift)?;
            if m.judge_id != Some(judge.id) {
                return Err(TournamentError::JudgeLedgerDrift);
            }
        }
    }

    let scores: Vec<u32> = teams.iter().map(|t| t.score).collect();
    for team in teams.iter() {
        let expected: u32 = team
            .opponents
            .iter()
            .flatten()
            .map(|opp| scores.get(opp.0 as usize).copied().unwrap_or(0))
            .sum();
        if team.buchholz != expected {
            return Err(TournamentError::TiebreakDrift);
        }
    }
    Ok(())
}

fn active_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

fn parse_u32(tok: &str) -> Result<u32, TournamentError> {
    tok.parse().map_err(|_| TournamentError::MalformedLog)
}

fn parse_u64(tok: &str) -> Result<u64, TournamentError> {
    tok.parse().map_err(|_| TournamentError::MalformedLog)
}

/// Renders a speaker-point value as a decimal with the fewest places that
/// keep it exact (at least one, so whole points read `26.0`)
pub(crate) fn format_points(value: r64) -> String {
    let mut scale: i64 = 10;
    let mut places: usize = 1;
    while places < 6 && !(value * r64::from_integer(scale)).is_integer() {
        scale *= 10;
        places += 1;
    }
    let scaled = (value * r64::from_integer(scale)).to_integer();
    format!("{}.{:0places$}", scaled / scale, scaled % scale, places = places)
}

/// Parses a decimal speaker-point token exactly (no float round-trip)
pub(crate) fn parse_points(tok: &str) -> Result<r64, TournamentError> {
    let (whole, frac) = match tok.split_once('.') {
        Some((w, f)) => (w, f),
        None => (tok, ""),
    };
    if whole.is_empty()
        || frac.len() > 9
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !frac.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(TournamentError::MalformedLog);
    }
    let whole: i64 = whole.parse().map_err(|_| TournamentError::MalformedLog)?;
    if frac.is_empty() {
        return Ok(r64::from_integer(whole));
    }
    let denom = 10i64.pow(frac.len() as u32);
    let frac: i64 = frac.parse().map_err(|_| TournamentError::MalformedLog)?;
    Ok(r64::new(whole * denom + frac, denom))
}
