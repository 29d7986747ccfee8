//! # Roster Intake
//!
//! Turns a "save players" submission into player records ready for
//! allocation.
//!
//! Intake is permissive: bad diploma years, semesters and statuses are
//! normalized, and incomplete entries are skipped rather than rejected. The
//! submission fails only when nothing usable is left.

use crate::error::{KpmError, Result};
use crate::primitives::Status;
use crate::record::{normalize_diploma_year, normalize_semester, CandidateRecord};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

// =============================================================================
// SUBMISSION PAYLOAD
// =============================================================================

/// A scalar that clients send either as a JSON number or as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Loose {
    Int(i64),
    Text(String),
    /// Any other JSON value; treated as absent.
    Other(IgnoredAny),
}

impl Loose {
    /// Numeric value, parsing trimmed strings.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }

    /// Trimmed text value; numbers are rendered in decimal.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Int(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.trim().to_string()),
            Self::Other(_) => None,
        }
    }
}

/// Full roster submission: `{ "data": [{ "year": .., "players": [..] }] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterSubmission {
    pub data: Vec<YearGroup>,
}

/// Players submitted for one year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearGroup {
    #[serde(default)]
    pub year: Option<Loose>,
    #[serde(default)]
    pub players: Option<Vec<PlayerInput>>,
}

/// One player as submitted by the client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    #[serde(default)]
    pub id: Option<Loose>,
    #[serde(default)]
    pub player_id: Option<Loose>,
    #[serde(default)]
    pub master_id: Option<Loose>,
    #[serde(default)]
    pub name: Option<Loose>,
    #[serde(default)]
    pub branch: Option<Loose>,
    #[serde(default)]
    pub diploma_year: Option<Loose>,
    #[serde(default)]
    pub semester: Option<Loose>,
    #[serde(default)]
    pub status: Option<Loose>,
    #[serde(default)]
    pub kpm_no: Option<Loose>,
}

/// A bare candidate record, as written by hand for a dry-run allocation.
///
/// Accepts the same loose scalars as [`PlayerInput`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CandidateInput {
    #[serde(alias = "rowKey")]
    pub row_key: Option<Loose>,
    pub identity: Option<Loose>,
    pub year: Option<Loose>,
    #[serde(alias = "diplomaYear")]
    pub diploma_year: Option<Loose>,
    pub semester: Option<Loose>,
    pub status: Option<Loose>,
    pub code: Option<Loose>,
}

impl From<&CandidateInput> for CandidateRecord {
    fn from(input: &CandidateInput) -> Self {
        let year = input
            .year
            .as_ref()
            .and_then(Loose::as_i64)
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or_default();

        Self {
            row_key: text_of(input.row_key.as_ref()).unwrap_or_default(),
            identity: text_of(input.identity.as_ref()),
            year,
            diploma_year: normalize_diploma_year(
                input.diploma_year.as_ref().and_then(Loose::as_i64).unwrap_or(1),
            ),
            semester: normalize_semester(&text_of(input.semester.as_ref()).unwrap_or_default()),
            status: text_of(input.status.as_ref())
                .map(|raw| Status::parse_lenient(&raw))
                .unwrap_or_default(),
            code: text_of(input.code.as_ref()).unwrap_or_default(),
        }
    }
}

// =============================================================================
// PLAYER RECORD
// =============================================================================

/// A stored roster entry: the allocation fields plus descriptive data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub branch: String,
    pub first_participation_year: i32,
    pub base_diploma_year: u8,
    /// Allocation view of this player; `row_key` is the player id and
    /// `identity` the master id.
    pub candidate: CandidateRecord,
}

impl PlayerRecord {
    /// Player id.
    #[must_use]
    pub fn player_id(&self) -> &str {
        &self.candidate.row_key
    }

    /// Master id, empty when the player has none.
    #[must_use]
    pub fn master_id(&self) -> &str {
        self.candidate.identity.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Convert a submission into player records, in submission order.
///
/// Year groups without a usable non-zero year, and players without both a
/// name and a branch, are skipped. Generated player ids use the entry's
/// 1-based position across the whole submission, skipped entries included.
/// Fails with [`KpmError::EmptySubmission`] when no player survives.
pub fn parse_submission(submission: &RosterSubmission) -> Result<Vec<PlayerRecord>> {
    let mut players = Vec::new();
    let mut position = 0;

    for group in &submission.data {
        let year = group_year(group);
        let inputs = group.players.as_deref().unwrap_or_default();

        for input in inputs {
            position += 1;
            let Some(year) = year else {
                continue;
            };
            if let Some(player) = parse_player(input, year, position) {
                players.push(player);
            }
        }
    }

    if players.is_empty() {
        return Err(KpmError::EmptySubmission);
    }
    Ok(players)
}

fn group_year(group: &YearGroup) -> Option<i32> {
    let year = group.year.as_ref()?.as_i64()?;
    if year == 0 {
        return None;
    }
    i32::try_from(year).ok()
}

fn parse_player(input: &PlayerInput, year: i32, position: usize) -> Option<PlayerRecord> {
    let name = text_of(input.name.as_ref())?;
    let branch = text_of(input.branch.as_ref())?;

    let diploma_year = normalize_diploma_year(
        input
            .diploma_year
            .as_ref()
            .and_then(Loose::as_i64)
            .unwrap_or(1),
    );
    let semester = normalize_semester(
        &input
            .semester
            .as_ref()
            .and_then(Loose::as_text)
            .unwrap_or_default(),
    );
    let status = text_of(input.status.as_ref())
        .map(|raw| Status::parse_lenient(&raw))
        .unwrap_or_default();

    let player_id = [&input.id, &input.player_id]
        .into_iter()
        .flatten()
        .filter_map(Loose::as_text)
        .find(|id| !id.is_empty())
        .unwrap_or_else(|| format!("{year}-{position}"));
    let identity = input
        .master_id
        .as_ref()
        .and_then(Loose::as_text)
        .filter(|id| !id.is_empty());

    Some(PlayerRecord {
        name,
        branch,
        first_participation_year: year,
        base_diploma_year: diploma_year,
        candidate: CandidateRecord {
            row_key: player_id,
            identity,
            year,
            diploma_year,
            semester,
            status,
            code: text_of(input.kpm_no.as_ref()).unwrap_or_default(),
        },
    })
}

/// Trimmed, non-empty text of a loose field.
fn text_of(value: Option<&Loose>) -> Option<String> {
    value.and_then(Loose::as_text).filter(|v| !v.is_empty())
}

// =============================================================================
// TESTS
// =============================================================================
