//! # KPM Code Format
//!
//! A KPM code is `<yy><diplomaYear><semester><sequence>`:
//! - `yy`: last two digits of the reporting year
//! - `diplomaYear`: one digit, 1..=3
//! - `semester`: one digit, 1..=6
//! - `sequence`: two digits, 01..=99
//!
//! Only the trailing sequence is scarce. The prefix is derived from the
//! record's current context every time a code is written.

use crate::primitives::Sequence;

/// Minimum length of a code whose sequence can be trusted.
pub const MIN_CODE_LEN: usize = 6;

/// Build the code prefix for a record context.
#[must_use]
pub fn build_prefix(year: i32, diploma_year: u8, semester: &str) -> String {
    format!("{:02}{}{}", year.rem_euclid(100), diploma_year, semester)
}

/// Compose a full code from its context and sequence.
#[must_use]
pub fn compose(year: i32, diploma_year: u8, semester: &str, sequence: Sequence) -> String {
    format!("{}{}", build_prefix(year, diploma_year, semester), sequence)
}

/// Extract the sequence from a (possibly stale) code.
///
/// Returns `None` when the trimmed code is shorter than [`MIN_CODE_LEN`],
/// when its last two characters are not ASCII digits, or when they fall
/// outside [1, 99]. The prefix is not checked.
#[must_use]
pub fn parse_sequence(code: &str) -> Option<Sequence> {
    let code = code.trim();
    if code.chars().count() < MIN_CODE_LEN {
        return None;
    }

    let tail = code.get(code.len().checked_sub(2)?..)?;
    if !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    tail.parse::<u8>().ok().and_then(Sequence::new)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(value: u8) -> Option<Sequence> {
        Sequence::new(value)
    }

    #[test]
    fn prefix_uses_last_two_year_digits() {
        assert_eq!(build_prefix(2024, 1, "1"), "2411");
        assert_eq!(build_prefix(2031, 3, "5"), "3135");
        assert_eq!(build_prefix(2005, 2, "3"), "0523");
    }

    #[test]
    fn compose_pads_sequence() {
        let code = Sequence::new(7).map(|s| compose(2024, 1, "1", s));
        assert_eq!(code.as_deref(), Some("241107"));
    }

    #[test]
    fn parse_accepts_well_formed_codes() {
        assert_eq!(parse_sequence("241107"), seq(7));
        assert_eq!(parse_sequence("  252399 "), seq(99));
        // Prefix is irrelevant to parsing.
        assert_eq!(parse_sequence("XXXX42"), seq(42));
    }

    #[test]
    fn parse_rejects_short_codes() {
        assert_eq!(parse_sequence(""), None);
        assert_eq!(parse_sequence("24117"), None);
    }

    #[test]
    fn parse_rejects_out_of_range_and_non_digits() {
        assert_eq!(parse_sequence("241100"), None);
        assert_eq!(parse_sequence("24110a"), None);
        assert_eq!(parse_sequence("2411+5"), None);
        assert_eq!(parse_sequence("2411-1"), None);
    }

    #[test]
    fn parse_handles_multibyte_prefix() {
        assert_eq!(parse_sequence("ééééé12"), seq(12));
        assert_eq!(parse_sequence("ééé1é"), None);
    }
}
