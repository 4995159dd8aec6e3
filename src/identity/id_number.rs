//! Namibian ID number breakdown
//!
//! An ID number is 11 digits, `YYMMDD` birth date followed by a 4 digit block and
//! a check digit. Only the date is decoded. The digit block conventionally encodes
//! gender, which is deliberately left for the user to select.

use chrono::Datelike;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

pub const ID_NUMBER_LEN: usize = 11;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Century cutoff must be a two-digit year (0-99), got {0}")]
pub struct InvalidCenturyCutoff(pub u8);

/// Maps a two-digit birth year to a full year.
///
/// Years up to and including `cutoff` are read as 20xx, later ones as 19xx. The
/// default cutoff of 21 decodes anyone born in 2022 or later as born a century
/// earlier, so it stops being safe once such people reach working age (around
/// 2038). Raise the cutoff before then; it is a policy value, not a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenturyRule {
    cutoff: u8,
}

impl CenturyRule {
    pub const DEFAULT_CUTOFF: u8 = 21;

    pub fn new(cutoff: u8) -> Result<Self, InvalidCenturyCutoff> {
        if cutoff > 99 {
            return Err(InvalidCenturyCutoff(cutoff));
        }
        Ok(Self { cutoff })
    }

    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    pub fn full_year(&self, two_digit_year: u8) -> u16 {
        if two_digit_year <= self.cutoff {
            2000 + two_digit_year as u16
        } else {
            1900 + two_digit_year as u16
        }
    }
}

impl Default for CenturyRule {
    fn default() -> Self {
        Self {
            cutoff: Self::DEFAULT_CUTOFF,
        }
    }
}

/// Birth date as encoded in an ID number.
///
/// Days are only range-checked (1-31), never against the month's length, so
/// this is not a calendar date type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl BirthDate {
    /// The `YYMMDD` prefix this date was decoded from
    pub fn id_prefix(&self) -> String {
        format!("{:02}{:02}{:02}", self.year % 100, self.month, self.day)
    }
}

impl fmt::Display for BirthDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for BirthDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdNumberBreakdown {
    pub raw_digits: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<BirthDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_years: Option<i32>,
}

impl IdNumberBreakdown {
    /// Decode an 11-digit candidate. Anything else, or a month/day out of range,
    /// yields an invalid breakdown.
    pub fn decode(candidate: &str, rule: &CenturyRule, current_year: i32) -> Self {
        let invalid = || Self {
            raw_digits: candidate.to_string(),
            is_valid: false,
            date_of_birth: None,
            age_years: None,
        };

        if candidate.len() != ID_NUMBER_LEN || !candidate.bytes().all(|b| b.is_ascii_digit()) {
            return invalid();
        }

        let two_digits = |start: usize| -> u8 {
            candidate.as_bytes()[start..start + 2]
                .iter()
                .fold(0, |acc, b| acc * 10 + (b - b'0'))
        };
        let year = two_digits(0);
        let month = two_digits(2);
        let day = two_digits(4);

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return invalid();
        }

        let full_year = rule.full_year(year);
        Self {
            raw_digits: candidate.to_string(),
            is_valid: true,
            date_of_birth: Some(BirthDate {
                year: full_year,
                month,
                day,
            }),
            age_years: Some(current_year - full_year as i32),
        }
    }
}

/// `02111500305` -> `02 1115 0030 5`
pub fn format_id_number(digits: &str) -> String {
    if digits.len() != ID_NUMBER_LEN || !digits.is_ascii() {
        return digits.to_string();
    }
    format!(
        "{} {} {} {}",
        &digits[0..2],
        &digits[2..6],
        &digits[6..10],
        &digits[10..11]
    )
}

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}
