//! Field extraction from cleaned ID-card text
//!
//! Three independent extractions run in order: ID number, surname, first names.
//! Each one is an ordered rule table; see [`crate::patterns`].

use super::id_number::{current_year, format_id_number, CenturyRule, IdNumberBreakdown, ID_NUMBER_LEN};
use super::text::clean_text;
use crate::patterns::{self, PatternRule};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;

/// Keys of [`ExtractionResult::fields`]
pub mod fields {
    pub const ID_NUMBER: &str = "idNumber";
    pub const DATE_OF_BIRTH: &str = "dateOfBirth";
    pub const AGE: &str = "age";
    pub const SURNAME: &str = "surname";
    pub const NAMES: &str = "names";
    pub const FIRST_NAME: &str = "firstName";
    pub const COUNTRY: &str = "country";
}

/// Issuing country assumed for every ID document
pub const DEFAULT_COUNTRY: &str = "REPUBLIC OF NAMIBIA";

/// Card boilerplate that is never a surname
const BOILERPLATE_WORDS: &[&str] = &[
    "REPUBLIC", "NAMIBIA", "NATIONAL", "IDENTITY", "CARD", "FIRST", "NAME", "NAMES",
];

/// Words the first-name fallback skips: boilerplate plus the remaining labels
const FIRST_NAME_SKIP_WORDS: &[&str] = &[
    "REPUBLIC", "NAMIBIA", "NATIONAL", "IDENTITY", "CARD", "FIRST", "NAME", "NAMES", "SURNAME",
    "GIVEN", "FAMILY",
];

/// Tokens that start another field; a labelled value ends before them
const FIELD_LABELS: &[&str] = &[
    "SURNAME", "FAMILY", "FIRST", "GIVEN", "NAME", "NAMES", "SEX", "DATE", "BIRTH", "PLACE",
    "COUNTRY", "NATIONALITY", "ID", "NO", "SIGNATURE",
];

const TITLES: &[&str] = &["MR", "MS", "MRS", "DR", "SR"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(i64),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Number(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    pub fields: BTreeMap<String, FieldValue>,
    /// OCR confidence, passed through unchanged
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub requires_manual_entry: bool,
}

impl ExtractionResult {
    fn manual_entry(fields: BTreeMap<String, FieldValue>, confidence: f32, reason: &str) -> Self {
        Self {
            success: false,
            fields,
            confidence,
            error_reason: Some(reason.to_string()),
            requires_manual_entry: true,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_text)
    }

    /// The caller owns the manual-entry threshold
    pub fn is_low_confidence(&self, threshold: f32) -> bool {
        self.confidence < threshold
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GivenNames {
    pub names: String,
    pub first_name: String,
}

lazy_static! {
    static ref ID_NUMBER_RULES: Vec<PatternRule<String>> = vec![
        // "O21 1 15 OO3O 5": the usual OCR shape of the printed number
        PatternRule::new(
            "ocr-shape",
            r"\b[0-9O]{3}\s+[0-9O]\s+[0-9O]{2}\s+[0-9O]{4}\s+[0-9O]\b",
            digits_whole,
        ),
        PatternRule::new(
            "ocr-leading-zero",
            r"[O0]\d{2}\s*\d\s*\d{2}\s*[O0]\d{3}[O0]\s*\d",
            digits_whole,
        ),
        PatternRule::new(
            "labelled",
            r"NO\.?\s*(\d{2}\s*\d{4}\s*\d{4}\s*\d)",
            digits_group1,
        ),
        PatternRule::new("spaced", r"\d{2}\s*\d{4}\s*\d{4}\s*\d", digits_whole),
        PatternRule::new("contiguous", r"\d{11,}", digits_whole),
        // Any run of digit-like tokens, however OCR split them
        PatternRule::new("digit-run", r"\b[0-9O]+(?:[ \t]+[0-9O]+)*\b", digit_run),
    ];

    static ref SURNAME_RULES: Vec<PatternRule<String>> = vec![
        PatternRule::new("surname-label", r"SURNAME\s+([A-Z]+(?: +[A-Z]+)*)", labelled_surname),
        PatternRule::new("family-name-label", r"FAMILY NAME\s+([A-Z]+(?: +[A-Z]+)*)", labelled_surname),
        PatternRule::new("capital-word", r"\b[A-Z]{4,}\b", surname_word),
    ];

    // Values end at the next field label, not at the first long capital run,
    // so multi-part names like "MARIA ELENA" stay whole
    static ref FIRST_NAME_RULES: Vec<PatternRule<GivenNames>> = vec![
        PatternRule::new(
            "first-names-label",
            r"FIRST NAME(?:S\b|\(S\)|\b)[ \t]*\n?[ \t]*(?P<value>[A-Z][A-Z ]*)",
            labelled_names,
        ),
        PatternRule::new(
            "given-names-label",
            r"GIVEN NAME(?:S\b|\(S\)|\b)[ \t]*\n?[ \t]*(?P<value>[A-Z][A-Z ]*)",
            labelled_names,
        ),
        PatternRule::new(
            "names-label",
            r"(?:\b(?P<family>FAMILY)[ \t]+)?\bNAME(?:S\b|\(S\)|\b)[ \t]*\n?[ \t]*(?P<value>[A-Z][A-Z ]*)",
            bare_names_label,
        ),
    ];

    static ref CAPITAL_WORD: Regex = Regex::new(r"\b[A-Z]{3,}\b").unwrap();
}

fn to_digits(candidate: &str) -> String {
    candidate
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == 'O' { '0' } else { c })
        .collect()
}

fn digits_whole(caps: &Captures<'_>) -> Option<String> {
    caps.get(0).map(|m| to_digits(m.as_str()))
}

fn digits_group1(caps: &Captures<'_>) -> Option<String> {
    caps.get(1).map(|m| to_digits(m.as_str()))
}

fn digit_run(caps: &Captures<'_>) -> Option<String> {
    let run = caps.get(0)?.as_str();
    if !run.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = to_digits(run);
    (digits.len() >= ID_NUMBER_LEN).then_some(digits)
}

/// Tokens of a labelled value up to the next field label
fn value_tokens(value: &str) -> Vec<&str> {
    value
        .split_whitespace()
        .take_while(|token| !FIELD_LABELS.contains(token))
        .collect()
}

fn labelled_surname(caps: &Captures<'_>) -> Option<String> {
    let surname = value_tokens(caps.get(1)?.as_str()).join(" ");
    (surname.len() > 2).then_some(surname)
}

fn surname_word(caps: &Captures<'_>) -> Option<String> {
    let word = caps.get(0)?.as_str();
    (!BOILERPLATE_WORDS.contains(&word)).then(|| word.to_string())
}

fn labelled_names(caps: &Captures<'_>) -> Option<GivenNames> {
    let tokens = value_tokens(caps.name("value")?.as_str());
    let names = tokens.join(" ");
    if names.len() <= 2 {
        return None;
    }

    let parts: Vec<&str> = tokens.into_iter().filter(|part| part.len() > 1).collect();
    let first_name = parts
        .iter()
        .find(|part| !TITLES.contains(*part))
        .or_else(|| parts.first())?;

    Some(GivenNames {
        first_name: first_name.to_string(),
        names,
    })
}

/// A bare "NAME(S)" label, unless it is the tail of "FAMILY NAME"
fn bare_names_label(caps: &Captures<'_>) -> Option<GivenNames> {
    if caps.name("family").is_some() {
        return None;
    }
    labelled_names(caps)
}

pub fn extract_surname(clean: &str) -> Option<String> {
    let (rule, surname) = patterns::first_match(&SURNAME_RULES, clean)?;
    tracing::debug!("Surname matched by {} rule", rule);
    Some(surname)
}

pub fn extract_given_names(clean: &str) -> Option<GivenNames> {
    if let Some((rule, given)) = patterns::first_match(&FIRST_NAME_RULES, clean) {
        tracing::debug!("Names matched by {} rule", rule);
        return Some(given);
    }

    // The first capitalized word is taken to be the surname
    let word = CAPITAL_WORD
        .find_iter(clean)
        .map(|m| m.as_str())
        .filter(|word| !FIRST_NAME_SKIP_WORDS.contains(word))
        .nth(1)?;
    tracing::debug!("First name taken from second capitalized word");

    Some(GivenNames {
        names: word.to_string(),
        first_name: word.to_string(),
    })
}

/// Every 11-digit window of a digit string, left to right
fn windows(digits: &str) -> Vec<&str> {
    if digits.len() < ID_NUMBER_LEN || !digits.is_ascii() {
        return Vec::new();
    }
    (0..=digits.len() - ID_NUMBER_LEN)
        .map(|start| &digits[start..start + ID_NUMBER_LEN])
        .collect()
}

/// Parser for Namibian national ID cards
#[derive(Debug, Clone, Default)]
pub struct IdFieldParser {
    century_rule: CenturyRule,
    current_year: Option<i32>,
}

impl IdFieldParser {
    pub fn new(century_rule: CenturyRule) -> Self {
        Self {
            century_rule,
            current_year: None,
        }
    }

    /// Pin the year ages are computed against instead of reading the clock
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn century_rule(&self) -> &CenturyRule {
        &self.century_rule
    }

    pub fn parse(&self, raw_text: &str, confidence: f32) -> ExtractionResult {
        let clean = clean_text(raw_text);
        tracing::debug!("Cleaned ID text:\n{}", clean);

        let breakdown = self.extract_id_number(&clean);

        let mut extracted = BTreeMap::new();
        let mut put = |key: &str, value: FieldValue| {
            extracted.insert(key.to_string(), value);
        };

        if let Some(breakdown) = &breakdown {
            put(
                fields::ID_NUMBER,
                FieldValue::Text(format_id_number(&breakdown.raw_digits)),
            );
            if let Some(date_of_birth) = breakdown.date_of_birth {
                put(fields::DATE_OF_BIRTH, FieldValue::Text(date_of_birth.to_string()));
            }
            if let Some(age) = breakdown.age_years {
                put(fields::AGE, FieldValue::Number(age as i64));
            }
        }
        if let Some(surname) = extract_surname(&clean) {
            put(fields::SURNAME, FieldValue::Text(surname));
        }
        if let Some(given) = extract_given_names(&clean) {
            put(fields::NAMES, FieldValue::Text(given.names));
            put(fields::FIRST_NAME, FieldValue::Text(given.first_name));
        }
        put(fields::COUNTRY, FieldValue::Text(DEFAULT_COUNTRY.to_string()));

        if breakdown.is_none() {
            // Names found so far pre-fill the manual entry form
            tracing::warn!("No valid ID number found, manual entry required");
            return ExtractionResult::manual_entry(extracted, confidence, "No valid ID number found");
        }

        tracing::info!(
            "ID fields extracted: {} fields, confidence: {:.0}%",
            extracted.len(),
            confidence * 100.0
        );

        ExtractionResult {
            success: true,
            fields: extracted,
            confidence,
            error_reason: None,
            requires_manual_entry: false,
        }
    }

    /// First candidate, in rule order then document order, whose embedded date is valid
    pub fn extract_id_number(&self, clean: &str) -> Option<IdNumberBreakdown> {
        let year = self.current_year.unwrap_or_else(current_year);

        patterns::candidates(&ID_NUMBER_RULES, clean).find_map(|(rule, digits)| {
            let breakdown = windows(&digits)
                .into_iter()
                .map(|window| IdNumberBreakdown::decode(window, &self.century_rule, year))
                .find(|breakdown| breakdown.is_valid)?;
            tracing::debug!("ID number matched by {} rule", rule);
            Some(breakdown)
        })
    }
}
