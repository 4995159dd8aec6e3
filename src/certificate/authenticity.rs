//! Authenticity scoring of parsed certificates
//!
//! A pure function of the record and its source text. Points at full marks:
//!
//! | signal                       | points |
//! |------------------------------|--------|
//! | accredited institution       | 30 (15 if present but unlisted) |
//! | valid issue date             | 20     |
//! | holder name                  | 15     |
//! | grade                        | 10     |
//! | subject                      | 10     |
//! | certificate structure        | 15 (8 for two of four signals) |

use super::parser::CertificateRecord;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

pub const MAX_SCORE: u8 = 100;

const ACCREDITED_INSTITUTION_POINTS: u8 = 30;
const UNLISTED_INSTITUTION_POINTS: u8 = 15;
const DATE_POINTS: u8 = 20;
const HOLDER_NAME_POINTS: u8 = 15;
const GRADE_POINTS: u8 = 10;
const SUBJECT_POINTS: u8 = 10;
const FULL_STRUCTURE_POINTS: u8 = 15;
const PARTIAL_STRUCTURE_POINTS: u8 = 8;

lazy_static! {
    static ref VALID_DATE: Regex = Regex::new(
        r"\d{1,2}[-/]\d{1,2}[-/]\d{4}|\d{4}[-/]\d{1,2}[-/]\d{1,2}|[A-Za-z]+\s+\d{1,2},?\s+\d{4}"
    )
    .unwrap();

    static ref STRUCTURAL_SIGNALS: Vec<Regex> = vec![
        Regex::new(r"(?i)certificate|diploma|degree").unwrap(),
        Regex::new(r"(?i)university|institute|college").unwrap(),
        Regex::new(r"(?i)awarded|presented|conferred").unwrap(),
        Regex::new(r"\d{4}").unwrap(),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticityReport {
    pub score: u8,
    pub date_format_valid: bool,
    pub grade_present: bool,
    pub certificate_structure_valid: bool,
    /// How many of the four structural signals the text contains
    pub structure_signals: u8,
}

impl AuthenticityReport {
    /// Write the score and the flags it derived into the record
    pub fn apply(&self, record: &mut CertificateRecord) {
        record.authenticity_score = self.score;
        record.verification_flags.date_format_valid = self.date_format_valid;
        record.verification_flags.grade_present = self.grade_present;
        record.verification_flags.certificate_structure_valid = self.certificate_structure_valid;
    }
}

pub fn score(record: &CertificateRecord, raw_text: &str) -> AuthenticityReport {
    let mut score: u32 = 0;

    if record.verification_flags.institution_found && record.is_accredited {
        score += ACCREDITED_INSTITUTION_POINTS as u32;
    } else if record.institution.as_deref().is_some_and(|i| !i.is_empty()) {
        score += UNLISTED_INSTITUTION_POINTS as u32;
    }

    let date_format_valid = record
        .date_issued
        .as_deref()
        .is_some_and(|date| VALID_DATE.is_match(date));
    if date_format_valid {
        score += DATE_POINTS as u32;
    }

    if record.holder_name.as_deref().is_some_and(|name| name.len() > 3) {
        score += HOLDER_NAME_POINTS as u32;
    }

    let grade_present = record.grade.as_deref().is_some_and(|g| !g.is_empty());
    if grade_present {
        score += GRADE_POINTS as u32;
    }

    if record.subject.as_deref().is_some_and(|s| !s.is_empty()) {
        score += SUBJECT_POINTS as u32;
    }

    let structure_signals = STRUCTURAL_SIGNALS
        .iter()
        .filter(|signal| signal.is_match(raw_text))
        .count() as u8;
    let certificate_structure_valid = structure_signals >= 3;
    if certificate_structure_valid {
        score += FULL_STRUCTURE_POINTS as u32;
    } else if structure_signals == 2 {
        score += PARTIAL_STRUCTURE_POINTS as u32;
    }

    AuthenticityReport {
        score: score.min(MAX_SCORE as u32) as u8,
        date_format_valid,
        grade_present,
        certificate_structure_valid,
        structure_signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::CertificateParser;

    const SCENARIO: &str = "UNIVERSITY OF CAPE TOWN\n\
                            This is to certify that John Doe\n\
                            was awarded the degree with First Class honours\n\
                            on 15/06/2020";

    #[test]
    fn test_scenario_certificate_scores_90() {
        let record = CertificateParser::default().analyze(SCENARIO);
        assert_eq!(record.institution.as_deref(), Some("University of Cape Town"));
        assert_eq!(record.date_issued.as_deref(), Some("15/06/2020"));
        assert_eq!(record.holder_name.as_deref(), Some("John Doe"));
        assert_eq!(record.grade.as_deref(), Some("First Class"));
        assert_eq!(record.subject, None);
        assert_eq!(record.authenticity_score, 90);
        assert!(record.verification_flags.certificate_structure_valid);
        assert!(record.verification_flags.date_format_valid);
        assert!(record.verification_flags.grade_present);
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let report = score(&CertificateRecord::default(), "");
        assert_eq!(report.score, 0);
        assert_eq!(report.structure_signals, 0);
    }

    #[test]
    fn test_adding_signals_never_decreases_score() {
        let text = "Degree awarded by the University in 2020";
        let mut record = CertificateRecord::default();
        let mut previous = score(&record, text).score;

        let steps: [fn(&mut CertificateRecord); 6] = [
            |r| r.institution = Some("Windhoek College".into()),
            |r| {
                r.institution = Some("Rhodes University".into());
                r.is_accredited = true;
                r.verification_flags.institution_found = true;
            },
            |r| r.date_issued = Some("2020-06-15".into()),
            |r| r.holder_name = Some("Jane Doe".into()),
            |r| r.grade = Some("Distinction".into()),
            |r| r.subject = Some("Accounting".into()),
        ];

        for step in steps {
            step(&mut record);
            let current = score(&record, text).score;
            assert!(current >= previous, "{} dropped to {}", previous, current);
            previous = current;
        }
        assert_eq!(previous, MAX_SCORE);
    }

    #[test]
    fn test_structure_partial_credit() {
        let report = score(&CertificateRecord::default(), "Certificate 2021");
        assert_eq!(report.structure_signals, 2);
        assert_eq!(report.score, 8);
        assert!(!report.certificate_structure_valid);

        let report = score(&CertificateRecord::default(), "Certificate");
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_short_holder_name_ignored() {
        let record = CertificateRecord {
            holder_name: Some("Al".into()),
            ..Default::default()
        };
        assert_eq!(score(&record, "").score, 0);
    }

    #[test]
    fn test_accredited_without_found_flag_gets_unlisted_points() {
        let record = CertificateRecord {
            institution: Some("Rhodes University".into()),
            is_accredited: true,
            ..Default::default()
        };
        assert_eq!(score(&record, "").score, UNLISTED_INSTITUTION_POINTS);
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let parser = CertificateParser::default();
        let first = parser.analyze(SCENARIO);
        let second = parser.analyze(SCENARIO);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
