//! Certificate classification and field extraction

use super::accreditation::AccreditedInstitutions;
use super::authenticity;
use crate::patterns::{self, group1, whole, PatternRule};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateKind {
    Academic,
    Professional,
    Reference,
    #[default]
    Unknown,
}

impl CertificateKind {
    /// Academic and professional certificates count as relevant qualifications
    pub fn is_relevant(&self) -> bool {
        matches!(self, CertificateKind::Academic | CertificateKind::Professional)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationFlags {
    pub institution_found: bool,
    pub date_format_valid: bool,
    pub grade_present: bool,
    pub certificate_structure_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    #[serde(rename = "type")]
    pub kind: CertificateKind,
    /// Human-readable label, e.g. "Bachelor's Degree"
    pub classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_issued: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
    pub is_accredited: bool,
    pub authenticity_score: u8,
    pub verification_flags: VerificationFlags,
}

/// A classification rule: any keyword present in the lowercased text
struct KindRule {
    keywords: Regex,
    kind: CertificateKind,
    label: &'static str,
}

impl KindRule {
    fn new(keywords: &str, kind: CertificateKind, label: &'static str) -> Self {
        Self {
            keywords: Regex::new(keywords).unwrap(),
            kind,
            label,
        }
    }
}

lazy_static! {
    static ref QUALIFICATION_GATE: Regex = Regex::new(r"certificate|diploma|degree").unwrap();

    // Checked in order once the text names a qualification at all. Short
    // abbreviations need word boundaries or "ba" would match "basic".
    static ref QUALIFICATION_KINDS: Vec<KindRule> = vec![
        KindRule::new(r"bachelor|\b(?:ba|bsc|bcom)\b", CertificateKind::Academic, "Bachelor's Degree"),
        KindRule::new(r"master|\b(?:msc|ma|mcom|mba)\b", CertificateKind::Academic, "Master's Degree"),
        KindRule::new(r"phd|doctorate|doctoral", CertificateKind::Academic, "Doctorate"),
        KindRule::new(r"diploma", CertificateKind::Professional, "Diploma"),
        KindRule::new(r"", CertificateKind::Professional, "Certificate"),
    ];

    static ref REFERENCE_LETTER: Regex = Regex::new(r"reference|recommendation|letter").unwrap();

    static ref INSTITUTION_RULES: Vec<PatternRule<String>> = vec![
        PatternRule::new(
            "institution-of",
            r"(?i)(?:university of|institute|college|school|academy)[ \t]+[a-z &]+",
            whole,
        ),
        PatternRule::new(
            "named-institution",
            r"(?i)[a-z &]+[ \t]+(?:university|institute|college)",
            whole,
        ),
        PatternRule::new(
            "language-body",
            r"(?i)goethe[ \t-]?institut|testdaf|telc|cambridge|british council",
            whole,
        ),
    ];

    static ref DATE_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"\d{1,2}[-/]\d{1,2}[-/]\d{4}").unwrap(),
        Regex::new(r"\d{4}[-/]\d{1,2}[-/]\d{1,2}").unwrap(),
        Regex::new(
            r"(?i)(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}"
        )
        .unwrap(),
    ];

    static ref SUBJECT_RULES: Vec<PatternRule<String>> = vec![
        PatternRule::new(
            "field-before-achievement",
            r"(?i)\b(?:in|of)[ \t]+([a-z ]+?)[ \t]+(?:has|successfully)\b",
            group1,
        ),
        PatternRule::new("qualification-in", r"(?i)qualification in[ \t]+([a-z ]+)", group1),
        PatternRule::new(
            "degree-of",
            r"(?i)(?:bachelor|master|diploma)(?:'s)?[ \t]+(?:of|in)[ \t]+([a-z ]+)",
            group1,
        ),
    ];

    static ref HOLDER_NAME_RULES: Vec<PatternRule<String>> = vec![
        PatternRule::new(
            "certifies-that",
            r"(?i:this is to certify that|certifies that|awarded to)\s+((?:[A-Z][a-z]+|[A-Z]{2,})(?:[ \t]+(?:[A-Z][a-z]+|[A-Z]{2,}))+)",
            holder_name,
        ),
        PatternRule::new(
            "title",
            r"\b(?:Mr|Mrs|Ms|Miss|MR|MRS|MS|MISS)\.?[ \t]+([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)+)",
            group1,
        ),
        PatternRule::new(
            "labelled",
            r"(?i:name|student|candidate):[ \t]*([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)+)",
            group1,
        ),
        // All-caps name followed by a lowercase verb; all-caps boilerplate
        // ("THIS IS TO CERTIFY") never matches because the verb is lowercase
        PatternRule::new(
            "capitalized-before-verb",
            r"\b([A-Z][A-Z \t]{3,}?)[ \t]+(?:has|successfully|is|hereby)\b",
            group1,
        ),
        PatternRule::new(
            "presented-to",
            r"(?i:presented to)\s+((?:[A-Z][a-z]+|[A-Z]{2,})(?:[ \t]+(?:[A-Z][a-z]+|[A-Z]{2,}))+)",
            holder_name,
        ),
    ];

    static ref GRADE_RULES: Vec<PatternRule<String>> = vec![
        PatternRule::new(
            "classification",
            r"(?i)\b(?:first class|second class|third class|distinction|pass)\b",
            whole,
        ),
        PatternRule::new(
            "with-class",
            r"(?i)\bwith[ \t]+[a-z ]+?[ \t]+(?:class|distinction)\b",
            whole,
        ),
    ];
}

/// Classifies certificates and pulls out their fields
#[derive(Debug, Clone, Default)]
pub struct CertificateParser {
    accredited: AccreditedInstitutions,
}

impl CertificateParser {
    pub fn new(accredited: AccreditedInstitutions) -> Self {
        Self { accredited }
    }

    pub fn accredited(&self) -> &AccreditedInstitutions {
        &self.accredited
    }

    /// Extract a record without scoring it
    pub fn parse(&self, raw_text: &str) -> CertificateRecord {
        let lower = raw_text.to_lowercase();
        let (kind, classification) = classify(&lower);

        let mut record = CertificateRecord {
            kind,
            classification: classification.to_string(),
            subject: first(&SUBJECT_RULES, raw_text),
            date_issued: extract_issue_date(raw_text),
            grade: first(&GRADE_RULES, raw_text),
            holder_name: first(&HOLDER_NAME_RULES, raw_text),
            ..Default::default()
        };

        let found = first(&INSTITUTION_RULES, raw_text);
        let haystacks: Vec<&str> = std::iter::once(raw_text).chain(found.as_deref()).collect();
        match self.accredited.find_in(&haystacks) {
            Some(name) => {
                record.institution = Some(name.to_string());
                record.is_accredited = true;
                record.verification_flags.institution_found = true;
            }
            None => record.institution = found,
        }

        tracing::debug!(
            "Certificate classified as {:?} ({}), institution: {:?}, accredited: {}",
            record.kind,
            record.classification,
            record.institution,
            record.is_accredited
        );

        record
    }

    /// Parse and score in one pass
    pub fn analyze(&self, raw_text: &str) -> CertificateRecord {
        let mut record = self.parse(raw_text);
        let report = authenticity::score(&record, raw_text);
        report.apply(&mut record);

        tracing::info!(
            "Certificate analyzed: {}, authenticity score {}",
            record.classification,
            record.authenticity_score
        );

        record
    }
}

fn classify(lower: &str) -> (CertificateKind, &'static str) {
    if QUALIFICATION_GATE.is_match(lower) {
        if let Some(rule) = QUALIFICATION_KINDS.iter().find(|rule| rule.keywords.is_match(lower)) {
            return (rule.kind, rule.label);
        }
    }
    if REFERENCE_LETTER.is_match(lower) {
        return (CertificateKind::Reference, "Reference Letter");
    }
    (CertificateKind::Unknown, "Unknown")
}

/// Words that end an all-caps name run ("JOHN DOE HAS COMPLETED")
const NAME_STOP_WORDS: &[&str] = &[
    "HAS", "HAVE", "IS", "WAS", "HEREBY", "SUCCESSFULLY", "COMPLETED", "FOR", "IN", "OF", "ON",
    "WITH",
];

/// Name tokens up to the first stop word; at least two must remain
fn holder_name(caps: &Captures<'_>) -> Option<String> {
    let tokens: Vec<&str> = caps
        .get(1)?
        .as_str()
        .split_whitespace()
        .take_while(|token| !NAME_STOP_WORDS.contains(&token.to_uppercase().as_str()))
        .collect();
    (tokens.len() >= 2).then(|| tokens.join(" "))
}

fn first(rules: &[PatternRule<String>], text: &str) -> Option<String> {
    patterns::first_match(rules, text).map(|(_, value)| value)
}

/// Last date of the first date format present; issue dates follow enrollment dates
fn extract_issue_date(text: &str) -> Option<String> {
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.find_iter(text).last())
        .map(|m| m.as_str().to_string())
}
