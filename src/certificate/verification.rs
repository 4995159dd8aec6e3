//! Cross-checks of a certificate against the applicant

use super::parser::CertificateRecord;
use serde::Serialize;

/// Bodies whose certificates attest German proficiency
const GERMAN_LANGUAGE_BODIES: &[&str] = &[
    "goethe institut",
    "testdaf institute",
    "telc",
    "ösd",
    "deutsche sprachprüfung",
    "zertifikat deutsch",
];

/// CEFR levels and German-specific exams, matched case-sensitively
const GERMAN_LEVEL_MARKERS: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2", "DSH", "TestDaF"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NameMatch {
    pub matches: bool,
    pub confidence: f32,
}

impl NameMatch {
    const NONE: NameMatch = NameMatch {
        matches: false,
        confidence: 0.0,
    };

    fn found(confidence: f32) -> Self {
        Self {
            matches: true,
            confidence,
        }
    }
}

/// Compare a certificate holder name with the applicant's names.
///
/// Both names contained: 0.95. First initial ("j.") plus surname: 0.8. Either
/// name alone: 0.7. Any missing input is no match.
pub fn verify_name_match(certificate_name: &str, first_name: &str, surname: &str) -> NameMatch {
    let certificate_name = certificate_name.trim().to_lowercase();
    let first_name = first_name.trim().to_lowercase();
    let surname = surname.trim().to_lowercase();
    if certificate_name.is_empty() || first_name.is_empty() || surname.is_empty() {
        return NameMatch::NONE;
    }

    let first_found = certificate_name.contains(&first_name);
    let surname_found = certificate_name.contains(&surname);
    let initial_found = first_name
        .chars()
        .next()
        .is_some_and(|initial| certificate_name.contains(&format!("{}.", initial)));

    match (first_found, surname_found) {
        (true, true) => NameMatch::found(0.95),
        (false, true) if initial_found => NameMatch::found(0.8),
        (true, false) | (false, true) => NameMatch::found(0.7),
        (false, false) => NameMatch::NONE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GermanVerification {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Decide whether a certificate proves German proficiency
pub fn verify_german_certificate(record: &CertificateRecord) -> GermanVerification {
    let institution = record.institution.as_deref().unwrap_or_default().to_lowercase();
    let subject = record.subject.as_deref().unwrap_or_default();
    let subject_lower = subject.to_lowercase();

    let is_german = GERMAN_LANGUAGE_BODIES
        .iter()
        .any(|body| institution.contains(body))
        || subject_lower.contains("german")
        || subject_lower.contains("deutsch");

    if !is_german {
        return GermanVerification {
            is_valid: false,
            level: None,
            institution: None,
            reason: Some(
                "Certificate is not from a recognized German language institution".to_string(),
            ),
        };
    }

    let grade = record.grade.as_deref().unwrap_or_default();
    let has_level = GERMAN_LEVEL_MARKERS
        .iter()
        .any(|level| subject.contains(level) || grade.contains(level));
    let level = if has_level {
        "Verified German Proficiency"
    } else {
        "Basic German"
    };

    GermanVerification {
        is_valid: record.is_accredited,
        level: Some(level.to_string()),
        institution: record.institution.clone(),
        reason: (!record.is_accredited)
            .then(|| "Issuing institution is not accredited".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_names_match() {
        let result = verify_name_match("Maria Ndapewa Shikongo", "MARIA", "Shikongo");
        assert_eq!(result, NameMatch::found(0.95));
    }

    #[test]
    fn test_initial_and_surname() {
        let result = verify_name_match("M. Shikongo", "Maria", "Shikongo");
        assert_eq!(result, NameMatch::found(0.8));
    }

    #[test]
    fn test_single_name() {
        assert_eq!(
            verify_name_match("Maria Nghipondoka", "Maria", "Shikongo"),
            NameMatch::found(0.7)
        );
        assert_eq!(
            verify_name_match("Peter Shikongo", "Maria", "Shikongo"),
            NameMatch::found(0.7)
        );
    }

    #[test]
    fn test_no_match_or_missing_input() {
        assert_eq!(verify_name_match("John Doe", "Maria", "Shikongo"), NameMatch::NONE);
        assert_eq!(verify_name_match("", "Maria", "Shikongo"), NameMatch::NONE);
        assert_eq!(verify_name_match("Maria Shikongo", "Maria", " "), NameMatch::NONE);
    }

    #[test]
    fn test_accredited_german_body_with_level() {
        let record = CertificateRecord {
            institution: Some("TELC".into()),
            grade: Some("B2 pass".into()),
            is_accredited: true,
            ..Default::default()
        };
        let result = verify_german_certificate(&record);
        assert!(result.is_valid);
        assert_eq!(result.level.as_deref(), Some("Verified German Proficiency"));
        assert_eq!(result.institution.as_deref(), Some("TELC"));
    }

    #[test]
    fn test_german_subject_from_unlisted_body() {
        let record = CertificateRecord {
            institution: Some("Windhoek Language School".into()),
            subject: Some("German for Beginners".into()),
            ..Default::default()
        };
        let result = verify_german_certificate(&record);
        assert!(!result.is_valid);
        assert_eq!(result.level.as_deref(), Some("Basic German"));
        assert!(result.reason.is_some());
    }

    #[test]
    fn test_non_german_certificate() {
        let record = CertificateRecord {
            institution: Some("British Council".into()),
            subject: Some("English".into()),
            is_accredited: true,
            ..Default::default()
        };
        let result = verify_german_certificate(&record);
        assert!(!result.is_valid);
        assert_eq!(result.level, None);
    }
}
