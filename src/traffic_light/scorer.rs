//! Composite profile score
//!
//! Five independent components, each capped at its maximum. Any missing fact
//! deserializes to a default that contributes nothing, so a score can always be
//! computed.

use super::status::{StatusThresholds, TrafficLightStatus};
use crate::certificate::{CertificateKind, CertificateRecord};
use serde::{Deserialize, Serialize};

pub const IDENTITY_MAX: u8 = 20;
pub const LANGUAGE_MAX: u8 = 25;
pub const CERTIFICATE_MAX: u8 = 30;
pub const COMPLETENESS_MAX: u8 = 15;
pub const CONSISTENCY_MAX: u8 = 10;
pub const MAX_TOTAL: u8 = 100;

/// Consistency starts here and loses points per mismatched certificate
const CONSISTENCY_BASELINE: u8 = 8;
const MISMATCH_PENALTY: u8 = 2;
const MAX_MISMATCH_PENALTY: u8 = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LanguageClaim {
    pub language: String,
    pub is_verified: bool,
    /// e.g. "certificate", "native", "interview"
    pub verification_method: Option<String>,
}

/// What the scorer needs to know about one certificate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CertificateFacts {
    #[serde(rename = "type")]
    pub kind: CertificateKind,
    pub is_accredited: bool,
    pub authenticity_score: u8,
    pub holder_name: Option<String>,
}

impl From<&CertificateRecord> for CertificateFacts {
    fn from(record: &CertificateRecord) -> Self {
        Self {
            kind: record.kind,
            is_accredited: record.is_accredited,
            authenticity_score: record.authenticity_score,
            holder_name: record.holder_name.clone(),
        }
    }
}

/// Everything known about an applicant profile, supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProfileFacts {
    pub id_extraction_confidence: Option<f32>,
    pub email_verified: bool,
    /// Hours between sign-up and email verification
    pub email_verification_hours: Option<f64>,
    pub languages: Vec<LanguageClaim>,
    pub certificates: Vec<CertificateFacts>,
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub profile_picture_url: Option<String>,
    pub video_intro_url: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl ProfileFacts {
    pub fn has_profile_picture(&self) -> bool {
        present(&self.profile_picture_url)
    }

    pub fn has_video_intro(&self) -> bool {
        present(&self.video_intro_url)
    }

    fn required_fields(&self) -> [&Option<String>; 5] {
        [
            &self.first_name,
            &self.surname,
            &self.email,
            &self.phone,
            &self.country,
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub identity: u8,
    pub language: u8,
    pub certificate: u8,
    pub completeness: u8,
    pub consistency: u8,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        let sum = self.identity as u32
            + self.language as u32
            + self.certificate as u32
            + self.completeness as u32
            + self.consistency as u32;
        sum.min(MAX_TOTAL as u32) as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficLightScore {
    pub breakdown: ScoreBreakdown,
    pub total: u8,
    pub status: TrafficLightStatus,
}

#[derive(Debug, Clone, Default)]
pub struct TrafficLightScorer {
    thresholds: StatusThresholds,
}

impl TrafficLightScorer {
    pub fn new(thresholds: StatusThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &StatusThresholds {
        &self.thresholds
    }

    pub fn score(&self, facts: &ProfileFacts) -> TrafficLightScore {
        let breakdown = ScoreBreakdown {
            identity: identity_points(facts),
            language: language_points(facts),
            certificate: certificate_points(facts),
            completeness: completeness_points(facts),
            consistency: consistency_points(facts),
        };
        let total = breakdown.total();
        let status = self.thresholds.status(total);

        tracing::info!("Traffic light score {} ({:?}): {:?}", total, status, breakdown);

        TrafficLightScore {
            breakdown,
            total,
            status,
        }
    }
}

/// `part / whole` of `points`, rounded half up and capped at `points`
fn scaled(part: f64, whole: f64, points: u8) -> u8 {
    if whole <= 0.0 {
        return 0;
    }
    ((part * points as f64 / whole).round().max(0.0) as u8).min(points)
}

pub fn identity_points(facts: &ProfileFacts) -> u8 {
    let confidence = facts.id_extraction_confidence.unwrap_or(0.0);
    let id_points = if confidence >= 0.95 {
        15
    } else if confidence >= 0.80 {
        10
    } else if confidence >= 0.60 {
        5
    } else {
        0
    };

    let email_points = match (facts.email_verified, facts.email_verification_hours) {
        (false, _) => 0,
        // Unknown timing counts as immediate verification
        (true, None) => 5,
        (true, Some(hours)) if hours <= 24.0 => 5,
        (true, Some(hours)) if hours <= 72.0 => 3,
        (true, Some(_)) => 1,
    };

    (id_points + email_points).min(IDENTITY_MAX)
}

pub fn language_points(facts: &ProfileFacts) -> u8 {
    let total = facts.languages.len();
    if total == 0 {
        return 0;
    }
    let verified: Vec<&LanguageClaim> = facts.languages.iter().filter(|l| l.is_verified).collect();
    let ratio_points = scaled(verified.len() as f64, total as f64, 15);

    let german_certificate = verified.iter().any(|claim| {
        claim.language.trim().eq_ignore_ascii_case("german")
            && claim
                .verification_method
                .as_deref()
                .is_some_and(|method| method.eq_ignore_ascii_case("certificate"))
    });
    let bonus = if german_certificate { 10 } else { 0 };

    (ratio_points + bonus).min(LANGUAGE_MAX)
}

pub fn certificate_points(facts: &ProfileFacts) -> u8 {
    let certificates = &facts.certificates;
    if certificates.is_empty() {
        return 0;
    }
    let count = certificates.len() as f64;

    let accredited = certificates.iter().filter(|c| c.is_accredited).count() as f64;
    let authenticity_sum: f64 = certificates.iter().map(|c| c.authenticity_score as f64).sum();
    let relevant = certificates.iter().filter(|c| c.kind.is_relevant()).count() as f64;

    // Average authenticity over 100, kept as one fraction to avoid float drift
    let points = scaled(accredited, count, 10)
        + scaled(authenticity_sum, count * 100.0, 10)
        + scaled(relevant, count, 10);
    points.min(CERTIFICATE_MAX)
}

pub fn completeness_points(facts: &ProfileFacts) -> u8 {
    let fields = facts.required_fields();
    let filled = fields.iter().filter(|field| present(field)).count();
    let mut points = scaled(filled as f64, fields.len() as f64, 8);

    if facts.has_profile_picture() {
        points += 4;
    }
    if facts.has_video_intro() {
        points += 3;
    }
    points.min(COMPLETENESS_MAX)
}

/// Only the applicant's first name is compared with certificate holder names;
/// surnames are not checked.
pub fn consistency_points(facts: &ProfileFacts) -> u8 {
    let first_name = facts
        .first_name
        .as_deref()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty());

    let mismatches = facts
        .certificates
        .iter()
        .filter_map(|c| c.holder_name.as_deref())
        .filter(|holder| !holder.trim().is_empty())
        .filter(|holder| match &first_name {
            Some(first) => !holder.to_lowercase().contains(first.as_str()),
            None => true,
        })
        .count();

    let penalty = (mismatches.min(u8::MAX as usize) as u8)
        .saturating_mul(MISMATCH_PENALTY)
        .min(MAX_MISMATCH_PENALTY);
    CONSISTENCY_BASELINE.saturating_sub(penalty).min(CONSISTENCY_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn certificate(kind: CertificateKind, accredited: bool, score: u8, holder: &str) -> CertificateFacts {
        CertificateFacts {
            kind,
            is_accredited: accredited,
            authenticity_score: score,
            holder_name: Some(holder.to_string()),
        }
    }

    fn language(name: &str, verified: bool, method: &str) -> LanguageClaim {
        LanguageClaim {
            language: name.to_string(),
            is_verified: verified,
            verification_method: Some(method.to_string()),
        }
    }

    fn complete_profile() -> ProfileFacts {
        ProfileFacts {
            id_extraction_confidence: Some(0.92),
            email_verified: true,
            email_verification_hours: Some(12.0),
            languages: vec![
                language("Oshiwambo", true, "native"),
                language("English", true, "native"),
                language("Afrikaans", true, "native"),
            ],
            certificates: vec![
                certificate(CertificateKind::Academic, true, 95, "Maria Shikongo"),
                certificate(CertificateKind::Academic, true, 95, "Maria N. Shikongo"),
                certificate(CertificateKind::Professional, true, 95, "MARIA SHIKONGO"),
            ],
            first_name: Some("Maria".into()),
            surname: Some("Shikongo".into()),
            email: Some("maria@example.com".into()),
            phone: Some("+264 81 000 0000".into()),
            country: Some("Namibia".into()),
            profile_picture_url: Some("/uploads/maria.jpg".into()),
            video_intro_url: Some("/uploads/maria.mp4".into()),
        }
    }

    #[test]
    fn test_complete_profile_scenario() {
        let score = TrafficLightScorer::default().score(&complete_profile());
        assert_eq!(
            score.breakdown,
            ScoreBreakdown {
                identity: 15,
                language: 15,
                certificate: 30,
                completeness: 15,
                consistency: 8,
            }
        );
        assert_eq!(score.total, 83);
        assert_eq!(score.status, TrafficLightStatus::Green);
    }

    #[test]
    fn test_empty_profile_is_worst_case() {
        let score = TrafficLightScorer::default().score(&ProfileFacts::default());
        assert_eq!(score.breakdown.identity, 0);
        assert_eq!(score.breakdown.language, 0);
        assert_eq!(score.breakdown.certificate, 0);
        assert_eq!(score.breakdown.completeness, 0);
        // No certificates means nothing is inconsistent
        assert_eq!(score.breakdown.consistency, 8);
        assert_eq!(score.total, 8);
        assert_eq!(score.status, TrafficLightStatus::Red);
    }

    #[test]
    fn test_identity_tiers() {
        let tier = |confidence: f32| {
            identity_points(&ProfileFacts {
                id_extraction_confidence: Some(confidence),
                ..Default::default()
            })
        };
        assert_eq!(tier(0.95), 15);
        assert_eq!(tier(0.80), 10);
        assert_eq!(tier(0.60), 5);
        assert_eq!(tier(0.59), 0);
    }

    #[test]
    fn test_email_verification_bonus() {
        let email = |verified: bool, hours: Option<f64>| {
            identity_points(&ProfileFacts {
                email_verified: verified,
                email_verification_hours: hours,
                ..Default::default()
            })
        };
        assert_eq!(email(true, Some(24.0)), 5);
        assert_eq!(email(true, Some(72.0)), 3);
        assert_eq!(email(true, Some(73.0)), 1);
        assert_eq!(email(true, None), 5);
        assert_eq!(email(false, Some(1.0)), 0);
    }

    #[test]
    fn test_unknown_verification_time_counts_as_immediate() {
        let facts = ProfileFacts {
            email_verified: true,
            email_verification_hours: None,
            ..Default::default()
        };
        assert_eq!(identity_points(&facts), 5);
    }

    #[test]
    fn test_german_certificate_bonus() {
        let facts = ProfileFacts {
            languages: vec![
                language("German", true, "certificate"),
                language("English", false, "self-assessed"),
            ],
            ..Default::default()
        };
        // round(0.5 * 15) = 8, plus the bonus
        assert_eq!(language_points(&facts), 18);

        let native = ProfileFacts {
            languages: vec![language("German", true, "native")],
            ..Default::default()
        };
        assert_eq!(language_points(&native), 15);
    }

    #[test]
    fn test_certificate_ratios() {
        let facts = ProfileFacts {
            certificates: vec![
                certificate(CertificateKind::Academic, true, 90, "A"),
                certificate(CertificateKind::Reference, false, 40, "B"),
            ],
            ..Default::default()
        };
        // accredited 5 + authenticity round(6.5) = 7 + relevant 5
        assert_eq!(certificate_points(&facts), 17);
    }

    #[test]
    fn test_completeness_counts_blank_as_missing() {
        let facts = ProfileFacts {
            first_name: Some("Maria".into()),
            surname: Some("  ".into()),
            email: Some("maria@example.com".into()),
            profile_picture_url: Some("/p.jpg".into()),
            ..Default::default()
        };
        // round(2/5 * 8) = 3, plus 4 for the picture
        assert_eq!(completeness_points(&facts), 7);
    }

    #[test]
    fn test_consistency_checks_first_name_only() {
        let mut facts = complete_profile();
        facts.certificates = vec![
            certificate(CertificateKind::Academic, true, 90, "Maria Nghipondoka"),
            certificate(CertificateKind::Academic, true, 90, "John Shikongo"),
        ];
        // The surname differs on the first certificate but is never compared
        assert_eq!(consistency_points(&facts), 6);
    }

    #[test]
    fn test_consistency_penalty_is_capped() {
        let mut facts = complete_profile();
        facts.certificates = (0..5)
            .map(|_| certificate(CertificateKind::Academic, true, 90, "Someone Else"))
            .collect();
        assert_eq!(consistency_points(&facts), 4);
    }

    #[test]
    fn test_missing_first_name_counts_named_certificates_as_mismatches() {
        let mut facts = complete_profile();
        facts.first_name = None;
        assert_eq!(consistency_points(&facts), 4);
    }

    #[test]
    fn test_total_stays_in_range() {
        let mut facts = complete_profile();
        facts.id_extraction_confidence = Some(1.0);
        facts.languages.push(language("German", true, "certificate"));
        facts.certificates = vec![certificate(CertificateKind::Academic, true, 255, "Maria")];
        let score = TrafficLightScorer::default().score(&facts);
        assert!(score.total <= MAX_TOTAL);
        assert_eq!(score.breakdown.certificate, CERTIFICATE_MAX);
        assert_eq!(score.breakdown.language, LANGUAGE_MAX);
    }

    #[test]
    fn test_facts_deserialize_with_missing_fields() {
        let facts: ProfileFacts = serde_json::from_value(serde_json::json!({
            "idExtractionConfidence": 0.75,
            "certificates": [{"type": "academic", "isAccredited": true}]
        }))
        .unwrap();
        assert_eq!(facts.id_extraction_confidence, Some(0.75));
        assert_eq!(facts.certificates[0].kind, CertificateKind::Academic);
        assert_eq!(facts.certificates[0].authenticity_score, 0);
        assert!(!facts.email_verified);
    }

    #[test]
    fn test_custom_thresholds() {
        let scorer = TrafficLightScorer::new(StatusThresholds { green: 90, yellow: 80 });
        assert_eq!(scorer.score(&complete_profile()).status, TrafficLightStatus::Yellow);
    }
}
