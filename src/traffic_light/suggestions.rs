//! Improvement suggestions derived from a score breakdown

use super::scorer::{ProfileFacts, ScoreBreakdown};
use serde::Serialize;

const IDENTITY_TARGET: u8 = 15;
const EMAIL_URGENT_BELOW: u8 = 10;
const LANGUAGE_TARGET: u8 = 20;
const CERTIFICATE_TARGET: u8 = 25;
const MEDIA_TARGET: u8 = 12;
const CONSISTENCY_TARGET: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Identity,
    Language,
    Certificate,
    Completeness,
    Consistency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub category: Category,
    pub priority: Priority,
    pub message: &'static str,
    pub action: &'static str,
}

impl Suggestion {
    fn new(category: Category, priority: Priority, message: &'static str, action: &'static str) -> Self {
        Self {
            category,
            priority,
            message,
            action,
        }
    }
}

/// Suggestions ordered high, medium, low; ties keep the component order
pub fn suggest(breakdown: &ScoreBreakdown, facts: &ProfileFacts) -> Vec<Suggestion> {
    use Category::*;
    use Priority::*;

    let mut suggestions = Vec::new();

    if breakdown.identity < IDENTITY_TARGET {
        if breakdown.identity < EMAIL_URGENT_BELOW {
            suggestions.push(Suggestion::new(
                Identity,
                High,
                "Verify your email address immediately",
                "Check your email and click the verification link",
            ));
        }
        suggestions.push(Suggestion::new(
            Identity,
            Medium,
            "Upload a clearer ID document",
            "Ensure your ID is well-lit and all text is readable",
        ));
    }

    if breakdown.language < LANGUAGE_TARGET {
        suggestions.push(Suggestion::new(
            Language,
            High,
            "Upload certificates for claimed languages",
            "Provide official language certificates from recognized institutions",
        ));
    }

    if breakdown.certificate < CERTIFICATE_TARGET {
        suggestions.push(Suggestion::new(
            Certificate,
            High,
            "Upload certificates from accredited institutions",
            "Ensure your certificates are from recognized, accredited institutions",
        ));
    }

    if breakdown.completeness < MEDIA_TARGET {
        if !facts.has_profile_picture() {
            suggestions.push(Suggestion::new(
                Completeness,
                Medium,
                "Upload a professional profile picture",
                "Add a clear, professional headshot photo",
            ));
        }
        if !facts.has_video_intro() {
            suggestions.push(Suggestion::new(
                Completeness,
                Medium,
                "Record a video introduction",
                "Create a short video introducing yourself professionally",
            ));
        }
    }

    if breakdown.consistency < CONSISTENCY_TARGET {
        suggestions.push(Suggestion::new(
            Consistency,
            High,
            "Ensure all information is consistent",
            "Check that names and details match across all documents",
        ));
    }

    // Stable, so equal priorities keep their order
    suggestions.sort_by(|a, b| b.priority.cmp(&a.priority));
    suggestions
}
