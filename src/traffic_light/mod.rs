//! Traffic Light profile scoring
//!
//! [`TrafficLightScorer::score`] turns [`ProfileFacts`] into a breakdown, total
//! and status. [`evaluate`] adds the presentation text and the suggestion list
//! that the display layer shows next to it.

mod scorer;
mod status;
mod suggestions;

pub use scorer::{
    certificate_points, completeness_points, consistency_points, identity_points,
    language_points, CertificateFacts, LanguageClaim, ProfileFacts, ScoreBreakdown,
    TrafficLightScore, TrafficLightScorer, CERTIFICATE_MAX, COMPLETENESS_MAX, CONSISTENCY_MAX,
    IDENTITY_MAX, LANGUAGE_MAX, MAX_TOTAL,
};
pub use status::{StatusPresentation, StatusThresholds, TrafficLightStatus};
pub use suggestions::{suggest, Category, Priority, Suggestion};

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficLightReport {
    #[serde(flatten)]
    pub score: TrafficLightScore,
    pub max_score: u8,
    #[serde(flatten)]
    pub presentation: StatusPresentation,
    pub suggestions: Vec<Suggestion>,
}

/// Score a profile and attach everything needed to display the result
pub fn evaluate(scorer: &TrafficLightScorer, facts: &ProfileFacts) -> TrafficLightReport {
    let score = scorer.score(facts);
    TrafficLightReport {
        presentation: score.status.presentation(),
        suggestions: suggest(&score.breakdown, facts),
        max_score: MAX_TOTAL,
        score,
    }
}
