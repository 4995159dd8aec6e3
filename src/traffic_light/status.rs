//! Traffic light status and the thresholds that define it

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLightStatus {
    Red,
    Yellow,
    Green,
}

impl TrafficLightStatus {
    pub fn level(&self) -> &'static str {
        match self {
            Self::Green => "Excellent",
            Self::Yellow => "Good",
            Self::Red => "Needs Attention",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Green => "Ready for Employer Consideration",
            Self::Yellow => "Minor Improvements Recommended",
            Self::Red => "Significant Improvements Required",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Green => "Your profile meets all quality standards and is ready for employers.",
            Self::Yellow => "Your profile is good but could benefit from some enhancements.",
            Self::Red => {
                "Your profile needs significant improvements before employer consideration."
            }
        }
    }

    pub fn presentation(&self) -> StatusPresentation {
        StatusPresentation {
            level: self.level(),
            message: self.message(),
            description: self.description(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPresentation {
    pub level: &'static str,
    pub message: &'static str,
    pub description: &'static str,
}

/// Lowest totals for each status; the only place these numbers live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusThresholds {
    pub green: u8,
    pub yellow: u8,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            green: 80,
            yellow: 60,
        }
    }
}

impl StatusThresholds {
    pub fn status(&self, total: u8) -> TrafficLightStatus {
        if total >= self.green {
            TrafficLightStatus::Green
        } else if total >= self.yellow {
            TrafficLightStatus::Yellow
        } else {
            TrafficLightStatus::Red
        }
    }
}
