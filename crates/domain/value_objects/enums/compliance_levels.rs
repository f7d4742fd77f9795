use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComplianceLevel {
    High,
    Medium,
    Low,
}

impl ComplianceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ComplianceLevel::High
        } else if score >= 60.0 {
            ComplianceLevel::Medium
        } else {
            ComplianceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceLevel::High => "High",
            ComplianceLevel::Medium => "Medium",
            ComplianceLevel::Low => "Low",
        }
    }
}

impl Display for ComplianceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
