use super::ExtractedTaxFields;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Unknown labels from a model read as medium rather than failing the parse.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.trim().to_lowercase().as_str() {
            "high" | "critical" | "severe" => Severity::High,
            "low" | "info" | "minor" => Severity::Low,
            _ => Severity::Medium,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFlag {
    pub issue: String,
    pub severity: Severity,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub action_needed: String,
}

impl ComplianceFlag {
    pub fn new(
        issue: impl Into<String>,
        severity: Severity,
        explanation: impl Into<String>,
        action_needed: impl Into<String>,
    ) -> Self {
        Self {
            issue: issue.into(),
            severity,
            explanation: explanation.into(),
            action_needed: action_needed.into(),
        }
    }
}

/// Which stage of the extraction chain produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Primary,
    Secondary,
    Fallback,
}

impl ExtractionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionSource::Primary => "primary",
            ExtractionSource::Secondary => "secondary",
            ExtractionSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    pub document_type: String,
    pub extracted_fields: ExtractedTaxFields,
    pub compliance_flags: Vec<ComplianceFlag>,
    pub risk_level: RiskLevel,
    pub suggested_action: String,
    pub source: ExtractionSource,
}
