use crate::models::{ComplianceFlag, RiskLevel, Severity};

/// Risk from findings alone: any high flag makes the document high risk,
/// any other flag medium, none low.
pub fn derive_risk(flags: &[ComplianceFlag]) -> RiskLevel {
    if flags.iter().any(|f| f.severity == Severity::High) {
        RiskLevel::High
    } else if flags.is_empty() {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}
