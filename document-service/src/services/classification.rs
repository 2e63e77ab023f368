//! Maps an analysis onto the category and status a document is stored under.

use crate::models::{DocumentStatus, StructuredAnalysis, BANK_STATEMENT};

pub const UNCLASSIFIED: &str = "Unclassified";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub status: DocumentStatus,
    pub attach_spend_analysis: bool,
}

/// The model's document type wins unless it is empty or "Other"; then the
/// uploader's declared category; then `Unclassified`. Any compliance flag
/// puts the document in review.
pub fn classify(analysis: &StructuredAnalysis, declared_category: Option<&str>) -> Classification {
    let ai_type = analysis.document_type.trim();
    let declared = declared_category.map(str::trim).filter(|c| !c.is_empty());

    let category = if !ai_type.is_empty() && !ai_type.eq_ignore_ascii_case("other") {
        ai_type.to_string()
    } else if let Some(declared) = declared {
        declared.to_string()
    } else {
        UNCLASSIFIED.to_string()
    };

    let status = if analysis.compliance_flags.is_empty() {
        DocumentStatus::Processed
    } else {
        DocumentStatus::Flagged
    };

    Classification {
        attach_spend_analysis: category == BANK_STATEMENT,
        category,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fallback_analysis;
    use crate::models::{ExtractedTaxFields, ExtractionSource, RiskLevel};

    fn analysis(document_type: &str) -> StructuredAnalysis {
        StructuredAnalysis {
            document_type: document_type.to_string(),
            extracted_fields: ExtractedTaxFields::default(),
            compliance_flags: Vec::new(),
            risk_level: RiskLevel::Low,
            suggested_action: "File it".to_string(),
            source: ExtractionSource::Primary,
        }
    }

    #[test]
    fn model_type_takes_precedence() {
        let result = classify(&analysis("Tax Invoice"), Some("Purchase Invoice"));
        assert_eq!(result.category, "Tax Invoice");
        assert_eq!(result.status, DocumentStatus::Processed);
        assert!(!result.attach_spend_analysis);
    }

    #[test]
    fn other_defers_to_declared_category() {
        let result = classify(&analysis("Other"), Some("Bank Statement"));
        assert_eq!(result.category, BANK_STATEMENT);
        assert!(result.attach_spend_analysis);
    }

    #[test]
    fn nothing_known_is_unclassified() {
        assert_eq!(classify(&analysis(""), None).category, UNCLASSIFIED);
        assert_eq!(classify(&analysis("other"), Some("  ")).category, UNCLASSIFIED);
    }

    #[test]
    fn flagged_whenever_flags_exist() {
        let result = classify(&fallback_analysis("Total: 100"), None);
        assert_eq!(result.status, DocumentStatus::Flagged);
    }
}
