//! Deterministic extraction used when no AI provider answers.

use crate::extraction::currency::round2;
use crate::models::{
    parse_amount, BankTransaction, ComplianceFlag, ExtractedTaxFields, ExtractionSource,
    RiskLevel, Severity, StructuredAnalysis, TransactionType,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// GST rate assumed when backing the taxable value out of a gross total.
const ASSUMED_GST_MULTIPLIER: f64 = 1.18;

pub const AI_OFFLINE_ISSUE: &str = "AI Offline";

static GSTIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{2}[A-Z]{5}\d{4}[A-Z][1-9A-Z]Z[0-9A-Z]\b").expect("valid GSTIN regex")
});

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b(?:total|amount|value|gross|net|payable|inr|rs\.?)|₹)\s*[:\-]?\s*(?:₹|inr|rs\.?)?\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)",
    )
    .expect("valid amount regex")
});

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{2}[/-]\d{2}[/-]\d{4}|\d{4}-\d{2}-\d{2})\b").expect("valid date regex")
});

static INVOICE_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)invoice\s*(?:no|number|#)\.?\s*[:\-]?\s*([A-Z0-9][A-Z0-9/\-]*)")
        .expect("valid invoice number regex")
});

static BUSINESS_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b([A-Z][A-Za-z0-9&.' ]{1,60}\s(?i:pvt\.?\s*ltd\.?|private\s+limited|limited|ltd\.?|llp|enterprises|traders|industries))",
    )
    .expect("valid business name regex")
});

static STATEMENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(\d{2}[/-]\d{2}[/-]\d{4}|\d{4}-\d{2}-\d{2})\s+(.+?)\s+(-?[0-9][0-9,]*(?:\.[0-9]{1,2})?)\s*(dr|cr|debit|credit)?\.?\s*$",
    )
    .expect("valid statement line regex")
});

/// Best-effort fields from pattern matching. Always succeeds, always carries
/// exactly one high "AI Offline" flag, and is rated medium.
pub fn fallback_analysis(raw_text: &str) -> StructuredAnalysis {
    let mut fields = ExtractedTaxFields::default();

    fields.supplier_gstin = GSTIN.find(raw_text).map(|m| m.as_str().to_string());

    let max_amount = AMOUNT
        .captures_iter(raw_text)
        .filter_map(|c| c.get(1).and_then(|m| parse_amount(m.as_str())))
        .fold(None, |max: Option<f64>, value| {
            Some(max.map_or(value, |m| m.max(value)))
        });
    if let Some(total) = max_amount {
        fields.total_amount = Some(total);
        fields.taxable_value = Some(round2(total / ASSUMED_GST_MULTIPLIER));
    }

    fields.invoice_date = DATE
        .captures(raw_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    fields.invoice_number = INVOICE_NUMBER
        .captures(raw_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    fields.supplier_name = BUSINESS_NAME
        .captures(raw_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    tracing::info!(
        gstin_found = fields.supplier_gstin.is_some(),
        amount_found = fields.total_amount.is_some(),
        "Regex fallback extraction completed"
    );

    StructuredAnalysis {
        document_type: "Other".to_string(),
        extracted_fields: fields,
        compliance_flags: vec![ComplianceFlag::new(
            AI_OFFLINE_ISSUE,
            Severity::High,
            "AI analysis was unavailable; fields were extracted by pattern matching and may be incomplete or wrong.",
            "Manual audit required",
        )],
        risk_level: RiskLevel::Medium,
        suggested_action: "Manually verify the extracted fields against the original document"
            .to_string(),
        source: ExtractionSource::Fallback,
    }
}

/// Transactions from statement lines shaped `date description amount [Dr|Cr]`.
/// Lines without a marker read as debits unless the amount is negative.
pub fn parse_statement_lines(raw_text: &str) -> Vec<BankTransaction> {
    raw_text
        .lines()
        .filter_map(|line| {
            let caps = STATEMENT_LINE.captures(line)?;
            let date = caps.get(1)?.as_str();
            let description = caps.get(2)?.as_str().trim();
            let amount = parse_amount(caps.get(3)?.as_str())?;
            let marker = caps.get(4).map(|m| m.as_str().to_lowercase());

            let transaction_type = match marker.as_deref() {
                Some("cr") | Some("credit") => TransactionType::Credit,
                _ => TransactionType::Debit,
            };

            if description.to_lowercase().contains("balance") {
                return None;
            }

            Some(BankTransaction::new(
                date,
                description,
                amount.abs(),
                transaction_type,
            ))
        })
        .collect()
}
