use document_service::config::AiConfig;
use document_service::extraction::{
    DocumentAnalyzer, ProviderChain, ProviderStage, ResponseFormat, AI_OFFLINE_ISSUE,
};
use document_service::models::{ExtractionSource, RiskLevel, Severity};
use document_service::services::providers::{ModelPort, ProviderError, ScriptedPort};
use std::sync::Arc;

const INVOICE_JSON: &str = r#"{
  "document_type": "Tax Invoice",
  "extracted_data": {"supplier_gstin": "27AAPFU0939F1ZV", "invoice_number": "INV-9", "total_amount": "1,180.00"},
  "compliance_flags": [],
  "risk_level": "high",
  "suggested_action": "Claim ITC"
}"#;

fn stage(
    port: &Arc<ScriptedPort>,
    models: &[&str],
    source: ExtractionSource,
    format: ResponseFormat,
) -> ProviderStage {
    let port: Arc<dyn ModelPort> = port.clone();
    ProviderStage::new(
        port,
        models.iter().map(|m| m.to_string()).collect(),
        source,
        format,
    )
}

fn primary(port: &Arc<ScriptedPort>, models: &[&str]) -> ProviderStage {
    stage(port, models, ExtractionSource::Primary, ResponseFormat::Embedded)
}

fn secondary(port: &Arc<ScriptedPort>) -> ProviderStage {
    stage(port, &["gpt-4o-mini"], ExtractionSource::Secondary, ResponseFormat::Native)
}

#[tokio::test]
async fn first_parseable_model_short_circuits() {
    let gemini = Arc::new(
        ScriptedPort::new("gemini").reply(format!("Here you go:\n```json\n{}\n```", INVOICE_JSON)),
    );
    let openai = Arc::new(ScriptedPort::new("openai").reply(INVOICE_JSON));
    let analyzer = DocumentAnalyzer::new(
        ProviderChain::new()
            .with_stage(primary(&gemini, &["flash", "pro"]))
            .with_stage(secondary(&openai)),
    );

    let analysis = analyzer.analyze("TAX INVOICE INV-9").await;

    assert_eq!(analysis.source, ExtractionSource::Primary);
    assert_eq!(analysis.extracted_fields.total_amount, Some(1180.0));
    assert_eq!(gemini.calls(), vec!["flash"]);
    assert!(openai.calls().is_empty());
    // No flags means low risk whatever the model claimed.
    assert_eq!(analysis.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn malformed_json_advances_to_the_next_model() {
    let gemini = Arc::new(
        ScriptedPort::new("gemini")
            .reply("I could not read this invoice, sorry.")
            .reply(r#"{"document_type": "Tax Invoice", "extracted_data": {"total_amount": 5"#)
            .reply(INVOICE_JSON),
    );
    let analyzer =
        DocumentAnalyzer::new(ProviderChain::new().with_stage(primary(&gemini, &["a", "b", "c"])));

    let analysis = analyzer.analyze("TAX INVOICE").await;

    assert_eq!(analysis.source, ExtractionSource::Primary);
    assert_eq!(gemini.calls(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn secondary_is_used_only_when_configured() {
    let failing = || {
        Arc::new(
            ScriptedPort::new("gemini")
                .fail(ProviderError::RateLimited)
                .fail(ProviderError::ModelNotFound("pro".to_string())),
        )
    };

    let without_secondary =
        DocumentAnalyzer::new(ProviderChain::new().with_stage(primary(&failing(), &["flash", "pro"])));
    let analysis = without_secondary.analyze("Total: 500").await;
    assert_eq!(analysis.source, ExtractionSource::Fallback);

    let openai = Arc::new(ScriptedPort::new("openai").reply(INVOICE_JSON));
    let with_secondary = DocumentAnalyzer::new(
        ProviderChain::new()
            .with_stage(primary(&failing(), &["flash", "pro"]))
            .with_stage(secondary(&openai)),
    );
    let analysis = with_secondary.analyze("Total: 500").await;
    assert_eq!(analysis.source, ExtractionSource::Secondary);
    assert_eq!(openai.calls(), vec!["gpt-4o-mini"]);
}

#[tokio::test]
async fn native_stage_rejects_prose() {
    let openai = Arc::new(ScriptedPort::new("openai").reply(format!("Sure! {}", INVOICE_JSON)));
    let analyzer = DocumentAnalyzer::new(ProviderChain::new().with_stage(secondary(&openai)));

    let analysis = analyzer.analyze("INVOICE").await;
    assert_eq!(analysis.source, ExtractionSource::Fallback);
}

#[tokio::test]
async fn analysis_never_fails() {
    let analyzer = DocumentAnalyzer::from_config(&AiConfig::default());
    for input in ["", "   \n\t", "garbage ∑∂ƒ", "Total: ₹12,345.00 GSTIN 27AAPFU0939F1ZV"] {
        let analysis = analyzer.analyze(input).await;
        assert_eq!(analysis.source, ExtractionSource::Fallback);
        assert!(!analysis.risk_level.as_str().is_empty());
        assert!(!analysis.suggested_action.is_empty());
    }
}

#[tokio::test]
async fn total_outage_yields_ai_offline_fallback() {
    let analyzer = DocumentAnalyzer::new(ProviderChain::new());
    let analysis = analyzer
        .analyze("SUPPLIER GSTIN 27AAPFU0939F1ZV\nTotal: ₹12,345.00")
        .await;

    assert_eq!(analysis.extracted_fields.total_amount, Some(12345.00));
    assert!(analysis.extracted_fields.supplier_gstin.is_some());
    let offline: Vec<_> = analysis
        .compliance_flags
        .iter()
        .filter(|f| f.issue == AI_OFFLINE_ISSUE)
        .collect();
    assert_eq!(offline.len(), 1);
    assert_eq!(offline[0].severity, Severity::High);
    assert_eq!(analysis.risk_level, RiskLevel::Medium);
}

#[tokio::test]
async fn foreign_currency_is_converted_to_base() {
    let gemini = Arc::new(ScriptedPort::new("gemini").reply(
        r#"{"document_type": "Export Invoice/LUT",
            "extracted_data": {"currency": "USD", "exchange_rate": 83, "total_amount": 118, "taxable_value": 100},
            "compliance_flags": []}"#,
    ));
    let analyzer = DocumentAnalyzer::new(ProviderChain::new().with_stage(primary(&gemini, &["flash"])));

    let analysis = analyzer.analyze("COMMERCIAL INVOICE USD 118").await;
    let fields = &analysis.extracted_fields;

    assert_eq!(fields.total_amount, Some(9794.0));
    assert_eq!(fields.original_total_amount, Some(118.0));
    assert_eq!(fields.taxable_value, Some(8300.0));
}
