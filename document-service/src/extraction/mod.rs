//! Text to structured tax analysis: provider chain first, regex fallback last.

pub mod cascade;
pub mod currency;
pub mod fallback;
pub mod json;
pub mod prompt;
pub mod risk;

use crate::config::AiConfig;
use crate::models::{
    lenient_amount, BankTransaction, ComplianceFlag, ExtractedTaxFields, ExtractionSource,
    StructuredAnalysis, TransactionType,
};
use crate::services::metrics;
use crate::services::providers::{GeminiPort, ModelPort, OpenAiPort};
use serde::Deserialize;
use std::sync::Arc;

pub use cascade::{ProviderChain, ProviderStage, ResponseFormat};
pub use currency::normalize_currency;
pub use fallback::{fallback_analysis, parse_statement_lines, AI_OFFLINE_ISSUE};
pub use json::{extract_json_object, strip_code_fence};
pub use risk::derive_risk;

/// Shape the prompt asks every provider for.
#[derive(Debug, Deserialize)]
struct ProviderAnalysis {
    document_type: String,
    #[serde(default)]
    extracted_data: ExtractedTaxFields,
    #[serde(default)]
    compliance_flags: Vec<ComplianceFlag>,
    #[serde(default)]
    suggested_action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    transactions: Vec<StatementLine>,
}

#[derive(Debug, Deserialize)]
struct StatementLine {
    #[serde(default)]
    date: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    amount: Option<f64>,
    #[serde(default, rename = "type")]
    kind: String,
}

impl StatementLine {
    fn into_transaction(self) -> Option<BankTransaction> {
        let amount = self.amount?;
        let transaction_type = match self.kind.trim().to_lowercase().as_str() {
            "credit" | "cr" | "deposit" => TransactionType::Credit,
            "debit" | "dr" | "withdrawal" => TransactionType::Debit,
            _ if amount < 0.0 => TransactionType::Debit,
            _ => return None,
        };
        Some(BankTransaction::new(
            self.date,
            self.description.trim(),
            amount.abs(),
            transaction_type,
        ))
    }
}

pub struct DocumentAnalyzer {
    chain: ProviderChain,
}

impl DocumentAnalyzer {
    pub fn new(chain: ProviderChain) -> Self {
        Self { chain }
    }

    /// Chain from configuration: Gemini's model list when a key is set, then
    /// OpenAI when a key is set. Providers that fail to build are skipped.
    pub fn from_config(config: &AiConfig) -> Self {
        let mut chain = ProviderChain::new();

        if let Some(key) = &config.gemini_api_key {
            match GeminiPort::new(key.clone(), config.request_timeout()) {
                Ok(port) => {
                    let port: Arc<dyn ModelPort> = Arc::new(port);
                    chain = chain.with_stage(ProviderStage::new(
                        port,
                        config.gemini_models.clone(),
                        ExtractionSource::Primary,
                        ResponseFormat::Embedded,
                    ));
                }
                Err(e) => tracing::error!(error = %e, "Gemini provider unavailable"),
            }
        }

        if let Some(key) = &config.openai_api_key {
            match OpenAiPort::new(key.clone(), config.request_timeout()) {
                Ok(port) => {
                    let port: Arc<dyn ModelPort> = Arc::new(port);
                    chain = chain.with_stage(ProviderStage::new(
                        port,
                        vec![config.openai_model.clone()],
                        ExtractionSource::Secondary,
                        ResponseFormat::Native,
                    ));
                }
                Err(e) => tracing::error!(error = %e, "OpenAI provider unavailable"),
            }
        }

        Self::new(chain)
    }

    /// Never fails: when no provider yields a usable answer the regex
    /// fallback result is returned.
    pub async fn analyze(&self, raw_text: &str) -> StructuredAnalysis {
        let analysis = match self.provider_analysis(raw_text).await {
            Some(analysis) => analysis,
            None => fallback_analysis(raw_text),
        };

        metrics::record_extraction(analysis.source);
        analysis
    }

    async fn provider_analysis(&self, raw_text: &str) -> Option<StructuredAnalysis> {
        if raw_text.trim().is_empty() {
            tracing::info!("No OCR text, skipping AI providers");
            return None;
        }
        if self.chain.is_empty() {
            return None;
        }

        let (response, source) = self
            .chain
            .run::<ProviderAnalysis>("invoice_analysis", &prompt::invoice_prompt(raw_text))
            .await?;

        let mut fields = response.extracted_data;
        let mut flags = response.compliance_flags;
        normalize_currency(&mut fields, &mut flags);

        let document_type = Some(response.document_type.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Other".to_string());

        Some(StructuredAnalysis {
            document_type,
            risk_level: derive_risk(&flags),
            extracted_fields: fields,
            compliance_flags: flags,
            suggested_action: response
                .suggested_action
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| "Review the document".to_string()),
            source,
        })
    }

    /// Statement lines via the provider chain, else the line parser.
    pub async fn extract_transactions(&self, raw_text: &str) -> Vec<BankTransaction> {
        if !raw_text.trim().is_empty() && !self.chain.is_empty() {
            let result = self
                .chain
                .run::<StatementResponse>("statement_transactions", &prompt::statement_prompt(raw_text))
                .await;

            if let Some((response, _)) = result {
                let transactions: Vec<BankTransaction> = response
                    .transactions
                    .into_iter()
                    .filter_map(StatementLine::into_transaction)
                    .collect();
                if !transactions.is_empty() {
                    return transactions;
                }
            }
        }

        let transactions = parse_statement_lines(raw_text);
        tracing::info!(count = transactions.len(), "Statement parsed by line matcher");
        transactions
    }
}
