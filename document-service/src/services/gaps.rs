//! Bank debits without a matching purchase invoice.

use crate::models::{BankTransaction, MatchStatus, TransactionMatch, UploadedDocument};
use crate::services::metrics;
use crate::services::repository::DocumentRepository;
use serde::Serialize;
use service_core::error::AppError;
use std::sync::Arc;

pub const GAP_TOLERANCE: f64 = 0.1;
pub const MAX_REPORTED_GAPS: usize = 50;

/// A debit with no invoice, located so it can be ignored later.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapTransaction {
    #[serde(flatten)]
    pub transaction: BankTransaction,
    pub document_id: String,
    pub transaction_index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    pub total_transactions: usize,
    pub total_debits: usize,
    pub matched_invoices: usize,
    pub missing_invoices_count: usize,
    pub gaps: Vec<GapTransaction>,
}

/// Report plus the statement lines whose match state changed.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub report: GapReport,
    pub updates: Vec<(String, Vec<TransactionMatch>)>,
}

fn matching_invoice<'a>(amount: f64, invoices: &[&'a UploadedDocument]) -> Option<&'a UploadedDocument> {
    invoices.iter().copied().find(|invoice| {
        invoice
            .extracted_fields
            .total_amount
            .is_some_and(|total| (total - amount).abs() <= GAP_TOLERANCE)
    })
}

/// Matches every debit of the client's bank statements against purchase
/// invoice totals. Ignored debits count toward the totals but never become
/// gaps; an invoice may match any number of debits.
pub fn reconcile_documents(documents: &[UploadedDocument]) -> Reconciliation {
    let invoices: Vec<&UploadedDocument> =
        documents.iter().filter(|d| d.is_purchase_invoice()).collect();
    let mut result = Reconciliation::default();

    for statement in documents.iter().filter(|d| d.is_bank_statement()) {
        let Some(transactions) = statement.transactions.as_ref() else {
            continue;
        };
        let mut changed = Vec::new();

        for (index, transaction) in transactions.iter().enumerate() {
            result.report.total_transactions += 1;
            if !transaction.is_debit() {
                continue;
            }
            result.report.total_debits += 1;
            if transaction.match_status == MatchStatus::Ignored {
                continue;
            }

            let (status, matched_id) = match matching_invoice(transaction.amount, &invoices) {
                Some(invoice) => {
                    result.report.matched_invoices += 1;
                    (MatchStatus::Matched, Some(invoice.id.clone()))
                }
                None => {
                    result.report.missing_invoices_count += 1;
                    if result.report.gaps.len() < MAX_REPORTED_GAPS {
                        result.report.gaps.push(GapTransaction {
                            transaction: transaction.clone(),
                            document_id: statement.id.clone(),
                            transaction_index: index,
                        });
                    }
                    (MatchStatus::Unmatched, None)
                }
            };

            if transaction.match_status != status || transaction.matched_document_id != matched_id {
                changed.push(TransactionMatch {
                    index,
                    status,
                    matched_document_id: matched_id,
                });
            }
        }

        // Frozen statements are reported on but never rewritten.
        if !changed.is_empty() && statement.ensure_mutable().is_ok() {
            result.updates.push((statement.id.clone(), changed));
        }
    }

    result
}

#[derive(Clone)]
pub struct GapAnalyzer {
    documents: Arc<dyn DocumentRepository>,
}

impl GapAnalyzer {
    pub fn new(documents: Arc<dyn DocumentRepository>) -> Self {
        Self { documents }
    }

    /// Read-only report. Missing data or a failing store yields a zero report.
    pub async fn compute_gaps(&self, firm_id: &str, client_id: &str) -> GapReport {
        match self.documents.list_for_client(firm_id, client_id).await {
            Ok(documents) => reconcile_documents(&documents).report,
            Err(e) => {
                tracing::error!(
                    firm_id = %firm_id,
                    client_id = %client_id,
                    error = %e,
                    "Gap analysis failed, returning empty report"
                );
                GapReport::default()
            }
        }
    }

    /// Same report, with match results written back onto the statements.
    pub async fn reconcile(&self, firm_id: &str, client_id: &str) -> Result<GapReport, AppError> {
        let documents = self.documents.list_for_client(firm_id, client_id).await?;
        let Reconciliation { report, updates } = reconcile_documents(&documents);

        let mut lines_written = 0;
        for (document_id, matches) in &updates {
            lines_written += self.documents.apply_matches(document_id, matches).await?;
        }

        metrics::record_reconciliation(report.matched_invoices, report.missing_invoices_count);
        tracing::info!(
            client_id = %client_id,
            matched = report.matched_invoices,
            gaps = report.missing_invoices_count,
            statements_updated = updates.len(),
            lines_written,
            "Reconciliation completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentStatus, BANK_STATEMENT, PURCHASE_INVOICE};
    use crate::services::memory::InMemoryDocuments;

    fn document(category: &str) -> UploadedDocument {
        let mut doc = UploadedDocument::new(
            "firm-1".to_string(),
            "client-1".to_string(),
            "client-1".to_string(),
            "file.pdf".to_string(),
            "application/pdf".to_string(),
            10,
            "key".to_string(),
        );
        doc.category = category.to_string();
        doc
    }

    fn invoice(total: f64) -> UploadedDocument {
        let mut doc = document("Tax Invoice");
        doc.declared_category = Some(PURCHASE_INVOICE.to_string());
        doc.extracted_fields.total_amount = Some(total);
        doc
    }

    fn statement(transactions: Vec<BankTransaction>) -> UploadedDocument {
        let mut doc = document(BANK_STATEMENT);
        doc.transactions = Some(transactions);
        doc
    }

    #[test]
    fn tolerance_matches_small_differences_only() {
        let documents = vec![
            invoice(1000.00),
            statement(vec![
                BankTransaction::debit("2024-05-02", "ACME", 1000.05),
                BankTransaction::debit("2024-05-03", "ACME", 1000.20),
            ]),
        ];
        let report = reconcile_documents(&documents).report;

        assert_eq!(report.total_debits, 2);
        assert_eq!(report.matched_invoices, 1);
        assert_eq!(report.missing_invoices_count, 1);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].transaction.amount, 1000.20);
        assert_eq!(report.gaps[0].transaction_index, 1);
    }

    #[test]
    fn credits_and_ignored_debits_are_not_gaps() {
        let mut ignored = BankTransaction::debit("2024-05-04", "Cash", 300.0);
        ignored.match_status = MatchStatus::Ignored;
        let documents = vec![statement(vec![
            BankTransaction::credit("2024-05-01", "Receipt", 900.0),
            ignored,
            BankTransaction::debit("2024-05-05", "Supplier", 450.0),
        ])];
        let report = reconcile_documents(&documents).report;

        assert_eq!(report.total_transactions, 3);
        assert_eq!(report.total_debits, 2);
        assert_eq!(report.missing_invoices_count, 1);
        assert_eq!(report.gaps[0].transaction.amount, 450.0);
    }

    #[test]
    fn gaps_are_capped_in_encounter_order() {
        let transactions = (0..60)
            .map(|i| BankTransaction::debit("2024-05-01", format!("Debit {}", i), 10.0 + i as f64))
            .collect();
        let report = reconcile_documents(&[statement(transactions)]).report;

        assert_eq!(report.missing_invoices_count, 60);
        assert_eq!(report.gaps.len(), MAX_REPORTED_GAPS);
        assert_eq!(report.gaps[0].transaction.description, "Debit 0");
        assert_eq!(report.gaps[49].transaction.description, "Debit 49");
    }

    #[test]
    fn matches_are_written_back() {
        let invoice = invoice(5000.0);
        let documents = vec![
            invoice.clone(),
            statement(vec![BankTransaction::debit("2024-05-02", "ACME", 5000.0)]),
        ];
        let reconciliation = reconcile_documents(&documents);

        assert_eq!(reconciliation.updates.len(), 1);
        let (_, matches) = &reconciliation.updates[0];
        assert_eq!(matches[0].index, 0);
        assert_eq!(matches[0].status, MatchStatus::Matched);
        assert_eq!(matches[0].matched_document_id.as_deref(), Some(invoice.id.as_str()));
    }

    async fn seeded(documents: &[UploadedDocument]) -> Arc<InMemoryDocuments> {
        let store = Arc::new(InMemoryDocuments::new());
        for document in documents {
            store.insert(document).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn ignore_between_read_and_write_back_survives() {
        let invoice = invoice(700.0);
        let statement = statement(vec![
            BankTransaction::debit("2024-05-02", "ACME", 700.0),
            BankTransaction::debit("2024-05-03", "Cash", 250.0),
        ]);
        let store = seeded(&[invoice.clone(), statement.clone()]).await;

        // Stale matched mark so the write-back touches line 1 as well.
        let mut stale = statement.clone();
        stale.transactions.as_mut().unwrap()[1].match_status = MatchStatus::Matched;
        let reconciliation = reconcile_documents(&[invoice, stale]);
        let (_, matches) = &reconciliation.updates[0];
        assert!(matches.iter().any(|m| m.index == 1));

        assert!(store.ignore_transaction("firm-1", &statement.id, 1).await.unwrap());
        store.apply_matches(&statement.id, matches).await.unwrap();

        let stored = store.get("firm-1", &statement.id).await.unwrap().unwrap();
        let lines = stored.transactions.unwrap();
        assert_eq!(lines[0].match_status, MatchStatus::Matched);
        assert_eq!(lines[1].match_status, MatchStatus::Ignored);
    }

    #[tokio::test]
    async fn statement_frozen_before_write_back_is_untouched() {
        let invoice = invoice(700.0);
        let statement = statement(vec![BankTransaction::debit("2024-05-02", "ACME", 700.0)]);
        let store = seeded(&[invoice.clone(), statement.clone()]).await;
        let reconciliation = reconcile_documents(&[invoice, statement.clone()]);

        let mut frozen = statement.clone();
        frozen.status = DocumentStatus::VerifiedL2;
        assert!(store
            .save_verification(&frozen, DocumentStatus::Processed)
            .await
            .unwrap());

        let (_, matches) = &reconciliation.updates[0];
        assert_eq!(store.apply_matches(&statement.id, matches).await.unwrap(), 0);
        let stored = store.get("firm-1", &statement.id).await.unwrap().unwrap();
        assert_eq!(
            stored.transactions.unwrap()[0].match_status,
            MatchStatus::Unmatched
        );
    }

    #[test]
    fn no_documents_gives_zero_report() {
        let reconciliation = reconcile_documents(&[]);
        assert_eq!(reconciliation.report, GapReport::default());
        assert!(reconciliation.updates.is_empty());
    }

    #[test]
    fn report_serializes_in_camel_case() {
        let json = serde_json::to_value(GapReport::default()).unwrap();
        assert!(json.get("missingInvoicesCount").is_some());
        assert!(json.get("totalTransactions").is_some());
    }
}
