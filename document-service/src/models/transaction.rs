use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Unmatched,
    Matched,
    Ignored,
}

/// Reconcile outcome for one statement line, addressed by its index.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMatch {
    pub index: usize,
    pub status: MatchStatus,
    pub matched_document_id: Option<String>,
}

/// One line of a bank statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub match_status: MatchStatus,
    #[serde(default)]
    pub matched_document_id: Option<String>,
}

impl BankTransaction {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount,
            transaction_type,
            match_status: MatchStatus::Unmatched,
            matched_document_id: None,
        }
    }

    pub fn debit(date: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self::new(date, description, amount, TransactionType::Debit)
    }

    pub fn credit(date: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self::new(date, description, amount, TransactionType::Credit)
    }

    pub fn is_debit(&self) -> bool {
        self.transaction_type == TransactionType::Debit
    }
}
