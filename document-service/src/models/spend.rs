use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    /// `YYYY-MM`, or `unknown` for undated lines.
    pub month: String,
    pub debits: f64,
    pub credits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargeDebit {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
}

/// Spend summary attached to bank statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendAnalysis {
    pub transaction_count: usize,
    pub total_debits: f64,
    pub total_credits: f64,
    pub net_flow: f64,
    pub by_category: Vec<CategorySpend>,
    pub monthly: Vec<MonthlyFlow>,
    pub largest_debits: Vec<LargeDebit>,
}
