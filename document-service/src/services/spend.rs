//! Spend analytics over bank-statement lines.

use crate::extraction::currency::round2;
use crate::models::{
    BankTransaction, CategorySpend, LargeDebit, MonthlyFlow, SpendAnalysis, TransactionType,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

const LARGEST_DEBITS: usize = 5;
const UNKNOWN_MONTH: &str = "unknown";

/// First matching rule wins, so the more specific keywords come first.
/// Keywords match whole words only.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("Taxes", &["gst", "tds", "income tax", "advance tax", "challan", "cbdt", "tax", "taxes"]),
    ("Salary", &["salary", "payroll", "wages", "sal"]),
    ("Rent", &["rent", "lease"]),
    (
        "Utilities",
        &["electricity", "power", "water", "broadband", "internet", "telephone", "mobile", "recharge", "bescom", "msedcl", "gas"],
    ),
    ("Loan Repayment", &["emi", "loan"]),
    ("Cash Withdrawal", &["atm", "cash wdl", "cash withdrawal", "self"]),
    ("Travel", &["uber", "ola", "irctc", "flight", "airline", "indigo", "hotel", "travel", "taxi"]),
    ("Bank Charges", &["charges", "chrg", "chg", "fee", "fees", "penalty", "commission"]),
];

static CATEGORY_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    CATEGORY_RULES
        .iter()
        .map(|(category, keywords)| {
            let alternatives = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)\b(?:{})\b", alternatives);
            (*category, Regex::new(&pattern).expect("valid category regex"))
        })
        .collect()
});

pub fn categorize(description: &str) -> &'static str {
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(description))
        .map(|(category, _)| *category)
        .unwrap_or("Other")
}

fn month_of(date: &str) -> String {
    ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date.trim(), format).ok())
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_else(|| UNKNOWN_MONTH.to_string())
}

pub fn analyze_spend(transactions: &[BankTransaction]) -> SpendAnalysis {
    let mut total_debits = 0.0;
    let mut total_credits = 0.0;
    let mut by_category: BTreeMap<&'static str, (f64, usize)> = BTreeMap::new();
    let mut monthly: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for transaction in transactions {
        let month = monthly.entry(month_of(&transaction.date)).or_default();
        match transaction.transaction_type {
            TransactionType::Debit => {
                total_debits += transaction.amount;
                month.0 += transaction.amount;
                let entry = by_category
                    .entry(categorize(&transaction.description))
                    .or_default();
                entry.0 += transaction.amount;
                entry.1 += 1;
            }
            TransactionType::Credit => {
                total_credits += transaction.amount;
                month.1 += transaction.amount;
            }
        }
    }

    let mut by_category: Vec<CategorySpend> = by_category
        .into_iter()
        .map(|(category, (total, count))| CategorySpend {
            category: category.to_string(),
            total: round2(total),
            count,
        })
        .collect();
    by_category.sort_by(|a, b| b.total.total_cmp(&a.total));

    // BTreeMap order puts "unknown" after every YYYY-MM key.
    let monthly = monthly
        .into_iter()
        .map(|(month, (debits, credits))| MonthlyFlow {
            month,
            debits: round2(debits),
            credits: round2(credits),
        })
        .collect();

    let mut debits: Vec<&BankTransaction> =
        transactions.iter().filter(|t| t.is_debit()).collect();
    debits.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    let largest_debits = debits
        .into_iter()
        .take(LARGEST_DEBITS)
        .map(|t| LargeDebit {
            date: t.date.clone(),
            description: t.description.clone(),
            amount: t.amount,
            category: categorize(&t.description).to_string(),
        })
        .collect();

    SpendAnalysis {
        transaction_count: transactions.len(),
        total_debits: round2(total_debits),
        total_credits: round2(total_credits),
        net_flow: round2(total_credits - total_debits),
        by_category,
        monthly,
        largest_debits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> Vec<BankTransaction> {
        vec![
            BankTransaction::debit("2024-05-02", "NEFT OFFICE RENT MAY", 25000.0),
            BankTransaction::debit("03/05/2024", "GST CHALLAN 052024", 18000.0),
            BankTransaction::debit("04/05/2024", "ATM WDL MG ROAD", 2000.0),
            BankTransaction::credit("05/05/2024", "UPI RECEIPT CUSTOMER", 50000.0),
            BankTransaction::debit("2024-06-01", "SALARY JUNE", 40000.0),
            BankTransaction::debit("2024-06-02", "SMS CHRG", 17.7),
            BankTransaction::debit("2024-06-03", "AMAZON MARKETPLACE", 1200.0),
            BankTransaction::debit("sometime", "UBER TRIP", 450.0),
        ]
    }

    #[test]
    fn totals_and_net_flow() {
        let analysis = analyze_spend(&statement());
        assert_eq!(analysis.transaction_count, 8);
        assert_eq!(analysis.total_debits, 86667.7);
        assert_eq!(analysis.total_credits, 50000.0);
        assert_eq!(analysis.net_flow, -36667.7);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(categorize("TORRENT POWER BILL"), "Utilities");
        assert_eq!(categorize("CAFE COFFEE DAY"), "Other");
        assert_eq!(categorize("UBER TAXI"), "Travel");
        assert_eq!(categorize("CURRENT A/C TRF ACME"), "Other");
        assert_eq!(categorize("Annual fee"), "Bank Charges");
        assert_eq!(categorize("NEFT-OFFICE RENT"), "Rent");
    }

    #[test]
    fn debits_are_grouped_by_keyword_category() {
        let analysis = analyze_spend(&statement());
        let category = |name: &str| {
            analysis
                .by_category
                .iter()
                .find(|c| c.category == name)
                .cloned()
        };

        assert_eq!(analysis.by_category[0].category, "Salary");
        assert_eq!(category("Rent").map(|c| c.total), Some(25000.0));
        assert_eq!(category("Taxes").map(|c| c.count), Some(1));
        assert_eq!(category("Cash Withdrawal").map(|c| c.total), Some(2000.0));
        assert_eq!(category("Bank Charges").map(|c| c.total), Some(17.7));
        assert_eq!(category("Travel").map(|c| c.total), Some(450.0));
        assert_eq!(category("Other").map(|c| c.total), Some(1200.0));
    }

    #[test]
    fn monthly_flow_is_chronological() {
        let analysis = analyze_spend(&statement());
        let months: Vec<&str> = analysis.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-05", "2024-06", "unknown"]);
        assert_eq!(analysis.monthly[0].debits, 45000.0);
        assert_eq!(analysis.monthly[0].credits, 50000.0);
    }

    #[test]
    fn keeps_the_five_largest_debits() {
        let analysis = analyze_spend(&statement());
        let amounts: Vec<f64> = analysis.largest_debits.iter().map(|d| d.amount).collect();
        assert_eq!(amounts, vec![40000.0, 25000.0, 18000.0, 2000.0, 1200.0]);
        assert_eq!(analysis.largest_debits[0].category, "Salary");
    }

    #[test]
    fn empty_statement() {
        let analysis = analyze_spend(&[]);
        assert_eq!(analysis.transaction_count, 0);
        assert!(analysis.by_category.is_empty());
        assert!(analysis.largest_debits.is_empty());
    }
}
