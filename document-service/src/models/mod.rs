mod analysis;
mod document;
mod fields;
mod job;
mod spend;
mod transaction;

pub use analysis::{ComplianceFlag, ExtractionSource, RiskLevel, Severity, StructuredAnalysis};
pub use document::{DocumentStatus, UploadedDocument, VerificationAction, BANK_STATEMENT, PURCHASE_INVOICE};
pub use fields::ExtractedTaxFields;
pub(crate) use fields::{lenient_amount, parse_amount};
pub use spend::{CategorySpend, LargeDebit, MonthlyFlow, SpendAnalysis};
pub use job::{IngestJob, JobFile, JobStatus};
pub use transaction::{BankTransaction, MatchStatus, TransactionMatch, TransactionType};
