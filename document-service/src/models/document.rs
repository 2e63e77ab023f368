use super::{
    BankTransaction, ComplianceFlag, ExtractedTaxFields, ExtractionSource, MatchStatus, RiskLevel,
    SpendAnalysis,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use service_core::middleware::{ActorRole, FirmContext};
use uuid::Uuid;

pub const BANK_STATEMENT: &str = "Bank Statement";
pub const PURCHASE_INVOICE: &str = "Purchase Invoice";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Processed,
    Flagged,
    VerifiedL1,
    VerifiedL2,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Processed => "processed",
            DocumentStatus::Flagged => "flagged",
            DocumentStatus::VerifiedL1 => "verified_l1",
            DocumentStatus::VerifiedL2 => "verified_l2",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationAction {
    Flag,
    VerifyL1,
    VerifyL2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub firm_id: String,
    pub owner_client_id: String,
    pub uploaded_by: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
    pub raw_ocr_text: String,
    pub declared_category: Option<String>,
    pub category: String,
    pub document_type: String,
    pub status: DocumentStatus,
    pub extracted_fields: ExtractedTaxFields,
    pub compliance_flags: Vec<ComplianceFlag>,
    pub risk_level: RiskLevel,
    pub suggested_action: String,
    pub extraction_source: ExtractionSource,
    #[serde(default)]
    pub transactions: Option<Vec<BankTransaction>>,
    #[serde(default)]
    pub analysis_result: Option<SpendAnalysis>,
    #[serde(default)]
    pub verified_l1_by: Option<String>,
    #[serde(default)]
    pub verified_l2_by: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl UploadedDocument {
    /// Fresh record for an upload; the pipeline fills in the analysis.
    pub fn new(
        firm_id: String,
        owner_client_id: String,
        uploaded_by: String,
        original_name: String,
        mime_type: String,
        size: i64,
        storage_key: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            firm_id,
            owner_client_id,
            uploaded_by,
            original_name,
            mime_type,
            size,
            storage_key,
            raw_ocr_text: String::new(),
            declared_category: None,
            category: "Unclassified".to_string(),
            document_type: "Other".to_string(),
            status: DocumentStatus::Processed,
            extracted_fields: ExtractedTaxFields::default(),
            compliance_flags: Vec::new(),
            risk_level: RiskLevel::Low,
            suggested_action: String::new(),
            extraction_source: ExtractionSource::Fallback,
            transactions: None,
            analysis_result: None,
            verified_l1_by: None,
            verified_l2_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_bank_statement(&self) -> bool {
        self.category == BANK_STATEMENT
    }

    /// Matches on either the uploader's label or the resolved category, since
    /// the model reports invoices by tax type ("Tax Invoice").
    pub fn is_purchase_invoice(&self) -> bool {
        self.category == PURCHASE_INVOICE
            || self.declared_category.as_deref() == Some(PURCHASE_INVOICE)
    }

    /// L2-verified documents are frozen; only deletion remains.
    pub fn ensure_mutable(&self) -> Result<(), AppError> {
        if self.status == DocumentStatus::VerifiedL2 {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Document {} is L2-verified and can no longer change",
                self.id
            )));
        }
        Ok(())
    }

    pub fn apply_verification(
        &mut self,
        action: VerificationAction,
        actor: &FirmContext,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.ensure_mutable()?;

        match action {
            VerificationAction::Flag => {
                actor.require_staff()?;
                if self.status != DocumentStatus::Processed {
                    return Err(self.transition_conflict(action));
                }
                self.status = DocumentStatus::Flagged;
            }
            VerificationAction::VerifyL1 => {
                actor.require_staff()?;
                if !matches!(
                    self.status,
                    DocumentStatus::Processed | DocumentStatus::Flagged
                ) {
                    return Err(self.transition_conflict(action));
                }
                self.status = DocumentStatus::VerifiedL1;
                self.verified_l1_by = Some(actor.user_id.clone());
            }
            VerificationAction::VerifyL2 => {
                if actor.role != ActorRole::FirmAdmin {
                    return Err(AppError::Forbidden(anyhow::anyhow!(
                        "L2 verification requires a firm admin"
                    )));
                }
                if self.status != DocumentStatus::VerifiedL1 {
                    return Err(self.transition_conflict(action));
                }
                self.status = DocumentStatus::VerifiedL2;
                self.verified_l2_by = Some(actor.user_id.clone());
            }
        }

        self.updated_at = at;
        Ok(())
    }

    /// Exclude one bank debit from gap analysis.
    pub fn ignore_transaction(&mut self, index: usize, at: DateTime<Utc>) -> Result<(), AppError> {
        self.ensure_mutable()?;
        let transaction = self
            .transactions
            .as_mut()
            .and_then(|t| t.get_mut(index))
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!(
                    "Transaction {} not found on document {}",
                    index,
                    self.id
                ))
            })?;

        if !transaction.is_debit() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Only debit transactions can be ignored"
            )));
        }

        transaction.match_status = MatchStatus::Ignored;
        transaction.matched_document_id = None;
        self.updated_at = at;
        Ok(())
    }

    fn transition_conflict(&self, action: VerificationAction) -> AppError {
        AppError::Conflict(anyhow::anyhow!(
            "Cannot apply {:?} to a document in status {}",
            action,
            self.status.as_str()
        ))
    }
}
