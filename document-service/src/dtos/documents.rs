use crate::models::{
    BankTransaction, ComplianceFlag, DocumentStatus, ExtractedTaxFields, ExtractionSource,
    RiskLevel, SpendAnalysis, UploadedDocument, VerificationAction,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    pub owner_client_id: String,
    pub uploaded_by: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: i64,
    pub declared_category: Option<String>,
    pub category: String,
    pub document_type: String,
    pub status: DocumentStatus,
    pub extracted_fields: ExtractedTaxFields,
    pub compliance_flags: Vec<ComplianceFlag>,
    pub risk_level: RiskLevel,
    pub suggested_action: String,
    pub extraction_source: ExtractionSource,
    pub raw_ocr_text: String,
    pub transactions: Option<Vec<BankTransaction>>,
    pub analysis_result: Option<SpendAnalysis>,
    pub verified_l1_by: Option<String>,
    pub verified_l2_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UploadedDocument> for DocumentResponse {
    fn from(doc: UploadedDocument) -> Self {
        Self {
            id: doc.id,
            owner_client_id: doc.owner_client_id,
            uploaded_by: doc.uploaded_by,
            original_name: doc.original_name,
            mime_type: doc.mime_type,
            size: doc.size,
            declared_category: doc.declared_category,
            category: doc.category,
            document_type: doc.document_type,
            status: doc.status,
            extracted_fields: doc.extracted_fields,
            compliance_flags: doc.compliance_flags,
            risk_level: doc.risk_level,
            suggested_action: doc.suggested_action,
            extraction_source: doc.extraction_source,
            raw_ocr_text: doc.raw_ocr_text,
            transactions: doc.transactions,
            analysis_result: doc.analysis_result,
            verified_l1_by: doc.verified_l1_by,
            verified_l2_by: doc.verified_l2_by,
            created_at: doc.created_at.to_rfc3339(),
            updated_at: doc.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerificationRequest {
    pub action: VerificationAction,
}

/// Text fields of the multipart upload.
#[derive(Debug, Default, Validate)]
pub struct UploadForm {
    #[validate(length(min = 1, max = 64))]
    pub client_id: String,
    #[validate(length(max = 64))]
    pub category: Option<String>,
}
