//! Prompt text for the extraction models.

pub const DOCUMENT_TYPES: [&str; 11] = [
    "Tax Invoice",
    "Bill of Supply",
    "Debit Note",
    "Credit Note",
    "Receipt Voucher",
    "Payment Voucher",
    "Refund Voucher",
    "E-Invoice",
    "Export Invoice/LUT",
    "Self-Invoice/RCM",
    "Other",
];

const FIELD_NAMES: [&str; 26] = [
    "supplier_name",
    "supplier_gstin",
    "supplier_address",
    "supplier_state",
    "recipient_name",
    "recipient_gstin",
    "recipient_state",
    "place_of_supply",
    "invoice_number",
    "invoice_date",
    "hsn_codes",
    "taxable_value",
    "cgst",
    "sgst",
    "igst",
    "cess",
    "total_tax",
    "total_amount",
    "original_total_amount",
    "currency",
    "exchange_rate",
    "irn",
    "ack_number",
    "eway_bill_number",
    "reverse_charge",
    "itc_eligible",
];

const COMPLIANCE_CHECKS: [&str; 10] = [
    "GSTIN of supplier or recipient missing or not a valid 15-character GSTIN",
    "Invoice number or invoice date missing",
    "Taxable value, tax amounts or total amount missing",
    "HSN/SAC code missing on a B2B supply above Rs. 50,000",
    "Input tax credit claimed on a blocked category under Section 17(5) (food, motor vehicles, personal use)",
    "CGST+SGST charged on an inter-state supply, or IGST charged on an intra-state supply, given the place of supply",
    "Invoice date in the future or implausibly old",
    "Invoice number looks duplicated or reused",
    "Reverse charge applicable but not indicated",
    "E-invoice IRN missing where the supplier's turnover makes e-invoicing mandatory",
];

/// Prompt for classifying a tax document and auditing it.
pub fn invoice_prompt(raw_text: &str) -> String {
    let types = DOCUMENT_TYPES.join(", ");
    let fields = FIELD_NAMES.join(", ");
    let checks = COMPLIANCE_CHECKS
        .iter()
        .enumerate()
        .map(|(i, check)| format!("{}. {}", i + 1, check))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an Indian GST compliance auditor. The text below was produced by OCR and may contain noise.

Tasks:
1. Clean obvious OCR errors (broken words, misread digits in GSTINs and amounts).
2. Classify the document as exactly one of: {types}.
3. Extract these fields into "extracted_data" (use null when absent): {fields}.
   Amounts are plain numbers without currency symbols or separators.
   Report "currency" as an ISO-4217 code such as "INR" or "USD", never a symbol.
   If the currency is not INR, convert every amount to INR, put the converted total in "total_amount",
   keep the source-currency total in "original_total_amount" and report the "exchange_rate" used.
4. Run these compliance checks and report each failure as a flag:
{checks}
5. Rate the overall risk as low, medium or high.
6. Propose the single most important next action.

Respond with one JSON object only, in this shape:
{{"document_type": "...", "extracted_data": {{...}}, "compliance_flags": [{{"issue": "...", "severity": "high|medium|low", "explanation": "...", "action_needed": "..."}}], "risk_level": "low|medium|high", "suggested_action": "..."}}

Document text:
"""
{raw_text}
""""#
    )
}

/// Prompt for listing the transactions of a bank statement.
pub fn statement_prompt(raw_text: &str) -> String {
    format!(
        r#"The text below is an OCR'd Indian bank statement. List every transaction.

Respond with one JSON object only:
{{"transactions": [{{"date": "YYYY-MM-DD", "description": "...", "amount": 1234.56, "type": "debit|credit"}}]}}

Amounts are positive numbers; withdrawals are debits and deposits are credits. Skip opening and closing balance lines.

Statement text:
"""
{raw_text}
""""#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_prompt_embeds_text_and_contract() {
        let prompt = invoice_prompt("INVOICE NO: 42");
        assert!(prompt.contains("INVOICE NO: 42"));
        assert!(prompt.contains("Self-Invoice/RCM"));
        assert!(prompt.contains("original_total_amount"));
        assert!(prompt.contains("\"compliance_flags\""));
    }
}
