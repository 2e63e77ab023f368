use crate::models::{ComplianceFlag, ExtractedTaxFields, Severity};

pub const BASE_CURRENCY: &str = "INR";

/// Bring monetary fields into INR.
///
/// Results the model already converted (it reported `original_total_amount`)
/// are left alone. Otherwise amounts are multiplied by `exchange_rate` and the
/// source total is preserved; without a usable rate the figures stay as they
/// are and a medium flag asks for manual conversion.
pub fn normalize_currency(fields: &mut ExtractedTaxFields, flags: &mut Vec<ComplianceFlag>) {
    let Some(currency) = fields.currency_code() else {
        return;
    };
    if currency == BASE_CURRENCY || fields.original_total_amount.is_some() {
        return;
    }

    match fields.exchange_rate.filter(|rate| *rate > 0.0) {
        Some(rate) => {
            fields.original_total_amount = fields.total_amount;
            for amount in fields.monetary_fields_mut() {
                if let Some(value) = amount.as_mut() {
                    *value = round2(*value * rate);
                }
            }
            tracing::debug!(currency = %currency, rate, "Converted amounts to INR");
        }
        None => {
            tracing::warn!(currency = %currency, "No exchange rate for foreign-currency document");
            flags.push(ComplianceFlag::new(
                "Currency conversion unverified",
                Severity::Medium,
                format!(
                    "Amounts are in {} and no exchange rate was available to convert them to INR.",
                    currency
                ),
                "Confirm the RBI reference rate for the invoice date and restate amounts in INR",
            ));
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_with_rate_and_keeps_original_total() {
        let mut fields = ExtractedTaxFields {
            currency: Some("usd".to_string()),
            exchange_rate: Some(83.0),
            taxable_value: Some(100.0),
            igst: Some(18.0),
            total_amount: Some(118.0),
            ..Default::default()
        };
        let mut flags = Vec::new();
        normalize_currency(&mut fields, &mut flags);

        assert_eq!(fields.total_amount, Some(9794.0));
        assert_eq!(fields.original_total_amount, Some(118.0));
        assert_eq!(fields.igst, Some(1494.0));
        assert!(flags.is_empty());
    }

    #[test]
    fn already_converted_amounts_are_untouched() {
        let mut fields = ExtractedTaxFields {
            currency: Some("EUR".to_string()),
            exchange_rate: Some(90.0),
            total_amount: Some(9000.0),
            original_total_amount: Some(100.0),
            ..Default::default()
        };
        let mut flags = Vec::new();
        normalize_currency(&mut fields, &mut flags);

        assert_eq!(fields.total_amount, Some(9000.0));
        assert!(flags.is_empty());
    }

    #[test]
    fn missing_rate_adds_medium_flag() {
        let mut fields = ExtractedTaxFields {
            currency: Some("USD".to_string()),
            total_amount: Some(50.0),
            ..Default::default()
        };
        let mut flags = Vec::new();
        normalize_currency(&mut fields, &mut flags);

        assert_eq!(fields.total_amount, Some(50.0));
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].severity, Severity::Medium);
    }

    #[test]
    fn inr_documents_pass_through() {
        let mut fields = ExtractedTaxFields {
            currency: Some("INR".to_string()),
            total_amount: Some(1180.0),
            ..Default::default()
        };
        let mut flags = Vec::new();
        normalize_currency(&mut fields, &mut flags);
        assert_eq!(fields.total_amount, Some(1180.0));
        assert!(fields.original_total_amount.is_none());
    }

    #[test]
    fn rupee_spellings_are_treated_as_inr() {
        for currency in ["₹", "Rs.", "Rs", "INR (₹)", "Rupees", "inr"] {
            let mut fields = ExtractedTaxFields {
                currency: Some(currency.to_string()),
                total_amount: Some(1180.0),
                ..Default::default()
            };
            let mut flags = Vec::new();
            normalize_currency(&mut fields, &mut flags);

            assert!(flags.is_empty(), "{} was flagged", currency);
            assert_eq!(fields.total_amount, Some(1180.0));
            assert_eq!(fields.currency_code().as_deref(), Some("INR"));
        }
    }
}
