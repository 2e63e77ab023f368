use serde::{Deserialize, Deserializer, Serialize};

/// Tax-invoice attributes pulled from a document. Every field is optional;
/// monetary fields are in INR once currency normalization has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedTaxFields {
    pub supplier_name: Option<String>,
    pub supplier_gstin: Option<String>,
    pub supplier_address: Option<String>,
    pub supplier_state: Option<String>,
    pub recipient_name: Option<String>,
    pub recipient_gstin: Option<String>,
    pub recipient_state: Option<String>,
    pub place_of_supply: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    #[serde(deserialize_with = "lenient::codes")]
    pub hsn_codes: Vec<String>,
    #[serde(deserialize_with = "lenient::amount")]
    pub taxable_value: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub cgst: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub sgst: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub igst: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub cess: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_tax: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub total_amount: Option<f64>,
    #[serde(deserialize_with = "lenient::amount")]
    pub original_total_amount: Option<f64>,
    pub currency: Option<String>,
    #[serde(deserialize_with = "lenient::amount")]
    pub exchange_rate: Option<f64>,
    pub irn: Option<String>,
    pub ack_number: Option<String>,
    pub eway_bill_number: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub reverse_charge: Option<bool>,
    #[serde(deserialize_with = "lenient::flag")]
    pub itc_eligible: Option<bool>,
}

impl ExtractedTaxFields {
    /// Every field expressed in the document currency.
    pub fn monetary_fields_mut(&mut self) -> [&mut Option<f64>; 7] {
        [
            &mut self.taxable_value,
            &mut self.cgst,
            &mut self.sgst,
            &mut self.igst,
            &mut self.cess,
            &mut self.total_tax,
            &mut self.total_amount,
        ]
    }

    /// Upper-cased currency code. Rupee spellings and the ₹ sign read as INR.
    pub fn currency_code(&self) -> Option<String> {
        let raw = self.currency.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.contains('₹') {
            return Some("INR".to_string());
        }

        let letters: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();
        match letters.as_str() {
            "" => Some(raw.to_uppercase()),
            "RS" | "RUPEE" | "RUPEES" | "INDIANRUPEE" | "INDIANRUPEES" => Some("INR".to_string()),
            code if code.starts_with("INR") => Some("INR".to_string()),
            code => Some(code.to_string()),
        }
    }
}

/// Model output is loosely typed: amounts arrive as numbers or as strings
/// such as "₹12,345.00", flags as booleans or "Yes"/"No".
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Number(f64),
        Bool(bool),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    /// Digits from the first one onwards, minus separators: "Rs. 1,200.50" is 1200.5.
    pub fn parse_amount(raw: &str) -> Option<f64> {
        let start = raw.find(|c: char| c.is_ascii_digit())?;
        let negative = raw[..start].trim_end().ends_with('-');
        let cleaned: String = raw[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .filter(|c| *c != ',')
            .collect();
        let value = cleaned.trim_end_matches('.').parse::<f64>().ok()?;
        Some(if negative { -value } else { value })
    }

    pub fn amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Number(n)) if n.is_finite() => Some(n),
            Some(Scalar::Text(s)) => parse_amount(&s),
            _ => None,
        })
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            Some(Scalar::Bool(b)) => Some(b),
            Some(Scalar::Text(s)) => match s.trim().to_lowercase().as_str() {
                "yes" | "y" | "true" | "applicable" | "eligible" => Some(true),
                "no" | "n" | "false" | "not applicable" | "ineligible" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    pub fn codes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let codes = match Option::<OneOrMany>::deserialize(deserializer)? {
            Some(OneOrMany::One(s)) => s
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            Some(OneOrMany::Many(v)) => v,
            None => Vec::new(),
        };
        Ok(codes)
    }
}

pub(crate) use lenient::{amount as lenient_amount, parse_amount};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_loosely_typed_model_output() {
        let fields: ExtractedTaxFields = serde_json::from_value(json!({
            "supplier_gstin": "27AAPFU0939F1ZV",
            "total_amount": "₹12,345.50",
            "cgst": 900,
            "hsn_codes": "8471, 8473",
            "reverse_charge": "No",
            "unexpected_key": "ignored"
        }))
        .unwrap();

        assert_eq!(fields.total_amount, Some(12345.50));
        assert_eq!(fields.cgst, Some(900.0));
        assert_eq!(fields.hsn_codes, vec!["8471", "8473"]);
        assert_eq!(fields.reverse_charge, Some(false));
        assert!(fields.igst.is_none());
    }

    #[test]
    fn parses_currency_prefixed_amounts() {
        assert_eq!(parse_amount("Rs. 1,200.50"), Some(1200.5));
        assert_eq!(parse_amount("INR 45,000"), Some(45000.0));
        assert_eq!(parse_amount("-250.00"), Some(-250.0));
        assert_eq!(parse_amount("nothing"), None);
    }

    #[test]
    fn unparseable_amount_becomes_none() {
        let fields: ExtractedTaxFields =
            serde_json::from_value(json!({ "total_amount": "N/A", "sgst": null })).unwrap();
        assert!(fields.total_amount.is_none());
        assert!(fields.sgst.is_none());
    }
}
