//! Structured purchase-agreement data returned by the extraction endpoint.
//!
//! Every group and every leaf is optional. The model is instructed to emit
//! `null` for anything not present in the document, but in practice it also
//! returns numbers as strings (`"$450,000"`), zip codes as numbers, and
//! single names where a list was asked for, so the leaf deserializers here
//! accept those shapes instead of failing the whole document.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Top-level extraction document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResult {
    pub property: Option<PropertyInfo>,
    pub price_terms: Option<PriceTerms>,
    pub financing: Option<Financing>,
    pub dates: Option<ContractDates>,
    pub settlement: Option<Settlement>,
    pub home_warranty: Option<HomeWarranty>,
    pub property_details: Option<PropertyDetails>,
    pub contingencies: Option<Contingencies>,
    pub parties: Option<Parties>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub special_stipulations: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub contract_form_type: Option<String>,
}

impl ExtractionResult {
    /// Converts the raw JSON returned by the endpoint into the typed record.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyInfo {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub street: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub zip: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub county: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub legal_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTerms {
    #[serde(deserialize_with = "lenient::opt_number")]
    pub offer_price: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub earnest_money: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub earnest_money_holder: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub seller_concessions: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Financing {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub financing_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub loan_amount: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub down_payment: Option<f64>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub down_payment_percent: Option<f64>,
}

/// Contract dates, normalized by the model to `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractDates {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub contract_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub closing_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub possession_date: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub inspection_deadline: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub financing_deadline: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub appraisal_deadline: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settlement {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub title_company: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub closing_attorney: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeWarranty {
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub included: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub paid_by: Option<String>,
    #[serde(deserialize_with = "lenient::opt_number")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDetails {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub year_built: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub includes_fixtures: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub excludes: Option<String>,
}

/// Tri-state contingencies: `Some(true)` active, `Some(false)` explicitly
/// waived, `None` not mentioned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contingencies {
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub inspection: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub appraisal: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub financing: Option<bool>,
    #[serde(deserialize_with = "lenient::opt_bool")]
    pub sale_of_home: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parties {
    #[serde(deserialize_with = "lenient::string_list")]
    pub buyers: Vec<String>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub sellers: Vec<String>,
    pub buyer_agent: Option<Agent>,
    pub listing_agent: Option<Agent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub brokerage: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
}

mod lenient {
    use super::*;

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => first_number(&s),
            _ => None,
        })
    }

    /// Parses the first numeric token in `s`, ignoring thousands separators.
    /// `"Approx. $450,000"` is 450000 and `"$5,000 - $6,000"` is 5000.
    fn first_number(s: &str) -> Option<f64> {
        let start = s.find(|c: char| c.is_ascii_digit())?;
        let negative = s[..start].ends_with('-');

        let token: String = s[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
            .filter(|c| *c != ',')
            .collect();

        let value: f64 = token.trim_end_matches('.').parse().ok()?;
        Some(if negative { -value } else { value })
    }

    pub fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" | "waived" => Some(false),
                _ => None,
            },
            _ => None,
        })
    }

    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Object(obj) => obj
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => vec![s],
            _ => Vec::new(),
        };

        Ok(names
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_all_none() {
        let result = ExtractionResult::from_value(json!({})).unwrap();
        assert_eq!(result, ExtractionResult::default());
    }

    #[test]
    fn full_document_parses() {
        let result = ExtractionResult::from_value(json!({
            "property": {"street": "123 Main St", "city": "Atlanta", "state": "GA", "zip": "30301"},
            "price_terms": {"offer_price": 500000, "earnest_money": 5000},
            "financing": {"financing_type": "Conventional", "loan_amount": 400000, "down_payment": 100000},
            "dates": {"contract_date": "2024-01-05", "closing_date": "2024-02-15"},
            "contingencies": {"inspection": true, "appraisal": false, "financing": null},
            "parties": {
                "buyers": ["Ann Buyer", "Bob Buyer"],
                "sellers": ["Sam Seller"],
                "buyer_agent": {"name": "Jane Agent", "email": "jane@realty.com", "phone": "555-0100"}
            },
            "contract_form_type": "GAR F201"
        }))
        .unwrap();

        let property = result.property.unwrap();
        assert_eq!(property.street.as_deref(), Some("123 Main St"));
        assert_eq!(result.price_terms.unwrap().offer_price, Some(500000.0));
        let contingencies = result.contingencies.unwrap();
        assert_eq!(contingencies.inspection, Some(true));
        assert_eq!(contingencies.appraisal, Some(false));
        assert_eq!(contingencies.financing, None);
        assert_eq!(result.parties.unwrap().buyers.len(), 2);
    }

    #[test]
    fn numeric_strings_are_parsed_as_money() {
        let terms: PriceTerms =
            serde_json::from_value(json!({"offer_price": "$450,000.00", "earnest_money": "n/a"}))
                .unwrap();
        assert_eq!(terms.offer_price, Some(450000.0));
        assert_eq!(terms.earnest_money, None);
    }

    #[test]
    fn abbreviation_periods_are_not_decimal_points() {
        let terms: PriceTerms = serde_json::from_value(json!({
            "offer_price": "Approx. $450,000",
            "earnest_money": "Rs. 5,000",
            "seller_concessions": "USD 3,500."
        }))
        .unwrap();
        assert_eq!(terms.offer_price, Some(450000.0));
        assert_eq!(terms.earnest_money, Some(5000.0));
        assert_eq!(terms.seller_concessions, Some(3500.0));
    }

    #[test]
    fn range_takes_the_first_amount() {
        let terms: PriceTerms =
            serde_json::from_value(json!({"earnest_money": "$5,000 - $6,000"})).unwrap();
        assert_eq!(terms.earnest_money, Some(5000.0));
    }

    #[test]
    fn percent_string_parses() {
        let financing: Financing =
            serde_json::from_value(json!({"down_payment_percent": "20%"})).unwrap();
        assert_eq!(financing.down_payment_percent, Some(20.0));
    }

    #[test]
    fn numeric_zip_becomes_string() {
        let property: PropertyInfo = serde_json::from_value(json!({"zip": 30301})).unwrap();
        assert_eq!(property.zip.as_deref(), Some("30301"));
    }

    #[test]
    fn single_name_is_accepted_as_list() {
        let parties: Parties = serde_json::from_value(json!({"buyers": "Ann Buyer"})).unwrap();
        assert_eq!(parties.buyers, vec!["Ann Buyer".to_string()]);
    }

    #[test]
    fn null_group_is_none() {
        let result = ExtractionResult::from_value(json!({"financing": null})).unwrap();
        assert!(result.financing.is_none());
    }

    #[test]
    fn wrong_group_shape_is_an_error() {
        assert!(ExtractionResult::from_value(json!({"property": "123 Main St"})).is_err());
        assert!(ExtractionResult::from_value(json!([1, 2, 3])).is_err());
    }
}
