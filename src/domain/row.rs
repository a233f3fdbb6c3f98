//! The fixed-schema row persisted per analyzed document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row as the store sees it: column name to cell value, in column order.
pub type Record = Map<String, Value>;

/// One flattened purchase agreement.
///
/// Field order matches [`ContractRow::HEADERS`]; [`ContractRow::to_record`]
/// is the only place the mapping between the two is written down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractRow {
    pub date_analyzed: String,
    pub property_address: String,
    pub buyers: String,
    pub sellers: String,
    pub buyers_agent: String,
    pub agent_email: String,
    pub agent_phone: String,
    pub listing_agent: String,
    pub offer_price: Option<f64>,
    pub financing_type: String,
    pub loan_amount: Option<f64>,
    pub down_payment: Option<f64>,
    pub emd_amount: Option<f64>,
    pub inspection: String,
    pub appraisal: String,
    pub financing_contingency: String,
    pub title_company: String,
    pub contract_date: String,
    pub closing_date: String,
    pub possession_date: String,
    pub special_stipulations: String,
    pub contract_form: String,
}

impl ContractRow {
    /// Column names of the persisted table, in order.
    pub const HEADERS: [&'static str; 22] = [
        "Date Analyzed",
        "Property Address",
        "Buyers",
        "Sellers",
        "Buyer's Agent",
        "Agent Email",
        "Agent Phone",
        "Listing Agent",
        "Offer Price",
        "Financing Type",
        "Loan Amount",
        "Down Payment",
        "EMD Amount",
        "Inspection",
        "Appraisal",
        "Financing Contingency",
        "Title Company",
        "Contract Date",
        "Closing Date",
        "Possession Date",
        "Special Stipulations",
        "Contract Form",
    ];

    pub const ADDRESS_COLUMN: &'static str = "Property Address";
    pub const CONTRACT_DATE_COLUMN: &'static str = "Contract Date";

    /// Translates the typed row into a store record keyed by column name.
    ///
    /// Missing text is an empty string and missing money is an empty string
    /// rather than zero, so the sheet shows a blank cell.
    pub fn to_record(&self) -> Record {
        let values = [
            text(&self.date_analyzed),
            text(&self.property_address),
            text(&self.buyers),
            text(&self.sellers),
            text(&self.buyers_agent),
            text(&self.agent_email),
            text(&self.agent_phone),
            text(&self.listing_agent),
            money(self.offer_price),
            text(&self.financing_type),
            money(self.loan_amount),
            money(self.down_payment),
            money(self.emd_amount),
            text(&self.inspection),
            text(&self.appraisal),
            text(&self.financing_contingency),
            text(&self.title_company),
            text(&self.contract_date),
            text(&self.closing_date),
            text(&self.possession_date),
            text(&self.special_stipulations),
            text(&self.contract_form),
        ];

        Self::HEADERS
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

fn text(value: &str) -> Value {
    Value::String(value.to_string())
}

fn money(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(|n| {
            // Whole-dollar amounts are stored as integers so they render as 500000, not 500000.0.
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Value::from(f as i64),
                _ => Value::Number(n),
            }
        })
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Normalized form of an address used as the dedup key.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Renders a stored cell as trimmed text for comparisons.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
