//! Flattens an extraction result into the fixed 22-column row.

use chrono::{DateTime, Utc};

use crate::domain::{Agent, ContractRow, ExtractionResult};

/// Longest special-stipulations text kept in a row, in characters.
pub const STIPULATIONS_MAX_CHARS: usize = 500;

/// Timestamp format of the "Date Analyzed" column.
pub const ANALYZED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where the document came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageContext {
    pub filename: String,
    pub subject: String,
    pub sender: String,
}

/// Maps an extraction to a row. Missing groups and leaves map to blanks.
pub fn map_row(
    extraction: &ExtractionResult,
    context: &MessageContext,
    analyzed_at: DateTime<Utc>,
) -> ContractRow {
    let property = extraction.property.clone().unwrap_or_default();
    let price = extraction.price_terms.clone().unwrap_or_default();
    let financing = extraction.financing.clone().unwrap_or_default();
    let dates = extraction.dates.clone().unwrap_or_default();
    let settlement = extraction.settlement.clone().unwrap_or_default();
    let contingencies = extraction.contingencies.clone().unwrap_or_default();
    let parties = extraction.parties.clone().unwrap_or_default();
    let buyer_agent = parties.buyer_agent.clone().unwrap_or_default();
    let listing_agent = parties.listing_agent.clone().unwrap_or_default();

    if buyer_agent.email.is_none() {
        tracing::debug!(
            filename = %context.filename,
            sender = %context.sender,
            "No buyer's agent email in document"
        );
    }

    ContractRow {
        date_analyzed: analyzed_at.format(ANALYZED_AT_FORMAT).to_string(),
        property_address: join_address(&[
            &property.street,
            &property.city,
            &property.state,
            &property.zip,
        ]),
        buyers: join_names(&parties.buyers),
        sellers: join_names(&parties.sellers),
        buyers_agent: or_blank(&buyer_agent.name),
        agent_email: or_blank(&buyer_agent.email),
        agent_phone: or_blank(&buyer_agent.phone),
        listing_agent: agent_name(&listing_agent),
        offer_price: price.offer_price,
        financing_type: or_blank(&financing.financing_type),
        loan_amount: financing.loan_amount,
        down_payment: financing.down_payment,
        emd_amount: price.earnest_money,
        inspection: tri_state(contingencies.inspection),
        appraisal: tri_state(contingencies.appraisal),
        financing_contingency: tri_state(contingencies.financing),
        title_company: or_blank(&settlement.title_company),
        contract_date: or_blank(&dates.contract_date),
        closing_date: or_blank(&dates.closing_date),
        possession_date: or_blank(&dates.possession_date),
        special_stipulations: truncate_chars(
            extraction.special_stipulations.as_deref().unwrap_or(""),
            STIPULATIONS_MAX_CHARS,
        ),
        contract_form: or_blank(&extraction.contract_form_type),
    }
}

fn or_blank(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or("").to_string()
}

fn agent_name(agent: &Agent) -> String {
    or_blank(&agent.name)
}

fn join_address(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| p.as_deref().map(str::trim))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Some(true)` is an active contingency, `Some(false)` a waived one.
fn tri_state(value: Option<bool>) -> String {
    match value {
        Some(true) => "Yes",
        Some(false) => "Waived",
        None => "",
    }
    .to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
