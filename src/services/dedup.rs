//! Duplicate detection on (address, contract date).

use crate::domain::{cell_text, normalize_address, ContractRow};
use crate::storage::{Result, RowStore};

/// Returns true if a stored row already covers this address and date.
///
/// An empty address never matches. An empty contract date matches any
/// stored date for the same address.
pub async fn is_duplicate(
    store: &dyn RowStore,
    address: &str,
    contract_date: &str,
) -> Result<bool> {
    let address = normalize_address(address);
    if address.is_empty() {
        return Ok(false);
    }
    let contract_date = contract_date.trim();

    let rows = store.rows().await?;
    Ok(rows.iter().any(|row| {
        normalize_address(&cell_text(row.get(ContractRow::ADDRESS_COLUMN))) == address
            && (contract_date.is_empty()
                || cell_text(row.get(ContractRow::CONTRACT_DATE_COLUMN)) == contract_date)
    }))
}
