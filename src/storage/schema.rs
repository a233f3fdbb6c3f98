//! SQL schema definitions as const strings.
//!
//! The row store is a single sheet: an ordered header and rows whose cells
//! are stored as a JSON array aligned to that header.

/// Column names in position order. Written once, by the first append.
pub const CREATE_SHEET_HEADER: &str = r#"
CREATE TABLE IF NOT EXISTS sheet_header (
    position INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
)
"#;

/// Appended rows. `id` order is append order.
pub const CREATE_SHEET_ROWS: &str = r#"
CREATE TABLE IF NOT EXISTS sheet_rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cells TEXT NOT NULL,
    appended_at TEXT NOT NULL
)
"#;

/// Returns all migration statements in order.
pub fn all_migrations() -> Vec<&'static str> {
    vec![CREATE_SHEET_HEADER, CREATE_SHEET_ROWS]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent_statements() {
        for migration in all_migrations() {
            assert!(migration.contains("IF NOT EXISTS"));
        }
    }

    #[test]
    fn rows_are_ordered_by_autoincrement() {
        assert!(CREATE_SHEET_ROWS.contains("AUTOINCREMENT"));
    }
}
