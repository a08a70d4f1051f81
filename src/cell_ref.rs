//! Utilities for building Excel-style A1 cell references and ranges.
//!
//! Every range string written into the sheet, table, query table and defined
//! names is derived here from a [`TableData`] so that they always agree.

use crate::types::TableData;

/// Convert a 0-indexed column into letters (`0` → `A`, `26` → `AA`).
#[must_use]
pub fn col_to_letter(col: u32) -> String {
    let mut result = String::new();
    let mut n = u64::from(col) + 1; // Convert to 1-based
    while n > 0 {
        n -= 1;
        let offset = u8::try_from(n % 26).unwrap_or(0);
        result.insert(0, char::from(b'A' + offset));
        n /= 26;
    }
    result
}

/// Relative reference for a 0-indexed column and 1-based row, e.g. `B3`.
#[must_use]
pub fn cell_reference(col: u32, row: u32) -> String {
    format!("{}{}", col_to_letter(col), row)
}

/// Absolute reference for a 0-indexed column and 1-based row, e.g. `$B$3`.
#[must_use]
pub fn absolute_cell_reference(col: u32, row: u32) -> String {
    format!("${}${}", col_to_letter(col), row)
}

/// Number of columns as `u32`, saturating for absurd widths.
#[must_use]
pub fn column_count(table: &TableData) -> u32 {
    u32::try_from(table.column_names.len()).unwrap_or(u32::MAX)
}

/// Number of sheet rows the table occupies, header included.
///
/// A table without data keeps one blank body row; Excel rejects header-only tables.
#[must_use]
pub fn sheet_row_count(table: &TableData) -> u32 {
    u32::try_from(table.rows.len().max(1))
        .unwrap_or(u32::MAX)
        .saturating_add(1)
}

/// Bottom-right cell of the table, header row included.
#[must_use]
pub fn last_cell(table: &TableData) -> (u32, u32) {
    (column_count(table).saturating_sub(1), sheet_row_count(table))
}

/// Relative range covering header and data rows, e.g. `A1:B2`.
#[must_use]
pub fn table_range(table: &TableData) -> String {
    let (col, row) = last_cell(table);
    format!("A1:{}", cell_reference(col, row))
}

/// Absolute range covering header and data rows, e.g. `$A$1:$B$2`.
#[must_use]
pub fn absolute_table_range(table: &TableData) -> String {
    let (col, row) = last_cell(table);
    format!(
        "{}:{}",
        absolute_cell_reference(0, 1),
        absolute_cell_reference(col, row)
    )
}

/// Quote a sheet name for use in a formula reference when needed.
///
/// Names made only of ASCII letters, digits and underscores (not starting with
/// a digit) are used as-is; anything else is wrapped in single quotes with
/// embedded quotes doubled.
#[must_use]
pub fn quote_sheet_name(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}
