//! Grid validation and column-name derivation.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::naming::adjust_column_names;
use crate::types::{Grid, GridValue, TableData};

/// Validate `grid` and split it into column names and stringified rows.
///
/// Checks run in order: rectangular shape, promotable when promoting, and
/// unique non-empty headers when promoting without adjustment.
pub fn parse_to_table_data(grid: &Grid) -> Result<TableData> {
    let rows: &[Vec<GridValue>] = if grid.data.iter().all(Vec::is_empty) {
        &[]
    } else {
        &grid.data
    };

    let width = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != width) {
        return Err(ValidationError::ArrayIsntMxN.into());
    }

    let config = grid.config;
    let (column_names, data_rows) = match rows.split_first() {
        _ if !config.promote_headers => (synthesized_names(width), rows),
        None => return Err(ValidationError::PromoteHeadersUnsupportedForEmptyGrid.into()),
        Some((header, rest)) => {
            let names: Vec<String> = header.iter().map(GridValue::to_text).collect();
            if config.adjust_column_names {
                (adjust_column_names(&names), rest)
            } else {
                if !headers_promotable(&names) {
                    return Err(
                        ValidationError::HeadersCannotBePromotedWithoutAdjustingNames.into(),
                    );
                }
                (names, rest)
            }
        }
    };

    let rows: Vec<Vec<String>> = data_rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(GridValue::to_text).collect();
            cells.resize(column_names.len(), String::new());
            cells
        })
        .collect();

    debug!(
        columns = column_names.len(),
        rows = rows.len(),
        promoted = config.promote_headers,
        "parsed grid"
    );
    Ok(TableData { column_names, rows })
}

/// `Column 1`, `Column 2`, …; an empty grid still gets one column.
fn synthesized_names(width: usize) -> Vec<String> {
    (1..=width.max(1)).map(|i| format!("Column {i}")).collect()
}

fn headers_promotable(names: &[String]) -> bool {
    let mut seen = HashSet::with_capacity(names.len());
    names.iter().all(|n| !n.is_empty() && seen.insert(n.as_str()))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::error::XlconnectError;
    use crate::types::GridConfig;

    fn promoted(adjust: bool) -> GridConfig {
        GridConfig {
            promote_headers: true,
            adjust_column_names: adjust,
        }
    }

    fn validation(err: XlconnectError) -> ValidationError {
        match err {
            XlconnectError::Validation(v) => v,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_synthesized_columns() {
        let grid = Grid::from_strings([["a", "b"], ["c", "d"]]);
        let table = parse_to_table_data(&grid).unwrap();
        assert_eq!(table.column_names, vec!["Column 1", "Column 2"]);
        assert_eq!(table.rows, vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_promoted_headers_deduplicated() {
        let grid = Grid::new(vec![
            vec!["A".into(), GridValue::Null, "A".into()],
            vec![1.0_f64.into(), true.into(), GridValue::Null],
        ])
        .with_config(promoted(true));
        let table = parse_to_table_data(&grid).unwrap();
        assert_eq!(table.column_names, vec!["A", "Column", "A (1)"]);
        assert_eq!(table.rows, vec![vec!["1", "true", ""]]);
    }

    #[test]
    fn test_ragged_grid_rejected_first() {
        // also violates the header rules; shape is checked first
        let grid = Grid::from_strings(vec![vec!["a", "a"], vec!["b"]]).with_config(promoted(false));
        assert_eq!(
            validation(parse_to_table_data(&grid).unwrap_err()),
            ValidationError::ArrayIsntMxN
        );

        let grid = Grid::from_strings(vec![vec!["a"], vec![]]);
        assert_eq!(
            validation(parse_to_table_data(&grid).unwrap_err()),
            ValidationError::ArrayIsntMxN
        );
    }

    #[test]
    fn test_promote_empty_grid_rejected() {
        let grid = Grid::default().with_config(promoted(false));
        assert_eq!(
            validation(parse_to_table_data(&grid).unwrap_err()),
            ValidationError::PromoteHeadersUnsupportedForEmptyGrid
        );
    }

    #[test]
    fn test_duplicate_headers_without_adjust_rejected() {
        let grid = Grid::from_strings([["x", "x"], ["1", "2"]]).with_config(promoted(false));
        assert_eq!(
            validation(parse_to_table_data(&grid).unwrap_err()),
            ValidationError::HeadersCannotBePromotedWithoutAdjustingNames
        );
        let grid = Grid::from_strings([["x", ""], ["1", "2"]]).with_config(promoted(false));
        assert_eq!(
            validation(parse_to_table_data(&grid).unwrap_err()),
            ValidationError::HeadersCannotBePromotedWithoutAdjustingNames
        );
    }

    #[test]
    fn test_unique_headers_without_adjust_kept() {
        let grid = Grid::from_strings([["x", "y"]]).with_config(promoted(false));
        let table = parse_to_table_data(&grid).unwrap();
        assert_eq!(table.column_names, vec!["x", "y"]);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_empty_grid_gets_single_column() {
        let table = parse_to_table_data(&Grid::default()).unwrap();
        assert_eq!(table.column_names, vec!["Column 1"]);
        assert!(table.rows.is_empty());
    }
}
