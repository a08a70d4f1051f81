//! Projection of a caller-supplied grid into the template's table.
//!
//! [`parse_to_table_data`] validates the grid and derives column names once;
//! [`project_table`] then writes the sheet cells, table columns, query table
//! fields and defined names from that single [`TableData`](crate::types::TableData).

pub mod cell;
pub mod grid;
pub mod writer;

pub use cell::CellValue;
pub use grid::parse_to_table_data;
pub use writer::project_table;
