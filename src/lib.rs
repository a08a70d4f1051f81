//! xlconnect - connected workbooks for Power Query
//!
//! Generates XLSX files whose table is loaded by an embedded Power Query:
//! - `DataMashup` binary container codec (package, permissions, metadata)
//! - OOXML part synchronization (connection, shared strings, query table, pivot cache)
//! - Grid projection into sheet cells, table columns and defined names
//! - Runs natively and in the browser via WebAssembly
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { generateSingleQueryWorkbook } from 'xlconnect';
//! await init();
//! const bytes = generateSingleQueryWorkbook(
//!   { queryMashup: 'let Source = 1 in Source', queryName: 'Sales', refreshOnOpen: true },
//!   null,
//!   {},
//! );
//! ```

pub mod byte_framer;
pub mod cell_ref;
pub mod date_time;
pub mod error;
pub mod id_gen;
pub mod mashup;
pub mod namespaces;
pub mod naming;
pub mod package;
pub mod sync;
pub mod table;
pub mod template;
pub mod types;
pub mod workbook;
pub mod xml_dom;

use wasm_bindgen::prelude::*;

pub use error::{ErrorKind, Part, Result, ValidationError, XlconnectError};
pub use types::*;
pub use workbook::{generate_single_query_workbook, generate_table_workbook_from_grid, WorkbookGenerator};

fn from_js<T: serde::de::DeserializeOwned + Default>(value: JsValue) -> std::result::Result<T, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Deserialization error: {e}")))
}

fn file_configs_from_js(
    file_configs: JsValue,
    template_file: Option<Vec<u8>>,
) -> std::result::Result<FileConfigs, JsValue> {
    let mut configs: FileConfigs = from_js(file_configs)?;
    configs.template_file = template_file;
    Ok(configs)
}

/// Generate a workbook loaded by a single query.
///
/// `query` is a `QueryInfo` object; `initial_grid` a `Grid` or `null`;
/// `file_configs` a `FileConfigs` object. The template, when given, is passed
/// as raw bytes.
///
/// # Errors
/// Returns the error message when validation or generation fails.
#[wasm_bindgen(js_name = generateSingleQueryWorkbook)]
pub fn generate_single_query_workbook_js(
    query: JsValue,
    initial_grid: JsValue,
    file_configs: JsValue,
    template_file: Option<Vec<u8>>,
) -> std::result::Result<Vec<u8>, JsValue> {
    console_error_panic_hook::set_once();

    let query: QueryInfo = serde_wasm_bindgen::from_value(query)
        .map_err(|e| JsValue::from_str(&format!("Deserialization error: {e}")))?;
    let grid: Option<Grid> = if initial_grid.is_null() || initial_grid.is_undefined() {
        None
    } else {
        Some(from_js(initial_grid)?)
    };
    let configs = file_configs_from_js(file_configs, template_file)?;

    Ok(generate_single_query_workbook(&query, grid.as_ref(), &configs)?)
}

/// Generate a workbook holding a grid as a plain table.
///
/// # Errors
/// Returns the error message when validation or generation fails.
#[wasm_bindgen(js_name = generateTableWorkbookFromGrid)]
pub fn generate_table_workbook_from_grid_js(
    grid: JsValue,
    file_configs: JsValue,
) -> std::result::Result<Vec<u8>, JsValue> {
    console_error_panic_hook::set_once();

    let grid: Grid = from_js(grid)?;
    let configs = file_configs_from_js(file_configs, None)?;

    Ok(generate_table_workbook_from_grid(&grid, &configs)?)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
