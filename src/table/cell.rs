//! Typing of stringified grid values for sheet cells.

use crate::date_time::to_excel_serial;
use crate::xml_dom::Element;

/// A typed value ready to be written into a `<c>` element.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Boolean(bool),
    /// Inline string (`t="str"`).
    Text(String),
}

impl CellValue {
    /// Type a stringified value. Empty strings produce no cell.
    ///
    /// Finite numbers stay numeric, `true`/`false` become booleans and
    /// recognized date or time literals become serial numbers.
    #[must_use]
    pub fn from_text(value: &str) -> Option<Self> {
        if value.is_empty() {
            return None;
        }
        let trimmed = value.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Some(Self::Number(n));
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Some(Self::Boolean(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Some(Self::Boolean(false));
        }
        if let Some(serial) = to_excel_serial(trimmed) {
            return Some(Self::Number(serial));
        }
        Some(Self::Text(value.to_string()))
    }

    /// `<c r="…">` element holding this value.
    #[must_use]
    pub fn to_cell(&self, reference: &str) -> Element {
        let cell = Element::new("c").with_attr("r", reference);
        match self {
            Self::Number(n) => cell.with_child(Element::new("v").with_text(n.to_string())),
            Self::Boolean(b) => cell
                .with_attr("t", "b")
                .with_child(Element::new("v").with_text(if *b { "1" } else { "0" })),
            Self::Text(s) => cell
                .with_attr("t", "str")
                .with_child(Element::new("v").with_text(s.as_str())),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("42", CellValue::Number(42.0))]
    #[test_case("-1.5", CellValue::Number(-1.5))]
    #[test_case("TRUE", CellValue::Boolean(true))]
    #[test_case("false", CellValue::Boolean(false))]
    #[test_case("1/1/2000", CellValue::Number(36526.0))]
    #[test_case("NaN", CellValue::Text("NaN".into()))]
    #[test_case("inf", CellValue::Text("inf".into()))]
    #[test_case("hello", CellValue::Text("hello".into()))]
    #[test_case("2/30/1996", CellValue::Text("2/30/1996".into()))]
    fn test_from_text(input: &str, expected: CellValue) {
        assert_eq!(CellValue::from_text(input), Some(expected));
    }

    #[test]
    fn test_empty_is_skipped() {
        assert_eq!(CellValue::from_text(""), None);
    }

    #[test]
    fn test_to_cell() {
        let cell = CellValue::Boolean(true).to_cell("B2");
        assert_eq!(cell.attr("r"), Some("B2"));
        assert_eq!(cell.attr("t"), Some("b"));
        assert_eq!(cell.child("v").unwrap().text(), "1");

        let cell = CellValue::Number(0.5).to_cell("A3");
        assert_eq!(cell.attr("t"), None);
        assert_eq!(cell.child("v").unwrap().text(), "0.5");
    }
}
