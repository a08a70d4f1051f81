//! Naming rules for query names and table column names.
//!
//! Column names are deduplicated silently by appending ` (n)`. Query names
//! are validated and collisions across a batch are rejected outright.

use std::collections::HashSet;

use crate::error::{Result, ValidationError};

/// Query name used when the caller does not provide one.
pub const DEFAULT_QUERY_NAME: &str = "Query1";

/// Column name token used for empty headers.
pub const DEFAULT_COLUMN_NAME: &str = "Column";

/// Maximum query name length accepted by Excel.
pub const MAX_QUERY_NAME_LENGTH: usize = 80;

/// Return `candidate` if unused, otherwise the first `"{candidate} (n)"`, n ≥ 1, that is.
pub fn get_next_available_name<S: AsRef<str>>(existing: &[S], candidate: &str) -> String {
    let used: HashSet<&str> = existing.iter().map(AsRef::as_ref).collect();
    next_available(|name| used.contains(name), candidate)
}

fn next_available(is_used: impl Fn(&str) -> bool, candidate: &str) -> String {
    if !is_used(candidate) {
        return candidate.to_string();
    }
    let mut n = 1usize;
    loop {
        let name = format!("{candidate} ({n})");
        if !is_used(&name) {
            return name;
        }
        n += 1;
    }
}

/// Deduplicate header names in order. Empty names become [`DEFAULT_COLUMN_NAME`].
pub fn adjust_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let base = if name.is_empty() {
            DEFAULT_COLUMN_NAME
        } else {
            name
        };
        let next = next_available(|candidate| used.contains(candidate), base);
        used.insert(next.clone());
        out.push(next);
    }
    out
}

/// Check header names without adjusting them.
///
/// The first empty or repeated name fails with `InvalidColumnName`.
pub fn validate_column_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if name.is_empty() || !seen.insert(name) {
            return Err(ValidationError::InvalidColumnName(name.to_string()).into());
        }
    }
    Ok(())
}

/// Validate a single query name.
pub fn validate_query_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyQueryName.into());
    }
    if name.chars().count() > MAX_QUERY_NAME_LENGTH {
        return Err(ValidationError::QueryNameTooLong {
            max: MAX_QUERY_NAME_LENGTH,
        }
        .into());
    }
    if name.contains(['.', '"']) {
        return Err(ValidationError::QueryNameInvalidChars.into());
    }
    Ok(())
}

/// Canonical comparison form of a query name: trimmed, inner whitespace
/// collapsed to single spaces, lowercased.
#[must_use]
pub fn canonical_query_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Validate a batch of query names and reject any two that canonicalize the same.
pub fn ensure_unique_query_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        validate_query_name(name)?;
        if !seen.insert(canonical_query_name(name)) {
            return Err(ValidationError::DuplicateQueryName(name.trim().to_string()).into());
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, XlconnectError};

    #[test]
    fn test_next_available_name() {
        assert_eq!(
            get_next_available_name(&["Column", "Column (1)"], "Column"),
            "Column (2)"
        );
        assert_eq!(get_next_available_name(&["A"], "B"), "B");
        let empty: [&str; 0] = [];
        assert_eq!(get_next_available_name(&empty, "A"), "A");
    }

    #[test]
    fn test_adjust_column_names() {
        assert_eq!(adjust_column_names(&["A", "A", "B"]), vec!["A", "A (1)", "B"]);
        assert_eq!(
            adjust_column_names(&["", "", "Column"]),
            vec!["Column", "Column (1)", "Column (2)"]
        );
        // a literal suffix already present is respected
        assert_eq!(
            adjust_column_names(&["A (1)", "A", "A"]),
            vec!["A (1)", "A", "A (2)"]
        );
    }

    #[test]
    fn test_adjust_wide_header_row() {
        let names = vec!["A"; 2000];
        let adjusted = adjust_column_names(&names);
        assert_eq!(adjusted[0], "A");
        assert_eq!(adjusted[1999], "A (1999)");
        let unique: HashSet<&String> = adjusted.iter().collect();
        assert_eq!(unique.len(), 2000);
    }

    #[test]
    fn test_validate_column_names() {
        assert!(validate_column_names(&["A", "B"]).is_ok());
        let err = validate_column_names(&["A", "A"]).unwrap_err();
        assert!(matches!(
            err,
            XlconnectError::Validation(ValidationError::InvalidColumnName(ref n)) if n == "A"
        ));
        assert!(validate_column_names(&["A", ""]).is_err());
    }

    #[test]
    fn test_validate_query_name() {
        assert!(validate_query_name("Query1").is_ok());
        assert!(validate_query_name("na]me").is_ok());
        assert_eq!(
            validate_query_name("  ").unwrap_err().kind(),
            ErrorKind::Validation
        );
        assert!(validate_query_name("a.b").is_err());
        assert!(validate_query_name("a\"b").is_err());
        assert!(validate_query_name(&"x".repeat(80)).is_ok());
        assert!(validate_query_name(&"x".repeat(81)).is_err());
    }

    #[test]
    fn test_duplicate_query_names_rejected() {
        assert!(ensure_unique_query_names(&["Sales", "Costs"]).is_ok());
        let err = ensure_unique_query_names(&["Sales", "  sales "]).unwrap_err();
        assert!(matches!(
            err,
            XlconnectError::Validation(ValidationError::DuplicateQueryName(ref n)) if n == "sales"
        ));
        assert!(ensure_unique_query_names(&["My  Query", "my query"]).is_err());
    }
}
