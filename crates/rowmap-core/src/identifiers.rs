//! SQL identifier validation.
//!
//! Table and column names are interpolated into statement text (they cannot
//! be bound as parameters), so anything that reaches a statement as an
//! identifier is checked here first.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

fn ident_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

/// Whether `name` is a plain unquoted SQL identifier: a letter or
/// underscore followed by letters, digits, or underscores.
pub fn is_safe_identifier(name: &str) -> bool {
    ident_pattern().is_match(name)
}

/// Validate `name`, rejecting anything that is not a plain identifier.
pub fn check_identifier(name: &str) -> Result<()> {
    if is_safe_identifier(name) {
        Ok(())
    } else {
        tracing::warn!(identifier = name, "rejecting unsafe identifier");
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}
