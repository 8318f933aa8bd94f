//! Validation for schema names interpolated into `SET search_path`.

use chainnote_core::{Error, Result};

const RESERVED: &[&str] = &[
    "pg_catalog",
    "information_schema",
    "pg_toast",
    "select",
    "insert",
    "update",
    "delete",
    "drop",
    "create",
    "alter",
    "grant",
    "revoke",
    "truncate",
];

/// Validate a PostgreSQL schema name before it is placed in SQL text.
///
/// Names must be 1..=63 ASCII characters, start with a letter or underscore,
/// contain only letters, digits, and underscores, and must not be a system
/// schema or a common SQL keyword.
///
/// ```
/// use chainnote_db::validate_schema_name;
///
/// assert!(validate_schema_name("tenant_2024").is_ok());
/// assert!(validate_schema_name("1tenant").is_err());
/// ```
pub fn validate_schema_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidInput(
            "Schema name cannot be empty".to_string(),
        ));
    }

    if name.len() > 63 {
        return Err(Error::InvalidInput(format!(
            "Schema name exceeds 63 character limit: {} characters",
            name.len()
        )));
    }

    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_ok {
        return Err(Error::InvalidInput(format!(
            "Schema name must start with a letter or underscore: '{}'",
            name
        )));
    }

    if let Some(bad) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_')
    {
        return Err(Error::InvalidInput(format!(
            "Schema name contains invalid character: '{}'",
            bad
        )));
    }

    if RESERVED.contains(&name.to_lowercase().as_str()) {
        return Err(Error::InvalidInput(format!(
            "Schema name '{}' is reserved",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["public", "tenant_a", "_private", "Test_Schema_123", "a"] {
            assert!(validate_schema_name(name).is_ok(), "{} should be valid", name);
        }
    }

    #[test]
    fn test_empty_name() {
        match validate_schema_name("") {
            Err(Error::InvalidInput(msg)) => assert!(msg.contains("empty")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_too_long() {
        assert!(validate_schema_name(&"a".repeat(63)).is_ok());
        assert!(validate_schema_name(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_injection_attempts() {
        assert!(validate_schema_name("x; DROP TABLE notes").is_err());
        assert!(validate_schema_name("x'--").is_err());
        assert!(validate_schema_name("9lives").is_err());
    }

    #[test]
    fn test_reserved_case_insensitive() {
        assert!(validate_schema_name("PG_CATALOG").is_err());
        assert!(validate_schema_name("Drop").is_err());
    }
}
