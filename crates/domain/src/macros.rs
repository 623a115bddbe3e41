//! Macro for implementing Display and FromStr for domain enums
//!
//! This macro eliminates boilerplate for enum/string conversions by providing
//! a single implementation for both Display and FromStr traits. It handles
//! case-insensitive parsing and consistent string representation. The queue
//! repository relies on it to round-trip the `kind` and `resource` columns.
//!
//! # Example
//!
//! ```rust
//! use clubsync_domain::impl_domain_string_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum OperationKind {
//!     Create,
//!     Update,
//!     Delete,
//! }
//!
//! impl_domain_string_conversions!(OperationKind {
//!     Create => "create",
//!     Update => "update",
//!     Delete => "delete",
//! });
//! ```

/// Implements Display and FromStr traits for domain enums
///
/// This macro generates:
/// - Display trait: converts enum variants to lowercase strings
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_string_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    // Test enum for macro validation
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestKind {
        Create,
        Update,
        Delete,
    }

    impl_domain_string_conversions!(TestKind {
        Create => "create",
        Update => "update",
        Delete => "delete",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestKind::Create.to_string(), "create");
        assert_eq!(TestKind::Update.to_string(), "update");
        assert_eq!(TestKind::Delete.to_string(), "delete");
    }

    #[test]
    fn test_fromstr_lowercase() {
        assert_eq!(TestKind::from_str("create").unwrap(), TestKind::Create);
        assert_eq!(TestKind::from_str("update").unwrap(), TestKind::Update);
        assert_eq!(TestKind::from_str("delete").unwrap(), TestKind::Delete);
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(TestKind::from_str("Create").unwrap(), TestKind::Create);
        assert_eq!(TestKind::from_str("UPDATE").unwrap(), TestKind::Update);
        assert_eq!(TestKind::from_str("DeLeTe").unwrap(), TestKind::Delete);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = TestKind::from_str("upsert");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid TestKind: upsert"));
    }

    #[test]
    fn test_roundtrip() {
        for kind in [TestKind::Create, TestKind::Update, TestKind::Delete] {
            let string = kind.to_string();
            let parsed = TestKind::from_str(&string).unwrap();
            assert_eq!(kind, parsed);
        }
    }
}
