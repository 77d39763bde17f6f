//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Longest address accepted, per the RFC 5321 path limit.
const MAX_LEN: usize = 254;

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email address is empty")]
    Empty,
    /// The input string exceeds the length limit.
    #[error("email address is longer than {} characters", MAX_LEN)]
    TooLong,
    /// The input does not have the `name@host` shape.
    #[error("email address must look like name@host")]
    Malformed,
}

/// A structurally valid email address.
///
/// Validation is shallow on purpose: registration only needs to reject
/// obvious junk, the same way a browser's `type="email"` input does. An
/// address passes when it is non-empty, within the length limit, free of
/// whitespace, and splits into a non-empty name and host around an `@`.
/// The address is kept exactly as submitted, so comparison and storage
/// are case-sensitive.
///
/// ```
/// use tripquest_core::Email;
///
/// assert!(Email::parse("ada@example.com").is_ok());
/// assert!(Email::parse("ada+trips@mail.example.co").is_ok());
///
/// assert!(Email::parse("ada.example.com").is_err()); // no @
/// assert!(Email::parse("ada @example.com").is_err()); // whitespace
/// assert!(Email::parse("@example.com").is_err()); // no name
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] or [`EmailError::TooLong`] for inputs
    /// outside the accepted length, and [`EmailError::Malformed`] for
    /// anything that does not split into `name@host` or that contains
    /// whitespace.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        if input.is_empty() {
            return Err(EmailError::Empty);
        }
        if input.len() > MAX_LEN {
            return Err(EmailError::TooLong);
        }
        if input.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed);
        }
        match input.split_once('@') {
            Some((name, host)) if !name.is_empty() && !host.is_empty() => {
                Ok(Self(input.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Postgres column mapping for the optional sqlx integration. Reads do not
// re-validate; repositories that want corruption checks parse the raw
// string themselves.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_tagged_addresses() {
        for input in [
            "ada@example.com",
            "ada.lovelace@example.com",
            "ada+trips@example.com",
            "ada@mail.lagos.example.com",
            "a@b",
        ] {
            assert!(Email::parse(input).is_ok(), "rejected {input}");
        }
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_length_limit_is_exact() {
        let host = "@example.com";
        let fits = format!("{}{host}", "a".repeat(MAX_LEN - host.len()));
        let overflows = format!("{}{host}", "a".repeat(MAX_LEN - host.len() + 1));

        assert!(Email::parse(&fits).is_ok());
        assert_eq!(Email::parse(&overflows), Err(EmailError::TooLong));
    }

    #[test]
    fn test_rejects_missing_at() {
        assert_eq!(Email::parse("ada.example.com"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_rejects_empty_name_or_host() {
        assert_eq!(Email::parse("@example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ada@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_rejects_whitespace() {
        assert_eq!(Email::parse("ada @example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse(" ada@example.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ada@example.com\n"), Err(EmailError::Malformed));
    }

    #[test]
    fn test_preserves_submitted_casing() {
        let email = Email::parse("Ada@Example.COM").unwrap();
        assert_eq!(email.as_str(), "Ada@Example.COM");
        assert_ne!(email, Email::parse("ada@example.com").unwrap());
    }

    #[test]
    fn test_display_matches_input() {
        let email = Email::parse("ada@example.com").unwrap();
        assert_eq!(email.to_string(), "ada@example.com");
    }

    #[test]
    fn test_serde_is_transparent() {
        let email = Email::parse("ada@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"ada@example.com\"");
        assert_eq!(serde_json::from_str::<Email>(&json).unwrap(), email);
    }

    #[test]
    fn test_from_str() {
        let email: Email = "ada@example.com".parse().unwrap();
        assert_eq!(email.as_str(), "ada@example.com");
    }
}
