//! Authorization schemes
//!
//! The management APIs accept two header conventions: `Bearer <token>` for
//! calls made on behalf of a user, and `Thing <secret>` for calls made by a
//! device presenting its external key. Which one an operation uses is part
//! of its catalog entry, not a decision made at the call site.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::error::ValidationError;

/// Authorization header convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// User access token
    #[default]
    Bearer,
    /// Device external key
    Thing,
}

impl AuthScheme {
    /// Scheme word placed in front of the secret
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Bearer => "Bearer",
            Self::Thing => "Thing",
        }
    }

    /// Name of the caller-supplied argument, used in validation messages
    pub fn argument_name(self) -> &'static str {
        match self {
            Self::Bearer => "token",
            Self::Thing => "external_key",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A credential carried by a single call.
///
/// Credentials are never stored on the client; every operation takes one.
/// Security: `Debug` redacts the secret so descriptors can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    scheme: AuthScheme,
    secret: String,
}

impl Credential {
    /// Validate an untyped credential argument for the given scheme.
    ///
    /// Missing, null, non-string and empty values are all rejected.
    pub fn from_value(scheme: AuthScheme, value: Option<&Value>) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidCredential {
            name: scheme.argument_name(),
        };

        match value {
            Some(Value::String(s)) if !s.is_empty() => Ok(Self {
                scheme,
                secret: s.clone(),
            }),
            _ => Err(invalid()),
        }
    }

    /// Value of the `Authorization` header
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme.prefix(), self.secret)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn credential(scheme: AuthScheme, secret: &str) -> Credential {
        Credential::from_value(scheme, Some(&json!(secret))).unwrap()
    }

    #[test]
    fn test_header_values() {
        assert_eq!(credential(AuthScheme::Bearer, "abc").header_value(), "Bearer abc");
        assert_eq!(credential(AuthScheme::Thing, "012").header_value(), "Thing 012");
    }

    #[test]
    fn test_from_value_rejects_non_strings() {
        for bad in [json!(null), json!(42), json!(["t"]), json!({}), json!("")] {
            let err = Credential::from_value(AuthScheme::Bearer, Some(&bad)).unwrap_err();
            assert_eq!(err, ValidationError::InvalidCredential { name: "token" });
        }
        let err = Credential::from_value(AuthScheme::Thing, None).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidCredential {
                name: "external_key"
            }
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", credential(AuthScheme::Bearer, "super-secret"));
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("Bearer"));
    }
}
