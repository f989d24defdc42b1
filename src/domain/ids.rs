//! Type-safe identifiers for workflow entities.
//!
//! [`RequestId`] and [`ClaimId`] are newtype wrappers around
//! [`uuid::Uuid`] (v4) so that coverage-request and claim identifiers
//! cannot be confused with each other or with the external shift, user,
//! and care-plan UUIDs owned by collaborating systems.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Returns the short reference token embedded in outbound
            /// messages (first 8 hex characters of the UUID).
            ///
            /// Replies may quote this token back after the keyword so a
            /// single phone number with several pending items can be
            /// correlated unambiguously.
            #[must_use]
            pub fn ref_token(&self) -> String {
                let mut s = self.0.simple().to_string();
                s.truncate(8);
                s
            }

            /// Returns `true` if `token` matches this identifier's
            /// reference token (case-insensitive).
            #[must_use]
            pub fn matches_token(&self, token: &str) -> bool {
                self.ref_token().eq_ignore_ascii_case(token)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

entity_id! {
    /// Unique identifier for a [`super::CoverageRequest`].
    RequestId
}

entity_id! {
    /// Unique identifier for a [`super::CoverageClaim`].
    ClaimId
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_uuid_format() {
        let id = ClaimId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn ref_token_is_eight_hex_chars() {
        let id = RequestId::new();
        let token = id.ref_token();
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn matches_token_is_case_insensitive() {
        let id = RequestId::new();
        let token = id.ref_token().to_uppercase();
        assert!(id.matches_token(&token));
        assert!(!id.matches_token("zzzzzzzz"));
    }

    #[test]
    fn serde_round_trip() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let deserialized: Option<RequestId> = serde_json::from_str(&json).ok();
        assert_eq!(deserialized, Some(id));
    }

    #[test]
    fn request_and_claim_ids_are_distinct_types() {
        let uuid = uuid::Uuid::new_v4();
        let req = RequestId::from_uuid(uuid);
        let claim = ClaimId::from_uuid(uuid);
        assert_eq!(*req.as_uuid(), *claim.as_uuid());
    }
}
