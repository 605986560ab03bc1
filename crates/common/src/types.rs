use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier cannot be parsed from a string.
#[derive(Debug, thiserror::Error)]
#[error("invalid {kind} identifier: {value:?}")]
pub struct ParseIdError {
    kind: &'static str,
    value: String,
}

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $kind:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|_| ParseIdError {
                    kind: $kind,
                    value: s.to_string(),
                })
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user account (shopper or vendor).
    UserId,
    "user"
);

uuid_id!(
    /// Unique identifier for a product listing.
    ProductId,
    "product"
);

uuid_id!(
    /// Unique identifier for a placed order.
    OrderId,
    "order"
);

uuid_id!(
    /// External-payment correlation token.
    ///
    /// Generated once per gateway-path order, globally unique, and
    /// immutable after the order row is written. The payment gateway
    /// echoes it back in callbacks as `transaction_uuid`, which is how
    /// an inbound callback is matched to its order.
    PaymentToken,
    "payment token"
);
