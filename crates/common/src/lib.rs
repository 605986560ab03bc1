//! Shared identifier types used across the marketplace crates.
//!
//! Every entity reference in the system is a UUID newtype so that a
//! product reference can never be handed to an API expecting an order
//! or a user. The payment correlation token gets its own type for the
//! same reason: it looks like any other UUID on the wire but ties an
//! outbound payment redirect to its eventual inbound callback.

mod types;

pub use types::{OrderId, ParseIdError, PaymentToken, ProductId, UserId};
