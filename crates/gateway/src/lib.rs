//! Payment gateway adapter.
//!
//! Speaks the gateway's redirect-and-callback ePay protocol:
//!
//! - [`RedirectForm`] builds the outbound signed form post for an order.
//! - [`decode_callback`] authenticates an inbound success callback
//!   (flat query parameters or a base64 JSON envelope) against the
//!   shared HMAC secret.
//! - [`StatusClient`] re-verifies a transaction against the gateway's
//!   own status endpoint; [`HttpStatusClient`] is the real thing,
//!   [`ScriptedStatusClient`] a test double.
//!
//! The adapter holds no store access and performs no logging; every
//! outcome is an explicit value for the reconciliation workflow to act
//! on. Its only side effect is the status probe's network call.

mod callback;
mod config;
mod error;
mod redirect;
mod signing;
mod status;

pub use callback::{CallbackData, decode_callback};
pub use config::GatewayConfig;
pub use error::{CallbackError, GatewayError, StatusError};
pub use redirect::RedirectForm;
pub use signing::{SIGNED_FIELD_NAMES, canonical_string, sign, verify};
pub use status::{HttpStatusClient, ScriptedStatusClient, StatusClient, StatusReport};
