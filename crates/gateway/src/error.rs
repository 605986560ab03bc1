//! Gateway adapter error types.

use thiserror::Error;

/// Errors raised while building signed gateway requests.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HMAC signer rejected the configured secret.
    #[error("failed to build signature: {0}")]
    Signing(String),
}

/// Errors raised while decoding an inbound payment callback.
///
/// A [`SignatureMismatch`](CallbackError::SignatureMismatch) is a
/// tampering signal: the caller must log it and must not touch any
/// order state.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Neither the flat parameter form nor the `data` envelope was present,
    /// or a required field was missing from whichever form arrived.
    #[error("missing required callback parameters")]
    MissingParameters,

    /// The `data` envelope was not valid base64-encoded JSON.
    #[error("malformed callback data: {0}")]
    InvalidData(String),

    /// The envelope's signature did not match the recomputed HMAC.
    #[error("callback signature mismatch")]
    SignatureMismatch,

    /// The signer failed while recomputing the envelope signature.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Errors raised by the transaction-status probe.
#[derive(Debug, Clone, Error)]
pub enum StatusError {
    /// The request exceeded the configured timeout.
    #[error("status request timed out")]
    Timedout,

    /// The gateway could not be reached.
    #[error("status endpoint unreachable: {0}")]
    Unreachable(String),

    /// The gateway answered with a non-success HTTP status.
    #[error("status endpoint returned HTTP {0}")]
    Http(u16),

    /// The response body was not the expected JSON shape.
    #[error("malformed status response: {0}")]
    Malformed(String),

    /// The signer failed while signing the probe.
    #[error("failed to sign status request: {0}")]
    Signing(String),
}

impl StatusError {
    /// True for transport-level failures (timeout, connection refused),
    /// which are recoverable and may trigger the callback-trust
    /// fallback. Protocol-level failures (HTTP errors, unparseable
    /// bodies) are answers, just not the one we wanted, and never
    /// qualify for the fallback.
    pub fn is_transport(&self) -> bool {
        matches!(self, StatusError::Timedout | StatusError::Unreachable(_))
    }
}
