//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, ReconcileError, VendorError};
use domain::RoleError;
use gateway::CallbackError;

/// API-level error type that maps to HTTP responses.
///
/// Business failures carry a `redirect_to` hint: the page the client
/// can safely send the shopper back to (their cart, or the checkout
/// screen). Internal failures are logged server-side and answer with a
/// generic 500 that leaks nothing.
#[derive(Debug)]
pub enum ApiError {
    /// Request is missing or carries malformed identity headers.
    Unauthorized(String),
    /// The caller's role does not allow the operation.
    Forbidden(String),
    /// Resource not found (or deliberately presented as such).
    NotFound(String),
    /// Bad request from the client, with a safe recovery page.
    BadRequest {
        message: String,
        redirect_to: &'static str,
    },
    /// Stored records are in a state that must not be auto-resolved.
    Conflict(String),
    /// Internal failure; details stay in the logs.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, redirect_to) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest {
                message,
                redirect_to,
            } => (StatusCode::BAD_REQUEST, message, Some(redirect_to)),
            ApiError::Conflict(msg) => {
                tracing::error!(error = %msg, "record conflict");
                (StatusCode::CONFLICT, msg, None)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                    None,
                )
            }
        };

        let body = match redirect_to {
            Some(page) => serde_json::json!({ "error": message, "redirect_to": page }),
            None => serde_json::json!({ "error": message }),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<RoleError> for ApiError {
    fn from(err: RoleError) -> Self {
        ApiError::Forbidden(err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::ProductNotFound(_) => ApiError::NotFound(err.to_string()),
            CheckoutError::EmptyCart
            | CheckoutError::InsufficientStock { .. }
            | CheckoutError::InvalidQuantity
            | CheckoutError::NoLineItems => ApiError::BadRequest {
                message: err.to_string(),
                redirect_to: "/cart",
            },
            CheckoutError::Gateway(_) | CheckoutError::Store(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match &err {
            ReconcileError::Callback(CallbackError::Gateway(_)) | ReconcileError::Store(_) => {
                ApiError::Internal(err.to_string())
            }
            ReconcileError::AmbiguousOrder { .. } => ApiError::Conflict(err.to_string()),
            ReconcileError::OrderNotFound { .. } => ApiError::NotFound(err.to_string()),
            ReconcileError::Callback(_)
            | ReconcileError::MalformedAmount(_)
            | ReconcileError::AmountMismatch { .. } => ApiError::BadRequest {
                message: err.to_string(),
                redirect_to: "/checkout",
            },
        }
    }
}

impl From<VendorError> for ApiError {
    fn from(err: VendorError) -> Self {
        match &err {
            VendorError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),
            VendorError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<store::StoreError> for ApiError {
    fn from(err: store::StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
