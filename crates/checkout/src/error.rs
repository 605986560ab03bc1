//! Workflow error types.

use common::{OrderId, ProductId};
use gateway::{CallbackError, GatewayError};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while aggregating a cart or placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The shopper tried to check out with no cart entries.
    #[error("your cart is empty")]
    EmptyCart,

    /// A requested product does not exist.
    #[error("product not found")]
    ProductNotFound(ProductId),

    /// A line asked for more units than are in stock.
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        name: String,
        requested: u32,
        available: u32,
    },

    /// A line carried a zero quantity.
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// The assembler was handed an empty line list.
    #[error("order has no line items")]
    NoLineItems,

    /// Building the signed redirect failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur while reconciling a payment callback.
///
/// Everything here means no confirmation happened; variants other than
/// `Store` indicate either a forged/tampered callback or an upstream
/// integrity problem, and are logged as such by the workflow.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The callback could not be decoded or failed signature
    /// verification.
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// No order of this user carries the callback's payment token.
    #[error("no order found for payment token {token:?}")]
    OrderNotFound { token: String },

    /// More than one order carries the token: an integrity violation
    /// that must be surfaced, never resolved by picking one.
    #[error("multiple orders found for payment token {token:?}")]
    AmbiguousOrder { token: String },

    /// The callback's amount string was not an exact decimal amount.
    #[error("malformed callback amount {0:?}")]
    MalformedAmount(String),

    /// The callback's amount differs from the order's stored total.
    #[error("callback amount {claimed} does not match order total {expected}")]
    AmountMismatch { claimed: String, expected: String },

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur while applying a vendor order action.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The order does not exist or contains none of this vendor's
    /// products. The two cases are indistinguishable on purpose.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
