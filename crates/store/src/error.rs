use common::{OrderId, ProductId};
use thiserror::Error;

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An order insert collided with an existing payment token.
    /// Tokens are freshly generated UUIDs, so this indicates either a
    /// retried insert or an upstream integrity problem.
    #[error("payment token already in use")]
    DuplicatePaymentToken,

    /// A mutation referenced a product row that does not exist.
    #[error("product not found: {0}")]
    ProductMissing(ProductId),

    /// A mutation referenced an order row that does not exist.
    #[error("order not found: {0}")]
    OrderMissing(OrderId),

    /// A stored value could not be mapped back into a domain type.
    #[error("corrupt stored value: {0}")]
    Decode(String),

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
