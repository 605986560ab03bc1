use async_trait::async_trait;
use common::{OrderId, PaymentToken, ProductId, UserId};
use domain::{CartEntry, Order, OrderLineItem, OrderStatus, Product};

use crate::error::Result;

/// Read access plus transaction entry point for the marketplace records.
///
/// Plain reads run outside any transaction and see committed state only.
/// Anything that mutates order, stock or cart rows must go through a
/// [`StoreTx`] obtained from [`begin`](MarketStore::begin).
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// The transaction type produced by this store.
    type Tx: StoreTx;

    /// Opens a transaction. Implementations must give the transaction at
    /// least serializable-read behavior for the rows it touches: a
    /// concurrent transaction's stock decrement must be visible before
    /// this one computes its own floor check.
    async fn begin(&self) -> Result<Self::Tx>;

    /// Reads a product by id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Creates or replaces a product listing. The catalog itself is
    /// owned by vendor CRUD outside this core; this exists so deployments
    /// and tests can seed the collaborator.
    async fn upsert_product(&self, product: &Product) -> Result<()>;

    /// Reads all cart entries for a user.
    async fn cart_entries(&self, user: UserId) -> Result<Vec<CartEntry>>;

    /// Creates or replaces the cart entry for `(entry.user, entry.product)`.
    async fn put_cart_entry(&self, entry: &CartEntry) -> Result<()>;

    /// Reads an order by id.
    async fn order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Reads the line items of an order.
    async fn line_items(&self, order: OrderId) -> Result<Vec<OrderLineItem>>;

    /// Reads all orders carrying the given payment token, scoped to the
    /// given user. The token column is unique so more than one row
    /// signals an integrity violation the caller must surface.
    async fn orders_by_payment_token(
        &self,
        user: UserId,
        token: &PaymentToken,
    ) -> Result<Vec<Order>>;

    /// Returns true if at least one line item of the order references a
    /// product listed by the given vendor.
    async fn vendor_supplies_order(&self, order: OrderId, vendor: UserId) -> Result<bool>;
}

/// One atomic unit of work against the store.
///
/// All mutations are staged; nothing becomes visible to readers until
/// [`commit`](StoreTx::commit). Dropping the transaction without
/// committing discards every staged write.
#[async_trait]
pub trait StoreTx: Send {
    /// Reads a product with an exclusive row claim, so a concurrent
    /// transaction's read of the same product serializes behind this one.
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Writes a product's stock count.
    async fn set_product_stock(&mut self, id: ProductId, stock: u32) -> Result<()>;

    /// Inserts a new order row. Fails with
    /// [`StoreError::DuplicatePaymentToken`](crate::StoreError::DuplicatePaymentToken)
    /// if the order carries a token already present on another order.
    async fn insert_order(&mut self, order: &Order) -> Result<()>;

    /// Inserts an order line item.
    async fn insert_line_item(&mut self, item: &OrderLineItem) -> Result<()>;

    /// Reads an order with an exclusive row claim. Status transitions
    /// re-read the order through this method inside the mutating
    /// transaction so duplicate callbacks observe the first one's write.
    async fn order_for_update(&mut self, id: OrderId) -> Result<Option<Order>>;

    /// Writes an order's status.
    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()>;

    /// Deletes all cart entries for a user.
    async fn clear_cart(&mut self, user: UserId) -> Result<()>;

    /// Commits every staged write atomically.
    async fn commit(self) -> Result<()>;
}
