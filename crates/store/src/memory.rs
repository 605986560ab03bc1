use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PaymentToken, ProductId, UserId};
use domain::{CartEntry, Order, OrderLineItem, OrderStatus, Product};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{Result, StoreError};
use crate::store::{MarketStore, StoreTx};

#[derive(Debug, Clone, Default)]
struct MarketState {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    line_items: Vec<OrderLineItem>,
    cart: Vec<CartEntry>,
}

/// In-memory store implementation for tests and local runs.
///
/// A transaction holds the store's single async mutex for its whole
/// lifetime and mutates a working copy of the state; commit swaps the
/// working copy in, drop discards it. Holding the lock across the
/// transaction makes interleavings serializable: the second of two
/// concurrent checkouts observes the first one's stock write.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MarketState>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    /// Returns the number of persisted line items across all orders.
    pub async fn line_item_count(&self) -> usize {
        self.state.lock().await.line_items.len()
    }
}

/// An open transaction against an [`InMemoryStore`].
pub struct InMemoryTx {
    guard: OwnedMutexGuard<MarketState>,
    work: MarketState,
}

#[async_trait]
impl MarketStore for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<InMemoryTx> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(InMemoryTx { guard, work })
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn upsert_product(&self, product: &Product) -> Result<()> {
        self.state
            .lock()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn cart_entries(&self, user: UserId) -> Result<Vec<CartEntry>> {
        Ok(self
            .state
            .lock()
            .await
            .cart
            .iter()
            .filter(|e| e.user == user)
            .copied()
            .collect())
    }

    async fn put_cart_entry(&self, entry: &CartEntry) -> Result<()> {
        let mut state = self.state.lock().await;
        match state
            .cart
            .iter_mut()
            .find(|e| e.user == entry.user && e.product == entry.product)
        {
            Some(existing) => existing.quantity = entry.quantity,
            None => state.cart.push(*entry),
        }
        Ok(())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn line_items(&self, order: OrderId) -> Result<Vec<OrderLineItem>> {
        Ok(self
            .state
            .lock()
            .await
            .line_items
            .iter()
            .filter(|i| i.order_id == order)
            .cloned()
            .collect())
    }

    async fn orders_by_payment_token(
        &self,
        user: UserId,
        token: &PaymentToken,
    ) -> Result<Vec<Order>> {
        Ok(self
            .state
            .lock()
            .await
            .orders
            .values()
            .filter(|o| o.user == user && o.payment_token.as_ref() == Some(token))
            .cloned()
            .collect())
    }

    async fn vendor_supplies_order(&self, order: OrderId, vendor: UserId) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.line_items.iter().any(|item| {
            item.order_id == order
                && state
                    .products
                    .get(&item.product_id)
                    .is_some_and(|p| p.vendor == vendor)
        }))
    }
}

#[async_trait]
impl StoreTx for InMemoryTx {
    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.work.products.get(&id).cloned())
    }

    async fn set_product_stock(&mut self, id: ProductId, stock: u32) -> Result<()> {
        let product = self
            .work
            .products
            .get_mut(&id)
            .ok_or(StoreError::ProductMissing(id))?;
        product.stock = stock;
        Ok(())
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        if let Some(token) = &order.payment_token
            && self
                .work
                .orders
                .values()
                .any(|o| o.id != order.id && o.payment_token.as_ref() == Some(token))
        {
            return Err(StoreError::DuplicatePaymentToken);
        }
        self.work.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn insert_line_item(&mut self, item: &OrderLineItem) -> Result<()> {
        self.work.line_items.push(item.clone());
        Ok(())
    }

    async fn order_for_update(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.work.orders.get(&id).cloned())
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        let order = self
            .work
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderMissing(id))?;
        order.status = status;
        Ok(())
    }

    async fn clear_cart(&mut self, user: UserId) -> Result<()> {
        self.work.cart.retain(|e| e.user != user);
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        *self.guard = self.work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::Money;

    fn product(stock: u32) -> Product {
        Product::new(
            ProductId::new(),
            UserId::new(),
            "Widget",
            Money::from_cents(1000),
            stock,
        )
    }

    #[tokio::test]
    async fn uncommitted_transaction_leaves_no_trace() {
        let store = InMemoryStore::new();
        let p = product(5);
        store.upsert_product(&p).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_product_stock(p.id, 1).await.unwrap();
            tx.insert_order(&Order::new(UserId::new(), Money::from_cents(100), None))
                .await
                .unwrap();
            // dropped without commit
        }

        assert_eq!(store.product(p.id).await.unwrap().unwrap().stock, 5);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn committed_transaction_is_visible() {
        let store = InMemoryStore::new();
        let p = product(5);
        store.upsert_product(&p).await.unwrap();

        let order = Order::new(UserId::new(), Money::from_cents(100), None);
        let mut tx = store.begin().await.unwrap();
        tx.set_product_stock(p.id, 2).await.unwrap();
        tx.insert_order(&order).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.product(p.id).await.unwrap().unwrap().stock, 2);
        assert!(store.order(order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_payment_token_is_rejected() {
        let store = InMemoryStore::new();
        let token = PaymentToken::new();
        let user = UserId::new();

        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&Order::new(user, Money::from_cents(100), Some(token)))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let result = tx
            .insert_order(&Order::new(user, Money::from_cents(200), Some(token)))
            .await;
        assert!(matches!(result, Err(StoreError::DuplicatePaymentToken)));
    }

    #[tokio::test]
    async fn cart_entries_are_unique_per_user_and_product() {
        let store = InMemoryStore::new();
        let user = UserId::new();
        let product_id = ProductId::new();

        store
            .put_cart_entry(&CartEntry {
                user,
                product: product_id,
                quantity: 1,
            })
            .await
            .unwrap();
        store
            .put_cart_entry(&CartEntry {
                user,
                product: product_id,
                quantity: 3,
            })
            .await
            .unwrap();

        let entries = store.cart_entries(user).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 3);
    }

    #[tokio::test]
    async fn vendor_scoping_checks_line_item_products() {
        let store = InMemoryStore::new();
        let vendor = UserId::new();
        let mut p = product(5);
        p.vendor = vendor;
        store.upsert_product(&p).await.unwrap();

        let order = Order::new(UserId::new(), Money::from_cents(1000), None);
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order).await.unwrap();
        tx.insert_line_item(&OrderLineItem {
            order_id: order.id,
            product_id: p.id,
            quantity: 1,
            unit_price: Money::from_cents(1000),
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert!(store.vendor_supplies_order(order.id, vendor).await.unwrap());
        assert!(
            !store
                .vendor_supplies_order(order.id, UserId::new())
                .await
                .unwrap()
        );
    }
}
