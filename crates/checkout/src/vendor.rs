//! Vendor-driven order actions.

use common::OrderId;
use domain::{OrderStatus, Vendor};
use serde::{Deserialize, Serialize};
use store::{MarketStore, StoreTx};

use crate::error::VendorError;

/// An action a vendor can take on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorAction {
    Accept,
    Cancel,
    Ship,
    Deliver,
}

impl VendorAction {
    /// The status this action moves the order to.
    fn target(self) -> OrderStatus {
        match self {
            VendorAction::Accept => OrderStatus::Accepted,
            VendorAction::Cancel => OrderStatus::Canceled,
            VendorAction::Ship => OrderStatus::Shipped,
            VendorAction::Deliver => OrderStatus::Delivered,
        }
    }

    /// Whether the action is allowed from the given status.
    fn allowed_from(self, status: OrderStatus) -> bool {
        match self {
            VendorAction::Accept => status.can_accept(),
            VendorAction::Cancel => status.can_cancel(),
            VendorAction::Ship => status.can_ship(),
            VendorAction::Deliver => status.can_deliver(),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            VendorAction::Accept => "accept",
            VendorAction::Cancel => "cancel",
            VendorAction::Ship => "ship",
            VendorAction::Deliver => "deliver",
        }
    }
}

/// The result of a vendor action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VendorOutcome {
    /// The order moved to `status`.
    Applied { status: OrderStatus },
    /// The order's current status does not allow the action. Not an
    /// error: stale dashboards routinely race each other here.
    InvalidTransition { current: OrderStatus },
}

/// Applies vendor actions to orders, scoped to the vendor's products.
pub struct VendorDesk<S> {
    store: S,
}

impl<S: MarketStore> VendorDesk<S> {
    /// Creates a desk over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Applies `action` to the order on behalf of `vendor`.
    ///
    /// The vendor must supply at least one of the order's line items;
    /// an order that does not exist and an order the vendor has no
    /// part in produce the same `OrderNotFound`, so the endpoint leaks
    /// nothing about other vendors' orders. The status guard runs on a
    /// row claimed for update, so two racing actions serialize and the
    /// loser sees `InvalidTransition`.
    #[tracing::instrument(skip(self))]
    pub async fn apply(
        &self,
        vendor: &Vendor,
        order_id: OrderId,
        action: VendorAction,
    ) -> Result<VendorOutcome, VendorError> {
        if !self
            .store
            .vendor_supplies_order(order_id, vendor.id())
            .await?
        {
            return Err(VendorError::OrderNotFound(order_id));
        }

        let mut tx = self.store.begin().await?;
        let order = tx
            .order_for_update(order_id)
            .await?
            .ok_or(VendorError::OrderNotFound(order_id))?;

        if !action.allowed_from(order.status) {
            return Ok(VendorOutcome::InvalidTransition {
                current: order.status,
            });
        }

        let target = action.target();
        tx.set_order_status(order_id, target).await?;
        tx.commit().await?;

        metrics::counter!("vendor_actions_total", "action" => action.as_str()).increment(1);
        tracing::info!(%order_id, action = action.as_str(), status = %target, "vendor action applied");
        Ok(VendorOutcome::Applied { status: target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{ProductId, UserId};
    use domain::{Actor, Money, Order, OrderLineItem, Product, Role};
    use store::InMemoryStore;

    async fn seeded_order(store: &InMemoryStore, vendor: UserId) -> OrderId {
        let product = Product::new(
            ProductId::new(),
            vendor,
            "Widget",
            Money::from_cents(10000),
            5,
        );
        store.upsert_product(&product).await.unwrap();

        let order = Order::new(UserId::new(), Money::from_cents(10000), None);
        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order).await.unwrap();
        tx.insert_line_item(&OrderLineItem {
            order_id: order.id,
            product_id: product.id,
            quantity: 1,
            unit_price: Money::from_cents(10000),
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();
        order.id
    }

    fn vendor(id: UserId) -> Vendor {
        Actor::new(id, Role::Vendor).require_vendor().unwrap()
    }

    #[tokio::test]
    async fn test_accept_then_ship_then_deliver() {
        let store = InMemoryStore::new();
        let vendor_id = UserId::new();
        let order_id = seeded_order(&store, vendor_id).await;
        let desk = VendorDesk::new(store.clone());
        let vendor = vendor(vendor_id);

        for (action, status) in [
            (VendorAction::Accept, OrderStatus::Accepted),
            (VendorAction::Ship, OrderStatus::Shipped),
            (VendorAction::Deliver, OrderStatus::Delivered),
        ] {
            assert_eq!(
                desk.apply(&vendor, order_id, action).await.unwrap(),
                VendorOutcome::Applied { status }
            );
            assert_eq!(store.order(order_id).await.unwrap().unwrap().status, status);
        }
    }

    #[tokio::test]
    async fn test_ship_before_accept_is_invalid() {
        let store = InMemoryStore::new();
        let vendor_id = UserId::new();
        let order_id = seeded_order(&store, vendor_id).await;
        let desk = VendorDesk::new(store.clone());

        assert_eq!(
            desk.apply(&vendor(vendor_id), order_id, VendorAction::Ship)
                .await
                .unwrap(),
            VendorOutcome::InvalidTransition {
                current: OrderStatus::Pending
            }
        );
        assert_eq!(
            store.order(order_id).await.unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_cancel_only_from_pending() {
        let store = InMemoryStore::new();
        let vendor_id = UserId::new();
        let order_id = seeded_order(&store, vendor_id).await;
        let desk = VendorDesk::new(store.clone());
        let vendor = vendor(vendor_id);

        desk.apply(&vendor, order_id, VendorAction::Accept)
            .await
            .unwrap();
        assert_eq!(
            desk.apply(&vendor, order_id, VendorAction::Cancel)
                .await
                .unwrap(),
            VendorOutcome::InvalidTransition {
                current: OrderStatus::Accepted
            }
        );
    }

    #[tokio::test]
    async fn test_other_vendors_orders_look_absent() {
        let store = InMemoryStore::new();
        let order_id = seeded_order(&store, UserId::new()).await;
        let desk = VendorDesk::new(store.clone());

        let err = desk
            .apply(&vendor(UserId::new()), order_id, VendorAction::Accept)
            .await
            .unwrap_err();
        assert!(matches!(err, VendorError::OrderNotFound(id) if id == order_id));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let desk = VendorDesk::new(InMemoryStore::new());
        assert!(matches!(
            desk.apply(&vendor(UserId::new()), OrderId::new(), VendorAction::Accept)
                .await,
            Err(VendorError::OrderNotFound(_))
        ));
    }
}
