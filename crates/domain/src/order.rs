//! Orders, line items and checkout inputs.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentToken, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::status::OrderStatus;

/// How a checkout is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Redirect through the external payment gateway; the order is
    /// confirmed later by the payment callback.
    Gateway,

    /// Cash on delivery; the order finalizes locally.
    Cash,
}

/// One priced line produced by the cart aggregator.
///
/// The unit price is resolved exactly once (discount price if set,
/// otherwise base price) and is what gets snapshotted into the order;
/// the product's live price is never consulted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl PricedLine {
    /// Returns quantity × unit price for this line.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    /// Sum of line quantity × unit price at creation time; never
    /// recomputed afterwards.
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Present only on the gateway path. Globally unique and immutable
    /// once the order row is written.
    pub payment_token: Option<PaymentToken>,
}

impl Order {
    /// Creates a new pending order.
    pub fn new(user: UserId, total_amount: Money, payment_token: Option<PaymentToken>) -> Self {
        Self {
            id: OrderId::new(),
            user,
            total_amount,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            payment_token,
        }
    }
}

/// A line item within an order; immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    /// Price per unit captured at order time, decoupled from the
    /// product's current price.
    pub unit_price: Money,
}

impl OrderLineItem {
    /// Creates a line item snapshot from a priced line.
    pub fn from_line(order_id: OrderId, line: &PricedLine) -> Self {
        Self {
            order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }

    /// Returns quantity × snapshotted unit price.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: u32, cents: i64) -> PricedLine {
        PricedLine {
            product_id: ProductId::new(),
            product_name: "Widget".to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_line_subtotal() {
        assert_eq!(line(3, 1000).subtotal().cents(), 3000);
    }

    #[test]
    fn test_new_order_is_pending() {
        let order = Order::new(UserId::new(), Money::from_cents(20000), None);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment_token.is_none());
    }

    #[test]
    fn test_gateway_order_carries_token() {
        let token = PaymentToken::new();
        let order = Order::new(UserId::new(), Money::from_cents(100), Some(token));
        assert_eq!(order.payment_token, Some(token));
    }

    #[test]
    fn test_line_item_snapshots_priced_line() {
        let priced = line(2, 10000);
        let order_id = OrderId::new();
        let item = OrderLineItem::from_line(order_id, &priced);
        assert_eq!(item.order_id, order_id);
        assert_eq!(item.product_id, priced.product_id);
        assert_eq!(item.subtotal().cents(), 20000);
    }

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Gateway).unwrap(),
            "\"gateway\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"cash\"").unwrap(),
            PaymentMethod::Cash
        );
    }
}
