//! Catalog entities consumed, not owned, by the order core.
//!
//! Products and cart entries are managed elsewhere (vendor CRUD, cart
//! endpoints); the core only reads them during checkout and decrements
//! product stock inside the order-placement transaction.

use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A product listing as the order core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// The vendor who listed the product; used to scope vendor order
    /// actions.
    pub vendor: UserId,
    pub name: String,
    /// Base price per unit.
    pub price: Money,
    /// Optional discounted price; wins over `price` when present.
    pub discount_price: Option<Money>,
    /// Authoritative stock count. Never negative: the inventory ledger
    /// rejects any decrement that would cross zero.
    pub stock: u32,
}

impl Product {
    /// Creates a product listing without a discount.
    pub fn new(
        id: ProductId,
        vendor: UserId,
        name: impl Into<String>,
        price: Money,
        stock: u32,
    ) -> Self {
        Self {
            id,
            vendor,
            name: name.into(),
            price,
            discount_price: None,
            stock,
        }
    }

    /// Sets a discounted price.
    pub fn with_discount(mut self, discount_price: Money) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    /// The price a checkout pays per unit: the discounted price when one
    /// is set, otherwise the base price.
    ///
    /// Resolved once at cart aggregation time; the resulting value is
    /// snapshotted into the order line item and never re-read.
    pub fn effective_price(&self) -> Money {
        self.discount_price.unwrap_or(self.price)
    }
}

/// A persisted cart entry: one (user, product) pair with a quantity.
///
/// Unique per (user, product). The core clears a user's entries only
/// after a cash order finalizes or a gateway payment is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub user: UserId,
    pub product: ProductId,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: i64) -> Product {
        Product::new(
            ProductId::new(),
            UserId::new(),
            "Widget",
            Money::from_cents(price),
            10,
        )
    }

    #[test]
    fn test_effective_price_without_discount() {
        assert_eq!(product(1000).effective_price().cents(), 1000);
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        let p = product(1000).with_discount(Money::from_cents(750));
        assert_eq!(p.effective_price().cents(), 750);
    }
}
