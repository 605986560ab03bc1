//! Cart aggregation: one priced line-item list per checkout.

use common::ProductId;
use domain::{PricedLine, Shopper};
use serde::Deserialize;
use store::MarketStore;

use crate::error::CheckoutError;

/// A "buy now" request for a single product, bypassing the cart.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DirectPurchase {
    pub product: ProductId,
    pub quantity: u32,
}

/// Builds the priced line-item list a checkout will be assembled from.
///
/// Read-only: prices and stock are validated against committed state to
/// fail fast, but the authoritative stock check happens again inside
/// the order-placement transaction.
pub struct CartAggregator<S> {
    store: S,
}

impl<S: MarketStore> CartAggregator<S> {
    /// Creates an aggregator over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Produces the priced lines for this checkout.
    ///
    /// With a [`DirectPurchase`] the cart is ignored and a single line
    /// is priced; otherwise every persisted cart entry becomes a line.
    /// The unit price is resolved here, exactly once, and is what the
    /// order will snapshot.
    pub async fn build(
        &self,
        shopper: &Shopper,
        direct: Option<DirectPurchase>,
    ) -> Result<Vec<PricedLine>, CheckoutError> {
        match direct {
            Some(purchase) => Ok(vec![self.price(purchase.product, purchase.quantity).await?]),
            None => {
                let entries = self.store.cart_entries(shopper.id()).await?;
                if entries.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                let mut lines = Vec::with_capacity(entries.len());
                for entry in entries {
                    lines.push(self.price(entry.product, entry.quantity).await?);
                }
                Ok(lines)
            }
        }
    }

    async fn price(&self, product_id: ProductId, quantity: u32) -> Result<PricedLine, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity);
        }
        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or(CheckoutError::ProductNotFound(product_id))?;
        if quantity > product.stock {
            return Err(CheckoutError::InsufficientStock {
                product: product_id,
                name: product.name.clone(),
                requested: quantity,
                available: product.stock,
            });
        }
        Ok(PricedLine {
            product_id,
            unit_price: product.effective_price(),
            product_name: product.name,
            quantity,
        })
    }
}
