//! Order assembly: one all-or-nothing placement transaction.

use std::time::Instant;

use common::{OrderId, PaymentToken};
use domain::{Order, OrderLineItem, PaymentMethod, PricedLine, Shopper};
use gateway::{GatewayConfig, RedirectForm};
use serde::Serialize;
use store::{MarketStore, StoreTx};

use crate::error::CheckoutError;
use crate::ledger;

/// The result of a successful placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// Cash order, finalized locally; the vendor takes it from here.
    Confirmed { order_id: OrderId },

    /// Gateway order, awaiting payment: the caller redirects the
    /// shopper's browser with the signed form, and the order stays
    /// pending until the payment callback reconciles it.
    Redirect {
        order_id: OrderId,
        form: RedirectForm,
    },
}

impl Placement {
    /// Returns the id of the placed order.
    pub fn order_id(&self) -> OrderId {
        match self {
            Placement::Confirmed { order_id } | Placement::Redirect { order_id, .. } => *order_id,
        }
    }
}

/// Turns priced lines into a persisted order.
pub struct OrderAssembler<S> {
    store: S,
    config: GatewayConfig,
}

impl<S: MarketStore> OrderAssembler<S> {
    /// Creates an assembler over the given store and gateway config.
    pub fn new(store: S, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    /// Places an order for the given lines.
    ///
    /// The order row, every line item and every stock decrement are
    /// written in one transaction; if any line's stock check fails the
    /// whole placement rolls back and nothing is readable. The cash
    /// path also clears the shopper's cart in the same transaction;
    /// the gateway path leaves the cart alone until the payment is
    /// confirmed.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn place(
        &self,
        shopper: &Shopper,
        lines: &[PricedLine],
        method: PaymentMethod,
    ) -> Result<Placement, CheckoutError> {
        if lines.is_empty() {
            return Err(CheckoutError::NoLineItems);
        }
        let start = Instant::now();

        let total = lines.iter().map(PricedLine::subtotal).sum();
        let token = matches!(method, PaymentMethod::Gateway).then(PaymentToken::new);
        let order = Order::new(shopper.id(), total, token);

        let mut tx = self.store.begin().await?;
        tx.insert_order(&order).await?;
        for line in lines {
            tx.insert_line_item(&OrderLineItem::from_line(order.id, line))
                .await?;
            ledger::decrement(&mut tx, line.product_id, line.quantity).await?;
        }

        let placement = match token {
            None => {
                tx.clear_cart(shopper.id()).await?;
                tx.commit().await?;
                Placement::Confirmed { order_id: order.id }
            }
            Some(token) => {
                let form = RedirectForm::build(&self.config, order.total_amount, &token)?;
                tx.commit().await?;
                Placement::Redirect {
                    order_id: order.id,
                    form,
                }
            }
        };

        let method_label = match method {
            PaymentMethod::Gateway => "gateway",
            PaymentMethod::Cash => "cash",
        };
        metrics::counter!("orders_placed_total", "method" => method_label).increment(1);
        metrics::histogram!("order_placement_seconds").record(start.elapsed().as_secs_f64());
        tracing::info!(
            order_id = %order.id,
            total = %order.total_amount,
            method = method_label,
            "order placed"
        );

        Ok(placement)
    }
}
