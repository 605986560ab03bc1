//! Checkout endpoints: priced quote and order placement.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use checkout::{DirectPurchase, Placement};
use common::ProductId;
use domain::{Money, PaymentMethod, PricedLine};
use gateway::StatusClient;
use serde::{Deserialize, Serialize};
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Identity;

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub product_id: Option<ProductId>,
    pub quantity: Option<u32>,
}

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    pub payment_method: PaymentMethod,
    /// Set for a direct "buy now" purchase; absent means the whole cart.
    pub product_id: Option<ProductId>,
    pub quantity: Option<u32>,
}

#[derive(Serialize)]
pub struct LineResponse {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct QuoteResponse {
    pub lines: Vec<LineResponse>,
    pub total_cents: i64,
    pub total: String,
}

fn direct_purchase(product_id: Option<ProductId>, quantity: Option<u32>) -> Option<DirectPurchase> {
    product_id.map(|product| DirectPurchase {
        product,
        quantity: quantity.unwrap_or(1),
    })
}

fn quote_response(lines: &[PricedLine]) -> QuoteResponse {
    let total: Money = lines.iter().map(PricedLine::subtotal).sum();
    QuoteResponse {
        lines: lines
            .iter()
            .map(|line| LineResponse {
                product_id: line.product_id.to_string(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price.cents(),
                subtotal_cents: line.subtotal().cents(),
            })
            .collect(),
        total_cents: total.cents(),
        total: total.amount_string(),
    }
}

/// GET /checkout/quote — priced preview of the cart or a buy-now line.
#[tracing::instrument(skip(state, identity, query))]
pub async fn quote<S: MarketStore + Clone + 'static, C: StatusClient + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let shopper = identity.0.require_shopper()?;
    let lines = state
        .aggregator
        .build(&shopper, direct_purchase(query.product_id, query.quantity))
        .await?;
    Ok(Json(quote_response(&lines)))
}

/// POST /checkout/orders — place an order from the cart or a buy-now
/// line. Answers 201 with either the cash confirmation or the signed
/// gateway redirect form.
#[tracing::instrument(skip(state, identity, req))]
pub async fn place<S: MarketStore + Clone + 'static, C: StatusClient + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Json(req): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Placement>), ApiError> {
    let shopper = identity.0.require_shopper()?;
    let lines = state
        .aggregator
        .build(&shopper, direct_purchase(req.product_id, req.quantity))
        .await?;
    let placement = state
        .assembler
        .place(&shopper, &lines, req.payment_method)
        .await?;
    Ok((StatusCode::CREATED, Json(placement)))
}
