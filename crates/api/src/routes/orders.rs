//! Order lookup endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderId;
use gateway::StatusClient;
use serde::Serialize;
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Identity;

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub total_cents: i64,
    pub total: String,
    pub payment_token: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

/// GET /orders/{id} — an order with its line items, visible only to
/// the shopper who placed it. Someone else's order looks like it does
/// not exist.
#[tracing::instrument(skip(state, identity))]
pub async fn get<S: MarketStore + Clone + 'static, C: StatusClient + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let shopper = identity.0.require_shopper()?;
    let order_id = OrderId::from_uuid(id);
    let not_found = || ApiError::NotFound(format!("order {order_id} not found"));

    let order = state.store.order(order_id).await?.ok_or_else(not_found)?;
    if order.user != shopper.id() {
        return Err(not_found());
    }
    let items = state.store.line_items(order_id).await?;

    Ok(Json(OrderResponse {
        id: order.id.to_string(),
        status: order.status.as_str().to_string(),
        total_cents: order.total_amount.cents(),
        total: order.total_amount.amount_string(),
        payment_token: order.payment_token.map(|t| t.to_string()),
        created_at: order.created_at.to_rfc3339(),
        items: items
            .iter()
            .map(|item| OrderItemResponse {
                product_id: item.product_id.to_string(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price.cents(),
                subtotal_cents: item.subtotal().cents(),
            })
            .collect(),
    }))
}
