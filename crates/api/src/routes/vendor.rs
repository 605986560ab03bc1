//! Vendor order-action endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::{VendorAction, VendorOutcome};
use common::OrderId;
use gateway::StatusClient;
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Identity;

/// POST /vendor/orders/{id}/{action} — accept, cancel, ship or deliver
/// an order the vendor supplies.
#[tracing::instrument(skip(state, identity))]
pub async fn act<S: MarketStore + Clone + 'static, C: StatusClient + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Path((id, action)): Path<(uuid::Uuid, String)>,
) -> Result<Json<VendorOutcome>, ApiError> {
    let vendor = identity.0.require_vendor()?;
    let action = match action.as_str() {
        "accept" => VendorAction::Accept,
        "cancel" => VendorAction::Cancel,
        "ship" => VendorAction::Ship,
        "deliver" => VendorAction::Deliver,
        other => {
            return Err(ApiError::NotFound(format!("unknown order action: {other}")));
        }
    };

    let outcome = state
        .vendor_desk
        .apply(&vendor, OrderId::from_uuid(id), action)
        .await?;
    Ok(Json(outcome))
}
