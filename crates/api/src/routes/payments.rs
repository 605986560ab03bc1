//! Payment callback endpoints.
//!
//! The gateway redirects the shopper's browser here after a payment
//! attempt; the query string carries either the signed envelope
//! (`data=`) or flat parameters. Both handlers are safe to retry.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use checkout::{AbandonOutcome, ReconcileOutcome};
use gateway::StatusClient;
use serde::Deserialize;
use store::MarketStore;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::Identity;

#[derive(Deserialize)]
pub struct FailureQuery {
    pub transaction_uuid: Option<String>,
}

/// GET /payments/callback/success — reconcile a success callback
/// against the stored order.
#[tracing::instrument(skip(state, identity, params))]
pub async fn success<S: MarketStore + Clone + 'static, C: StatusClient + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ReconcileOutcome>, ApiError> {
    let shopper = identity.0.require_shopper()?;
    let outcome = state.reconciler.confirm(&shopper, &params).await?;
    Ok(Json(outcome))
}

/// GET /payments/callback/failure — the shopper backed out or the
/// gateway gave up; cancel the pending order if one is referenced.
#[tracing::instrument(skip(state, identity, query))]
pub async fn failure<S: MarketStore + Clone + 'static, C: StatusClient + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Query(query): Query<FailureQuery>,
) -> Result<Json<AbandonOutcome>, ApiError> {
    let shopper = identity.0.require_shopper()?;
    let outcome = state
        .reconciler
        .abandon(&shopper, query.transaction_uuid.as_deref())
        .await?;
    Ok(Json(outcome))
}
