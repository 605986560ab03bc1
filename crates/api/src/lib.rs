//! HTTP API server for the marketplace order core.
//!
//! Exposes the checkout, payment-callback, vendor-action and order
//! lookup flows as JSON routes, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use checkout::{CartAggregator, OrderAssembler, Reconciler, VendorDesk};
use gateway::{GatewayConfig, StatusClient};
use metrics_exporter_prometheus::PrometheusHandle;
use store::MarketStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S, C> {
    pub store: S,
    pub aggregator: CartAggregator<S>,
    pub assembler: OrderAssembler<S>,
    pub reconciler: Reconciler<S, C>,
    pub vendor_desk: VendorDesk<S>,
}

/// Wires the workflow components around one store and gateway config.
pub fn build_state<S, C>(store: S, config: GatewayConfig, status: C) -> Arc<AppState<S, C>>
where
    S: MarketStore + Clone,
    C: StatusClient,
{
    Arc::new(AppState {
        aggregator: CartAggregator::new(store.clone()),
        assembler: OrderAssembler::new(store.clone(), config.clone()),
        reconciler: Reconciler::new(store.clone(), status, config),
        vendor_desk: VendorDesk::new(store.clone()),
        store,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, C>(state: Arc<AppState<S, C>>, metrics_handle: PrometheusHandle) -> Router
where
    S: MarketStore + Clone + 'static,
    C: StatusClient + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout/quote", get(routes::checkout::quote::<S, C>))
        .route("/checkout/orders", post(routes::checkout::place::<S, C>))
        .route(
            "/payments/callback/success",
            get(routes::payments::success::<S, C>),
        )
        .route(
            "/payments/callback/failure",
            get(routes::payments::failure::<S, C>),
        )
        .route(
            "/vendor/orders/{id}/{action}",
            post(routes::vendor::act::<S, C>),
        )
        .route("/orders/{id}", get(routes::orders::get::<S, C>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
