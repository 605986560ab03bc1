//! The order placement and payment reconciliation workflow.
//!
//! This crate is the hard core of the marketplace: it converts a cart
//! into a persisted order, decrements inventory atomically, hands off
//! to the payment gateway, and later reconciles the asynchronous
//! payment callback against the stored order.
//!
//! Components, leaves first:
//!
//! - [`ledger`] — atomic stock decrement with a floor-at-zero guarantee.
//! - [`CartAggregator`] — builds one priced line-item list from either
//!   the persisted cart or a direct "buy now" request.
//! - [`OrderAssembler`] — creates the order, its line items and the
//!   stock decrements in one all-or-nothing transaction.
//! - [`Reconciler`] — drives the order status machine from gateway
//!   callbacks, guarded against replay, tampering and duplicates.
//! - [`VendorDesk`] — vendor-driven accept/cancel/ship/deliver.

mod aggregator;
mod assembler;
mod error;
pub mod ledger;
mod reconciler;
mod vendor;

pub use aggregator::{CartAggregator, DirectPurchase};
pub use assembler::{OrderAssembler, Placement};
pub use error::{CheckoutError, ReconcileError, VendorError};
pub use reconciler::{AbandonOutcome, ReconcileOutcome, Reconciler, RejectReason};
pub use vendor::{VendorAction, VendorDesk, VendorOutcome};
