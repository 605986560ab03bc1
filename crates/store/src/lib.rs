//! Persistent-record store for the marketplace order core.
//!
//! The rest of the system treats persistence as an external
//! collaborator reached through the [`MarketStore`] / [`StoreTx`]
//! traits. Two implementations are provided: [`InMemoryStore`] for
//! tests and local runs, and [`PostgresStore`] backed by sqlx.
//!
//! Everything the order workflow mutates (order rows, line items,
//! product stock, cart entries) goes through a [`StoreTx`], whose
//! commit is all-or-nothing; dropping an uncommitted transaction rolls
//! it back.

mod error;
mod memory;
mod postgres;
mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{MarketStore, StoreTx};
