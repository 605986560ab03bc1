//! Domain layer for the marketplace order core.
//!
//! Pure data and rules, no I/O: fixed-point money, the product catalog
//! entities the core reads, the order / line-item records it writes,
//! the order status lifecycle, and the typed actor guard that replaces
//! per-endpoint role-string checks.

mod actor;
mod catalog;
mod error;
mod money;
mod order;
mod status;

pub use actor::{Actor, Role, Shopper, Vendor};
pub use catalog::{CartEntry, Product};
pub use error::RoleError;
pub use money::{Money, ParseAmountError};
pub use order::{Order, OrderLineItem, PaymentMethod, PricedLine};
pub use status::OrderStatus;
