//! Order status lifecycle.

use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──┬──► Accepted ──► Shipped ──► Delivered
///           │
///           └──► Canceled
/// ```
///
/// `Accepted` is reached either by payment confirmation or by vendor
/// action; `Canceled` by failed payment reconciliation or by vendor
/// action. `Shipped` and `Delivered` are vendor-driven and strictly
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting payment confirmation or vendor action.
    #[default]
    Pending,

    /// Payment confirmed or vendor accepted the order.
    Accepted,

    /// Order was canceled (terminal state).
    Canceled,

    /// Vendor handed the order to delivery.
    Shipped,

    /// Order reached the shopper (terminal state).
    Delivered,
}

impl OrderStatus {
    /// Returns true if the order can be accepted from this state.
    pub fn can_accept(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be canceled from this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be shipped from this state.
    pub fn can_ship(&self) -> bool {
        matches!(self, OrderStatus::Accepted)
    }

    /// Returns true if the order can be delivered from this state.
    pub fn can_deliver(&self) -> bool {
        matches!(self, OrderStatus::Shipped)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Canceled | OrderStatus::Delivered)
    }

    /// Returns the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "accepted" => Ok(OrderStatus::Accepted),
            "canceled" => Ok(OrderStatus::Canceled),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(format!("unknown order status: {other:?}")),
        }
    }
}
