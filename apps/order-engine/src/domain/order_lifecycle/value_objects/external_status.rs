//! Status strings reported by the gateway's cancellation and timeline APIs.

use std::fmt;
use std::str::FromStr;

use super::OrderStatus;

/// Closed set of external order statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalOrderStatus {
    /// `created`
    Created,
    /// `prebook`
    Prebook,
    /// `pending`
    Pending,
    /// `failed`
    Failed,
    /// `cancelled`
    Cancelled,
    /// `rejected`
    Rejected,
    /// `success`
    Success,
}

impl ExternalOrderStatus {
    /// Local status this external status maps to.
    #[must_use]
    pub const fn to_order_status(self) -> OrderStatus {
        match self {
            Self::Created => OrderStatus::OrderCreated,
            Self::Prebook => OrderStatus::OrderPrebooked,
            Self::Pending => OrderStatus::OrderPending,
            Self::Failed => OrderStatus::OrderFailed,
            Self::Cancelled => OrderStatus::OrderCancelled,
            Self::Rejected => OrderStatus::OrderRejected,
            Self::Success => OrderStatus::OrderSuccess,
        }
    }

    /// Wire string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Prebook => "prebook",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for ExternalOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExternalOrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "prebook" => Ok(Self::Prebook),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            "rejected" => Ok(Self::Rejected),
            "success" => Ok(Self::Success),
            other => Err(other.to_string()),
        }
    }
}
