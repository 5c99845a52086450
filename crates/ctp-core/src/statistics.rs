//! Dashboard statistics model.

use serde::{Deserialize, Serialize};

/// Today's order counts for a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct OrderStatistics {
    pub total: u64,
    pub open: u64,
    pub complete: u64,
}

/// Today's cart counts for a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CartStatistics {
    pub total: u64,
    pub active: u64,
    pub ordered: u64,
}

/// Meta information shown on the dashboard tab, all related to today.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Statistics {
    pub orders: OrderStatistics,
    pub carts: CartStatistics,
}
