use serde::{Deserialize, Serialize};

use crate::domain::order::OrderId;

/// Active shipment tracking for an order. Absence is valid: an order that
/// has not been dispatched yet simply has no shipment record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub tracking_id: String,
    pub order_id: OrderId,
    pub current_location: String,
    pub last_update: String,
}
