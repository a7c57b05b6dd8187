use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerRecord;
use crate::domain::order::OrderRecord;
use crate::domain::shipment::ShipmentRecord;

/// Read-only projection joining an order with its customer and shipment
/// data. Constructed per query, never persisted. The customer and
/// shipment sides are independently nullable: a missing shipment does not
/// imply a missing customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOrderView {
    #[serde(flatten)]
    pub order: OrderRecord,
    pub customer: Option<CustomerRecord>,
    pub shipment: Option<ShipmentRecord>,
}

impl ResolvedOrderView {
    pub fn current_location(&self) -> Option<&str> {
        self.shipment.as_ref().map(|shipment| shipment.current_location.as_str())
    }

    pub fn expected_date(&self) -> Option<&str> {
        self.order.expected_date.as_deref()
    }
}
