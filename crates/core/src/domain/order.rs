use std::fmt;

use serde::{Deserialize, Serialize};

/// A positive integer uniquely identifying one order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub product_name: String,
    /// Raw status text as stored. Classify with [`DeliveryStatus::parse`];
    /// unknown values are valid and fall back to [`DeliveryStatus::Other`].
    pub delivery_status: String,
    pub expected_date: Option<String>,
    pub order_date: Option<String>,
}

/// Open status enumeration: the store may hold free-text statuses beyond
/// the four canonical ones, so parsing is total and never fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryStatus {
    Processing,
    Shipped,
    InTransit,
    Delivered,
    Other,
}

impl DeliveryStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "in transit" => Self::InTransit,
            "delivered" => Self::Delivered,
            _ => Self::Other,
        }
    }
}
