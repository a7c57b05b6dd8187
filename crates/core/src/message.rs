//! User-facing message templates for the resolution pipeline.
//!
//! Every sentence the logistics path can produce lives here so the full
//! set stays enumerable and testable in one place.

use crate::domain::order::{DeliveryStatus, OrderId};
use crate::domain::view::ResolvedOrderView;

/// Placeholder rendered when a view is missing its shipment location or
/// expected date. Never render a blank.
pub const UNKNOWN_FIELD: &str = "unknown";

/// Status-specific sentence for one resolved order. Status matching is
/// case-insensitive; free-text statuses use the generic template.
pub fn status_message(view: &ResolvedOrderView) -> String {
    let product = &view.order.product_name;
    let order_id = view.order.order_id;
    let location = view.current_location().unwrap_or(UNKNOWN_FIELD);
    let expected = view.expected_date().unwrap_or(UNKNOWN_FIELD);

    match DeliveryStatus::parse(&view.order.delivery_status) {
        DeliveryStatus::Delivered => {
            format!("Your {product} (Order #{order_id}) has been delivered!")
        }
        DeliveryStatus::InTransit => format!(
            "Your {product} (Order #{order_id}) is currently in transit and located at \
             {location}. Expected delivery: {expected}."
        ),
        DeliveryStatus::Shipped => format!(
            "Your {product} (Order #{order_id}) has been shipped and is currently at \
             {location}. Expected delivery: {expected}."
        ),
        DeliveryStatus::Processing => format!(
            "Your {product} (Order #{order_id}) is currently being processed. \
             Expected delivery: {expected}."
        ),
        DeliveryStatus::Other => format!(
            "Your {product} (Order #{order_id}) status: {status}. Expected delivery: {expected}.",
            status = view.order.delivery_status
        ),
    }
}

pub fn order_not_found(order_id: OrderId) -> String {
    format!(
        "I couldn't find any information for order #{order_id}. \
         Please check the order number and try again."
    )
}

pub fn no_orders_for_product(label: &str) -> String {
    format!("I couldn't find any orders for products containing '{label}'.")
}

pub fn multiple_orders_found(count: usize, label: &str) -> String {
    format!("Found {count} orders containing '{label}'. Here are the details:")
}

pub fn guidance() -> String {
    "I need more specific information to help you. Please provide an order number \
     (e.g., 'Where is my order #123?') or mention a specific product."
        .to_string()
}
