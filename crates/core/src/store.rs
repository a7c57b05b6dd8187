use async_trait::async_trait;
use thiserror::Error;

use crate::domain::order::OrderId;
use crate::domain::view::ResolvedOrderView;

/// Infrastructure failure from the order store. Distinct from "not
/// found": lookups that merely miss return `Ok(None)` / `Ok(vec![])`,
/// while these errors mean the store itself could not answer and the
/// call is retryable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("order store unavailable: {0}")]
    Unavailable(String),
    #[error("order store returned malformed data: {0}")]
    Decode(String),
}

/// Read-only lookup over the order/customer/shipment tables. All
/// operations are side-effect-free; list results are ordered by order
/// date, most recent first.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order_view(
        &self,
        order_id: OrderId,
    ) -> Result<Option<ResolvedOrderView>, StoreError>;

    /// Exact email match.
    async fn find_orders_by_customer_email(
        &self,
        email: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError>;

    /// Case-insensitive substring match on the customer name.
    async fn find_orders_by_customer_name_fragment(
        &self,
        fragment: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError>;

    /// Case-insensitive substring match on the product name.
    async fn find_orders_by_product_fragment(
        &self,
        fragment: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError>;
}
