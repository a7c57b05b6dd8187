use orderly_core::domain::order::OrderId;
use orderly_core::domain::view::ResolvedOrderView;
use orderly_core::store::{OrderStore, StoreError};

/// In-memory [`OrderStore`] mirroring the SQL query semantics (ordering,
/// case-insensitive fragment matching). Intended for unit tests and the
/// resolver's own test suite.
#[derive(Default)]
pub struct InMemoryOrderStore {
    views: Vec<ResolvedOrderView>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_views(views: Vec<ResolvedOrderView>) -> Self {
        Self { views }
    }

    pub fn push_view(&mut self, view: ResolvedOrderView) {
        self.views.push(view);
    }

    fn collect_sorted<F>(&self, predicate: F) -> Vec<ResolvedOrderView>
    where
        F: Fn(&ResolvedOrderView) -> bool,
    {
        let mut matches: Vec<ResolvedOrderView> =
            self.views.iter().filter(|view| predicate(view)).cloned().collect();
        // Most recent first; views without an order date sort last, like
        // SQLite's DESC NULL ordering.
        matches.sort_by(|a, b| b.order.order_date.cmp(&a.order.order_date));
        matches
    }
}

#[async_trait::async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn find_order_view(
        &self,
        order_id: OrderId,
    ) -> Result<Option<ResolvedOrderView>, StoreError> {
        Ok(self.views.iter().find(|view| view.order.order_id == order_id).cloned())
    }

    async fn find_orders_by_customer_email(
        &self,
        email: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError> {
        Ok(self.collect_sorted(|view| {
            view.customer.as_ref().map(|customer| customer.email == email).unwrap_or(false)
        }))
    }

    async fn find_orders_by_customer_name_fragment(
        &self,
        fragment: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError> {
        let needle = fragment.to_lowercase();
        Ok(self.collect_sorted(|view| {
            view.customer
                .as_ref()
                .map(|customer| customer.name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        }))
    }

    async fn find_orders_by_product_fragment(
        &self,
        fragment: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError> {
        let needle = fragment.to_lowercase();
        Ok(self.collect_sorted(|view| view.order.product_name.to_lowercase().contains(&needle)))
    }
}
