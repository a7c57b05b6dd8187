use std::sync::Arc;

use tracing::debug;

use orderly_core::domain::resolution::{QueryResolution, ResolutionPayload};
use orderly_core::message;
use orderly_core::store::{OrderStore, StoreError};

use crate::conversation::{ProductMatcher, ReferenceExtractor};

/// Resolves one order-related query into a [`QueryResolution`].
///
/// An explicit order reference always wins: if the text carries a number
/// that matches no order, the outcome is a clear "not found" and product
/// matching is never consulted. Store failures propagate so the
/// orchestrator can apply its fallback contract; they are never folded
/// into a "not found".
pub struct LogisticsResolver {
    store: Arc<dyn OrderStore>,
    extractor: ReferenceExtractor,
    matcher: ProductMatcher,
}

impl LogisticsResolver {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store, extractor: ReferenceExtractor::new(), matcher: ProductMatcher::new() }
    }

    pub async fn resolve(&self, text: &str) -> Result<QueryResolution, StoreError> {
        if let Some(order_id) = self.extractor.extract(text) {
            return match self.store.find_order_view(order_id).await? {
                Some(view) => Ok(QueryResolution::succeeded(
                    message::status_message(&view),
                    ResolutionPayload::Single(view),
                )),
                None => {
                    debug!(order_id = order_id.0, "extracted order reference has no record");
                    Ok(QueryResolution::failed(message::order_not_found(order_id)))
                }
            };
        }

        if let Some(entry) = self.matcher.matches(text).into_iter().next() {
            let mut orders = self.store.find_orders_by_product_fragment(entry.label).await?;
            return Ok(if orders.is_empty() {
                QueryResolution::failed(message::no_orders_for_product(entry.label))
            } else if orders.len() == 1 {
                let view = orders.remove(0);
                QueryResolution::succeeded(
                    message::status_message(&view),
                    ResolutionPayload::Single(view),
                )
            } else {
                QueryResolution::succeeded(
                    message::multiple_orders_found(orders.len(), entry.label),
                    ResolutionPayload::Many(orders),
                )
            });
        }

        debug!("no order reference or product keyword recognized");
        Ok(QueryResolution::failed(message::guidance()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use orderly_core::domain::customer::{CustomerId, CustomerRecord};
    use orderly_core::domain::order::{OrderId, OrderRecord};
    use orderly_core::domain::resolution::ResolutionPayload;
    use orderly_core::domain::shipment::ShipmentRecord;
    use orderly_core::domain::view::ResolvedOrderView;
    use orderly_core::store::{OrderStore, StoreError};
    use orderly_db::InMemoryOrderStore;

    use super::LogisticsResolver;

    fn view(
        order_id: i64,
        product: &str,
        status: &str,
        order_date: &str,
        location: Option<&str>,
    ) -> ResolvedOrderView {
        ResolvedOrderView {
            order: OrderRecord {
                order_id: OrderId(order_id),
                product_name: product.to_string(),
                delivery_status: status.to_string(),
                expected_date: Some("2024-01-10".to_string()),
                order_date: Some(order_date.to_string()),
            },
            customer: Some(CustomerRecord {
                id: CustomerId(1),
                name: "John Doe".to_string(),
                email: "john.doe@email.com".to_string(),
            }),
            shipment: location.map(|location| ShipmentRecord {
                tracking_id: format!("TRK{order_id:03}"),
                order_id: OrderId(order_id),
                current_location: location.to_string(),
                last_update: "2024-01-08 09:30".to_string(),
            }),
        }
    }

    fn resolver_with(views: Vec<ResolvedOrderView>) -> LogisticsResolver {
        LogisticsResolver::new(Arc::new(InMemoryOrderStore::with_views(views)))
    }

    #[tokio::test]
    async fn explicit_order_reference_wins_over_product_mention() {
        let resolver = resolver_with(vec![
            view(2, "USB-C Cable", "Shipped", "2024-01-07", Some("Mumbai Sorting Center")),
            view(9, "Wireless Earbuds", "In Transit", "2024-01-03", Some("Bangalore Hub")),
        ]);

        let resolution =
            resolver.resolve("where are the earbuds from order #2?").await.expect("resolve");

        assert!(resolution.succeeded);
        match resolution.payload {
            Some(ResolutionPayload::Single(view)) => {
                assert_eq!(view.order.order_id, OrderId(2));
                assert_eq!(view.order.product_name, "USB-C Cable");
            }
            other => panic!("expected a single order payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unmatched_reference_reports_not_found_never_product_fallback() {
        let resolver = resolver_with(vec![view(
            9,
            "Wireless Earbuds",
            "In Transit",
            "2024-01-03",
            Some("Bangalore Hub"),
        )]);

        let resolution =
            resolver.resolve("my earbuds were order #42 I think").await.expect("resolve");

        assert!(!resolution.succeeded);
        assert!(resolution.message.contains("#42"));
        assert!(resolution.payload.is_none());
    }

    #[tokio::test]
    async fn single_product_hit_reuses_the_status_template() {
        let resolver = resolver_with(vec![view(
            1,
            "Wireless Earbuds",
            "In Transit",
            "2024-01-03",
            Some("Bangalore Hub"),
        )]);

        let resolution = resolver.resolve("track my earbuds").await.expect("resolve");

        assert!(resolution.succeeded);
        assert_eq!(
            resolution.message,
            "Your Wireless Earbuds (Order #1) is currently in transit and located at \
             Bangalore Hub. Expected delivery: 2024-01-10."
        );
    }

    #[tokio::test]
    async fn multiple_product_hits_return_the_count_and_full_list() {
        let resolver = resolver_with(vec![
            view(1, "Wireless Earbuds", "In Transit", "2024-01-03", Some("Bangalore Hub")),
            view(7, "Earbuds Pro Case", "Processing", "2024-01-06", None),
        ]);

        let resolution = resolver.resolve("any news on my earbuds?").await.expect("resolve");

        assert!(resolution.succeeded);
        assert!(resolution.message.contains("2 orders"));
        assert!(resolution.message.contains("Earbuds"));
        match resolution.payload {
            Some(ResolutionPayload::Many(views)) => assert_eq!(views.len(), 2),
            other => panic!("expected the full list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_product_hits_fail_with_the_label() {
        let resolver = resolver_with(Vec::new());

        let resolution = resolver.resolve("where is my speaker").await.expect("resolve");

        assert!(!resolution.succeeded);
        assert!(resolution.message.contains("'Speaker'"));
    }

    #[tokio::test]
    async fn unrecognized_text_yields_generic_guidance() {
        let resolver = resolver_with(Vec::new());

        let resolution = resolver.resolve("it has not arrived").await.expect("resolve");

        assert!(!resolution.succeeded);
        assert!(resolution.message.contains("order number"));
        assert!(resolution.payload.is_none());
    }

    #[tokio::test]
    async fn resolving_twice_is_idempotent() {
        let resolver = resolver_with(vec![view(
            1,
            "Wireless Earbuds",
            "In Transit",
            "2024-01-03",
            Some("Bangalore Hub"),
        )]);

        let first = resolver.resolve("order #1").await.expect("first");
        let second = resolver.resolve("order #1").await.expect("second");
        assert_eq!(first, second);
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl OrderStore for FailingStore {
        async fn find_order_view(
            &self,
            _order_id: OrderId,
        ) -> Result<Option<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn find_orders_by_customer_email(
            &self,
            _email: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn find_orders_by_customer_name_fragment(
            &self,
            _fragment: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }

        async fn find_orders_by_product_fragment(
            &self,
            _fragment: &str,
        ) -> Result<Vec<ResolvedOrderView>, StoreError> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn store_failure_propagates_instead_of_masquerading_as_not_found() {
        let resolver = LogisticsResolver::new(Arc::new(FailingStore));

        let error = resolver.resolve("order #1").await.expect_err("store failure");
        assert!(matches!(error, StoreError::Unavailable(_)));
    }
}
