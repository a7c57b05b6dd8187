use sqlx::Executor;

use crate::connection::DbPool;

/// Canonical demo seed contract: the rows
/// `config/fixtures/demo_seed_data.sql` inserts, used by `seed`
/// verification and the integration tests.
const SEED_ORDERS: &[OrderSeedContract] = &[
    OrderSeedContract {
        order_id: 1,
        product_name: "Wireless Earbuds",
        delivery_status: "In Transit",
        expected_date: "2024-01-10",
        customer_email: "john.doe@email.com",
        tracking_id: Some("TRK001"),
        current_location: Some("Bangalore Hub"),
    },
    OrderSeedContract {
        order_id: 2,
        product_name: "Smartphone Case",
        delivery_status: "Processing",
        expected_date: "2024-01-12",
        customer_email: "jane.smith@email.com",
        tracking_id: Some("TRK002"),
        current_location: Some("Warehouse Delhi"),
    },
    OrderSeedContract {
        order_id: 3,
        product_name: "USB-C Cable",
        delivery_status: "Shipped",
        expected_date: "2024-01-09",
        customer_email: "john.doe@email.com",
        tracking_id: Some("TRK003"),
        current_location: Some("Mumbai Sorting Center"),
    },
    OrderSeedContract {
        order_id: 4,
        product_name: "Bluetooth Speaker",
        delivery_status: "Delivered",
        expected_date: "2024-01-07",
        customer_email: "mike.johnson@email.com",
        tracking_id: Some("TRK004"),
        current_location: Some("Delivered - Customer Location"),
    },
];

const SEED_CUSTOMER_COUNT: i64 = 3;
const SEED_SHIPMENT_COUNT: i64 = 4;

struct OrderSeedContract {
    order_id: i64,
    product_name: &'static str,
    delivery_status: &'static str,
    expected_date: &'static str,
    customer_email: &'static str,
    tracking_id: Option<&'static str>,
    current_location: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct OrderSeedInfo {
    pub order_id: i64,
    pub product_name: &'static str,
    pub delivery_status: &'static str,
}

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub orders_seeded: Vec<OrderSeedInfo>,
}

#[derive(Clone, Debug)]
pub struct SeedCheck {
    pub name: String,
    pub passed: bool,
}

#[derive(Clone, Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<SeedCheck>,
}

/// Deterministic demo dataset (3 customers, 4 orders, 4 shipments).
/// Loading replaces any previous demo rows wholesale, so reseeding is
/// repeatable.
pub struct DemoSeedDataset;

impl DemoSeedDataset {
    /// SQL fixture content for the demo dataset.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_seed_data.sql");

    /// Load the demo dataset inside one transaction.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, sqlx::Error> {
        let mut tx = pool.begin().await?;
        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let orders_seeded = SEED_ORDERS
            .iter()
            .map(|order| OrderSeedInfo {
                order_id: order.order_id,
                product_name: order.product_name,
                delivery_status: order.delivery_status,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { orders_seeded })
    }

    /// Verify that the loaded rows match the seed contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, sqlx::Error> {
        let mut checks = Vec::new();

        let customer_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM customers").fetch_one(pool).await?;
        checks.push(SeedCheck {
            name: "customer-count".to_string(),
            passed: customer_count == SEED_CUSTOMER_COUNT,
        });

        let shipment_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM shipments").fetch_one(pool).await?;
        checks.push(SeedCheck {
            name: "shipment-count".to_string(),
            passed: shipment_count == SEED_SHIPMENT_COUNT,
        });

        for order in SEED_ORDERS {
            let order_matches: i64 = sqlx::query_scalar(
                "SELECT EXISTS(
                    SELECT 1 FROM orders o
                    LEFT JOIN customers c ON o.customer_id = c.id
                    WHERE o.order_id = ?1
                      AND o.product_name = ?2
                      AND o.delivery_status = ?3
                      AND o.expected_date = ?4
                      AND c.email = ?5
                 )",
            )
            .bind(order.order_id)
            .bind(order.product_name)
            .bind(order.delivery_status)
            .bind(order.expected_date)
            .bind(order.customer_email)
            .fetch_one(pool)
            .await?;
            checks.push(SeedCheck {
                name: format!("order-{}", order.order_id),
                passed: order_matches == 1,
            });

            if let (Some(tracking_id), Some(current_location)) =
                (order.tracking_id, order.current_location)
            {
                let shipment_matches: i64 = sqlx::query_scalar(
                    "SELECT EXISTS(
                        SELECT 1 FROM shipments
                        WHERE tracking_id = ?1 AND order_id = ?2 AND current_location = ?3
                     )",
                )
                .bind(tracking_id)
                .bind(order.order_id)
                .bind(current_location)
                .fetch_one(pool)
                .await?;
                checks.push(SeedCheck {
                    name: format!("shipment-{tracking_id}"),
                    passed: shipment_matches == 1,
                });
            }
        }

        let all_present = checks.iter().all(|check| check.passed);
        Ok(VerificationResult { all_present, checks })
    }

    /// True when no orders exist yet; server bootstrap seeds the demo
    /// dataset in that case, matching the original first-run behavior.
    pub async fn is_database_empty(pool: &DbPool) -> Result<bool, sqlx::Error> {
        let order_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM orders").fetch_one(pool).await?;
        Ok(order_count == 0)
    }
}
