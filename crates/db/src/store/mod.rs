use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use orderly_core::domain::customer::{CustomerId, CustomerRecord};
use orderly_core::domain::order::{OrderId, OrderRecord};
use orderly_core::domain::shipment::ShipmentRecord;
use orderly_core::domain::view::ResolvedOrderView;
use orderly_core::store::{OrderStore, StoreError};

use crate::DbPool;

mod memory;

pub use memory::InMemoryOrderStore;

/// SQLite-backed [`OrderStore`]. All queries are read-only joins over
/// the orders, customers, and shipments tables.
pub struct SqlOrderStore {
    pool: DbPool,
}

impl SqlOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OrderStore for SqlOrderStore {
    async fn find_order_view(
        &self,
        order_id: OrderId,
    ) -> Result<Option<ResolvedOrderView>, StoreError> {
        let row = sqlx::query(&view_select("WHERE o.order_id = ?"))
            .bind(order_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        row.map(view_from_row).transpose()
    }

    async fn find_orders_by_customer_email(
        &self,
        email: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError> {
        let rows = sqlx::query(&view_select("WHERE c.email = ? ORDER BY o.order_date DESC"))
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        rows.into_iter().map(view_from_row).collect()
    }

    async fn find_orders_by_customer_name_fragment(
        &self,
        fragment: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError> {
        let rows = sqlx::query(&view_select("WHERE c.name LIKE ? ORDER BY o.order_date DESC"))
            .bind(like_pattern(fragment))
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        rows.into_iter().map(view_from_row).collect()
    }

    async fn find_orders_by_product_fragment(
        &self,
        fragment: &str,
    ) -> Result<Vec<ResolvedOrderView>, StoreError> {
        let rows =
            sqlx::query(&view_select("WHERE o.product_name LIKE ? ORDER BY o.order_date DESC"))
                .bind(like_pattern(fragment))
                .fetch_all(&self.pool)
                .await
                .map_err(unavailable)?;

        rows.into_iter().map(view_from_row).collect()
    }
}

fn view_select(filter: &str) -> String {
    format!(
        "SELECT
            o.order_id,
            o.product_name,
            o.delivery_status,
            o.expected_date,
            o.order_date,
            c.id AS customer_id,
            c.name AS customer_name,
            c.email AS customer_email,
            s.tracking_id,
            s.current_location,
            s.last_update
         FROM orders o
         LEFT JOIN customers c ON o.customer_id = c.id
         LEFT JOIN shipments s ON o.order_id = s.order_id
         {filter}"
    )
}

/// SQLite `LIKE` is case-insensitive for ASCII, which is exactly the
/// fragment-matching contract.
fn like_pattern(fragment: &str) -> String {
    format!("%{fragment}%")
}

fn unavailable(error: sqlx::Error) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

fn view_from_row(row: SqliteRow) -> Result<ResolvedOrderView, StoreError> {
    let order_id = OrderId(get(&row, "order_id")?);

    let customer = match get::<Option<i64>>(&row, "customer_id")? {
        Some(customer_id) => Some(CustomerRecord {
            id: CustomerId(customer_id),
            name: get(&row, "customer_name")?,
            email: get(&row, "customer_email")?,
        }),
        None => None,
    };

    let shipment = match get::<Option<String>>(&row, "tracking_id")? {
        Some(tracking_id) => Some(ShipmentRecord {
            tracking_id,
            order_id,
            current_location: get(&row, "current_location")?,
            last_update: get(&row, "last_update")?,
        }),
        None => None,
    };

    Ok(ResolvedOrderView {
        order: OrderRecord {
            order_id,
            product_name: get(&row, "product_name")?,
            delivery_status: get(&row, "delivery_status")?,
            expected_date: get(&row, "expected_date")?,
            order_date: get(&row, "order_date")?,
        },
        customer,
        shipment,
    })
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get::<T, _>(column)
        .map_err(|error| StoreError::Decode(format!("column `{column}`: {error}")))
}
