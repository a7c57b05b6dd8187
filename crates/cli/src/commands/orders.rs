use serde::Serialize;

use crate::commands::CommandResult;
use orderly_core::config::{AppConfig, LoadOptions};
use orderly_core::domain::view::ResolvedOrderView;
use orderly_core::store::OrderStore;
use orderly_db::{connect_with_settings, migrations, SqlOrderStore};

#[derive(Debug, Serialize)]
struct OrdersOutcome {
    command: &'static str,
    status: &'static str,
    query: String,
    count: usize,
    orders: Vec<ResolvedOrderView>,
}

/// Store list queries keyed by exact email, customer name fragment, or
/// product name fragment. Exactly one selector is required; clap rules
/// out combinations before this runs.
pub fn run(email: Option<&str>, customer: Option<&str>, product: Option<&str>) -> CommandResult {
    let selector = match (email, customer, product) {
        (Some(email), None, None) => Selector::Email(email),
        (None, Some(fragment), None) => Selector::Customer(fragment),
        (None, None, Some(fragment)) => Selector::Product(fragment),
        _ => {
            return CommandResult::failure(
                "orders",
                "bad_request",
                "exactly one of --email, --customer, or --product is required",
                1,
            );
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "orders",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "orders",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let store = SqlOrderStore::new(pool.clone());
        let orders = match selector {
            Selector::Email(email) => store.find_orders_by_customer_email(email).await,
            Selector::Customer(fragment) => {
                store.find_orders_by_customer_name_fragment(fragment).await
            }
            Selector::Product(fragment) => store.find_orders_by_product_fragment(fragment).await,
        }
        .map_err(|error| ("store_query", error.to_string(), 4u8))?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(orders)
    });

    match result {
        Ok(orders) => {
            let outcome = OrdersOutcome {
                command: "orders",
                status: "ok",
                query: selector_description(email, customer, product),
                count: orders.len(),
                orders,
            };
            match serde_json::to_string_pretty(&outcome) {
                Ok(output) => CommandResult { exit_code: 0, output },
                Err(error) => CommandResult::failure(
                    "orders",
                    "serialization",
                    format!("failed to serialize order list: {error}"),
                    1,
                ),
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("orders", error_class, message, exit_code)
        }
    }
}

enum Selector<'a> {
    Email(&'a str),
    Customer(&'a str),
    Product(&'a str),
}

fn selector_description(
    email: Option<&str>,
    customer: Option<&str>,
    product: Option<&str>,
) -> String {
    match (email, customer, product) {
        (Some(email), _, _) => format!("email={email}"),
        (_, Some(fragment), _) => format!("customer~{fragment}"),
        (_, _, Some(fragment)) => format!("product~{fragment}"),
        _ => "none".to_string(),
    }
}
