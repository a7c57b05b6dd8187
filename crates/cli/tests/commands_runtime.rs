use std::env;
use std::sync::{Mutex, OnceLock};

use orderly_cli::commands::{ask, migrate, orders, seed};
use serde_json::Value;

const MEMORY_ENV: &[(&str, &str)] =
    &[("ORDERLY_DATABASE_URL", "sqlite::memory:"), ("ORDERLY_DATABASE_MAX_CONNECTIONS", "1")];

#[test]
fn migrate_returns_success_against_memory_database() {
    with_env(MEMORY_ENV, || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_with_invalid_database_url() {
    with_env(&[("ORDERLY_DATABASE_URL", "postgres://localhost/orderly")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_returns_deterministic_order_summary() {
    with_env(MEMORY_ENV, || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("  - order #1: Wireless Earbuds (In Transit)"));
        assert!(message.contains("  - order #4: Bluetooth Speaker (Delivered)"));
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(MEMORY_ENV, || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["status"], "ok");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);
        assert_eq!(second_payload["status"], "ok");

        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn ask_reports_not_found_for_an_unknown_order() {
    // A fresh in-memory database has no orders, so any reference misses.
    with_env(MEMORY_ENV, || {
        let result = ask::run("Where is my order #1?");
        assert_eq!(result.exit_code, 0, "expected ask success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["source"], "logistics");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("#1"), "not-found reply should reference the order number");
    });
}

#[test]
fn ask_answers_general_queries_with_the_static_responder_when_keyless() {
    with_env(MEMORY_ENV, || {
        let result = ask::run("What's your return policy?");
        assert_eq!(result.exit_code, 0, "expected ask success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["source"], "generative");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("customer support assistant"));
    });
}

#[test]
fn ask_rejects_a_blank_message() {
    with_env(MEMORY_ENV, || {
        let result = ask::run("   ");
        assert_eq!(result.exit_code, 1, "expected bad-request failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "bad_request");
    });
}

#[test]
fn orders_returns_an_empty_list_on_a_fresh_database() {
    with_env(MEMORY_ENV, || {
        let result = orders::run(Some("john.doe@email.com"), None, None);
        assert_eq!(result.exit_code, 0, "expected orders success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "orders");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["count"], 0);
        assert!(payload["orders"].as_array().map(Vec::is_empty).unwrap_or(false));
    });
}

#[test]
fn orders_requires_exactly_one_selector() {
    with_env(MEMORY_ENV, || {
        let none = orders::run(None, None, None);
        assert_eq!(none.exit_code, 1, "expected usage failure with no selector");

        let payload = parse_payload(&none.output);
        assert_eq!(payload["error_class"], "bad_request");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "ORDERLY_DATABASE_URL",
        "ORDERLY_DATABASE_MAX_CONNECTIONS",
        "ORDERLY_DATABASE_TIMEOUT_SECS",
        "ORDERLY_LLM_API_KEY",
        "ORDERLY_LLM_BASE_URL",
        "ORDERLY_LLM_MODEL",
        "ORDERLY_LLM_TIMEOUT_SECS",
        "ORDERLY_LLM_MAX_RETRIES",
        "ORDERLY_SERVER_BIND_ADDRESS",
        "ORDERLY_SERVER_PORT",
        "ORDERLY_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "ORDERLY_LOGGING_LEVEL",
        "ORDERLY_LOGGING_FORMAT",
        "ORDERLY_LOG_LEVEL",
        "ORDERLY_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
