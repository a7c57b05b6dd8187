use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::commands::CommandResult;
use orderly_agent::llm;
use orderly_agent::session::{ConversationSession, ResponseSource};
use orderly_core::config::{AppConfig, LoadOptions};
use orderly_core::domain::resolution::ResolutionPayload;
use orderly_db::{connect_with_settings, migrations, SqlOrderStore};

#[derive(Debug, Serialize)]
struct AskOutcome {
    command: &'static str,
    status: &'static str,
    source: ResponseSource,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<ResolutionPayload>,
}

/// One-shot pipeline run: a single turn in a throwaway session against
/// the configured store. General queries use the configured generative
/// client, so a keyless setup answers with the static support copy.
pub fn run(message: &str) -> CommandResult {
    let text = message.trim();
    if text.is_empty() {
        return CommandResult::failure("ask", "bad_request", "message must not be empty", 1);
    }

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
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
                "ask",
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

        let llm_client = llm::client_from_config(&config.llm)
            .map_err(|error| ("llm_init", error.to_string(), 3u8))?;

        let mut session = ConversationSession::new(
            Arc::new(SqlOrderStore::new(pool.clone())),
            llm_client,
            Duration::from_secs(config.llm.timeout_secs),
        );
        let reply = session.handle_turn(text).await;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(reply)
    });

    match result {
        Ok(reply) => {
            let outcome = AskOutcome {
                command: "ask",
                status: "ok",
                source: reply.source,
                message: reply.message,
                data: reply.data,
            };
            match serde_json::to_string_pretty(&outcome) {
                Ok(output) => CommandResult { exit_code: 0, output },
                Err(error) => CommandResult::failure(
                    "ask",
                    "serialization",
                    format!("failed to serialize reply: {error}"),
                    1,
                ),
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("ask", error_class, message, exit_code)
        }
    }
}
