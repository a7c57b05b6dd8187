pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "orderly",
    about = "Orderly operator CLI",
    long_about = "Operate Orderly migrations, demo fixtures, readiness checks, and one-shot \
                  support queries against the configured order store.",
    after_help = "Examples:\n  orderly doctor --json\n  orderly ask --message \"Where is my order #1?\"\n  orderly orders --email john.doe@email.com"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo fixtures and verify the seed contract")]
    Seed,
    #[command(about = "Validate config, database connectivity, and generative-credential mode")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Run one support query through the resolution pipeline")]
    Ask {
        #[arg(long, help = "The query text, e.g. \"Where is my order #1?\"")]
        message: String,
    },
    #[command(about = "List resolved orders by customer email, name fragment, or product fragment")]
    Orders {
        #[arg(long, help = "Exact customer email", conflicts_with_all = ["customer", "product"])]
        email: Option<String>,
        #[arg(long, help = "Customer name fragment", conflicts_with = "product")]
        customer: Option<String>,
        #[arg(long, help = "Product name fragment")]
        product: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Ask { message } => commands::ask::run(&message),
        Command::Orders { email, customer, product } => {
            commands::orders::run(email.as_deref(), customer.as_deref(), product.as_deref())
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
