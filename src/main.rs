//! # SQLite Lint
//!
//! Replays SQL statements through the runtime linter.
//!
//! `sqlite-lint` feeds each statement of a file to the same synchronous path
//! a host database uses, then prints the issues the checkers raised.
//!
//! # Quick Start
//!
//! ```bash
//! # Lint a file of statements
//! sqlite-lint check -q queries.sql
//!
//! # JSON output, only two checkers, one table whitelisted
//! sqlite-lint check -q queries.sql -f json -e composite_index -e fuzzy_match -w logs=*
//!
//! # Stream statements from stdin and keep an issue log
//! cat queries.sql | sqlite-lint check -q - --log issues.log
//!
//! # Inspect the signals of each SELECT
//! sqlite-lint signals -q queries.sql
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`SQLITE_LINT_DIALECT`, `SQLITE_LINT_LOG`)
//! 3. `.sqlite-lint.toml` in current directory
//! 4. `~/.config/sqlite-lint/config.toml`
//!
//! Diagnostics go to stderr and are filtered with `RUST_LOG` (default
//! `warn`).
//!
//! # Checkers
//!
//! | Name | Description |
//! |------|-------------|
//! | `composite_index` | Columns filtered together by `AND` may need a composite index |
//! | `fuzzy_match` | `LIKE` pattern match may scan the whole table |
//! | `bit_operation` | Bitwise operator in a condition cannot use an index |
//! | `or_condition` | `OR` between conditions may defeat index selection |
//! | `in_condition` | `IN` list or sub-select membership test |
//! | `join_qualifier` | Join columns should be indexed on the inner table |
//!
//! # Exit Codes
//!
//! - `0` - Success, no issues or only informational ones
//! - `1` - Warnings found, or the command failed
//! - `2` - Errors found

use std::process;

use clap::Parser;
use sqlite_lint::{
    AppResult,
    app::{CheckParams, SignalsParams, run_check, run_signals},
    cli::{Cli, Commands},
    config::Config
};
use tokio::main;
use tracing_subscriber::EnvFilter;

#[main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let result = match cli.command {
        Commands::Check {
            queries,
            db,
            dialect,
            format,
            enable,
            whitelist,
            log,
            no_color
        } => {
            let params = CheckParams {
                queries_path: queries.display().to_string(),
                db_path: db,
                dialect,
                format,
                enable,
                whitelist,
                log,
                no_color
            };
            run_check(params, config).await?
        }
        Commands::Signals {
            queries,
            dialect,
            format,
            no_color
        } => {
            let params = SignalsParams {
                queries_path: queries.display().to_string(),
                dialect,
                format,
                no_color
            };
            run_signals(params, &config)?
        }
    };
    println!("{}", result.output);
    Ok(result.exit_code)
}
