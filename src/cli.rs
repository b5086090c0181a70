use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQLite Lint - Replay SQL statements through the runtime linter
#[derive(Parser, Debug)]
#[command(name = "sqlite-lint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint statements as if a database had executed them
    Check {
        /// Path to SQL statements file (use - for stdin)
        #[arg(short, long)]
        queries: PathBuf,

        /// Database the statements are attributed to
        #[arg(long, default_value = "main.db")]
        db: String,

        /// SQL dialect for parsing (defaults to the configured dialect)
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: Format,

        /// Enable only these checkers (repeatable)
        #[arg(short, long)]
        enable: Vec<String>,

        /// Suppress checkers for a table: `table=checker[,checker]` or
        /// `table=*` (repeatable)
        #[arg(short, long)]
        whitelist: Vec<String>,

        /// Also append issues to this log file
        #[arg(long)]
        log: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    },

    /// Print the signals extracted from each SELECT
    Signals {
        /// Path to SQL statements file (use - for stdin)
        #[arg(short, long)]
        queries: PathBuf,

        /// SQL dialect for parsing (defaults to the configured dialect)
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlite
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
