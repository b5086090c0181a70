//! Application logic for the `sqlite-lint` CLI.
//!
//! This module contains the command implementations separated from the main
//! entry point to enable testing.

mod check;
mod convert;
mod helpers;
mod types;

pub use check::{run_check, run_signals};
pub use convert::{convert_dialect, convert_format, parse_whitelist};
pub use helpers::{
    calculate_exit_code, create_output_options, read_queries_input, validate_checker_names
};
pub use types::{CheckParams, CommandResult, SignalsParams};
