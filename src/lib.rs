//! # SQLite Lint Library
//!
//! Runtime linter for executed SQL statements.
//!
//! The host reports every executed statement to a [`lint::LintRegistry`].
//! Each distinct statement shape is parsed into a [`tree::Select`] tree,
//! walked by an [`analyzer::SelectTreeAnalyzer`], and the resulting signals
//! are turned into [`issue::Issue`] records by the [`checker`] policies.
//!
//! # Modules
//!
//! - [`tree`] - Parsing and lowering of `SELECT` statements
//! - [`analyzer`] - Signal extraction over a select tree
//! - [`checker`] - Checker policies and the parallel runner
//! - [`lint`] - Per-database lint state, workers and delivery
//! - [`fingerprint`] - Statement normalization for de-duplication
//! - [`issue`] - Published issue records
//! - [`sink`] - Shared issue log file
//! - [`config`] - Configuration loading
//! - [`output`] - Result formatting for the CLI
//! - [`error`] - Error types and constructors

pub mod analyzer;
pub mod app;
pub mod checker;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod issue;
pub mod lint;
pub mod output;
pub mod sink;
pub mod tree;

pub use masterror::{AppError, AppResult};
