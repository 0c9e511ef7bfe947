// lib.rs - styleprobe library root
//!
//! Infers a formatter's command-line options (or config file) by searching
//! for the configuration that reformats a set of source files with the
//! least churn against a reference. Ships adapters for clang-format-family
//! tools and rustfmt-shaped TOML-line formatters; more can be registered
//! through [`formatters::FormatterRegistry`].

pub mod cache;
pub mod cli;
pub mod diff;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod output;
pub mod runner;
pub mod style;
pub mod tempfiles;

pub mod prelude {
    pub use crate::cache::Cache;
    pub use crate::cli::{validate_args, Args, Config, ValidationResult};
    pub use crate::diff::DiffTool;
    pub use crate::dispatcher::{ConcurrencyMode, Dispatcher};
    pub use crate::engine::types::Mode;
    pub use crate::engine::{InputFile, SearchConfig, SearchEngine, SearchOutcome};
    pub use crate::error::EngineError;
    pub use crate::formatters::{FormatterAdapter, FormatterRegistry};
    pub use crate::style::{OptionValue, Style, StyleSchema};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
