// mod.rs - formatter adapters module

pub mod clang;
pub mod history;
pub mod miniyaml;
pub mod registry;
pub mod tomlline;
pub mod traits;

pub use clang::ClangFamilyAdapter;
pub use registry::FormatterRegistry;
pub use tomlline::TomlLineAdapter;
pub use traits::{FormatterAdapter, Variant};
