// config.rs - TOML configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub formatter: Option<String>,
    pub formatter_name: Option<String>,
    pub mode: Option<String>,
    pub ignore: Option<Vec<String>>,
    pub max_rounds: Option<u32>,
    pub concurrency: Option<String>,
    pub threads: Option<usize>,
    pub cache_mode: Option<String>,
    pub cache_path: Option<String>,
    pub start_style: Option<String>,
    pub output_style: Option<String>,
    pub save_metric: Option<String>,
    pub bestofround: Option<usize>,
    pub difftool: Option<String>,
    pub concat: Option<bool>,
    pub keep_temp_files: Option<bool>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("failed to parse config file '{}': {}", path.display(), e))?;

        println!("loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| format!("failed to serialize config: {}", e))?;
        fs::write(path, content).map_err(|e| format!("failed to write config file '{}': {}", path.display(), e))?;
        println!("saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments.
    pub fn generate_sample() -> String {
        r#"# styleprobe.toml - configuration file for styleprobe
# Command line arguments override these settings.

# =============================================================================
# FORMATTER
# =============================================================================

# Path to the formatter executable (omit to resolve from PATH by file extension)
# formatter = "/usr/bin/clang-format"

# Force a specific adapter instead of inferring it from file extension
# formatter_name = "clang-format"

# =============================================================================
# SEARCH
# =============================================================================

# Search mode: normal, minimize, maximize, maxdiff
# (resilient and stylediff are recognized but rejected, pending implementation)
mode = "normal"

# Option names to exclude from the search
# ignore = ["DeriveLineEnding"]

# Maximum number of search rounds
max_rounds = 64

# Report this many runner-up attempts' option diffs alongside the winner
bestofround = 0

# Join all input files into one synthetic document before searching
concat = false

# Keep temp files (config sidecars, diff-tool scratch input) on disk after exit
# keep_temp_files = false

# =============================================================================
# PERFORMANCE
# =============================================================================

# Concurrency mode: off, threads, processes
concurrency = "threads"

# Number of worker threads (omit for auto-detection)
# threads = 8

# Cache backend: off, dedup, flat
cache_mode = "dedup"

# Path to the cache database or directory (omit for the OS temp directory)
# cache_path = "/var/tmp/styleprobe-cache"

# Diff tool: auto, builtin, diff, git
difftool = "auto"

# =============================================================================
# OUTPUT
# =============================================================================

# Starting style as a YAML-flow literal
# start_style = "{BasedOnStyle: LLVM, ColumnLimit: 79}"

# Path to write the inferred style file (omit to print to stdout)
# output_style = "styleprobe-result.cfg"

# Path to write the metric sidecar line for regression comparisons
# save_metric = "styleprobe-metric.txt"
"#
        .to_string()
    }
}
