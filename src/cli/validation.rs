// validation.rs - turns raw `Args` into resolved, checked values the rest of the crate can trust

use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::Args;
use crate::diff::DiffTool;
use crate::dispatcher::ConcurrencyMode;
use crate::engine::types::Mode;
use crate::engine::SearchConfig;
use crate::formatters::{miniyaml, FormatterAdapter, FormatterRegistry};
use crate::style::Style;

/// Cache backend selection, kept distinct from `ConcurrencyMode`/`Mode`
/// since "off" here means "never touch the cache", not "run inline".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Off,
    Dedup,
    Flat,
}

impl FromStr for CacheMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(CacheMode::Off),
            "dedup" => Ok(CacheMode::Dedup),
            "flat" => Ok(CacheMode::Flat),
            other => Err(format!("unknown cache mode '{}'", other)),
        }
    }
}

pub struct ValidationResult {
    pub inputs: Vec<PathBuf>,
    pub references: Vec<PathBuf>,
    pub formatter_exe: String,
    pub adapter_name: String,
    pub start_style: Style,
    pub search_config: SearchConfig,
    pub cache_mode: CacheMode,
    pub cache_path: Option<PathBuf>,
    pub output_style: Option<PathBuf>,
    pub save_metric: Option<PathBuf>,
    pub concat: bool,
    pub verbose: bool,
    pub keep_temp_files: bool,
}

/// Validates and resolves everything `main` needs before it can build a
/// formatter adapter and hand the search engine its first style. Fails
/// fast and cheap: no process is spawned here beyond what extension
/// sniffing and PATH lookups require.
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    if args.inputs.is_empty() {
        return Err("at least one input file is required".to_string());
    }

    let inputs: Vec<PathBuf> = args.inputs.iter().map(PathBuf::from).collect();
    for input in &inputs {
        if !input.is_file() {
            return Err(format!("input file not found: {}", input.display()));
        }
    }

    let references = if args.reference.is_empty() {
        inputs.clone()
    } else if args.reference.len() == inputs.len() {
        let references: Vec<PathBuf> = args.reference.iter().map(PathBuf::from).collect();
        for reference in &references {
            if !reference.is_file() {
                return Err(format!("reference file not found: {}", reference.display()));
            }
        }
        references
    } else {
        return Err(format!(
            "{} --reference values given but {} input files were given; supply one reference per input or none at all",
            args.reference.len(),
            inputs.len()
        ));
    };

    let mode = Mode::from_str(&args.mode)?;
    if matches!(mode, Mode::Resilient | Mode::Stylediff) {
        return Err(format!(
            "mode '{}' is not implemented in this build; supported modes are normal, minimize, maximize, maxdiff",
            args.mode
        ));
    }
    let concurrency = ConcurrencyMode::from_str(&args.concurrency)?;
    let cache_mode = CacheMode::from_str(&args.cache_mode)?;
    let diff_tool = if args.difftool == "auto" {
        DiffTool::autodetect()
    } else {
        parse_difftool(&args.difftool)?
    };

    let registry = FormatterRegistry::new();
    let formatter_exe = args.formatter.clone().unwrap_or_else(|| default_formatter_for(&args.formatter_name));

    let adapter_name = match &args.formatter_name {
        Some(name) => {
            if !registry.has_adapter(name) {
                return Err(format!(
                    "unknown formatter '{}'; available: {}",
                    name,
                    registry.adapter_names().join(", ")
                ));
            }
            name.clone()
        }
        None => {
            let extensions: Vec<String> = inputs
                .iter()
                .filter_map(|p| p.extension().and_then(|e| e.to_str()).map(|e| format!(".{}", e)))
                .collect();
            registry
                .resolve_for(&formatter_exe, &extensions)
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    format!(
                        "could not infer a formatter adapter from '{}' or extensions {:?}; pass --formatter-name explicitly (available: {})",
                        formatter_exe,
                        extensions,
                        registry.adapter_names().join(", ")
                    )
                })?
        }
    };

    let start_style = match &args.start_style {
        Some(literal) => miniyaml::parse_miniyaml(literal),
        None => Style::new(),
    };

    let ignore_options: std::collections::HashSet<String> = args.ignore.iter().cloned().collect();

    let search_config = SearchConfig {
        mode,
        max_rounds: args.max_rounds,
        ignore_options,
        acceptance_strict_from_round: 3,
        bestofround: args.bestofround,
        concurrency,
        diff_tool,
        additive: true,
    };

    Ok(ValidationResult {
        inputs,
        references,
        formatter_exe,
        adapter_name,
        start_style,
        search_config,
        cache_mode,
        cache_path: args.cache_path.clone().map(PathBuf::from),
        output_style: args.output_style.clone().map(PathBuf::from),
        save_metric: args.save_metric.clone().map(PathBuf::from),
        concat: args.concat,
        verbose: args.verbose,
        keep_temp_files: args.keep_temp_files,
    })
}

fn parse_difftool(s: &str) -> Result<DiffTool, String> {
    match s {
        "builtin" => Ok(DiffTool::Builtin),
        "diff" => Ok(DiffTool::ExternalDiff),
        "git" => Ok(DiffTool::ExternalGitDiff),
        other => Err(format!("unknown diff tool '{}'", other)),
    }
}

fn default_formatter_for(forced_adapter: &Option<String>) -> String {
    match forced_adapter.as_deref() {
        Some("rustfmt") => "rustfmt".to_string(),
        _ => "clang-format".to_string(),
    }
}

/// Builds the concrete adapter the search engine will drive, already
/// registered against the resolved executable (clang-family replays its
/// option-history table against `--dump-config`; rustfmt's TOML-line
/// adapter scrapes `--config-help`).
pub fn build_adapter(registry: &FormatterRegistry, adapter_name: &str, exe: &str) -> Result<Box<dyn FormatterAdapter>, String> {
    let mut adapter = registry
        .build(adapter_name)
        .ok_or_else(|| format!("unknown formatter adapter '{}'", adapter_name))?;
    adapter.register_schema(exe)?;
    Ok(adapter)
}