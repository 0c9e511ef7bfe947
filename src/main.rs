// main.rs - CLI entry point

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use styleprobe::cli::{validate_args, Args, Config};
use styleprobe::cli::validation::{build_adapter, CacheMode, ValidationResult};
use styleprobe::engine::{InputFile, SearchEngine};
use styleprobe::formatters::FormatterRegistry;
use styleprobe::output;
use styleprobe::prelude::Cache;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();

    if args.generate_config {
        println!("{}", Config::generate_sample());
        println!("\n# save this content to a .toml file and pass it via --config /path/to/config.toml");
        return Ok(());
    }

    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    init_logging(args.verbose);

    let validated = validate_args(&args)?;
    styleprobe::tempfiles::set_keep_temp_files(validated.keep_temp_files);

    let registry = FormatterRegistry::new();
    let mut adapter = build_adapter(&registry, &validated.adapter_name, &validated.formatter_exe)?;
    tracing::info!(adapter = %validated.adapter_name, exe = %validated.formatter_exe, "resolved formatter");

    let cache = build_cache(&validated)?;

    let inputs = load_inputs(&validated)?;
    tracing::info!(files = inputs.len(), "loaded input files");

    let cancelled = Arc::new(AtomicBool::new(false));

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("searching for the least-churn style...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    let started = Instant::now();
    let mut engine = SearchEngine::new(
        adapter.as_mut(),
        validated.formatter_exe.clone(),
        inputs,
        cache.as_ref(),
        validated.search_config,
        cancelled,
    );
    let outcome = engine.run(validated.start_style);
    spinner.finish_and_clear();

    let outcome = outcome.map_err(|e| e.to_string())?;
    let elapsed = started.elapsed();

    tracing::info!(
        rounds = outcome.rounds_run,
        diff_sum = outcome.best.distance.diff_sum,
        complexity = outcome.best.distance.complexity,
        elapsed_secs = elapsed.as_secs_f64(),
        "search finished"
    );

    output::write_style(adapter.as_ref(), &outcome.best.style, validated.output_style.as_deref())?;

    if !outcome.runner_up_diffs.is_empty() {
        eprint!("{}", output::render_runner_up_report(&outcome));
    }

    if let Some(metric_path) = &validated.save_metric {
        output::write_metric_sidecar(&validated.formatter_exe, &outcome, metric_path)?;
    }

    if let Some(cache) = &cache {
        cache.close()?;
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "styleprobe=debug" } else { "styleprobe=info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_cache(validated: &ValidationResult) -> Result<Option<Cache>, String> {
    let path = validated
        .cache_path
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("styleprobe-cache"));

    match validated.cache_mode {
        CacheMode::Off => Ok(None),
        CacheMode::Dedup => Cache::dedup_backend(&path).map(Some),
        CacheMode::Flat => Cache::flat_backend(&path).map(Some),
    }
}

fn load_inputs(validated: &ValidationResult) -> Result<Vec<InputFile>, String> {
    if validated.concat {
        let mut stdin = Vec::new();
        let mut reference_bytes = Vec::new();
        for (input, reference) in validated.inputs.iter().zip(validated.references.iter()) {
            stdin.extend(std::fs::read(input).map_err(|e| format!("reading {}: {}", input.display(), e))?);
            reference_bytes.extend(std::fs::read(reference).map_err(|e| format!("reading {}: {}", reference.display(), e))?);
        }
        return Ok(vec![InputFile {
            source: validated.inputs[0].clone(),
            reference: validated.references[0].clone(),
            stdin,
            reference_bytes,
        }]);
    }

    let mut inputs = Vec::with_capacity(validated.inputs.len());
    for (source, reference) in validated.inputs.iter().zip(validated.references.iter()) {
        let stdin = std::fs::read(source).map_err(|e| format!("reading {}: {}", source.display(), e))?;
        let reference_bytes = std::fs::read(reference).map_err(|e| format!("reading {}: {}", reference.display(), e))?;
        inputs.push(InputFile { source: source.clone(), reference: reference.clone(), stdin, reference_bytes });
    }
    Ok(inputs)
}
