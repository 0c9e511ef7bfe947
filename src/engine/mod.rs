// mod.rs - search engine: the optimization loop that composes every other component

pub mod types;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub use types::{Attempt, DistanceVector, Mode};

use crate::cache::Cache;
use crate::diff::{self, DiffTool};
use crate::dispatcher::{ConcurrencyMode, Dispatcher, Job};
use crate::formatters::FormatterAdapter;
use crate::runner::ExeCall;
use crate::style::{algebra, signature, Style};

/// One input file's source bytes and the reference it is compared against
/// (itself, unless `--references` names a different file).
pub struct InputFile {
    pub source: PathBuf,
    pub reference: PathBuf,
    pub stdin: Vec<u8>,
    pub reference_bytes: Vec<u8>,
}

pub struct SearchConfig {
    pub mode: Mode,
    pub max_rounds: u32,
    pub ignore_options: HashSet<String>,
    pub acceptance_strict_from_round: u32,
    pub bestofround: usize,
    pub concurrency: ConcurrencyMode,
    pub diff_tool: DiffTool,
    /// `false` only in `stylediff` mode: existing values may be altered
    /// rather than only adding previously-absent options.
    pub additive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            max_rounds: 64,
            ignore_options: HashSet::new(),
            acceptance_strict_from_round: 3,
            bestofround: 0,
            concurrency: ConcurrencyMode::Threads,
            diff_tool: DiffTool::Builtin,
            additive: true,
        }
    }
}

pub struct SearchEngine<'a> {
    adapter: &'a mut dyn FormatterAdapter,
    exe: String,
    inputs: Vec<InputFile>,
    cache: Option<&'a Cache>,
    config: SearchConfig,
    cancelled: Arc<AtomicBool>,

    ordinal: u64,
    evaluations: Vec<Attempt>,
    global_worse_options: HashMap<String, u32>,
    invalid_cmdline_options: HashSet<String>,
    finished_styles: HashSet<String>,
    visited_signatures: HashSet<String>,
}

/// Summary emitted once the search terminates.
pub struct SearchOutcome {
    pub best: Attempt,
    pub rounds_run: u32,
    pub runner_up_diffs: Vec<(crate::style::Style, crate::style::Style)>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(
        adapter: &'a mut dyn FormatterAdapter,
        exe: String,
        inputs: Vec<InputFile>,
        cache: Option<&'a Cache>,
        config: SearchConfig,
        cancelled: Arc<AtomicBool>,
    ) -> Self {
        Self {
            adapter,
            exe,
            inputs,
            cache,
            config,
            cancelled,
            ordinal: 0,
            evaluations: Vec::new(),
            global_worse_options: HashMap::new(),
            invalid_cmdline_options: HashSet::new(),
            finished_styles: HashSet::new(),
            visited_signatures: HashSet::new(),
        }
    }

    fn next_ordinal(&mut self) -> u64 {
        let n = self.ordinal;
        self.ordinal += 1;
        n
    }

    /// Runs the whole state machine: Initialize, Round 0, Round k>=1 until
    /// termination. `start_style` is the user-provided `--startstyle`
    /// value, or an empty style.
    pub fn run(&mut self, start_style: Style) -> Result<SearchOutcome, crate::error::EngineError> {
        diff::validate_diff_tool(self.config.diff_tool).map_err(crate::error::EngineError::Launch)?;

        // Initialize.
        let seed = algebra::merge(&self.adapter.initial_style(), &start_style);
        let seed_ordinal = self.next_ordinal();
        self.visited_signatures.insert(signature(&seed));

        // Round 0: baseline measurement, no derivations.
        let baseline_distance = self.evaluate(&seed, None, seed_ordinal);
        let baseline_distance = baseline_distance
            .ok_or_else(|| crate::error::EngineError::NoValidCandidates("the files could not be reformatted at all".to_string()))?;
        self.evaluations.push(Attempt { style: seed, group_key: String::new(), distance: baseline_distance });

        let mut round: u32 = 1;
        let mut nested_pool: Option<Vec<Attempt>> = None;

        loop {
            if round > self.config.max_rounds || self.cancelled.load(std::sync::atomic::Ordering::Relaxed) {
                break;
            }

            let pool: &mut Vec<Attempt> = nested_pool.as_mut().unwrap_or(&mut self.evaluations);
            let Some(best_idx) = Self::argmin(pool) else { break };
            let best_before = pool[best_idx].distance;
            let parent_style = pool[best_idx].style.clone();

            let derivations = self.generate_derivations(&parent_style, round);
            let mut any_accepted = false;

            for variant in derivations {
                if self.visited_signatures.contains(&signature(&algebra::merge(&parent_style, &variant.group))) {
                    continue;
                }
                let candidate = algebra::merge(&parent_style, &variant.group);
                let candidate_signature = signature(&candidate);
                self.visited_signatures.insert(candidate_signature);

                let ordinal = self.next_ordinal();
                match self.evaluate(&candidate, Some(&variant.group_key), ordinal) {
                    None => {
                        // Invalid result already classified/blacklisted
                        // inside `evaluate`.
                        *self.global_worse_options.entry(variant.group_key.clone()).or_insert(0) += 1;
                    }
                    Some(distance) => {
                        let strictly_better = distance.strictly_better_than(&best_before);
                        let accept = if round < self.config.acceptance_strict_from_round { true } else { strictly_better };

                        if !strictly_better {
                            *self.global_worse_options.entry(variant.group_key.clone()).or_insert(0) += 1;
                        }
                        if accept {
                            let pool = nested_pool.as_mut().unwrap_or(&mut self.evaluations);
                            pool.push(Attempt { style: candidate, group_key: variant.group_key.clone(), distance });
                            any_accepted = any_accepted || strictly_better;
                        }
                    }
                }
            }

            let pool = nested_pool.as_mut().unwrap_or(&mut self.evaluations);
            let Some(new_best_idx) = Self::argmin(pool) else { break };
            let improved = pool[new_best_idx].distance.strictly_better_than(&best_before);

            if !improved && !any_accepted {
                let finished = pool[best_idx].clone();
                self.finished_styles.insert(signature(&finished.style));

                let nested = self.adapter.nested_derivations(&finished.style);
                if nested.is_empty() {
                    break;
                }
                let mut seeded = Vec::new();
                for style in nested {
                    let ordinal = self.next_ordinal();
                    seeded.push(Attempt { style, group_key: "nested".to_string(), distance: DistanceVector::sentinel(ordinal) });
                }
                nested_pool = Some(seeded);
                round += 1;
                continue;
            }

            round += 1;
        }

        let final_pool = nested_pool.as_ref().unwrap_or(&self.evaluations);
        let best_idx = Self::argmin(final_pool).expect("at least the seed attempt always exists");
        let best = final_pool[best_idx].clone();

        let mut runner_up_diffs = Vec::new();
        if self.config.bestofround > 0 {
            let mut sorted: Vec<&Attempt> = final_pool.iter().collect();
            sorted.sort_by_key(|a| a.distance);
            for runner_up in sorted.iter().skip(1).take(self.config.bestofround) {
                let (ua, ub) = algebra::diff(&best.style, &runner_up.style);
                runner_up_diffs.push((ua, ub));
            }
        }

        Ok(SearchOutcome { best, rounds_run: round.saturating_sub(1), runner_up_diffs })
    }

    fn argmin(pool: &[Attempt]) -> Option<usize> {
        pool.iter().enumerate().min_by_key(|(_, a)| a.distance).map(|(i, _)| i)
    }

    /// Round k's derivation generation with the five pruning rules from
    /// §4.6, in order.
    fn generate_derivations(&self, parent: &Style, round: u32) -> Vec<crate::formatters::Variant> {
        let mut skip_names: HashSet<String> = self.config.ignore_options.clone();
        let mut out = Vec::new();

        for def in self.adapter.schema().iter() {
            if skip_names.contains(&def.name) || self.adapter.is_ignored(&def.name) {
                continue;
            }
            if let Some(companion) = self.adapter.interdependent_with(&def.name) {
                skip_names.insert(companion.to_string());
            }

            for variant in self.adapter.variants_for(&def.name) {
                // Rule 1: blacklisted groups (invalid cmdline or globally worse).
                if self.invalid_cmdline_options.contains(&variant.group_key) {
                    continue;
                }
                if self.global_worse_options.contains_key(&variant.group_key) {
                    continue;
                }
                // Rule 2: additive mode skips re-adding an already-present option.
                if self.config.additive && variant.group.keys().all(|k| parent.contains(k)) && !variant.group.is_empty()
                {
                    continue;
                }
                // Rule 3: round 1, additive mode, base-style preference.
                if self.config.additive
                    && round == 1
                    && self.adapter.prefer_basestyle()
                    && !self.adapter.contains_major_style(&variant.group)
                {
                    continue;
                }
                // Rule 4: no observable difference from what the formatter already does.
                let merged = algebra::merge(parent, &variant.group);
                let effective = self.adapter.effective_style(&self.exe, &merged);
                if algebra::contains_all(&variant.group, &effective, true) {
                    continue;
                }
                out.push(variant);
            }
        }
        out
    }

    /// Runs all input files through the formatter for `style`, classifies
    /// validity, and computes the full distance vector. Returns `None`
    /// when any file's result is invalid. `group_key`, when given,
    /// identifies the option group this style was derived from, for
    /// blacklisting on an "unknown option" failure.
    fn evaluate(&mut self, style: &Style, group_key: Option<&str>, ordinal: u64) -> Option<DistanceVector> {
        let mut calls = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let argv = self.adapter.argv_for_style(&self.exe, style).ok()?;
            calls.push(ExeCall::new(self.exe.clone(), argv, input.stdin.clone()));
        }
        let jobs: Vec<Job> = calls.iter().cloned().map(|call| Job { call, dep_files: Vec::new() }).collect();

        let dispatcher = Dispatcher::new(self.cache, self.config.concurrency, Arc::clone(&self.cancelled));
        let results = dispatcher.dispatch(jobs);

        let mut diff_sum = 0i64;
        let mut llen_sum = 0i64;

        for ((input, call), result) in self.inputs.iter().zip(calls.iter()).zip(results.iter()) {
            let Some(result) = result.as_ref() else { return None };
            if self.adapter.detects_invalid_cmdline(result) {
                if let Some(key) = group_key {
                    self.invalid_cmdline_options.insert(key.to_string());
                }
                return None;
            }
            if !self.adapter.valid_result(call, result, !input.stdin.is_empty()) {
                return None;
            }

            let candidate_bytes = if result.stdout.is_empty() && self.adapter.empty_stdout_means_unchanged() {
                input.stdin.clone()
            } else {
                result.stdout.clone()
            };

            diff_sum += metric_for_mode(self.config.mode, self.config.diff_tool, &input.reference_bytes, &candidate_bytes);
            llen_sum += diff::avg_linelength_diff(&input.reference_bytes, &candidate_bytes);
        }

        let complexity = self.adapter.complexity(style);
        let (complexity, extra_penalty) = self.adapter.extra_penalty(style, complexity);

        Some(DistanceVector {
            diff_sum,
            linelength_sum: llen_sum,
            variant_diff_sum: None,
            variant_linelength_sum: None,
            complexity,
            extra_penalty,
            ordinal,
        })
    }
}

fn metric_for_mode(mode: Mode, tool: DiffTool, reference: &[u8], candidate: &[u8]) -> i64 {
    match mode {
        // Resilient/Stylediff are rejected by validate_args before a SearchEngine
        // is ever constructed; kept here only so this match stays exhaustive.
        Mode::Normal | Mode::Resilient | Mode::Stylediff => diff::metric_for_mindiff(tool, reference, candidate),
        Mode::Minimize => diff::metric_minimize_content(candidate),
        Mode::Maximize => diff::metric_maximize_content(candidate),
        Mode::Maxdiff => diff::metric_maximize_difference(tool, reference, candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_vector_orders_lower_as_better() {
        let better = DistanceVector { diff_sum: 1, linelength_sum: 0, variant_diff_sum: None, variant_linelength_sum: None, complexity: 0, extra_penalty: 0, ordinal: 5 };
        let worse = DistanceVector { diff_sum: 2, linelength_sum: 0, variant_diff_sum: None, variant_linelength_sum: None, complexity: 0, extra_penalty: 0, ordinal: 0 };
        assert!(better < worse);
        assert!(better.strictly_better_than(&worse));
    }

    #[test]
    fn ordinal_breaks_ties_without_affecting_strict_improvement() {
        let a = DistanceVector { diff_sum: 1, linelength_sum: 0, variant_diff_sum: None, variant_linelength_sum: None, complexity: 0, extra_penalty: 0, ordinal: 10 };
        let b = DistanceVector { diff_sum: 1, linelength_sum: 0, variant_diff_sum: None, variant_linelength_sum: None, complexity: 0, extra_penalty: 0, ordinal: 2 };
        assert!(!a.strictly_better_than(&b));
        assert!(!b.strictly_better_than(&a));
        assert!(b < a); // lower ordinal wins the total order between equal-quality attempts
    }
}
