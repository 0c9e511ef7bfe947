// traits.rs - the per-formatter capability set adapters implement

use std::fmt::Debug;

use crate::runner::{ExeCall, ExeResult};
use crate::style::{Style, StyleSchema};

/// A single proposed modification to a parent style: one or a few related
/// option assignments, plus the schema-derived name used for blacklisting
/// ("unknown option") and worse-option counting.
#[derive(Debug, Clone)]
pub struct Variant {
    pub group: Style,
    /// Sorted, comma-joined key list; the "option group signature" used by
    /// `invalid_cmdline_options` and `global_worse_options`.
    pub group_key: String,
}

impl Variant {
    pub fn new(group: Style) -> Self {
        let mut keys: Vec<&str> = group.keys().collect();
        keys.sort_unstable();
        let group_key = keys.join(",");
        Self { group, group_key }
    }
}

/// Polymorphic per-formatter behavior. One concrete type per formatter
/// family; no inheritance, shared behavior lives in free functions over
/// this interface (style algebra, the search engine itself).
pub trait FormatterAdapter: Send + Sync + Debug {
    /// Human-readable name, e.g. "clang-format" or "rustfmt".
    fn name(&self) -> &str;

    /// Populate the option schema by querying the formatter, parsing its
    /// help output, or replaying an embedded history. `exe` is the
    /// resolved path to the concrete formatter binary in use.
    fn register_schema(&mut self, exe: &str) -> Result<(), String>;

    fn schema(&self) -> &StyleSchema;

    /// The style the search should seed round 0 with before any
    /// user-supplied `--startstyle` override is merged in.
    fn initial_style(&self) -> Style {
        Style::new()
    }

    /// Enumerate candidate single-option assignments for `option_name`.
    /// Booleans yield `{true, false}`; bounded enums yield each value;
    /// unbounded numerics yield a hand-picked candidate set; options whose
    /// values are interdependent (e.g. a tab-usage enum coupled with a
    /// tab-width) are expected to be produced together as product variants
    /// by whichever of their names is queried first, with the other name
    /// omitted from iteration by the caller (see `interdependent_with`).
    fn variants_for(&self, option_name: &str) -> Vec<Variant>;

    /// Declares that `option_name`'s variants already cover `other_name`
    /// (e.g. `UseTab` covers `TabWidth`), so the engine's schema iteration
    /// should skip `other_name` on its own.
    fn interdependent_with(&self, _option_name: &str) -> Option<&str> {
        None
    }

    /// Options considered pass-through defaults; omitted from schema
    /// iteration entirely.
    fn is_ignored(&self, _option_name: &str) -> bool {
        false
    }

    /// Build the argv that makes the formatter read one source on stdin
    /// and emit the reformatted source on stdout for `style`. When the
    /// formatter cannot take a style inline, the adapter is responsible
    /// for writing a temp config file keyed by the style's content digest
    /// and referencing it in the returned argv.
    fn argv_for_style(&self, exe: &str, style: &Style) -> Result<Vec<String>, String>;

    /// Serialize `style` into the formatter's persistent configuration
    /// file format.
    fn serialize(&self, style: &Style) -> Vec<u8>;

    /// Classify a subprocess result. `stdin_nonempty` lets the adapter
    /// apply the "empty stdout from non-empty stdin" rule without
    /// re-reading the original bytes.
    fn valid_result(&self, call: &ExeCall, result: &ExeResult, stdin_nonempty: bool) -> bool {
        if result.os_error.is_some() || result.timed_out {
            return false;
        }
        if result.exit_code != Some(0) {
            return false;
        }
        if stdin_nonempty && result.stdout.is_empty() && !self.empty_stdout_means_unchanged() {
            return false;
        }
        let _ = call;
        true
    }

    /// Per-adapter policy (Design Notes open question #2, resolved as
    /// per-formatter data rather than a global flag): when `true`, empty
    /// stdout from non-empty stdin is substituted with the original input
    /// instead of being treated as invalid.
    fn empty_stdout_means_unchanged(&self) -> bool {
        false
    }

    /// Recognize "unknown option" failures so the engine can permanently
    /// blacklist the offending option group for the remainder of the run.
    fn detects_invalid_cmdline(&self, result: &ExeResult) -> bool;

    /// Ask the formatter what values it actually uses given a partial
    /// style, used to decide whether adding an option would have any
    /// observable effect. Adapters without a dump-config mechanism may
    /// return `style.clone()` (every addition is assumed observable).
    fn effective_style(&self, _exe: &str, style: &Style) -> Style {
        style.clone()
    }

    /// Penalize styles with many explicit options or oversized numeric
    /// values.
    fn complexity(&self, style: &Style) -> i64 {
        style.len() as i64
    }

    /// Secondary penalty layered on top of `complexity`, letting an
    /// adapter express "a standard combination beats an equally-scoring
    /// custom one" without changing the primary diff metric.
    fn extra_penalty(&self, style: &Style, complexity: i64) -> (i64, i64) {
        let _ = style;
        (complexity, 0)
    }

    /// Whether `group` sets the based-on/major style option.
    fn contains_major_style(&self, group: &Style) -> bool {
        let _ = group;
        false
    }

    /// Whether round 1 of additive search should be restricted to
    /// base-style selection.
    fn prefer_basestyle(&self) -> bool {
        false
    }

    /// Styles that unlock a previously unreachable nested option (e.g.
    /// switching a brace-break mode to "Custom" to expose per-wrapping
    /// switches). Consulted once round-by-round improvement stalls.
    fn nested_derivations(&self, _style: &Style) -> Vec<Style> {
        Vec::new()
    }

    /// File extensions this adapter claims to handle, used by the CLI to
    /// pick a default adapter for a set of input files.
    fn handles_extension(&self, _ext: &str) -> bool {
        false
    }
}
