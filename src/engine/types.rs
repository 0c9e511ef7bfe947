// types.rs - attempts, distance vectors, and search modes

use crate::style::Style;

/// Search mode (§4.6). `Normal`/`Minimize`/`Maximize` only change which
/// diff metric backs the primary distance component; `Maxdiff` negates it
/// again on top of whichever metric is selected. `Resilient` and
/// `Stylediff` are recognized here so `FromStr` can name them in error
/// messages, but neither is implemented: `validate_args` rejects both
/// before a search ever starts, so `SearchEngine` never observes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Minimize,
    Maximize,
    Maxdiff,
    Resilient,
    Stylediff,
}

impl std::str::FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Mode::Normal),
            "minimize" => Ok(Mode::Minimize),
            "maximize" => Ok(Mode::Maximize),
            "maxdiff" => Ok(Mode::Maxdiff),
            "resilient" => Ok(Mode::Resilient),
            "stylediff" => Ok(Mode::Stylediff),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// Fixed-arity, lexicographically ordered quality measure. Lower is
/// better; `ordinal` is a monotonically increasing injection-order counter
/// that guarantees a total, stable order even between attempts of
/// otherwise-equal quality. `variant_diff_sum`/`variant_linelength_sum`
/// are reserved for resilient mode's extreme-variant components; since
/// that mode is rejected at the CLI layer, both are always `None` today,
/// and sort before `Some` at equal magnitude so the reservation is inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DistanceVector {
    pub diff_sum: i64,
    pub linelength_sum: i64,
    pub variant_diff_sum: Option<i64>,
    pub variant_linelength_sum: Option<i64>,
    pub complexity: i64,
    pub extra_penalty: i64,
    pub ordinal: u64,
}

impl DistanceVector {
    pub fn sentinel(ordinal: u64) -> Self {
        Self {
            diff_sum: i64::MAX,
            linelength_sum: i64::MAX,
            variant_diff_sum: None,
            variant_linelength_sum: None,
            complexity: i64::MAX,
            extra_penalty: i64::MAX,
            ordinal,
        }
    }

    /// Strict improvement ignores `ordinal`, since two distinct attempts
    /// can never share every other component while meaningfully "tying" —
    /// the acceptance policy only cares about the quality components.
    pub fn strictly_better_than(&self, other: &Self) -> bool {
        let quality = |v: &Self| {
            (v.diff_sum, v.linelength_sum, v.variant_diff_sum, v.variant_linelength_sum, v.complexity, v.extra_penalty)
        };
        quality(self) < quality(other)
    }
}

/// A candidate style under consideration, with provenance: the option
/// group that produced it from its parent, and that group's signature for
/// blacklisting/worse-option bookkeeping.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub style: Style,
    pub group_key: String,
    pub distance: DistanceVector,
}
