// clang.rs - adapter for clang-format and clang-format-compatible tools

use std::process::Command;

use super::history::{self, CLANG_FORMAT_EVOLUTION};
use super::miniyaml::parse_miniyaml;
use super::traits::{FormatterAdapter, Variant};
use crate::runner::{ExeCall, ExeResult};
use crate::style::{algebra, OptionType, OptionValue, Style, StyleSchema};

const BASE_STYLE_OPTION: &str = "BasedOnStyle";
const TAB_USAGE_OPTION: &str = "UseTab";
const TAB_WIDTH_OPTION: &str = "TabWidth";
const BRACE_OPTION: &str = "BreakBeforeBraces";
const BRACE_WRAPPING_OPTION: &str = "BraceWrapping";

#[derive(Debug, Default)]
pub struct ClangFamilyAdapter {
    schema: StyleSchema,
}

pub fn new_adapter() -> Box<dyn FormatterAdapter> {
    Box::new(ClangFamilyAdapter::default())
}

impl ClangFamilyAdapter {
    fn live_dump_config(&self, exe: &str) -> Option<Style> {
        let output = Command::new(exe).arg("-style=LLVM").arg("-dump-config").output().ok()?;
        if !output.status.success() {
            return None;
        }
        Some(parse_miniyaml(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl FormatterAdapter for ClangFamilyAdapter {
    fn name(&self) -> &str {
        "clang-format"
    }

    fn register_schema(&mut self, exe: &str) -> Result<(), String> {
        match self.live_dump_config(exe) {
            Some(live_style) => {
                let live_names: Vec<String> = live_style.keys().map(|k| k.to_string()).collect();
                let (_version, schema) = history::find_closest_version(CLANG_FORMAT_EVOLUTION, &live_names);
                self.schema = schema;
                // Unknown options the live binary reports that aren't in
                // any replayed schema are added as plain booleans, the
                // conservative assumption for an option we can't classify.
                for name in &live_names {
                    if !self.schema.contains(name) {
                        self.schema.register(crate::style::OptionDef::new(name.clone(), OptionType::Bool));
                    }
                }
            }
            None => {
                // No live binary reachable (e.g. under test with a stub
                // executable): fall back to the newest replayed schema.
                let (schema, _) = history::replay_up_to(CLANG_FORMAT_EVOLUTION, "3.8");
                self.schema = schema;
            }
        }
        Ok(())
    }

    fn schema(&self) -> &StyleSchema {
        &self.schema
    }

    fn variants_for(&self, option_name: &str) -> Vec<Variant> {
        if option_name == TAB_WIDTH_OPTION {
            // Covered by UseTab's interdependent product; see
            // `interdependent_with`.
            return Vec::new();
        }

        let Some(def) = self.schema.get(option_name) else { return Vec::new() };

        if option_name == TAB_USAGE_OPTION {
            return tab_usage_variants();
        }

        match &def.option_type {
            OptionType::Bool => vec![true, false]
                .into_iter()
                .map(|b| Variant::new(Style::single(option_name, OptionValue::Bool(b))))
                .collect(),
            OptionType::Enum(values) => values
                .iter()
                .map(|v| Variant::new(Style::single(option_name, OptionValue::Str(v.clone()))))
                .collect(),
            OptionType::Unsigned if option_name == "ColumnLimit" => {
                std::iter::once(0)
                    .chain(79..=120)
                    .map(|n| Variant::new(Style::single(option_name, OptionValue::Int(n))))
                    .collect()
            }
            OptionType::Int | OptionType::Unsigned => (0..=8)
                .map(|n| Variant::new(Style::single(option_name, OptionValue::Int(n))))
                .collect(),
            OptionType::Str => Vec::new(),
            OptionType::Nested(inner) => inner
                .iter()
                .map(|sub| {
                    let mut nested = Style::new();
                    nested.set(&sub.name, OptionValue::Bool(true));
                    Variant::new(Style::single(option_name, OptionValue::Nested(nested)))
                })
                .collect(),
        }
    }

    fn interdependent_with(&self, option_name: &str) -> Option<&str> {
        if option_name == TAB_USAGE_OPTION {
            Some(TAB_WIDTH_OPTION)
        } else {
            None
        }
    }

    fn argv_for_style(&self, _exe: &str, style: &Style) -> Result<Vec<String>, String> {
        Ok(vec![format!("-style={}", inline_style(style))])
    }

    fn serialize(&self, style: &Style) -> Vec<u8> {
        let mut out = String::from("---\n");
        for (key, value) in style.iter() {
            match value {
                OptionValue::Nested(nested) => {
                    out.push_str(&format!("{}:\n", key));
                    for (sub_key, sub_value) in nested.iter() {
                        out.push_str(&format!("  {}: {}\n", sub_key, sub_value.textrepr()));
                    }
                }
                other => out.push_str(&format!("{}: {}\n", key, other.textrepr())),
            }
        }
        out.push_str("...\n");
        out.into_bytes()
    }

    fn detects_invalid_cmdline(&self, result: &ExeResult) -> bool {
        let stderr = String::from_utf8_lossy(&result.stderr);
        stderr.contains("unknown option") || stderr.contains("invalid configuration")
    }

    fn effective_style(&self, exe: &str, style: &Style) -> Style {
        let argv = vec![format!("-style={}", inline_style(style)), "-dump-config".to_string()];
        let call = ExeCall::new(exe, argv, Vec::new());
        let result = crate::runner::run(&call);
        if result.exit_code == Some(0) {
            parse_miniyaml(&String::from_utf8_lossy(&result.stdout))
        } else {
            style.clone()
        }
    }

    fn complexity(&self, style: &Style) -> i64 {
        let mut score = style.len() as i64;
        for (_, value) in style.iter() {
            if let OptionValue::Int(n) = value {
                if *n > 120 {
                    score += 2;
                }
            }
            if let OptionValue::Nested(nested) = value {
                score += nested.len() as i64;
            }
        }
        score
    }

    fn extra_penalty(&self, style: &Style, complexity: i64) -> (i64, i64) {
        // A custom brace-wrapping group scores the same diff distance as a
        // standard named preset would in many cases; nudge the standard
        // choice ahead by penalizing the custom group's extra surface.
        let penalty = if style.get(BRACE_WRAPPING_OPTION).is_some() { 3 } else { 0 };
        (complexity, penalty)
    }

    fn contains_major_style(&self, group: &Style) -> bool {
        group.contains(BASE_STYLE_OPTION)
    }

    fn prefer_basestyle(&self) -> bool {
        true
    }

    fn nested_derivations(&self, style: &Style) -> Vec<Style> {
        let already_custom = matches!(style.get(BRACE_OPTION), Some(OptionValue::Str(s)) if s == "Custom");
        if already_custom {
            return Vec::new();
        }
        if let Some(def) = self.schema.get(BRACE_OPTION) {
            if let OptionType::Enum(values) = &def.option_type {
                if values.iter().any(|v| v == "Custom") {
                    let unlocked = algebra::merge(style, &Style::single(BRACE_OPTION, OptionValue::Str("Custom".into())));
                    return vec![unlocked];
                }
            }
        }
        Vec::new()
    }

    fn handles_extension(&self, ext: &str) -> bool {
        matches!(ext, "c" | "cc" | "cpp" | "cxx" | "h" | "hpp" | "hh" | "m" | "mm" | "java" | "js" | "proto")
    }
}

fn tab_usage_variants() -> Vec<Variant> {
    let mut out = vec![Variant::new(Style::single(TAB_USAGE_OPTION, OptionValue::Str("Never".into())))];
    for usage in ["ForIndentation", "Always"] {
        for width in 1..=8 {
            let mut group = Style::new();
            group.set(TAB_USAGE_OPTION, OptionValue::Str(usage.into()));
            group.set(TAB_WIDTH_OPTION, OptionValue::Int(width));
            out.push(Variant::new(group));
        }
    }
    out
}

fn inline_style(style: &Style) -> String {
    algebra::signature(style)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s1_usetab_tabwidth_combinatorics() {
        let variants = tab_usage_variants();
        assert_eq!(variants.len(), 1 + 8 + 8);
        assert_eq!(variants[0].group.get(TAB_USAGE_OPTION).unwrap().as_str(), Some("Never"));
        assert!(variants[0].group.get(TAB_WIDTH_OPTION).is_none());
    }

    #[test]
    fn scenario_s3_boolean_enumeration_order() {
        let mut adapter = ClangFamilyAdapter::default();
        let (schema, _) = history::replay_up_to(CLANG_FORMAT_EVOLUTION, "3.5");
        adapter.schema = schema;
        let variants = adapter.variants_for("IndentCaseLabels");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].group.get("IndentCaseLabels").unwrap().as_bool(), Some(true));
        assert_eq!(variants[1].group.get("IndentCaseLabels").unwrap().as_bool(), Some(false));
    }

    #[test]
    fn nested_derivation_unlocks_brace_wrapping() {
        let mut adapter = ClangFamilyAdapter::default();
        let (schema, _) = history::replay_up_to(CLANG_FORMAT_EVOLUTION, "3.6");
        adapter.schema = schema;
        let style = Style::new();
        let derived = adapter.nested_derivations(&style);
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].get(BRACE_OPTION).unwrap().as_str(), Some("Custom"));
    }

    #[test]
    fn column_limit_candidates_include_zero_and_common_widths() {
        let mut adapter = ClangFamilyAdapter::default();
        let (schema, _) = history::replay_up_to(CLANG_FORMAT_EVOLUTION, "3.5");
        adapter.schema = schema;
        let variants = adapter.variants_for("ColumnLimit");
        assert_eq!(variants.len(), 1 + (120 - 79 + 1));
        assert_eq!(variants[0].group.get("ColumnLimit").unwrap().as_int(), Some(0));
    }
}
