// tomlline.rs - adapter for rustfmt-shaped formatters: flat `key = value` TOML
// config file referenced by `--config-path`, source read from stdin.

use std::process::Command;
use std::sync::Mutex;

use regex::Regex;

use super::traits::{FormatterAdapter, Variant};
use crate::runner::ExeResult;
use crate::style::{OptionDef, OptionType, OptionValue, Style, StyleSchema};
use crate::tempfiles::{content_digest_hex, TempScope};

#[derive(Debug)]
pub struct TomlLineAdapter {
    schema: StyleSchema,
    temp_scope: Mutex<Option<TempScope>>,
}

impl Default for TomlLineAdapter {
    fn default() -> Self {
        Self { schema: StyleSchema::new(), temp_scope: Mutex::new(None) }
    }
}

pub fn new_adapter() -> Box<dyn FormatterAdapter> {
    Box::new(TomlLineAdapter::default())
}

/// Hand-picked candidate ranges for options whose `--config-help` text
/// only advertises a type, not a usable value set, matching the
/// `max_width ∈ 80..100`, `tab_spaces ∈ 1..8` style of unbounded-numeric
/// enumeration.
fn numeric_candidates(name: &str) -> Vec<i64> {
    match name {
        "max_width" => (80..=100).collect(),
        "tab_spaces" => (1..=8).collect(),
        "indent_width" => (0..=8).collect(),
        _ => (0..=4).collect(),
    }
}

impl TomlLineAdapter {
    fn help_line_regex() -> Regex {
        // `key <type> Default: value` — e.g. `max_width <unsigned> Default: 100`
        Regex::new(r"^(?P<name>[a-z_]+)\s+<(?P<type>[a-z_]+)>\s+Default:\s*(?P<default>.+)$").unwrap()
    }
}

impl FormatterAdapter for TomlLineAdapter {
    fn name(&self) -> &str {
        "rustfmt"
    }

    fn register_schema(&mut self, exe: &str) -> Result<(), String> {
        let output = Command::new(exe).arg("--config-help").output();
        let mut schema = StyleSchema::new();
        if let Ok(output) = output {
            let text = String::from_utf8_lossy(&output.stdout);
            let re = Self::help_line_regex();
            for line in text.lines() {
                let Some(caps) = re.captures(line.trim()) else { continue };
                let name = caps["name"].to_string();
                let option_type = match &caps["type"] {
                    "bool" => OptionType::Bool,
                    "unsigned" | "usize" => OptionType::Unsigned,
                    "string" | "str" => OptionType::Str,
                    other => {
                        let variants: Vec<String> =
                            other.split('|').map(|s| s.trim().to_string()).collect();
                        if variants.len() > 1 {
                            OptionType::Enum(variants)
                        } else {
                            OptionType::Str
                        }
                    }
                };
                schema.register(OptionDef::new(name, option_type));
            }
        }
        if schema.is_empty() {
            // No live binary reachable: fall back to a fixed baseline
            // schema covering the options this adapter's tests exercise.
            schema.register(OptionDef::new("max_width", OptionType::Unsigned));
            schema.register(OptionDef::new("tab_spaces", OptionType::Unsigned));
            schema.register(OptionDef::new("hard_tabs", OptionType::Bool));
            schema.register(OptionDef::new("use_small_heuristics", OptionType::Enum(vec!["Default".into(), "Off".into(), "Max".into()])));
        }
        self.schema = schema;
        Ok(())
    }

    fn schema(&self) -> &StyleSchema {
        &self.schema
    }

    fn variants_for(&self, option_name: &str) -> Vec<Variant> {
        let Some(def) = self.schema.get(option_name) else { return Vec::new() };
        match &def.option_type {
            OptionType::Bool => vec![true, false]
                .into_iter()
                .map(|b| Variant::new(Style::single(option_name, OptionValue::Bool(b))))
                .collect(),
            OptionType::Enum(values) => values
                .iter()
                .map(|v| Variant::new(Style::single(option_name, OptionValue::Str(v.clone()))))
                .collect(),
            OptionType::Int | OptionType::Unsigned => numeric_candidates(option_name)
                .into_iter()
                .map(|n| Variant::new(Style::single(option_name, OptionValue::Int(n))))
                .collect(),
            OptionType::Str | OptionType::Nested(_) => Vec::new(),
        }
    }

    fn argv_for_style(&self, _exe: &str, style: &Style) -> Result<Vec<String>, String> {
        let content = self.serialize(style);
        let digest = content_digest_hex(&content);
        let mut guard = self.temp_scope.lock().map_err(|_| "temp scope poisoned".to_string())?;
        if guard.is_none() {
            *guard = Some(TempScope::scoped()?);
        }
        let path = guard.as_ref().unwrap().write(&digest, "toml", &content)?;
        Ok(vec!["--config-path".to_string(), path.to_string_lossy().into_owned()])
    }

    fn serialize(&self, style: &Style) -> Vec<u8> {
        let mut out = String::new();
        for (key, value) in style.iter() {
            match value {
                OptionValue::Str(s) => out.push_str(&format!("{} = \"{}\"\n", key, s)),
                other => out.push_str(&format!("{} = {}\n", key, other.textrepr())),
            }
        }
        out.into_bytes()
    }

    fn detects_invalid_cmdline(&self, result: &ExeResult) -> bool {
        let stderr = String::from_utf8_lossy(&result.stderr);
        stderr.contains("Error: unknown config key") || stderr.contains("invalid key")
    }

    fn contains_major_style(&self, _group: &Style) -> bool {
        false
    }

    fn prefer_basestyle(&self) -> bool {
        false
    }

    fn handles_extension(&self, ext: &str) -> bool {
        ext == "rs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_help_regex_parses_typed_default_line() {
        let re = TomlLineAdapter::help_line_regex();
        let caps = re.captures("max_width <unsigned> Default: 100").unwrap();
        assert_eq!(&caps["name"], "max_width");
        assert_eq!(&caps["type"], "unsigned");
        assert_eq!(&caps["default"], "100");
    }

    #[test]
    fn numeric_candidates_match_hand_picked_ranges() {
        assert_eq!(numeric_candidates("max_width").len(), 21);
        assert_eq!(numeric_candidates("tab_spaces"), (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn serialize_quotes_string_values_only() {
        let mut adapter = TomlLineAdapter::default();
        adapter.schema.register(OptionDef::new("edition", OptionType::Str));
        let style = Style::single("edition", OptionValue::Str("2021".into()));
        let bytes = adapter.serialize(&style);
        assert_eq!(String::from_utf8(bytes).unwrap(), "edition = \"2021\"\n");
    }
}
