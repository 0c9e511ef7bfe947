// history.rs - clang-family option-history grammar and embedded evolution table
//
// Line-oriented stream: `# Clang X.Y` introduces a version boundary,
// `+ Name Type` adds an option, `- Name Type` removes one. Indented lines
// under an `enum` entry list its permissible values; indented lines under
// a `nested` entry list sub-options as `bool SubName`.

use crate::style::{OptionDef, OptionType, StyleSchema};

/// Embedded schema evolution, release 3.5 through 3.8. Not a transcription
/// of any upstream changelog; hand-assembled from option names genuinely
/// present in that window of clang-format releases, trimmed to what this
/// crate's adapter actually drives.
pub const CLANG_FORMAT_EVOLUTION: &str = include_str!("clang_format_evolution.txt");

#[derive(Debug, Clone)]
struct VersionBlock {
    version: String,
    entries: Vec<Entry>,
}

#[derive(Debug, Clone)]
enum Entry {
    Add(OptionDef),
    Remove(String),
}

/// Parses [`CLANG_FORMAT_EVOLUTION`] (or any string in the same grammar)
/// into an ordered list of version blocks.
fn parse_blocks(history: &str) -> Vec<VersionBlock> {
    let lines: Vec<&str> = history.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if let Some(version) = line.strip_prefix("# Clang ") {
            let mut entries = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].starts_with("# Clang ") {
                if let Some(rest) = lines[i].strip_prefix("+ ") {
                    let mut parts = rest.splitn(2, ' ');
                    let name = parts.next().unwrap_or("").to_string();
                    let type_tag = parts.next().unwrap_or("bool").trim();
                    i += 1;
                    let option_type = match type_tag {
                        "bool" => OptionType::Bool,
                        "int" => OptionType::Int,
                        "unsigned" => OptionType::Unsigned,
                        "string" => OptionType::Str,
                        "enum" => {
                            let mut values = Vec::new();
                            while i < lines.len() && is_plain_indent(lines[i]) {
                                values.push(lines[i].trim().to_string());
                                i += 1;
                            }
                            OptionType::Enum(values)
                        }
                        "nested" => {
                            let mut nested = StyleSchema::new();
                            while i < lines.len() && is_plain_indent(lines[i]) {
                                let sub = lines[i].trim();
                                let mut sub_parts = sub.splitn(2, ' ');
                                let sub_type = sub_parts.next().unwrap_or("bool");
                                let sub_name = sub_parts.next().unwrap_or("").to_string();
                                let sub_option_type = match sub_type {
                                    "bool" => OptionType::Bool,
                                    "int" => OptionType::Int,
                                    "unsigned" => OptionType::Unsigned,
                                    "string" => OptionType::Str,
                                    _ => OptionType::Bool,
                                };
                                nested.register(OptionDef::new(sub_name, sub_option_type));
                                i += 1;
                            }
                            OptionType::Nested(nested)
                        }
                        _ => OptionType::Bool,
                    };
                    entries.push(Entry::Add(OptionDef::new(name, option_type)));
                } else if let Some(rest) = lines[i].strip_prefix("- ") {
                    let name = rest.split(' ').next().unwrap_or("").to_string();
                    entries.push(Entry::Remove(name));
                    i += 1;
                } else {
                    i += 1;
                }
            }
            blocks.push(VersionBlock { version: version.to_string(), entries });
        } else {
            i += 1;
        }
    }
    blocks
}

fn is_plain_indent(line: &str) -> bool {
    line.starts_with("  ") && !line.trim_start().starts_with('#')
}

/// Total count of `+`/`-` entries in the stream, across every version
/// block. Used by callers that want to report the whole table's size
/// rather than a replay-to-version subset.
pub fn total_entries(history: &str) -> usize {
    parse_blocks(history).iter().map(|b| b.entries.len()).sum()
}

/// Replays every version block up to and including `up_to_version`,
/// returning the reconstructed schema plus the count of versioned entries
/// consumed to build it (the S6 scenario's "62 total versioned entries").
pub fn replay_up_to(history: &str, up_to_version: &str) -> (StyleSchema, usize) {
    let blocks = parse_blocks(history);
    let mut schema = StyleSchema::new();
    let mut consumed = 0;

    for block in &blocks {
        consumed += block.entries.len();
        for entry in &block.entries {
            match entry {
                Entry::Add(def) => schema.register(def.clone()),
                Entry::Remove(name) => schema.remove(name),
            }
        }
        if block.version == up_to_version {
            break;
        }
    }
    (schema, consumed)
}

/// Picks the best-matching version by replaying each block in turn and
/// scoring the resulting schema against `live_options` (names reported by
/// the formatter's own `-dump-config`): intersection size primary, fewer
/// unmatched live options secondary, older version breaks remaining ties
/// (a conservative choice: prefer the schema least likely to claim an
/// option the binary doesn't actually have).
pub fn find_closest_version(history: &str, live_options: &[String]) -> (String, StyleSchema) {
    let blocks = parse_blocks(history);
    let mut schema = StyleSchema::new();
    let mut best: Option<(String, StyleSchema, usize, usize)> = None;

    for block in &blocks {
        for entry in &block.entries {
            match entry {
                Entry::Add(def) => schema.register(def.clone()),
                Entry::Remove(name) => schema.remove(name),
            }
        }
        let intersection = live_options.iter().filter(|name| schema.contains(name)).count();
        let unmatched = live_options.len().saturating_sub(intersection);

        let is_better = match &best {
            None => true,
            Some((_, _, best_intersection, best_unmatched)) => {
                intersection > *best_intersection
                    || (intersection == *best_intersection && unmatched < *best_unmatched)
            }
        };
        if is_better {
            best = Some((block.version.clone(), schema.clone(), intersection, unmatched));
        }
    }

    best.map(|(v, s, _, _)| (v, s)).unwrap_or((String::new(), StyleSchema::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s6_replay_to_3_5() {
        let (schema, consumed) = replay_up_to(CLANG_FORMAT_EVOLUTION, "3.5");
        assert_eq!(consumed, 62);

        let based_on = schema.get("BasedOnStyle").expect("BasedOnStyle must be present");
        match &based_on.option_type {
            OptionType::Enum(values) => {
                for expected in ["LLVM", "Google", "Chromium", "Mozilla", "WebKit"] {
                    assert!(values.iter().any(|v| v == expected), "missing {}", expected);
                }
            }
            other => panic!("expected BasedOnStyle to be an enum, got {:?}", other),
        }

        let column_limit = schema.get("ColumnLimit").expect("ColumnLimit must be present");
        assert_eq!(column_limit.option_type, OptionType::Unsigned);

        let braces = schema.get("BreakBeforeBraces").expect("BreakBeforeBraces must be present");
        match &braces.option_type {
            OptionType::Enum(values) => {
                for expected in ["Attach", "Linux", "Stroustrup", "Allman"] {
                    assert!(values.iter().any(|v| v == expected), "missing {}", expected);
                }
            }
            other => panic!("expected BreakBeforeBraces to be an enum, got {:?}", other),
        }
    }

    #[test]
    fn replay_past_3_5_applies_later_removals_and_nesting() {
        let (schema, _) = replay_up_to(CLANG_FORMAT_EVOLUTION, "3.6");
        assert!(schema.get("AlignEscapedNewlinesLeft").is_none(), "3.6 removes this option");
        assert!(schema.get("AlignEscapedNewlines").is_some());
        let wrapping = schema.get("BraceWrapping").unwrap();
        assert!(wrapping.is_nested());
    }

    #[test]
    fn find_closest_version_prefers_larger_intersection() {
        let live: Vec<String> = vec!["ColumnLimit".into(), "UseTab".into(), "BraceWrapping".into()];
        let (version, schema) = find_closest_version(CLANG_FORMAT_EVOLUTION, &live);
        assert_eq!(version, "3.6");
        assert!(schema.contains("BraceWrapping"));
    }
}
