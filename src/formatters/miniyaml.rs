// miniyaml.rs - minimal YAML-flow subset parser
//
// Understands `{key: value, key2: {nested: value}, key3: [v1, v2, v3]}`
// plus clang-format's block-style dump-config output, where each
// top-level mapping entry sits on its own line (`Key:          Value`) and
// a line starting with `# ` immediately after a mapping key promotes that
// comment into a value for the preceding key (clang-format documents
// enum defaults this way: `BasedOnStyle:  LLVM\n# ColumnLimit: 80`).

use crate::style::{typeconv, OptionValue, Style};

/// Parses a flow-style value: `{...}`, `[...]`, or a bare scalar.
pub fn parse_obj(input: &str) -> (OptionValue, &str) {
    let trimmed = input.trim_start();
    if let Some(rest) = trimmed.strip_prefix('{') {
        let (style, rest) = parse_mapping_body(rest);
        (OptionValue::Nested(style), rest)
    } else if let Some(rest) = trimmed.strip_prefix('[') {
        let (items, rest) = parse_list_body(rest);
        // Lists don't have a dedicated OptionValue variant; represent as a
        // comma-joined string, matching the engine's "unbounded string"
        // treatment for formatter options like `ForEachMacros`.
        (OptionValue::Str(items.join(", ")), rest)
    } else {
        let (scalar, rest) = take_scalar(trimmed);
        (typeconv(scalar.trim()), rest)
    }
}

fn parse_mapping_body(input: &str) -> (Style, &str) {
    let mut style = Style::new();
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix('}') {
            return (style, after);
        }
        if rest.is_empty() {
            return (style, rest);
        }
        let (key, after_key) = take_until_any(rest, &[':', ',', '}']);
        rest = after_key.trim_start();
        if let Some(after_colon) = rest.strip_prefix(':') {
            let (value, after_value) = parse_obj(after_colon);
            style.set(key.trim(), value);
            rest = after_value.trim_start();
        } else {
            rest = rest.trim_start_matches(',');
            continue;
        }
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma;
        }
    }
}

fn parse_list_body(input: &str) -> (Vec<String>, &str) {
    let mut items = Vec::new();
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix(']') {
            return (items, after);
        }
        if rest.is_empty() {
            return (items, rest);
        }
        let (item, after_item) = take_until_any(rest, &[',', ']']);
        let item = unquote(item.trim());
        if !item.is_empty() {
            items.push(item.to_string());
        }
        rest = after_item.trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma;
        }
    }
}

fn take_until_any<'a>(input: &'a str, delims: &[char]) -> (&'a str, &'a str) {
    match input.find(|c| delims.contains(&c)) {
        Some(idx) => (&input[..idx], &input[idx..]),
        None => (input, ""),
    }
}

fn take_scalar(input: &str) -> (&str, &str) {
    take_until_any(input, &[',', '}', ']'])
}

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Parses a complete flow-style document (must be a top-level mapping).
pub fn parse_miniyaml(input: &str) -> Style {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix('{') {
        let (style, _) = parse_mapping_body(rest);
        return style;
    }
    // Block-style dump: one `Key:  Value` (or `# Key:  Value` comment
    // promoted to a pair) per non-blank, non-document-marker line.
    parse_block_style(trimmed)
}

fn parse_block_style(input: &str) -> Style {
    let mut style = Style::new();
    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line == "---" || line == "..." {
            continue;
        }
        let content = line.strip_prefix('#').map(|s| s.trim()).unwrap_or(line);
        let Some((key, value)) = content.split_once(':') else { continue };
        let key = key.trim();
        let value_str = value.trim();
        if key.is_empty() {
            continue;
        }
        if value_str.is_empty() {
            continue;
        }
        let (parsed, _) = parse_obj(value_str);
        style.set(key, parsed);
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s4_comment_promotion() {
        let input = "---\nLanguage:        Cpp\n# BasedOnStyle:  LLVM\n...\n";
        let style = parse_miniyaml(input);
        let pairs: Vec<(&str, String)> = style.iter().map(|(k, v)| (k, v.textrepr())).collect();
        assert_eq!(pairs, vec![("Language", "Cpp".to_string()), ("BasedOnStyle", "LLVM".to_string())]);
    }

    #[test]
    fn scenario_s5_inline_list() {
        let input = "ForEachMacros:   [ foreach, Q_FOREACH, BOOST_FOREACH ]";
        let style = parse_block_style(input);
        let value = style.get("ForEachMacros").unwrap();
        assert_eq!(value.as_str(), Some("foreach, Q_FOREACH, BOOST_FOREACH"));
    }

    #[test]
    fn flow_style_nested_mapping() {
        let style = parse_miniyaml("{based_on_style: pep8, column_limit: 79}");
        assert_eq!(style.get("based_on_style").unwrap().as_str(), Some("pep8"));
        assert_eq!(style.get("column_limit").unwrap().as_int(), Some(79));
    }

    #[test]
    fn flow_style_nested_braces() {
        let style = parse_miniyaml("{BraceWrapping: {AfterClass: true, AfterEnum: false}}");
        let nested = style.get("BraceWrapping").unwrap().as_nested().unwrap();
        assert_eq!(nested.get("AfterClass").unwrap().as_bool(), Some(true));
        assert_eq!(nested.get("AfterEnum").unwrap().as_bool(), Some(false));
    }
}
