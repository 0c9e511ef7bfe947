// value.rs - the runtime sum type for option values

use super::Style;

/// A single option's value. Bool/int/string cover the scalar formatter
/// knobs; `Nested` covers sub-styles such as clang-format's `BraceWrapping`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Nested(Style),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&Style> {
        match self {
            OptionValue::Nested(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical text form, used both by `signature` and by adapters that
    /// serialize scalar values verbatim (e.g. a TOML-line config file).
    pub fn textrepr(&self) -> String {
        match self {
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::Int(n) => n.to_string(),
            OptionValue::Str(s) => s.clone(),
            OptionValue::Nested(style) => format!("{{{}}}", style.signature_body()),
        }
    }
}

/// Converts a loosely-typed literal (as produced by the YAML-flow parser or
/// a `--startstyle` command-line string) into a value. One conversion
/// function, per the normalization-rules design note: `"true"`/`"false"`
/// become bools, bare integer literals become ints, everything else is a
/// string.
pub fn typeconv(literal: &str) -> OptionValue {
    match literal {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        other => {
            if let Ok(n) = other.parse::<i64>() {
                OptionValue::Int(n)
            } else {
                OptionValue::Str(unquote(other).to_string())
            }
        }
    }
}

fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typeconv_recognizes_booleans_and_ints() {
        assert_eq!(typeconv("true"), OptionValue::Bool(true));
        assert_eq!(typeconv("false"), OptionValue::Bool(false));
        assert_eq!(typeconv("79"), OptionValue::Int(79));
        assert_eq!(typeconv("-3"), OptionValue::Int(-3));
    }

    #[test]
    fn typeconv_unquotes_strings() {
        assert_eq!(typeconv("LLVM"), OptionValue::Str("LLVM".into()));
        assert_eq!(typeconv("'LLVM'"), OptionValue::Str("LLVM".into()));
        assert_eq!(typeconv("\"LLVM\""), OptionValue::Str("LLVM".into()));
    }
}
