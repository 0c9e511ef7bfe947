// mod.rs - style values: an ordered mapping from option name to OptionValue

pub mod algebra;
pub mod schema;
pub mod value;

pub use algebra::{contains_all, diff, merge, signature, sorted_style};
pub use schema::{OptionDef, OptionType, StyleSchema};
pub use value::{typeconv, OptionValue};

/// An ordered mapping from option name to value. Empty style means "use
/// formatter defaults". Styles are value types: equality is by normalized
/// signature, and every mutating operation in [`algebra`] returns a new
/// style rather than mutating in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    entries: Vec<(String, OptionValue)>,
}

impl Style {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn single(name: impl Into<String>, value: OptionValue) -> Self {
        let mut s = Self::new();
        s.set(name, value);
        s
    }

    pub fn set(&mut self, name: impl Into<String>, value: OptionValue) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Body of the normalized signature without surrounding braces, reused
    /// by `OptionValue::textrepr` for nested styles.
    pub fn signature_body(&self) -> String {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.textrepr()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<(String, OptionValue)> for Style {
    fn from_iter<T: IntoIterator<Item = (String, OptionValue)>>(iter: T) -> Self {
        let mut s = Style::new();
        for (k, v) in iter {
            s.set(k, v);
        }
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_existing_key_in_place() {
        let mut s = Style::new();
        s.set("UseTab", OptionValue::Str("Never".into()));
        s.set("TabWidth", OptionValue::Int(4));
        s.set("UseTab", OptionValue::Str("Always".into()));
        assert_eq!(s.keys().collect::<Vec<_>>(), vec!["UseTab", "TabWidth"]);
        assert_eq!(s.get("UseTab").unwrap().as_str(), Some("Always"));
    }
}
