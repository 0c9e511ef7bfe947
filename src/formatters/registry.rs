// registry.rs - formatter adapter registry, mirrors the hasher registry pattern

use std::collections::HashMap;

use super::traits::FormatterAdapter;

pub struct FormatterRegistry {
    factories: HashMap<String, fn() -> Box<dyn FormatterAdapter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        let mut registry = Self { factories: HashMap::new() };
        registry.register_factory("clang-format", super::clang::new_adapter);
        registry.register_factory("rustfmt", super::tomlline::new_adapter);
        registry
    }

    pub fn register_factory(&mut self, name: &str, factory: fn() -> Box<dyn FormatterAdapter>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn has_adapter(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn build(&self, name: &str) -> Option<Box<dyn FormatterAdapter>> {
        self.factories.get(name).map(|factory| factory())
    }

    pub fn adapter_names(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Picks an adapter by matching its `handles_extension` against every
    /// extension the caller's input files present, falling back to the
    /// basename of `formatter_path` (e.g. `/usr/bin/clang-format-14` still
    /// contains `clang-format`).
    pub fn resolve_for(&self, formatter_path: &str, extensions: &[String]) -> Option<&str> {
        let basename = std::path::Path::new(formatter_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(formatter_path);

        for name in self.factories.keys() {
            if basename.contains(name.as_str()) {
                return Some(name.as_str());
            }
        }
        for name in self.factories.keys() {
            if let Some(adapter) = self.build(name) {
                if extensions.iter().any(|ext| adapter.handles_extension(ext)) {
                    return self.factories.keys().find(|n| n.as_str() == name).map(|s| s.as_str());
                }
            }
        }
        None
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_adapters_are_registered() {
        let registry = FormatterRegistry::new();
        assert!(registry.has_adapter("clang-format"));
        assert!(registry.has_adapter("rustfmt"));
    }

    #[test]
    fn resolve_matches_by_executable_basename() {
        let registry = FormatterRegistry::new();
        assert_eq!(registry.resolve_for("/usr/bin/clang-format-14", &[]), Some("clang-format"));
    }
}
