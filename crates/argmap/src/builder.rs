//! Per-parse accumulation and export of the result mapping.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use tracing::trace;

use crate::options::Resolver;
use crate::value::Value;

/// Accumulates flags and positionals for a single parse call, then exports
/// the final mapping exactly once.
pub(crate) struct ResultBuilder<'a> {
    resolver: &'a Resolver<'a>,
    positionals: Vec<Value>,
    secondary: Vec<Value>,
    flags: IndexMap<String, Vec<Value>>,
}

impl<'a> ResultBuilder<'a> {
    pub(crate) fn new(resolver: &'a Resolver<'a>) -> Self {
        Self {
            resolver,
            positionals: Vec::new(),
            secondary: Vec::new(),
            flags: IndexMap::new(),
        }
    }

    /// Record one occurrence of `name`, fanning the coerced value out to
    /// every member of its alias group so the sequences stay equal.
    ///
    /// `original` is the token as it appeared in argv, shown to the unknown
    /// filter; export-synthesized defaults pass `None`.
    pub(crate) fn set_flag(
        &mut self,
        name: &str,
        raw: Value,
        original: Option<&str>,
        double_dash: bool,
    ) {
        if let Some(filter) = self.resolver.unknown_filter() {
            if !self.resolver.is_declared(name, &raw, double_dash) {
                let token = match original {
                    Some(token) => Value::Str(token.to_string()),
                    None => Value::Null,
                };
                if !filter(&token) {
                    trace!("dropping undeclared flag `{name}`");
                    return;
                }
            }
        }
        let value = self.resolver.coerce(Some(name), raw, double_dash);
        self.flags.entry(name.to_string()).or_default().push(value.clone());
        if let Some(group) = self.resolver.alias_group(name) {
            for alias in group {
                self.flags.entry(alias.clone()).or_default().push(value.clone());
            }
        }
    }

    /// Record a positional. Primary positionals pass the unknown filter on
    /// their coerced value; secondary ones are never filtered.
    pub(crate) fn add_positional(&mut self, value: Value, secondary: bool) {
        if secondary {
            self.secondary.push(value);
            return;
        }
        if let Some(filter) = self.resolver.unknown_filter() {
            if !filter(&value) {
                trace!("dropping positional {value:?}");
                return;
            }
        }
        self.positionals.push(value);
    }

    /// Build the exported mapping: positionals, synthesized defaults and
    /// booleans, the legacy `length` entry, then the flattened flags.
    pub(crate) fn export(mut self) -> Map<String, JsonValue> {
        let resolver = self.resolver;

        for (name, default) in &resolver.config.defaults {
            if !self.flags.contains_key(name) {
                self.set_flag(name, default.clone(), None, false);
            }
        }
        for name in resolver.boolean_names() {
            if !self.flags.contains_key(name) {
                let default = resolver
                    .config
                    .defaults
                    .get(name)
                    .cloned()
                    .unwrap_or(Value::Bool(false));
                self.set_flag(name, default, None, false);
            }
        }

        let mut out = Map::new();
        out.insert(
            "_".to_string(),
            JsonValue::Array(self.positionals.iter().map(JsonValue::from).collect()),
        );
        if !self.secondary.is_empty() {
            out.insert(
                "--".to_string(),
                JsonValue::Array(self.secondary.iter().map(JsonValue::from).collect()),
            );
        }
        if resolver.config.version > 0 {
            out.insert("length".to_string(), JsonValue::from(self.flags.len()));
        }

        for (name, values) in &self.flags {
            let value = if values.len() == 1 {
                JsonValue::from(&values[0])
            } else {
                JsonValue::Array(values.iter().map(JsonValue::from).collect())
            };
            insert_path(&mut out, name, value);
        }
        out
    }
}

/// Insert `value` at a dotted path, creating intermediate objects as needed
/// (`"a.b.c"` becomes `{"a": {"b": {"c": value}}}`). A non-object already
/// sitting on the path is replaced.
fn insert_path(map: &mut Map<String, JsonValue>, path: &str, value: JsonValue) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let slot = map
                .entry(head.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !slot.is_object() {
                *slot = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(child) = slot {
                insert_path(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseConfig;
    use serde_json::json;

    fn export(config: &ParseConfig, build: impl FnOnce(&mut ResultBuilder<'_>)) -> Map<String, JsonValue> {
        let resolver = Resolver::new(config);
        let mut builder = ResultBuilder::new(&resolver);
        build(&mut builder);
        builder.export()
    }

    #[test]
    fn single_occurrence_collapses_to_a_scalar() {
        let config = ParseConfig::new();
        let out = export(&config, |b| {
            b.set_flag("one", Value::Str("1".to_string()), Some("--one=1"), true);
        });
        assert_eq!(out["one"], json!(1));
    }

    #[test]
    fn repeated_occurrences_export_in_order() {
        let config = ParseConfig::new();
        let out = export(&config, |b| {
            b.set_flag("x", Value::Str("1".to_string()), Some("--x=1"), true);
            b.set_flag("x", Value::Str("2".to_string()), Some("--x=2"), true);
        });
        assert_eq!(out["x"], json!([1, 2]));
    }

    #[test]
    fn alias_sequences_stay_equal() {
        let config = ParseConfig::new().alias("x", "xs");
        let out = export(&config, |b| {
            b.set_flag("x", Value::Str("1".to_string()), Some("-x"), false);
            b.set_flag("xs", Value::Str("2".to_string()), Some("--xs"), true);
        });
        assert_eq!(out["x"], json!([1, 2]));
        assert_eq!(out["xs"], json!([1, 2]));
    }

    #[test]
    fn secondary_positionals_only_appear_when_present() {
        let config = ParseConfig::new().double_dash(true);
        let out = export(&config, |b| {
            b.add_positional(Value::Str("a".to_string()), false);
        });
        assert_eq!(out["_"], json!(["a"]));
        assert!(out.get("--").is_none());

        let out = export(&config, |b| {
            b.add_positional(Value::Str("a".to_string()), false);
            b.add_positional(Value::Str("b".to_string()), true);
        });
        assert_eq!(out["--"], json!(["b"]));
    }

    #[test]
    fn length_counts_flag_names_not_positionals() {
        let config = ParseConfig::new().version(1).alias("a", "apple");
        let out = export(&config, |b| {
            b.add_positional(Value::Str("pos".to_string()), false);
            b.set_flag("a", Value::Bool(true), Some("-a"), false);
        });
        // `a` and its alias both count; `_` does not.
        assert_eq!(out["length"], json!(2));
    }

    #[test]
    fn dotted_names_nest_into_objects() {
        let config = ParseConfig::new();
        let out = export(&config, |b| {
            b.set_flag("a.b", Value::Str("1".to_string()), Some("--a.b=1"), true);
            b.set_flag("a.c.d", Value::Str("x".to_string()), Some("--a.c.d=x"), true);
        });
        assert_eq!(out["a"], json!({"b": 1, "c": {"d": "x"}}));
    }

    #[test]
    fn synthesized_defaults_face_the_unknown_filter() {
        let config = ParseConfig::new()
            .default_value("one", "1")
            .unknown(|token| !token.is_null());
        let out = export(&config, |b| {
            let _ = b;
        });
        assert!(out.get("one").is_none());
    }
}
