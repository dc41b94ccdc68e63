//! Parse configuration and the per-flag typing model derived from it.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::value::{Value, parse_number};

/// Callback deciding whether an undeclared flag or positional survives.
///
/// Flags pass their original token (`"--two=two"`, `"-x"`), positionals their
/// coerced value; defaults synthesized at export pass [`Value::Null`].
pub type UnknownFilter = dyn Fn(&Value) -> bool + Send + Sync;

/// One-or-many flag names for builder methods.
///
/// Accepts a single name or multiple names via array/slice/vec.
pub trait NameList {
    fn names(self) -> Vec<String>;
}

impl NameList for &str {
    fn names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl NameList for String {
    fn names(self) -> Vec<String> {
        vec![self]
    }
}

impl NameList for &[&str] {
    fn names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> NameList for [&str; N] {
    fn names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl NameList for Vec<&str> {
    fn names(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl NameList for Vec<String> {
    fn names(self) -> Vec<String> {
        self
    }
}

/// Argument to [`ParseConfig::boolean`]: the literal `true` switches on
/// double-hyphen boolean coercion, anything name-shaped declares
/// boolean-typed flags.
pub trait BooleanSpec {
    fn apply(self, config: &mut ParseConfig);
}

impl BooleanSpec for bool {
    fn apply(self, config: &mut ParseConfig) {
        if self {
            config.double_dash_booleans = true;
        }
    }
}

impl BooleanSpec for &str {
    fn apply(self, config: &mut ParseConfig) {
        config.booleans.extend(self.names());
    }
}

impl BooleanSpec for String {
    fn apply(self, config: &mut ParseConfig) {
        config.booleans.extend(self.names());
    }
}

impl BooleanSpec for &[&str] {
    fn apply(self, config: &mut ParseConfig) {
        config.booleans.extend(self.names());
    }
}

impl<const N: usize> BooleanSpec for [&str; N] {
    fn apply(self, config: &mut ParseConfig) {
        config.booleans.extend(self.names());
    }
}

impl BooleanSpec for Vec<&str> {
    fn apply(self, config: &mut ParseConfig) {
        config.booleans.extend(self.names());
    }
}

impl BooleanSpec for Vec<String> {
    fn apply(self, config: &mut ParseConfig) {
        config.booleans.extend(self.names());
    }
}

/// Parsing configuration: declared flag types, aliases, defaults, and modes.
///
/// All fields are optional; an empty config parses every token leniently.
/// A parse call never mutates the config; derived state lives in a
/// per-call [`Resolver`].
#[derive(Default)]
pub struct ParseConfig {
    pub(crate) double_dash: bool,
    pub(crate) defaults: IndexMap<String, Value>,
    pub(crate) strings: Vec<String>,
    pub(crate) booleans: Vec<String>,
    pub(crate) double_dash_booleans: bool,
    pub(crate) aliases: IndexMap<String, Vec<String>>,
    pub(crate) stop_early: bool,
    pub(crate) unknown: Option<Box<UnknownFilter>>,
    pub(crate) version: u8,
}

impl fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseConfig")
            .field("double_dash", &self.double_dash)
            .field("defaults", &self.defaults)
            .field("strings", &self.strings)
            .field("booleans", &self.booleans)
            .field("double_dash_booleans", &self.double_dash_booleans)
            .field("aliases", &self.aliases)
            .field("stop_early", &self.stop_early)
            .field("unknown", &self.unknown.as_ref().map(|_| "<filter>"))
            .field("version", &self.version)
            .finish()
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect tokens after a literal `--` under the `"--"` key instead of
    /// merging them into `_`.
    pub fn double_dash(mut self, enabled: bool) -> Self {
        self.double_dash = enabled;
        self
    }

    /// Fallback value for a flag that never appears in the input.
    ///
    /// Coerced through the flag's declared type at export, so a string flag
    /// with default `true` exports as `"true"`.
    pub fn default_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Declare string-typed flags: values always coerce to string, a bare
    /// flag yields `""`.
    pub fn string(mut self, names: impl NameList) -> Self {
        self.strings.extend(names.names());
        self
    }

    /// Declare boolean-typed flags, or pass `true` to coerce any
    /// double-hyphen flag with an explicit literal `true`/`false` value.
    pub fn boolean(mut self, spec: impl BooleanSpec) -> Self {
        spec.apply(&mut self);
        self
    }

    /// Declare an alias group: setting any member sets them all.
    pub fn alias(mut self, name: impl Into<String>, aliases: impl NameList) -> Self {
        self.aliases.entry(name.into()).or_default().extend(aliases.names());
        self
    }

    /// Treat every token from the first positional onward as positional,
    /// hyphens included.
    pub fn stop_early(mut self, enabled: bool) -> Self {
        self.stop_early = enabled;
        self
    }

    /// Gate undeclared flags and positionals; returning `false` drops the
    /// token silently.
    pub fn unknown(mut self, filter: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        self.unknown = Some(Box::new(filter));
        self
    }

    /// Result-schema version; `1` adds the legacy `length` entry counting
    /// distinct recorded flag names.
    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum FlagType {
    Str,
    Bool,
}

fn accepts(flag_type: FlagType, candidate: &str) -> bool {
    match flag_type {
        FlagType::Str => true,
        FlagType::Bool => is_bool_literal(candidate),
    }
}

fn is_bool_literal(candidate: &str) -> bool {
    candidate == "true" || candidate == "false"
}

fn is_true_raw(raw: &Value) -> bool {
    matches!(raw, Value::Bool(true)) || matches!(raw, Value::Str(s) if s == "true")
}

/// Per-flag typing derived from a [`ParseConfig`], computed once per parse
/// call. Construction is a pure derivation: the caller's config is read,
/// never mutated, and the alias closure lands in a fresh table.
pub(crate) struct Resolver<'a> {
    types: HashMap<String, FlagType>,
    alias_groups: HashMap<String, Vec<String>>,
    double_dash_booleans: bool,
    pub(crate) config: &'a ParseConfig,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(config: &'a ParseConfig) -> Self {
        let mut types = HashMap::new();
        for name in &config.strings {
            types.insert(name.clone(), FlagType::Str);
        }
        // In double-dash-boolean mode no names are boolean-typed; the mode
        // itself drives coercion.
        if !config.double_dash_booleans {
            for name in &config.booleans {
                types.insert(name.clone(), FlagType::Bool);
            }
        }

        // Symmetric closure: every member of a declared group maps to the
        // other members, so a lookup by any member reaches the whole group.
        let mut alias_groups: HashMap<String, Vec<String>> = HashMap::new();
        for (name, aliases) in &config.aliases {
            let mut group = Vec::with_capacity(aliases.len() + 1);
            group.push(name.clone());
            for alias in aliases {
                if !group.contains(alias) {
                    group.push(alias.clone());
                }
            }
            for member in &group {
                let others = group.iter().filter(|m| *m != member).cloned().collect();
                alias_groups.insert(member.clone(), others);
            }
        }

        Self {
            types,
            alias_groups,
            double_dash_booleans: config.double_dash_booleans,
            config,
        }
    }

    /// The flag's registered type, or the first typed member of its alias
    /// group.
    fn flag_type(&self, name: &str) -> Option<FlagType> {
        if let Some(flag_type) = self.types.get(name) {
            return Some(*flag_type);
        }
        self.alias_groups
            .get(name)?
            .iter()
            .find_map(|alias| self.types.get(alias).copied())
    }

    /// Coerce a raw value for `name`. `Null` passes through; a registered
    /// type wins; double-dash-boolean mode converts literal `true`/`false`
    /// strings and passes everything else through unconverted; untyped
    /// values fall back to numeric detection.
    pub(crate) fn coerce(&self, name: Option<&str>, raw: Value, double_dash: bool) -> Value {
        if raw.is_null() {
            return Value::Null;
        }
        if let Some(name) = name {
            if let Some(flag_type) = self.flag_type(name) {
                return match flag_type {
                    FlagType::Str => Value::Str(raw.to_token()),
                    FlagType::Bool => Value::Bool(is_true_raw(&raw)),
                };
            }
        }
        if double_dash && self.double_dash_booleans {
            return match raw {
                Value::Str(s) if is_bool_literal(&s) => Value::Bool(s == "true"),
                other => other,
            };
        }
        if let Value::Str(s) = &raw {
            if let Some(n) = parse_number(s) {
                return Value::Number(n);
            }
        }
        raw
    }

    /// Whether `candidate` is consumable as `name`'s value during lookahead.
    pub(crate) fn matches_type(&self, name: &str, candidate: &str, double_dash: bool) -> bool {
        if self.double_dash_booleans && double_dash && !is_bool_literal(candidate) {
            return false;
        }
        if let Some(flag_type) = self.types.get(name) {
            return accepts(*flag_type, candidate);
        }
        if let Some(group) = self.alias_groups.get(name) {
            let typed: Vec<FlagType> = group
                .iter()
                .filter_map(|alias| self.types.get(alias).copied())
                .collect();
            if !typed.is_empty() {
                return typed.into_iter().any(|t| accepts(t, candidate));
            }
        }
        true
    }

    /// Whether the flag counts as declared for the unknown-filter gate.
    pub(crate) fn is_declared(&self, name: &str, raw: &Value, double_dash: bool) -> bool {
        (self.double_dash_booleans && double_dash && *raw == Value::Bool(true))
            || self.types.contains_key(name)
            || self.alias_groups.get(name).is_some_and(|g| !g.is_empty())
    }

    /// Value a bare flag takes: `""` for string-typed, `true` otherwise.
    pub(crate) fn default_value(&self, name: &str) -> Value {
        match self.flag_type(name) {
            Some(FlagType::Str) => Value::Str(String::new()),
            Some(FlagType::Bool) | None => Value::Bool(true),
        }
    }

    pub(crate) fn alias_group(&self, name: &str) -> Option<&[String]> {
        self.alias_groups.get(name).map(Vec::as_slice)
    }

    /// Names synthesized as `false` at export when unset. Empty in
    /// double-dash-boolean mode, where no names are declared.
    pub(crate) fn boolean_names(&self) -> &[String] {
        if self.config.double_dash_booleans {
            &[]
        } else {
            &self.config.booleans
        }
    }

    pub(crate) fn unknown_filter(&self) -> Option<&UnknownFilter> {
        self.config.unknown.as_deref()
    }
}
