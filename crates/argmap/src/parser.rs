//! Left-to-right token classification.

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

use crate::builder::ResultBuilder;
use crate::options::{ParseConfig, Resolver};
use crate::value::Value;

/// Token-sequence input for [`parse`].
///
/// Accepts a single token or multiple tokens via slice/array/vec. A single
/// `&str`/`String` is one token, never split on whitespace.
pub trait Argv {
    fn into_tokens(self) -> Vec<String>;
}

impl Argv for &str {
    fn into_tokens(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Argv for String {
    fn into_tokens(self) -> Vec<String> {
        vec![self]
    }
}

impl Argv for &[&str] {
    fn into_tokens(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl Argv for &[String] {
    fn into_tokens(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> Argv for [&str; N] {
    fn into_tokens(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl Argv for Vec<&str> {
    fn into_tokens(self) -> Vec<String> {
        self.into_iter().map(|s| s.to_string()).collect()
    }
}

impl Argv for Vec<String> {
    fn into_tokens(self) -> Vec<String> {
        self
    }
}

/// The leading element is the program name and is skipped.
impl Argv for std::env::Args {
    fn into_tokens(self) -> Vec<String> {
        self.skip(1).collect()
    }
}

/// Whether a lookahead token may be consumed as a flag value: `-` counts,
/// anything else starting with `-` does not.
fn is_value_token(token: &str) -> bool {
    token == "-" || !token.starts_with('-')
}

/// Parse `argv` into a mapping of flag names to values plus positionals.
///
/// Total: every input produces a mapping. Malformed flags coerce leniently
/// and a missing lookahead token falls back to the flag's default value.
pub fn parse(argv: impl Argv, config: &ParseConfig) -> Map<String, JsonValue> {
    let tokens = argv.into_tokens();
    let resolver = Resolver::new(config);
    let mut out = ResultBuilder::new(&resolver);
    let mut parsing = true;

    let mut i = 0;
    while i < tokens.len() {
        let arg = tokens[i].as_str();
        let next = tokens.get(i + 1).map(String::as_str);

        if parsing && arg.len() > 1 {
            if let Some(body) = arg.strip_prefix("--") {
                if body.is_empty() {
                    trace!("`--` separator, flag parsing stops");
                    parsing = false;
                    i += 1;
                    continue;
                }
                if let Some((name, value)) = body.split_once('=') {
                    out.set_flag(name, Value::Str(value.to_string()), Some(arg), true);
                } else if let Some(value) =
                    next.filter(|n| is_value_token(n) && resolver.matches_type(body, n, true))
                {
                    out.set_flag(body, Value::Str(value.to_string()), Some(arg), true);
                    i += 1;
                } else if let Some(name) = body.strip_prefix("no-") {
                    out.set_flag(name, Value::Bool(false), Some(arg), false);
                } else {
                    out.set_flag(body, resolver.default_value(body), Some(arg), true);
                }
                i += 1;
                continue;
            }
            if arg.starts_with('-') {
                if scan_short(arg, next, &resolver, &mut out) {
                    i += 1;
                }
                i += 1;
                continue;
            }
        }

        // Positional. Routing is decided before the stop-early flip, so the
        // first positional under stop-early still lands in `_`.
        let secondary = !parsing && config.double_dash;
        if config.stop_early {
            parsing = false;
        }
        out.add_positional(resolver.coerce(None, Value::Str(arg.to_string()), false), secondary);
        i += 1;
    }

    let map = out.export();
    debug!("parsed {} tokens into {} entries", tokens.len(), map.len());
    map
}

/// Scan a single-hyphen token: `-x value`, or a combined cluster
/// (`-abc`, `-n5`, `-ef=say`). Returns true when the following separate
/// token was consumed as a value.
///
/// Cluster precedence per character: glued value (suppressed when the
/// cluster starts with a digit), `=` split, last-character lookahead,
/// standalone flag. The lookahead eligibility check runs against the whole
/// cluster name, matching the reference behavior this parser preserves.
fn scan_short(
    arg: &str,
    next: Option<&str>,
    resolver: &Resolver<'_>,
    out: &mut ResultBuilder<'_>,
) -> bool {
    let cluster = &arg[1..];
    let eligible_next = next.filter(|n| is_value_token(n));
    let indexed: Vec<(usize, char)> = arg.char_indices().collect();

    if indexed.len() == 2 {
        if let Some(value) = eligible_next {
            if resolver.matches_type(cluster, value, false) {
                out.set_flag(cluster, Value::Str(value.to_string()), Some(arg), false);
                return true;
            }
        }
    }

    let first_is_digit = indexed.get(1).is_some_and(|&(_, c)| c.is_ascii_digit());
    let mut j = 1;
    while j < indexed.len() {
        let (_, ch) = indexed[j];
        let name = ch.to_string();
        let original = format!("-{ch}");
        let after = indexed.get(j + 1).map(|&(_, c)| c);
        match after {
            Some(c) if !first_is_digit && !c.is_ascii_alphabetic() && c != '=' => {
                // Value glued directly onto the flag, e.g. `-n5`.
                let value = &arg[indexed[j + 1].0..];
                out.set_flag(&name, Value::Str(value.to_string()), Some(&original), false);
                break;
            }
            Some('=') => {
                let value = &arg[indexed[j + 1].0 + 1..];
                out.set_flag(&name, Value::Str(value.to_string()), Some(&original), false);
                break;
            }
            None => {
                if let Some(value) = eligible_next {
                    if resolver.matches_type(cluster, value, false) {
                        out.set_flag(&name, Value::Str(value.to_string()), Some(&original), false);
                        return true;
                    }
                }
                out.set_flag(&name, resolver.default_value(&name), Some(&original), false);
                break;
            }
            Some(_) => {
                out.set_flag(&name, resolver.default_value(&name), Some(&original), false);
            }
        }
        j += 1;
    }
    false
}
