//! Minimist-style argument parsing.
//!
//! Converts a raw token sequence (`argv`) into a mapping of flag names to
//! typed values plus positional arguments: `--flag=value`, `--flag value`,
//! combined short clusters (`-abc`, `-n5`, `-ef=say`), `--no-` negation, the
//! `--` separator, alias groups, per-flag string/boolean typing, defaults,
//! stop-early mode, and an unknown-token filter.
//!
//! Parsing never fails: malformed input coerces leniently and the result is
//! always a complete mapping.
//!
//! ```
//! use argmap::{ParseConfig, parse};
//!
//! let config = ParseConfig::new().string("name").alias("v", "verbose");
//! let args = parse(["in.txt", "--name=demo", "-v"], &config);
//! assert_eq!(args["_"][0], "in.txt");
//! assert_eq!(args["name"], "demo");
//! assert_eq!(args["verbose"], true);
//! ```

mod builder;
mod options;
mod parser;
mod value;

pub use options::{BooleanSpec, NameList, ParseConfig, UnknownFilter};
pub use parser::{Argv, parse};
pub use value::Value;
