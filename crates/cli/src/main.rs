use anyhow::{Context, Result};
use argmap::{ParseConfig, Value};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "argmap")]
#[command(version, about = "Minimist-style argument parsing to JSON", long_about = None)]
struct Cli {
    /// Flag always coerced to string (repeatable)
    #[arg(short, long, value_name = "NAME")]
    string: Vec<String>,

    /// Flag always coerced to boolean (repeatable)
    #[arg(short, long, value_name = "NAME")]
    boolean: Vec<String>,

    /// Coerce explicit --flag=true/--flag=false values to booleans
    #[arg(long)]
    boolean_all: bool,

    /// Alias group: NAME=ALIAS[,ALIAS...] (repeatable)
    #[arg(short, long, value_name = "NAME=ALIAS,..")]
    alias: Vec<String>,

    /// Default value: NAME=VALUE, VALUE read as a JSON scalar when possible
    #[arg(short, long, value_name = "NAME=VALUE")]
    default: Vec<String>,

    /// Treat every token after the first positional as positional
    #[arg(long)]
    stop_early: bool,

    /// Collect tokens after a literal `--` under the "--" key
    #[arg(long)]
    double_dash: bool,

    /// Drop flags and positionals that no declaration covers
    #[arg(long)]
    drop_unknown: bool,

    /// Result schema version; 1 adds the legacy `length` entry
    #[arg(long, value_name = "0|1", default_value_t = 0)]
    schema_version: u8,

    /// Print compact JSON on one line
    #[arg(long)]
    compact: bool,

    /// Raw tokens to parse (place after `--`)
    #[arg(value_name = "TOKENS", last = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let mut cli = Cli::parse();
    let tokens = std::mem::take(&mut cli.tokens);

    let config = build_config(&cli)?;
    tracing::debug!("parsing {} tokens", tokens.len());
    let args = argmap::parse(tokens, &config);

    let rendered = if cli.compact {
        serde_json::to_string(&args)?
    } else {
        serde_json::to_string_pretty(&args)?
    };
    println!("{rendered}");

    Ok(())
}

fn build_config(cli: &Cli) -> Result<ParseConfig> {
    let mut config = ParseConfig::new()
        .double_dash(cli.double_dash)
        .stop_early(cli.stop_early)
        .version(cli.schema_version)
        .boolean(cli.boolean_all);

    for name in &cli.string {
        config = config.string(name.as_str());
    }
    for name in &cli.boolean {
        config = config.boolean(name.as_str());
    }
    for spec in &cli.alias {
        let (name, aliases) = split_spec(spec)?;
        let aliases: Vec<&str> = aliases
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();
        config = config.alias(name, aliases);
    }
    for spec in &cli.default {
        let (name, raw) = split_spec(spec)?;
        config = config.default_value(name, parse_scalar(raw));
    }
    if cli.drop_unknown {
        config = config.unknown(|_| false);
    }

    Ok(config)
}

fn split_spec(spec: &str) -> Result<(&str, &str)> {
    spec.split_once('=')
        .map(|(name, value)| (name.trim(), value))
        .with_context(|| format!("specification format should be NAME=VALUE: `{spec}`"))
}

/// JSON scalar when the value reads as one, string otherwise.
fn parse_scalar(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Null) => Value::Null,
        Ok(serde_json::Value::Bool(b)) => Value::Bool(b),
        Ok(serde_json::Value::Number(n)) => match n.as_f64() {
            Some(n) => Value::Number(n),
            None => Value::Str(raw.to_string()),
        },
        Ok(serde_json::Value::String(s)) => Value::Str(s),
        _ => Value::Str(raw.to_string()),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_read_as_json_first() {
        assert_eq!(parse_scalar("3"), Value::Number(3.0));
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("null"), Value::Null);
        assert_eq!(parse_scalar("\"3\""), Value::Str("3".to_string()));
        assert_eq!(parse_scalar("plain"), Value::Str("plain".to_string()));
    }

    #[test]
    fn specs_split_on_the_first_equals() {
        assert_eq!(split_spec("a=b=c").unwrap(), ("a", "b=c"));
        assert!(split_spec("broken").is_err());
    }
}
