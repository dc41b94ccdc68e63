use std::process::Command;

use serde_json::{Value, json};

fn argmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_argmap"))
}

fn run(args: &[&str]) -> Value {
    let out = argmap()
        .args(args)
        .output()
        .expect("failed to run argmap");
    assert!(
        out.status.success(),
        "argmap failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    serde_json::from_slice(&out.stdout).expect("stdout is not valid JSON")
}

#[test]
fn help_works() {
    let out = argmap()
        .arg("--help")
        .output()
        .expect("failed to run argmap --help");
    assert!(
        out.status.success(),
        "argmap --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("argmap") && stdout.contains("--string") && stdout.contains("--alias"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn positionals_round_trip_through_the_separator() {
    let args = run(&[
        "--compact",
        "--double-dash",
        "--",
        "abc",
        "-d",
        "-e",
        "true",
        "efg",
        "hij",
        "--",
        "klm",
        "nop",
        "qrs",
    ]);
    assert_eq!(args["_"], json!(["abc", "efg", "hij"]));
    assert_eq!(args["--"], json!(["klm", "nop", "qrs"]));
    assert_eq!(args["d"], json!(true));
    assert_eq!(args["e"], json!("true"));
}

#[test]
fn declared_strings_keep_values_verbatim() {
    let args = run(&[
        "--compact",
        "--schema-version",
        "1",
        "--string",
        "one",
        "--",
        "--one",
        "1",
    ]);
    assert_eq!(args["length"], json!(1));
    assert_eq!(args["one"], json!("1"));
}

#[test]
fn alias_groups_fan_out() {
    let args = run(&["--compact", "--alias", "v=verbose", "--", "-v"]);
    assert_eq!(args["v"], json!(true));
    assert_eq!(args["verbose"], json!(true));
}

#[test]
fn defaults_fill_unset_flags() {
    let args = run(&[
        "--compact",
        "--schema-version",
        "1",
        "--default",
        "three=3",
        "--",
    ]);
    assert_eq!(args["length"], json!(1));
    assert_eq!(args["three"], json!(3));
}

#[test]
fn drop_unknown_keeps_only_declared_names() {
    let args = run(&[
        "--compact",
        "--drop-unknown",
        "--string",
        "one",
        "--",
        "--one=x",
        "--two=y",
        "pos",
    ]);
    assert_eq!(args["one"], json!("x"));
    assert!(args.get("two").is_none());
    assert_eq!(args["_"], json!([]));
}

#[test]
fn malformed_specs_are_rejected() {
    let out = argmap()
        .args(["--alias", "broken", "--"])
        .output()
        .expect("failed to run argmap");
    assert!(!out.status.success(), "malformed alias spec was accepted");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("NAME=VALUE"),
        "unexpected error output:\n{stderr}"
    );
}
