//! One-shot, pipe and file modes

use pretty_assertions::assert_eq;
use serde_json::Value;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn measr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_measr"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run measr")
}

fn measr_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_measr"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn measr");
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_single_expression_quiet() {
    let output = measr(&["-q", "92-5/8in * 9"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "833-5/8in\n");
}

#[test]
fn test_single_expression_echoes_input() {
    let output = measr(&["1ft + 6in to cm"]);
    let text = stdout(&output);
    assert!(text.starts_with("1ft + 6in to cm"), "{text}");
    assert!(text.trim_end().ends_with("= 45.72cm"), "{text}");
}

#[test]
fn test_rounded_conversion_is_marked() {
    let output = measr(&["1m to in"]);
    let text = stdout(&output);
    assert!(text.contains("≈ 39.3701in"), "{text}");
    assert!(text.contains("rounded to within"), "{text}");
}

#[test]
fn test_format_flags() {
    assert_eq!(stdout(&measr(&["-q", "--decimal", "3/8in"])), "0.375in\n");
    assert_eq!(stdout(&measr(&["-q", "--decimal", "--precision", "2", "3/8in"])), "0.38in\n");
    assert_eq!(stdout(&measr(&["-q", "--symbols", "5-1/2ft"])), "5-1/2'\n");
    assert_eq!(stdout(&measr(&["-q", "--space", "2.5cm"])), "2.5 cm\n");
}

#[test]
fn test_error_exits_nonzero() {
    let output = measr(&["-q", "1kg + 1m"]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output), "error: cannot add mass and length\n");
}

#[test]
fn test_json_output() {
    let output = measr(&["--json", "2.54cm to in"]);
    let value: Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(value["result"]["unit"], "in");
    assert_eq!(value["result"]["value"], serde_json::json!(1.0));
    assert_eq!(value["result"]["family"], "length");
    assert_eq!(value["display"], "1in");
    assert_eq!(value["loss"], Value::Null);
}

#[test]
fn test_pipe_mode_with_total() {
    let output = measr_with_stdin(&["-q", "-t"], "1/4cup\n2tbsp\n1tsp\n");
    assert_eq!(
        stdout(&output),
        "1/4cup\n2tbsp\n1tsp\n─────────────\nTotal: 0.3958cup\n"
    );
}

#[test]
fn test_file_mode() {
    let path = std::env::temp_dir().join(format!("measr-cli-test-{}.txt", std::process::id()));
    std::fs::write(&path, "1/3cup + 1/3cup\n\n0C == 32F\n").unwrap();
    let output = measr(&["-q", "-f", path.to_str().unwrap()]);
    std::fs::remove_file(&path).unwrap();
    assert_eq!(stdout(&output), "2/3cup\ntrue\n");
}
