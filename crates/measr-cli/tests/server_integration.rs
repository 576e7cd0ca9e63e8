//! Integration tests for JSON-RPC server mode
//!
//! These simulate an editor plugin that sends an eval call per keystroke.

use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};

/// Helper to send a JSON-RPC request and get response
fn send_request(stdin: &mut impl Write, stdout: &mut impl BufRead, request: Value) -> Value {
    writeln!(stdin, "{}", request).unwrap();
    stdin.flush().unwrap();

    let mut response = String::new();
    stdout.read_line(&mut response).unwrap();
    serde_json::from_str(&response).unwrap()
}

/// Helper to create a request
fn request(method: &str, params: Value, id: u32) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": id
    })
}

fn eval_request(expr: &str, id: u32) -> Value {
    request("eval", json!({"expr": expr}), id)
}

/// Helper to extract result from response
fn get_result(response: &Value) -> &Value {
    response.get("result").expect("expected result in response")
}

/// Helper to get display string from result
fn get_display(response: &Value) -> &str {
    get_result(response)
        .get("display")
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn get_error_code(response: &Value) -> i64 {
    response
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_i64())
        .expect("expected error in response")
}

/// Spawn server process
fn spawn_server() -> std::process::Child {
    Command::new(env!("CARGO_BIN_EXE_measr"))
        .arg("--server")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn server")
}

/// User types "92-5/8in * 9" character by character
#[test]
fn test_incremental_typing_mixed_number() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let expr = "92-5/8in * 9";
    for end in 1..=expr.len() {
        let partial = &expr[..end];
        let response = send_request(&mut stdin, &mut stdout, eval_request(partial, end as u32));

        // every keystroke gets exactly one response with its id
        assert_eq!(response["id"], json!(end));
        assert!(response.get("result").is_some() || response.get("error").is_some());
        if partial == "92-5/8in" {
            assert_eq!(get_display(&response), "92-5/8in");
        }
    }

    let response = send_request(&mut stdin, &mut stdout, eval_request(expr, 100));
    assert_eq!(get_display(&response), "833-5/8in");
    assert_eq!(get_result(&response)["type"], "quantity");

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_unknown_suffix_is_engine_error() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let response = send_request(&mut stdin, &mut stdout, eval_request("3fet", 1));
    assert_eq!(get_error_code(&response), -32000);
    let message = response["error"]["message"].as_str().unwrap();
    assert!(message.contains("did you mean `ft`"), "{message}");

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_convert_reports_rounding() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let response = send_request(
        &mut stdin,
        &mut stdout,
        request("convert", json!({"literal": "3/8in", "to": "mm"}), 1),
    );
    assert_eq!(get_display(&response), "9.525mm");
    assert!(get_result(&response).get("loss").is_none());

    let response = send_request(
        &mut stdin,
        &mut stdout,
        request("convert", json!({"literal": "1m", "to": "in"}), 2),
    );
    assert_eq!(get_display(&response), "39.3701in");
    assert!(get_result(&response)["loss"].as_str().unwrap().starts_with("rounded"));

    let response = send_request(
        &mut stdin,
        &mut stdout,
        request(
            "convert",
            json!({"literal": "1m", "to": "in", "options": {"precision": 2, "space": true}}),
            3,
        ),
    );
    assert_eq!(get_display(&response), "39.37 in");

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_inspect() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let response = send_request(&mut stdin, &mut stdout, request("inspect", json!({"literal": "1/3cup"}), 1));
    let result = get_result(&response);
    assert_eq!(result["kind"], "customary");
    assert_eq!(result["amount"], json!(60_480));
    assert_eq!(result["display_hint"], "cup");

    drop(stdin);
    child.wait().unwrap();
}

/// History survives between calls until `clear`
#[test]
fn test_total_and_clear() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    for (i, line) in ["1ft", "6in", "1/2yd"].iter().enumerate() {
        send_request(&mut stdin, &mut stdout, eval_request(line, i as u32));
    }
    let response = send_request(&mut stdin, &mut stdout, request("total", json!({}), 10));
    assert_eq!(get_display(&response), "3ft");

    send_request(&mut stdin, &mut stdout, request("clear", Value::Null, 11));
    let response = send_request(&mut stdin, &mut stdout, request("total", json!({}), 12));
    assert_eq!(get_result(&response), &Value::Null);

    drop(stdin);
    child.wait().unwrap();
}

#[test]
fn test_malformed_requests() {
    let mut child = spawn_server();
    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    writeln!(stdin, "not json").unwrap();
    stdin.flush().unwrap();
    let mut line = String::new();
    stdout.read_line(&mut line).unwrap();
    let response: Value = serde_json::from_str(&line).unwrap();
    assert_eq!(get_error_code(&response), -32700);

    let response = send_request(&mut stdin, &mut stdout, request("evaluate", json!({}), 2));
    assert_eq!(get_error_code(&response), -32601);

    let response = send_request(&mut stdin, &mut stdout, request("eval", json!({"expression": "1m"}), 3));
    assert_eq!(get_error_code(&response), -32602);

    // the server keeps going after errors
    let response = send_request(&mut stdin, &mut stdout, eval_request("1in == 25.4mm", 4));
    assert_eq!(get_display(&response), "true");

    drop(stdin);
    child.wait().unwrap();
}
