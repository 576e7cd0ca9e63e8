//! JSON-RPC 2.0 server mode for measr
//!
//! Lets editors and launchers use measr as a measurement backend.
//! Reads one request per line from stdin, writes one response per line to stdout.

use measr_core::{Engine, Evaluation, FormatOptions, MeasureError, Outcome, Quantity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, Write};

/// JSON-RPC 2.0 request
#[derive(Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Option<serde_json::Value>,
    id: serde_json::Value,
}

/// JSON-RPC 2.0 response
#[derive(Serialize)]
struct Response {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
    id: serde_json::Value,
}

/// JSON-RPC error object
#[derive(Debug, Serialize)]
struct RpcError {
    code: i32,
    message: String,
}

/// Structured evaluation result
#[derive(Serialize)]
struct EvalResult {
    #[serde(rename = "type")]
    result_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    family: Option<String>,
    /// Exact, re-parseable form of a quantity result
    #[serde(skip_serializing_if = "Option::is_none")]
    repr: Option<String>,
    /// Present when a cross-system conversion rounded
    #[serde(skip_serializing_if = "Option::is_none")]
    loss: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    display: String,
}

#[derive(Deserialize)]
struct EvalParams {
    expr: String,
    #[serde(default)]
    options: FormatOptions,
}

#[derive(Deserialize)]
struct EvalLinesParams {
    lines: Vec<String>,
    #[serde(default)]
    options: FormatOptions,
}

#[derive(Deserialize)]
struct ConvertParams {
    literal: String,
    to: String,
    #[serde(default)]
    options: FormatOptions,
}

#[derive(Deserialize)]
struct InspectParams {
    literal: String,
}

#[derive(Deserialize)]
struct TotalParams {
    #[serde(default)]
    options: FormatOptions,
}

// JSON-RPC error codes
const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
const ENGINE_ERROR: i32 = -32000;

type RpcResult = Result<serde_json::Value, RpcError>;

impl Response {
    fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            result: Some(result),
            error: None,
            id,
        }
    }

    fn error(id: serde_json::Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }

    fn from_result(id: serde_json::Value, result: RpcResult) -> Self {
        match result {
            Ok(value) => Self::success(id, value),
            Err(err) => Self::error(id, err.code, err.message),
        }
    }
}

impl From<MeasureError> for RpcError {
    fn from(err: MeasureError) -> Self {
        Self {
            code: ENGINE_ERROR,
            message: err.to_string(),
        }
    }
}

fn params<T: DeserializeOwned>(params: Option<serde_json::Value>) -> Result<T, RpcError> {
    let Some(params) = params else {
        return Err(RpcError {
            code: INVALID_PARAMS,
            message: "Missing params".to_string(),
        });
    };
    serde_json::from_value(params).map_err(|e| RpcError {
        code: INVALID_PARAMS,
        message: format!("Invalid params: {e}"),
    })
}

fn to_json<T: Serialize>(value: T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| RpcError {
        code: INTERNAL_ERROR,
        message: format!("Cannot serialize result: {e}"),
    })
}

fn quantity_result(q: &Quantity, options: &FormatOptions) -> EvalResult {
    let dict = q.to_dict();
    EvalResult {
        result_type: "quantity",
        value: Some(serde_json::json!(dict.value)),
        unit: Some(dict.unit.to_string()),
        family: Some(dict.family.to_string()),
        repr: Some(q.repr()),
        loss: None,
        message: None,
        display: q.format(options),
    }
}

/// Convert an evaluation to a structured EvalResult
fn evaluation_to_result(eval: &Evaluation, options: &FormatOptions) -> EvalResult {
    let display = eval.outcome.render(options);
    let plain = |result_type, value| EvalResult {
        result_type,
        value: Some(value),
        unit: None,
        family: None,
        repr: None,
        loss: None,
        message: None,
        display: display.clone(),
    };
    match eval.outcome {
        Outcome::Quantity(q) => EvalResult {
            loss: eval.loss.map(|loss| loss.to_string()),
            ..quantity_result(&q, options)
        },
        Outcome::Ratio(r) => plain("ratio", serde_json::json!(r.to_f64())),
        Outcome::Scalar(d) => plain("number", serde_json::json!(d)),
        Outcome::Bool(b) => plain("bool", serde_json::json!(b)),
    }
}

fn error_result(err: &MeasureError) -> EvalResult {
    EvalResult {
        result_type: "error",
        value: None,
        unit: None,
        family: None,
        repr: None,
        loss: None,
        message: Some(err.to_string()),
        display: String::new(),
    }
}

/// Handle a single JSON-RPC request
fn handle_request(engine: &mut Engine, input: &str) -> Response {
    let request: Request = match serde_json::from_str(input) {
        Ok(r) => r,
        Err(e) => {
            return Response::error(serde_json::Value::Null, PARSE_ERROR, format!("Parse error: {e}"));
        }
    };

    if request.jsonrpc != "2.0" {
        return Response::error(request.id, INVALID_REQUEST, "Invalid JSON-RPC version");
    }

    tracing::debug!(method = %request.method, "request");
    let result = match request.method.as_str() {
        "eval" => handle_eval(engine, request.params),
        "eval_lines" => handle_eval_lines(engine, request.params),
        "convert" => handle_convert(request.params),
        "inspect" => handle_inspect(request.params),
        "total" => handle_total(engine, request.params),
        "clear" => handle_clear(engine),
        _ => Err(RpcError {
            code: METHOD_NOT_FOUND,
            message: format!("Method not found: {}", request.method),
        }),
    };
    Response::from_result(request.id, result)
}

/// Evaluate one line and keep it in the history
fn handle_eval(engine: &mut Engine, raw: Option<serde_json::Value>) -> RpcResult {
    let params: EvalParams = params(raw)?;
    let eval = engine.eval(&params.expr)?;
    to_json(evaluation_to_result(&eval, &params.options))
}

/// Evaluate several lines; failures are reported per line
fn handle_eval_lines(engine: &mut Engine, raw: Option<serde_json::Value>) -> RpcResult {
    let params: EvalLinesParams = params(raw)?;
    let results: Vec<EvalResult> = params
        .lines
        .iter()
        .map(|line| match engine.eval(line) {
            Ok(eval) => evaluation_to_result(&eval, &params.options),
            Err(err) => error_result(&err),
        })
        .collect();
    to_json(results)
}

/// Convert a single literal, reporting any rounding
fn handle_convert(raw: Option<serde_json::Value>) -> RpcResult {
    let params: ConvertParams = params(raw)?;
    let quantity: Quantity = params.literal.parse()?;
    let conversion = quantity.convert(&params.to)?;
    let mut result = quantity_result(&conversion.quantity, &params.options);
    result.loss = conversion.loss.map(|loss| loss.to_string());
    to_json(result)
}

fn handle_inspect(raw: Option<serde_json::Value>) -> RpcResult {
    let params: InspectParams = params(raw)?;
    let quantity: Quantity = params.literal.parse()?;
    to_json(quantity.inspect())
}

fn handle_total(engine: &Engine, raw: Option<serde_json::Value>) -> RpcResult {
    let params: TotalParams = match raw {
        Some(raw) => params(Some(raw))?,
        None => TotalParams {
            options: FormatOptions::default(),
        },
    };
    match engine.total()? {
        Some(q) => to_json(quantity_result(&q, &params.options)),
        None => Ok(serde_json::Value::Null),
    }
}

fn handle_clear(engine: &mut Engine) -> RpcResult {
    engine.clear();
    Ok(serde_json::json!({"message": "Cleared"}))
}

/// Run the JSON-RPC server loop
pub fn run_server(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_request(engine, &line);
        let json = serde_json::to_string(&response)?;
        writeln!(stdout, "{json}")?;
        stdout.flush()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn call(engine: &mut Engine, request: serde_json::Value) -> serde_json::Value {
        let response = handle_request(engine, &request.to_string());
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_eval_quantity() {
        let mut engine = Engine::new();
        let response = call(
            &mut engine,
            json!({"jsonrpc": "2.0", "method": "eval", "params": {"expr": "92-5/8in * 9"}, "id": 1}),
        );
        assert_eq!(response["result"]["type"], "quantity");
        assert_eq!(response["result"]["display"], "833-5/8in");
        assert_eq!(response["result"]["repr"], "#833-5/8in");
        assert_eq!(response["id"], 1);
    }

    #[test]
    fn test_engine_errors_use_server_error_code() {
        let mut engine = Engine::new();
        let response = call(
            &mut engine,
            json!({"jsonrpc": "2.0", "method": "eval", "params": {"expr": "1kg + 1m"}, "id": 2}),
        );
        assert_eq!(response["error"]["code"], ENGINE_ERROR);
        assert_eq!(response["error"]["message"], "cannot add mass and length");
    }

    #[test]
    fn test_protocol_errors() {
        let mut engine = Engine::new();
        let response = serde_json::to_value(handle_request(&mut engine, "{not json")).unwrap();
        assert_eq!(response["error"]["code"], PARSE_ERROR);

        let response = call(&mut engine, json!({"jsonrpc": "1.0", "method": "eval", "id": 3}));
        assert_eq!(response["error"]["code"], INVALID_REQUEST);

        let response = call(&mut engine, json!({"jsonrpc": "2.0", "method": "nope", "id": 4}));
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);

        let response = call(&mut engine, json!({"jsonrpc": "2.0", "method": "convert", "params": {"literal": "1m"}, "id": 5}));
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn test_total_after_eval_lines() {
        let mut engine = Engine::new();
        let response = call(
            &mut engine,
            json!({"jsonrpc": "2.0", "method": "eval_lines", "params": {"lines": ["1/4cup", "1kg + 1m", "2tbsp"]}, "id": 6}),
        );
        let results = response["result"].as_array().unwrap();
        assert_eq!(results[1]["type"], "error");

        let response = call(&mut engine, json!({"jsonrpc": "2.0", "method": "total", "id": 7}));
        assert_eq!(response["result"]["display"], "3/8cup");
    }
}
