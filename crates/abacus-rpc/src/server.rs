use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, error};

use abacus_core::{AbacusError, Calculator};

use crate::protocol::{RpcError, RpcRequest, RpcResponse, ToolError, INVALID_PARAMS, PARSE_ERROR};
use crate::tools;

const SERVER_NAME: &str = "abacus";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "\
abacus is a keypad calculator. It evaluates strictly left to right with no precedence: \
\"2+3*4=\" is 20. Press keys with abacus_press; every call returns the screen. \
Errors such as division by zero are sticky: press \"c\" to clear before continuing.";

/// Run the server on stdio. Blocks until stdin is closed.
pub fn run_server(calc: &mut Calculator) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    serve(calc, stdin.lock(), &mut stdout)
}

/// Serve line-delimited JSON-RPC requests from `reader`, one response per
/// request line. Notifications (no id) get no response.
pub fn serve<R: BufRead, W: Write>(
    calc: &mut Calculator,
    reader: R,
    writer: &mut W,
) -> anyhow::Result<()> {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("stdin read error: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: RpcRequest = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                error!("invalid JSON-RPC: {e}");
                let resp = RpcResponse::err(
                    Value::Null,
                    RpcError::new(PARSE_ERROR, format!("parse error: {e}")),
                );
                write_response(writer, &resp)?;
                continue;
            }
        };

        let method = msg.method.as_deref().unwrap_or("");
        debug!("RPC request: {method}");

        let id = match msg.id {
            Some(id) => id,
            None => continue,
        };

        let response = match method {
            "initialize" => handle_initialize(id),
            "ping" => RpcResponse::ok(id, json!({})),
            "tools/list" => RpcResponse::ok(id, tools::tool_definitions()),
            "tools/call" => handle_tools_call(id, &msg.params, calc),
            other => RpcResponse::err(id, RpcError::method_not_found(other)),
        };

        write_response(writer, &response)?;
    }

    Ok(())
}

fn write_response<W: Write>(writer: &mut W, resp: &RpcResponse) -> anyhow::Result<()> {
    let json = serde_json::to_string(resp)?;
    writeln!(writer, "{json}")?;
    writer.flush()?;
    Ok(())
}

fn handle_initialize(id: Value) -> RpcResponse {
    RpcResponse::ok(
        id,
        json!({
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "instructions": INSTRUCTIONS
        }),
    )
}

fn handle_tools_call(id: Value, params: &Option<Value>, calc: &mut Calculator) -> RpcResponse {
    let params = match params {
        Some(p) => p,
        None => return RpcResponse::err(id, RpcError::new(INVALID_PARAMS, "missing params")),
    };

    let tool_name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n,
        None => return RpcResponse::err(id, RpcError::new(INVALID_PARAMS, "missing tool name")),
    };

    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    let result = tools::call_tool(calc, tool_name, &args).and_then(|output| {
        serde_json::to_value(output).map_err(|e| ToolError::from(AbacusError::from(e)))
    });
    match result {
        Ok(value) => RpcResponse::ok(id, value),
        Err(e) => {
            debug!("tool {tool_name} failed: {e}");
            RpcResponse::err(id, e.into())
        }
    }
}
