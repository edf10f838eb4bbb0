use serde_json::{json, Value};

use abacus_core::{format_number, Calculator, Input};

use crate::protocol::{HistoryEntry, ToolError, ToolOutput};

pub fn tool_definitions() -> Value {
    json!({
        "tools": [
            {
                "name": "abacus_press",
                "description": "Press calculator keys in order. Digits 0-9 and '.', operators + - * / ^ =, '~' toggles the sign, '<' is backspace, 'c' clears. Returns the screen.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "keys": {
                            "type": "string",
                            "description": "Key sequence, e.g. \"12+30=\""
                        }
                    },
                    "required": ["keys"]
                }
            },
            {
                "name": "abacus_display",
                "description": "Return the current screen without pressing anything.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "abacus_select",
                "description": "Use a value as the current operand, as if pasted. Thousands separators are accepted. Limited to 14 characters unless no_limit is set.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "value": { "type": "string" },
                        "no_limit": { "type": "boolean", "default": false }
                    },
                    "required": ["value"]
                }
            },
            {
                "name": "abacus_history",
                "description": "List past results, most recent first.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "abacus_clear_history",
                "description": "Delete every past result.",
                "inputSchema": { "type": "object", "properties": {} }
            }
        ]
    })
}

pub fn call_tool(calc: &mut Calculator, name: &str, args: &Value) -> Result<ToolOutput, ToolError> {
    match name {
        "abacus_press" => tool_press(calc, args),
        "abacus_display" => Ok(ToolOutput::Screen(calc.screen())),
        "abacus_select" => tool_select(calc, args),
        "abacus_history" => Ok(tool_history(calc)),
        "abacus_clear_history" => {
            let removed = calc.history().len();
            calc.clear_history();
            Ok(ToolOutput::HistoryCleared { removed })
        }
        _ => Err(ToolError::UnknownTool(name.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn get_str<'a>(args: &'a Value, key: &'static str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or(ToolError::MissingField(key))
}

fn get_bool(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

fn tool_press(calc: &mut Calculator, args: &Value) -> Result<ToolOutput, ToolError> {
    let keys = get_str(args, "keys")?;
    calc.press_keys(keys)?;
    Ok(ToolOutput::Screen(calc.screen()))
}

fn tool_select(calc: &mut Calculator, args: &Value) -> Result<ToolOutput, ToolError> {
    let value = get_str(args, "value")?;
    let no_limit = get_bool(args, "no_limit", false);

    calc.handle(Input::SelectHistory {
        value: value.to_string(),
        no_limit,
    })?;
    Ok(ToolOutput::Screen(calc.screen()))
}

fn tool_history(calc: &Calculator) -> ToolOutput {
    let entries = calc
        .history()
        .iter()
        .enumerate()
        .map(|(index, value)| HistoryEntry {
            index,
            value,
            display: format_number(value),
        })
        .collect();
    ToolOutput::History { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use abacus_core::{AbacusError, Screen};

    use crate::protocol::{INPUT_REJECTED, INVALID_PARAMS};

    fn screen(output: ToolOutput) -> Screen {
        match output {
            ToolOutput::Screen(screen) => screen,
            other => panic!("expected a screen, got {other:?}"),
        }
    }

    #[test]
    fn test_definitions_list_every_tool() {
        let defs = tool_definitions();
        let names: Vec<&str> = defs["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        for name in [
            "abacus_press",
            "abacus_display",
            "abacus_select",
            "abacus_history",
            "abacus_clear_history",
        ] {
            assert!(names.contains(&name), "missing {name}");
        }
    }

    #[test]
    fn test_press_returns_screen() {
        let mut calc = Calculator::new();
        let output = call_tool(&mut calc, "abacus_press", &json!({ "keys": "1200+34=" })).unwrap();
        let screen = screen(output);
        assert_eq!(screen.current, "1,234");
        assert_eq!(screen.previous_expression, "1,200 + 34");
        assert!(screen.is_answer);
    }

    #[test]
    fn test_press_missing_keys() {
        let mut calc = Calculator::new();
        let err = call_tool(&mut calc, "abacus_press", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::MissingField("keys")));
        assert_eq!(err.code(), INVALID_PARAMS);
    }

    #[test]
    fn test_press_unknown_key() {
        let mut calc = Calculator::new();
        let err = call_tool(&mut calc, "abacus_press", &json!({ "keys": "1+z" })).unwrap_err();
        assert_eq!(err.code(), INPUT_REJECTED);
        assert_eq!(calc.current_display(), "0");
    }

    #[test]
    fn test_select_rejects_garbage() {
        let mut calc = Calculator::new();
        let err = call_tool(&mut calc, "abacus_select", &json!({ "value": "abc" })).unwrap_err();
        assert!(matches!(
            err,
            ToolError::Calculator(AbacusError::ValidationRejected(_))
        ));
        assert!(err.to_string().contains("not a valid number"));
    }

    #[test]
    fn test_select_accepts_grouped() {
        let mut calc = Calculator::new();
        let output = call_tool(&mut calc, "abacus_select", &json!({ "value": "123,456" })).unwrap();
        assert_eq!(screen(output).current, "123,456");
        assert_eq!(calc.state().current_entry.as_deref(), Some("123456"));
    }

    #[test]
    fn test_history_and_clear() {
        let mut calc = Calculator::new();
        let output = call_tool(&mut calc, "abacus_history", &json!({})).unwrap();
        assert!(matches!(output, ToolOutput::History { ref entries } if entries.is_empty()));

        calc.press_keys("1000*2=").unwrap();
        calc.press_keys("+1=").unwrap();
        let output = call_tool(&mut calc, "abacus_history", &json!({})).unwrap();
        let ToolOutput::History { entries } = output else {
            panic!("expected history");
        };
        assert_eq!(
            entries[0],
            HistoryEntry {
                index: 0,
                value: 2001.0,
                display: "2,001".into(),
            }
        );
        assert_eq!(entries[1].display, "2,000");

        let output = call_tool(&mut calc, "abacus_clear_history", &json!({})).unwrap();
        assert!(matches!(output, ToolOutput::HistoryCleared { removed: 2 }));
        assert!(calc.history().is_empty());
    }

    #[test]
    fn test_unknown_tool() {
        let mut calc = Calculator::new();
        let err = call_tool(&mut calc, "abacus_sqrt", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "abacus_sqrt"));
    }
}
