use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AbacusError, AbacusResult};

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "^")]
    Power,
    #[serde(rename = "=")]
    Equals,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Power => "^",
            Self::Equals => "=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A discrete event forwarded by a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// A keypad digit `0-9` or the decimal point.
    Digit(char),
    Operator(Operator),
    NegativeToggle,
    Backspace,
    Clear,
    /// A value picked from the history list or pasted as free text.
    /// Pasted text is limited to 14 characters unless `no_limit` is set.
    SelectHistory { value: String, no_limit: bool },
}

impl Input {
    /// Map a single keypad character to an input. Whitespace and unknown
    /// characters map to `None`.
    pub fn from_key(key: char) -> Option<Self> {
        let input = match key {
            '0'..='9' | '.' => Self::Digit(key),
            '+' => Self::Operator(Operator::Add),
            '-' => Self::Operator(Operator::Subtract),
            '*' | 'x' | 'X' | '×' => Self::Operator(Operator::Multiply),
            '/' | '÷' => Self::Operator(Operator::Divide),
            '^' => Self::Operator(Operator::Power),
            '=' | '\n' | '\r' => Self::Operator(Operator::Equals),
            '~' | '±' | 'n' | 'N' => Self::NegativeToggle,
            '<' | '\u{8}' | '\u{7f}' => Self::Backspace,
            'c' | 'C' => Self::Clear,
            _ => return None,
        };
        Some(input)
    }

    pub fn paste(value: impl Into<String>) -> Self {
        Self::SelectHistory {
            value: value.into(),
            no_limit: false,
        }
    }

    pub fn pick(value: impl Into<String>) -> Self {
        Self::SelectHistory {
            value: value.into(),
            no_limit: true,
        }
    }
}

/// Parse a key sequence such as `"12+3="` into inputs. Spaces are skipped;
/// any other unknown character rejects the whole sequence.
pub fn parse_keys(keys: &str) -> AbacusResult<Vec<Input>> {
    keys.chars()
        .filter(|c| *c == '\n' || *c == '\r' || !c.is_whitespace())
        .map(|c| {
            Input::from_key(c)
                .ok_or_else(|| AbacusError::ValidationRejected(format!("unknown key: {c:?}")))
        })
        .collect()
}
