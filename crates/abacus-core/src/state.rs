use crate::history::History;
use crate::input::Operator;

/// Everything the engine knows. Owned by [`crate::Calculator`] and mutated
/// only through its input handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorState {
    /// Text of the operand being typed. `None` means the previous operand
    /// (usually a fresh result) is what the user sees.
    pub current_entry: Option<String>,
    pub previous_operand: Option<f64>,
    /// Line shown above the entry: the previous value or the expression that
    /// produced the current result.
    pub previous_expression: Option<String>,
    pub pending_operator: Option<Operator>,
    /// Set by an operator press; the next digit starts a fresh operand.
    pub operator_just_pressed: bool,
    pub is_result: bool,
    /// Sticky until Clear. `current_entry` then holds the sentinel text.
    pub has_error: bool,
    pub history: History,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self::with_history(History::new())
    }
}

impl CalculatorState {
    pub fn with_history(history: History) -> Self {
        Self {
            current_entry: Some("0".to_string()),
            previous_operand: None,
            previous_expression: None,
            pending_operator: None,
            operator_just_pressed: false,
            is_result: false,
            has_error: false,
            history,
        }
    }

    /// Reset the numeric state. History survives.
    pub fn reset(&mut self) {
        let history = std::mem::take(&mut self.history);
        *self = Self::with_history(history);
    }

    /// Drop the pending `=` chain so the next operand starts from scratch.
    pub(crate) fn end_chain(&mut self) {
        self.previous_expression = None;
        self.previous_operand = None;
        self.pending_operator = None;
    }

    pub fn phase(&self) -> Phase {
        if self.has_error {
            Phase::Error
        } else if self.is_result {
            Phase::ShowingResult
        } else if self.operator_just_pressed {
            Phase::OperatorPending
        } else {
            Phase::Editing
        }
    }
}

/// Coarse view of where the state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    OperatorPending,
    ShowingResult,
    /// Only Clear (or selecting a value) leaves this phase.
    Error,
}
