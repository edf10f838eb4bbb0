use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AbacusError, AbacusResult, ArithmeticFault};
use crate::evaluate::evaluate;
use crate::format::{format_display, format_number, number_text, parse_plain};
use crate::history::History;
use crate::input::{parse_keys, Input, Operator};
use crate::persist::{FailureHandler, Persister};
use crate::state::{CalculatorState, Phase};
use crate::store::HistoryStore;

/// Significant digits accepted from the keypad for one operand.
pub const MAX_ENTRY_DIGITS: usize = 12;

/// Longest pasted value accepted without `no_limit`.
pub const MAX_PASTE_LEN: usize = 14;

/// The calculator engine: input interpreter, evaluator and display queries
/// over a single [`CalculatorState`].
pub struct Calculator {
    state: CalculatorState,
    persister: Option<Persister>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::with_history(History::new())
    }

    /// Engine without persistence, starting from an existing history.
    pub fn with_history(history: History) -> Self {
        Self {
            state: CalculatorState::with_history(history),
            persister: None,
        }
    }

    /// Load history from `store` once, then persist every history change
    /// through a write-behind worker. A load failure is reported to
    /// `on_failure` and the engine starts with an empty history.
    pub fn with_store(
        mut store: Box<dyn HistoryStore>,
        on_failure: FailureHandler,
    ) -> AbacusResult<Self> {
        let history = match store.load() {
            Ok(values) => History::from_values(values),
            Err(e) => {
                warn!("could not load history: {e}");
                on_failure(&e);
                History::new()
            }
        };
        let persister = Persister::spawn(store, on_failure)?;
        Ok(Self {
            state: CalculatorState::with_history(history),
            persister: Some(persister),
        })
    }

    pub fn state(&self) -> &CalculatorState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Apply one input. Ignored inputs are no-ops; only a rejected
    /// [`Input::SelectHistory`] returns an error, leaving state untouched.
    pub fn handle(&mut self, input: Input) -> AbacusResult<()> {
        match input {
            Input::Digit(d) => self.digit(d),
            Input::Operator(op) => self.operator(op),
            Input::NegativeToggle => self.negative_toggle(),
            Input::Backspace => self.backspace(),
            Input::Clear => self.state.reset(),
            Input::SelectHistory { value, no_limit } => return self.select(&value, no_limit),
        }
        Ok(())
    }

    /// Parse and apply a keypad sequence such as `"12+3="`.
    pub fn press_keys(&mut self, keys: &str) -> AbacusResult<()> {
        for input in parse_keys(keys)? {
            self.handle(input)?;
        }
        Ok(())
    }

    /// Use the history entry at `index` (0 = most recent) as the operand.
    pub fn use_history(&mut self, index: usize) -> AbacusResult<()> {
        let value = self.state.history.get(index).ok_or_else(|| {
            AbacusError::ValidationRejected(format!("no history entry at {index}"))
        })?;
        self.handle(Input::pick(number_text(value)))
    }

    pub fn clear_history(&mut self) {
        self.state.history.clear();
        if let Some(persister) = &self.persister {
            persister.clear();
        }
    }

    /// The main display line. With nothing being edited this falls back to
    /// the previous operand, and to an empty string when there is none.
    pub fn current_display(&self) -> String {
        match &self.state.current_entry {
            Some(entry) => format_display(entry),
            None => self
                .state
                .previous_operand
                .map(format_number)
                .unwrap_or_default(),
        }
    }

    pub fn screen(&self) -> Screen {
        Screen {
            previous_expression: self.state.previous_expression.clone().unwrap_or_default(),
            operator: self.state.pending_operator,
            current: self.current_display(),
            is_answer: self.state.is_result,
            has_error: self.state.has_error,
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    fn digit(&mut self, d: char) {
        let state = &mut self.state;
        if state.has_error || !(d.is_ascii_digit() || d == '.') {
            return;
        }
        if !state.operator_just_pressed && state.current_entry.as_deref().is_some_and(entry_is_full) {
            return;
        }
        if d == '.' && state.current_entry.as_deref().is_some_and(|e| e.contains('.')) {
            return;
        }

        if let Some(prev) = state.previous_operand {
            state.previous_expression = Some(format_number(prev));
        }
        state.is_result = false;

        if state.operator_just_pressed {
            state.operator_just_pressed = false;
            state.current_entry = Some(d.to_string());
            if state.pending_operator == Some(Operator::Equals) {
                state.end_chain();
            }
            return;
        }

        let next = match state.current_entry.as_deref() {
            entry if d == '.' => format!("{}.", entry.unwrap_or_default()),
            None | Some("") | Some("0") => d.to_string(),
            Some("-0") => format!("-{d}"),
            Some(entry) => format!("{entry}{d}"),
        };
        state.current_entry = Some(next);
    }

    fn operator(&mut self, op: Operator) {
        if self.state.has_error {
            return;
        }
        if matches!(self.state.current_entry.as_deref(), Some("-" | "." | "-.")) {
            return;
        }
        self.state.operator_just_pressed = true;

        let mut committed = false;
        if let (Some(prev), Some(pending), Some(entry)) = (
            self.state.previous_operand,
            self.state.pending_operator,
            self.state.current_entry.clone(),
        ) {
            self.state.previous_expression = Some(match pending {
                Operator::Equals => format_number(prev),
                _ => format!(
                    "{} {pending} {}",
                    format_number(prev),
                    format_display(&entry)
                ),
            });

            let outcome = parse_plain(&entry)
                .ok_or(ArithmeticFault::NonFinite)
                .and_then(|right| evaluate(prev, pending, right));
            match outcome {
                Ok(result) => {
                    debug!("commit: {prev} {pending} {entry} = {result}");
                    self.state.previous_operand = Some(result);
                    self.state.current_entry = None;
                    self.state.is_result = true;
                    self.record(result);
                    committed = true;
                }
                Err(fault) => {
                    self.fail(fault);
                    return;
                }
            }
        }

        self.state.pending_operator = Some(op);
        if !committed {
            if let Some(entry) = self.state.current_entry.take() {
                match parse_plain(&entry) {
                    Some(value) => self.state.previous_operand = Some(value),
                    None => self.fail(ArithmeticFault::NonFinite),
                }
            }
        }
    }

    fn negative_toggle(&mut self) {
        let state = &mut self.state;
        if state.has_error {
            return;
        }

        if state.is_result || state.operator_just_pressed {
            state.is_result = false;
            state.previous_expression = None;
            if state.pending_operator == Some(Operator::Equals) {
                state.operator_just_pressed = false;
                state.pending_operator = None;
                let negated = state.previous_operand.take().map_or(0.0, |v| -v);
                state.current_entry = Some(number_text(negated));
            } else if let Some(prev) = state.previous_operand.as_mut() {
                *prev = -*prev;
            }
            return;
        }

        if let Some(entry) = state.current_entry.as_mut() {
            *entry = match entry.strip_prefix('-') {
                Some(rest) => rest.to_string(),
                None => format!("-{entry}"),
            };
        }
    }

    fn backspace(&mut self) {
        let state = &mut self.state;
        if state.has_error || state.is_result || state.operator_just_pressed {
            return;
        }
        if let Some(entry) = state.current_entry.as_mut() {
            if entry.chars().count() <= 1 {
                *entry = "0".to_string();
            } else {
                entry.pop();
            }
        }
    }

    fn select(&mut self, value: &str, no_limit: bool) -> AbacusResult<()> {
        let cleaned = value.replace(',', "");
        let cleaned = cleaned.trim();
        let cleaned = cleaned.strip_prefix('+').unwrap_or(cleaned);

        let Some(number) = parse_plain(cleaned) else {
            return Err(AbacusError::ValidationRejected(format!(
                "{value} is not a valid number"
            )));
        };
        let len = cleaned.chars().count();
        if len > MAX_PASTE_LEN && !no_limit {
            return Err(AbacusError::ValidationRejected(format!(
                "Number is too big - {MAX_PASTE_LEN} digits max ({len})"
            )));
        }

        let state = &mut self.state;
        if state.has_error {
            state.reset();
        } else if let Some(prev) = state.previous_operand {
            state.previous_expression = Some(format_number(prev));
        }
        state.is_result = false;
        if state.operator_just_pressed {
            state.operator_just_pressed = false;
            if state.pending_operator == Some(Operator::Equals) {
                state.end_chain();
            }
        }
        // Plain decimal, so typed digits extend the number and not an exponent.
        state.current_entry = Some(number_text(number));
        Ok(())
    }

    fn fail(&mut self, fault: ArithmeticFault) {
        debug!("arithmetic fault: {fault}");
        self.state.has_error = true;
        self.state.is_result = false;
        self.state.current_entry = Some(fault.display_text().to_string());
    }

    fn record(&mut self, result: f64) {
        self.state.history.push(result);
        if let Some(persister) = &self.persister {
            persister.save(self.state.history.to_vec());
        }
    }
}

fn entry_is_full(entry: &str) -> bool {
    entry.chars().filter(char::is_ascii_digit).count() >= MAX_ENTRY_DIGITS
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// Presentation snapshot derived from the state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Screen {
    pub previous_expression: String,
    pub operator: Option<Operator>,
    pub current: String,
    /// The current value is a freshly computed result.
    pub is_answer: bool,
    pub has_error: bool,
}
