pub mod calculator;
pub mod error;
pub mod evaluate;
pub mod format;
pub mod history;
pub mod input;
pub mod persist;
pub mod state;
pub mod store;

pub use calculator::{Calculator, Screen, MAX_ENTRY_DIGITS, MAX_PASTE_LEN};
pub use error::{AbacusError, AbacusResult, ArithmeticFault};
pub use evaluate::evaluate;
pub use format::{format_display, format_number, number_text};
pub use history::{History, HISTORY_CAPACITY};
pub use input::{parse_keys, Input, Operator};
pub use persist::{FailureHandler, Persister};
pub use state::{CalculatorState, Phase};
pub use store::HistoryStore;
