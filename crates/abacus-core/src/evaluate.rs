use crate::error::ArithmeticFault;
use crate::format::number_text;
use crate::input::Operator;

/// Largest magnitude a result may have and still fit the display.
pub const MAX_MAGNITUDE: f64 = 999_999_999_999_999.0;

/// Results with this many fractional digits or more are rounded to it.
pub const MAX_FRACTION_DIGITS: usize = 12;

/// Apply `op` to the committed operands.
///
/// `=` returns `left` unchanged. Non-finite results (division by zero
/// included) and results beyond [`MAX_MAGNITUDE`] are faults; anything else is
/// normalized by [`round_result`].
pub fn evaluate(left: f64, op: Operator, right: f64) -> Result<f64, ArithmeticFault> {
    let raw = match op {
        Operator::Add => left + right,
        Operator::Subtract => left - right,
        Operator::Multiply => left * right,
        Operator::Divide => left / right,
        Operator::Power => left.powf(right),
        Operator::Equals => left,
    };

    if !raw.is_finite() {
        return Err(ArithmeticFault::NonFinite);
    }
    if raw.abs() > MAX_MAGNITUDE {
        return Err(ArithmeticFault::MagnitudeOverflow);
    }
    Ok(round_result(raw))
}

/// Round to [`MAX_FRACTION_DIGITS`] when the shortest decimal form of `value`
/// carries that many fractional digits or more.
pub fn round_result(value: f64) -> f64 {
    let text = number_text(value);
    let fraction_len = text.split_once('.').map_or(0, |(_, f)| f.len());
    if fraction_len < MAX_FRACTION_DIGITS {
        return value;
    }
    format!("{value:.MAX_FRACTION_DIGITS$}")
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        assert_eq!(evaluate(7.0, Operator::Add, 3.0), Ok(10.0));
        assert_eq!(evaluate(7.0, Operator::Subtract, 10.0), Ok(-3.0));
        assert_eq!(evaluate(6.0, Operator::Multiply, 7.0), Ok(42.0));
        assert_eq!(evaluate(10.0, Operator::Divide, 4.0), Ok(2.5));
        assert_eq!(evaluate(2.0, Operator::Power, 10.0), Ok(1024.0));
        assert_eq!(evaluate(5.0, Operator::Equals, 99.0), Ok(5.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            evaluate(5.0, Operator::Divide, 0.0),
            Err(ArithmeticFault::NonFinite)
        );
        assert_eq!(
            evaluate(0.0, Operator::Divide, 0.0),
            Err(ArithmeticFault::NonFinite)
        );
    }

    #[test]
    fn test_nan_power() {
        assert_eq!(
            evaluate(-8.0, Operator::Power, 0.5),
            Err(ArithmeticFault::NonFinite)
        );
    }

    #[test]
    fn test_magnitude_overflow() {
        assert_eq!(evaluate(999_999_999_999_999.0, Operator::Add, 0.0), Ok(MAX_MAGNITUDE));
        assert_eq!(
            evaluate(999_999_999_999_999.0, Operator::Add, 1.0),
            Err(ArithmeticFault::MagnitudeOverflow)
        );
        assert_eq!(
            evaluate(-999_999_999_999_999.0, Operator::Subtract, 1.0),
            Err(ArithmeticFault::MagnitudeOverflow)
        );
        assert_eq!(
            evaluate(1e8, Operator::Multiply, 1e8),
            Err(ArithmeticFault::MagnitudeOverflow)
        );
    }

    #[test]
    fn test_long_fraction_rounded() {
        assert_eq!(evaluate(0.1, Operator::Add, 0.2), Ok(0.3));
        assert_eq!(evaluate(1.0, Operator::Divide, 3.0), Ok(0.333333333333));
        assert_eq!(evaluate(2.0, Operator::Divide, 3.0), Ok(0.666666666667));
    }

    #[test]
    fn test_short_fraction_kept() {
        assert_eq!(round_result(0.125), 0.125);
        assert_eq!(round_result(0.12345678901), 0.12345678901);
    }

    #[test]
    fn test_tiny_result_rounds_to_zero() {
        assert_eq!(evaluate(1e-13, Operator::Add, 0.0), Ok(0.0));
    }
}
