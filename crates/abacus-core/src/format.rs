//! Display formatting: thousands grouping for entries and stored numbers.
//!
//! Every function here is pure. [`format_display`] is idempotent: its output
//! is either passed through unchanged or already grouped, and grouped text no
//! longer parses as a plain number.

/// Fractional digits used when expanding exponential notation.
const FIXED_DIGITS: usize = 12;

/// Parse `text` as a plain finite decimal (optionally signed, optionally in
/// exponential notation). Grouped text, sentinels and incomplete entries such
/// as `"-"` or `"."` return `None`.
pub(crate) fn parse_plain(text: &str) -> Option<f64> {
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format an entry or stored value for display.
pub fn format_display(value: &str) -> String {
    let Some(number) = parse_plain(value) else {
        return value.to_string();
    };

    // Keep the dot the user just typed.
    if let Some(integer) = value.strip_suffix('.') {
        return format!("{}.", group_integer(integer));
    }

    if value.contains(['e', 'E']) {
        let fixed = format!("{number:.FIXED_DIGITS$}");
        let fixed = fixed.trim_end_matches('0').trim_end_matches('.');
        return group(fixed);
    }

    group(value)
}

/// Format a committed number through [`format_display`].
pub fn format_number(value: f64) -> String {
    format_display(&number_text(value))
}

/// Shortest round-trip decimal text for a stored number. Never uses
/// exponential notation; negative zero renders as `0`.
pub fn number_text(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Group the integer portion, leaving the fractional digits untouched.
fn group(text: &str) -> String {
    match text.split_once('.') {
        Some((integer, fraction)) => format!("{}.{fraction}", group_integer(integer)),
        None => group_integer(text),
    }
}

fn group_integer(text: &str) -> String {
    let (sign, digits) = match text.strip_prefix(['-', '+']) {
        Some(rest) => (&text[..1], rest),
        None => ("", text),
    };

    let mut out = String::with_capacity(text.len() + digits.len() / 3);
    out.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
