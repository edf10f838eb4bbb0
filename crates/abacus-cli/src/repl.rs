//! Interactive keypad session.
//!
//! Each line is either a key sequence (`12+3=`) or a `:`-command.

use std::io::{BufRead, Write};

use anyhow::Result;

use abacus_core::{AbacusError, Calculator, Input, Screen};

const HELP: &str = "\
keys:      0-9 .  + - * / ^ =   ~ (sign)  < (backspace)  c (clear)
commands:  :paste <value>   use a typed or pasted number
           :history         list past results
           :use <n>         use result n from the history
           :clear-history   delete every past result
           :help            show this text
           :quit            leave";

/// Render a screen as two lines: the previous expression with the pending
/// operator, then the current value.
pub fn render_screen(screen: &Screen, show_answer_marker: bool) -> String {
    let operator = screen.operator.map(|op| op.symbol()).unwrap_or_default();
    let marker = if screen.is_answer && show_answer_marker {
        "(Ans) "
    } else {
        ""
    };
    format!(
        "{:>24} {operator}\n{marker}{}",
        screen.previous_expression, screen.current
    )
}

pub fn run_repl<R: BufRead, W: Write>(
    calc: &mut Calculator,
    mut reader: R,
    out: &mut W,
    show_answer_marker: bool,
) -> Result<()> {
    writeln!(out, "{}", render_screen(&calc.screen(), show_answer_marker))?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = match line.split_once(' ').unwrap_or((line, "")) {
            (":quit" | ":q", _) => break,
            (":help", _) => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            (":history", _) => {
                print_history(calc, out)?;
                continue;
            }
            (":clear-history", _) => {
                calc.clear_history();
                writeln!(out, "History cleared")?;
                continue;
            }
            (":paste", value) => calc.handle(Input::paste(value.trim())),
            (":use", index) => match index.trim().parse::<usize>() {
                Ok(i) => calc.use_history(i),
                Err(_) => Err(AbacusError::ValidationRejected(format!(
                    "not a history index: {index}"
                ))),
            },
            (cmd, _) if cmd.starts_with(':') => {
                writeln!(out, "unknown command: {cmd} (try :help)")?;
                continue;
            }
            _ => calc.press_keys(line),
        };

        if let Err(e) = outcome {
            writeln!(out, "error: {e}")?;
        }
        writeln!(out, "{}", render_screen(&calc.screen(), show_answer_marker))?;
    }

    Ok(())
}

fn print_history<W: Write>(calc: &Calculator, out: &mut W) -> Result<()> {
    let history = calc.history().formatted();
    if history.is_empty() {
        writeln!(out, "No results yet.")?;
        return Ok(());
    }
    for (i, value) in history.iter().enumerate() {
        writeln!(out, "{i:>3}  {value}")?;
    }
    Ok(())
}
