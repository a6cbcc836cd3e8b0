//! Line-oriented command loop over any reader/writer pair.

/// Prompt command words and the lookup table.
pub mod commands;

use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use tracing::{debug, info};

use crate::{
    decimal::Decimal,
    engine::CalcError,
    persist::SaveOutcome,
    runtime::session::{Calculator, CalculatorError},
    types::Operator,
};

pub use commands::{Command, CommandTable};

/// Drives `calculator` from `input` until `exit` or end of input.
///
/// Command failures are printed and the loop continues; only I/O errors on
/// `input`/`output` end it early.
pub fn run<R: BufRead, W: Write>(
    calculator: &mut Calculator,
    json_path: &Path,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    let commands = CommandTable::new();
    writeln!(output, "Welcome to the calculator. Type 'help' to see available commands.")?;

    loop {
        let Some(line) = prompt(&mut input, &mut output, "Select operation: ")? else {
            break;
        };
        let word = line.trim();
        if word.is_empty() {
            continue;
        }
        let Some(command) = commands.lookup(word) else {
            writeln!(output, "Command `{word}` not available. Type 'help' to list commands.")?;
            continue;
        };
        debug!(command = command.name(), "command entered");

        let flow = match command {
            Command::Exit => break,
            Command::Help => {
                writeln!(output, "{}", commands.help_text())?;
                Ok(())
            }
            Command::Calculate(op) => calculate(calculator, op, &mut input, &mut output),
            other => dispatch(calculator, other, json_path, &mut output),
        };
        match flow {
            Ok(()) => {}
            Err(Step::Eof) => break,
            Err(Step::Io(e)) => return Err(e),
            Err(Step::Failed(e)) => writeln!(output, "{}: {e}", error_label(&e))?,
        }
    }

    info!("session closed");
    writeln!(output, "Goodbye!")?;
    Ok(())
}

enum Step {
    Eof,
    Io(io::Error),
    Failed(CalculatorError),
}

impl From<io::Error> for Step {
    fn from(e: io::Error) -> Self {
        Step::Io(e)
    }
}

impl From<CalculatorError> for Step {
    fn from(e: CalculatorError) -> Self {
        Step::Failed(e)
    }
}

fn calculate<R: BufRead, W: Write>(
    calculator: &mut Calculator,
    op: Operator,
    input: &mut R,
    output: &mut W,
) -> Result<(), Step> {
    writeln!(output, "Operation selected: {}", op.display_name())?;
    let a = read_operand(input, output, "Enter first operand: ")?;
    let b = read_operand(input, output, "Enter second operand: ")?;

    let outcome = calculator.calculate(op, &a, &b)?;
    let suffix = if op == Operator::Percentage { "%" } else { "" };
    writeln!(output, "Result: {}{suffix}", outcome.record.result)?;
    if let Some(e) = outcome.autosave_error {
        writeln!(output, "File error: {e}")?;
    }
    Ok(())
}

fn dispatch<W: Write>(
    calculator: &mut Calculator,
    command: Command,
    json_path: &Path,
    output: &mut W,
) -> Result<(), Step> {
    match command {
        Command::History => {
            if calculator.history().is_empty() {
                writeln!(output, "No history to display.")?;
            }
            for (i, record) in calculator.history().iter().enumerate() {
                writeln!(output, "{:>3}. {record}", i + 1)?;
            }
        }
        Command::Clear => {
            if calculator.clear() {
                writeln!(output, "History cleared.")?;
            } else {
                writeln!(output, "No history to clear.")?;
            }
        }
        Command::Undo => {
            if !calculator.can_undo() {
                writeln!(output, "Nothing to undo.")?;
            } else {
                match calculator.undo()? {
                    Some(record) => writeln!(output, "Undo performed: {record}")?,
                    None => writeln!(output, "Undo performed.")?,
                }
            }
        }
        Command::Redo => {
            if !calculator.can_redo() {
                writeln!(output, "Nothing to redo.")?;
            } else {
                match calculator.redo()? {
                    Some(record) => writeln!(output, "Redo performed: {record}")?,
                    None => writeln!(output, "Redo performed.")?,
                }
            }
        }
        Command::Save => match calculator.save()? {
            SaveOutcome::Saved(n) => writeln!(
                output,
                "Saved {n} records to {}.",
                calculator.sink().path().display()
            )?,
            SaveOutcome::NothingToSave => writeln!(output, "No history to save.")?,
        },
        Command::Load => match calculator.load()? {
            0 => writeln!(output, "No saved history to load.")?,
            n => writeln!(output, "Loaded {n} records.")?,
        },
        Command::Export => {
            let n = calculator.export_json(json_path)?;
            writeln!(output, "Exported {n} records to {}.", json_path.display())?;
        }
        Command::Import => match calculator.import_json(json_path)? {
            0 => writeln!(output, "No saved history to import.")?,
            n => writeln!(output, "Imported {n} records.")?,
        },
        Command::Calculate(_) | Command::Help | Command::Exit => {}
    }
    Ok(())
}

fn read_operand<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<Decimal, Step> {
    loop {
        let Some(line) = prompt(input, output, label)? else {
            return Err(Step::Eof);
        };
        match line.trim().parse::<Decimal>() {
            Ok(value) => return Ok(value),
            Err(e) => writeln!(output, "Invalid number ({e}). Please try again.")?,
        }
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<Option<String>> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn error_label(e: &CalculatorError) -> &'static str {
    match e {
        CalculatorError::Calc(CalcError::Validation(_)) => "Input error",
        CalculatorError::Calc(CalcError::Operation(_)) => "Operation error",
        CalculatorError::History(_) => "History error",
        CalculatorError::Persist(_) => "File error",
        CalculatorError::Config(_) => "Configuration error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::CalculatorConfig, persist::csv::CsvHistoryFile};

    fn session(dir: &Path) -> Calculator {
        let config = CalculatorConfig::default();
        let sink = CsvHistoryFile::open(dir.join("history.csv"), config.max_history_size, false).unwrap();
        Calculator::new(&config, Box::new(sink)).with_instance_id("repl-test")
    }

    fn drive(calculator: &mut Calculator, dir: &Path, script: &str) -> String {
        let mut out = Vec::new();
        run(calculator, &dir.join("history.json"), script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn calculates_then_undoes_until_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut calc = session(dir.path());
        let out = drive(&mut calc, dir.path(), "add\n2\n3\nhist\nundo\nundo\nexit\n");

        assert!(out.contains("Result: 5.0000"));
        assert!(out.contains("Addition: 2.0000 + 3.0000 = 5.0000"));
        assert!(out.contains("Undo performed"));
        assert!(out.contains("Nothing to undo."));
        assert!(out.trim_end().ends_with("Goodbye!"));
        assert!(calc.history().is_empty());
    }

    #[test]
    fn bad_operand_reprompts_and_eof_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut calc = session(dir.path());
        let out = drive(&mut calc, dir.path(), "A\nabc\n50\n200\nK\n");

        assert!(out.contains("Invalid number"));
        assert!(out.contains("Result: 25.0000%"));
        assert_eq!(calc.history().len(), 1);
        assert!(out.contains("Goodbye!"));
    }

    #[test]
    fn failures_are_labelled_and_loop_continues() {
        let dir = tempfile::tempdir().unwrap();
        let mut calc = session(dir.path());
        let out = drive(
            &mut calc,
            dir.path(),
            "divide\n1\n0\npower\n0\n0\nroot\n-8\n3\nnope\nload\nsave\n",
        );

        assert!(out.contains("Input error: cannot divide by zero"));
        assert!(out.contains("Operation error: zero cannot be raised"));
        assert!(out.contains("Input error: radicand cannot be negative"));
        assert!(out.contains("Command `nope` not available"));
        assert!(out.contains("File error: cannot access"));
        assert!(out.contains("No history to save."));
        assert!(calc.history().is_empty());
    }

    #[test]
    fn load_into_non_empty_history_is_a_history_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut calc = session(dir.path());
        let out = drive(&mut calc, dir.path(), "add\n1\n1\nsave\nload\n");

        assert!(out.contains("Saved 1 records"));
        assert!(out.contains("History error: existing history cannot be overridden"));
    }

    #[test]
    fn export_then_import_restores_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut calc = session(dir.path());
        let out = drive(&mut calc, dir.path(), "multiply\n2\n4\nexport\nclear\nimport\n");

        assert!(out.contains("Exported 1 records"));
        assert!(out.contains("History cleared."));
        assert!(out.contains("Imported 1 records."));
        assert_eq!(calc.history().len(), 1);
    }
}
