use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("input closed before a value was entered")]
    EndOfInput,

    #[error("failed to talk to the terminal: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a line was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("value must be finite, got {0}")]
    NotFinite(f64),

    #[error("value must be positive, got {0}")]
    NotPositive(f64),
}

/// Parses a strictly positive, finite number.
pub fn parse_positive(line: &str) -> Result<f64, InputError> {
    let trimmed = line.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(InputError::NotFinite(value));
    }
    if value <= 0.0 {
        return Err(InputError::NotPositive(value));
    }
    Ok(value)
}

/// Asks for a positive number until one parses. Bad lines are reported on
/// `output` and the question is repeated.
pub fn ask_positive<R: BufRead, W: Write>(question: &str, input: &mut R, output: &mut W) -> Result<f64, PromptError> {
    let mut line = String::new();
    loop {
        write!(output, "{question}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::EndOfInput);
        }

        match parse_positive(&line) {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!(input = line.trim(), "rejected prompt input");
                writeln!(output, "Invalid input: {e}. Please try again.")?;
            }
        }
    }
}

/// Prompts on the process's stdin/stdout.
pub fn ask_total_time() -> Result<f64, PromptError> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();
    ask_positive("Enter the total simulation time (in seconds): ", &mut input, &mut output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn accepts_first_valid_line() {
        let mut input = Cursor::new("12.5\n");
        let mut output = Vec::new();
        let value = ask_positive("T? ", &mut input, &mut output).unwrap();
        assert_eq!(value, 12.5);
        assert_eq!(String::from_utf8(output).unwrap(), "T? ");
    }

    #[test]
    fn reprompts_after_malformed_input() {
        let mut input = Cursor::new("ten\n-3\ninf\n  4 \n");
        let mut output = Vec::new();
        let value = ask_positive("T? ", &mut input, &mut output).unwrap();
        assert_eq!(value, 4.0);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("T? ").count(), 4);
        // One report per rejected line
        assert_eq!(text.matches("Invalid input").count(), 3);
        assert!(text.contains("'ten' is not a number"));
        assert!(text.contains("must be positive"));
        assert!(text.contains("must be finite"));
    }

    #[test]
    fn end_of_input_is_an_error() {
        let mut input = Cursor::new("oops\n");
        let mut output = Vec::new();
        let err = ask_positive("T? ", &mut input, &mut output).unwrap_err();
        assert!(matches!(err, PromptError::EndOfInput));
    }

    #[test]
    fn parse_positive_cases() {
        assert_eq!(parse_positive("3"), Ok(3.0));
        assert_eq!(parse_positive("0"), Err(InputError::NotPositive(0.0)));
        assert!(matches!(parse_positive(""), Err(InputError::NotANumber(_))));
        assert!(matches!(parse_positive("NaN"), Err(InputError::NotFinite(_))));
    }
}
