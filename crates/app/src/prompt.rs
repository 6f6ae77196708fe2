use std::fmt::Display;
use std::io::{self, BufRead, Stdout, StdinLock, Write};

/// Line-oriented terminal dialogue.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Print `question` and read one line. `None` at end of input.
    pub fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{question} [y/N] "))?;
        Ok(matches!(
            answer.as_deref().map(str::trim),
            Some("y" | "Y" | "yes" | "Yes")
        ))
    }

    #[cfg(test)]
    pub fn output(&self) -> &W {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn ask_strips_newlines_and_reports_eof() {
        let mut prompt = Prompt::new(Cursor::new("42\r\n"), Vec::new());
        assert_eq!(prompt.ask("? ").unwrap().as_deref(), Some("42"));
        assert_eq!(prompt.ask("? ").unwrap(), None);
        assert_eq!(String::from_utf8_lossy(prompt.output()), "? ? ");
    }

    #[test]
    fn confirm_defaults_to_no() {
        let mut prompt = Prompt::new(Cursor::new("\nyes\n"), Vec::new());
        assert!(!prompt.confirm("Sure?").unwrap());
        assert!(prompt.confirm("Sure?").unwrap());
        assert!(!prompt.confirm("Sure?").unwrap());
    }
}
