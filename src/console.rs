use std::io::{self, BufRead, Write};

use crate::error::{MemoError, Result};

/// The standard streams a command talks to, plus whether stdin is a
/// terminal or a pipe.
pub struct Console<'a> {
    pub input: &'a mut dyn BufRead,
    pub output: &'a mut dyn Write,
    pub interactive: bool,
}

impl<'a> Console<'a> {
    pub fn new(
        input: &'a mut dyn BufRead,
        output: &'a mut dyn Write,
        interactive: bool,
    ) -> Self {
        Self { input, output, interactive }
    }

    /// Print `prompt` and read one line. End of input before anything was
    /// read is reported as [`MemoError::Canceled`].
    pub fn prompt_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(MemoError::Canceled);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']);
        Ok(trimmed.to_string())
    }

    /// Ask a yes/no question; anything but `y`/`Y` means no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = match self.prompt_line(&format!("{question}: ")) {
            Ok(answer) => answer,
            Err(MemoError::Canceled) => {
                writeln!(self.output)?;
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        Ok(matches!(answer.trim().chars().next(), Some('y' | 'Y')))
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)
    }
}
