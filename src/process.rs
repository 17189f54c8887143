//! Running user-configured external commands (editor, selector, grep,
//! plugins). Everything goes through [`CommandRunner`] so callers can be
//! exercised without spawning processes.

use std::cell::Cell;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::config::expand_vars;
use crate::error::{MemoError, Result};

pub trait CommandRunner {
    /// Run a shell command line with inherited stdin, stdout and stderr.
    fn run(&self, command: &str) -> Result<()>;

    /// Run a shell command line with `input` on stdin and return its stdout.
    fn filter(&self, command: &str, input: &[u8]) -> Result<Vec<u8>>;

    /// Run `program` directly with inherited streams and extra environment.
    fn exec(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(&str, &str)],
    ) -> Result<()>;

    /// Run `program` and collect stdout and stderr together.
    fn output(&self, program: &Path, args: &[&str]) -> Result<Vec<u8>>;
}

/// Runs commands through `sh -c` (`cmd /c` on Windows).
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

fn shell(command: &str) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/c");
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c");
        c
    };
    cmd.arg(command);
    cmd
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<()> {
        log::debug!("running: {command}");
        let status = shell(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        if !status.success() {
            return Err(MemoError::Command { command: command.to_string(), status });
        }
        Ok(())
    }

    fn filter(&self, command: &str, input: &[u8]) -> Result<Vec<u8>> {
        log::debug!("filtering through: {command}");
        let mut child = shell(command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        // stdin is fed from its own thread; a selector may exit before
        // reading everything.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_vec();
            thread::spawn(move || match stdin.write_all(&input) {
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            })
        });
        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| io::Error::other("stdin writer panicked"))??;
        }
        if !output.status.success() {
            return Err(MemoError::Command {
                command: command.to_string(),
                status: output.status,
            });
        }
        Ok(output.stdout)
    }

    fn exec(
        &self,
        program: &Path,
        args: &[String],
        envs: &[(&str, &str)],
    ) -> Result<()> {
        log::debug!("exec: {} {:?}", program.display(), args);
        let status = Command::new(program)
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        if !status.success() {
            return Err(MemoError::Command {
                command: program.display().to_string(),
                status,
            });
        }
        Ok(())
    }

    fn output(&self, program: &Path, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new(program).args(args).stdin(Stdio::null()).output()?;
        if !output.status.success() {
            return Err(MemoError::Command {
                command: program.display().to_string(),
                status: output.status,
            });
        }
        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);
        Ok(combined)
    }
}

/// Quote one argument for the platform shell.
pub fn shell_quote(s: &str) -> String {
    if cfg!(windows) {
        if !s.is_empty() && !s.contains([' ', '\t', '"']) {
            return s.to_string();
        }
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Build the command line for an editor/grep style command. `${FILES}`,
/// `${PATTERN}` and `${DIR}` are substituted, other variables come from the
/// environment. A command without any variable gets the files appended.
pub fn expand_command(
    command: &str,
    pattern: &str,
    dir: &str,
    files: &[&Path],
) -> String {
    let quoted = files
        .iter()
        .map(|f| shell_quote(&f.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");

    let used_var = Cell::new(false);
    let mut line = expand_vars(command, |name| {
        used_var.set(true);
        match name {
            "FILES" => Some(quoted.clone()),
            "PATTERN" => Some(pattern.to_string()),
            "DIR" => Some(dir.to_string()),
            other => std::env::var(other).ok(),
        }
    });
    if !used_var.get() && !quoted.is_empty() {
        line.push(' ');
        line.push_str(&quoted);
    }
    line
}

/// Build the command line for a selector: only `${DIR}` is special.
pub fn expand_filter(command: &str, dir: &str) -> String {
    expand_vars(command, |name| match name {
        "DIR" => Some(dir.to_string()),
        other => std::env::var(other).ok(),
    })
}
