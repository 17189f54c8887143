use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::console::Console;
use crate::error::{MemoError, Result};
use crate::formatting::FormatContext;
use crate::note::{first_line, list_note_files};
use crate::process::{CommandRunner, expand_command, expand_filter};
use crate::template::{Template, Value};

#[derive(Debug, Default, Clone)]
pub struct ListOptions {
    pub fullpath: bool,
    pub format: Option<String>,
    pub pattern: Option<String>,
    /// stdout is a terminal
    pub tty: bool,
}

fn matches_pattern(file: &str, pattern: Option<&str>) -> bool {
    pattern.is_none_or(|p| p.is_empty() || file.contains(p))
}

pub fn list(cfg: &Config, opts: &ListOptions, out: &mut dyn Write) -> Result<()> {
    let dir = cfg.memo_dir();
    let files = list_note_files(dir)?;
    let template = opts.format.as_deref().map(Template::parse).transpose()?;
    let ctx = FormatContext::from_config(cfg.column, cfg.width);

    for file in files {
        if !matches_pattern(&file, opts.pattern.as_deref()) {
            continue;
        }
        let full = dir.join(&file);
        if let Some(t) = &template {
            let data = Value::record([
                ("File", Value::text(&file)),
                ("Title", Value::text(first_line(&full))),
                ("Fullpath", Value::text(full.to_string_lossy())),
            ]);
            writeln!(out, "{}", t.render(&data)?)?;
        } else if opts.tty && !opts.fullpath {
            writeln!(out, "{}", ctx.list_line(&file, &first_line(&full)))?;
        } else if opts.fullpath {
            writeln!(out, "{}", full.display())?;
        } else {
            writeln!(out, "{file}")?;
        }
    }
    Ok(())
}

/// Let the user pick notes through the configured selector command.
pub fn select_files(cfg: &Config, runner: &dyn CommandRunner) -> Result<Vec<PathBuf>> {
    let dir = cfg.memo_dir();
    let files = list_note_files(dir)?;
    let command = expand_filter(&cfg.select_cmd, &dir.to_string_lossy());
    let selected = runner.filter(&command, files.join("\n").as_bytes())?;
    let selected = String::from_utf8_lossy(&selected);
    let chosen: Vec<PathBuf> = selected
        .trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| dir.join(l))
        .collect();
    if chosen.is_empty() {
        return Err(MemoError::NoSelection);
    }
    Ok(chosen)
}

fn target_files(
    cfg: &Config,
    file: Option<&str>,
    runner: &dyn CommandRunner,
) -> Result<Vec<PathBuf>> {
    match file {
        Some(f) => Ok(vec![cfg.memo_dir().join(f)]),
        None => select_files(cfg, runner),
    }
}

pub fn edit(cfg: &Config, file: Option<&str>, runner: &dyn CommandRunner) -> Result<()> {
    let files = target_files(cfg, file, runner)?;
    let files: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
    let dir = cfg.memo_dir().to_string_lossy();
    runner.run(&expand_command(&cfg.editor, "", &dir, &files))
}

pub fn cat(
    cfg: &Config,
    file: Option<&str>,
    runner: &dyn CommandRunner,
    out: &mut dyn Write,
) -> Result<()> {
    for (i, path) in target_files(cfg, file, runner)?.iter().enumerate() {
        if i > 0 {
            // form feed between files
            writeln!(out, "\x12")?;
        }
        let body = fs::read(path)?;
        if body.is_empty() {
            continue;
        }
        let body = body.strip_suffix(b"\n").unwrap_or(&body);
        for line in body.split(|&b| b == b'\n') {
            out.write_all(line.strip_suffix(b"\r").unwrap_or(line))?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Remove every note whose name contains `pattern`, after asking twice.
pub fn delete(cfg: &Config, pattern: Option<&str>, console: &mut Console<'_>) -> Result<()> {
    let pattern = pattern.ok_or(MemoError::PatternRequired)?;
    let dir = cfg.memo_dir();
    let ctx = FormatContext::from_config(cfg.column, cfg.width);

    let mut targets = Vec::new();
    for file in list_note_files(dir)? {
        if !matches_pattern(&file, Some(pattern)) {
            continue;
        }
        writeln!(console.output, "{file}")?;
        targets.push(dir.join(file));
    }
    if targets.is_empty() {
        writeln!(console.output, "{}", ctx.warn("No matched entry"))?;
        return Ok(());
    }

    writeln!(console.output, "{}", ctx.alert("Will delete those entry. Are you sure?"))?;
    if !console.confirm("Are you sure? (y/N)")? || !console.confirm("Really? (y/N)")? {
        return Ok(());
    }
    for path in targets {
        fs::remove_file(&path)?;
        let msg = format!("Deleted: {}", path.display());
        writeln!(console.output, "{}", ctx.warn(&msg))?;
    }
    Ok(())
}

pub fn grep(cfg: &Config, pattern: Option<&str>, runner: &dyn CommandRunner) -> Result<()> {
    let pattern = pattern.ok_or(MemoError::PatternRequired)?;
    let dir = cfg.memo_dir();
    let files: Vec<PathBuf> = list_note_files(dir)?
        .into_iter()
        .map(|f| dir.join(f))
        .collect();
    if files.is_empty() {
        return Ok(());
    }
    let files: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
    runner.run(&expand_command(&cfg.grep_cmd, pattern, &dir.to_string_lossy(), &files))
}

/// Print the config file with `cat`, otherwise open it in the editor.
pub fn config(
    cfg: &Config,
    cat: bool,
    runner: &dyn CommandRunner,
    out: &mut dyn Write,
) -> Result<()> {
    if cat {
        let mut f = fs::File::open(&cfg.path)?;
        io::copy(&mut f, out)?;
        return Ok(());
    }
    let dir = cfg.memo_dir().to_string_lossy();
    runner.run(&expand_command(&cfg.editor, "", &dir, &[cfg.path.as_path()]))
}
