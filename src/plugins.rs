//! External subcommands: executables in the plugins directory run as
//! `memo <name> [args...]`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{MemoError, Result};
use crate::process::CommandRunner;

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    let exts = std::env::var("PATHEXT").unwrap_or_default().to_lowercase();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();
    path.is_file() && !ext.is_empty() && exts.split(';').any(|p| p == ext)
}

/// Executable plugins in `dir`, sorted by name. A missing directory has none.
pub fn list_plugins(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut plugins = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if is_executable(&path) {
            plugins.push(path);
        }
    }
    plugins.sort();
    Ok(plugins)
}

fn plugin_name(path: &Path) -> String {
    let name = if cfg!(windows) { path.file_stem() } else { path.file_name() };
    name.map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// The `SUB COMMANDS:` section of the help output. Plugins whose `-usage`
/// call fails are skipped.
pub fn print_usages(
    cfg: &Config,
    runner: &dyn CommandRunner,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "\nSUB COMMANDS:")?;
    for plugin in list_plugins(cfg.plugins_dir())? {
        let Ok(usage) = runner.output(&plugin, &["-usage"]) else {
            log::debug!("{} -usage failed; skipping", plugin.display());
            continue;
        };
        writeln!(out, "     {}", plugin_name(&plugin))?;
        for line in String::from_utf8_lossy(&usage).trim_end_matches('\n').split('\n') {
            writeln!(out, "       {line}")?;
        }
    }
    Ok(())
}

/// Run `<pluginsdir>/<name>` with `MEMODIR` pointing at the notes.
pub fn run(
    cfg: &Config,
    name: &str,
    args: &[String],
    runner: &dyn CommandRunner,
) -> Result<()> {
    let mut candidates = vec![cfg.plugins_dir().join(name)];
    if cfg!(windows) {
        let exts = std::env::var("PATHEXT").unwrap_or_default();
        for ext in exts.split(';').filter(|e| !e.is_empty()) {
            candidates.push(cfg.plugins_dir().join(format!("{name}{ext}")));
        }
    }
    let program = candidates
        .into_iter()
        .find(|p| is_executable(p))
        .ok_or_else(|| MemoError::UnknownCommand(name.to_string()))?;
    runner.exec(&program, args, &[("MEMODIR", cfg.memo_dir.as_str())])
}
