//! `config.toml` handling. The config is loaded once per invocation and
//! handed to commands by reference.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MemoError, Result};
use crate::note::ensure_dir;

pub const DEFAULT_GREP_CMD: &str = "grep -nH ${PATTERN} ${FILES}";
pub const DEFAULT_SELECT_CMD: &str = "peco";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "memodir")]
    pub memo_dir: String,
    pub editor: String,
    pub column: usize,
    pub width: usize,
    #[serde(rename = "selectcmd")]
    pub select_cmd: String,
    #[serde(rename = "grepcmd")]
    pub grep_cmd: String,
    #[serde(rename = "memotemplate")]
    pub memo_template: String,
    #[serde(rename = "assetsdir")]
    pub assets_dir: String,
    #[serde(rename = "pluginsdir")]
    pub plugins_dir: String,
    #[serde(rename = "templatedirfile")]
    pub template_dir_file: String,
    #[serde(rename = "templatebodyfile")]
    pub template_body_file: String,

    /// Where this config was loaded from.
    #[serde(skip)]
    pub path: PathBuf,
}

/// `$MEMO_CONFIG_DIR`, else `%APPDATA%/memo` on Windows and
/// `~/.config/memo` everywhere else, macOS included.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("MEMO_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    default_config_dir().ok_or(MemoError::NoConfigDir)
}

#[cfg(windows)]
fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("memo"))
}

#[cfg(not(windows))]
fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("memo"))
}

impl Config {
    /// Load from the default location, writing a fresh config on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?)
    }

    pub fn load_from(conf_dir: &Path) -> Result<Self> {
        ensure_dir(conf_dir)?;
        let file = conf_dir.join("config.toml");

        let mut cfg = if file.exists() {
            let raw = fs::read_to_string(&file)?;
            let mut cfg: Config = toml::from_str(&raw)?;
            cfg.memo_dir = expand_path(&cfg.memo_dir);
            cfg.assets_dir = expand_path(&cfg.assets_dir);
            if cfg.plugins_dir.is_empty() {
                cfg.plugins_dir = path_string(&conf_dir.join("plugins"));
            }
            cfg.plugins_dir = expand_path(&cfg.plugins_dir);
            if cfg.memo_template.is_empty() {
                cfg.memo_template = path_string(&conf_dir.join("template.txt"));
            }
            cfg.memo_template = expand_path(&cfg.memo_template);
            cfg.template_dir_file = expand_path(&cfg.template_dir_file);
            cfg.template_body_file = expand_path(&cfg.template_body_file);
            cfg
        } else {
            let cfg = Self::defaults(conf_dir)?;
            fs::write(&file, toml::to_string(&cfg)?)?;
            log::debug!("wrote default config to {}", file.display());
            cfg
        };

        if let Ok(dir) = env::var("MEMODIR") {
            if !dir.is_empty() {
                cfg.memo_dir = dir;
            }
        }
        cfg.path = file;
        Ok(cfg)
    }

    fn defaults(conf_dir: &Path) -> Result<Self> {
        let memo_dir = conf_dir.join("_posts");
        ensure_dir(&memo_dir)?;
        let plugins_dir = conf_dir.join("plugins");
        ensure_dir(&plugins_dir)?;
        let editor = env::var("EDITOR")
            .ok()
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "vim".to_string());
        Ok(Self {
            memo_dir: path_string(&memo_dir),
            editor,
            column: 20,
            select_cmd: DEFAULT_SELECT_CMD.to_string(),
            grep_cmd: DEFAULT_GREP_CMD.to_string(),
            assets_dir: ".".to_string(),
            plugins_dir: path_string(&plugins_dir),
            ..Self::default()
        })
    }

    pub fn memo_dir(&self) -> &Path {
        Path::new(&self.memo_dir)
    }

    pub fn plugins_dir(&self) -> &Path {
        Path::new(&self.plugins_dir)
    }

    /// The configured note template, when one is set.
    pub fn template_path(&self) -> Option<&Path> {
        (!self.memo_template.is_empty()).then(|| Path::new(&self.memo_template))
    }
}

fn path_string(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

/// Expand a leading `~/` to the home directory and `$VAR` / `${VAR}` from
/// the environment. Unset variables expand to "".
pub fn expand_path(s: &str) -> String {
    let mut s = s.to_string();
    let bytes = s.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'~' && (bytes[1] == b'/' || bytes[1] == b'\\') {
        if let Some(home) = dirs::home_dir() {
            s = path_string(&home.join(&s[2..]));
        }
    }
    expand_vars(&s, |name| env::var(name).ok())
}

/// Shell-style `$NAME` / `${NAME}` substitution.
pub fn expand_vars(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }
        let rest = &s[i + 1..];
        if let Some(inner) = rest.strip_prefix('{') {
            if let Some(end) = inner.find('}') {
                out.push_str(&lookup(&inner[..end]).unwrap_or_default());
                // skip `{name}`
                for _ in 0..inner[..end].chars().count() + 2 {
                    chars.next();
                }
                continue;
            }
            out.push('$');
            continue;
        }
        let name: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if name.is_empty() {
            out.push('$');
            continue;
        }
        out.push_str(&lookup(&name).unwrap_or_default());
        for _ in 0..name.len() {
            chars.next();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[cfg(not(windows))]
    #[test]
    fn default_dir_is_dot_config_under_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(default_config_dir().unwrap(), home.join(".config").join("memo"));
    }

    #[test]
    fn first_load_writes_defaults() {
        let tmp = tempdir().unwrap();
        let cfg = Config::load_from(tmp.path()).unwrap();
        assert!(tmp.path().join("config.toml").exists());
        assert!(tmp.path().join("plugins").is_dir());
        assert_eq!(cfg.column, 20);
        assert_eq!(cfg.grep_cmd, DEFAULT_GREP_CMD);
        assert_eq!(cfg.select_cmd, "peco");
        assert_eq!(cfg.path, tmp.path().join("config.toml"));
    }

    #[test]
    fn existing_file_fills_template_and_plugins() {
        let tmp = tempdir().unwrap();
        let notes = tmp.path().join("notes");
        fs::write(
            tmp.path().join("config.toml"),
            format!("memodir = \"{}\"\neditor = \"nano\"\nwidth = 100\n", path_string(&notes)),
        )
        .unwrap();
        let cfg = Config::load_from(tmp.path()).unwrap();
        assert_eq!(cfg.editor, "nano");
        assert_eq!(cfg.width, 100);
        assert_eq!(cfg.column, 0);
        assert!(cfg.memo_template.ends_with("template.txt"));
        assert!(cfg.plugins_dir.ends_with("plugins"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("config.toml"), "column = \"wide\"").unwrap();
        assert!(matches!(
            Config::load_from(tmp.path()),
            Err(MemoError::ConfigParse(_))
        ));
    }

    #[test]
    fn expand_vars_handles_both_forms() {
        let lookup = |name: &str| match name {
            "A" => Some("one".to_string()),
            "LONG_NAME" => Some("two".to_string()),
            _ => None,
        };
        assert_eq!(expand_vars("$A/${LONG_NAME}/x", lookup), "one/two/x");
        assert_eq!(expand_vars("${MISSING}-$MISSING", lookup), "-");
        assert_eq!(expand_vars("cost $ 5", lookup), "cost $ 5");
        assert_eq!(expand_vars("${open", lookup), "${open");
    }
}
