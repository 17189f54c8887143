use chrono::{DateTime, TimeZone};
use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::Path;

use crate::template::Value;

pub const FILE_DATE_FMT: &str = "%Y-%m-%d";
pub const META_DATE_FMT: &str = "%Y-%m-%d %H:%M";

/// Characters that may not appear in a note file name.
const FORBIDDEN: &[char] =
    &[' ', '<', '>', ':', '"', '/', '\\', '|', '?', '*', '%', '#'];

/// Fields available to note templates as `{{.Title}}`, `{{.Date}}`,
/// `{{.Tags}}` and `{{.Categories}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMeta {
    pub title: String,
    pub date: String,
    pub tags: String,
    pub categories: String,
}

impl NoteMeta {
    pub fn new<Tz: TimeZone>(title: &str, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            title: title.to_string(),
            date: now.format(META_DATE_FMT).to_string(),
            tags: String::new(),
            categories: String::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::record([
            ("Title", Value::text(&self.title)),
            ("Date", Value::text(&self.date)),
            ("Tags", Value::text(&self.tags)),
            ("Categories", Value::text(&self.categories)),
        ])
    }
}

/// Make a title safe to use inside a file name: forbidden characters become
/// `-`, runs of `-` collapse, and leading/trailing `-` or spaces are trimmed.
pub fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        let ch = if FORBIDDEN.contains(&ch) { '-' } else { ch };
        if ch == '-' && out.ends_with('-') {
            continue;
        }
        out.push(ch);
    }
    out.trim_matches(|c| c == '-' || c == ' ').to_string()
}

/// `YYYY-MM-DD-<escaped title>.md`, or `YYYY-MM-DD.md` when the title has
/// nothing left after escaping.
pub fn note_filename<Tz: TimeZone>(title: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let date = now.format(FILE_DATE_FMT);
    let escaped = escape(title);
    if escaped.is_empty() {
        format!("{date}.md")
    } else {
        format!("{date}-{escaped}.md")
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

pub fn is_markdown(name: &str) -> bool {
    name.ends_with(".md")
}

/// Keep markdown names, newest (highest date prefix) first.
pub fn filter_markdown(names: Vec<String>) -> Vec<String> {
    let mut names: Vec<String> =
        names.into_iter().filter(|n| is_markdown(n)).collect();
    names.sort_by(|a, b| b.cmp(a));
    names
}

/// File names of every note in `dir`.
pub fn list_note_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(filter_markdown(names))
}

/// Drop a leading `---` front-matter block if one is present.
pub fn strip_front_matter(body: &str) -> &str {
    if let Some(rest) = body.strip_prefix("---\n") {
        if let Some(pos) = rest.find("---\n") {
            if pos > 0 {
                return &rest[pos + 4..];
            }
        }
    }
    body
}

/// First meaningful line of a note, without heading markers.
pub fn first_line_of(body: &str) -> String {
    strip_front_matter(body)
        .trim()
        .lines()
        .next()
        .unwrap_or("")
        .trim_start_matches(['#', ' '])
        .to_string()
}

/// Like [`first_line_of`] but reads the file; unreadable files yield "".
pub fn first_line(path: &Path) -> String {
    fs::read_to_string(path)
        .map(|body| first_line_of(&body))
        .unwrap_or_default()
}

/// Append everything from `reader` to the existing file at `path`.
pub fn append_from<R: Read + ?Sized>(path: &Path, reader: &mut R) -> io::Result<u64> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    io::copy(reader, &mut file)
}
