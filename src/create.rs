//! `memo new`: turn a title into a dated note file exactly once.

use chrono::{DateTime, TimeZone};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::console::Console;
use crate::error::Result;
use crate::note::{FILE_DATE_FMT, NoteMeta, append_from, note_filename};
use crate::placeholder;
use crate::process::{CommandRunner, expand_command};
use crate::template::Template;

/// Used when no template file is configured or the file is missing.
pub const DEFAULT_NOTE_TEMPLATE: &str = "# {{.Title}}\n";

pub struct NoteCreator<'a> {
    pub dir: &'a Path,
    pub template: Option<&'a Path>,
    pub editor: &'a str,
    pub runner: &'a dyn CommandRunner,
}

impl NoteCreator<'_> {
    /// Create (or reopen) the note for `title`, prompting for a title when
    /// none is given. Returns the note's path.
    ///
    /// An existing note is never re-rendered: piped stdin is appended to it,
    /// otherwise it is opened in the editor. A render failure leaves the
    /// freshly created, still empty file in place.
    pub fn create<Tz: TimeZone>(
        &self,
        title: Option<String>,
        console: &mut Console<'_>,
        now: &DateTime<Tz>,
    ) -> Result<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut title = match title {
            Some(t) => t,
            None => console.prompt_line("Title: ")?,
        };
        let file = if title.is_empty() {
            title = now.format(FILE_DATE_FMT).to_string();
            format!("{title}.md")
        } else {
            note_filename(&title, now)
        };
        let path = self.dir.join(file);

        if path.exists() {
            log::debug!("{} exists; not rendering", path.display());
            self.open_or_append(&path, console)?;
            return Ok(path);
        }

        let template = Template::parse(&self.template_source()?)?;

        let mut out = OpenOptions::new().write(true).create_new(true).open(&path)?;
        let rendered = template.render(&NoteMeta::new(&title, now).to_value());
        let rendered = match rendered {
            Ok(text) => text,
            Err(e) => {
                log::debug!("render failed; leaving empty {}", path.display());
                return Err(e.into());
            }
        };
        out.write_all(rendered.as_bytes())?;
        drop(out);

        self.open_or_append(&path, console)?;
        Ok(path)
    }

    fn template_source(&self) -> Result<String> {
        match self.template {
            Some(p) if p.is_file() => {
                log::debug!("using note template {}", p.display());
                Ok(placeholder::rewrite(&fs::read_to_string(p)?))
            }
            _ => Ok(DEFAULT_NOTE_TEMPLATE.to_string()),
        }
    }

    fn open_or_append(&self, path: &Path, console: &mut Console<'_>) -> Result<()> {
        if !console.interactive {
            append_from(path, &mut *console.input)?;
            return Ok(());
        }
        let dir = self.dir.to_string_lossy();
        self.runner.run(&expand_command(self.editor, "", &dir, &[path]))
    }
}
