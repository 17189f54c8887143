use terminal_size::{Width, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use yansi::Paint;

pub const DEFAULT_COLUMN: usize = 30;
pub const DEFAULT_WIDTH: usize = 80;
const ELLIPSIS: &str = "...";

/// Layout and coloring for the interactive `list` view.
pub struct FormatContext {
    pub use_color: bool,
    pub column: usize,
    pub width: usize,
}

impl FormatContext {
    pub fn new(use_color: bool, column: usize, width: usize) -> Self {
        Self { use_color, column, width }
    }

    /// Zero config values fall back to the terminal width, then defaults.
    /// `NO_COLOR` disables color.
    pub fn from_config(column: usize, width: usize) -> Self {
        let use_color = std::env::var("NO_COLOR").is_err();
        let column = if column == 0 { DEFAULT_COLUMN } else { column };
        let width = if width != 0 {
            width
        } else {
            terminal_size()
                .map(|(Width(w), _)| w as usize)
                .unwrap_or(DEFAULT_WIDTH)
        };
        Self::new(use_color, column, width)
    }

    /// `<file> : <title>` with the file padded to the column width and the
    /// title cut to what is left of the line.
    pub fn list_line(&self, file: &str, title: &str) -> String {
        let title_width = self.width.saturating_sub(4 + self.column);
        let title = truncate(title, title_width);
        let file = fill_right(&truncate(file, self.column), self.column);
        if self.use_color {
            format!("{} : {}", file.green(), title.yellow())
        } else {
            format!("{file} : {title}")
        }
    }

    pub fn warn(&self, text: &str) -> String {
        if self.use_color { text.yellow().to_string() } else { text.to_string() }
    }

    pub fn alert(&self, text: &str) -> String {
        if self.use_color { text.red().to_string() } else { text.to_string() }
    }
}

/// Cut `text` to `max_width` display columns, ending with `...` when
/// shortened. Wide characters count as two columns.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= ELLIPSIS.len() {
        return take_columns(text, max_width);
    }
    let mut out = take_columns(text, max_width - ELLIPSIS.len());
    out.push_str(ELLIPSIS);
    out
}

fn take_columns(text: &str, columns: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > columns {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

/// Right-pad with spaces to `width` display columns.
pub fn fill_right(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(text.width())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(truncate("abcdef", 2), "ab");
        assert_eq!(truncate("日本語のメモです", 9), "日本語...");
        assert_eq!(truncate("日本語のメモです", 8), "日本...");
        assert_eq!(truncate("日本語", 6), "日本語");
    }

    #[test]
    fn fill_right_pads() {
        assert_eq!(fill_right("ab", 4), "ab  ");
        assert_eq!(fill_right("abcdef", 4), "abcdef");
        assert_eq!(fill_right("日本", 6), "日本  ");
    }

    #[test]
    fn list_line_plain() {
        let ctx = FormatContext::new(false, 10, 30);
        assert_eq!(
            ctx.list_line("2024-01-02-Hello.md", "Hello there, this is long"),
            "2024-01... : Hello there, ..."
        );
        assert_eq!(ctx.list_line("a.md", "t"), "a.md       : t");
        assert_eq!(ctx.list_line("日本語.md", "メモ"), "日本語.md  : メモ");
    }

    #[test]
    fn list_line_colored_keeps_text() {
        let ctx = FormatContext::new(true, 10, 40);
        let line = ctx.list_line("a.md", "title");
        assert!(line.contains("a.md"));
        assert!(line.contains("title"));
        assert!(line.len() > "a.md        : title".len());
    }

    #[test]
    fn config_values_win() {
        let ctx = FormatContext::from_config(12, 100);
        assert_eq!(ctx.column, 12);
        assert_eq!(ctx.width, 100);
        let ctx = FormatContext::from_config(0, 100);
        assert_eq!(ctx.column, DEFAULT_COLUMN);
    }
}
