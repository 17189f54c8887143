//! Rewrites memolist-style `{{_name_}}` placeholders into field references
//! understood by [`crate::template`].

use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{_(.+?)_\}\}").expect("placeholder pattern")
    })
}

/// Replace every `{{_name_}}` with `{{.Name}}`. Text outside placeholders,
/// including unclosed `{{_` openers, is passed through untouched.
pub fn rewrite(template: &str) -> String {
    placeholder_re()
        .replace_all(template, |caps: &Captures| {
            format!("{{{{.{}}}}}", title_case(&caps[1]))
        })
        .into_owned()
}

/// Upper-case the first letter of each whitespace-separated word.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if at_word_start && !ch.is_whitespace() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace();
    }
    out
}
