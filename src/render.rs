use pulldown_cmark::{Options, Parser, html};

use crate::note::strip_front_matter;

/// Render a note body as GitHub-flavored HTML, skipping front matter.
pub fn markdown_to_html(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(strip_front_matter(body), options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}
