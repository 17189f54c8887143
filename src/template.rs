//! Minimal field-substitution templates.
//!
//! Supported actions:
//! - `{{.}}` prints the current value, `{{.Name}}` / `{{.A.B}}` print a field
//! - `{{range .}}` / `{{range .Name}}` ... `{{end}}` repeat over a list,
//!   with `.` bound to each item
//!
//! Templates are parsed once and rendered against a [`Value`] tree. Rendering
//! fails closed: a missing field aborts the whole render and no partial output
//! is returned.

use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template: malformed syntax at line {line}: {message}")]
    MalformedSyntax { message: String, line: usize },

    #[error("template: undefined field '{key}' at line {line}")]
    UndefinedKey { key: String, line: usize },

    #[error("template: '{key}' at line {line} is not {expected}")]
    WrongType { key: String, line: usize, expected: &'static str },
}

/// Data a template renders against.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text, escaped in HTML templates.
    Text(String),
    /// Pre-rendered markup, always inserted verbatim.
    Html(String),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
}

impl Value {
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    None,
    Html,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Field { path: Vec<String>, line: usize },
    Range { path: Vec<String>, body: Vec<Node>, line: usize },
}

#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<Node>,
    escape: Escape,
}

impl Template {
    /// Parse a template whose output is plain text.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        Self::parse_with(source, Escape::None)
    }

    /// Parse a template whose `Text` values are HTML-escaped on output.
    pub fn parse_html(source: &str) -> Result<Self, TemplateError> {
        Self::parse_with(source, Escape::Html)
    }

    fn parse_with(source: &str, escape: Escape) -> Result<Self, TemplateError> {
        // Each open `range` keeps its path, line and the nodes collected
        // before it started.
        let mut stack: Vec<(Vec<String>, usize, Vec<Node>)> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut line = 1;
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            let (text, after_open) = rest.split_at(open);
            if !text.is_empty() {
                nodes.push(Node::Text(text.to_string()));
                line += count_lines(text);
            }
            let after_open = &after_open[2..];
            let close = after_open.find("}}").ok_or_else(|| {
                TemplateError::MalformedSyntax {
                    message: "unclosed action".to_string(),
                    line,
                }
            })?;
            let action = &after_open[..close];
            let expr = action.trim();

            if expr == "end" {
                let (path, range_line, outer) = stack.pop().ok_or_else(|| {
                    TemplateError::MalformedSyntax {
                        message: "unexpected {{end}}".to_string(),
                        line,
                    }
                })?;
                let body = std::mem::replace(&mut nodes, outer);
                nodes.push(Node::Range { path, body, line: range_line });
            } else if let Some(arg) = expr.strip_prefix("range ") {
                let path = parse_field(arg.trim(), line)?;
                stack.push((path, line, std::mem::take(&mut nodes)));
            } else {
                let path = parse_field(expr, line)?;
                nodes.push(Node::Field { path, line });
            }

            line += count_lines(action);
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            nodes.push(Node::Text(rest.to_string()));
        }
        if let Some((_, range_line, _)) = stack.pop() {
            return Err(TemplateError::MalformedSyntax {
                message: "unclosed {{range}}".to_string(),
                line: range_line,
            });
        }
        Ok(Self { nodes, escape })
    }

    pub fn render(&self, data: &Value) -> Result<String, TemplateError> {
        let mut out = String::new();
        self.render_nodes(&self.nodes, data, &mut out)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        dot: &Value,
        out: &mut String,
    ) -> Result<(), TemplateError> {
        for node in nodes {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Field { path, line } => {
                    match lookup(dot, path, *line)? {
                        Value::Text(t) => match self.escape {
                            Escape::None => out.push_str(t),
                            Escape::Html => out.push_str(&html_escape(t)),
                        },
                        Value::Html(h) => out.push_str(h),
                        _ => {
                            return Err(TemplateError::WrongType {
                                key: display_path(path),
                                line: *line,
                                expected: "printable",
                            });
                        }
                    }
                }
                Node::Range { path, body, line } => {
                    let Value::List(items) = lookup(dot, path, *line)? else {
                        return Err(TemplateError::WrongType {
                            key: display_path(path),
                            line: *line,
                            expected: "a list",
                        });
                    };
                    for item in items {
                        self.render_nodes(body, item, out)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn count_lines(s: &str) -> usize {
    s.bytes().filter(|&b| b == b'\n').count()
}

fn parse_field(expr: &str, line: usize) -> Result<Vec<String>, TemplateError> {
    let Some(rest) = expr.strip_prefix('.') else {
        return Err(TemplateError::MalformedSyntax {
            message: format!("unsupported action {{{{{expr}}}}}"),
            line,
        });
    };
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    let path: Vec<String> = rest.split('.').map(str::to_string).collect();
    let valid = path.iter().all(|seg| {
        !seg.is_empty()
            && seg.chars().all(|c| c.is_alphanumeric() || c == '_')
    });
    if !valid {
        return Err(TemplateError::MalformedSyntax {
            message: format!("bad field name {expr:?}"),
            line,
        });
    }
    Ok(path)
}

fn lookup<'a>(
    dot: &'a Value,
    path: &[String],
    line: usize,
) -> Result<&'a Value, TemplateError> {
    let mut current = dot;
    for seg in path {
        current = match current {
            Value::Record(fields) => fields.get(seg),
            _ => None,
        }
        .ok_or_else(|| TemplateError::UndefinedKey {
            key: display_path(path),
            line,
        })?;
    }
    Ok(current)
}

fn display_path(path: &[String]) -> String {
    format!(".{}", path.join("."))
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> Value {
        Value::record([
            ("Title", Value::text("Hello")),
            ("Date", Value::text("2024-01-02 09:30")),
            ("Tags", Value::text("")),
        ])
    }

    #[test]
    fn substitutes_fields() {
        let t = Template::parse("# {{.Title}}\ndate: {{ .Date }}\ntags: [{{.Tags}}]\n")
            .unwrap();
        assert_eq!(
            t.render(&note()).unwrap(),
            "# Hello\ndate: 2024-01-02 09:30\ntags: []\n"
        );
    }

    #[test]
    fn plain_text_round_trips() {
        let t = Template::parse("no actions here\n").unwrap();
        assert_eq!(t.render(&note()).unwrap(), "no actions here\n");
    }

    #[test]
    fn unknown_field_fails_with_line() {
        let t = Template::parse("line one\n{{.Author}}").unwrap();
        let err = t.render(&note()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UndefinedKey { key: ".Author".to_string(), line: 2 }
        );
    }

    #[test]
    fn field_names_are_case_sensitive() {
        let t = Template::parse("{{.title}}").unwrap();
        assert!(matches!(
            t.render(&note()),
            Err(TemplateError::UndefinedKey { .. })
        ));
    }

    #[test]
    fn malformed_templates_are_rejected() {
        for src in ["{{.Title", "{{range .}}x", "{{end}}", "{{Title}}", "{{.Ti tle}}"] {
            assert!(
                matches!(
                    Template::parse(src),
                    Err(TemplateError::MalformedSyntax { .. })
                ),
                "{src} should not parse"
            );
        }
    }

    #[test]
    fn range_binds_dot_to_each_item() {
        let data = Value::List(vec![
            Value::record([("Name", Value::text("a.md"))]),
            Value::record([("Name", Value::text("b.md"))]),
        ]);
        let t = Template::parse("{{range .}}<{{.Name}}>{{end}}").unwrap();
        assert_eq!(t.render(&data).unwrap(), "<a.md><b.md>");

        let nested = Value::record([("Files", data)]);
        let t = Template::parse("{{range .Files}}{{.Name}};{{end}}").unwrap();
        assert_eq!(t.render(&nested).unwrap(), "a.md;b.md;");
    }

    #[test]
    fn range_over_text_is_a_type_error() {
        let t = Template::parse("{{range .Title}}{{end}}").unwrap();
        assert!(matches!(
            t.render(&note()),
            Err(TemplateError::WrongType { .. })
        ));
    }

    #[test]
    fn html_mode_escapes_text_but_not_markup() {
        let data = Value::record([
            ("Name", Value::text("<a & b>")),
            ("Body", Value::Html("<p>ok</p>".to_string())),
        ]);
        let t = Template::parse_html("{{.Name}}|{{.Body}}").unwrap();
        assert_eq!(t.render(&data).unwrap(), "&lt;a &amp; b&gt;|<p>ok</p>");

        let t = Template::parse("{{.Name}}").unwrap();
        assert_eq!(t.render(&data).unwrap(), "<a & b>");
    }
}
