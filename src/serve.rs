//! `memo serve`: read-only HTML view of the notes directory.

use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::error::Result;
use crate::formatting::truncate;
use crate::note::{escape, first_line, list_note_files};
use crate::render::markdown_to_html;
use crate::template::{Template, Value};

pub const DEFAULT_ADDR: &str = ":8080";

const DIR_TEMPLATE: &str = r#"
<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Memo Life For You</title>
</head>
<style>
li {list-style-type: none;}
</style>
<body>
<ul>{{range .}}
  <li><a href="/{{.Name}}">{{.Name}}</a><dd>{{.Body}}</dd></li>{{end}}
</ul>
</body>
</html>
"#;

const BODY_TEMPLATE: &str = r#"
<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{{.Name}}</title>
  <style>
body { max-width: 46em; margin: 2em auto; font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; line-height: 1.5; }
pre, code { background: #f6f8fa; border-radius: 3px; }
pre { padding: 1em; overflow: auto; }
table { border-collapse: collapse; }
td, th { border: 1px solid #dfe2e5; padding: 6px 13px; }
  </style>
</head>
<body>
{{.Body}}</body>
</html>
"#;

struct ServeState {
    memo_dir: PathBuf,
    dir_template_file: String,
    body_template_file: String,
}

/// The configured template file if set, else the built-in source.
fn load_template(file: &str, builtin: &str) -> Result<Template> {
    if file.is_empty() {
        return Ok(Template::parse_html(builtin)?);
    }
    Ok(Template::parse_html(&fs::read_to_string(file)?)?)
}

pub fn render_index(memo_dir: &Path, template_file: &str) -> Result<String> {
    let entries: Vec<Value> = list_note_files(memo_dir)?
        .into_iter()
        .map(|file| {
            let title = truncate(&first_line(&memo_dir.join(&file)), 80);
            Value::record([("Name", Value::text(file)), ("Body", Value::text(title))])
        })
        .collect();
    let template = load_template(template_file, DIR_TEMPLATE)?;
    Ok(template.render(&Value::List(entries))?)
}

/// `url_path` is the request path; it is escaped into a plain file name so
/// requests cannot leave the notes directory.
pub fn render_note(memo_dir: &Path, url_path: &str, template_file: &str) -> Result<String> {
    let body = fs::read_to_string(memo_dir.join(escape(url_path)))?;
    let template = load_template(template_file, BODY_TEMPLATE)?;
    let data = Value::record([
        ("Name", Value::text(url_path)),
        ("Body", Value::Html(markdown_to_html(&body))),
    ]);
    Ok(template.render(&data)?)
}

fn respond(result: Result<String>) -> Response {
    match result {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            log::warn!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn index(State(state): State<Arc<ServeState>>) -> Response {
    respond(render_index(&state.memo_dir, &state.dir_template_file))
}

async fn note(State(state): State<Arc<ServeState>>, UrlPath(name): UrlPath<String>) -> Response {
    let url_path = format!("/{name}");
    respond(render_note(&state.memo_dir, &url_path, &state.body_template_file))
}

/// `:8080` listens on every interface; the returned URL is what a browser
/// on this machine should open.
pub fn bind_addr(addr: &str) -> (String, String) {
    if let Some(port) = addr.strip_prefix(':') {
        (format!("0.0.0.0:{port}"), format!("http://localhost:{port}"))
    } else {
        (addr.to_string(), format!("http://{addr}"))
    }
}

pub fn router(cfg: &Config) -> Router {
    let state = Arc::new(ServeState {
        memo_dir: cfg.memo_dir().to_path_buf(),
        dir_template_file: cfg.template_dir_file.clone(),
        body_template_file: cfg.template_body_file.clone(),
    });
    Router::new()
        .route("/", get(index))
        .route("/*name", get(note))
        .nest_service("/assets", ServeDir::new(&cfg.assets_dir))
        .with_state(state)
}

/// Serve until the process is stopped.
pub fn serve(cfg: &Config, addr: &str) -> Result<()> {
    let (bind, url) = bind_addr(addr);
    let app = router(cfg);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind).await?;
        log::info!("listening on {bind}");
        println!("Serving notes at {url}");
        axum::serve(listener, app).await
    })?;
    Ok(())
}
