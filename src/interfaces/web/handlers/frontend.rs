use axum::{
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use std::path::{Component, Path, PathBuf};

use super::super::AppState;
use crate::core::error::HmiError;

pub async fn index_endpoint(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        state.index_html.to_string(),
    )
        .into_response()
}

/// Serves files below the frontend root. Unknown API paths get a JSON 404.
pub async fn static_endpoint(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    if path == "/api" || path.starts_with("/api/") {
        return HmiError::NotFound(format!("no route for {path}")).into_response();
    }

    let Ok(decoded) = urlencoding::decode(path) else {
        return not_found();
    };
    let Some(file) = resolve_static_path(&state.frontend_dir, &decoded) else {
        return not_found();
    };
    match tokio::fs::read(&file).await {
        Ok(contents) => {
            let mime = mime_guess::from_path(&file).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                contents,
            )
                .into_response()
        }
        Err(_) => not_found(),
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "404 page not found",
    )
        .into_response()
}

/// Maps a request path onto the frontend root, refusing anything that would
/// climb out of it.
fn resolve_static_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));
    let mut resolved = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    (resolved != root).then_some(resolved)
}

/// The index page with its `{{.BaseURL}}` placeholder filled in.
pub struct IndexTemplate {
    source: String,
}

const BASE_URL_PLACEHOLDERS: [&str; 2] = ["{{.BaseURL}}", "{{ .BaseURL }}"];

impl IndexTemplate {
    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path).await.map_err(|e| {
            anyhow::anyhow!("failed to read index template {}: {}", path.display(), e)
        })?;
        Ok(Self { source })
    }

    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn render(&self, base_url: &str) -> String {
        let escaped = escape_html(base_url);
        BASE_URL_PLACEHOLDERS
            .iter()
            .fold(self.source.clone(), |html, placeholder| {
                html.replace(placeholder, &escaped)
            })
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
