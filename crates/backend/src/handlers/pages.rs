use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use contracts::domain::paste::aggregate::{ConsumeOutcome, ConsumedPaste, CreatePasteDto};
use serde::Deserialize;

use super::paste::TimeOverride;
use crate::routes::AppState;

const FORM_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>New paste</title></head>
<body>
  <h1>New paste</h1>
  <form method="post" action="/paste">
    <p><textarea name="content" rows="16" cols="80" placeholder="Paste text here"></textarea></p>
    <p>
      <label>Expire after (seconds): <input type="number" name="ttl_seconds" min="1"></label>
      <label>Maximum views: <input type="number" name="max_views" min="1"></label>
    </p>
    <p><button type="submit">Create</button></p>
  </form>
</body>
</html>
"#;

const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Paste not found</title></head>
<body>
  <h1>Paste not found</h1>
  <p>This paste does not exist or is no longer available.</p>
  <p><a href="/">Create a new paste</a></p>
</body>
</html>
"#;

/// Browser form fields. Empty optional fields arrive as empty strings, not
/// as absent keys, so they are kept as raw text and parsed here.
#[derive(Debug, Deserialize)]
pub struct PasteForm {
    pub content: String,
    #[serde(default)]
    pub ttl_seconds: String,
    #[serde(default)]
    pub max_views: String,
}

fn parse_optional_field(raw: &str) -> Result<Option<i64>, StatusCode> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| StatusCode::BAD_REQUEST)
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn render_paste_page(id: &str, paste: &ConsumedPaste) -> String {
    let views_note = match paste.remaining_views {
        Some(0) => "This was the last view of this paste.".to_string(),
        Some(n) => format!("{} view(s) remaining.", n),
        None => "No view limit.".to_string(),
    };
    let expiry_note = match paste.expires_at {
        Some(at) => format!("Expires at {}.", at.to_rfc3339()),
        None => "Never expires.".to_string(),
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Paste {id}</title></head>
<body>
  <h1>Paste {id}</h1>
  <pre>{content}</pre>
  <p>{views_note} {expiry_note}</p>
  <p><a href="/">Create a new paste</a></p>
</body>
</html>
"#,
        id = escape_html(id),
        content = escape_html(&paste.content),
        views_note = views_note,
        expiry_note = expiry_note,
    )
}

/// GET /
pub async fn new_paste_form() -> Html<&'static str> {
    Html(FORM_PAGE)
}

/// POST /paste
pub async fn submit_form(
    State(state): State<AppState>,
    Query(time): Query<TimeOverride>,
    Form(form): Form<PasteForm>,
) -> Result<Redirect, StatusCode> {
    let dto = CreatePasteDto {
        content: form.content,
        ttl_seconds: parse_optional_field(&form.ttl_seconds)?,
        max_views: parse_optional_field(&form.max_views)?,
    };
    if dto.validate().is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let now = state.clock.now(time.resolve()?);
    match state.service.create_paste(dto, now).await {
        Ok(created) => Ok(Redirect::to(&format!("/p/{}", created.id))),
        Err(e) => {
            tracing::error!("Failed to create paste from form: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /p/:id
///
/// Rendering the page is a consumption event, the same path the API takes.
pub async fn view_paste(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(time): Query<TimeOverride>,
) -> Response {
    let override_at = match time.resolve() {
        Ok(v) => v,
        Err(status) => return status.into_response(),
    };
    let now = state.clock.now(override_at);
    match state.service.fetch_and_consume(&id, now).await {
        Ok(ConsumeOutcome::Consumed(paste)) => {
            Html(render_paste_page(&id, &paste)).into_response()
        }
        Ok(ConsumeOutcome::NotFound) | Ok(ConsumeOutcome::Unavailable) => {
            (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to render paste {}: {}", id, e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_field() {
        assert_eq!(parse_optional_field(""), Ok(None));
        assert_eq!(parse_optional_field("  "), Ok(None));
        assert_eq!(parse_optional_field("60"), Ok(Some(60)));
        assert_eq!(parse_optional_field(" 5 "), Ok(Some(5)));
        assert_eq!(parse_optional_field("abc"), Err(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<script>alert('&')</script>"),
            "&lt;script&gt;alert(&#39;&amp;&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_rendered_page_escapes_content() {
        let paste = ConsumedPaste {
            content: "<b>bold</b>".into(),
            remaining_views: Some(2),
            expires_at: None,
        };
        let page = render_paste_page("abc123", &paste);
        assert!(page.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(page.contains("2 view(s) remaining."));
        assert!(page.contains("Never expires."));
    }
}
