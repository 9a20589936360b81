//! Command implementations for the myNotes CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable output for the server's response

pub mod comment;
pub mod create;
pub mod delete;
pub mod like;
pub mod read;
pub mod register;
pub mod search;

use anyhow::Result;
use mynotes_core::{Id, Likes, NotePreview};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// Header carrying the acting account ID.
const USER_ID_HEADER: &str = "x-user-id";

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Build an HTTP client that sends `user` as X-User-Id on every request.
pub fn build_client(user: Option<Id>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(user) = user {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from(user.get()),
        );
        builder = builder.default_headers(headers);
    }

    Ok(builder.build()?)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Send a request and decode the JSON body, turning error bodies into
/// [`CliError::Server`].
pub async fn make_request<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CliError::Server {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Extracts `error.message` from an API error body, or returns the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

/// Format a timestamp for human display.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a liker set as a count.
pub fn format_likes(likes: &Likes) -> String {
    match likes.len() {
        1 => "1 like".to_string(),
        n => format!("{} likes", n),
    }
}

/// Print one search or listing result on a line.
pub fn print_preview(preview: &NotePreview) {
    use colored::Colorize;

    println!(
        "  {} {} {} {}",
        format!("#{}", preview.id).cyan(),
        preview.name.bold(),
        format!("by {}", preview.author).dimmed(),
        format!("({})", format_likes(&preview.likes)).yellow()
    );
    let first_line = preview.content.lines().next().unwrap_or_default();
    if !first_line.is_empty() {
        println!("      {}", truncate(first_line, 72));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_api_body() {
        let body = r#"{"error": {"code": "NOT_FOUND", "message": "note 3 not found"}}"#;
        assert_eq!(error_message(body), "note 3 not found");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_format_likes() {
        let mut likes = Likes::new();
        assert_eq!(format_likes(&likes), "0 likes");
        likes.bi_insert(Id::new(3));
        assert_eq!(format_likes(&likes), "1 like");
    }
}
