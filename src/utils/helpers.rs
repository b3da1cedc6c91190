//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::time::Duration;

use chrono::{DateTime, Utc};
use teloxide::types::User;
use url::Url;

use crate::utils::errors::BotError;

/// Telegram's hard limit for a single outgoing message.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape markdown special characters
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|'
                | '{' | '}' | '.' | '!'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Get an HTML mention link for a user
pub fn user_mention(user: &User) -> String {
    format!(
        "<a href=\"tg://user?id={}\">{}</a>",
        user.id.0,
        escape_html(&user.first_name)
    )
}

/// Split a long message into chunks that fit Telegram's message limit.
///
/// Whole lines are packed greedily into each chunk; a single line longer
/// than the limit is hard-split at the limit.
pub fn split_message(text: &str, max_length: usize) -> Vec<String> {
    if text.chars().count() <= max_length {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let line_len = line.chars().count();
        if current.chars().count() + line_len + 1 <= max_length {
            current.push_str(line);
            current.push('\n');
        } else if current.is_empty() {
            // Oversized line with nothing buffered: hard-split it
            let mut rest: Vec<char> = line.chars().collect();
            while rest.len() > max_length {
                chunks.push(rest[..max_length].iter().collect());
                rest = rest[max_length..].to_vec();
            }
            current = rest.into_iter().collect();
            current.push('\n');
        } else {
            chunks.push(current.trim_end().to_string());
            if line_len > max_length {
                let mut rest: Vec<char> = line.chars().collect();
                while rest.len() > max_length {
                    chunks.push(rest[..max_length].iter().collect());
                    rest = rest[max_length..].to_vec();
                }
                current = rest.into_iter().collect();
            } else {
                current = line.to_string();
            }
            current.push('\n');
        }
    }

    if !current.trim_end().is_empty() {
        chunks.push(current.trim_end().to_string());
    }

    chunks
}

/// Sanitize a filename for safe storage.
///
/// Unsafe characters are replaced, leading/trailing spaces and dots are
/// stripped, and the result is capped at 255 characters preserving the
/// extension.
pub fn sanitize_filename(filename: &str) -> String {
    const UNSAFE: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    let replaced: String = filename
        .chars()
        .map(|c| if UNSAFE.contains(&c) { '_' } else { c })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');

    if trimmed.chars().count() <= 255 {
        return trimmed.to_string();
    }

    match trimmed.rsplit_once('.') {
        Some((name, ext)) => {
            let keep = 255usize.saturating_sub(ext.chars().count() + 1);
            let head: String = name.chars().take(keep).collect();
            format!("{}.{}", head, ext)
        }
        None => trimmed.chars().take(255).collect(),
    }
}

/// Check if a string is a valid http(s) URL
pub fn is_valid_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

/// Extract command arguments from message text
pub fn get_command_args(text: &str) -> Vec<String> {
    text.split_whitespace().skip(1).map(str::to_string).collect()
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Convert bytes to human readable format
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Download a file from a URL with a caller-supplied timeout.
///
/// Returns `None` on any failure; the caller decides whether that matters.
pub async fn download_file(url: &str, timeout: Duration) -> Option<Vec<u8>> {
    let client = reqwest::Client::builder().timeout(timeout).build().ok()?;
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.bytes().await.ok().map(|b| b.to_vec())
}

/// Map an error to a fixed, user-safe message.
///
/// Never leaks internal detail to the chat; unrecognized errors get the
/// generic fallback.
pub fn format_error_message(error: &BotError) -> &'static str {
    match error {
        BotError::Http(_) => "Connection error. Please check your internet connection.",
        BotError::InvalidInput(_) => "Invalid input. Please check your data.",
        BotError::PermissionDenied(_) => "Permission denied.",
        BotError::RateLimitExceeded => "Too many requests. Please slow down.",
        BotError::Io(_) => "File not found.",
        BotError::UserNotFound { .. } => "User not found.",
        _ => "An unexpected error occurred. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>&\"'</b>"), "&lt;b&gt;&amp;&quot;&#x27;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("*bold*"), r"\*bold\*");
        assert_eq!(escape_markdown("_italic_"), r"\_italic\_");
    }

    #[test]
    fn test_split_message_short_is_identity() {
        let text = "hello\nworld";
        assert_eq!(split_message(text, MAX_MESSAGE_LENGTH), vec![text.to_string()]);
    }

    #[test]
    fn test_split_message_packs_lines() {
        let text = (0..100).map(|i| format!("line number {}", i)).collect::<Vec<_>>().join("\n");
        let chunks = split_message(&text, 100);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
        // Every input line survives in order
        let rejoined = chunks.join("\n");
        for i in 0..100 {
            assert!(rejoined.contains(&format!("line number {}", i)));
        }
    }

    #[test]
    fn test_split_message_hard_splits_long_line() {
        let text = "x".repeat(10_000);
        let chunks = split_message(&text, MAX_MESSAGE_LENGTH);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MAX_MESSAGE_LENGTH);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_sanitize_filename_removes_unsafe_chars() {
        let cleaned = sanitize_filename("a/b\\c:d*e?f\"g<h>i|j.txt");
        for c in ['/', '\\', ':', '*', '?', '"', '<', '>', '|'] {
            assert!(!cleaned.contains(c));
        }
        assert!(cleaned.ends_with(".txt"));
    }

    #[test]
    fn test_sanitize_filename_trims_and_caps() {
        assert_eq!(sanitize_filename("  .name.  "), "name");

        let long = format!("{}.pdf", "a".repeat(300));
        let cleaned = sanitize_filename(&long);
        assert!(cleaned.chars().count() <= 255);
        assert!(cleaned.ends_with(".pdf"));
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/path"));
        assert!(is_valid_url("http://localhost:8080"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_get_command_args() {
        assert_eq!(get_command_args("/ban 123 spam"), vec!["123", "spam"]);
        assert!(get_command_args("/start").is_empty());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1_048_576), "1.0 MB");
    }

    #[tokio::test]
    async fn test_download_file_rejects_bad_url() {
        // Fails at request construction, no network involved
        let result = download_file("not a url", Duration::from_secs(1)).await;
        assert!(result.is_none());
    }

    #[test]
    fn test_format_error_message_fixed_strings() {
        let denied = BotError::PermissionDenied("x".to_string());
        assert_eq!(format_error_message(&denied), "Permission denied.");

        let unknown = BotError::Config("boom".to_string());
        assert_eq!(
            format_error_message(&unknown),
            "An unexpected error occurred. Please try again."
        );
    }
}
