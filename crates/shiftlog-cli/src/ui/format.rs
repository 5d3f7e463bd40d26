//! Text shaping for entry titles, descriptions and timestamps.

use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

const ELLIPSIS: &str = "...";

/// Cut `s` to at most `max_len` characters, ending in `...` when shortened.
pub fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        None => s.to_string(),
        Some(_) if max_len <= ELLIPSIS.len() => s.chars().take(max_len).collect(),
        Some(_) => {
            let keep: String = s.chars().take(max_len - ELLIPSIS.len()).collect();
            keep + ELLIPSIS
        }
    }
}

/// Greedy word wrap. Blank lines in the input survive as empty lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if line_len > 0 && line_len + 1 + word_len > width {
                out.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.push_str(word);
            line_len += word_len;
        }
        out.push(line);
    }
    out
}

/// The leading eight hex digits operators type as an entry prefix.
pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string().chars().take(8).collect()
}

/// Pretty output shows the operator's zone; everything else is RFC 3339 UTC.
pub fn format_datetime(dt: &DateTime<Utc>, timezone: Tz, pretty: bool) -> String {
    if !pretty {
        return dt.to_rfc3339_opts(SecondsFormat::AutoSi, false);
    }
    dt.with_timezone(&timezone)
        .format("%Y-%m-%d %H:%M %Z")
        .to_string()
}

/// Collapse all whitespace, newlines included, into single spaces.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
