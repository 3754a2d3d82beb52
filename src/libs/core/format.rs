use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const MAX_PREVIEW_CHARS: usize = 72;

/// Abbreviate a hex address or hash as `0x1234...abcd`.
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub fn truncate_identifier(identifier: &str, keep: usize) -> String {
    let head: String = identifier.chars().take(keep).collect();
    format!("{head}...")
}

/// `3:05 PM` style clock time in the timezone of `time`.
pub fn format_message_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%-I:%M %p").to_string()
}

pub fn normalize_preview_text(input: &str) -> String {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut iter = normalized.chars();
    let head: String = iter.by_ref().take(MAX_PREVIEW_CHARS).collect();
    if iter.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
