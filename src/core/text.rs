//! Text helpers shared by the script language and dispatch.
//!
//! Script values are strings; these helpers give them their numeric and
//! boolean readings, and split command lines into words.

use std::cmp::Ordering;

/// Leading integer of `text`, C `atoi` style.
///
/// Skips leading whitespace, accepts one sign, then reads digits until the
/// first non-digit. Text without digits reads as 0. Overflow saturates.
#[must_use]
pub fn atoi(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative {
        -value
    } else {
        value
    }
}

/// True when `text` is an optional sign followed by one or more digits.
#[must_use]
pub fn is_number(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Script truthiness: empty text and text starting with `0` are false.
#[must_use]
pub fn is_truthy(text: &str) -> bool {
    let text = text.trim_start();
    !text.is_empty() && !text.starts_with('0')
}

/// Case-insensitive ordering of two strings.
#[must_use]
pub fn str_cmp(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Case-insensitive substring search. Returns the byte offset of the match.
#[must_use]
pub fn find_ci(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&start| hay[start..start + pat.len()].eq_ignore_ascii_case(pat))
}

/// Split off the first whitespace-delimited word.
///
/// Returns `(word, rest)` with `rest` left-trimmed.
#[must_use]
pub fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

/// Check whether `word` abbreviates one of the names in a namelist.
#[must_use]
pub fn isname(word: &str, namelist: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    namelist.split_whitespace().any(|name| {
        name
            .get(..word.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(word))
    })
}

/// Upper-case the first character.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
