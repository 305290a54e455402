//! Text-argument matching for command, speech and act triggers.

/// True when `sub` appears in `text` as a delimited phrase.
///
/// The match is case-insensitive and must be bounded on both sides by the
/// edge of the text, whitespace or punctuation.
#[must_use]
pub fn is_substring(sub: &str, text: &str) -> bool {
    if sub.is_empty() || sub.len() > text.len() {
        return false;
    }
    let hay = text.as_bytes();
    let pat = sub.as_bytes();
    let bounded = |b: Option<&u8>| b.map_or(true, |c| c.is_ascii_whitespace() || c.is_ascii_punctuation());

    (0..=hay.len() - pat.len()).any(|start| {
        let end = start + pat.len();
        hay[start..end].eq_ignore_ascii_case(pat)
            && bounded(start.checked_sub(1).and_then(|i| hay.get(i)))
            && bounded(hay.get(end))
    })
}

/// True when `text` contains any word or `"quoted phrase"` of `wordlist`.
///
/// A wordlist starting with `*` matches everything.
#[must_use]
pub fn word_check(text: &str, wordlist: &str) -> bool {
    if wordlist.starts_with('*') {
        return true;
    }
    phrases(wordlist).any(|phrase| is_substring(phrase, text))
}

/// Command triggers fire when their arg is `*` or starts with the typed
/// command (case-insensitive).
#[must_use]
pub fn command_matches(arg: &str, cmd: &str) -> bool {
    let cmd = cmd.trim();
    if arg.starts_with('*') {
        return true;
    }
    !cmd.is_empty()
        && arg
            .get(..cmd.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(cmd))
}

/// Split a wordlist into bare words and quoted phrases.
fn phrases(wordlist: &str) -> impl Iterator<Item = &str> {
    let mut rest = wordlist;
    std::iter::from_fn(move || {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted.find('"').unwrap_or(quoted.len());
            let phrase = &quoted[..end];
            rest = quoted.get(end + 1..).unwrap_or("");
            return Some(phrase);
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..end];
        rest = &rest[end..];
        Some(word)
    })
    .filter(|phrase| !phrase.is_empty())
}
