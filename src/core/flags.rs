//! Bit flags with name tables.
//!
//! Entity and trigger flags are plain bitmasks. Each mask has a static table
//! of names indexed by bit number, used both for display and for looking a
//! flag up by (abbreviated) name.

/// Render the set bits of `bits` as space-separated names.
///
/// Bits without a name in the table print as `UNDEFINED`. An empty mask
/// prints as `NOBITS`.
#[must_use]
pub fn sprint_bits(bits: u64, names: &[&str]) -> String {
    if bits == 0 {
        return "NOBITS".to_string();
    }
    (0..64)
        .filter(|bit| bits & (1 << bit) != 0)
        .map(|bit| names.get(bit).copied().unwrap_or("UNDEFINED"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Find `arg` in `list`, case-insensitively.
///
/// With `exact` the whole name must match; otherwise `arg` may be an
/// abbreviation of the entry. An empty `arg` never matches.
#[must_use]
pub fn search_block(arg: &str, list: &[&str], exact: bool) -> Option<usize> {
    if arg.is_empty() {
        return None;
    }
    list.iter().position(|entry| {
        if exact {
            entry.eq_ignore_ascii_case(arg)
        } else {
            entry
                .get(..arg.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(arg))
        }
    })
}

/// Parse a flag field from a definition file.
///
/// `a`..`z` map to bits 0..25 and `A`..`Z` to bits 26..51. A field made only
/// of digits is taken as the numeric mask itself.
#[must_use]
pub fn ascii_flags(field: &str) -> u64 {
    if !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) {
        return field.parse().unwrap_or(0);
    }
    field.bytes().fold(0, |flags, b| match b {
        b'a'..=b'z' => flags | 1 << (b - b'a'),
        b'A'..=b'Z' => flags | 1 << (26 + (b - b'A')),
        _ => flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: &[&str] = &["RED", "GREEN", "BLUE"];

    #[test]
    fn test_sprint_bits() {
        assert_eq!(sprint_bits(0, COLORS), "NOBITS");
        assert_eq!(sprint_bits(0b101, COLORS), "RED BLUE");
        assert_eq!(sprint_bits(0b1000, COLORS), "UNDEFINED");
    }

    #[test]
    fn test_search_block() {
        assert_eq!(search_block("gr", COLORS, false), Some(1));
        assert_eq!(search_block("gr", COLORS, true), None);
        assert_eq!(search_block("blue", COLORS, true), Some(2));
        assert_eq!(search_block("", COLORS, false), None);
        assert_eq!(search_block("purple", COLORS, false), None);
    }

    #[test]
    fn test_ascii_flags() {
        assert_eq!(ascii_flags("a"), 1);
        assert_eq!(ascii_flags("bg"), (1 << 1) | (1 << 6));
        assert_eq!(ascii_flags("A"), 1 << 26);
        assert_eq!(ascii_flags("64"), 64);
        assert_eq!(ascii_flags("0"), 0);
        assert_eq!(ascii_flags(""), 0);
    }
}
