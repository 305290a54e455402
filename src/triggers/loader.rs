//! Boot-time trigger file parser.
//!
//! Trigger files use the CircleMUD world-file layout. Each record is:
//!
//! ```text
//! #<vnum>
//! <name>~
//! <attach type> <trigger flags> [<numeric arg>]
//! <text arg>~
//! <command lines...>
//! ~
//! ```
//!
//! The file ends with a line holding `$`. Flags are letters (`a` is bit 0)
//! or a decimal mask.
//!
//! ```
//! use rust_mudscript::triggers::loader::parse_triggers;
//! use rust_mudscript::triggers::AttachKind;
//!
//! let protos = parse_triggers("#1200\nhello~\n0 d 0\nhi~\nsay Hello!\n~\n$\n").unwrap();
//! assert_eq!(protos[0].vnum, 1200);
//! assert_eq!(protos[0].attach, AttachKind::Mobile);
//! assert_eq!(protos[0].arg, "hi");
//! ```

use std::str::Lines;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::core::flags::ascii_flags;
use crate::core::text::{atoi, is_number};
use crate::core::Vnum;

use super::prototype::TriggerPrototype;
use super::types::{AttachKind, TriggerFlags};

/// Why a trigger file could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected '#<vnum>' or '$', found {found:?}")]
    ExpectedVnum { line: usize, found: String },

    #[error("trigger {vnum}: string not terminated by '~'")]
    UnterminatedString { vnum: Vnum },

    #[error("trigger {vnum}: bad header {header:?}")]
    BadHeader { vnum: Vnum, header: String },

    #[error("duplicate trigger vnum {0}")]
    Duplicate(Vnum),

    #[error("unexpected end of file before '$'")]
    UnexpectedEof,
}

struct Reader<'a> {
    lines: Lines<'a>,
    line_no: usize,
}

impl<'a> Reader<'a> {
    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line)
    }

    fn next_nonblank(&mut self) -> Option<&'a str> {
        loop {
            let line = self.next_line()?;
            if !line.trim().is_empty() {
                return Some(line);
            }
        }
    }

    /// Read text up to the next `~` at the end of a line.
    fn tilde_string(&mut self, vnum: Vnum) -> Result<String, LoadError> {
        let mut parts = Vec::new();
        loop {
            let line = self
                .next_line()
                .ok_or(LoadError::UnterminatedString { vnum })?;
            let line = line.trim_end();
            if let Some(last) = line.strip_suffix('~') {
                parts.push(last);
                return Ok(parts.join("\n"));
            }
            parts.push(line);
        }
    }
}

/// Parse every record in a trigger file.
pub fn parse_triggers(text: &str) -> Result<Vec<TriggerPrototype>, LoadError> {
    let mut reader = Reader {
        lines: text.lines(),
        line_no: 0,
    };
    let mut seen = FxHashSet::default();
    let mut protos = Vec::new();

    loop {
        let line = reader.next_nonblank().ok_or(LoadError::UnexpectedEof)?;
        let line = line.trim();
        if line == "$" {
            return Ok(protos);
        }

        let vnum = line
            .strip_prefix('#')
            .filter(|n| is_number(n.trim()))
            .and_then(|n| Vnum::try_from(atoi(n)).ok())
            .ok_or_else(|| LoadError::ExpectedVnum {
                line: reader.line_no,
                found: line.to_string(),
            })?;
        if !seen.insert(vnum) {
            return Err(LoadError::Duplicate(vnum));
        }

        protos.push(parse_record(&mut reader, vnum)?);
    }
}

fn parse_record(reader: &mut Reader<'_>, vnum: Vnum) -> Result<TriggerPrototype, LoadError> {
    let name = reader.tilde_string(vnum)?;

    let header = reader.next_line().ok_or(LoadError::UnexpectedEof)?;
    let bad_header = || LoadError::BadHeader {
        vnum,
        header: header.to_string(),
    };
    let mut fields = header.split_whitespace();
    let attach = fields
        .next()
        .filter(|f| is_number(f))
        .and_then(|f| i32::try_from(atoi(f)).ok())
        .and_then(AttachKind::from_code)
        .ok_or_else(bad_header)?;
    let flags = fields.next().map(ascii_flags).ok_or_else(bad_header)?;
    let narg = match fields.next() {
        Some(f) if is_number(f) => i32::try_from(atoi(f)).map_err(|_| bad_header())?,
        Some(_) => return Err(bad_header()),
        None => 0,
    };

    let arg = reader.tilde_string(vnum)?;
    let body = reader.tilde_string(vnum)?;

    Ok(TriggerPrototype::new(vnum, name, attach)
        .with_flags(TriggerFlags::from_bits(flags))
        .with_narg(narg)
        .with_arg(arg)
        .with_commands(&body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::types::{mtrig, wtrig};

    const FILE: &str = "\
#100
Guard greeting~
0 g 100
~
if %actor.is_pc%
  say Halt!
end
~
#101
Room echo~
2 dc 0
hello world~
wecho You hear an echo.
~
$
";

    #[test]
    fn test_parse_file() {
        let protos = parse_triggers(FILE).unwrap();
        assert_eq!(protos.len(), 2);

        let greet = &protos[0];
        assert_eq!(greet.name, "Guard greeting");
        assert_eq!(greet.attach, AttachKind::Mobile);
        assert_eq!(greet.flags, mtrig::GREET);
        assert_eq!(greet.narg, 100);
        assert_eq!(greet.arg, "");
        assert_eq!(greet.script.len(), 3);

        let echo = &protos[1];
        assert_eq!(echo.attach, AttachKind::Room);
        assert_eq!(echo.flags, wtrig::SPEECH | wtrig::COMMAND);
        assert_eq!(echo.arg, "hello world");
    }

    #[test]
    fn test_numeric_flags_and_missing_narg() {
        let protos = parse_triggers("#1\nn~\n1 4\n~\n~\n$").unwrap();
        assert_eq!(protos[0].flags.bits(), 4);
        assert_eq!(protos[0].narg, 0);
        assert!(protos[0].script.is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_triggers(""), Err(LoadError::UnexpectedEof)));
        assert!(matches!(
            parse_triggers("100\n"),
            Err(LoadError::ExpectedVnum { line: 1, .. })
        ));
        assert!(matches!(
            parse_triggers("#1\nname without tilde\n"),
            Err(LoadError::UnterminatedString { vnum: 1 })
        ));
        assert!(matches!(
            parse_triggers("#1\nn~\n7 a 0\n~\n~\n$"),
            Err(LoadError::BadHeader { vnum: 1, .. })
        ));
        assert!(matches!(
            parse_triggers("#1\nn~\n0 a x\n~\n~\n$"),
            Err(LoadError::BadHeader { vnum: 1, .. })
        ));
        assert!(matches!(
            parse_triggers("#1\nn~\n0 a\n~\n~\n#1\nn~\n0 a\n~\n~\n$"),
            Err(LoadError::Duplicate(1))
        ));
    }
}
