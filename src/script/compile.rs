//! Compiled command lists.
//!
//! A trigger body is compiled once, when its prototype is built, into one
//! [`Op`] per source line. Every block keyword carries the line index of its
//! partner (`if` knows its next `elseif`/`else`/`end`, `while` knows its
//! `done`, `switch` knows its arms and its `done`), so the driver never
//! rescans the list to find where a branch goes.
//!
//! Block matching follows the nesting rules of the language:
//!
//! - `end` closes the nearest open `if`
//! - `done` closes the nearest open `while` or `switch`
//! - `case`, `default` and `break` belong to the nearest open `switch`
//!   (`break` also to the nearest `while`)
//!
//! Unmatched keywords keep `None` targets. The driver logs them when it
//! reaches them and fails open.
//!
//! ```
//! use rust_mudscript::script::{Op, Script};
//!
//! let script = Script::compile("if %x% == 1\n  say one\nelse\n  say other\nend");
//! assert_eq!(script.len(), 5);
//! assert!(matches!(script.op(0), Some(Op::If { next: Some(2), .. })));
//! assert!(matches!(script.op(2), Some(Op::Else { end: Some(4) })));
//! ```

use serde::{Deserialize, Serialize};

use crate::core::text::split_word;

/// One compiled instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Comment or blank line.
    Nop,
    If {
        cond: String,
        /// Next `elseif`, `else` or `end` of this chain.
        next: Option<usize>,
    },
    ElseIf {
        cond: String,
        next: Option<usize>,
        end: Option<usize>,
    },
    Else {
        end: Option<usize>,
    },
    End,
    While {
        cond: String,
        done: Option<usize>,
    },
    Switch {
        expr: String,
        /// `case` and `default` lines in source order.
        arms: Vec<usize>,
        done: Option<usize>,
    },
    Case {
        expr: String,
    },
    Default,
    Break {
        done: Option<usize>,
    },
    Done {
        /// The `while` this `done` closes. `None` for `switch`.
        head: Option<usize>,
    },
    /// Anything else: substituted and then run as a script or game command.
    Command,
}

/// One source line and its instruction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub op: Op,
}

/// A compiled trigger body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    lines: Vec<Line>,
}

enum Block {
    If { last_clause: usize, clauses: Vec<usize> },
    While { head: usize, breaks: Vec<usize> },
    Switch { head: usize, breaks: Vec<usize> },
}

impl Script {
    /// Compile a command-list body.
    #[must_use]
    pub fn compile(body: &str) -> Self {
        let mut lines: Vec<Line> = Vec::new();
        let mut open: Vec<Block> = Vec::new();

        for (index, raw) in body.lines().enumerate() {
            let text = raw.trim().to_string();
            let (word, rest) = split_word(&text);
            let rest = rest.to_string();

            let op = if text.is_empty() || text.starts_with('*') {
                Op::Nop
            } else {
                match word.to_ascii_lowercase().as_str() {
                    "if" => {
                        open.push(Block::If {
                            last_clause: index,
                            clauses: Vec::new(),
                        });
                        Op::If {
                            cond: rest,
                            next: None,
                        }
                    }
                    "elseif" => {
                        Self::add_clause(&mut lines, &mut open, index);
                        Op::ElseIf {
                            cond: rest,
                            next: None,
                            end: None,
                        }
                    }
                    "else" => {
                        Self::add_clause(&mut lines, &mut open, index);
                        Op::Else { end: None }
                    }
                    "end" => {
                        Self::close_if(&mut lines, &mut open, index);
                        Op::End
                    }
                    "while" => {
                        open.push(Block::While {
                            head: index,
                            breaks: Vec::new(),
                        });
                        Op::While {
                            cond: rest,
                            done: None,
                        }
                    }
                    "switch" => {
                        open.push(Block::Switch {
                            head: index,
                            breaks: Vec::new(),
                        });
                        Op::Switch {
                            expr: rest,
                            arms: Vec::new(),
                            done: None,
                        }
                    }
                    "case" => {
                        Self::add_arm(&mut lines, &open, index);
                        Op::Case { expr: rest }
                    }
                    "default" => {
                        Self::add_arm(&mut lines, &open, index);
                        Op::Default
                    }
                    "break" => {
                        let loop_block = open
                            .iter_mut()
                            .rev()
                            .find(|b| !matches!(b, Block::If { .. }));
                        if let Some(Block::While { breaks, .. } | Block::Switch { breaks, .. }) =
                            loop_block
                        {
                            breaks.push(index);
                        }
                        Op::Break { done: None }
                    }
                    "done" => Op::Done {
                        head: Self::close_loop(&mut lines, &mut open, index),
                    },
                    _ => Op::Command,
                }
            };

            lines.push(Line { text, op });
        }

        Self { lines }
    }

    fn add_clause(lines: &mut [Line], open: &mut [Block], index: usize) {
        let Some(Block::If {
            last_clause,
            clauses,
        }) = open.iter_mut().rev().find(|b| matches!(b, Block::If { .. }))
        else {
            return;
        };
        Self::patch_next(lines, *last_clause, index);
        *last_clause = index;
        clauses.push(index);
    }

    fn close_if(lines: &mut [Line], open: &mut Vec<Block>, index: usize) {
        let Some(pos) = open.iter().rposition(|b| matches!(b, Block::If { .. })) else {
            return;
        };
        if let Block::If {
            last_clause,
            clauses,
        } = open.remove(pos)
        {
            Self::patch_next(lines, last_clause, index);
            for clause in clauses {
                match &mut lines[clause].op {
                    Op::ElseIf { end, .. } | Op::Else { end } => *end = Some(index),
                    _ => {}
                }
            }
        }
    }

    fn close_loop(lines: &mut [Line], open: &mut Vec<Block>, index: usize) -> Option<usize> {
        let pos = open
            .iter()
            .rposition(|b| !matches!(b, Block::If { .. }))?;
        let (head, breaks, is_while) = match open.remove(pos) {
            Block::While { head, breaks } => (head, breaks, true),
            Block::Switch { head, breaks } => (head, breaks, false),
            Block::If { .. } => return None,
        };
        match &mut lines[head].op {
            Op::While { done, .. } | Op::Switch { done, .. } => *done = Some(index),
            _ => {}
        }
        for b in breaks {
            if let Op::Break { done } = &mut lines[b].op {
                *done = Some(index);
            }
        }
        is_while.then_some(head)
    }

    fn add_arm(lines: &mut [Line], open: &[Block], index: usize) {
        let head = open.iter().rev().find_map(|b| match b {
            Block::Switch { head, .. } => Some(*head),
            _ => None,
        });
        if let Some(head) = head {
            if let Op::Switch { arms, .. } = &mut lines[head].op {
                arms.push(index);
            }
        }
    }

    fn patch_next(lines: &mut [Line], clause: usize, index: usize) {
        match &mut lines[clause].op {
            Op::If { next, .. } | Op::ElseIf { next, .. } => *next = Some(index),
            _ => {}
        }
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Instruction at a line.
    #[must_use]
    pub fn op(&self, index: usize) -> Option<&Op> {
        self.lines.get(index).map(|l| &l.op)
    }

    /// Line at an index.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The source text, one line per command.
    #[must_use]
    pub fn source(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_if_chain_targets() {
        let script = Script::compile(
            "if %a%\n say a\nelseif %b%\n say b\nelse\n say c\nend\nsay after",
        );
        assert_eq!(
            script.op(0),
            Some(&Op::If {
                cond: "%a%".into(),
                next: Some(2)
            })
        );
        assert_eq!(
            script.op(2),
            Some(&Op::ElseIf {
                cond: "%b%".into(),
                next: Some(4),
                end: Some(6)
            })
        );
        assert_eq!(script.op(4), Some(&Op::Else { end: Some(6) }));
        assert_eq!(script.op(6), Some(&Op::End));
        assert_eq!(script.op(7), Some(&Op::Command));
    }

    #[test]
    fn test_nested_if_does_not_close_outer() {
        let script = Script::compile("if 1\nif 0\nsay inner\nend\nelse\nsay outer\nend");
        assert!(matches!(script.op(0), Some(Op::If { next: Some(4), .. })));
        assert!(matches!(script.op(1), Some(Op::If { next: Some(3), .. })));
        assert_eq!(script.op(4), Some(&Op::Else { end: Some(6) }));
    }

    #[test]
    fn test_while_done() {
        let script = Script::compile("while %i% < 3\n eval i %i% + 1\n if 1\n break\n end\ndone");
        assert!(matches!(script.op(0), Some(Op::While { done: Some(5), .. })));
        assert_eq!(script.op(3), Some(&Op::Break { done: Some(5) }));
        assert_eq!(script.op(5), Some(&Op::Done { head: Some(0) }));
    }

    #[test]
    fn test_switch_arms() {
        let script = Script::compile(
            "switch %x%\ncase 1\n say one\n break\ncase 2\ndefault\n say other\ndone",
        );
        assert_eq!(
            script.op(0),
            Some(&Op::Switch {
                expr: "%x%".into(),
                arms: vec![1, 4, 5],
                done: Some(7)
            })
        );
        assert_eq!(script.op(3), Some(&Op::Break { done: Some(7) }));
        assert_eq!(script.op(7), Some(&Op::Done { head: None }));
    }

    #[test]
    fn test_nested_switch_in_while() {
        let script = Script::compile("while 1\nswitch 2\ncase 2\nbreak\ndone\nbreak\ndone");
        assert!(matches!(script.op(0), Some(Op::While { done: Some(6), .. })));
        assert!(matches!(script.op(1), Some(Op::Switch { done: Some(4), .. })));
        assert_eq!(script.op(3), Some(&Op::Break { done: Some(4) }));
        assert_eq!(script.op(5), Some(&Op::Break { done: Some(6) }));
    }

    #[test]
    fn test_unmatched_blocks() {
        let script = Script::compile("if 1\nsay never closed\nwhile 1\nsay spin");
        assert!(matches!(script.op(0), Some(Op::If { next: None, .. })));
        assert!(matches!(script.op(2), Some(Op::While { done: None, .. })));

        let stray = Script::compile("end\nelse\nbreak\ndone");
        assert_eq!(stray.op(0), Some(&Op::End));
        assert_eq!(stray.op(1), Some(&Op::Else { end: None }));
        assert_eq!(stray.op(2), Some(&Op::Break { done: None }));
        assert_eq!(stray.op(3), Some(&Op::Done { head: None }));
    }

    #[test]
    fn test_comments_and_keywords_are_words() {
        let script = Script::compile("* a comment\n\nendurance test\nsay hi");
        assert_eq!(script.op(0), Some(&Op::Nop));
        assert_eq!(script.op(1), Some(&Op::Nop));
        assert_eq!(script.op(2), Some(&Op::Command));
        assert_eq!(script.source(), "* a comment\n\nendurance test\nsay hi");
    }
}
