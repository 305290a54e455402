//! Expression evaluator.
//!
//! Expressions are evaluated straight from text. The evaluator splits an
//! expression at the first occurrence of the lowest-precedence operator
//! present, evaluates both halves recursively and applies the operator.
//! Parenthesised spans and double-quoted strings are single tokens, so an
//! operator inside them is never a split point.
//!
//! Precedence, lowest first:
//!
//! | Operators | Meaning |
//! |---|---|
//! | `\|\|` `&&` | logical or, and |
//! | `==` `!=` `<=` `>=` `<` `>` | comparison |
//! | `/=` | left contains right |
//! | `-` `+` `/` `*` | integer arithmetic |
//! | `!` | logical not (unary) |
//!
//! Text with no operator is handed to the substitution callback, so
//! `%actor.level%` evaluates to the actor's level.
//!
//! ```
//! use rust_mudscript::script::eval_expr;
//!
//! let mut identity = |text: &str| text.to_string();
//! assert_eq!(eval_expr("(5 + 3) * 2", &mut identity), "16");
//! assert_eq!(eval_expr("10 == 10", &mut identity), "1");
//! assert_eq!(eval_expr("abc /= b", &mut identity), "1");
//! ```

use smallvec::SmallVec;

use crate::core::text::{atoi, find_ci, is_number, is_truthy};

/// Operators in ascending precedence.
pub const OPERATORS: [&str; 14] = [
    "||", "&&", "==", "!=", "<=", ">=", "<", ">", "/=", "-", "+", "/", "*", "!",
];

/// Evaluate an expression, substituting operands through `subst`.
pub fn eval_expr(line: &str, subst: &mut dyn FnMut(&str) -> String) -> String {
    let expr = line.trim_start();

    if let Some(result) = eval_lhs_op_rhs(expr, subst) {
        return result;
    }

    if expr.starts_with('(') {
        if let Some(close) = matching_paren(expr, 0) {
            return eval_expr(&expr[1..close], subst);
        }
    }

    subst(expr)
}

fn eval_lhs_op_rhs(expr: &str, subst: &mut dyn FnMut(&str) -> String) -> Option<String> {
    let tokens = token_starts(expr);
    let bytes = expr.as_bytes();

    for op in OPERATORS {
        let found = tokens
            .iter()
            .copied()
            .find(|&start| bytes[start..].starts_with(op.as_bytes()));
        if let Some(start) = found {
            let lhs = eval_expr(&expr[..start], subst);
            let rhs = eval_expr(&expr[start + op.len()..], subst);
            return Some(eval_op(op, &lhs, &rhs));
        }
    }
    None
}

/// Byte offsets where tokens start.
///
/// A token is a parenthesised span, a quoted span, a run of alphanumerics
/// and spaces, or any other single byte.
fn token_starts(expr: &str) -> SmallVec<[usize; 16]> {
    let bytes = expr.as_bytes();
    let mut tokens = SmallVec::new();
    let mut i = 0;

    while i < bytes.len() {
        tokens.push(i);
        i = match bytes[i] {
            b'(' => matching_paren(expr, i).map_or(bytes.len(), |close| close + 1),
            b'"' => matching_quote(expr, i).map_or(bytes.len(), |close| close + 1),
            b if b.is_ascii_alphanumeric() => {
                let mut j = i + 1;
                while j < bytes.len()
                    && (bytes[j].is_ascii_alphanumeric() || bytes[j].is_ascii_whitespace())
                {
                    j += 1;
                }
                j
            }
            _ => i + 1,
        };
    }
    tokens
}

/// Index of the `)` matching the `(` at `open`.
fn matching_paren(expr: &str, open: usize) -> Option<usize> {
    let bytes = expr.as_bytes();
    let mut depth = 1;
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            b'"' => i = matching_quote(expr, i)?,
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `"` closing the quote at `open`. Backslash escapes a byte.
fn matching_quote(expr: &str, open: usize) -> Option<usize> {
    let bytes = expr.as_bytes();
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

pub(crate) fn flag(value: bool) -> String {
    let text = if value { "1" } else { "0" };
    text.to_string()
}

/// Apply one operator to two evaluated operands.
///
/// Both operands are trimmed first. Comparisons are numeric when both sides
/// are integers and exact string comparisons otherwise.
#[must_use]
pub fn eval_op(op: &str, lhs: &str, rhs: &str) -> String {
    let lhs = lhs.trim();
    let rhs = rhs.trim();
    let numeric = is_number(lhs) && is_number(rhs);
    let (l, r) = (atoi(lhs), atoi(rhs));

    match op {
        "||" => flag(is_truthy(lhs) || is_truthy(rhs)),
        "&&" => flag(is_truthy(lhs) && is_truthy(rhs)),
        "==" => flag(if numeric { l == r } else { lhs == rhs }),
        "!=" => flag(if numeric { l != r } else { lhs != rhs }),
        "<=" => flag(if numeric { l <= r } else { lhs <= rhs }),
        ">=" => flag(if numeric { l >= r } else { lhs >= rhs }),
        "<" => flag(if numeric { l < r } else { lhs < rhs }),
        ">" => flag(if numeric { l > r } else { lhs > rhs }),
        "/=" => flag(find_ci(lhs, rhs).is_some()),
        "*" => l.wrapping_mul(r).to_string(),
        "/" => l.checked_div(r).unwrap_or(0).to_string(),
        "+" => l.wrapping_add(r).to_string(),
        "-" => l.wrapping_sub(r).to_string(),
        "!" => flag(if is_number(rhs) { r == 0 } else { rhs.is_empty() }),
        _ => lhs.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> String {
        eval_expr(text, &mut |t: &str| t.to_string())
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("(5 + 3) * 2"), "16");
        assert_eq!(eval("2 * 3 + 4"), "10");
        assert_eq!(eval("7 / 2"), "3");
        assert_eq!(eval("7 / 0"), "0");
        assert_eq!(eval("-5"), "-5");
        assert_eq!(eval("abc + 2"), "2");
    }

    #[test]
    fn test_split_at_first_lowest_operator() {
        // Splitting at the first '-' groups to the right.
        assert_eq!(eval("10 - 4 - 3"), "9");
        assert_eq!(eval("(10 - 4) - 3"), "3");
    }

    #[test]
    fn test_numeric_comparison() {
        assert_eq!(eval("10 > 9"), "1");
        assert_eq!(eval("010 == 10"), "1");
        assert_eq!(eval("-3 < 2"), "1");
        assert_eq!(eval("5 != 5"), "0");
        assert_eq!(eval("4 >= 4"), "1");
        assert_eq!(eval("4 <= 3"), "0");
    }

    #[test]
    fn test_string_comparison() {
        assert_eq!(eval("\"10\" > \"9\""), "0");
        assert_eq!(eval("bob == bob"), "1");
        assert_eq!(eval("bob == Bob"), "0");
        assert_eq!(eval("apple < banana"), "1");
        assert_eq!(eval("banana >= apple"), "1");
        assert_eq!(eval("apple >= banana"), "0");
    }

    #[test]
    fn test_substring() {
        assert_eq!(eval("hello world /= WORLD"), "1");
        assert_eq!(eval("hello /= bye"), "0");
    }

    #[test]
    fn test_logic() {
        assert_eq!(eval("1 && 0"), "0");
        assert_eq!(eval("1 || 0"), "1");
        assert_eq!(eval("!0"), "1");
        assert_eq!(eval("!7"), "0");
        assert_eq!(eval("!"), "1");
        assert_eq!(eval("!word"), "0");
        assert_eq!(eval("1 == 1 && 2 > 1"), "1");
    }

    #[test]
    fn test_no_operator_is_substituted() {
        let mut calls = Vec::new();
        let result = eval_expr("  %actor.name%", &mut |t: &str| {
            calls.push(t.to_string());
            "Bob".to_string()
        });
        assert_eq!(result, "Bob");
        assert_eq!(calls, vec!["%actor.name%"]);
    }

    #[test]
    fn test_quoted_operator_is_atomic() {
        assert_eq!(eval("\"a-b\" == \"a-b\""), "1");
    }

    #[test]
    fn test_unbalanced_paren_degrades() {
        assert_eq!(eval("(5 + 3"), "(5 + 3");
    }

    #[test]
    fn test_token_starts() {
        let tokens = token_starts("(a) == b c");
        assert_eq!(tokens.as_slice(), &[0, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_matching_paren_skips_quotes() {
        assert_eq!(matching_paren("(\")\")", 0), Some(4));
        assert_eq!(matching_paren("((x)", 0), None);
    }
}
