//! Invertible message templates.
//!
//! A template marks the words that flip its meaning with square brackets:
//!
//! ```text
//! "Controllers should [not ]be interfaces"
//!   negated → "Controllers should not be interfaces"
//!   normal  → "Controllers should be interfaces"
//! ```
//!
//! `\[` and `\]` stand for literal brackets in both modes.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Escaped bracket | open | close | run of plain text | stray backslash
    static ref TOKEN: Regex = Regex::new(r"\\[\[\]]|\[|\]|[^\[\]\\]+|\\").unwrap();
}

/// Renders `template`. `negated` keeps bracketed clauses (dropping only the
/// brackets); otherwise each bracketed clause is removed along with its brackets.
pub fn render(template: &str, negated: bool) -> String {
    let mut out = String::with_capacity(template.len());
    // Text of the clause currently open in normal mode, kept in case it never closes.
    let mut pending = String::new();
    let mut depth = 0usize;

    for token in TOKEN.find_iter(template).map(|m| m.as_str()) {
        let text = match token {
            "\\[" => "[",
            "\\]" => "]",
            "[" if negated => continue,
            "]" if negated => continue,
            "[" => {
                depth += 1;
                pending.push('[');
                continue;
            }
            "]" if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    pending.clear();
                } else {
                    pending.push(']');
                }
                continue;
            }
            other => other,
        };
        if depth > 0 {
            pending.push_str(text);
        } else {
            out.push_str(text);
        }
    }

    // An unclosed clause is not a clause.
    out.push_str(&pending);
    out
}

/// Escapes brackets in `text` so it renders verbatim.
pub fn escape(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
