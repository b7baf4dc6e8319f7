//! Helpers for recovering JSON from JavaScript source text.
//!
//! State blobs are shipped as the argument of a call such as
//! `window.__APOLLO_STATE__ = restore({...})`. The argument is an object
//! literal that is JSON apart from a few JS-only tokens.

use std::borrow::Cow;

/// JS literals with no JSON equivalent; each becomes `null`
const NON_JSON_LITERALS: &[&str] = &["undefined", "NaN"];

/// Scanner state shared by both helpers
#[derive(Default)]
struct StringTracker {
    quote: Option<char>,
    escaped: bool,
}

impl StringTracker {
    /// Feed one character; returns `true` while inside a string literal
    /// (delimiters included).
    fn feed(&mut self, c: char) -> bool {
        match self.quote {
            Some(quote) => {
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == quote {
                    self.quote = None;
                }
                true
            }
            None if matches!(c, '"' | '\'' | '`') => {
                self.quote = Some(c);
                true
            }
            None => false,
        }
    }
}

/// Argument text of the first call expression after `marker`.
///
/// String state is tracked from the start of `source`, so a quoted marker
/// (`window["__APOLLO_STATE__"]`) works too. Parentheses inside string
/// literals are ignored. Returns `None` when the marker is missing, no call
/// follows it, or the call is unbalanced.
pub fn call_argument<'a>(source: &'a str, marker: &str) -> Option<&'a str> {
    let start = source.find(marker)? + marker.len();

    let mut strings = StringTracker::default();
    let mut open = None;
    let mut depth = 0usize;

    for (i, c) in source.char_indices() {
        if strings.feed(c) || i < start {
            continue;
        }
        match c {
            '(' => {
                if open.is_none() {
                    open = Some(i + c.len_utf8());
                }
                depth += 1;
            }
            ')' if open.is_some() => {
                depth -= 1;
                if depth == 0 {
                    let begin = open?;
                    return Some(source[begin..i].trim());
                }
            }
            _ => {}
        }
    }

    None
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Replace bare `undefined` / `NaN` tokens with `null`.
///
/// Only whole identifiers outside string literals are touched.
pub fn normalize_literals(source: &str) -> Cow<'_, str> {
    if !NON_JSON_LITERALS.iter().any(|literal| source.contains(literal)) {
        return Cow::Borrowed(source);
    }

    let mut out = String::with_capacity(source.len());
    let mut strings = StringTracker::default();
    let mut chars = source.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if strings.feed(c) || !is_ident_start(c) {
            out.push(c);
            continue;
        }

        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if !is_ident_part(next) {
                break;
            }
            end = j + next.len_utf8();
            chars.next();
        }

        let token = &source[i..end];
        if NON_JSON_LITERALS.contains(&token) {
            out.push_str("null");
        } else {
            out.push_str(token);
        }
    }

    Cow::Owned(out)
}
