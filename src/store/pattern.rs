//! Key patterns with Redis KEYS semantics.
//!
//! Supports `*`, `?`, character classes (`[abc]`, `[^a]`, `[a-z]`) and `\`
//! escapes. An unterminated `[` matches a literal bracket and braces have no
//! special meaning. Patterns are rewritten into globset syntax and compiled
//! once, so matching runs in linear time whatever the pattern looks like.

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{CacheError, Result};

// == Key Pattern ==
/// A compiled KEYS pattern.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    /// `None` when the pattern holds an empty class and can match nothing.
    matcher: Option<GlobMatcher>,
}

impl KeyPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let Some(glob) = to_glob_syntax(pattern) else {
            return Ok(Self { matcher: None });
        };
        let glob = GlobBuilder::new(&glob)
            .literal_separator(false)
            .backslash_escape(true)
            .build()
            .map_err(|e| CacheError::Store(format!("invalid key pattern '{}': {}", pattern, e)))?;
        Ok(Self {
            matcher: Some(glob.compile_matcher()),
        })
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|matcher| matcher.is_match(key))
    }
}

/// Returns true if `text` matches the glob `pattern`.
///
/// Compiles the pattern on every call; an invalid pattern matches nothing.
/// Use [`KeyPattern`] when testing many keys.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    KeyPattern::new(pattern)
        .map(|p| p.is_match(text))
        .unwrap_or(false)
}

// == Translation ==
fn to_glob_syntax(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                // A run of stars means one star; globset gives `**` a path meaning
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '\\' => {
                out.push('\\');
                out.push(chars.get(i + 1).copied().unwrap_or('\\'));
                i += 1;
            }
            '{' | '}' | ']' => {
                out.push('\\');
                out.push(chars[i]);
            }
            '[' => match class_end(&chars, i + 1) {
                Some(end) => {
                    push_class(&mut out, &chars[i + 1..end])?;
                    i = end;
                }
                None => out.push_str("\\["),
            },
            c => out.push(c),
        }
        i += 1;
    }
    Some(out)
}

/// Index of the `]` closing a class whose body starts at `start`.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'^') {
        j += 1;
    }
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            ']' => return Some(j),
            _ => j += 1,
        }
    }
    None
}

fn is_bang(c: char) -> bool {
    c == '!' || c == '^'
}

/// Writes the class body as globset syntax. `None` for `[]`, which matches nothing.
fn push_class(out: &mut String, body: &[char]) -> Option<()> {
    let negate = body.first() == Some(&'^');
    let members = parse_members(&body[usize::from(negate)..]);

    if members.is_empty() {
        return if negate {
            out.push('?');
            Some(())
        } else {
            None
        };
    }

    let mut singles: Vec<char> = Vec::new();
    let mut ranges: Vec<(char, char)> = Vec::new();
    for (lo, hi) in members {
        if lo == hi {
            singles.push(lo);
        } else {
            ranges.push((lo, hi));
        }
    }

    // globset only reads `]` as a member in first place and `-` in last place
    let close = singles.contains(&']');
    let dash = singles.contains(&'-');
    singles.retain(|c| *c != ']' && *c != '-');

    // A leading `!` or `^` would read as negation
    let mut ranges_first = false;
    if !negate && !close {
        if let Some(pos) = singles.iter().position(|c| !is_bang(*c)) {
            singles.swap(0, pos);
        } else if let Some(pos) = ranges.iter().position(|(lo, _)| !is_bang(*lo)) {
            ranges.swap(0, pos);
            ranges_first = true;
        } else {
            push_alternatives(out, &singles, &ranges, dash);
            return Some(());
        }
    }

    out.push('[');
    if negate {
        out.push('!');
    }
    if close {
        out.push(']');
    }
    let push_ranges = |out: &mut String| {
        for (lo, hi) in &ranges {
            out.push(*lo);
            out.push('-');
            out.push(*hi);
        }
    };
    if ranges_first {
        push_ranges(out);
        out.extend(singles.iter());
    } else {
        out.extend(singles.iter());
        push_ranges(out);
    }
    if dash {
        out.push('-');
    }
    out.push(']');
    Some(())
}

/// Spells a class made only of `!`/`^` led members as `{..}` alternatives.
fn push_alternatives(out: &mut String, singles: &[char], ranges: &[(char, char)], dash: bool) {
    let mut items: Vec<String> = singles.iter().map(|c| format!("\\{}", c)).collect();
    for (lo, hi) in ranges {
        items.push(format!("\\{}", lo));
        if let Some(next) = char::from_u32(*lo as u32 + 1) {
            items.push(format!("[{}-{}]", next, hi));
        }
    }
    if dash {
        items.push("\\-".to_string());
    }
    if items.len() == 1 {
        out.push_str(&items[0]);
    } else {
        out.push('{');
        out.push_str(&items.join(","));
        out.push('}');
    }
}

/// Class members as inclusive ranges, with `\` escapes resolved.
fn parse_members(body: &[char]) -> Vec<(char, char)> {
    let mut members = Vec::new();
    let mut k = 0;

    let take = |k: &mut usize| -> char {
        if body[*k] == '\\' && *k + 1 < body.len() {
            *k += 1;
        }
        let c = body[*k];
        *k += 1;
        c
    };

    while k < body.len() {
        let lo = take(&mut k);
        if k + 1 < body.len() && body[k] == '-' {
            k += 1;
            let hi = take(&mut k);
            members.push(if lo <= hi { (lo, hi) } else { (hi, lo) });
        } else {
            members.push((lo, lo));
        }
    }
    members
}
