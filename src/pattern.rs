//! Glob pattern matching with gitignore extensions.
//!
//! Supported syntax:
//! - `?` matches any single character
//! - `*` matches any run of characters that does not contain `/`
//! - `**` bounded by `/` (or the ends of the pattern) matches across `/`;
//!   `a/**/b` also matches `a/b`
//! - `[abc]`, `[a-z]`, `[^...]` character classes, `\` escapes inside
//! - `\x` matches `x` literally
//! - a trailing `/` only matches directories
//! - `a|b` at the top level matches either alternative
//!
//! Matching is anchored at both ends.

use crate::error::PatternError;

/// A compiled, validated pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    alternatives: Vec<Vec<char>>,
}

impl Pattern {
    /// Compile a pattern, rejecting empty alternatives and unclosed classes.
    pub fn new(text: &str) -> Result<Self, PatternError> {
        let chars: Vec<char> = text.chars().collect();
        let alternatives = split_alternatives(&chars)?;
        Ok(Self {
            text: text.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True when the pattern is rooted with a leading `/`.
    pub fn is_anchored(&self) -> bool {
        self.text.starts_with('/')
    }

    /// True when the pattern contains a `/` anywhere except a trailing one.
    pub fn has_inner_slash(&self) -> bool {
        self.text.trim_end_matches('/').contains('/')
    }

    pub fn matches(&self, candidate: &str, is_dir: bool, ignore_case: bool) -> bool {
        let buf: Vec<char> = candidate.chars().collect();
        let ctx = MatchContext {
            is_dir,
            ignore_case,
        };
        self.alternatives
            .iter()
            .any(|alt| match_from(&buf, alt, None, &ctx))
    }
}

/// Match `candidate` against `pattern` text, compiling it on the fly.
pub fn pattern_match(
    candidate: &str,
    pattern: &str,
    is_dir: bool,
    ignore_case: bool,
) -> Result<bool, PatternError> {
    Ok(Pattern::new(pattern)?.matches(candidate, is_dir, ignore_case))
}

/// True if any pattern in the list matches.
pub fn matches_any(patterns: &[Pattern], candidate: &str, is_dir: bool, ignore_case: bool) -> bool {
    patterns
        .iter()
        .any(|p| p.matches(candidate, is_dir, ignore_case))
}

/// Escape pattern metacharacters so `text` matches itself literally.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\' | '|') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

struct MatchContext {
    is_dir: bool,
    ignore_case: bool,
}

impl MatchContext {
    fn fold(&self, c: char) -> char {
        if self.ignore_case {
            c.to_lowercase().next().unwrap_or(c)
        } else {
            c
        }
    }

    fn same(&self, a: char, b: char) -> bool {
        self.fold(a) == self.fold(b)
    }
}

/// Split on top-level `|`, validating every character class on the way.
fn split_alternatives(chars: &[char]) -> Result<Vec<Vec<char>>, PatternError> {
    let mut alternatives = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '[' => i = class_end(chars, i + 1)?,
            '|' => {
                if i == start {
                    return Err(PatternError::EmptyAlternative);
                }
                alternatives.push(chars[start..i].to_vec());
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start == chars.len() && !alternatives.is_empty() {
        return Err(PatternError::EmptyAlternative);
    }
    alternatives.push(chars[start.min(chars.len())..].to_vec());
    Ok(alternatives)
}

/// Index just past the `]` closing the class whose body starts at `i`.
fn class_end(p: &[char], mut i: usize) -> Result<usize, PatternError> {
    if p.get(i) == Some(&'^') {
        i += 1;
    }
    loop {
        match p.get(i) {
            None => return Err(PatternError::UnclosedClass),
            Some(']') => return Ok(i + 1),
            Some('\\') => {
                if i + 1 >= p.len() {
                    return Err(PatternError::UnclosedClass);
                }
                i += 2;
            }
            Some(_) => i += 1,
        }
        if p.get(i) == Some(&'-') {
            match p.get(i + 1) {
                // `x-]` keeps the dash as a plain member
                Some(']') => {}
                None => return Err(PatternError::UnclosedClass),
                Some('\\') => {
                    if i + 2 >= p.len() {
                        return Err(PatternError::UnclosedClass);
                    }
                    i += 3;
                }
                Some(_) => i += 2,
            }
        }
    }
}

/// Test one character against the class body starting at `i`.
/// Returns the membership result and the index after the closing `]`.
fn class_match(p: &[char], mut i: usize, c: char, ctx: &MatchContext) -> (bool, usize) {
    let negated = p.get(i) == Some(&'^');
    if negated {
        i += 1;
    }
    let mut hit = false;
    while i < p.len() && p[i] != ']' {
        let lo = if p[i] == '\\' {
            i += 1;
            p[i]
        } else {
            p[i]
        };
        i += 1;
        let is_range = p.get(i) == Some(&'-') && matches!(p.get(i + 1), Some(x) if *x != ']');
        if is_range {
            i += 1;
            let hi = if p[i] == '\\' {
                i += 1;
                p[i]
            } else {
                p[i]
            };
            i += 1;
            let f = ctx.fold(c);
            if ctx.fold(lo) <= f && f <= ctx.fold(hi) {
                hit = true;
            }
        } else if ctx.same(lo, c) {
            hit = true;
        }
    }
    (hit != negated, i + 1)
}

fn match_from(s: &[char], p: &[char], prev: Option<char>, ctx: &MatchContext) -> bool {
    let mut si = 0;
    let mut pi = 0;
    let mut prev = prev;

    while pi < p.len() {
        match p[pi] {
            '[' => {
                let Some(&c) = s.get(si) else {
                    return false;
                };
                let (hit, next) = class_match(p, pi + 1, c, ctx);
                if !hit {
                    return false;
                }
                si += 1;
                pi = next;
                prev = Some(']');
            }
            '*' => {
                let double = p.get(pi + 1) == Some(&'*');
                if double {
                    let left = prev.is_none() || prev == Some('/');
                    let right = pi + 2 == p.len() || p[pi + 2] == '/';
                    if left && right {
                        return match_globstar(&s[si..], &p[pi + 2..], prev, ctx);
                    }
                    return match_star(&s[si..], &p[pi + 2..], ctx);
                }
                return match_star(&s[si..], &p[pi + 1..], ctx);
            }
            '?' => {
                if si >= s.len() {
                    return false;
                }
                si += 1;
                pi += 1;
                prev = Some('?');
            }
            '/' => {
                if pi + 1 == p.len() && si == s.len() {
                    return ctx.is_dir;
                }
                if s.get(si) != Some(&'/') {
                    return false;
                }
                si += 1;
                pi += 1;
                prev = Some('/');
            }
            '\\' => {
                // a trailing backslash matches itself
                let lit = p.get(pi + 1).copied().unwrap_or('\\');
                match s.get(si) {
                    Some(&c) if ctx.same(c, lit) => {}
                    _ => return false,
                }
                si += 1;
                pi += 2;
                prev = Some(lit);
            }
            lit => {
                match s.get(si) {
                    Some(&c) if ctx.same(c, lit) => {}
                    _ => return false,
                }
                si += 1;
                pi += 1;
                prev = Some(lit);
            }
        }
    }
    si == s.len()
}

/// Single `*`: shortest run first, never crossing `/`.
fn match_star(s: &[char], rest: &[char], ctx: &MatchContext) -> bool {
    if rest.is_empty() {
        return !s.contains(&'/');
    }
    for i in 0..=s.len() {
        if match_from(&s[i..], rest, Some('*'), ctx) {
            return true;
        }
        if i < s.len() && s[i] == '/' {
            break;
        }
    }
    false
}

/// Bounded `**`: tries the current position, then each following `/`.
fn match_globstar(s: &[char], rest: &[char], prev: Option<char>, ctx: &MatchContext) -> bool {
    if rest.is_empty() {
        return true;
    }
    // `/**/` and a leading `**/` may stand for zero components
    let collapsible = rest.len() > 1 && rest[0] == '/';
    let mut i = 0;
    loop {
        if match_from(&s[i..], rest, Some('*'), ctx) {
            return true;
        }
        if i == 0 && collapsible && match_from(s, &rest[1..], prev, ctx) {
            return true;
        }
        if i >= s.len() {
            return false;
        }
        i += 1;
        while i < s.len() && s[i] != '/' {
            i += 1;
        }
    }
}
