//! Gitignore-style exclusion rules, stacked per directory.
//!
//! Each directory with a `.gitignore` contributes a [`FilterSet`] that is
//! pushed while the walker is inside that directory and popped on exit.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::pattern::{Pattern, escape};

/// Name of the per-directory rule file.
pub const IGNORE_FILE: &str = ".gitignore";

/// A rule together with the directory-scoped variants it is also tested as.
#[derive(Debug, Clone)]
struct Rule {
    pattern: Pattern,
    scoped: Vec<Pattern>,
}

impl Rule {
    fn new(pattern: Pattern, root: &str) -> Self {
        let root = escape(root.trim_end_matches('/'));
        let text = pattern.as_str();
        let mut variants = Vec::new();
        if pattern.is_anchored() {
            variants.push(format!("{}{}", root, text));
        } else {
            variants.push(format!("{}/{}", root, text));
            if !pattern.has_inner_slash() {
                variants.push(format!("{}/**/{}", root, text));
            }
        }
        let scoped = variants
            .iter()
            .filter_map(|v| Pattern::new(v).ok())
            .collect();
        Self { pattern, scoped }
    }

    fn matches(&self, path: &str, is_dir: bool, ignore_case: bool) -> bool {
        self.pattern.matches(path, is_dir, ignore_case)
            || self
                .scoped
                .iter()
                .any(|p| p.matches(path, is_dir, ignore_case))
    }
}

/// The rules loaded from one rule file.
#[derive(Debug, Clone)]
pub struct FilterSet {
    root: String,
    remove: Vec<Rule>,
    reverse: Vec<Rule>,
}

impl FilterSet {
    /// Load `<dir>/.gitignore`. Returns `None` when the file does not exist.
    pub fn load(dir: &str) -> Option<Self> {
        let file = Path::new(dir).join(IGNORE_FILE);
        Self::from_file(&file, dir)
    }

    /// Load an arbitrary rule file whose rules are rooted at `root`.
    pub fn from_file(file: &Path, root: &str) -> Option<Self> {
        let bytes = fs::read(file).ok()?;
        let set = Self::parse(&String::from_utf8_lossy(&bytes), root);
        debug!(
            "loaded {} exclude and {} re-include rules from {}",
            set.remove.len(),
            set.reverse.len(),
            file.display()
        );
        Some(set)
    }

    /// Parse rule-file text. Invalid patterns are skipped with a warning.
    pub fn parse(text: &str, root: &str) -> Self {
        let mut remove = Vec::new();
        let mut reverse = Vec::new();
        for line in text.lines() {
            if line.starts_with('#') {
                continue;
            }
            let negated = line.starts_with('!');
            let line = gittrim(line);
            let body = if negated { &line[1..] } else { line.as_str() };
            if body.is_empty() {
                continue;
            }
            let pattern = match Pattern::new(body) {
                Ok(p) => p,
                Err(e) => {
                    warn!("ignoring rule '{}' in {}: {}", body, root, e);
                    continue;
                }
            };
            let rule = Rule::new(pattern, root);
            if negated {
                reverse.push(rule);
            } else {
                remove.push(rule);
            }
        }
        Self {
            root: root.to_string(),
            remove,
            reverse,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.reverse.is_empty()
    }
}

/// Trim trailing unescaped spaces and line endings, then unescape `\x`.
pub fn gittrim(line: &str) -> String {
    let line = line.trim_end_matches(['\n', '\r']);
    let chars: Vec<char> = line.chars().collect();
    let mut end = chars.len();
    while end > 0 && chars[end - 1] == ' ' {
        if end >= 2 && chars[end - 2] == '\\' {
            break;
        }
        end -= 1;
    }

    let mut out = String::with_capacity(end);
    let mut i = 0;
    while i < end {
        if chars[i] == '\\' && i + 1 < end {
            i += 1;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Active filter sets, innermost last.
#[derive(Debug, Default)]
pub struct FilterStack {
    sets: Vec<FilterSet>,
    ignore_case: bool,
}

impl FilterStack {
    pub fn new(ignore_case: bool) -> Self {
        Self {
            sets: Vec::new(),
            ignore_case,
        }
    }

    pub fn push(&mut self, set: FilterSet) {
        self.sets.push(set);
    }

    pub fn pop(&mut self) -> Option<FilterSet> {
        self.sets.pop()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// True if an exclude rule matches and no re-include rule does.
    pub fn is_excluded(&self, path: &str, is_dir: bool) -> bool {
        let ic = self.ignore_case;
        let removed = self
            .sets
            .iter()
            .rev()
            .any(|set| set.remove.iter().any(|r| r.matches(path, is_dir, ic)));
        if !removed {
            return false;
        }
        let restored = self
            .sets
            .iter()
            .rev()
            .any(|set| set.reverse.iter().any(|r| r.matches(path, is_dir, ic)));
        if !restored {
            debug!("excluded by gitignore rules: {}", path);
        }
        !restored
    }
}
