//! Per-directory `.info` annotations.
//!
//! An annotation file maps patterns to comment lines:
//!
//! ```text
//! # comment
//! *.rs
//! Cargo.toml
//! 	Rust sources and the manifest
//! 	(second comment line)
//! ```
//!
//! Lines starting with a tab are comment lines for the patterns above them.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::filter::gittrim;
use crate::pattern::{Pattern, matches_any};

/// Name of the per-directory annotation file.
pub const INFO_FILE: &str = ".info";

/// System-wide annotation file consulted when annotations are enabled.
pub const GLOBAL_INFO_PATH: &str = "/usr/share/finfo/global_info";

#[derive(Debug, Clone)]
struct Annotation {
    patterns: Vec<Pattern>,
    lines: Vec<String>,
}

/// The annotations loaded from one `.info` file.
#[derive(Debug, Clone)]
pub struct AnnotationSet {
    root: String,
    annotations: Vec<Annotation>,
}

impl AnnotationSet {
    /// Load `<dir>/.info`. Returns `None` when the file does not exist.
    pub fn load(dir: &str) -> Option<Self> {
        Self::from_file(&Path::new(dir).join(INFO_FILE), dir)
    }

    pub fn from_file(file: &Path, root: &str) -> Option<Self> {
        let bytes = fs::read(file).ok()?;
        let set = Self::parse(&String::from_utf8_lossy(&bytes), root);
        debug!(
            "loaded {} annotations from {}",
            set.annotations.len(),
            file.display()
        );
        Some(set)
    }

    pub fn parse(text: &str, root: &str) -> Self {
        let mut annotations = Vec::new();
        let mut patterns: Vec<Pattern> = Vec::new();
        let mut lines: Vec<String> = Vec::new();

        for raw in text.lines() {
            if raw.starts_with('#') {
                continue;
            }
            let line = gittrim(raw);
            if line.is_empty() {
                continue;
            }
            if let Some(comment) = line.strip_prefix('\t') {
                lines.push(comment.to_string());
                continue;
            }
            if !lines.is_empty() {
                // comment lines with no pattern above them are dropped
                if !patterns.is_empty() {
                    annotations.push(Annotation {
                        patterns: std::mem::take(&mut patterns),
                        lines: std::mem::take(&mut lines),
                    });
                }
                patterns.clear();
                lines.clear();
            }
            match Pattern::new(&line) {
                Ok(p) => patterns.push(p),
                Err(e) => warn!("ignoring annotation pattern '{}' in {}: {}", line, root, e),
            }
        }
        if !patterns.is_empty() {
            annotations.push(Annotation { patterns, lines });
        }

        Self {
            root: root.to_string(),
            annotations,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Active annotation sets, innermost last.
#[derive(Debug, Default)]
pub struct InfoStack {
    sets: Vec<AnnotationSet>,
    ignore_case: bool,
}

impl InfoStack {
    pub fn new(ignore_case: bool) -> Self {
        Self {
            sets: Vec::new(),
            ignore_case,
        }
    }

    pub fn push(&mut self, set: AnnotationSet) {
        self.sets.push(set);
    }

    pub fn pop(&mut self) -> Option<AnnotationSet> {
        self.sets.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Find the comment for an entry, searching the innermost set first.
    ///
    /// `top` means the lookup happens directly inside the directory that
    /// owns the innermost set; only then is the bare `name` tried.
    pub fn lookup(&self, path: &str, name: &str, top: bool, is_dir: bool) -> Option<&[String]> {
        let ic = self.ignore_case;
        let mut top = top;
        for set in self.sets.iter().rev() {
            for annotation in &set.annotations {
                if matches_any(&annotation.patterns, path, is_dir, ic)
                    || (top && matches_any(&annotation.patterns, name, is_dir, ic))
                {
                    return Some(&annotation.lines);
                }
            }
            top = false;
        }
        None
    }
}
