//! Mutable state shared by one traversal.
//!
//! The filter stack, annotation stack, visited-inode table, indentation
//! flags and error counter all live here and are threaded through the
//! builders and the list driver by `&mut` reference.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::filter::{FilterSet, FilterStack};
use crate::info::{AnnotationSet, GLOBAL_INFO_PATH, InfoStack};
use crate::output::Indent;
use crate::pattern::matches_any;

use super::config::WalkerConfig;
use super::entry::Entry;

/// Set of visited `(device, inode)` pairs used as the symlink cycle guard.
#[derive(Debug, Default)]
pub struct InodeTable {
    seen: HashSet<(u64, u64)>,
}

impl InodeTable {
    pub fn seen(&self, dev: u64, inode: u64) -> bool {
        self.seen.contains(&(dev, inode))
    }

    pub fn record(&mut self, dev: u64, inode: u64) {
        self.seen.insert((dev, inode));
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Which rule files were pushed for a directory, so they can be popped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pushed {
    pub filter: bool,
    /// An annotation file exists in this very directory
    pub info: bool,
}

pub struct Traversal<'a> {
    pub config: &'a WalkerConfig,
    pub filters: FilterStack,
    pub infos: InfoStack,
    pub inodes: InodeTable,
    pub indent: Indent,
    pub errors: usize,
    /// Set while `--matchdirs` has matched the directory being read
    pub include_suspended: bool,
}

impl<'a> Traversal<'a> {
    pub fn new(config: &'a WalkerConfig) -> Self {
        let mut infos = InfoStack::new(config.ignore_case);
        if config.annotations {
            if let Some(global) = AnnotationSet::from_file(Path::new(GLOBAL_INFO_PATH), "/") {
                infos.push(global);
            }
        }
        Self {
            config,
            filters: FilterStack::new(config.ignore_case),
            infos,
            inodes: InodeTable::default(),
            indent: Indent::default(),
            errors: 0,
            include_suspended: false,
        }
    }

    /// Push a rule set that stays active for the whole traversal.
    pub fn push_base_filter(&mut self, set: FilterSet) {
        self.filters.push(set);
    }

    /// Load and push the rule files found in `dir`.
    pub fn push_rules(&mut self, dir: &str) -> Pushed {
        let mut pushed = Pushed::default();
        if self.config.gitignore {
            if let Some(set) = FilterSet::load(dir) {
                self.filters.push(set);
                pushed.filter = true;
            }
        }
        if self.config.annotations {
            if let Some(set) = AnnotationSet::load(dir) {
                self.infos.push(set);
                pushed.info = true;
            }
        }
        pushed
    }

    pub fn pop_rules(&mut self, pushed: Pushed) {
        if pushed.filter {
            self.filters.pop();
        }
        if pushed.info {
            self.infos.pop();
        }
    }

    /// Run `f` with the rule files of `dir` active, popping them afterwards.
    pub fn with_rules<R>(&mut self, dir: &str, f: impl FnOnce(&mut Self, Pushed) -> R) -> R {
        let pushed = self.push_rules(dir);
        let result = f(self, pushed);
        self.pop_rules(pushed);
        result
    }

    /// Apply gitignore, include, exclude and directories-only filters.
    pub fn admits(&self, entry: &Entry, path: &str) -> bool {
        let config = self.config;
        let ic = config.ignore_case;
        if config.gitignore && self.filters.is_excluded(path, entry.is_dir) {
            return false;
        }

        let is_real_dir = entry.kind() == super::entry::FileKind::Directory;
        let followed_dir = config.follow_links && entry.is_dir;
        if !is_real_dir
            && !followed_dir
            && !self.include_suspended
            && !config.include.is_empty()
            && !matches_any(&config.include, &entry.name, entry.is_dir, ic)
        {
            return false;
        }
        if matches_any(&config.exclude, &entry.name, entry.is_dir, ic) {
            debug!("excluded by -I: {}", path);
            return false;
        }
        if config.dirs_only && !entry.is_dir {
            return false;
        }
        true
    }
}

/// Join a directory and a name without doubling a trailing `/`.
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Resolve a symlink target relative to the directory holding the link.
pub fn link_path(dir: &str, target: &str) -> String {
    if target.starts_with('/') {
        target.to_string()
    } else {
        join_path(dir, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("a", "b"), "a/b");
        assert_eq!(join_path("/", "b"), "/b");
        assert_eq!(join_path("a/", "b"), "a/b");
    }

    #[test]
    fn test_link_path() {
        assert_eq!(link_path("/x/y", "/abs"), "/abs");
        assert_eq!(link_path("/x/y", "../z"), "/x/y/../z");
    }

    #[test]
    fn test_inode_table() {
        let mut table = InodeTable::default();
        assert!(table.is_empty());
        table.record(1, 42);
        assert!(table.seen(1, 42));
        assert!(!table.seen(2, 42));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_admits_include_only_applies_to_files() {
        let config = WalkerConfig {
            include: vec![Pattern::new("*.rs").unwrap()],
            ..Default::default()
        };
        let t = Traversal::new(&config);
        assert!(t.admits(&Entry::synthetic("main.rs", false), "r/main.rs"));
        assert!(!t.admits(&Entry::synthetic("notes.md", false), "r/notes.md"));
        assert!(t.admits(&Entry::synthetic("src", true), "r/src"));
    }

    #[test]
    fn test_admits_exclude_and_dirs_only() {
        let config = WalkerConfig {
            exclude: vec![Pattern::new("target").unwrap()],
            dirs_only: true,
            ..Default::default()
        };
        let t = Traversal::new(&config);
        assert!(!t.admits(&Entry::synthetic("target", true), "r/target"));
        assert!(!t.admits(&Entry::synthetic("file", false), "r/file"));
        assert!(t.admits(&Entry::synthetic("src", true), "r/src"));
    }

    #[test]
    fn test_with_rules_pops_on_exit() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "*.o\n").unwrap();
        let config = WalkerConfig {
            gitignore: true,
            ..Default::default()
        };
        let mut t = Traversal::new(&config);
        let root = dir.path().to_str().unwrap().to_string();
        let depth = t.with_rules(&root, |t, pushed| {
            assert!(pushed.filter);
            t.filters.len()
        });
        assert_eq!(depth, 1);
        assert!(t.filters.is_empty(), "rules should be popped after the closure");
    }
}
