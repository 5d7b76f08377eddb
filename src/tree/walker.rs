//! TreeWalker - lists roots and drives a renderer
//!
//! Three strategies feed the same listing loop:
//! - `Lazy` reads one directory at a time and drops each level once it is
//!   printed, so memory is O(depth)
//! - `FullTree` builds each root's whole subtree first; needed for `--du`,
//!   `--prune` and `--matchdirs`
//! - `FromFile` builds a virtual tree from path lists

use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::MetadataExt;

use tracing::{debug, info};

use crate::error::Diagnostic;
use crate::filter::FilterSet;
use crate::output::{Branch, Renderer, Totals};

use super::config::WalkerConfig;
use super::entry::Entry;
use super::traversal::{Pushed, Traversal, join_path, link_path};

/// How children are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Lazy,
    FullTree,
    FromFile,
}

impl Strategy {
    pub fn for_config(config: &WalkerConfig) -> Self {
        if config.from_file {
            Strategy::FromFile
        } else if config.needs_full_tree() {
            Strategy::FullTree
        } else {
            Strategy::Lazy
        }
    }
}

/// Result of a complete listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub totals: Totals,
    /// Number of diagnostics rendered
    pub errors: usize,
}

impl WalkSummary {
    /// 2 when any diagnostic was rendered, else 0.
    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 { 2 } else { 0 }
    }
}

/// Children listed under the entry being printed, and where to find them.
struct Opened {
    children: Vec<Entry>,
    /// Path the children live under (a symlink's target when followed)
    path: String,
    pushed: Option<Pushed>,
}

pub struct TreeWalker {
    config: WalkerConfig,
    strategy: Strategy,
    base_filter: Option<FilterSet>,
}

impl TreeWalker {
    pub fn new(config: WalkerConfig) -> Self {
        let strategy = Strategy::for_config(&config);
        Self {
            config,
            strategy,
            base_filter: None,
        }
    }

    /// Rules active for the whole walk, such as `info/exclude`.
    pub fn with_base_filter(mut self, set: FilterSet) -> Self {
        self.base_filter = Some(set);
        self
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    /// List every root in order, then the report.
    pub fn walk(&self, roots: &[String], out: &mut dyn Renderer) -> io::Result<WalkSummary> {
        let mut t = Traversal::new(&self.config);
        if let Some(set) = &self.base_filter {
            t.push_base_filter(set.clone());
        }
        info!("walking {} root(s) with {:?} strategy", roots.len(), self.strategy);

        out.intro()?;
        let mut totals = Totals::default();
        for (i, root) in roots.iter().enumerate() {
            let has_next = i + 1 < roots.len();
            totals += self.walk_root(&mut t, root, has_next, out)?;
        }
        if !self.config.no_report {
            out.report(&totals)?;
        }
        out.outro()?;

        Ok(WalkSummary {
            totals,
            errors: t.errors,
        })
    }

    fn walk_root(&self, t: &mut Traversal<'_>, root: &str, has_next: bool, out: &mut dyn Renderer) -> io::Result<Totals> {
        let name = if self.config.full_path { trim_root(root) } else { root };
        let meta = match fs::symlink_metadata(name) {
            Ok(meta) => {
                // A symlinked root is identified by the directory it names
                let (dev, ino) = fs::metadata(name).map_or((meta.dev(), meta.ino()), |m| (m.dev(), m.ino()));
                t.inodes.record(dev, ino);
                Some(meta)
            }
            Err(e) => {
                debug!("cannot stat root {}: {}", name, e);
                None
            }
        };

        if self.strategy == Strategy::Lazy {
            return t.with_rules(name, |t, pushed| {
                let listing = match &meta {
                    Some(_) => self.read_limited(t, name, pushed.info),
                    None => Err(Diagnostic::OpenFailed),
                };
                self.emit_root(t, out, name, meta.as_ref(), listing, has_next)
            });
        }

        let listing = match &meta {
            Some(meta) => self.build_subtree(t, name, meta),
            None => Err(Diagnostic::OpenFailed),
        };
        self.emit_root(t, out, name, meta.as_ref(), listing, has_next)
    }

    /// Build a root's children with an eager strategy.
    pub fn build_subtree(&self, t: &mut Traversal<'_>, root: &str, meta: &Metadata) -> Result<Vec<Entry>, Diagnostic> {
        match self.strategy {
            Strategy::FromFile => t.build_from_list(root),
            _ => {
                let root_dev = if self.config.one_filesystem {
                    fs::metadata(root).map_or(meta.dev(), |m| m.dev())
                } else {
                    meta.dev()
                };
                t.collect(root, "", 0, root_dev).map(Option::unwrap_or_default)
            }
        }
    }

    fn emit_root(
        &self,
        t: &mut Traversal<'_>,
        out: &mut dyn Renderer,
        name: &str,
        meta: Option<&Metadata>,
        listing: Result<Vec<Entry>, Diagnostic>,
        has_next: bool,
    ) -> io::Result<Totals> {
        let mut info = meta.map(|m| Entry::from_metadata(name, m));
        let (children, error) = match listing {
            Ok(children) => (Some(children), None),
            Err(diagnostic) => (None, Some(diagnostic)),
        };
        if self.config.du {
            if let Some(info) = info.as_mut() {
                info.size = children.as_ref().map_or(0, |c| c.iter().map(|e| e.size).sum());
            }
        }

        out.info_prefix(info.as_ref(), 0, &t.indent)?;
        let descend = children.is_some();
        let needs_close = out.body(None, name, info.as_ref(), descend)?;
        if let Some(diagnostic) = error {
            out.error_note(&diagnostic.to_string())?;
            t.errors += 1;
        }

        let mut totals = Totals::default();
        if let Some(children) = children {
            out.line_break(info.as_ref(), 0, true, false, &t.indent)?;
            let dev = self.listing_dev(name, meta);
            totals = self.list_dir(t, out, name, children, 1, dev)?;
        } else if !needs_close {
            out.line_break(info.as_ref(), 0, false, has_next, &t.indent)?;
        }
        if needs_close {
            out.close_node(info.as_ref(), descend.then_some(0), has_next)?;
        }

        match (&info, self.config.du) {
            (Some(info), true) => totals.size = info.size,
            (Some(info), false) => totals.size += info.size,
            (None, _) => {}
        }
        Ok(totals)
    }

    /// Device `-x` compares children against.
    fn listing_dev(&self, root: &str, meta: Option<&Metadata>) -> u64 {
        let lstat_dev = meta.map_or(0, |m| m.dev());
        if self.config.one_filesystem {
            fs::metadata(root).map_or(lstat_dev, |m| m.dev())
        } else {
            lstat_dev
        }
    }

    /// Read a directory lazily, refusing ones over the file limit.
    fn read_limited(&self, t: &Traversal<'_>, dir: &str, info_top: bool) -> Result<Vec<Entry>, Diagnostic> {
        let entries = t.read_dir(dir, info_top).map_err(|_| Diagnostic::OpenFailed)?;
        if self.config.exceeds_file_limit(entries.len()) {
            return Err(Diagnostic::FileLimit(entries.len()));
        }
        Ok(entries)
    }

    /// Print the entries of one directory at `depth`, recursing into
    /// subdirectories. Returns the subtree totals.
    fn list_dir(
        &self,
        t: &mut Traversal<'_>,
        out: &mut dyn Renderer,
        dirname: &str,
        mut entries: Vec<Entry>,
        depth: usize,
        dev: u64,
    ) -> io::Result<Totals> {
        let config = &self.config;
        if self.strategy == Strategy::Lazy {
            config.sort.sort(&mut entries);
        }
        let count = entries.len();
        t.indent
            .set(depth, if count > 1 { Branch::More } else { Branch::Last });

        let mut totals = Totals::default();
        for (i, mut entry) in entries.into_iter().enumerate() {
            let has_next = i + 1 < count;
            out.info_prefix(Some(&entry), depth, &t.indent)?;

            let path = join_path(dirname, &entry.name);
            let opened = if entry.is_dir {
                totals.dirs += 1;
                self.open(t, &mut entry, dirname, &path, depth, dev)
            } else {
                totals.files += 1;
                None
            };
            let descend = opened.as_ref().is_some_and(|o| !o.children.is_empty());

            let filename = if config.full_path { path.as_str() } else { entry.name.as_str() };
            let needs_close = out.body(Some(dirname), filename, Some(&entry), descend)?;
            if let Some(diagnostic) = &entry.error {
                out.error_note(&diagnostic.to_string())?;
                t.errors += 1;
            }

            let mut pushed = None;
            match opened {
                Some(opened) if descend => {
                    out.line_break(Some(&entry), depth, true, false, &t.indent)?;
                    pushed = opened.pushed;
                    totals += self.list_dir(t, out, &opened.path, opened.children, depth + 1, dev)?;
                }
                Some(opened) => {
                    pushed = opened.pushed;
                    if !needs_close {
                        out.line_break(Some(&entry), depth, false, has_next, &t.indent)?;
                    }
                }
                None if !needs_close => {
                    out.line_break(Some(&entry), depth, false, has_next, &t.indent)?;
                }
                None => {}
            }
            if needs_close {
                out.close_node(Some(&entry), descend.then_some(depth), has_next)?;
            }
            if i + 2 == count {
                t.indent.set(depth, Branch::Last);
            }
            totals.size += entry.size;
            if let Some(pushed) = pushed {
                t.pop_rules(pushed);
            }
        }
        t.indent.set(depth, Branch::Empty);
        Ok(totals)
    }

    /// Decide whether a directory entry is descended into and get its
    /// children. Diagnostics are attached to `entry`.
    fn open(
        &self,
        t: &mut Traversal<'_>,
        entry: &mut Entry,
        dirname: &str,
        path: &str,
        depth: usize,
        dev: u64,
    ) -> Option<Opened> {
        let config = &self.config;
        let target = match &entry.link {
            Some(link) => link_path(dirname, link),
            None => path.to_string(),
        };

        if self.strategy != Strategy::Lazy {
            let children = entry.children.take()?;
            if config.at_depth_limit(depth) {
                return None;
            }
            return Some(Opened {
                children,
                path: target,
                pushed: None,
            });
        }

        let seen = t.inodes.seen(entry.dev, entry.inode);
        if !seen {
            t.inodes.record(entry.dev, entry.inode);
        }
        if config.one_filesystem && entry.dev != dev {
            return None;
        }
        if entry.is_symlink() && !config.follow_links {
            return None;
        }
        if config.at_depth_limit(depth) {
            return None;
        }
        if entry.is_symlink() && seen {
            debug!("symlink cycle at {}", path);
            entry.error = Some(Diagnostic::Recursive);
            return None;
        }

        let pushed = t.push_rules(&target);
        let children = match self.read_limited(t, &target, pushed.info) {
            Ok(children) => children,
            Err(diagnostic) => {
                entry.error = Some(diagnostic);
                Vec::new()
            }
        };
        Some(Opened {
            children,
            path: target,
            pushed: Some(pushed),
        })
    }
}

/// Strip trailing slashes from a root given with `-f`, keeping `/` itself.
fn trim_root(root: &str) -> &str {
    let trimmed = root.trim_end_matches('/');
    if trimmed.is_empty() { &root[..1.min(root.len())] } else { trimmed }
}
