//! Eager construction of a whole subtree before rendering.
//!
//! Needed when a decision depends on a directory's complete contents:
//! cumulative sizes, pruning of empty directories and `--matchdirs`.

use tracing::debug;

use crate::error::Diagnostic;
use crate::pattern::matches_any;

use super::entry::Entry;
use super::traversal::{Traversal, join_path, link_path};

impl Traversal<'_> {
    /// Recursively read `dir`, whose entry sits at `depth` below the root.
    ///
    /// Returns `Ok(None)` when the depth limit stops the read. `rel` is the
    /// directory's path relative to the root, used for `--matchdirs`.
    pub fn collect(
        &mut self,
        dir: &str,
        rel: &str,
        depth: usize,
        root_dev: u64,
    ) -> Result<Option<Vec<Entry>>, Diagnostic> {
        if self.config.at_depth_limit(depth) {
            return Ok(None);
        }

        let config = self.config;
        let dir_matched = config.match_dirs
            && !config.include.is_empty()
            && !rel.is_empty()
            && matches_any(&config.include, rel, true, config.ignore_case);

        self.with_rules(dir, |t, pushed| -> Result<Option<Vec<Entry>>, Diagnostic> {
            let saved = std::mem::replace(&mut t.include_suspended, dir_matched);
            let read = t.read_dir(dir, pushed.info);
            t.include_suspended = saved;

            let entries = read.map_err(|_| Diagnostic::OpenFailed)?;
            if config.exceeds_file_limit(entries.len()) {
                return Err(Diagnostic::FileLimit(entries.len()));
            }

            let mut kept = Vec::with_capacity(entries.len());
            for mut entry in entries {
                if entry.is_dir && config.du {
                    // Directories count their contents only, so ones left unread weigh nothing
                    entry.size = 0;
                }
                if entry.is_dir && !(config.one_filesystem && entry.dev != root_dev) {
                    t.descend_into(&mut entry, dir, rel, depth, root_dev);
                    if t.pruned(&entry, depth) {
                        debug!("pruned empty directory {}", join_path(dir, &entry.name));
                        continue;
                    }
                }
                kept.push(entry);
            }
            config.sort.sort(&mut kept);
            Ok(Some(kept))
        })
    }

    fn descend_into(&mut self, entry: &mut Entry, dir: &str, rel: &str, depth: usize, root_dev: u64) {
        let config = self.config;
        if config.at_depth_limit(depth + 1) {
            return;
        }
        let target = match &entry.link {
            Some(_) if !config.follow_links => return,
            Some(link) => {
                if self.inodes.seen(entry.dev, entry.inode) {
                    debug!("symlink cycle at {}", join_path(dir, &entry.name));
                    entry.error = Some(Diagnostic::Recursive);
                    return;
                }
                link_path(dir, link)
            }
            None => join_path(dir, &entry.name),
        };
        self.inodes.record(entry.dev, entry.inode);

        let child_rel = if rel.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", rel, entry.name)
        };
        match self.collect(&target, &child_rel, depth + 1, root_dev) {
            Ok(children) => entry.children = children,
            Err(diagnostic) => entry.error = Some(diagnostic),
        }
        if config.du {
            entry.size = entry
                .children
                .as_deref()
                .map_or(0, |c| c.iter().map(|e| e.size).sum());
        }
    }

    /// Whether an empty directory should be dropped under `--prune`.
    fn pruned(&self, entry: &Entry, depth: usize) -> bool {
        let config = self.config;
        if !config.prune || entry.child_count() > 0 || entry.error.is_some() {
            return false;
        }
        if config.at_depth_limit(depth + 1) {
            return false;
        }
        let selected = config.match_dirs
            && !config.include.is_empty()
            && matches_any(&config.include, &entry.name, true, config.ignore_case);
        !selected
    }
}
