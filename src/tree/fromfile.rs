//! Virtual trees built from a list of paths (`--fromfile`).
//!
//! Each line names one path with `/`-separated components. Every
//! component before the last is a directory, as is the last one when the
//! line ends in `/`. Nothing is read from the filesystem besides the list.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};

use tracing::debug;

use crate::error::Diagnostic;
use crate::pattern::matches_any;

use super::entry::Entry;
use super::traversal::Traversal;

/// List source name meaning standard input.
pub const STDIN_SOURCE: &str = ".";

#[derive(Debug, Default)]
pub struct PathNode {
    is_dir: bool,
    children: BTreeMap<String, PathNode>,
}

impl PathNode {
    fn insert(&mut self, components: &[&str], trailing_dir: bool) {
        let Some((first, rest)) = components.split_first() else {
            return;
        };
        let node = self.children.entry((*first).to_string()).or_default();
        if !rest.is_empty() || trailing_dir {
            node.is_dir = true;
        }
        node.insert(rest, trailing_dir);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Parse list text into a tree of path components.
pub fn parse_path_list(text: &str) -> PathNode {
    let mut root = PathNode {
        is_dir: true,
        ..Default::default()
    };
    for line in text.lines() {
        if line.starts_with('#') {
            continue;
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let components: Vec<&str> = line.split('/').filter(|c| !c.is_empty()).collect();
        root.insert(&components, line.ends_with('/'));
    }
    root
}

/// Read a path list from a file, or from stdin for `.`.
pub fn read_path_list(source: &str) -> io::Result<String> {
    if source == STDIN_SOURCE {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    let bytes = fs::read(source)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Traversal<'_> {
    /// Build the filtered, sorted virtual tree listed in `source`.
    pub fn build_from_list(&self, source: &str) -> Result<Vec<Entry>, Diagnostic> {
        let text = read_path_list(source).map_err(|e| {
            debug!("cannot read path list {}: {}", source, e);
            Diagnostic::OpenFailed
        })?;
        let root = parse_path_list(&text);
        debug!("path list {} has {} top-level entries", source, root.len());
        Ok(self.prune_nodes(root.children, false, true))
    }

    fn prune_nodes(&self, nodes: BTreeMap<String, PathNode>, matched: bool, top: bool) -> Vec<Entry> {
        let config = self.config;
        let ic = config.ignore_case;
        let mut out = Vec::with_capacity(nodes.len());

        for (name, node) in nodes {
            let is_dir = node.is_dir || !node.children.is_empty();
            if config.dirs_only && !is_dir {
                continue;
            }
            if !config.show_all && !top && name.starts_with('.') {
                continue;
            }

            let mut selected = matched;
            if !matched {
                if !is_dir {
                    if !config.include.is_empty() && !matches_any(&config.include, &name, false, ic) {
                        continue;
                    }
                    if matches_any(&config.exclude, &name, false, ic) {
                        continue;
                    }
                } else if config.match_dirs
                    && !config.include.is_empty()
                    && matches_any(&config.include, &name, true, ic)
                {
                    selected = true;
                }
            }

            let children = self.prune_nodes(node.children, selected, false);
            if config.prune && !selected && is_dir && children.is_empty() {
                continue;
            }
            let mut entry = Entry::synthetic(&name, is_dir);
            if !children.is_empty() {
                entry.children = Some(children);
            }
            out.push(entry);
        }
        config.sort.sort(&mut out);
        out
    }
}
