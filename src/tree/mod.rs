//! Directory tree walking logic
//!
//! This module reads directories, applies the filters and produces the
//! entries a renderer prints. It supports three strategies:
//!
//! - Lazy: one directory at a time, O(depth) memory
//! - Full tree: whole subtree first, for cumulative sizes and pruning
//! - From file: a virtual tree built from lists of paths

mod config;
mod entry;
mod fromfile;
mod full;
mod reader;
mod sort;
mod traversal;
mod walker;

// Re-export public types
pub use config::{INITIAL_CAPACITY, WalkerConfig};
pub use entry::{Entry, FileKind, UNREADABLE_LINK};
pub use fromfile::{PathNode, STDIN_SOURCE, parse_path_list, read_path_list};
pub use sort::{Partition, SortKey, SortOrder, version_cmp};
pub use traversal::{InodeTable, Pushed, Traversal, join_path, link_path};
pub use walker::{Strategy, TreeWalker, WalkSummary};
