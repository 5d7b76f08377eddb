//! Configuration types for tree walkers

use crate::pattern::Pattern;

use super::sort::SortOrder;

/// Number of slots reserved for a directory listing before it grows.
pub const INITIAL_CAPACITY: usize = 30;

/// Configuration for tree walking behavior.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Show dotfiles (`-a`)
    pub show_all: bool,
    pub dirs_only: bool,
    /// Descend into symlinked directories (`-l`)
    pub follow_links: bool,
    /// Print the full path prefix for each entry (`-f`)
    pub full_path: bool,
    /// Stay on the root's filesystem (`-x`)
    pub one_filesystem: bool,
    /// Number of levels below the root to show (`-L`)
    pub max_depth: Option<usize>,
    /// `-P`: non-directories must match one of these
    pub include: Vec<Pattern>,
    /// `-I`: entries matching any of these are hidden
    pub exclude: Vec<Pattern>,
    pub gitignore: bool,
    pub ignore_case: bool,
    /// Let `-P` select whole directories (`--matchdirs`)
    pub match_dirs: bool,
    /// Attach `.info` annotations (`--info`)
    pub annotations: bool,
    /// Directories with more entries than this are not opened
    pub file_limit: Option<usize>,
    pub sort: SortOrder,
    /// Accumulate directory sizes from their contents (`--du`)
    pub du: bool,
    /// Drop empty directories (`--prune`)
    pub prune: bool,
    /// Roots are path lists rather than directories (`--fromfile`)
    pub from_file: bool,
    /// Entry name skipped while reading directories
    pub skip_name: Option<String>,
    pub no_report: bool,
}

impl WalkerConfig {
    /// Whether the whole tree must be built before anything is rendered.
    pub fn needs_full_tree(&self) -> bool {
        self.du || self.prune || self.match_dirs || self.from_file
    }

    /// True when an entry at `depth` may not be descended into.
    pub fn at_depth_limit(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth >= max)
    }

    pub fn exceeds_file_limit(&self, count: usize) -> bool {
        self.file_limit.is_some_and(|limit| limit > 0 && count > limit)
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            show_all: false,
            dirs_only: false,
            follow_links: false,
            full_path: false,
            one_filesystem: false,
            max_depth: None,
            include: Vec::new(),
            exclude: Vec::new(),
            gitignore: false,
            ignore_case: false,
            match_dirs: false,
            annotations: false,
            file_limit: None,
            sort: SortOrder::default(),
            du: false,
            prune: false,
            from_file: false,
            skip_name: None,
            no_report: false,
        }
    }
}
