//! Git repository integration
//!
//! With `--gitignore`, the repository's `info/exclude` file is loaded once
//! and stays at the bottom of the filter stack for the whole listing.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::filter::FilterSet;

/// Locate `info/exclude`: under `GIT_DIR` when set, otherwise in the
/// repository containing `root`.
pub fn exclude_path(root: &Path) -> Option<PathBuf> {
    exclude_path_with(env::var_os("GIT_DIR"), root)
}

fn exclude_path_with(git_dir: Option<OsString>, root: &Path) -> Option<PathBuf> {
    if let Some(dir) = git_dir.filter(|d| !d.is_empty()) {
        return Some(PathBuf::from(dir).join("info").join("exclude"));
    }
    let repo = Repository::discover(root).ok()?;
    Some(repo.path().join("info").join("exclude"))
}

/// Load the exclude rules, rooted at the listing root `root`.
pub fn exclude_filter(root: &str) -> Option<FilterSet> {
    let path = exclude_path(Path::new(root))?;
    let set = FilterSet::from_file(&path, root)?;
    debug!("loaded {} as base ignore rules", path.display());
    Some(set)
}
