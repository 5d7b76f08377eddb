//! Test utilities for building fixture directories.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use tempfile::TempDir;

/// A temporary directory tree, optionally a git repository.
///
/// The directory is removed when dropped.
pub struct TestRepo {
    dir: TempDir,
    repo: Option<Repository>,
}

impl TestRepo {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir, repo: None }
    }

    /// Create a new temporary directory with a git repository in it.
    pub fn with_git() -> Self {
        let mut repo = Self::new();
        repo.init_git();
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The root as the string form the walker takes.
    pub fn path_str(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    pub fn init_git(&mut self) {
        let repo = Repository::init(self.dir.path()).expect("Failed to init git");
        self.repo = Some(repo);
    }

    /// Write a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }

    /// Create a symlink at `link` pointing to `target` (taken verbatim).
    pub fn symlink(&self, target: &str, link: &str) -> PathBuf {
        let full_path = self.dir.path().join(link);
        std::os::unix::fs::symlink(target, &full_path).expect("Failed to create symlink");
        full_path
    }

    /// Write the repository's `info/exclude` file.
    pub fn set_exclude(&self, content: &str) -> PathBuf {
        let repo = self.repo.as_ref().expect("Git not initialized");
        let info = repo.path().join("info");
        fs::create_dir_all(&info).expect("Failed to create info dir");
        let path = info.join("exclude");
        fs::write(&path, content).expect("Failed to write exclude file");
        path
    }

    /// The fixture most listings are checked against:
    /// `a.txt` (10 bytes), `sub/` and `sub/b.txt` (20 bytes).
    pub fn sample() -> Self {
        let repo = Self::new();
        repo.add_file("a.txt", "0123456789");
        repo.add_file("sub/b.txt", "01234567890123456789");
        repo
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}
