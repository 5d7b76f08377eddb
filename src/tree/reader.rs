//! Lazy, one-directory-at-a-time reading.

use std::fs;
use std::io;

use tracing::{debug, trace};

use super::config::INITIAL_CAPACITY;
use super::entry::Entry;
use super::traversal::{Traversal, join_path};

impl Traversal<'_> {
    /// Read the immediate children of `dir` that pass every active filter.
    ///
    /// `info_top` is true when `dir` itself holds an annotation file, which
    /// enables name-only annotation matches. Entries that vanish between
    /// listing and `lstat` are skipped silently.
    pub fn read_dir(&self, dir: &str, info_top: bool) -> io::Result<Vec<Entry>> {
        let config = self.config;
        let listing = fs::read_dir(dir).inspect_err(|e| debug!("cannot open {}: {}", dir, e))?;

        let mut entries = Vec::with_capacity(INITIAL_CAPACITY);
        for item in listing {
            let Ok(item) = item else {
                continue;
            };
            let name = item.file_name().to_string_lossy().into_owned();
            if config.skip_name.as_deref() == Some(name.as_str()) {
                continue;
            }
            if !config.show_all && name.starts_with('.') {
                continue;
            }

            let path = join_path(dir, &name);
            let Ok(mut entry) = Entry::stat(&name, item.path().as_path()) else {
                trace!("vanished before stat: {}", path);
                continue;
            };
            if !self.admits(&entry, &path) {
                continue;
            }
            if config.annotations {
                entry.comment = self
                    .infos
                    .lookup(&path, &name, info_top, entry.is_dir)
                    .map(<[String]>::to_vec);
            }
            entries.push(entry);
        }
        trace!("read {} entries from {}", entries.len(), dir);
        Ok(entries)
    }
}
