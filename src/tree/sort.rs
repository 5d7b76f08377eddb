//! Per-directory ordering of entries.

use std::cmp::Ordering;

use clap::ValueEnum;

use super::entry::Entry;

/// Base comparator selected with `--sort` or the short sort flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Name,
    Version,
    Size,
    Mtime,
    Ctime,
}

/// Optional directories-first or files-first partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Partition {
    #[default]
    None,
    DirsFirst,
    FilesFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    /// `None` keeps directory order (`-U`).
    pub key: Option<SortKey>,
    pub reverse: bool,
    pub partition: Partition,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            key: Some(SortKey::Name),
            reverse: false,
            partition: Partition::None,
        }
    }
}

impl SortOrder {
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        if a.is_dir != b.is_dir {
            match self.partition {
                Partition::DirsFirst => return if a.is_dir { Ordering::Less } else { Ordering::Greater },
                Partition::FilesFirst => return if a.is_dir { Ordering::Greater } else { Ordering::Less },
                Partition::None => {}
            }
        }
        let Some(key) = self.key else {
            return Ordering::Equal;
        };
        let ord = match key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Version => version_cmp(&a.name, &b.name),
            SortKey::Size => b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)),
            SortKey::Mtime => a.mtime.cmp(&b.mtime).then_with(|| a.name.cmp(&b.name)),
            SortKey::Ctime => a.ctime.cmp(&b.ctime).then_with(|| a.name.cmp(&b.name)),
        };
        if self.reverse { ord.reverse() } else { ord }
    }

    /// Stable sort of one directory level.
    pub fn sort(&self, entries: &mut [Entry]) {
        if self.key.is_none() && self.partition == Partition::None {
            return;
        }
        entries.sort_by(|a, b| self.compare(a, b));
    }
}

/// Compare names treating runs of digits as numbers.
///
/// Equal numeric values with more leading zeros sort first, so `a01`
/// precedes `a1`.
pub fn version_cmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let si = i;
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            let sj = j;
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let da = trim_zeros(&a[si..i]);
            let db = trim_zeros(&b[sj..j]);
            let ord = da
                .len()
                .cmp(&db.len())
                .then_with(|| da.cmp(db))
                .then_with(|| (j - sj).cmp(&(i - si)));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            if a[i] != b[j] {
                return a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }
    }
    (a.len() - i).cmp(&(b.len() - j))
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let start = digits.iter().position(|d| *d != b'0').unwrap_or(digits.len());
    &digits[start..]
}
