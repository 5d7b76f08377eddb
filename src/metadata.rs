//! Metadata columns shown before each entry name
//!
//! This module turns the raw `lstat` data held by an [`Entry`] into the
//! bracketed `[...]` column of the plain and HTML listings, and provides the
//! individual formatters (permissions, sizes, dates) the XML and JSON
//! renderers reuse for their attributes.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};

use crate::error::CanopyError;
use crate::ids::IdNames;
use crate::tree::{Entry, FileKind};

const S_ISUID: u32 = 0o4000;
const S_ISGID: u32 = 0o2000;
const S_ISVTX: u32 = 0o1000;

/// Dates older (or newer) than this are shown with a year instead of a time.
const SIX_MONTHS_SECS: i64 = 6 * 31 * 24 * 60 * 60;

const RECENT_FORMAT: &str = "%b %e %H:%M";
const OLD_FORMAT: &str = "%b %e  %Y";

const IEC_UNITS: &[u8] = b"BKMGTPEZY";
const SI_UNITS: &[u8] = b"dkMGTPEZY";

/// Which metadata columns to show and how to format them.
#[derive(Debug, Clone, Default)]
pub struct MetadataConfig {
    pub inode: bool,
    pub device: bool,
    /// `ls -l` style protections (`-p`)
    pub protections: bool,
    pub user: bool,
    pub group: bool,
    pub size: bool,
    /// Sizes in powers of 1024 with a unit letter (`-h`)
    pub human: bool,
    /// Sizes in powers of 1000 (`--si`)
    pub si: bool,
    /// Modification date (`-D`)
    pub date: bool,
    /// Use the status change time for dates and `-t` sorting (`-c`)
    pub ctime: bool,
    /// strftime-style format for dates (`--timefmt`)
    pub time_format: Option<String>,
}

impl MetadataConfig {
    /// True when at least one column is enabled.
    pub fn any(&self) -> bool {
        self.inode || self.device || self.protections || self.user || self.group || self.size || self.date
    }

    /// Sizes are printed with a unit suffix rather than in bytes.
    pub fn scaled_sizes(&self) -> bool {
        self.human || self.si
    }

    pub fn format_size(&self, size: u64) -> String {
        format_size(size, self.human, self.si)
    }

    /// The timestamp `-D` shows for this entry.
    pub fn entry_time(&self, entry: &Entry) -> i64 {
        if self.ctime { entry.ctime } else { entry.mtime }
    }

    pub fn format_date(&self, entry: &Entry, now: i64) -> String {
        format_date(self.entry_time(entry), self.time_format.as_deref(), now)
    }

    /// Build the bracketed metadata column, or an empty string.
    pub fn fill_info(&self, entry: &Entry, ids: &mut IdNames, now: i64) -> String {
        let mut buf = String::new();
        if self.inode {
            let _ = write!(buf, " {:7}", entry.linode);
        }
        if self.device {
            let _ = write!(buf, " {:3}", entry.ldev);
        }
        if self.protections {
            let _ = write!(buf, " {}", prot(entry.mode));
        }
        if self.user {
            let _ = write!(buf, " {:<8}", truncate(ids.user(entry.uid), 32));
        }
        if self.group {
            let _ = write!(buf, " {:<8}", truncate(ids.group(entry.gid), 32));
        }
        if self.size {
            buf.push_str(&self.format_size(entry.size));
        }
        if self.date {
            let _ = write!(buf, " {}", self.format_date(entry, now));
        }

        if buf.starts_with(' ') {
            buf.replace_range(0..1, "[");
            buf.push(']');
        }
        buf
    }
}

fn truncate(name: &str, max: usize) -> &str {
    match name.char_indices().nth(max) {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

/// Render a mode word as a ten character `ls -l` permission string.
pub fn prot(mode: u32) -> String {
    const PERMS: &[u8; 9] = b"rwxrwxrwx";

    let mut buf = [b'-'; 10];
    buf[0] = FileKind::from_mode(mode).prot_char() as u8;
    for (i, perm) in PERMS.iter().enumerate() {
        if mode & (0o400 >> i) != 0 {
            buf[i + 1] = *perm;
        }
    }
    for (bit, idx, set, unset) in [
        (S_ISUID, 3, b's', b'S'),
        (S_ISGID, 6, b's', b'S'),
        (S_ISVTX, 9, b't', b'T'),
    ] {
        if mode & bit != 0 {
            buf[idx] = if buf[idx] == b'-' { unset } else { set };
        }
    }
    buf.iter().map(|&b| b as char).collect()
}

/// Format a size for the metadata column, including its leading space.
///
/// Human sizes use one decimal below ten units and none above.
pub fn format_size(size: u64, human: bool, si: bool) -> String {
    if !(human || si) {
        return format!(" {:11}", size);
    }
    let (base, units) = if si { (1000u64, SI_UNITS) } else { (1024u64, IEC_UNITS) };

    let mut size = size;
    let mut idx = if size < base { 0 } else { 1 };
    while size >= base * base {
        idx += 1;
        size /= base;
    }
    if idx == 0 {
        return format!(" {:4}", size);
    }
    let unit = units[idx.min(units.len() - 1)] as char;
    let scaled = size as f64 / base as f64;
    if size / base >= 10 {
        format!(" {:3.0}{}", scaled, unit)
    } else {
        format!(" {:3.1}{}", scaled, unit)
    }
}

/// Format a timestamp in local time.
///
/// Without a user format, dates within the last six months show the time of
/// day and everything else (including future dates) shows the year.
pub fn format_date(t: i64, format: Option<&str>, now: i64) -> String {
    let format = format.unwrap_or(if now < t || t + SIX_MONTHS_SECS < now {
        OLD_FORMAT
    } else {
        RECENT_FORMAT
    });

    let Some(dt) = local_time(t) else {
        return t.to_string();
    };
    let mut out = String::new();
    match write!(out, "{}", dt.format_with_items(StrftimeItems::new(format))) {
        Ok(()) => out,
        Err(_) => t.to_string(),
    }
}

fn local_time(t: i64) -> Option<DateTime<Local>> {
    Local.timestamp_opt(t, 0).earliest()
}

/// Reject a `--timefmt` string chrono cannot format.
pub fn validate_time_format(format: &str) -> Result<(), CanopyError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(CanopyError::TimeFormat(format.to_string()));
    }
    Ok(())
}
