//! The node type produced by the builders.

use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::error::Diagnostic;

const S_IFMT: u32 = 0o170000;
const S_IFSOCK: u32 = 0o140000;
const S_IFLNK: u32 = 0o120000;
const S_IFREG: u32 = 0o100000;
const S_IFBLK: u32 = 0o060000;
const S_IFDIR: u32 = 0o040000;
const S_IFCHR: u32 = 0o020000;
const S_IFIFO: u32 = 0o010000;

const EXEC_BITS: u32 = 0o111;

/// Link target text used when `readlink` fails.
pub const UNREADABLE_LINK: &str = "[Error reading symbolic link information]";

/// The file type encoded in a mode word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Link,
    Char,
    Block,
    Socket,
    Fifo,
    Unknown,
}

impl FileKind {
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFREG => FileKind::File,
            S_IFDIR => FileKind::Directory,
            S_IFLNK => FileKind::Link,
            S_IFCHR => FileKind::Char,
            S_IFBLK => FileKind::Block,
            S_IFSOCK => FileKind::Socket,
            S_IFIFO => FileKind::Fifo,
            _ => FileKind::Unknown,
        }
    }

    /// Name used for the JSON `type` field and XML element names.
    pub fn type_name(self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Directory => "directory",
            FileKind::Link => "link",
            FileKind::Char => "char",
            FileKind::Block => "block",
            FileKind::Socket => "socket",
            FileKind::Fifo => "fifo",
            FileKind::Unknown => "unknown",
        }
    }

    /// Leading character of an `ls -l` style permission string.
    pub fn prot_char(self) -> char {
        match self {
            FileKind::File => '-',
            FileKind::Directory => 'd',
            FileKind::Link => 'l',
            FileKind::Char => 'c',
            FileKind::Block => 'b',
            FileKind::Socket => 's',
            FileKind::Fifo => 'p',
            FileKind::Unknown => '?',
        }
    }

    pub fn mode_bits(self) -> u32 {
        match self {
            FileKind::File => S_IFREG,
            FileKind::Directory => S_IFDIR,
            FileKind::Link => S_IFLNK,
            FileKind::Char => S_IFCHR,
            FileKind::Block => S_IFBLK,
            FileKind::Socket => S_IFSOCK,
            FileKind::Fifo => S_IFIFO,
            FileKind::Unknown => 0,
        }
    }
}

/// One filesystem object plus the data gathered about it.
///
/// `mode`, ownership, size and times describe the object itself (`lstat`).
/// For symlinks, `dev`/`inode` and the kind flags describe the target while
/// `ldev`/`linode` describe the link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    pub name: String,
    pub link: Option<String>,
    pub link_mode: Option<u32>,
    pub mode: u32,
    pub is_dir: bool,
    pub is_socket: bool,
    pub is_fifo: bool,
    pub is_exec: bool,
    pub orphan: bool,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime: i64,
    pub ctime: i64,
    pub mtime: i64,
    pub dev: u64,
    pub inode: u64,
    pub ldev: u64,
    pub linode: u64,
    pub error: Option<Diagnostic>,
    pub comment: Option<Vec<String>>,
    pub children: Option<Vec<Entry>>,
}

impl Entry {
    /// Build an entry from `lstat` data without following links.
    pub fn from_metadata(name: &str, meta: &Metadata) -> Self {
        let mode = meta.mode();
        let kind = FileKind::from_mode(mode);
        Self {
            name: name.to_string(),
            mode,
            is_dir: kind == FileKind::Directory,
            is_socket: kind == FileKind::Socket,
            is_fifo: kind == FileKind::Fifo,
            is_exec: mode & EXEC_BITS != 0,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.size(),
            atime: meta.atime(),
            ctime: meta.ctime(),
            mtime: meta.mtime(),
            dev: meta.dev(),
            inode: meta.ino(),
            ldev: meta.dev(),
            linode: meta.ino(),
            ..Default::default()
        }
    }

    /// `lstat` the path and, for symlinks, `stat` through to the target.
    pub fn stat(name: &str, path: &Path) -> io::Result<Self> {
        let lst = fs::symlink_metadata(path)?;
        let mut entry = Self::from_metadata(name, &lst);
        if !lst.file_type().is_symlink() {
            return Ok(entry);
        }

        let target = fs::metadata(path).ok();
        let (target_mode, dev, inode) = match &target {
            Some(t) => (t.mode(), t.dev(), t.ino()),
            None => (0, 0, 0),
        };
        let kind = FileKind::from_mode(target_mode);
        entry.dev = dev;
        entry.inode = inode;
        entry.is_dir = kind == FileKind::Directory;
        entry.is_socket = kind == FileKind::Socket;
        entry.is_fifo = kind == FileKind::Fifo;
        entry.is_exec = target_mode & EXEC_BITS != 0;
        entry.link_mode = Some(target_mode);

        match fs::read_link(path) {
            Ok(t) => {
                entry.link = Some(t.to_string_lossy().into_owned());
                entry.orphan = target.is_none();
            }
            Err(_) => {
                entry.link = Some(UNREADABLE_LINK.to_string());
                entry.is_dir = false;
            }
        }
        Ok(entry)
    }

    /// An entry that exists only in a path list, with no real metadata.
    pub fn synthetic(name: &str, is_dir: bool) -> Self {
        let kind = if is_dir {
            FileKind::Directory
        } else {
            FileKind::File
        };
        Self {
            name: name.to_string(),
            mode: kind.mode_bits(),
            is_dir,
            ..Default::default()
        }
    }

    /// Kind of the object itself (a symlink reports `Link`).
    pub fn kind(&self) -> FileKind {
        FileKind::from_mode(self.mode)
    }

    pub fn is_symlink(&self) -> bool {
        self.link.is_some()
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }
}
