//! Tree formatting and display
//!
//! The walker drives a [`Renderer`] through a fixed sequence of callbacks;
//! each output format implements them:
//! - Plain text with box-drawing rails and optional colors
//! - HTML document with links
//! - XML
//! - JSON
//!
//! # Module Structure
//!
//! - `config` - Output configuration types and line-drawing sets
//! - `utils` - Shared helpers (indentation, escaping, report text)
//! - `plain`, `html`, `xml`, `json` - The renderers

mod config;
mod html;
mod json;
mod plain;
mod utils;
mod xml;

use std::io::{self, Write};
use std::ops::AddAssign;

use termcolor::WriteColor;

use crate::tree::Entry;

pub use config::{
    ASCII_LINES, HtmlConfig, LineDraw, NameStyle, OutputConfig, OutputFormat, UTF8_LINES,
    charset_from_env,
};
pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use plain::PlainRenderer;
pub use utils::{entity_encode, escape_name, report_text, url_encode};
pub use xml::XmlRenderer;

/// Counts accumulated over a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub dirs: usize,
    pub files: usize,
    pub size: u64,
}

impl AddAssign for Totals {
    fn add_assign(&mut self, other: Self) {
        self.dirs += other.dirs;
        self.files += other.files;
        self.size += other.size;
    }
}

/// State of one indentation column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Branch {
    /// No entry at this depth is being listed
    #[default]
    Empty,
    /// More siblings follow the current entry
    More,
    /// The current entry is the last sibling
    Last,
}

/// Per-depth branch flags, owned by the walker and read by renderers.
///
/// Depth 0 is the root and is never drawn.
#[derive(Debug, Clone, Default)]
pub struct Indent {
    levels: Vec<Branch>,
}

impl Indent {
    pub fn set(&mut self, depth: usize, branch: Branch) {
        if depth >= self.levels.len() {
            self.levels.resize(depth + 1, Branch::Empty);
        }
        self.levels[depth] = branch;
    }

    pub fn get(&self, depth: usize) -> Branch {
        self.levels.get(depth).copied().unwrap_or_default()
    }
}

/// Callbacks a walker issues while listing.
///
/// For every root and entry the walker calls `info_prefix`, `body`,
/// `error_note` when the entry carries a diagnostic, then either
/// `line_break` with `post_dir` set followed by the children, or a plain
/// `line_break` when `body` did not ask for a close; finally `close_node`
/// when `body` returned true. `depth` in `close_node` is `Some` only when
/// the entry's children were listed.
pub trait Renderer {
    fn intro(&mut self) -> io::Result<()>;

    fn info_prefix(&mut self, entry: Option<&Entry>, depth: usize, indent: &Indent) -> io::Result<()>;

    /// Print the entry name; `dir` is `None` for a root. Returns whether a
    /// matching `close_node` is needed.
    fn body(&mut self, dir: Option<&str>, name: &str, entry: Option<&Entry>, descend: bool) -> io::Result<bool>;

    fn error_note(&mut self, text: &str) -> io::Result<()>;

    fn line_break(
        &mut self,
        entry: Option<&Entry>,
        depth: usize,
        post_dir: bool,
        needs_comma: bool,
        indent: &Indent,
    ) -> io::Result<()>;

    fn close_node(&mut self, entry: Option<&Entry>, depth: Option<usize>, needs_comma: bool) -> io::Result<()>;

    fn report(&mut self, totals: &Totals) -> io::Result<()>;

    /// Finish the document and flush.
    fn outro(&mut self) -> io::Result<()>;
}

/// Build the renderer selected by `config.format` around `out`.
pub fn renderer_for<'w, W>(config: OutputConfig, out: W) -> Box<dyn Renderer + 'w>
where
    W: WriteColor + 'w,
{
    match config.format {
        OutputFormat::Plain => Box::new(PlainRenderer::new(config, out)),
        OutputFormat::Html => Box::new(HtmlRenderer::new(config, out)),
        OutputFormat::Xml => Box::new(XmlRenderer::new(config, out)),
        OutputFormat::Json => Box::new(JsonRenderer::new(config, out)),
    }
}

/// `serde_json` failures while writing are plain I/O failures here.
fn json_io(err: serde_json::Error) -> io::Error {
    io::Error::from(err)
}

fn write_spaces<W: Write + ?Sized>(out: &mut W, count: usize) -> io::Result<()> {
    write!(out, "{:count$}", "", count = count)
}
