//! JSON output
//!
//! The listing is one array: an object per root with nested `contents`
//! arrays, followed by a `report` object. Objects are written as the walk
//! proceeds, so a leaf stays open until `close_node` to let an `error`
//! field join it.

use std::io::{self, Write};

use serde::Serialize;

use crate::ids::IdNames;
use crate::metadata::prot;
use crate::tree::Entry;

use super::config::OutputConfig;
use super::{Indent, Renderer, Totals, json_io, write_spaces};

#[derive(Serialize)]
struct Report {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    directories: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<usize>,
}

pub struct JsonRenderer<W: Write> {
    config: OutputConfig,
    out: W,
    ids: IdNames,
    now: i64,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self {
            config,
            out,
            ids: IdNames::new(),
            now: chrono::Local::now().timestamp(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn newline(&mut self) -> io::Result<()> {
        if self.config.no_indent {
            return Ok(());
        }
        writeln!(self.out)
    }

    fn indent(&mut self, depth: usize) -> io::Result<()> {
        if self.config.no_indent {
            return Ok(());
        }
        write_spaces(&mut self.out, 2 * (depth + 1))
    }

    /// Write `,"key":"value"` with the value escaped by serde_json.
    fn string_field(&mut self, key: &str, value: &str) -> io::Result<()> {
        write!(self.out, ",\"{}\":", key)?;
        serde_json::to_writer(&mut self.out, value).map_err(json_io)
    }

    fn write_metadata(&mut self, entry: &Entry) -> io::Result<()> {
        let meta = self.config.metadata.clone();
        if meta.inode {
            write!(self.out, ",\"inode\":{}", entry.inode)?;
        }
        if meta.device {
            write!(self.out, ",\"dev\":{}", entry.dev)?;
        }
        if meta.protections {
            write!(
                self.out,
                ",\"mode\":\"{:04o}\",\"prot\":\"{}\"",
                entry.mode & 0o7777,
                prot(entry.mode)
            )?;
        }
        if meta.user {
            let user = self.ids.user(entry.uid).to_string();
            self.string_field("user", &user)?;
        }
        if meta.group {
            let group = self.ids.group(entry.gid).to_string();
            self.string_field("group", &group)?;
        }
        if meta.size {
            if meta.scaled_sizes() {
                let size = meta.format_size(entry.size);
                self.string_field("size", size.trim_start())?;
            } else {
                write!(self.out, ",\"size\":{}", entry.size)?;
            }
        }
        if meta.date {
            let date = meta.format_date(entry, self.now);
            self.string_field("time", &date)?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn intro(&mut self) -> io::Result<()> {
        write!(self.out, "[")?;
        self.newline()
    }

    fn info_prefix(&mut self, entry: Option<&Entry>, depth: usize, _indent: &Indent) -> io::Result<()> {
        self.indent(depth)?;
        let kind = entry.map_or("unknown", |e| e.kind().type_name());
        write!(self.out, "{{\"type\":\"{}\"", kind)
    }

    fn body(&mut self, _dir: Option<&str>, name: &str, entry: Option<&Entry>, descend: bool) -> io::Result<bool> {
        self.string_field("name", name)?;
        if let Some(entry) = entry {
            if let Some(lines) = &entry.comment {
                self.string_field("info", &lines.join("\n"))?;
            }
            if let Some(target) = &entry.link {
                self.string_field("target", target)?;
            }
            self.write_metadata(entry)?;
        }
        if descend {
            write!(self.out, ",\"contents\":[")?;
        }
        Ok(true)
    }

    fn error_note(&mut self, text: &str) -> io::Result<()> {
        self.string_field("error", text)
    }

    fn line_break(
        &mut self,
        _entry: Option<&Entry>,
        _depth: usize,
        _post_dir: bool,
        _needs_comma: bool,
        _indent: &Indent,
    ) -> io::Result<()> {
        self.newline()
    }

    fn close_node(&mut self, _entry: Option<&Entry>, depth: Option<usize>, needs_comma: bool) -> io::Result<()> {
        match depth {
            Some(depth) => {
                self.indent(depth)?;
                write!(self.out, "]}}")?;
            }
            None => write!(self.out, "}}")?,
        }
        if needs_comma {
            write!(self.out, ",")?;
        }
        self.newline()
    }

    fn report(&mut self, totals: &Totals) -> io::Result<()> {
        write!(self.out, ",")?;
        if !self.config.no_indent {
            write!(self.out, "\n  ")?;
        }
        let report = Report {
            kind: "report",
            size: self.config.du.then_some(totals.size),
            directories: totals.dirs,
            files: (!self.config.dirs_only).then_some(totals.files),
        };
        serde_json::to_writer(&mut self.out, &report).map_err(json_io)
    }

    fn outro(&mut self) -> io::Result<()> {
        self.newline()?;
        writeln!(self.out, "]")?;
        self.out.flush()
    }
}
