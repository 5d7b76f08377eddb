//! XML renderer.

use std::io::{self, Write};

use crate::ids::IdNames;
use crate::metadata::prot;
use crate::tree::Entry;

use super::config::OutputConfig;
use super::utils::{entity_encode, size_text};
use super::{Indent, Renderer, Totals, write_spaces};

pub struct XmlRenderer<W: Write> {
    config: OutputConfig,
    out: W,
    ids: IdNames,
    now: i64,
}

fn tag(entry: Option<&Entry>) -> &'static str {
    entry.map_or("unknown", |e| e.kind().type_name())
}

impl<W: Write> XmlRenderer<W> {
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

    fn write_attributes(&mut self, entry: &Entry) -> io::Result<()> {
        let meta = &self.config.metadata;
        if meta.inode {
            write!(self.out, " inode=\"{}\"", entry.inode)?;
        }
        if meta.device {
            write!(self.out, " dev=\"{}\"", entry.dev)?;
        }
        if meta.protections {
            write!(
                self.out,
                " mode=\"{:04o}\" prot=\"{}\"",
                entry.mode & 0o7777,
                prot(entry.mode)
            )?;
        }
        if meta.user {
            let user = entity_encode(self.ids.user(entry.uid));
            write!(self.out, " user=\"{}\"", user)?;
        }
        if meta.group {
            let group = entity_encode(self.ids.group(entry.gid));
            write!(self.out, " group=\"{}\"", group)?;
        }
        if meta.size {
            write!(self.out, " size=\"{}\"", size_text(&self.config, entry.size))?;
        }
        if meta.date {
            let date = entity_encode(&meta.format_date(entry, self.now));
            write!(self.out, " time=\"{}\"", date)?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for XmlRenderer<W> {
    fn intro(&mut self) -> io::Result<()> {
        write!(self.out, "<?xml version=\"1.0\"")?;
        if let Some(charset) = &self.config.charset {
            write!(self.out, " encoding=\"{}\"", entity_encode(charset))?;
        }
        write!(self.out, "?>")?;
        self.newline()?;
        write!(self.out, "<tree>")?;
        self.newline()
    }

    fn info_prefix(&mut self, entry: Option<&Entry>, depth: usize, _indent: &Indent) -> io::Result<()> {
        self.indent(depth)?;
        write!(self.out, "<{}", tag(entry))
    }

    fn body(&mut self, _dir: Option<&str>, name: &str, entry: Option<&Entry>, _descend: bool) -> io::Result<bool> {
        write!(self.out, " name=\"{}\"", entity_encode(name))?;
        if let Some(entry) = entry {
            if let Some(target) = &entry.link {
                write!(self.out, " target=\"{}\"", entity_encode(target))?;
            }
            self.write_attributes(entry)?;
        }
        write!(self.out, ">")?;
        if let Some(lines) = entry.and_then(|e| e.comment.as_deref()) {
            write!(self.out, "<info>{}</info>", entity_encode(&lines.join("\n")))?;
        }
        Ok(true)
    }

    fn error_note(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "<error>{}</error>", entity_encode(text))
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

    fn close_node(&mut self, entry: Option<&Entry>, depth: Option<usize>, _needs_comma: bool) -> io::Result<()> {
        if let Some(depth) = depth {
            self.indent(depth)?;
        }
        write!(self.out, "</{}>", tag(entry))?;
        self.newline()
    }

    fn report(&mut self, totals: &Totals) -> io::Result<()> {
        self.indent(0)?;
        write!(self.out, "<report>")?;
        self.newline()?;
        if self.config.du {
            self.indent(1)?;
            write!(self.out, "<size>{}</size>", totals.size)?;
            self.newline()?;
        }
        self.indent(1)?;
        write!(self.out, "<directories>{}</directories>", totals.dirs)?;
        self.newline()?;
        if !self.config.dirs_only {
            self.indent(1)?;
            write!(self.out, "<files>{}</files>", totals.files)?;
            self.newline()?;
        }
        self.indent(0)?;
        write!(self.out, "</report>")?;
        self.newline()
    }

    fn outro(&mut self) -> io::Result<()> {
        writeln!(self.out, "</tree>")?;
        self.out.flush()
    }
}
