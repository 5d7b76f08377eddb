//! Plain text renderer with box-drawing rails.

use std::io;

use termcolor::WriteColor;

use crate::ids::IdNames;
use crate::tree::Entry;

use super::config::OutputConfig;
use super::utils::{
    IndentStyle, color_spec, comment_marker, escape_name, report_text, type_suffix, write_indent,
};
use super::{Indent, Renderer, Totals, write_spaces};

pub struct PlainRenderer<W: WriteColor> {
    config: OutputConfig,
    out: W,
    ids: IdNames,
    now: i64,
    /// Width of the last metadata column plus its separator
    info_width: usize,
}

impl<W: WriteColor> PlainRenderer<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self {
            config,
            out,
            ids: IdNames::new(),
            now: chrono::Local::now().timestamp(),
            info_width: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn indent_style(&self) -> IndentStyle {
        if self.config.ansi_lines {
            IndentStyle::Ansi
        } else {
            IndentStyle::Plain
        }
    }

    fn write_indent(&mut self, indent: &Indent, depth: usize, rail: bool) -> io::Result<()> {
        let style = self.indent_style();
        write_indent(&mut self.out, indent, depth, self.config.lines, style, rail)
    }

    /// Print a name, colored by `mode` when colors are on.
    fn write_name(&mut self, name: &str, mode: Option<u32>, orphan: bool) -> io::Result<()> {
        let spec = match mode {
            Some(mode) if self.config.use_color => color_spec(mode, orphan),
            _ => None,
        };
        if let Some(spec) = &spec {
            self.out.set_color(spec)?;
        }
        write!(self.out, "{}", escape_name(name, self.config.names))?;
        if spec.is_some() {
            self.out.reset()?;
        }
        Ok(())
    }

    fn write_suffix(&mut self, mode: u32) -> io::Result<()> {
        if !self.config.classify {
            return Ok(());
        }
        match type_suffix(mode, self.config.dirs_only) {
            Some(c) => write!(self.out, "{}", c),
            None => Ok(()),
        }
    }
}

impl<W: WriteColor> Renderer for PlainRenderer<W> {
    fn intro(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn info_prefix(&mut self, entry: Option<&Entry>, depth: usize, indent: &Indent) -> io::Result<()> {
        let info = match entry {
            Some(entry) => self.config.metadata.fill_info(entry, &mut self.ids, self.now),
            None => String::new(),
        };
        self.info_width = if info.is_empty() {
            0
        } else {
            info.chars().count() + 2
        };

        if self.config.meta_first {
            if !info.is_empty() {
                write!(self.out, "{}  ", info)?;
            }
            if !self.config.no_indent {
                self.write_indent(indent, depth, false)?;
            }
        } else {
            if !self.config.no_indent {
                self.write_indent(indent, depth, false)?;
            }
            if !info.is_empty() {
                write!(self.out, "{}  ", info)?;
            }
        }
        Ok(())
    }

    fn body(&mut self, _dir: Option<&str>, name: &str, entry: Option<&Entry>, _descend: bool) -> io::Result<bool> {
        let Some(entry) = entry else {
            self.write_name(name, None, false)?;
            return Ok(false);
        };

        self.write_name(name, Some(entry.mode), entry.orphan)?;
        match &entry.link {
            None => self.write_suffix(entry.mode)?,
            Some(target) => {
                let link_mode = entry.link_mode.unwrap_or(0);
                write!(self.out, " -> ")?;
                self.write_name(target, Some(link_mode), entry.orphan)?;
                self.write_suffix(link_mode)?;
            }
        }
        Ok(false)
    }

    fn error_note(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "  [{}]", text)
    }

    fn line_break(
        &mut self,
        entry: Option<&Entry>,
        depth: usize,
        _post_dir: bool,
        _needs_comma: bool,
        indent: &Indent,
    ) -> io::Result<()> {
        writeln!(self.out)?;
        let Some(lines) = entry.and_then(|e| e.comment.as_deref()) else {
            return Ok(());
        };
        for (i, text) in lines.iter().enumerate() {
            if self.config.meta_first {
                write_spaces(&mut self.out, self.info_width)?;
            }
            if !self.config.no_indent {
                self.write_indent(indent, depth, true)?;
            }
            let marker = comment_marker(self.config.lines, i, lines.len());
            writeln!(self.out, "{} {}", marker, text)?;
        }
        Ok(())
    }

    fn close_node(&mut self, _entry: Option<&Entry>, _depth: Option<usize>, _needs_comma: bool) -> io::Result<()> {
        Ok(())
    }

    fn report(&mut self, totals: &Totals) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", report_text(totals, &self.config))
    }

    fn outro(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
