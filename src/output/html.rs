//! HTML document renderer.
//!
//! Every entry becomes an `<a>` element; with a base URL each one links to
//! its path below that base. Descended directories wrap their contents in a
//! `<div>`.

use std::io::{self, Write};

use crate::ids::IdNames;
use crate::tree::Entry;

use super::config::OutputConfig;
use super::utils::{IndentStyle, css_class, entity_encode, html_lines, report_text, url_encode, write_indent};
use super::{Indent, Renderer, Totals};

const STYLE: &str = r#" <style type="text/css">
  BODY { font-family : monospace, sans-serif;  color: black;}
  P { font-family : monospace, sans-serif; color: black; margin:0px; padding: 0px;}
  A:visited { text-decoration : none; margin : 0px; padding : 0px;}
  A:link    { text-decoration : none; margin : 0px; padding : 0px;}
  A:hover   { text-decoration: underline; background-color : yellow; margin : 0px; padding : 0px;}
  A:active  { margin : 0px; padding : 0px;}
  .VERSION { font-size: small; font-family : arial, sans-serif; }
  .NORM  { color: black;  }
  .FIFO  { color: purple; }
  .CHAR  { color: yellow; }
  .DIR   { color: blue;   }
  .BLOCK { color: yellow; }
  .LINK  { color: aqua;   }
  .SOCK  { color: fuchsia;}
  .EXEC  { color: green;  }
 </style>
"#;

pub struct HtmlRenderer<W: Write> {
    config: OutputConfig,
    out: W,
    ids: IdNames,
    now: i64,
    /// Length of the current root path, stripped from link targets
    root_len: usize,
}

impl<W: Write> HtmlRenderer<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self {
            config,
            out,
            ids: IdNames::new(),
            now: chrono::Local::now().timestamp(),
            root_len: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_info(&mut self, info: &str) -> io::Result<()> {
        if info.is_empty() {
            return Ok(());
        }
        write!(self.out, "{}", html_lines(info))?;
        write!(self.out, "{}", "&nbsp;".repeat(4))
    }

    fn write_href(&mut self, dir: Option<&str>, name: &str, entry: &Entry) -> io::Result<()> {
        let base = &self.config.html.base;
        match dir {
            None => {
                self.root_len = name.len();
                write!(self.out, " href=\"{}\"", base)
            }
            Some(dir) => {
                let rel = if dir.len() >= self.root_len {
                    dir.get(self.root_len..).unwrap_or(dir)
                } else {
                    dir
                };
                write!(
                    self.out,
                    " href=\"{}{}/{}{}\"",
                    base,
                    url_encode(rel),
                    url_encode(name),
                    if entry.is_dir { "/" } else { "" }
                )
            }
        }
    }
}

impl<W: Write> Renderer for HtmlRenderer<W> {
    fn intro(&mut self) -> io::Result<()> {
        let title = entity_encode(&self.config.html.title);
        let charset = self.config.charset.as_deref().unwrap_or("UTF-8");
        writeln!(self.out, "<!DOCTYPE html>")?;
        writeln!(self.out, "<html>")?;
        writeln!(self.out, "<head>")?;
        writeln!(
            self.out,
            " <meta http-equiv=\"Content-Type\" content=\"text/html; charset={}\">",
            charset
        )?;
        writeln!(self.out, " <meta name=\"Author\" content=\"Made by 'canopy'\">")?;
        writeln!(
            self.out,
            " <meta name=\"GENERATOR\" content=\"canopy v{}\">",
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(self.out, " <title>{}</title>", title)?;
        write!(self.out, "{}", STYLE)?;
        writeln!(self.out, "</head>")?;
        writeln!(self.out, "<body>")?;
        writeln!(self.out, "\t<h1>{}</h1><p>", title)
    }

    fn info_prefix(&mut self, entry: Option<&Entry>, depth: usize, indent: &Indent) -> io::Result<()> {
        let info = match entry {
            Some(entry) => self.config.metadata.fill_info(entry, &mut self.ids, self.now),
            None => String::new(),
        };
        let lines = self.config.lines;
        if self.config.meta_first {
            self.write_info(&info)?;
            if !self.config.no_indent {
                write_indent(&mut self.out, indent, depth, lines, IndentStyle::Html, false)?;
            }
        } else {
            if !self.config.no_indent {
                write_indent(&mut self.out, indent, depth, lines, IndentStyle::Html, false)?;
            }
            self.write_info(&info)?;
        }
        Ok(())
    }

    fn body(&mut self, dir: Option<&str>, name: &str, entry: Option<&Entry>, descend: bool) -> io::Result<bool> {
        write!(self.out, "<a")?;
        if let Some(entry) = entry {
            if self.config.use_color {
                write!(self.out, " class=\"{}\"", css_class(entry))?;
            }
            if let Some(lines) = &entry.comment {
                write!(self.out, " title=\"{}\"", entity_encode(&lines.join("\n")))?;
            }
            if self.config.html.links {
                self.write_href(dir, name, entry)?;
            }
        }
        let text = match dir {
            Some(_) => entity_encode(name),
            None => entity_encode(&self.config.html.base),
        };
        write!(self.out, ">{}</a>", text)?;
        Ok(descend)
    }

    fn error_note(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "  [{}]", entity_encode(text))
    }

    fn line_break(
        &mut self,
        _entry: Option<&Entry>,
        _depth: usize,
        post_dir: bool,
        _needs_comma: bool,
        _indent: &Indent,
    ) -> io::Result<()> {
        writeln!(self.out, "<br>")?;
        if post_dir {
            writeln!(self.out, "\t<div>")?;
        }
        Ok(())
    }

    fn close_node(&mut self, _entry: Option<&Entry>, _depth: Option<usize>, _needs_comma: bool) -> io::Result<()> {
        writeln!(self.out, "\t</div>")
    }

    fn report(&mut self, totals: &Totals) -> io::Result<()> {
        write!(self.out, "<br><br><p>\n\n")?;
        writeln!(self.out, "{}", report_text(totals, &self.config))?;
        write!(self.out, "\n</p>\n")
    }

    fn outro(&mut self) -> io::Result<()> {
        writeln!(self.out, "\t<hr>")?;
        writeln!(self.out, "\t<p class=\"VERSION\">")?;
        writeln!(self.out, "\t\tcanopy v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.out, "\t</p>")?;
        writeln!(self.out, "</body>")?;
        writeln!(self.out, "</html>")?;
        self.out.flush()
    }
}
