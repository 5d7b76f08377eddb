//! Shared utility functions for output formatting

use std::fmt::Write as _;
use std::io::{self, Write};

use termcolor::{Color, ColorSpec};

use crate::tree::{Entry, FileKind};

use super::config::{LineDraw, NameStyle, OutputConfig};
use super::{Branch, Indent, Totals};

const ANSI_LINES_ON: &str = "\x1b(0";
const ANSI_LINES_OFF: &str = "\x1b(B";
const HTML_SPACE: &str = "&nbsp;";

/// How the indentation rails are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Plain,
    /// VT100 alternate character set
    Ansi,
    Html,
}

/// Write the rails for an entry at `depth`.
///
/// With `rail` set, the column at `depth` is drawn as if a deeper level
/// followed, which is how annotation lines hang under their entry.
pub fn write_indent<W: Write + ?Sized>(
    out: &mut W,
    indent: &Indent,
    depth: usize,
    lines: &LineDraw,
    style: IndentStyle,
    rail: bool,
) -> io::Result<()> {
    let any = indent.get(1) != Branch::Empty;
    match style {
        IndentStyle::Ansi if any => out.write_all(ANSI_LINES_ON.as_bytes())?,
        IndentStyle::Html => out.write_all(b"\t")?,
        _ => {}
    }

    for i in 1..=depth {
        let here = indent.get(i);
        if here == Branch::Empty {
            break;
        }
        let continues = indent.get(i + 1) != Branch::Empty || (rail && i == depth);
        match style {
            IndentStyle::Ansi => {
                let piece = match (continues, here) {
                    (true, Branch::More) => "\x78   ",
                    (true, _) => "    ",
                    (false, Branch::More) => "\x74\x71\x71 ",
                    (false, _) => "\x6d\x71\x71 ",
                };
                out.write_all(piece.as_bytes())?;
            }
            IndentStyle::Plain => {
                let piece = match (continues, here) {
                    (true, Branch::More) => lines.vert,
                    (true, _) => "   ",
                    (false, Branch::More) => lines.vert_left,
                    (false, _) => lines.corner,
                };
                write!(out, "{} ", piece)?;
            }
            IndentStyle::Html => {
                let piece = match (continues, here) {
                    (true, Branch::More) => html_lines(lines.vert),
                    (true, _) => HTML_SPACE.repeat(3),
                    (false, Branch::More) => html_lines(lines.vert_left),
                    (false, _) => html_lines(lines.corner),
                };
                write!(out, "{} ", piece)?;
            }
        }
    }

    if style == IndentStyle::Ansi && any {
        out.write_all(ANSI_LINES_OFF.as_bytes())?;
    }
    Ok(())
}

/// Line drawing text made safe for HTML: spaces become `&nbsp;` and
/// non-ASCII characters become numeric references.
pub fn html_lines(s: &str) -> String {
    let mut out = String::with_capacity(s.len() * 2);
    for c in s.chars() {
        match c {
            ' ' => out.push_str(HTML_SPACE),
            c if c.is_ascii() => out.push(c),
            c => {
                let _ = write!(out, "&#{};", c as u32);
            }
        }
    }
    out
}

/// Marker printed in front of annotation line `line` of `count`.
pub fn comment_marker(lines: &LineDraw, line: usize, count: usize) -> &'static str {
    if count == 1 {
        lines.csingle
    } else if line == 0 {
        lines.ctop
    } else if line < 2 {
        lines.cmid
    } else if line == count - 1 {
        lines.cbot
    } else {
        lines.cext
    }
}

/// Escape a name for plain output.
///
/// Non-printable characters become `?` with `-q`, otherwise a backslash
/// octal escape per UTF-8 byte. `-N` bypasses all escaping.
pub fn escape_name(name: &str, style: NameStyle) -> String {
    if style.raw {
        return if style.quote {
            format!("\"{}\"", name)
        } else {
            name.to_string()
        };
    }

    let mut out = String::with_capacity(name.len() + 2);
    if style.quote {
        out.push('"');
    }
    for c in name.chars() {
        if style.quote && (c == '"' || c == '\\') {
            out.push('\\');
            out.push(c);
        } else if !c.is_control() {
            out.push(c);
        } else if style.question {
            out.push('?');
        } else {
            let mut buf = [0u8; 4];
            for b in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    if style.quote {
        out.push('"');
    }
    out
}

/// Percent-encode a path for an `href` attribute.
pub fn url_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b' ' | b'"' | b'#' | b'%' | b'<' | b'>' | b'[' | b']' | b'^' | b'\\' | b'?' | b'+' => {
                let _ = write!(out, "%{:02X}", b);
            }
            b'&' => out.push_str("&amp;"),
            0x21..=0x7e => out.push(b as char),
            _ => {
                let _ = write!(out, "%{:02X}", b);
            }
        }
    }
    out
}

/// Replace the characters HTML and XML treat as markup with entities.
pub fn entity_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            // XML 1.0 has no representation for the other C0 controls
            c if c < ' ' && !matches!(c, '\t' | '\n' | '\r') => out.push('?'),
            c => out.push(c),
        }
    }
    out
}

/// Type character appended by `-F`.
pub fn type_suffix(mode: u32, dirs_only: bool) -> Option<char> {
    match FileKind::from_mode(mode) {
        FileKind::Directory if !dirs_only => Some('/'),
        FileKind::Socket => Some('='),
        FileKind::Fifo => Some('|'),
        FileKind::Link => Some('@'),
        FileKind::File if mode & 0o111 != 0 => Some('*'),
        _ => None,
    }
}

/// Color for a name of the given mode; `None` leaves it uncolored.
pub fn color_spec(mode: u32, orphan: bool) -> Option<ColorSpec> {
    let mut spec = ColorSpec::new();
    if orphan {
        spec.set_fg(Some(Color::Red)).set_bold(true);
        return Some(spec);
    }
    match FileKind::from_mode(mode) {
        FileKind::Directory => spec.set_fg(Some(Color::Blue)).set_bold(true),
        FileKind::Link => spec.set_fg(Some(Color::Cyan)).set_bold(true),
        FileKind::Fifo => spec.set_fg(Some(Color::Yellow)),
        FileKind::Socket => spec.set_fg(Some(Color::Magenta)).set_bold(true),
        FileKind::Char | FileKind::Block => spec.set_fg(Some(Color::Yellow)).set_bold(true),
        FileKind::File if mode & 0o111 != 0 => spec.set_fg(Some(Color::Green)).set_bold(true),
        _ => return None,
    };
    Some(spec)
}

/// CSS class used by HTML output with `-C`.
pub fn css_class(entry: &Entry) -> &'static str {
    if entry.is_dir {
        "DIR"
    } else if entry.is_exec {
        "EXEC"
    } else if entry.is_fifo {
        "FIFO"
    } else if entry.is_socket {
        "SOCK"
    } else {
        "NORM"
    }
}

/// The `N directories, M files` summary, prefixed by the total size under
/// `--du`. Carries no trailing newline.
pub fn report_text(totals: &Totals, config: &OutputConfig) -> String {
    let mut text = String::new();
    if config.du {
        text.push_str(&config.metadata.format_size(totals.size));
        if !config.scaled_sizes() {
            text.push_str(" bytes");
        }
        text.push_str(" used in ");
    }
    let _ = write!(
        text,
        "{} director{}",
        totals.dirs,
        if totals.dirs == 1 { "y" } else { "ies" }
    );
    if !config.dirs_only {
        let _ = write!(
            text,
            ", {} file{}",
            totals.files,
            if totals.files == 1 { "" } else { "s" }
        );
    }
    text
}

/// Size as a JSON or XML value: the byte count, or the scaled text
/// without its padding.
pub fn size_text(config: &OutputConfig, size: u64) -> String {
    if config.scaled_sizes() {
        config.metadata.format_size(size).trim_start().to_string()
    } else {
        size.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::config::{ASCII_LINES, UTF8_LINES};

    fn render_indent(indent: &Indent, depth: usize, style: IndentStyle, rail: bool) -> String {
        let mut buf = Vec::new();
        write_indent(&mut buf, indent, depth, &UTF8_LINES, style, rail).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_indent_branches() {
        let mut indent = Indent::default();
        indent.set(1, Branch::More);
        assert_eq!(render_indent(&indent, 1, IndentStyle::Plain, false), "├── ");
        indent.set(1, Branch::Last);
        assert_eq!(render_indent(&indent, 1, IndentStyle::Plain, false), "└── ");
        indent.set(2, Branch::More);
        assert_eq!(render_indent(&indent, 2, IndentStyle::Plain, false), "    ├── ");
        indent.set(1, Branch::More);
        assert_eq!(render_indent(&indent, 2, IndentStyle::Plain, false), "│   ├── ");
    }

    #[test]
    fn test_indent_rail_for_annotations() {
        let mut indent = Indent::default();
        indent.set(1, Branch::More);
        assert_eq!(render_indent(&indent, 1, IndentStyle::Plain, true), "│   ");
        indent.set(1, Branch::Last);
        assert_eq!(render_indent(&indent, 1, IndentStyle::Plain, true), "    ");
    }

    #[test]
    fn test_indent_root_is_empty() {
        let indent = Indent::default();
        assert_eq!(render_indent(&indent, 0, IndentStyle::Plain, false), "");
        assert_eq!(render_indent(&indent, 0, IndentStyle::Ansi, false), "");
    }

    #[test]
    fn test_indent_ansi_and_html() {
        let mut indent = Indent::default();
        indent.set(1, Branch::Last);
        assert_eq!(
            render_indent(&indent, 1, IndentStyle::Ansi, false),
            "\x1b(0\x6d\x71\x71 \x1b(B"
        );
        assert_eq!(
            render_indent(&indent, 1, IndentStyle::Html, false),
            "\t&#9492;&#9472;&#9472; "
        );
    }

    #[test]
    fn test_comment_markers() {
        assert_eq!(comment_marker(&UTF8_LINES, 0, 1), " { ");
        assert_eq!(comment_marker(&UTF8_LINES, 0, 3), " ⎧ ");
        assert_eq!(comment_marker(&UTF8_LINES, 1, 3), " ⎨ ");
        assert_eq!(comment_marker(&UTF8_LINES, 2, 3), " ⎩ ");
        assert_eq!(comment_marker(&UTF8_LINES, 2, 4), " ⎪ ");
        assert_eq!(comment_marker(&ASCII_LINES, 1, 2), " [ ");
    }

    #[test]
    fn test_escape_name() {
        let plain = NameStyle::default();
        assert_eq!(escape_name("a\tb", plain), "a\\011b");
        assert_eq!(escape_name("é", plain), "é");
        let question = NameStyle {
            question: true,
            ..Default::default()
        };
        assert_eq!(escape_name("a\nb", question), "a?b");
        let quoted = NameStyle {
            quote: true,
            ..Default::default()
        };
        assert_eq!(escape_name("say \"hi\"", quoted), "\"say \\\"hi\\\"\"");
        let raw = NameStyle {
            raw: true,
            ..Default::default()
        };
        assert_eq!(escape_name("a\tb", raw), "a\tb");
    }

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("my dir/a+b.txt"), "my%20dir/a%2Bb.txt");
        assert_eq!(url_encode("R&D"), "R&amp;D");
        assert_eq!(url_encode("é"), "%C3%A9");
    }

    #[test]
    fn test_entity_encode() {
        assert_eq!(entity_encode("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn test_entity_encode_replaces_control_characters() {
        assert_eq!(entity_encode("a\u{1}b\u{1b}c"), "a?b?c");
        assert_eq!(entity_encode("tab\there\r\n"), "tab\there\r\n");
    }

    #[test]
    fn test_type_suffix() {
        assert_eq!(type_suffix(0o040755, false), Some('/'));
        assert_eq!(type_suffix(0o040755, true), None);
        assert_eq!(type_suffix(0o100755, false), Some('*'));
        assert_eq!(type_suffix(0o100644, false), None);
        assert_eq!(type_suffix(0o010644, false), Some('|'));
        assert_eq!(type_suffix(0o140755, false), Some('='));
    }

    #[test]
    fn test_color_spec() {
        assert!(color_spec(0o100644, false).is_none());
        let dir = color_spec(0o040755, false).unwrap();
        assert_eq!(dir.fg(), Some(&Color::Blue));
        let orphan = color_spec(0o120777, true).unwrap();
        assert_eq!(orphan.fg(), Some(&Color::Red));
    }

    #[test]
    fn test_report_text() {
        let totals = Totals {
            dirs: 1,
            files: 2,
            size: 30,
        };
        let mut config = OutputConfig::default();
        assert_eq!(report_text(&totals, &config), "1 directory, 2 files");
        config.du = true;
        assert!(report_text(&totals, &config).ends_with("30 bytes used in 1 directory, 2 files"));
        config.dirs_only = true;
        config.metadata.human = true;
        assert_eq!(report_text(&totals, &config), "   30 used in 1 directory");
    }

    #[test]
    fn test_size_text() {
        let mut config = OutputConfig::default();
        assert_eq!(size_text(&config, 2048), "2048");
        config.metadata.human = true;
        assert_eq!(size_text(&config, 2048), "2.0K");
    }
}
