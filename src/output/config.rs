//! Output configuration types

use std::env;

use crate::metadata::MetadataConfig;

const DEFAULT_TITLE: &str = "Directory Tree";

/// Which renderer to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Html,
    Xml,
    Json,
}

/// Strings used to draw the tree rails and annotation markers.
#[derive(Debug, PartialEq, Eq)]
pub struct LineDraw {
    pub vert: &'static str,
    pub vert_left: &'static str,
    pub corner: &'static str,
    pub copy: &'static str,
    pub ctop: &'static str,
    pub cbot: &'static str,
    pub cmid: &'static str,
    pub cext: &'static str,
    pub csingle: &'static str,
}

pub static UTF8_LINES: LineDraw = LineDraw {
    vert: "\u{2502}  ",
    vert_left: "\u{251c}\u{2500}\u{2500}",
    corner: "\u{2514}\u{2500}\u{2500}",
    copy: "\u{a9}",
    ctop: " \u{23a7} ",
    cbot: " \u{23a9} ",
    cmid: " \u{23a8} ",
    cext: " \u{23aa} ",
    csingle: " { ",
};

pub static ASCII_LINES: LineDraw = LineDraw {
    vert: "|  ",
    vert_left: "|--",
    corner: "`--",
    copy: "(c)",
    ctop: " [ ",
    cbot: " [ ",
    cmid: " [ ",
    cext: " [ ",
    csingle: " [ ",
};

impl LineDraw {
    /// Line set for a charset name; anything but UTF-8 falls back to ASCII.
    pub fn for_charset(charset: Option<&str>) -> &'static LineDraw {
        match charset {
            Some(name) if is_utf8_name(name) => &UTF8_LINES,
            _ => &ASCII_LINES,
        }
    }
}

fn is_utf8_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("utf-8") || lower.contains("utf8")
}

/// Charset from `TREE_CHARSET`, or UTF-8 when the locale says so.
pub fn charset_from_env() -> Option<String> {
    if let Ok(charset) = env::var("TREE_CHARSET") {
        if !charset.is_empty() {
            return Some(charset);
        }
    }
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.is_empty())
        .filter(|value| is_utf8_name(value))
        .map(|_| "UTF-8".to_string())
}

/// How entry names are escaped in plain output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameStyle {
    /// Print names as-is (`-N`)
    pub raw: bool,
    /// Wrap names in double quotes (`-Q`)
    pub quote: bool,
    /// Replace non-printable characters with `?` (`-q`)
    pub question: bool,
}

/// HTML document settings.
#[derive(Debug, Clone)]
pub struct HtmlConfig {
    /// Base URL prefixed to every link (`-H`)
    pub base: String,
    pub title: String,
    /// Emit `href` attributes (disabled by `--nolinks`)
    pub links: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            base: ".".to_string(),
            title: DEFAULT_TITLE.to_string(),
            links: true,
        }
    }
}

/// Configuration for output formatting.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub use_color: bool,
    /// Metadata display configuration
    pub metadata: MetadataConfig,
    pub lines: &'static LineDraw,
    /// Charset name announced in HTML and XML headers
    pub charset: Option<String>,
    /// VT100 line drawing (`-A`)
    pub ansi_lines: bool,
    /// No indentation lines (`-i`)
    pub no_indent: bool,
    /// Print metadata before the indentation (`--metafirst`)
    pub meta_first: bool,
    /// Append a type character to names (`-F`)
    pub classify: bool,
    pub dirs_only: bool,
    pub du: bool,
    pub names: NameStyle,
    pub html: HtmlConfig,
}

impl OutputConfig {
    /// Sizes in the report and metadata use unit suffixes.
    pub fn scaled_sizes(&self) -> bool {
        self.metadata.scaled_sizes()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Plain,
            use_color: false,
            metadata: MetadataConfig::default(),
            lines: &ASCII_LINES,
            charset: None,
            ansi_lines: false,
            no_indent: false,
            meta_first: false,
            classify: false,
            dirs_only: false,
            du: false,
            names: NameStyle::default(),
            html: HtmlConfig::default(),
        }
    }
}
