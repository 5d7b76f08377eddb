//! CLI entry point for canopy

use std::fs::File;
use std::io::{BufWriter, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use termcolor::{Ansi, BufferedStandardStream, ColorChoice, NoColor, WriteColor};
use tracing::debug;

use canopy::error::{CanopyError, Result};
use canopy::output::{HtmlConfig, LineDraw, NameStyle, charset_from_env};
use canopy::tree::{Partition, STDIN_SOURCE};
use canopy::{
    MetadataConfig, OutputConfig, OutputFormat, Pattern, SortKey, SortOrder, TreeWalker,
    WalkerConfig, git, logging, renderer_for, validate_time_format,
};

/// Entry skipped while listing so an HTML page never lists itself.
const HTML_INDEX_NAME: &str = "00Tree.html";

/// Color output mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
///
/// `to_terminal` is false when the listing goes to a file.
fn should_use_color(mode: ColorMode, to_terminal: bool) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            to_terminal
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(about = "List directory contents as a tree")]
#[command(version)]
#[command(disable_help_flag = true)]
struct Args {
    /// Directories to list (path lists with --fromfile)
    roots: Vec<String>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    // Listing options
    /// Show hidden files
    #[arg(short = 'a')]
    all: bool,

    /// List directories only
    #[arg(short = 'd')]
    dirs_only: bool,

    /// Follow symbolic links to directories
    #[arg(short = 'l')]
    follow_links: bool,

    /// Print the full path prefix for each entry
    #[arg(short = 'f')]
    full_path: bool,

    /// Stay on the current filesystem
    #[arg(short = 'x')]
    one_filesystem: bool,

    /// Descend only LEVEL directories deep
    #[arg(short = 'L', value_name = "LEVEL", value_parser = clap::value_parser!(u32).range(1..))]
    level: Option<u32>,

    /// List only non-directories matching PATTERN (repeatable)
    #[arg(short = 'P', value_name = "PATTERN")]
    include: Vec<String>,

    /// Do not list entries matching PATTERN (repeatable)
    #[arg(short = 'I', value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Filter with .gitignore files and the repository exclude file
    #[arg(long = "gitignore")]
    gitignore: bool,

    /// Ignore case when matching patterns
    #[arg(long = "ignore-case")]
    ignore_case: bool,

    /// Let -P select whole directories
    #[arg(long = "matchdirs")]
    match_dirs: bool,

    /// Print metadata before the indentation lines
    #[arg(long = "metafirst")]
    meta_first: bool,

    /// Show annotations from .info files
    #[arg(long = "info")]
    info: bool,

    /// Omit the file and directory report
    #[arg(long = "noreport")]
    no_report: bool,

    /// Character set for line drawing and document headers
    #[arg(long = "charset", value_name = "CHARSET")]
    charset: Option<String>,

    /// Do not descend into directories with more than N entries
    #[arg(long = "filelimit", value_name = "N")]
    file_limit: Option<usize>,

    /// Write the listing to FILE
    #[arg(short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Treat roots as lists of paths (stdin when none are given)
    #[arg(long = "fromfile")]
    from_file: bool,

    /// Drop empty directories from the output
    #[arg(long = "prune")]
    prune: bool,

    // File options
    /// Print non-printable characters as '?'
    #[arg(short = 'q')]
    question: bool,

    /// Print non-printable characters as is
    #[arg(short = 'N')]
    raw: bool,

    /// Quote file names
    #[arg(short = 'Q')]
    quote: bool,

    /// Print protections
    #[arg(short = 'p')]
    protections: bool,

    /// Print the owner
    #[arg(short = 'u')]
    user: bool,

    /// Print the group
    #[arg(short = 'g')]
    group: bool,

    /// Print sizes in bytes
    #[arg(short = 's')]
    size: bool,

    /// Print sizes in a human readable format
    #[arg(short = 'h')]
    human: bool,

    /// Like -h but with powers of 1000
    #[arg(long = "si")]
    si: bool,

    /// Print directory sizes as the sum of their contents
    #[arg(long = "du")]
    du: bool,

    /// Print the modification date
    #[arg(short = 'D')]
    date: bool,

    /// Format dates with FORMAT (strftime syntax, implies -D)
    #[arg(long = "timefmt", value_name = "FORMAT")]
    time_format: Option<String>,

    /// Append '/', '=', '*' or '|' by file type
    #[arg(short = 'F')]
    classify: bool,

    /// Print inode numbers
    #[arg(long = "inodes")]
    inodes: bool,

    /// Print device numbers
    #[arg(long = "device")]
    device: bool,

    // Sorting options
    /// Sort by version
    #[arg(short = 'v')]
    version_sort: bool,

    /// Sort by modification time
    #[arg(short = 't')]
    mtime_sort: bool,

    /// Sort by status change time (and show it with -D)
    #[arg(short = 'c')]
    ctime_sort: bool,

    /// Leave entries unsorted
    #[arg(short = 'U')]
    unsorted: bool,

    /// Reverse the sort order
    #[arg(short = 'r')]
    reverse: bool,

    /// List directories before files
    #[arg(long = "dirsfirst", conflicts_with = "files_first")]
    dirs_first: bool,

    /// List files before directories
    #[arg(long = "filesfirst")]
    files_first: bool,

    /// Sort by KEY
    #[arg(long = "sort", value_name = "KEY", ignore_case = true)]
    sort: Option<SortKey>,

    // Graphics options
    /// No indentation lines
    #[arg(short = 'i')]
    no_indent: bool,

    /// ANSI line graphics
    #[arg(short = 'A')]
    ansi_lines: bool,

    /// Turn colorization off
    #[arg(short = 'n', conflicts_with = "force_color")]
    no_color: bool,

    /// Turn colorization on (CSS classes in HTML)
    #[arg(short = 'C')]
    force_color: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    // Output formats
    /// XML output
    #[arg(short = 'X', conflicts_with_all = ["json", "html_base"])]
    xml: bool,

    /// JSON output
    #[arg(short = 'J', conflicts_with = "html_base")]
    json: bool,

    /// HTML output with links under BASE
    #[arg(short = 'H', value_name = "BASE")]
    html_base: Option<String>,

    /// Title of the HTML page
    #[arg(short = 'T', value_name = "TITLE")]
    title: Option<String>,

    /// No hyperlinks in HTML output
    #[arg(long = "nolinks")]
    no_links: bool,

    /// Log level or directives (overridden by CANOPY_LOG)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = logging::DEFAULT_LEVEL)]
    log_level: String,
}

impl Args {
    fn format(&self) -> OutputFormat {
        if self.xml {
            OutputFormat::Xml
        } else if self.json {
            OutputFormat::Json
        } else if self.html_base.is_some() {
            OutputFormat::Html
        } else {
            OutputFormat::Plain
        }
    }

    /// `-n` and `-C` override `--color`.
    fn color_mode(&self) -> ColorMode {
        if self.no_color {
            ColorMode::Never
        } else if self.force_color {
            ColorMode::Always
        } else {
            self.color
        }
    }

    fn sort_order(&self) -> SortOrder {
        let key = if self.unsorted {
            None
        } else if let Some(key) = self.sort {
            Some(key)
        } else if self.ctime_sort {
            Some(SortKey::Ctime)
        } else if self.mtime_sort {
            Some(SortKey::Mtime)
        } else if self.version_sort {
            Some(SortKey::Version)
        } else {
            Some(SortKey::Name)
        };
        let partition = if self.dirs_first {
            Partition::DirsFirst
        } else if self.files_first {
            Partition::FilesFirst
        } else {
            Partition::None
        };
        SortOrder {
            key,
            reverse: self.reverse,
            partition,
        }
    }

    fn metadata(&self) -> MetadataConfig {
        MetadataConfig {
            inode: self.inodes,
            device: self.device,
            protections: self.protections,
            user: self.user,
            group: self.group,
            size: self.size || self.human || self.si || self.du,
            human: self.human,
            si: self.si,
            date: self.date || self.time_format.is_some(),
            ctime: self.ctime_sort,
            time_format: self.time_format.clone(),
        }
    }

    fn walker_config(&self) -> Result<WalkerConfig> {
        Ok(WalkerConfig {
            show_all: self.all,
            dirs_only: self.dirs_only,
            follow_links: self.follow_links,
            full_path: self.full_path,
            one_filesystem: self.one_filesystem,
            max_depth: self.level.map(|level| level as usize),
            include: compile_patterns(&self.include)?,
            exclude: compile_patterns(&self.exclude)?,
            gitignore: self.gitignore,
            ignore_case: self.ignore_case,
            match_dirs: self.match_dirs,
            annotations: self.info,
            file_limit: self.file_limit,
            sort: self.sort_order(),
            du: self.du,
            // Pruning a directories-only listing would leave nothing.
            prune: self.prune && !self.dirs_only,
            from_file: self.from_file,
            skip_name: self.html_base.as_ref().map(|_| HTML_INDEX_NAME.to_string()),
            no_report: self.no_report,
        })
    }

    fn output_config(&self, use_color: bool) -> OutputConfig {
        let charset = self.charset.clone().or_else(charset_from_env);
        let mut html = HtmlConfig {
            links: !self.no_links,
            ..Default::default()
        };
        if let Some(base) = &self.html_base {
            html.base = base.clone();
        }
        if let Some(title) = &self.title {
            html.title = title.clone();
        }
        OutputConfig {
            format: self.format(),
            use_color,
            metadata: self.metadata(),
            lines: LineDraw::for_charset(charset.as_deref()),
            charset,
            ansi_lines: self.ansi_lines,
            no_indent: self.no_indent,
            meta_first: self.meta_first,
            classify: self.classify,
            dirs_only: self.dirs_only,
            du: self.du,
            names: NameStyle {
                raw: self.raw,
                quote: self.quote,
                question: self.question,
            },
            html,
        }
    }

    fn roots(&self) -> Vec<String> {
        if self.roots.is_empty() {
            let default = if self.from_file { STDIN_SOURCE } else { "." };
            vec![default.to_string()]
        } else {
            self.roots.clone()
        }
    }
}

fn compile_patterns(texts: &[String]) -> Result<Vec<Pattern>> {
    texts
        .iter()
        .map(|text| {
            Pattern::new(text).map_err(|source| CanopyError::Pattern {
                pattern: text.clone(),
                source,
            })
        })
        .collect()
}

/// Open the destination, wrapped so colors are only written when wanted.
fn open_output(path: Option<&PathBuf>, ansi: bool) -> Result<Box<dyn WriteColor>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|source| CanopyError::Output {
                path: path.clone(),
                source,
            })?;
            let writer = BufWriter::new(file);
            if ansi {
                Ok(Box::new(Ansi::new(writer)))
            } else {
                Ok(Box::new(NoColor::new(writer)))
            }
        }
        None => {
            let choice = if ansi {
                ColorChoice::Always
            } else {
                ColorChoice::Never
            };
            Ok(Box::new(BufferedStandardStream::stdout(choice)))
        }
    }
}

fn run(args: &Args) -> Result<i32> {
    let walker_config = args.walker_config()?;
    if let Some(format) = &args.time_format {
        validate_time_format(format)?;
    }

    let format = args.format();
    let mode = args.color_mode();
    let to_terminal = args.output.is_none() && std::io::stdout().is_terminal();
    // HTML marks types with CSS classes instead of escape codes.
    let use_color = match format {
        OutputFormat::Plain => should_use_color(mode, to_terminal),
        OutputFormat::Html => mode == ColorMode::Always,
        OutputFormat::Xml | OutputFormat::Json => false,
    };
    let output_config = args.output_config(use_color);
    let ansi = use_color && format == OutputFormat::Plain;

    let roots = args.roots();
    let mut walker = TreeWalker::new(walker_config);
    if args.gitignore && !args.from_file {
        if let Some(set) = roots.first().and_then(|root| git::exclude_filter(root)) {
            walker = walker.with_base_filter(set);
        }
    }
    debug!("strategy {:?}, format {:?}", walker.strategy(), format);

    let out = open_output(args.output.as_ref(), ansi)?;
    let mut renderer = renderer_for(output_config, out);
    let summary = walker.walk(&roots, renderer.as_mut())?;
    Ok(summary.exit_code())
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    if let Err(e) = logging::init_logging(&args.log_level) {
        eprintln!("canopy: {}", e);
        process::exit(1);
    }

    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("canopy: {}", e);
            process::exit(1);
        }
    }
}
