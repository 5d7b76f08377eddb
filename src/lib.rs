//! Canopy - a recursive directory lister with patterns, gitignore rules,
//! annotations and plain, HTML, XML and JSON output

pub mod error;
pub mod filter;
pub mod git;
pub mod ids;
pub mod info;
pub mod logging;
pub mod metadata;
pub mod output;
pub mod pattern;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{CanopyError, Diagnostic, PatternError};
pub use filter::{FilterSet, FilterStack};
pub use info::{AnnotationSet, InfoStack};
pub use metadata::{MetadataConfig, validate_time_format};
pub use output::{OutputConfig, OutputFormat, Renderer, renderer_for};
pub use pattern::Pattern;
pub use tree::{Entry, SortKey, SortOrder, TreeWalker, WalkSummary, WalkerConfig};
