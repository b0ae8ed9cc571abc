//! pagediff - change detection between two snapshots of the same resource.
//!
//! This library compares two fetches of a page or API response and reports
//! what changed in the newer one: the locations of changed values in JSON,
//! the changed elements in XML/HTML, or the words added to plain text.
//! Acknowledged changes can be excluded, and volatile JSON values (request
//! ids, timestamps) can be silenced with sign tokens.
//!
//! # Example
//!
//! ```no_run
//! use pagediff_rs::{parse_file, request_diff, DiffConfig, ExclusionSet};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let old = parse_file(Path::new("old.json"), None)?;
//! let new = parse_file(Path::new("new.json"), None)?;
//!
//! let config = DiffConfig::default()
//!     .with_exclusions(ExclusionSet::new().ignore("**.generated"))
//!     .with_sign_token("req-");
//!
//! let report = request_diff(&old, &new, &config)?;
//! if !report.is_empty() {
//!     print!("{}", report);
//! }
//! # Ok(())
//! # }
//! ```

pub mod collapse;
pub mod config;
pub mod diff;
pub mod document;
pub mod error;
pub mod filter;
pub mod markup;
pub mod output;
pub mod parser;
pub mod path;
pub mod tree;

// Re-export commonly used types for convenience
pub use config::Settings;
pub use diff::{diff_documents, json_diff, text_diff, xml_diff, DiffConfig, DiffOutcome, DiffSet};
pub use document::{Document, DocumentKind};
pub use error::{DiffError, MarkupError, OutputError, PagediffError, ParseError, PathError};
pub use filter::ExclusionSet;
pub use markup::{parse_html, parse_xml, Element};
pub use output::{format_outcome, render, request_diff, OutputFormat, OutputOptions};
pub use parser::{parse_content, parse_file, parse_json, parse_toml, parse_yaml, FormatHint};
pub use path::{Location, ROOT};
pub use tree::Node;
