//! Structured text resources: a metadata header plus a free-form body.
//!
//! Agent definitions are authored as Markdown files that open with a
//! `---`-delimited header block. [`parser::parse_resource`] splits such a file
//! into a [`ResourceHeader`](parser::ResourceHeader) and its body, or reports
//! [`ParsedResource::NoHeader`](parser::ParsedResource::NoHeader) when the file
//! carries no header at all.

pub mod parser;

pub use parser::{HeaderValue, ParsedResource, ResourceHeader, parse_resource};
