//! # I/O Module
//!
//! Readers for the plain-text inputs of the setup sequence: per-class range
//! files and the tabulated-spline file.
//!
//! ## Overview
//!
//! Range files are whitespace-tokenized, one interaction per line. Two reading
//! strategies exist: keyed files name the type tuple on every line and may be
//! partial or unordered, while positional files list every defined interaction
//! of a class in index order (several classes may share one positional file and
//! are read from it in sequence). The table file holds one section per class
//! with tabulated interactions, each starting with a `<name> <count> <binwidth>`
//! header.
//!
//! ## Key Components
//!
//! - [`reader::LineReader`] - Line reader with lookahead and line tracking
//! - [`range`] - Keyed and positional range ingestion
//! - [`table`] - Tabulated-spline loading, including shared `types` blocks
//! - [`error`] - [`InputError`] and [`ParseErrorKind`]

pub mod error;
pub mod range;
pub mod reader;
pub mod table;

pub use error::{InputError, ParseErrorKind};
pub use reader::LineReader;
