//! # CGFM Core Library
//!
//! Interaction cataloguing, regression column indexing and basis-function
//! evaluation for coarse-grained force matching.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`InteractionClass`,
//!   `TupleHasher`, `ColumnMap`), the basis-function implementations, and the
//!   readers for range, table and topology files.
//!
//! - **[`engine`]: The Logic Core.** The stateful setup sequence that allocates every
//!   interaction class, ingests ranges, runs the cross checks, builds column maps and
//!   loads tables, plus evaluation grids for output and the model settings file.
//!
//! - **[`workflows`]: The Public API.** File-driven entry points that run the whole
//!   setup from a [`engine::config::SetupConfig`].

pub mod core;
pub mod engine;
pub mod workflows;
