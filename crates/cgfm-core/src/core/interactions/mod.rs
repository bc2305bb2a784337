//! # Interactions Module
//!
//! The interaction-class data model: what kinds of interactions exist, how a
//! type tuple maps to a dense "index among defined", which roles a range-file
//! mode grants, and how matched interactions are laid out in the regression
//! matrix.
//!
//! ## Key Components
//!
//! - [`kind`] - The closed set of interaction kinds and their per-kind rules
//! - [`hash`] - Canonicalization and mixed-radix hashing of type tuples
//! - [`mode`] - Mode-string grammar (`fm`, `sym`, `tab`, `tabsym`, `none`)
//! - [`settings`] - Per-class settings, defaults and validation
//! - [`class`] - Defined interactions, role numbering, cutoff alignment and periodicity
//! - [`columns`] - Column widths and the column map
//! - [`groups`] - Density-group adjacency and helical pair lists

pub mod class;
pub mod columns;
pub mod groups;
pub mod hash;
pub mod kind;
pub mod mode;
pub mod settings;
