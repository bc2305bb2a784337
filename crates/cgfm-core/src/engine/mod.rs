//! # Engine Module
//!
//! The stateful layer: takes every interaction class from settings and topology
//! through range ingestion, cross checks and column indexing, then serves basis
//! rows and evaluation grids to the matrix assembler and output writer.
//!
//! ## Overview
//!
//! Setup runs once, single-threaded, in a fixed order: allocate defined
//! interactions, ingest ranges, normalize dihedral periodicity and run the
//! cutoff cross checks, build column maps, and optionally load tabulated
//! coefficients. Nothing downstream may read the model before the sequence has
//! finished; [`model::InteractionModel`] enforces the order.
//!
//! ## Key Components
//!
//! - **Configuration** ([`config`]) - Model settings file and setup input paths
//! - **Setup Sequence** ([`model`]) - The per-class catalogue and global column layout
//! - **Evaluation Grids** ([`grid`]) - Output axes, sampled curves and potential integration
//! - **Progress Monitoring** ([`progress`]) - Phase events for front ends
//! - **Error Handling** ([`error`]) - [`error::SetupError`], wrapping every failure of the sequence

pub mod config;
pub mod error;
pub mod grid;
pub mod model;
pub mod progress;
