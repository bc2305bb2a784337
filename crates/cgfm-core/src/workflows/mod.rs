//! # Workflows Module
//!
//! High-level entry points that run the complete interaction setup from files
//! on disk.
//!
//! ## Overview
//!
//! A workflow loads the model settings and topology summary, drives the
//! [`crate::engine::model::InteractionModel`] through its setup sequence, and
//! reports each phase through a [`crate::engine::progress::ProgressReporter`].
//!
//! ## Architecture
//!
//! - **Setup Workflow** ([`setup`]) - Allocation, range ingestion, cross checks,
//!   column indexing and optional table loading, plus per-class summaries.

pub mod setup;
