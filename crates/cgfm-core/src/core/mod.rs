//! # Core Module
//!
//! The stateless foundation of the library: the interaction-class data model,
//! type-tuple hashing, basis functions, and the readers for range, table and
//! topology inputs.
//!
//! ## Architecture
//!
//! - **Interaction Model** ([`interactions`]) - Kinds, defined interactions, roles, cutoffs and columns
//! - **Basis Functions** ([`basis`]) - B-spline, linear, delta, power, table and none bases
//! - **File I/O** ([`io`]) - Range-file ingestion and tabulated-spline loading
//! - **Topology** ([`topology`]) - Type spaces, group membership and bonded tuples
//! - **Constants** ([`constants`]) - Tolerances and fixed limits shared across modules

pub mod basis;
pub mod constants;
pub mod interactions;
pub mod io;
pub mod topology;
