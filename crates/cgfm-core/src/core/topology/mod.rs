//! # Topology Module
//!
//! The topology information the setup sequence consumes, loaded from a TOML
//! summary written by the topology reader.
//!
//! ## Overview
//!
//! Interaction classes draw their type tuples from one of three type spaces:
//! CG site types, density groups, or molecule groups. The summary names the
//! members of each space, lists the bonded type tuples actually present (which
//! narrows the defined set of bonded classes), and records per-molecule sites
//! and dihedrals for helical pair construction.
//!
//! ## Key Components
//!
//! - [`summary::TopologySummary`] - The deserialized summary and its queries
//! - [`summary::HelicalInputs`] - Site and dihedral tables for helical lists
pub mod summary;
