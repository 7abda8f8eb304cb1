//! # lookup-core — Foundational Types for the Lookup Codes Layer
//!
//! Defines the single resource this service fronts ([`LookupCode`]), the
//! validator that guards every write before it reaches the data layer, and
//! the [`DownstreamPath`] type that turns routing identifiers into a
//! data-layer URL.
//!
//! ## Crate Policy
//!
//! - No I/O. Everything here is pure and synchronous.
//! - No dependencies on other `lookup-*` crates (leaf of the DAG).
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod path;
pub mod schema;

pub use path::{DownstreamPath, PathError};
pub use schema::{inject_identifier, LookupCode, SchemaErrors};
