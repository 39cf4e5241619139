//! Domain core for versioned page content.
//!
//! - [`node`] and [`path`]: the persistent document tree and path-addressed
//!   copy-on-write edits.
//! - [`schema`]: the canonical document and the normalizer.
//! - [`store`], [`memory_store`] and [`repository`]: versioned storage with
//!   compare-and-swap writes.
//! - [`session`]: the draft/edit/save loop on top of a repository.

pub mod audit;
pub mod diff;
pub mod error;
pub mod memory_store;
pub mod node;
pub mod path;
pub mod repository;
pub mod roles;
pub mod schema;
pub mod session;
pub mod store;
pub mod types;
