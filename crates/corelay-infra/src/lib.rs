//! In-process infrastructure for Corelay.
//!
//! Implements the entity ports from `corelay-core` for entities living in
//! the same process: a [`registry::LinkRegistry`] that resolves identifiers
//! to registered [`local::LocalEntity`] handles, plus loading of the relay
//! configuration file.

pub mod config;
pub mod local;
pub mod registry;
