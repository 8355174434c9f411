//! Shared domain types for Corelay.
//!
//! This crate contains the core domain types used across the Corelay relay:
//! entity and session identifiers, message frames, structural filters,
//! published events, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod event;
pub mod filter;
pub mod id;
pub mod message;
