//! Link primitives and entity ports for Corelay.
//!
//! This crate defines the ports the infrastructure layer implements (entity
//! lookup, entity capabilities, event publishing) and the link primitives
//! built on top of them: fire-and-forget dispatch, filtered listeners, and
//! request/reply bridging. It depends only on `corelay-types` -- never on
//! `corelay-infra` or any transport crate.

pub mod entity;
pub mod link;
pub mod publish;

#[cfg(test)]
pub(crate) mod testutil;
