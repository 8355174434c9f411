//! Observability utilities for Corelay.

pub mod tracing_setup;
