//! Discovery module - decides which files make it into the prompt
//!
//! Provides:
//! - matcher: glob compilation
//! - policy: ignore-file, built-in and user exclusion rules
//! - walker: pruning directory traversal
//! - sampler: deterministic per-directory cap
//! - pipeline: the three stages in sequence

pub mod matcher;
pub mod pipeline;
pub mod policy;
pub mod sampler;
pub mod walker;
