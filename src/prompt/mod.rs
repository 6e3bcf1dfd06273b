//! Prompt module - turns selected files into prompt text
//!
//! Provides:
//! - tree: indented outline of the selected paths
//! - template: handlebars-shaped renderer with an explicit helper registry

pub mod template;
pub mod tree;
