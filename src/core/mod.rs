//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - File records and pipeline configuration
//! - Typed errors for discovery and templating
//! - Path normalization utilities
//! - Token counting for LLM context budgeting
//! - The output envelope (raw prompt or JSON)

pub mod error;
pub mod model;
pub mod paths;
pub mod render;
pub mod tokenizer;
pub mod util;
