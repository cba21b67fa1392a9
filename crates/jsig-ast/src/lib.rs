//! # jsig AST
//!
//! Shared data model for the jsig checker: type nodes as written in `.hjs`
//! header files, the header program containers, the textual renderer, and the
//! ESTree-shaped source AST the checker walks.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Byte range inside a header file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod header;
pub mod render;
pub mod source;

// =============================================================================
// Re-exports
// =============================================================================

pub use types::*;
pub use header::*;
pub use render::{render, render_program, render_statement, RenderOptions, COLUMN_BUDGET};
pub use source::*;

// =============================================================================
// Tests
// =============================================================================
