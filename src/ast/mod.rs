/// Query notation and compilation.
///
/// This module is the pure half of pgnest's pipeline — no I/O happens here:
///
/// ```text
/// Query notation (JSON / built nodes)   (types.rs)
///       ↓
/// Expand decomposition                  (expand.rs)
///       ↓
/// SQL compilation                       (compiler.rs)
///       ↓
/// Placeholder rewriting  ? → $n         (placeholder.rs)
///       ↓
/// Execution engine                      (db/ module)
/// ```
///
/// Compilation is deterministic and side-effect free; everything past it
/// lives in `db/`.
pub mod compiler;
pub mod expand;
pub mod placeholder;
pub mod types;

// Re-export key types for convenience
pub use compiler::{CompiledStatement, Compiler};
pub use expand::{decompose, has_expands, CorrelationLink, ExpandPlan, PlannedQuery};
pub use placeholder::rewrite_placeholders;
pub use types::*;
