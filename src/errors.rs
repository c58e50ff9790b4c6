//! Provides the error type used throughout this crate.
//!
//! Accessing a node's children or dereferencing a cursor has preconditions
//! (the node must have children, the cursor must point at a node). Instead of
//! leaving a violation undefined, every such access returns a [TreeError].

use thiserror::Error;

/// The error type used throughout this crate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// A last-child accessor was called on a leaf
    #[error("Node has no children")]
    NoChildren,
    /// The cursor has no frames (a default-constructed sentinel)
    #[error("Cursor is exhausted")]
    Exhausted,
    /// A position is past the end of a child sequence
    #[error("Position {position} is out of range for {len} children")]
    OutOfRange { position: usize, len: usize },
}
