//! # Nomenclature
//!
//! * A [Node] is a tree by itself. There is no separate root type.
//! * Children are owned by their parent; nodes hold no references upwards.
//! * A *leaf* is a node without children.
//!
//! Trees are traversed in pre-order with a [PreorderCursor]. The cursor replaces
//! recursion by an explicit stack of (ancestor, position) frames, so ancestry is
//! only known to the traversal, never stored in the nodes.

pub mod iterator;
pub mod node;

pub use iterator::{Preorder, PreorderCursor, PreorderMut, WithDepth};
pub use node::Node;
