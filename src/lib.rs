//! ## About
//!
//! This crate contains a generic, ordered multi-way tree container and a
//! depth-first (pre-order) cursor that walks it without recursion.
//!
//! See the [Node] struct to get started.
//!
//! ```
//! use arbor::Node;
//!
//! let mut root = Node::new(0);
//! let first = root.append_child(1);
//! first.append_child(11);
//! first.append_child(12);
//! root.append_child(2);
//!
//! let values: Vec<_> = root.iter_preorder().copied().collect();
//! assert_eq!(values, [1, 11, 12, 2]);
//! ```
//!
//! ## Naming conventions
//! * Structs – substantives that indicate entities implementing a behavior
//! * Methods – imperative forms with the exception of getters and factories, which
//!             use substantives (i.e., omit a `get_` prefix) much like the standard library.
//!
//! ## Features
//! * `serde` – derives `Serialize` and `Deserialize` for [Node]. A node is written as
//!             its value followed by the ordered list of its children.

pub mod errors;
pub mod tree;

pub use errors::TreeError;
pub use tree::{Node, Preorder, PreorderCursor, PreorderMut, WithDepth};
