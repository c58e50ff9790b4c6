//! Depth-first (pre-order) traversal without recursion.
//!
//! [PreorderCursor] keeps an explicit stack of frames, each pairing an ancestor
//! with a position among that ancestor's children. The traversal can therefore be
//! suspended, inspected (see [PreorderCursor::depth]) and resumed at any point.
//! [Preorder] and [PreorderMut] wrap this into standard iterators.

use super::node::Node;
use crate::TreeError;
use itertools::Itertools;
use std::collections::vec_deque;
use std::{fmt, iter::FusedIterator, ptr};
use tracing::trace;

/// One level of the traversal: an ancestor and a position among its children.
/// The position equals the ancestor's child count at the end of the level.
struct Frame<'a, V> {
    node: &'a Node<V>,
    position: usize,
}

impl<'a, V> Frame<'a, V> {
    fn is_end(&self) -> bool {
        self.position >= self.node.len()
    }

    fn current(&self) -> Result<&'a Node<V>, TreeError> {
        self.node.child(self.position)
    }
}

impl<V> Clone for Frame<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Frame<'_, V> {}

// Ancestors are compared by identity, not by value
impl<V> PartialEq for Frame<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.node, other.node) && self.position == other.position
    }
}

impl<V> Eq for Frame<'_, V> {}

/// A resumable pre-order cursor over the descendants of a [Node].
///
/// Obtained from [Node::begin_preorder] and [Node::end_preorder]. The cursor
/// points at a node, starting with the first child of the tree it was created
/// from. Advancing visits that node's children, depth-first and left to right,
/// before moving on to its next sibling:
///
/// ```
/// use arbor::Node;
///
/// let mut root = Node::new("root");
/// let a = root.append_child("A");
/// a.append_child("A1");
/// a.append_child("A2");
/// root.append_child("B");
///
/// let mut visited = vec![];
/// let mut cursor = root.begin_preorder();
/// while cursor != root.end_preorder() {
///     visited.push((*cursor.get()?, cursor.depth()));
///     cursor.advance()?;
/// }
/// assert_eq!(visited, [("A", 0), ("A1", 1), ("A2", 1), ("B", 0)]);
/// # Ok::<(), arbor::TreeError>(())
/// ```
///
/// A default-constructed cursor has no frames. It can be used as a placeholder
/// but every access returns [TreeError::Exhausted].
///
/// Two cursors are equal if their whole frame stacks match, i.e. they point at
/// the same node of the same tree reached along the same path. Default cursors
/// are equal to each other. [PreorderCursor::same_position] only compares the
/// topmost frames.
pub struct PreorderCursor<'a, V> {
    frames: Vec<Frame<'a, V>>,
}

impl<'a, V> PreorderCursor<'a, V> {
    pub(crate) fn new(tree: &'a Node<V>, position: usize) -> Self {
        PreorderCursor {
            frames: vec![Frame { node: tree, position }],
        }
    }

    /// Distance from the tree's children. Children of the tree have depth 0.
    /// A default cursor also reports 0.
    pub fn depth(&self) -> usize {
        self.frames.len().saturating_sub(1)
    }

    /// Returns true for a cursor without frames
    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns true if the cursor has reached the end of the traversal
    pub fn is_end(&self) -> bool {
        match self.frames.as_slice() {
            [root] => root.is_end(),
            _ => false,
        }
    }

    /// The node the cursor points at
    pub fn node(&self) -> Result<&'a Node<V>, TreeError> {
        self.frames.last().ok_or(TreeError::Exhausted)?.current()
    }

    /// The value of the node the cursor points at
    pub fn get(&self) -> Result<&'a V, TreeError> {
        self.node().map(Node::value)
    }

    /// Moves to the next node in pre-order.
    ///
    /// The current node's first child comes next if it has children. Otherwise
    /// the cursor moves to the next sibling, or to the next sibling of the closest
    /// ancestor that has one. Once the last node has been visited, the cursor is
    /// equal to [Node::end_preorder].
    ///
    /// Fails without moving if the cursor is exhausted or at the end.
    pub fn advance(&mut self) -> Result<(), TreeError> {
        let current = self.node()?;
        if current.is_leaf() {
            self.step();
        } else {
            self.frames.push(Frame {
                node: current,
                position: 0,
            });
        }
        trace!(depth = self.depth(), "advanced pre-order cursor");
        Ok(())
    }

    /// Moves past the current node and its whole subtree.
    ///
    /// Fails without moving if the cursor is exhausted or at the end.
    pub fn skip_children(&mut self) -> Result<(), TreeError> {
        self.node()?;
        self.step();
        trace!(depth = self.depth(), "skipped subtree");
        Ok(())
    }

    /// Compares the topmost frames only: same ancestor, same position. Cursors at
    /// different depths can be the same position this way. A default cursor is
    /// never the same position as any cursor, including itself.
    pub fn same_position(&self, other: &Self) -> bool {
        match (self.frames.last(), other.frames.last()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    // Steps the top frame to the next sibling. Exhausted levels are popped and their
    // parent level stepped in turn. The root frame is kept so that a finished
    // traversal ends on the tree's end position.
    fn step(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            top.position += 1;
        }
        while self.frames.len() > 1 && self.frames.last().is_some_and(Frame::is_end) {
            self.frames.pop();
            if let Some(top) = self.frames.last_mut() {
                top.position += 1;
            }
        }
    }
}

impl<V> Default for PreorderCursor<'_, V> {
    fn default() -> Self {
        PreorderCursor { frames: vec![] }
    }
}

impl<V> Clone for PreorderCursor<'_, V> {
    fn clone(&self) -> Self {
        PreorderCursor {
            frames: self.frames.clone(),
        }
    }
}

impl<V> PartialEq for PreorderCursor<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        self.frames == other.frames
    }
}

impl<V> Eq for PreorderCursor<'_, V> {}

impl<V> fmt::Debug for PreorderCursor<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreorderCursor")
            .field("depth", &self.depth())
            .field("positions", &self.frames.iter().map(|frame| frame.position).collect_vec())
            .finish()
    }
}

/// Iterator over the values of a tree's descendants in pre-order.
/// Created by [Node::iter_preorder].
pub struct Preorder<'a, V> {
    cursor: PreorderCursor<'a, V>,
    depth: usize,
}

impl<'a, V> Preorder<'a, V> {
    pub(crate) fn new(cursor: PreorderCursor<'a, V>) -> Self {
        Preorder { cursor, depth: 0 }
    }

    /// Depth of the value returned last
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Pairs every value with its depth
    pub fn with_depth(self) -> WithDepth<'a, V> {
        WithDepth(self)
    }
}

impl<'a, V> Iterator for Preorder<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.cursor.get().ok()?;
        self.depth = self.cursor.depth();
        self.cursor.advance().ok()?;
        Some(value)
    }
}

impl<V> FusedIterator for Preorder<'_, V> {}

/// See [Preorder::with_depth]
pub struct WithDepth<'a, V>(Preorder<'a, V>);

impl<'a, V> Iterator for WithDepth<'a, V> {
    type Item = (usize, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.0.next()?;
        Some((self.0.depth(), value))
    }
}

impl<V> FusedIterator for WithDepth<'_, V> {}

/// Iterator over mutable references to the values of a tree's descendants in
/// pre-order. Created by [Node::iter_preorder_mut].
pub struct PreorderMut<'a, V> {
    stack: Vec<vec_deque::IterMut<'a, Node<V>>>,
    depth: usize,
}

impl<'a, V> PreorderMut<'a, V> {
    pub(crate) fn new(children: vec_deque::IterMut<'a, Node<V>>) -> Self {
        PreorderMut {
            stack: vec![children],
            depth: 0,
        }
    }

    /// Depth of the value returned last
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<'a, V> Iterator for PreorderMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => {
                    self.depth = self.stack.len() - 1;
                    let (value, children) = node.split_mut();
                    self.stack.push(children);
                    return Some(value);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<V> FusedIterator for PreorderMut<'_, V> {}
