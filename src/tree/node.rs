//! The tree node: one value and an ordered sequence of owned child nodes.
//! Every node is a complete tree rooted at itself.

use super::iterator::{Preorder, PreorderCursor, PreorderMut};
use crate::TreeError;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::{vec_deque, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::trace;
use tracing_attributes::instrument;

/// A node of an ordered multi-way tree.
///
/// The node owns its children exclusively; there are no parent references.
/// A node without children is a leaf, regardless of its value.
/// Cloning performs a deep copy of the value and the whole subtree. Cloning,
/// comparing, hashing and dropping work on explicit stacks and never recurse.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node<V> {
    /// The user-defined payload
    value: V,
    /// Immediate children in insertion order
    children: VecDeque<Node<V>>,
}

impl<V> Node<V> {
    /// Contructor. Wraps a value in a node without children.
    pub fn new(value: V) -> Self {
        Node {
            value,
            children: VecDeque::new(),
        }
    }

    /// Returns true if the node has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Same as [Node::is_empty]
    pub fn is_leaf(&self) -> bool {
        self.is_empty()
    }

    /// Number of immediate children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Wraps `value` in a new node, adds it after the last child and returns it.
    pub fn append_child(&mut self, value: V) -> &mut Node<V> {
        self.append_node(Node::new(value))
    }

    /// Wraps `value` in a new node, adds it before the first child and returns it.
    pub fn prepend_child(&mut self, value: V) -> &mut Node<V> {
        self.prepend_node(Node::new(value))
    }

    /// Adds a complete subtree after the last child and returns it.
    pub fn append_node(&mut self, node: Node<V>) -> &mut Node<V> {
        let index = self.children.len();
        self.children.push_back(node);
        trace!(index, "appended child");
        &mut self.children[index]
    }

    /// Adds a complete subtree before the first child and returns it.
    /// Shifts the positions of all existing children by one.
    pub fn prepend_node(&mut self, node: Node<V>) -> &mut Node<V> {
        self.children.push_front(node);
        trace!(len = self.children.len(), "prepended child");
        &mut self.children[0]
    }

    /// Detaches the child at `index` and returns it together with its subtree.
    pub fn remove_child(&mut self, index: usize) -> Result<Node<V>, TreeError> {
        let len = self.children.len();
        let removed = self
            .children
            .remove(index)
            .ok_or(TreeError::OutOfRange { position: index, len })?;
        trace!(index, "removed child");
        Ok(removed)
    }

    /// Iterates over the immediate children only (one level, not recursive)
    pub fn children(&self) -> vec_deque::Iter<'_, Node<V>> {
        self.children.iter()
    }

    pub fn children_mut(&mut self) -> vec_deque::IterMut<'_, Node<V>> {
        self.children.iter_mut()
    }

    pub fn child(&self, index: usize) -> Result<&Node<V>, TreeError> {
        let len = self.children.len();
        self.children
            .get(index)
            .ok_or(TreeError::OutOfRange { position: index, len })
    }

    pub fn child_mut(&mut self, index: usize) -> Result<&mut Node<V>, TreeError> {
        let len = self.children.len();
        self.children
            .get_mut(index)
            .ok_or(TreeError::OutOfRange { position: index, len })
    }

    /// A pre-order cursor positioned at the first child.
    /// The node itself is not part of the traversal; only its descendants are.
    pub fn begin_preorder(&self) -> PreorderCursor<'_, V> {
        PreorderCursor::new(self, 0)
    }

    /// The pre-order cursor a completed traversal of this node ends on.
    pub fn end_preorder(&self) -> PreorderCursor<'_, V> {
        PreorderCursor::new(self, self.children.len())
    }

    /// The depth of a cursor relative to the children of the tree it was created from.
    /// Forwards to [PreorderCursor::depth]; the cursor is not checked to belong to this node.
    pub fn depth(&self, cursor: &PreorderCursor<'_, V>) -> usize {
        cursor.depth()
    }

    /// Value of the last child
    pub fn back(&self) -> Result<&V, TreeError> {
        self.back_node().map(Node::value)
    }

    pub fn back_mut(&mut self) -> Result<&mut V, TreeError> {
        self.back_node_mut().map(Node::value_mut)
    }

    /// The last child
    pub fn back_node(&self) -> Result<&Node<V>, TreeError> {
        self.children.back().ok_or(TreeError::NoChildren)
    }

    pub fn back_node_mut(&mut self) -> Result<&mut Node<V>, TreeError> {
        self.children.back_mut().ok_or(TreeError::NoChildren)
    }

    /// Returns the position and node of the first immediate child whose value
    /// satisfies `predicate`. Grandchildren are not searched.
    pub fn find_first_matching<P>(&self, mut predicate: P) -> Option<(usize, &Node<V>)>
    where
        P: FnMut(&V) -> bool,
    {
        self.children.iter().find_position(|child| predicate(&child.value))
    }

    /// Destroys all descendants. The node's own value is left untouched.
    #[instrument(level = "trace", skip_all)]
    pub fn clear(&mut self) {
        self.teardown();
    }

    /// Iterates over the values of all descendants in pre-order
    pub fn iter_preorder(&self) -> Preorder<'_, V> {
        Preorder::new(self.begin_preorder())
    }

    pub fn iter_preorder_mut(&mut self) -> PreorderMut<'_, V> {
        PreorderMut::new(self.children.iter_mut())
    }

    /// Number of nodes below this one, i.e. the length of its pre-order traversal
    pub fn descendant_count(&self) -> usize {
        self.iter_preorder().count()
    }

    /// Splits the node into its value and an iterator over its children
    pub(crate) fn split_mut(&mut self) -> (&mut V, vec_deque::IterMut<'_, Node<V>>) {
        (&mut self.value, self.children.iter_mut())
    }

    // Flattens the subtree into a work list so that dropping never recurses.
    fn teardown(&mut self) {
        let mut pending = self.children.drain(..).collect_vec();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.children.drain(..));
        }
    }
}

impl<V> Drop for Node<V> {
    fn drop(&mut self) {
        if !self.children.is_empty() {
            self.teardown();
        }
    }
}

impl<V> Clone for Node<V>
where
    V: Clone,
{
    // Post-order: a node is copied once all of its children sit on `finished`.
    fn clone(&self) -> Self {
        let mut pending = vec![(self, 0)];
        let mut finished: Vec<Node<V>> = vec![];
        while let Some(top) = pending.last_mut() {
            let (node, next_child) = *top;
            if let Ok(child) = node.child(next_child) {
                top.1 += 1;
                pending.push((child, 0));
                continue;
            }
            pending.pop();
            let children = finished.drain(finished.len() - node.len()..).collect();
            finished.push(Node {
                value: node.value.clone(),
                children,
            });
        }
        finished.pop().unwrap_or_else(|| Node::new(self.value.clone()))
    }
}

impl<V> PartialEq for Node<V>
where
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((left, right)) = pending.pop() {
            if left.value != right.value || left.len() != right.len() {
                return false;
            }
            pending.extend(left.children.iter().zip(right.children.iter()));
        }
        true
    }
}

impl<V> Eq for Node<V> where V: Eq {}

impl<V> Hash for Node<V>
where
    V: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            node.value.hash(state);
            node.len().hash(state);
            pending.extend(node.children.iter().rev());
        }
    }
}

impl<V> From<V> for Node<V> {
    fn from(value: V) -> Self {
        Node::new(value)
    }
}

impl<V> AsRef<V> for Node<V> {
    fn as_ref(&self) -> &V {
        &self.value
    }
}

impl<V> AsMut<V> for Node<V> {
    fn as_mut(&mut self) -> &mut V {
        &mut self.value
    }
}

/// Renders the subtree, one node per line, indented by depth.
impl<V> fmt::Display for Node<V>
where
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        for (depth, value) in self.iter_preorder().with_depth() {
            write!(f, "\n{:indent$}{}", "", value, indent = 2 * (depth + 1))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use itertools::Itertools;
    use test_log;

    #[test_log::test]
    fn test_leaf_invariant() {
        let mut root = Node::new("root");
        assert!(root.is_empty());
        assert_eq!(root.is_empty(), root.is_leaf());

        root.append_child("a");
        assert!(!root.is_empty());
        assert_eq!(root.is_empty(), root.is_leaf());
        assert!(root.child(0).unwrap().is_leaf());

        // A default value does not make a node a leaf, only missing children do
        let mut default_root = Node::<i32>::default();
        default_root.append_child(0);
        assert!(!default_root.is_leaf());
    }

    #[test_log::test]
    fn test_append_and_prepend() {
        let mut root = Node::new(0);
        root.append_child(2);
        root.prepend_child(1);
        root.append_child(3).append_child(31);

        assert_eq!(root.children().map(|c| *c.value()).collect_vec(), &[1, 2, 3]);
        assert_eq!(*root.back().unwrap(), 3);
        assert_eq!(*root.back_node().unwrap().back().unwrap(), 31);
        assert_eq!(root.len(), 3);
    }

    #[test_log::test]
    fn test_append_returns_new_node() {
        let mut root = Node::new("root");
        let a = root.append_child("a");
        *a.value_mut() = "renamed";
        a.append_child("a1");

        assert_eq!(*root.child(0).unwrap().value(), "renamed");
        assert_eq!(root.child(0).unwrap().len(), 1);
    }

    // References into the tree cannot be held across `append_child`; the borrow
    // checker enforces that. What can change is the content at a position.
    #[test_log::test]
    fn test_siblings_unchanged_by_append() {
        let mut root = Node::new(0);
        root.append_child(1);
        root.append_child(2).append_child(21);

        let before = root.child(1).unwrap().clone();
        root.append_child(3);
        root.child_mut(0).unwrap().append_child(11);

        assert_eq!(root.child(1).unwrap(), &before);
        assert_eq!(*root.child(0).unwrap().value(), 1);
    }

    #[test]
    fn test_back_on_leaf() {
        let mut leaf = Node::new(1);
        assert_eq!(leaf.back(), Err(TreeError::NoChildren));
        assert_eq!(leaf.back_mut(), Err(TreeError::NoChildren));
        assert_eq!(leaf.back_node().unwrap_err(), TreeError::NoChildren);
        assert_eq!(leaf.back_node_mut().unwrap_err(), TreeError::NoChildren);
    }

    #[test]
    fn test_back_mut() {
        let mut root = Node::new(0);
        root.append_child(1);
        root.append_child(2);
        *root.back_mut().unwrap() += 40;
        assert_eq!(*root.back().unwrap(), 42);
    }

    #[test_log::test]
    fn test_find_first_matching() {
        let mut root = Node::new(0);
        root.append_child(1).append_child(10);
        root.append_child(12);
        root.append_child(14);

        let (index, node) = root.find_first_matching(|v| *v > 5).unwrap();
        assert_eq!(index, 1);
        assert_eq!(*node.value(), 12);

        // Only the first level is searched
        assert!(root.find_first_matching(|v| *v == 10).is_none());
        assert!(Node::<i32>::new(0).find_first_matching(|_| true).is_none());
    }

    #[test_log::test]
    fn test_clear() {
        let mut root = Node::new("root");
        root.append_child("a").append_child("a1");
        root.append_child("b");

        root.clear();
        assert!(root.is_empty());
        assert_eq!(*root.value(), "root");

        // Clearing twice is fine
        root.clear();
        assert!(root.is_empty());
        assert_eq!(root.descendant_count(), 0);
    }

    #[test]
    fn test_remove_child() {
        let mut root = Node::new(0);
        root.append_child(1).append_child(11);
        root.append_child(2);

        let removed = root.remove_child(0).unwrap();
        assert_eq!(*removed.value(), 1);
        assert_eq!(removed.len(), 1);
        assert_eq!(root.children().map(|c| *c.value()).collect_vec(), &[2]);

        assert_eq!(
            root.remove_child(5).unwrap_err(),
            TreeError::OutOfRange { position: 5, len: 1 }
        );
    }

    #[test]
    fn test_child_out_of_range() {
        let root = Node::new(0);
        assert_eq!(root.child(0).unwrap_err(), TreeError::OutOfRange { position: 0, len: 0 });
    }

    #[test]
    fn test_deep_copy() {
        let mut original = Node::new(0);
        original.append_child(1).append_child(11);

        let mut copy = original.clone();
        assert_eq!(copy, original);

        *copy.child_mut(0).unwrap().back_mut().unwrap() = 99;
        copy.append_child(2);

        assert_eq!(*original.child(0).unwrap().back().unwrap(), 11);
        assert_eq!(original.len(), 1);
        assert_ne!(copy, original);
    }

    #[test]
    fn test_value_views() {
        let mut node = Node::from(String::from("abc"));
        node.as_mut().push('d');
        assert_eq!(node.as_ref(), "abcd");
        assert_eq!(node.value().len(), 4);
    }

    #[test]
    fn test_display() {
        let mut root = Node::new("root");
        let a = root.append_child("A");
        a.append_child("A1");
        a.append_child("A2");
        root.append_child("B");

        assert_eq!(root.to_string(), "root\n  A\n    A1\n    A2\n  B");
        assert_eq!(Node::new(7).to_string(), "7");
    }

    #[test_log::test]
    fn test_deep_tree_drop() {
        // Deep enough to overflow the stack with a recursive drop
        let mut root = Node::new(0usize);
        let mut current = &mut root;
        for i in 1..200_000 {
            current = current.append_child(i);
        }
        assert_eq!(root.descendant_count(), 199_999);
        drop(root);
    }

    fn chain(len: usize) -> Node<usize> {
        let mut root = Node::new(0usize);
        let mut current = &mut root;
        for i in 1..len {
            current = current.append_child(i);
        }
        root
    }

    #[test_log::test]
    fn test_deep_tree_clone_and_compare() {
        let root = chain(200_000);
        let mut copy = root.clone();
        assert_eq!(copy.descendant_count(), 199_999);
        assert!(copy == root);

        let mut current = &mut copy;
        while !current.is_leaf() {
            current = current.back_node_mut().unwrap();
        }
        *current.value_mut() = 0;
        assert!(copy != root);
    }

    #[test]
    fn test_hash_follows_structure() {
        use std::collections::hash_map::DefaultHasher;

        fn digest(node: &Node<i32>) -> u64 {
            let mut hasher = DefaultHasher::new();
            node.hash(&mut hasher);
            hasher.finish()
        }

        // Same pre-order values, different shape
        let mut nested = Node::new(0);
        nested.append_child(1).append_child(2);
        let mut flat = Node::new(0);
        flat.append_child(1);
        flat.append_child(2);

        assert!(nested != flat);
        assert_eq!(digest(&nested), digest(&nested.clone()));
        assert_ne!(digest(&nested), digest(&flat));
        assert_eq!(digest(&chain_i32()), digest(&chain_i32()));
    }

    fn chain_i32() -> Node<i32> {
        let mut root = Node::new(0);
        let mut current = &mut root;
        for i in 1..100_000 {
            current = current.append_child(i);
        }
        root
    }
}
