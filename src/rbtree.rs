// A red-black tree whose order is defined purely by insertion position:
// callers say "insert after this node" rather than handing over a key. Every
// node also carries links to its in-order neighbours, so stepping through
// the tree is O(1). Both the beachline and the circle-event queue are built
// on top of it.

use std::ops::{Index, IndexMut};

use slab::Slab;

use crate::treeprint;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
struct Pointer(usize);
impl Pointer {
    const NULL: Pointer = Pointer(!0);

    fn is_null(self) -> bool {
        self == Pointer::NULL
    }

    fn handle(self) -> Option<NodeHandle> {
        if self.is_null() {
            None
        } else {
            Some(NodeHandle(self))
        }
    }
}

/// Stable reference to a node. Valid until the node is removed.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct NodeHandle(Pointer);

struct Node<T> {
    red: bool,
    parent: Pointer,
    left: Pointer,
    right: Pointer,
    previous: Pointer,
    next: Pointer,
    value: T,
}

pub struct RbTree<T> {
    nodes: Slab<Node<T>>,
    root: Pointer,
    first: Pointer,
}

// Just for convenience, so that we can type `self[i]` instead of `self.nodes[i.0]`.
impl<T> IndexMut<Pointer> for RbTree<T> {
    fn index_mut(&mut self, index: Pointer) -> &mut Node<T> {
        &mut self.nodes[index.0]
    }
}
impl<T> Index<Pointer> for RbTree<T> {
    type Output = Node<T>;

    fn index(&self, index: Pointer) -> &Node<T> {
        &self.nodes[index.0]
    }
}

impl<T> Default for RbTree<T> {
    fn default() -> Self {
        RbTree::new()
    }
}

impl<T> RbTree<T> {
    pub fn new() -> RbTree<T> {
        RbTree::with_capacity(0)
    }

    pub fn with_capacity(n: usize) -> RbTree<T> {
        RbTree {
            nodes: Slab::with_capacity(n),
            root: Pointer::NULL,
            first: Pointer::NULL,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    /// Drops every node but keeps the allocated slots for the next run.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = Pointer::NULL;
        self.first = Pointer::NULL;
    }

    pub fn get(&self, handle: NodeHandle) -> &T {
        &self[handle.0].value
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> &mut T {
        &mut self[handle.0].value
    }

    pub fn root(&self) -> Option<NodeHandle> {
        self.root.handle()
    }

    pub fn left(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self[handle.0].left.handle()
    }

    pub fn right(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self[handle.0].right.handle()
    }

    pub fn previous(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self[handle.0].previous.handle()
    }

    pub fn next(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self[handle.0].next.handle()
    }

    /// Smallest node of the whole tree, O(1).
    pub fn first(&self) -> Option<NodeHandle> {
        self.first.handle()
    }

    pub fn first_in_subtree(&self, handle: NodeHandle) -> NodeHandle {
        let mut at = handle.0;
        while !self[at].left.is_null() {
            at = self[at].left;
        }
        NodeHandle(at)
    }

    /// Inserts `value` right after `anchor`, or at the very start when
    /// `anchor` is None.
    pub fn insert_after(&mut self, anchor: Option<NodeHandle>, value: T) -> NodeHandle {
        let node = Pointer(self.nodes.insert(Node {
            red: true,
            parent: Pointer::NULL,
            left: Pointer::NULL,
            right: Pointer::NULL,
            previous: Pointer::NULL,
            next: Pointer::NULL,
            value,
        }));

        let parent = if let Some(NodeHandle(at)) = anchor {
            let next = self[at].next;
            self[node].previous = at;
            self[node].next = next;
            if !next.is_null() {
                self[next].previous = node;
            }
            self[at].next = node;

            if self[at].right.is_null() {
                self[at].right = node;
                at
            } else {
                // The successor slot is the leftmost spot of the right subtree
                let NodeHandle(first) = self.first_in_subtree(NodeHandle(self[at].right));
                self[first].left = node;
                first
            }
        } else if !self.root.is_null() {
            let NodeHandle(first) = self.first_in_subtree(NodeHandle(self.root));
            self[node].next = first;
            self[first].previous = node;
            self[first].left = node;
            first
        } else {
            self.root = node;
            Pointer::NULL
        };
        self[node].parent = parent;
        if self[node].previous.is_null() {
            self.first = node;
        }

        self.insert_repair(node);
        NodeHandle(node)
    }

    /// Inserts `value` in the position found by descending the tree.
    /// `before(new, existing)` says whether the new value sorts before an
    /// existing one; equal values end up after the ones already present
    /// when `before` is strict.
    pub fn insert_ordered_by<F>(&mut self, value: T, before: F) -> NodeHandle
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut predecessor = Pointer::NULL;
        let mut at = self.root;
        while !at.is_null() {
            if before(&value, &self[at].value) {
                if self[at].left.is_null() {
                    predecessor = self[at].previous;
                    break;
                }
                at = self[at].left;
            } else {
                if self[at].right.is_null() {
                    predecessor = at;
                    break;
                }
                at = self[at].right;
            }
        }
        self.insert_after(predecessor.handle(), value)
    }

    pub fn remove(&mut self, handle: NodeHandle) -> T {
        let node = handle.0;

        // Unthread the node first
        let previous = self[node].previous;
        let next = self[node].next;
        if !next.is_null() {
            self[next].previous = previous;
        }
        if previous.is_null() {
            self.first = next;
        } else {
            self[previous].next = next;
        }

        let mut parent = self[node].parent;
        let left = self[node].left;
        let right = self[node].right;
        let replacement = if left.is_null() {
            right
        } else if right.is_null() {
            left
        } else {
            self.first_in_subtree(NodeHandle(right)).0
        };

        if parent.is_null() {
            self.root = replacement;
        } else if self[parent].left == node {
            self[parent].left = replacement;
        } else {
            self[parent].right = replacement;
        }

        // `child` ends up as the node that took the place of whatever was
        // physically unlinked, and `parent` as its parent
        let removed_red;
        let mut child;
        if !left.is_null() && !right.is_null() {
            removed_red = self[replacement].red;
            self[replacement].red = self[node].red;
            self[replacement].left = left;
            self[left].parent = replacement;
            if replacement != right {
                parent = self[replacement].parent;
                self[replacement].parent = self[node].parent;
                child = self[replacement].right;
                self[parent].left = child;
                self[replacement].right = right;
                self[right].parent = replacement;
            } else {
                self[replacement].parent = parent;
                parent = replacement;
                child = self[replacement].right;
            }
        } else {
            removed_red = self[node].red;
            child = replacement;
        }
        if !child.is_null() {
            self[child].parent = parent;
        }

        let value = self.nodes.remove(node.0).value;

        if removed_red {
            return value;
        }
        if self.is_red(child) {
            self[child].red = false;
            return value;
        }

        // `child` is short one black node on every path through it
        loop {
            if child == self.root {
                break;
            }
            let mut sibling;
            if child == self[parent].left {
                sibling = self[parent].right;
                if self.is_red(sibling) {
                    self[sibling].red = false;
                    self[parent].red = true;
                    self.rotate_left(parent);
                    sibling = self[parent].right;
                }
                if self.is_red(self[sibling].left) || self.is_red(self[sibling].right) {
                    if !self.is_red(self[sibling].right) {
                        let sibling_left = self[sibling].left;
                        self[sibling_left].red = false;
                        self[sibling].red = true;
                        self.rotate_right(sibling);
                        sibling = self[parent].right;
                    }
                    self[sibling].red = self[parent].red;
                    self[parent].red = false;
                    let sibling_right = self[sibling].right;
                    self[sibling_right].red = false;
                    self.rotate_left(parent);
                    child = self.root;
                    break;
                }
            } else {
                sibling = self[parent].left;
                if self.is_red(sibling) {
                    self[sibling].red = false;
                    self[parent].red = true;
                    self.rotate_right(parent);
                    sibling = self[parent].left;
                }
                if self.is_red(self[sibling].left) || self.is_red(self[sibling].right) {
                    if !self.is_red(self[sibling].left) {
                        let sibling_right = self[sibling].right;
                        self[sibling_right].red = false;
                        self[sibling].red = true;
                        self.rotate_left(sibling);
                        sibling = self[parent].left;
                    }
                    self[sibling].red = self[parent].red;
                    self[parent].red = false;
                    let sibling_left = self[sibling].left;
                    self[sibling_left].red = false;
                    self.rotate_right(parent);
                    child = self.root;
                    break;
                }
            }
            // Sibling has two black children: push the deficit up
            self[sibling].red = true;
            child = parent;
            parent = self[parent].parent;
            if self.is_red(child) {
                break;
            }
        }
        if !child.is_null() {
            self[child].red = false;
        }

        value
    }

    /// Renders the shape of the tree, one line per level.
    pub fn render<F>(&self, label: F) -> String
    where
        F: Fn(&T) -> String,
    {
        let root = if self.root.is_null() { None } else { Some(self.root) };
        treeprint::render(
            root,
            |at| {
                let left = self[*at].left;
                if left.is_null() { None } else { Some(left) }
            },
            |at| {
                let right = self[*at].right;
                if right.is_null() { None } else { Some(right) }
            },
            |at| {
                let node = &self[*at];
                format!("{}:{}", if node.red { "R" } else { "B" }, label(&node.value))
            },
        )
    }

    fn is_red(&self, at: Pointer) -> bool {
        !at.is_null() && self[at].red
    }

    fn insert_repair(&mut self, at: Pointer) {
        // Recolor upward while the parent is red; at most two rotations
        let mut node = at;
        let mut parent = self[node].parent;
        while self.is_red(parent) {
            // A red parent is never the root, so the grandparent exists
            let grandparent = self[parent].parent;
            if parent == self[grandparent].left {
                let uncle = self[grandparent].right;
                if self.is_red(uncle) {
                    self[parent].red = false;
                    self[uncle].red = false;
                    self[grandparent].red = true;
                    node = grandparent;
                } else {
                    if node == self[parent].right {
                        self.rotate_left(parent);
                        node = parent;
                        parent = self[node].parent;
                    }
                    self[parent].red = false;
                    self[grandparent].red = true;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self[grandparent].left;
                if self.is_red(uncle) {
                    self[parent].red = false;
                    self[uncle].red = false;
                    self[grandparent].red = true;
                    node = grandparent;
                } else {
                    if node == self[parent].left {
                        self.rotate_right(parent);
                        node = parent;
                        parent = self[node].parent;
                    }
                    self[parent].red = false;
                    self[grandparent].red = true;
                    self.rotate_left(grandparent);
                }
            }
            parent = self[node].parent;
        }
        let root = self.root;
        self[root].red = false;
    }

    fn rotate_left(&mut self, at: Pointer) {
        let parent = self[at].parent;
        let new_parent = self[at].right;
        debug_assert!(!new_parent.is_null());

        if parent.is_null() {
            self.root = new_parent;
        } else if self[parent].left == at {
            self[parent].left = new_parent;
        } else {
            self[parent].right = new_parent;
        }
        self[new_parent].parent = parent;
        self[at].parent = new_parent;
        self[at].right = self[new_parent].left;
        if !self[at].right.is_null() {
            let new_right = self[at].right;
            self[new_right].parent = at;
        }
        self[new_parent].left = at;
    }

    fn rotate_right(&mut self, at: Pointer) {
        let parent = self[at].parent;
        let new_parent = self[at].left;
        debug_assert!(!new_parent.is_null());

        if parent.is_null() {
            self.root = new_parent;
        } else if self[parent].left == at {
            self[parent].left = new_parent;
        } else {
            self[parent].right = new_parent;
        }
        self[new_parent].parent = parent;
        self[at].parent = new_parent;
        self[at].left = self[new_parent].right;
        if !self[at].left.is_null() {
            let new_left = self[at].left;
            self[new_left].parent = at;
        }
        self[new_parent].right = at;
    }
}

#[cfg(test)]
pub struct Iter<'a, T> {
    tree: &'a RbTree<T>,
    at: Pointer,
}

#[cfg(test)]
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.at.is_null() {
            return None;
        }
        let node = &self.tree[self.at];
        self.at = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
impl<T> RbTree<T> {
    pub fn last(&self) -> Option<NodeHandle> {
        self.root().map(|root| self.last_in_subtree(root))
    }

    pub fn last_in_subtree(&self, handle: NodeHandle) -> NodeHandle {
        let mut at = handle.0;
        while !self[at].right.is_null() {
            at = self[at].right;
        }
        NodeHandle(at)
    }

    /// Values in sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            at: self.first,
        }
    }

    // Checks the red-black rules, parent links and threading. Returns the
    // black height.
    fn check_invariants(&self) -> usize {
        fn black_height<T>(tree: &RbTree<T>, at: Pointer, in_order: &mut Vec<Pointer>) -> usize {
            if at.is_null() {
                return 1;
            }
            let node = &tree[at];
            for child in [node.left, node.right].iter() {
                if !child.is_null() {
                    assert_eq!(tree[*child].parent, at, "broken parent link");
                    assert!(!(node.red && tree[*child].red), "red node with red child");
                }
            }
            let left = black_height(tree, node.left, in_order);
            in_order.push(at);
            let right = black_height(tree, node.right, in_order);
            assert_eq!(left, right, "unequal black heights");
            left + if node.red { 0 } else { 1 }
        }

        if self.root.is_null() {
            assert!(self.first.is_null());
            assert_eq!(self.nodes.len(), 0);
            return 0;
        }
        assert!(!self[self.root].red, "red root");
        assert!(self[self.root].parent.is_null());

        let mut in_order = Vec::new();
        let height = black_height(self, self.root, &mut in_order);
        assert_eq!(in_order.len(), self.nodes.len());
        assert_eq!(self.first, in_order[0]);
        for pair in in_order.windows(2) {
            assert_eq!(self[pair[0]].next, pair[1], "broken next link");
            assert_eq!(self[pair[1]].previous, pair[0], "broken previous link");
        }
        assert!(self[in_order[0]].previous.is_null());
        assert!(self[*in_order.last().unwrap()].next.is_null());
        height
    }
}
