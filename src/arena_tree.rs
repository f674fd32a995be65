//! A DOM-like tree data structure based on `&Node` references.
//!
//! Based on <https://github.com/SimonSapin/rust-forest/blob/5783c8be8680b84c0438638bdee07d4e4aca40ac/arena-tree/lib.rs>.
//! MIT license (per Cargo.toml).
//!
//! Any non-trivial tree involves reference cycles (e.g. if a node has a first
//! child, the parent of the child is this node). To enable this, nodes need
//! to live in an arena allocator such as `typed_arena::Arena`, and links are
//! `Cell`s so they can be rewired through shared references.

use std::cell::Cell;
use std::fmt;

/// A node inside a DOM-like tree.
pub struct Node<'a, T: 'a> {
    parent: Cell<Option<&'a Node<'a, T>>>,
    previous_sibling: Cell<Option<&'a Node<'a, T>>>,
    next_sibling: Cell<Option<&'a Node<'a, T>>>,
    first_child: Cell<Option<&'a Node<'a, T>>>,
    last_child: Cell<Option<&'a Node<'a, T>>>,

    /// The data held by the node.
    pub data: T,
}

/// Prints the node's data and, in alternate mode, its children as a tree,
/// without looping through the parent/sibling pointer cycles.
impl<'a, T: 'a> fmt::Debug for Node<'a, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alternate = f.alternate();
        let mut struct_fmt = f.debug_struct("Node");
        struct_fmt.field("data", &self.data);
        if alternate && self.first_child.get().is_some() {
            let mut children = vec![];
            let mut child = self.first_child.get();
            while let Some(c) = child {
                children.push(c);
                child = c.next_sibling.get();
            }
            struct_fmt.field("children", &children);
        }
        struct_fmt.finish()
    }
}

impl<'a, T> Node<'a, T> {
    /// Create a new node from its associated data.
    ///
    /// Typically, this node needs to be moved into an arena allocator
    /// before it can be used in a tree.
    pub fn new(data: T) -> Node<'a, T> {
        Node {
            parent: Cell::new(None),
            first_child: Cell::new(None),
            last_child: Cell::new(None),
            previous_sibling: Cell::new(None),
            next_sibling: Cell::new(None),
            data,
        }
    }

    /// Return a reference to the parent node, unless this node is the root of the tree.
    pub fn parent(&self) -> Option<&'a Node<'a, T>> {
        self.parent.get()
    }

    /// Return a reference to the first child of this node, unless it has no child.
    pub fn first_child(&self) -> Option<&'a Node<'a, T>> {
        self.first_child.get()
    }

    /// Return a reference to the last child of this node, unless it has no child.
    pub fn last_child(&self) -> Option<&'a Node<'a, T>> {
        self.last_child.get()
    }

    /// Return a reference to the previous sibling of this node, unless it is a first child.
    pub fn previous_sibling(&self) -> Option<&'a Node<'a, T>> {
        self.previous_sibling.get()
    }

    /// Return a reference to the next sibling of this node, unless it is a last child.
    pub fn next_sibling(&self) -> Option<&'a Node<'a, T>> {
        self.next_sibling.get()
    }

    /// Returns whether two references point to the same node.
    pub fn same_node(&self, other: &Node<'a, T>) -> bool {
        std::ptr::eq(self, other)
    }

    /// Return an iterator of references to this node and its ancestors.
    ///
    /// Call `.next().unwrap()` once on the iterator to skip the node itself.
    pub fn ancestors(&'a self) -> Ancestors<'a, T> {
        Ancestors(Some(self))
    }

    /// Return an iterator of references to this node's children.
    pub fn children(&'a self) -> Children<'a, T> {
        Children(self.first_child.get())
    }

    /// Return an iterator of references to this node and its descendants, in tree order.
    ///
    /// Parent nodes appear before the descendants.
    /// Call `.next().unwrap()` once on the iterator to skip the node itself.
    pub fn descendants(&'a self) -> Descendants<'a, T> {
        Descendants(self.traverse())
    }

    /// Return an iterator of `NodeEdge` enums for each node and its
    /// descendants, in tree order.
    pub fn traverse(&'a self) -> Traverse<'a, T> {
        Traverse {
            root: self,
            next: Some(NodeEdge::Start(self)),
        }
    }

    /// Detach a node from its parent and siblings. Children are not affected.
    pub fn detach(&self) {
        let parent = self.parent.take();
        let previous_sibling = self.previous_sibling.take();
        let next_sibling = self.next_sibling.take();

        if let Some(next_sibling) = next_sibling {
            next_sibling.previous_sibling.set(previous_sibling);
        } else if let Some(parent) = parent {
            parent.last_child.set(previous_sibling);
        }

        if let Some(previous_sibling) = previous_sibling {
            previous_sibling.next_sibling.set(next_sibling);
        } else if let Some(parent) = parent {
            parent.first_child.set(next_sibling);
        }
    }

    /// Append a new child to this node, after existing children.
    pub fn append(&'a self, new_child: &'a Node<'a, T>) {
        new_child.detach();
        new_child.parent.set(Some(self));
        if let Some(last_child) = self.last_child.take() {
            new_child.previous_sibling.set(Some(last_child));
            debug_assert!(last_child.next_sibling.get().is_none());
            last_child.next_sibling.set(Some(new_child));
        } else {
            debug_assert!(self.first_child.get().is_none());
            self.first_child.set(Some(new_child));
        }
        self.last_child.set(Some(new_child));
    }

    /// Insert a new sibling after this node.
    pub fn insert_after(&'a self, new_sibling: &'a Node<'a, T>) {
        new_sibling.detach();
        new_sibling.parent.set(self.parent.get());
        new_sibling.previous_sibling.set(Some(self));
        if let Some(next_sibling) = self.next_sibling.take() {
            debug_assert!(next_sibling
                .previous_sibling
                .get()
                .map_or(false, |n| n.same_node(self)));
            next_sibling.previous_sibling.set(Some(new_sibling));
            new_sibling.next_sibling.set(Some(next_sibling));
        } else if let Some(parent) = self.parent.get() {
            parent.last_child.set(Some(new_sibling));
        }
        self.next_sibling.set(Some(new_sibling));
    }

    /// Insert a new sibling before this node.
    pub fn insert_before(&'a self, new_sibling: &'a Node<'a, T>) {
        new_sibling.detach();
        new_sibling.parent.set(self.parent.get());
        new_sibling.next_sibling.set(Some(self));
        if let Some(previous_sibling) = self.previous_sibling.take() {
            new_sibling.previous_sibling.set(Some(previous_sibling));
            debug_assert!(previous_sibling
                .next_sibling
                .get()
                .map_or(false, |n| n.same_node(self)));
            previous_sibling.next_sibling.set(Some(new_sibling));
        } else if let Some(parent) = self.parent.get() {
            parent.first_child.set(Some(new_sibling));
        }
        self.previous_sibling.set(Some(new_sibling));
    }
}

macro_rules! axis_iterator {
    (#[$attr:meta] $name:ident : $next:ident) => {
        #[$attr]
        #[derive(Debug)]
        pub struct $name<'a, T: 'a>(Option<&'a Node<'a, T>>);

        impl<'a, T> Iterator for $name<'a, T> {
            type Item = &'a Node<'a, T>;

            fn next(&mut self) -> Option<&'a Node<'a, T>> {
                match self.0.take() {
                    Some(node) => {
                        self.0 = node.$next.get();
                        Some(node)
                    }
                    None => None,
                }
            }
        }
    };
}

axis_iterator! {
    #[doc = "An iterator of references to the ancestors a given node."]
    Ancestors: parent
}

axis_iterator! {
    #[doc = "An iterator of references to the children of a given node."]
    Children: next_sibling
}

/// An iterator of references to a given node and its descendants, in tree order.
#[derive(Debug)]
pub struct Descendants<'a, T: 'a>(Traverse<'a, T>);

impl<'a, T> Iterator for Descendants<'a, T> {
    type Item = &'a Node<'a, T>;

    fn next(&mut self) -> Option<&'a Node<'a, T>> {
        loop {
            match self.0.next() {
                Some(NodeEdge::Start(node)) => return Some(node),
                Some(NodeEdge::End(_)) => {}
                None => return None,
            }
        }
    }
}

/// Indicator if the node is at a start or endpoint of the tree
#[derive(Debug, Clone)]
pub enum NodeEdge<T> {
    /// Indicates that start of a node that has children.
    /// Yielded by `Traverse::next` before the node's descendants.
    /// In HTML, this corresponds to an opening tag like `<div>`.
    Start(T),

    /// Indicates that end of a node that has children.
    /// Yielded by `Traverse::next` after the node's descendants.
    /// In HTML, this corresponds to a closing tag like `</div>`.
    End(T),
}

/// An iterator of the start and end edges of a node and its descendants.
#[derive(Debug)]
pub struct Traverse<'a, T: 'a> {
    root: &'a Node<'a, T>,
    next: Option<NodeEdge<&'a Node<'a, T>>>,
}

impl<'a, T> Iterator for Traverse<'a, T> {
    type Item = NodeEdge<&'a Node<'a, T>>;

    fn next(&mut self) -> Option<NodeEdge<&'a Node<'a, T>>> {
        match self.next.take() {
            Some(item) => {
                self.next = match item {
                    NodeEdge::Start(node) => match node.first_child.get() {
                        Some(child) => Some(NodeEdge::Start(child)),
                        None => Some(NodeEdge::End(node)),
                    },
                    NodeEdge::End(node) => {
                        if node.same_node(self.root) {
                            None
                        } else {
                            match node.next_sibling.get() {
                                Some(sibling) => Some(NodeEdge::Start(sibling)),
                                None => node.parent.get().map(NodeEdge::End),
                            }
                        }
                    }
                };
                Some(item)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typed_arena::Arena;

    #[test]
    fn append_and_traverse() {
        let arena = Arena::new();
        let root = arena.alloc(Node::new(0));
        let a = arena.alloc(Node::new(1));
        let b = arena.alloc(Node::new(2));
        let c = arena.alloc(Node::new(3));
        root.append(a);
        root.append(c);
        a.append(b);

        let order: Vec<i32> = root.descendants().map(|n| n.data).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);

        let ancestors: Vec<i32> = b.ancestors().map(|n| n.data).collect();
        assert_eq!(ancestors, vec![2, 1, 0]);
    }

    #[test]
    fn insert_and_detach() {
        let arena = Arena::new();
        let root = arena.alloc(Node::new(0));
        let a = arena.alloc(Node::new(1));
        let b = arena.alloc(Node::new(2));
        let c = arena.alloc(Node::new(3));
        root.append(b);
        b.insert_before(a);
        b.insert_after(c);

        let children: Vec<i32> = root.children().map(|n| n.data).collect();
        assert_eq!(children, vec![1, 2, 3]);

        b.detach();
        let children: Vec<i32> = root.children().map(|n| n.data).collect();
        assert_eq!(children, vec![1, 3]);
        assert!(b.parent().is_none());
        assert!(root.first_child().unwrap().same_node(a));
        assert!(root.last_child().unwrap().same_node(c));
        assert!(a.next_sibling().unwrap().same_node(c));
        assert!(c.previous_sibling().unwrap().same_node(a));
    }

    #[test]
    fn traverse_subtree_stops_at_root() {
        let arena = Arena::new();
        let root = arena.alloc(Node::new(0));
        let a = arena.alloc(Node::new(1));
        let b = arena.alloc(Node::new(2));
        root.append(a);
        root.append(b);

        let order: Vec<i32> = a.descendants().map(|n| n.data).collect();
        assert_eq!(order, vec![1]);
    }

    #[test]
    fn debug_shows_children_only_when_alternate() {
        let arena = Arena::new();
        let root = arena.alloc(Node::new(0));
        root.append(arena.alloc(Node::new(1)));

        assert_eq!(format!("{:?}", root), "Node { data: 0 }");
        let pretty = format!("{:#?}", root);
        assert!(pretty.contains("children"));
        assert!(pretty.contains("data: 1"));
        assert!(!format!("{:#?}", root.first_child().unwrap()).contains("children"));
    }
}
