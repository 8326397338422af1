use std::sync::Arc;

use crate::node_kind::NodeKind;
use crate::source_location::SourceLocation;

/// Handle into a [`Tree`]'s node arena.
///
/// Index `0` is the sentinel and is never a real node; every handle returned
/// by [`Tree::add_node`] is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId(u32);

impl NodeId {
    /// The sentinel handle, always present at arena slot zero.
    pub const SENTINEL: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_sentinel(self) -> bool {
        self.0 == 0
    }
}

/// A compact record of the token a node was built from, enough to render
/// diagnostics and pretty-print the tree without the arena depending on the
/// lexer's token type.
#[derive(Debug, Clone)]
pub struct NodeToken {
    pub spelling: Arc<str>,
    pub location: SourceLocation,
}

impl NodeToken {
    pub fn new(spelling: impl Into<Arc<str>>, location: SourceLocation) -> Self {
        NodeToken {
            spelling: spelling.into(),
            location,
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    token: NodeToken,
    parent: NodeId,
    children: Vec<NodeId>,
    has_error: bool,
}

/// A flat, index-addressed abstract syntax tree.
///
/// Nodes are appended in arena order and linked into a tree with
/// [`add_child`](Tree::add_child). Unlike a tree of boxed enum variants, the
/// arena never needs interior pointers or lifetimes: every reference between
/// nodes is a plain `NodeId`, so the whole tree is `'static` and trivially
/// movable.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates an empty tree containing only the sentinel at slot 0.
    pub fn new(file: Arc<str>) -> Self {
        Tree {
            nodes: vec![Node {
                kind: NodeKind::Invalid,
                token: NodeToken::new("", SourceLocation::synthetic(file)),
                parent: NodeId::SENTINEL,
                children: Vec::new(),
                has_error: false,
            }],
        }
    }

    /// Appends a new, unparented node and returns its handle.
    ///
    /// The node has no parent until it is linked in with
    /// [`add_child`](Tree::add_child).
    pub fn add_node(&mut self, kind: NodeKind, token: NodeToken) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            token,
            parent: NodeId::SENTINEL,
            children: Vec::new(),
            has_error: false,
        });
        id
    }

    /// Links `child` under `parent`, unlinking it from any previous parent
    /// first.
    ///
    /// Returns `false` without modifying the tree if either handle is the
    /// sentinel or out of range, or if linking would create a cycle (`parent`
    /// already lies within `child`'s subtree). A rejected cycle marks
    /// `parent` as erroneous, since the caller's tree-building invariant was
    /// violated.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_valid(parent) || !self.is_valid(child) || parent == child {
            return false;
        }
        if self.is_ancestor(child, parent) {
            self.mark_error(parent);
            return false;
        }

        let previous_parent = self.nodes[child.index()].parent;
        if !previous_parent.is_sentinel() {
            let siblings = &mut self.nodes[previous_parent.index()].children;
            if let Some(pos) = siblings.iter().position(|&id| id == child) {
                siblings.remove(pos);
            }
        }

        self.nodes[child.index()].parent = parent;
        self.nodes[parent.index()].children.push(child);

        if self.nodes[child.index()].has_error {
            self.propagate_error(parent);
        }
        true
    }

    /// Marks `node` as erroneous and propagates the error bit to every
    /// ancestor up to (but not through) the sentinel.
    pub fn mark_error(&mut self, node: NodeId) {
        if !self.is_valid(node) {
            return;
        }
        self.nodes[node.index()].has_error = true;
        self.propagate_error(node);
    }

    fn propagate_error(&mut self, start: NodeId) {
        let mut current = start;
        loop {
            if !self.is_valid(current) {
                return;
            }
            if self.nodes[current.index()].has_error {
                let parent = self.nodes[current.index()].parent;
                if parent.is_sentinel() || parent == current {
                    return;
                }
                if self.nodes[parent.index()].has_error {
                    return;
                }
                self.nodes[parent.index()].has_error = true;
                current = parent;
            } else {
                return;
            }
        }
    }

    /// Walks up from `node` through parent links; `true` if `ancestor` is
    /// found along the way (including `node` itself).
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == ancestor {
                return true;
            }
            if !self.is_valid(current) {
                return false;
            }
            let parent = self.nodes[current.index()].parent;
            if parent == current || parent.is_sentinel() {
                return false;
            }
            current = parent;
        }
    }

    fn is_valid(&self, id: NodeId) -> bool {
        !id.is_sentinel() && id.index() < self.nodes.len()
    }

    /// The unique non-sentinel node with no parent, if the tree has been
    /// wired up that way. Returns `None` for an empty tree.
    pub fn root(&self) -> Option<NodeId> {
        (1..self.nodes.len())
            .map(|i| NodeId(i as u32))
            .find(|&id| self.nodes[id.index()].parent.is_sentinel())
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        if self.is_valid(node) {
            self.nodes[node.index()].kind
        } else {
            NodeKind::Invalid
        }
    }

    pub fn spelling(&self, node: NodeId) -> &str {
        if self.is_valid(node) {
            &self.nodes[node.index()].token.spelling
        } else {
            ""
        }
    }

    pub fn location(&self, node: NodeId) -> Option<&SourceLocation> {
        if self.is_valid(node) {
            Some(&self.nodes[node.index()].token.location)
        } else {
            None
        }
    }

    pub fn line(&self, node: NodeId) -> usize {
        if self.is_valid(node) {
            self.nodes[node.index()].token.location.line
        } else {
            0
        }
    }

    pub fn has_error(&self, node: NodeId) -> bool {
        self.is_valid(node) && self.nodes[node.index()].has_error
    }

    pub fn parent(&self, node: NodeId) -> NodeId {
        if self.is_valid(node) {
            self.nodes[node.index()].parent
        } else {
            NodeId::SENTINEL
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        if self.is_valid(node) {
            &self.nodes[node.index()].children
        } else {
            &[]
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deterministic post-order iteration over `root`'s subtree (`root`
    /// included, visited last).
    pub fn post_order(&self, root: NodeId) -> PostOrder<'_> {
        let stack = if self.is_valid(root) {
            vec![(root, 0usize)]
        } else {
            Vec::new()
        };
        PostOrder { tree: self, stack }
    }
}

/// Iterative post-order traversal. Exhausting the iterator (returning `None`)
/// is the arena's equivalent of reaching a past-the-end handle.
pub struct PostOrder<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> Iterator for PostOrder<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let &mut (node, child_idx) = self.stack.last_mut()?;
            let children = self.tree.children(node);
            if child_idx < children.len() {
                let child = children[child_idx];
                self.stack.last_mut().unwrap().1 += 1;
                self.stack.push((child, 0));
            } else {
                self.stack.pop();
                return Some(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(file: &Arc<str>) -> SourceLocation {
        SourceLocation::new(file.clone(), 1, 1, 0, 1)
    }

    #[test]
    fn sentinel_queries_return_defaults() {
        let file: Arc<str> = Arc::from("test.ziv");
        let tree = Tree::new(file);
        assert_eq!(tree.kind(NodeId::SENTINEL), NodeKind::Invalid);
        assert_eq!(tree.spelling(NodeId::SENTINEL), "");
        assert_eq!(tree.line(NodeId::SENTINEL), 0);
        assert!(!tree.has_error(NodeId::SENTINEL));
        assert!(tree.root().is_none());
    }

    #[test]
    fn add_child_links_and_reparents() {
        let file: Arc<str> = Arc::from("test.ziv");
        let mut tree = Tree::new(file.clone());
        let root = tree.add_node(NodeKind::FileStart, NodeToken::new("", loc(&file)));
        let a = tree.add_node(NodeKind::VariableDecl, NodeToken::new("x", loc(&file)));
        let b = tree.add_node(NodeKind::VariableDecl, NodeToken::new("y", loc(&file)));

        assert!(tree.add_child(root, a));
        assert!(tree.add_child(root, b));
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.root(), Some(root));

        let other_root = tree.add_node(NodeKind::FileStart, NodeToken::new("", loc(&file)));
        assert!(tree.add_child(other_root, a));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.children(other_root), &[a]);
    }

    #[test]
    fn add_child_rejects_cycles_and_flags_error() {
        let file: Arc<str> = Arc::from("test.ziv");
        let mut tree = Tree::new(file.clone());
        let a = tree.add_node(NodeKind::CodeBlock, NodeToken::new("", loc(&file)));
        let b = tree.add_node(NodeKind::CodeBlock, NodeToken::new("", loc(&file)));
        assert!(tree.add_child(a, b));
        assert!(!tree.add_child(b, a));
        assert!(tree.has_error(b));
    }

    #[test]
    fn error_propagates_to_ancestors() {
        let file: Arc<str> = Arc::from("test.ziv");
        let mut tree = Tree::new(file.clone());
        let root = tree.add_node(NodeKind::FileStart, NodeToken::new("", loc(&file)));
        let block = tree.add_node(NodeKind::CodeBlock, NodeToken::new("", loc(&file)));
        let leaf = tree.add_node(NodeKind::Error, NodeToken::new("", loc(&file)));
        tree.add_child(root, block);
        tree.add_child(block, leaf);

        tree.mark_error(leaf);
        assert!(tree.has_error(leaf));
        assert!(tree.has_error(block));
        assert!(tree.has_error(root));
    }

    #[test]
    fn post_order_visits_children_before_parent() {
        let file: Arc<str> = Arc::from("test.ziv");
        let mut tree = Tree::new(file.clone());
        let root = tree.add_node(NodeKind::FileStart, NodeToken::new("", loc(&file)));
        let a = tree.add_node(NodeKind::VariableDecl, NodeToken::new("a", loc(&file)));
        let b = tree.add_node(NodeKind::VariableDecl, NodeToken::new("b", loc(&file)));
        tree.add_child(root, a);
        tree.add_child(root, b);

        let order: Vec<NodeId> = tree.post_order(root).collect();
        assert_eq!(order, vec![a, b, root]);
    }
}
