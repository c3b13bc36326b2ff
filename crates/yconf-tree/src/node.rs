//! Node storage and navigation.
//!
//! All nodes of a document live in one [`Tree`] and refer to each other by
//! [`NodeId`]. A node owns its children through the id list in its payload;
//! its `parent` id is only a back-reference. Nodes are only ever created as a
//! fresh child of an existing node, so the structure cannot contain cycles.

use std::fmt;

use yconf_tokenizer::Span;

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The document root.
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Not decided yet. Only seen while a tree is being built.
    Unset,
    /// A scalar with text.
    Scalar,
    /// An ordered list of anonymous children.
    List,
    /// An ordered list of keyed children.
    Dict,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Unset => "unset node",
            NodeKind::Scalar => "scalar",
            NodeKind::List => "list",
            NodeKind::Dict => "dict",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Payload {
    Unset,
    /// `None` until the builder assigns the text.
    Scalar(Option<String>),
    List(Vec<NodeId>),
    Dict(Vec<NodeId>),
}

impl Payload {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Payload::Unset => NodeKind::Unset,
            Payload::Scalar(_) => NodeKind::Scalar,
            Payload::List(_) => NodeKind::List,
            Payload::Dict(_) => NodeKind::Dict,
        }
    }

    fn children(&self) -> &[NodeId] {
        match self {
            Payload::List(children) | Payload::Dict(children) => children,
            Payload::Unset | Payload::Scalar(_) => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    pub(crate) key: Option<String>,
    pub(crate) payload: Payload,
    pub(crate) span: Span,
}

/// A parsed document.
///
/// The root is always a list or a dict; an empty document has an empty dict
/// as its root.
#[derive(Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    /// A tree holding only an undecided root.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                key: None,
                payload: Payload::Unset,
                span: Span::default(),
            }],
        }
    }

    /// The document root.
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        (id.index() < self.nodes.len()).then_some(Node { tree: self, id })
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    /// Append an undecided child to a list or dict node.
    ///
    /// The caller makes sure `parent` is a container.
    pub(crate) fn append_child(&mut self, parent: NodeId, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            parent: Some(parent),
            key: None,
            payload: Payload::Unset,
            span,
        });
        if let Payload::List(children) | Payload::Dict(children) =
            &mut self.data_mut(parent).payload
        {
            children.push(id);
        }
        id
    }

    /// Settle everything the builder left undecided: an undecided root is an
    /// empty dict, any other undecided node or text-less scalar is an empty
    /// scalar.
    pub(crate) fn normalize(&mut self) {
        for (index, node) in self.nodes.iter_mut().enumerate() {
            match node.payload {
                Payload::Unset if index == NodeId::ROOT.index() => {
                    node.payload = Payload::Dict(Vec::new());
                }
                Payload::Unset | Payload::Scalar(None) => {
                    node.payload = Payload::Scalar(Some(String::new()));
                }
                _ => {}
            }
        }
    }
}

impl PartialEq for Tree {
    /// Structural equality: kinds, keys, texts and child order. Spans and
    /// node ids are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.root() == other.root()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.root(), f)
    }
}

/// A borrowed handle to one node of a [`Tree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> Node<'t> {
    #[inline]
    fn data(&self) -> &'t NodeData {
        self.tree.data(self.id)
    }

    /// The id of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whether this node is unset, a scalar, a list or a dict.
    pub fn kind(&self) -> NodeKind {
        self.data().payload.kind()
    }

    /// The key of a dict entry. `None` for list items and the root.
    pub fn key(&self) -> Option<&'t str> {
        self.data().key.as_deref()
    }

    /// The enclosing node. `None` for the root.
    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| Node {
            tree: self.tree,
            id,
        })
    }

    /// Whether this is the document root.
    pub fn is_root(&self) -> bool {
        self.data().parent.is_none()
    }

    /// Source location of the key (for dict entries) or of the value.
    pub fn span(&self) -> Span {
        self.data().span
    }

    /// Check if this node holds scalar text.
    pub fn is_scalar(&self) -> bool {
        self.kind() == NodeKind::Scalar
    }

    /// Check if this node is a list.
    pub fn is_list(&self) -> bool {
        self.kind() == NodeKind::List
    }

    /// Check if this node is a dict.
    pub fn is_dict(&self) -> bool {
        self.kind() == NodeKind::Dict
    }

    /// Children in document order. Empty for scalars.
    pub fn children(&self) -> Children<'t> {
        Children {
            tree: self.tree,
            ids: self.data().payload.children().iter(),
        }
    }

    /// Number of children. Zero for scalars.
    pub fn child_count(&self) -> usize {
        self.data().payload.children().len()
    }

    /// The text of a scalar node.
    pub(crate) fn scalar_text(&self) -> Option<&'t str> {
        match &self.data().payload {
            Payload::Scalar(text) => Some(text.as_deref().unwrap_or("")),
            _ => None,
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
            && self.key() == other.key()
            && self.scalar_text() == other.scalar_text()
            && self.child_count() == other.child_count()
            && self.children().zip(other.children()).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Unset => f.write_str("Unset"),
            NodeKind::Scalar => fmt::Debug::fmt(self.scalar_text().unwrap_or(""), f),
            NodeKind::List => f.debug_list().entries(self.children()).finish(),
            NodeKind::Dict => f
                .debug_map()
                .entries(self.children().map(|child| (child.key().unwrap_or(""), child)))
                .finish(),
        }
    }
}

/// Iterator over the children of a node.
#[derive(Clone)]
pub struct Children<'t> {
    tree: &'t Tree,
    ids: std::slice::Iter<'t, NodeId>,
}

impl<'t> Iterator for Children<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = *self.ids.next()?;
        Some(Node {
            tree: self.tree,
            id,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let id = *self.ids.next_back()?;
        Some(Node {
            tree: self.tree,
            id,
        })
    }
}

impl ExactSizeIterator for Children<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut tree = Tree::new();
        tree.data_mut(NodeId::ROOT).payload = Payload::Dict(Vec::new());
        let a = tree.append_child(NodeId::ROOT, Span::new(0, 1));
        tree.data_mut(a).key = Some("a".into());
        tree.data_mut(a).payload = Payload::List(Vec::new());
        let item = tree.append_child(a, Span::new(5, 6));
        tree.data_mut(item).payload = Payload::Scalar(Some("x".into()));
        tree
    }

    #[test]
    fn test_navigation() {
        let tree = sample();
        let root = tree.root();
        assert!(root.is_root());
        assert_eq!(root.kind(), NodeKind::Dict);

        let a = root.children().next().unwrap();
        assert_eq!(a.key(), Some("a"));
        assert!(a.is_list());
        assert_eq!(a.parent().map(|p| p.id()), Some(NodeId::ROOT));

        let item = a.children().next_back().unwrap();
        assert_eq!(item.key(), None);
        assert_eq!(item.scalar_text(), Some("x"));
        assert_eq!(item.span(), Span::new(5, 6));
        assert_eq!(item.parent().unwrap().id(), a.id());
        assert_eq!(tree.node(item.id()).map(|n| n.id()), Some(item.id()));
    }

    #[test]
    fn test_normalize() {
        let mut tree = Tree::new();
        tree.normalize();
        assert!(tree.root().is_dict());
        assert_eq!(tree.root().child_count(), 0);

        let mut tree = Tree::new();
        tree.data_mut(NodeId::ROOT).payload = Payload::List(Vec::new());
        let item = tree.append_child(NodeId::ROOT, Span::default());
        tree.normalize();
        assert_eq!(tree.node(item).unwrap().scalar_text(), Some(""));
        assert!(tree.node(NodeId(99)).is_none());
    }

    #[test]
    fn test_structural_equality_ignores_spans() {
        let a = sample();
        let mut b = sample();
        for id in 0..b.node_count() {
            b.data_mut(NodeId(id as u32)).span = Span::default();
        }
        assert_eq!(a, b);

        b.data_mut(NodeId(2)).payload = Payload::Scalar(Some("y".into()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", sample()), r#"{"a": ["x"]}"#);
    }
}
