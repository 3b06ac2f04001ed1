//! Arena-allocated document tree.
//!
//! Nodes are stored in a single vector and linked by index: each node knows its
//! parent, first/last child and previous/next sibling. A [`NodeId`] is therefore
//! a stable identity for a node for the lifetime of the [`Document`], which is
//! what the embed resolver relies on to tell apart two tags with the same `src`.
//!
//! Detaching a node unlinks it (and its subtree) from the tree but leaves it in
//! the arena. Documents are short-lived, one per build, so nothing is reclaimed.
//!
//! Elements keep their opening and closing tags exactly as they were read, and
//! text and other markup are kept verbatim. Serializing a tree that was never
//! modified reproduces its source.

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for "no node".
    const NONE: NodeId = NodeId(u32::MAX);

    fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root, or the holder a fragment is parsed into.
    Root,
    Element(Element),
    /// Character data exactly as written, entity references included.
    Text(String),
    /// Doctype, comment, processing instruction, CDATA section or a stray
    /// end tag, exactly as written.
    Markup(String),
}

/// An element and the source text of its tags.
#[derive(Debug, Clone)]
pub struct Element {
    /// Lower-cased tag name.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
    /// The opening tag as written, e.g. `<embed-file src='nav.html'>`.
    pub open_tag: String,
    /// The closing tag as written. `None` for void and self-closing elements
    /// and for elements whose end tag was implied.
    pub close_tag: Option<String>,
}

/// Attribute with a lower-cased name and the raw (still escaped) value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug)]
struct Node {
    data: NodeData,
    parent: NodeId,
    first_child: NodeId,
    last_child: NodeId,
    prev_sibling: NodeId,
    next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Mutable HTML document tree.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only its root.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId::NONE,
        };
        doc.root = doc.alloc(NodeData::Root);
        doc
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(data));
        id
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        if id.is_some() {
            self.nodes.get(id.0 as usize)
        } else {
            None
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_some() {
            self.nodes.get_mut(id.0 as usize)
        } else {
            None
        }
    }

    fn link(&self, id: NodeId, pick: fn(&Node) -> NodeId) -> NodeId {
        self.node(id).map(pick).unwrap_or(NodeId::NONE)
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Payload of a node.
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|n| &n.data)
    }

    /// Parent of a node, `None` for roots and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        Some(self.link(id, |n| n.parent)).filter(|p| p.is_some())
    }

    /// Create a detached root node that a fragment can be built under.
    pub fn create_holder(&mut self) -> NodeId {
        self.alloc(NodeData::Root)
    }

    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.alloc(NodeData::Element(element))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    pub fn create_markup(&mut self, markup: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Markup(markup.into()))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.link(parent, |n| n.last_child);

        if let Some(node) = self.node_mut(child) {
            node.parent = parent;
            node.prev_sibling = last;
        }
        if let Some(node) = self.node_mut(last) {
            node.next_sibling = child;
        }
        if let Some(node) = self.node_mut(parent) {
            if node.first_child == NodeId::NONE {
                node.first_child = child;
            }
            node.last_child = child;
        }
    }

    /// Append text to `parent`, extending its last child if that is already text.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last = self.link(parent, |n| n.last_child);
        if let Some(Node {
            data: NodeData::Text(existing),
            ..
        }) = self.node_mut(last)
        {
            existing.push_str(text);
            return;
        }
        let id = self.create_text(text);
        self.append(parent, id);
    }

    /// Insert `new_node` immediately before `sibling`, under the same parent.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        self.detach(new_node);
        let parent = self.link(sibling, |n| n.parent);
        let prev = self.link(sibling, |n| n.prev_sibling);

        if let Some(node) = self.node_mut(new_node) {
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = sibling;
        }
        if let Some(node) = self.node_mut(sibling) {
            node.prev_sibling = new_node;
        }
        if prev.is_some() {
            if let Some(node) = self.node_mut(prev) {
                node.next_sibling = new_node;
            }
        } else if let Some(node) = self.node_mut(parent) {
            node.first_child = new_node;
        }
    }

    /// Unlink a node, with its subtree, from its parent and siblings.
    pub fn detach(&mut self, id: NodeId) {
        let parent = self.link(id, |n| n.parent);
        let prev = self.link(id, |n| n.prev_sibling);
        let next = self.link(id, |n| n.next_sibling);

        if let Some(node) = self.node_mut(prev) {
            node.next_sibling = next;
        } else if let Some(node) = self.node_mut(parent) {
            node.first_child = next;
        }
        if let Some(node) = self.node_mut(next) {
            node.prev_sibling = prev;
        } else if let Some(node) = self.node_mut(parent) {
            node.last_child = prev;
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Iterate over the children of a node.
    pub fn children(&self, parent: NodeId) -> Children<'_> {
        Children {
            doc: self,
            current: self.link(parent, |n| n.first_child),
        }
    }

    /// All descendants of `from` in document order (pre-order), excluding `from`.
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(from).collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            out.push(id);
            let len = stack.len();
            stack.extend(self.children(id));
            stack[len..].reverse();
        }
        out
    }

    /// Elements with the given (lower-case) tag name, in document order.
    pub fn elements_named(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.element(id).is_some_and(|e| e.name == name))
            .collect()
    }

    /// The element behind a node, if it is one.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.node_mut(id).map(|n| &mut n.data) {
            Some(NodeData::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Raw value of an attribute. Names are matched case-insensitively.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    current: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if !self.current.is_some() {
            return None;
        }
        let id = self.current;
        self.current = self.doc.link(id, |n| n.next_sibling);
        Some(id)
    }
}
