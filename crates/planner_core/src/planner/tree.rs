//! Arena-backed search tree.
//!
//! Nodes are addressed by [`NodeId`]. Detaching a node unlinks it from its
//! parent and puts its slot on a free list that later expansions reuse, so
//! the arena stays bounded by the live tree plus one batch of freed slots.
//! [`SearchTree::reroot`] and [`SearchTree::clear`] compact it outright.
//!
//! A [`NodeId`] is only meaningful while its node is live.

use crate::moves::Move;
use crate::world::Frame;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Vertex of the search tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    parent: Option<NodeId>,
    mv: Option<Move>,
    best_frames_seen: Option<Frame>,
    visits: u32,
    children: Option<Vec<NodeId>>,
}

impl Node {
    fn new(parent: Option<NodeId>, mv: Option<Move>) -> Self {
        Self {
            parent,
            mv,
            best_frames_seen: None,
            visits: 0,
            children: None,
        }
    }

    /// Parent node, absent for the root and for detached nodes.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Move leading into this node, absent for the root.
    #[must_use]
    pub const fn mv(&self) -> Option<Move> {
        self.mv
    }

    /// Lowest completion frame backed up through this node.
    #[must_use]
    pub const fn best_frames_seen(&self) -> Option<Frame> {
        self.best_frames_seen
    }

    /// Number of backups through this node.
    #[must_use]
    pub const fn visits(&self) -> u32 {
        self.visits
    }

    /// Children; `None` until expanded, empty for a dead end.
    #[must_use]
    pub fn children(&self) -> Option<&[NodeId]> {
        self.children.as_deref()
    }
}

/// The search tree.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
}

impl Default for SearchTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTree {
    /// A tree holding only an unexpanded root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None, None)],
            free: Vec::new(),
            root: NodeId(0),
        }
    }

    /// The root node id.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Number of arena slots, free ones included.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of freed slots awaiting reuse.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Number of nodes reachable from the root.
    #[must_use]
    pub fn live_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.node(id).children().unwrap_or_default());
        }
        count
    }

    /// Give `parent` one child per move; returns the new ids.
    pub(crate) fn expand(&mut self, parent: NodeId, moves: &[Move]) -> Vec<NodeId> {
        let ids: Vec<NodeId> = moves
            .iter()
            .map(|&mv| self.alloc(Node::new(Some(parent), Some(mv))))
            .collect();
        self.nodes[parent.index()].children = Some(ids.clone());
        ids
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id.index()] = node;
            id
        } else {
            self.nodes.push(node);
            NodeId((self.nodes.len() - 1) as u32)
        }
    }

    /// Put `id` and its whole subtree on the free list.
    fn release(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            stack.extend(node.children.take().unwrap_or_default());
            node.parent = None;
            self.free.push(id);
        }
    }

    /// Mark a node as a dead end.
    pub(crate) fn mark_dead(&mut self, id: NodeId) {
        self.nodes[id.index()].children = Some(Vec::new());
    }

    /// Detach `id` and every ancestor left without children.
    ///
    /// Stops at the first ancestor that keeps another child. The root is
    /// never detached; if pruning empties it, it is reset to unexpanded.
    /// Returns the number of nodes detached.
    pub(crate) fn prune(&mut self, id: NodeId) -> usize {
        let mut detached = 0;
        let mut current = id;
        loop {
            let Some(parent) = self.nodes[current.index()].parent else {
                self.nodes[current.index()].children = None;
                break;
            };
            let siblings = self.nodes[parent.index()]
                .children
                .get_or_insert_with(Vec::new);
            siblings.retain(|&c| c != current);
            let keeps_children = !siblings.is_empty();
            self.release(current);
            detached += 1;
            if keeps_children {
                break;
            }
            current = parent;
        }
        detached
    }

    /// Record `result` on `from` and every ancestor.
    pub(crate) fn backup(&mut self, from: NodeId, result: Frame) {
        let mut current = Some(from);
        while let Some(id) = current {
            let node = &mut self.nodes[id.index()];
            node.best_frames_seen = Some(node.best_frames_seen.map_or(result, |b| b.min(result)));
            node.visits += 1;
            current = node.parent;
        }
    }

    /// Make `id` the new root, discarding everything outside its subtree
    /// and compacting the arena.
    pub(crate) fn reroot(&mut self, id: NodeId) {
        let mut order = vec![id];
        let mut i = 0;
        while i < order.len() {
            order.extend(self.node(order[i]).children().unwrap_or_default());
            i += 1;
        }

        let mut remap = vec![None; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.index()] = Some(NodeId(new as u32));
        }
        let map = |old: NodeId| remap[old.index()];

        let nodes = order
            .iter()
            .map(|&old| {
                let node = &self.nodes[old.index()];
                Node {
                    parent: node.parent.and_then(map),
                    mv: node.mv,
                    best_frames_seen: node.best_frames_seen,
                    visits: node.visits,
                    children: node
                        .children
                        .as_ref()
                        .map(|c| c.iter().filter_map(|&c| map(c)).collect()),
                }
            })
            .collect::<Vec<_>>();

        self.nodes = nodes;
        self.free.clear();
        self.root = NodeId(0);
        let root = &mut self.nodes[0];
        root.parent = None;
        root.mv = None;
    }

    /// Drop everything and start over from an unexpanded root.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }
}
