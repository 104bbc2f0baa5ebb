use super::node::{Node, NodeId};
use crate::error::{PlayerError, PlayerResult};
use crate::script::{NodeKind, NodeSpec, Property, Value};

/// Arena-backed node tree. Index 0 always holds the scene root container.
#[derive(Debug, Clone)]
pub struct SceneTree {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_indices: Vec<usize>,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(NodeKind::Container))],
            generations: vec![0],
            free_indices: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::from_parts(0, 0)
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.root_children().is_empty()
    }

    pub fn root_children(&self) -> &[NodeId] {
        self.nodes[0]
            .as_ref()
            .map(|root| root.children.as_slice())
            .unwrap_or(&[])
    }

    /// Insert a detached node, returns its handle
    pub fn insert(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free_indices.pop() {
            self.nodes[index] = Some(node);
            return NodeId::from_parts(index as u32, self.generations[index]);
        }

        let index = self.nodes.len();
        self.nodes.push(Some(node));
        self.generations.push(0);
        NodeId::from_parts(index as u32, 0)
    }

    /// Instantiate a declarative node subtree. Children are created first and
    /// attached in declaration order; the returned subtree root is detached.
    pub fn build(&mut self, spec: &NodeSpec) -> PlayerResult<NodeId> {
        let mut node = Node::new(spec.kind);
        node.name = spec.name.clone();
        for (property, value) in &spec.props {
            let stored = coerce(*property, value.clone())?;
            node.props.insert(*property, stored);
        }

        let mut children = Vec::with_capacity(spec.children.len());
        for child in &spec.children {
            children.push(self.build(child)?);
        }

        let id = self.insert(node);
        for child in children {
            self.add_child(id, child)?;
        }
        Ok(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> PlayerResult<&Node> {
        self.slot(id)
            .ok_or_else(|| PlayerError::DanglingReference(id.to_string()))
    }

    pub fn get_mut(&mut self, id: NodeId) -> PlayerResult<&mut Node> {
        if !self.contains(id) {
            return Err(PlayerError::DanglingReference(id.to_string()));
        }
        match self.nodes[id.index() as usize].as_mut() {
            Some(node) => Ok(node),
            None => Err(PlayerError::DanglingReference(id.to_string())),
        }
    }

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere. Returns `parent` so calls can be chained.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> PlayerResult<NodeId> {
        self.get(parent)?;
        self.get(child)?;
        if child == self.root() || self.is_ancestor(child, parent) {
            return Err(PlayerError::DanglingReference(format!(
                "{} cannot be attached beneath its own subtree",
                child
            )));
        }

        self.detach(child)?;
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        Ok(parent)
    }

    /// Detach a node (and with it its subtree) from its parent. No-op when
    /// the node is already detached.
    pub fn detach(&mut self, id: NodeId) -> PlayerResult<()> {
        let Some(parent) = self.get(id)?.parent else {
            return Ok(());
        };
        self.get_mut(parent)?.children.retain(|c| *c != id);
        self.get_mut(id)?.parent = None;
        Ok(())
    }

    /// Detach and free a subtree. Handles into it become dangling.
    pub fn dispose(&mut self, id: NodeId) -> PlayerResult<()> {
        if id == self.root() {
            return Err(PlayerError::DanglingReference(
                "the scene root cannot be disposed".into(),
            ));
        }
        self.detach(id)?;

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let index = current.index() as usize;
            if let Some(node) = self.nodes[index].take() {
                pending.extend(node.children);
                self.generations[index] = self.generations[index].wrapping_add(1);
                self.free_indices.push(index);
            }
        }
        Ok(())
    }

    /// Whether the node is reachable from the scene root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.is_ancestor(self.root(), id)
    }

    pub fn property(&self, id: NodeId, property: Property) -> PlayerResult<Value> {
        Ok(self.get(id)?.get(property))
    }

    pub fn set_property(
        &mut self,
        id: NodeId,
        property: Property,
        value: Value,
    ) -> PlayerResult<()> {
        let stored = coerce(property, value)?;
        self.get_mut(id)?.props.insert(property, stored);
        Ok(())
    }

    /// Pre-order walk of the attached nodes below the root, with depth
    pub fn walk(&self) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self
            .root_children()
            .iter()
            .rev()
            .map(|id| (*id, 0))
            .collect();

        while let Some((id, depth)) = stack.pop() {
            out.push((id, depth));
            if let Some(node) = self.slot(id) {
                stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
            }
        }
        out
    }

    fn slot(&self, id: NodeId) -> Option<&Node> {
        let index = id.index() as usize;
        if index >= self.nodes.len() || self.generations[index] != id.generation() {
            return None;
        }
        self.nodes[index].as_ref()
    }

    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.slot(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.slot(parent).and_then(|n| n.parent);
        }
        false
    }
}

fn coerce(property: Property, value: Value) -> PlayerResult<Value> {
    let shown = value.to_string();
    property
        .coerce(value)
        .ok_or_else(|| PlayerError::PropertyMismatch {
            property: property.to_string(),
            value: shown,
        })
}
