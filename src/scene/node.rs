use crate::script::{NodeKind, Property, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Generation-checked handle into a [`SceneTree`](super::SceneTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn from_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// A visual node stored in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub props: BTreeMap<Property, Value>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// New detached node carrying the transform defaults every node has
    pub fn new(kind: NodeKind) -> Self {
        let mut props = BTreeMap::new();
        for property in [Property::X, Property::Y, Property::Scale, Property::Opacity] {
            props.insert(property, property.initial_value());
        }
        match kind {
            NodeKind::Text => {
                props.insert(Property::FontSize, Value::Number(48.0));
            }
            NodeKind::Circle => {
                props.insert(Property::Radius, Value::Number(50.0));
            }
            NodeKind::Container | NodeKind::Image => {}
        }

        Self {
            kind,
            name: None,
            props,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Current value, falling back to the property's initial value
    pub fn get(&self, property: Property) -> Value {
        self.props
            .get(&property)
            .cloned()
            .unwrap_or_else(|| property.initial_value())
    }
}
