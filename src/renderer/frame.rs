use crate::scene::{NodeId, SceneTree};
use crate::script::{NodeKind, Property, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// One visible node, resolved for drawing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCommand {
    pub id: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: NodeKind,
    pub depth: usize,
    pub props: BTreeMap<Property, Value>,
}

/// Snapshot of the attached tree at one sampled time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub index: u32,
    pub time: f64,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// Capture the attached nodes in paint order (parents before children)
    pub fn capture(index: u32, time: f64, tree: &SceneTree) -> Self {
        let commands = tree
            .walk()
            .into_iter()
            .filter_map(|(id, depth)| {
                let node = tree.get(id).ok()?;
                Some(DrawCommand {
                    id,
                    name: node.name.clone(),
                    kind: node.kind,
                    depth,
                    props: node.props.clone(),
                })
            })
            .collect();

        Self {
            index,
            time,
            commands,
        }
    }

    /// Draw command for a named node
    pub fn find(&self, name: &str) -> Option<&DrawCommand> {
        self.commands
            .iter()
            .find(|c| c.name.as_deref() == Some(name))
    }

    /// Number value of a named node's property in this frame
    pub fn number(&self, name: &str, property: Property) -> Option<f64> {
        self.find(name)?.props.get(&property)?.as_number()
    }
}
