pub mod node;
pub mod tree;

pub use node::{Node, NodeId};
pub use tree::SceneTree;
