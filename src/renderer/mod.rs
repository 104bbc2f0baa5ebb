pub mod engine;
pub mod frame;
pub mod timeline;

pub use engine::{RenderEngine, RenderSummary};
pub use frame::{DrawCommand, Frame};
pub use timeline::Timeline;
