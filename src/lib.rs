pub mod analysis;
pub mod audio;
pub mod config;
pub mod cues;
pub mod easing;
pub mod error;
pub mod parser;
pub mod player;
pub mod renderer;
pub mod scene;
pub mod script;
pub mod templates;

pub use cues::{CueTable, UnknownCuePolicy};
pub use easing::Easing;
pub use error::{PlayerError, PlayerResult};
pub use parser::ScriptParser;
pub use player::{Player, PlayerState};
pub use renderer::{Frame, RenderEngine, Timeline};
pub use scene::{NodeId, SceneTree};
pub use script::SceneScript;
