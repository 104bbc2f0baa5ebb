use crate::cues::{CueTable, UnknownCuePolicy};
use crate::error::PlayerResult;
use crate::player::{Player, PlayerState};
use crate::renderer::{Frame, Timeline};
use crate::script::SceneScript;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Outcome of a render pass
#[derive(Debug, Clone, Serialize)]
pub struct RenderSummary {
    pub frames: u32,
    pub duration: f64,
    pub fps: u32,
    pub output: Option<PathBuf>,
}

/// Drives a [`Player`] with a fixed frame clock and captures draw commands
pub struct RenderEngine {
    timeline: Timeline,
    player: Player,
}

impl RenderEngine {
    /// Create new render engine from script
    pub fn new(script: &SceneScript, cues: CueTable) -> Self {
        Self::with_fps(script, cues, script.metadata.fps)
    }

    pub fn with_fps(script: &SceneScript, cues: CueTable, fps: u32) -> Self {
        Self {
            timeline: Timeline::new(fps),
            player: Player::from_script(script, cues),
        }
    }

    pub fn with_unknown_cues(mut self, policy: UnknownCuePolicy) -> Self {
        self.player = self.player.with_unknown_cues(policy);
        self
    }

    /// Render a single frame: advance the player to the frame's time and
    /// capture the tree
    pub fn render_frame(&mut self, frame_number: u32) -> PlayerResult<Frame> {
        let time = self.timeline.frame_to_time(frame_number);
        self.player.resume(time)?;
        Ok(Frame::capture(frame_number, time, self.player.tree()))
    }

    /// Sample frames until the script completes, handing each to `sink`.
    /// The last frame is the first one at or after the scene's end.
    pub fn render_with<F>(&mut self, mut sink: F) -> Result<RenderSummary>
    where
        F: FnMut(&Frame) -> Result<()>,
    {
        let mut frame_number = 0;
        loop {
            let frame = self.render_frame(frame_number)?;
            sink(&frame)?;

            if frame_number % self.timeline.fps() == 0 {
                tracing::debug!(frame = frame_number, time = frame.time, "rendered frame");
            }
            if self.player.state() == &PlayerState::Completed {
                break;
            }
            frame_number += 1;
        }

        Ok(RenderSummary {
            frames: frame_number + 1,
            duration: self.player.cursor(),
            fps: self.timeline.fps(),
            output: None,
        })
    }

    /// Collect every frame in memory
    pub fn render_all(&mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        self.render_with(|frame| {
            frames.push(frame.clone());
            Ok(())
        })?;
        Ok(frames)
    }

    /// Render all frames to `frames.jsonl` in the output directory, one
    /// frame per line
    pub fn render(&mut self, output_dir: &Path) -> Result<RenderSummary> {
        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory: {}", output_dir.display())
        })?;
        let path = output_dir.join("frames.jsonl");
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let mut summary = self.render_with(|frame| {
            serde_json::to_writer(&mut writer, frame)?;
            writer.write_all(b"\n")?;
            Ok(())
        })?;
        writer.flush().context("Failed to flush frame output")?;

        summary.output = Some(path);
        Ok(summary)
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn player(&self) -> &Player {
        &self.player
    }
}
