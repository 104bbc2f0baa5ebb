use crate::cues::{CueTable, UnknownCuePolicy};
use crate::player::Player;
use crate::script::{SceneScript, Step};
use anyhow::{Context, Result};
use std::path::Path;

/// Script parser that handles JSON scene scripts
pub struct ScriptParser;

impl ScriptParser {
    /// Parse a JSON script file
    pub fn parse_json(path: &Path) -> Result<SceneScript> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script file: {}", path.display()))?;

        Self::parse_str(&content)
            .with_context(|| format!("Failed to parse JSON script: {}", path.display()))
    }

    /// Parse and validate a JSON script held in memory
    pub fn parse_str(content: &str) -> Result<SceneScript> {
        let script: SceneScript = serde_json::from_str(content)?;
        Self::validate_script(&script)?;
        Ok(script)
    }

    /// Validate the script structure, then dry-run it with every cue firing
    /// immediately so reference, duration and value errors surface before
    /// any cue table is involved
    pub fn validate_script(script: &SceneScript) -> Result<()> {
        if script.metadata.title.is_empty() {
            anyhow::bail!("Script title cannot be empty");
        }

        if script.metadata.fps == 0 {
            anyhow::bail!("FPS must be greater than 0");
        }

        if script.steps.is_empty() {
            anyhow::bail!("Script must contain at least one step");
        }

        for (idx, step) in script.steps.iter().enumerate() {
            match step {
                Step::WaitUntil { cue } if cue.is_empty() => {
                    anyhow::bail!("Step {} waits on an empty cue name", idx);
                }
                Step::AnimateAll { transitions } if transitions.is_empty() => {
                    tracing::warn!(step = idx, "animate_all with no transitions");
                }
                _ => {}
            }
        }

        let mut dry_run = Player::from_script(script, CueTable::new())
            .with_unknown_cues(UnknownCuePolicy::Immediate);
        dry_run.run().context("Script failed dry run")?;

        Ok(())
    }

    /// Cue names the script waits on, in first-use order
    pub fn cue_names(script: &SceneScript) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for step in &script.steps {
            if let Step::WaitUntil { cue } = step {
                if !names.contains(&cue.as_str()) {
                    names.push(cue);
                }
            }
        }
        names
    }

    /// Cues the script waits on that the table does not define
    pub fn missing_cues<'a>(script: &'a SceneScript, cues: &CueTable) -> Vec<&'a str> {
        Self::cue_names(script)
            .into_iter()
            .filter(|name| cues.get(name).is_none())
            .collect()
    }

    /// Get a summary of the script structure. `default_size` stands in for
    /// a canvas size the script leaves out.
    pub fn summarize(script: &SceneScript, default_size: (u32, u32)) -> String {
        let mut summary = String::new();
        let (width, height) = script.metadata.dimensions(default_size);
        summary.push_str(&format!("Title: {}\n", script.metadata.title));
        summary.push_str(&format!("Resolution: {}x{}\n", width, height));
        summary.push_str(&format!("FPS: {}\n", script.metadata.fps));
        summary.push_str(&format!("Steps: {}\n", script.steps.len()));

        for (idx, step) in script.steps.iter().enumerate() {
            summary.push_str(&format!("  Step {}: {}\n", idx + 1, step.label()));
        }

        let cues = Self::cue_names(script);
        if !cues.is_empty() {
            summary.push_str(&format!("Cues: {}\n", cues.join(", ")));
        }

        if let Some(audio) = &script.metadata.audio {
            summary.push_str(&format!("Audio: {}\n", audio.display()));
        }

        summary
    }
}
