use crate::error::{PlayerError, PlayerResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// What a wait-point does when its cue is missing from the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCuePolicy {
    /// Halt the run with `UnknownCue`
    #[default]
    Error,
    /// Treat the cue as firing at the moment the wait is reached
    Immediate,
}

/// External mapping of cue name to timestamp in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CueTable {
    cues: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CueFile {
    Events {
        #[serde(rename = "timeEvents")]
        time_events: Vec<TimeEvent>,
    },
    Table {
        cues: BTreeMap<String, f64>,
    },
    Map(BTreeMap<String, f64>),
}

#[derive(Deserialize)]
struct TimeEvent {
    name: String,
    #[serde(rename = "targetTime")]
    target_time: f64,
}

impl CueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a cue. Timestamps must be finite and non-negative.
    pub fn insert(&mut self, name: impl Into<String>, seconds: f64) -> PlayerResult<()> {
        let name = name.into();
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(PlayerError::invalid_duration(seconds, format!("cue '{}'", name)));
        }
        self.cues.insert(name, seconds);
        Ok(())
    }

    pub fn with(mut self, name: &str, seconds: f64) -> PlayerResult<Self> {
        self.insert(name, seconds)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.cues.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.cues.iter().map(|(name, t)| (name.as_str(), *t))
    }

    /// Parse a JSON cue table: either a plain `{"name": seconds}` object,
    /// `{"cues": {...}}`, or a `{"timeEvents": [{"name", "targetTime"}]}` list
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: CueFile =
            serde_json::from_str(content).context("Failed to parse JSON cue table")?;
        Self::from_file(file)
    }

    /// Parse a TOML cue table with a `[cues]` section
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CueFile = toml::from_str(content).context("Failed to parse TOML cue table")?;
        Self::from_file(file)
    }

    /// Load a cue table, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cue table: {}", path.display()))?;

        let table = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
        .with_context(|| format!("Invalid cue table: {}", path.display()))?;

        tracing::debug!(cues = table.len(), path = %path.display(), "loaded cue table");
        Ok(table)
    }

    fn from_file(file: CueFile) -> Result<Self> {
        let entries: Vec<(String, f64)> = match file {
            CueFile::Events { time_events } => time_events
                .into_iter()
                .map(|e| (e.name, e.target_time))
                .collect(),
            CueFile::Table { cues } | CueFile::Map(cues) => cues.into_iter().collect(),
        };

        let mut table = CueTable::new();
        for (name, seconds) in entries {
            table.insert(name, seconds)?;
        }
        Ok(table)
    }
}
