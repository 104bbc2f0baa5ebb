use crate::audio::AudioInfo;
use crate::player::{Player, StepRecord};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

/// Where the scene spent its time
#[derive(Debug, Clone, Serialize)]
pub struct TimingReport {
    pub title: String,
    pub total_duration: f64,
    pub animated: f64,
    pub waiting: f64,
    pub steps: Vec<StepRecord>,
    pub unused_cues: Vec<String>,
    pub findings: Vec<Finding>,
}

pub struct TimingAnalyzer;

impl TimingAnalyzer {
    /// Build a report from a player that has finished its run
    pub fn analyze(title: &str, player: &Player, audio: Option<&AudioInfo>) -> TimingReport {
        let steps = player.records().to_vec();
        let waiting: f64 = steps
            .iter()
            .filter(|r| r.cue.is_some() || r.label.starts_with("wait"))
            .map(|r| r.duration())
            .sum();
        let total_duration = player.cursor();

        let waited: Vec<&str> = steps.iter().filter_map(|r| r.cue.as_deref()).collect();
        let unused_cues: Vec<String> = player
            .cues()
            .iter()
            .filter(|(name, _)| !waited.contains(name))
            .map(|(name, _)| name.to_string())
            .collect();

        let mut findings = Vec::new();
        for record in &steps {
            let Some(fired) = record.cue_time else {
                continue;
            };
            if fired < record.start {
                findings.push(Finding {
                    severity: Severity::Warning,
                    message: format!(
                        "{} was already due ({:.2}s) when reached at {:.2}s; \
                         animation runs past its narration",
                        record.label, fired, record.start
                    ),
                });
            }
        }
        for name in &unused_cues {
            findings.push(Finding {
                severity: Severity::Info,
                message: format!("cue '{}' is never waited on", name),
            });
        }
        if let Some(audio) = audio {
            if total_duration > audio.duration {
                findings.push(Finding {
                    severity: Severity::Warning,
                    message: format!(
                        "scene runs {:.2}s past the end of the audio track ({:.2}s)",
                        total_duration - audio.duration,
                        audio.duration
                    ),
                });
            }
        }

        TimingReport {
            title: title.to_string(),
            total_duration,
            animated: total_duration - waiting,
            waiting,
            steps,
            unused_cues,
            findings,
        }
    }
}

impl TimingReport {
    pub fn to_markdown(&self) -> String {
        let mut md = format!(
            "# Timing Report: {}\n\n\
             **Duration**: {:.2}s ({:.2}s animated, {:.2}s waiting)\n\n\
             ## Steps\n\n\
             | # | Step | Start | End |\n|---|------|-------|-----|\n",
            self.title, self.total_duration, self.animated, self.waiting
        );
        for record in &self.steps {
            md.push_str(&format!(
                "| {} | {} | {:.2} | {:.2} |\n",
                record.index + 1,
                record.label,
                record.start,
                record.end
            ));
        }

        if !self.findings.is_empty() {
            md.push_str("\n## Findings\n");
            for finding in &self.findings {
                md.push_str(&format!("- **[{:?}]** {}\n", finding.severity, finding.message));
            }
        }
        md
    }
}
