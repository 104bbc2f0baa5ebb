pub mod transition;

pub use transition::{Transition, Tween};

use crate::cues::{CueTable, UnknownCuePolicy};
use crate::error::{PlayerError, PlayerResult};
use crate::scene::{NodeId, SceneTree};
use crate::script::{NodeSpec, Property, SceneScript, Step, TransitionSpec, Value};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Where the player is in its script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Idle,
    Running,
    WaitingOnCue(String),
    Completed,
}

/// Timing of one executed step on the scene timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub label: String,
    pub start: f64,
    pub end: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cue: Option<String>,
    /// Time the awaited cue fires at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cue_time: Option<f64>,
}

impl StepRecord {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Transitions sharing a start time; finishes with the longest one
#[derive(Debug, Clone)]
struct ActiveGroup {
    step: usize,
    label: String,
    start: f64,
    duration: f64,
    tweens: Vec<Tween>,
}

enum Flow {
    Continue,
    Suspend,
}

/// Executes a scene script against a node tree, one step at a time.
///
/// The player never owns a clock. Callers drive it with [`Player::resume`],
/// passing the external time; it advances as far as that time allows and
/// suspends on in-flight transitions or cues that have not fired yet. The
/// timeline cursor only moves forward.
pub struct Player {
    steps: Vec<Step>,
    cues: CueTable,
    unknown_cues: UnknownCuePolicy,
    tree: SceneTree,
    refs: HashMap<String, NodeId>,
    state: PlayerState,
    next_step: usize,
    current_step: usize,
    cursor: f64,
    clock: f64,
    in_flight: Option<ActiveGroup>,
    failure: Option<PlayerError>,
    records: Vec<StepRecord>,
}

impl Player {
    pub fn new(steps: Vec<Step>, cues: CueTable) -> Self {
        Self {
            steps,
            cues,
            unknown_cues: UnknownCuePolicy::default(),
            tree: SceneTree::new(),
            refs: HashMap::new(),
            state: PlayerState::Idle,
            next_step: 0,
            current_step: 0,
            cursor: 0.0,
            clock: 0.0,
            in_flight: None,
            failure: None,
            records: Vec::new(),
        }
    }

    pub fn from_script(script: &SceneScript, cues: CueTable) -> Self {
        Self::new(script.steps.clone(), cues)
    }

    pub fn with_unknown_cues(mut self, policy: UnknownCuePolicy) -> Self {
        self.unknown_cues = policy;
        self
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Position of the timeline cursor in scene seconds
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn cues(&self) -> &CueTable {
        &self.cues
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Handle bound to a `ref` name, once its node has been added
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.refs.get(name).copied()
    }

    /// Current value of a named node's property
    pub fn value(&self, name: &str, property: Property) -> PlayerResult<Value> {
        self.tree.property(self.resolve(name)?, property)
    }

    pub fn is_completed(&self) -> bool {
        self.state == PlayerState::Completed
    }

    pub fn start(&mut self) {
        if self.state == PlayerState::Idle {
            debug!(steps = self.steps.len(), "player started");
            self.state = PlayerState::Running;
        }
    }

    /// Advance up to external time `now` (seconds). Earlier times than one
    /// already seen are treated as the latest one. After a failure every
    /// call returns the same error.
    pub fn resume(&mut self, now: f64) -> PlayerResult<PlayerState> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.start();
        if self.state == PlayerState::Completed {
            return Ok(PlayerState::Completed);
        }
        if now > self.clock {
            self.clock = now;
        }

        match self.advance(self.clock) {
            Ok(state) => Ok(state),
            Err(source) => {
                let err = PlayerError::Halted {
                    step: self.current_step,
                    source: Box::new(source),
                };
                warn!(step = self.current_step, error = %err.root(), "player halted");
                self.failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Run the whole script, resolving every wait from the cue table.
    /// Returns the total scene duration.
    pub fn run(&mut self) -> PlayerResult<f64> {
        self.resume(f64::INFINITY)?;
        Ok(self.cursor)
    }

    fn advance(&mut self, now: f64) -> PlayerResult<PlayerState> {
        loop {
            if let Some(group) = self.in_flight.take() {
                self.current_step = group.step;
                let end = group.start + group.duration;
                if now >= end {
                    for tween in &group.tweens {
                        tween.apply(&mut self.tree, group.duration)?;
                    }
                    self.cursor = end;
                    debug!(step = group.step, end, "{} finished", group.label);
                    self.records.push(StepRecord {
                        index: group.step,
                        label: group.label,
                        start: group.start,
                        end,
                        cue: None,
                        cue_time: None,
                    });
                } else {
                    for tween in &group.tweens {
                        tween.apply(&mut self.tree, now - group.start)?;
                    }
                    self.in_flight = Some(group);
                    self.state = PlayerState::Running;
                    return Ok(self.state.clone());
                }
            }

            let Some(step) = self.steps.get(self.next_step).cloned() else {
                if self.state != PlayerState::Completed {
                    info!(duration = self.cursor, "scene complete");
                }
                self.state = PlayerState::Completed;
                return Ok(PlayerState::Completed);
            };

            self.current_step = self.next_step;
            match self.execute(&step, now)? {
                Flow::Continue => self.next_step += 1,
                Flow::Suspend => return Ok(self.state.clone()),
            }
        }
    }

    fn execute(&mut self, step: &Step, now: f64) -> PlayerResult<Flow> {
        let index = self.current_step;
        match step {
            Step::Add { parent, node } => {
                let parent = match parent {
                    Some(name) => self.resolve(name)?,
                    None => self.tree.root(),
                };
                let id = self.tree.build(node)?;
                self.tree.add_child(parent, id)?;
                self.bind(node, id)?;
                self.record_instant(index, step);
            }
            Step::Remove { node } => {
                let id = self.resolve(node)?;
                self.tree.detach(id)?;
                self.record_instant(index, step);
            }
            Step::Set {
                node,
                property,
                value,
            } => {
                let id = self.resolve(node)?;
                self.tree.set_property(id, *property, value.clone())?;
                self.record_instant(index, step);
            }
            Step::Animate(spec) => {
                let tween = self.bind_transition(spec)?.begin(&self.tree)?;
                self.launch(index, step, tween.duration, vec![tween]);
            }
            Step::AnimateAll { transitions } => {
                let mut claimed = HashSet::new();
                let mut tweens = Vec::with_capacity(transitions.len());
                for spec in transitions {
                    let transition = self.bind_transition(spec)?;
                    if !claimed.insert((transition.node, transition.property)) {
                        return Err(PlayerError::ConflictingTransition {
                            node: spec.node.clone(),
                            property: spec.property.to_string(),
                        });
                    }
                    tweens.push(transition.begin(&self.tree)?);
                }
                let duration = tweens.iter().map(|t| t.duration).fold(0.0, f64::max);
                self.launch(index, step, duration, tweens);
            }
            Step::WaitFor { duration } => {
                if !duration.is_finite() || *duration < 0.0 {
                    return Err(PlayerError::invalid_duration(*duration, "wait"));
                }
                self.launch(index, step, *duration, Vec::new());
            }
            Step::WaitUntil { cue } => return self.wait_until(index, step, cue, now),
        }

        self.state = PlayerState::Running;
        Ok(Flow::Continue)
    }

    fn wait_until(&mut self, index: usize, step: &Step, cue: &str, now: f64) -> PlayerResult<Flow> {
        let target = match (self.cues.get(cue), self.unknown_cues) {
            (Some(t), _) => t,
            (None, UnknownCuePolicy::Error) => {
                return Err(PlayerError::UnknownCue(cue.to_string()));
            }
            (None, UnknownCuePolicy::Immediate) => {
                warn!(cue, "cue missing from table, resuming immediately");
                self.cursor
            }
        };

        if target > now {
            if self.state != PlayerState::WaitingOnCue(cue.to_string()) {
                debug!(cue, at = target, "waiting on cue");
            }
            self.state = PlayerState::WaitingOnCue(cue.to_string());
            return Ok(Flow::Suspend);
        }

        // A cue already behind the cursor resumes without moving it
        let start = self.cursor;
        self.cursor = self.cursor.max(target);
        self.records.push(StepRecord {
            index,
            label: step.label(),
            start,
            end: self.cursor,
            cue: Some(cue.to_string()),
            cue_time: Some(target),
        });
        self.state = PlayerState::Running;
        Ok(Flow::Continue)
    }

    fn launch(&mut self, index: usize, step: &Step, duration: f64, tweens: Vec<Tween>) {
        debug!(step = index, start = self.cursor, duration, "{}", step.label());
        self.in_flight = Some(ActiveGroup {
            step: index,
            label: step.label(),
            start: self.cursor,
            duration,
            tweens,
        });
    }

    fn record_instant(&mut self, index: usize, step: &Step) {
        debug!(step = index, at = self.cursor, "{}", step.label());
        self.records.push(StepRecord {
            index,
            label: step.label(),
            start: self.cursor,
            end: self.cursor,
            cue: None,
            cue_time: None,
        });
    }

    fn resolve(&self, name: &str) -> PlayerResult<NodeId> {
        let id = self
            .refs
            .get(name)
            .copied()
            .ok_or_else(|| PlayerError::DanglingReference(name.to_string()))?;
        if !self.tree.contains(id) {
            return Err(PlayerError::DanglingReference(name.to_string()));
        }
        Ok(id)
    }

    fn bind_transition(&self, spec: &TransitionSpec) -> PlayerResult<Transition> {
        let node = self.resolve(&spec.node)?;
        let transition = Transition::new(node, spec.property, spec.to.clone(), spec.duration);
        Ok(transition.with_easing(spec.easing))
    }

    /// Bind every `ref` in a freshly built subtree. Built children mirror the
    /// spec's children in order.
    fn bind(&mut self, spec: &NodeSpec, id: NodeId) -> PlayerResult<()> {
        if let Some(name) = &spec.name {
            if self.refs.insert(name.clone(), id).is_some() {
                warn!(name = name.as_str(), "ref rebound to a new node");
            }
        }
        let children = self.tree.get(id)?.children().to_vec();
        for (child_spec, child) in spec.children.iter().zip(children) {
            self.bind(child_spec, child)?;
        }
        Ok(())
    }
}
