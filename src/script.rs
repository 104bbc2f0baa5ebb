use crate::easing::Easing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A scene script: metadata plus the ordered steps the player executes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneScript {
    pub metadata: Metadata,
    pub steps: Vec<Step>,
}

/// Scene metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    /// Explicit canvas size; each wins over `resolution`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Narration track the cue table was authored against
    #[serde(default)]
    pub audio: Option<PathBuf>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_fps() -> u32 {
    30
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            resolution: None,
            width: None,
            height: None,
            fps: default_fps(),
            audio: None,
            description: None,
        }
    }

    /// Canvas size, filling whatever the script leaves out from `fallback`
    pub fn dimensions(&self, fallback: (u32, u32)) -> (u32, u32) {
        let (width, height) = self
            .resolution
            .as_ref()
            .map_or(fallback, Resolution::dimensions);
        (self.width.unwrap_or(width), self.height.unwrap_or(height))
    }
}

/// Video resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    Named(String), // e.g., "1920x1080", "1280x720"
    Dimensions { width: u32, height: u32 },
}

impl Resolution {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Resolution::Named(s) => {
                let parts: Vec<&str> = s.split('x').collect();
                if parts.len() == 2 {
                    let width = parts[0].parse().unwrap_or(1920);
                    let height = parts[1].parse().unwrap_or(1080);
                    (width, height)
                } else {
                    (1920, 1080) // Default to 1080p
                }
            }
            Resolution::Dimensions { width, height } => (*width, *height),
        }
    }
}

/// One instruction of a scene script
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Insert a node subtree as the last child of `parent` (scene root if absent)
    Add {
        #[serde(default)]
        parent: Option<String>,
        node: NodeSpec,
    },
    /// Detach a node and its subtree
    Remove { node: String },
    /// Run one transition to completion
    Animate(TransitionSpec),
    /// Run transitions concurrently; finishes with the longest one
    AnimateAll { transitions: Vec<TransitionSpec> },
    /// Suspend until the external timeline reaches a named cue
    WaitUntil { cue: String },
    /// Suspend for a fixed number of seconds
    WaitFor { duration: f64 },
    /// Write a property instantly
    Set {
        node: String,
        property: Property,
        value: Value,
    },
}

impl Step {
    pub fn label(&self) -> String {
        match self {
            Step::Add { node, .. } => match &node.name {
                Some(name) => format!("add {} '{}'", node.kind, name),
                None => format!("add {}", node.kind),
            },
            Step::Remove { node } => format!("remove {}", node),
            Step::Animate(t) => format!("animate {}", t.target()),
            Step::AnimateAll { transitions } => {
                let targets: Vec<String> = transitions.iter().map(|t| t.target()).collect();
                format!("animate all [{}]", targets.join(", "))
            }
            Step::WaitUntil { cue } => format!("wait until '{}'", cue),
            Step::WaitFor { duration } => format!("wait for {:.2}s", duration),
            Step::Set { node, property, .. } => format!("set {}.{}", node, property),
        }
    }
}

/// A transition as written in a script: target value, duration and easing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub node: String,
    pub property: Property,
    pub to: Value,
    pub duration: f64,
    #[serde(default)]
    pub easing: Easing,
}

impl TransitionSpec {
    pub fn new(node: &str, property: Property, to: impl Into<Value>, duration: f64) -> Self {
        Self {
            node: node.into(),
            property,
            to: to.into(),
            duration,
            easing: Easing::Linear,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    fn target(&self) -> String {
        format!("{}.{}", self.node, self.property)
    }
}

/// Declarative node description; nested children are built bottom-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub props: BTreeMap<Property, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            props: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.props.insert(property, value.into());
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Kind of visual node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    Image,
    Text,
    Circle,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Container => "container",
            NodeKind::Image => "image",
            NodeKind::Text => "text",
            NodeKind::Circle => "circle",
        };
        write!(f, "{}", name)
    }
}

/// Node properties a script may read, set or animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    X,
    Y,
    Scale,
    Rotation,
    Opacity,
    Fill,
    Radius,
    Padding,
    Gap,
    FontSize,
    FontFamily,
    Text,
    Src,
    Direction,
    AlignItems,
}

/// What kind of value a property holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Color,
    Text,
    /// Strings that cannot be interpolated (font names, paths, layout keywords)
    Keyword,
}

impl Property {
    pub fn kind(&self) -> ValueKind {
        match self {
            Property::X
            | Property::Y
            | Property::Scale
            | Property::Rotation
            | Property::Opacity
            | Property::Radius
            | Property::Padding
            | Property::Gap
            | Property::FontSize => ValueKind::Number,
            Property::Fill => ValueKind::Color,
            Property::Text => ValueKind::Text,
            Property::FontFamily | Property::Src | Property::Direction | Property::AlignItems => {
                ValueKind::Keyword
            }
        }
    }

    pub fn is_animatable(&self) -> bool {
        self.kind() != ValueKind::Keyword
    }

    /// Value assumed for a property a node never had set
    pub fn initial_value(&self) -> Value {
        match self {
            Property::Scale | Property::Opacity => Value::Number(1.0),
            Property::Fill => Value::Color(Color::TRANSPARENT),
            _ => match self.kind() {
                ValueKind::Number => Value::Number(0.0),
                _ => Value::Text(String::new()),
            },
        }
    }

    /// Check `value` against this property and convert it into stored form.
    /// Colour names are parsed, and numeric values are clamped into their
    /// valid range (opacity to [0, 1], sizes to be non-negative).
    pub fn coerce(&self, value: Value) -> Option<Value> {
        match (self.kind(), value) {
            (ValueKind::Number, Value::Number(n)) if n.is_finite() => {
                Some(Value::Number(self.clamp(n)))
            }
            (ValueKind::Color, Value::Color(c)) => Some(Value::Color(c)),
            (ValueKind::Color, Value::Text(s)) => Color::parse(&s).map(Value::Color),
            (ValueKind::Text, Value::Text(s)) | (ValueKind::Keyword, Value::Text(s)) => {
                Some(Value::Text(s))
            }
            (ValueKind::Text, Value::Number(n)) => Some(Value::Text(n.to_string())),
            _ => None,
        }
    }

    fn clamp(&self, n: f64) -> f64 {
        match self {
            Property::Opacity => n.clamp(0.0, 1.0),
            Property::Scale
            | Property::Radius
            | Property::Padding
            | Property::Gap
            | Property::FontSize => n.max(0.0),
            _ => n,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Scale => "scale",
            Property::Rotation => "rotation",
            Property::Opacity => "opacity",
            Property::Fill => "fill",
            Property::Radius => "radius",
            Property::Padding => "padding",
            Property::Gap => "gap",
            Property::FontSize => "font_size",
            Property::FontFamily => "font_family",
            Property::Text => "text",
            Property::Src => "src",
            Property::Direction => "direction",
            Property::AlignItems => "align_items",
        };
        write!(f, "{}", name)
    }
}

/// A property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Color(Color),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
            Value::Color(c) => write!(f, "{}", c),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "default_alpha")]
    pub a: u8,
}

fn default_alpha() -> u8 {
    255
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or a basic CSS colour name
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return match hex.len() {
                3 => {
                    let mut out = [0u8; 3];
                    for (i, c) in hex.chars().enumerate() {
                        let v = c.to_digit(16)? as u8;
                        out[i] = v * 17;
                    }
                    Some(Color::rgba(out[0], out[1], out[2], 255))
                }
                6 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, 255)),
                8 => Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
                _ => None,
            };
        }

        match s.to_ascii_lowercase().as_str() {
            "white" => Some(Color::WHITE),
            "black" => Some(Color::BLACK),
            "red" => Some(Color::rgba(255, 0, 0, 255)),
            "green" => Some(Color::rgba(0, 128, 0, 255)),
            "blue" => Some(Color::rgba(0, 0, 255, 255)),
            "gray" | "grey" => Some(Color::rgba(128, 128, 128, 255)),
            "transparent" => Some(Color::TRANSPARENT),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_parsing() {
        let res = Resolution::Named("1920x1080".to_string());
        assert_eq!(res.dimensions(), (1920, 1080));

        let res = Resolution::Dimensions {
            width: 1280,
            height: 720,
        };
        assert_eq!(res.dimensions(), (1280, 720));

        let res = Resolution::Named("invalid".to_string());
        assert_eq!(res.dimensions(), (1920, 1080)); // Should default
    }

    #[test]
    fn test_metadata_width_height() {
        let json = r#"{"title": "Intro", "fps": 24, "width": 1280, "height": 720}"#;
        let metadata: Metadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.dimensions((1920, 1080)), (1280, 720));

        let json = r#"{"title": "Intro", "resolution": "3840x2160", "height": 1600}"#;
        let metadata: Metadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.dimensions((1920, 1080)), (3840, 1600));

        let metadata = Metadata::new("Bare");
        assert_eq!(metadata.dimensions((800, 600)), (800, 600));
        assert_eq!(metadata.fps, 30);
    }

    #[test]
    fn test_script_deserialization() {
        let json = r#"
        {
            "metadata": {"title": "Intro", "audio": "voiceover.mp3"},
            "steps": [
                {
                    "op": "add",
                    "node": {"type": "image", "ref": "logo", "props": {"src": "react-logo.png", "scale": 2}}
                },
                {"op": "animate", "node": "logo", "property": "scale", "to": 3, "duration": 2},
                {"op": "wait_until", "cue": "componentsStart"},
                {"op": "animate", "node": "logo", "property": "y", "to": -200, "duration": 1, "easing": "cubic_out"}
            ]
        }
        "#;

        let script: SceneScript = serde_json::from_str(json).unwrap();
        assert_eq!(script.metadata.title, "Intro");
        assert_eq!(script.metadata.fps, 30);
        assert_eq!(script.steps.len(), 4);

        match &script.steps[0] {
            Step::Add { parent, node } => {
                assert!(parent.is_none());
                assert_eq!(node.kind, NodeKind::Image);
                assert_eq!(node.props.get(&Property::Scale), Some(&Value::Number(2.0)));
            }
            other => panic!("Expected add step, got {:?}", other),
        }
        match &script.steps[3] {
            Step::Animate(t) => {
                assert_eq!(t.property, Property::Y);
                assert_eq!(t.to, Value::Number(-200.0));
                assert_eq!(t.easing, Easing::CubicOut);
            }
            other => panic!("Expected animate step, got {:?}", other),
        }
    }

    #[test]
    fn test_transition_easing_defaults_to_linear() {
        let json = r#"{"node": "a", "property": "opacity", "to": 1, "duration": 0.5}"#;
        let t: TransitionSpec = serde_json::from_str(json).unwrap();
        assert_eq!(t.easing, Easing::Linear);
    }

    #[test]
    fn test_coerce_clamps_opacity() {
        assert_eq!(
            Property::Opacity.coerce(Value::Number(1.7)),
            Some(Value::Number(1.0))
        );
        assert_eq!(
            Property::Scale.coerce(Value::Number(-2.0)),
            Some(Value::Number(0.0))
        );
        assert_eq!(Property::Y.coerce(Value::Number(-200.0)), Some(Value::Number(-200.0)));
    }

    #[test]
    fn test_coerce_rejects_mismatched_kinds() {
        assert_eq!(Property::Opacity.coerce(Value::from("bright")), None);
        assert_eq!(Property::Fill.coerce(Value::from("not-a-colour")), None);
        assert_eq!(Property::X.coerce(Value::Number(f64::NAN)), None);
    }

    #[test]
    fn test_coerce_parses_fill() {
        assert_eq!(
            Property::Fill.coerce(Value::from("white")),
            Some(Value::Color(Color::WHITE))
        );
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#ff8000"), Some(Color::rgba(255, 128, 0, 255)));
        assert_eq!(Color::parse("#00000080"), Some(Color::rgba(0, 0, 0, 128)));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::WHITE.to_string(), "#ffffffff");
    }

    #[test]
    fn test_color_deserialize_default_alpha() {
        let color: Color = serde_json::from_str(r#"{"r": 1, "g": 2, "b": 3}"#).unwrap();
        assert_eq!(color.a, 255);
    }

    #[test]
    fn test_step_labels() {
        let step = Step::WaitUntil {
            cue: "componentsSay".into(),
        };
        assert_eq!(step.label(), "wait until 'componentsSay'");

        let step = Step::Animate(TransitionSpec::new("logo", Property::Scale, 3.0, 2.0));
        assert_eq!(step.label(), "animate logo.scale");
    }
}
