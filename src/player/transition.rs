use crate::easing::Easing;
use crate::error::{PlayerError, PlayerResult};
use crate::scene::{NodeId, SceneTree};
use crate::script::{Color, Property, Value};

/// A transition bound to a concrete node
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub node: NodeId,
    pub property: Property,
    pub to: Value,
    pub duration: f64,
    pub easing: Easing,
}

impl Transition {
    pub fn new(node: NodeId, property: Property, to: impl Into<Value>, duration: f64) -> Self {
        Self {
            node,
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

    /// Capture the starting value from the tree and validate the target.
    /// Zero duration is allowed and applies the target on the first sample.
    pub fn begin(&self, tree: &SceneTree) -> PlayerResult<Tween> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(PlayerError::invalid_duration(
                self.duration,
                format!("transition of {}", self.property),
            ));
        }

        let mismatch = || PlayerError::PropertyMismatch {
            property: self.property.to_string(),
            value: self.to.to_string(),
        };
        if self.duration > 0.0 && !self.property.is_animatable() {
            return Err(mismatch());
        }
        let to = self.property.coerce(self.to.clone()).ok_or_else(mismatch)?;
        let from = tree.property(self.node, self.property)?;

        Ok(Tween {
            node: self.node,
            property: self.property,
            from,
            to,
            duration: self.duration,
            easing: self.easing,
        })
    }
}

/// An in-flight interpolator with its start value captured
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub node: NodeId,
    pub property: Property,
    from: Value,
    to: Value,
    pub duration: f64,
    easing: Easing,
}

impl Tween {
    /// Value `elapsed` seconds after the tween started. At or beyond the
    /// duration this is exactly the target.
    pub fn sample(&self, elapsed: f64) -> Value {
        if self.duration <= 0.0 || elapsed >= self.duration {
            return self.to.clone();
        }
        let progress = self.easing.apply(elapsed.max(0.0) / self.duration);
        lerp(&self.from, &self.to, progress)
    }

    pub fn apply(&self, tree: &mut SceneTree, elapsed: f64) -> PlayerResult<()> {
        tree.set_property(self.node, self.property, self.sample(elapsed))
    }
}

/// Interpolate between two values of the same kind. Mismatched kinds snap
/// to the target only once progress reaches 1.
pub fn lerp(from: &Value, to: &Value, progress: f64) -> Value {
    if progress >= 1.0 {
        return to.clone();
    }
    match (from, to) {
        (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * progress),
        (Value::Color(a), Value::Color(b)) => Value::Color(lerp_color(a, b, progress)),
        (Value::Text(a), Value::Text(b)) => Value::Text(lerp_text(a, b, progress)),
        _ => from.clone(),
    }
}

fn lerp_color(a: &Color, b: &Color, progress: f64) -> Color {
    let channel = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * progress).round() as u8;
    Color::rgba(
        channel(a.r, b.r),
        channel(a.g, b.g),
        channel(a.b, b.b),
        channel(a.a, b.a),
    )
}

/// Type the target in over the source: a growing prefix of `to` followed by
/// the shrinking remainder of `from`
fn lerp_text(from: &str, to: &str, progress: f64) -> String {
    let to_chars: Vec<char> = to.chars().collect();
    let from_chars: Vec<char> = from.chars().collect();
    let shown = (to_chars.len() as f64 * progress).floor() as usize;
    let replaced = (from_chars.len() as f64 * progress).floor() as usize;

    to_chars[..shown]
        .iter()
        .chain(from_chars[replaced..].iter())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use crate::script::NodeKind;

    fn tree_with_circle() -> (SceneTree, NodeId) {
        let mut tree = SceneTree::new();
        let id = tree.insert(Node::new(NodeKind::Circle));
        tree.add_child(tree.root(), id).unwrap();
        (tree, id)
    }

    #[test]
    fn test_opacity_fade_samples() {
        let (mut tree, id) = tree_with_circle();
        tree.set_property(id, Property::Opacity, Value::Number(0.0)).unwrap();

        let tween = Transition::new(id, Property::Opacity, 1.0, 2.0)
            .begin(&tree)
            .unwrap();
        assert_eq!(tween.sample(0.0), Value::Number(0.0));
        assert_eq!(tween.sample(1.0), Value::Number(0.5));
        assert_eq!(tween.sample(2.0), Value::Number(1.0));
        assert_eq!(tween.sample(3.0), Value::Number(1.0));
    }

    #[test]
    fn test_target_is_exact_at_end() {
        let (mut tree, id) = tree_with_circle();
        tree.set_property(id, Property::X, Value::Number(0.1)).unwrap();
        let tween = Transition::new(id, Property::X, 0.7, 0.3)
            .with_easing(Easing::CubicInOut)
            .begin(&tree)
            .unwrap();
        assert_eq!(tween.sample(0.3), Value::Number(0.7));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let (tree, id) = tree_with_circle();
        let err = Transition::new(id, Property::Y, -200.0, -1.0)
            .begin(&tree)
            .unwrap_err();
        assert!(matches!(err, PlayerError::InvalidDuration { .. }));

        let err = Transition::new(id, Property::Y, -200.0, f64::NAN)
            .begin(&tree)
            .unwrap_err();
        assert!(matches!(err, PlayerError::InvalidDuration { .. }));
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let (tree, id) = tree_with_circle();
        let tween = Transition::new(id, Property::Radius, 10.0, 0.0)
            .begin(&tree)
            .unwrap();
        assert_eq!(tween.sample(0.0), Value::Number(10.0));
    }

    #[test]
    fn test_keyword_cannot_animate() {
        let (tree, id) = tree_with_circle();
        let err = Transition::new(id, Property::FontFamily, "JetBrains Mono", 1.0)
            .begin(&tree)
            .unwrap_err();
        assert!(matches!(err, PlayerError::PropertyMismatch { .. }));
        assert!(Transition::new(id, Property::FontFamily, "JetBrains Mono", 0.0)
            .begin(&tree)
            .is_ok());
    }

    #[test]
    fn test_fill_interpolates_channels() {
        let (mut tree, id) = tree_with_circle();
        tree.set_property(id, Property::Fill, Value::Color(Color::BLACK)).unwrap();
        let tween = Transition::new(id, Property::Fill, "white", 1.0)
            .begin(&tree)
            .unwrap();
        assert_eq!(
            tween.sample(0.5),
            Value::Color(Color::rgba(128, 128, 128, 255))
        );
    }

    #[test]
    fn test_text_types_over() {
        assert_eq!(lerp_text("abcd", "WXYZ", 0.0), "abcd");
        assert_eq!(lerp_text("abcd", "WXYZ", 0.5), "WXcd");
        assert_eq!(lerp_text("", "COMPONENTS", 0.32), "COM");
    }

    #[test]
    fn test_dangling_node() {
        let (mut tree, id) = tree_with_circle();
        tree.dispose(id).unwrap();
        let err = Transition::new(id, Property::X, 1.0, 1.0)
            .begin(&tree)
            .unwrap_err();
        assert!(matches!(err, PlayerError::DanglingReference(_)));
    }
}
