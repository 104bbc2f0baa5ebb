use serde::{Deserialize, Serialize};

/// Timing function applied to normalized transition progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
}

impl Easing {
    /// Map progress `t` in [0, 1] to eased progress. Input is clamped, so
    /// `apply(1.0)` is always exactly 1.0.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let t1 = t - 1.0;
                t1 * t1 * t1 + 1.0
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let t1 = 2.0 * t - 2.0;
                    0.5 * t1 * t1 * t1 + 1.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?}", easing);
        }
    }

    #[test]
    fn test_linear_midpoint() {
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
        assert_eq!(Easing::default(), Easing::Linear);
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(Easing::CubicOut.apply(1.5), 1.0);
        assert_eq!(Easing::EaseIn.apply(-0.2), 0.0);
    }

    #[test]
    fn test_ease_in_lags_linear() {
        assert!(Easing::EaseIn.apply(0.3) < 0.3);
        assert!(Easing::EaseOut.apply(0.3) > 0.3);
    }

    #[test]
    fn test_deserialize_snake_case() {
        let easing: Easing = serde_json::from_str("\"cubic_in_out\"").unwrap();
        assert_eq!(easing, Easing::CubicInOut);
    }
}
