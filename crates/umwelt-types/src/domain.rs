//! Acceptable value sub-domains for predictions.
//!
//! A prediction does not name exact values; it names, per parameter, the
//! sub-domain of values it would accept. [`ValueDomain::deviation`] turns
//! an observed value into a normalized distance in `[0, 1]`: `0` inside
//! the domain, `1` for a categorical mismatch, and a proportional distance
//! for numeric ranges.

use serde::{Deserialize, Serialize};

/// The sub-domain of values a prediction accepts for one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    /// Exactly one acceptable value.
    Exactly { value: serde_json::Value },
    /// A finite set of acceptable values.
    OneOf { options: Vec<serde_json::Value> },
    /// A closed numeric interval `[min, max]`.
    Range { min: f64, max: f64 },
    /// Any value is acceptable (the parameter must merely be present).
    Any,
}

impl ValueDomain {
    /// Returns `true` if `value` falls inside this domain.
    #[must_use]
    pub fn accepts(&self, value: &serde_json::Value) -> bool {
        self.deviation(value) == 0.0
    }

    /// Normalized distance of `value` from this domain, in `[0, 1]`.
    ///
    /// In-domain values score `0.0`. Categorical mismatches score `1.0`.
    /// For [`Range`](Self::Range), an out-of-range number scores the
    /// distance to the nearest bound divided by the range width, capped
    /// at `1.0`; non-numeric values score `1.0`.
    #[must_use]
    pub fn deviation(&self, value: &serde_json::Value) -> f64 {
        match self {
            Self::Any => 0.0,
            Self::Exactly { value: expected } => {
                if value == expected {
                    0.0
                } else {
                    1.0
                }
            }
            Self::OneOf { options } => {
                if options.contains(value) {
                    0.0
                } else {
                    1.0
                }
            }
            Self::Range { min, max } => match value.as_f64() {
                None => 1.0,
                Some(x) if x >= *min && x <= *max => 0.0,
                Some(x) => {
                    let width = (max - min).abs().max(f64::EPSILON);
                    let distance = if x < *min { min - x } else { x - max };
                    (distance / width).min(1.0)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exactly_matches_equal_value() {
        let domain = ValueDomain::Exactly { value: json!(true) };
        assert!(domain.accepts(&json!(true)));
        assert_eq!(domain.deviation(&json!(false)), 1.0);
    }

    #[test]
    fn one_of_matches_members() {
        let domain = ValueDomain::OneOf {
            options: vec![json!("red"), json!("green")],
        };
        assert!(domain.accepts(&json!("green")));
        assert_eq!(domain.deviation(&json!("blue")), 1.0);
    }

    #[test]
    fn range_in_bounds_is_zero() {
        let domain = ValueDomain::Range { min: 0.0, max: 5.0 };
        assert_eq!(domain.deviation(&json!(0.0)), 0.0);
        assert_eq!(domain.deviation(&json!(5)), 0.0);
        assert_eq!(domain.deviation(&json!(2.5)), 0.0);
    }

    #[test]
    fn range_deviation_is_proportional() {
        let domain = ValueDomain::Range { min: 0.0, max: 5.0 };
        // 2.5 beyond the upper bound of a width-5 range.
        assert!((domain.deviation(&json!(7.5)) - 0.5).abs() < 1e-9);
        // Far out-of-range caps at 1.0.
        assert_eq!(domain.deviation(&json!(100.0)), 1.0);
        assert_eq!(domain.deviation(&json!(-100.0)), 1.0);
    }

    #[test]
    fn range_rejects_non_numeric() {
        let domain = ValueDomain::Range { min: 0.0, max: 5.0 };
        assert_eq!(domain.deviation(&json!("three")), 1.0);
    }

    #[test]
    fn any_accepts_everything() {
        assert!(ValueDomain::Any.accepts(&json!(null)));
        assert!(ValueDomain::Any.accepts(&json!({"nested": [1, 2]})));
    }

    #[test]
    fn domain_serde_tagged() {
        let domain = ValueDomain::Range { min: 0.0, max: 5.0 };
        let json = serde_json::to_string(&domain).expect("serialize ValueDomain");
        assert!(json.contains(r#""kind":"range""#));
        let back: ValueDomain = serde_json::from_str(&json).expect("deserialize ValueDomain");
        assert_eq!(back, domain);
    }
}
