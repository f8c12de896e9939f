//! Goal predicates attached to conjecture activations.

use crate::Values;
use std::sync::Arc;

/// A predicate over belief values that marks an activation as a goal.
///
/// A goal activation persists across rounds until its predicate holds
/// (or the activation is excluded by a contradiction). The label is
/// carried for logging and `Debug` output only; equality of goals is
/// never compared.
///
/// # Example
///
/// ```
/// use umwelt_types::Goal;
/// use std::collections::BTreeMap;
///
/// let goal = Goal::new("distance under 5", |values| {
///     values.get("dist").and_then(|v| v.as_f64()).is_some_and(|d| d < 5.0)
/// });
///
/// let mut values = BTreeMap::new();
/// values.insert("dist".to_string(), serde_json::json!(3.0));
/// assert!(goal.holds(&values));
/// ```
#[derive(Clone)]
pub struct Goal {
    label: String,
    test: Arc<dyn Fn(&Values) -> bool + Send + Sync>,
}

impl Goal {
    /// Creates a goal from a label and a predicate over belief values.
    #[must_use]
    pub fn new(label: impl Into<String>, test: impl Fn(&Values) -> bool + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            test: Arc::new(test),
        }
    }

    /// Evaluates the predicate against a set of belief values.
    #[must_use]
    pub fn holds(&self, values: &Values) -> bool {
        (self.test)(values)
    }

    /// Returns the goal's label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Goal").field(&self.label).finish()
    }
}
