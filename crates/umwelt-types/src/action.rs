//! Conjecture activations, courses of action, and learned efficacies.

use crate::{Goal, Subject, Values};
use serde::{Deserialize, Serialize};

// ── ConjectureActivation ─────────────────────────────────────────────

/// A conjecture bound to a subject, optionally carrying a goal predicate.
///
/// Goal activations (goal present) persist across rounds until the goal
/// is achieved or the activation is excluded by a contradiction; opinion
/// activations (no goal) are re-derived every round.
#[derive(Debug, Clone)]
pub struct ConjectureActivation {
    /// What the activation is about.
    pub subject: Subject,
    /// Goal predicate, present for goal activations.
    pub goal: Option<Goal>,
}

impl ConjectureActivation {
    /// An opinion activation: no goal attached.
    #[must_use]
    pub fn opinion(subject: Subject) -> Self {
        Self { subject, goal: None }
    }

    /// A goal activation.
    #[must_use]
    pub fn goal(subject: Subject, goal: Goal) -> Self {
        Self {
            subject,
            goal: Some(goal),
        }
    }

    /// Returns `true` if this is a goal activation.
    #[must_use]
    pub fn is_goal(&self) -> bool {
        self.goal.is_some()
    }

    /// Name of the activated conjecture.
    #[must_use]
    pub fn conjecture(&self) -> &str {
        &self.subject.conjecture
    }

    /// Returns `true` if the goal predicate holds over the given values.
    ///
    /// Opinion activations are never "achieved"; absent values never
    /// achieve a goal.
    #[must_use]
    pub fn achieved_by(&self, values: Option<&Values>) -> bool {
        match (&self.goal, values) {
            (Some(goal), Some(values)) => goal.holds(values),
            _ => false,
        }
    }
}

// ── CourseOfAction ───────────────────────────────────────────────────

/// An ordered intention sequence chosen to validate an activation.
///
/// Two CoAs are of the same *shape* iff their activation subjects and
/// their intention-name sequences are equal.
#[derive(Debug, Clone)]
pub struct CourseOfAction {
    /// The activation this CoA was chosen for.
    pub activation: ConjectureActivation,
    /// Intention names, in execution order.
    pub intention_names: Vec<String>,
}

impl CourseOfAction {
    /// Returns `true` if this CoA has the given shape.
    #[must_use]
    pub fn has_shape(&self, subject: &Subject, intention_names: &[String]) -> bool {
        self.activation.subject == *subject && self.intention_names == intention_names
    }
}

// ── Efficacy ─────────────────────────────────────────────────────────

/// Learned score of a CoA shape's past success for a subject.
///
/// Partitioned by whether the conjecture was already satisfied when the
/// CoA executed: making a conjecture true and keeping it true are learned
/// separately. Persisted to long-term memory at shutdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Efficacy {
    /// Subject the CoA acts on.
    pub subject: Subject,
    /// The CoA shape's intention-name sequence.
    pub intention_names: Vec<String>,
    /// Which satisfaction partition this score belongs to.
    pub when_already_satisfied: bool,
    /// Correlation score in `[0, 1]`.
    pub degree: f64,
}

impl Efficacy {
    /// A freshly seeded efficacy with degree `0`.
    #[must_use]
    pub fn seed(subject: Subject, intention_names: Vec<String>, when_already_satisfied: bool) -> Self {
        Self {
            subject,
            intention_names,
            when_already_satisfied,
            degree: 0.0,
        }
    }
}
