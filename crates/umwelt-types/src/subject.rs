//! Subjects and parameter values.
//!
//! A [`Subject`] is the pair `(conjecture, about)` that uniquely identifies
//! what a perception or belief refers to. Two perceptions compete iff their
//! subjects are equal; within a completed round at most one perception
//! exists per subject.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named parameter values carried by beliefs and intention valuators.
///
/// Keys are parameter names; values are plain JSON scalars or structures.
/// An *absent* `Values` (i.e. `Option::<Values>::None`) means disbelief.
pub type Values = BTreeMap<String, serde_json::Value>;

/// What a perception, belief, or activation is about.
///
/// The pair of a conjecture name and the subject binding (`about`). Two
/// perceptions have the same subject iff both components match; for a
/// prediction error the subject is that of its prediction.
///
/// # Example
///
/// ```
/// use umwelt_types::Subject;
///
/// let a = Subject::new("obstacle", "front");
/// let b = Subject::new("obstacle", "rear");
///
/// assert_ne!(a, b);
/// assert_eq!(a.to_string(), "obstacle(front)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Subject {
    /// Name of the conjecture this subject refers to.
    pub conjecture: String,
    /// What the conjecture is about (e.g. a thing, a direction, the agent).
    pub about: String,
}

impl Subject {
    /// Creates a subject from a conjecture name and an `about` binding.
    #[must_use]
    pub fn new(conjecture: impl Into<String>, about: impl Into<String>) -> Self {
        Self {
            conjecture: conjecture.into(),
            about: about.into(),
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.conjecture, self.about)
    }
}
