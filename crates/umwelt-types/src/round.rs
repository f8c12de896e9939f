//! Rounds: the episodic record of one GM cycle.

use crate::{Belief, CourseOfAction, Intent, Perception, Prediction, Subject, Values};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use uuid::Uuid;

/// Identifier for a GM round.
///
/// Timer events carry the round id they were armed for; a timeout whose
/// id no longer matches the current round is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(pub Uuid);

#[allow(clippy::new_without_default)] // Default intentionally not implemented - ids are minted by Round::new()
impl RoundId {
    /// Creates a new [`RoundId`] with a random UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "round:{}", self.0)
    }
}

/// One perceive-believe-act cycle of a GM.
///
/// Rounds are owned exclusively by their GM and mutated only through the
/// round engine's transitions; once `completed_on` is set, a round is an
/// immutable episodic record. GMs keep their rounds newest-first and
/// forget rounds whose completion has aged out.
#[derive(Debug, Clone)]
pub struct Round {
    /// Unique id, compared against timeout events.
    pub id: RoundId,
    /// Zero-based cycle counter.
    pub index: u64,
    /// When the round was allocated.
    pub started_on: Instant,
    /// When the round completed; `None` while running.
    pub completed_on: Option<Instant>,
    /// Sub-GMs that reported a completed round of their own.
    pub reported_in: BTreeSet<String>,
    /// Own predictions and incoming prediction errors.
    pub perceptions: Vec<Perception>,
    /// Predictions received from super-GMs.
    pub received_predictions: Vec<Prediction>,
    /// Beliefs determined at completion (carried over until then).
    pub beliefs: Vec<Belief>,
    /// Courses of action selected at completion.
    pub courses_of_action: Vec<CourseOfAction>,
    /// Intents published at completion.
    pub intents: Vec<Intent>,
}

impl Round {
    /// Allocates an empty round with a fresh id.
    #[must_use]
    pub fn new(index: u64) -> Self {
        Self {
            id: RoundId::new(),
            index,
            started_on: Instant::now(),
            completed_on: None,
            reported_in: BTreeSet::new(),
            perceptions: Vec::new(),
            received_predictions: Vec::new(),
            beliefs: Vec::new(),
            courses_of_action: Vec::new(),
            intents: Vec::new(),
        }
    }

    /// Returns `true` once the round has completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }

    /// Adds a perception, replacing any existing one with the same subject.
    pub fn upsert_perception(&mut self, perception: Perception) {
        match self
            .perceptions
            .iter_mut()
            .find(|p| p.subject() == perception.subject())
        {
            Some(slot) => *slot = perception,
            None => self.perceptions.push(perception),
        }
    }

    /// The belief held about `subject`, if any.
    #[must_use]
    pub fn belief(&self, subject: &Subject) -> Option<&Belief> {
        self.beliefs.iter().find(|b| b.subject == *subject)
    }

    /// The believed values for `subject`, if believed at all.
    #[must_use]
    pub fn belief_values(&self, subject: &Subject) -> Option<&Values> {
        self.belief(subject).and_then(|b| b.values.as_ref())
    }

    /// Returns `true` if an intent with this `about` and value was
    /// published in this round.
    #[must_use]
    pub fn remembers_intent(&self, about: &str, value: &serde_json::Value) -> bool {
        self.intents.iter().any(|i| i.about == about && i.value == *value)
    }
}
