//! Intents headed for actuators.

use std::time::{Duration, Instant};

/// A motor output produced by executing a course of action.
///
/// `about` names the actuator-facing intent (the intention's
/// `intent_name`); `value` is whatever the intention's valuator produced.
/// Stale intents are still realized — actuators log a warning via
/// [`is_stale`](Self::is_stale) but never drop them.
#[derive(Debug, Clone)]
pub struct Intent {
    /// Actuator-facing name (e.g. `"forward"`, `"say"`).
    pub about: String,
    /// Value to realize (speed, utterance, color, ...).
    pub value: serde_json::Value,
    /// How long the actuation should last, if bounded.
    pub duration: Option<Duration>,
    /// When the engine produced the intent.
    pub created_at: Instant,
}

impl Intent {
    /// Creates an intent stamped with the current instant.
    #[must_use]
    pub fn new(about: impl Into<String>, value: serde_json::Value, duration: Option<Duration>) -> Self {
        Self {
            about: about.into(),
            value,
            duration,
            created_at: Instant::now(),
        }
    }

    /// Age of the intent.
    #[must_use]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Returns `true` if the intent is older than `threshold`.
    #[must_use]
    pub fn is_stale(&self, threshold: Duration) -> bool {
        self.age() > threshold
    }
}
