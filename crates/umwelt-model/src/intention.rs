//! Intentions: named intent producers.

use std::sync::Arc;
use std::time::Duration;
use umwelt_types::Values;

/// What an intention's valuator produces: the value to realize and an
/// optional actuation duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Actuation {
    /// Value handed to the actuator.
    pub value: serde_json::Value,
    /// How long the actuation should last, if bounded.
    pub duration: Option<Duration>,
}

impl Actuation {
    /// An unbounded actuation.
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            value,
            duration: None,
        }
    }

    /// Bounds the actuation (builder-style).
    #[must_use]
    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Maps belief values to an actuation, or to a no-op.
///
/// Receives the believed values for the course of action's subject
/// (absent when the subject is disbelieved); returning `None` skips the
/// intent entirely.
#[derive(Clone)]
pub struct IntentionValuator(Arc<dyn Fn(Option<&Values>) -> Option<Actuation> + Send + Sync>);

impl IntentionValuator {
    /// Creates a valuator from a closure.
    #[must_use]
    pub fn new(f: impl Fn(Option<&Values>) -> Option<Actuation> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A valuator that always produces the same actuation.
    #[must_use]
    pub fn constant(value: serde_json::Value) -> Self {
        Self::new(move |_| Some(Actuation::new(value.clone())))
    }

    /// Runs the valuator.
    #[must_use]
    pub fn actuation(&self, values: Option<&Values>) -> Option<Actuation> {
        (self.0)(values)
    }
}

impl std::fmt::Debug for IntentionValuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("IntentionValuator(..)")
    }
}

/// A named way of acting on the world.
#[derive(Debug, Clone)]
pub struct Intention {
    /// Actuator-facing intent name (becomes `Intent::about`).
    pub intent_name: String,
    /// Produces the intent value from belief values.
    pub valuator: IntentionValuator,
    /// Whether identical consecutive intents may be re-emitted.
    ///
    /// Non-repeatable intentions are suppressed when a remembered intent
    /// with the same `about` and value exists in the round history.
    pub repeatable: bool,
}

impl Intention {
    /// Creates a repeatable intention.
    #[must_use]
    pub fn new(intent_name: impl Into<String>, valuator: IntentionValuator) -> Self {
        Self {
            intent_name: intent_name.into(),
            valuator,
            repeatable: true,
        }
    }

    /// Marks the intention non-repeatable (builder-style).
    #[must_use]
    pub fn once(mut self) -> Self {
        self.repeatable = false;
        self
    }
}
