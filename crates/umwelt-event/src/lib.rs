//! Event types for the umwelt bus.
//!
//! All cross-GM communication is a [`BusEvent`] delivered over the event
//! bus in `umwelt-engine`; GMs never read each other's state. Subscribers
//! register an [`Interest`] — a set of [`EventKind`] topic tags — and the
//! bus fans every published event out to the interested subscribers in
//! publication order.
//!
//! # Event Flow
//!
//! ```text
//!                 ┌─────────────┐
//!   prediction ↓  │             │  prediction error ↑
//!  ┌───────────── │  EventBus   │ ◄────────────────────┐
//!  │              │             │                      │
//!  ▼              └─────────────┘                      │
//! sub-GMs            ▲      │ intended ↓          detectors
//!  │ round completed │      ▼
//!  └─────────────────┘   actuators
//! ```
//!
//! | Event | Direction | Consumed by |
//! |-------|-----------|-------------|
//! | [`BusEvent::Prediction`] | ↓ | GMs owning the predicted conjecture |
//! | [`BusEvent::PredictionError`] | ↑ | The GM that made the prediction |
//! | [`BusEvent::RoundCompleted`] | ↑ | Super-GMs, episodic observers |
//! | [`BusEvent::RoundTimedOut`] | self | The GM that armed the timer |
//! | [`BusEvent::Intended`] | ↓ | Actuators |
//! | [`BusEvent::Shutdown`] | — | Everyone |

use umwelt_types::{Intent, Prediction, PredictionError, RoundId};

/// An event on the umwelt bus.
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// A GM published a prediction (flows down the cognition graph).
    Prediction(Prediction),
    /// A GM or detector raised a prediction error (flows up).
    PredictionError(PredictionError),
    /// A GM completed a round.
    RoundCompleted {
        /// Name of the reporting GM.
        gm: String,
        /// Id of the completed round, for episodic observers.
        round: RoundId,
    },
    /// A round timer fired; self-addressed through the bus.
    RoundTimedOut {
        /// Name of the GM that armed the timer.
        gm: String,
        /// The round the timer was armed for.
        round: RoundId,
    },
    /// An intent headed for actuators.
    Intended(Intent),
    /// System-wide shutdown; GMs persist their learning state and stop.
    Shutdown,
}

impl BusEvent {
    /// The topic tag of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Prediction(_) => EventKind::Prediction,
            Self::PredictionError(_) => EventKind::PredictionError,
            Self::RoundCompleted { .. } => EventKind::RoundCompleted,
            Self::RoundTimedOut { .. } => EventKind::RoundTimedOut,
            Self::Intended(_) => EventKind::Intended,
            Self::Shutdown => EventKind::Shutdown,
        }
    }
}

/// Topic tag of a [`BusEvent`], used for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Prediction,
    PredictionError,
    RoundCompleted,
    RoundTimedOut,
    Intended,
    Shutdown,
}

/// A subscriber's set of interesting topic tags.
///
/// [`Interest::gm`] covers everything a GM runner handles;
/// [`Interest::actuator`] covers intent consumers. [`BusEvent::Shutdown`]
/// is always included — every subscriber must observe shutdown.
#[derive(Debug, Clone)]
pub struct Interest {
    kinds: Vec<EventKind>,
}

impl Interest {
    /// Interest in the given kinds, plus shutdown.
    #[must_use]
    pub fn in_kinds(kinds: &[EventKind]) -> Self {
        let mut kinds = kinds.to_vec();
        if !kinds.contains(&EventKind::Shutdown) {
            kinds.push(EventKind::Shutdown);
        }
        Self { kinds }
    }

    /// Everything a GM round engine handles.
    #[must_use]
    pub fn gm() -> Self {
        Self::in_kinds(&[
            EventKind::Prediction,
            EventKind::PredictionError,
            EventKind::RoundCompleted,
            EventKind::RoundTimedOut,
        ])
    }

    /// Everything an actuator consumes.
    #[must_use]
    pub fn actuator() -> Self {
        Self::in_kinds(&[EventKind::Intended])
    }

    /// Every event kind, for episodic observers and tests.
    #[must_use]
    pub fn all() -> Self {
        Self::in_kinds(&[
            EventKind::Prediction,
            EventKind::PredictionError,
            EventKind::RoundCompleted,
            EventKind::RoundTimedOut,
            EventKind::Intended,
        ])
    }

    /// Returns `true` if the event's kind is in this interest set.
    #[must_use]
    pub fn matches(&self, event: &BusEvent) -> bool {
        self.kinds.contains(&event.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use umwelt_types::Subject;

    fn prediction() -> Prediction {
        Prediction::new("nav", Subject::new("obstacle", "front"), BTreeMap::new())
    }

    #[test]
    fn event_kinds_match_variants() {
        assert_eq!(BusEvent::Prediction(prediction()).kind(), EventKind::Prediction);
        assert_eq!(BusEvent::Shutdown.kind(), EventKind::Shutdown);
        assert_eq!(
            BusEvent::RoundCompleted {
                gm: "nav".into(),
                round: RoundId::new(),
            }
            .kind(),
            EventKind::RoundCompleted
        );
    }

    #[test]
    fn gm_interest_covers_round_traffic() {
        let interest = Interest::gm();
        assert!(interest.matches(&BusEvent::Prediction(prediction())));
        assert!(interest.matches(&BusEvent::RoundTimedOut {
            gm: "nav".into(),
            round: RoundId::new(),
        }));
        assert!(!interest.matches(&BusEvent::Intended(Intent::new(
            "forward",
            serde_json::json!(1.0),
            None,
        ))));
    }

    #[test]
    fn actuator_interest_covers_intents_only() {
        let interest = Interest::actuator();
        assert!(interest.matches(&BusEvent::Intended(Intent::new(
            "forward",
            serde_json::json!(1.0),
            None,
        ))));
        assert!(!interest.matches(&BusEvent::Prediction(prediction())));
    }

    #[test]
    fn shutdown_is_always_interesting() {
        for interest in [Interest::gm(), Interest::actuator(), Interest::all(), Interest::in_kinds(&[])] {
            assert!(interest.matches(&BusEvent::Shutdown));
        }
    }
}
