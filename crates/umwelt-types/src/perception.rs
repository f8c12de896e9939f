//! Perceptions: predictions and prediction errors.
//!
//! A GM's round holds a single pool of perceptions. A perception is either
//! a prediction this GM made (flowing down the cognition graph) or a
//! prediction error raised against one of its predictions by a sub-GM or
//! detector (flowing up). Common accessors ([`Perception::subject`],
//! [`Perception::source`], [`Perception::carry_overs`]) are implemented
//! per variant.

use crate::{Goal, Subject, ValueDomain, Values};
use std::collections::BTreeMap;

// ── Belief ───────────────────────────────────────────────────────────

/// A GM's valuation of a conjecture activation.
///
/// `values` absent means disbelief: the GM could not produce values for
/// the conjecture this round.
#[derive(Debug, Clone)]
pub struct Belief {
    /// Name of the GM (or detector) holding the belief.
    pub source: String,
    /// What the belief is about.
    pub subject: Subject,
    /// Goal predicate inherited from the activation, if any.
    pub goal: Option<Goal>,
    /// Parameter values, or `None` for disbelief.
    pub values: Option<Values>,
}

impl Belief {
    /// Returns `true` if this belief satisfies its conjecture.
    ///
    /// Values must be present and, when a goal is attached, the goal
    /// predicate must hold over them.
    #[must_use]
    pub fn satisfies_conjecture(&self) -> bool {
        match &self.values {
            None => false,
            Some(values) => self.goal.as_ref().map_or(true, |g| g.holds(values)),
        }
    }

    /// A disbelief: a belief with no values.
    #[must_use]
    pub fn disbelief(source: impl Into<String>, subject: Subject, goal: Option<Goal>) -> Self {
        Self {
            source: source.into(),
            subject,
            goal,
            values: None,
        }
    }
}

// ── Prediction ───────────────────────────────────────────────────────

/// A prediction published by a GM about one of its conjectures.
///
/// `expected` maps parameter names to the sub-domain of values the
/// predicting GM would accept.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Name of the predicting GM.
    pub source: String,
    /// What the prediction is about.
    pub subject: Subject,
    /// Goal predicate carried along from the activation, if any.
    pub goal: Option<Goal>,
    /// Acceptable value sub-domains, per parameter.
    pub expected: BTreeMap<String, ValueDomain>,
    /// How many rounds this prediction has been carried over.
    pub carry_overs: u32,
}

impl Prediction {
    /// Creates a prediction with zero carry-overs.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        subject: Subject,
        expected: BTreeMap<String, ValueDomain>,
    ) -> Self {
        Self {
            source: source.into(),
            subject,
            goal: None,
            expected,
            carry_overs: 0,
        }
    }

    /// Attaches a goal predicate (builder-style).
    #[must_use]
    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
        self
    }

    /// Size of the error the given belief values represent, in `[0, 1]`.
    ///
    /// The element-wise deviation of each expected parameter, averaged.
    /// A parameter missing from `values` contributes the maximum `1.0`;
    /// a prediction with no expectations never deviates.
    #[must_use]
    pub fn error_size(&self, values: &Values) -> f64 {
        if self.expected.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .expected
            .iter()
            .map(|(name, domain)| values.get(name).map_or(1.0, |v| domain.deviation(v)))
            .sum();
        (total / self.expected.len() as f64).clamp(0.0, 1.0)
    }
}

// ── PredictionError ──────────────────────────────────────────────────

/// A deviation between a prediction and the believed state of the world.
///
/// `size` quantifies the deviation: `0` is full agreement (never
/// published), `1` is maximum disagreement, including "no belief where
/// one was predicted".
#[derive(Debug, Clone)]
pub struct PredictionError {
    /// The prediction being contradicted.
    pub prediction: Prediction,
    /// The belief that contradicts it (its `source` raised the error).
    pub belief: Belief,
    /// Deviation in `[0, 1]`.
    pub size: f64,
    /// How many rounds this error has been carried over.
    pub carry_overs: u32,
}

impl PredictionError {
    /// The subject of the underlying prediction.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.prediction.subject
    }

    /// Name of the GM or detector that raised the error.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.belief.source
    }
}

// ── Perception ───────────────────────────────────────────────────────

/// A prediction made by this GM, or a prediction error raised against it.
#[derive(Debug, Clone)]
pub enum Perception {
    /// A prediction this GM published (↓).
    Prediction(Prediction),
    /// A prediction error received from a sub-GM or detector (↑).
    Error(PredictionError),
}

impl Perception {
    /// The subject this perception refers to.
    #[must_use]
    pub fn subject(&self) -> &Subject {
        match self {
            Self::Prediction(p) => &p.subject,
            Self::Error(e) => e.subject(),
        }
    }

    /// The name of the GM or detector this perception came from.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Prediction(p) => &p.source,
            Self::Error(e) => e.source(),
        }
    }

    /// How many rounds this perception has been carried over.
    #[must_use]
    pub fn carry_overs(&self) -> u32 {
        match self {
            Self::Prediction(p) => p.carry_overs,
            Self::Error(e) => e.carry_overs,
        }
    }

    /// Increments the carry-over count.
    pub fn bump_carry_overs(&mut self) {
        match self {
            Self::Prediction(p) => p.carry_overs += 1,
            Self::Error(e) => e.carry_overs += 1,
        }
    }

    /// Returns `true` for the prediction variant.
    #[must_use]
    pub fn is_prediction(&self) -> bool {
        matches!(self, Self::Prediction(_))
    }
}
