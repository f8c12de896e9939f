//! Conjectures and their cognitive functions.
//!
//! Each conjecture carries three kinds of function values, all pure over
//! round history (deterministic modulo the engine's explicit selection
//! randomness):
//!
//! - an [`Activator`] binding the conjecture to subjects, optionally with
//!   a goal predicate (a *goal activator*),
//! - zero or more [`Predictor`]s producing predictions for an activation,
//! - a [`Valuator`] producing the believed values for an activation.

use std::sync::Arc;
use umwelt_types::{ConjectureActivation, Prediction, Round, Values};

/// Inputs to an [`Activator`].
#[derive(Debug)]
pub struct ActivationContext<'a> {
    /// Name of the conjecture being activated.
    pub conjecture: &'a str,
    /// Round history, newest first (index 0 is the running round).
    pub rounds: &'a [Round],
    /// The `about` of the super-GM prediction that triggered activation,
    /// or `None` when activating as a hyper-prior.
    pub prediction_about: Option<&'a str>,
}

/// Binds a conjecture to zero or more subjects.
#[derive(Clone)]
pub struct Activator(Arc<dyn Fn(&ActivationContext<'_>) -> Vec<ConjectureActivation> + Send + Sync>);

impl Activator {
    /// Creates an activator from a closure.
    #[must_use]
    pub fn new(
        f: impl Fn(&ActivationContext<'_>) -> Vec<ConjectureActivation> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// An activator that never activates.
    ///
    /// For conjectures only ever activated through received predictions
    /// handled by another conjecture's activator.
    #[must_use]
    pub fn never() -> Self {
        Self::new(|_| Vec::new())
    }

    /// Runs the activator.
    #[must_use]
    pub fn activations(&self, cx: &ActivationContext<'_>) -> Vec<ConjectureActivation> {
        (self.0)(cx)
    }
}

impl std::fmt::Debug for Activator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Activator(..)")
    }
}

/// Produces a prediction for an activation, or nothing.
#[derive(Clone)]
pub struct Predictor(Arc<dyn Fn(&ConjectureActivation, &[Round]) -> Option<Prediction> + Send + Sync>);

impl Predictor {
    /// Creates a predictor from a closure.
    #[must_use]
    pub fn new(
        f: impl Fn(&ConjectureActivation, &[Round]) -> Option<Prediction> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// Runs the predictor.
    #[must_use]
    pub fn predict(&self, activation: &ConjectureActivation, rounds: &[Round]) -> Option<Prediction> {
        (self.0)(activation, rounds)
    }
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predictor(..)")
    }
}

/// Produces the believed values for an activation, or disbelief.
#[derive(Clone)]
pub struct Valuator(Arc<dyn Fn(&ConjectureActivation, &[Round]) -> Option<Values> + Send + Sync>);

impl Valuator {
    /// Creates a valuator from a closure.
    #[must_use]
    pub fn new(
        f: impl Fn(&ConjectureActivation, &[Round]) -> Option<Values> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(f))
    }

    /// A valuator that always disbelieves.
    #[must_use]
    pub fn disbelieve() -> Self {
        Self::new(|_, _| None)
    }

    /// Runs the valuator.
    #[must_use]
    pub fn values(&self, activation: &ConjectureActivation, rounds: &[Round]) -> Option<Values> {
        (self.0)(activation, rounds)
    }
}

impl std::fmt::Debug for Valuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Valuator(..)")
    }
}

/// A named hypothesis a GM may come to believe.
#[derive(Debug, Clone)]
pub struct Conjecture {
    /// Unique name within the GM.
    pub name: String,
    /// Binds the conjecture to subjects each round.
    pub activator: Activator,
    /// Prediction producers, invoked per activation.
    pub predictors: Vec<Predictor>,
    /// Produces the believed values at round completion.
    pub valuator: Valuator,
    /// Ordered intention names available to courses of action.
    pub intention_domain: Vec<String>,
}

impl Conjecture {
    /// Creates a conjecture with no predictors and an empty intention
    /// domain; fill in with the builder-style methods.
    #[must_use]
    pub fn new(name: impl Into<String>, activator: Activator, valuator: Valuator) -> Self {
        Self {
            name: name.into(),
            activator,
            predictors: Vec::new(),
            valuator,
            intention_domain: Vec::new(),
        }
    }

    /// Adds a predictor.
    #[must_use]
    pub fn with_predictor(mut self, predictor: Predictor) -> Self {
        self.predictors.push(predictor);
        self
    }

    /// Sets the intention domain.
    #[must_use]
    pub fn with_intention_domain(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.intention_domain = names.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umwelt_types::Subject;

    #[test]
    fn activator_runs_closure() {
        let activator = Activator::new(|cx| {
            vec![ConjectureActivation::opinion(Subject::new(
                cx.conjecture,
                cx.prediction_about.unwrap_or("self"),
            ))]
        });

        let cx = ActivationContext {
            conjecture: "happy",
            rounds: &[],
            prediction_about: None,
        };
        let activations = activator.activations(&cx);
        assert_eq!(activations.len(), 1);
        assert_eq!(activations[0].subject, Subject::new("happy", "self"));

        let cx = ActivationContext {
            conjecture: "happy",
            rounds: &[],
            prediction_about: Some("rover"),
        };
        assert_eq!(
            activator.activations(&cx)[0].subject,
            Subject::new("happy", "rover")
        );
    }

    #[test]
    fn never_activator_is_empty() {
        let cx = ActivationContext {
            conjecture: "x",
            rounds: &[],
            prediction_about: None,
        };
        assert!(Activator::never().activations(&cx).is_empty());
    }

    #[test]
    fn disbelieving_valuator() {
        let activation = ConjectureActivation::opinion(Subject::new("happy", "self"));
        assert!(Valuator::disbelieve().values(&activation, &[]).is_none());
    }

    #[test]
    fn conjecture_builder() {
        let conjecture = Conjecture::new("happy", Activator::never(), Valuator::disbelieve())
            .with_predictor(Predictor::new(|_, _| None))
            .with_intention_domain(["greet", "wave"]);

        assert_eq!(conjecture.name, "happy");
        assert_eq!(conjecture.predictors.len(), 1);
        assert_eq!(conjecture.intention_domain, vec!["greet", "wave"]);
    }
}
