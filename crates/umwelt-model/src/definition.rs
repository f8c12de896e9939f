//! Static GM definitions.

use crate::{Conjecture, DefinitionError, Intention};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use umwelt_types::Values;

/// The static description of one Generative Model.
///
/// Authored per agent profile and validated at bootstrap. A definition
/// never changes while the GM runs; everything learned at runtime
/// (efficacies, precision weights, CoA indices) lives in the engine's
/// state instead.
#[derive(Debug, Clone)]
pub struct GmDefinition {
    /// Unique GM name; also the `source` of its predictions and the
    /// long-term memory namespace for its learning state.
    pub name: String,
    /// The hypotheses this GM can hold.
    pub conjectures: Vec<Conjecture>,
    /// Sets of pairwise mutually exclusive conjecture names.
    pub contradictions: Vec<BTreeSet<String>>,
    /// Initial belief values per conjecture, seeded into the first round.
    pub priors: BTreeMap<String, Values>,
    /// Named intentions available to intention domains.
    pub intentions: BTreeMap<String, Intention>,
    /// How long a round may run before the timer completes it.
    pub max_round_duration: Duration,
    /// Hyper-prior GMs activate all their conjectures each round, absent
    /// external predictions.
    pub hyper_prior: bool,
}

impl GmDefinition {
    /// Creates a minimal definition; fill in with the builder-style
    /// methods.
    #[must_use]
    pub fn new(name: impl Into<String>, max_round_duration: Duration) -> Self {
        Self {
            name: name.into(),
            conjectures: Vec::new(),
            contradictions: Vec::new(),
            priors: BTreeMap::new(),
            intentions: BTreeMap::new(),
            max_round_duration,
            hyper_prior: false,
        }
    }

    /// Adds a conjecture.
    #[must_use]
    pub fn with_conjecture(mut self, conjecture: Conjecture) -> Self {
        self.conjectures.push(conjecture);
        self
    }

    /// Adds a named intention.
    #[must_use]
    pub fn with_intention(mut self, name: impl Into<String>, intention: Intention) -> Self {
        self.intentions.insert(name.into(), intention);
        self
    }

    /// Adds a set of pairwise mutually exclusive conjecture names.
    #[must_use]
    pub fn with_contradiction(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.contradictions
            .push(names.into_iter().map(Into::into).collect());
        self
    }

    /// Seeds a prior for a conjecture.
    #[must_use]
    pub fn with_prior(mut self, conjecture: impl Into<String>, values: Values) -> Self {
        self.priors.insert(conjecture.into(), values);
        self
    }

    /// Marks this GM as a hyper-prior.
    #[must_use]
    pub fn hyper_prior(mut self) -> Self {
        self.hyper_prior = true;
        self
    }

    /// Looks up a conjecture by name.
    #[must_use]
    pub fn conjecture(&self, name: &str) -> Option<&Conjecture> {
        self.conjectures.iter().find(|c| c.name == name)
    }

    /// Looks up an intention by name.
    #[must_use]
    pub fn intention(&self, name: &str) -> Option<&Intention> {
        self.intentions.get(name)
    }

    /// Returns `true` if the two conjecture names are mutually exclusive
    /// per the contradiction sets.
    #[must_use]
    pub fn mutually_exclusive(&self, a: &str, b: &str) -> bool {
        a != b
            && self
                .contradictions
                .iter()
                .any(|set| set.contains(a) && set.contains(b))
    }

    /// Validates the definition's internal references.
    ///
    /// # Errors
    ///
    /// All [`DefinitionError`] variants here are fatal: empty or duplicate
    /// conjecture names, contradictions or priors naming undefined
    /// conjectures, intention domains naming undefined intentions, and
    /// contradiction sets too small to exclude anything.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() {
            return Err(DefinitionError::EmptyName { gm: self.name.clone() });
        }

        let mut seen = BTreeSet::new();
        for conjecture in &self.conjectures {
            if conjecture.name.is_empty() {
                return Err(DefinitionError::EmptyName { gm: self.name.clone() });
            }
            if !seen.insert(conjecture.name.as_str()) {
                return Err(DefinitionError::DuplicateConjecture {
                    gm: self.name.clone(),
                    conjecture: conjecture.name.clone(),
                });
            }
            for intention in &conjecture.intention_domain {
                if !self.intentions.contains_key(intention) {
                    return Err(DefinitionError::UndefinedIntention {
                        gm: self.name.clone(),
                        intention: intention.clone(),
                    });
                }
            }
        }

        for set in &self.contradictions {
            if set.len() < 2 {
                return Err(DefinitionError::DegenerateContradiction { gm: self.name.clone() });
            }
            for name in set {
                if !seen.contains(name.as_str()) {
                    return Err(DefinitionError::UndefinedConjecture {
                        gm: self.name.clone(),
                        conjecture: name.clone(),
                    });
                }
            }
        }

        for name in self.priors.keys() {
            if !seen.contains(name.as_str()) {
                return Err(DefinitionError::UndefinedConjecture {
                    gm: self.name.clone(),
                    conjecture: name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Activator, IntentionValuator, Valuator};
    use serde_json::json;

    fn definition() -> GmDefinition {
        GmDefinition::new("nav", Duration::from_millis(500))
            .with_conjecture(
                Conjecture::new("clear_path", Activator::never(), Valuator::disbelieve())
                    .with_intention_domain(["forward"]),
            )
            .with_conjecture(Conjecture::new(
                "blocked",
                Activator::never(),
                Valuator::disbelieve(),
            ))
            .with_intention(
                "forward",
                Intention::new("forward", IntentionValuator::constant(json!(1.0))),
            )
            .with_contradiction(["clear_path", "blocked"])
    }

    #[test]
    fn valid_definition_passes() {
        definition().validate().expect("definition should validate");
    }

    #[test]
    fn mutual_exclusion_from_contradiction_sets() {
        let def = definition();
        assert!(def.mutually_exclusive("clear_path", "blocked"));
        assert!(def.mutually_exclusive("blocked", "clear_path"));
        // A conjecture never excludes itself.
        assert!(!def.mutually_exclusive("blocked", "blocked"));
        assert!(!def.mutually_exclusive("clear_path", "unrelated"));
    }

    #[test]
    fn duplicate_conjecture_rejected() {
        let def = definition().with_conjecture(Conjecture::new(
            "blocked",
            Activator::never(),
            Valuator::disbelieve(),
        ));
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::DuplicateConjecture { .. })
        ));
    }

    #[test]
    fn contradiction_naming_unknown_conjecture_rejected() {
        let def = definition().with_contradiction(["clear_path", "ghost"]);
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::UndefinedConjecture { .. })
        ));
    }

    #[test]
    fn intention_domain_naming_unknown_intention_rejected() {
        let def = GmDefinition::new("nav", Duration::from_millis(500)).with_conjecture(
            Conjecture::new("clear_path", Activator::never(), Valuator::disbelieve())
                .with_intention_domain(["warp"]),
        );
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::UndefinedIntention { .. })
        ));
    }

    #[test]
    fn prior_naming_unknown_conjecture_rejected() {
        let def = definition().with_prior("ghost", Values::new());
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::UndefinedConjecture { .. })
        ));
    }

    #[test]
    fn degenerate_contradiction_rejected() {
        let def = definition().with_contradiction(["blocked"]);
        assert!(matches!(
            def.validate(),
            Err(DefinitionError::DegenerateContradiction { .. })
        ));
    }
}
