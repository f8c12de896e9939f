//! Per-GM mutable state.
//!
//! A [`GmState`] is owned exclusively by one engine; all cross-GM
//! coordination happens over the bus. Only names of other GMs are stored,
//! never references to them.

use std::collections::HashMap;
use std::sync::Arc;
use umwelt_model::GmDefinition;
use umwelt_types::{Belief, ConjectureActivation, Efficacy, Round, Subject, Values};

/// Everything one GM owns.
#[derive(Debug)]
pub struct GmState {
    /// Static definition, shared with the profile.
    pub def: Arc<GmDefinition>,
    /// Names of GMs whose predictions this GM consumes.
    pub super_gms: Vec<String>,
    /// Names of sub-GMs and detectors feeding this GM.
    pub sub_gms: Vec<String>,
    /// Round history, newest first; index 0 is the running round.
    pub rounds: Vec<Round>,
    /// Active conjecture activations.
    pub activations: Vec<ConjectureActivation>,
    /// Learned trust per upstream source.
    pub precision_weights: HashMap<String, f64>,
    /// Learned CoA scores, per subject.
    pub efficacies: HashMap<Subject, Vec<Efficacy>>,
    /// Next positional CoA candidate, per subject.
    pub coa_indices: HashMap<Subject, u64>,
    /// Whether the engine has begun its first round.
    pub started: bool,
    /// Whether the current round's timer has been armed.
    pub timer_armed: bool,
}

impl GmState {
    /// Creates state with an initial round seeded from the definition's
    /// priors.
    #[must_use]
    pub fn new(def: Arc<GmDefinition>, super_gms: Vec<String>, sub_gms: Vec<String>) -> Self {
        let mut initial = Round::new(0);
        for (conjecture, values) in &def.priors {
            initial.beliefs.push(prior_belief(&def.name, conjecture, values.clone()));
        }

        Self {
            def,
            super_gms,
            sub_gms,
            rounds: vec![initial],
            activations: Vec::new(),
            precision_weights: HashMap::new(),
            efficacies: HashMap::new(),
            coa_indices: HashMap::new(),
            started: false,
            timer_armed: false,
        }
    }

    /// The running round.
    #[must_use]
    pub fn current(&self) -> &Round {
        &self.rounds[0]
    }

    /// The running round, mutably.
    pub fn current_mut(&mut self) -> &mut Round {
        &mut self.rounds[0]
    }

    /// The most recently completed round, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Round> {
        self.rounds.get(1)
    }

    /// Precision weight of an upstream source; unseen sources are fully
    /// trusted.
    #[must_use]
    pub fn precision_weight(&self, source: &str) -> f64 {
        crate::attention::weight_of(&self.precision_weights, source)
    }

    /// The efficacies learned for a subject.
    #[must_use]
    pub fn efficacies_for(&self, subject: &Subject) -> &[Efficacy] {
        self.efficacies.get(subject).map_or(&[], Vec::as_slice)
    }

    /// Replaces the learning state with recovered values.
    pub fn restore_learning(&mut self, efficacies: Vec<Efficacy>, coa_indices: Vec<(Subject, u64)>) {
        let mut grouped: HashMap<Subject, Vec<Efficacy>> = HashMap::new();
        for efficacy in efficacies {
            grouped.entry(efficacy.subject.clone()).or_default().push(efficacy);
        }
        self.efficacies = grouped;
        self.coa_indices = coa_indices.into_iter().collect();
    }
}

/// A prior belief, bound to the GM itself as subject.
fn prior_belief(gm: &str, conjecture: &str, values: Values) -> Belief {
    Belief {
        source: gm.to_string(),
        subject: Subject::new(conjecture, gm),
        goal: None,
        values: Some(values),
    }
}
