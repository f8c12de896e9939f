//! The GM round engine.
//!
//! One [`GmEngine`] drives one GM through its rounds:
//!
//! ```text
//! ┌──────────────┐   events    ┌─────────────┐  timeout / all
//! │ Initialization│ ─────────► │   Running   │  sub-GMs reported
//! │ carry, activate│           │ predictions │ ───────────────┐
//! │ predict        │           │ errors      │                ▼
//! └──────▲───────┘             │ reports     │         ┌────────────┐
//!        │                     └─────────────┘         │ Completion │
//!        │   allocate next round                       │ steps 1-10 │
//!        └─────────────────────────────────────────────┴────────────┘
//! ```
//!
//! The engine is synchronous and single-owner: every handler is a total
//! function from state and event to state, and runs to completion
//! without yielding. The async edge (event delivery, timers) lives in
//! [`GmRunner`](crate::GmRunner).

use crate::{attention, efficacy, rng, DrawUniform, EngineConfig, EngineError, EventBus};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use umwelt_event::BusEvent;
use umwelt_model::{ActivationContext, GmDefinition, LongTermMemory};
use umwelt_types::{
    Belief, ConjectureActivation, CourseOfAction, Efficacy, Intent, Perception, Prediction,
    PredictionError, Round, RoundId, Subject,
};

use crate::state::GmState;

/// Memory key holding a GM's persisted efficacies.
const KEY_EFFICACIES: &str = "efficacies";
/// Memory key holding a GM's persisted CoA indices.
const KEY_COA_INDICES: &str = "coa_indices";

/// The per-GM state machine.
pub struct GmEngine {
    state: GmState,
    bus: Arc<EventBus>,
    memory: Arc<dyn LongTermMemory>,
    rng: Box<dyn DrawUniform>,
    config: EngineConfig,
}

impl GmEngine {
    /// Creates an engine for a validated definition.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Definition`] when the definition fails
    /// validation; nothing is spawned for an invalid GM.
    pub fn new(
        def: Arc<GmDefinition>,
        super_gms: Vec<String>,
        sub_gms: Vec<String>,
        bus: Arc<EventBus>,
        memory: Arc<dyn LongTermMemory>,
        rng: Box<dyn DrawUniform>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        def.validate()?;
        Ok(Self {
            state: GmState::new(def, super_gms, sub_gms),
            bus,
            memory,
            rng,
            config,
        })
    }

    /// This GM's name.
    #[must_use]
    pub fn gm_name(&self) -> &str {
        &self.state.def.name
    }

    /// The owned state, for inspection.
    #[must_use]
    pub fn state(&self) -> &GmState {
        &self.state
    }

    /// The bus this engine publishes to.
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Begins the first round. Idempotent.
    pub fn start(&mut self) {
        if self.state.started {
            return;
        }
        self.state.started = true;
        info!(gm = %self.gm_name(), "gm started");
        self.init_round();
    }

    /// Whether the current round may complete without further events:
    /// every sub-GM has either reported in or is fully ignored.
    #[must_use]
    pub fn round_ready(&self) -> bool {
        let current = self.state.current();
        self.state
            .sub_gms
            .iter()
            .all(|sub| current.reported_in.contains(sub) || self.state.precision_weight(sub) == 0.0)
    }

    /// Handles one bus event. Returns `false` when the engine should
    /// stop (shutdown observed).
    pub fn handle(&mut self, event: &BusEvent) -> bool {
        match event {
            BusEvent::Prediction(prediction) => self.on_prediction(prediction),
            BusEvent::PredictionError(error) => self.on_prediction_error(error),
            BusEvent::RoundCompleted { gm, .. } => self.on_sub_round_completed(gm),
            BusEvent::RoundTimedOut { gm, round } => self.on_round_timed_out(gm, *round),
            BusEvent::Intended(_) => {}
            BusEvent::Shutdown => {
                info!(gm = %self.gm_name(), "shutdown received, persisting learning state");
                if let Err(error) = self.persist() {
                    tracing::error!(gm = %self.gm_name(), %error, "failed to persist learning state");
                }
                return false;
            }
        }
        true
    }

    // ── Running-phase handlers ───────────────────────────────────

    /// A prediction arrived: relevant iff it comes from a super-GM and
    /// names one of this GM's conjectures.
    fn on_prediction(&mut self, prediction: &Prediction) {
        let def = Arc::clone(&self.state.def);
        if prediction.source == def.name {
            return; // own publication echoed back
        }
        let known_conjecture = def.conjecture(&prediction.subject.conjecture).is_some();
        if !self.state.super_gms.contains(&prediction.source) || !known_conjecture {
            debug!(
                gm = %def.name,
                source = %prediction.source,
                subject = %prediction.subject,
                "prediction addressed to a different gm, ignoring"
            );
            return;
        }

        self.state.current_mut().received_predictions.push(prediction.clone());
        self.arm_timer();

        // Derive activations for the predicted conjecture, keeping
        // existing subjects.
        let fresh = match def.conjecture(&prediction.subject.conjecture) {
            Some(conjecture) => conjecture.activator.activations(&ActivationContext {
                conjecture: &conjecture.name,
                rounds: &self.state.rounds,
                prediction_about: Some(&prediction.subject.about),
            }),
            None => Vec::new(),
        };
        let mut candidates = self.state.activations.clone();
        for activation in fresh {
            if !candidates.iter().any(|a| a.subject == activation.subject) {
                candidates.push(activation);
            }
        }
        self.state.activations = self.rationalize(candidates);
        self.prune_excluded();
        self.generate_predictions();
    }

    /// A prediction error arrived: relevant iff it contradicts one of
    /// this GM's own predictions. The error supersedes the prediction;
    /// other errors for the subject stay and compete at completion.
    fn on_prediction_error(&mut self, error: &PredictionError) {
        if error.prediction.source != self.gm_name() {
            debug!(
                gm = %self.gm_name(),
                predicted_by = %error.prediction.source,
                "prediction error for another gm's prediction, ignoring"
            );
            return;
        }

        let subject = error.subject().clone();
        let current = self.state.current_mut();
        match current
            .perceptions
            .iter_mut()
            .find(|p| p.is_prediction() && *p.subject() == subject)
        {
            Some(slot) => *slot = Perception::Error(error.clone()),
            None => current.perceptions.push(Perception::Error(error.clone())),
        }
    }

    /// A sub-GM reported a completed round.
    fn on_sub_round_completed(&mut self, gm: &str) {
        if !self.state.sub_gms.iter().any(|sub| sub == gm) {
            return;
        }
        self.state.current_mut().reported_in.insert(gm.to_string());
        if self.round_ready() {
            self.complete_round();
        }
    }

    /// The round timer fired. Timeouts for completed rounds are detected
    /// by id mismatch and discarded; redelivery is idempotent.
    fn on_round_timed_out(&mut self, gm: &str, round: RoundId) {
        if gm != self.gm_name() {
            return;
        }
        if round != self.state.current().id {
            debug!(gm = %self.gm_name(), %round, "obsolete round timeout, discarding");
            return;
        }
        debug!(gm = %self.gm_name(), %round, "round timed out");
        self.complete_round();
    }

    // ── Initialization ───────────────────────────────────────────

    /// Phase A: carry over, re-activate, rationalize, prune, predict.
    fn init_round(&mut self) {
        let def = Arc::clone(&self.state.def);

        // Carry over perceptions (bounded by the carry-over limit) and
        // beliefs from the previous round.
        let carried_over = self.state.previous().map(|previous| {
            let carried: Vec<Perception> = previous
                .perceptions
                .iter()
                .filter(|p| p.carry_overs() < self.config.max_carry_overs)
                .cloned()
                .map(|mut p| {
                    p.bump_carry_overs();
                    p
                })
                .collect();
            (carried, previous.beliefs.clone())
        });
        if let Some((carried, beliefs)) = carried_over {
            let current = self.state.current_mut();
            for perception in carried {
                current.upsert_perception(perception);
            }
            current.beliefs = beliefs;
        }

        // Keep goal activations still wanting; hyper-priors candidate
        // every conjecture afresh.
        let unachieved: Vec<ConjectureActivation> = {
            let current = self.state.current();
            self.state
                .activations
                .iter()
                .filter(|a| a.is_goal() && !a.achieved_by(current.belief_values(&a.subject)))
                .cloned()
                .collect()
        };
        let mut candidates = unachieved;
        if def.hyper_prior {
            for conjecture in &def.conjectures {
                candidates.extend(conjecture.activator.activations(&ActivationContext {
                    conjecture: &conjecture.name,
                    rounds: &self.state.rounds,
                    prediction_about: None,
                }));
            }
        }

        self.state.activations = self.rationalize(candidates);
        self.prune_excluded();
        self.generate_predictions();
    }

    /// Shuffle, give goals priority, then greedily drop duplicates and
    /// contradicted candidates.
    fn rationalize(&mut self, mut candidates: Vec<ConjectureActivation>) -> Vec<ConjectureActivation> {
        let def = Arc::clone(&self.state.def);
        rng::shuffle(self.rng.as_mut(), &mut candidates);
        candidates.sort_by_key(|a| !a.is_goal());

        let mut kept: Vec<ConjectureActivation> = Vec::new();
        for candidate in candidates {
            if kept.iter().any(|k| k.subject == candidate.subject) {
                continue;
            }
            if kept
                .iter()
                .any(|k| def.mutually_exclusive(k.conjecture(), candidate.conjecture()))
            {
                continue;
            }
            kept.push(candidate);
        }
        kept
    }

    /// Drop perceptions and beliefs contradicted by a current activation.
    fn prune_excluded(&mut self) {
        let def = Arc::clone(&self.state.def);
        let activations = self.state.activations.clone();
        let excluded =
            |conjecture: &str| activations.iter().any(|a| def.mutually_exclusive(a.conjecture(), conjecture));

        let current = self.state.current_mut();
        current.perceptions.retain(|p| !excluded(&p.subject().conjecture));
        current.beliefs.retain(|b| !excluded(&b.subject.conjecture));
    }

    /// Run every predictor of every activation; publish what comes out.
    fn generate_predictions(&mut self) {
        let def = Arc::clone(&self.state.def);
        let mut produced: Vec<Prediction> = Vec::new();
        for activation in &self.state.activations {
            let Some(conjecture) = def.conjecture(activation.conjecture()) else {
                continue;
            };
            for predictor in &conjecture.predictors {
                if let Some(mut prediction) = predictor.predict(activation, &self.state.rounds) {
                    prediction.source = def.name.clone();
                    produced.push(prediction);
                }
            }
        }
        if produced.is_empty() {
            return;
        }

        self.arm_timer();
        for prediction in produced {
            debug!(gm = %def.name, subject = %prediction.subject, "publishing prediction");
            self.state
                .current_mut()
                .upsert_perception(Perception::Prediction(prediction.clone()));
            self.bus.publish(BusEvent::Prediction(prediction));
        }
    }

    /// Arms the round timer once per round.
    fn arm_timer(&mut self) {
        if self.state.timer_armed {
            return;
        }
        self.state.timer_armed = true;
        self.bus.notify_after(
            BusEvent::RoundTimedOut {
                gm: self.gm_name().to_string(),
                round: self.state.current().id,
            },
            self.state.def.max_round_duration,
        );
    }

    // ── Completion ───────────────────────────────────────────────

    /// Completes the current round (steps 1-10) and initializes the
    /// next. Runs atomically with respect to events.
    pub fn complete_round(&mut self) {
        let def = Arc::clone(&self.state.def);

        // 1. Precision weighting: confirmation bias toward the source
        //    whose error was smallest.
        let updates =
            attention::updated_precision_weights(&self.state.current().perceptions, &self.state.precision_weights);
        for (source, weight) in updates {
            debug!(gm = %def.name, source = %source, weight, "precision weight updated");
            self.state.precision_weights.insert(source, weight);
        }

        // 2. Drop least-trusted competing perceptions.
        let perceptions = std::mem::take(&mut self.state.current_mut().perceptions);
        self.state.current_mut().perceptions =
            attention::resolve_competition(perceptions, &self.state.precision_weights);

        // 3. Determine beliefs, replacing everything carried over.
        let mut beliefs = Vec::with_capacity(self.state.activations.len());
        for activation in &self.state.activations {
            let Some(conjecture) = def.conjecture(activation.conjecture()) else {
                continue;
            };
            let values = conjecture.valuator.values(activation, &self.state.rounds);
            beliefs.push(Belief {
                source: def.name.clone(),
                subject: activation.subject.clone(),
                goal: activation.goal.clone(),
                values,
            });
        }
        self.state.current_mut().beliefs = beliefs;

        // 4. Raise prediction errors against received predictions.
        self.raise_prediction_errors();

        // 5. Re-score efficacies against the fresh beliefs.
        for belief in self.state.current().beliefs.clone() {
            let sat = belief.satisfies_conjecture();
            if let Some(efficacies) = self.state.efficacies.get_mut(&belief.subject) {
                for eff in efficacies.iter_mut() {
                    efficacy::recompute_degree(eff, sat, &self.state.rounds);
                }
            }
        }

        // 6. Select a course of action per activation.
        for activation in self.state.activations.clone() {
            self.select_course(&activation);
        }

        // 7. Execute the chosen courses.
        self.execute_courses();

        // 8. Mark completed and report.
        let now = Instant::now();
        let (round_id, index) = {
            let current = self.state.current_mut();
            current.completed_on = Some(now);
            (current.id, current.index)
        };
        info!(gm = %def.name, round = %round_id, index, "round completed");
        self.bus.publish(BusEvent::RoundCompleted {
            gm: def.name.clone(),
            round: round_id,
        });

        // 9. Forget obsolete rounds. Newest-first order means the first
        //    obsolete round ends the scan.
        if let Some(cutoff) = now.checked_sub(self.config.forget_round_after) {
            if let Some(first_obsolete) = self
                .state
                .rounds
                .iter()
                .position(|r| r.completed_on.is_some_and(|t| t <= cutoff))
            {
                self.state.rounds.truncate(first_obsolete);
            }
        }

        // 10. Allocate the next round and re-enter initialization.
        self.state.rounds.insert(0, Round::new(index + 1));
        self.state.timer_armed = false;
        self.init_round();
    }

    /// Completion step 4: for every received prediction, compare against
    /// the matching belief and publish the deviation, if any. A missing
    /// or value-less belief is the maximum error.
    fn raise_prediction_errors(&mut self) {
        let name = self.gm_name().to_string();
        let received = self.state.current().received_predictions.clone();
        for prediction in received {
            let belief = self.state.current().belief(&prediction.subject).cloned();
            let (belief, size) = match belief {
                Some(belief) => {
                    let size = match &belief.values {
                        Some(values) => prediction.error_size(values),
                        None => 1.0,
                    };
                    (belief, size)
                }
                None => (
                    Belief::disbelief(name.clone(), prediction.subject.clone(), prediction.goal.clone()),
                    1.0,
                ),
            };
            if size > 0.0 {
                debug!(gm = %name, subject = %prediction.subject, size, "raising prediction error");
                self.bus.publish(BusEvent::PredictionError(PredictionError {
                    prediction,
                    belief,
                    size,
                    carry_overs: 0,
                }));
            }
        }
    }

    /// Completion step 6 for one activation.
    fn select_course(&mut self, activation: &ConjectureActivation) {
        let def = Arc::clone(&self.state.def);
        let Some(conjecture) = def.conjecture(activation.conjecture()) else {
            return;
        };
        if conjecture.intention_domain.is_empty() {
            return;
        }

        let (believed, achieved, sat) = {
            let current = self.state.current();
            let values = current.belief_values(&activation.subject);
            let believed = values.is_some();
            let achieved = activation.achieved_by(values);
            let sat = current
                .belief(&activation.subject)
                .map_or(false, Belief::satisfies_conjecture);
            (believed, achieved, sat)
        };
        if activation.is_goal() {
            if achieved {
                return; // already where we want to be
            }
        } else if !believed {
            return; // nothing to reinforce
        }

        let subject = activation.subject.clone();
        let tried: Vec<Efficacy> = self
            .state
            .efficacies_for(&subject)
            .iter()
            .filter(|e| e.when_already_satisfied == sat)
            .cloned()
            .collect();

        let index = self.state.coa_indices.get(&subject).copied().unwrap_or(0);
        let untried = efficacy::expand_course(index, &conjecture.intention_domain, |name| {
            def.intention(name).map_or(true, |i| i.repeatable)
        });
        let untried_is_new = !tried.iter().any(|e| e.intention_names == untried);

        let mut candidates: Vec<(Vec<String>, f64)> = tried
            .iter()
            .map(|e| (e.intention_names.clone(), e.degree))
            .collect();
        if untried_is_new {
            candidates.push((untried, efficacy::hypothetical_degree(&tried)));
        }

        let degrees: Vec<f64> = candidates.iter().map(|(_, degree)| *degree).collect();
        let picked = efficacy::pick_candidate(&degrees, self.rng.draw());
        let picked_names = candidates[picked].0.clone();

        if untried_is_new && picked == candidates.len() - 1 {
            self.state.coa_indices.insert(subject.clone(), index + 1);
            self.state
                .efficacies
                .entry(subject.clone())
                .or_default()
                .push(Efficacy::seed(subject, picked_names.clone(), sat));
        }

        self.state.current_mut().courses_of_action.push(CourseOfAction {
            activation: activation.clone(),
            intention_names: picked_names,
        });
    }

    /// Completion step 7: realize the chosen courses as intents.
    fn execute_courses(&mut self) {
        let def = Arc::clone(&self.state.def);
        let courses = self.state.current().courses_of_action.clone();
        for course in courses {
            let values = self.state.current().belief_values(&course.activation.subject).cloned();
            for name in &course.intention_names {
                let Some(intention) = def.intention(name) else {
                    continue;
                };
                let Some(actuation) = intention.valuator.actuation(values.as_ref()) else {
                    continue;
                };
                let intent = Intent::new(intention.intent_name.clone(), actuation.value, actuation.duration);
                if !intention.repeatable && self.remembers_intent(&intent) {
                    debug!(gm = %def.name, about = %intent.about, "suppressing repeated non-repeatable intent");
                    continue;
                }
                if intent.is_stale(self.config.intent_stale_after) {
                    warn!(gm = %def.name, about = %intent.about, "publishing stale intent");
                }
                self.bus.publish(BusEvent::Intended(intent.clone()));
                self.state.current_mut().intents.push(intent);
            }
        }
    }

    /// Whether an equal intent was already published in a remembered
    /// round.
    fn remembers_intent(&self, intent: &Intent) -> bool {
        self.state
            .rounds
            .iter()
            .any(|round| round.remembers_intent(&intent.about, &intent.value))
    }

    // ── Persistence ──────────────────────────────────────────────

    /// Writes the learning state to long-term memory under this GM's
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Memory`] when the store rejects a write.
    pub fn persist(&self) -> Result<(), EngineError> {
        let name = self.gm_name();
        let efficacies: Vec<&Efficacy> = self.state.efficacies.values().flatten().collect();
        let value = serde_json::to_value(&efficacies).map_err(|e| EngineError::MalformedLearning {
            gm: name.to_string(),
            detail: e.to_string(),
        })?;
        self.memory.store(name, KEY_EFFICACIES, value)?;

        let indices: Vec<(&Subject, u64)> = self.state.coa_indices.iter().map(|(s, i)| (s, *i)).collect();
        let value = serde_json::to_value(&indices).map_err(|e| EngineError::MalformedLearning {
            gm: name.to_string(),
            detail: e.to_string(),
        })?;
        self.memory.store(name, KEY_COA_INDICES, value)?;
        Ok(())
    }

    /// Recovers persisted learning state, if present. Returns whether
    /// anything was restored.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MalformedLearning`] when a stored value
    /// does not decode — corrupted memory is fatal.
    pub fn restore(&mut self) -> Result<bool, EngineError> {
        let name = self.gm_name().to_string();
        let mut efficacies = Vec::new();
        let mut indices = Vec::new();
        let mut restored = false;

        if let Some(value) = self.memory.recall(&name, KEY_EFFICACIES)? {
            efficacies = serde_json::from_value(value).map_err(|e| EngineError::MalformedLearning {
                gm: name.clone(),
                detail: e.to_string(),
            })?;
            restored = true;
        }
        if let Some(value) = self.memory.recall(&name, KEY_COA_INDICES)? {
            indices = serde_json::from_value(value).map_err(|e| EngineError::MalformedLearning {
                gm: name.clone(),
                detail: e.to_string(),
            })?;
            restored = true;
        }
        if restored {
            info!(gm = %name, efficacies = efficacies.len(), "restored learning state");
            self.state.restore_learning(efficacies, indices);
        }
        Ok(restored)
    }
}

impl std::fmt::Debug for GmEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmEngine")
            .field("gm", &self.gm_name())
            .field("rounds", &self.state.rounds.len())
            .field("started", &self.state.started)
            .finish_non_exhaustive()
    }
}
