//! End-to-end scenarios for the round engine, driven synchronously
//! against `GmEngine` with deterministic randomness.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use umwelt_engine::{EngineConfig, EventBus, GmEngine, ScriptedDraw, StdDraw};
use umwelt_event::{BusEvent, EventKind, Interest};
use umwelt_model::{
    Activator, Conjecture, GmDefinition, Intention, IntentionValuator, LongTermMemory, MemoryError,
    Predictor, Valuator,
};
use umwelt_types::{
    Belief, ConjectureActivation, Goal, Perception, Prediction, PredictionError, Subject,
    ValueDomain, Values,
};

#[derive(Default)]
struct MockStore {
    entries: RwLock<HashMap<(String, String), serde_json::Value>>,
}

impl LongTermMemory for MockStore {
    fn store(&self, namespace: &str, key: &str, value: serde_json::Value) -> Result<(), MemoryError> {
        self.entries
            .write()
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }

    fn recall(&self, namespace: &str, key: &str) -> Result<Option<serde_json::Value>, MemoryError> {
        Ok(self
            .entries
            .read()
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }
}

fn values(entries: &[(&str, serde_json::Value)]) -> Values {
    entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

fn drain(probe: &mut UnboundedReceiver<BusEvent>) -> Vec<BusEvent> {
    let mut events = Vec::new();
    while let Ok(event) = probe.try_recv() {
        events.push(event);
    }
    events
}

fn spawn_engine(
    def: GmDefinition,
    super_gms: Vec<String>,
    sub_gms: Vec<String>,
    rng: Box<dyn umwelt_engine::DrawUniform>,
) -> (GmEngine, UnboundedReceiver<BusEvent>) {
    let bus = Arc::new(EventBus::new());
    let probe = bus.subscribe(Interest::all());
    let engine = GmEngine::new(
        Arc::new(def),
        super_gms,
        sub_gms,
        bus,
        Arc::new(MockStore::default()),
        rng,
        EngineConfig::default(),
    )
    .expect("definition should validate");
    (engine, probe)
}

/// An error raised by a detector against one of `gm`'s predictions.
fn detector_error(detector: &str, gm: &str, subject: Subject, dist: f64, size: f64) -> PredictionError {
    let expected = BTreeMap::from([("dist".to_string(), ValueDomain::Range { min: 0.0, max: 5.0 })]);
    PredictionError {
        prediction: Prediction::new(gm, subject.clone(), expected),
        belief: Belief {
            source: detector.to_string(),
            subject,
            goal: None,
            values: Some(values(&[("dist", serde_json::json!(dist))])),
        },
        size,
        carry_overs: 0,
    }
}

// ── S1: hyper-prior single round ─────────────────────────────────────

fn happy_gm() -> GmDefinition {
    GmDefinition::new("mind", Duration::from_millis(500))
        .hyper_prior()
        .with_conjecture(
            Conjecture::new(
                "happy",
                Activator::new(|cx| {
                    if cx.prediction_about.is_none() {
                        vec![ConjectureActivation::opinion(Subject::new(cx.conjecture, "self"))]
                    } else {
                        Vec::new()
                    }
                }),
                Valuator::new(|_, _| Some(values(&[("is", serde_json::json!(true))]))),
            )
            .with_predictor(Predictor::new(|activation, _| {
                Some(Prediction::new(
                    "",
                    activation.subject.clone(),
                    BTreeMap::from([(
                        "is".to_string(),
                        ValueDomain::Exactly { value: serde_json::json!(true) },
                    )]),
                ))
            }))
            .with_intention_domain(["greet"]),
        )
        .with_intention("greet", Intention::new("greet", IntentionValuator::constant(serde_json::json!("hello"))))
}

#[tokio::test]
async fn s1_hyper_prior_completes_immediately() {
    let (mut engine, mut probe) = spawn_engine(happy_gm(), vec![], vec![], Box::new(StdDraw::seeded(1)));

    engine.start();
    assert!(engine.round_ready(), "no sub-GMs: vacuously ready");
    engine.complete_round();

    let completed = engine.state().previous().expect("round 0 should be completed");
    assert!(completed.is_completed());

    let belief = completed
        .belief(&Subject::new("happy", "self"))
        .expect("happy(self) should be believed");
    assert_eq!(
        belief.values.as_ref().and_then(|v| v.get("is")),
        Some(&serde_json::json!(true))
    );
    assert!(belief.satisfies_conjecture());

    assert_eq!(completed.intents.len(), 1);
    assert_eq!(completed.intents[0].about, "greet");
    assert_eq!(completed.intents[0].value, serde_json::json!("hello"));

    // Publication order: this round's prediction, its intent, its
    // completion, then the *next* round's prediction.
    let kinds: Vec<EventKind> = drain(&mut probe).iter().map(BusEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Prediction,
            EventKind::Intended,
            EventKind::RoundCompleted,
            EventKind::Prediction,
        ]
    );
}

// ── S2: prediction error supersedes prediction ───────────────────────

fn obstacle_gm(name: &str) -> GmDefinition {
    GmDefinition::new(name, Duration::from_millis(500))
        .hyper_prior()
        .with_conjecture(
            Conjecture::new(
                "obstacle",
                Activator::new(|cx| {
                    vec![ConjectureActivation::opinion(Subject::new(cx.conjecture, "front"))]
                }),
                Valuator::disbelieve(),
            )
            .with_predictor(Predictor::new(|activation, _| {
                Some(Prediction::new(
                    "",
                    activation.subject.clone(),
                    BTreeMap::from([("dist".to_string(), ValueDomain::Range { min: 0.0, max: 5.0 })]),
                ))
            })),
        )
}

#[tokio::test]
async fn s2_error_supersedes_prediction() {
    let (mut engine, _probe) = spawn_engine(
        obstacle_gm("nav"),
        vec![],
        vec!["ranger".into()],
        Box::new(StdDraw::seeded(1)),
    );
    engine.start();
    assert!(!engine.round_ready(), "ranger has not reported");

    let subject = Subject::new("obstacle", "front");
    assert!(
        engine.state().current().perceptions.iter().any(Perception::is_prediction),
        "init should have predicted"
    );

    let error = detector_error("ranger", "nav", subject.clone(), 20.0, 0.8);
    assert!(engine.handle(&BusEvent::PredictionError(error)));

    let round_id = engine.state().current().id;
    assert!(engine.handle(&BusEvent::RoundTimedOut { gm: "nav".into(), round: round_id }));

    let completed = engine.state().previous().expect("round should have timed out");
    assert_eq!(completed.perceptions.len(), 1, "one perception per subject");
    match &completed.perceptions[0] {
        Perception::Error(e) => {
            assert_eq!(e.source(), "ranger");
            assert_eq!(e.size, 0.8);
        }
        other => panic!("the error should supersede the prediction, got {other:?}"),
    }

    // Lone source: relative confidence 1.0, averaged with the prior 1.0.
    assert_eq!(engine.state().precision_weight("ranger"), 1.0);
}

#[tokio::test]
async fn obsolete_timeout_is_idempotent() {
    let (mut engine, _probe) = spawn_engine(
        obstacle_gm("nav"),
        vec![],
        vec!["ranger".into()],
        Box::new(StdDraw::seeded(1)),
    );
    engine.start();

    let old_round = engine.state().current().id;
    engine.handle(&BusEvent::RoundTimedOut { gm: "nav".into(), round: old_round });
    let current_after_first = engine.state().current().id;
    let rounds_after_first = engine.state().rounds.len();

    // The same timeout again refers to a completed round: discarded.
    engine.handle(&BusEvent::RoundTimedOut { gm: "nav".into(), round: old_round });
    assert_eq!(engine.state().current().id, current_after_first);
    assert_eq!(engine.state().rounds.len(), rounds_after_first);

    // Someone else's timeout is equally irrelevant.
    engine.handle(&BusEvent::RoundTimedOut { gm: "other".into(), round: current_after_first });
    assert_eq!(engine.state().current().id, current_after_first);
}

// ── S3: two competing sub-GMs ────────────────────────────────────────

#[tokio::test]
async fn s3_competing_sources_split_confidence() {
    let (mut engine, _probe) = spawn_engine(
        obstacle_gm("nav"),
        vec![],
        vec!["gm_a".into(), "gm_b".into()],
        Box::new(StdDraw::seeded(1)),
    );
    engine.start();

    let subject = Subject::new("obstacle", "front");
    engine.handle(&BusEvent::PredictionError(detector_error("gm_a", "nav", subject.clone(), 6.0, 0.2)));
    engine.handle(&BusEvent::PredictionError(detector_error("gm_b", "nav", subject.clone(), 20.0, 0.8)));

    let round = umwelt_types::RoundId::new();
    engine.handle(&BusEvent::RoundCompleted { gm: "gm_a".into(), round });
    assert!(engine.state().previous().is_none(), "gm_b has not reported yet");
    engine.handle(&BusEvent::RoundCompleted { gm: "gm_b".into(), round });

    // Raw confidences (0.8, 0.2) normalize to (0.8, 0.2); averaged with
    // the prior 1.0 → 0.9 and 0.6.
    assert!((engine.state().precision_weight("gm_a") - 0.9).abs() < 1e-9);
    assert!((engine.state().precision_weight("gm_b") - 0.6).abs() < 1e-9);

    // The higher-gain perception wins.
    let completed = engine.state().previous().expect("both sub-GMs reported");
    assert_eq!(completed.perceptions.len(), 1);
    assert_eq!(completed.perceptions[0].source(), "gm_a");

    // No two perceptions with the same subject survive completion.
    let mut subjects: Vec<&Subject> = completed.perceptions.iter().map(Perception::subject).collect();
    subjects.dedup();
    assert_eq!(subjects.len(), completed.perceptions.len());
}

// ── S4: efficacy-driven CoA selection ────────────────────────────────

/// A goal GM whose conjecture is satisfied exactly when the previous
/// round ran the course `[forward]`.
fn feeder_gm() -> GmDefinition {
    let fed = |values: &Values| values.get("fed") == Some(&serde_json::json!(true));
    GmDefinition::new("feeder", Duration::from_millis(500))
        .hyper_prior()
        .with_conjecture(
            Conjecture::new(
                "reach_food",
                Activator::new(move |cx| {
                    vec![ConjectureActivation::goal(
                        Subject::new(cx.conjecture, "bowl"),
                        Goal::new("fed", fed),
                    )]
                }),
                Valuator::new(|activation, rounds| {
                    let rewarded = rounds.get(1).is_some_and(|previous| {
                        previous
                            .courses_of_action
                            .iter()
                            .any(|c| c.activation.subject == activation.subject && c.intention_names == ["forward"])
                    });
                    Some(values(&[("fed", serde_json::json!(rewarded))]))
                }),
            )
            .with_intention_domain(["turn", "forward"]),
        )
        .with_intention("turn", Intention::new("turn", IntentionValuator::constant(serde_json::json!(1.0))))
        .with_intention("forward", Intention::new("forward", IntentionValuator::constant(serde_json::json!(1.0))))
}

#[test]
fn s4_rewarded_course_gains_efficacy() {
    // Draws alternate between CoA selection (even positions here) and
    // candidate shuffling during the next initialization. Selection
    // draws of 0.01 keep picking the tried `[turn]`; the final 0.9
    // draw crosses into the untried `[forward]`.
    let script = vec![0.5, 0.9, 0.01, 0.9, 0.01, 0.9, 0.01, 0.9, 0.01, 0.9, 0.01, 0.9, 0.9, 0.9];
    let (mut engine, _probe) = spawn_engine(feeder_gm(), vec![], vec![], Box::new(ScriptedDraw::new(script)));

    engine.start();
    for _ in 0..8 {
        assert!(engine.round_ready());
        engine.complete_round();
    }

    let reward_round = engine.state().previous().expect("eight rounds completed");
    let subject = Subject::new("reach_food", "bowl");
    assert!(
        reward_round.belief(&subject).expect("goal belief").satisfies_conjecture(),
        "the final round should observe the reward"
    );

    let efficacies = engine.state().efficacies_for(&subject);
    let degree_of = |names: &[&str]| {
        efficacies
            .iter()
            .find(|e| e.intention_names == names && !e.when_already_satisfied)
            .map(|e| e.degree)
            .expect("efficacy should exist")
    };

    let forward = degree_of(&["forward"]);
    let turn = degree_of(&["turn"]);
    // One recent rewarded run of [forward] vs six unrewarded runs of
    // [turn] over an eight-round history: 7/9 vs 7/18.
    assert!((forward - 7.0 / 9.0).abs() < 1e-9, "forward degree was {forward}");
    assert!((turn - 7.0 / 18.0).abs() < 1e-9, "turn degree was {turn}");

    // The rewarded course has clearly pulled ahead.
    assert!(forward - turn >= 0.3);
    assert!(forward / (forward + turn) > 0.5);
}

// ── S5: non-repeatable intention suppressed ──────────────────────────

fn greeter_gm() -> GmDefinition {
    let self_opinion = |cx: &umwelt_model::ActivationContext<'_>| {
        vec![ConjectureActivation::opinion(Subject::new(cx.conjecture, "self"))]
    };
    GmDefinition::new("greeter", Duration::from_millis(500))
        .hyper_prior()
        .with_conjecture(
            Conjecture::new("social", Activator::new(self_opinion), Valuator::new(|_, _| Some(Values::new())))
                .with_intention_domain(["say"]),
        )
        .with_conjecture(
            Conjecture::new("mobile", Activator::new(self_opinion), Valuator::new(|_, _| Some(Values::new())))
                .with_intention_domain(["move"]),
        )
        .with_intention(
            "say",
            Intention::new("say", IntentionValuator::constant(serde_json::json!("hello"))).once(),
        )
        .with_intention("move", Intention::new("move", IntentionValuator::constant(serde_json::json!(0.5))))
}

#[test]
fn s5_non_repeatable_intent_suppressed_on_repeat() {
    let (mut engine, mut probe) = spawn_engine(greeter_gm(), vec![], vec![], Box::new(StdDraw::seeded(1)));

    engine.start();
    engine.complete_round();
    engine.complete_round();

    let first = &engine.state().rounds[2];
    let second = &engine.state().rounds[1];

    let abouts = |round: &umwelt_types::Round| {
        let mut names: Vec<String> = round.intents.iter().map(|i| i.about.clone()).collect();
        names.sort();
        names
    };
    assert_eq!(abouts(first), vec!["move", "say"]);
    // Same course, same value: "say" is suppressed, "move" still flows.
    assert_eq!(abouts(second), vec!["move"]);

    let said: Vec<BusEvent> = drain(&mut probe)
        .into_iter()
        .filter(|e| matches!(e, BusEvent::Intended(intent) if intent.about == "say"))
        .collect();
    assert_eq!(said.len(), 1, "hello should be published exactly once");
}

// ── Upward error flow and activation-on-prediction ───────────────────

fn tracker_gm() -> GmDefinition {
    GmDefinition::new("tracker", Duration::from_millis(500)).with_conjecture(Conjecture::new(
        "obstacle",
        Activator::new(|cx| match cx.prediction_about {
            Some("front") => vec![ConjectureActivation::opinion(Subject::new(cx.conjecture, "front"))],
            _ => Vec::new(),
        }),
        Valuator::new(|activation, _| {
            (activation.subject.about == "front").then(|| values(&[("dist", serde_json::json!(20.0))]))
        }),
    ))
}

#[tokio::test]
async fn received_predictions_raise_errors_upward() {
    let (mut engine, mut probe) = spawn_engine(
        tracker_gm(),
        vec!["nav".into()],
        vec![],
        Box::new(StdDraw::seeded(1)),
    );
    engine.start();

    let expected = BTreeMap::from([("dist".to_string(), ValueDomain::Range { min: 0.0, max: 5.0 })]);
    // One prediction the tracker can value, one it cannot.
    engine.handle(&BusEvent::Prediction(Prediction::new(
        "nav",
        Subject::new("obstacle", "front"),
        expected.clone(),
    )));
    engine.handle(&BusEvent::Prediction(Prediction::new(
        "nav",
        Subject::new("obstacle", "rear"),
        expected,
    )));
    assert_eq!(engine.state().current().received_predictions.len(), 2);

    engine.complete_round();

    let errors: Vec<PredictionError> = drain(&mut probe)
        .into_iter()
        .filter_map(|e| match e {
            BusEvent::PredictionError(error) => Some(error),
            _ => None,
        })
        .collect();
    assert_eq!(errors.len(), 2);

    let front = errors.iter().find(|e| e.subject().about == "front").expect("front error");
    // dist 20 against [0, 5]: far out of range, maximal deviation.
    assert_eq!(front.size, 1.0);
    assert_eq!(front.source(), "tracker");
    assert!(front.belief.values.is_some());

    let rear = errors.iter().find(|e| e.subject().about == "rear").expect("rear error");
    assert_eq!(rear.size, 1.0);
    assert!(rear.belief.values.is_none(), "no belief where one was predicted");
}

#[tokio::test]
async fn foreign_predictions_are_ignored() {
    let (mut engine, _probe) = spawn_engine(
        tracker_gm(),
        vec!["nav".into()],
        vec![],
        Box::new(StdDraw::seeded(1)),
    );
    engine.start();

    // Unknown conjecture: not for this GM.
    engine.handle(&BusEvent::Prediction(Prediction::new(
        "nav",
        Subject::new("battery_low", "self"),
        BTreeMap::new(),
    )));
    // Known conjecture, but not from a super-GM.
    engine.handle(&BusEvent::Prediction(Prediction::new(
        "stranger",
        Subject::new("obstacle", "front"),
        BTreeMap::new(),
    )));

    assert!(engine.state().current().received_predictions.is_empty());
    assert!(engine.state().current().perceptions.is_empty());
}

// ── Carry-over bounds ────────────────────────────────────────────────

/// Predicts only in the very first round so the resulting error is
/// carried, not replaced.
fn one_shot_predictor_gm() -> GmDefinition {
    GmDefinition::new("nav", Duration::from_millis(500))
        .hyper_prior()
        .with_conjecture(
            Conjecture::new(
                "obstacle",
                Activator::new(|cx| {
                    vec![ConjectureActivation::opinion(Subject::new(cx.conjecture, "front"))]
                }),
                Valuator::disbelieve(),
            )
            .with_predictor(Predictor::new(|activation, rounds| {
                (rounds.len() == 1).then(|| {
                    Prediction::new(
                        "",
                        activation.subject.clone(),
                        BTreeMap::from([("dist".to_string(), ValueDomain::Any)]),
                    )
                })
            })),
        )
}

#[tokio::test]
async fn carried_perceptions_respect_the_limit() {
    let (mut engine, _probe) = spawn_engine(
        one_shot_predictor_gm(),
        vec![],
        vec!["ranger".into()],
        Box::new(StdDraw::seeded(1)),
    );
    engine.start();

    let subject = Subject::new("obstacle", "front");
    engine.handle(&BusEvent::PredictionError(detector_error("ranger", "nav", subject, 3.0, 0.4)));

    // carry_overs climbs 0 → 1 → 2 → 3, never beyond, then the
    // perception ages out.
    for expected in [1_u32, 2, 3] {
        engine.complete_round();
        let carried = &engine.state().current().perceptions;
        assert_eq!(carried.len(), 1);
        assert_eq!(carried[0].carry_overs(), expected);
        assert!(carried[0].carry_overs() <= 3);
    }

    engine.complete_round();
    assert!(engine.state().current().perceptions.is_empty());
}

// ── Persistence round-trip ───────────────────────────────────────────

#[test]
fn shutdown_persists_and_restores_learning() {
    let bus = Arc::new(EventBus::new());
    let store = Arc::new(MockStore::default());
    let make = |rng: Box<dyn umwelt_engine::DrawUniform>| {
        GmEngine::new(
            Arc::new(feeder_gm()),
            vec![],
            vec![],
            Arc::clone(&bus),
            Arc::clone(&store) as Arc<dyn LongTermMemory>,
            rng,
            EngineConfig::default(),
        )
        .expect("definition should validate")
    };

    let mut engine = make(Box::new(ScriptedDraw::new(vec![0.5])));
    engine.start();
    engine.complete_round();
    assert!(!engine.handle(&BusEvent::Shutdown), "shutdown stops the engine");

    let mut restarted = make(Box::new(ScriptedDraw::new(vec![0.5])));
    assert!(restarted.restore().expect("recall should succeed"));

    let subject = Subject::new("reach_food", "bowl");
    assert_eq!(restarted.state().efficacies_for(&subject).len(), 1);
    assert_eq!(restarted.state().coa_indices.get(&subject), Some(&1));
}
