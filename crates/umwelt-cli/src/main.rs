//! umwelt - demo rover agent
//!
//! Runs a small cognition graph: a hyper-prior navigation GM that keeps
//! conjecturing a clear path ahead, a simulated range detector that
//! contradicts it when an obstacle drifts into view, and a console
//! actuator realizing the intents the GM selects.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: tracing filter (overridden by `--debug`)
//! - `UMWELT_MAX_CARRY_OVERS`: perception carry-over limit
//! - `UMWELT_FORGET_ROUND_AFTER_SECS`: round retention horizon
//! - `UMWELT_INTENT_STALE_AFTER_MS`: staleness threshold for intents

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use umwelt_app::{AgentProfile, AgentRuntime, InMemoryStore};
use umwelt_engine::{EngineConfig, EventBus};
use umwelt_event::{BusEvent, EventKind, Interest};
use umwelt_model::{
    Activator, CognitionGraph, Conjecture, GmDefinition, Intention, IntentionValuator, Predictor,
    Valuator,
};
use umwelt_types::{
    Belief, ConjectureActivation, Goal, Perception, Prediction, PredictionError, Subject,
    ValueDomain,
};

/// Demo rover agent on the umwelt cognitive runtime.
#[derive(Parser, Debug)]
#[command(name = "umwelt")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Seed the GMs' randomness for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// How long to run before shutting down, in seconds
    #[arg(long, default_value_t = 5)]
    run_for: u64,

    /// Round duration for the navigation GM, in milliseconds
    #[arg(long, default_value_t = 250)]
    round_ms: u64,
}

const CLEAR_DISTANCE: f64 = 2.0;

/// The navigation GM: conjectures a clear path ahead and acts to keep
/// it believed.
fn nav_gm(round_ms: u64) -> GmDefinition {
    let subject = || Subject::new("clear_path", "front");

    GmDefinition::new("nav", Duration::from_millis(round_ms))
        .hyper_prior()
        .with_conjecture(
            Conjecture::new(
                "clear_path",
                Activator::new(move |_| {
                    vec![ConjectureActivation::goal(
                        subject(),
                        Goal::new("path is clear", |values| {
                            values
                                .get("dist")
                                .and_then(serde_json::Value::as_f64)
                                .is_some_and(|dist| dist >= CLEAR_DISTANCE)
                        }),
                    )]
                }),
                // Believe whatever the detector's last contradiction
                // measured; no contradiction means no fresh evidence.
                Valuator::new(|activation, rounds| {
                    rounds.first().and_then(|round| {
                        round.perceptions.iter().find_map(|p| match p {
                            Perception::Error(e) if e.subject() == &activation.subject => {
                                e.belief.values.clone()
                            }
                            _ => None,
                        })
                    })
                }),
            )
            .with_predictor(Predictor::new(|activation, _| {
                Some(Prediction::new(
                    "",
                    activation.subject.clone(),
                    BTreeMap::from([(
                        "dist".to_string(),
                        ValueDomain::Range { min: CLEAR_DISTANCE, max: 50.0 },
                    )]),
                ))
            }))
            .with_intention_domain(["forward", "turn"]),
        )
        .with_intention(
            "forward",
            Intention::new(
                "forward",
                IntentionValuator::new(|values| {
                    let dist = values?.get("dist")?.as_f64()?;
                    (dist >= CLEAR_DISTANCE).then(|| {
                        umwelt_model::Actuation::new(serde_json::json!(0.4))
                            .lasting(Duration::from_millis(200))
                    })
                }),
            ),
        )
        .with_intention(
            "turn",
            Intention::new("turn", IntentionValuator::constant(serde_json::json!(30))),
        )
}

/// A simulated range detector: answers every `clear_path` prediction
/// with a measured distance that random-walks toward and away from the
/// rover.
fn spawn_detector(bus: Arc<EventBus>, seed: u64) -> tokio::task::JoinHandle<()> {
    let mut events = bus.subscribe(Interest::in_kinds(&[EventKind::Prediction]));
    tokio::spawn(async move {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut distance: f64 = 6.0;
        while let Some(event) = events.recv().await {
            let prediction = match event {
                BusEvent::Prediction(p) if p.subject.conjecture == "clear_path" => p,
                BusEvent::Shutdown => break,
                _ => continue,
            };

            distance = (distance + rng.gen_range(-1.5..1.0)).clamp(0.2, 12.0);
            let values = BTreeMap::from([("dist".to_string(), serde_json::json!(distance))]);
            let size = prediction.error_size(&values);
            if size == 0.0 {
                continue; // measurement agrees, nothing to report
            }

            info!(distance, size, "detector contradicts the clear-path prediction");
            let subject = prediction.subject.clone();
            bus.publish(BusEvent::PredictionError(PredictionError {
                prediction,
                belief: Belief {
                    source: "ranger".into(),
                    subject,
                    goal: None,
                    values: Some(values),
                },
                size,
                carry_overs: 0,
            }));
        }
    })
}

/// A console actuator: realizes intents by logging them, warning when
/// one arrives stale.
fn spawn_actuator(bus: &Arc<EventBus>, stale_after: Duration) -> tokio::task::JoinHandle<()> {
    let mut events = bus.subscribe(Interest::actuator());
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                BusEvent::Intended(intent) => {
                    if intent.is_stale(stale_after) {
                        warn!(about = %intent.about, age_ms = intent.age().as_millis() as u64, "realizing stale intent");
                    }
                    info!(about = %intent.about, value = %intent.value, "actuating");
                }
                BusEvent::Shutdown => break,
                _ => {}
            }
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt().with_env_filter(filter).init();

    let config = EngineConfig::from_env();
    let profile = AgentProfile::new(CognitionGraph::new().with_edge("nav", "ranger"))
        .with_gm(nav_gm(args.round_ms));

    let mut builder = AgentRuntime::builder(profile)
        .with_memory(Arc::new(InMemoryStore::new()))
        .with_config(config);
    if let Some(seed) = args.seed {
        builder = builder.with_seed(seed);
    }
    let runtime = builder.spawn()?;
    info!(gms = runtime.gm_count(), run_for = args.run_for, "rover agent up");

    let detector = spawn_detector(runtime.bus(), args.seed.unwrap_or(0xB0B));
    let actuator = spawn_actuator(&runtime.bus(), config.intent_stale_after);

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(args.run_for)) => {
            info!("run window elapsed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
    }

    runtime.shutdown().await;
    let _ = tokio::join!(detector, actuator);
    info!("rover agent down");
    Ok(())
}
