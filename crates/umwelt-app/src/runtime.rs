//! Agent runtime: spawn the GM graph, tear it down.

use crate::{AgentProfile, AppError, InMemoryStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};
use umwelt_engine::{DrawUniform, EngineConfig, EventBus, GmEngine, GmRunner, StdDraw};
use umwelt_model::LongTermMemory;

/// Builder for [`AgentRuntime`].
///
/// Mirrors the spawn knobs: the long-term memory capability, the engine
/// configuration, and an optional seed for reproducible runs.
pub struct AgentRuntimeBuilder {
    profile: AgentProfile,
    memory: Arc<dyn LongTermMemory>,
    config: EngineConfig,
    seed: Option<u64>,
}

impl AgentRuntimeBuilder {
    fn new(profile: AgentProfile) -> Self {
        Self {
            profile,
            memory: Arc::new(InMemoryStore::new()),
            config: EngineConfig::default(),
            seed: None,
        }
    }

    /// Injects the long-term memory capability.
    #[must_use]
    pub fn with_memory(mut self, memory: Arc<dyn LongTermMemory>) -> Self {
        self.memory = memory;
        self
    }

    /// Overrides the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seeds every GM's randomness for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the profile and spawns one runner task per GM.
    ///
    /// Each GM first recovers its persisted learning state (the restart
    /// path: efficacies and CoA indices survive, rounds start fresh).
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails on an invalid profile, or when recovery finds corrupted
    /// memory — nothing is spawned in that case.
    pub fn spawn(self) -> Result<AgentRuntime, AppError> {
        self.profile.validate()?;

        let bus = Arc::new(EventBus::new());
        let mut engines = Vec::with_capacity(self.profile.gms.len());
        for (position, def) in self.profile.gms.into_iter().enumerate() {
            let name = def.name.clone();
            let super_gms = self.profile.graph.parents_of(&name);
            let sub_gms = self.profile.graph.children_of(&name).to_vec();
            let rng: Box<dyn DrawUniform> = match self.seed {
                Some(seed) => Box::new(StdDraw::seeded(seed.wrapping_add(position as u64))),
                None => Box::new(StdDraw::from_entropy()),
            };

            let mut engine = GmEngine::new(
                Arc::new(def),
                super_gms.clone(),
                sub_gms.clone(),
                Arc::clone(&bus),
                Arc::clone(&self.memory),
                rng,
                self.config,
            )?;
            engine.restore()?;

            info!(gm = %name, supers = ?super_gms, subs = ?sub_gms, "gm prepared");
            engines.push((name, engine));
        }

        // Subscribe-then-spawn: every runner subscribed before any runs,
        // so no GM misses another's first publications.
        let handles = engines
            .into_iter()
            .map(|(name, engine)| {
                let runner = GmRunner::new(engine);
                (name, tokio::spawn(runner.run()))
            })
            .collect();

        Ok(AgentRuntime { bus, handles })
    }
}

/// A running agent: one tokio task per GM, sharing one bus.
pub struct AgentRuntime {
    bus: Arc<EventBus>,
    handles: Vec<(String, JoinHandle<()>)>,
}

impl AgentRuntime {
    /// Starts building a runtime for the profile.
    #[must_use]
    pub fn builder(profile: AgentProfile) -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new(profile)
    }

    /// The shared bus, for detectors, actuators, and observers.
    #[must_use]
    pub fn bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    /// Number of spawned GMs.
    #[must_use]
    pub fn gm_count(&self) -> usize {
        self.handles.len()
    }

    /// Broadcasts shutdown and waits for every GM to persist and stop.
    pub async fn shutdown(self) {
        info!("shutting down agent runtime");
        self.bus.shutdown();
        for (name, handle) in self.handles {
            if let Err(join_error) = handle.await {
                error!(gm = %name, %join_error, "gm runner did not stop cleanly");
            }
        }
    }
}
