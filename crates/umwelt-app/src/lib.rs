//! Bootstrap for umwelt agents.
//!
//! An [`AgentProfile`] pairs authored GM definitions with the cognition
//! graph; [`AgentRuntime`] validates it, recovers each GM's persisted
//! learning state, and spawns one runner task per GM over a shared
//! [`EventBus`](umwelt_engine::EventBus). Detectors and actuators attach
//! to the same bus from outside.
//!
//! ```no_run
//! use std::time::Duration;
//! use umwelt_app::{AgentProfile, AgentRuntime, InMemoryStore};
//! use umwelt_model::{CognitionGraph, GmDefinition};
//!
//! # async fn demo() -> Result<(), umwelt_app::AppError> {
//! let profile = AgentProfile::new(CognitionGraph::new().with_edge("mind", "ranger"))
//!     .with_gm(GmDefinition::new("mind", Duration::from_millis(250)).hyper_prior());
//!
//! let runtime = AgentRuntime::builder(profile)
//!     .with_memory(std::sync::Arc::new(InMemoryStore::new()))
//!     .spawn()?;
//!
//! // ... detectors publish, actuators subscribe ...
//! runtime.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod error;
mod profile;
mod runtime;
mod store;

pub use error::AppError;
pub use profile::AgentProfile;
pub use runtime::{AgentRuntime, AgentRuntimeBuilder};
pub use store::InMemoryStore;
