//! Generative-model definitions for umwelt agents.
//!
//! A [`GmDefinition`] is the static, per-profile description of one GM:
//! its conjectures with their activator/predictor/valuator functions, its
//! intentions, the contradiction sets between conjectures, priors, the
//! round duration, and the hyper-prior flag. Definitions are authored in
//! Rust (the cognitive functions are first-class closures) and validated
//! up front — a definition that references an undefined conjecture or
//! intention is fatal, never a runtime surprise.
//!
//! # Trait-free by design
//!
//! The round engine consumes definitions as plain records of function
//! values rather than a trait per conjecture. This keeps a GM definition
//! declarative: a profile is data plus closures, and the engine stays the
//! only owner of behavior.
//!
//! # Related crates
//!
//! - `umwelt-types` — the data model the functions operate on
//! - `umwelt-engine` — the round engine driving these definitions

mod conjecture;
mod definition;
mod error;
mod graph;
mod intention;
mod memory;

pub use conjecture::{ActivationContext, Activator, Conjecture, Predictor, Valuator};
pub use definition::GmDefinition;
pub use error::DefinitionError;
pub use graph::CognitionGraph;
pub use intention::{Actuation, Intention, IntentionValuator};
pub use memory::{LongTermMemory, MemoryError};
