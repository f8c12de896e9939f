//! The umwelt runtime: event bus and GM round engine.
//!
//! This crate turns the static definitions of `umwelt-model` into running
//! agents. Each GM is an independent actor ([`GmRunner`]) owning a
//! [`GmEngine`] — the per-round state machine that predicts, perceives,
//! believes, raises prediction errors, and selects courses of action
//! whose intents tend to validate its conjectures.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          EventBus                            │
//! │     ordered fan-out · Interest filtering · notify_after      │
//! └──────────────────────────────────────────────────────────────┘
//!      ▲│              ▲│               ▲│              ▲
//!      │▼              │▼               │▼              │
//! ┌─────────┐     ┌─────────┐      ┌─────────┐    ┌──────────┐
//! │ GmRunner│     │ GmRunner│      │ GmRunner│    │ detector │
//! │ GmEngine│     │ GmEngine│      │ GmEngine│    │ (leaf)   │
//! └─────────┘     └─────────┘      └─────────┘    └──────────┘
//! ```
//!
//! # Concurrency Model
//!
//! - One tokio task per GM; the engine inside is purely synchronous.
//! - No GM reads or writes another GM's state; the bus is the only
//!   shared surface.
//! - Within a GM, handlers run to completion; suspension points exist
//!   only between events.
//! - The round timer is a self-addressed [`notify_after`]
//!   event; a timeout for an already-completed round is discarded by
//!   round-id comparison.
//!
//! [`notify_after`]: EventBus::notify_after
//!
//! # Crate Structure
//!
//! - [`EventBus`] - ordered broadcast with timer-delayed publish
//! - [`GmEngine`] - the round state machine (the heart of the core)
//! - [`GmRunner`] - actor wrapper, one tokio task per GM
//! - [`EngineConfig`] - tunables (`UMWELT_*` environment overrides)
//! - [`attention`] - precision weighting and perception competition
//! - [`efficacy`] - CoA scoring, positional enumeration, selection
//! - [`DrawUniform`] - injectable randomness for deterministic tests

pub mod attention;
pub mod efficacy;

mod bus;
mod config;
mod engine;
mod error;
mod rng;
mod runner;
mod state;

pub use bus::EventBus;
pub use config::{
    EngineConfig, ENV_FORGET_ROUND_AFTER_SECS, ENV_INTENT_STALE_AFTER_MS, ENV_MAX_CARRY_OVERS,
};
pub use engine::GmEngine;
pub use error::EngineError;
pub use rng::{shuffle, DrawUniform, ScriptedDraw, StdDraw};
pub use runner::GmRunner;
pub use state::GmState;
