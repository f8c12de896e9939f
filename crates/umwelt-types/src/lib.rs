//! Core data model for the umwelt predictive-processing runtime.
//!
//! This crate is the **SDK layer**: the types exchanged between Generative
//! Models (GMs), detectors, and actuators. It has no runtime machinery —
//! the event bus and the round engine live in `umwelt-engine`.
//!
//! # Architecture Overview
//!
//! A umwelt agent is a directed acyclic graph of GMs. Each GM continually
//! predicts the state of the world, compares predictions against
//! perceptions, propagates prediction errors upward, and emits intents
//! that tend to validate its conjectures:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     hyper-prior GM                       │
//! │        predictions ↓            ↑ prediction errors      │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐  │
//! │  │    sub-GM    │   │    sub-GM    │   │   detector   │  │
//! │  └──────────────┘   └──────────────┘   └──────────────┘  │
//! │        │ intents                                         │
//! │        ▼                                                 │
//! │   actuators (motor / LED / sound)                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Types
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`Subject`] | `(conjecture, about)` — what a perception refers to |
//! | [`Prediction`] | expected value sub-domains published by a GM |
//! | [`Belief`] | a GM's valuation of a conjecture activation |
//! | [`PredictionError`] | deviation between a prediction and a belief |
//! | [`Perception`] | prediction ∪ prediction error |
//! | [`Intent`] | a motor output headed for an actuator |
//! | [`CourseOfAction`] | an ordered intention sequence chosen for an activation |
//! | [`Efficacy`] | learned score of a CoA shape's past success |
//! | [`Round`] | one perceive-believe-act cycle, the unit of episodic memory |

mod action;
mod domain;
mod error;
mod goal;
mod intent;
mod perception;
mod round;
mod subject;

pub use action::{ConjectureActivation, CourseOfAction, Efficacy};
pub use domain::ValueDomain;
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use goal::Goal;
pub use intent::Intent;
pub use perception::{Belief, Perception, Prediction, PredictionError};
pub use round::{Round, RoundId};
pub use subject::{Subject, Values};
