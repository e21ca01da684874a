//! Domain layer containing the interview logic and its evaluation.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, language tables, state machine trait, errors)
//! - `interview` - Topic planning, the phase state machine, consent and field collection
//! - `evaluation` - Per-turn and whole-transcript quality scoring
//! - `simulation` - Personas, seeded randomness, timing, policy audit and reports

pub mod evaluation;
pub mod foundation;
pub mod interview;
pub mod simulation;
