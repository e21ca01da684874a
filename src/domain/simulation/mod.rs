//! Simulation domain module.
//!
//! Synthetic respondents, deterministic randomness, the timing model, and
//! the per-run policy audit and batch report built on top of them.

mod audit;
mod outcome;
mod persona;
mod report;
mod rng;
mod timing;

pub use audit::{AuditReport, Coverage, CoverageTracker, PolicyAuditor, PolicyViolation};
pub use outcome::{RunOutcome, RunRecord, RunStatus};
pub use persona::{AnswerContext, AnswerStyle, Persona, PersonaSelection};
pub use report::{ReportSummary, RunRow, SimulationReport};
pub use rng::{derive_run_seed, SimRng};
pub use timing::{TimingModel, MIN_EXCHANGE_SECONDS};
