//! SimulationRunner - command handler for a batch of simulated interviews.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::evaluation::DEFAULT_TOP_ISSUES;
use crate::domain::foundation::BatchId;
use crate::domain::simulation::{Persona, PersonaSelection, RunOutcome, SimRng, SimulationReport};

use super::drive_conversation::{ConversationDriver, RunTicket};

/// Command to simulate a batch of conversations.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSimulationCommand {
    pub runs: usize,
    pub seed: u64,
    /// Runs in flight at once.
    pub concurrency: usize,
    pub persona_selection: PersonaSelection,
    /// Best and worst runs kept in the report.
    pub sample_count: usize,
}

impl Default for RunSimulationCommand {
    fn default() -> Self {
        Self {
            runs: 20,
            seed: 42,
            concurrency: 4,
            persona_selection: PersonaSelection::RoundRobin,
            sample_count: 3,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("no personas configured")]
    NoPersonas,

    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Handler that fans runs out over a bounded number of concurrent futures.
pub struct SimulationRunner {
    driver: Arc<ConversationDriver>,
    personas: Arc<Vec<Persona>>,
}

impl SimulationRunner {
    pub fn new(driver: Arc<ConversationDriver>, personas: Vec<Persona>) -> Self {
        Self {
            driver,
            personas: Arc::new(personas),
        }
    }

    pub async fn run(&self, cmd: RunSimulationCommand) -> Result<SimulationReport, SimulationError> {
        if self.personas.is_empty() {
            return Err(SimulationError::NoPersonas);
        }
        if cmd.concurrency == 0 {
            return Err(SimulationError::InvalidCommand(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let batch_id = BatchId::new();
        tracing::info!(%batch_id, runs = cmd.runs, seed = cmd.seed, concurrency = cmd.concurrency, "starting simulation batch");

        let mut outcomes: Vec<RunOutcome> = stream::iter(0..cmd.runs)
            .map(|run_index| {
                let driver = Arc::clone(&self.driver);
                let personas = Arc::clone(&self.personas);
                let (seed, selection) = (cmd.seed, cmd.persona_selection);
                async move {
                    let mut rng = SimRng::for_run(seed, run_index as u64);
                    let persona = Persona::select(&personas, selection, run_index, &mut rng)
                        .cloned()
                        .unwrap_or_else(|| personas[0].clone());
                    let ticket = RunTicket {
                        run_index,
                        batch_seed: seed,
                        persona: &persona,
                    };
                    driver.run(ticket, rng).await
                }
            })
            .buffer_unordered(cmd.concurrency)
            .collect()
            .await;
        outcomes.sort_by_key(|o| o.run_index);

        let report = SimulationReport::build(batch_id, cmd.seed, &outcomes, cmd.sample_count, DEFAULT_TOP_ISSUES);
        tracing::info!(
            %batch_id,
            passed = report.summary.passed,
            runs = report.summary.runs,
            mean_quality = report.summary.mean_quality,
            "simulation batch finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::responders::PersonaResponder;
    use crate::application::handlers::simulation::{DriverSettings, QuestionGenerator};
    use crate::domain::evaluation::FlowEvaluator;
    use crate::domain::foundation::Language;
    use crate::domain::interview::{BotConfig, InterviewMachine, TemplateRenderer, TopicPlanner};

    fn runner(personas: Vec<Persona>) -> SimulationRunner {
        let machine = InterviewMachine::for_bot(&BotConfig::demo(), &TopicPlanner::new()).unwrap();
        let driver = ConversationDriver::new(
            machine,
            Arc::new(QuestionGenerator::template(TemplateRenderer::new(Language::En))),
            Arc::new(PersonaResponder::new()),
            FlowEvaluator::new(Language::En),
            DriverSettings::default(),
        );
        SimulationRunner::new(Arc::new(driver), personas)
    }

    fn cmd(runs: usize, concurrency: usize) -> RunSimulationCommand {
        RunSimulationCommand {
            runs,
            concurrency,
            ..RunSimulationCommand::default()
        }
    }

    #[tokio::test]
    async fn runs_every_index_in_order() {
        let report = runner(Persona::library()).run(cmd(9, 3)).await.unwrap();
        let indices: Vec<usize> = report.runs.iter().map(|r| r.run_index).collect();
        assert_eq!(indices, (0..9).collect::<Vec<_>>());
        assert_eq!(report.summary.runs, 9);
    }

    #[tokio::test]
    async fn round_robin_assigns_personas_in_turn() {
        let library = Persona::library();
        let report = runner(library.clone()).run(cmd(library.len(), 2)).await.unwrap();
        for (row, persona) in report.runs.iter().zip(&library) {
            assert_eq!(row.persona, persona.name);
        }
    }

    #[tokio::test]
    async fn results_do_not_depend_on_concurrency() {
        let sequential = runner(Persona::library()).run(cmd(6, 1)).await.unwrap();
        let parallel = runner(Persona::library()).run(cmd(6, 6)).await.unwrap();
        assert_eq!(sequential.runs, parallel.runs);
        assert_eq!(sequential.summary, parallel.summary);
    }

    #[tokio::test]
    async fn rejects_empty_persona_list_and_zero_concurrency() {
        assert_eq!(
            runner(vec![]).run(cmd(1, 1)).await.unwrap_err(),
            SimulationError::NoPersonas
        );
        assert!(matches!(
            runner(Persona::library()).run(cmd(1, 0)).await,
            Err(SimulationError::InvalidCommand(_))
        ));
    }
}
