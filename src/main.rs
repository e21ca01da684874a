//! Runs one simulation batch as configured by the environment.

use secrecy::ExposeSecret;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use interview_flow::adapters::{ModelResponder, OpenAIConfig, OpenAIProvider, PersonaResponder};
use interview_flow::application::{
    ConversationDriver, GenerationMode, GenerationSettings, QuestionGenerator, SimulationError,
    SimulationRunner,
};
use interview_flow::config::{AppConfig, ConfigError, ResponderMode};
use interview_flow::domain::evaluation::FlowEvaluator;
use interview_flow::domain::interview::{
    BotConfig, BotConfigError, InterviewError, InterviewMachine, TemplateRenderer, TopicPlanner,
};
use interview_flow::domain::simulation::Persona;
use interview_flow::ports::{AIError, AIProvider, Responder};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("bot configuration: {0}")]
    Bot(#[from] BotConfigError),

    #[error(transparent)]
    Interview(#[from] InterviewError),

    #[error("AI provider: {0}")]
    Provider(#[from] AIError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("report serialization: {0}")]
    Report(#[from] serde_json::Error),

    #[error("writing report: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&AppConfig::default());
            error!(error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "simulation aborted");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<AppConfig, ConfigError> {
    let config = AppConfig::load()?;
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &AppConfig) {
    let builder = tracing_subscriber::fmt().with_env_filter(config.logging.env_filter());
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    let sim = &config.simulation;
    let bot = match &sim.bot_config_path {
        Some(path) => BotConfig::load(path)?,
        None => BotConfig::demo(),
    };
    let machine = InterviewMachine::for_bot(&bot, &TopicPlanner::new())?;
    let language = machine.language();
    info!(
        bot = %bot.name,
        topics = machine.plans().len(),
        planned_seconds = machine.planned_seconds(),
        "bot loaded"
    );

    let provider = if sim.requires_ai() {
        Some(build_provider(&config)?)
    } else {
        None
    };

    let renderer = TemplateRenderer::new(language);
    let generator = match (sim.generation_mode, &provider) {
        (GenerationMode::Model, Some(provider)) => QuestionGenerator::model(
            renderer,
            Arc::clone(provider),
            GenerationSettings {
                temperature: config.ai.temperature,
                timeout: config.ai.timeout(),
                ..GenerationSettings::default()
            },
        ),
        _ => QuestionGenerator::template(renderer),
    };
    let responder: Arc<dyn Responder> = match (sim.responder_mode, &provider) {
        (ResponderMode::Model, Some(provider)) => Arc::new(
            ModelResponder::new(Arc::clone(provider))
                .with_temperature(config.ai.responder_temperature)
                .with_timeout(config.ai.timeout()),
        ),
        _ => Arc::new(PersonaResponder::new()),
    };

    let driver = ConversationDriver::new(
        machine,
        Arc::new(generator),
        responder,
        FlowEvaluator::new(language).with_pass_score(sim.quality_pass_score),
        sim.driver_settings(),
    );
    let runner = SimulationRunner::new(Arc::new(driver), Persona::library());
    let report = runner.run(sim.command()).await?;

    println!("{}", report.render_table());
    if let Some(path) = &sim.report_path {
        std::fs::write(path, report.to_json()?)?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

fn build_provider(config: &AppConfig) -> Result<Arc<dyn AIProvider>, StartupError> {
    let key = config
        .ai
        .openai_api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
        .unwrap_or_default();
    let provider = OpenAIProvider::new(
        OpenAIConfig::new(key)
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout())
            .with_max_retries(config.ai.max_retries),
    )?;
    Ok(Arc::new(provider))
}
