//! End-to-end scenarios for the interview engine and the simulation harness.
//!
//! These tests go through the public API only:
//! 1. A YAML bot is parsed, planned and driven by a persona
//! 2. The consent sub-flow is exercised turn by turn on the machine
//! 3. Transition decisions are checked at topic boundaries
//! 4. Property tests drive the machine with arbitrary replies

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use interview_flow::adapters::PersonaResponder;
use interview_flow::application::{
    ConversationDriver, DriverSettings, QuestionGenerator, RunSimulationCommand, RunTicket,
    SimulationRunner,
};
use interview_flow::domain::evaluation::{FlowEvaluator, TurnCheck};
use interview_flow::domain::foundation::Language;
use interview_flow::domain::interview::{
    extract_anchor_roots, AssistantAction, BotConfig, CloseReason, InterviewMachine,
    InterviewPhase, PendingTransition, TemplateRenderer, TopicPlanner, TransitionMode,
    TransitionPolicy,
};
use interview_flow::domain::simulation::{CoverageTracker, Persona, RunStatus, SimRng};

// =============================================================================
// Test Infrastructure
// =============================================================================

const THREE_TOPIC_BOT: &str = r#"
bot_id: saas
name: SaaS feedback
language: en
planned_duration_minutes: 3
collect_data: false
topics:
  - id: pricing
    label: Pricing strategy
    order: 1
  - id: onboarding
    label: Onboarding experience
    order: 2
  - id: support
    label: Customer support
    order: 3
"#;

const CONSENT_BOT: &str = r#"
bot_id: consent
name: Consent check
language: en
planned_duration_minutes: 1
collect_data: true
required_fields: [email, phone]
topics:
  - id: pricing
    label: Pricing strategy
    order: 1
"#;

fn machine_for(yaml: &str) -> InterviewMachine {
    let bot = BotConfig::from_yaml_str(yaml).unwrap();
    InterviewMachine::for_bot(&bot, &TopicPlanner::new()).unwrap()
}

fn driver_for(yaml: &str) -> ConversationDriver {
    ConversationDriver::new(
        machine_for(yaml),
        Arc::new(QuestionGenerator::template(TemplateRenderer::new(Language::En))),
        Arc::new(PersonaResponder::new()),
        FlowEvaluator::new(Language::En),
        DriverSettings::default(),
    )
}

fn persona(name: &str) -> Persona {
    Persona::library().into_iter().find(|p| p.name == name).unwrap()
}

/// Emits the next action and, if it expects one, answers it.
fn exchange(m: &mut InterviewMachine, reply: &str, seconds: f64) -> AssistantAction {
    let action = m.next_action().unwrap();
    m.record_assistant_turn(&action).unwrap();
    if action.expects_reply() {
        m.apply_user_reply(reply, seconds).unwrap();
    }
    action
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn three_topics_in_three_minutes_get_one_scan_turn_each() {
    let machine = machine_for(THREE_TOPIC_BOT);
    assert_eq!(machine.plans().len(), 3);
    for plan in machine.plans() {
        assert_eq!(plan.seconds_budget, 60.0);
        assert_eq!(plan.max_turns_for(InterviewPhase::Scan), 1);
    }
}

#[tokio::test]
async fn terse_persona_exposes_unprobed_short_answers() {
    let terse = persona("terse");
    let outcome = driver_for(THREE_TOPIC_BOT)
        .run(
            RunTicket {
                run_index: 0,
                batch_seed: 11,
                persona: &terse,
            },
            SimRng::for_run(11, 0),
        )
        .await;

    assert_eq!(outcome.status, RunStatus::Completed);
    let first_reply = &outcome.transcript.turns()[1];
    assert!(!first_reply.is_assistant());
    assert!(first_reply.text.split_whitespace().count() <= 3);
    assert!(outcome
        .evaluation
        .turns
        .iter()
        .any(|t| t.phase == InterviewPhase::Scan && t.failed(TurnCheck::ProbesShortAnswer)));
    assert!(outcome
        .evaluation
        .top_issues
        .iter()
        .any(|i| i.issue == TurnCheck::ProbesShortAnswer.issue()));
}

#[test]
fn consent_refusal_closes_immediately() {
    let mut m = machine_for(CONSENT_BOT);

    exchange(&mut m, "We mostly price per seat and review it yearly", 70.0);
    assert_eq!(m.phase(), InterviewPhase::DeepOffer);
    exchange(&mut m, "No thanks, I have to go soon.", 5.0);
    assert_eq!(m.phase(), InterviewPhase::DataCollection);

    let consent = exchange(&mut m, "no", 3.0);
    assert!(matches!(consent, AssistantAction::AskConsent { .. }));
    assert_eq!(m.phase(), InterviewPhase::Done);
    assert!(m.state().data_collection_refused);

    assert_eq!(
        m.next_action(),
        Some(AssistantAction::Close {
            reason: CloseReason::ConsentRefused
        })
    );
    exchange(&mut m, "", 0.0);
    assert!(m.is_finished());
    assert_eq!(m.next_action(), None);
}

#[test]
fn consent_acceptance_collects_each_field_once() {
    let mut m = machine_for(CONSENT_BOT);
    exchange(&mut m, "We mostly price per seat and review it yearly", 70.0);
    exchange(&mut m, "No thanks, I have to go soon.", 5.0);
    exchange(&mut m, "Sure, that's fine.", 3.0);

    let email = exchange(&mut m, "you can write to ana@example.com", 3.0);
    assert!(matches!(email, AssistantAction::AskField { ref field, .. } if field == "email"));
    let phone = exchange(&mut m, "+39 333 123 4567", 3.0);
    assert!(matches!(phone, AssistantAction::AskField { ref field, .. } if field == "phone"));

    assert_eq!(m.phase(), InterviewPhase::Done);
    assert!(matches!(m.next_action(), Some(AssistantAction::Close { .. })));
}

#[test]
fn short_answer_without_anchor_pivots_cleanly() {
    let roots = extract_anchor_roots::<&str>("Customer support", &[], Language::En);
    let decision = TransitionPolicy::new().decide("fine thanks", &roots);
    assert_eq!(decision, PendingTransition::clean_pivot());
    assert_eq!(decision.snippet, None);
}

#[test]
fn short_answer_with_anchor_still_pivots() {
    let roots = extract_anchor_roots::<&str>("Customer support", &[], Language::En);
    let decision = TransitionPolicy::new().decide("support mostly", &roots);
    assert_eq!(decision.mode, TransitionMode::CleanPivot);
}

#[test]
fn long_answer_mentioning_next_topic_bridges() {
    let roots = extract_anchor_roots::<&str>("Customer support", &[], Language::En);
    let decision = TransitionPolicy::new().decide(
        "Pricing is fine but our support tickets pile up every week",
        &roots,
    );
    assert_eq!(decision.mode, TransitionMode::Bridge);
    let snippet = decision.snippet.unwrap();
    assert!(snippet.contains("support"));
    assert!(snippet.split_whitespace().count() <= 6);
}

#[tokio::test]
async fn batch_report_is_reproducible_for_a_seed() {
    let build = || {
        let driver = driver_for(THREE_TOPIC_BOT);
        SimulationRunner::new(Arc::new(driver), Persona::library())
    };
    let cmd = RunSimulationCommand {
        runs: 8,
        seed: 1234,
        concurrency: 3,
        ..RunSimulationCommand::default()
    };

    let first = build().run(cmd.clone()).await.unwrap();
    let second = build().run(cmd).await.unwrap();

    assert_eq!(first.summary, second.summary);
    assert_eq!(first.runs, second.runs);
    assert_ne!(first.batch_id, second.batch_id);
    assert!(first.render_table().contains("mean quality"));
}

// =============================================================================
// Properties
// =============================================================================

const REPLIES: &[&str] = &[
    "yes",
    "no",
    "Sure, happy to keep going.",
    "Sorry, what do you mean?",
    "I'd rather skip that one.",
    "ana@example.com",
    "+39 333 123 4567",
    "not sure",
    "We review our pricing every quarter because costs keep changing",
    "",
];

fn reply_strategy() -> impl Strategy<Value = Vec<(usize, u32)>> {
    prop::collection::vec((0..REPLIES.len(), 1u32..90), 1..120)
}

proptest! {
    #[test]
    fn machine_always_closes_and_never_reasks_collected_fields(script in reply_strategy()) {
        let mut m = machine_for(CONSENT_BOT);
        let mut script = script.into_iter().cycle();
        let mut steps = 0;

        while let Some(action) = m.next_action() {
            steps += 1;
            prop_assert!(steps < 200, "machine did not terminate");

            if let AssistantAction::AskField { field, .. } = &action {
                prop_assert!(!m.state().data_collection_refused);
                prop_assert!(m.state().profile_value(field).map_or(true, |v| !v.is_collected()));
            }
            m.record_assistant_turn(&action).unwrap();
            if action.expects_reply() {
                let (reply, secs) = script.next().unwrap();
                m.apply_user_reply(REPLIES[reply], f64::from(secs)).unwrap();
            }
        }
        prop_assert!(m.is_finished());
        prop_assert_eq!(m.phase(), InterviewPhase::Done);
    }

    #[test]
    fn coverage_before_collection_only_grows(script in reply_strategy()) {
        let mut m = machine_for(THREE_TOPIC_BOT);
        let mut tracker = CoverageTracker::new(m.plans().len());
        let mut seen: BTreeSet<usize> = BTreeSet::new();
        let mut script = script.into_iter().cycle();

        while let Some(action) = m.next_action() {
            let meta = m.describe(&action);
            if meta.phase.is_topic_phase() {
                tracker.touch(meta.topic_index);
            } else if matches!(meta.phase, InterviewPhase::DataCollection | InterviewPhase::Done) {
                tracker.start_collection();
            }
            prop_assert!(seen.is_subset(tracker.covered_before_collection()));
            seen = tracker.covered_before_collection().clone();

            m.record_assistant_turn(&action).unwrap();
            if action.expects_reply() {
                let (reply, secs) = script.next().unwrap();
                m.apply_user_reply(REPLIES[reply], f64::from(secs)).unwrap();
            }
        }
        prop_assert_eq!(tracker.before_collection_fraction(), 1.0);
    }
}
