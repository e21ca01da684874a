//! Aggregate report over a batch of simulated runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use crate::domain::evaluation::IssueCount;
use crate::domain::foundation::BatchId;

use super::outcome::RunOutcome;

/// Batch-wide statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub runs: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub mean_quality: f64,
    pub mean_utilization: f64,
    /// Mean fraction of topics touched before data collection.
    pub mean_coverage: f64,
    pub completed: usize,
    pub incomplete: usize,
    pub failed: usize,
    pub violation_histogram: BTreeMap<String, usize>,
    pub top_issues: Vec<IssueCount>,
}

/// One line per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRow {
    pub run_index: usize,
    pub persona: String,
    pub status: String,
    pub score: f64,
    pub utilization: f64,
    pub coverage: f64,
    pub violations: usize,
    pub passed: bool,
}

impl From<&RunOutcome> for RunRow {
    fn from(run: &RunOutcome) -> Self {
        Self {
            run_index: run.run_index,
            persona: run.persona.clone(),
            status: run.status.label().to_string(),
            score: run.score(),
            utilization: run.utilization,
            coverage: run.coverage.before_collection,
            violations: run.violations.len(),
            passed: run.passed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub batch_id: BatchId,
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub summary: ReportSummary,
    /// Highest-scoring runs, with full transcripts.
    pub best: Vec<RunOutcome>,
    /// Lowest-scoring runs, with full transcripts.
    pub worst: Vec<RunOutcome>,
    pub runs: Vec<RunRow>,
}

impl SimulationReport {
    /// Summarizes `outcomes`, keeping `sample_count` best and worst runs.
    pub fn build(
        batch_id: BatchId,
        seed: u64,
        outcomes: &[RunOutcome],
        sample_count: usize,
        top_issues: usize,
    ) -> Self {
        let runs = outcomes.len();
        let passed = outcomes.iter().filter(|r| r.passed).count();
        let count_status = |label: &str| outcomes.iter().filter(|r| r.status.label() == label).count();

        let mut violation_histogram = BTreeMap::new();
        for violation in outcomes.iter().flat_map(|r| &r.violations) {
            *violation_histogram.entry(violation.name().to_string()).or_insert(0) += 1;
        }

        let summary = ReportSummary {
            runs,
            passed,
            pass_rate: ratio(passed as f64, runs),
            mean_quality: mean(outcomes.iter().map(RunOutcome::score)),
            mean_utilization: mean(outcomes.iter().map(|r| r.utilization)),
            mean_coverage: mean(outcomes.iter().map(|r| r.coverage.before_collection)),
            completed: count_status("completed"),
            incomplete: count_status("incomplete"),
            failed: count_status("failed"),
            violation_histogram,
            top_issues: aggregate_issues(outcomes, top_issues),
        };

        let mut ranked: Vec<&RunOutcome> = outcomes.iter().collect();
        ranked.sort_by(|a, b| {
            b.score()
                .total_cmp(&a.score())
                .then(a.run_index.cmp(&b.run_index))
        });
        let best = ranked.iter().take(sample_count).map(|r| (*r).clone()).collect();
        ranked.sort_by(|a, b| {
            a.score()
                .total_cmp(&b.score())
                .then(a.run_index.cmp(&b.run_index))
        });
        let worst = ranked.iter().take(sample_count).map(|r| (*r).clone()).collect();

        Self {
            batch_id,
            generated_at: Utc::now(),
            seed,
            summary,
            best,
            worst,
            runs: outcomes.iter().map(RunRow::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text table of the summary and every run.
    pub fn render_table(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let _ = writeln!(out, "batch {} (seed {})", self.batch_id, self.seed);
        let _ = writeln!(
            out,
            "runs {}  passed {} ({:.1}%)  completed {}  incomplete {}  failed {}",
            s.runs,
            s.passed,
            s.pass_rate * 100.0,
            s.completed,
            s.incomplete,
            s.failed
        );
        let _ = writeln!(
            out,
            "mean quality {:.1}  mean utilization {:.2}  mean coverage {:.2}",
            s.mean_quality, s.mean_utilization, s.mean_coverage
        );
        if !s.violation_histogram.is_empty() {
            let _ = writeln!(out, "violations:");
            for (name, count) in &s.violation_histogram {
                let _ = writeln!(out, "  {name:<40} {count:>5}");
            }
        }
        if !s.top_issues.is_empty() {
            let _ = writeln!(out, "top issues:");
            for issue in &s.top_issues {
                let _ = writeln!(out, "  {:<40} {:>5}", issue.issue, issue.count);
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:>4}  {:<18} {:<10} {:>6} {:>6} {:>6} {:>4}  {}",
            "run", "persona", "status", "score", "util", "cover", "viol", "pass"
        );
        for row in &self.runs {
            let _ = writeln!(
                out,
                "{:>4}  {:<18} {:<10} {:>6.1} {:>6.2} {:>6.2} {:>4}  {}",
                row.run_index,
                row.persona,
                row.status,
                row.score,
                row.utilization,
                row.coverage,
                row.violations,
                if row.passed { "yes" } else { "no" }
            );
        }
        out
    }
}

fn ratio(value: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        value / count as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    ratio(sum, count)
}

fn aggregate_issues(outcomes: &[RunOutcome], limit: usize) -> Vec<IssueCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for issue in outcomes
        .iter()
        .flat_map(|r| &r.evaluation.turns)
        .flat_map(|t| &t.issues)
    {
        *counts.entry(issue.as_str()).or_insert(0) += 1;
    }
    let mut issues: Vec<IssueCount> = counts
        .into_iter()
        .map(|(issue, count)| IssueCount {
            issue: issue.to_string(),
            count,
        })
        .collect();
    issues.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.issue.cmp(&b.issue)));
    issues.truncate(limit);
    issues
}
