//! Run Overseer use case
//!
//! Runs the overseer agent over discussion threads and reduces its replies
//! to trigger decisions, and runs the ranking agent over candidate lists.

use crate::ports::agent_backend::AgentBackend;
use crate::ports::execution_observer::{ExecutionObserver, NoObserver};
use crate::use_cases::run_agent::{RunAgentInput, RunAgentUseCase};
use crate::use_cases::run_many::panic_message;
use council_domain::{
    Candidate, ExecutionConfig, ExecutionPreset, ExecutionResult, FailureKind,
    OVERSEER_AGENT_ID, PromptTemplate, RANKER_AGENT_ID, RankedCandidate, ThreadSnapshot,
    TriggerDecision, parse_decision, parse_ranking,
};
use futures::FutureExt;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Decision for one thread plus what it cost to reach it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationReport {
    pub thread_number: u64,
    pub decision: TriggerDecision,
    pub cost_usd: f64,
    pub turns_used: u32,
    /// Set when the overseer could not run; the decision is then inert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ObservationReport {
    fn failed(thread_number: u64, error: impl Into<String>) -> Self {
        Self {
            thread_number,
            decision: TriggerDecision::inert(),
            cost_usd: 0.0,
            turns_used: 0,
            error: Some(error.into()),
        }
    }
}

/// Candidates kept by the ranking agent, in the order it gave them
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankingReport {
    pub recommended: Vec<RankedCandidate>,
    pub candidate_count: usize,
    pub cost_usd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Use case for overseer decisions and candidate ranking
pub struct RunOverseerUseCase<B: AgentBackend + ?Sized + 'static> {
    engine: Arc<RunAgentUseCase<B>>,
    overseer_id: String,
    ranker_id: String,
    config: ExecutionConfig,
}

impl<B: AgentBackend + ?Sized + 'static> Clone for RunOverseerUseCase<B> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            overseer_id: self.overseer_id.clone(),
            ranker_id: self.ranker_id.clone(),
            config: self.config,
        }
    }
}

impl<B: AgentBackend + ?Sized + 'static> RunOverseerUseCase<B> {
    /// Overseer runs use the quick preset unless told otherwise.
    pub fn new(engine: Arc<RunAgentUseCase<B>>) -> Self {
        Self {
            engine,
            overseer_id: OVERSEER_AGENT_ID.to_string(),
            ranker_id: RANKER_AGENT_ID.to_string(),
            config: ExecutionPreset::Quick.config(),
        }
    }

    pub fn with_config(mut self, config: ExecutionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_overseer(mut self, agent_id: impl Into<String>) -> Self {
        self.overseer_id = agent_id.into();
        self
    }

    pub fn with_ranker(mut self, agent_id: impl Into<String>) -> Self {
        self.ranker_id = agent_id.into();
        self
    }

    /// Decide whether another agent should run on `thread`.
    pub async fn observe(&self, thread: &ThreadSnapshot) -> ObservationReport {
        self.observe_with_observer(thread, &NoObserver).await
    }

    pub async fn observe_with_observer(
        &self,
        thread: &ThreadSnapshot,
        observer: &dyn ExecutionObserver,
    ) -> ObservationReport {
        let registry = self.engine.registry();
        let Some(definition) = registry.get(&self.overseer_id) else {
            warn!(agent = %self.overseer_id, "Overseer agent not found");
            return ObservationReport::failed(
                thread.number,
                format!("overseer agent '{}' not found", self.overseer_id),
            );
        };

        let instructions = PromptTemplate::overseer_prompt(
            &definition.instructions,
            thread,
            &registry.render_summary_excluding(&definition.id),
        );
        let prompt = format!(
            "Decide whether another agent should be triggered for thread #{}. Reply with the YAML decision only.",
            thread.number
        );

        info!(thread = thread.number, "Overseer analysing thread");
        let result = self
            .engine
            .execute_with_observer(
                RunAgentInput::new(prompt, self.overseer_id.as_str(), self.config)
                    .with_instructions(instructions),
                observer,
            )
            .await;
        debug!(thread = thread.number, "Overseer response length: {}", result.response_text().len());

        if !result.is_success() {
            return ObservationReport {
                cost_usd: result.cost_usd(),
                turns_used: result.turns_used(),
                ..ObservationReport::failed(thread.number, result.response_text())
            };
        }

        let decision = parse_decision(result.response_text());
        info!(
            thread = thread.number,
            should_trigger = decision.should_trigger,
            target = %decision.target_agent_id,
            "Overseer decision"
        );

        ObservationReport {
            thread_number: thread.number,
            decision,
            cost_usd: result.cost_usd(),
            turns_used: result.turns_used(),
            error: None,
        }
    }

    /// Observe many threads concurrently; one report per thread number.
    ///
    /// Threads are isolated from each other the same way fan-out agents are.
    /// A repeated thread number is observed once, using its first snapshot.
    pub async fn observe_batch(
        &self,
        threads: Vec<ThreadSnapshot>,
        observer: Arc<dyn ExecutionObserver>,
    ) -> HashMap<u64, ObservationReport> {
        let threads = distinct_threads(threads);
        info!("Observing {} threads", threads.len());

        let numbers: Vec<u64> = threads.iter().map(|t| t.number).collect();
        let mut join_set = JoinSet::new();
        for thread in threads {
            let this = self.clone();
            let observer = Arc::clone(&observer);
            join_set.spawn(async move {
                let run = this.observe_with_observer(&thread, observer.as_ref());
                match AssertUnwindSafe(run).catch_unwind().await {
                    Ok(report) => report,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        error!(thread = thread.number, "Overseer task panicked: {}", message);
                        observer.on_agent_complete(
                            &this.overseer_id,
                            &ExecutionResult::failure(&this.overseer_id, FailureKind::Panic, &message),
                        );
                        ObservationReport::failed(thread.number, message)
                    }
                }
            });
        }

        let mut reports = HashMap::with_capacity(numbers.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(report) => {
                    reports.insert(report.thread_number, report);
                }
                Err(e) => error!("Overseer task join error: {}", e),
            }
        }
        for number in numbers {
            reports
                .entry(number)
                .or_insert_with(|| ObservationReport::failed(number, "task did not complete"));
        }

        info!("Observation finished: {} reports", reports.len());
        reports
    }

    /// Ask the ranking agent which candidates are worth pursuing.
    pub async fn rank_candidates(&self, candidates: &[Candidate]) -> RankingReport {
        self.rank_candidates_with_observer(candidates, &NoObserver).await
    }

    pub async fn rank_candidates_with_observer(
        &self,
        candidates: &[Candidate],
        observer: &dyn ExecutionObserver,
    ) -> RankingReport {
        if candidates.is_empty() {
            return RankingReport::default();
        }

        let Some(definition) = self.engine.registry().get(&self.ranker_id) else {
            warn!(agent = %self.ranker_id, "Ranking agent not found");
            return RankingReport {
                candidate_count: candidates.len(),
                error: Some(format!("ranking agent '{}' not found", self.ranker_id)),
                ..RankingReport::default()
            };
        };

        let instructions = PromptTemplate::ranking_prompt(&definition.instructions, candidates);
        let prompt = format!(
            "Rank the {} candidates above. Reply with the YAML list only.",
            candidates.len()
        );

        info!(agent = %self.ranker_id, "Ranking {} candidates", candidates.len());
        let result = self
            .engine
            .execute_with_observer(
                RunAgentInput::new(prompt, self.ranker_id.as_str(), self.config)
                    .with_instructions(instructions),
                observer,
            )
            .await;

        if !result.is_success() {
            return RankingReport {
                candidate_count: candidates.len(),
                cost_usd: result.cost_usd(),
                error: Some(result.response_text().to_string()),
                ..RankingReport::default()
            };
        }

        let recommended: Vec<RankedCandidate> =
            parse_ranking(result.response_text(), candidates.len())
                .into_iter()
                .map(|item| {
                    let candidate = candidates[item.index].clone();
                    RankedCandidate::join(item, candidate)
                })
                .collect();
        info!(agent = %self.ranker_id, "Recommended {} candidates", recommended.len());

        RankingReport {
            recommended,
            candidate_count: candidates.len(),
            cost_usd: result.cost_usd(),
            error: None,
        }
    }
}

fn distinct_threads(threads: Vec<ThreadSnapshot>) -> Vec<ThreadSnapshot> {
    let mut seen = HashSet::new();
    threads
        .into_iter()
        .filter(|thread| {
            let first = seen.insert(thread.number);
            if !first {
                warn!(thread = thread.number, "Duplicate thread number, keeping the first snapshot");
            }
            first
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::use_cases::testing::{Script, ScriptedBackend, completed, registry_with};
    use council_domain::{AgentDefinition, AgentRegistry, Provenance};

    fn use_case(backend: Arc<ScriptedBackend>, ids: &[&str]) -> RunOverseerUseCase<ScriptedBackend> {
        let engine = RunAgentUseCase::new(backend, registry_with(ids))
            .with_retry(RetryPolicy::no_retry());
        RunOverseerUseCase::new(Arc::new(engine))
    }

    #[tokio::test]
    async fn test_observe_parses_decision() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push(
            "observer",
            completed("```yaml\nshould_trigger: true\nagent: moderator\nreason: new thread\n```", 0.02),
        );

        let thread = ThreadSnapshot::new(7, "Proposal").with_body("Let's do X");
        let report = use_case(Arc::clone(&backend), &["observer", "moderator"])
            .observe(&thread)
            .await;

        assert_eq!(report.thread_number, 7);
        assert!(report.decision.should_trigger);
        assert_eq!(report.decision.target_agent_id, "moderator");
        assert_eq!(report.decision.suggested_action, "@moderator please triage");
        assert_eq!(report.cost_usd, 0.02);
        assert!(report.error.is_none());

        let request = &backend.requests()[0];
        assert_eq!(request.config, ExecutionPreset::Quick.config());
        assert!(request.instructions.starts_with("You are observer."));
        assert!(request.instructions.contains("| moderator | moderator agent | auto-decide |"));
        assert!(!request.instructions.contains("| observer |"));
    }

    #[tokio::test]
    async fn test_missing_overseer_is_inert() {
        let backend = Arc::new(ScriptedBackend::new());
        let report = use_case(Arc::clone(&backend), &["moderator"])
            .observe(&ThreadSnapshot::new(1, "t"))
            .await;

        assert_eq!(report.decision, TriggerDecision::inert());
        assert!(report.error.unwrap().contains("not found"));
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_observe_batch_keys_by_thread() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push("observer", completed("should_trigger: false\nreason: quiet", 0.01));
        backend.push("observer", Script::Panic);
        backend.push("observer", completed("should_trigger: false\nreason: quiet", 0.01));

        let threads = vec![
            ThreadSnapshot::new(1, "a"),
            ThreadSnapshot::new(2, "b"),
            ThreadSnapshot::new(3, "c"),
        ];
        let reports = use_case(Arc::clone(&backend), &["observer"])
            .observe_batch(threads, Arc::new(NoObserver))
            .await;

        assert_eq!(reports.len(), 3);
        for number in [1u64, 2, 3] {
            assert!(!reports[&number].decision.should_trigger);
        }
        assert_eq!(reports.values().filter(|r| r.error.is_some()).count(), 1);
    }

    #[tokio::test]
    async fn test_observe_batch_drops_repeated_thread_numbers() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push("observer", completed("should_trigger: false\nreason: quiet", 0.01));
        backend.push("observer", completed("should_trigger: false\nreason: quiet", 0.01));

        let threads = vec![
            ThreadSnapshot::new(4, "first"),
            ThreadSnapshot::new(5, "other"),
            ThreadSnapshot::new(4, "second"),
        ];
        let mut registry = AgentRegistry::new();
        registry.register(AgentDefinition::new(
            "observer",
            "watches",
            "Thread: __THREAD_TITLE__",
            Provenance::Builtin,
        ));
        let engine = RunAgentUseCase::new(Arc::clone(&backend), Arc::new(registry))
            .with_retry(RetryPolicy::no_retry());
        let reports = RunOverseerUseCase::new(Arc::new(engine))
            .observe_batch(threads, Arc::new(NoObserver))
            .await;

        assert_eq!(reports.len(), 2);
        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().any(|r| r.instructions.contains("Thread: first")));
        assert!(!requests.iter().any(|r| r.instructions.contains("Thread: second")));
    }

    #[tokio::test]
    async fn test_custom_overseer_left_out_of_its_table() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push("moderator", completed("should_trigger: false\nreason: quiet", 0.01));

        let report = use_case(Arc::clone(&backend), &["observer", "moderator", "summarizer"])
            .with_overseer("moderator")
            .observe(&ThreadSnapshot::new(2, "t"))
            .await;

        assert!(report.error.is_none());
        let request = &backend.requests()[0];
        assert_eq!(request.agent_id, "moderator");
        assert!(!request.instructions.contains("| moderator |"));
        assert!(request.instructions.contains("| observer | observer agent | auto-decide |"));
        assert!(request.instructions.contains("| summarizer |"));
    }

    #[tokio::test]
    async fn test_rank_candidates() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push(
            "ranker",
            completed(
                "recommended:\n  - index: 1\n    reason: timely\n  - index: 9\n    reason: ghost\n",
                0.03,
            ),
        );

        let candidates = vec![
            Candidate::new("First", "abstract one"),
            Candidate::new("Second", "abstract two"),
        ];
        let report = use_case(Arc::clone(&backend), &["ranker"])
            .rank_candidates(&candidates)
            .await;

        assert_eq!(report.candidate_count, 2);
        assert_eq!(report.recommended.len(), 1);
        assert_eq!(report.recommended[0].index, 1);
        assert_eq!(report.recommended[0].candidate.title, "Second");
        assert_eq!(report.recommended[0].rationale, "timely");
        assert_eq!(report.recommended[0].summary, "abstract two");
        assert!(backend.requests()[0].instructions.contains("### Candidate 1"));
    }

    #[tokio::test]
    async fn test_rank_empty_candidates_skips_backend() {
        let backend = Arc::new(ScriptedBackend::new());
        let report = use_case(Arc::clone(&backend), &["ranker"])
            .rank_candidates(&[])
            .await;
        assert!(report.recommended.is_empty());
        assert!(backend.requests().is_empty());
    }
}
