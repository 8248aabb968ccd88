//! Run Many use case
//!
//! Fans one task out to several agents concurrently. Each agent runs in its
//! own task and converts every fault (including panics) into a failure
//! result before it reaches the join set, so one agent can never cancel,
//! delay or corrupt another.

use crate::ports::agent_backend::AgentBackend;
use crate::ports::execution_observer::{ExecutionObserver, NoObserver};
use crate::use_cases::run_agent::{RunAgentInput, RunAgentUseCase};
use council_domain::{
    ExecutionConfig, ExecutionResult, FailureKind, PromptTemplate, normalize_agent_id,
};
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

/// Input for the RunMany use case
#[derive(Debug, Clone)]
pub struct RunManyInput {
    /// Shared task; `{agent}` is replaced by each agent's id
    pub task: String,
    pub agent_ids: Vec<String>,
    pub config: ExecutionConfig,
}

impl RunManyInput {
    pub fn new(task: impl Into<String>, agent_ids: Vec<String>, config: ExecutionConfig) -> Self {
        Self {
            task: task.into(),
            agent_ids,
            config,
        }
    }
}

/// Per-agent results of a fan-out batch.
///
/// Holds exactly one entry per distinct requested agent id. Iteration order
/// is unspecified.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FanoutReport {
    pub results: HashMap<String, ExecutionResult>,
    pub total_cost_usd: f64,
}

impl FanoutReport {
    pub fn get(&self, agent_id: &str) -> Option<&ExecutionResult> {
        self.results.get(&normalize_agent_id(agent_id))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Ids sorted for stable display.
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.results.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn failed_count(&self) -> usize {
        self.results.values().filter(|r| !r.is_success()).count()
    }
}

/// Use case for running several agents concurrently
pub struct RunManyUseCase<B: AgentBackend + ?Sized + 'static> {
    engine: Arc<RunAgentUseCase<B>>,
}

impl<B: AgentBackend + ?Sized + 'static> RunManyUseCase<B> {
    pub fn new(engine: Arc<RunAgentUseCase<B>>) -> Self {
        Self { engine }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunManyInput) -> FanoutReport {
        self.execute_with_observer(input, Arc::new(NoObserver)).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_observer(
        &self,
        input: RunManyInput,
        observer: Arc<dyn ExecutionObserver>,
    ) -> FanoutReport {
        let agent_ids = distinct_ids(&input.agent_ids);
        info!("Starting fan-out over {} agents", agent_ids.len());
        observer.on_batch_start(&agent_ids);

        let mut join_set = JoinSet::new();
        for agent_id in &agent_ids {
            let engine = Arc::clone(&self.engine);
            let observer = Arc::clone(&observer);
            let agent_id = agent_id.clone();
            let run_input = RunAgentInput::new(
                PromptTemplate::fanout_task(&input.task, &agent_id),
                agent_id.clone(),
                input.config,
            );

            join_set.spawn(async move {
                let run = engine.execute_with_observer(run_input, observer.as_ref());
                let result = match AssertUnwindSafe(run).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        error!(agent = %agent_id, "Agent task panicked: {}", message);
                        let result =
                            ExecutionResult::failure(&agent_id, FailureKind::Panic, message);
                        observer.on_agent_complete(&agent_id, &result);
                        result
                    }
                };
                (agent_id, result)
            });
        }

        let mut results = HashMap::with_capacity(agent_ids.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((agent_id, result)) => {
                    results.insert(agent_id, result);
                }
                Err(e) => error!("Fan-out task join error: {}", e),
            }
        }

        // A slot can only be missing if its task was aborted from outside.
        for agent_id in agent_ids {
            results.entry(agent_id).or_insert_with_key(|id| {
                ExecutionResult::failure(id, FailureKind::Panic, "task did not complete")
            });
        }

        let total_cost_usd: f64 = results.values().map(ExecutionResult::cost_usd).sum();
        info!(
            "All agents finished - total cost: ${:.4}",
            total_cost_usd
        );
        observer.on_batch_complete(total_cost_usd);

        FanoutReport {
            results,
            total_cost_usd,
        }
    }
}

/// Normalized ids, duplicates removed, first occurrence kept.
fn distinct_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| normalize_agent_id(id))
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_backend::BackendError;
    use crate::retry::RetryPolicy;
    use crate::use_cases::testing::{Script, ScriptedBackend, completed, registry_with};
    use council_domain::ExecutionOutcome;

    fn use_case(backend: Arc<ScriptedBackend>) -> RunManyUseCase<ScriptedBackend> {
        let engine = RunAgentUseCase::new(backend, registry_with(&["a", "b", "c"]))
            .with_retry(RetryPolicy::no_retry());
        RunManyUseCase::new(Arc::new(engine))
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failure_in_one_agent_is_isolated() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push("a", completed("answer from a", 0.10));
        backend.push("b", Script::Fail(BackendError::Spawn("boom".into())));
        backend.push("c", completed("answer from c", 0.25));

        let report = use_case(Arc::clone(&backend))
            .execute(RunManyInput::new(
                "Review as {agent}.",
                ids(&["a", "b", "c"]),
                ExecutionConfig::default(),
            ))
            .await;

        assert_eq!(report.len(), 3);
        assert_eq!(report.get("a").unwrap().response_text(), "answer from a");
        assert_eq!(report.get("a").unwrap().cost_usd(), 0.10);
        assert_eq!(report.get("c").unwrap().response_text(), "answer from c");
        assert_eq!(report.get("c").unwrap().cost_usd(), 0.25);
        assert_eq!(
            report.get("b").unwrap().outcome(),
            ExecutionOutcome::Failed(FailureKind::Backend)
        );
        assert_eq!(report.failed_count(), 1);
        assert!((report.total_cost_usd - 0.35).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push("a", completed("fine", 0.01));
        backend.push("b", Script::Panic);

        let report = use_case(Arc::clone(&backend))
            .execute(RunManyInput::new("t", ids(&["a", "b"]), ExecutionConfig::default()))
            .await;

        assert_eq!(report.len(), 2);
        assert!(report.get("a").unwrap().is_success());
        let b = report.get("b").unwrap();
        assert_eq!(b.outcome(), ExecutionOutcome::Failed(FailureKind::Panic));
        assert!(b.response_text().contains("scripted panic for b"));
    }

    #[tokio::test]
    async fn test_prompt_is_framed_per_agent() {
        let backend = Arc::new(ScriptedBackend::new());
        use_case(Arc::clone(&backend))
            .execute(RunManyInput::new(
                "Review as {agent}.",
                ids(&["a", "c"]),
                ExecutionConfig::default(),
            ))
            .await;

        let mut prompts: Vec<(String, String)> = backend
            .requests()
            .into_iter()
            .map(|r| (r.agent_id, r.prompt))
            .collect();
        prompts.sort();
        assert!(prompts[0].1.contains("Review as a."));
        assert!(prompts[1].1.contains("Review as c."));
    }

    #[tokio::test]
    async fn test_duplicates_and_unknown_ids() {
        let backend = Arc::new(ScriptedBackend::new());
        let report = use_case(Arc::clone(&backend))
            .execute(RunManyInput::new(
                "t",
                ids(&["A", "a", "ghost"]),
                ExecutionConfig::default(),
            ))
            .await;

        assert_eq!(report.sorted_ids(), vec!["a", "ghost"]);
        assert_eq!(
            report.get("ghost").unwrap().outcome(),
            ExecutionOutcome::Failed(FailureKind::UnknownAgent)
        );
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let backend = Arc::new(ScriptedBackend::new());
        let report = use_case(backend)
            .execute(RunManyInput::new("t", Vec::new(), ExecutionConfig::default()))
            .await;
        assert!(report.is_empty());
        assert_eq!(report.total_cost_usd, 0.0);
    }
}
