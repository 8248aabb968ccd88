//! Progress reporting for agent execution

use colored::Colorize;
use council_application::ExecutionObserver;
use council_domain::{ExecutionConfig, ExecutionResult, truncate};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Reports progress during agent execution with one spinner per run
///
/// The same agent can run several times at once (batched overseer runs), so
/// each id holds a queue of spinners: completions finish the oldest one and
/// stream updates go to the newest.
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, VecDeque<ProgressBar>>>,
    batch_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
            batch_bar: Mutex::new(None),
        }
    }

    fn batch_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn bars(&self) -> MutexGuard<'_, HashMap<String, VecDeque<ProgressBar>>> {
        self.bars.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn batch_bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.batch_bar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_bar(&self, agent_id: &str, f: impl FnOnce(&ProgressBar)) {
        if let Some(bar) = self.bars().get(agent_id).and_then(VecDeque::back) {
            f(bar);
        }
    }

    fn take_oldest(&self, agent_id: &str) -> Option<ProgressBar> {
        let mut bars = self.bars();
        let queue = bars.get_mut(agent_id)?;
        let bar = queue.pop_front();
        if queue.is_empty() {
            bars.remove(agent_id);
        }
        bar
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionObserver for ProgressReporter {
    fn on_batch_start(&self, agent_ids: &[String]) {
        let pb = self.multi.add(ProgressBar::new(agent_ids.len() as u64));
        pb.set_style(Self::batch_style());
        pb.set_prefix("Fan-out");
        pb.set_message("Starting...");
        *self.batch_bar() = Some(pb);
    }

    fn on_agent_start(&self, agent_id: &str, config: &ExecutionConfig) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(agent_id.to_string());
        pb.set_message(format!(
            "running (max {} turns, ${:.2})",
            config.max_turns(),
            config.max_budget_usd()
        ));
        pb.enable_steady_tick(Duration::from_millis(120));
        self.bars()
            .entry(agent_id.to_string())
            .or_default()
            .push_back(pb);
    }

    fn on_text(&self, agent_id: &str, text: &str) {
        let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        self.with_bar(agent_id, |bar| bar.set_message(truncate(line, 60)));
    }

    fn on_tool_use(&self, agent_id: &str, tool_name: &str) {
        self.with_bar(agent_id, |bar| {
            bar.set_message(format!("{} {}", "tool".cyan(), tool_name))
        });
    }

    fn on_tool_result(&self, agent_id: &str, _tool_use_id: &str, is_error: bool) {
        if is_error {
            self.with_bar(agent_id, |bar| {
                bar.set_message(format!("{}", "tool error".yellow()))
            });
        }
    }

    fn on_retry(&self, agent_id: &str, attempt: u32, delay: Duration) {
        self.with_bar(agent_id, |bar| {
            bar.set_message(format!(
                "{} attempt {} after {:.1}s",
                "retry".yellow(),
                attempt,
                delay.as_secs_f64()
            ))
        });
    }

    fn on_agent_complete(&self, agent_id: &str, result: &ExecutionResult) {
        let status = if result.is_success() {
            format!(
                "{} {} (${:.4}, {} turns)",
                "v".green(),
                result.outcome().as_str(),
                result.cost_usd(),
                result.turns_used()
            )
        } else {
            format!("{} failed", "x".red())
        };

        if let Some(bar) = self.take_oldest(agent_id) {
            bar.finish_with_message(status.clone());
        }
        if let Some(pb) = self.batch_bar().as_ref() {
            pb.set_message(format!("{} {}", agent_id, status));
            pb.inc(1);
        }
    }

    fn on_batch_complete(&self, total_cost_usd: f64) {
        if let Some(pb) = self.batch_bar().take() {
            pb.finish_with_message(format!("{} ${:.4}", "complete!".green(), total_cost_usd));
        }
    }
}
