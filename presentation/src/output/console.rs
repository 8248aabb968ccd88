//! Console output formatter for council results

use colored::{ColoredString, Colorize};
use council_application::{FanoutReport, ObservationReport, RankingReport};
use council_domain::{AgentDefinition, AgentRegistry, ExecutionOutcome, ExecutionResult};
use serde::Serialize;
use std::collections::HashMap;

/// Formats council results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Discovered agents, one line each, followed by the overseer's table
    pub fn agents(registry: &AgentRegistry) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Agents"));
        output.push('\n');

        let mut aliases: Vec<(&str, &str)> = Vec::new();
        for (key, definition) in registry.iter() {
            if key != definition.id {
                aliases.push((key, definition.id.as_str()));
                continue;
            }
            output.push_str(&format!(
                "\n{} {} {}\n",
                definition.id.yellow().bold(),
                format!("[{}]", definition.provenance).dimmed(),
                definition.description
            ));
            if !definition.overrides.is_empty() {
                output.push_str(&format!("  {} {:?}\n", "overrides:".dimmed(), definition.overrides));
            }
        }

        if !aliases.is_empty() {
            output.push_str(&Self::section_header("Aliases"));
            for (alias, id) in aliases {
                output.push_str(&format!("  {} -> {}\n", alias, id));
            }
        }

        output.push_str(&Self::section_header("Summary"));
        output.push_str(&registry.render_summary());
        output.push('\n');
        output.push_str(&Self::footer());
        output
    }

    /// Agents as JSON, without alias duplicates
    pub fn agents_json(registry: &AgentRegistry) -> String {
        let definitions: Vec<&AgentDefinition> = registry
            .iter()
            .filter(|(key, definition)| *key == definition.id)
            .map(|(_, definition)| definition.as_ref())
            .collect();
        Self::json(&definitions)
    }

    /// One agent's result
    pub fn result(agent_id: &str, result: &ExecutionResult) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n",
            outcome_color(&format!("── {} ──", agent_id), result.outcome()).bold()
        ));
        output.push_str(result.response_text());
        output.push('\n');
        output.push_str(&format!("{}\n", Self::stats_line(result).dimmed()));
        output
    }

    /// All results of a fan-out batch, sorted by agent id
    pub fn fanout(report: &FanoutReport) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Fan-out Results"));
        output.push('\n');

        for agent_id in report.sorted_ids() {
            if let Some(result) = report.get(agent_id) {
                output.push('\n');
                output.push_str(&Self::result(agent_id, result));
            }
        }

        output.push_str(&format!(
            "\n{} {} agents, {} failed, ${:.4} total\n",
            "Summary:".cyan().bold(),
            report.len(),
            report.failed_count(),
            report.total_cost_usd
        ));
        output.push_str(&Self::footer());
        output
    }

    /// One overseer decision
    pub fn observation(report: &ObservationReport) -> String {
        let mut output = String::new();
        let decision = &report.decision;

        output.push_str(&format!(
            "{} #{}\n",
            "Thread".cyan().bold(),
            report.thread_number
        ));

        if let Some(error) = &report.error {
            output.push_str(&format!("  {} {}\n", "error:".red().bold(), error));
        } else if decision.should_trigger {
            output.push_str(&format!(
                "  {} {}\n",
                "trigger:".green().bold(),
                decision.target_agent_id
            ));
            output.push_str(&format!("  {} {}\n", "action:".bold(), decision.suggested_action));
        } else {
            output.push_str(&format!("  {}\n", "no trigger".yellow()));
        }

        if !decision.rationale.is_empty() {
            output.push_str(&format!("  {} {}\n", "reason:".bold(), decision.rationale));
        }
        if !decision.analysis.is_empty() {
            output.push_str(&format!("  {}\n{}\n", "analysis:".bold(), Self::indent(&decision.analysis, "    ")));
        }
        output.push_str(&format!(
            "  {}\n",
            format!("${:.4}, {} turns", report.cost_usd, report.turns_used).dimmed()
        ));
        output
    }

    /// Decisions for a batch of threads, sorted by thread number
    pub fn observations(reports: &HashMap<u64, ObservationReport>) -> String {
        let mut numbers: Vec<&u64> = reports.keys().collect();
        numbers.sort_unstable();
        numbers
            .into_iter()
            .filter_map(|number| reports.get(number))
            .map(Self::observation)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Ranked candidates in the order the ranking agent gave them
    pub fn ranking(report: &RankingReport) -> String {
        let mut output = String::new();
        output.push_str(&Self::header("Ranking"));
        output.push('\n');

        if let Some(error) = &report.error {
            output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
        } else if report.recommended.is_empty() {
            output.push_str(&format!(
                "\nNone of the {} candidates was recommended.\n",
                report.candidate_count
            ));
        }

        for (rank, ranked) in report.recommended.iter().enumerate() {
            output.push_str(&format!(
                "\n{} {}\n",
                format!("{}.", rank + 1).yellow().bold(),
                ranked.candidate.title.bold()
            ));
            if !ranked.candidate.url.is_empty() {
                output.push_str(&format!("   {}\n", ranked.candidate.url.dimmed()));
            }
            if !ranked.rationale.is_empty() {
                output.push_str(&format!("   {} {}\n", "why:".cyan(), ranked.rationale));
            }
            if !ranked.summary.is_empty() {
                output.push_str(&format!("{}\n", Self::indent(&ranked.summary, "   ")));
            }
        }

        output.push_str(&format!(
            "\n{}\n",
            format!(
                "{} of {} candidates recommended, ${:.4}",
                report.recommended.len(),
                report.candidate_count,
                report.cost_usd
            )
            .dimmed()
        ));
        output.push_str(&Self::footer());
        output
    }

    /// Format any serializable report as JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn stats_line(result: &ExecutionResult) -> String {
        let mut line = format!(
            "{} | ${:.4} | {} turns",
            result.outcome().as_str(),
            result.cost_usd(),
            result.turns_used()
        );
        if !result.tool_calls().is_empty() {
            line.push_str(&format!(" | tools: {}", result.tool_calls().join(", ")));
        }
        let usage = result.usage();
        if !usage.is_empty() {
            line.push_str(&format!(
                " | tokens: {} in / {} out",
                usage.input_tokens, usage.output_tokens
            ));
        }
        line
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn outcome_color(text: &str, outcome: ExecutionOutcome) -> ColoredString {
    match outcome {
        ExecutionOutcome::Completed => text.green(),
        ExecutionOutcome::Failed(_) => text.red(),
        _ => text.yellow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        Candidate, FailureKind, Provenance, RankedCandidate, RunSummary, StopReason,
        TokenUsage, TriggerDecision,
    };

    fn completed(text: &str, cost: f64) -> ExecutionResult {
        ExecutionResult::from_summary(
            text.to_string(),
            vec!["Read".to_string()],
            &RunSummary {
                session_id: "s".to_string(),
                cost_usd: cost,
                num_turns: 2,
                usage: TokenUsage::new(100, 20, None),
                stop_reason: StopReason::EndTurn,
            },
        )
    }

    #[test]
    fn test_agents_lists_aliases_separately() {
        let mut registry = AgentRegistry::new();
        registry.register(AgentDefinition::new(
            "moderator",
            "Triage",
            "You triage.",
            Provenance::Builtin,
        ));
        registry.register(
            AgentDefinition::new("alice", "Alice's reviewer", "You review.", Provenance::Contributed)
                .with_container("team-alice"),
        );

        let output = ConsoleFormatter::agents(&registry);
        assert!(output.contains("moderator"));
        assert!(output.contains("team-alice -> alice"));
        assert!(output.contains("| Agent | Description | When to trigger |"));

        let json = ConsoleFormatter::agents_json(&registry);
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_fanout_sorted_with_summary() {
        let mut report = FanoutReport::default();
        report
            .results
            .insert("reviewer_b".to_string(), completed("B says ok", 0.02));
        report.results.insert(
            "reviewer_a".to_string(),
            ExecutionResult::failure("reviewer_a", FailureKind::Backend, "connection refused"),
        );
        report.total_cost_usd = 0.02;

        let output = ConsoleFormatter::fanout(&report);
        let a = output.find("reviewer_a").unwrap();
        let b = output.find("reviewer_b").unwrap();
        assert!(a < b);
        assert!(output.contains("[guardrail]"));
        assert!(output.contains("2 agents, 1 failed"));
        assert!(output.contains("tools: Read"));
    }

    #[test]
    fn test_observation_variants() {
        let triggered = ObservationReport {
            thread_number: 7,
            decision: TriggerDecision::trigger("reviewer_a", "@reviewer_a please review")
                .with_rationale("needs a review"),
            cost_usd: 0.01,
            turns_used: 1,
            error: None,
        };
        let output = ConsoleFormatter::observation(&triggered);
        assert!(output.contains("#7"));
        assert!(output.contains("@reviewer_a please review"));
        assert!(output.contains("needs a review"));

        let failed = ObservationReport {
            error: Some("overseer agent 'observer' not found".to_string()),
            decision: TriggerDecision::inert(),
            ..triggered
        };
        assert!(ConsoleFormatter::observation(&failed).contains("not found"));
    }

    #[test]
    fn test_ranking_output() {
        let report = RankingReport {
            recommended: vec![RankedCandidate {
                index: 1,
                candidate: Candidate::new("Second paper", "abstract"),
                rationale: "relevant".to_string(),
                summary: "short summary".to_string(),
            }],
            candidate_count: 3,
            cost_usd: 0.05,
            error: None,
        };
        let output = ConsoleFormatter::ranking(&report);
        assert!(output.contains("Second paper"));
        assert!(output.contains("relevant"));
        assert!(output.contains("1 of 3 candidates recommended"));

        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::json(&report)).unwrap();
        assert_eq!(json["recommended"][0]["index"], 1);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
