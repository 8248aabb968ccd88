//! CLI entrypoint for agent-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod input;
mod logging;

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser};
use council_application::{
    ExecutionObserver, NoObserver, RunAgentInput, RunAgentUseCase, RunManyInput, RunManyUseCase,
    RunOverseerUseCase,
};
use council_domain::{Candidate, ExecutionConfig, ThreadSnapshot};
use council_infrastructure::{
    ClaudeCliBackend, ConfigIssue, ConfigLoader, RegistryCache, ScanInputs, Severity,
};
use council_presentation::{Cli, Command, ConsoleFormatter, OutputConfig, ProgressReporter};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

type Engine = RunAgentUseCase<ClaudeCliBackend>;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

    let _log_guard = logging::init(cli.verbose, config.logging.file.as_deref())?;
    info!("Starting agent-council");

    if report_issues(&config.validate()) {
        return Ok(ExitCode::FAILURE);
    }

    let output = OutputConfig::resolve(config.output.color, cli.no_color, cli.json, cli.quiet);
    output.apply();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    // === Dependency Injection ===
    let cache = RegistryCache::new();
    let registry = cache.get_or_discover(&ScanInputs::from_config(&config.agents));
    if registry.is_empty() {
        warn!(
            "No agents found under {}",
            config.agents.builtin_dir.display()
        );
    }

    if let Command::Agents = command {
        let text = if output.json {
            ConsoleFormatter::agents_json(&registry)
        } else {
            ConsoleFormatter::agents(&registry)
        };
        println!("{}", text);
        return Ok(ExitCode::SUCCESS);
    }

    let backend = Arc::new(ClaudeCliBackend::from_config(&config.backend));
    if !backend.is_available() {
        warn!("Claude CLI '{}' not found on PATH", backend.command());
    }

    let (retry, _) = config.retry.to_policy();
    let (execution, _) = config.execution.resolve(cli.preset);
    let engine = Arc::new(RunAgentUseCase::new(backend, registry).with_retry(retry));

    let observer: Arc<dyn ExecutionObserver> = if output.show_progress {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(NoObserver)
    };

    let ctx = Context {
        engine,
        execution,
        overseer_config: cli.preset.map(|p| p.config()),
        observer,
        output,
    };

    match command {
        Command::Agents => Ok(ExitCode::SUCCESS),
        Command::Run { agent, prompt } => ctx.run(agent, prompt).await,
        Command::Fanout { agents, task } => ctx.fanout(agents, task).await,
        Command::Observe {
            file,
            number,
            title,
            body,
            comments,
        } => {
            let threads = match (file, number) {
                (Some(path), _) => input::read_threads(&path)?.into_threads(),
                (None, Some(number)) => vec![
                    ThreadSnapshot::new(number, title.unwrap_or_default())
                        .with_body(body)
                        .with_comments(comments),
                ],
                (None, None) => return Err(anyhow!("either --file or --number is required")),
            };
            ctx.observe(threads).await
        }
        Command::Rank { file } => {
            let candidates = input::read_candidates(&file)?;
            ctx.rank(candidates).await
        }
    }
}

/// Print configuration issues; returns true when any of them is fatal.
fn report_issues(issues: &[ConfigIssue]) -> bool {
    let mut fatal = false;
    for issue in issues {
        match issue.severity {
            Severity::Error => {
                fatal = true;
                eprintln!("config error: {}", issue);
            }
            Severity::Warning => eprintln!("config warning: {}", issue),
        }
    }
    fatal
}

/// Everything a subcommand needs once the layers are wired
struct Context {
    engine: Arc<Engine>,
    execution: ExecutionConfig,
    overseer_config: Option<ExecutionConfig>,
    observer: Arc<dyn ExecutionObserver>,
    output: OutputConfig,
}

impl Context {
    fn print(&self, text: String, json: impl FnOnce() -> String) {
        if self.output.json {
            println!("{}", json());
        } else {
            println!("{}", text);
        }
    }

    async fn run(&self, agent: String, prompt: String) -> Result<ExitCode> {
        let result = self
            .engine
            .execute_with_observer(
                RunAgentInput::new(prompt, agent.as_str(), self.execution),
                self.observer.as_ref(),
            )
            .await;

        self.print(ConsoleFormatter::result(&agent, &result), || {
            ConsoleFormatter::json(&result)
        });
        Ok(exit_code(result.is_success()))
    }

    async fn fanout(&self, agents: Vec<String>, task: String) -> Result<ExitCode> {
        let use_case = RunManyUseCase::new(Arc::clone(&self.engine));
        let report = use_case
            .execute_with_observer(
                RunManyInput::new(task, agents, self.execution),
                Arc::clone(&self.observer),
            )
            .await;

        self.print(ConsoleFormatter::fanout(&report), || {
            ConsoleFormatter::json(&report)
        });
        Ok(exit_code(report.failed_count() == 0))
    }

    async fn observe(&self, threads: Vec<ThreadSnapshot>) -> Result<ExitCode> {
        let use_case = self.overseer();

        if let [thread] = threads.as_slice() {
            let report = use_case
                .observe_with_observer(thread, self.observer.as_ref())
                .await;
            self.print(ConsoleFormatter::observation(&report), || {
                ConsoleFormatter::json(&report)
            });
            return Ok(exit_code(report.error.is_none()));
        }

        let reports = use_case
            .observe_batch(threads, Arc::clone(&self.observer))
            .await;
        self.print(ConsoleFormatter::observations(&reports), || {
            ConsoleFormatter::json(&reports)
        });
        Ok(exit_code(reports.values().all(|r| r.error.is_none())))
    }

    async fn rank(&self, candidates: Vec<Candidate>) -> Result<ExitCode> {
        let report = self
            .overseer()
            .rank_candidates_with_observer(&candidates, self.observer.as_ref())
            .await;
        self.print(ConsoleFormatter::ranking(&report), || {
            ConsoleFormatter::json(&report)
        });
        Ok(exit_code(report.error.is_none()))
    }

    fn overseer(&self) -> RunOverseerUseCase<ClaudeCliBackend> {
        let use_case = RunOverseerUseCase::new(Arc::clone(&self.engine));
        match self.overseer_config {
            Some(config) => use_case.with_config(config),
            None => use_case,
        }
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
