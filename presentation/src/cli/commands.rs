//! CLI command definitions

use clap::{Parser, Subcommand};
use council_domain::ExecutionPreset;
use std::path::PathBuf;

/// CLI arguments for agent-council
#[derive(Parser, Debug)]
#[command(name = "agent-council")]
#[command(author, version, about = "Agent council - Run Claude agents alone, in parallel or under an overseer")]
#[command(long_about = r#"
Agent Council runs agent definitions (Markdown files with a YAML header)
through the Claude CLI.

Commands:
  agents    List the discovered agents
  run       Run one agent on a prompt
  fanout    Run several agents on the same task concurrently
  observe   Ask the overseer whether another agent should be triggered
  rank      Ask the ranking agent which candidates are worth pursuing

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_EXECUTION__PRESET=deep)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/agent-council/config.toml   Global config

Example:
  agent-council agents
  agent-council run reviewer_a "Review the error handling in src/lib.rs"
  agent-council fanout -a reviewer_a -a reviewer_b "Is this design sound?"
  agent-council observe --number 42 --title "Crash on startup" --body "..."
  agent-council rank candidates.json
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Execution preset overriding the configured one (quick, standard, deep)
    #[arg(long, global = true, value_name = "PRESET")]
    pub preset: Option<ExecutionPreset>,

    /// Print machine-readable JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List discovered agents
    Agents,

    /// Run a single agent
    Run {
        /// Agent id (case-insensitive)
        agent: String,
        /// Prompt handed to the agent
        prompt: String,
    },

    /// Run several agents on the same task concurrently
    Fanout {
        /// Agents to run (repeat or comma-separate)
        #[arg(short, long = "agent", value_name = "AGENT", required = true, value_delimiter = ',')]
        agents: Vec<String>,
        /// Task shared by every agent
        task: String,
    },

    /// Ask the overseer whether another agent should be triggered
    Observe {
        /// JSON file holding one thread or an array of threads
        #[arg(long, value_name = "PATH", conflicts_with_all = ["number", "title"])]
        file: Option<PathBuf>,
        /// Thread number
        #[arg(long, required_unless_present = "file", requires = "title")]
        number: Option<u64>,
        /// Thread title
        #[arg(long)]
        title: Option<String>,
        /// Thread body
        #[arg(long, default_value = "")]
        body: String,
        /// Discussion so far
        #[arg(long, default_value = "")]
        comments: String,
    },

    /// Rank candidates from a JSON file
    Rank {
        /// JSON array of candidates (title, summary, url, details)
        file: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fanout_agents() {
        let cli = Cli::parse_from([
            "agent-council",
            "fanout",
            "-a",
            "reviewer_a,reviewer_b",
            "--agent",
            "moderator",
            "Check this",
        ]);
        match cli.command {
            Some(Command::Fanout { agents, task }) => {
                assert_eq!(agents, vec!["reviewer_a", "reviewer_b", "moderator"]);
                assert_eq!(task, "Check this");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "agent-council",
            "run",
            "reviewer_a",
            "hello",
            "--preset",
            "deep",
            "-vv",
            "--json",
        ]);
        assert_eq!(cli.preset, Some(ExecutionPreset::Deep));
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
    }

    #[test]
    fn test_observe_requires_file_or_number() {
        assert!(Cli::try_parse_from(["agent-council", "observe"]).is_err());
        assert!(
            Cli::try_parse_from(["agent-council", "observe", "--number", "3"]).is_err(),
            "--number without --title must be rejected"
        );
        let cli = Cli::try_parse_from([
            "agent-council",
            "observe",
            "--number",
            "3",
            "--title",
            "Bug",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Observe { number: Some(3), .. })
        ));
    }

    #[test]
    fn test_invalid_preset_rejected() {
        assert!(Cli::try_parse_from(["agent-council", "--preset", "huge", "agents"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
