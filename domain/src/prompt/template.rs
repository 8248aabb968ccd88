//! Prompt templates for fan-out, overseer and ranking runs

use crate::decision::entities::{Candidate, ThreadSnapshot};

/// Placeholder replaced by each agent's id in a fan-out task.
pub const AGENT_PLACEHOLDER: &str = "{agent}";

const TASK_SECTION: &str = "__TASK_SECTION__";
const THREAD_NUMBER: &str = "__THREAD_NUMBER__";
const THREAD_TITLE: &str = "__THREAD_TITLE__";
const THREAD_BODY: &str = "__THREAD_BODY__";
const COMMENTS: &str = "__COMMENTS__";
const AGENT_MATRIX: &str = "__AGENT_MATRIX__";
const CANDIDATES: &str = "__CANDIDATES__";

const NO_CONTENT: &str = "(no content)";
const NO_COMMENTS: &str = "(no comments)";

/// Templates for generating prompts
pub struct PromptTemplate;

impl PromptTemplate {
    /// Frame a shared task for one agent of a fan-out batch.
    ///
    /// Every agent gets the same task text; only the `{agent}` placeholder
    /// and the reply prefix differ.
    pub fn fanout_task(task: &str, agent_id: &str) -> String {
        let task = task.replace(AGENT_PLACEHOLDER, agent_id);
        format!(
            r#"## Current task

{task}

---

**Output requirements**:
- Prefix your reply with [Agent: {agent_id}]
- Stay focused on the topic under discussion"#
        )
    }

    /// Task section inserted where overseer instructions say `__TASK_SECTION__`.
    pub fn overseer_task_section() -> &'static str {
        r#"Analyze the following thread and decide whether another agent should be triggered:

**Thread number**: __THREAD_NUMBER__

**Title**: __THREAD_TITLE__

**Body**:
__THREAD_BODY__

**Comments**:
__COMMENTS__"#
    }

    /// Build the overseer prompt from its instructions, the thread and the
    /// agent summary table.
    ///
    /// When the instructions carry no `__AGENT_MATRIX__` placeholder the table
    /// is appended under its own heading.
    pub fn overseer_prompt(instructions: &str, thread: &ThreadSnapshot, agent_matrix: &str) -> String {
        let mut prompt = instructions.replace(TASK_SECTION, Self::overseer_task_section());

        prompt = prompt
            .replace(THREAD_NUMBER, &thread.number.to_string())
            .replace(THREAD_TITLE, &thread.title)
            .replace(THREAD_BODY, or_placeholder(&thread.body, NO_CONTENT))
            .replace(COMMENTS, or_placeholder(&thread.comments, NO_COMMENTS));

        if prompt.contains(AGENT_MATRIX) {
            prompt.replace(AGENT_MATRIX, agent_matrix)
        } else {
            format!("{}\n\n## Available agents\n\n{}", prompt.trim_end(), agent_matrix)
        }
    }

    /// Render numbered candidates for the ranking agent.
    pub fn candidate_list(candidates: &[Candidate]) -> String {
        let mut out = String::from("## Candidates\n");
        for (i, candidate) in candidates.iter().enumerate() {
            out.push_str(&format!("\n### Candidate {}\n", i));
            out.push_str(&format!("**Title**: {}\n", candidate.title));
            if !candidate.url.is_empty() {
                out.push_str(&format!("**Link**: {}\n", candidate.url));
            }
            for (label, value) in &candidate.details {
                out.push_str(&format!("**{}**: {}\n", label, value));
            }
            out.push_str(&format!("**Summary**: {}\n", candidate.summary));
        }
        out
    }

    /// Build the ranking prompt; candidates replace `__CANDIDATES__` or are
    /// appended together with the expected reply format.
    pub fn ranking_prompt(instructions: &str, candidates: &[Candidate]) -> String {
        let list = Self::candidate_list(candidates);
        if instructions.contains(CANDIDATES) {
            return instructions.replace(CANDIDATES, &list);
        }
        format!(
            r#"{}

{}
Reply with YAML in this shape, using the candidate numbers above:

```yaml
recommended:
  - index: 0
    reason: why it is worth discussing
    summary: one-paragraph summary
```"#,
            instructions.trim_end(),
            list
        )
    }
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.trim().is_empty() { placeholder } else { text }
}
