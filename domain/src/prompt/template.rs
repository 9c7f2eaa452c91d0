//! Prompt templates for the objective pipeline

use crate::orchestration::role::WorkerRole;
use crate::orchestration::value_objects::Decomposition;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// First line of every decomposition prompt.
    pub const DECOMPOSITION_HEADER: &'static str = "Decompose the following objective";

    /// Line prefix carrying the objective text inside a decomposition prompt.
    pub const OBJECTIVE_PREFIX: &'static str = "Objective: ";

    /// Line prefix carrying the worker role inside a worker prompt.
    pub const ROLE_PREFIX: &'static str = "Role: ";

    /// Line prefix carrying the instruction inside a worker prompt.
    pub const TASK_PREFIX: &'static str = "Task: ";

    /// Line prefix listing the roles inside a decomposition prompt.
    pub const ROLES_PREFIX: &'static str = "Available roles: ";

    /// Header of the fact list appended by [`Self::re_retrieval_context`].
    pub const FACTS_HEADER: &'static str = "Retrieved facts:";

    const NO_FACTS: &'static str = "(none found)";

    /// System prompt for objective decomposition
    pub fn decomposition_system() -> &'static str {
        r#"You are the orchestrator of a team of specialized workers.
Break objectives into concrete, independent sub-goals.
Each sub-goal must be actionable by a single worker role."#
    }

    /// User prompt for objective decomposition
    pub fn decomposition_prompt(objective: &str, roles: &[WorkerRole]) -> String {
        let role_list = roles
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            r#"{header} into 3 to 5 sub-goals.

{prefix}{objective}

{roles_prefix}{role_list}

Respond with a JSON array only:
[{{"description": "...", "role": "..."}}]"#,
            header = Self::DECOMPOSITION_HEADER,
            prefix = Self::OBJECTIVE_PREFIX,
            roles_prefix = Self::ROLES_PREFIX,
        )
    }

    /// Whether `prompt` was produced by [`PromptTemplate::decomposition_prompt`].
    pub fn is_decomposition_prompt(prompt: &str) -> bool {
        prompt.starts_with(Self::DECOMPOSITION_HEADER)
    }

    /// Recover a labelled line (e.g. [`Self::OBJECTIVE_PREFIX`]) from a prompt.
    pub fn extract_line<'a>(prompt: &'a str, prefix: &str) -> Option<&'a str> {
        prompt
            .lines()
            .find_map(|line| line.strip_prefix(prefix))
            .map(str::trim)
    }

    /// System prompt for a worker of the given role
    pub fn worker_system(role: &WorkerRole) -> String {
        format!(
            "You are a {} specialist. Answer only from the supplied context when it is relevant, and say so when it is not.",
            role.as_str().to_lowercase()
        )
    }

    /// User prompt for one routed sub-goal
    pub fn worker_prompt(role: &WorkerRole, instruction: &str) -> String {
        format!(
            "{system}\n\n{prefix}{role}\n{task}{instruction}",
            system = Self::worker_system(role),
            prefix = Self::ROLE_PREFIX,
            task = Self::TASK_PREFIX,
        )
    }

    /// Instruction for one sub-goal, carrying the objective it belongs to
    pub fn instruction(decomposition: &Decomposition, index: usize) -> Option<String> {
        decomposition.sub_goal(index).map(|goal| {
            format!(
                "{} (part {} of {} for: {})",
                goal.description,
                index + 1,
                decomposition.len(),
                decomposition.objective
            )
        })
    }

    /// Context for a second attempt after re-retrieval.
    pub fn re_retrieval_context(original: &str, retrieved: &[String]) -> String {
        let mut context = String::new();
        if !original.trim().is_empty() {
            context.push_str(original.trim());
            context.push_str("\n\n");
        }
        context.push_str(Self::FACTS_HEADER);
        context.push('\n');
        if retrieved.is_empty() {
            context.push_str("- ");
            context.push_str(Self::NO_FACTS);
        } else {
            let facts = retrieved
                .iter()
                .map(|fact| format!("- {}", fact))
                .collect::<Vec<_>>()
                .join("\n");
            context.push_str(&facts);
        }
        context
    }

    /// Facts listed in a context built by [`Self::re_retrieval_context`].
    pub fn retrieved_facts(context: &str) -> Vec<&str> {
        let Some((_, list)) = context.split_once(Self::FACTS_HEADER) else {
            return Vec::new();
        };
        list.lines()
            .filter_map(|line| line.strip_prefix("- "))
            .map(str::trim)
            .filter(|fact| *fact != Self::NO_FACTS)
            .collect()
    }
}
