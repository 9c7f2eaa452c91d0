//! Offline reasoning provider
//!
//! Produces a decomposition with one sub-goal per available role and short
//! role-labelled worker answers built from the prompt and context. Output
//! depends only on the input, which makes runs reproducible without a model.

use async_trait::async_trait;
use brain_application::{ProviderError, ReasoningProvider};
use brain_domain::{Decomposition, PromptTemplate, WorkerRole};
use serde_json::json;

#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateProvider;

impl TemplateProvider {
    pub fn new() -> Self {
        Self
    }

    fn decompose(prompt: &str) -> String {
        let objective = PromptTemplate::extract_line(prompt, PromptTemplate::OBJECTIVE_PREFIX)
            .filter(|o| !o.is_empty())
            .unwrap_or("the objective");

        let mut roles: Vec<WorkerRole> =
            PromptTemplate::extract_line(prompt, PromptTemplate::ROLES_PREFIX)
                .map(|list| list.split(',').filter_map(WorkerRole::from_hint).collect())
                .unwrap_or_default();
        if roles.is_empty() {
            roles = WorkerRole::defaults();
        }

        let sub_goals: Vec<_> = roles
            .iter()
            .take(Decomposition::MAX_SUB_GOALS)
            .map(|role| {
                json!({
                    "description": Self::describe(role, objective),
                    "role": role.as_str(),
                })
            })
            .collect();
        serde_json::Value::Array(sub_goals).to_string()
    }

    fn describe(role: &WorkerRole, objective: &str) -> String {
        match role {
            WorkerRole::Research => format!("Research background and prior work on {}", objective),
            WorkerRole::Analysis => format!("Analyze options and trade-offs for {}", objective),
            WorkerRole::Implementation => {
                format!("Outline an implementation plan for {}", objective)
            }
            WorkerRole::Finance => format!("Estimate costs and budget for {}", objective),
            WorkerRole::Custom(name) => format!("Cover the {} perspective on {}", name, objective),
        }
    }

    fn answer(prompt: &str, context: &str) -> String {
        let role = PromptTemplate::extract_line(prompt, PromptTemplate::ROLE_PREFIX)
            .unwrap_or("Worker");
        let task = PromptTemplate::extract_line(prompt, PromptTemplate::TASK_PREFIX)
            .unwrap_or_else(|| prompt.trim());

        let mut answer = format!("{} notes on {}.", role, task);
        let facts = PromptTemplate::retrieved_facts(context);
        if !facts.is_empty() {
            answer.push_str(" Supporting facts: ");
            answer.push_str(&facts.join("; "));
            answer.push('.');
        }
        answer
    }
}

#[async_trait]
impl ReasoningProvider for TemplateProvider {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, prompt: &str, context: &str) -> Result<String, ProviderError> {
        if PromptTemplate::is_decomposition_prompt(prompt) {
            Ok(Self::decompose(prompt))
        } else {
            Ok(Self::answer(prompt, context))
        }
    }
}
