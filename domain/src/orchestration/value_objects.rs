//! Orchestration value objects - immutable results of decomposition.
//!
//! - [`SubGoal`] - One routed unit of an objective
//! - [`Decomposition`] - The ordered sub-goals plus how they were obtained
//! - [`DecompositionKind`] - Which branch of the count policy applied

use crate::core::ids::ObjectiveId;
use crate::orchestration::decomposition_parser::DraftSubGoal;
use crate::orchestration::entities::Objective;
use crate::orchestration::role::WorkerRole;
use serde::{Deserialize, Serialize};

/// One decomposed unit of an objective, routed to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGoal {
    pub index: usize,
    pub description: String,
    pub role: WorkerRole,
}

/// How the sub-goal list of a [`Decomposition`] came about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecompositionKind {
    /// Provider returned between `MIN_SUB_GOALS` and `MAX_SUB_GOALS` sub-goals.
    Standard,
    /// Provider returned too many; the surplus is kept here for the record.
    Truncated { dropped: Vec<String> },
    /// Provider explicitly returned fewer than `MIN_SUB_GOALS`; collapsed into one task.
    Degenerate { returned: usize },
    /// Provider output could not be parsed; the built-in template was used.
    TemplateFallback,
}

/// Ordered sub-goals derived from one objective. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decomposition {
    pub objective_id: ObjectiveId,
    pub objective: String,
    pub sub_goals: Vec<SubGoal>,
    pub kind: DecompositionKind,
}

impl Decomposition {
    /// Fewest sub-goals a regular decomposition may have.
    pub const MIN_SUB_GOALS: usize = 3;
    /// Most sub-goals a decomposition may have.
    pub const MAX_SUB_GOALS: usize = 5;

    /// Apply the count policy to the drafts parsed from provider output.
    ///
    /// | drafts | result |
    /// |--------|--------|
    /// | 0 (unparseable) | template fallback, 5 sub-goals |
    /// | 1-2 | one degenerate sub-goal |
    /// | 3-5 | kept as-is |
    /// | 6+ | first 5 kept, rest recorded in `Truncated` |
    ///
    /// Every sub-goal is routed to a role of `roster` (see [`WorkerRole::route`]).
    pub fn from_drafts(
        objective: &Objective,
        drafts: Vec<DraftSubGoal>,
        roster: &[WorkerRole],
    ) -> Self {
        let count = drafts.len();
        let (drafts, kind) = match count {
            0 => (
                Self::template_drafts(&objective.content),
                DecompositionKind::TemplateFallback,
            ),
            n if n < Self::MIN_SUB_GOALS => {
                let description = drafts
                    .iter()
                    .map(|d| d.description.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                let role_hint = drafts.first().and_then(|d| d.role_hint.clone());
                (
                    vec![DraftSubGoal {
                        description,
                        role_hint,
                    }],
                    DecompositionKind::Degenerate { returned: n },
                )
            }
            n if n <= Self::MAX_SUB_GOALS => (drafts, DecompositionKind::Standard),
            _ => {
                let mut kept = drafts;
                let dropped = kept
                    .split_off(Self::MAX_SUB_GOALS)
                    .into_iter()
                    .map(|d| d.description)
                    .collect();
                (kept, DecompositionKind::Truncated { dropped })
            }
        };

        let sub_goals = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| SubGoal {
                index,
                role: WorkerRole::route(draft.role_hint.as_deref(), &draft.description, roster),
                description: draft.description,
            })
            .collect();

        Self {
            objective_id: objective.id.clone(),
            objective: objective.content.clone(),
            sub_goals,
            kind,
        }
    }

    /// Five-step plan used when the provider gives nothing usable.
    pub fn template_drafts(objective: &str) -> Vec<DraftSubGoal> {
        [
            ("Research requirements for", "Research"),
            ("Design architecture for", "Analysis"),
            ("Create implementation plan for", "Implementation"),
            ("Develop and test", "Implementation"),
            ("Document and deploy", "Research"),
        ]
        .into_iter()
        .map(|(step, role)| DraftSubGoal {
            description: format!("{}: {}", step, objective),
            role_hint: Some(role.to_string()),
        })
        .collect()
    }

    pub fn len(&self) -> usize {
        self.sub_goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sub_goals.is_empty()
    }

    pub fn sub_goal(&self, index: usize) -> Option<&SubGoal> {
        self.sub_goals.get(index)
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self.kind, DecompositionKind::Degenerate { .. })
    }
}
