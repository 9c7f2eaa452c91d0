//! Worker roles and deterministic sub-goal routing.

use serde::{Deserialize, Serialize};

/// Specialization of a worker agent.
///
/// The four built-in roles cover the default pool. Deployments may configure
/// additional roles; those are carried as [`WorkerRole::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum WorkerRole {
    Research,
    Analysis,
    Implementation,
    Finance,
    Custom(String),
}

impl WorkerRole {
    /// The roles a pool is created with when nothing is configured.
    pub fn defaults() -> Vec<WorkerRole> {
        vec![
            WorkerRole::Research,
            WorkerRole::Analysis,
            WorkerRole::Implementation,
            WorkerRole::Finance,
        ]
    }

    pub fn as_str(&self) -> &str {
        match self {
            WorkerRole::Research => "Research",
            WorkerRole::Analysis => "Analysis",
            WorkerRole::Implementation => "Implementation",
            WorkerRole::Finance => "Finance",
            WorkerRole::Custom(name) => name,
        }
    }

    /// Lowercase identifier-safe form used in agent ids: runs of anything
    /// other than ASCII letters and digits become a single `-`.
    pub fn slug(&self) -> String {
        let mut slug = String::new();
        for c in self.as_str().chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.is_empty() && !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let trimmed = slug.trim_end_matches('-');
        if trimmed.is_empty() {
            "worker".to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Parse a role hint. Built-in names match case-insensitively; any other
    /// non-empty hint becomes a custom role. Blank hints yield `None`.
    pub fn from_hint(hint: &str) -> Option<WorkerRole> {
        let trimmed = hint.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.to_lowercase().as_str() {
            "research" => WorkerRole::Research,
            "analysis" => WorkerRole::Analysis,
            "implementation" => WorkerRole::Implementation,
            "finance" => WorkerRole::Finance,
            _ => WorkerRole::Custom(trimmed.to_string()),
        })
    }

    /// Route a sub-goal to one of the roles in `roster`.
    ///
    /// A hint naming a roster role wins. Otherwise the description is matched
    /// against keywords for the roster's built-in roles, then against the
    /// names of its custom roles, and finally falls back to the first roster
    /// role. An empty roster routes over the built-in roles with
    /// [`WorkerRole::Research`] as the fallback. The result depends only on
    /// the inputs.
    pub fn route(hint: Option<&str>, description: &str, roster: &[WorkerRole]) -> WorkerRole {
        if let Some(hinted) = hint.and_then(WorkerRole::from_hint) {
            if roster.is_empty() {
                return hinted;
            }
            if let Some(role) = roster
                .iter()
                .find(|role| role.as_str().eq_ignore_ascii_case(hinted.as_str()))
            {
                return role.clone();
            }
        }

        let staffed = |role: &WorkerRole| roster.is_empty() || roster.contains(role);

        let text = description.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));
        let keywords: [(WorkerRole, &[&str]); 4] = [
            (WorkerRole::Research, &["research", "find"]),
            (WorkerRole::Analysis, &["analyze", "analyse", "compare"]),
            (WorkerRole::Implementation, &["implement", "build"]),
            (WorkerRole::Finance, &["finance", "cost"]),
        ];
        if let Some((role, _)) = keywords
            .into_iter()
            .find(|(role, words)| staffed(role) && mentions(*words))
        {
            return role;
        }

        if let Some(role) = roster.iter().find(|role| {
            matches!(role, WorkerRole::Custom(name) if text.contains(&name.to_lowercase()))
        }) {
            return role.clone();
        }

        roster.first().cloned().unwrap_or(WorkerRole::Research)
    }
}

impl std::fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkerRole::from_hint(s).ok_or_else(|| "role name cannot be empty".to_string())
    }
}

impl From<WorkerRole> for String {
    fn from(role: WorkerRole) -> Self {
        role.as_str().to_string()
    }
}

impl From<String> for WorkerRole {
    fn from(s: String) -> Self {
        WorkerRole::from_hint(&s).unwrap_or(WorkerRole::Research)
    }
}
