//! Decomposition parsing from reasoning-provider responses.
//!
//! Extracts [`DraftSubGoal`]s from provider text. Supported shapes, tried in
//! order:
//!
//! 1. Fenced code block (` ```json ` or bare ` ``` `) containing JSON
//! 2. Raw JSON (the entire response is valid JSON)
//! 3. A numbered or bulleted list, one sub-goal per item
//!
//! JSON may be an array of strings, an array of objects with
//! `description` and optional `role`, or an object holding such an array
//! under `sub_goals`. Nothing here enforces the 3..=5 count policy; that is
//! [`Decomposition::from_drafts`](super::value_objects::Decomposition::from_drafts).

use crate::orchestration::role::WorkerRole;
use serde_json::Value;

/// A sub-goal as the provider described it, before routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSubGoal {
    pub description: String,
    pub role_hint: Option<String>,
}

impl DraftSubGoal {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            role_hint: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role_hint = Some(role.into());
        self
    }
}

/// Parse provider text into draft sub-goals. Returns an empty list when no
/// recognizable structure is found.
pub fn parse_decomposition(response: &str) -> Vec<DraftSubGoal> {
    if let Some(block) = fenced_block(response)
        && let Ok(json) = serde_json::from_str::<Value>(&block)
    {
        return parse_decomposition_json(&json);
    }

    if let Ok(json) = serde_json::from_str::<Value>(response.trim()) {
        return parse_decomposition_json(&json);
    }

    parse_list(response)
}

/// Parse drafts from an already-decoded JSON value.
pub fn parse_decomposition_json(json: &Value) -> Vec<DraftSubGoal> {
    let items = match json {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("sub_goals").and_then(Value::as_array) {
            Some(items) => items,
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items.iter().filter_map(draft_from_json).collect()
}

fn draft_from_json(item: &Value) -> Option<DraftSubGoal> {
    match item {
        Value::String(s) if !s.trim().is_empty() => Some(DraftSubGoal::new(s.trim())),
        Value::Object(map) => {
            let description = ["description", "goal", "task"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str))
                .map(str::trim)
                .filter(|s| !s.is_empty())?;
            let role_hint = map
                .get("role")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            Some(DraftSubGoal {
                description: description.to_string(),
                role_hint,
            })
        }
        _ => None,
    }
}

fn fenced_block(response: &str) -> Option<String> {
    let mut in_block = false;
    let mut block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();
        if !in_block && (trimmed == "```" || trimmed == "```json") {
            in_block = true;
            block.clear();
        } else if in_block && trimmed == "```" {
            return Some(block);
        } else if in_block {
            block.push_str(line);
            block.push('\n');
        }
    }
    None
}

fn parse_list(response: &str) -> Vec<DraftSubGoal> {
    response
        .lines()
        .filter_map(|line| strip_list_marker(line.trim()))
        .filter(|item| !item.is_empty())
        .map(split_role_prefix)
        .collect()
}

fn strip_list_marker(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Some(rest.trim());
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .map(str::trim)
}

/// `[Role] text` accepts any role name; `Role: text` only built-in names,
/// so that ordinary prose containing a colon is left intact.
fn split_role_prefix(item: &str) -> DraftSubGoal {
    if let Some(rest) = item.strip_prefix('[')
        && let Some((role, text)) = rest.split_once(']')
        && !role.trim().is_empty()
    {
        return DraftSubGoal::new(text.trim()).with_role(role.trim());
    }

    if let Some((head, text)) = item.split_once(':')
        && let Some(role) = WorkerRole::from_hint(head)
        && !matches!(role, WorkerRole::Custom(_))
    {
        return DraftSubGoal::new(text.trim()).with_role(role.as_str());
    }

    DraftSubGoal::new(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_string_array() {
        let drafts = parse_decomposition(r#"["Research options", "Compare them", "Build it"]"#);
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0], DraftSubGoal::new("Research options"));
        assert!(drafts.iter().all(|d| d.role_hint.is_none()));
    }

    #[test]
    fn test_parse_fenced_objects_with_roles() {
        let response = r#"
Here is the breakdown:

```json
[
  {"description": "Survey vector databases", "role": "Research"},
  {"description": "Estimate hosting cost", "role": "Finance"},
  {"description": "Prototype ingestion", "role": "Implementation"}
]
```
"#;
        let drafts = parse_decomposition(response);
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[1].role_hint.as_deref(), Some("Finance"));
        assert_eq!(drafts[2].description, "Prototype ingestion");
    }

    #[test]
    fn test_parse_wrapped_object() {
        let drafts = parse_decomposition(r#"{"sub_goals": ["a task", {"goal": "b task"}]}"#);
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].description, "b task");
    }

    #[test]
    fn test_parse_numbered_list_with_role_prefixes() {
        let response = "1. [Research] Find prior art\n2) Analysis: Compare latency\n3. Ship: the thing\n- plain bullet";
        let drafts = parse_decomposition(response);
        assert_eq!(drafts.len(), 4);
        assert_eq!(drafts[0].role_hint.as_deref(), Some("Research"));
        assert_eq!(drafts[0].description, "Find prior art");
        assert_eq!(drafts[1].role_hint.as_deref(), Some("Analysis"));
        // Unknown `Word:` prefixes stay part of the description
        assert_eq!(drafts[2].role_hint, None);
        assert_eq!(drafts[2].description, "Ship: the thing");
        assert_eq!(drafts[3].description, "plain bullet");
    }

    #[test]
    fn test_prose_returns_empty() {
        assert!(parse_decomposition("I cannot help with that.").is_empty());
        assert!(parse_decomposition("").is_empty());
    }

    #[test]
    fn test_blank_entries_skipped() {
        let drafts = parse_decomposition(r#"["one", "  ", {"description": ""}, "two"]"#);
        assert_eq!(drafts.len(), 2);
    }
}
