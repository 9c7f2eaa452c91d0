//! Relational memory value types.
//!
//! The core only needs add-entity, add-relationship and pattern queries;
//! backends decide how to evaluate a [`GraphPattern`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Text used for keyword matching: id, kind and property values.
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.id, self.kind);
        for value in self.properties.values() {
            text.push(' ');
            text.push_str(value);
        }
        text
    }
}

/// Directed, labelled edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    pub label: String,
}

impl Relationship {
    pub fn new(from: impl Into<String>, label: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label.into(),
        }
    }
}

/// Query over relational memory.
///
/// Every set field narrows the match. With `max_hops > 0` the result also
/// holds every entity reachable within that many edges from `start` (or from
/// each keyword match when no start is given), with the path that reached it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPattern {
    pub start: Option<String>,
    pub entity_kind: Option<String>,
    pub relationship: Option<String>,
    pub keyword: Option<String>,
    pub max_hops: usize,
}

impl GraphPattern {
    /// Entities whose text shares terms with `keyword`.
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    /// Entities reachable from `start` within `max_hops` edges.
    pub fn traverse(start: impl Into<String>, max_hops: usize) -> Self {
        Self {
            start: Some(start.into()),
            max_hops,
            ..Self::default()
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.entity_kind = Some(kind.into());
        self
    }

    pub fn with_relationship(mut self, label: impl Into<String>) -> Self {
        self.relationship = Some(label.into());
        self
    }
}

/// One entity matched by a pattern, with the edge path that reached it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMatch {
    pub entity: Entity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Relationship>,
}

impl GraphMatch {
    pub fn hops(&self) -> usize {
        self.path.len()
    }

    /// One-line rendering used as re-retrieval context.
    pub fn describe(&self) -> String {
        if self.path.is_empty() {
            return self.entity.searchable_text();
        }
        let chain = self
            .path
            .iter()
            .map(|r| format!("{} -{}-> {}", r.from, r.label, r.to))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} ({})", self.entity.searchable_text(), chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_searchable_text_includes_properties() {
        let entity = Entity::new("milvus", "database").with_property("note", "supports hnsw");
        assert_eq!(entity.searchable_text(), "milvus database supports hnsw");
    }

    #[test]
    fn test_describe_with_path() {
        let m = GraphMatch {
            entity: Entity::new("hnsw", "index"),
            path: vec![Relationship::new("milvus", "supports", "hnsw")],
        };
        assert_eq!(m.hops(), 1);
        assert_eq!(m.describe(), "hnsw index (milvus -supports-> hnsw)");
    }
}
