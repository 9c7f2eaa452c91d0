//! Relational store with breadth-first traversal

use super::{read, write};
use async_trait::async_trait;
use brain_application::{GraphStore, StoreError};
use brain_domain::{Entity, GraphMatch, GraphPattern, Relationship, util::term_similarity};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::RwLock;

#[derive(Default)]
struct Graph {
    /// Insertion order, for deterministic results
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    edges: Vec<Relationship>,
}

impl Graph {
    fn entity(&self, id: &str) -> Option<&Entity> {
        self.index.get(id).map(|&i| &self.entities[i])
    }

    fn outgoing<'a>(
        &'a self,
        id: &'a str,
        label: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.edges
            .iter()
            .filter(move |r| r.from == id && label.is_none_or(|l| r.label == l))
    }

    /// Every entity reachable from `start` within `max_hops`, nearest first,
    /// each with the first shortest path that reached it. `start` is excluded.
    fn reachable(
        &self,
        start: &str,
        max_hops: usize,
        label: Option<&str>,
    ) -> Vec<(String, Vec<Relationship>)> {
        let mut seen: HashSet<&str> = HashSet::from([start]);
        let mut queue: VecDeque<(&str, Vec<Relationship>)> = VecDeque::from([(start, Vec::new())]);
        let mut found = Vec::new();

        while let Some((id, path)) = queue.pop_front() {
            if path.len() >= max_hops {
                continue;
            }
            for edge in self.outgoing(id, label) {
                if seen.insert(edge.to.as_str()) {
                    let mut next = path.clone();
                    next.push(edge.clone());
                    found.push((edge.to.clone(), next.clone()));
                    queue.push_back((edge.to.as_str(), next));
                }
            }
        }
        found
    }
}

/// Entities and directed, labelled relationships held in process memory.
#[derive(Default)]
pub struct InMemoryGraphStore {
    graph: RwLock<Graph>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_count(&self) -> usize {
        read(&self.graph).entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        read(&self.graph).edges.len()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    /// Adding an entity with a known id replaces it.
    async fn add_entity(&self, entity: Entity) -> Result<(), StoreError> {
        if entity.id.trim().is_empty() {
            return Err(StoreError::Rejected("entity id cannot be empty".into()));
        }
        let mut guard = write(&self.graph);
        let graph = &mut *guard;
        match graph.index.get(&entity.id).copied() {
            Some(i) => graph.entities[i] = entity,
            None => {
                let i = graph.entities.len();
                graph.index.insert(entity.id.clone(), i);
                graph.entities.push(entity);
            }
        }
        Ok(())
    }

    async fn add_relationship(&self, relationship: Relationship) -> Result<(), StoreError> {
        let mut graph = write(&self.graph);
        for endpoint in [&relationship.from, &relationship.to] {
            if !graph.index.contains_key(endpoint) {
                return Err(StoreError::Rejected(format!("unknown entity: {}", endpoint)));
            }
        }
        if !graph.edges.contains(&relationship) {
            graph.edges.push(relationship);
        }
        Ok(())
    }

    async fn query(&self, pattern: &GraphPattern) -> Result<Vec<GraphMatch>, StoreError> {
        let graph = read(&self.graph);
        let label = pattern.relationship.as_deref();

        let seeds: Vec<&Entity> = match &pattern.start {
            Some(start) => graph.entity(start).into_iter().collect(),
            None => graph
                .entities
                .iter()
                .filter(|e| {
                    pattern
                        .keyword
                        .as_deref()
                        .is_none_or(|k| term_similarity(k, &e.searchable_text()) > 0.0)
                })
                .collect(),
        };

        let mut seen: HashSet<String> = HashSet::new();
        let mut matches = Vec::new();
        let mut push = |entity: &Entity, path: Vec<Relationship>| {
            if pattern
                .entity_kind
                .as_deref()
                .is_none_or(|kind| entity.kind == kind)
                && seen.insert(entity.id.clone())
            {
                matches.push(GraphMatch {
                    entity: entity.clone(),
                    path,
                });
            }
        };

        // A traversal reports what it reaches; a keyword query also reports its seeds.
        if pattern.start.is_none() || pattern.max_hops == 0 {
            for seed in &seeds {
                push(*seed, Vec::new());
            }
        }
        if pattern.max_hops > 0 {
            for seed in &seeds {
                for (id, path) in graph.reachable(&seed.id, pattern.max_hops, label) {
                    if let Some(entity) = graph.entity(&id) {
                        push(entity, path);
                    }
                }
            }
        }
        Ok(matches)
    }

    async fn find_path(
        &self,
        from: &str,
        to: &str,
        max_hops: usize,
    ) -> Result<Option<Vec<Relationship>>, StoreError> {
        let graph = read(&self.graph);
        if graph.entity(from).is_none() || graph.entity(to).is_none() {
            return Ok(None);
        }
        if from == to {
            return Ok(Some(Vec::new()));
        }
        Ok(graph
            .reachable(from, max_hops, None)
            .into_iter()
            .find(|(id, _)| id == to)
            .map(|(_, path)| path))
    }
}
