use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};

/// Directed data-flow edge between two entities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(EntityId, EntityId)", into = "(EntityId, EntityId)")]
pub struct Edge {
    pub from: EntityId,
    pub to: EntityId,
}

impl Edge {
    pub fn new(from: impl Into<EntityId>, to: impl Into<EntityId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl From<(EntityId, EntityId)> for Edge {
    fn from((from, to): (EntityId, EntityId)) -> Self {
        Self { from, to }
    }
}

impl From<Edge> for (EntityId, EntityId) {
    fn from(edge: Edge) -> Self {
        (edge.from, edge.to)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Declarative program: entity registry plus workflow edges
///
/// Built once by value; compiling or experimenting never mutates it.
///
/// # Example
/// ```rust,ignore
/// let topology = Topology::new()
///     .with_entity("orders", Entity::source(TopicConfig::new("orders")))
///     .with_entity("large", Entity::stream(large_orders))
///     .with_entity("alerts", Entity::sink(TopicConfig::new("alerts")))
///     .with_edge("orders", "large")
///     .with_edge("large", "alerts");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Topology {
    entities: BTreeMap<EntityId, Entity>,
    workflow: Vec<Edge>,
    /// Membership index over `workflow`
    edge_set: HashSet<Edge>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parts; duplicate edges collapse to their first occurrence
    pub fn from_parts(
        entities: impl IntoIterator<Item = (EntityId, Entity)>,
        workflow: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let topology = Self {
            entities: entities.into_iter().collect(),
            ..Self::default()
        };
        workflow
            .into_iter()
            .fold(topology, |acc, edge| acc.with_edge(edge.from, edge.to))
    }

    /// Add (or replace) an entity
    pub fn with_entity(mut self, id: impl Into<EntityId>, entity: Entity) -> Self {
        self.entities.insert(id.into(), entity);
        self
    }

    /// Append an edge, keeping the workflow an ordered set
    pub fn with_edge(mut self, from: impl Into<EntityId>, to: impl Into<EntityId>) -> Self {
        let edge = Edge::new(from, to);
        if self.edge_set.insert(edge.clone()) {
            self.workflow.push(edge);
        }
        self
    }

    pub fn entities(&self) -> &BTreeMap<EntityId, Entity> {
        &self.entities
    }

    pub fn workflow(&self) -> &[Edge] {
        &self.workflow
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Incoming edges of `id`, in declaration order
    pub fn incoming<'a>(&'a self, id: &'a EntityId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.workflow.iter().filter(move |edge| &edge.to == id)
    }
}
