//! Index-based workflow graph and the execution order derived from it.
//!
//! Entities live in an arena (`Vec<EntityId>`, ordered by id) and edges are
//! adjacency lists of arena indices, so traversal never needs references
//! between entities.

use std::collections::{HashMap, HashSet, VecDeque};

use super::error::ValidationError;
use crate::domain::{EntityConfig, EntityId, EntityKind, Topology};

/// Adjacency view of a topology's workflow
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    ids: Vec<EntityId>,
    kinds: Vec<EntityKind>,
    index: HashMap<EntityId, usize>,
    /// Upstream indices per node, in edge declaration order
    incoming: Vec<Vec<usize>>,
    /// Downstream indices per node, in edge declaration order
    outgoing: Vec<Vec<usize>>,
}

impl WorkflowGraph {
    /// Build the graph, rejecting edges whose endpoints are not registered
    pub fn build(topology: &Topology) -> Result<Self, ValidationError> {
        let ids: Vec<EntityId> = topology.entities().keys().cloned().collect();
        let kinds = topology.entities().values().map(|e| e.kind).collect();
        let index: HashMap<EntityId, usize> =
            ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();

        let mut incoming = vec![Vec::new(); ids.len()];
        let mut outgoing = vec![Vec::new(); ids.len()];

        for edge in topology.workflow() {
            let lookup = |id: &EntityId| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| ValidationError::UnknownEntity {
                        id: id.clone(),
                        edge: edge.clone(),
                    })
            };
            let from = lookup(&edge.from)?;
            let to = lookup(&edge.to)?;
            outgoing[from].push(to);
            incoming[to].push(from);
        }

        Ok(Self {
            ids,
            kinds,
            index,
            incoming,
            outgoing,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, node: usize) -> &EntityId {
        &self.ids[node]
    }

    pub fn kind(&self, node: usize) -> EntityKind {
        self.kinds[node]
    }

    pub fn index_of(&self, id: &EntityId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn upstreams(&self, node: usize) -> &[usize] {
        &self.incoming[node]
    }

    pub fn downstreams(&self, node: usize) -> &[usize] {
        &self.outgoing[node]
    }

    /// Kahn's algorithm; ties resolve by arena index for a stable order
    ///
    /// When nodes remain unordered the graph has a cycle, which is recovered
    /// and returned as a closed path.
    pub fn topological_order(&self) -> Result<Vec<usize>, ValidationError> {
        let mut in_degree: Vec<usize> = self.incoming.iter().map(Vec::len).collect();
        let mut queue: VecDeque<usize> = (0..self.len()).filter(|&n| in_degree[n] == 0).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &next in &self.outgoing[node] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() < self.len() {
            let ordered: HashSet<usize> = order.into_iter().collect();
            return Err(ValidationError::CycleDetected(self.find_cycle(&ordered)));
        }

        Ok(order)
    }

    /// Recover one cycle among the nodes Kahn could not order
    ///
    /// Every unordered node keeps an unordered predecessor, so walking
    /// predecessors must revisit a node.
    fn find_cycle(&self, ordered: &HashSet<usize>) -> Vec<EntityId> {
        let Some(start) = (0..self.len()).find(|n| !ordered.contains(n)) else {
            return Vec::new();
        };

        let mut walk = vec![start];
        let mut seen: HashMap<usize, usize> = HashMap::from([(start, 0)]);
        let mut current = start;

        loop {
            let Some(&prev) = self.incoming[current]
                .iter()
                .find(|&&p| !ordered.contains(&p))
            else {
                return Vec::new();
            };

            if let Some(&pos) = seen.get(&prev) {
                let mut cycle: Vec<usize> = walk[pos..].to_vec();
                cycle.push(prev);
                cycle.reverse();
                return cycle.into_iter().map(|n| self.ids[n].clone()).collect();
            }

            seen.insert(prev, walk.len());
            walk.push(prev);
            current = prev;
        }
    }
}

/// Validated graph plus the order in which entities get wired
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    graph: WorkflowGraph,
    order: Vec<usize>,
}

impl ExecutionPlan {
    /// Validate a topology and derive its execution order
    ///
    /// Checks run in order: referential integrity, acyclicity, then
    /// kind-specific constraints.
    pub fn new(topology: &Topology) -> Result<Self, ValidationError> {
        let graph = WorkflowGraph::build(topology)?;
        let order = graph.topological_order()?;
        check_entity_kinds(topology, &graph)?;
        Ok(Self { graph, order })
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// Arena indices in dependency order
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Entity ids in dependency order
    pub fn ordered_ids(&self) -> impl Iterator<Item = &EntityId> + '_ {
        self.order.iter().map(|&n| self.graph.id(n))
    }
}

fn check_entity_kinds(topology: &Topology, graph: &WorkflowGraph) -> Result<(), ValidationError> {
    for (node, (id, entity)) in topology.entities().iter().enumerate() {
        let invalid = |reason: String| ValidationError::InvalidEntityKind {
            id: id.clone(),
            reason,
        };

        match (entity.kind, &entity.config) {
            (EntityKind::SinkTopic, EntityConfig::Stream(_)) => {
                return Err(invalid("sink-topic must not carry a pipeline".to_string()));
            }
            (EntityKind::SourceTopic, EntityConfig::Stream(_)) => {
                return Err(invalid("source-topic must not carry a pipeline".to_string()));
            }
            (EntityKind::ProcessingStream, EntityConfig::Topic(_)) => {
                return Err(invalid("processing-stream requires a pipeline, not a topic".to_string()));
            }
            _ => {}
        }

        match entity.kind {
            EntityKind::SourceTopic => {
                if let Some(&upstream) = graph.upstreams(node).first() {
                    return Err(invalid(format!(
                        "source-topic cannot have incoming edge from `{}`",
                        graph.id(upstream)
                    )));
                }
            }
            EntityKind::SinkTopic => {
                if let Some(&downstream) = graph.downstreams(node).first() {
                    return Err(invalid(format!(
                        "sink-topic is terminal but feeds `{}`",
                        graph.id(downstream)
                    )));
                }
            }
            EntityKind::ProcessingStream => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Entity, TopicConfig};
    use crate::transform::Pipeline;

    fn source(id: &str) -> Entity {
        Entity::source(TopicConfig::new(id))
    }

    fn sink(id: &str) -> Entity {
        Entity::sink(TopicConfig::new(id))
    }

    fn stream() -> Entity {
        Entity::stream(Pipeline::identity())
    }

    fn position(plan: &ExecutionPlan, id: &str) -> usize {
        plan.ordered_ids().position(|e| e.as_str() == id).unwrap()
    }

    #[test]
    fn orders_dependencies_first() {
        let topology = Topology::new()
            .with_entity("a", source("a"))
            .with_entity("b", source("b"))
            .with_entity("m", stream())
            .with_entity("n", stream())
            .with_entity("out", sink("out"))
            .with_edge("n", "out")
            .with_edge("m", "n")
            .with_edge("a", "m")
            .with_edge("b", "n");

        let plan = ExecutionPlan::new(&topology).unwrap();

        assert_eq!(plan.order().len(), 5);
        assert!(position(&plan, "a") < position(&plan, "m"));
        assert!(position(&plan, "m") < position(&plan, "n"));
        assert!(position(&plan, "b") < position(&plan, "n"));
        assert!(position(&plan, "n") < position(&plan, "out"));
    }

    #[test]
    fn upstreams_follow_declaration_order() {
        let topology = Topology::new()
            .with_entity("a", source("a"))
            .with_entity("z", source("z"))
            .with_entity("out", sink("out"))
            .with_edge("z", "out")
            .with_edge("a", "out");

        let graph = WorkflowGraph::build(&topology).unwrap();
        let out = graph.index_of(&"out".into()).unwrap();
        let names: Vec<_> = graph
            .upstreams(out)
            .iter()
            .map(|&n| graph.id(n).as_str())
            .collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn two_node_cycle_reports_both() {
        let topology = Topology::new()
            .with_entity("A", stream())
            .with_entity("B", stream())
            .with_edge("A", "B")
            .with_edge("B", "A");

        let err = ExecutionPlan::new(&topology).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CycleDetected(vec!["A".into(), "B".into(), "A".into()])
        );
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let topology = Topology::new().with_entity("A", stream()).with_edge("A", "A");
        let err = ExecutionPlan::new(&topology).unwrap_err();
        assert_eq!(err, ValidationError::CycleDetected(vec!["A".into(), "A".into()]));
    }

    #[test]
    fn cycle_behind_acyclic_prefix_is_found() {
        let topology = Topology::new()
            .with_entity("in", source("in"))
            .with_entity("p", stream())
            .with_entity("q", stream())
            .with_entity("r", stream())
            .with_entity("tail", stream())
            .with_edge("in", "p")
            .with_edge("p", "q")
            .with_edge("q", "r")
            .with_edge("r", "p")
            .with_edge("r", "tail");

        let Err(ValidationError::CycleDetected(path)) = ExecutionPlan::new(&topology) else {
            panic!("expected cycle");
        };
        assert_eq!(path.first(), path.last());
        for id in ["p", "q", "r"] {
            assert!(path.contains(&id.into()), "{id} missing from {path:?}");
        }
        assert!(!path.contains(&"tail".into()));
        assert!(!path.contains(&"in".into()));
    }

    #[test]
    fn unknown_target_is_reported_with_edge() {
        let topology = Topology::new().with_entity("A", source("A")).with_edge("A", "missing");
        let err = WorkflowGraph::build(&topology).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownEntity {
                id: "missing".into(),
                edge: crate::domain::Edge::new("A", "missing"),
            }
        );
    }

    #[test]
    fn source_with_incoming_edge_is_invalid() {
        let topology = Topology::new()
            .with_entity("a", source("a"))
            .with_entity("b", source("b"))
            .with_edge("a", "b");

        let err = ExecutionPlan::new(&topology).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidEntityKind { ref id, .. } if id.as_str() == "b"
        ));
    }

    #[test]
    fn sink_with_pipeline_is_invalid() {
        let topology = Topology::new().with_entity(
            "out",
            Entity::new(EntityKind::SinkTopic, EntityConfig::Stream(Pipeline::new())),
        );
        let err = ExecutionPlan::new(&topology).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidEntityKind {
                id: "out".into(),
                reason: "sink-topic must not carry a pipeline".to_string(),
            }
        );
    }

    #[test]
    fn sink_feeding_downstream_is_invalid() {
        let topology = Topology::new()
            .with_entity("out", sink("out"))
            .with_entity("s", stream())
            .with_edge("out", "s");
        let err = ExecutionPlan::new(&topology).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidEntityKind { .. }));
    }

    #[test]
    fn stream_configured_as_topic_is_invalid() {
        let topology = Topology::new().with_entity(
            "s",
            Entity::new(
                EntityKind::ProcessingStream,
                EntityConfig::Topic(TopicConfig::new("s")),
            ),
        );
        assert!(matches!(
            ExecutionPlan::new(&topology),
            Err(ValidationError::InvalidEntityKind { .. })
        ));
    }

    #[test]
    fn unknown_entity_checked_before_cycles() {
        let topology = Topology::new()
            .with_entity("A", stream())
            .with_edge("A", "A")
            .with_edge("A", "ghost");
        assert!(matches!(
            ExecutionPlan::new(&topology),
            Err(ValidationError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn empty_topology_has_empty_plan() {
        let plan = ExecutionPlan::new(&Topology::new()).unwrap();
        assert!(plan.order().is_empty());
        assert!(plan.graph().is_empty());
    }
}
