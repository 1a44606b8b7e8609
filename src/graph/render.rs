use crate::domain::{EntityConfig, EntityKind, Topology};

/// Render a topology as a Graphviz DOT digraph
pub fn render_dot(topology: &Topology) -> String {
    let mut dot = String::from("digraph topology {\n    rankdir=LR;\n");

    for (id, entity) in topology.entities() {
        let shape = match entity.kind {
            EntityKind::SourceTopic | EntityKind::SinkTopic => "cylinder",
            EntityKind::ProcessingStream => "box",
        };
        let name = escape(id.as_str());
        let label = match &entity.config {
            EntityConfig::Topic(topic) if topic.name != id.as_str() => {
                format!("{name}\\n({})", escape(&topic.name))
            }
            EntityConfig::Stream(pipeline) => match pipeline.name() {
                Some(pipeline) if pipeline != "identity" => {
                    format!("{name}\\n[{}]", escape(pipeline))
                }
                _ => name.clone(),
            },
            EntityConfig::Topic(_) => name.clone(),
        };
        dot.push_str(&format!("    \"{name}\" [shape={shape}, label=\"{label}\"];\n"));
    }

    for edge in topology.workflow() {
        dot.push_str(&format!(
            "    \"{}\" -> \"{}\";\n",
            escape(edge.from.as_str()),
            escape(edge.to.as_str())
        ));
    }

    dot.push_str("}\n");
    dot
}

/// Escape for a double-quoted DOT string
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
