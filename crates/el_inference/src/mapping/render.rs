use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use super::CooccurrenceGraph;

const VIS_NETWORK_JS: &str = "https://unpkg.com/vis-network@9.1.2/standalone/umd/vis-network.min.js";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Physics {
    pub gravitational_constant: f64,
    pub central_gravity: f64,
    pub spring_length: f64,
    pub spring_strength: f64,
    pub damping: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravitational_constant: -80000.0,
            central_gravity: 0.3,
            spring_length: 250.0,
            spring_strength: 0.001,
            damping: 0.09,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphStyle {
    pub height: String,
    pub width: String,
    pub background: String,
    pub font_color: String,
    pub node_color: String,
    pub edge_color: String,
    pub physics: Physics,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            height: "750px".to_string(),
            width: "100%".to_string(),
            background: "#FADA7A".to_string(),
            font_color: "#1C6EA4".to_string(),
            node_color: "white".to_string(),
            edge_color: "#1C6EA4".to_string(),
            physics: Physics::default(),
        }
    }
}

/// A standalone HTML document holding one interactive graph.
#[derive(Debug, Clone)]
pub struct RenderedGraph {
    /// Suffix shared by every element id in the document.
    pub id: String,
    pub html: String,
}

#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    style: GraphStyle,
}

impl GraphRenderer {
    pub fn new(style: GraphStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &GraphStyle {
        &self.style
    }

    pub fn render(&self, graph: &CooccurrenceGraph) -> RenderedGraph {
        let id = Uuid::new_v4().simple().to_string();
        let style = &self.style;

        let nodes: Vec<_> = graph
            .graph
            .node_indices()
            .map(|n| {
                let node = &graph.graph[n];
                json!({
                    "id": node.key,
                    "label": node.label,
                    "title": node.label,
                    "color": style.node_color,
                    "font": { "color": style.font_color },
                })
            })
            .collect();

        let edges: Vec<_> = graph
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (u, v) = graph.graph.edge_endpoints(e)?;
                let data = &graph.graph[e];
                Some(json!({
                    "from": graph.graph[u].key,
                    "to": graph.graph[v].key,
                    "value": data.weight,
                    "title": format!("Found in:\n{}", data.evidence.join("\n")),
                    "color": style.edge_color,
                }))
            })
            .collect();

        let options = json!({
            "physics": {
                "barnesHut": style.physics,
                "minVelocity": 0.75,
            },
            "edges": { "smooth": false },
        });

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<script src="{script}"></script>
<style>
#graph-{id} {{ width: {width}; height: {height}; background-color: {background}; border: 1px solid lightgray; }}
</style>
</head>
<body>
<div id="graph-{id}"></div>
<script>
var nodes_{id} = new vis.DataSet({nodes});
var edges_{id} = new vis.DataSet({edges});
var network_{id} = new vis.Network(
  document.getElementById("graph-{id}"),
  {{ nodes: nodes_{id}, edges: edges_{id} }},
  {options}
);
</script>
</body>
</html>
"#,
            script = VIS_NETWORK_JS,
            id = id,
            width = style.width,
            height = style.height,
            background = style.background,
            nodes = script_json(&nodes),
            edges = script_json(&edges),
            options = script_json(&options),
        );

        tracing::debug!(
            "Rendered graph {} with {} nodes and {} edges",
            id,
            graph.node_count(),
            graph.edge_count()
        );

        RenderedGraph { id, html }
    }
}

/// JSON safe to embed inside a `<script>` element.
fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}
