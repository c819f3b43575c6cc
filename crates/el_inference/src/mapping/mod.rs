//! Entity co-occurrence graphs built from shared sentences.

use std::collections::HashMap;
use petgraph::graph::{NodeIndex, UnGraph};
use el_core::text::html_sentences;
use el_core::Relationship;

mod render;

pub use render::{GraphRenderer, GraphStyle, Physics, RenderedGraph};

#[derive(Debug, Clone, PartialEq)]
pub struct EntityNode {
    /// Lowercase identity used for matching.
    pub key: String,
    /// The first surface form supplied for this entity.
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cooccurrence {
    pub weight: u32,
    pub evidence: Vec<String>,
}

/// Undirected graph of entities joined by the sentences they share.
#[derive(Debug, Clone)]
pub struct CooccurrenceGraph {
    graph: UnGraph<EntityNode, Cooccurrence>,
    index: HashMap<String, NodeIndex>,
}

impl CooccurrenceGraph {
    /// Builds the graph for `entities` over the sentences of `article_text`.
    ///
    /// Names are matched case-insensitively and deduplicated by their lowercase form.
    /// Returns `None` when fewer than two distinct names are supplied.
    pub fn build(article_text: &str, entities: &[String]) -> Option<Self> {
        let mut graph = UnGraph::new_undirected();
        let mut index = HashMap::new();

        for name in entities {
            let label = name.trim();
            if label.is_empty() {
                continue;
            }
            let key = label.to_lowercase();
            if index.contains_key(&key) {
                continue;
            }
            let node = graph.add_node(EntityNode {
                key: key.clone(),
                label: label.to_string(),
            });
            index.insert(key, node);
        }

        if index.len() < 2 {
            return None;
        }

        let mut mapped = Self { graph, index };
        for sentence in html_sentences(article_text) {
            mapped.add_sentence(&sentence);
        }
        Some(mapped)
    }

    fn add_sentence(&mut self, sentence: &str) {
        let lowered = sentence.to_lowercase();
        let mut found: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&n| lowered.contains(self.graph[n].key.as_str()))
            .collect();
        if found.len() < 2 {
            return;
        }
        found.sort_by(|&a, &b| self.graph[a].key.cmp(&self.graph[b].key));

        for (i, &u) in found.iter().enumerate() {
            for &v in &found[i + 1..] {
                match self.graph.find_edge(u, v) {
                    Some(edge) => {
                        let data = &mut self.graph[edge];
                        data.weight += 1;
                        data.evidence.push(sentence.to_string());
                    }
                    None => {
                        self.graph.add_edge(
                            u,
                            v,
                            Cooccurrence {
                                weight: 1,
                                evidence: vec![sentence.to_string()],
                            },
                        );
                    }
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in the order their names were supplied.
    pub fn nodes(&self) -> impl Iterator<Item = &EntityNode> {
        self.graph.node_indices().map(move |n| &self.graph[n])
    }

    /// The edge between two names, in either order and any letter case.
    pub fn edge(&self, a: &str, b: &str) -> Option<&Cooccurrence> {
        let u = *self.index.get(&a.trim().to_lowercase())?;
        let v = *self.index.get(&b.trim().to_lowercase())?;
        self.graph.find_edge(u, v).map(|e| &self.graph[e])
    }

    /// Edges as relationships, endpoints ordered by their lowercase key.
    pub fn relationships(&self) -> Vec<Relationship> {
        let mut relationships: Vec<Relationship> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (u, v) = self.graph.edge_endpoints(e)?;
                let (u, v) = if self.graph[u].key <= self.graph[v].key { (u, v) } else { (v, u) };
                let data = &self.graph[e];
                Some(Relationship {
                    source: self.graph[u].label.clone(),
                    target: self.graph[v].label.clone(),
                    weight: data.weight,
                    evidence: data.evidence.clone(),
                })
            })
            .collect();
        relationships.sort_by(|a, b| {
            (a.source.to_lowercase(), a.target.to_lowercase())
                .cmp(&(b.source.to_lowercase(), b.target.to_lowercase()))
        });
        relationships
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_apple_example() {
        let article = "Apple was founded by Steve Jobs. Microsoft competes with Apple.";
        let graph = CooccurrenceGraph::build(article, &names(&["Apple", "Steve Jobs", "Microsoft"])).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge("Apple", "Steve Jobs").unwrap().weight, 1);
        assert_eq!(graph.edge("Apple", "Microsoft").unwrap().weight, 1);
        assert!(graph.edge("Steve Jobs", "Microsoft").is_none());
        assert_eq!(
            graph.edge("Apple", "Microsoft").unwrap().evidence,
            vec!["Microsoft competes with Apple."]
        );
    }

    #[test]
    fn test_edges_are_symmetric_and_case_insensitive() {
        let article = "APPLE and microsoft met. Later apple called Microsoft again. Nobody else.";
        let graph = CooccurrenceGraph::build(article, &names(&["Apple", "Microsoft"])).unwrap();
        let ab = graph.edge("Apple", "Microsoft").unwrap();
        let ba = graph.edge("microsoft", "APPLE").unwrap();
        assert_eq!(ab, ba);
        assert_eq!(ab.weight, 2);
        assert_eq!(ab.evidence.len(), 2);
    }

    #[test]
    fn test_isolated_nodes_kept() {
        let article = "Apple and Google talked. Amazon stayed silent.";
        let graph = CooccurrenceGraph::build(article, &names(&["Apple", "Google", "Amazon"])).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        let labels: Vec<&str> = graph.nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Apple", "Google", "Amazon"]);
    }

    #[test]
    fn test_fewer_than_two_distinct_names() {
        assert!(CooccurrenceGraph::build("Apple.", &names(&[])).is_none());
        assert!(CooccurrenceGraph::build("Apple.", &names(&["Apple"])).is_none());
        assert!(CooccurrenceGraph::build("Apple.", &names(&["Apple", "apple", " "])).is_none());
    }

    #[test]
    fn test_markup_stripped_before_splitting() {
        let article = "<p>Dr. Smith joined Acme.</p><p>Acme hired Jones.</p>";
        let graph = CooccurrenceGraph::build(article, &names(&["Smith", "Acme", "Jones"])).unwrap();
        assert_eq!(graph.edge("Smith", "Acme").unwrap().weight, 1);
        assert_eq!(graph.edge("Acme", "Jones").unwrap().weight, 1);
        assert!(graph.edge("Smith", "Jones").is_none());
    }

    #[test]
    fn test_relationships_canonical_order() {
        let article = "Zeta met Alpha. Alpha met Zeta.";
        let graph = CooccurrenceGraph::build(article, &names(&["Zeta", "Alpha"])).unwrap();
        let relationships = graph.relationships();
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].source, "Alpha");
        assert_eq!(relationships[0].target, "Zeta");
        assert_eq!(relationships[0].weight, 2);
    }
}
