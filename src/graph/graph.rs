use crate::graph::rules::{EdgeRules, EdgeSet};
use crate::graph::vertex::{family_vertices, Vertex};
use crate::pedigree::PedigreeFamily;
use crate::sandwich::SandwichInstance;
use anyhow::{Context, Result};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Wrapper around a petgraph UnGraph keyed by vertex
pub struct AdjacencyGraph<V> {
    graph: UnGraph<V, ()>,
    node_map: HashMap<V, NodeIndex>,
}

impl<V: Copy + Eq + Hash + Ord> AdjacencyGraph<V> {
    pub fn new(vertices: &[V], edges: &EdgeSet<V>) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut node_map = HashMap::new();

        for &vertex in vertices {
            node_map.insert(vertex, graph.add_node(vertex));
        }

        for edge in edges {
            let (a, b) = edge.endpoints();
            if let (Some(&a), Some(&b)) = (node_map.get(&a), node_map.get(&b)) {
                graph.add_edge(a, b, ());
            }
        }

        Self { graph, node_map }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Neighbors of a vertex, sorted
    pub fn neighbors(&self, vertex: V) -> Result<Vec<V>> {
        let index = self
            .node_map
            .get(&vertex)
            .context("Vertex not found in graph")?;

        let mut neighbors: Vec<V> = self
            .graph
            .neighbors(*index)
            .map(|neighbor| self.graph[neighbor])
            .collect();
        neighbors.sort();
        Ok(neighbors)
    }

    pub fn degree(&self, vertex: V) -> Result<usize> {
        Ok(self.neighbors(vertex)?.len())
    }

    pub fn has_edge(&self, a: V, b: V) -> bool {
        match (self.node_map.get(&a), self.node_map.get(&b)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }
}

/// The mandatory and forbidden graphs of one family
pub struct PedigreeGraph {
    vertices: Vec<Vertex>,
    mandatory: EdgeSet<Vertex>,
    forbidden: EdgeSet<Vertex>,
}

impl PedigreeGraph {
    pub fn build(family: &PedigreeFamily) -> Self {
        let vertices = family_vertices(family);
        let (mandatory, forbidden) = EdgeRules::new(family).evaluate();

        debug!(
            "Pedigree {} graph: {} vertices, {} mandatory edges, {} forbidden edges",
            family.pedigree_id(),
            vertices.len(),
            mandatory.len(),
            forbidden.len()
        );

        Self {
            vertices,
            mandatory,
            forbidden,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn mandatory_edges(&self) -> &EdgeSet<Vertex> {
        &self.mandatory
    }

    pub fn forbidden_edges(&self) -> &EdgeSet<Vertex> {
        &self.forbidden
    }

    pub fn mandatory_graph(&self) -> AdjacencyGraph<Vertex> {
        AdjacencyGraph::new(&self.vertices, &self.mandatory)
    }

    pub fn forbidden_graph(&self) -> AdjacencyGraph<Vertex> {
        AdjacencyGraph::new(&self.vertices, &self.forbidden)
    }

    pub fn instance(&self) -> SandwichInstance<Vertex> {
        SandwichInstance::new(
            self.vertices.clone(),
            self.mandatory.iter().map(|edge| edge.endpoints()),
            self.forbidden.iter().map(|edge| edge.endpoints()),
        )
    }
}
