pub mod graph;
pub mod rules;
pub mod vertex;

pub use graph::{AdjacencyGraph, PedigreeGraph};
pub use rules::{Edge, EdgeRules, EdgeSet};
pub use vertex::{family_vertices, Vertex, VertexKind};
