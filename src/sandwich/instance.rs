use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// Vertex set with its mandatory and forbidden graphs, as adjacency sets
#[derive(Debug, Clone)]
pub struct SandwichInstance<V> {
    vertices: Vec<V>,
    mandatory: HashMap<V, BTreeSet<V>>,
    forbidden: HashMap<V, BTreeSet<V>>,
}

impl<V: Copy + Eq + Hash + Ord> SandwichInstance<V> {
    /// Self loops are dropped. Every edge endpoint must be one of `vertices`.
    pub fn new(
        vertices: Vec<V>,
        mandatory: impl IntoIterator<Item = (V, V)>,
        forbidden: impl IntoIterator<Item = (V, V)>,
    ) -> Self {
        let mandatory = adjacency(&vertices, mandatory);
        let forbidden = adjacency(&vertices, forbidden);

        Self {
            vertices,
            mandatory,
            forbidden,
        }
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn mandatory_neighbors(&self, vertex: V) -> &BTreeSet<V> {
        &self.mandatory[&vertex]
    }

    pub fn forbidden_neighbors(&self, vertex: V) -> &BTreeSet<V> {
        &self.forbidden[&vertex]
    }

    pub fn is_mandatory(&self, a: V, b: V) -> bool {
        self.mandatory_neighbors(a).contains(&b)
    }

    pub fn is_forbidden(&self, a: V, b: V) -> bool {
        self.forbidden_neighbors(a).contains(&b)
    }

    pub fn mandatory_edge_count(&self) -> usize {
        self.mandatory.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn forbidden_edge_count(&self) -> usize {
        self.forbidden.values().map(BTreeSet::len).sum::<usize>() / 2
    }
}

fn adjacency<V: Copy + Eq + Hash + Ord>(
    vertices: &[V],
    edges: impl IntoIterator<Item = (V, V)>,
) -> HashMap<V, BTreeSet<V>> {
    let mut adjacency: HashMap<V, BTreeSet<V>> = vertices.iter().map(|&v| (v, BTreeSet::new())).collect();

    for (a, b) in edges {
        if a == b {
            continue;
        }
        assert!(
            adjacency.contains_key(&a) && adjacency.contains_key(&b),
            "edge endpoint outside the vertex set"
        );
        adjacency.entry(a).or_default().insert(b);
        adjacency.entry(b).or_default().insert(a);
    }

    adjacency
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency_is_symmetric() {
        let instance = SandwichInstance::new(vec![1, 2, 3], [(1, 2), (2, 2)], [(3, 1)]);

        assert!(instance.is_mandatory(2, 1));
        assert!(!instance.is_mandatory(2, 2));
        assert!(instance.is_forbidden(1, 3));
        assert_eq!(instance.mandatory_edge_count(), 1);
        assert_eq!(instance.forbidden_edge_count(), 1);
        assert!(instance.mandatory_neighbors(3).is_empty());
    }

    #[test]
    #[should_panic(expected = "outside the vertex set")]
    fn test_unknown_endpoint() {
        SandwichInstance::new(vec![1, 2], [(1, 5)], []);
    }
}
