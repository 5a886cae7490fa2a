use crate::graph::Vertex;
use crate::pedigree::PedigreeFamily;
use crate::sandwich::VertexInterval;
use std::collections::BTreeMap;
use tracing::debug;

/// Vertices of one generation, ordered left to right
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRow {
    pub rank: i32,
    pub vertices: Vec<Vertex>,
}

/// Generation a vertex is drawn on.
///
/// A mating unit whose mates sit on different generations goes with the younger mate.
pub fn layout_rank(vertex: Vertex, family: &PedigreeFamily) -> Option<i32> {
    match vertex {
        Vertex::Mating(id) => family.mating_unit(id).generation_rank().or_else(|| {
            family
                .mating_unit(id)
                .mates()
                .iter()
                .filter_map(|&mate| family.individual(mate).generation_rank())
                .max()
        }),
        _ => vertex.generation_rank(family),
    }
}

/// Bucket solved intervals by generation and order each bucket by interval position.
///
/// Ties on both endpoints fall back to the vertex order.
pub fn order_by_generation(family: &PedigreeFamily, intervals: &[VertexInterval<Vertex>]) -> Vec<GenerationRow> {
    let mut buckets: BTreeMap<i32, Vec<&VertexInterval<Vertex>>> = BTreeMap::new();

    for placed in intervals {
        match layout_rank(placed.vertex, family) {
            Some(rank) => buckets.entry(rank).or_default().push(placed),
            None => debug!("Vertex {:?} has no generation, left out of the layout", placed.vertex),
        }
    }

    buckets
        .into_iter()
        .map(|(rank, mut row)| {
            row.sort_by(|a, b| {
                a.interval
                    .left
                    .total_cmp(&b.interval.left)
                    .then(a.interval.right.total_cmp(&b.interval.right))
                    .then(a.vertex.cmp(&b.vertex))
            });
            GenerationRow {
                rank,
                vertices: row.into_iter().map(|placed| placed.vertex).collect(),
            }
        })
        .collect()
}
