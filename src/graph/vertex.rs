use crate::pedigree::{IndividualId, MatingId, PedigreeFamily, SibshipId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A vertex of the pedigree graph.
///
/// Ordering follows the vertex table: individuals first, then mating units, then sibship units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Vertex {
    Individual(IndividualId),
    Mating(MatingId),
    Sibship(SibshipId),
}

impl Vertex {
    pub fn kind(&self) -> VertexKind {
        match self {
            Vertex::Individual(_) => VertexKind::Individual,
            Vertex::Mating(_) => VertexKind::Mating,
            Vertex::Sibship(_) => VertexKind::Sibship,
        }
    }

    /// Individuals directly identified with this vertex
    pub fn pedigree(&self, family: &PedigreeFamily) -> BTreeSet<IndividualId> {
        match *self {
            Vertex::Individual(id) => BTreeSet::from([id]),
            Vertex::Mating(id) => family.mating_unit(id).mates().into_iter().collect(),
            Vertex::Sibship(id) => family.sibship_unit(id).siblings().iter().copied().collect(),
        }
    }

    /// Generation ranks occurring among [`Vertex::pedigree`]
    pub fn generation(&self, family: &PedigreeFamily) -> BTreeSet<i32> {
        self.pedigree(family)
            .into_iter()
            .filter_map(|id| family.individual(id).generation_rank())
            .collect()
    }

    /// Children of the mating relation this vertex takes part in
    pub fn children(&self, family: &PedigreeFamily) -> BTreeSet<IndividualId> {
        match *self {
            Vertex::Individual(id) => family
                .individual(id)
                .mating_instances()
                .iter()
                .flat_map(|&mating| Vertex::Mating(mating).children(family))
                .collect(),
            Vertex::Mating(id) => Vertex::Sibship(family.mating_unit(id).sibship()).children(family),
            Vertex::Sibship(id) => family.sibship_unit(id).siblings().iter().copied().collect(),
        }
    }

    pub fn generation_rank(&self, family: &PedigreeFamily) -> Option<i32> {
        match *self {
            Vertex::Individual(id) => family.individual(id).generation_rank(),
            Vertex::Mating(id) => family.mating_unit(id).generation_rank(),
            Vertex::Sibship(id) => family.sibship_unit(id).generation_rank(),
        }
    }

    pub fn label(&self, family: &PedigreeFamily) -> String {
        match *self {
            Vertex::Individual(id) => family.individual_label(id),
            Vertex::Mating(id) => family.mating_label(id),
            Vertex::Sibship(id) => family.sibship_label(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    Individual,
    Mating,
    Sibship,
}

impl fmt::Display for VertexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexKind::Individual => write!(f, "individual"),
            VertexKind::Mating => write!(f, "mating"),
            VertexKind::Sibship => write!(f, "sibship"),
        }
    }
}

/// Every vertex of a family: individuals, then mating units, then sibship units
pub fn family_vertices(family: &PedigreeFamily) -> Vec<Vertex> {
    family
        .individuals()
        .map(|(id, _)| Vertex::Individual(id))
        .chain(family.mating_units().map(|(id, _)| Vertex::Mating(id)))
        .chain(family.sibship_units().map(|(id, _)| Vertex::Sibship(id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedigree::builder::fixtures;
    use crate::pedigree::PedigreeBuilder;

    fn three_generations() -> PedigreeFamily {
        PedigreeBuilder::build(fixtures::three_generations())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_characteristic_sets() {
        let family = three_generations();
        let father = family.find_individual("father").unwrap();
        let mother = family.find_individual("mother").unwrap();
        let proband = family.find_individual("proband").unwrap();
        let mating = family.find_mating_unit(father, mother).unwrap();
        let sibship = family.mating_unit(mating).sibship();

        assert_eq!(Vertex::Mating(mating).pedigree(&family), BTreeSet::from([father, mother]));
        assert_eq!(Vertex::Mating(mating).generation(&family), BTreeSet::from([2]));
        assert_eq!(Vertex::Mating(mating).children(&family), BTreeSet::from([proband]));
        assert_eq!(Vertex::Individual(father).children(&family), BTreeSet::from([proband]));
        assert_eq!(Vertex::Sibship(sibship).pedigree(&family), BTreeSet::from([proband]));
        assert_eq!(Vertex::Sibship(sibship).generation_rank(&family), Some(3));
        assert!(Vertex::Individual(proband).children(&family).is_empty());
    }

    #[test]
    fn test_vertex_order() {
        let family = three_generations();
        let vertices = family_vertices(&family);

        assert_eq!(vertices.len(), 9);
        assert!(vertices.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(vertices[5].kind(), VertexKind::Mating);
        assert_eq!(vertices[5].label(&family), "MU(grandfather, grandmother)");
        assert_eq!(vertices[8].label(&family), "SU(father, mother)");
    }
}
