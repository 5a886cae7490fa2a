use crate::graph::vertex::Vertex;
use crate::pedigree::PedigreeFamily;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Unordered vertex pair, stored with the smaller endpoint first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Edge<V> {
    first: V,
    second: V,
}

impl<V: Ord> Edge<V> {
    pub fn new(a: V, b: V) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

impl<V: Copy> Edge<V> {
    pub fn endpoints(&self) -> (V, V) {
        (self.first, self.second)
    }
}

pub type EdgeSet<V> = BTreeSet<Edge<V>>;

/// Edge rules A to E evaluated over one built family.
///
/// Rules returning a pair give `(mandatory, forbidden)`.
pub struct EdgeRules<'a> {
    family: &'a PedigreeFamily,
    individuals: Vec<Vertex>,
    matings: Vec<Vertex>,
    sibships: Vec<Vertex>,
}

impl<'a> EdgeRules<'a> {
    pub fn new(family: &'a PedigreeFamily) -> Self {
        Self {
            family,
            individuals: family.individuals().map(|(id, _)| Vertex::Individual(id)).collect(),
            matings: family.mating_units().map(|(id, _)| Vertex::Mating(id)).collect(),
            sibships: family.sibship_units().map(|(id, _)| Vertex::Sibship(id)).collect(),
        }
    }

    /// Rule A: individuals of the same generation are never adjacent
    pub fn rule_a(&self) -> EdgeSet<Vertex> {
        let mut forbidden = EdgeSet::new();

        for (index, &first) in self.individuals.iter().enumerate() {
            let rank = first.generation_rank(self.family);
            if rank.is_none() {
                continue;
            }
            for &second in &self.individuals[index + 1..] {
                if second.generation_rank(self.family) == rank {
                    forbidden.insert(Edge::new(first, second));
                }
            }
        }

        forbidden
    }

    /// Rule B: an individual is adjacent to its own mating units and kept away from
    /// mating units of its generation it does not belong to
    pub fn rule_b(&self) -> (EdgeSet<Vertex>, EdgeSet<Vertex>) {
        let mut mandatory = EdgeSet::new();
        let mut forbidden = EdgeSet::new();

        for &individual in &self.individuals {
            let pedigree = individual.pedigree(self.family);
            let generation = individual.generation(self.family);

            for &mating in &self.matings {
                if pedigree.is_subset(&mating.pedigree(self.family)) {
                    mandatory.insert(Edge::new(individual, mating));
                } else if generation == mating.generation(self.family) {
                    forbidden.insert(Edge::new(individual, mating));
                }
            }
        }

        (mandatory, forbidden)
    }

    /// Rule C: an individual is adjacent to its own sibship and kept away from the other
    /// sibships of its generation, unless it married in without recorded parents
    pub fn rule_c(&self) -> (EdgeSet<Vertex>, EdgeSet<Vertex>) {
        let mut mandatory = EdgeSet::new();
        let mut forbidden = EdgeSet::new();

        for (id, person) in self.family.individuals() {
            let individual = Vertex::Individual(id);
            let pedigree = individual.pedigree(self.family);
            let generation = individual.generation(self.family);
            let has_parents = person.has_parents();

            for &sibship in &self.sibships {
                if pedigree.is_subset(&sibship.pedigree(self.family)) {
                    mandatory.insert(Edge::new(individual, sibship));
                } else if has_parents && generation == sibship.generation(self.family) {
                    forbidden.insert(Edge::new(individual, sibship));
                }
            }
        }

        (mandatory, forbidden)
    }

    /// Rule D: a mating unit is adjacent to the sibship of its children
    pub fn rule_d(&self) -> EdgeSet<Vertex> {
        let mut mandatory = EdgeSet::new();

        for &mating in &self.matings {
            let children = mating.children(self.family);
            for &sibship in &self.sibships {
                if children == sibship.pedigree(self.family) {
                    mandatory.insert(Edge::new(mating, sibship));
                }
            }
        }

        mandatory
    }

    /// Rule E: structurally unrelated units are never adjacent.
    ///
    /// `rule_d` is the mandatory set that must not be contradicted.
    pub fn rule_e(&self, rule_d: &EdgeSet<Vertex>) -> EdgeSet<Vertex> {
        let mut forbidden = EdgeSet::new();

        for &mating in &self.matings {
            let pedigree = mating.pedigree(self.family);
            let generation = mating.generation(self.family);

            for &other in self.matings.iter().chain(&self.sibships) {
                if other == mating {
                    continue;
                }

                let edge = Edge::new(mating, other);
                if rule_d.contains(&edge) {
                    continue;
                }

                if pedigree.is_disjoint(&other.pedigree(self.family))
                    && generation.is_disjoint(&other.generation(self.family))
                {
                    forbidden.insert(edge);
                }
            }
        }

        forbidden
    }

    /// `(mandatory, forbidden)` as the unions `B+ C+ D` and `A B- C- E`
    pub fn evaluate(&self) -> (EdgeSet<Vertex>, EdgeSet<Vertex>) {
        let rule_a = self.rule_a();
        let (b_plus, b_minus) = self.rule_b();
        let (c_plus, c_minus) = self.rule_c();
        let rule_d = self.rule_d();
        let rule_e = self.rule_e(&rule_d);

        debug!(
            "Pedigree {} rules: A={} B+={} B-={} C+={} C-={} D={} E={}",
            self.family.pedigree_id(),
            rule_a.len(),
            b_plus.len(),
            b_minus.len(),
            c_plus.len(),
            c_minus.len(),
            rule_d.len(),
            rule_e.len()
        );

        let mut mandatory = b_plus;
        mandatory.extend(c_plus);
        mandatory.extend(rule_d);

        let mut forbidden = rule_a;
        forbidden.extend(b_minus);
        forbidden.extend(c_minus);
        forbidden.extend(rule_e);

        (mandatory, forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedigree::builder::fixtures;
    use crate::pedigree::{MatingId, PedigreeBuilder, SibshipId};
    use crate::types::PedigreeRow;

    fn build(rows: Vec<PedigreeRow>) -> PedigreeFamily {
        PedigreeBuilder::build(rows).unwrap().remove(0)
    }

    fn individual(family: &PedigreeFamily, id: &str) -> Vertex {
        Vertex::Individual(family.find_individual(id).unwrap())
    }

    #[test]
    fn test_edge_is_unordered() {
        assert_eq!(Edge::new(3, 1), Edge::new(1, 3));
        assert_eq!(Edge::new(3, 1).endpoints(), (1, 3));
    }

    #[test]
    fn test_nuclear_family_rules() {
        let family = build(fixtures::nuclear_family());
        let rules = EdgeRules::new(&family);

        // father-mother plus every pair of the four children
        assert_eq!(rules.rule_a().len(), 7);

        let (b_plus, b_minus) = rules.rule_b();
        assert_eq!(b_plus.len(), 2);
        assert!(b_minus.is_empty());

        let (c_plus, c_minus) = rules.rule_c();
        assert_eq!(c_plus.len(), 4);
        assert!(c_minus.is_empty());

        let rule_d = rules.rule_d();
        assert_eq!(rule_d.len(), 1);
        assert!(rules.rule_e(&rule_d).is_empty());
    }

    #[test]
    fn test_three_generation_rules() {
        let family = build(fixtures::three_generations());
        let rules = EdgeRules::new(&family);
        let (mandatory, forbidden) = rules.evaluate();

        let grandfather = individual(&family, "grandfather");
        let grandmother = individual(&family, "grandmother");
        let father = individual(&family, "father");
        let mother = individual(&family, "mother");

        let expected_forbidden = BTreeSet::from([
            Edge::new(grandfather, grandmother),
            Edge::new(father, mother),
            Edge::new(Vertex::Mating(MatingId(0)), Vertex::Mating(MatingId(1))),
            Edge::new(Vertex::Mating(MatingId(0)), Vertex::Sibship(SibshipId(1))),
        ]);
        assert_eq!(forbidden, expected_forbidden);

        assert_eq!(mandatory.len(), 8);
        assert!(mandatory.is_disjoint(&forbidden));
    }

    #[test]
    fn test_rule_d_pairs_each_mating_with_its_own_sibship() {
        let family = build(fixtures::three_generations());
        let rule_d = EdgeRules::new(&family).rule_d();

        for (id, unit) in family.mating_units() {
            let edges: Vec<_> = rule_d
                .iter()
                .filter(|edge| edge.endpoints().0 == Vertex::Mating(id))
                .collect();
            assert_eq!(edges.len(), 1);
            assert_eq!(edges[0].endpoints().1, Vertex::Sibship(unit.sibship()));
        }
    }

    fn mating(family: &PedigreeFamily, male: &str, female: &str) -> Vertex {
        let father = family.find_individual(male).unwrap();
        let mother = family.find_individual(female).unwrap();
        Vertex::Mating(family.find_mating_unit(father, mother).unwrap())
    }

    fn sibship(family: &PedigreeFamily, male: &str, female: &str) -> Vertex {
        match mating(family, male, female) {
            Vertex::Mating(id) => Vertex::Sibship(family.mating_unit(id).sibship()),
            other => panic!("not a mating unit: {:?}", other),
        }
    }

    #[test]
    fn test_same_generation_outsiders_are_kept_from_mating_units() {
        let family = build(fixtures::married_in_cousins());
        let (b_plus, b_minus) = EdgeRules::new(&family).rule_b();

        let father = individual(&family, "father");
        let aunt = individual(&family, "aunt");
        let cousin = individual(&family, "cousin");

        assert!(b_minus.contains(&Edge::new(father, mating(&family, "uncle", "aunt"))));
        assert!(b_minus.contains(&Edge::new(aunt, mating(&family, "father", "mother"))));
        assert!(b_plus.contains(&Edge::new(father, mating(&family, "father", "mother"))));

        // different generation: neither mandatory nor forbidden
        let grandparents = mating(&family, "gf", "gm");
        assert!(!b_minus.contains(&Edge::new(cousin, grandparents)));
        assert!(!b_plus.contains(&Edge::new(cousin, grandparents)));
    }

    #[test]
    fn test_same_generation_children_are_kept_from_other_sibships() {
        let family = build(fixtures::married_in_cousins());
        let (c_plus, c_minus) = EdgeRules::new(&family).rule_c();

        let mother = individual(&family, "mother");
        let uncle = individual(&family, "uncle");
        let father = individual(&family, "father");
        let aunt = individual(&family, "aunt");

        let brothers = sibship(&family, "gf", "gm");
        let mothers_sibship = sibship(&family, "mgf", "mgm");

        assert!(c_minus.contains(&Edge::new(mother, brothers)));
        assert!(c_minus.contains(&Edge::new(uncle, mothers_sibship)));
        assert!(c_minus.contains(&Edge::new(father, mothers_sibship)));

        // first cousins on the youngest generation
        let cousin = individual(&family, "cousin");
        let son = individual(&family, "son");
        assert!(c_minus.contains(&Edge::new(cousin, sibship(&family, "father", "mother"))));
        assert!(c_minus.contains(&Edge::new(son, sibship(&family, "uncle", "aunt"))));
        assert_eq!(c_minus.len(), 5);

        assert!(c_plus.contains(&Edge::new(uncle, brothers)));
        assert!(c_plus.contains(&Edge::new(mother, mothers_sibship)));

        // the aunt married in without recorded parents
        assert!(c_minus.iter().all(|edge| edge.endpoints().0 != aunt));
    }

    #[test]
    fn test_married_in_family_rules_do_not_conflict() {
        let family = build(fixtures::married_in_cousins());
        let (mandatory, forbidden) = EdgeRules::new(&family).evaluate();

        assert!(mandatory.is_disjoint(&forbidden));
    }
}
