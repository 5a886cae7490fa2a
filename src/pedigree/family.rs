use crate::error::{PedigreeError, PedigreeResult};
use crate::pedigree::units::{Individual, IndividualId, MatingId, MatingUnit, SibshipId, SibshipUnit};
use crate::types::Sex;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// All individuals, mating units and sibship units sharing one pedigree identifier.
///
/// Units live in arenas and refer to each other by index, so the family is the single owner
/// of every vertex that the graph engine and the solver later reason about.
#[derive(Debug, Clone)]
pub struct PedigreeFamily {
    pedigree_id: String,
    individuals: Vec<Individual>,
    individual_index: HashMap<String, IndividualId>,
    mating_units: Vec<MatingUnit>,
    mating_index: HashMap<(IndividualId, IndividualId), MatingId>,
    sibship_units: Vec<SibshipUnit>,
    min_generation_rank: Option<i32>,
    max_generation_rank: Option<i32>,
}

impl PedigreeFamily {
    pub fn new(pedigree_id: impl Into<String>) -> Self {
        Self {
            pedigree_id: pedigree_id.into(),
            individuals: Vec::new(),
            individual_index: HashMap::new(),
            mating_units: Vec::new(),
            mating_index: HashMap::new(),
            sibship_units: Vec::new(),
            min_generation_rank: None,
            max_generation_rank: None,
        }
    }

    pub fn pedigree_id(&self) -> &str {
        &self.pedigree_id
    }

    pub fn add_individual(&mut self, individual: Individual) -> PedigreeResult<IndividualId> {
        if individual.pedigree_id() != self.pedigree_id {
            return Err(PedigreeError::PedigreeMismatch {
                expected: self.pedigree_id.clone(),
                found: individual.pedigree_id().to_string(),
                individual: individual.individual_id().to_string(),
            });
        }

        if self.individual_index.contains_key(individual.individual_id()) {
            return Err(PedigreeError::DuplicateIndividual {
                pedigree: self.pedigree_id.clone(),
                individual: individual.individual_id().to_string(),
            });
        }

        let id = IndividualId(self.individuals.len());
        self.individual_index
            .insert(individual.individual_id().to_string(), id);
        self.individuals.push(individual);
        Ok(id)
    }

    pub fn individual(&self, id: IndividualId) -> &Individual {
        &self.individuals[id.0]
    }

    pub fn mating_unit(&self, id: MatingId) -> &MatingUnit {
        &self.mating_units[id.0]
    }

    pub fn sibship_unit(&self, id: SibshipId) -> &SibshipUnit {
        &self.sibship_units[id.0]
    }

    pub fn individuals(&self) -> impl Iterator<Item = (IndividualId, &Individual)> {
        self.individuals
            .iter()
            .enumerate()
            .map(|(index, individual)| (IndividualId(index), individual))
    }

    pub fn mating_units(&self) -> impl Iterator<Item = (MatingId, &MatingUnit)> {
        self.mating_units
            .iter()
            .enumerate()
            .map(|(index, unit)| (MatingId(index), unit))
    }

    pub fn sibship_units(&self) -> impl Iterator<Item = (SibshipId, &SibshipUnit)> {
        self.sibship_units
            .iter()
            .enumerate()
            .map(|(index, unit)| (SibshipId(index), unit))
    }

    pub fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    pub fn mating_unit_count(&self) -> usize {
        self.mating_units.len()
    }

    pub fn sibship_unit_count(&self) -> usize {
        self.sibship_units.len()
    }

    pub fn find_individual(&self, individual_id: &str) -> Option<IndividualId> {
        self.individual_index.get(individual_id).copied()
    }

    pub fn find_mating_unit(&self, father: IndividualId, mother: IndividualId) -> Option<MatingId> {
        self.mating_index.get(&(father, mother)).copied()
    }

    pub fn min_generation_rank(&self) -> Option<i32> {
        self.min_generation_rank
    }

    pub fn max_generation_rank(&self) -> Option<i32> {
        self.max_generation_rank
    }

    /// Pair up the parents of every individual with both parents recorded.
    ///
    /// The same (father, mother) pair always resolves to the same mating unit, so running this
    /// twice leaves the family unchanged.
    pub fn build_mating_units(&mut self) -> PedigreeResult<()> {
        for index in 0..self.individuals.len() {
            let child = IndividualId(index);
            let individual = &self.individuals[index];

            if !individual.has_parents() {
                if !individual.is_founder() {
                    warn!(
                        "Individual {} in pedigree {} has a single recorded parent, ignoring it",
                        individual.individual_id(),
                        self.pedigree_id
                    );
                }
                continue;
            }

            let father = self.resolve_parent(child, individual.father_id(), Sex::Male)?;
            let mother = self.resolve_parent(child, individual.mother_id(), Sex::Female)?;

            let mating = match self.mating_index.get(&(father, mother)) {
                Some(&existing) => existing,
                None => self.insert_mating_unit(father, mother),
            };
            let sibship = self.mating_units[mating.0].sibship();

            self.individuals[index].link_parents(mating, sibship);
            self.individuals[father.0].add_mating_instance(mating);
            self.individuals[mother.0].add_mating_instance(mating);
        }

        debug!(
            "Pedigree {} has {} mating units",
            self.pedigree_id,
            self.mating_units.len()
        );
        Ok(())
    }

    fn resolve_parent(&self, child: IndividualId, parent_id: &str, expected: Sex) -> PedigreeResult<IndividualId> {
        let parent = self
            .find_individual(parent_id)
            .ok_or_else(|| PedigreeError::UnknownParent {
                pedigree: self.pedigree_id.clone(),
                individual: self.individual(child).individual_id().to_string(),
                parent: parent_id.to_string(),
            })?;

        let found = self.individual(parent).sex();
        if found != expected {
            return Err(PedigreeError::ParentSexMismatch {
                pedigree: self.pedigree_id.clone(),
                parent: parent_id.to_string(),
                expected,
                found,
            });
        }

        Ok(parent)
    }

    fn insert_mating_unit(&mut self, father: IndividualId, mother: IndividualId) -> MatingId {
        let mating = MatingId(self.mating_units.len());
        let sibship = SibshipId(self.sibship_units.len());

        let unit = MatingUnit::new(
            (father, self.individual(father)),
            (mother, self.individual(mother)),
            sibship,
        );
        self.mating_units.push(unit);
        self.sibship_units.push(SibshipUnit::new(mating));
        self.mating_index.insert((father, mother), mating);
        mating
    }

    /// Fill every sibship with the children linked to it, in input order.
    pub fn build_sibship_units(&mut self) {
        for index in 0..self.individuals.len() {
            if let Some(sibship) = self.individuals[index].sibship() {
                self.sibship_units[sibship.0].add_sibling(IndividualId(index));
            }
        }
    }

    pub fn get_proband(&self) -> PedigreeResult<IndividualId> {
        let probands: Vec<IndividualId> = self
            .individuals()
            .filter(|(_, individual)| individual.is_proband())
            .map(|(id, _)| id)
            .collect();

        match probands.as_slice() {
            [proband] => Ok(*proband),
            [] => Err(PedigreeError::MissingProband {
                pedigree: self.pedigree_id.clone(),
            }),
            many => Err(PedigreeError::MultipleProbands {
                pedigree: self.pedigree_id.clone(),
                probands: many
                    .iter()
                    .map(|id| self.individual(*id).individual_id().to_string())
                    .collect(),
            }),
        }
    }

    /// Assign a generation rank to every individual, mating unit and sibship unit.
    ///
    /// The proband is anchored at 0 and ranks spread breadth-first over siblings (same rank),
    /// parents (one less), children (one more) and mates (same rank). A rank that is already set
    /// is never touched again. Ranks are finally shifted so the oldest generation is 1.
    pub fn build_generation_rank(&mut self) -> PedigreeResult<()> {
        if self.min_generation_rank.is_some() {
            debug!("Generation ranks of pedigree {} already built", self.pedigree_id);
            return Ok(());
        }

        self.check_ancestry()?;

        let proband = self.get_proband()?;
        self.individuals[proband.0].assign_generation_rank(0);

        let mut frontier = vec![proband];
        let mut ranked = 1;

        for _ in 0..self.individuals.len() {
            if frontier.is_empty() {
                break;
            }

            let mut next = Vec::new();
            for current in frontier {
                let Some(rank) = self.individual(current).generation_rank() else {
                    continue;
                };

                for (relative, offset) in self.relatives(current) {
                    let individual = &mut self.individuals[relative.0];
                    if individual.generation_rank().is_none() {
                        individual.assign_generation_rank(rank + offset);
                        next.push(relative);
                        ranked += 1;
                    }
                }
            }
            frontier = next;
        }

        if ranked < self.individuals.len() {
            let unreached = self
                .individuals
                .iter()
                .filter(|individual| individual.generation_rank().is_none())
                .map(|individual| individual.individual_id().to_string())
                .collect();
            return Err(PedigreeError::DisconnectedPedigree {
                pedigree: self.pedigree_id.clone(),
                unreached,
            });
        }

        self.normalize_generation_rank();
        self.assign_unit_ranks()?;

        info!(
            "Pedigree {}: {} generations over {} individuals",
            self.pedigree_id,
            self.max_generation_rank.unwrap_or_default(),
            self.individuals.len()
        );
        Ok(())
    }

    /// Relatives reachable in one propagation step together with their rank offset
    fn relatives(&self, id: IndividualId) -> Vec<(IndividualId, i32)> {
        let individual = self.individual(id);
        let mut relatives = Vec::new();

        if let Some(sibship) = individual.sibship() {
            relatives.extend(
                self.sibship_unit(sibship)
                    .siblings()
                    .iter()
                    .filter(|&&sibling| sibling != id)
                    .map(|&sibling| (sibling, 0)),
            );
        }

        if let Some(mating) = individual.parents_mating() {
            relatives.extend(self.mating_unit(mating).mates().into_iter().map(|parent| (parent, -1)));
        }

        for &mating in individual.mating_instances() {
            let unit = self.mating_unit(mating);
            relatives.extend(
                self.sibship_unit(unit.sibship())
                    .siblings()
                    .iter()
                    .map(|&child| (child, 1)),
            );
            if let Some(partner) = unit.partner_of(id) {
                relatives.push((partner, 0));
            }
        }

        relatives
    }

    /// Nobody may be their own ancestor; rank propagation assumes a parent/child DAG
    fn check_ancestry(&self) -> PedigreeResult<()> {
        let mut graph = DiGraph::<IndividualId, ()>::new();
        let nodes: Vec<NodeIndex> = self.individuals().map(|(id, _)| graph.add_node(id)).collect();

        for (child, individual) in self.individuals() {
            for parent_id in [individual.father_id(), individual.mother_id()] {
                if let Some(parent) = self.find_individual(parent_id) {
                    graph.add_edge(nodes[parent.0], nodes[child.0], ());
                }
            }
        }

        toposort(&graph, None).map(|_| ()).map_err(|cycle| {
            let individual = graph[cycle.node_id()];
            PedigreeError::AncestryCycle {
                pedigree: self.pedigree_id.clone(),
                individual: self.individual(individual).individual_id().to_string(),
            }
        })
    }

    fn normalize_generation_rank(&mut self) {
        let ranks = self.individuals.iter().filter_map(Individual::generation_rank);
        let (Some(min), Some(max)) = (ranks.clone().min(), ranks.max()) else {
            return;
        };

        let offset = 1 - min;
        for individual in &mut self.individuals {
            individual.shift_generation_rank(offset);
        }

        self.min_generation_rank = Some(1);
        self.max_generation_rank = Some(max - min + 1);
        debug!(
            "Normalized ranks of pedigree {} from [{}, {}] by {}",
            self.pedigree_id, min, max, offset
        );
    }

    fn assign_unit_ranks(&mut self) -> PedigreeResult<()> {
        for index in 0..self.mating_units.len() {
            let [male, female] = self.mating_units[index].mates();
            let male_rank = self.individual(male).generation_rank();
            let female_rank = self.individual(female).generation_rank();

            let rank = if male_rank == female_rank { male_rank } else { None };
            if rank.is_none() {
                debug!(
                    "Mates of {} are on different generations",
                    self.mating_label(MatingId(index))
                );
            }
            self.mating_units[index].set_generation_rank(rank);
        }

        for index in 0..self.sibship_units.len() {
            let mut ranks = self.sibship_units[index]
                .siblings()
                .iter()
                .map(|&sibling| self.individual(sibling).generation_rank());

            let rank = ranks.next().flatten();
            if ranks.any(|other| other != rank) {
                return Err(PedigreeError::InconsistentSibshipRank {
                    pedigree: self.pedigree_id.clone(),
                    sibship: self.sibship_label(SibshipId(index)),
                });
            }
            self.sibship_units[index].set_generation_rank(rank);
        }

        Ok(())
    }

    /// Record every mate of a sibling who has no recorded parents as married into the sibship.
    pub fn build_extended_sibship_units(&mut self) {
        for index in 0..self.sibship_units.len() {
            let mut married_in = Vec::new();

            for &sibling in self.sibship_units[index].siblings() {
                for &mating in self.individual(sibling).mating_instances() {
                    if let Some(partner) = self.mating_unit(mating).partner_of(sibling) {
                        if self.individual(partner).parents_mating().is_none() {
                            married_in.push(partner);
                        }
                    }
                }
            }

            for partner in married_in {
                self.sibship_units[index].add_extended(partner);
            }
        }
    }

    /// Make sure every mate lists each of its mating units exactly once.
    ///
    /// Returns how many missing links were added.
    pub fn collect_mating_units_for_individuals(&mut self) -> usize {
        let mut repaired = 0;

        for index in 0..self.mating_units.len() {
            let mating = MatingId(index);
            for mate in self.mating_units[index].mates() {
                if self.individuals[mate.0].add_mating_instance(mating) {
                    repaired += 1;
                }
            }
        }

        if repaired > 0 {
            debug!(
                "Added {} missing mating links in pedigree {}",
                repaired, self.pedigree_id
            );
        }
        repaired
    }

    /// Individuals on the given generation, in input order
    pub fn individuals_by_generation(&self, rank: i32) -> Vec<IndividualId> {
        self.individuals()
            .filter(|(_, individual)| individual.generation_rank() == Some(rank))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn are_mates(&self, first: IndividualId, second: IndividualId) -> bool {
        self.mating_index.contains_key(&(first, second)) || self.mating_index.contains_key(&(second, first))
    }

    pub fn are_siblings(&self, first: IndividualId, second: IndividualId) -> bool {
        if first == second {
            return false;
        }

        match (self.individual(first).sibship(), self.individual(second).sibship()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub fn father_of(&self, id: IndividualId) -> Option<IndividualId> {
        self.individual(id)
            .parents_mating()
            .map(|mating| self.mating_unit(mating).male())
    }

    pub fn mother_of(&self, id: IndividualId) -> Option<IndividualId> {
        self.individual(id)
            .parents_mating()
            .map(|mating| self.mating_unit(mating).female())
    }

    pub fn individual_label(&self, id: IndividualId) -> String {
        self.individual(id).individual_id().to_string()
    }

    pub fn mating_label(&self, id: MatingId) -> String {
        let unit = self.mating_unit(id);
        format!(
            "MU({}, {})",
            self.individual(unit.male()).individual_id(),
            self.individual(unit.female()).individual_id()
        )
    }

    pub fn sibship_label(&self, id: SibshipId) -> String {
        let unit = self.mating_unit(self.sibship_unit(id).mating());
        format!(
            "SU({}, {})",
            self.individual(unit.male()).individual_id(),
            self.individual(unit.female()).individual_id()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedigree::builder::fixtures;
    use crate::types::PedigreeRow;

    fn family_from(rows: Vec<PedigreeRow>) -> PedigreeFamily {
        let mut family = PedigreeFamily::new(rows[0].pedigree_id.clone());
        for row in rows {
            family.add_individual(Individual::new(row)).unwrap();
        }
        family
    }

    fn rank_of(family: &PedigreeFamily, id: &str) -> Option<i32> {
        family
            .individual(family.find_individual(id).unwrap())
            .generation_rank()
    }

    fn built(rows: Vec<PedigreeRow>) -> PedigreeFamily {
        let mut family = family_from(rows);
        family.build_mating_units().unwrap();
        family.build_sibship_units();
        family.build_generation_rank().unwrap();
        family
    }

    #[test]
    fn test_add_individual_rejects_duplicates() {
        let mut family = family_from(fixtures::nuclear_family());
        let duplicate = fixtures::row("fam1", "father", "0", "0", "1", "null");
        let result = family.add_individual(Individual::new(duplicate));
        assert!(matches!(result, Err(PedigreeError::DuplicateIndividual { .. })));

        let foreign = fixtures::row("other", "x", "0", "0", "1", "null");
        let result = family.add_individual(Individual::new(foreign));
        assert!(matches!(result, Err(PedigreeError::PedigreeMismatch { .. })));
    }

    #[test]
    fn test_build_mating_units_is_idempotent() {
        let mut family = family_from(fixtures::nuclear_family());
        family.build_mating_units().unwrap();
        family.build_sibship_units();
        family.build_mating_units().unwrap();
        family.build_sibship_units();

        assert_eq!(family.mating_unit_count(), 1);
        assert_eq!(family.sibship_unit_count(), 1);

        let (_, sibship) = family.sibship_units().next().unwrap();
        assert_eq!(sibship.siblings().len(), 4);

        let father = family.find_individual("father").unwrap();
        assert_eq!(family.individual(father).mating_instances().len(), 1);
    }

    #[test]
    fn test_unknown_parent() {
        let rows = vec![
            fixtures::row("fam1", "father", "0", "0", "1", "null"),
            fixtures::row("fam1", "child", "father", "ghost", "1", "prb"),
        ];
        let mut family = family_from(rows);
        let result = family.build_mating_units();

        assert_eq!(
            result,
            Err(PedigreeError::UnknownParent {
                pedigree: "fam1".to_string(),
                individual: "child".to_string(),
                parent: "ghost".to_string(),
            })
        );
    }

    #[test]
    fn test_parent_sex_mismatch() {
        let rows = vec![
            fixtures::row("fam1", "a", "0", "0", "2", "null"),
            fixtures::row("fam1", "b", "0", "0", "2", "null"),
            fixtures::row("fam1", "child", "a", "b", "1", "prb"),
        ];
        let mut family = family_from(rows);
        let result = family.build_mating_units();

        assert!(matches!(
            result,
            Err(PedigreeError::ParentSexMismatch { expected: Sex::Male, found: Sex::Female, .. })
        ));
    }

    #[test]
    fn test_get_proband() {
        let family = family_from(fixtures::nuclear_family());
        let proband = family.get_proband().unwrap();
        assert_eq!(family.individual(proband).individual_id(), "son1");

        let missing = family_from(vec![fixtures::row("fam1", "a", "0", "0", "1", "null")]);
        assert!(matches!(missing.get_proband(), Err(PedigreeError::MissingProband { .. })));

        let many = family_from(vec![
            fixtures::row("fam1", "a", "0", "0", "1", "prb"),
            fixtures::row("fam1", "b", "0", "0", "2", "prb"),
        ]);
        assert!(matches!(many.get_proband(), Err(PedigreeError::MultipleProbands { .. })));
    }

    #[test]
    fn test_nuclear_family_ranks() {
        let family = built(fixtures::nuclear_family());

        assert_eq!(rank_of(&family, "father"), Some(1));
        assert_eq!(rank_of(&family, "mother"), Some(1));
        for child in ["son1", "son2", "daughter1", "daughter2"] {
            assert_eq!(rank_of(&family, child), Some(2));
        }

        assert_eq!(family.min_generation_rank(), Some(1));
        assert_eq!(family.max_generation_rank(), Some(2));
        assert_eq!(family.mating_unit(MatingId(0)).generation_rank(), Some(1));
        assert_eq!(family.sibship_unit(SibshipId(0)).generation_rank(), Some(2));
    }

    #[test]
    fn test_three_generation_ranks() {
        let family = built(fixtures::three_generations());

        assert_eq!(rank_of(&family, "grandfather"), Some(1));
        assert_eq!(rank_of(&family, "grandmother"), Some(1));
        assert_eq!(rank_of(&family, "father"), Some(2));
        assert_eq!(rank_of(&family, "mother"), Some(2));
        assert_eq!(rank_of(&family, "proband"), Some(3));
        assert_eq!(family.max_generation_rank(), Some(3));

        assert_eq!(family.individuals_by_generation(2).len(), 2);
    }

    #[test]
    fn test_every_individual_ranked_and_siblings_agree() {
        let family = built(fixtures::three_generations());

        assert!(family.individuals().all(|(_, i)| i.generation_rank().is_some()));
        for (_, sibship) in family.sibship_units() {
            let ranks: Vec<_> = sibship
                .siblings()
                .iter()
                .map(|&s| family.individual(s).generation_rank())
                .collect();
            assert!(ranks.iter().all(|rank| *rank == sibship.generation_rank()));
        }
    }

    #[test]
    fn test_mates_on_different_generations() {
        let family = built(fixtures::uncle_niece());

        assert_eq!(rank_of(&family, "uncle"), Some(2));
        assert_eq!(rank_of(&family, "niece"), Some(3));
        assert_eq!(rank_of(&family, "child"), Some(3));

        let uncle = family.find_individual("uncle").unwrap();
        let niece = family.find_individual("niece").unwrap();
        let mating = family.find_mating_unit(uncle, niece).unwrap();
        assert_eq!(family.mating_unit(mating).generation_rank(), None);

        let sibship = family.mating_unit(mating).sibship();
        assert_eq!(family.sibship_unit(sibship).generation_rank(), Some(3));
        assert!(family.are_mates(niece, uncle));
    }

    #[test]
    fn test_disconnected_pedigree() {
        let mut family = family_from(fixtures::disconnected_families());
        family.build_mating_units().unwrap();
        family.build_sibship_units();

        match family.build_generation_rank() {
            Err(PedigreeError::DisconnectedPedigree { unreached, .. }) => {
                assert_eq!(unreached, vec!["father2", "mother2", "child2"]);
            }
            other => panic!("expected a disconnected pedigree, got {:?}", other),
        }
    }

    #[test]
    fn test_ancestry_cycle() {
        let rows = vec![
            fixtures::row("fam1", "a", "b", "m", "1", "prb"),
            fixtures::row("fam1", "b", "a", "m", "1", "null"),
            fixtures::row("fam1", "m", "0", "0", "2", "null"),
        ];
        let mut family = family_from(rows);
        family.build_mating_units().unwrap();
        family.build_sibship_units();

        assert!(matches!(
            family.build_generation_rank(),
            Err(PedigreeError::AncestryCycle { .. })
        ));
    }

    #[test]
    fn test_extended_sibships_and_queries() {
        let mut family = built(fixtures::three_generations());
        family.build_extended_sibship_units();

        let father = family.find_individual("father").unwrap();
        let mother = family.find_individual("mother").unwrap();
        let proband = family.find_individual("proband").unwrap();

        let sibship = family.individual(father).sibship().unwrap();
        assert_eq!(family.sibship_unit(sibship).extended(), &[mother]);

        assert!(family.are_mates(mother, father));
        assert!(!family.are_siblings(father, mother));
        assert_eq!(family.father_of(proband), Some(father));
        assert_eq!(family.mother_of(proband), Some(mother));
        assert_eq!(family.father_of(mother), None);
        assert_eq!(family.collect_mating_units_for_individuals(), 0);
    }

    #[test]
    fn test_unit_labels() {
        let family = built(fixtures::nuclear_family());
        assert_eq!(family.mating_label(MatingId(0)), "MU(father, mother)");
        assert_eq!(family.sibship_label(SibshipId(0)), "SU(father, mother)");
    }
}
