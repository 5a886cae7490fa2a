use crate::error::PedigreeResult;
use crate::pedigree::family::PedigreeFamily;
use crate::pedigree::units::Individual;
use crate::types::PedigreeRow;
use std::collections::HashMap;
use tracing::{debug, info};

/// Turns loaded rows into fully built pedigree families
pub struct PedigreeBuilder;

impl PedigreeBuilder {
    /// Group rows by pedigree identifier (first-seen order) and build each family.
    ///
    /// Any structural error aborts the whole build.
    pub fn build(rows: Vec<PedigreeRow>) -> PedigreeResult<Vec<PedigreeFamily>> {
        let mut families: Vec<PedigreeFamily> = Vec::new();
        let mut family_index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let index = match family_index.get(&row.pedigree_id) {
                Some(&index) => index,
                None => {
                    family_index.insert(row.pedigree_id.clone(), families.len());
                    families.push(PedigreeFamily::new(row.pedigree_id.clone()));
                    families.len() - 1
                }
            };
            families[index].add_individual(Individual::new(row))?;
        }

        for family in &mut families {
            Self::build_family(family)?;
        }

        info!("Built {} pedigree families", families.len());
        Ok(families)
    }

    /// Run the relation and rank builders on a family whose individuals are loaded
    pub fn build_family(family: &mut PedigreeFamily) -> PedigreeResult<()> {
        debug!("Building pedigree {}", family.pedigree_id());

        family.build_mating_units()?;
        family.build_sibship_units();
        family.build_generation_rank()?;
        family.build_extended_sibship_units();
        family.collect_mating_units_for_individuals();

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PedigreeError;

    #[test]
    fn test_build_nuclear_family() {
        let families = PedigreeBuilder::build(fixtures::nuclear_family()).unwrap();

        assert_eq!(families.len(), 1);
        let family = &families[0];
        assert_eq!(family.pedigree_id(), "fam1");
        assert_eq!(family.individual_count(), 6);
        assert_eq!(family.mating_unit_count(), 1);
        assert_eq!(family.sibship_unit_count(), 1);

        let (_, sibship) = family.sibship_units().next().unwrap();
        assert_eq!(sibship.siblings().len(), 4);
        assert!(sibship.extended().is_empty());
    }

    #[test]
    fn test_build_groups_by_pedigree() {
        let mut rows = fixtures::three_generations();
        rows.extend(fixtures::nuclear_family());

        let families = PedigreeBuilder::build(rows).unwrap();
        let ids: Vec<_> = families.iter().map(|family| family.pedigree_id()).collect();
        assert_eq!(ids, vec!["fam2", "fam1"]);
    }

    #[test]
    fn test_build_fails_on_disconnected_pedigree() {
        let result = PedigreeBuilder::build(fixtures::disconnected_families());
        assert!(matches!(result, Err(PedigreeError::DisconnectedPedigree { .. })));
    }

    #[test]
    fn test_build_fails_when_siblings_land_on_different_generations() {
        // the proband's partner is his aunt, so she is ranked before his father reaches her
        let rows = vec![
            fixtures::row("fam6", "g1", "0", "0", "1", "null"),
            fixtures::row("fam6", "g2", "0", "0", "2", "null"),
            fixtures::row("fam6", "father", "g1", "g2", "1", "father"),
            fixtures::row("fam6", "aunt", "g1", "g2", "2", "null"),
            fixtures::row("fam6", "mother", "0", "0", "2", "mother"),
            fixtures::row("fam6", "proband", "father", "mother", "1", "prb"),
            fixtures::row("fam6", "child", "proband", "aunt", "2", "null"),
        ];

        let result = PedigreeBuilder::build(rows);
        match result {
            Err(PedigreeError::InconsistentSibshipRank { pedigree, sibship }) => {
                assert_eq!(pedigree, "fam6");
                assert_eq!(sibship, "SU(g1, g2)");
            }
            other => panic!("expected inconsistent sibship rank, got {:?}", other.map(|families| families.len())),
        }
    }
}
