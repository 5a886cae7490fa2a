use crate::types::{PedigreeRow, Role, Sex, Status, FOUNDER};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Index of an individual inside its family arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndividualId(pub usize);

/// Index of a mating unit inside its family arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatingId(pub usize);

/// Index of a sibship unit inside its family arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SibshipId(pub usize);

/// A single person of a pedigree.
///
/// Two individuals are equal when they share the pedigree and individual identifiers,
/// whatever their other attributes are.
#[derive(Debug, Clone)]
pub struct Individual {
    pedigree_id: String,
    individual_id: String,
    father_id: String,
    mother_id: String,
    sex: Sex,
    status: Status,
    role: Role,
    generation_rank: Option<i32>,
    parents_mating: Option<MatingId>,
    sibship: Option<SibshipId>,
    mating_instances: Vec<MatingId>,
}

impl Individual {
    pub fn new(row: PedigreeRow) -> Self {
        Self {
            pedigree_id: row.pedigree_id,
            individual_id: row.individual_id,
            father_id: row.father_id,
            mother_id: row.mother_id,
            sex: row.sex,
            status: row.status,
            role: row.role,
            generation_rank: None,
            parents_mating: None,
            sibship: None,
            mating_instances: Vec::new(),
        }
    }

    pub fn pedigree_id(&self) -> &str {
        &self.pedigree_id
    }

    pub fn individual_id(&self) -> &str {
        &self.individual_id
    }

    pub fn father_id(&self) -> &str {
        &self.father_id
    }

    pub fn mother_id(&self) -> &str {
        &self.mother_id
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_proband(&self) -> bool {
        self.role == Role::Proband
    }

    /// Both parents are recorded (neither is the founder sentinel)
    pub fn has_parents(&self) -> bool {
        self.father_id != FOUNDER && self.mother_id != FOUNDER
    }

    /// No parent is recorded at all
    pub fn is_founder(&self) -> bool {
        self.father_id == FOUNDER && self.mother_id == FOUNDER
    }

    pub fn generation_rank(&self) -> Option<i32> {
        self.generation_rank
    }

    /// Set the generation rank. A rank is assigned once and never overwritten.
    pub fn assign_generation_rank(&mut self, rank: i32) {
        assert!(
            self.generation_rank.is_none(),
            "generation rank of {} assigned twice",
            self.individual_id
        );
        self.generation_rank = Some(rank);
    }

    pub(crate) fn shift_generation_rank(&mut self, offset: i32) {
        if let Some(rank) = self.generation_rank.as_mut() {
            *rank += offset;
        }
    }

    /// Mating unit of this individual's parents
    pub fn parents_mating(&self) -> Option<MatingId> {
        self.parents_mating
    }

    pub fn sibship(&self) -> Option<SibshipId> {
        self.sibship
    }

    pub(crate) fn link_parents(&mut self, mating: MatingId, sibship: SibshipId) {
        self.parents_mating = Some(mating);
        self.sibship = Some(sibship);
    }

    /// Every mating unit in which this individual is one of the mates
    pub fn mating_instances(&self) -> &[MatingId] {
        &self.mating_instances
    }

    /// Record a mating; returns false when it was already recorded
    pub(crate) fn add_mating_instance(&mut self, mating: MatingId) -> bool {
        if self.mating_instances.contains(&mating) {
            return false;
        }
        self.mating_instances.push(mating);
        true
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.pedigree_id == other.pedigree_id && self.individual_id == other.individual_id
    }
}

impl Eq for Individual {}

impl Hash for Individual {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pedigree_id.hash(state);
        self.individual_id.hash(state);
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.individual_id)
    }
}

/// A parental pair: one male and one female individual together with their children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatingUnit {
    male: IndividualId,
    female: IndividualId,
    sibship: SibshipId,
    generation_rank: Option<i32>,
}

impl MatingUnit {
    /// Pair two mates. Panics when the sexes are not one male and one female.
    pub fn new(male: (IndividualId, &Individual), female: (IndividualId, &Individual), sibship: SibshipId) -> Self {
        assert_eq!(male.1.sex(), Sex::Male, "male mate {} is not male", male.1);
        assert_eq!(female.1.sex(), Sex::Female, "female mate {} is not female", female.1);
        assert_eq!(
            male.1.pedigree_id(),
            female.1.pedigree_id(),
            "mates belong to different pedigrees"
        );

        Self {
            male: male.0,
            female: female.0,
            sibship,
            generation_rank: None,
        }
    }

    pub fn male(&self) -> IndividualId {
        self.male
    }

    pub fn female(&self) -> IndividualId {
        self.female
    }

    pub fn mates(&self) -> [IndividualId; 2] {
        [self.male, self.female]
    }

    /// The mate of `individual` in this unit
    pub fn partner_of(&self, individual: IndividualId) -> Option<IndividualId> {
        if self.male == individual {
            Some(self.female)
        } else if self.female == individual {
            Some(self.male)
        } else {
            None
        }
    }

    pub fn sibship(&self) -> SibshipId {
        self.sibship
    }

    pub fn generation_rank(&self) -> Option<i32> {
        self.generation_rank
    }

    pub(crate) fn set_generation_rank(&mut self, rank: Option<i32>) {
        self.generation_rank = rank;
    }
}

/// The children of one mating unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SibshipUnit {
    mating: MatingId,
    siblings: Vec<IndividualId>,
    extended: Vec<IndividualId>,
    generation_rank: Option<i32>,
}

impl SibshipUnit {
    pub fn new(mating: MatingId) -> Self {
        Self {
            mating,
            siblings: Vec::new(),
            extended: Vec::new(),
            generation_rank: None,
        }
    }

    pub fn mating(&self) -> MatingId {
        self.mating
    }

    /// Siblings in the order they were encountered in the input
    pub fn siblings(&self) -> &[IndividualId] {
        &self.siblings
    }

    /// Founders who married one of the siblings; only used for drawing
    pub fn extended(&self) -> &[IndividualId] {
        &self.extended
    }

    pub fn contains(&self, individual: IndividualId) -> bool {
        self.siblings.contains(&individual)
    }

    pub(crate) fn add_sibling(&mut self, individual: IndividualId) -> bool {
        if self.contains(individual) {
            return false;
        }
        self.siblings.push(individual);
        true
    }

    pub(crate) fn add_extended(&mut self, individual: IndividualId) -> bool {
        if self.extended.contains(&individual) {
            return false;
        }
        self.extended.push(individual);
        true
    }

    pub fn generation_rank(&self) -> Option<i32> {
        self.generation_rank
    }

    pub(crate) fn set_generation_rank(&mut self, rank: Option<i32>) {
        self.generation_rank = rank;
    }
}
