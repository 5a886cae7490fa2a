//! Error types for pedigree construction.
//!
//! Structural data errors are fatal for the pedigree they occur in: no partially
//! built family is handed out once one of these is raised. An unsatisfiable layout
//! is *not* an error, see [`crate::sandwich::SolveOutcome`].

use crate::types::Sex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PedigreeError {
    /// A raw input row could not be split into the expected columns.
    #[error("Invalid pedigree row: {reason}")]
    InvalidRow { reason: String },

    /// A sex, status or role code is not recognized.
    #[error("Invalid {field} code: '{value}'")]
    InvalidCode { field: &'static str, value: String },

    /// The same individual identifier occurs twice in one pedigree.
    #[error("Duplicate individual {individual} in pedigree {pedigree}")]
    DuplicateIndividual { pedigree: String, individual: String },

    /// An individual was added to a family with another pedigree identifier.
    #[error("Individual {individual} belongs to pedigree {found}, not {expected}")]
    PedigreeMismatch {
        expected: String,
        found: String,
        individual: String,
    },

    /// A father or mother identifier does not resolve inside the pedigree.
    #[error("Parent {parent} of individual {individual} not found in pedigree {pedigree}")]
    UnknownParent {
        pedigree: String,
        individual: String,
        parent: String,
    },

    /// A recorded parent has the wrong sex for its role.
    #[error("Parent {parent} in pedigree {pedigree} must be {expected}, found {found}")]
    ParentSexMismatch {
        pedigree: String,
        parent: String,
        expected: Sex,
        found: Sex,
    },

    #[error("No proband found in pedigree {pedigree}")]
    MissingProband { pedigree: String },

    #[error("Pedigree {pedigree} has more than one proband: {probands:?}")]
    MultipleProbands {
        pedigree: String,
        probands: Vec<String>,
    },

    /// Somebody is recorded as their own ancestor.
    #[error("Pedigree {pedigree} contains an ancestry cycle through {individual}")]
    AncestryCycle { pedigree: String, individual: String },

    /// Rank propagation could not reach every individual from the proband.
    #[error("Pedigree {pedigree} is disconnected, unreached individuals: {unreached:?}")]
    DisconnectedPedigree {
        pedigree: String,
        unreached: Vec<String>,
    },

    /// Siblings ended up on different generations.
    #[error("Siblings of {sibship} in pedigree {pedigree} have different generation ranks")]
    InconsistentSibshipRank { pedigree: String, sibship: String },
}

pub type PedigreeResult<T> = Result<T, PedigreeError>;
