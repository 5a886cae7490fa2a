//! Core types shared by the loader, the pedigree model and the reports

use crate::error::{PedigreeError, PedigreeResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parent identifier used for founders (individuals without recorded parents)
pub const FOUNDER: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Unknown,
    Male,
    Female,
}

impl Sex {
    /// Parse a PED sex code: `0` unknown, `1` male, `2` female
    pub fn from_code(code: &str) -> PedigreeResult<Self> {
        match code.trim() {
            "0" => Ok(Sex::Unknown),
            "1" => Ok(Sex::Male),
            "2" => Ok(Sex::Female),
            other => Err(PedigreeError::InvalidCode {
                field: "sex",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Unknown => write!(f, "unknown"),
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Unknown,
    Unaffected,
    Affected,
}

impl Status {
    /// Parse a PED affection code: `0` unknown, `1` unaffected, `2` affected
    pub fn from_code(code: &str) -> PedigreeResult<Self> {
        match code.trim() {
            "0" => Ok(Status::Unknown),
            "1" => Ok(Status::Unaffected),
            "2" => Ok(Status::Affected),
            other => Err(PedigreeError::InvalidCode {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Unknown,
    Proband,
    Father,
    Mother,
    Brother,
    Sister,
    Grandfather,
    Grandmother,
}

impl Role {
    /// Parse a role token. `prb` is the short form used in PED files, `null` means no role.
    pub fn from_token(token: &str) -> PedigreeResult<Self> {
        match token.trim().to_lowercase().as_str() {
            "prb" | "proband" => Ok(Role::Proband),
            "father" => Ok(Role::Father),
            "mother" => Ok(Role::Mother),
            "brother" => Ok(Role::Brother),
            "sister" => Ok(Role::Sister),
            "grandfather" => Ok(Role::Grandfather),
            "grandmother" => Ok(Role::Grandmother),
            "null" | "unknown" => Ok(Role::Unknown),
            _ => Err(PedigreeError::InvalidCode {
                field: "role",
                value: token.to_string(),
            }),
        }
    }
}

/// One line of pedigree input, already split into its seven columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedigreeRow {
    pub pedigree_id: String,
    pub individual_id: String,
    pub father_id: String,
    pub mother_id: String,
    pub sex: Sex,
    pub status: Status,
    pub role: Role,
}

impl PedigreeRow {
    pub const COLUMNS: [&'static str; 7] = [
        "pedigree_identifier",
        "individual_identifier",
        "individual_father",
        "individual_mother",
        "individual_sex",
        "individual_status",
        "individual_role",
    ];

    /// Build a row from the raw 7-tuple
    /// `[pedigree_id, individual_id, father_id, mother_id, sex_code, status_code, role_code]`.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> PedigreeResult<Self> {
        if fields.len() != Self::COLUMNS.len() {
            return Err(PedigreeError::InvalidRow {
                reason: format!(
                    "expected {} columns, found {}",
                    Self::COLUMNS.len(),
                    fields.len()
                ),
            });
        }

        let text = |index: usize| fields[index].as_ref().trim().to_string();

        let pedigree_id = text(0);
        let individual_id = text(1);
        if pedigree_id.is_empty() || individual_id.is_empty() {
            return Err(PedigreeError::InvalidRow {
                reason: "pedigree and individual identifiers must not be empty".to_string(),
            });
        }

        Ok(Self {
            pedigree_id,
            individual_id,
            father_id: text(2),
            mother_id: text(3),
            sex: Sex::from_code(fields[4].as_ref())?,
            status: Status::from_code(fields[5].as_ref())?,
            role: Role::from_token(fields[6].as_ref())?,
        })
    }
}
