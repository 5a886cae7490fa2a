pub mod builder;
pub mod family;
pub mod units;

pub use builder::PedigreeBuilder;
pub use family::PedigreeFamily;
pub use units::{Individual, IndividualId, MatingId, MatingUnit, SibshipId, SibshipUnit};
