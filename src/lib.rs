pub mod config;
pub mod error;
pub mod graph;
pub mod loader;
pub mod orchestrator;
pub mod pedigree;
pub mod reports;
pub mod sandwich;
pub mod types;
