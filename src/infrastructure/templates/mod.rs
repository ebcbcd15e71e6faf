//! YAML sources for the course concept and the agent/task catalogues

pub mod concept_loader;
pub mod crew_loader;

pub use concept_loader::{ConceptError, ConceptLoader};
pub use crew_loader::{read_catalogue, CatalogueSource, BUILTIN_AGENTS_YAML, BUILTIN_TASKS_YAML};
