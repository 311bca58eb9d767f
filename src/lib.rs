//! # orgmodel
//!
//! Organization-model core: decides, over a knowledge graph of typed
//! entities (actors, services, interfaces), whether one entity's declared
//! requirements can be satisfied by another's declared resources, and
//! synthesizes new composite entities from compatible ones.
//!
//! Three engines cooperate:
//!
//! - the **capability inference engine** ([`inference`]) runs a monotone
//!   fixed point adding `provides` edges;
//! - the **composition engine** ([`composition`]) joins actors through
//!   compatible interface pairs into composite actors;
//! - the **resource-matching solver** ([`solver`]) settles
//!   cardinality-accounted support questions as a constraint satisfaction
//!   problem solved by backtracking search.
//!
//! [`OrganizationModel`] bundles them behind one facade; [`scenario`]
//! loads whole models from declarative YAML documents.

pub mod composition;
pub mod error;
pub mod graph;
pub mod inference;
pub mod iri;
pub mod organization;
pub mod restriction;
pub mod scenario;
pub mod solver;
pub mod vocabulary;

pub use composition::{Candidate, CompositionConfig};
pub use error::{CompositionError, GraphError, SolverError};
pub use graph::{KnowledgeGraph, MemoryGraph, TypeHierarchy};
pub use iri::Iri;
pub use organization::OrganizationModel;
pub use restriction::{Cardinality, ModelBound, Restriction, RestrictionIndex};
pub use scenario::{Scenario, ScenarioError};
pub use solver::{InstanceSolution, Solution, SolverConfig};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
