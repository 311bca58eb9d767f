//! Cardinality-constrained resource matching.
//!
//! Decides whether an available resource description satisfies a required
//! cardinality-qualified description, accounting for exact counts. Two
//! equivalent formulations are offered: an aggregate matrix over
//! [`ModelBound`] lists and an instance-level assignment over a concrete
//! unit pool. Both run a depth-first branch-and-bound search and stop at
//! the first feasible leaf; there is no objective function.
//!
//! Infeasibility is a normal outcome (`Ok(None)`), never an error. Only an
//! exhausted search budget surfaces as [`SolverError::SearchExhausted`].

mod aggregate;
mod instance;
mod store;

use serde::{Deserialize, Serialize};

use crate::error::SolverError;
use crate::graph::{KnowledgeGraph, TypeHierarchy};
use crate::iri::Iri;
use crate::restriction::{ModelBound, Restriction, RestrictionIndex};

/// Search budget for a single solve.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Maximum number of search nodes to visit before giving up without a
    /// verdict. `None` removes the bound.
    pub max_steps: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            max_steps: Some(1_000_000),
        }
    }
}

/// Units of one available model allocated to a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub model: Iri,
    pub count: u32,
}

/// All allocations serving one requirement row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementAssignment {
    pub requirement: Iri,
    pub allocations: Vec<Allocation>,
}

/// Witness of a feasible aggregate match. Zero-count cells are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub assignments: Vec<RequirementAssignment>,
}

/// Concrete units assigned to one required restriction slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub requirement: Restriction,
    pub assigned: Vec<Iri>,
}

/// Witness of a feasible instance-level match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSolution {
    pub slots: Vec<SlotAssignment>,
}

/// Match required restrictions against available ones.
///
/// Both lists are compacted to per-model bounds and solved in the
/// aggregate formulation. Returns a witness on feasibility, `None` on
/// infeasibility.
pub fn solve<H: TypeHierarchy + ?Sized>(
    required: &[Restriction],
    available: &[Restriction],
    hierarchy: &H,
    config: &SolverConfig,
) -> Result<Option<Solution>, SolverError> {
    let required = ModelBound::from_restrictions(required);
    let available = ModelBound::from_restrictions(available);
    solve_bounds(&required, &available, hierarchy, config)
}

/// Match pre-aggregated bound lists directly.
pub fn solve_bounds<H: TypeHierarchy + ?Sized>(
    required: &[ModelBound],
    available: &[ModelBound],
    hierarchy: &H,
    config: &SolverConfig,
) -> Result<Option<Solution>, SolverError> {
    aggregate::solve(required, available, hierarchy, config)
}

/// Match required restrictions against a flattened pool of concrete
/// available units (instance-level formulation).
pub fn solve_with_pool<H: TypeHierarchy + ?Sized>(
    required: &[Restriction],
    pool: &[Iri],
    hierarchy: &H,
    config: &SolverConfig,
) -> Result<Option<InstanceSolution>, SolverError> {
    instance::solve(required, pool, hierarchy, config)
}

/// Match required restrictions against available ones by expanding the
/// available side into an optimistic concrete pool.
pub fn solve_against_restrictions<H: TypeHierarchy + ?Sized>(
    required: &[Restriction],
    available: &[Restriction],
    hierarchy: &H,
    config: &SolverConfig,
) -> Result<Option<InstanceSolution>, SolverError> {
    let bounds = ModelBound::from_restrictions(available);
    let pool = ModelBound::to_instance_pool(&bounds, true);
    instance::solve(required, &pool, hierarchy, config)
}

/// True if `provider_model` can satisfy every restriction of
/// `service_model`.
///
/// Resolves both sides through the restriction index and converts solver
/// infeasibility into `false` at this boundary; only search exhaustion
/// propagates.
pub fn is_supporting<G: KnowledgeGraph>(
    graph: &G,
    index: &RestrictionIndex,
    provider_model: &Iri,
    service_model: &Iri,
    config: &SolverConfig,
) -> Result<bool, SolverError> {
    let required = index.resolve(graph, service_model);
    let available = index.resolve(graph, provider_model);
    let verdict = solve(&required, &available, graph, config)?;
    log::debug!(
        "is_supporting: '{}' supports '{}': {}",
        provider_model,
        service_model,
        verdict.is_some()
    );
    Ok(verdict.is_some())
}

/// The subset of `candidates` individually feasible against the combined
/// resources of `combination`.
///
/// Each candidate solves independently; no cross-candidate interaction is
/// assumed.
pub fn filter_supported_models<G: KnowledgeGraph>(
    graph: &G,
    index: &RestrictionIndex,
    combination: &[Iri],
    candidates: &[Iri],
    config: &SolverConfig,
) -> Result<Vec<Iri>, SolverError> {
    let available = index.resolve_combination(graph, combination);
    let mut supported = Vec::new();
    for candidate in candidates {
        let required = ModelBound::from_restrictions(&index.resolve(graph, candidate));
        if solve_bounds(&required, &available, graph, config)?.is_some() {
            supported.push(candidate.clone());
        }
    }
    Ok(supported)
}
