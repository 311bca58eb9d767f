//! Error types for the organization-model core.
//!
//! Infeasibility of a resource match is deliberately *not* represented
//! here: the solver reports it as an `Ok(None)` / `Ok(false)` value and it
//! never crosses an API boundary as an error.

use thiserror::Error;

use crate::iri::Iri;

/// Errors from knowledge-graph lookups.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A single-valued relation lookup found no edge.
    #[error("no instance related to '{instance}' via '{relation}'")]
    NotFound { instance: Iri, relation: Iri },
}

/// Errors from the resource-matching solver.
///
/// "No solution exists" is not an error; only failure to reach a verdict
/// within the configured search budget is.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The search-step budget ran out before feasibility or infeasibility
    /// could be established.
    #[error("search exhausted after {steps} steps without a verdict")]
    SearchExhausted { steps: u64 },
}

/// Errors from the composition engine.
#[derive(Debug, Error)]
pub enum CompositionError {
    /// Recombination was invoked on a graph with no atomic actor instances.
    #[error("recombination requires at least one actor instance")]
    NoActorsToRecombine,
}
