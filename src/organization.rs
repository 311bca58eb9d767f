//! Organization model facade.
//!
//! Bundles the knowledge graph, the restriction index and the engine
//! configurations behind one entry point, so hosts drive inference,
//! composition and support queries without threading the collaborators
//! themselves.

use crate::composition::{self, CompositionConfig};
use crate::error::{CompositionError, SolverError};
use crate::graph::{KnowledgeGraph, MemoryGraph};
use crate::inference;
use crate::iri::Iri;
use crate::restriction::RestrictionIndex;
use crate::solver::{self, SolverConfig};
use crate::vocabulary;

/// The organization model: a knowledge graph plus declared cardinality
/// restrictions and the engines operating on them.
#[derive(Debug)]
pub struct OrganizationModel<G = MemoryGraph> {
    graph: G,
    restrictions: RestrictionIndex,
    solver_config: SolverConfig,
    composition_config: CompositionConfig,
}

impl OrganizationModel<MemoryGraph> {
    /// An empty model over the in-memory graph.
    pub fn new() -> Self {
        Self::with_graph(MemoryGraph::new())
    }
}

impl Default for OrganizationModel<MemoryGraph> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: KnowledgeGraph> OrganizationModel<G> {
    /// Wrap an existing graph.
    pub fn with_graph(graph: G) -> Self {
        OrganizationModel {
            graph,
            restrictions: RestrictionIndex::new(),
            solver_config: SolverConfig::default(),
            composition_config: CompositionConfig::default(),
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn restrictions(&self) -> &RestrictionIndex {
        &self.restrictions
    }

    pub fn restrictions_mut(&mut self) -> &mut RestrictionIndex {
        &mut self.restrictions
    }

    pub fn set_solver_config(&mut self, config: SolverConfig) {
        self.solver_config = config;
    }

    pub fn set_composition_config(&mut self, config: CompositionConfig) {
        self.composition_config = config;
    }

    /// Register an instance of `class` modeled by `model`.
    pub fn create_instance(&mut self, instance: &Iri, class: &Iri, model: &Iri) {
        self.graph.instance_of(instance, class);
        self.graph.relate(instance, &vocabulary::MODELED_BY, model);
    }

    /// The model an instance resolves to (itself when unmodeled).
    pub fn resource_model(&self, instance: &Iri) -> Iri {
        inference::resource_model(&self.graph, instance)
    }

    /// Run fixed-point capability inference, adding `provides` edges.
    pub fn run_inference_engine(&mut self) {
        inference::run_inference_engine(&mut self.graph);
    }

    /// Compose new actors from every compatible combination of the
    /// atomic actor instances.
    pub fn compute_actors_from_recombination(&mut self) -> Result<Vec<Iri>, CompositionError> {
        composition::compute_actors_from_recombination(&mut self.graph, &self.composition_config)
    }

    /// Cardinality-accounted support check between two models.
    pub fn is_supporting(
        &self,
        provider_model: &Iri,
        service_model: &Iri,
    ) -> Result<bool, SolverError> {
        solver::is_supporting(
            &self.graph,
            &self.restrictions,
            provider_model,
            service_model,
            &self.solver_config,
        )
    }

    /// The candidate models individually supported by the combined
    /// resources of `combination`.
    pub fn filter_supported_models(
        &self,
        combination: &[Iri],
        candidates: &[Iri],
    ) -> Result<Vec<Iri>, SolverError> {
        solver::filter_supported_models(
            &self.graph,
            &self.restrictions,
            combination,
            candidates,
            &self.solver_config,
        )
    }
}
