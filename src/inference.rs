//! Capability inference engine.
//!
//! Sweeps actor-model/service-model pairs and adds `provides` edges for
//! every fulfilled service until a full sweep adds nothing. The relation
//! is monotone on a finite domain, so the fixed point is reached within
//! `|actors| x |services|` edge insertions.
//!
//! Fulfillment here is an existence check over owned resources and
//! already-inferred services; cardinality accounting is the solver's job.

use crate::graph::KnowledgeGraph;
use crate::iri::Iri;
use crate::vocabulary;

/// The model an instance is `modeledBy`.
///
/// An entity without a declared model is its own model; the missing edge
/// degrades softly and is never an error.
pub fn resource_model<G: KnowledgeGraph>(graph: &G, instance: &Iri) -> Iri {
    graph
        .related_instance(instance, &vocabulary::MODELED_BY)
        .unwrap_or_else(|_| instance.clone())
}

/// True if both instances resolve to the same model.
pub fn is_same_resource_model<G: KnowledgeGraph>(graph: &G, instance: &Iri, other: &Iri) -> bool {
    resource_model(graph, instance) == resource_model(graph, other)
}

/// Existence check: can `provider` satisfy every dependency of
/// `requirement`?
///
/// A dependency is satisfied if some resource in the provider model's
/// `has` set resolves to the same model, or if the dependency's model is
/// already in the provider's `provides` set. Vacuously true with no
/// dependencies; the first unsatisfied dependency short-circuits.
pub fn check_if_fulfills<G: KnowledgeGraph>(
    graph: &G,
    provider: &Iri,
    requirement: &Iri,
) -> bool {
    let provider_model = resource_model(graph, provider);
    let available_resources = graph.all_related_instances(&provider_model, &vocabulary::HAS);
    let available_services = graph.all_related_instances(&provider_model, &vocabulary::PROVIDES);

    let requirement_model = resource_model(graph, requirement);
    let dependencies = graph.all_related_instances(&requirement_model, &vocabulary::DEPENDS_ON);

    for dependency in &dependencies {
        let mut fulfilled = available_resources
            .iter()
            .any(|resource| is_same_resource_model(graph, dependency, resource));

        if !fulfilled {
            let dependency_model = resource_model(graph, dependency);
            fulfilled = available_services.contains(&dependency_model);
        }

        if !fulfilled {
            log::debug!(
                "inference: requirement '{}' cannot be fulfilled by '{}'",
                dependency,
                provider
            );
            return false;
        }
    }
    true
}

/// Run fixed-point capability inference over the whole graph.
///
/// Mutates the graph by adding `provides` edges; idempotent on a static
/// graph.
pub fn run_inference_engine<G: KnowledgeGraph>(graph: &mut G) {
    let actors = graph.all_instances_of(&vocabulary::ACTOR_MODEL, false);
    let services = graph.all_instances_of(&vocabulary::SERVICE_MODEL, false);
    log::info!(
        "run inference engine: {} actor models, {} service models",
        actors.len(),
        services.len()
    );

    let mut updated = true;
    while updated {
        updated = false;
        for actor in &actors {
            for service in &services {
                if graph.is_related_to(actor, &vocabulary::PROVIDES, service) {
                    continue;
                }
                if check_if_fulfills(graph, actor, service)
                    && graph.relate(actor, &vocabulary::PROVIDES, service)
                {
                    log::debug!("inference: '{}' provides '{}'", actor, service);
                    updated = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;
    use crate::vocabulary::{ACTOR_MODEL, DEPENDS_ON, HAS, MODELED_BY, PROVIDES, SERVICE_MODEL};

    fn iri(name: &str) -> Iri {
        Iri::new(format!("urn:test#{}", name))
    }

    /// One actor model owning a camera, one service depending on cameras.
    fn camera_scenario() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        graph.instance_of(&iri("Sherpa"), &ACTOR_MODEL);
        graph.instance_of(&iri("ImageProvider"), &SERVICE_MODEL);

        graph.relate(&iri("Sherpa"), &HAS, &iri("camera-0"));
        graph.relate(&iri("camera-0"), &MODELED_BY, &iri("Camera"));

        graph.relate(&iri("ImageProvider"), &DEPENDS_ON, &iri("camera-dep"));
        graph.relate(&iri("camera-dep"), &MODELED_BY, &iri("Camera"));
        graph
    }

    #[test]
    fn test_resource_model_falls_back_to_self() {
        let mut graph = MemoryGraph::new();
        graph.relate(&iri("x"), &MODELED_BY, &iri("ModelX"));

        assert_eq!(resource_model(&graph, &iri("x")), iri("ModelX"));
        assert_eq!(resource_model(&graph, &iri("unmodeled")), iri("unmodeled"));
    }

    #[test]
    fn test_inference_adds_provides_edge() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut graph = camera_scenario();
        run_inference_engine(&mut graph);
        assert!(graph.is_related_to(&iri("Sherpa"), &PROVIDES, &iri("ImageProvider")));
    }

    #[test]
    fn test_inference_is_idempotent() {
        let mut graph = camera_scenario();
        run_inference_engine(&mut graph);
        let provides_after_first =
            graph.all_related_instances(&iri("Sherpa"), &PROVIDES);

        run_inference_engine(&mut graph);
        let provides_after_second =
            graph.all_related_instances(&iri("Sherpa"), &PROVIDES);
        assert_eq!(provides_after_first, provides_after_second);
    }

    #[test]
    fn test_inference_is_monotone_under_added_facts() {
        let mut graph = camera_scenario();

        // A second service that the actor cannot fulfill yet.
        graph.instance_of(&iri("Mapping"), &SERVICE_MODEL);
        graph.relate(&iri("Mapping"), &DEPENDS_ON, &iri("lidar-dep"));
        graph.relate(&iri("lidar-dep"), &MODELED_BY, &iri("Lidar"));

        run_inference_engine(&mut graph);
        let before = graph.all_related_instances(&iri("Sherpa"), &PROVIDES);
        assert!(before.contains(&iri("ImageProvider")));
        assert!(!before.contains(&iri("Mapping")));

        // Granting the missing resource only ever adds edges.
        graph.relate(&iri("Sherpa"), &HAS, &iri("lidar-0"));
        graph.relate(&iri("lidar-0"), &MODELED_BY, &iri("Lidar"));
        run_inference_engine(&mut graph);

        let after = graph.all_related_instances(&iri("Sherpa"), &PROVIDES);
        for edge in &before {
            assert!(after.contains(edge));
        }
        assert!(after.contains(&iri("Mapping")));
    }

    /// A service dependency satisfied through an already-inferred service
    /// rather than an owned resource.
    #[test]
    fn test_dependency_satisfied_by_provided_service() {
        let mut graph = camera_scenario();

        graph.instance_of(&iri("Surveying"), &SERVICE_MODEL);
        graph.relate(&iri("Surveying"), &DEPENDS_ON, &iri("image-dep"));
        graph.relate(&iri("image-dep"), &MODELED_BY, &iri("ImageProvider"));

        run_inference_engine(&mut graph);
        assert!(graph.is_related_to(&iri("Sherpa"), &PROVIDES, &iri("Surveying")));
    }

    #[test]
    fn test_no_dependencies_is_vacuously_fulfilled() {
        let mut graph = MemoryGraph::new();
        graph.instance_of(&iri("Idle"), &ACTOR_MODEL);
        graph.instance_of(&iri("Noop"), &SERVICE_MODEL);

        run_inference_engine(&mut graph);
        assert!(graph.is_related_to(&iri("Idle"), &PROVIDES, &iri("Noop")));
    }
}
