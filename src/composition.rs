//! Interface compatibility and actor composition.
//!
//! Two entities are compatible when any cross pair of their models'
//! interfaces is related by `compatibleWith`. Composition walks the pool
//! of atomic actors, joins compatible pairs into composite actors and
//! keeps joining the composites against the remaining pool.
//!
//! Recombination runs on an explicit work queue with a visited set keyed
//! by the sorted operand set of a composite, a configurable depth bound
//! and a branching cap. Graph mutations for one composite are batched and
//! committed in one deterministic step, so candidate indices and composite
//! names are stable across runs.

use std::collections::{BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::CompositionError;
use crate::graph::KnowledgeGraph;
use crate::inference::resource_model;
use crate::iri::Iri;
use crate::vocabulary;

/// A matchable pair of interfaces, one per operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub own_interface: Iri,
    pub other_interface: Iri,
}

/// Bounds on the recombination search.
#[derive(Debug, Clone)]
pub struct CompositionConfig {
    /// Maximum number of operands joined into one composite.
    pub max_depth: usize,
    /// Cap on interface matchings considered per pair.
    pub max_candidates_per_pair: usize,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        CompositionConfig {
            max_depth: 8,
            max_candidates_per_pair: 32,
        }
    }
}

/// Interfaces owned by an entity's model.
fn model_interfaces<G: KnowledgeGraph>(graph: &G, entity: &Iri) -> Vec<Iri> {
    let model = resource_model(graph, entity);
    graph
        .all_related_instances(&model, &vocabulary::HAS)
        .into_iter()
        .filter(|owned| graph.is_instance_of(owned, &vocabulary::INTERFACE))
        .collect()
}

/// Interfaces already consumed by an entity or its model.
fn used_interfaces<G: KnowledgeGraph>(graph: &G, entity: &Iri) -> Vec<Iri> {
    let mut used = graph.all_related_instances(entity, &vocabulary::USES);
    let model = resource_model(graph, entity);
    if model != *entity {
        used.extend(graph.all_related_instances(&model, &vocabulary::USES));
    }
    used
}

/// True if any cross pair of the two entities' interface models is
/// related by `compatibleWith`. First hit wins.
pub fn check_if_compatible<G: KnowledgeGraph>(graph: &G, entity: &Iri, other: &Iri) -> bool {
    let own_interfaces = model_interfaces(graph, entity);
    let other_interfaces = model_interfaces(graph, other);

    for own in &own_interfaces {
        let own_model = resource_model(graph, own);
        for theirs in &other_interfaces {
            let their_model = resource_model(graph, theirs);
            if graph.is_related_to(&own_model, &vocabulary::COMPATIBLE_WITH, &their_model) {
                log::debug!(
                    "'{}' compatible with '{}' via '{}' and '{}'",
                    entity,
                    other,
                    own,
                    theirs
                );
                return true;
            }
        }
    }
    false
}

/// Every compatible cross pair of *unused* interfaces between the two
/// entities, in deterministic order.
pub fn check_if_compatible_now<G: KnowledgeGraph>(
    graph: &G,
    entity: &Iri,
    other: &Iri,
) -> Vec<Candidate> {
    let own_used = used_interfaces(graph, entity);
    let other_used = used_interfaces(graph, other);

    let own_interfaces: Vec<Iri> = model_interfaces(graph, entity)
        .into_iter()
        .filter(|interface| !own_used.contains(interface))
        .collect();
    let other_interfaces: Vec<Iri> = model_interfaces(graph, other)
        .into_iter()
        .filter(|interface| !other_used.contains(interface))
        .collect();

    if own_interfaces.is_empty() || other_interfaces.is_empty() {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for own in &own_interfaces {
        let own_model = resource_model(graph, own);
        for theirs in &other_interfaces {
            let their_model = resource_model(graph, theirs);
            if graph.is_related_to(&own_model, &vocabulary::COMPATIBLE_WITH, &their_model) {
                candidates.push(Candidate {
                    own_interface: own.clone(),
                    other_interface: theirs.clone(),
                });
            }
        }
    }
    candidates
}

/// One pending join of an actor (atomic or composite) against a pool.
struct WorkItem {
    actor: Iri,
    operands: BTreeSet<Iri>,
    remaining: Vec<Iri>,
    depth: usize,
}

/// A graph mutation deferred until the composite it belongs to commits.
enum Mutation {
    SubclassOf(Iri, Iri),
    InstanceOf(Iri, Iri),
    Relate(Iri, Iri, Iri),
}

fn commit<G: KnowledgeGraph>(graph: &mut G, batch: Vec<Mutation>) {
    for mutation in batch {
        match mutation {
            Mutation::SubclassOf(sub, sup) => graph.subclass_of(&sub, &sup),
            Mutation::InstanceOf(instance, class) => graph.instance_of(&instance, &class),
            Mutation::Relate(subject, property, object) => {
                graph.relate(&subject, &property, &object);
            }
        }
    }
}

/// Create the composite for one candidate matching and return its
/// instance identifier.
fn synthesize<G: KnowledgeGraph>(
    graph: &mut G,
    actor: &Iri,
    other: &Iri,
    candidate: &Candidate,
    candidate_id: usize,
) -> Iri {
    let actor_model = resource_model(graph, actor);
    let other_model = resource_model(graph, other);

    let instance = Iri::resolve(
        actor.prefix(),
        &format!("{}+{}[{}]", actor.local_name(), other.local_name(), candidate_id),
    );
    let class = Iri::new(format!("{}+{}[{}]", actor_model, other_model, candidate_id));

    let batch = vec![
        Mutation::SubclassOf(vocabulary::COMPOSITE_ACTOR.clone(), vocabulary::ACTOR.clone()),
        Mutation::InstanceOf(class.clone(), vocabulary::COMPOSITE_ACTOR.clone()),
        Mutation::Relate(instance.clone(), vocabulary::MODELED_BY.clone(), class.clone()),
        Mutation::Relate(instance.clone(), vocabulary::HAS.clone(), actor.clone()),
        Mutation::Relate(instance.clone(), vocabulary::HAS.clone(), other.clone()),
        Mutation::Relate(class.clone(), vocabulary::DEPENDS_ON.clone(), actor_model),
        Mutation::Relate(class.clone(), vocabulary::DEPENDS_ON.clone(), other_model),
        Mutation::Relate(class.clone(), vocabulary::USES.clone(), candidate.own_interface.clone()),
        Mutation::Relate(class.clone(), vocabulary::USES.clone(), candidate.other_interface.clone()),
    ];
    commit(graph, batch);

    log::info!(
        "new composite actor '{}' of class '{}' joining '{}' and '{}'",
        instance,
        class,
        actor,
        other
    );
    instance
}

/// Compose new actors out of every compatible combination of the direct
/// actor instances.
///
/// Returns the instances created, in creation order. Fails if the graph
/// holds no atomic actors at all.
pub fn compute_actors_from_recombination<G: KnowledgeGraph>(
    graph: &mut G,
    config: &CompositionConfig,
) -> Result<Vec<Iri>, CompositionError> {
    let actors = graph.all_instances_of(&vocabulary::ACTOR, true);
    if actors.is_empty() {
        return Err(CompositionError::NoActorsToRecombine);
    }
    let actors = graph.unique_list(actors);
    log::debug!("recombination over {} atomic actors", actors.len());

    let mut queue: VecDeque<WorkItem> = actors
        .iter()
        .map(|actor| WorkItem {
            actor: actor.clone(),
            operands: BTreeSet::from([actor.clone()]),
            remaining: actors.iter().filter(|a| *a != actor).cloned().collect(),
            depth: 1,
        })
        .collect();

    let mut visited: HashSet<Vec<Iri>> = HashSet::new();
    let mut composites = Vec::new();

    while let Some(item) = queue.pop_front() {
        for other in &item.remaining {
            let mut candidates = check_if_compatible_now(graph, &item.actor, other);
            if candidates.is_empty() {
                continue;
            }
            if candidates.len() > config.max_candidates_per_pair {
                log::warn!(
                    "capping {} interface matchings between '{}' and '{}' to {}",
                    candidates.len(),
                    item.actor,
                    other,
                    config.max_candidates_per_pair
                );
                candidates.truncate(config.max_candidates_per_pair);
            }

            for (candidate_id, candidate) in candidates.iter().enumerate() {
                let composite = synthesize(graph, &item.actor, other, candidate, candidate_id);
                composites.push(composite.clone());

                let mut operands = item.operands.clone();
                operands.insert(other.clone());
                let rest: Vec<Iri> = item
                    .remaining
                    .iter()
                    .filter(|a| *a != other)
                    .cloned()
                    .collect();

                // Sorted operand set keys the visited check, so the same
                // combination is expanded once no matter which join order
                // produced it.
                let key: Vec<Iri> = operands.iter().cloned().collect();
                if !rest.is_empty()
                    && item.depth < config.max_depth
                    && visited.insert(key)
                {
                    queue.push_back(WorkItem {
                        actor: composite,
                        operands,
                        remaining: rest,
                        depth: item.depth + 1,
                    });
                }
            }
        }
    }

    Ok(composites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;
    use crate::vocabulary::{
        ACTOR, COMPATIBLE_WITH, COMPOSITE_ACTOR, HAS, INTERFACE, MODELED_BY, USES,
    };

    fn iri(name: &str) -> Iri {
        Iri::new(format!("urn:test#{}", name))
    }

    /// An actor instance with a model owning the given interfaces.
    fn add_actor(graph: &mut MemoryGraph, name: &str, model: &str, interfaces: &[&str]) {
        graph.instance_of(&iri(name), &ACTOR);
        graph.relate(&iri(name), &MODELED_BY, &iri(model));
        for interface in interfaces {
            graph.instance_of(&iri(interface), &INTERFACE);
            graph.relate(&iri(model), &HAS, &iri(interface));
            graph.relate(
                &iri(interface),
                &MODELED_BY,
                &iri(&format!("{}-type", interface)),
            );
        }
    }

    /// Two actors joinable through one compatible interface pair.
    fn pair_scenario() -> MemoryGraph {
        let mut graph = MemoryGraph::new();
        add_actor(&mut graph, "a", "ModelA", &["if-a"]);
        add_actor(&mut graph, "b", "ModelB", &["if-b"]);
        graph.relate(&iri("if-a-type"), &COMPATIBLE_WITH, &iri("if-b-type"));
        graph
    }

    #[test]
    fn test_check_if_compatible_first_hit() {
        let graph = pair_scenario();
        assert!(check_if_compatible(&graph, &iri("a"), &iri("b")));
        // compatibleWith is directed; the reverse pair was never declared.
        assert!(!check_if_compatible(&graph, &iri("b"), &iri("a")));
    }

    #[test]
    fn test_compatible_now_excludes_used_interfaces() {
        let mut graph = pair_scenario();
        assert_eq!(check_if_compatible_now(&graph, &iri("a"), &iri("b")).len(), 1);

        graph.relate(&iri("a"), &USES, &iri("if-a"));
        assert!(check_if_compatible_now(&graph, &iri("a"), &iri("b")).is_empty());
    }

    #[test]
    fn test_compatible_now_returns_every_cross_pair() {
        let mut graph = MemoryGraph::new();
        add_actor(&mut graph, "a", "ModelA", &["if-a0", "if-a1"]);
        add_actor(&mut graph, "b", "ModelB", &["if-b"]);
        graph.relate(&iri("if-a0-type"), &COMPATIBLE_WITH, &iri("if-b-type"));
        graph.relate(&iri("if-a1-type"), &COMPATIBLE_WITH, &iri("if-b-type"));

        let candidates = check_if_compatible_now(&graph, &iri("a"), &iri("b"));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].other_interface, iri("if-b"));
        assert_eq!(candidates[1].other_interface, iri("if-b"));
        assert_ne!(candidates[0].own_interface, candidates[1].own_interface);
    }

    #[test]
    fn test_recombination_requires_actors() {
        let mut graph = MemoryGraph::new();
        let result = compute_actors_from_recombination(&mut graph, &CompositionConfig::default());
        assert!(matches!(result, Err(CompositionError::NoActorsToRecombine)));
    }

    #[test]
    fn test_pair_composition_creates_composite() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut graph = pair_scenario();
        let composites =
            compute_actors_from_recombination(&mut graph, &CompositionConfig::default()).unwrap();

        // One composite per direction of the compatible pair declaration:
        // only a->b matches, so exactly one composite from the a side.
        assert_eq!(composites.len(), 1);
        let composite = &composites[0];
        assert_eq!(composite.local_name(), "a+b[0]");

        let class = graph.related_instance(composite, &MODELED_BY).unwrap();
        assert!(graph.is_instance_of(&class, &COMPOSITE_ACTOR));
        assert!(graph.is_instance_of(&class, &ACTOR));
        assert!(graph.is_related_to(composite, &HAS, &iri("a")));
        assert!(graph.is_related_to(composite, &HAS, &iri("b")));
        assert!(graph.is_related_to(&class, &USES, &iri("if-a")));
        assert!(graph.is_related_to(&class, &USES, &iri("if-b")));
    }

    /// Two matchings between the same pair fan out into two distinct
    /// composites with candidate indices 0 and 1.
    #[test]
    fn test_composition_fan_out() {
        let mut graph = MemoryGraph::new();
        add_actor(&mut graph, "a", "ModelA", &["if-a0", "if-a1"]);
        add_actor(&mut graph, "b", "ModelB", &["if-b"]);
        graph.relate(&iri("if-a0-type"), &COMPATIBLE_WITH, &iri("if-b-type"));
        graph.relate(&iri("if-a1-type"), &COMPATIBLE_WITH, &iri("if-b-type"));

        assert_eq!(check_if_compatible_now(&graph, &iri("a"), &iri("b")).len(), 2);

        let composites =
            compute_actors_from_recombination(&mut graph, &CompositionConfig::default()).unwrap();
        assert_eq!(composites.len(), 2);
        assert_eq!(composites[0].local_name(), "a+b[0]");
        assert_eq!(composites[1].local_name(), "a+b[1]");
        assert_ne!(composites[0], composites[1]);

        let class_0 = graph.related_instance(&composites[0], &MODELED_BY).unwrap();
        let class_1 = graph.related_instance(&composites[1], &MODELED_BY).unwrap();
        assert!(class_0.as_str().ends_with("[0]"));
        assert!(class_1.as_str().ends_with("[1]"));
    }

    #[test]
    fn test_branching_cap_truncates_candidates() {
        let mut graph = MemoryGraph::new();
        add_actor(&mut graph, "a", "ModelA", &["if-a0", "if-a1", "if-a2"]);
        add_actor(&mut graph, "b", "ModelB", &["if-b"]);
        for own in ["if-a0", "if-a1", "if-a2"] {
            graph.relate(
                &iri(&format!("{}-type", own)),
                &COMPATIBLE_WITH,
                &iri("if-b-type"),
            );
        }

        let config = CompositionConfig {
            max_candidates_per_pair: 2,
            ..CompositionConfig::default()
        };
        let composites = compute_actors_from_recombination(&mut graph, &config).unwrap();
        assert_eq!(composites.len(), 2);
    }

    #[test]
    fn test_recombination_is_deterministic() {
        let run = || {
            let mut graph = pair_scenario();
            add_actor(&mut graph, "c", "ModelC", &["if-c"]);
            graph.relate(&iri("if-b-type"), &COMPATIBLE_WITH, &iri("if-c-type"));
            compute_actors_from_recombination(&mut graph, &CompositionConfig::default()).unwrap()
        };
        assert_eq!(run(), run());
    }
}
