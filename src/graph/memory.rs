//! In-memory knowledge graph.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GraphError;
use crate::iri::Iri;

use super::{KnowledgeGraph, TypeHierarchy};

/// In-memory reference implementation of [`KnowledgeGraph`].
///
/// All collections are ordered so that query results and engine runs are
/// deterministic across invocations.
#[derive(Debug, Default, Clone)]
pub struct MemoryGraph {
    /// instance -> direct classes
    instances: BTreeMap<Iri, BTreeSet<Iri>>,
    /// class -> direct superclasses
    superclasses: BTreeMap<Iri, BTreeSet<Iri>>,
    /// subject -> property -> objects, in insertion order
    triples: BTreeMap<Iri, BTreeMap<Iri, Vec<Iri>>>,
    /// alias -> canonical representative
    canonical: BTreeMap<Iri, Iri>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an identifier to its canonical representative.
    fn canonical_of(&self, iri: &Iri) -> Iri {
        let mut current = iri;
        while let Some(next) = self.canonical.get(current) {
            current = next;
        }
        current.clone()
    }
}

impl TypeHierarchy for MemoryGraph {
    fn is_subtype_of(&self, sub: &Iri, sup: &Iri) -> bool {
        sub == sup || self.is_subclass_of(sub, sup)
    }
}

impl KnowledgeGraph for MemoryGraph {
    fn instance_of(&mut self, instance: &Iri, class: &Iri) {
        self.instances
            .entry(instance.clone())
            .or_default()
            .insert(class.clone());
    }

    fn subclass_of(&mut self, sub: &Iri, sup: &Iri) {
        self.superclasses
            .entry(sub.clone())
            .or_default()
            .insert(sup.clone());
    }

    fn equivalent(&mut self, instance: &Iri, other: &Iri) {
        let target = self.canonical_of(instance);
        let source = self.canonical_of(other);
        if source != target {
            self.canonical.insert(source, target);
        }
    }

    fn relate(&mut self, subject: &Iri, property: &Iri, object: &Iri) -> bool {
        let objects = self
            .triples
            .entry(subject.clone())
            .or_default()
            .entry(property.clone())
            .or_default();
        if objects.contains(object) {
            return false;
        }
        objects.push(object.clone());
        true
    }

    fn is_instance_of(&self, instance: &Iri, class: &Iri) -> bool {
        match self.instances.get(instance) {
            Some(classes) => classes
                .iter()
                .any(|c| c == class || self.is_subclass_of(c, class)),
            None => false,
        }
    }

    fn is_subclass_of(&self, sub: &Iri, sup: &Iri) -> bool {
        let mut visited: BTreeSet<&Iri> = BTreeSet::new();
        let mut frontier: Vec<&Iri> = vec![sub];
        while let Some(current) = frontier.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(parents) = self.superclasses.get(current) {
                for parent in parents {
                    if parent == sup {
                        return true;
                    }
                    frontier.push(parent);
                }
            }
        }
        false
    }

    fn is_related_to(&self, subject: &Iri, property: &Iri, object: &Iri) -> bool {
        self.triples
            .get(subject)
            .and_then(|props| props.get(property))
            .map_or(false, |objects| objects.contains(object))
    }

    fn all_instances_of(&self, class: &Iri, direct_only: bool) -> Vec<Iri> {
        self.instances
            .iter()
            .filter(|(_, classes)| {
                if direct_only {
                    classes.contains(class)
                } else {
                    classes
                        .iter()
                        .any(|c| c == class || self.is_subclass_of(c, class))
                }
            })
            .map(|(instance, _)| instance.clone())
            .collect()
    }

    fn all_related_instances(&self, subject: &Iri, property: &Iri) -> Vec<Iri> {
        self.triples
            .get(subject)
            .and_then(|props| props.get(property))
            .cloned()
            .unwrap_or_default()
    }

    fn related_instance(&self, subject: &Iri, property: &Iri) -> Result<Iri, GraphError> {
        self.all_related_instances(subject, property)
            .into_iter()
            .next()
            .ok_or_else(|| GraphError::NotFound {
                instance: subject.clone(),
                relation: property.clone(),
            })
    }

    fn unique_list(&self, list: Vec<Iri>) -> Vec<Iri> {
        let mut seen: BTreeSet<Iri> = BTreeSet::new();
        let mut unique = Vec::new();
        for iri in list {
            let canonical = self.canonical_of(&iri);
            if seen.insert(canonical.clone()) {
                unique.push(canonical);
            }
        }
        unique
    }
}
