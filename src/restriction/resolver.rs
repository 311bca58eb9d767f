//! Restriction resolution with subclass inheritance.

use std::collections::BTreeMap;

use crate::graph::KnowledgeGraph;
use crate::iri::Iri;

use super::{Cardinality, ModelBound, Restriction};

/// Registry of declared cardinality restrictions, keyed by the class they
/// are declared on.
///
/// Resolution walks the subclass hierarchy: a type inherits every
/// restriction declared on any of its ancestors, and the collected list is
/// compacted so that no two entries overlap on the same qualification.
#[derive(Debug, Default, Clone)]
pub struct RestrictionIndex {
    declared: BTreeMap<Iri, Vec<Restriction>>,
}

impl RestrictionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a restriction on a class.
    pub fn declare(&mut self, class: &Iri, restriction: Restriction) {
        self.declared
            .entry(class.clone())
            .or_default()
            .push(restriction);
    }

    /// Restrictions declared directly on a class, without inheritance.
    pub fn declared_on(&self, class: &Iri) -> &[Restriction] {
        self.declared.get(class).map_or(&[], Vec::as_slice)
    }

    /// Effective restrictions for a type: own declarations plus inherited
    /// ones, compacted to one bound per qualification.
    pub fn resolve<G: KnowledgeGraph>(&self, graph: &G, ty: &Iri) -> Vec<Restriction> {
        let mut collected = Vec::new();
        for (class, restrictions) in &self.declared {
            if class == ty || graph.is_subclass_of(ty, class) {
                collected.extend_from_slice(restrictions);
            }
        }
        compact(&collected)
    }

    /// Effective bounds for a combination of types.
    ///
    /// Each member resolves independently; the per-member bounds are then
    /// summed with multiplicity, so a combination holding the same model
    /// twice counts its resources twice.
    pub fn resolve_combination<G: KnowledgeGraph>(
        &self,
        graph: &G,
        types: &[Iri],
    ) -> Vec<ModelBound> {
        let lists: Vec<Vec<ModelBound>> = types
            .iter()
            .map(|ty| ModelBound::from_restrictions(&self.resolve(graph, ty)))
            .collect();
        ModelBound::sum(&lists)
    }
}

/// Re-emit a restriction list with at most one entry per qualification.
fn compact(restrictions: &[Restriction]) -> Vec<Restriction> {
    ModelBound::from_restrictions(restrictions)
        .into_iter()
        .flat_map(|bound| {
            if bound.min == bound.max {
                vec![Restriction::new(bound.model, Cardinality::Exact(bound.min))]
            } else {
                let mut out = Vec::new();
                if bound.min > 0 {
                    out.push(Restriction::new(bound.model.clone(), Cardinality::Min(bound.min)));
                }
                if bound.max != ModelBound::UNBOUNDED {
                    out.push(Restriction::new(bound.model, Cardinality::Max(bound.max)));
                }
                out
            }
        })
        .collect()
}
