//! Cardinality restrictions and aggregated model bounds.
//!
//! A [`Restriction`] states "needs {min|max|exact} N of type T" for one
//! qualification type. A [`ModelBound`] is the compacted `[min, max]` count
//! range for one model, merged from every restriction sharing that
//! qualification. Both are derived values: recomputed per query, never
//! mutated in place.

mod resolver;

pub use resolver::RestrictionIndex;

use serde::{Deserialize, Serialize};

use crate::iri::Iri;

/// Restriction kind with its cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// At least `n`.
    Min(u32),
    /// At most `n`.
    Max(u32),
    /// Exactly `n`.
    Exact(u32),
}

impl Cardinality {
    /// The raw cardinality value, regardless of kind.
    pub fn value(&self) -> u32 {
        match *self {
            Cardinality::Min(n) | Cardinality::Max(n) | Cardinality::Exact(n) => n,
        }
    }
}

/// A cardinality-qualified dependency on a typed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    /// The required type.
    pub qualification: Iri,
    /// Kind and count.
    pub cardinality: Cardinality,
}

impl Restriction {
    pub fn new(qualification: impl Into<Iri>, cardinality: Cardinality) -> Self {
        Restriction {
            qualification: qualification.into(),
            cardinality,
        }
    }
}

/// Aggregated count range for one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelBound {
    pub model: Iri,
    pub min: u32,
    pub max: u32,
}

impl ModelBound {
    /// Sentinel for "no upper bound".
    pub const UNBOUNDED: u32 = u32::MAX;

    pub fn new(model: impl Into<Iri>, min: u32, max: u32) -> Self {
        ModelBound {
            model: model.into(),
            min,
            max,
        }
    }

    /// Compact a restriction list into one bound per qualification.
    ///
    /// Multiple restrictions on the same qualification intersect: the
    /// effective minimum is the largest floor, the effective maximum the
    /// smallest ceiling. First-occurrence order of qualifications is
    /// preserved.
    pub fn from_restrictions(restrictions: &[Restriction]) -> Vec<ModelBound> {
        let mut bounds: Vec<ModelBound> = Vec::new();
        for restriction in restrictions {
            let index = match bounds
                .iter()
                .position(|b| b.model == restriction.qualification)
            {
                Some(index) => index,
                None => {
                    bounds.push(ModelBound::new(
                        restriction.qualification.clone(),
                        0,
                        Self::UNBOUNDED,
                    ));
                    bounds.len() - 1
                }
            };
            let bound = &mut bounds[index];
            match restriction.cardinality {
                Cardinality::Min(n) => bound.min = bound.min.max(n),
                Cardinality::Max(n) => bound.max = bound.max.min(n),
                Cardinality::Exact(n) => {
                    bound.min = bound.min.max(n);
                    bound.max = bound.max.min(n);
                }
            }
        }
        bounds
    }

    /// Sum bound lists per model, scaling with multiplicity.
    ///
    /// Used when several models are combined into one provider: two copies
    /// of the same model double its counts. An unbounded maximum absorbs
    /// any addition.
    pub fn sum(lists: &[Vec<ModelBound>]) -> Vec<ModelBound> {
        let mut merged: Vec<ModelBound> = Vec::new();
        for list in lists {
            for bound in list {
                match merged.iter().position(|b| b.model == bound.model) {
                    Some(index) => {
                        let existing = &mut merged[index];
                        existing.min = existing.min.saturating_add(bound.min);
                        existing.max =
                            if existing.max == Self::UNBOUNDED || bound.max == Self::UNBOUNDED {
                                Self::UNBOUNDED
                            } else {
                                existing.max.saturating_add(bound.max)
                            };
                    }
                    None => merged.push(bound.clone()),
                }
            }
        }
        merged
    }

    /// Expand bounds into a flattened pool of concrete units, one entry
    /// per unit, typed by its model.
    ///
    /// With `optimistic` the maximum cardinality is used where bounded;
    /// unbounded models fall back to their minimum rather than inflating
    /// the pool indefinitely.
    pub fn to_instance_pool(bounds: &[ModelBound], optimistic: bool) -> Vec<Iri> {
        let mut pool = Vec::new();
        for bound in bounds {
            let mut count = bound.min;
            if optimistic && bound.max != Self::UNBOUNDED {
                count = bound.max;
            }
            for _ in 0..count {
                pool.push(bound.model.clone());
            }
        }
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(name: &str) -> Iri {
        Iri::new(format!("urn:test#{}", name))
    }

    #[test]
    fn test_compaction_intersects_same_qualification() {
        let restrictions = vec![
            Restriction::new(iri("Camera"), Cardinality::Min(1)),
            Restriction::new(iri("Camera"), Cardinality::Max(3)),
            Restriction::new(iri("Arm"), Cardinality::Exact(2)),
        ];
        let bounds = ModelBound::from_restrictions(&restrictions);
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0], ModelBound::new(iri("Camera"), 1, 3));
        assert_eq!(bounds[1], ModelBound::new(iri("Arm"), 2, 2));
    }

    #[test]
    fn test_min_only_leaves_max_unbounded() {
        let bounds = ModelBound::from_restrictions(&[Restriction::new(
            iri("Camera"),
            Cardinality::Min(2),
        )]);
        assert_eq!(bounds[0].min, 2);
        assert_eq!(bounds[0].max, ModelBound::UNBOUNDED);
    }

    #[test]
    fn test_sum_scales_with_multiplicity() {
        let one = vec![ModelBound::new(iri("Camera"), 1, 2)];
        let summed = ModelBound::sum(&[one.clone(), one]);
        assert_eq!(summed, vec![ModelBound::new(iri("Camera"), 2, 4)]);

        let unbounded = vec![ModelBound::new(iri("Arm"), 1, ModelBound::UNBOUNDED)];
        let capped = vec![ModelBound::new(iri("Arm"), 1, 4)];
        let summed = ModelBound::sum(&[unbounded, capped]);
        assert_eq!(summed[0].min, 2);
        assert_eq!(summed[0].max, ModelBound::UNBOUNDED);
    }

    #[test]
    fn test_instance_pool_expansion() {
        let bounds = vec![
            ModelBound::new(iri("Camera"), 1, 3),
            ModelBound::new(iri("Arm"), 2, ModelBound::UNBOUNDED),
        ];

        let pessimistic = ModelBound::to_instance_pool(&bounds, false);
        assert_eq!(pessimistic, vec![iri("Camera"), iri("Arm"), iri("Arm")]);

        // Optimistic takes the max where bounded, the min where not.
        let optimistic = ModelBound::to_instance_pool(&bounds, true);
        assert_eq!(
            optimistic,
            vec![iri("Camera"), iri("Camera"), iri("Camera"), iri("Arm"), iri("Arm")]
        );
    }
}
