//! Instance-level resource matching.
//!
//! One assigned-subset slot per required restriction, ranging over indices
//! of a flattened pool of concrete available units. Slots are pairwise
//! disjoint (no unit double-booked) and must not be empty; a slot's domain
//! holds only units whose type equals or is a subclass of the slot's
//! qualification. `Exact(n)` and `Min(n)` pin the slot size to exactly
//! `n`; `Max(n)` allows any size up to `n` within the global non-empty
//! constraint.

use crate::error::SolverError;
use crate::graph::TypeHierarchy;
use crate::iri::Iri;
use crate::restriction::{Cardinality, Restriction};

use super::store::Trail;
use super::{InstanceSolution, SlotAssignment, SolverConfig};

pub(crate) fn solve<H: TypeHierarchy + ?Sized>(
    required: &[Restriction],
    pool: &[Iri],
    hierarchy: &H,
    config: &SolverConfig,
) -> Result<Option<InstanceSolution>, SolverError> {
    if required.is_empty() {
        return Ok(Some(InstanceSolution::default()));
    }

    // Candidate pool indices per slot, restricted by type compatibility.
    let domains: Vec<Vec<usize>> = required
        .iter()
        .map(|restriction| {
            pool.iter()
                .enumerate()
                .filter(|(_, unit)| hierarchy.is_subtype_of(unit, &restriction.qualification))
                .map(|(index, _)| index)
                .collect()
        })
        .collect();

    // Every slot is subject to the global non-empty constraint, so a lower
    // bound of zero clamps to one and a zero cardinality is unsatisfiable.
    let ranges: Vec<(u32, u32)> = required
        .iter()
        .map(|restriction| match restriction.cardinality {
            // MIN is pinned to an exact count, matching observed behavior.
            Cardinality::Min(n) | Cardinality::Exact(n) => (n.max(1), n),
            Cardinality::Max(n) => (1, n),
        })
        .collect();

    let mut search = Search {
        domains: &domains,
        ranges: &ranges,
        used: vec![false; pool.len()],
        chosen: vec![Vec::new(); required.len()],
        trail: Trail::new(),
        steps: 0,
        max_steps: config.max_steps,
    };

    if search.assign_slot(0)? {
        let slots = required
            .iter()
            .zip(&search.chosen)
            .map(|(restriction, units)| SlotAssignment {
                requirement: restriction.clone(),
                assigned: units.iter().map(|&index| pool[index].clone()).collect(),
            })
            .collect();
        Ok(Some(InstanceSolution { slots }))
    } else {
        log::debug!(
            "instance match infeasible: {} slots vs pool of {}",
            required.len(),
            pool.len()
        );
        Ok(None)
    }
}

struct Search<'a> {
    domains: &'a [Vec<usize>],
    ranges: &'a [(u32, u32)],
    used: Vec<bool>,
    chosen: Vec<Vec<usize>>,
    trail: Trail<Undo>,
    steps: u64,
    max_steps: Option<u64>,
}

struct Undo {
    slot: usize,
    unit: usize,
}

impl Search<'_> {
    fn step(&mut self) -> Result<(), SolverError> {
        self.steps += 1;
        match self.max_steps {
            Some(limit) if self.steps > limit => {
                Err(SolverError::SearchExhausted { steps: limit })
            }
            _ => Ok(()),
        }
    }

    fn assign_slot(&mut self, slot: usize) -> Result<bool, SolverError> {
        if slot == self.domains.len() {
            return Ok(true);
        }
        let (lo, hi) = self.ranges[slot];
        if lo > hi {
            return Ok(false);
        }
        for size in lo..=hi {
            let checkpoint = self.trail.mark();
            if self.pick(slot, 0, size as usize)? {
                return Ok(true);
            }
            let (used, chosen) = (&mut self.used, &mut self.chosen);
            self.trail.unwind(checkpoint, |undo| {
                used[undo.unit] = false;
                chosen[undo.slot].pop();
            });
        }
        Ok(false)
    }

    /// Extend `slot` with `remaining` more units drawn from its domain at
    /// or after `start`, in lexicographic order.
    fn pick(&mut self, slot: usize, start: usize, remaining: usize) -> Result<bool, SolverError> {
        self.step()?;
        if remaining == 0 {
            return self.assign_slot(slot + 1);
        }
        let domain = &self.domains[slot];
        if start + remaining > domain.len() {
            return Ok(false);
        }
        for position in start..domain.len() {
            let unit = domain[position];
            if self.used[unit] {
                continue;
            }
            let checkpoint = self.trail.mark();
            self.used[unit] = true;
            self.chosen[slot].push(unit);
            self.trail.push(Undo { slot, unit });

            if self.pick(slot, position + 1, remaining - 1)? {
                return Ok(true);
            }
            let (used, chosen) = (&mut self.used, &mut self.chosen);
            self.trail.unwind(checkpoint, |undo| {
                used[undo.unit] = false;
                chosen[undo.slot].pop();
            });
        }
        Ok(false)
    }
}
