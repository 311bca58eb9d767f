//! Aggregate resource matching.
//!
//! One integer variable per (requirement row, available-model column)
//! cell, counting how many units of the column's model are allocated to
//! the row's requirement:
//!
//! ```text
//!                 available-0   available-1
//! requirement-0        1             2
//! requirement-1        1             -
//! ```
//!
//! Row sums must lie within the requirement's `[min, max]`; column sums
//! must not exceed the available model's max; a cell is forced to zero
//! when the available model is not type-compatible with the requirement.
//! The search stops at the first feasible leaf.

use crate::error::SolverError;
use crate::graph::TypeHierarchy;
use crate::restriction::ModelBound;

use super::store::Trail;
use super::{Allocation, RequirementAssignment, Solution, SolverConfig};

pub(crate) fn solve<H: TypeHierarchy + ?Sized>(
    required: &[ModelBound],
    available: &[ModelBound],
    hierarchy: &H,
    config: &SolverConfig,
) -> Result<Option<Solution>, SolverError> {
    if required.is_empty() {
        // Nothing required is vacuously satisfiable.
        return Ok(Some(Solution::default()));
    }
    if available.is_empty() {
        // No columns: feasible only when every row floor is zero.
        if required.iter().all(|requirement| requirement.min == 0) {
            let assignments = required
                .iter()
                .map(|requirement| RequirementAssignment {
                    requirement: requirement.model.clone(),
                    allocations: Vec::new(),
                })
                .collect();
            return Ok(Some(Solution { assignments }));
        }
        return Ok(None);
    }

    let cols = available.len();
    let mut cell_max = vec![0u32; required.len() * cols];
    for (i, requirement) in required.iter().enumerate() {
        for (j, pool) in available.iter().enumerate() {
            if hierarchy.is_subtype_of(&pool.model, &requirement.model) {
                cell_max[i * cols + j] = requirement.max.min(pool.max);
            }
        }
    }

    let mut search = Search {
        required,
        available,
        cell_max,
        cells: vec![0u32; required.len() * cols],
        row_sum: vec![0u32; required.len()],
        col_used: vec![0u32; cols],
        trail: Trail::new(),
        steps: 0,
        max_steps: config.max_steps,
    };

    if search.assign(0)? {
        Ok(Some(search.solution()))
    } else {
        log::debug!(
            "aggregate match infeasible: {} requirements vs {} available models",
            required.len(),
            available.len()
        );
        Ok(None)
    }
}

struct Search<'a> {
    required: &'a [ModelBound],
    available: &'a [ModelBound],
    cell_max: Vec<u32>,
    cells: Vec<u32>,
    row_sum: Vec<u32>,
    col_used: Vec<u32>,
    trail: Trail<Undo>,
    steps: u64,
    max_steps: Option<u64>,
}

struct Undo {
    cell: usize,
    row: usize,
    col: usize,
    value: u32,
}

impl Search<'_> {
    fn cols(&self) -> usize {
        self.available.len()
    }

    fn step(&mut self) -> Result<(), SolverError> {
        self.steps += 1;
        match self.max_steps {
            Some(limit) if self.steps > limit => {
                Err(SolverError::SearchExhausted { steps: limit })
            }
            _ => Ok(()),
        }
    }

    /// Depth-first assignment of cells in row-major order.
    fn assign(&mut self, cell: usize) -> Result<bool, SolverError> {
        self.step()?;
        if cell == self.cells.len() {
            return Ok(true);
        }
        let cols = self.cols();
        let row = cell / cols;
        let col = cell % cols;
        let requirement = &self.required[row];

        let need = requirement.min.saturating_sub(self.row_sum[row]);

        // The rest of this row can contribute at most the sum of its cell
        // caps intersected with the remaining column capacity.
        let mut reachable: u64 = 0;
        for j in col..cols {
            let col_remaining = self.available[j].max - self.col_used[j];
            reachable += u64::from(self.cell_max[row * cols + j].min(col_remaining));
        }
        if u64::from(need) > reachable {
            return Ok(false);
        }

        // Allocating more than the row still needs can never enable a
        // solution, so `need` caps the branching domain.
        let col_remaining = self.available[col].max - self.col_used[col];
        let row_remaining = requirement.max - self.row_sum[row];
        let hi = self.cell_max[cell]
            .min(col_remaining)
            .min(row_remaining)
            .min(need);

        for value in (0..=hi).rev() {
            if col == cols - 1 && self.row_sum[row] + value < requirement.min {
                continue;
            }
            let checkpoint = self.trail.mark();
            self.set(cell, row, col, value);
            let found = self.assign(cell + 1)?;
            if found {
                return Ok(true);
            }
            let (cells, row_sum, col_used) =
                (&mut self.cells, &mut self.row_sum, &mut self.col_used);
            self.trail.unwind(checkpoint, |undo| {
                cells[undo.cell] = 0;
                row_sum[undo.row] -= undo.value;
                col_used[undo.col] -= undo.value;
            });
        }
        Ok(false)
    }

    fn set(&mut self, cell: usize, row: usize, col: usize, value: u32) {
        self.cells[cell] = value;
        self.row_sum[row] += value;
        self.col_used[col] += value;
        self.trail.push(Undo {
            cell,
            row,
            col,
            value,
        });
    }

    /// Project assigned cells back onto (requirement -> allocations),
    /// omitting zero-count entries.
    fn solution(&self) -> Solution {
        let cols = self.cols();
        let assignments = self
            .required
            .iter()
            .enumerate()
            .map(|(i, requirement)| RequirementAssignment {
                requirement: requirement.model.clone(),
                allocations: self
                    .available
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| self.cells[i * cols + j] > 0)
                    .map(|(j, pool)| Allocation {
                        model: pool.model.clone(),
                        count: self.cells[i * cols + j],
                    })
                    .collect(),
            })
            .collect();
        Solution { assignments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iri::Iri;

    /// Flat hierarchy: types are compatible only when equal.
    struct Flat;

    impl TypeHierarchy for Flat {
        fn is_subtype_of(&self, sub: &Iri, sup: &Iri) -> bool {
            sub == sup
        }
    }

    fn iri(name: &str) -> Iri {
        Iri::new(format!("urn:test#{}", name))
    }

    fn solve_flat(
        required: &[ModelBound],
        available: &[ModelBound],
    ) -> Option<Solution> {
        solve(required, available, &Flat, &SolverConfig::default()).unwrap()
    }

    #[test]
    fn test_single_requirement_feasible() {
        // Required = [(ModelX, 1, 1)], Available = [(ModelX, 0, 3)]
        let solution = solve_flat(
            &[ModelBound::new(iri("ModelX"), 1, 1)],
            &[ModelBound::new(iri("ModelX"), 0, 3)],
        )
        .expect("feasible");
        assert_eq!(solution.assignments.len(), 1);
        assert_eq!(solution.assignments[0].allocations.len(), 1);
        assert_eq!(solution.assignments[0].allocations[0].model, iri("ModelX"));
        assert_eq!(solution.assignments[0].allocations[0].count, 1);
    }

    #[test]
    fn test_column_cap_below_row_floor_is_infeasible() {
        // Required = [(ModelX, 2, 2)], Available = [(ModelX, 0, 1)]
        let solution = solve_flat(
            &[ModelBound::new(iri("ModelX"), 2, 2)],
            &[ModelBound::new(iri("ModelX"), 0, 1)],
        );
        assert!(solution.is_none());
    }

    #[test]
    fn test_two_requirements_share_pool() {
        // Required = [(ModelX,1,2), (ModelY,1,1)],
        // Available = [(ModelX,0,2), (ModelY,0,1)]
        let solution = solve_flat(
            &[
                ModelBound::new(iri("ModelX"), 1, 2),
                ModelBound::new(iri("ModelY"), 1, 1),
            ],
            &[
                ModelBound::new(iri("ModelX"), 0, 2),
                ModelBound::new(iri("ModelY"), 0, 1),
            ],
        )
        .expect("feasible");

        let x_count: u32 = solution.assignments[0]
            .allocations
            .iter()
            .map(|a| a.count)
            .sum();
        let y_count: u32 = solution.assignments[1]
            .allocations
            .iter()
            .map(|a| a.count)
            .sum();
        assert!((1..=2).contains(&x_count));
        assert_eq!(y_count, 1);
    }

    #[test]
    fn test_incompatible_types_force_zero_cells() {
        let solution = solve_flat(
            &[ModelBound::new(iri("ModelX"), 1, 1)],
            &[ModelBound::new(iri("ModelY"), 0, 5)],
        );
        assert!(solution.is_none());
    }

    #[test]
    fn test_subclass_pool_satisfies_superclass_requirement() {
        struct SubToSup;
        impl TypeHierarchy for SubToSup {
            fn is_subtype_of(&self, sub: &Iri, sup: &Iri) -> bool {
                sub == sup
                    || (sub.local_name() == "Special" && sup.local_name() == "Generic")
            }
        }

        let solution = solve(
            &[ModelBound::new(iri("Generic"), 1, 1)],
            &[ModelBound::new(iri("Special"), 0, 1)],
            &SubToSup,
            &SolverConfig::default(),
        )
        .unwrap()
        .expect("subclass unit satisfies superclass requirement");
        assert_eq!(solution.assignments[0].allocations[0].model, iri("Special"));
    }

    #[test]
    fn test_unbounded_available_max() {
        let solution = solve_flat(
            &[ModelBound::new(iri("ModelX"), 10, 10)],
            &[ModelBound::new(iri("ModelX"), 0, ModelBound::UNBOUNDED)],
        )
        .expect("feasible");
        assert_eq!(solution.assignments[0].allocations[0].count, 10);
    }

    #[test]
    fn test_step_limit_reports_exhaustion() {
        let config = SolverConfig { max_steps: Some(1) };
        let result = solve(
            &[
                ModelBound::new(iri("ModelX"), 1, 2),
                ModelBound::new(iri("ModelY"), 1, 1),
            ],
            &[
                ModelBound::new(iri("ModelX"), 0, 2),
                ModelBound::new(iri("ModelY"), 0, 1),
            ],
            &Flat,
            &config,
        );
        assert!(matches!(
            result,
            Err(SolverError::SearchExhausted { steps: 1 })
        ));
    }

    /// Brute-force cross-check of solver verdicts on small instances.
    ///
    /// `Special` is a subtype of `Generic`, so the (Generic-requirement,
    /// Special-pool) cell may be nonzero while the transposed cell must
    /// stay zero. Every assignment matrix with cells in `0..=3` is
    /// enumerated and existence compared against the solver's verdict.
    #[test]
    fn test_soundness_against_brute_force() {
        struct SubToSup;
        impl TypeHierarchy for SubToSup {
            fn is_subtype_of(&self, sub: &Iri, sup: &Iri) -> bool {
                sub == sup
                    || (sub.local_name() == "Special" && sup.local_name() == "Generic")
            }
        }

        for generic_min in 0..=2u32 {
            for special_min in 0..=2u32 {
                for generic_cap in 0..=2u32 {
                    for special_cap in 0..=2u32 {
                        let required = vec![
                            ModelBound::new(iri("Generic"), generic_min, 3),
                            ModelBound::new(iri("Special"), special_min, 3),
                        ];
                        let available = vec![
                            ModelBound::new(iri("Generic"), 0, generic_cap),
                            ModelBound::new(iri("Special"), 0, special_cap),
                        ];

                        let verdict =
                            solve(&required, &available, &SubToSup, &SolverConfig::default())
                                .unwrap()
                                .is_some();

                        // Matrix cells: m[req][avail]; m[1][0] is pinned to
                        // zero because Generic units cannot serve a Special
                        // requirement.
                        let mut expected = false;
                        for m00 in 0..=3u32 {
                            for m01 in 0..=3u32 {
                                for m11 in 0..=3u32 {
                                    let rows_ok = m00 + m01 >= generic_min
                                        && m00 + m01 <= 3
                                        && m11 >= special_min
                                        && m11 <= 3;
                                    let cols_ok =
                                        m00 <= generic_cap && m01 + m11 <= special_cap;
                                    if rows_ok && cols_ok {
                                        expected = true;
                                    }
                                }
                            }
                        }

                        assert_eq!(
                            verdict, expected,
                            "req ({generic_min},{special_min}) caps ({generic_cap},{special_cap})"
                        );
                    }
                }
            }
        }
    }
}
