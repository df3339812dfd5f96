// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the solution type the exhaustive solver emits: one
//! feasible full assignment, frozen together with its objective vector.

use fxhash::FxHashSet;

use crate::{NodeId, Solution};

/// One feasible placement: for every request, the sequence of nodes hosting
/// the functions of its chain (one node per chain position), together with
/// the two objectives of this system, total CPU-equivalent cost first and
/// total hop count second. Both are minimized.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSolution {
    /// Per request, the node hosting each position of its chain.
    assignments: Vec<Vec<NodeId>>,
    /// `[total cpu, total hops]`.
    objectives: [f64; 2],
}

impl PlacementSolution {
    /// This freezes a feasible assignment and its objective values into a
    /// solution.
    pub fn new(assignments: Vec<Vec<NodeId>>, cpu: f64, hops: f64) -> Self {
        Self { assignments, objectives: [cpu, hops] }
    }

    /// The total CPU-equivalent cost of this placement.
    pub fn cpu(&self) -> f64 {
        self.objectives[0]
    }
    /// The total number of link traversals of this placement.
    pub fn hops(&self) -> f64 {
        self.objectives[1]
    }
    /// Per request, the node hosting each position of its chain.
    pub fn assignments(&self) -> &[Vec<NodeId>] {
        &self.assignments
    }
    /// How many distinct nodes host at least one function instance.
    pub fn num_used_nodes(&self) -> usize {
        let mut used = FxHashSet::default();
        for assignment in self.assignments.iter() {
            used.extend(assignment.iter().copied());
        }
        used.len()
    }
}

impl Solution for PlacementSolution {
    fn objectives(&self) -> &[f64] {
        &self.objectives
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_placement {
    use crate::*;

    #[test]
    fn the_objective_vector_is_cpu_then_hops() {
        let solution = PlacementSolution::new(vec![vec![NodeId(1)]], 3.0, 7.0);
        assert_eq!(&[3.0, 7.0], solution.objectives());
        assert_eq!(3.0, solution.cpu());
        assert_eq!(7.0, solution.hops());
    }

    #[test]
    fn used_nodes_are_counted_once_across_requests() {
        let solution = PlacementSolution::new(
            vec![
                vec![NodeId(1), NodeId(2)],
                vec![NodeId(2), NodeId(3)],
                vec![],
            ],
            5.0,
            9.0,
        );
        assert_eq!(3, solution.num_used_nodes());
    }
}
