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

//! This module provides the multi-objective side of the solver: the dominance
//! order on objective vectors (all objectives are minimized) and the Pareto
//! frontier, which incrementally keeps the non-dominated solutions found so
//! far.

// ----------------------------------------------------------------------------
// --- SOLUTION ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A solution that can compete on a Pareto frontier: anything carrying a
/// vector of real-valued objectives, all of them minimized. All solutions on
/// one frontier must agree on the number and meaning of their objectives.
pub trait Solution {
    /// The objective vector of this solution.
    fn objectives(&self) -> &[f64];
}

// ----------------------------------------------------------------------------
// --- DOMINANCE --------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This function compares two objective vectors under weak dominance: it
/// returns `1` when `a` dominates `b` (every coordinate of `b` is greater or
/// equal to the matching coordinate of `a`), `-1` for the symmetric case,
/// and `0` when the two vectors are incomparable.
///
/// Two exactly equal vectors dominate each other in both directions; this
/// function then answers `1`. The frontier relies on that: a duplicate of an
/// existing member lands in the "dominated by a member" case and is
/// discarded rather than inserted twice.
///
/// # Examples:
/// ```
/// # use vnfcp::dominance;
/// assert_eq!( 1, dominance(&[1.0, 2.0], &[2.0, 2.0]));
/// assert_eq!(-1, dominance(&[2.0, 2.0], &[1.0, 2.0]));
/// assert_eq!( 0, dominance(&[1.0, 3.0], &[2.0, 2.0]));
/// assert_eq!( 1, dominance(&[1.0, 2.0], &[1.0, 2.0]));
/// ```
pub fn dominance(a: &[f64], b: &[f64]) -> i32 {
    if a.iter().zip(b).all(|(x, y)| y >= x) {
        1
    } else if a.iter().zip(b).all(|(x, y)| x >= y) {
        -1
    } else {
        0
    }
}

// ----------------------------------------------------------------------------
// --- PARETO FRONTIER --------------------------------------------------------
// ----------------------------------------------------------------------------
/// The set of non-dominated solutions found so far. Insertion maintains the
/// frontier invariant: no member dominates another, and no two members carry
/// the same objective vector.
///
/// # Example
/// ```
/// # use vnfcp::{ParetoFrontier, Solution};
/// struct Point(Vec<f64>);
/// impl Solution for Point {
///     fn objectives(&self) -> &[f64] { &self.0 }
/// }
///
/// let mut frontier = ParetoFrontier::new();
/// frontier.insert(Point(vec![4.0, 1.0]));
/// frontier.insert(Point(vec![1.0, 4.0]));  // incomparable: kept
/// frontier.insert(Point(vec![5.0, 5.0]));  // dominated:   discarded
/// let removed = frontier.insert(Point(vec![1.0, 1.0]));  // beats both
///
/// assert_eq!(2, removed.len());
/// assert_eq!(1, frontier.len());
/// ```
#[derive(Debug, Clone)]
pub struct ParetoFrontier<T> {
    members: Vec<T>,
}

impl<T: Solution> ParetoFrontier<T> {
    /// This creates an empty frontier.
    pub fn new() -> Self {
        Self { members: vec![] }
    }

    /// This method offers a candidate solution to the frontier and returns
    /// the members it evicted. When the candidate is dominated by (or equal
    /// to) an existing member, it is discarded, nothing is evicted and the
    /// frontier is left untouched. Otherwise every member the candidate
    /// dominates is removed and handed back, and the candidate joins the
    /// frontier.
    pub fn insert(&mut self, candidate: T) -> Vec<T> {
        let mut removed = vec![];
        let mut i = 0;
        while i < self.members.len() {
            match dominance(self.members[i].objectives(), candidate.objectives()) {
                1 => return removed,
                -1 => {
                    // swap_remove moves the last member into slot i; stay
                    // put so that moved member gets tested too
                    removed.push(self.members.swap_remove(i));
                }
                _ => i += 1,
            }
        }
        self.members.push(candidate);
        removed
    }

    /// The number of solutions on the frontier.
    pub fn len(&self) -> usize {
        self.members.len()
    }
    /// Whether the frontier holds no solution at all.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
    /// An iterator over the members, in no meaningful order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.members.iter()
    }
    /// The members as a slice, in no meaningful order.
    pub fn as_slice(&self) -> &[T] {
        &self.members
    }
    /// Consumes the frontier and hands its members over.
    pub fn into_vec(self) -> Vec<T> {
        self.members
    }
}

impl<T: Solution> Default for ParetoFrontier<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T> IntoIterator for ParetoFrontier<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}
impl<'a, T> IntoIterator for &'a ParetoFrontier<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_dominance {
    use crate::dominance;

    #[test]
    fn a_vector_lower_everywhere_dominates() {
        assert_eq!(1, dominance(&[1.0, 1.0], &[2.0, 2.0]));
        assert_eq!(-1, dominance(&[2.0, 2.0], &[1.0, 1.0]));
    }

    #[test]
    fn a_vector_lower_somewhere_and_equal_elsewhere_dominates_weakly() {
        assert_eq!(1, dominance(&[1.0, 2.0], &[2.0, 2.0]));
        assert_eq!(-1, dominance(&[2.0, 2.0], &[1.0, 2.0]));
    }

    #[test]
    fn vectors_better_on_different_coordinates_are_incomparable() {
        assert_eq!(0, dominance(&[1.0, 3.0], &[3.0, 1.0]));
        assert_eq!(0, dominance(&[3.0, 1.0], &[1.0, 3.0]));
    }

    #[test]
    fn equal_vectors_dominate_each_other_in_both_directions() {
        assert_eq!(1, dominance(&[2.0, 2.0], &[2.0, 2.0]));
        assert_eq!(1, dominance(&[0.0], &[0.0]));
    }

    #[test]
    fn dominance_is_antisymmetric_on_distinct_vectors() {
        let vectors: &[[f64; 2]] =
            &[[1.0, 1.0], [1.0, 2.0], [2.0, 1.0], [3.0, 0.0], [0.0, 3.0], [2.0, 2.0]];
        for a in vectors {
            for b in vectors {
                if a != b {
                    assert_eq!(dominance(a, b), -dominance(b, a), "{a:?} vs {b:?}");
                }
            }
        }
    }
}
