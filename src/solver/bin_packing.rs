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

//! This module provides the bin-packing oracle: given the bandwidth demands
//! assigned to one (function type, node) pair and the bandwidth ceiling of a
//! single instance of that type, how many instances must be deployed there?
//! That is classic bin packing, solved exactly: a first-fit-descending pass
//! gives an upper bound, `ceil(sum / capacity)` a lower bound, and a
//! backtracking search closes the gap between the two when they disagree.

/// This function packs the given demands into as few bins of size `bin_size`
/// as first fit manages after sorting the demands in descending order. The
/// demands are sorted in place as a side effect. The answer is an upper bound
/// on the optimal bin count, and a fairly tight one: first fit descending is
/// known to use at most `11/9 opt + 1` bins.
///
/// # Examples:
/// ```
/// # use vnfcp::first_fit_descending;
/// assert_eq!(2, first_fit_descending(&mut [3.0, 3.0, 2.0, 1.0], 5.0));
/// assert_eq!(0, first_fit_descending(&mut [], 5.0));
/// ```
pub fn first_fit_descending(demands: &mut [f64], bin_size: f64) -> usize {
    demands.sort_by(|a, b| b.total_cmp(a));

    let mut bins: Vec<f64> = vec![];
    for demand in demands.iter().copied() {
        match bins.iter_mut().find(|bin| **bin + demand <= bin_size) {
            Some(bin) => *bin += demand,
            None => bins.push(demand),
        }
    }
    bins.len()
}

/// This function returns the *minimum* number of bins of size `bin_size` the
/// given demands fit into. The demands are sorted in descending order in
/// place. When the first-fit upper bound already meets the `ceil(sum / size)`
/// lower bound it is provably optimal and returned as is; otherwise every
/// candidate bin count between the two bounds is attempted in increasing
/// order with a backtracking placement search, and the first count that
/// admits a full placement wins.
///
/// # Examples:
/// ```
/// # use vnfcp::min_bins;
/// // first fit descending opens four bins (5+5, 4+4, 3+3+3, 3) but the
/// // demands do fit in three (5+5, 4+3+3, 4+3+3)
/// assert_eq!(3, min_bins(&mut [5.0, 5.0, 4.0, 4.0, 3.0, 3.0, 3.0, 3.0], 10.0));
/// ```
pub fn min_bins(demands: &mut [f64], bin_size: f64) -> usize {
    let upper = first_fit_descending(demands, bin_size);

    let sum: f64 = demands.iter().sum();
    let lower = (sum / bin_size).ceil() as usize;
    if upper == lower {
        return upper;
    }

    let mut bins = vec![];
    for max_bins in lower..upper {
        bins.clear();
        bins.resize(max_bins, 0.0);
        if attempt_packing(demands, bin_size, &mut bins, 0) {
            return max_bins;
        }
    }
    upper
}

/// Tries to place `demands[index..]` into the bins, backtracking across bin
/// choices. The demands are expected largest first so the search fails fast.
fn attempt_packing(demands: &[f64], bin_size: f64, bins: &mut [f64], index: usize) -> bool {
    if index >= demands.len() {
        return true;
    }
    let demand = demands[index];
    for i in 0..bins.len() {
        if bins[i] + demand <= bin_size {
            bins[i] += demand;
            if attempt_packing(demands, bin_size, bins, index + 1) {
                return true;
            }
            bins[i] -= demand;
        }
    }
    false
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_bin_packing {
    use crate::{first_fit_descending, min_bins};

    /// Brute force reference: tries every assignment of items to at most
    /// `demands.len()` bins and keeps the best. Only usable on tiny inputs.
    fn brute_force_optimum(demands: &[f64], bin_size: f64) -> usize {
        fn recurse(demands: &[f64], bin_size: f64, bins: &mut Vec<f64>, best: &mut usize) {
            if bins.len() >= *best {
                return;
            }
            match demands.split_first() {
                None => *best = bins.len(),
                Some((&demand, rest)) => {
                    for i in 0..bins.len() {
                        if bins[i] + demand <= bin_size {
                            bins[i] += demand;
                            recurse(rest, bin_size, bins, best);
                            bins[i] -= demand;
                        }
                    }
                    bins.push(demand);
                    recurse(rest, bin_size, bins, best);
                    bins.pop();
                }
            }
        }
        let mut best = demands.len().max(1);
        recurse(demands, bin_size, &mut vec![], &mut best);
        best
    }

    #[test]
    fn no_demand_needs_no_bin() {
        assert_eq!(0, min_bins(&mut [], 10.0));
    }

    #[test]
    fn demands_fitting_one_bin_need_one_bin() {
        assert_eq!(1, min_bins(&mut [4.0, 3.0, 2.0], 10.0));
    }

    #[test]
    fn first_fit_sorts_the_demands_descending() {
        let mut demands = [1.0, 5.0, 3.0];
        first_fit_descending(&mut demands, 10.0);
        assert_eq!([5.0, 3.0, 1.0], demands);
    }

    #[test]
    fn first_fit_is_not_always_optimal_but_min_bins_is() {
        // ffd packs 5+5, 4+4, 3+3+3, 3 -> 4 bins; 5+5, 4+3+3, 4+3+3 fits 3
        let mut demands = [5.0, 5.0, 4.0, 4.0, 3.0, 3.0, 3.0, 3.0];
        assert_eq!(4, first_fit_descending(&mut demands.clone(), 10.0));
        assert_eq!(3, min_bins(&mut demands, 10.0));
    }

    #[test]
    fn equal_bounds_short_circuit_to_the_first_fit_answer() {
        // sum = 20, size = 10 -> lower = 2 and ffd finds 2 right away
        assert_eq!(2, min_bins(&mut [10.0, 5.0, 5.0], 10.0));
    }

    #[test]
    fn a_demand_filling_a_whole_bin_gets_its_own() {
        assert_eq!(3, min_bins(&mut [10.0, 10.0, 10.0], 10.0));
    }

    #[test]
    fn the_result_matches_brute_force_on_small_inputs() {
        let cases: &[(&[f64], f64)] = &[
            (&[6.0, 5.0, 4.0, 3.0, 2.0], 10.0),
            (&[5.0, 5.0, 4.0, 4.0, 3.0, 3.0, 3.0, 3.0], 10.0),
            (&[7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0], 10.0),
            (&[3.0, 3.0, 3.0, 3.0, 3.0], 9.0),
            (&[5.0, 5.0, 5.0, 5.0], 10.0),
            (&[9.0, 8.0, 2.0, 1.0], 10.0),
            (&[4.4, 4.4, 4.4, 3.3, 3.3, 3.3], 11.0),
            (&[2.0], 2.0),
            (&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0], 3.0),
        ];
        for (demands, size) in cases {
            let mut sorted = demands.to_vec();
            let result = min_bins(&mut sorted, *size);
            assert_eq!(
                brute_force_optimum(demands, *size),
                result,
                "demands {demands:?} size {size}"
            );
        }
    }

    #[test]
    fn the_result_lies_between_the_two_bounds() {
        let cases: &[(&[f64], f64)] = &[
            (&[6.0, 5.0, 4.0, 3.0, 2.0], 10.0),
            (&[8.0, 7.0, 6.0, 5.0, 4.0, 3.0], 12.0),
            (&[1.5, 2.5, 3.5, 4.5], 5.0),
        ];
        for (demands, size) in cases {
            let sum: f64 = demands.iter().sum();
            let lower = (sum / size).ceil() as usize;
            let upper = first_fit_descending(&mut demands.to_vec(), *size);
            let result = min_bins(&mut demands.to_vec(), *size);
            assert!(lower <= result && result <= upper, "demands {demands:?}");
        }
    }
}
