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

//! This module defines the chain generators: the pluggable strategies that
//! decide what ordered sequence of function types each synthetic request
//! demands. All of them are deterministic given the caller's RNG, so a seed
//! pins down the whole benchmark.

use fxhash::FxHashSet;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::{ModelError, VnfId, VnfLib};

// ----------------------------------------------------------------------------
// --- CHAIN GENERATOR --------------------------------------------------------
// ----------------------------------------------------------------------------

/// A chain generator decides, one request at a time, the ordered sequence of
/// function types that request will demand. Implementations draw every random
/// decision from the RNG they are handed, which keeps a generated benchmark
/// reproducible from its seed alone.
pub trait ChainGenerator {
    /// This method produces the chain of one new request, drawing function
    /// types from the given library.
    fn generate(&self, lib: &VnfLib, rng: &mut StdRng) -> Vec<VnfId>;
}

/// This checks that a chain length range is usable: the lower bound must be
/// at least one and must not exceed the upper bound.
fn check_length_range(lo: usize, hi: usize) -> Result<(), ModelError> {
    if lo < 1 || lo > hi {
        Err(ModelError::InvalidRange("chain length", lo as f64, hi as f64))
    } else {
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// --- FIXED CHAINS -----------------------------------------------------------
// ----------------------------------------------------------------------------

/// This generator picks uniformly among a fixed list of predefined chains.
/// It is the one to use when the interesting part of a benchmark is the
/// topology or the load, not the variety of the chains themselves.
#[derive(Debug, Clone, Default)]
pub struct FixedChains {
    /// The chains to pick from.
    chains: Vec<Vec<VnfId>>,
}

impl FixedChains {
    /// This creates a generator with no chain yet. Until a chain is added,
    /// every request gets the empty chain.
    pub fn new() -> Self {
        Self { chains: vec![] }
    }
    /// This method adds one chain to the list of candidates.
    pub fn add_chain(&mut self, chain: Vec<VnfId>) {
        self.chains.push(chain);
    }
}

impl ChainGenerator for FixedChains {
    fn generate(&self, _lib: &VnfLib, rng: &mut StdRng) -> Vec<VnfId> {
        self.chains.choose(rng).cloned().unwrap_or_default()
    }
}

// ----------------------------------------------------------------------------
// --- RANDOM ORDER -----------------------------------------------------------
// ----------------------------------------------------------------------------

/// This generator draws a chain length within configured bounds, then picks
/// that many distinct function types from the library in shuffled order.
/// Lengths beyond the size of the library are clamped to it.
#[derive(Debug, Clone, Copy)]
pub struct RandomOrder {
    /// The least number of functions per chain.
    min_length: usize,
    /// The largest number of functions per chain.
    max_length: usize,
}

impl RandomOrder {
    /// This creates a generator drawing chain lengths uniformly in the
    /// inclusive range `[min_length, max_length]`. It fails if the range is
    /// empty or allows zero-length chains.
    pub fn new(min_length: usize, max_length: usize) -> Result<Self, ModelError> {
        check_length_range(min_length, max_length)?;
        Ok(Self { min_length, max_length })
    }
}

impl ChainGenerator for RandomOrder {
    fn generate(&self, lib: &VnfLib, rng: &mut StdRng) -> Vec<VnfId> {
        let length = rng.random_range(self.min_length..=self.max_length);
        let mut types = lib.vnf_ids().collect::<Vec<_>>();
        types.shuffle(rng);
        types.truncate(length.min(types.len()));
        types
    }
}

// ----------------------------------------------------------------------------
// --- SAME ORDER -------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This generator draws a chain length within configured bounds, then emits a
/// uniformly random subsequence of that length of the library's types, kept
/// in the library's own order. All the chains it produces are therefore
/// mutually compatible: functions shared by two chains always appear in the
/// same relative order, which is what lets placements share instances.
#[derive(Debug, Clone, Copy)]
pub struct SameOrder {
    /// The least number of functions per chain.
    min_length: usize,
    /// The largest number of functions per chain.
    max_length: usize,
}

impl SameOrder {
    /// This creates a generator drawing chain lengths uniformly in the
    /// inclusive range `[min_length, max_length]`. It fails if the range is
    /// empty or allows zero-length chains.
    pub fn new(min_length: usize, max_length: usize) -> Result<Self, ModelError> {
        check_length_range(min_length, max_length)?;
        Ok(Self { min_length, max_length })
    }
}

impl ChainGenerator for SameOrder {
    fn generate(&self, lib: &VnfLib, rng: &mut StdRng) -> Vec<VnfId> {
        let length = rng.random_range(self.min_length..=self.max_length);
        let order = lib.vnf_ids().collect::<Vec<_>>();

        // pick the indices to drop, then walk the original order once
        let mut indices = (0..order.len()).collect::<Vec<_>>();
        indices.shuffle(rng);
        let dropped = indices
            .iter()
            .copied()
            .take(order.len().saturating_sub(length))
            .collect::<FxHashSet<_>>();

        order
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !dropped.contains(i))
            .map(|(_, vnf)| vnf)
            .collect()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_chains {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::*;

    fn lib(n: usize) -> VnfLib {
        let mut lib = VnfLib::default();
        for i in 0..n {
            lib.add(Vnf {
                name: format!("v{i}"),
                cpu: 1.0,
                ram: 1.0,
                hdd: 1.0,
                delay: 1.0,
                capacity: 100.0,
                max_instances: None,
            })
            .unwrap();
        }
        lib
    }

    #[test]
    fn a_fixed_generator_picks_among_its_chains() {
        let lib = lib(3);
        let mut rng = StdRng::seed_from_u64(42);
        let mut gen = FixedChains::new();
        gen.add_chain(vec![VnfId(0), VnfId(1)]);
        gen.add_chain(vec![VnfId(2)]);

        let mut seen_long = false;
        let mut seen_short = false;
        for _ in 0..64 {
            let chain = gen.generate(&lib, &mut rng);
            match chain.len() {
                2 => {
                    assert_eq!(vec![VnfId(0), VnfId(1)], chain);
                    seen_long = true;
                }
                1 => {
                    assert_eq!(vec![VnfId(2)], chain);
                    seen_short = true;
                }
                _ => panic!("unexpected chain {chain:?}"),
            }
        }
        assert!(seen_long && seen_short);
    }

    #[test]
    fn a_fixed_generator_without_chains_yields_the_empty_chain() {
        let lib = lib(3);
        let mut rng = StdRng::seed_from_u64(42);
        let gen = FixedChains::new();
        assert!(gen.generate(&lib, &mut rng).is_empty());
    }

    #[test]
    fn random_order_stays_within_the_length_bounds() {
        let lib = lib(5);
        let mut rng = StdRng::seed_from_u64(7);
        let gen = RandomOrder::new(2, 4).unwrap();
        for _ in 0..100 {
            let chain = gen.generate(&lib, &mut rng);
            assert!((2..=4).contains(&chain.len()), "length {}", chain.len());
        }
    }

    #[test]
    fn random_order_never_repeats_a_type_within_one_chain() {
        let lib = lib(5);
        let mut rng = StdRng::seed_from_u64(7);
        let gen = RandomOrder::new(3, 5).unwrap();
        for _ in 0..100 {
            let chain = gen.generate(&lib, &mut rng);
            let distinct = chain.iter().collect::<fxhash::FxHashSet<_>>();
            assert_eq!(chain.len(), distinct.len());
        }
    }

    #[test]
    fn random_order_clamps_lengths_to_the_library_size() {
        let lib = lib(3);
        let mut rng = StdRng::seed_from_u64(7);
        let gen = RandomOrder::new(5, 10).unwrap();
        for _ in 0..20 {
            assert_eq!(3, gen.generate(&lib, &mut rng).len());
        }
    }

    #[test]
    fn same_order_preserves_the_library_order() {
        let lib = lib(6);
        let mut rng = StdRng::seed_from_u64(13);
        let gen = SameOrder::new(2, 5).unwrap();
        for _ in 0..100 {
            let chain = gen.generate(&lib, &mut rng);
            assert!((2..=5).contains(&chain.len()), "length {}", chain.len());
            for pair in chain.windows(2) {
                assert!(pair[0].id() < pair[1].id(), "out of order: {chain:?}");
            }
        }
    }

    #[test]
    fn same_order_covers_every_subsequence_start() {
        let lib = lib(3);
        let mut rng = StdRng::seed_from_u64(13);
        let gen = SameOrder::new(1, 1).unwrap();
        let mut seen = [false; 3];
        for _ in 0..64 {
            let chain = gen.generate(&lib, &mut rng);
            assert_eq!(1, chain.len());
            seen[chain[0].id()] = true;
        }
        assert_eq!([true, true, true], seen);
    }

    #[test]
    fn a_length_range_below_one_is_rejected() {
        assert!(RandomOrder::new(0, 3).is_err());
        assert!(SameOrder::new(0, 3).is_err());
    }

    #[test]
    fn an_inverted_length_range_is_rejected() {
        assert!(RandomOrder::new(4, 2).is_err());
        assert!(SameOrder::new(4, 2).is_err());
    }
}
