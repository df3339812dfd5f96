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

//! This module provides the function types (VNFs) and the library that owns
//! them. The library is the single namespace where a chain token from a
//! request resolves: either to a single function type or, through an alias,
//! to a whole sub-chain of them.

use fxhash::FxHashMap;

use crate::{ModelError, VnfId};

// ----------------------------------------------------------------------------
// --- VNF --------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One function type: a packet-processing capability with a fixed resource
/// cost per deployed instance and a ceiling on the bandwidth one instance can
/// carry. Placing more traffic than `capacity` on one node forces additional
/// instances of the type there.
#[derive(Debug, Clone, PartialEq)]
pub struct Vnf {
    /// The unique name of the function type; uniqueness and resolution
    /// ignore case.
    pub name: String,
    /// CPU required by one instance.
    pub cpu: f64,
    /// RAM required by one instance.
    pub ram: f64,
    /// Storage required by one instance.
    pub hdd: f64,
    /// The fixed delay incurred by traversing one instance.
    pub delay: f64,
    /// The bandwidth ceiling of one instance.
    pub capacity: f64,
    /// How many instances of this type may exist overall, `None` when
    /// unbounded.
    pub max_instances: Option<usize>,
}

// ----------------------------------------------------------------------------
// --- VNF LIBRARY ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The owning collection of function types. A [`VnfId`] is an index into this
/// library. On top of the arena, the library keeps a case-insensitive name
/// table: a name resolves either to the singleton chain of the function type
/// registered under it, or to the multi-function sub-chain an alias was
/// registered for. It also records optional latency bounds between ordered
/// pairs of function types.
///
/// # Example
/// ```
/// # use vnfcp::{Vnf, VnfLib};
/// let mut lib = VnfLib::new();
/// let fw  = lib.add(Vnf {
///     name: "firewall".to_string(),
///     cpu: 4.0, ram: 4.0, hdd: 1.0,
///     delay: 1.0, capacity: 100.0, max_instances: None,
/// })?;
/// let ids = lib.add(Vnf {
///     name: "ids".to_string(),
///     cpu: 8.0, ram: 8.0, hdd: 1.0,
///     delay: 2.0, capacity: 50.0, max_instances: Some(4),
/// })?;
/// lib.add_alias("secure", vec![fw, ids])?;
///
/// assert_eq!(Some(&[fw][..]), lib.resolve("Firewall"));
/// assert_eq!(Some(&[fw, ids][..]), lib.resolve("secure"));
/// assert_eq!(None, lib.resolve("nat"));
/// # Ok::<(), vnfcp::ModelError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct VnfLib {
    /// The function type arena; a `VnfId` is an index in this vector.
    vnfs: Vec<Vnf>,
    /// Name table: lowercased trimmed token to the sub-chain it stands for.
    chains: FxHashMap<String, Vec<VnfId>>,
    /// Latency bounds between ordered pairs of function types.
    pairs: FxHashMap<(VnfId, VnfId), f64>,
}

impl VnfLib {
    /// This creates an empty library.
    pub fn new() -> Self {
        Default::default()
    }

    /// This method registers a new function type and returns its id. The
    /// type's name joins the name table as a singleton chain. It fails if
    /// the name (or an alias spelled the same) is taken already.
    pub fn add(&mut self, vnf: Vnf) -> Result<VnfId, ModelError> {
        let key = Self::key(&vnf.name);
        if self.chains.contains_key(&key) {
            return Err(ModelError::DuplicateVnf(key));
        }
        let id = VnfId(self.vnfs.len());
        self.chains.insert(key, vec![id]);
        self.vnfs.push(vnf);
        Ok(id)
    }

    /// This method registers an alias resolving to the given sub-chain of
    /// already registered function types. It fails if the alias name is
    /// taken already.
    pub fn add_alias(
        &mut self,
        alias: impl Into<String>,
        chain: Vec<VnfId>,
    ) -> Result<(), ModelError> {
        let key = Self::key(&alias.into());
        if self.chains.contains_key(&key) {
            return Err(ModelError::DuplicateVnf(key));
        }
        self.chains.insert(key, chain);
        Ok(())
    }

    /// This method records a latency bound between the ordered pair of
    /// function types `(a, b)`. It fails if the bound is negative.
    pub fn add_pair(&mut self, a: VnfId, b: VnfId, latency: f64) -> Result<(), ModelError> {
        if latency < 0.0 {
            return Err(ModelError::NegativeLatency(
                self.vnf(a).name.clone(),
                self.vnf(b).name.clone(),
                latency,
            ));
        }
        self.pairs.insert((a, b), latency);
        Ok(())
    }

    /// This method resolves a name to the sub-chain it stands for, if any.
    /// The lookup ignores case and surrounding whitespace.
    pub fn resolve(&self, name: &str) -> Option<&[VnfId]> {
        self.chains.get(&Self::key(name)).map(|chain| chain.as_slice())
    }

    /// The latency bound recorded for the ordered pair `(a, b)`, if any.
    pub fn pair(&self, a: VnfId, b: VnfId) -> Option<f64> {
        self.pairs.get(&(a, b)).copied()
    }

    /// An iterator over all recorded pair bounds.
    pub fn pairs(&self) -> impl Iterator<Item = (VnfId, VnfId, f64)> + '_ {
        self.pairs.iter().map(|(&(a, b), &latency)| (a, b, latency))
    }

    /// The function type with the given id.
    #[inline]
    pub fn vnf(&self, id: VnfId) -> &Vnf {
        &self.vnfs[id.id()]
    }
    /// The number of function types in the library.
    #[inline]
    pub fn num_vnfs(&self) -> usize {
        self.vnfs.len()
    }
    /// An iterator over the ids of all function types, in registration order.
    pub fn vnf_ids(&self) -> impl Iterator<Item = VnfId> {
        (0..self.vnfs.len()).map(VnfId)
    }
    /// An iterator over all function types, in registration order.
    pub fn vnfs(&self) -> impl Iterator<Item = &Vnf> {
        self.vnfs.iter()
    }
    /// An iterator over the registered aliases (names standing for more than
    /// their own function type), in no particular order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &[VnfId])> {
        self.chains
            .iter()
            .filter(|(_, chain)| chain.len() > 1)
            .map(|(name, chain)| (name.as_str(), chain.as_slice()))
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_vnf_lib {
    use crate::*;

    fn vnf(name: &str, capacity: f64) -> Vnf {
        Vnf {
            name: name.to_string(),
            cpu: 1.0,
            ram: 1.0,
            hdd: 1.0,
            delay: 1.0,
            capacity,
            max_instances: None,
        }
    }

    #[test]
    fn a_registered_type_resolves_to_its_singleton_chain() {
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 100.0)).unwrap();
        assert_eq!(Some(&[fw][..]), lib.resolve("firewall"));
        assert_eq!(1, lib.num_vnfs());
    }

    #[test]
    fn resolution_ignores_case_and_whitespace() {
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 100.0)).unwrap();
        assert_eq!(Some(&[fw][..]), lib.resolve("  FireWall "));
    }

    #[test]
    fn an_alias_resolves_to_its_whole_sub_chain() {
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 100.0)).unwrap();
        let nat = lib.add(vnf("nat", 100.0)).unwrap();
        lib.add_alias("edge", vec![fw, nat]).unwrap();
        assert_eq!(Some(&[fw, nat][..]), lib.resolve("edge"));
    }

    #[test]
    fn name_clashes_are_rejected_across_types_and_aliases() {
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 100.0)).unwrap();
        assert!(matches!(
            lib.add(vnf("Firewall", 50.0)),
            Err(ModelError::DuplicateVnf(_))
        ));
        assert!(matches!(
            lib.add_alias("firewall", vec![fw]),
            Err(ModelError::DuplicateVnf(_))
        ));
    }

    #[test]
    fn pair_bounds_are_looked_up_in_order() {
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 100.0)).unwrap();
        let nat = lib.add(vnf("nat", 100.0)).unwrap();
        lib.add_pair(fw, nat, 3.5).unwrap();
        assert_eq!(Some(3.5), lib.pair(fw, nat));
        assert_eq!(None, lib.pair(nat, fw));
    }

    #[test]
    fn a_negative_pair_bound_is_an_error() {
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 100.0)).unwrap();
        let nat = lib.add(vnf("nat", 100.0)).unwrap();
        assert!(matches!(
            lib.add_pair(fw, nat, -1.0),
            Err(ModelError::NegativeLatency(_, _, _))
        ));
    }
}
