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

//! This module defines the dynamic resource-distribution generator. Instead
//! of building a topology from scratch, it takes an existing one, deploys a
//! random set of function instances on it, and then simulates traffic onto
//! that deployment until every instance is filled to the brim. The resulting
//! requests, together with node capacities and link bandwidths re-derived
//! from the realized load, form a problem instance whose known-good solution
//! is the very deployment the traffic was simulated on.

use std::collections::VecDeque;

use fxhash::{FxHashMap, FxHashSet};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    DeploymentSolution, Flow, FlowAssignment, Hop, InstanceId, LinkId, ModelError, NetworkGraph,
    NodeId, ProblemInstance, TrafficRequest, Vnf, VnfInstance, VnfLib,
};

// ----------------------------------------------------------------------------
// --- DYNAMIC GENERATOR ------------------------------------------------------
// ----------------------------------------------------------------------------

/// This generator derives a placement problem from a base topology. All of
/// its numeric parameters are inclusive ranges, drawn from anew for every
/// generated instance:
///
/// - `possible_locations`: how many nodes are allowed to host instances
///   (these become the compute nodes of the generated problem),
/// - `used_locations`: how many of those actually host one in the known
///   solution,
/// - `instances`: how many instances to deploy,
/// - `bandwidths`: the per-request demand range the traffic is drawn from.
///
/// Only single-type libraries are supported, as every simulated flow is
/// routed through exactly one instance.
#[derive(Debug, Clone)]
pub struct DynamicGenerator {
    /// The topology the traffic is simulated onto.
    base: NetworkGraph,
    /// The library holding the one function type to deploy.
    lib: VnfLib,
    /// The inclusive range of the number of candidate compute nodes.
    possible_locations: (usize, usize),
    /// The inclusive range of the number of nodes hosting an instance.
    used_locations: (usize, usize),
    /// The inclusive range of the number of deployed instances.
    instances: (usize, usize),
    /// The inclusive range the per-request demands are drawn from.
    bandwidths: (f64, f64),
}

impl DynamicGenerator {
    /// This creates a generator simulating onto the given base topology with
    /// the given library. It fails if any range is empty or starts below
    /// one, if the library does not hold exactly one function type, if that
    /// type cannot even carry the smallest request, or if the topology is
    /// too small to draw distinct endpoints from.
    pub fn new(
        base: NetworkGraph,
        lib: VnfLib,
        possible_locations: (usize, usize),
        used_locations: (usize, usize),
        instances: (usize, usize),
        bandwidths: (f64, f64),
    ) -> Result<Self, ModelError> {
        check_count_range("instances", instances)?;
        check_count_range("possible locations", possible_locations)?;
        check_count_range("used locations", used_locations)?;
        if bandwidths.0 < 1.0 || bandwidths.0 > bandwidths.1 {
            return Err(ModelError::InvalidRange(
                "requested bandwidth",
                bandwidths.0,
                bandwidths.1,
            ));
        }
        if lib.num_vnfs() != 1 {
            return Err(ModelError::SingleTypeRequired(lib.num_vnfs()));
        }
        for vnf in lib.vnfs() {
            if vnf.capacity < bandwidths.0 {
                return Err(ModelError::CapacityTooSmall(
                    vnf.name.clone(),
                    vnf.capacity,
                    bandwidths.0,
                ));
            }
        }
        if base.num_nodes() < 2 {
            return Err(ModelError::InvalidParameter(
                "base graph size",
                base.num_nodes() as f64,
            ));
        }
        Ok(Self {
            base,
            lib,
            possible_locations,
            used_locations,
            instances,
            bandwidths,
        })
    }

    /// This creates a generator along with a random single-type library: the
    /// type requires between 1 and 8 cpu (= ram = hdd) and processes a
    /// capacity drawn from the given range on a grid of 50 bandwidth units,
    /// with a fixed delay of 50.
    pub fn with_random_lib(
        base: NetworkGraph,
        capacities: (f64, f64),
        possible_locations: (usize, usize),
        used_locations: (usize, usize),
        instances: (usize, usize),
        bandwidths: (f64, f64),
        rng: &mut StdRng,
    ) -> Result<Self, ModelError> {
        if capacities.0 < 1.0 || capacities.0 > capacities.1 {
            return Err(ModelError::InvalidRange(
                "capacity",
                capacities.0,
                capacities.1,
            ));
        }
        let cpu = rng.random_range(1..=8) as f64;
        let steps = ((capacities.1 - capacities.0) / 50.0).floor() as usize + 1;
        let capacity = capacities.0 + rng.random_range(0..steps) as f64 * 50.0;

        let mut lib = VnfLib::default();
        lib.add(Vnf {
            name: "vnf0".into(),
            cpu,
            ram: cpu,
            hdd: cpu,
            delay: 50.0,
            capacity,
            max_instances: None,
        })?;
        Self::new(
            base,
            lib,
            possible_locations,
            used_locations,
            instances,
            bandwidths,
        )
    }

    /// This method generates one problem instance together with the feasible
    /// deployment it was synthesized around. The same seed always yields the
    /// same pair.
    ///
    /// # Panics
    /// The simulation routes flows between arbitrary node pairs, so the base
    /// topology must be connected.
    pub fn generate(&self, rng: &mut StdRng) -> Result<(ProblemInstance, DeploymentSolution), ModelError> {
        let (lo, hi) = self.bandwidths;
        let index = self.base.delay_index();

        // draw the compute pool; the used locations are a prefix of the
        // possible ones so that both stay a random node subset
        let num_used = rng.random_range(self.used_locations.0..=self.used_locations.1);
        let num_possible = rng
            .random_range(self.possible_locations.0..=self.possible_locations.1)
            .max(num_used);
        let mut all_nodes = self.base.node_ids().collect::<Vec<_>>();
        all_nodes.shuffle(rng);
        let num_possible = num_possible.min(all_nodes.len());
        let num_used = num_used.min(num_possible);
        let cpu_locations = &all_nodes[..num_possible];
        let used_locations = &all_nodes[..num_used];

        // deploy the instances on random used locations
        let mut arena: Vec<VnfInstance> = vec![];
        let mut deployment: FxHashMap<NodeId, Vec<InstanceId>> = FxHashMap::default();
        for vnf in self.lib.vnf_ids() {
            let num_instances = rng.random_range(self.instances.0..=self.instances.1);
            for _ in 0..num_instances {
                let node = used_locations[rng.random_range(0..used_locations.len())];
                let id = InstanceId(arena.len());
                arena.push(VnfInstance { node, vnf, used: 0.0 });
                deployment.entry(node).or_default().push(id);
            }
        }

        // simulate traffic: every active instance still takes at least `lo`
        // more bandwidth, so each flow drains the pool and the loop ends
        let mut active = deployment.clone();
        let mut routed: Vec<(TrafficRequest, Flow)> = vec![];
        while !active.is_empty() {
            let id = routed.len();
            let src_index = rng.random_range(0..all_nodes.len());
            let mut dst_index = rng.random_range(0..all_nodes.len() - 1);
            if dst_index >= src_index {
                dst_index += 1;
            }
            let src = all_nodes[src_index];
            let dst = all_nodes[dst_index];

            // route through the active node with the smallest delay detour,
            // picking one of its instances at random
            let mut best: Option<(NodeId, f64)> = None;
            for &node in active.keys() {
                let delay = index.attr(src, node).delay + index.attr(node, dst).delay;
                let better = match best {
                    None => true,
                    Some((_, shortest)) => delay < shortest,
                };
                if better {
                    best = Some((node, delay));
                }
            }
            let mid = match best {
                Some((node, _)) => node,
                None => break,
            };
            let at_mid = &active[&mid];
            let chosen = at_mid[rng.random_range(0..at_mid.len())];

            // lay the flow out backwards, from the egress to the middle and
            // on to the ingress; the hop entering the middle carries the
            // chosen instance
            let mut hops = VecDeque::new();
            let mut pending: Option<InstanceId> = None;
            let mut current = dst;
            for link in index.walk(&self.base, mid, dst) {
                hops.push_front(Hop { node: current, link: Some(link), instance: pending.take() });
                current = self.base.link(link).other_end(current);
            }
            pending = Some(chosen);
            for link in index.walk(&self.base, src, mid) {
                hops.push_front(Hop { node: current, link: Some(link), instance: pending.take() });
                current = self.base.link(link).other_end(current);
            }
            // both walks end at their source, so current is back at the
            // ingress here
            hops.push_front(Hop { node: current, link: None, instance: pending.take() });
            let flow = Flow { hops: hops.into() };

            // the demand: a random draw capped by what the traversed
            // instances can still take
            let mut cap = hi;
            for inst in flow.hops.iter().filter_map(|hop| hop.instance) {
                cap = cap.min(arena[inst.id()].remaining(&self.lib));
            }
            let mut bandwidth = cap;
            if cap > lo {
                bandwidth = lo + rng.random::<f64>() * (cap - lo);
            }

            // when the flow would leave an instance with unusably little
            // capacity, stretch or shrink the demand so it fills up instead
            for inst in flow.hops.iter().filter_map(|hop| hop.instance) {
                let remaining = arena[inst.id()].remaining(&self.lib);
                if remaining - bandwidth < lo {
                    if remaining <= cap {
                        bandwidth = remaining;
                    } else if remaining >= 2.0 * lo {
                        bandwidth = lo + rng.random::<f64>() * (remaining - 2.0 * lo);
                    } else {
                        bandwidth = remaining;
                    }
                }
            }

            let max_delay = flow.delay(&self.base, &self.lib, &arena) * 1.5;
            let chain = flow
                .hops
                .iter()
                .filter_map(|hop| hop.instance)
                .map(|inst| arena[inst.id()].vnf)
                .collect::<Vec<_>>();
            let request =
                TrafficRequest::new(id, src, dst, bandwidth * 0.99, max_delay, chain, &self.lib)?;

            // charge the traversed instances and retire the filled-up ones
            for inst in flow.hops.iter().filter_map(|hop| hop.instance) {
                arena[inst.id()].used += bandwidth;
                let node = arena[inst.id()].node;
                if arena[inst.id()].remaining(&self.lib) < lo {
                    if let Some(list) = active.get_mut(&node) {
                        list.retain(|i| *i != inst);
                        if list.is_empty() {
                            active.remove(&node);
                        }
                    }
                }
            }
            routed.push((request, flow));
        }

        // present the requests in an order that gives nothing away
        routed.shuffle(rng);

        // every compute node gets twice the load of the busiest one
        let mut busiest = 0.0_f64;
        for node in self.base.node_ids() {
            let load = deployment.get(&node).map_or(0.0, |list| {
                list.iter()
                    .map(|i| self.lib.vnf(arena[i.id()].vnf).cpu)
                    .sum()
            });
            busiest = busiest.max(load);
        }
        let resources = busiest * 2.0;

        // the rebuilt graph adds nodes and links in base arena order, so
        // every id carries over and the flows remain valid
        let cpu_set = cpu_locations.iter().copied().collect::<FxHashSet<_>>();
        let mut graph = NetworkGraph::new();
        for node in self.base.node_ids() {
            let name = self.base.node(node).name.clone();
            if cpu_set.contains(&node) {
                graph.add_node(name, resources, resources, resources)?;
            } else {
                graph.add_node(name, 0.0, 0.0, 0.0)?;
            }
        }

        // links are re-sized from the traffic actually pushed through them
        let mut usage: FxHashMap<LinkId, f64> = FxHashMap::default();
        for (request, flow) in routed.iter() {
            for hop in flow.hops.iter() {
                if let Some(link) = hop.link {
                    *usage.entry(link).or_insert(0.0) += request.bandwidth;
                }
            }
        }
        for id in self.base.link_ids() {
            let link = self.base.link(id);
            let bandwidth = (usage.get(&id).copied().unwrap_or(link.bandwidth) * 5.0).ceil();
            graph.add_link(link.endpoints[0], link.endpoints[1], bandwidth, link.delay)?;
        }

        let mut requests = Vec::with_capacity(routed.len());
        let mut assignments = Vec::with_capacity(routed.len());
        for (request, flow) in routed {
            assignments.push(FlowAssignment { request: request.id, flow });
            requests.push(request);
        }
        let solution = DeploymentSolution::new(arena, assignments, &self.lib);
        let instance = ProblemInstance::new(graph, self.lib.clone(), requests);
        Ok((instance, solution))
    }
}

/// This checks that a count range is usable: the lower bound must be at
/// least one and must not exceed the upper bound.
fn check_count_range(what: &'static str, range: (usize, usize)) -> Result<(), ModelError> {
    if range.0 < 1 || range.0 > range.1 {
        Err(ModelError::InvalidRange(what, range.0 as f64, range.1 as f64))
    } else {
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_dynamic {
    use fxhash::FxHashMap;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::*;

    /// A ring of six nodes with one chord, all delays distinct enough to
    /// make the routing interesting.
    fn base() -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        let nodes = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|name| graph.add_node(*name, 0.0, 0.0, 0.0).unwrap())
            .collect::<Vec<_>>();
        for i in 0..6 {
            graph
                .add_link(nodes[i], nodes[(i + 1) % 6], 1000.0, 1.0 + i as f64)
                .unwrap();
        }
        graph.add_link(nodes[1], nodes[4], 1000.0, 1.5).unwrap();
        graph
    }

    fn lib(capacity: f64) -> VnfLib {
        let mut lib = VnfLib::default();
        lib.add(Vnf {
            name: "nat".into(),
            cpu: 4.0,
            ram: 4.0,
            hdd: 4.0,
            delay: 2.0,
            capacity,
            max_instances: None,
        })
        .unwrap();
        lib
    }

    fn generator() -> DynamicGenerator {
        DynamicGenerator::new(base(), lib(300.0), (3, 4), (2, 3), (4, 6), (50.0, 120.0)).unwrap()
    }

    #[test]
    fn every_deployed_instance_ends_up_filled() {
        let mut rng = StdRng::seed_from_u64(42);
        let (instance, solution) = generator().generate(&mut rng).unwrap();

        assert!(!solution.instances.is_empty());
        for inst in solution.instances.iter() {
            let remaining = inst.remaining(&instance.vnf_lib);
            assert!(remaining >= -1e-9, "overfilled: {remaining}");
            assert!(remaining < 50.0, "left usable capacity: {remaining}");
        }
    }

    #[test]
    fn every_request_is_carried_by_its_flow() {
        let mut rng = StdRng::seed_from_u64(42);
        let (instance, solution) = generator().generate(&mut rng).unwrap();

        assert_eq!(instance.requests.len(), solution.assignments.len());
        for (request, assignment) in instance.requests.iter().zip(solution.assignments.iter()) {
            assert_eq!(request.id, assignment.request);

            let hops = &assignment.flow.hops;
            assert_eq!(request.ingress, hops[0].node);
            assert_eq!(None, hops[0].link);
            assert_eq!(request.egress, hops[hops.len() - 1].node);

            let carried = hops.iter().filter(|hop| hop.instance.is_some()).count();
            assert_eq!(request.chain.len(), carried);
            assert_eq!(1, carried);
        }
    }

    #[test]
    fn the_delay_budget_leaves_half_again_the_realized_delay() {
        let mut rng = StdRng::seed_from_u64(7);
        let (instance, solution) = generator().generate(&mut rng).unwrap();

        for (request, assignment) in instance.requests.iter().zip(solution.assignments.iter()) {
            let realized =
                assignment
                    .flow
                    .delay(&instance.graph, &instance.vnf_lib, &solution.instances);
            assert!((request.max_delay - realized * 1.5).abs() < 1e-9);
        }
    }

    #[test]
    fn links_cover_the_traffic_they_carry() {
        let mut rng = StdRng::seed_from_u64(13);
        let (instance, solution) = generator().generate(&mut rng).unwrap();
        assert_eq!(base().num_links(), instance.graph.num_links());

        let mut usage: FxHashMap<LinkId, f64> = FxHashMap::default();
        for (request, assignment) in instance.requests.iter().zip(solution.assignments.iter()) {
            for hop in assignment.flow.hops.iter() {
                if let Some(link) = hop.link {
                    *usage.entry(link).or_insert(0.0) += request.bandwidth;
                }
            }
        }
        for (link, traffic) in usage {
            assert!(instance.graph.link(link).bandwidth >= traffic);
        }
    }

    #[test]
    fn node_capacities_leave_headroom_for_the_deployment() {
        let mut rng = StdRng::seed_from_u64(99);
        let (instance, solution) = generator().generate(&mut rng).unwrap();

        let mut load: FxHashMap<NodeId, f64> = FxHashMap::default();
        for inst in solution.instances.iter() {
            *load.entry(inst.node).or_insert(0.0) +=
                instance.vnf_lib.vnf(inst.vnf).cpu;
        }
        for (node, cpu) in load {
            assert!(instance.graph.node(node).cpu >= cpu);
        }
    }

    #[test]
    fn request_bandwidths_respect_the_configured_floor() {
        let mut rng = StdRng::seed_from_u64(3);
        let (instance, _) = generator().generate(&mut rng).unwrap();

        for request in instance.requests.iter() {
            assert!(request.bandwidth >= 50.0 * 0.99 - 1e-9);
            assert!(request.bandwidth <= 300.0 * 0.99 + 1e-9);
            assert_eq!(1, request.chain.len());
        }
    }

    #[test]
    fn generation_is_reproducible_from_the_seed() {
        let make = || {
            DynamicGenerator::new(base(), lib(300.0), (3, 4), (2, 3), (4, 6), (50.0, 120.0))
                .unwrap()
        };
        let (one, sol_one) = make().generate(&mut StdRng::seed_from_u64(5)).unwrap();
        let (two, sol_two) = make().generate(&mut StdRng::seed_from_u64(5)).unwrap();

        assert_eq!(one.requests, two.requests);
        assert_eq!(sol_one.assignments, sol_two.assignments);
        assert_eq!(sol_one.objectives(), sol_two.objectives());
    }

    #[test]
    fn a_random_library_draws_its_capacity_on_the_step_grid() {
        let mut rng = StdRng::seed_from_u64(21);
        let gen = DynamicGenerator::with_random_lib(
            base(),
            (500.0, 700.0),
            (3, 4),
            (2, 3),
            (4, 6),
            (50.0, 120.0),
            &mut rng,
        )
        .unwrap();
        let (instance, _) = gen.generate(&mut rng).unwrap();

        assert_eq!(1, instance.vnf_lib.num_vnfs());
        let vnf = instance.vnf_lib.vnfs().next().unwrap();
        assert!((1.0..=8.0).contains(&vnf.cpu));
        assert!((vnf.capacity - 500.0).rem_euclid(50.0).abs() < 1e-9);
        assert!((500.0..=700.0).contains(&vnf.capacity));
    }

    #[test]
    fn a_library_with_several_types_is_rejected() {
        let mut two = lib(300.0);
        two.add(Vnf {
            name: "firewall".into(),
            cpu: 2.0,
            ram: 2.0,
            hdd: 2.0,
            delay: 1.0,
            capacity: 300.0,
            max_instances: None,
        })
        .unwrap();
        let failure = DynamicGenerator::new(base(), two, (3, 4), (2, 3), (4, 6), (50.0, 120.0));
        assert!(matches!(failure, Err(ModelError::SingleTypeRequired(2))));
    }

    #[test]
    fn a_capacity_below_the_bandwidth_floor_is_rejected() {
        let failure = DynamicGenerator::new(base(), lib(40.0), (3, 4), (2, 3), (4, 6), (50.0, 120.0));
        assert!(matches!(failure, Err(ModelError::CapacityTooSmall(_, _, _))));
    }

    #[test]
    fn degenerate_ranges_are_rejected() {
        assert!(DynamicGenerator::new(base(), lib(300.0), (3, 4), (2, 3), (0, 6), (50.0, 120.0)).is_err());
        assert!(DynamicGenerator::new(base(), lib(300.0), (4, 3), (2, 3), (4, 6), (50.0, 120.0)).is_err());
        assert!(DynamicGenerator::new(base(), lib(300.0), (3, 4), (2, 3), (4, 6), (0.5, 120.0)).is_err());
    }

    #[test]
    fn a_base_graph_needs_at_least_two_nodes() {
        let mut tiny = NetworkGraph::new();
        tiny.add_node("only", 0.0, 0.0, 0.0).unwrap();
        let failure = DynamicGenerator::new(tiny, lib(300.0), (1, 1), (1, 1), (1, 1), (50.0, 120.0));
        assert!(matches!(failure, Err(ModelError::InvalidParameter(_, _))));
    }
}
