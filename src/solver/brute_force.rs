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

//! This module provides the exhaustive placement solver. It enumerates, depth
//! first, every way of mapping each function of each request chain onto a
//! node with compute capacity, evaluates each complete assignment against the
//! delay, bandwidth and capacity constraints, and folds every feasible one
//! into a Pareto frontier over (total cpu, total hops).

use std::sync::Arc;

use fxhash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    min_bins, NodeId, ParetoFrontier, PathIndex, PlacementSolution, ProblemInstance, VnfId,
};

/// The exhaustive solver for one placement problem. It owns every buffer the
/// enumeration mutates, so one instance of it must not be shared; several
/// solvers may however run side by side against the same frozen problem since
/// they only ever read it (and its memoized path index).
///
/// The search space is the full cartesian product of the compute nodes over
/// the function slots of all chains: `|cpu nodes| ^ (total slots)` candidate
/// assignments. Nothing bounds the running time but the per-candidate
/// rejections, so callers are expected to keep the instances small or to kill
/// the process when they lose patience.
///
/// # Example
/// ```
/// # use vnfcp::*;
/// let mut graph = NetworkGraph::new();
/// let a = graph.add_node("a", 0.0, 0.0, 0.0)?;
/// let b = graph.add_node("b", 4.0, 4.0, 4.0)?;
/// let c = graph.add_node("c", 0.0, 0.0, 0.0)?;
/// graph.add_link(a, b, 100.0, 1.0)?;
/// graph.add_link(b, c, 100.0, 1.0)?;
///
/// let mut lib = VnfLib::new();
/// let fw = lib.add(Vnf {
///     name: "firewall".to_string(),
///     cpu: 1.0, ram: 1.0, hdd: 1.0,
///     delay: 1.0, capacity: 50.0, max_instances: None,
/// })?;
/// let requests =
///     vec![TrafficRequest::new(0, a, c, 10.0, 10.0, vec![fw], &lib)?];
/// let instance = ProblemInstance::new(graph, lib, requests);
///
/// let frontier = BruteForceSolver::new(&instance).solve();
/// assert_eq!(1, frontier.len());
/// assert_eq!(&[1.0, 2.0], frontier.iter().next().unwrap().objectives());
/// # Ok::<(), vnfcp::ModelError>(())
/// ```
pub struct BruteForceSolver<'a> {
    /// The problem being solved; frozen for the lifetime of the solver.
    instance: &'a ProblemInstance,
    /// The hop-shortest index every delay sum and bandwidth walk runs on.
    hop_index: Arc<PathIndex>,
    /// The distinct function types at least one request asks for, in first
    /// appearance order.
    requested_types: Vec<VnfId>,
    /// Maps a requested type to its row in the accounting tables.
    vnf_slot: FxHashMap<VnfId, usize>,
    /// The nodes offering cpu capacity; the domain of every function slot.
    cpu_locations: Vec<NodeId>,
    /// Maps a compute node to its column in the accounting tables.
    node_slot: FxHashMap<NodeId, usize>,
    /// How many function slots the whole problem has (the sum of all chain
    /// lengths); the exponent of the search space size.
    total_slots: usize,

    /// The one reusable assignment buffer: `assignment[r][f]` names the node
    /// hosting function `f` of request `r`. Slots are overwritten in place as
    /// the enumeration branches; a full evaluation only ever happens when
    /// every slot holds the current branch's choice.
    assignment: Vec<Vec<NodeId>>,
    /// Per link, the bandwidth consumed by the candidate under evaluation.
    used_bandwidths: Vec<f64>,
    /// Per (type row, node column), the bandwidth demands assigned there by
    /// the candidate under evaluation. Cleared, not reallocated, between
    /// evaluations.
    used_capacities: Vec<Vec<Vec<f64>>>,
    /// Per (type row, node column), the instance count the bin-packing
    /// oracle decided on for the candidate under evaluation.
    required_instances: Vec<Vec<usize>>,

    /// The non-dominated solutions found so far.
    frontier: ParetoFrontier<PlacementSolution>,
    /// How many candidates were evaluated so far.
    solved: f64,
    /// How many candidates the search space holds. Kept in floating point,
    /// the count overflows machine integers at realistic sizes.
    all: f64,
    /// The completion percentage of the last progress event.
    last_percent: f64,
    /// Emit a progress event every so many percent points.
    progress_step: f64,
}

impl<'a> BruteForceSolver<'a> {
    /// This creates a solver for the given problem, reporting progress every
    /// hundredth of a percent.
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self::custom(instance, 0.01)
    }

    /// This creates a solver for the given problem with a caller-chosen
    /// progress granularity (in percent points). All accounting tables are
    /// allocated here, once; the enumeration only ever resets them.
    pub fn custom(instance: &'a ProblemInstance, progress_step: f64) -> Self {
        let mut requested_types = vec![];
        let mut vnf_slot = FxHashMap::default();
        for request in instance.requests.iter() {
            for vnf in request.chain.iter().copied() {
                vnf_slot.entry(vnf).or_insert_with(|| {
                    requested_types.push(vnf);
                    requested_types.len() - 1
                });
            }
        }

        let mut cpu_locations = vec![];
        let mut node_slot = FxHashMap::default();
        for id in instance.graph.node_ids() {
            if instance.graph.node(id).cpu > 0.0 {
                node_slot.insert(id, cpu_locations.len());
                cpu_locations.push(id);
            }
        }

        let assignment: Vec<Vec<NodeId>> = instance
            .requests
            .iter()
            .map(|r| vec![NodeId(0); r.chain.len()])
            .collect();
        let total_slots = assignment.iter().map(|slots| slots.len()).sum();

        Self {
            hop_index: instance.graph.hop_index(),
            used_bandwidths: vec![0.0; instance.graph.num_links()],
            used_capacities: vec![vec![vec![]; cpu_locations.len()]; requested_types.len()],
            required_instances: vec![vec![0; cpu_locations.len()]; requested_types.len()],
            instance,
            requested_types,
            vnf_slot,
            cpu_locations,
            node_slot,
            total_slots,
            assignment,
            frontier: ParetoFrontier::new(),
            solved: 0.0,
            all: 0.0,
            last_percent: 0.0,
            progress_step,
        }
    }

    /// This method runs the exhaustive search to completion and returns the
    /// Pareto frontier of every feasible placement it came across. Feasibility
    /// rejections along the way are traced, never returned: an infeasible
    /// problem simply yields an empty frontier.
    ///
    /// # Panics
    /// The graph is assumed connected for every (ingress, compute node,
    /// egress) pair the enumeration routes through. Solving a problem whose
    /// requests span disconnected components is a programming error and
    /// panics when the path index is queried for the missing route.
    pub fn solve(&mut self) -> ParetoFrontier<PlacementSolution> {
        self.frontier = ParetoFrontier::new();
        self.solved = 0.0;
        self.all = (self.cpu_locations.len() as f64).powi(self.total_slots as i32);
        self.last_percent = -self.progress_step;

        self.explore(0, 0);

        debug!("search done, {} non-dominated placements", self.frontier.len());
        std::mem::take(&mut self.frontier)
    }

    /// Depth-first enumeration over (request, chain position): every compute
    /// node is tried in the current slot before moving to the next one, and
    /// a complete assignment is evaluated once the last request runs out of
    /// positions.
    fn explore(&mut self, request: usize, position: usize) {
        if request >= self.instance.requests.len() {
            self.evaluate();
        } else if position >= self.instance.requests[request].chain.len() {
            self.explore(request + 1, 0);
        } else {
            for i in 0..self.cpu_locations.len() {
                self.assignment[request][position] = self.cpu_locations[i];
                self.explore(request, position + 1);
            }
        }
    }

    /// Checks the candidate currently held by the assignment buffer against
    /// every constraint, in the cheapest-first order, and offers it to the
    /// frontier when it survives them all. The first violated constraint
    /// aborts the evaluation; that is the expected outcome of most calls and
    /// is only traced.
    fn evaluate(&mut self) {
        self.solved += 1.0;
        let percent = self.solved / self.all * 100.0;
        if percent - self.last_percent >= self.progress_step {
            debug!("tested {percent:.2}% of the candidate assignments");
            self.last_percent = percent;
        }

        let inst = self.instance;
        let index = Arc::clone(&self.hop_index);

        self.used_bandwidths.fill(0.0);
        for per_type in self.used_capacities.iter_mut() {
            for demands in per_type.iter_mut() {
                demands.clear();
            }
        }

        let mut total_hops = 0.0;

        for (r, request) in inst.requests.iter().enumerate() {
            // end-to-end delay and hop count along the legs
            // ingress -> f1 -> f2 -> ... -> egress of the bfs tree
            let mut delay = 0.0;
            let mut hops = 0.0;
            let mut last = request.ingress;
            for here in self.assignment[r].iter().copied().chain([request.egress]) {
                let attr = index.attr(last, here);
                delay += attr.delay;
                hops += attr.hops as f64;
                last = here;
            }
            for vnf in request.chain.iter().copied() {
                delay += inst.vnf_lib.vnf(vnf).delay;
            }
            if delay > request.max_delay {
                trace!(
                    "request {} delayed: {delay} exceeds its budget of {}",
                    request.id,
                    request.max_delay
                );
                return;
            }
            total_hops += hops;

            // charge the request's bandwidth to every link of those legs
            let mut last = request.ingress;
            for here in self.assignment[r].iter().copied().chain([request.egress]) {
                for link_id in index.walk(&inst.graph, last, here) {
                    let used = self.used_bandwidths[link_id.id()] + request.bandwidth;
                    if used > inst.graph.link(link_id).bandwidth {
                        let (a, b) = inst.graph.link_names(link_id);
                        trace!("link ({a} - {b}) crowded");
                        return;
                    }
                    self.used_bandwidths[link_id.id()] = used;
                }
                last = here;
            }

            // pile the demand onto every (type, node) it was assigned to
            for (position, vnf) in request.chain.iter().enumerate() {
                let v = self.vnf_slot[vnf];
                let n = self.node_slot[&self.assignment[r][position]];
                self.used_capacities[v][n].push(request.bandwidth);
            }
        }

        // how many instances must each (type, node) pile deploy
        for (v, vnf) in self.requested_types.iter().copied().enumerate() {
            let capacity = inst.vnf_lib.vnf(vnf).capacity;
            for n in 0..self.cpu_locations.len() {
                let demands = &mut self.used_capacities[v][n];
                self.required_instances[v][n] = if demands.is_empty() {
                    0
                } else if demands.iter().sum::<f64>() <= capacity {
                    // one instance carries the whole pile, no need to pack
                    1
                } else {
                    min_bins(demands, capacity)
                };
            }
        }

        // do the instances fit their nodes, and what do they cost in total
        let mut total_cpu = 0.0;
        for (n, location) in self.cpu_locations.iter().copied().enumerate() {
            let node = inst.graph.node(location);
            let mut required = 0.0;
            for (v, vnf) in self.requested_types.iter().copied().enumerate() {
                required += self.required_instances[v][n] as f64 * inst.vnf_lib.vnf(vnf).cpu;
            }
            if required > node.cpu {
                trace!(
                    "node {} over capacity: {required} cpu required, {} available",
                    node.name,
                    node.cpu
                );
                return;
            }
            total_cpu += required;
        }

        self.frontier.insert(PlacementSolution::new(
            self.assignment.clone(),
            total_cpu,
            total_hops,
        ));
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_brute_force {
    use crate::*;

    fn vnf(name: &str, cpu: f64, capacity: f64, delay: f64) -> Vnf {
        Vnf {
            name: name.to_string(),
            cpu,
            ram: 1.0,
            hdd: 1.0,
            delay,
            capacity,
            max_instances: None,
        }
    }

    /// a -- b -- c with the given link bandwidth; only b offers cpu.
    fn line(bandwidth: f64) -> (NetworkGraph, [NodeId; 3]) {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 0.0, 0.0, 0.0).unwrap();
        let b = graph.add_node("b", 4.0, 4.0, 4.0).unwrap();
        let c = graph.add_node("c", 0.0, 0.0, 0.0).unwrap();
        graph.add_link(a, b, bandwidth, 1.0).unwrap();
        graph.add_link(b, c, bandwidth, 1.0).unwrap();
        (graph, [a, b, c])
    }

    #[test]
    fn the_line_scenario_places_its_function_in_the_middle() {
        let (graph, [a, b, c]) = line(100.0);
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 1.0, 50.0, 1.0)).unwrap();
        let requests =
            vec![TrafficRequest::new(0, a, c, 10.0, 10.0, vec![fw], &lib).unwrap()];
        let instance = ProblemInstance::new(graph, lib, requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        assert_eq!(1, frontier.len());
        let solution = frontier.iter().next().unwrap();
        assert_eq!(&[1.0, 2.0], solution.objectives());
        assert_eq!(&[vec![b]], solution.assignments());
    }

    #[test]
    fn an_unreachable_delay_budget_empties_the_frontier() {
        let (graph, [a, _, c]) = line(100.0);
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 1.0, 50.0, 1.0)).unwrap();
        let requests =
            vec![TrafficRequest::new(0, a, c, 10.0, 1.0, vec![fw], &lib).unwrap()];
        let instance = ProblemInstance::new(graph, lib, requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        assert!(frontier.is_empty());
    }

    #[test]
    fn crowded_links_empty_the_frontier() {
        // both requests must cross both links; 10 + 10 > 15
        let (graph, [a, _, c]) = line(15.0);
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 1.0, 100.0, 0.0)).unwrap();
        let requests = vec![
            TrafficRequest::new(0, a, c, 10.0, 100.0, vec![fw], &lib).unwrap(),
            TrafficRequest::new(1, a, c, 10.0, 100.0, vec![fw], &lib).unwrap(),
        ];
        let instance = ProblemInstance::new(graph, lib, requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        assert!(frontier.is_empty());
    }

    #[test]
    fn a_function_too_heavy_for_every_node_empties_the_frontier() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 0.0, 0.0, 0.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        let c = graph.add_node("c", 0.0, 0.0, 0.0).unwrap();
        graph.add_link(a, b, 100.0, 1.0).unwrap();
        graph.add_link(b, c, 100.0, 1.0).unwrap();

        let mut lib = VnfLib::new();
        let heavy = lib.add(vnf("heavy", 2.0, 50.0, 1.0)).unwrap();
        let requests =
            vec![TrafficRequest::new(0, a, c, 10.0, 100.0, vec![heavy], &lib).unwrap()];
        let instance = ProblemInstance::new(graph, lib, requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        assert!(frontier.is_empty());
    }

    #[test]
    fn demands_beyond_one_ceiling_cost_a_second_instance() {
        // both requests land on b (the only compute node); 10 + 10 > 15
        // forces two instances there
        let (graph, [a, _, c]) = line(100.0);
        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 1.0, 15.0, 0.0)).unwrap();
        let requests = vec![
            TrafficRequest::new(0, a, c, 10.0, 100.0, vec![fw], &lib).unwrap(),
            TrafficRequest::new(1, a, c, 10.0, 100.0, vec![fw], &lib).unwrap(),
        ];
        let instance = ProblemInstance::new(graph, lib, requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        assert_eq!(1, frontier.len());
        assert_eq!(&[2.0, 4.0], frontier.iter().next().unwrap().objectives());
    }

    #[test]
    fn sharing_an_instance_trades_hops_for_cpu() {
        // a -- x -- m -- y -- b; x and y offer cpu; r0 runs a -> m and
        // r1 runs m -> b. Hosting both functions on one node shares a
        // single instance (cpu 1) at the price of a detour (6 hops);
        // splitting them costs two instances (cpu 2) on shortest routes
        // (4 hops). Both trade-offs must survive on the frontier.
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 0.0, 0.0, 0.0).unwrap();
        let x = graph.add_node("x", 1.0, 1.0, 1.0).unwrap();
        let m = graph.add_node("m", 0.0, 0.0, 0.0).unwrap();
        let y = graph.add_node("y", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 0.0, 0.0, 0.0).unwrap();
        graph.add_link(a, x, 100.0, 1.0).unwrap();
        graph.add_link(x, m, 100.0, 1.0).unwrap();
        graph.add_link(m, y, 100.0, 1.0).unwrap();
        graph.add_link(y, b, 100.0, 1.0).unwrap();

        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 1.0, 20.0, 0.0)).unwrap();
        let requests = vec![
            TrafficRequest::new(0, a, m, 10.0, 100.0, vec![fw], &lib).unwrap(),
            TrafficRequest::new(1, m, b, 10.0, 100.0, vec![fw], &lib).unwrap(),
        ];
        let instance = ProblemInstance::new(graph, lib, requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        let mut points: Vec<(f64, f64)> =
            frontier.iter().map(|s| (s.cpu(), s.hops())).collect();
        points.sort_by(|p, q| p.partial_cmp(q).unwrap());
        assert_eq!(vec![(1.0, 6.0), (2.0, 4.0)], points);
    }

    #[test]
    fn equivalent_placements_collapse_to_one_frontier_point() {
        // two compute nodes on the path, either single-function placement
        // costs (1 cpu, 3 hops); the frontier keeps exactly one of them
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 0.0, 0.0, 0.0).unwrap();
        let p = graph.add_node("p", 1.0, 1.0, 1.0).unwrap();
        let q = graph.add_node("q", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 0.0, 0.0, 0.0).unwrap();
        graph.add_link(a, p, 100.0, 1.0).unwrap();
        graph.add_link(p, q, 100.0, 1.0).unwrap();
        graph.add_link(q, b, 100.0, 1.0).unwrap();

        let mut lib = VnfLib::new();
        let fw = lib.add(vnf("firewall", 1.0, 50.0, 1.0)).unwrap();
        let requests =
            vec![TrafficRequest::new(0, a, b, 10.0, 100.0, vec![fw], &lib).unwrap()];
        let instance = ProblemInstance::new(graph, lib, requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        assert_eq!(1, frontier.len());
        assert_eq!(&[1.0, 3.0], frontier.iter().next().unwrap().objectives());
    }

    #[test]
    fn a_problem_without_requests_has_the_empty_placement() {
        let (graph, _) = line(100.0);
        let instance = ProblemInstance::new(graph, VnfLib::new(), vec![]);
        let frontier = BruteForceSolver::new(&instance).solve();
        assert_eq!(1, frontier.len());
        assert_eq!(&[0.0, 0.0], frontier.iter().next().unwrap().objectives());
    }

    #[test]
    fn an_empty_chain_is_routed_straight_through() {
        let (graph, [a, _, c]) = line(100.0);
        let requests = vec![TrafficRequest::new(
            0,
            a,
            c,
            10.0,
            10.0,
            vec![],
            &VnfLib::new(),
        )
        .unwrap()];
        let instance = ProblemInstance::new(graph, VnfLib::new(), requests);

        let frontier = BruteForceSolver::new(&instance).solve();
        assert_eq!(1, frontier.len());
        assert_eq!(&[0.0, 2.0], frontier.iter().next().unwrap().objectives());
    }
}
