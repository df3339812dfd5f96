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

//! This module defines the grid benchmark generator. It builds a layered
//! topology -- an `n x k` grid of compute nodes strung between `m`
//! source/destination pairs -- whose exact Pareto frontier admits a closed
//! form. That makes the family the yardstick of choice for validating any
//! solver: generate, solve, and compare against [`GridInstance::reference_frontier`].
//!
//! The grid is laid out in `n` *stages* of `k` parallel *rails*. Every request
//! demands the full chain of function types, one per stage, so a placement
//! boils down to choosing which rails host the chain. Capacities are sized so
//! that one instance per (stage, rail) cell serves every request at once.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    ModelError, NetworkGraph, ParetoFrontier, PlacementSolution, ProblemInstance, TrafficRequest,
    Vnf, VnfLib,
};

// ----------------------------------------------------------------------------
// --- GRID GENERATOR ---------------------------------------------------------
// ----------------------------------------------------------------------------

/// This generator builds grid placement problems. Each of the dimension
/// parameters is an inclusive range from which a concrete value is drawn for
/// every generated instance:
///
/// - `m`: the number of source/destination pairs,
/// - `k`: the number of rails (parallel copies of the chain's home),
/// - `n`: the number of stages (the length of the full chain when one
///   function type lives on each node).
///
/// The request density `rho` fixes the number of requests at `ceil(m^2 * rho)`
/// random source/destination pairings.
#[derive(Debug, Clone, Copy)]
pub struct GridGenerator {
    /// The inclusive range the number of endpoint pairs is drawn from.
    m: (usize, usize),
    /// The inclusive range the number of rails is drawn from.
    k: (usize, usize),
    /// The inclusive range the number of stages is drawn from.
    n: (usize, usize),
    /// The fraction of the `m^2` possible endpoint pairings that becomes an
    /// actual request.
    rho: f64,
    /// How many function types each compute node can host at full capacity.
    vnfs_per_node: usize,
}

impl GridGenerator {
    /// This creates a generator hosting one function type per compute node,
    /// which is the configuration whose reference frontier is exact.
    pub fn new(
        m: (usize, usize),
        k: (usize, usize),
        n: (usize, usize),
        rho: f64,
    ) -> Result<Self, ModelError> {
        Self::custom(m, k, n, rho, 1)
    }

    /// This creates a fully custom generator. It fails if any of the ranges
    /// is empty or starts below one, if the density is not in `(0, 1]`, or
    /// if `vnfs_per_node` is zero.
    pub fn custom(
        m: (usize, usize),
        k: (usize, usize),
        n: (usize, usize),
        rho: f64,
        vnfs_per_node: usize,
    ) -> Result<Self, ModelError> {
        check_dimension_range("m", m)?;
        check_dimension_range("k", k)?;
        check_dimension_range("n", n)?;
        if !(rho > 0.0 && rho <= 1.0) {
            return Err(ModelError::InvalidParameter("request density", rho));
        }
        if vnfs_per_node < 1 {
            return Err(ModelError::InvalidParameter(
                "functions per node",
                vnfs_per_node as f64,
            ));
        }
        Ok(Self { m, k, n, rho, vnfs_per_node })
    }

    /// This method generates one problem instance, drawing the concrete
    /// dimensions and the request endpoints from the given RNG. The same seed
    /// always yields the same instance.
    pub fn generate(&self, rng: &mut StdRng) -> Result<GridInstance, ModelError> {
        let m = rng.random_range(self.m.0..=self.m.1);
        let k = rng.random_range(self.k.0..=self.k.1);
        let n = rng.random_range(self.n.0..=self.n.1);
        let n2 = n * self.vnfs_per_node;

        let d = (m as f64 * m as f64 * self.rho).ceil() as usize;
        let bandwidth = d as f64 * (n2 + 1) as f64 * 1.2;
        let caps = self.vnfs_per_node as f64;

        let mut graph = NetworkGraph::new();

        // endpoints carry no compute capacity at all
        let mut src_nodes = Vec::with_capacity(m);
        let mut dst_nodes = Vec::with_capacity(m);
        for i in 0..m {
            src_nodes.push(graph.add_node(format!("src{i}"), 0.0, 0.0, 0.0)?);
            dst_nodes.push(graph.add_node(format!("dst{i}"), 0.0, 0.0, 0.0)?);
        }

        // the n x k grid, linked stage to stage along each rail and rail to
        // rail within each stage
        let mut stages: Vec<Vec<_>> = Vec::with_capacity(n);
        for i in 0..n {
            let mut current = Vec::with_capacity(k);
            for j in 0..k {
                let node = graph.add_node(format!("n{i}k{j}"), caps, caps, caps)?;
                current.push(node);

                if i > 0 {
                    graph.add_link(stages[i - 1][j], node, bandwidth, 1.0)?;
                }
                if j > 0 {
                    graph.add_link(current[j - 1], node, bandwidth, 1.0)?;
                }
            }
            stages.push(current);
        }
        let first_stage = &stages[0];
        let last_stage = &stages[n - 1];

        // spread the endpoints across the rails of the first and last stage,
        // attaching to two rails when an endpoint falls between them
        if m >= k {
            for j in 0..m {
                let frac = (j + 1) as f64 / m as f64 * k as f64;
                let nc = (frac.ceil() as isize - 1).max(0) as usize;
                let nf = (frac.floor() as isize - 1).max(0) as usize;

                graph.add_link(src_nodes[j], first_stage[nc], bandwidth, 1.0)?;
                graph.add_link(last_stage[nc], dst_nodes[j], bandwidth, 1.0)?;
                if nc != nf {
                    graph.add_link(src_nodes[j], first_stage[nf], bandwidth, 1.0)?;
                    graph.add_link(last_stage[nf], dst_nodes[j], bandwidth, 1.0)?;
                }
            }
        } else {
            for j in 0..k {
                let frac = (j + 1) as f64 / k as f64 * m as f64;
                let nc = (frac.ceil() as isize - 1).max(0) as usize;
                let nf = (frac.floor() as isize - 1).max(0) as usize;

                graph.add_link(src_nodes[nc], first_stage[j], bandwidth, 1.0)?;
                graph.add_link(last_stage[j], dst_nodes[nc], bandwidth, 1.0)?;
                if nc != nf {
                    graph.add_link(src_nodes[nf], first_stage[j], bandwidth, 1.0)?;
                    graph.add_link(last_stage[j], dst_nodes[nf], bandwidth, 1.0)?;
                }
            }
        }

        // one function type per grid cell along a rail, sized to serve every
        // request at once
        let mut lib = VnfLib::default();
        let mut chain = Vec::with_capacity(n2);
        for i in 0..n2 {
            chain.push(lib.add(Vnf {
                name: format!("v{i}"),
                cpu: 1.0,
                ram: 1.0,
                hdd: 1.0,
                delay: 1.0,
                capacity: d as f64 * 1.2,
                max_instances: None,
            })?);
        }

        // m copies of either endpoint pool, shuffled, make the d pairings
        // near-uniform without starving any endpoint
        let mut src_pool = Vec::with_capacity(m * m);
        let mut dst_pool = Vec::with_capacity(m * m);
        for _ in 0..m {
            src_pool.extend_from_slice(&src_nodes);
            dst_pool.extend_from_slice(&dst_nodes);
        }
        src_pool.shuffle(rng);
        dst_pool.shuffle(rng);

        let max_delay = (n2 + k + 1) as f64 * (n2 + 1) as f64 * 1.2 + 2.0;
        let mut requests = Vec::with_capacity(d);
        for i in 0..d {
            requests.push(TrafficRequest::new(
                i,
                src_pool[i],
                dst_pool[i],
                1.0,
                max_delay,
                chain.clone(),
                &lib,
            )?);
        }

        Ok(GridInstance {
            instance: ProblemInstance::new(graph, lib, requests),
            m,
            k,
            n,
        })
    }
}

/// This checks that a grid dimension range is usable: the lower bound must
/// be at least one and must not exceed the upper bound.
fn check_dimension_range(what: &'static str, range: (usize, usize)) -> Result<(), ModelError> {
    if range.0 < 1 || range.0 > range.1 {
        Err(ModelError::InvalidRange(what, range.0 as f64, range.1 as f64))
    } else {
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// --- GRID INSTANCE ----------------------------------------------------------
// ----------------------------------------------------------------------------

/// One generated grid problem, along with the concrete dimensions it was
/// built with. The dimensions are what make the closed-form reference
/// frontier computable after the fact.
#[derive(Debug)]
pub struct GridInstance {
    /// The generated placement problem.
    pub instance: ProblemInstance,
    /// The number of source/destination pairs.
    pub m: usize,
    /// The number of rails.
    pub k: usize,
    /// The number of stages.
    pub n: usize,
}

impl GridInstance {
    /// This method computes the exact Pareto frontier of the instance in
    /// closed form, without running any solver. It enumerates the `2^k`
    /// subsets of rails that could host the full chain: hosting on `r` rails
    /// costs `r` instances per stage, and each request routes through the
    /// hosting rail closest to its two attachment points (that per-request
    /// detour is capped at `k + 1` hops).
    ///
    /// The closed form holds for instances generated with one function type
    /// per compute node, the default configuration.
    pub fn reference_frontier(&self) -> ParetoFrontier<PlacementSolution> {
        let mut frontier = ParetoFrontier::new();
        let mut hosting = vec![false; self.k];
        self.enumerate_rails(&mut frontier, &mut hosting, 0);
        frontier
    }

    /// This recursively enumerates every subset of hosting rails and scores
    /// each non-empty one against the frontier.
    fn enumerate_rails(
        &self,
        frontier: &mut ParetoFrontier<PlacementSolution>,
        hosting: &mut Vec<bool>,
        rail: usize,
    ) {
        if rail < self.k {
            hosting[rail] = true;
            self.enumerate_rails(frontier, hosting, rail + 1);
            hosting[rail] = false;
            self.enumerate_rails(frontier, hosting, rail + 1);
            return;
        }
        let hosted = hosting.iter().filter(|h| **h).count();
        if hosted == 0 {
            return;
        }

        let cpu_per_vnf = self.instance.vnf_lib.vnfs().next().map_or(0.0, |vnf| vnf.cpu);
        let cpu = cpu_per_vnf * self.n as f64 * hosted as f64;

        // every request pays (n + 1) hops to traverse the grid, plus the
        // detour to the closest hosting rail
        let graph = &self.instance.graph;
        let mut hops = (self.instance.requests.len() * (self.n + 1)) as f64;
        for request in &self.instance.requests {
            let mut smallest = self.k + 1;
            for id in graph.adjacent_links(request.ingress) {
                let attach = graph.link(*id).other_end(request.ingress);
                let ingress_rail = rail_index(&graph.node(attach).name);

                for id2 in graph.adjacent_links(request.egress) {
                    let attach2 = graph.link(*id2).other_end(request.egress);
                    let egress_rail = rail_index(&graph.node(attach2).name);

                    for (r, host) in hosting.iter().enumerate() {
                        let dist = ingress_rail.abs_diff(r) + egress_rail.abs_diff(r);
                        if *host && dist < smallest {
                            smallest = dist;
                        }
                    }
                }
            }
            hops += smallest as f64;
        }

        frontier.insert(PlacementSolution::new(vec![], cpu, hops));
    }
}

/// The rail a compute node sits on, parsed from the tail of its name.
fn rail_index(name: &str) -> usize {
    name.rsplit('k')
        .next()
        .and_then(|tail| tail.parse().ok())
        .unwrap_or_else(|| panic!("not a grid compute node: {name}"))
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
