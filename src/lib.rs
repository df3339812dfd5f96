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

//! # VNFCP
//! VNFCP is an exact multi-objective solver and benchmark toolkit for the
//! placement of chained virtual network functions. Given a capacitated
//! network topology and a set of traffic requests -- each demanding that its
//! traffic traverse an ordered chain of function types within a bandwidth
//! and latency budget -- it finds *every* Pareto-optimal trade-off between
//! the CPU spent on function instances and the total number of hops the
//! routed traffic takes.
//!
//! The crate splits into four parts:
//! - the problem model (`NetworkGraph`, `VnfLib`, `TrafficRequest`,
//!   `ProblemInstance`) with memoized all-pairs shortest-path indices,
//! - the solution model (`ParetoFrontier` over anything implementing
//!   `Solution`, plus the concrete placement and deployment solutions),
//! - the exhaustive `BruteForceSolver` with its bin-packing oracle,
//! - the seeded benchmark generators (`GridGenerator`, `DynamicGenerator`)
//!   and the text formats they are exchanged in (see the `io` module).
//!
//! ## Quick example
//! The following builds the smallest interesting problem -- a line network
//! with one compute node in the middle and one request that must traverse
//! one function -- and recovers its frontier.
//!
//! ```
//! # use vnfcp::*;
//! // a tiny network: in -- mid -- out, compute power in the middle only
//! let mut graph = NetworkGraph::new();
//! let ingress = graph.add_node("in", 0.0, 0.0, 0.0)?;
//! let mid     = graph.add_node("mid", 4.0, 4.0, 4.0)?;
//! let egress  = graph.add_node("out", 0.0, 0.0, 0.0)?;
//! graph.add_link(ingress, mid, 100.0, 1.0)?;
//! graph.add_link(mid, egress, 100.0, 1.0)?;
//!
//! // one function type, and one request demanding it
//! let mut lib = VnfLib::default();
//! let firewall = lib.add(Vnf {
//!     name: "firewall".into(),
//!     cpu: 2.0,
//!     ram: 2.0,
//!     hdd: 2.0,
//!     delay: 1.0,
//!     capacity: 50.0,
//!     max_instances: None,
//! })?;
//! let request = TrafficRequest::new(0, ingress, egress, 10.0, 10.0, vec![firewall], &lib)?;
//!
//! // the frontier holds every non-dominated [cpu, hops] trade-off
//! let instance = ProblemInstance::new(graph, lib, vec![request]);
//! let frontier = BruteForceSolver::new(&instance).solve();
//! assert_eq!(1, frontier.len());
//! assert_eq!([2.0, 2.0], frontier.as_slice()[0].objectives());
//! # Ok::<(), vnfcp::ModelError>(())
//! ```
//!
//! ## Benchmarks with known optima
//! Exhaustive search only scales so far, so the point of the generators is
//! to build instances whose optima are known by construction: the grid
//! family ships a closed-form reference frontier to compare a solver
//! against, and the dynamic family synthesizes a problem around a feasible
//! deployment it hands back to you.

mod common;
mod model;
mod solution;
mod solver;
mod generators;
pub mod io;

pub use common::*;
pub use model::*;
pub use solution::*;
pub use solver::*;
pub use generators::*;
