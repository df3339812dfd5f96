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

//! This module defines the bundle tying a graph, a vnf library and a list of
//! requests together into one self-contained problem instance.

use crate::{NetworkGraph, TrafficRequest, VnfLib};

/// One complete placement problem: the network to place on, the library the
/// request chains draw from, and the traffic demands themselves. This is the
/// unit the generators produce, the file readers parse, and the solver
/// consumes.
#[derive(Debug)]
pub struct ProblemInstance {
    /// The capacitated network topology.
    pub graph: NetworkGraph,
    /// The library owning every function type the requests refer to.
    pub vnf_lib: VnfLib,
    /// The traffic demands, in id order.
    pub requests: Vec<TrafficRequest>,
}

impl ProblemInstance {
    /// This bundles the three parts into one instance.
    pub fn new(graph: NetworkGraph, vnf_lib: VnfLib, requests: Vec<TrafficRequest>) -> Self {
        Self { graph, vnf_lib, requests }
    }
}
