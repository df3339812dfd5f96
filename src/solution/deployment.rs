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

//! This module provides the deployment model: concrete function instances
//! pinned to nodes, the routed flows threading traffic through them, and the
//! solution type bundling a whole known deployment. The dynamic generator
//! builds instances *around* such a deployment, so the optimum of the
//! generated problem is known by construction.

use fxhash::FxHashSet;

use crate::{LinkId, NetworkGraph, NodeId, Solution, VnfId, VnfLib};

// ----------------------------------------------------------------------------
// --- INSTANCE ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type identifies one deployed instance within the instance arena of a
/// deployment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InstanceId(pub usize);
impl InstanceId {
    #[inline]
    /// This function returns the id (numeric value) of the instance.
    pub fn id(self) -> usize {
        self.0
    }
}

/// One deployed copy of a function type, pinned to a node, with a running
/// account of how much of its bandwidth ceiling is already consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct VnfInstance {
    /// The node the instance runs on.
    pub node: NodeId,
    /// The function type of the instance.
    pub vnf: VnfId,
    /// How much bandwidth the flows assigned so far already consume.
    pub used: f64,
}

impl VnfInstance {
    /// How much bandwidth this instance can still accept, given its type's
    /// ceiling in the library.
    pub fn remaining(&self, lib: &VnfLib) -> f64 {
        lib.vnf(self.vnf).capacity - self.used
    }
}

// ----------------------------------------------------------------------------
// --- FLOWS ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One step of a routed flow: the node reached, the link it was reached by
/// (`None` on the very first step) and the instance traversed at that node,
/// if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    /// The node this step lands on.
    pub node: NodeId,
    /// The link crossed to get here, `None` at the start of the flow.
    pub link: Option<LinkId>,
    /// The instance the traffic runs through at this node, if any.
    pub instance: Option<InstanceId>,
}

/// A concrete routed path through the network, from an ingress to an egress,
/// possibly threading one or more deployed instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flow {
    /// The steps of the path, ingress first.
    pub hops: Vec<Hop>,
}

impl Flow {
    /// The number of link traversals along the flow.
    pub fn hop_count(&self) -> usize {
        self.hops.iter().filter(|hop| hop.link.is_some()).count()
    }

    /// The end-to-end delay of the flow: the delay of every crossed link
    /// plus the fixed delay of every traversed instance.
    pub fn delay(&self, graph: &NetworkGraph, lib: &VnfLib, instances: &[VnfInstance]) -> f64 {
        self.hops
            .iter()
            .map(|hop| {
                let link = hop.link.map_or(0.0, |id| graph.link(id).delay);
                let vnf = hop
                    .instance
                    .map_or(0.0, |id| lib.vnf(instances[id.id()].vnf).delay);
                link + vnf
            })
            .sum()
    }
}

/// Binds one traffic request (by id) to the flow that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowAssignment {
    /// The id of the carried request.
    pub request: usize,
    /// The routed path that carries it.
    pub flow: Flow,
}

// ----------------------------------------------------------------------------
// --- DEPLOYMENT SOLUTION ----------------------------------------------------
// ----------------------------------------------------------------------------
/// A full known deployment: the arena of deployed instances plus the flow
/// assignment of every request. Its single objective is the total CPU cost
/// of the deployed instances.
#[derive(Debug, Clone)]
pub struct DeploymentSolution {
    /// The instance arena; `InstanceId`s in the hops index into it.
    pub instances: Vec<VnfInstance>,
    /// One flow assignment per request.
    pub assignments: Vec<FlowAssignment>,
    /// `[total cpu]`.
    objective: [f64; 1],
}

impl DeploymentSolution {
    /// This bundles a deployment, computing its CPU objective from the
    /// library the instance types live in.
    pub fn new(
        instances: Vec<VnfInstance>,
        assignments: Vec<FlowAssignment>,
        lib: &VnfLib,
    ) -> Self {
        let cpu = instances.iter().map(|i| lib.vnf(i.vnf).cpu).sum();
        Self { instances, assignments, objective: [cpu] }
    }

    /// The number of deployed instances.
    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// How many distinct nodes host at least one instance.
    pub fn num_used_nodes(&self) -> usize {
        self.instances
            .iter()
            .map(|i| i.node)
            .collect::<FxHashSet<_>>()
            .len()
    }
}

impl Solution for DeploymentSolution {
    fn objectives(&self) -> &[f64] {
        &self.objective
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
