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

//! This module provides the traffic requests: the demand side of a placement
//! problem.

use crate::{ModelError, NodeId, VnfId, VnfLib};

/// One traffic demand: so much bandwidth from an ingress node to an egress
/// node, through an ordered chain of function types, within an end-to-end
/// delay budget.
///
/// A request can only be built against a library in which every function
/// type of the chain can carry the requested bandwidth with a single
/// instance; a type whose capacity ceiling lies below the bandwidth demand
/// could never be satisfied no matter how many instances were deployed, so
/// the constructor rejects it on the spot.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRequest {
    /// The unique id of the request.
    pub id: usize,
    /// Where the traffic enters the network.
    pub ingress: NodeId,
    /// Where the traffic leaves the network.
    pub egress: NodeId,
    /// The bandwidth the request must be granted on every traversed link.
    pub bandwidth: f64,
    /// The maximum tolerated end-to-end delay.
    pub max_delay: f64,
    /// The ordered chain of function types the traffic must traverse.
    pub chain: Vec<VnfId>,
}

impl TrafficRequest {
    /// This builds a new request after checking, against the given library,
    /// that every function type of the chain can carry the requested
    /// bandwidth.
    pub fn new(
        id: usize,
        ingress: NodeId,
        egress: NodeId,
        bandwidth: f64,
        max_delay: f64,
        chain: Vec<VnfId>,
        lib: &VnfLib,
    ) -> Result<Self, ModelError> {
        for id in chain.iter().copied() {
            let vnf = lib.vnf(id);
            if vnf.capacity < bandwidth {
                return Err(ModelError::CapacityTooSmall(
                    vnf.name.clone(),
                    vnf.capacity,
                    bandwidth,
                ));
            }
        }
        Ok(Self { id, ingress, egress, bandwidth, max_delay, chain })
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_request {
    use crate::*;

    #[test]
    fn a_chain_the_types_can_carry_is_accepted() {
        let mut lib = VnfLib::new();
        let fw = lib
            .add(Vnf {
                name: "firewall".to_string(),
                cpu: 1.0,
                ram: 1.0,
                hdd: 1.0,
                delay: 1.0,
                capacity: 50.0,
                max_instances: None,
            })
            .unwrap();
        let request =
            TrafficRequest::new(0, NodeId(0), NodeId(1), 10.0, 100.0, vec![fw], &lib);
        assert!(request.is_ok());
    }

    #[test]
    fn a_type_that_cannot_carry_the_bandwidth_is_rejected_at_construction() {
        let mut lib = VnfLib::new();
        let fw = lib
            .add(Vnf {
                name: "firewall".to_string(),
                cpu: 1.0,
                ram: 1.0,
                hdd: 1.0,
                delay: 1.0,
                capacity: 5.0,
                max_instances: None,
            })
            .unwrap();
        let request =
            TrafficRequest::new(0, NodeId(0), NodeId(1), 10.0, 100.0, vec![fw], &lib);
        assert!(matches!(request, Err(ModelError::CapacityTooSmall(_, _, _))));
    }

    #[test]
    fn an_empty_chain_is_fine() {
        let lib = VnfLib::new();
        let request =
            TrafficRequest::new(0, NodeId(0), NodeId(1), 10.0, 100.0, vec![], &lib);
        assert!(request.is_ok());
    }
}
