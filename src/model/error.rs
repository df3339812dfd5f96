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

//! This module defines the errors that can pop up while building the problem
//! data. These are all hard construction errors: the call that introduces the
//! violation fails on the spot, an instance that was built without error is
//! structurally sound.

/// This enumeration groups the kind of errors that might occur when one builds
/// a problem instance by hand (or through one of the file readers). A graph
/// rejects name clashes, self-links and duplicate links; a vnf library rejects
/// name clashes and negative pair latencies; a traffic request rejects chains
/// whose function types cannot even carry the requested bandwidth.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A node with that name already exists in the graph.
    #[error("node {0} already exists")]
    DuplicateNode(String),
    /// Both endpoints of the link are the same node.
    #[error("node {0} linked to itself")]
    SelfLink(String),
    /// A link between these two nodes (in either direction) already exists.
    #[error("link {0} - {1} added twice")]
    DuplicateLink(String, String),
    /// A function type with that name (or an alias shadowing it) already
    /// exists in the library.
    #[error("vnf {0} already exists")]
    DuplicateVnf(String),
    /// A pair latency bound must be non negative.
    #[error("pair latency {2} between {0} and {1} is negative")]
    NegativeLatency(String, String, f64),
    /// The function type cannot carry the bandwidth the request asks for, so
    /// no amount of instances would make the request feasible.
    #[error("vnf {0} capacity {1} is below the requested bandwidth {2}")]
    CapacityTooSmall(String, f64, f64),
    /// A generator was configured with a range whose lower bound is below
    /// one or above the upper bound.
    #[error("invalid {0} range [{1}, {2}]")]
    InvalidRange(&'static str, f64, f64),
    /// A generator was configured with a scalar parameter outside of its
    /// meaningful domain.
    #[error("invalid {0}: {1}")]
    InvalidParameter(&'static str, f64),
    /// The dynamic generator routes every flow through a single function,
    /// so it only accepts libraries holding exactly one type.
    #[error("exactly one function type is supported ({0} given)")]
    SingleTypeRequired(usize),
}
