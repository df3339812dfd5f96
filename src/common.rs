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

//! This module defines the most basic data types that are used throughout all
//! the code of our library. Everything in the crate identifies nodes, links
//! and function types by their index in the arena that owns them, and these
//! are the types of those indices.

// ----------------------------------------------------------------------------
// --- NODE ID ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type identifies one node of a network graph. Each node is identified
/// with an integer ranging from 0 until `graph.num_nodes()`, in the order of
/// their insertion in the graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub usize);
impl NodeId {
    #[inline]
    /// This function returns the id (numeric value) of the node.
    ///
    /// # Examples:
    /// ```
    /// # use vnfcp::NodeId;
    /// assert_eq!(0, NodeId(0).id());
    /// assert_eq!(1, NodeId(1).id());
    /// assert_eq!(2, NodeId(2).id());
    /// ```
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- LINK ID ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type identifies one link of a network graph. Each link is identified
/// with an integer ranging from 0 until `graph.num_links()`, in the order of
/// their insertion in the graph.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LinkId(pub usize);
impl LinkId {
    #[inline]
    /// This function returns the id (numeric value) of the link.
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- VNF ID -----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type identifies one function type (VNF) from a [VNF library](crate::VnfLib).
/// Each function type is identified with an integer ranging from 0 until
/// `lib.num_vnfs()`, in the order of their registration in the library.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VnfId(pub usize);
impl VnfId {
    #[inline]
    /// This function returns the id (numeric value) of the function type.
    pub fn id(self) -> usize {
        self.0
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_ids {
    use crate::{LinkId, NodeId, VnfId};

    #[test]
    fn test_node_id() {
        assert_eq!(0, NodeId(0).id());
        assert_eq!(1, NodeId(1).id());
        assert_eq!(2, NodeId(2).id());
    }
    #[test]
    fn test_link_id() {
        assert_eq!(0, LinkId(0).id());
        assert_eq!(7, LinkId(7).id());
    }
    #[test]
    fn test_vnf_id() {
        assert_eq!(0, VnfId(0).id());
        assert_eq!(3, VnfId(3).id());
    }
}
