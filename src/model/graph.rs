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

//! This module provides the capacitated network graph. The graph owns dense
//! arenas of nodes and links; every other structure of the crate refers to
//! them through [`NodeId`] and [`LinkId`] indices. The graph also owns the
//! two memoized shortest-path indices ([`PathIndex`]) and drops them whenever
//! a mutation makes them stale.

use std::sync::Arc;

use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;

use crate::{LinkId, ModelError, NodeId, PathIndex};

// ----------------------------------------------------------------------------
// --- NODE -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One vertex of the network: a named location offering CPU, RAM and storage
/// capacities to the function instances placed on it. A node with zero CPU
/// capacity (say, an ingress or egress point) can route traffic but cannot
/// host any function.
///
/// Nodes compare, order and hash by name alone; their identity within a graph
/// is their [`NodeId`].
#[derive(Debug, Clone)]
pub struct Node {
    /// The unique name of the node.
    pub name: String,
    /// The CPU capacity the node offers.
    pub cpu: f64,
    /// The RAM capacity the node offers.
    pub ram: f64,
    /// The storage capacity the node offers.
    pub hdd: f64,
}
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Node {}
impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}
impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

// ----------------------------------------------------------------------------
// --- LINK -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One edge of the network, with a bandwidth capacity and a traversal delay.
/// Whether the link is directed or not is decided at insertion time: an
/// undirected link appears in the adjacency of both endpoints, a directed one
/// only in the adjacency of its tail.
#[derive(Debug, Clone)]
pub struct Link {
    /// The two endpoints; for a directed link, the tail comes first.
    pub endpoints: [NodeId; 2],
    /// The bandwidth capacity of the link.
    pub bandwidth: f64,
    /// The delay incurred by traversing the link.
    pub delay: f64,
}
impl Link {
    /// This method returns the endpoint of the link which is not the given
    /// node.
    #[inline]
    pub fn other_end(&self, node: NodeId) -> NodeId {
        if self.endpoints[0] == node {
            self.endpoints[1]
        } else {
            self.endpoints[0]
        }
    }
}

// ----------------------------------------------------------------------------
// --- NETWORK GRAPH ----------------------------------------------------------
// ----------------------------------------------------------------------------
/// The capacitated network topology on which functions are placed and traffic
/// is routed. Nodes and links live in dense arenas owned by the graph; node
/// names are unique and resolvable back to their id.
///
/// The graph memoizes, for every source at once, the hop-shortest (BFS) and
/// the delay-shortest (Dijkstra) back-pointer tables. Any mutation of the
/// graph invalidates both tables; they are rebuilt lazily on the next access.
///
/// # Example
/// ```
/// # use vnfcp::NetworkGraph;
/// let mut graph = NetworkGraph::new();
/// let a = graph.add_node("a", 4.0, 4.0, 4.0)?;
/// let b = graph.add_node("b", 0.0, 0.0, 0.0)?;
/// let ab = graph.add_link(a, b, 100.0, 1.0)?;
///
/// assert_eq!(2, graph.num_nodes());
/// assert_eq!(1, graph.num_links());
/// assert_eq!(b, graph.link(ab).other_end(a));
/// assert_eq!(Some(a), graph.node_id("a"));
/// # Ok::<(), vnfcp::ModelError>(())
/// ```
#[derive(Debug, Default)]
pub struct NetworkGraph {
    /// The node arena; a `NodeId` is an index in this vector.
    nodes: Vec<Node>,
    /// The link arena; a `LinkId` is an index in this vector.
    links: Vec<Link>,
    /// Per node, the links reachable from it, in insertion order. The BFS
    /// tie-break ("first reached wins") depends on this order being stable.
    adjacency: Vec<Vec<LinkId>>,
    /// Maps a node name back to its id.
    by_name: FxHashMap<String, NodeId>,
    /// The set of linked endpoint pairs, normalized smallest id first. This
    /// is what rejects a second link between the same two nodes.
    linked: FxHashSet<(NodeId, NodeId)>,
    /// Memoized hop-shortest index, dropped on mutation.
    hop_index: RwLock<Option<Arc<PathIndex>>>,
    /// Memoized delay-shortest index, dropped on mutation.
    delay_index: RwLock<Option<Arc<PathIndex>>>,
}

impl Clone for NetworkGraph {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
            adjacency: self.adjacency.clone(),
            by_name: self.by_name.clone(),
            linked: self.linked.clone(),
            // the memoized tables describe the same topology, share them
            hop_index: RwLock::new(self.hop_index.read().clone()),
            delay_index: RwLock::new(self.delay_index.read().clone()),
        }
    }
}

impl NetworkGraph {
    /// This creates an empty graph.
    pub fn new() -> Self {
        Default::default()
    }

    /// This method adds a new node with the given name and capacities to the
    /// graph and returns its id. It fails if a node with the same name exists
    /// already.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        cpu: f64,
        ram: f64,
        hdd: f64,
    ) -> Result<NodeId, ModelError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ModelError::DuplicateNode(name));
        }
        let id = NodeId(self.nodes.len());
        self.by_name.insert(name.clone(), id);
        self.nodes.push(Node { name, cpu, ram, hdd });
        self.adjacency.push(vec![]);
        self.invalidate_indices();
        Ok(id)
    }

    /// This method adds an undirected link between nodes `a` and `b` and
    /// returns its id. It fails if both endpoints are the same node or if the
    /// two nodes are already linked (in either direction).
    pub fn add_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth: f64,
        delay: f64,
    ) -> Result<LinkId, ModelError> {
        let id = self.push_link(a, b, bandwidth, delay)?;
        self.adjacency[a.id()].push(id);
        self.adjacency[b.id()].push(id);
        self.invalidate_indices();
        Ok(id)
    }

    /// This method adds a directed link from node `a` to node `b` and returns
    /// its id. The link only appears in the adjacency of `a`, so no traversal
    /// will ever cross it backwards. It fails under the same conditions as
    /// [`Self::add_link`]: the two nodes must be distinct and not linked yet
    /// in either direction.
    pub fn add_link_directed(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth: f64,
        delay: f64,
    ) -> Result<LinkId, ModelError> {
        let id = self.push_link(a, b, bandwidth, delay)?;
        self.adjacency[a.id()].push(id);
        self.invalidate_indices();
        Ok(id)
    }

    /// Validates the endpoints and appends the link to the arena. The caller
    /// decides which adjacency lists the new link joins.
    fn push_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth: f64,
        delay: f64,
    ) -> Result<LinkId, ModelError> {
        if a == b {
            return Err(ModelError::SelfLink(self.nodes[a.id()].name.clone()));
        }
        let pair = (a.min(b), a.max(b));
        if self.linked.contains(&pair) {
            return Err(ModelError::DuplicateLink(
                self.nodes[a.id()].name.clone(),
                self.nodes[b.id()].name.clone(),
            ));
        }
        let id = LinkId(self.links.len());
        self.linked.insert(pair);
        self.links.push(Link { endpoints: [a, b], bandwidth, delay });
        Ok(id)
    }

    /// Drops both memoized path indices; they no longer describe the graph.
    fn invalidate_indices(&mut self) {
        *self.hop_index.write() = None;
        *self.delay_index.write() = None;
    }

    /// This method returns the node with the given id.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.id()]
    }
    /// This method returns the link with the given id.
    #[inline]
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.id()]
    }
    /// This method resolves a node name back to the id of that node, if a
    /// node with that name exists.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }
    /// The number of nodes in the graph.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
    /// The number of links in the graph.
    #[inline]
    pub fn num_links(&self) -> usize {
        self.links.len()
    }
    /// An iterator over the ids of all nodes, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }
    /// An iterator over all nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }
    /// An iterator over the ids of all links, in insertion order.
    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> {
        (0..self.links.len()).map(LinkId)
    }
    /// An iterator over all links, in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }
    /// The links leaving the given node, in insertion order.
    #[inline]
    pub fn adjacent_links(&self, node: NodeId) -> &[LinkId] {
        &self.adjacency[node.id()]
    }
    /// This method tells the two endpoint names of a link, in arena order.
    pub fn link_names(&self, id: LinkId) -> (&str, &str) {
        let link = self.link(id);
        (
            self.node(link.endpoints[0]).name.as_str(),
            self.node(link.endpoints[1]).name.as_str(),
        )
    }

    /// This method returns the hop-shortest (BFS) index of the graph,
    /// computing it for all sources at once if no current version is
    /// memoized. The returned table is immutable and may be shared across
    /// solver instances for as long as the graph is not mutated.
    pub fn hop_index(&self) -> Arc<PathIndex> {
        {
            let cached = self.hop_index.read();
            if let Some(index) = cached.as_ref() {
                return Arc::clone(index);
            }
        }
        let index = Arc::new(PathIndex::by_hops(self));
        *self.hop_index.write() = Some(Arc::clone(&index));
        index
    }

    /// This method returns the delay-shortest (Dijkstra) index of the graph,
    /// computing it for all sources at once if no current version is
    /// memoized. The returned table is immutable and may be shared across
    /// solver instances for as long as the graph is not mutated.
    pub fn delay_index(&self) -> Arc<PathIndex> {
        {
            let cached = self.delay_index.read();
            if let Some(index) = cached.as_ref() {
                return Arc::clone(index);
            }
        }
        let index = Arc::new(PathIndex::by_delay(self));
        *self.delay_index.write() = Some(Arc::clone(&index));
        index
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
