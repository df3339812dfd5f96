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

//! This module provides the shortest-path index: for every source node of a
//! graph, a tree of best back-pointers toward that source under one of two
//! cost models. The hop index treats every link as unit cost and is computed
//! with a plain FIFO breadth-first search; the delay index uses the link
//! delays as weights and is computed with Dijkstra's algorithm. Both flavors
//! produce the same [`PathAttribute`] rows, so the consumers do not care
//! which cost model built the table they walk.

use std::cmp::Ordering;
use std::collections::VecDeque;

use binary_heap_plus::BinaryHeap;
use compare::Compare;

use crate::{LinkId, NetworkGraph, NodeId};

// ----------------------------------------------------------------------------
// --- PATH ATTRIBUTE ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// What the index knows about one (source, destination) pair: how many hops
/// and how much cumulated delay separate the two, and by which link the
/// destination was best reached. The back link is `None` at the source
/// itself; following it from any destination walks the path back to the
/// source.
#[derive(Debug, Clone, PartialEq)]
pub struct PathAttribute {
    /// The number of links on the path from the source to this node.
    pub hops: usize,
    /// The cumulated delay along that same path.
    pub delay: f64,
    /// The last link of the path, `None` at the source.
    pub pred: Option<LinkId>,
    /// Visitation marker: set once the node left the priority queue with its
    /// final estimate. Only meaningful while Dijkstra's relaxation runs.
    settled: bool,
}

// ----------------------------------------------------------------------------
// --- PATH INDEX -------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The all-sources shortest-path table of a graph: one row per source node,
/// one [`PathAttribute`] slot per destination (`None` when the destination
/// is not reachable from that source). A `PathIndex` is built once against a
/// frozen graph and is read-only afterwards; the graph memoizes it and hands
/// it out behind an `Arc` (see [`NetworkGraph::hop_index`] and
/// [`NetworkGraph::delay_index`]).
#[derive(Debug, Clone)]
pub struct PathIndex {
    table: Vec<Vec<Option<PathAttribute>>>,
}

impl PathIndex {
    /// This computes the hop-shortest index of the given graph: a breadth
    /// first search from every source, every link counting for one. The FIFO
    /// queue makes the tie-break deterministic: among equally short paths,
    /// the recorded back link is the one by which the node was reached first,
    /// and neighbors are explored in adjacency insertion order.
    pub fn by_hops(graph: &NetworkGraph) -> Self {
        Self { table: graph.node_ids().map(|src| Self::bfs(graph, src)).collect() }
    }

    /// This computes the delay-shortest index of the given graph: Dijkstra's
    /// algorithm from every source with the link delays as weights.
    pub fn by_delay(graph: &NetworkGraph) -> Self {
        Self { table: graph.node_ids().map(|src| Self::dijkstra(graph, src)).collect() }
    }

    fn bfs(graph: &NetworkGraph, source: NodeId) -> Vec<Option<PathAttribute>> {
        let mut row: Vec<Option<PathAttribute>> = vec![None; graph.num_nodes()];
        row[source.id()] =
            Some(PathAttribute { hops: 0, delay: 0.0, pred: None, settled: true });

        let mut queue = VecDeque::new();
        queue.push_back((source, 0_usize, 0.0_f64));
        while let Some((node, hops, delay)) = queue.pop_front() {
            for link_id in graph.adjacent_links(node).iter().copied() {
                let link = graph.link(link_id);
                let next = link.other_end(node);
                // first reached wins: a node already in the row keeps its
                // original back link even if another path of the same length
                // shows up later
                if row[next.id()].is_none() {
                    row[next.id()] = Some(PathAttribute {
                        hops: hops + 1,
                        delay: delay + link.delay,
                        pred: Some(link_id),
                        settled: true,
                    });
                    queue.push_back((next, hops + 1, delay + link.delay));
                }
            }
        }
        row
    }

    fn dijkstra(graph: &NetworkGraph, source: NodeId) -> Vec<Option<PathAttribute>> {
        let mut row: Vec<Option<PathAttribute>> = vec![None; graph.num_nodes()];
        row[source.id()] =
            Some(PathAttribute { hops: 0, delay: 0.0, pred: None, settled: false });

        let start = PendingVisit { node: source, delay: 0.0 };
        let mut heap = BinaryHeap::from_vec_cmp(vec![start], MinDelay);
        while let Some(visit) = heap.pop() {
            // lazy deletion: relaxing pushes fresh entries instead of
            // decreasing keys, so a node may sit in the heap several times
            // and every pop after the first is stale
            let (hops, delay) = match row[visit.node.id()].as_mut() {
                Some(attr) if attr.settled => continue,
                Some(attr) => {
                    attr.settled = true;
                    (attr.hops, attr.delay)
                }
                None => continue,
            };
            for link_id in graph.adjacent_links(visit.node).iter().copied() {
                let link = graph.link(link_id);
                let next = link.other_end(visit.node);
                let candidate = delay + link.delay;
                let relax = match row[next.id()].as_ref() {
                    None => true,
                    Some(attr) => !attr.settled && candidate < attr.delay,
                };
                if relax {
                    row[next.id()] = Some(PathAttribute {
                        hops: hops + 1,
                        delay: candidate,
                        pred: Some(link_id),
                        settled: false,
                    });
                    heap.push(PendingVisit { node: next, delay: candidate });
                }
            }
        }
        row
    }

    /// The row of this index for the given source: one slot per destination
    /// id, `None` where the destination is unreachable from the source.
    #[inline]
    pub fn from_source(&self, source: NodeId) -> &[Option<PathAttribute>] {
        &self.table[source.id()]
    }

    /// What the index knows about the given pair, or `None` when the
    /// destination is not reachable from the source.
    #[inline]
    pub fn get(&self, source: NodeId, dest: NodeId) -> Option<&PathAttribute> {
        self.table[source.id()][dest.id()].as_ref()
    }

    /// What the index knows about the given pair.
    ///
    /// # Panics
    /// The graph is assumed connected for every pair this is called on;
    /// querying an unreachable destination is a fatal programming error, not
    /// a recoverable one.
    #[inline]
    pub fn attr(&self, source: NodeId, dest: NodeId) -> &PathAttribute {
        self.table[source.id()][dest.id()].as_ref().unwrap_or_else(|| {
            panic!("no path from node {} to node {}", source.id(), dest.id())
        })
    }

    /// An iterator over the links of the recorded path between `source` and
    /// `dest`, yielded from the destination back to the source.
    ///
    /// # Panics
    /// Same contract as [`Self::attr`]: the pair must be connected.
    pub fn walk<'a>(
        &'a self,
        graph: &'a NetworkGraph,
        source: NodeId,
        dest: NodeId,
    ) -> PathWalk<'a> {
        PathWalk { graph, row: self.from_source(source), source, current: dest }
    }
}

/// The iterator returned by [`PathIndex::walk`]: follows the back links of
/// one row from a destination to the source it was computed for.
pub struct PathWalk<'a> {
    graph: &'a NetworkGraph,
    row: &'a [Option<PathAttribute>],
    source: NodeId,
    current: NodeId,
}
impl Iterator for PathWalk<'_> {
    type Item = LinkId;

    fn next(&mut self) -> Option<LinkId> {
        if self.current == self.source {
            return None;
        }
        let attr = self.row[self.current.id()].as_ref().unwrap_or_else(|| {
            panic!(
                "no path between node {} and node {}",
                self.source.id(),
                self.current.id()
            )
        });
        let link = attr.pred?;
        self.current = self.graph.link(link).other_end(self.current);
        Some(link)
    }
}

// ----------------------------------------------------------------------------
// --- MIN DELAY ORDER --------------------------------------------------------
// ----------------------------------------------------------------------------
/// One tentative distance waiting in the Dijkstra priority queue.
#[derive(Debug, Clone, Copy)]
struct PendingVisit {
    node: NodeId,
    delay: f64,
}

/// Compares two pending visits so that the one with the *smallest* tentative
/// delay is considered the greatest. The binary heap is a max-heap, hence the
/// inverted comparison.
#[derive(Debug, Clone, Copy)]
struct MinDelay;
impl Compare<PendingVisit> for MinDelay {
    fn compare(&self, l: &PendingVisit, r: &PendingVisit) -> Ordering {
        r.delay.total_cmp(&l.delay)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_paths {
    use crate::*;

    /// a -- b
    /// |    |
    /// d -- c     all links bandwidth 100, delay 1
    fn square() -> (NetworkGraph, [NodeId; 4]) {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        let c = graph.add_node("c", 1.0, 1.0, 1.0).unwrap();
        let d = graph.add_node("d", 1.0, 1.0, 1.0).unwrap();
        graph.add_link(a, b, 100.0, 1.0).unwrap();
        graph.add_link(b, c, 100.0, 1.0).unwrap();
        graph.add_link(c, d, 100.0, 1.0).unwrap();
        graph.add_link(d, a, 100.0, 1.0).unwrap();
        (graph, [a, b, c, d])
    }

    #[test]
    fn on_the_unit_square_the_diagonal_is_two_hops_and_two_delay() {
        let (graph, [a, _, c, _]) = square();

        let delay = graph.delay_index();
        assert_eq!(2, delay.attr(a, c).hops);
        assert_eq!(2.0, delay.attr(a, c).delay);

        let hops = graph.hop_index();
        assert_eq!(2, hops.attr(a, c).hops);
        assert_eq!(2.0, hops.attr(a, c).delay);
    }

    #[test]
    fn the_source_has_no_back_link_and_zero_cost() {
        let (graph, [a, ..]) = square();
        let index = graph.hop_index();
        let attr = index.attr(a, a);
        assert_eq!(0, attr.hops);
        assert_eq!(0.0, attr.delay);
        assert_eq!(None, attr.pred);
    }

    #[test]
    fn ties_are_broken_by_first_reached_in_adjacency_order() {
        // on the square, c is reachable from a in two hops both through b
        // and through d; a-b was inserted before a-d so the bfs must have
        // gone through b
        let (graph, [a, b, c, _]) = square();
        let index = graph.hop_index();
        let pred = index.attr(a, c).pred.unwrap();
        assert_eq!(b, graph.link(pred).other_end(c));
    }

    #[test]
    fn hop_and_delay_indices_disagree_when_the_short_route_is_slow() {
        // direct link a-b is one hop but delay 10; the detour through c
        // is two hops but delay 2
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        let c = graph.add_node("c", 1.0, 1.0, 1.0).unwrap();
        graph.add_link(a, b, 100.0, 10.0).unwrap();
        graph.add_link(a, c, 100.0, 1.0).unwrap();
        graph.add_link(c, b, 100.0, 1.0).unwrap();

        let hops = graph.hop_index();
        assert_eq!(1, hops.attr(a, b).hops);
        assert_eq!(10.0, hops.attr(a, b).delay);

        let delay = graph.delay_index();
        assert_eq!(2, delay.attr(a, b).hops);
        assert_eq!(2.0, delay.attr(a, b).delay);
    }

    #[test]
    fn dijkstra_relaxes_a_node_again_while_it_is_not_settled() {
        // b is first seen through the expensive direct link, then improved
        // through d before it settles
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        let d = graph.add_node("d", 1.0, 1.0, 1.0).unwrap();
        graph.add_link(a, b, 100.0, 10.0).unwrap();
        graph.add_link(a, d, 100.0, 2.0).unwrap();
        graph.add_link(d, b, 100.0, 3.0).unwrap();

        let index = graph.delay_index();
        let attr = index.attr(a, b);
        assert_eq!(5.0, attr.delay);
        assert_eq!(2, attr.hops);
        assert_eq!(d, graph.link(attr.pred.unwrap()).other_end(b));
    }

    #[test]
    fn walking_a_path_yields_its_links_from_destination_to_source() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        let c = graph.add_node("c", 1.0, 1.0, 1.0).unwrap();
        let ab = graph.add_link(a, b, 100.0, 1.0).unwrap();
        let bc = graph.add_link(b, c, 100.0, 1.0).unwrap();

        let index = graph.hop_index();
        let links: Vec<LinkId> = index.walk(&graph, a, c).collect();
        assert_eq!(vec![bc, ab], links);
    }

    #[test]
    fn walking_from_the_source_to_itself_is_empty() {
        let (graph, [a, ..]) = square();
        let index = graph.hop_index();
        assert_eq!(0, index.walk(&graph, a, a).count());
    }

    #[test]
    fn an_unreachable_destination_has_no_attribute() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        let index = graph.hop_index();
        assert!(index.get(a, b).is_none());
        assert!(index.get(b, a).is_none());
    }

    #[test]
    #[should_panic(expected = "no path")]
    fn querying_an_unreachable_destination_is_fatal() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        graph.hop_index().attr(a, b);
    }

    #[test]
    fn directed_links_are_never_crossed_backwards() {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 1.0, 1.0, 1.0).unwrap();
        let b = graph.add_node("b", 1.0, 1.0, 1.0).unwrap();
        graph.add_link_directed(a, b, 100.0, 1.0).unwrap();

        let index = graph.hop_index();
        assert_eq!(1, index.attr(a, b).hops);
        assert!(index.get(b, a).is_none());

        let delay = graph.delay_index();
        assert_eq!(1.0, delay.attr(a, b).delay);
        assert!(delay.get(b, a).is_none());
    }
}
