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

//! This module reads and writes network topologies. The format starts with
//! one line giving the number of nodes and links, then one line per node
//! (`name cores ram hdd`) and one line per link (`a b bandwidth delay`,
//! bandwidth in kbps). The module also knows how to render a topology as a
//! Graphviz document.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::NetworkGraph;

use super::{count, data_lines, number, Error};

// ----------------------------------------------------------------------------
// --- READER -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This function parses a network topology off the given reader.
pub fn read_topology<R: BufRead>(reader: R) -> Result<NetworkGraph, Error> {
    let lines = data_lines(reader)?;
    let mut cursor = lines.iter();

    let sizes = cursor.next().ok_or(Error::Format)?;
    let mut tokens = sizes.split_whitespace();
    let num_nodes = count(tokens.next().ok_or(Error::Format)?)?;
    let num_links = count(tokens.next().ok_or(Error::Format)?)?;

    let mut graph = NetworkGraph::new();
    for _ in 0..num_nodes {
        let line = cursor.next().ok_or(Error::Format)?;
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.len() != 4 {
            return Err(Error::Format);
        }
        graph.add_node(
            fields[0],
            number(fields[1])?,
            number(fields[2])?,
            number(fields[3])?,
        )?;
    }
    for _ in 0..num_links {
        let line = cursor.next().ok_or(Error::Format)?;
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.len() != 4 {
            return Err(Error::Format);
        }
        let a = graph
            .node_id(fields[0])
            .ok_or_else(|| Error::UnknownNode(fields[0].to_string()))?;
        let b = graph
            .node_id(fields[1])
            .ok_or_else(|| Error::UnknownNode(fields[1].to_string()))?;
        graph.add_link(a, b, number(fields[2])? / 1000.0, number(fields[3])?)?;
    }
    Ok(graph)
}

/// This function reads a network topology from the file at the given path.
pub fn load_topology<P: AsRef<Path>>(path: P) -> Result<NetworkGraph, Error> {
    read_topology(BufReader::new(File::open(path)?))
}

// ----------------------------------------------------------------------------
// --- WRITERS ----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This function writes the given graph in the topology text format.
pub fn write_topology<W: Write>(graph: &NetworkGraph, mut out: W) -> std::io::Result<()> {
    writeln!(out, "# Number of nodes, Number of links")?;
    writeln!(out, "{} {}", graph.num_nodes(), graph.num_links())?;
    writeln!(out)?;
    writeln!(out, "# Node-ID Cores RAM HDD")?;
    for node in graph.nodes() {
        writeln!(out, "{} {} {} {}", node.name, node.cpu, node.ram, node.hdd)?;
    }
    writeln!(out)?;
    writeln!(out, "# Node-ID Node-ID Bandwidth Delay")?;
    for id in graph.link_ids() {
        let (a, b) = graph.link_names(id);
        let link = graph.link(id);
        writeln!(out, "{} {} {} {}", a, b, link.bandwidth * 1000.0, link.delay)?;
    }
    Ok(())
}

/// This function renders the given graph as a Graphviz document. Compute
/// nodes are drawn in a darker shade than the plain forwarding nodes, and
/// every edge carries its (rounded) delay as a label.
pub fn write_dot<W: Write>(graph: &NetworkGraph, mut out: W) -> std::io::Result<()> {
    writeln!(out, "graph network {{")?;
    writeln!(out, "  node [")?;
    writeln!(out, "    shape = \"circle\",")?;
    writeln!(out, "    style = \"filled\",")?;
    writeln!(out, "    fontsize = 12,")?;
    writeln!(out, "    fixedsize = true")?;
    writeln!(out, "  ];")?;
    writeln!(out)?;
    writeln!(out, "  edge [")?;
    writeln!(out, "    color = \"#bbbbbb\"")?;
    writeln!(out, "  ];")?;
    writeln!(out)?;
    writeln!(out, "  // nodes with cpu")?;
    writeln!(out, "  node [")?;
    writeln!(out, "    color = \"#007399\",")?;
    writeln!(out, "    fillcolor = \"#007399\",")?;
    writeln!(out, "    fontcolor = white")?;
    writeln!(out, "  ];")?;
    for node in graph.nodes().filter(|n| n.cpu > 0.0) {
        writeln!(out, "  {};", node.name)?;
    }
    writeln!(out)?;
    writeln!(out, "  // nodes without cpu")?;
    writeln!(out, "  node [")?;
    writeln!(out, "    color = \"#4dd2ff\",")?;
    writeln!(out, "    fillcolor = \"#4dd2ff\",")?;
    writeln!(out, "    fontcolor = black")?;
    writeln!(out, "  ];")?;
    for node in graph.nodes().filter(|n| n.cpu <= 0.0) {
        writeln!(out, "  {};", node.name)?;
    }
    writeln!(out)?;
    writeln!(out, "  // edges")?;
    for id in graph.link_ids() {
        let (a, b) = graph.link_names(id);
        let delay = graph.link(id).delay.round() as i64;
        writeln!(out, "  {a} -- {b} [ label = \"{delay}\" ];")?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
