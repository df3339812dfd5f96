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

//! This module reads and writes traffic requests. Each line is one request:
//! ingress and egress node names, the requested bandwidth (kbps), the delay
//! budget, and then the chain as a list of function type names (or
//! abbreviations, which get expanded in place). Requests are numbered in
//! file order.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::{NetworkGraph, TrafficRequest, VnfLib};

use super::{data_lines, number, Error};

// ----------------------------------------------------------------------------
// --- READER -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This function parses traffic requests off the given reader. The node
/// names must belong to the given graph and the chain names to the given
/// library.
pub fn read_requests<R: BufRead>(
    reader: R,
    graph: &NetworkGraph,
    lib: &VnfLib,
) -> Result<Vec<TrafficRequest>, Error> {
    let lines = data_lines(reader)?;
    let mut requests = Vec::with_capacity(lines.len());

    for (id, line) in lines.iter().enumerate() {
        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        if fields.len() < 4 {
            return Err(Error::Format);
        }
        let ingress = graph
            .node_id(fields[0])
            .ok_or_else(|| Error::UnknownNode(fields[0].to_string()))?;
        let egress = graph
            .node_id(fields[1])
            .ok_or_else(|| Error::UnknownNode(fields[1].to_string()))?;
        let bandwidth = number(fields[2])? / 1000.0;
        let max_delay = number(fields[3])?;

        let mut chain = vec![];
        for &token in &fields[4..] {
            // a trailing comma leaves one empty token behind
            if token.is_empty() {
                continue;
            }
            let sub = lib
                .resolve(token)
                .ok_or_else(|| Error::UnknownVnf(token.to_string()))?;
            chain.extend_from_slice(sub);
        }
        requests.push(TrafficRequest::new(
            id, ingress, egress, bandwidth, max_delay, chain, lib,
        )?);
    }
    Ok(requests)
}

/// This function reads traffic requests from the file at the given path.
pub fn load_requests<P: AsRef<Path>>(
    path: P,
    graph: &NetworkGraph,
    lib: &VnfLib,
) -> Result<Vec<TrafficRequest>, Error> {
    read_requests(BufReader::new(File::open(path)?), graph, lib)
}

// ----------------------------------------------------------------------------
// --- WRITER -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This function writes the given requests in the text format.
pub fn write_requests<W: Write>(
    requests: &[TrafficRequest],
    graph: &NetworkGraph,
    lib: &VnfLib,
    mut out: W,
) -> std::io::Result<()> {
    writeln!(
        out,
        "# Ingress-ID, Egress-ID, Min-Bandwidth, Max-Delay, VNF, VNF, VNF, ..."
    )?;
    for request in requests {
        write!(
            out,
            "{},{},{:.0},{:.0}",
            graph.node(request.ingress).name,
            graph.node(request.egress).name,
            request.bandwidth * 1000.0,
            request.max_delay
        )?;
        for vnf in request.chain.iter() {
            write!(out, ",{}", lib.vnf(*vnf).name.to_lowercase())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_requests {
    use std::io::Cursor;

    use crate::Vnf;

    use super::*;

    fn graph() -> NetworkGraph {
        let mut graph = NetworkGraph::new();
        let a = graph.add_node("a", 4.0, 8.0, 100.0).unwrap();
        let b = graph.add_node("b", 4.0, 8.0, 100.0).unwrap();
        let c = graph.add_node("c", 0.0, 0.0, 0.0).unwrap();
        graph.add_link(a, b, 100.0, 1.0).unwrap();
        graph.add_link(b, c, 100.0, 1.0).unwrap();
        graph
    }

    fn lib() -> VnfLib {
        let mut lib = VnfLib::default();
        let firewall = lib
            .add(Vnf {
                name: "Firewall".to_string(),
                cpu: 4.0,
                ram: 8.0,
                hdd: 1.0,
                delay: 45.0,
                capacity: 900.0,
                max_instances: None,
            })
            .unwrap();
        let proxy = lib
            .add(Vnf {
                name: "Proxy".to_string(),
                cpu: 2.0,
                ram: 4.0,
                hdd: 1.0,
                delay: 40.0,
                capacity: 400.0,
                max_instances: None,
            })
            .unwrap();
        lib.add_alias("web", vec![firewall, proxy]).unwrap();
        lib
    }

    #[test]
    fn it_numbers_the_requests_in_file_order() {
        let graph = graph();
        let lib = lib();
        let text = "a,b,5000,200,firewall\nb,c,1000,300,proxy\n";

        let requests = read_requests(Cursor::new(text), &graph, &lib).unwrap();
        assert_eq!(2, requests.len());
        assert_eq!(0, requests[0].id);
        assert_eq!(1, requests[1].id);
        assert_eq!(5.0, requests[0].bandwidth);
        assert_eq!(200.0, requests[0].max_delay);
    }

    #[test]
    fn an_abbreviation_expands_in_place() {
        let graph = graph();
        let lib = lib();
        let text = "a,c,1000,500,web,firewall\n";

        let requests = read_requests(Cursor::new(text), &graph, &lib).unwrap();
        let names = requests[0]
            .chain
            .iter()
            .map(|id| lib.vnf(*id).name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(vec!["Firewall", "Proxy", "Firewall"], names);
    }

    #[test]
    fn a_trailing_comma_denotes_an_empty_chain() {
        let graph = graph();
        let lib = lib();
        let text = "a,b,5000,200,\n";

        let requests = read_requests(Cursor::new(text), &graph, &lib).unwrap();
        assert!(requests[0].chain.is_empty());
    }

    #[test]
    fn an_unknown_endpoint_is_an_error() {
        let graph = graph();
        let lib = lib();
        let text = "a,z,5000,200,firewall\n";

        let error = read_requests(Cursor::new(text), &graph, &lib).unwrap_err();
        assert!(matches!(error, Error::UnknownNode(name) if name == "z"));
    }

    #[test]
    fn a_demand_beyond_the_vnf_capacity_is_an_error() {
        let graph = graph();
        let lib = lib();
        let text = "a,b,500000,200,proxy\n";

        let error = read_requests(Cursor::new(text), &graph, &lib).unwrap_err();
        assert!(matches!(error, Error::Model(_)));
    }

    #[test]
    fn the_writer_emits_one_line_per_request_plus_a_header() {
        let graph = graph();
        let lib = lib();
        let text = "a,c,1000,500,web\nb,a,2000,250,\n";
        let requests = read_requests(Cursor::new(text), &graph, &lib).unwrap();

        let mut buffer = vec![];
        write_requests(&requests, &graph, &lib, &mut buffer).unwrap();
        let written = String::from_utf8(buffer).unwrap();

        let expected = "\
            # Ingress-ID, Egress-ID, Min-Bandwidth, Max-Delay, VNF, VNF, VNF, ...\n\
            a,c,1000,500,firewall,proxy\n\
            b,a,2000,250\n";
        assert_eq!(expected, written);
    }
}
