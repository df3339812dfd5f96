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

//! This module (and its submodules) define the text formats problem
//! instances are exchanged in: one file for the topology, one for the
//! function library, and one for the requests. All three are line oriented;
//! blank lines and lines starting with `#` are ignored, and all bandwidth
//! like quantities are stored scaled by 1000 (kbps) in the files. On top of
//! the three readers and writers, the topology can also be rendered as a
//! Graphviz document for quick visual inspection.

use std::io::BufRead;
use std::path::Path;

use crate::ProblemInstance;

mod topology;
mod vnf_lib;
mod requests;

pub use topology::*;
pub use vnf_lib::*;
pub use requests::*;

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This enumeration groups the kinds of errors that might occur when parsing
/// an instance from file. There can be io errors (file unavailable ?),
/// reference errors (a line naming a node or function that was never
/// declared), model errors (the data describes something the model rejects,
/// like a duplicate node), or plain format errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// There was an io related error.
    #[error("io error {0}")]
    Io(#[from] std::io::Error),
    /// The parser expected a number but got something else.
    #[error("bad number {0:?}")]
    BadNumber(String),
    /// A line refers to a node that was never declared.
    #[error("unknown node {0:?}")]
    UnknownNode(String),
    /// A line refers to a function type that was never declared.
    #[error("unknown vnf {0:?}")]
    UnknownVnf(String),
    /// The data violates one of the model invariants.
    #[error("{0}")]
    Model(#[from] crate::ModelError),
    /// The file was not properly formatted.
    #[error("ill formed instance")]
    Format,
}

// ----------------------------------------------------------------------------
// --- WHOLE INSTANCES --------------------------------------------------------
// ----------------------------------------------------------------------------

/// This function reads the three files making up one problem instance.
pub fn load_instance(
    topology: impl AsRef<Path>,
    vnf_lib: impl AsRef<Path>,
    requests: impl AsRef<Path>,
) -> Result<ProblemInstance, Error> {
    let graph = load_topology(topology)?;
    let lib = load_vnf_lib(vnf_lib)?;
    let requests = load_requests(requests, &graph, &lib)?;
    Ok(ProblemInstance::new(graph, lib, requests))
}

// ----------------------------------------------------------------------------
// --- SHARED HELPERS ---------------------------------------------------------
// ----------------------------------------------------------------------------

/// This reads the whole input, dropping comment and blank lines and
/// trimming the rest.
fn data_lines<R: BufRead>(reader: R) -> Result<Vec<String>, Error> {
    let mut lines = vec![];
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        lines.push(line.to_string());
    }
    Ok(lines)
}

/// This parses one floating point token.
fn number(token: &str) -> Result<f64, Error> {
    token
        .parse()
        .map_err(|_| Error::BadNumber(token.to_string()))
}

/// This parses one non negative integer token.
fn count(token: &str) -> Result<usize, Error> {
    token
        .parse()
        .map_err(|_| Error::BadNumber(token.to_string()))
}
