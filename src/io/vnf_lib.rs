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

//! This module reads and writes function libraries. The format is split in
//! three sections: `[vnfs]` declares the function types themselves (one per
//! line, comma separated, capacity in kbps, a negative instance count
//! meaning unbounded), `[abbrev]` declares named sub-chains that requests
//! may use as shorthands, and `[pairs]` declares latency bounds between two
//! function types.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::{Vnf, VnfId, VnfLib};

use super::{data_lines, number, Error};

// ----------------------------------------------------------------------------
// --- READER -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// The section of the library file currently being parsed.
enum Section {
    Preamble,
    Vnfs,
    Abbrev,
    Pairs,
}

/// This function parses a function library off the given reader.
pub fn read_vnf_lib<R: BufRead>(reader: R) -> Result<VnfLib, Error> {
    let lines = data_lines(reader)?;
    let mut lib = VnfLib::default();
    let mut section = Section::Preamble;

    for line in lines.iter() {
        match line.as_str() {
            "[vnfs]" => {
                section = Section::Vnfs;
                continue;
            }
            "[abbrev]" => {
                section = Section::Abbrev;
                continue;
            }
            "[pairs]" => {
                section = Section::Pairs;
                continue;
            }
            _ => {}
        }
        let fields = line.split(',').map(str::trim).collect::<Vec<_>>();
        match section {
            Section::Preamble => return Err(Error::Format),
            Section::Vnfs => {
                if fields.len() != 7 {
                    return Err(Error::Format);
                }
                let max_instances = match fields[6].parse::<i64>() {
                    Ok(max) if max < 0 => None,
                    Ok(max) => Some(max as usize),
                    Err(_) => return Err(Error::BadNumber(fields[6].to_string())),
                };
                lib.add(Vnf {
                    name: fields[0].to_string(),
                    cpu: number(fields[1])?,
                    ram: number(fields[2])?,
                    hdd: number(fields[3])?,
                    delay: number(fields[4])?,
                    capacity: number(fields[5])? / 1000.0,
                    max_instances,
                })?;
            }
            Section::Abbrev => {
                if fields.len() < 2 {
                    return Err(Error::Format);
                }
                let mut chain = vec![];
                for &token in &fields[1..] {
                    let sub = lib
                        .resolve(token)
                        .ok_or_else(|| Error::UnknownVnf(token.to_string()))?;
                    chain.extend_from_slice(sub);
                }
                lib.add_alias(fields[0], chain)?;
            }
            Section::Pairs => {
                if fields.len() != 3 {
                    return Err(Error::Format);
                }
                let a = single(&lib, fields[0])?;
                let b = single(&lib, fields[1])?;
                lib.add_pair(a, b, number(fields[2])?)?;
            }
        }
    }
    Ok(lib)
}

/// This function reads a function library from the file at the given path.
pub fn load_vnf_lib<P: AsRef<Path>>(path: P) -> Result<VnfLib, Error> {
    read_vnf_lib(BufReader::new(File::open(path)?))
}

/// This resolves a name that must denote exactly one function type.
fn single(lib: &VnfLib, name: &str) -> Result<VnfId, Error> {
    match lib.resolve(name) {
        Some([id]) => Ok(*id),
        Some(_) => Err(Error::Format),
        None => Err(Error::UnknownVnf(name.to_string())),
    }
}

// ----------------------------------------------------------------------------
// --- WRITER -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This function writes the given library in the three section text format.
pub fn write_vnf_lib<W: Write>(lib: &VnfLib, mut out: W) -> std::io::Result<()> {
    writeln!(out, "[vnfs]")?;
    writeln!(out, "# VNF Name, Cores, RAM, HDD, Delay, Capacity, Max Instances")?;
    for vnf in lib.vnfs() {
        let max_instances = vnf.max_instances.map_or(-1, |max| max as i64);
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            vnf.name,
            vnf.cpu,
            vnf.ram,
            vnf.hdd,
            vnf.delay,
            vnf.capacity * 1000.0,
            max_instances
        )?;
    }
    writeln!(out)?;
    writeln!(out, "[abbrev]")?;
    writeln!(out, "# Define abbreviations: use predefined sub-chains in requests")?;
    writeln!(out, "# VNF-Alias, VNF1, VNF2, VNF3, ...")?;
    for (alias, chain) in lib.aliases() {
        let names = chain
            .iter()
            .map(|id| lib.vnf(*id).name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        writeln!(out, "{alias},{names}")?;
    }
    writeln!(out)?;
    writeln!(out, "[pairs]")?;
    writeln!(out, "# Define VNF pairs that should be closely connected:")?;
    writeln!(out, "# VNF1, VNF2, Max Latency between them (\u{3bc}s)")?;
    for (a, b, latency) in lib.pairs() {
        writeln!(out, "{},{},{}", lib.vnf(a).name, lib.vnf(b).name, latency)?;
    }
    Ok(())
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
