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

//! This is the main entry point of the program. This is what gets compiled
//! to the vnfcp binary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use vnfcp::io::{load_instance, write_dot, write_requests, write_topology, write_vnf_lib};
use vnfcp::{BruteForceSolver, GridGenerator, Solution};

/// vnfcp places chains of virtual network functions on a capacitated
/// network, enumerating the exact Pareto frontier between the total cpu
/// spent on function instances and the total number of link hops. It can
/// also generate grid shaped benchmark instances whose frontier is known
/// in closed form.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Repeat to raise the log level (-v for debug, -vv for trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a grid benchmark instance along with its exact frontier.
    ///
    /// This writes the files `topology`, `vnfLib` and `requests` into the
    /// output directory, plus the closed form Pareto frontier as `optimal`
    /// (unless disabled) and optionally a Graphviz rendering of the
    /// topology.
    Generate(GenerateArgs),
    /// Solve an instance exhaustively and print its Pareto frontier.
    ///
    /// The frontier is printed as CSV: the two objectives first, then one
    /// field per request giving the nodes hosting its chain (in chain
    /// order, joined by `>`).
    Solve(SolveArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// The directory the instance files get written into.
    #[arg(short, long)]
    out: PathBuf,
    /// The seed of the pseudo random generator (drawn at random if absent).
    #[arg(short, long)]
    seed: Option<u64>,
    /// The smallest number of source/destination pairs.
    #[arg(long, default_value_t = 4)]
    min_m: usize,
    /// The largest number of source/destination pairs.
    #[arg(long, default_value_t = 4)]
    max_m: usize,
    /// The smallest number of rails.
    #[arg(long, default_value_t = 4)]
    min_k: usize,
    /// The largest number of rails.
    #[arg(long, default_value_t = 4)]
    max_k: usize,
    /// The smallest number of stages.
    #[arg(long, default_value_t = 3)]
    min_n: usize,
    /// The largest number of stages.
    #[arg(long, default_value_t = 3)]
    max_n: usize,
    /// The fraction of the m^2 endpoint pairs that issues a request.
    #[arg(long, default_value_t = 0.8)]
    rho: f64,
    /// How many function types each compute node hosts.
    #[arg(long, default_value_t = 1)]
    vnfs_per_node: usize,
    /// Also render the topology as a Graphviz file.
    #[arg(long)]
    dot: bool,
    /// Skip the closed form reference frontier file.
    #[arg(long)]
    no_optimal: bool,
}

#[derive(clap::Args, Debug)]
struct SolveArgs {
    /// The path to the topology file.
    topology: PathBuf,
    /// The path to the function library file.
    vnf_lib: PathBuf,
    /// The path to the requests file.
    requests: PathBuf,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    let outcome = match args.command {
        Command::Generate(args) => generate(args),
        Command::Solve(args) => solve(args),
    };
    if let Err(error) = outcome {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn generate(args: GenerateArgs) -> Result<(), vnfcp::io::Error> {
    let generator = GridGenerator::custom(
        (args.min_m, args.max_m),
        (args.min_k, args.max_k),
        (args.min_n, args.max_n),
        args.rho,
        args.vnfs_per_node,
    )?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let grid = generator.generate(&mut rng)?;
    let instance = &grid.instance;

    std::fs::create_dir_all(&args.out)?;
    write_topology(
        &instance.graph,
        BufWriter::new(File::create(args.out.join("topology"))?),
    )?;
    write_vnf_lib(
        &instance.vnf_lib,
        BufWriter::new(File::create(args.out.join("vnfLib"))?),
    )?;
    write_requests(
        &instance.requests,
        &instance.graph,
        &instance.vnf_lib,
        BufWriter::new(File::create(args.out.join("requests"))?),
    )?;
    if args.dot {
        write_dot(
            &instance.graph,
            BufWriter::new(File::create(args.out.join("topology.dot"))?),
        )?;
    }

    println!(
        "Generated {} requests on {} nodes. [seed={}, k={}, m={}, n={}, rho={:.2}]",
        instance.requests.len(),
        instance.graph.num_nodes(),
        seed,
        grid.k,
        grid.m,
        grid.n,
        args.rho
    );

    if !args.no_optimal {
        let frontier = grid.reference_frontier();
        let mut optimal = BufWriter::new(File::create(args.out.join("optimal"))?);
        writeln!(
            optimal,
            "# {} requests on {} nodes. [seed={}, k={}, m={}, n={}, rho={:.2}]",
            instance.requests.len(),
            instance.graph.num_nodes(),
            seed,
            grid.k,
            grid.m,
            grid.n,
            args.rho
        )?;
        writeln!(optimal, "cpu,hopcount")?;
        println!("Pareto frontier [{} elements]:", frontier.len());
        for solution in frontier.iter() {
            writeln!(optimal, "{}", objective_row(solution.objectives()))?;
            println!("{:?}", solution.objectives());
        }
    }
    Ok(())
}

fn solve(args: SolveArgs) -> Result<(), vnfcp::io::Error> {
    let instance = load_instance(&args.topology, &args.vnf_lib, &args.requests)?;
    tracing::info!(
        nodes = instance.graph.num_nodes(),
        requests = instance.requests.len(),
        "instance loaded"
    );

    let frontier = BruteForceSolver::new(&instance).solve();

    println!("Pareto frontier [{} elements]:", frontier.len());
    println!("cpu,hopcount");
    for solution in frontier.iter() {
        let mut row = objective_row(solution.objectives());
        for placement in solution.assignments() {
            let hosts = placement
                .iter()
                .map(|node| instance.graph.node(*node).name.as_str())
                .collect::<Vec<_>>()
                .join(">");
            row.push(',');
            row.push_str(&hosts);
        }
        println!("{row}");
    }
    Ok(())
}

fn objective_row(objectives: &[f64]) -> String {
    objectives
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
