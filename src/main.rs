use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ordermap::OrderMap;
use petgraph::dot::{Config, Dot};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use seqorder::{rows::parse_rows, Graph, TieBreak};

#[derive(Parser, Debug)]
#[command(name = "seqorder", version, about = "Infer a global order from overlapping subsequences")]
struct Cli {
    /// JSON rows (array of rows or NDJSON); stdin when omitted
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Keep every observed edge instead of reducing to Hasse edges
    #[arg(long)]
    no_reduce: bool,

    /// How to order tokens that are ready at the same time
    #[arg(long, value_enum, default_value_t = TieBreak::Appearance)]
    tie_break: TieBreak,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
    Dot,
}

#[derive(Serialize)]
struct Report<'a> {
    order: Vec<String>,
    tie_break: TieBreak,
    reduced: bool,
    edges: Vec<(&'a str, &'a str)>,
    incomparable: Vec<(String, String)>,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// One `from -> [to, ..]` line per token with successors, in appearance order.
fn edge_lines(graph: &Graph<String>) -> Vec<String> {
    let mut adjacency: OrderMap<&String, Vec<&String>> = OrderMap::new();
    for (from, to) in graph.edges() {
        adjacency.entry(from).or_default().push(to);
    }
    adjacency
        .iter()
        .map(|(from, tos)| format!("  {} -> {:?}", from, tos))
        .collect()
}

fn print_text(order: &[String], graph: &Graph<String>, reduced: bool, incomparable: &[(String, String)]) {
    println!("Topological order: {:?}", order);
    println!("{}", if reduced { "Hasse edges:" } else { "Edges:" });
    for line in edge_lines(graph) {
        println!("{line}");
    }
    println!("Ambiguities:");
    for from in graph.tokens() {
        let others: Vec<_> = incomparable
            .iter()
            .filter(|(a, _)| a == from)
            .map(|(_, b)| b)
            .collect();
        if !others.is_empty() {
            println!("  {} ? {:?}", from, others);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rows = parse_rows(&read_input(cli.input.as_ref())?)?;
    tracing::info!(rows = rows.len(), "read input");

    let mut graph = seqorder::build_graph(rows);
    let reduced = !cli.no_reduce;
    if reduced {
        let removed = graph.reduce()?;
        tracing::info!(removed, "reduced to Hasse edges");
    }
    let order = graph.linearize_with(cli.tie_break)?;

    match cli.format {
        Format::Dot => {
            let g = graph.to_digraph().map(|_, k| k.clone(), |_, _| "");
            println!("{}", Dot::with_config(&g, &[Config::EdgeNoLabel]));
        }
        Format::Json => {
            let incomparable = graph.incomparable_pairs()?;
            let edges = graph
                .edges()
                .into_iter()
                .map(|(a, b)| (a.as_str(), b.as_str()))
                .collect();
            let report = Report { order, tie_break: cli.tie_break, reduced, edges, incomparable };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            let incomparable = graph.incomparable_pairs()?;
            print_text(&order, &graph, reduced, &incomparable);
        }
    }
    Ok(())
}
