mod parser;

use crate::parser::parse;
use calsat::config::Config;
use calsat::consistency::PropagationLevel;
use calsat::value_selector::{MaxValueSelector, MinValueSelector, ValueSelector};
use clap::Parser;
use eyre::{eyre, WrapErr};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Args {
    /// Print every solution.
    #[arg(short)]
    a: bool,
    /// Stop after this many solutions.
    #[arg(short, value_parser = clap::value_parser!(u64).range(1..))]
    n: Option<u64>,
    /// Time limit in seconds.
    #[arg(short)]
    t: Option<u64>,
    /// Propagate binary constraints to a fixed point before searching.
    #[arg(long)]
    fixed_point: bool,
    /// Try later dates first.
    #[arg(long)]
    latest_first: bool,
    #[arg(long)]
    silent: bool,
    model: PathBuf,
}

fn main() -> eyre::Result<()> {
    let args = Args::parse();

    if !args.silent {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_env_filter(
                EnvFilter::builder()
                    .with_env_var("CALSAT_LOG")
                    .with_default_directive(LevelFilter::WARN.into())
                    .from_env_lossy(),
            )
            .init();
    }

    let file = File::open(&args.model)
        .wrap_err_with(|| format!("failed to open {}", args.model.display()))?;
    let json = serde_json::from_reader(BufReader::new(file)).wrap_err("failed reading model json")?;
    let mut model = parse(json).map_err(|e| eyre!("model parse error: {}", e))?;

    let value_selector: Box<dyn ValueSelector> = if args.latest_first {
        Box::new(MaxValueSelector {})
    } else {
        Box::new(MinValueSelector {})
    };
    let propagation = if args.fixed_point {
        PropagationLevel::FixedPoint
    } else {
        PropagationLevel::SinglePass
    };
    let config = Config::new(
        propagation,
        value_selector,
        args.a || args.n.is_some(),
        args.t.map(Duration::from_secs),
    );

    let Some(mut search) = model.solver.search(config) else {
        println!("=====UNSATISFIABLE=====");
        return Ok(());
    };
    let mut found = 0u64;
    for assignment in search.by_ref() {
        found += 1;
        for (name, date) in model.names.iter().zip(&assignment) {
            println!("{} = {};", name, date);
        }
        println!("----------");
        if Some(found) == args.n {
            break;
        }
    }
    if found > 0 {
        println!("==========");
    } else if search.stats().whole_tree_explored {
        println!("=====UNSATISFIABLE=====");
    } else {
        println!("=====UNKNOWN=====");
    }
    Ok(())
}
