//! NRU ledger - concurrent account transactions competing for a shared frame pool
//!
//! Usage: nru-ledger [OPTIONS] [NAME=PATH ...]
//!
//! Each NAME=PATH pair runs one transaction worker named NAME over the sections in PATH.
//! Without pairs, the default roster (Vlad, Frank, Bigfoot, Casper, Gomez) reads `<NAME>.in`
//! from the working directory. `--generate DIR` writes random input for that roster.

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use nru_ledger::error::{self, Error};
use nru_ledger::shared::DEFAULT_ROSTER;
use nru_ledger::txn::{generate, TransactionSource};
use nru_ledger::{logging, Coordinator, SimConfig};

/// Command-line configuration
struct Options {
    sources: Vec<TransactionSource>,
    config: SimConfig,
    verbose: bool,
    generate: Option<PathBuf>,
}

fn main() {
    let options = match parse_args() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    logging::init(options.verbose);

    if let Some(dir) = &options.generate {
        let mut rng = match options.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        match generate::write_roster(dir, &DEFAULT_ROSTER, &mut rng) {
            Ok(sources) => {
                for source in sources {
                    println!("{}={}", source.name(), source.describe());
                }
                return;
            }
            Err(e) => error::abort(&e),
        }
    }

    let coordinator = match Coordinator::new(options.sources, options.config) {
        Ok(coordinator) => coordinator,
        Err(e) => error::abort(&e),
    };
    match coordinator.run() {
        Ok(report) => {
            tracing::info!(
                "{} sections, {} page faults, {} clock ticks in {} ms",
                report.total_sections(),
                report.total_faults(),
                report.ticks,
                report.elapsed.num_milliseconds()
            );
            println!("{}", report);
        }
        Err(e) => error::abort(&e),
    }
}

fn print_help(program: &str) {
    eprintln!("NRU ledger - simulates account transactions competing for shared memory frames");
    eprintln!();
    eprintln!("Usage: {} [OPTIONS] [NAME=PATH ...]", program);
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  NAME=PATH       - Run a worker named NAME over the transaction file PATH");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -v, --verbose   Log clock ticks, delays and individual amounts");
    eprintln!("  --odds N        1-in-N odds of a spontaneous page fault (0 disables)");
    eprintln!("  --tick-ms N     Clock tick interval in milliseconds");
    eprintln!("  --no-delay      Skip the random pause between sections");
    eprintln!("  --seed N        Seed the workers' random number generators");
    eprintln!("  --generate DIR  Write random <NAME>.in files for the default roster into DIR and exit");
    eprintln!("  -h, --help      Print this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {}", program);
    eprintln!("  {} --odds 2 Vlad=Vlad.in Frank=Frank.in", program);
    eprintln!("  {} --generate .", program);
}

fn parse_args() -> Result<Options, Error> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("nru-ledger", String::as_str);

    let mut config = SimConfig::default();
    let mut verbose = false;
    let mut generate = None;
    let mut sources = Vec::new();

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help(program);
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "--no-delay" => config.section_delay = false,
            "--odds" => config.extra_fault_odds = number(arg, rest.next())?,
            "--tick-ms" => {
                config.tick_interval = Duration::from_millis(number(arg, rest.next())?)
            }
            "--seed" => config.seed = Some(number(arg, rest.next())?),
            "--generate" => {
                let dir = rest
                    .next()
                    .ok_or_else(|| Error::Config(format!("{} needs a value", arg)))?;
                generate = Some(PathBuf::from(dir));
            }
            flag if flag.starts_with('-') => {
                return Err(Error::Config(format!("unknown option \"{}\"", flag)))
            }
            pair => sources.push(TransactionSource::parse_pair(pair)?),
        }
    }

    if sources.is_empty() {
        sources = TransactionSource::default_roster();
    }

    Ok(Options {
        sources,
        config,
        verbose,
        generate,
    })
}

fn number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, Error> {
    let value = value.ok_or_else(|| Error::Config(format!("{} needs a value", flag)))?;
    value
        .parse()
        .map_err(|_| Error::Config(format!("{} expects a number, got \"{}\"", flag, value)))
}
