use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use squares_cli::{assign, assignment_source, board, init_logging, load_config, progress, resolve};
use std::path::PathBuf;
use tracing::{debug, info};

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("JSON request file")
}

fn read_input(matches: &ArgMatches) -> Result<String> {
    let path = matches
        .get_one::<PathBuf>("input")
        .context("missing --input")?;
    std::fs::read_to_string(path)
        .with_context(|| format!("could not read input file {}", path.display()))
}

fn main() -> Result<()> {
    // Parse arguments
    let matches = Command::new("squares")
        .about("Assign squares boards and resolve bracket payouts.")
        .arg(
            Arg::new("config")
                .long("config")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("assign")
                .about("Assign grid positions and header digits to a board's squares.")
                .arg(input_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Fixed seed for a reproducible run"),
                ),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve the winning square of a completed game.")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("progress")
                .about("Summarize bracket progress from a list of games.")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("board")
                .about("Resolve every completed game of a board and total winnings.")
                .arg(input_arg()),
        )
        .get_matches();

    // Load from config file
    let config_file = matches
        .get_one::<PathBuf>("config")
        .context("missing --config")?;
    let config = load_config(config_file)?;

    // Setup logging
    init_logging(config.log_level, config.json_logs);
    debug!(?config, "loaded config");

    let output = match matches.subcommand() {
        Some(("assign", sub)) => {
            let flag_seed = sub.get_one::<u64>("seed").copied();
            let mut rng = assignment_source(flag_seed, config.seed);
            info!(seeded = flag_seed.or(config.seed).is_some(), "running assignment");
            assign(&read_input(sub)?, &mut rng)?
        }
        Some(("resolve", sub)) => resolve(&read_input(sub)?, &config.payouts)?,
        Some(("progress", sub)) => progress(&read_input(sub)?)?,
        Some(("board", sub)) => board(&read_input(sub)?, &config.payouts)?,
        _ => unreachable!("subcommand_required"),
    };
    println!("{output}");
    Ok(())
}
