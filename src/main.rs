use std::fs::File;
use std::io::{self, BufReader, Read};
use std::process::ExitCode;

use group_rounds::{assign, AnnealConfig, Person, Progress};
use log::{error, info};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShuffleRequest {
    group_count: usize,
    round_count: usize,
    seed: Option<u64>,
    max_iterations: Option<usize>,
    members: Vec<Person>,
}

fn read_request(path: Option<String>) -> Result<ShuffleRequest, Box<dyn std::error::Error>> {
    let reader: Box<dyn Read> = match path {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    Ok(serde_json::from_reader(reader)?)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let request = read_request(std::env::args().nth(1))?;
    let mut config = AnnealConfig::default();
    if let Some(seed) = request.seed {
        config = config.with_seed(seed);
    }
    if let Some(n) = request.max_iterations {
        config = config.with_max_iterations(n);
    }

    let mut report = |progress: &Progress| {
        info!("{:>5.1}% cost {:.2}", progress.fraction * 100.0, progress.cost);
    };
    let outcome = assign(&request.members, request.group_count, request.round_count, &config, &mut report)?;
    serde_json::to_writer_pretty(io::stdout().lock(), &outcome.groups)?;
    println!();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
