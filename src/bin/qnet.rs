//! Command line front end: load a network configuration, run independent
//! replications, and write the waiting time table.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use qnet::network::NetworkConfig;
use qnet::output_analysis::{export, IndependentSample, StationTrace};
use qnet::simulator::replicate;
use qnet::utils::errors::SimulationError;

#[derive(Parser, Debug)]
#[command(name = "qnet", version, about = "Simulate an open FCFS queueing network")]
struct Args {
    /// Network configuration, as YAML (.yaml/.yml) or JSON
    config: PathBuf,

    /// Load every station at this utilization, deriving service means
    /// from the outside arrival rates and routing
    #[arg(long)]
    utilization: Option<f64>,

    /// Number of independent replications
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Waiting times kept per station and replication (defaults to the
    /// configured departure target)
    #[arg(long)]
    waiting_times: Option<usize>,

    /// Seed of the first replication; replication r uses seed + r
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Output file (defaults to Queue_Network_<n>_Nodes_<r>_Runs.csv)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn load_config(path: &Path) -> Result<NetworkConfig, SimulationError> {
    let contents = std::fs::read_to_string(path)?;
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("yaml") | Some("yml") => NetworkConfig::from_yaml(&contents),
        _ => NetworkConfig::from_json(&contents),
    }
}

/// Mean over replications of each replication's mean waiting time at
/// `station`, within the exported prefix.
fn mean_waiting_time(
    replications: &[Vec<StationTrace>],
    station: usize,
    prefix_len: usize,
) -> Option<f64> {
    let means: Vec<f64> = replications
        .iter()
        .filter_map(|traces| {
            let trace = traces[station].truncated(prefix_len);
            IndependentSample::post(trace.waiting_times)
                .ok()
                .map(|sample| sample.point_estimate_mean())
                .filter(|mean| mean.is_finite())
        })
        .collect();
    IndependentSample::post(means)
        .ok()
        .map(|sample| sample.point_estimate_mean())
        .filter(|mean| mean.is_finite())
}

fn run(args: Args) -> Result<(), SimulationError> {
    let mut config = load_config(&args.config)?;
    if let Some(utilization) = args.utilization {
        config = config.with_utilization(utilization)?;
    }
    config.validate()?;
    let prefix_len = args.waiting_times.unwrap_or(config.target_departures);
    if prefix_len > config.target_departures {
        config.target_departures = prefix_len;
    }
    info!(
        "Running {} replications of a {}-station {} network",
        args.runs,
        config.stations(),
        config.distribution
    );
    let replications = replicate(&config, args.runs, args.seed)?;
    for station in 0..config.stations() {
        if let Some(mean) = mean_waiting_time(&replications, station, prefix_len) {
            info!("Station {}: mean waiting time {:.4}", station, mean);
        }
    }
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(export::file_name(config.stations(), args.runs)));
    let mut writer = BufWriter::new(File::create(&output)?);
    export::write_csv(&mut writer, &replications, prefix_len)?;
    info!("Wrote {}", output.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
