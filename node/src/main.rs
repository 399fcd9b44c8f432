use anyhow::Context;
use audiocore::c2_interface::DetectionEvent;
use audiocore::classify::{DroneAudioCrnn, StateEstimator};
use audiocore::detection::{DetectionModel, DetectionResult};
use audiocore::prelude::ActivityClassifier;
use audiocore::tracking::TrackTable;
use clap::Parser;
use mission::config::NodeConfig;
use mission::coordinator::Coordinator;
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;

mod mission;

#[derive(Parser)]
#[command(author, version, about = "Acoustic sensor node for the drone C2 simulator")]
struct Args {
    /// C2 hub address (host:port)
    #[arg(long)]
    endpoint: Option<String>,
    /// Emission interval in seconds
    #[arg(long)]
    interval: Option<f64>,
    /// Seed for the detection RNG
    #[arg(long)]
    seed: Option<u64>,
    /// Load node config from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run a fixed number of ticks without a hub and print events
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Tick count for offline runs
    #[arg(long, default_value_t = 5)]
    ticks: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = if let Some(path) = &args.config {
        NodeConfig::load(path)?
    } else {
        NodeConfig::default()
    };
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(interval) = args.interval {
        config.interval_secs = interval;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    if args.offline {
        return run_offline(&config, args.ticks);
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating node runtime")?;
    runtime.block_on(Coordinator::new(config).run())
}

/// Hub-less self test: probe the classifier stub, then run the simulation
/// for a fixed number of ticks and print each detection as JSON.
fn run_offline(config: &NodeConfig, ticks: usize) -> anyhow::Result<()> {
    let mut crnn = match config.seed {
        Some(seed) => DroneAudioCrnn::seeded(seed),
        None => DroneAudioCrnn::new(),
    };
    let (state, confidence) = crnn.predict(&[]);
    println!(
        "Classifier probe -> state {}, confidence {:.2}",
        state.as_str(),
        confidence
    );

    let table = TrackTable::new(config.seed_tracks(0.0));
    let model = DetectionModel::new(config.max_range_m);
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut emitted = 0usize;
    for tick in 1..=ticks {
        let now = tick as f64 * config.interval_secs;
        table.advance_all(config.interval_secs, now);
        for track in table.snapshot() {
            let rel = track.position.offset_from(&config.reference);
            let state = StateEstimator::estimate(&rel, &track.velocity);
            if let Some(detection) = model.attempt(state, &rel, &mut rng) {
                let result = DetectionResult::new(track.drone_id, state, detection);
                let event = DetectionEvent::from_result(&result, now);
                println!("{}", serde_json::to_string(&event)?);
                emitted += 1;
            }
        }
    }

    println!(
        "Offline run -> ticks {}, tracks {}, events {}",
        ticks,
        table.len(),
        emitted
    );
    Ok(())
}
