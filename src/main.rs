//! Demo: encode a random 28x28 image, replay its spikes through the live monitor, and report statistics.
//!
//! Usage: `snn_accelerator [config.json|config.yaml]`
use std::env;

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use snn_accelerator::config::{load_config, NetworkConfig};
use snn_accelerator::encoder::PoissonEncoder;
use snn_accelerator::error::SNNError;
use snn_accelerator::monitor::{LogSink, Monitor, ReplaySource};
use snn_accelerator::spike_train::{spikes_in_range, Spike};
use snn_accelerator::stats::SpikeStatistics;

const SEED: u64 = 42;
const MICROS_PER_SECOND: f64 = 1_000_000.0;
/// Number of spikes delivered by each poll of the replayed stream.
const SPIKES_PER_POLL: usize = 50;

fn main() -> Result<(), SNNError> {
    env_logger::init();

    let config: NetworkConfig = match env::args().nth(1) {
        Some(path) => load_config(path)?,
        None => NetworkConfig::default(),
    };
    config.validate()?;
    log::info!(
        "Network at {} with layers {:?}",
        config.fpga_ip,
        config.layer_sizes
    );

    let mut rng = StdRng::seed_from_u64(SEED);
    let image = DMatrix::from_fn(28, 28, |_, _| rng.gen_range(0.0..255.0));

    let encoder = PoissonEncoder::build(config.encoding.duration, config.encoding.max_rate)?;
    let spike_train = encoder.encode(&image, &mut rng);
    log::info!(
        "Encoded {} spikes over {} input units",
        spike_train.num_spikes(),
        spike_train.num_units()
    );

    // Without an accelerator attached, the input spikes stand in for the output stream.
    let spikes: Vec<Spike> = spike_train
        .flatten()
        .into_iter()
        .map(|spike| Spike::new(spike.unit_id(), spike.time() * MICROS_PER_SECOND))
        .collect();

    let stats = SpikeStatistics::from_spikes(&spikes);
    println!("Total spikes: {}", stats.total_spikes);
    println!("Active units: {}", stats.active_units);

    for (layer, name) in ["input", "hidden", "output"].iter().enumerate() {
        if let Some(units) = config.layer_range(layer) {
            let layer_stats = SpikeStatistics::from_spikes(&spikes_in_range(&spikes, units));
            println!(
                "Layer {}: {} spikes, {} active units",
                name, layer_stats.total_spikes, layer_stats.active_units
            );
        }
    }

    let num_frames = spikes.len().div_ceil(SPIKES_PER_POLL) + 1;
    let mut monitor = Monitor::build(ReplaySource::new(spikes, SPIKES_PER_POLL), &config.monitor)?;
    monitor.run(&mut LogSink, num_frames)?;

    let snapshot = monitor.aggregator().snapshot();
    println!(
        "Window holds {} spikes from {} units",
        snapshot.num_spikes(),
        snapshot.counts.len()
    );

    Ok(())
}
