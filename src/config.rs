//! Loading and saving configuration files in JSON or YAML.
//!
//! The format is chosen from the file extension: `.json` for strict JSON, `.yaml` for YAML.
//! Any other extension is rejected, both on load and on save.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::encoder::PoissonEncoder;
use super::error::SNNError;
use super::{DEFAULT_DURATION, DEFAULT_MAX_RATE, DEFAULT_WINDOW_SIZE};

/// Supported configuration file formats.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Returns the format matching the extension of the path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ConfigFormat::Json),
            Some("yaml") => Ok(ConfigFormat::Yaml),
            _ => Err(SNNError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load a configuration from a JSON or YAML file.
pub fn load_config<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, SNNError> {
    let format = ConfigFormat::from_path(&path)?;
    log::debug!("Loading {:?} configuration from {}", format, path.as_ref().display());

    let file = File::open(&path).map_err(|e| SNNError::IOError(e.to_string()))?;
    let reader = BufReader::new(file);
    match format {
        ConfigFormat::Json => {
            serde_json::from_reader(reader).map_err(|e| SNNError::ParseError(e.to_string()))
        }
        ConfigFormat::Yaml => {
            serde_yaml::from_reader(reader).map_err(|e| SNNError::ParseError(e.to_string()))
        }
    }
}

/// Save a configuration to a JSON or YAML file.
/// Nothing is written if the extension is not supported.
pub fn save_config<T: Serialize, P: AsRef<Path>>(config: &T, path: P) -> Result<(), SNNError> {
    let format = ConfigFormat::from_path(&path)?;
    log::debug!("Saving {:?} configuration to {}", format, path.as_ref().display());

    let file = File::create(&path).map_err(|e| SNNError::IOError(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    match format {
        ConfigFormat::Json => serde_json::to_writer_pretty(&mut writer, config)
            .map_err(|e| SNNError::ParseError(e.to_string()))?,
        ConfigFormat::Yaml => serde_yaml::to_writer(&mut writer, config)
            .map_err(|e| SNNError::ParseError(e.to_string()))?,
    }
    writer.flush().map_err(|e| SNNError::IOError(e.to_string()))
}

/// Neuron parameters forwarded to the accelerator.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronParameters {
    pub leak_rate: u32,
    pub refractory_period: u32,
    pub threshold: u32,
}

impl Default for NeuronParameters {
    fn default() -> Self {
        NeuronParameters {
            leak_rate: 10,
            refractory_period: 20,
            threshold: 1000,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Length of the encoding window.
    pub duration: f64,
    /// Firing rate at full intensity.
    pub max_rate: f64,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        EncodingConfig {
            duration: DEFAULT_DURATION,
            max_rate: DEFAULT_MAX_RATE,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub window_size: usize,
    /// Timeout of a single poll of the spike source.
    pub poll_timeout_ms: u64,
    /// Time between two rendered frames.
    pub refresh_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            window_size: DEFAULT_WINDOW_SIZE,
            poll_timeout_ms: 10,
            refresh_interval_ms: 100,
        }
    }
}

/// Configuration of the demo network and its telemetry.
/// Missing fields take their default value.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub fpga_ip: String,
    pub layer_sizes: Vec<usize>,
    /// Named groups of unit IDs, e.g., the input, hidden, and output layers.
    pub neuron_groups: BTreeMap<String, Vec<usize>>,
    pub neuron_parameters: NeuronParameters,
    pub encoding: EncodingConfig,
    pub monitor: MonitorConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let layer_sizes = vec![784, 100, 10];
        let mut neuron_groups = BTreeMap::new();
        let mut start = 0;
        for (name, size) in ["input", "hidden", "output"].iter().zip(layer_sizes.iter()) {
            neuron_groups.insert(name.to_string(), (start..start + size).collect());
            start += size;
        }

        NetworkConfig {
            fpga_ip: "192.168.1.100".to_string(),
            layer_sizes,
            neuron_groups,
            neuron_parameters: NeuronParameters::default(),
            encoding: EncodingConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl NetworkConfig {
    /// Checks that the encoding and monitoring parameters are usable.
    pub fn validate(&self) -> Result<(), SNNError> {
        PoissonEncoder::build(self.encoding.duration, self.encoding.max_rate)?;
        if self.monitor.window_size == 0 {
            return Err(SNNError::InvalidArgument(
                "Window size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the total number of units over all layers.
    pub fn num_units(&self) -> usize {
        self.layer_sizes.iter().sum()
    }

    /// Returns the range of unit IDs of a layer.
    pub fn layer_range(&self, layer: usize) -> Option<std::ops::Range<usize>> {
        let size = *self.layer_sizes.get(layer)?;
        let start: usize = self.layer_sizes[..layer].iter().sum();
        Some(start..start + size)
    }
}
