use anyhow::{Context, Result};
use arw_api::{NativeLogLevel, DEFAULT_PATTERN_COUNT_MAX, DEFAULT_PATTERN_SIZE};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::DynamicBackend;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Explicit path to the wrapper library. Defaults to the platform file
    /// name, resolved through the loader's usual search path.
    pub library: Option<PathBuf>,

    #[serde(alias = "native_log_level")]
    pub log_level: NativeLogLevel,

    pub pattern_size: i32,
    #[serde(alias = "pattern_count")]
    pub pattern_count_max: i32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            library: None,
            log_level: NativeLogLevel::default(),
            pattern_size: DEFAULT_PATTERN_SIZE,
            pattern_count_max: DEFAULT_PATTERN_COUNT_MAX,
        }
    }
}

impl BridgeConfig {
    pub fn library_path(&self) -> PathBuf {
        self.library
            .clone()
            .unwrap_or_else(|| PathBuf::from(DynamicBackend::library_file_name()))
    }
}

/// Read a JSON config, writing the default one if `path` does not exist yet.
pub fn load_config<T>(path: &Path) -> Result<T>
where
    T: Default + Serialize + for<'de> Deserialize<'de>,
{
    if path.exists() {
        info!("Loading config from {:?}", path);
        let file = fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let reader = std::io::BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    } else {
        info!("Config not found. Creating default at {:?}", path);
        let config = T::default();
        let file =
            fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &config)?;
        Ok(config)
    }
}
