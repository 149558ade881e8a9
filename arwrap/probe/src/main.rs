use anyhow::{bail, Context, Result};
use arw_bridge::{log_callback, load_config, BridgeConfig, EyeSetup, Session};
use glam::Mat4;
use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct ProbeConfig {
    bridge: BridgeConfig,
    video_config: String,
    /// Camera calibration file. Unset uses the engine's default parameters.
    calibration: Option<PathBuf>,
    near_plane: f32,
    far_plane: f32,
    /// Marker configuration strings, e.g. `single;data/hiro.patt;80`.
    markers: Vec<String>,
    /// Stop after this many frames. Unset runs until Ctrl-C.
    max_frames: Option<u64>,
    frame_interval_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            video_config: "-device=Dummy".into(),
            calibration: None,
            near_plane: 0.01,
            far_plane: 10000.0,
            markers: vec!["single;data/hiro.patt;80".into()],
            max_frames: None,
            frame_interval_ms: 16,
        }
    }
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("probe.json"));
    let config: ProbeConfig = load_config(&config_path).unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        ProbeConfig::default()
    });
    debug!("Loaded Config: {:?}", config);

    let mut session = Session::open(&config.bridge)?;
    session.register_log_callback(Some(log_callback::forward_to_log()));
    info!("ARWrapper version {}", session.version());

    if !session.initialise_from(&config.bridge) {
        bail!("Engine failed to initialise (error {})", session.error_code());
    }

    let calibration = read_calibration(config.calibration.as_deref())?;
    let setup = EyeSetup {
        video_config: &config.video_config,
        calibration: &calibration,
    };
    if !session.start_running(setup, config.near_plane, config.far_plane) {
        let code = session.error_code();
        session.shutdown();
        bail!("Engine failed to start video (error {})", code);
    }
    match session.video_params() {
        Some(params) => info!(
            "Video running at {}x{} ({}, {} bytes/pixel)",
            params.width, params.height, params.pixel_format, params.pixel_size
        ),
        None => warn!("Video parameters unavailable"),
    }

    let markers: Vec<(i32, &str)> = config
        .markers
        .iter()
        .filter_map(|marker| {
            let id = session.add_marker(marker);
            if id < 0 {
                warn!("Engine rejected marker {:?}", marker);
                None
            } else {
                info!("Added marker {} as {:?}", id, marker);
                Some((id, marker.as_str()))
            }
        })
        .collect();

    let interval = Duration::from_millis(config.frame_interval_ms);
    let mut frames = 0u64;
    let mut pose = Mat4::IDENTITY;
    while running.load(Ordering::SeqCst) && config.max_frames.map_or(true, |max| frames < max) {
        if !session.capture() {
            thread::sleep(interval);
            continue;
        }
        frames += 1;
        if !session.update() {
            trace!("Frame {}: tracking update failed", frames);
            continue;
        }
        for &(id, name) in &markers {
            if session.marker_visible(id) && session.marker_transform(id, &mut pose) {
                info!(
                    "Frame {}: {} at {:?}",
                    frames,
                    name,
                    pose.w_axis.truncate()
                );
            }
        }
        thread::sleep(interval);
    }

    info!("Processed {} frames", frames);
    session.remove_all_markers();
    session.stop_running();
    session.shutdown();
    session.register_log_callback(None);
    Ok(())
}

fn read_calibration(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("Failed to read {:?}", path)),
        None => Ok(Vec::new()),
    }
}
