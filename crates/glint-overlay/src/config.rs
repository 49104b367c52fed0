//! Overlay configuration.
//!
//! Host-facing tuning for the effect engine. Configuration can be loaded
//! from and saved to a TOML file; a missing or malformed file falls back to
//! defaults with a warning rather than refusing to start.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use glint_core::definition::{DefinitionError, EffectRegistry, EmissionMode};
use glint_core::{defaults, BurstOrder, TrailParams};

/// Configuration file name.
const CONFIG_FILE: &str = "glint.toml";

/// Overlay configuration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    // === Engine ===
    /// Global pixel scale; sprite sizes and travel scale with this.
    pub reference_size: f32,
    /// Target tick rate in Hz.
    pub target_fps: u32,

    // === Emission ===
    /// Override for the drag-burst distance threshold, pixels per spawn.
    pub distance_threshold: Option<f32>,

    // === Trail ===
    /// Seconds a trail sample stays visible.
    pub trail_lifetime: f32,
    /// Maximum retained trail samples.
    pub trail_max_points: usize,
    /// Trail width at the newest segment, pixels.
    pub trail_base_width: f32,

    // === Assets ===
    /// Directory holding the grayscale pattern PNGs. `None` uses procedural
    /// patterns (useful headless and in tests).
    pub pattern_dir: Option<PathBuf>,
    /// Canvas size for procedural patterns, pixels.
    pub procedural_pattern_size: u32,

    // === Input ===
    /// Capacity of the hook-thread → tick-thread pointer queue.
    pub input_queue_capacity: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            // Engine
            reference_size: defaults::REFERENCE_SIZE,
            target_fps: 60,

            // Emission
            distance_threshold: None,

            // Trail
            trail_lifetime: 0.3,
            trail_max_points: 30,
            trail_base_width: 4.0,

            // Assets
            pattern_dir: None,
            procedural_pattern_size: 256,

            // Input
            input_queue_capacity: 256,
        }
    }
}

impl OverlayConfig {
    /// Load configuration from the default file location.
    /// Returns default config if the file doesn't exist.
    #[must_use]
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            }
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.reference_size = self.reference_size.clamp(64.0, 4096.0);
        self.target_fps = self.target_fps.clamp(30, 240);
        if let Some(threshold) = self.distance_threshold {
            self.distance_threshold = Some(threshold.clamp(1.0, 512.0));
        }
        self.trail_lifetime = self.trail_lifetime.clamp(0.05, 5.0);
        self.trail_max_points = self.trail_max_points.clamp(2, 512);
        self.trail_base_width = self.trail_base_width.clamp(0.5, 64.0);
        self.procedural_pattern_size = self.procedural_pattern_size.clamp(16, 1024);
        self.input_queue_capacity = self.input_queue_capacity.clamp(16, 4096);
    }

    /// Builds the effect registry with this configuration applied.
    pub fn build_registry(&self) -> Result<EffectRegistry, DefinitionError> {
        let mut registry = EffectRegistry::new();
        registry.register(defaults::ring(self.reference_size)?)?;
        registry.register(defaults::ring_burst(BurstOrder::Three, self.reference_size)?)?;
        let mut drag_burst = defaults::ring_burst(BurstOrder::Four, self.reference_size)?;
        if let Some(threshold) = self.distance_threshold {
            drag_burst.emission = EmissionMode::DistanceRate { threshold };
        }
        registry.register(drag_burst)?;
        registry.register(defaults::mesh_burst(self.reference_size)?)?;
        Ok(registry)
    }

    /// Trail tuning derived from this configuration.
    #[must_use]
    pub fn trail_params(&self) -> TrailParams {
        TrailParams {
            lifetime: self.trail_lifetime,
            max_points: self.trail_max_points,
            base_width: self.trail_base_width,
            ..TrailParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glint.toml");

        let mut config = OverlayConfig::default();
        config.target_fps = 120;
        config.distance_threshold = Some(12.0);
        config.trail_max_points = 40;
        config.save_to(&path).unwrap();

        let loaded = OverlayConfig::load_from(&path);
        assert_eq!(loaded.target_fps, 120);
        assert_eq!(loaded.distance_threshold, Some(12.0));
        assert_eq!(loaded.trail_max_points, 40);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = OverlayConfig::load_from("/nonexistent/glint.toml");
        assert_eq!(config.target_fps, 60);
        assert!(config.pattern_dir.is_none());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glint.toml");
        fs::write(&path, "target_fps = \"not a number\"").unwrap();
        let config = OverlayConfig::load_from(&path);
        assert_eq!(config.target_fps, 60);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glint.toml");
        fs::write(&path, "target_fps = 144\n").unwrap();
        let config = OverlayConfig::load_from(&path);
        assert_eq!(config.target_fps, 144);
        assert_eq!(config.trail_max_points, 30);
    }

    #[test]
    fn test_validate_clamps_out_of_range_values() {
        let mut config = OverlayConfig {
            target_fps: 10_000,
            reference_size: 1.0,
            trail_max_points: 0,
            ..OverlayConfig::default()
        };
        config.validate();
        assert_eq!(config.target_fps, 240);
        assert!((config.reference_size - 64.0).abs() < 1e-6);
        assert_eq!(config.trail_max_points, 2);
    }

    #[test]
    fn test_threshold_override_reaches_registry() {
        let config = OverlayConfig {
            distance_threshold: Some(20.0),
            ..OverlayConfig::default()
        };
        let registry = config.build_registry().unwrap();
        let (_, threshold) = registry.distance_kind().unwrap();
        assert!((threshold - 20.0).abs() < 1e-6);
    }
}
