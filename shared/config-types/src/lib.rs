//! # Configuration Type Definitions
//!
//! Immutable configuration records shared between the slicing core and the
//! CLI that drives it. Configuration is loaded once from a TOML file and
//! never mutated during a run (§3 of the slicer spec).
//!
//! ## File Format
//!
//! Configuration is stored as TOML for human readability and easy editing,
//! following the recognized keys: `printer.max`, `quality`,
//! `extruder.nozzle_diameter`, `extruder.filament_diameter`, `speed.print`,
//! `speed.travel`, `speed.infill`, `thickness.shell`, `thickness.top_bottom`,
//! `verbose`.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete, validated configuration for one slicing run.
///
/// All distances are millimetres; all speeds are millimetres per second.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub printer: PrinterLimits,
    /// Layer thickness (Δ), mm.
    pub quality: f64,
    pub extruder: ExtruderConfig,
    pub speed: SpeedConfig,
    pub thickness: ThicknessConfig,
    /// Enables progress/debug logging to the diagnostic channel.
    #[serde(default)]
    pub verbose: bool,
}

impl Configuration {
    /// Loads a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e.to_string()))?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Saves the configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| ConfigError::Io(path.as_ref().display().to_string(), e.to_string()))
    }

    /// Checks that every value is physically reasonable.
    ///
    /// This only rejects configuration-level nonsense (non-positive plate,
    /// layer height, or diameters); it does not know about any particular
    /// mesh, so it cannot catch `PlateOverflow` — that is a property of a
    /// configuration *and* a mesh set together, raised by the arranger.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.printer.max[0] <= 0.0 || self.printer.max[1] <= 0.0 || self.printer.max[2] <= 0.0 {
            return Err(ConfigError::InvalidConfiguration(
                "printer.max dimensions must be positive".into(),
            ));
        }

        if self.quality <= 0.0 {
            return Err(ConfigError::InvalidConfiguration(
                "quality (layer thickness) must be positive".into(),
            ));
        }

        if self.extruder.nozzle_diameter <= 0.0 || self.extruder.filament_diameter <= 0.0 {
            return Err(ConfigError::InvalidConfiguration(
                "extruder diameters must be positive".into(),
            ));
        }

        if self.speed.print <= 0.0 || self.speed.travel <= 0.0 || self.speed.infill <= 0.0 {
            return Err(ConfigError::InvalidConfiguration(
                "speeds must be positive".into(),
            ));
        }

        Ok(())
    }

    /// The usable plate area: 0.9 × (x_max, y_max), per §4.1.
    pub fn usable_plate(&self) -> (f64, f64) {
        (0.9 * self.printer.max[0], 0.9 * self.printer.max[1])
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            printer: PrinterLimits {
                max: [200.0, 200.0, 200.0],
            },
            quality: 0.2,
            extruder: ExtruderConfig {
                nozzle_diameter: 0.4,
                filament_diameter: 1.75,
            },
            speed: SpeedConfig {
                print: 40.0,
                travel: 150.0,
                infill: 60.0,
            },
            thickness: ThicknessConfig {
                shell: 0.7,
                top_bottom: 0.6,
            },
            verbose: false,
        }
    }
}

/// Plate/build-volume extents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PrinterLimits {
    /// [x_max, y_max, z_max] in mm.
    pub max: [f64; 3],
}

/// Nozzle and filament geometry, used for infill step and extrusion length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtruderConfig {
    pub nozzle_diameter: f64,
    pub filament_diameter: f64,
}

/// Feed rates, mm/s.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedConfig {
    pub print: f64,
    pub travel: f64,
    pub infill: f64,
}

/// Reserved for downstream perimeter/skin planning (§6); the core does not
/// act on these directly but carries them through to the G-code writer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThicknessConfig {
    pub shell: f64,
    pub top_bottom: f64,
}

/// Errors raised while loading or validating a [`Configuration`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {0}: {1}")]
    Io(String, String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_validates() {
        assert!(Configuration::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_plate() {
        let mut cfg = Configuration::default();
        cfg.printer.max[0] = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn usable_plate_is_ninety_percent() {
        let cfg = Configuration::default();
        let (ux, uy) = cfg.usable_plate();
        assert!((ux - 180.0).abs() < 1e-9);
        assert!((uy - 180.0).abs() < 1e-9);
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = Configuration::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Configuration = toml::from_str(&text).unwrap();
        assert_eq!(parsed.quality, cfg.quality);
    }
}
