//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an empty file yields a working single
//! flex-sensor-per-finger build. Validation rejects combinations the
//! hardware cannot satisfy (e.g., multi-knuckle fingers without a
//! multiplexer, or a pinch gesture on a build without a thumb sensor).

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::channel::MAX_SELECT_LINES;
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub glove: GloveConfig,
    pub fingers: FingerConfig,
    pub calibration: CalibrationConfig,
    pub joystick: JoystickConfig,
    pub gestures: GestureConfig,
    pub buttons: ButtonConfig,
    pub multiplexer: MultiplexerConfig,
    pub force_feedback: ForceFeedbackConfig,
    pub haptics: HapticsConfig,
    pub journal: JournalConfig,
}

/// Serial link configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path; empty means auto-detect.
    pub port: String,
    pub baud_rate: u32,
    /// Bound on one inbound read per tick.
    pub read_timeout_ms: u64,
}

/// Tick loop and sensor resolution configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GloveConfig {
    pub tick_interval_ms: u64,
    /// ADC resolution in bits (12 on ESP32-class boards, 10 on AVR).
    pub adc_bits: u32,
}

/// Finger topology configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FingerConfig {
    /// Knuckle sensors per finger (1 to 3).
    pub knuckle_count: u32,
    pub enable_splay: bool,
    pub enable_thumb: bool,
    pub invert_curl: bool,
    pub invert_splay: bool,
    /// Coupling window used to derive the third joint on 2-knuckle builds,
    /// as fractions of full scale.
    pub coupling_start: f32,
    pub coupling_end: f32,
}

/// Auto-calibration configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Ticks of calibration after the calibrate button fires; -1 keeps
    /// calibration on permanently.
    pub loops: i32,
    /// Clamp mapped values to the output range.
    pub clamp: bool,
}

/// Joystick configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JoystickConfig {
    pub enabled: bool,
    /// Deadzone radius around center, as a fraction of half scale.
    pub deadzone: f32,
    pub invert_x: bool,
    pub invert_y: bool,
}

/// Gesture configuration
///
/// An enabled gesture replaces the physical button for the same signal.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GestureConfig {
    pub trigger: bool,
    pub grab: bool,
    pub pinch: bool,
}

/// Button polarity configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ButtonConfig {
    pub invert_a: bool,
    pub invert_b: bool,
    pub invert_menu: bool,
    pub invert_calibrate: bool,
    pub invert_joystick: bool,
}

/// Analog multiplexer configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MultiplexerConfig {
    pub enabled: bool,
    pub select_lines: u32,
}

/// Force feedback configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ForceFeedbackConfig {
    pub enabled: bool,
    /// Scale servo throw by each finger's calibrated span instead of full
    /// sensor range.
    pub finger_scaling: bool,
    pub invert: bool,
}

/// Haptics configuration
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HapticsConfig {
    pub enabled: bool,
}

/// Tick journal configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct JournalConfig {
    pub enabled: bool,
    pub log_dir: String,
    pub max_records_per_file: usize,
    pub max_files_to_keep: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115200,
            read_timeout_ms: 3,
        }
    }
}

impl Default for GloveConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 4,
            adc_bits: 12,
        }
    }
}

impl Default for FingerConfig {
    fn default() -> Self {
        Self {
            knuckle_count: 1,
            enable_splay: false,
            enable_thumb: true,
            invert_curl: false,
            invert_splay: false,
            coupling_start: 0.10,
            coupling_end: 0.50,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            loops: -1,
            clamp: true,
        }
    }
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            deadzone: 0.1,
            invert_x: false,
            invert_y: false,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            trigger: true,
            grab: true,
            pinch: true,
        }
    }
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            select_lines: 4,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: "./logs".to_string(),
            max_records_per_file: 10000,
            max_files_to_keep: 10,
        }
    }
}

impl GloveConfig {
    /// Full-scale ADC value for the configured resolution.
    #[must_use]
    pub fn analog_max(&self) -> i32 {
        (1 << self.adc_bits) - 1
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use glove_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Validate serial link
        if ![9600, 57600, 115200, 230400, 460800, 921600].contains(&self.serial.baud_rate) {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("baud_rate must be one of: 9600, 57600, 115200, 230400, 460800, 921600")
            ));
        }

        if self.serial.read_timeout_ms == 0 || self.serial.read_timeout_ms > 1000 {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("read_timeout_ms must be between 1 and 1000")
            ));
        }

        // Validate tick loop
        if self.glove.tick_interval_ms == 0 || self.glove.tick_interval_ms > 1000 {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("tick_interval_ms must be between 1 and 1000")
            ));
        }

        if self.glove.adc_bits < 8 || self.glove.adc_bits > 16 {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("adc_bits must be between 8 and 16")
            ));
        }

        // Validate finger topology
        if self.fingers.knuckle_count < 1 || self.fingers.knuckle_count > 3 {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("knuckle_count must be between 1 and 3")
            ));
        }

        // Extra knuckle sensors are wired through the multiplexer.
        if self.fingers.knuckle_count > 1 && !self.multiplexer.enabled {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("knuckle_count above 1 requires the multiplexer")
            ));
        }

        if self.fingers.coupling_start < 0.0
            || self.fingers.coupling_end > 1.0
            || self.fingers.coupling_start >= self.fingers.coupling_end {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("coupling window must satisfy 0.0 <= coupling_start < coupling_end <= 1.0")
            ));
        }

        // Validate calibration
        if self.calibration.loops < -1 || self.calibration.loops == 0 {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("calibration loops must be -1 (always on) or a positive tick count")
            ));
        }

        // Validate joystick
        if self.joystick.deadzone < 0.0 || self.joystick.deadzone > 0.5 {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("joystick deadzone must be between 0.0 and 0.5")
            ));
        }

        // Pinch averages thumb and index; it needs a thumb sensor.
        if self.gestures.pinch && !self.fingers.enable_thumb {
            return Err(crate::error::GloveLinkError::Config(
                toml::de::Error::custom("pinch gesture requires enable_thumb")
            ));
        }

        // Validate multiplexer
        if self.multiplexer.enabled {
            if self.multiplexer.select_lines == 0
                || self.multiplexer.select_lines > MAX_SELECT_LINES as u32 {
                return Err(crate::error::GloveLinkError::Config(
                    toml::de::Error::custom(format!(
                        "select_lines must be between 1 and {}", MAX_SELECT_LINES
                    ))
                ));
            }

            let fingers = if self.fingers.enable_thumb { 5 } else { 4 };
            let mux_channels_needed = fingers * (self.fingers.knuckle_count - 1);
            if mux_channels_needed > (1 << self.multiplexer.select_lines) {
                return Err(crate::error::GloveLinkError::Config(
                    toml::de::Error::custom(format!(
                        "{} select lines address {} channels but the finger topology needs {}",
                        self.multiplexer.select_lines,
                        1 << self.multiplexer.select_lines,
                        mux_channels_needed
                    ))
                ));
            }
        }

        // Validate journal
        if self.journal.enabled {
            if self.journal.log_dir.is_empty() {
                return Err(crate::error::GloveLinkError::Config(
                    toml::de::Error::custom("journal log_dir cannot be empty when enabled")
                ));
            }

            if self.journal.max_records_per_file == 0 {
                return Err(crate::error::GloveLinkError::Config(
                    toml::de::Error::custom("max_records_per_file must be greater than 0")
                ));
            }

            if self.journal.max_files_to_keep == 0 {
                return Err(crate::error::GloveLinkError::Config(
                    toml::de::Error::custom("max_files_to_keep must be greater than 0")
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.glove.analog_max(), 4095);
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.fingers.knuckle_count, 1);
        assert_eq!(config.serial.baud_rate, 115200);
        assert_eq!(config.calibration.loops, -1);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyUSB0"
baud_rate = 921600

[fingers]
knuckle_count = 2
enable_splay = true

[multiplexer]
enabled = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.fingers.knuckle_count, 2);
        assert!(config.fingers.enable_splay);
        // Untouched sections keep their defaults.
        assert!(config.joystick.enabled);
    }

    #[test]
    fn test_adc_bits_bounds() {
        let mut config = Config::default();
        config.glove.adc_bits = 7;
        assert!(config.validate().is_err());

        config.glove.adc_bits = 10;
        assert!(config.validate().is_ok());
        assert_eq!(config.glove.analog_max(), 1023);

        config.glove.adc_bits = 17;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_knuckle_count_bounds() {
        let mut config = Config::default();
        config.multiplexer.enabled = true;

        config.fingers.knuckle_count = 0;
        assert!(config.validate().is_err());

        config.fingers.knuckle_count = 3;
        assert!(config.validate().is_ok());

        config.fingers.knuckle_count = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multi_knuckle_requires_multiplexer() {
        let mut config = Config::default();
        config.fingers.knuckle_count = 2;
        assert!(config.validate().is_err());

        config.multiplexer.enabled = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mux_capacity_checked_against_topology() {
        let mut config = Config::default();
        config.multiplexer.enabled = true;
        config.fingers.knuckle_count = 3;

        // Ten extra knuckles do not fit through 3 select lines.
        config.multiplexer.select_lines = 3;
        assert!(config.validate().is_err());

        config.multiplexer.select_lines = 4;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pinch_requires_thumb() {
        let mut config = Config::default();
        config.fingers.enable_thumb = false;
        assert!(config.validate().is_err());

        config.gestures.pinch = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_coupling_window_ordering() {
        let mut config = Config::default();
        config.fingers.coupling_start = 0.6;
        config.fingers.coupling_end = 0.5;
        assert!(config.validate().is_err());

        config.fingers.coupling_start = -0.1;
        config.fingers.coupling_end = 0.5;
        assert!(config.validate().is_err());

        config.fingers.coupling_start = 0.2;
        config.fingers.coupling_end = 0.8;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_calibration_loops_zero_rejected() {
        let mut config = Config::default();
        config.calibration.loops = 0;
        assert!(config.validate().is_err());

        config.calibration.loops = 200;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_deadzone() {
        let mut config = Config::default();
        config.joystick.deadzone = 0.6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 123456;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_journal_limits_checked_only_when_enabled() {
        let mut config = Config::default();
        config.journal.max_records_per_file = 0;
        assert!(config.validate().is_ok());

        config.journal.enabled = true;
        assert!(config.validate().is_err());

        config.journal.max_records_per_file = 100;
        config.journal.log_dir = String::new();
        assert!(config.validate().is_err());
    }
}
