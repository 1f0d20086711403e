//! Configuration loading and config file resolution
//!
//! All configuration is static: loaded once at startup, never reloaded.
//!
//! # Config file resolution order
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. User config directory (`~/.config/har-capture/config.toml` on Linux)
//! 4. No file: compiled defaults
//!
//! A resolved path that does not exist is not fatal: a warning is logged and
//! the compiled defaults are used. A file that exists but does not parse is
//! fatal.

use crate::classes::{ClassId, ClassMap, Rgb};
use crate::events::Direction;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "HAR_CONFIG";

/// Application directory name under the platform config/data dirs
pub const APP_DIR_NAME: &str = "har-capture";

/// Bootstrap configuration loaded from TOML file
///
/// Every field has a built-in default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Nominal sensor sampling rate in Hz (also the resampling target rate)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: f64,

    /// Capture window length in seconds
    #[serde(default = "default_window_duration")]
    pub window_duration: f64,

    /// Directory for the labeled-window dataset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Dataset file name inside `output_dir`
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Output file name inside `output_dir` for labelled recorded rows
    #[serde(default = "default_labelled_file")]
    pub labelled_file: String,

    /// Write skipped windows to the dataset (label `skip`)
    #[serde(default)]
    pub persist_skipped: bool,

    /// Indicator colour while a window is being captured
    #[serde(default = "default_capture_colour")]
    pub capture_colour: Rgb,

    #[serde(default)]
    pub controls: ControlsConfig,

    /// Per-class control direction and indicator colour.
    ///
    /// If the table is present it must list all four classes.
    #[serde(default = "default_class_bindings")]
    pub classes: ClassMap<ClassBinding>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sensor: SensorConfig,

    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Protocol control bindings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlsConfig {
    /// Starts a capture window while idle
    #[serde(default = "default_start")]
    pub start: Direction,

    /// Confirms the pending label selection
    #[serde(default = "default_confirm")]
    pub confirm: Direction,

    /// Skips labeling the captured window
    #[serde(default = "default_skip")]
    pub skip: Direction,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            start: default_start(),
            confirm: default_confirm(),
            skip: default_skip(),
        }
    }
}

/// How the operator selects a class and how the selection is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClassBinding {
    pub direction: Direction,
    pub colour: Rgb,
}

impl ClassBinding {
    pub fn default_for(class: ClassId) -> Self {
        Self {
            direction: class.default_direction(),
            colour: class.default_colour(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Which sensor driver feeds the sample source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SensorDriverKind {
    /// Synthetic IMU signal
    #[default]
    Simulated,
    /// Play back raw readings from a CSV file
    Replay,
}

/// Sensor driver configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SensorConfig {
    #[serde(default)]
    pub driver: SensorDriverKind,

    /// CSV of raw readings (`ax,ay,az,gx,gy,gz`) for the replay driver
    #[serde(default)]
    pub replay_path: Option<PathBuf>,

    /// Seed for the simulated driver's noise
    #[serde(default)]
    pub seed: u64,

    /// Noise amplitude for the simulated driver
    #[serde(default)]
    pub noise: f64,

    /// Simulated driver fails every N-th read (0 = never)
    #[serde(default)]
    pub dropout_every: u64,
}

/// Inference mode configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct InferenceConfig {
    /// Pretrained model (JSON)
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            window_duration: default_window_duration(),
            output_dir: None,
            output_file: default_output_file(),
            labelled_file: default_labelled_file(),
            persist_skipped: false,
            capture_colour: default_capture_colour(),
            controls: ControlsConfig::default(),
            classes: default_class_bindings(),
            logging: LoggingConfig::default(),
            sensor: SensorConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Dataset directory, falling back to the platform data directory
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    /// Full path of the dataset file
    pub fn output_path(&self) -> PathBuf {
        self.resolved_output_dir().join(&self.output_file)
    }

    /// Full path of the labelled-row file written by `label` mode
    pub fn labelled_path(&self) -> PathBuf {
        self.resolved_output_dir().join(&self.labelled_file)
    }
}

fn default_sample_rate() -> f64 {
    25.0
}

fn default_window_duration() -> f64 {
    2.0
}

fn default_output_file() -> String {
    "windows.csv".to_string()
}

fn default_labelled_file() -> String {
    "labelled_data.csv".to_string()
}

fn default_capture_colour() -> Rgb {
    Rgb::GREEN
}

fn default_start() -> Direction {
    Direction::Middle
}

fn default_confirm() -> Direction {
    Direction::Middle
}

fn default_skip() -> Direction {
    Direction::Aux
}

fn default_class_bindings() -> ClassMap<ClassBinding> {
    ClassMap::from_fn(ClassBinding::default_for)
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Get OS-dependent default dataset directory
fn default_output_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./har_data"))
}

/// Resolve which config file to load, if any
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: User config directory
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join("config.toml"))
        .filter(|path| path.exists())
}

/// Load configuration from `path`, or compiled defaults
pub fn load_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} does not exist, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content, path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse TOML text; `origin` is used only in error messages
pub fn parse_config(content: &str, origin: &Path) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|source| Error::Toml {
        path: origin.display().to_string(),
        source,
    })
}
