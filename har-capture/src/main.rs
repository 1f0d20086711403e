//! HAR capture tool (har-capture) - Main entry point
//!
//! Two modes share the same tick loop:
//! - `capture` (default): operator-triggered windows, labeled through the
//!   select-then-confirm protocol and appended to the CSV dataset
//! - `infer`: back-to-back windows classified by a pretrained model, with
//!   the prediction shown on the indicator
//!
//! `label` needs no sensor: it walks a recorded file and labels it row by row.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use har_capture::control::{spawn_stdin_source, ControlQueue};
use har_capture::inference::{CentroidModel, InferencePipeline};
use har_capture::labelling::{load_rows, LabelledRowSink, RowLabeller};
use har_capture::operator::{Indicator, LogIndicator, StdoutConsole, TerminalIndicator};
use har_capture::output::{CsvSink, NullSink};
use har_capture::pipeline::{PipelineState, RunSummary, TickLoop};
use har_capture::sensor::{ReplayDriver, SensorDriver, SimulatedImu};
use har_capture::Settings;
use har_common::config::{
    load_config, resolve_config_path, LoggingConfig, SensorConfig, SensorDriverKind, TomlConfig,
    CONFIG_ENV_VAR,
};

/// Command-line arguments for har-capture
#[derive(Parser, Debug)]
#[command(name = "har-capture")]
#[command(about = "Windowed IMU capture and labeling for activity recognition")]
#[command(version)]
struct Args {
    /// Config file (overrides HAR_CONFIG and the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Sampling and resampling rate in Hz
    #[arg(long, global = true, env = "HAR_SAMPLE_RATE")]
    sample_rate: Option<f64>,

    /// Capture window length in seconds
    #[arg(long, global = true, env = "HAR_WINDOW_DURATION")]
    window_duration: Option<f64>,

    /// Directory for the labeled-window dataset
    #[arg(short, long, global = true, env = "HAR_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// How the status light is shown
    #[arg(long, global = true, value_enum, default_value_t = IndicatorKind::Terminal)]
    indicator: IndicatorKind,

    /// Stop after this many ticks
    #[arg(long, global = true)]
    ticks: Option<u64>,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone)]
enum Mode {
    /// Capture and label windows (default)
    Capture,

    /// Classify consecutive windows with a pretrained model
    Infer {
        /// Model file (overrides inference.model_path)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Label a recorded accelerometer file row by row
    Label {
        /// Recorded CSV with time, Ax, Ay, Az and A_mag columns
        input: PathBuf,

        /// Labelled output file (overrides output_dir/labelled_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum IndicatorKind {
    /// Colour block on the terminal
    Terminal,
    /// Colour changes in the log only
    Log,
}

impl Args {
    fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(duration) = self.window_duration {
            config.window_duration = duration;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = Some(dir.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let mut config =
        load_config(config_path.as_deref()).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);

    init_tracing(&config.logging)?;

    // Log build identification immediately after tracing init
    info!(
        "Starting har-capture v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using built-in defaults"),
    }

    let settings = Settings::from_toml(&config).context("Invalid configuration")?;
    info!(
        "Sampling at {} Hz, {:.2} s windows ({} samples per window)",
        settings.sample_rate,
        settings.window_duration.as_secs_f64(),
        settings.samples_per_window
    );

    let indicator: Box<dyn Indicator> = match args.indicator {
        IndicatorKind::Terminal => Box::new(TerminalIndicator::new()),
        IndicatorKind::Log => Box::new(LogIndicator::new()),
    };

    let (control_tx, controls) = ControlQueue::channel();
    spawn_stdin_source(control_tx).context("Failed to start control input")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        // Receiver gone means the loop already stopped
        let _ = shutdown_tx.send(true);
    });

    match args.command.clone().unwrap_or(Mode::Capture) {
        Mode::Capture => {
            let driver = build_driver(&config.sensor)?;
            let sink = CsvSink::open(
                &settings.output_path,
                settings.samples_per_window,
                settings.persist_skipped,
            )
            .with_context(|| format!("Failed to open dataset {}", settings.output_path.display()))?;

            let mut tick_loop = TickLoop::new(
                settings.tick_interval(),
                driver,
                PipelineState::new(settings.clone()),
                sink,
                indicator,
                Box::new(StdoutConsole),
                controls,
            );
            if let Some(ticks) = args.ticks {
                tick_loop = tick_loop.with_tick_limit(ticks);
            }
            log_session(&tick_loop.run(shutdown_rx).await.0);
        }
        Mode::Infer { model } => {
            let driver = build_driver(&config.sensor)?;
            let model_path = model
                .or_else(|| config.inference.model_path.clone())
                .context("No model given: pass --model or set inference.model_path")?;
            let model = CentroidModel::load(&model_path)
                .with_context(|| format!("Failed to load model {}", model_path.display()))?;

            let mut tick_loop = TickLoop::new(
                settings.tick_interval(),
                driver,
                InferencePipeline::new(settings.clone(), model),
                NullSink,
                indicator,
                Box::new(StdoutConsole),
                controls,
            );
            if let Some(ticks) = args.ticks {
                tick_loop = tick_loop.with_tick_limit(ticks);
            }
            log_session(&tick_loop.run(shutdown_rx).await.0);
        }
        Mode::Label { input, output } => {
            let rows = load_rows(&input)
                .with_context(|| format!("Failed to read recorded rows {}", input.display()))?;
            let output = output.unwrap_or_else(|| settings.labelled_path.clone());
            let sink = LabelledRowSink::open(&output)
                .with_context(|| format!("Failed to open {}", output.display()))?;

            let mut controls = controls;
            let labeller =
                RowLabeller::new(settings.clone(), sink, indicator, Box::new(StdoutConsole));
            let (summary, _) = labeller.run(rows, &mut controls, shutdown_rx).await;
            info!(
                "Labelling complete: {} rows labelled, {} skipped, {} lost, {} left",
                summary.labelled, summary.skipped, summary.lost, summary.remaining
            );
        }
    }

    Ok(())
}

fn log_session(summary: &RunSummary) {
    info!(
        "Session complete: {} windows saved, {} lost",
        summary.emitter.written, summary.emitter.lost
    );
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. With `logging.file` set, output
/// goes to that file instead of stderr.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("Invalid log level '{}'", logging.level))?,
    };

    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

fn build_driver(sensor: &SensorConfig) -> Result<Box<dyn SensorDriver>> {
    match sensor.driver {
        SensorDriverKind::Simulated => {
            info!(
                "Using simulated IMU (seed {}, noise {}, dropout every {})",
                sensor.seed, sensor.noise, sensor.dropout_every
            );
            Ok(Box::new(SimulatedImu::from_config(sensor)))
        }
        SensorDriverKind::Replay => {
            let path = sensor
                .replay_path
                .as_ref()
                .context("sensor.driver = \"replay\" requires sensor.replay_path")?;
            let driver = ReplayDriver::open(path)
                .with_context(|| format!("Failed to load replay file {}", path.display()))?;
            Ok(Box::new(driver))
        }
    }
}

/// Operator interrupt: Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
