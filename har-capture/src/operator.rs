//! Operator-facing outputs: the visual indicator and text notices
//!
//! The indicator mirrors the single RGB status light of the capture rig:
//! capture colour while a window records, the pending class colour while a
//! label is being chosen, off otherwise. Notices are the prompts and
//! confirmations printed for the operator; they never go through `tracing`
//! so they stay readable when logging is verbose.

use har_common::{ClassId, Direction, Label, Rgb};
use std::fmt;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

/// Change to the visual indicator requested by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indication {
    Show(Rgb),
    Clear,
}

/// Single-colour status light
pub trait Indicator {
    fn show(&mut self, colour: Rgb);
    fn clear(&mut self);

    fn apply(&mut self, indication: Indication) {
        match indication {
            Indication::Show(colour) => self.show(colour),
            Indication::Clear => self.clear(),
        }
    }
}

/// Indicator that reports colour changes through tracing
#[derive(Debug, Default)]
pub struct LogIndicator {
    current: Option<Rgb>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Indicator for LogIndicator {
    fn show(&mut self, colour: Rgb) {
        if self.current != Some(colour) {
            info!("Indicator: {}", colour);
            self.current = Some(colour);
        }
    }

    fn clear(&mut self) {
        if self.current.take().is_some() {
            info!("Indicator: off");
        }
    }
}

/// Indicator painted as a 24-bit colour block on stderr
#[derive(Debug, Default)]
pub struct TerminalIndicator {
    lit: bool,
}

impl TerminalIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    fn paint(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        if let Err(e) = write!(stderr, "\r{}", text).and_then(|_| stderr.flush()) {
            debug!("Indicator write failed: {}", e);
        }
    }
}

impl Indicator for TerminalIndicator {
    fn show(&mut self, colour: Rgb) {
        self.paint(&format!(
            "\x1b[48;2;{};{};{}m      \x1b[0m ",
            colour.r(),
            colour.g(),
            colour.b()
        ));
        self.lit = true;
    }

    fn clear(&mut self) {
        if self.lit {
            self.paint("\x1b[0m       ");
            self.lit = false;
        }
    }
}

/// Operator prompt or confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Idle and waiting for the start control
    Ready { start: Direction },

    CaptureStarted { duration: Duration },

    /// Capture finished; the operator must choose a class, confirm or skip
    AwaitingLabel {
        options: Vec<(ClassId, Direction)>,
        confirm: Direction,
        skip: Direction,
    },

    Selected(ClassId),

    /// Confirm pressed with no pending selection
    NothingSelected,

    Labeled(ClassId),
    Skipped,

    /// Operator interrupt discarded an unfinished window
    CaptureAborted,

    /// Inference mode classified a window
    Predicted(ClassId),

    Saved(Label),

    /// Label mode: one recorded row awaits a decision
    RowPrompt {
        position: usize,
        total: usize,
        /// `[Ax, Ay, Az, A_mag]`
        values: [f64; 4],
        options: Vec<(ClassId, Direction)>,
        skip: Vec<Direction>,
    },

    RowSaved(ClassId),
    RowSkipped,

    LabellingComplete {
        labelled: usize,
        skipped: usize,
        remaining: usize,
    },

    /// The record could not be persisted and is lost
    PersistenceFailed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Ready { start } => write!(f, "Ready. Press '{}' to capture a window.", start),
            Notice::CaptureStarted { duration } => {
                write!(f, "Capturing for {:.1} s...", duration.as_secs_f64())
            }
            Notice::AwaitingLabel {
                options,
                confirm,
                skip,
            } => {
                writeln!(f, "Capture complete. Select the activity:")?;
                for (class, direction) in options {
                    writeln!(f, "  {:<6} -> {}", direction, class.description())?;
                }
                write!(f, "Then press '{}' to confirm, or '{}' to skip.", confirm, skip)
            }
            Notice::Selected(class) => write!(f, "Selected: {}", class.description()),
            Notice::NothingSelected => write!(f, "Nothing selected to confirm."),
            Notice::Labeled(class) => write!(f, "Labeled as {}", class.description()),
            Notice::Skipped => write!(f, "Window skipped."),
            Notice::CaptureAborted => write!(f, "Capture aborted; window discarded."),
            Notice::Predicted(class) => write!(f, "Predicted: {}", class.description()),
            Notice::Saved(label) => write!(f, "Saved window (label {}).", label),
            Notice::RowPrompt {
                position,
                total,
                values,
                options,
                skip,
            } => {
                let [ax, ay, az, a_mag] = values;
                writeln!(f, "Sample {}/{}", position, total)?;
                writeln!(
                    f,
                    "Ax={:.3}, Ay={:.3}, Az={:.3}, A_mag={:.3}",
                    ax, ay, az, a_mag
                )?;
                for (class, direction) in options {
                    writeln!(f, "  {:<6} -> {}", direction, class.description())?;
                }
                let skip: Vec<String> = skip.iter().map(|d| format!("'{}'", d)).collect();
                write!(f, "Press {} to skip.", skip.join(" or "))
            }
            Notice::RowSaved(class) => write!(f, "Labeled as {}", class.description()),
            Notice::RowSkipped => write!(f, "Skipped this entry."),
            Notice::LabellingComplete {
                labelled,
                skipped,
                remaining: 0,
            } => write!(
                f,
                "All samples processed: {} labeled, {} skipped.",
                labelled, skipped
            ),
            Notice::LabellingComplete {
                labelled,
                skipped,
                remaining,
            } => write!(
                f,
                "Labelling stopped with {} samples left: {} labeled, {} skipped.",
                remaining, labelled, skipped
            ),
            Notice::PersistenceFailed(reason) => {
                write!(f, "Could not save record, it is lost: {}", reason)
            }
        }
    }
}

/// Destination for operator notices
pub trait Console {
    fn notice(&mut self, notice: &Notice);
}

/// Console printing notices to stdout
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn notice(&mut self, notice: &Notice) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", notice) {
            debug!("Console write failed: {}", e);
        }
    }
}
