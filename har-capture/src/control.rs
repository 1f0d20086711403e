//! Control-event sources and the per-tick event queue
//!
//! Sources push `ControlEvent`s into an unbounded channel from their own
//! thread; the tick loop drains everything pending at the start of each tick.
//! Draining never blocks, and events come out in the order they were sent.
//!
//! Keyboard input is read on a dedicated OS thread with blocking I/O, so a
//! pending read never holds up runtime shutdown.

use har_common::{ControlEvent, Direction};
use std::io::BufRead;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Producer half handed to control sources
pub type ControlSender = mpsc::UnboundedSender<ControlEvent>;

/// Consumer half owned by the tick loop
pub struct ControlQueue {
    rx: mpsc::UnboundedReceiver<ControlEvent>,
}

impl ControlQueue {
    pub fn channel() -> (ControlSender, ControlQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, ControlQueue { rx })
    }

    /// Take every event queued so far, in arrival order
    pub fn drain(&mut self) -> Vec<ControlEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the next event; `None` once every sender is gone and nothing is queued
    pub async fn next(&mut self) -> Option<ControlEvent> {
        self.rx.recv().await
    }
}

/// Parse one line of operator input into pressed events.
///
/// A blank line is `middle` (bare Enter confirms). Several tokens on one line
/// become several events in order, so `up m` selects and confirms within a
/// single tick. Unknown tokens are dropped.
pub fn parse_control_line(line: &str) -> Vec<ControlEvent> {
    if line.trim().is_empty() {
        return vec![ControlEvent::pressed(Direction::Middle)];
    }

    line.split_whitespace()
        .filter_map(|token| match token.parse::<Direction>() {
            Ok(direction) => Some(ControlEvent::pressed(direction)),
            Err(e) => {
                debug!("Dropping control input: {}", e);
                None
            }
        })
        .collect()
}

/// Forward control lines from `reader` until it closes or the queue is gone
pub fn forward_lines<R: BufRead>(reader: R, tx: ControlSender) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Control input error: {}", e);
                return;
            }
        };
        for event in parse_control_line(&line) {
            if tx.send(event).is_err() {
                debug!("Control queue closed, stopping input");
                return;
            }
        }
    }
    info!("Control input closed");
}

/// Spawn the keyboard control source reading stdin
pub fn spawn_stdin_source(tx: ControlSender) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("control-input".to_string())
        .spawn(move || forward_lines(std::io::stdin().lock(), tx))
}
