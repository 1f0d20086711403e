//! Offline labelling of recorded rows
//!
//! Walks a recorded accelerometer file one row at a time. For each row the
//! operator is prompted and the first decisive press settles it: a class
//! direction labels the row, the skip or confirm direction drops it. There is
//! no selection step here, so a single press is final.
//!
//! The session ends when every row is settled, when the control source closes,
//! or on operator interrupt. Rows already labelled stay on disk.

mod rows;

pub use rows::{load_rows, read_rows, LabelledRow, LabelledRowSink, RecordedRow, LABELLED_HEADER};

use crate::config::Settings;
use crate::control::ControlQueue;
use crate::operator::{Console, Indicator, Notice};
use crate::output::RecordSink;
use har_common::{ClassId, ControlEvent, Direction, Label};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Totals reported when a labelling session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabellingSummary {
    pub labelled: usize,
    pub skipped: usize,

    /// Labelled but not persisted
    pub lost: usize,

    /// Rows never settled because the session stopped early
    pub remaining: usize,
}

/// Interactive labeller for recorded rows
pub struct RowLabeller<S> {
    settings: Settings,
    sink: S,
    indicator: Box<dyn Indicator>,
    console: Box<dyn Console>,
}

impl<S: RecordSink<LabelledRow>> RowLabeller<S> {
    pub fn new(
        settings: Settings,
        sink: S,
        indicator: Box<dyn Indicator>,
        console: Box<dyn Console>,
    ) -> Self {
        Self {
            settings,
            sink,
            indicator,
            console,
        }
    }

    /// What a control event does to the current row, if anything
    pub fn decide(&self, event: &ControlEvent) -> Option<Label> {
        if !event.is_pressed() {
            return None;
        }
        let controls = &self.settings.controls;
        if event.direction == controls.skip || event.direction == controls.confirm {
            return Some(Label::Skip);
        }
        self.settings
            .class_for_direction(event.direction)
            .map(Label::Class)
    }

    /// Label `rows` in order until done, the controls close or `shutdown` reads `true`
    pub async fn run(
        mut self,
        rows: Vec<RecordedRow>,
        controls: &mut ControlQueue,
        mut shutdown: watch::Receiver<bool>,
    ) -> (LabellingSummary, S) {
        let total = rows.len();
        info!("Labelling {} rows", total);

        let mut summary = LabellingSummary::default();
        let mut watching = true;

        for (index, row) in rows.into_iter().enumerate() {
            if *shutdown.borrow() {
                info!("Shutdown requested");
                summary.remaining = total - index;
                break;
            }

            self.console.notice(&Notice::RowPrompt {
                position: index + 1,
                total,
                values: row.values(),
                options: self.options(),
                skip: self.skip_directions(),
            });

            let label = match self.next_label(controls, &mut shutdown, &mut watching).await {
                Some(label) => label,
                None => {
                    summary.remaining = total - index;
                    break;
                }
            };

            match label {
                Label::Skip => {
                    self.indicator.clear();
                    self.console.notice(&Notice::RowSkipped);
                    summary.skipped += 1;
                }
                Label::Class(class) => {
                    self.indicator.show(self.settings.colour(class));
                    match self.sink.write(&LabelledRow { row, class }) {
                        Ok(_) => {
                            self.console.notice(&Notice::RowSaved(class));
                            summary.labelled += 1;
                        }
                        Err(e) => {
                            warn!("Labelled row lost: {}", e);
                            self.console
                                .notice(&Notice::PersistenceFailed(e.to_string()));
                            summary.lost += 1;
                        }
                    }
                }
            }
        }

        self.indicator.clear();
        if let Err(e) = self.sink.flush() {
            error!("Final flush failed: {}", e);
        }
        self.console.notice(&Notice::LabellingComplete {
            labelled: summary.labelled,
            skipped: summary.skipped,
            remaining: summary.remaining,
        });
        info!(
            "Labelling stopped: {} labelled, {} skipped, {} lost, {} remaining",
            summary.labelled, summary.skipped, summary.lost, summary.remaining
        );

        (summary, self.sink)
    }

    /// Wait for a decisive press; `None` means stop
    async fn next_label(
        &self,
        controls: &mut ControlQueue,
        shutdown: &mut watch::Receiver<bool>,
        watching: &mut bool,
    ) -> Option<Label> {
        loop {
            tokio::select! {
                changed = shutdown.changed(), if *watching => match changed {
                    Ok(()) if *shutdown.borrow() => {
                        info!("Shutdown requested");
                        return None;
                    }
                    Ok(()) => {}
                    // Sender gone: no interrupt can arrive any more
                    Err(_) => *watching = false,
                },
                event = controls.next() => {
                    let Some(event) = event else {
                        info!("Control input closed");
                        return None;
                    };
                    match self.decide(&event) {
                        Some(label) => return Some(label),
                        None => debug!("Ignoring {:?} while labelling", event),
                    }
                }
            }
        }
    }

    fn options(&self) -> Vec<(ClassId, Direction)> {
        self.settings
            .classes
            .iter()
            .map(|(class, binding)| (class, binding.direction))
            .collect()
    }

    fn skip_directions(&self) -> Vec<Direction> {
        let controls = &self.settings.controls;
        vec![controls.skip, controls.confirm]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::operator::LogIndicator;
    use crate::output::Delivery;
    use har_common::config::TomlConfig;
    use har_common::Action;

    struct Discard;

    impl RecordSink<LabelledRow> for Discard {
        fn write(&mut self, _record: &LabelledRow) -> Result<Delivery> {
            Ok(Delivery::Discarded)
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct Silent;

    impl Console for Silent {
        fn notice(&mut self, _notice: &Notice) {}
    }

    fn labeller() -> RowLabeller<Discard> {
        let settings = Settings::from_toml(&TomlConfig::default()).unwrap();
        RowLabeller::new(
            settings,
            Discard,
            Box::new(LogIndicator::new()),
            Box::new(Silent),
        )
    }

    #[test]
    fn test_class_directions_label() {
        let labeller = labeller();
        for class in ClassId::ALL {
            let event = ControlEvent::pressed(class.default_direction());
            assert_eq!(labeller.decide(&event), Some(Label::Class(class)));
        }
    }

    #[test]
    fn test_skip_and_confirm_both_skip() {
        let labeller = labeller();
        assert_eq!(
            labeller.decide(&ControlEvent::pressed(Direction::Aux)),
            Some(Label::Skip)
        );
        assert_eq!(
            labeller.decide(&ControlEvent::pressed(Direction::Middle)),
            Some(Label::Skip)
        );
    }

    #[test]
    fn test_only_presses_count() {
        let labeller = labeller();
        for action in [Action::Released, Action::Held] {
            let event = ControlEvent::new(Direction::Up, action);
            assert_eq!(labeller.decide(&event), None);
        }
    }
}
