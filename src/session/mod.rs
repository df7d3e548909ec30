//! Entry modes: replay the action log into a still image or a timelapse video.
//!
//! Both modes share [`replay`], which walks the source once in order, applies every action to
//! the canvas and hands drawable actions to a per-mode callback.

/// Still-image mode.
pub mod composite;
/// Frame emitter state machine.
pub mod emitter;
/// Video mode.
pub mod timelapse;

use std::ops::ControlFlow;

use chrono::{DateTime, Utc};

use crate::action::{ApplyOutcome, DrawAction, apply};
use crate::canvas::Canvas;
use crate::foundation::error::PlacelapseResult;
use crate::progress::Progress;
use crate::source::ActionSource;

/// Action counters for one replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Records the source reported up front.
    pub actions_total: u64,
    /// Records actually consumed (less than the total when the run was cut short).
    pub actions_read: u64,
    /// Actions that changed at least one pixel.
    pub painted: u64,
    /// Valid actions whose rectangle fell entirely outside the canvas.
    pub clipped: u64,
    /// Actions missing a point, coordinate or color.
    pub skipped: u64,
    /// `true` when the per-action callback stopped the replay early.
    pub aborted: bool,
}

impl RunStats {
    /// Actions that count toward the frame cadence.
    pub fn drawable(&self) -> u64 {
        self.painted + self.clipped
    }

    /// The source ran out before (or after) the count it reported. Not set for aborted runs.
    pub fn count_mismatch(&self) -> bool {
        !self.aborted && self.actions_read != self.actions_total
    }

    fn record(&mut self, outcome: ApplyOutcome) {
        self.actions_read += 1;
        match outcome {
            ApplyOutcome::Painted(_) => self.painted += 1,
            ApplyOutcome::Clipped => self.clipped += 1,
            ApplyOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Apply every action from `source` to `canvas`, oldest first.
///
/// `on_drawable` runs after each painted or clipped action with the updated canvas; returning
/// `ControlFlow::Break` stops the replay and marks the stats as aborted. Source errors are fatal.
pub fn replay<F>(
    source: &mut dyn ActionSource,
    total: u64,
    canvas: &mut Canvas,
    progress: &mut dyn Progress,
    mut on_drawable: F,
) -> PlacelapseResult<RunStats>
where
    F: FnMut(&Canvas, &DrawAction) -> PlacelapseResult<ControlFlow<()>>,
{
    let mut stats = RunStats {
        actions_total: total,
        ..RunStats::default()
    };
    let mut order = OrderCheck::default();

    progress.start(total);
    let result = (|| -> PlacelapseResult<()> {
        for item in source.actions()? {
            let action = item?;
            order.observe(stats.actions_read, action.create_at.as_ref());

            let outcome = apply(canvas, &action);
            stats.record(outcome);
            progress.advance(1);

            if outcome.is_drawable() && on_drawable(&*canvas, &action)?.is_break() {
                stats.aborted = true;
                break;
            }
        }
        Ok(())
    })();
    progress.finish();
    result?;

    if stats.count_mismatch() {
        tracing::warn!(
            expected = total,
            read = stats.actions_read,
            "source yielded a different number of actions than it reported"
        );
    }
    Ok(stats)
}

/// Warns once if the stream is not in ascending `create_at` order.
#[derive(Default)]
struct OrderCheck {
    last: Option<DateTime<Utc>>,
    warned: bool,
}

impl OrderCheck {
    fn observe(&mut self, index: u64, ts: Option<&DateTime<Utc>>) {
        let Some(ts) = ts else {
            return;
        };
        if let Some(last) = self.last
            && *ts < last
            && !self.warned
        {
            tracing::warn!(
                index,
                previous = %last,
                current = %ts,
                "actions are not in chronological order; overlaps may resolve differently"
            );
            self.warned = true;
        }
        self.last = Some(*ts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Rgb8;
    use crate::progress::NoProgress;
    use crate::source::VecSource;

    fn canvas() -> Canvas {
        Canvas::filled(4, 4, Rgb8::WHITE).unwrap()
    }

    #[test]
    fn counts_every_outcome() {
        let mut src = VecSource::new(vec![
            DrawAction::rect(0, 0, 1, 1, "#000"),
            DrawAction::rect(10, 10, 1, 1, "#000"),
            DrawAction::default(),
        ]);
        let mut c = canvas();
        let mut seen = 0;
        let stats = replay(&mut src, 3, &mut c, &mut NoProgress, |_, _| {
            seen += 1;
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();

        assert_eq!(seen, 2);
        assert_eq!(stats.painted, 1);
        assert_eq!(stats.clipped, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.actions_read, 3);
        assert_eq!(stats.drawable(), 2);
        assert!(!stats.aborted);
    }

    #[test]
    fn break_stops_the_replay() {
        let mut src = VecSource::new(vec![
            DrawAction::rect(0, 0, 1, 1, "#000"),
            DrawAction::rect(1, 0, 1, 1, "#000"),
        ]);
        let mut c = canvas();
        let stats = replay(&mut src, 2, &mut c, &mut NoProgress, |_, _| {
            Ok(ControlFlow::Break(()))
        })
        .unwrap();

        assert!(stats.aborted);
        assert_eq!(stats.actions_read, 1);
        assert!(!stats.count_mismatch());
        assert_eq!(c.pixel(1, 0), Some(Rgb8::WHITE));
    }

    #[test]
    fn short_source_is_a_count_mismatch() {
        let mut src = VecSource::new(vec![DrawAction::rect(0, 0, 1, 1, "#000")]);
        let mut c = canvas();
        let stats = replay(&mut src, 5, &mut c, &mut NoProgress, |_, _| {
            Ok(ControlFlow::Continue(()))
        })
        .unwrap();
        assert!(stats.count_mismatch());
    }

    #[test]
    fn callback_errors_propagate() {
        let mut src = VecSource::new(vec![DrawAction::rect(0, 0, 1, 1, "#000")]);
        let mut c = canvas();
        let err = replay(&mut src, 1, &mut c, &mut NoProgress, |_, _| {
            Err(crate::PlacelapseError::encode("boom"))
        })
        .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
