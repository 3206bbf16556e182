/// Progress events emitted while a pipeline run advances.
///
/// The training workflow brackets each stage of a run (loading, splitting,
/// normalization, the per-family searches) in `StageStart`/`StageFinish` and
/// wraps its counted loops (records featurized, trials scored) in the
/// `Counted*` events, so a consumer can render a spinner for stages and a
/// bar for loops.
#[derive(Debug, Clone)]
pub enum Progress {
    StageStart { name: &'static str },
    StageFinish,

    /// A loop with a known step count begins: one step per record during
    /// featurization, one per trial during a grid search.
    CountedStart { total: u64 },
    CountedStep,
    CountedFinish,

    /// A free-form status line, e.g. which model family is being searched.
    Note(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional observer.
///
/// A reporter built without a callback discards every event, so pipeline
/// code reports unconditionally and stays silent when nobody listens.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn silent_reporter_discards_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::StageStart { name: "Loading" });
        reporter.report(Progress::CountedStep);
        reporter.report(Progress::StageFinish);
    }

    #[test]
    fn callback_sees_every_reported_event() {
        let steps = AtomicUsize::new(0);
        let stages = AtomicUsize::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
            Progress::CountedStep => {
                steps.fetch_add(1, Ordering::Relaxed);
            }
            Progress::StageStart { .. } => {
                stages.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }));

        reporter.report(Progress::StageStart { name: "Splitting" });
        reporter.report(Progress::CountedStart { total: 3 });
        for _ in 0..3 {
            reporter.report(Progress::CountedStep);
        }
        reporter.report(Progress::CountedFinish);
        drop(reporter);

        assert_eq!(steps.load(Ordering::Relaxed), 3);
        assert_eq!(stages.load(Ordering::Relaxed), 1);
    }
}
