use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PipelineStart { total: usize },
    PipelineFinish,

    PhaseStart { index: usize, title: String },
    PhaseFinish {
        index: usize,
        title: String,
        elapsed: Duration,
    },
    PhaseFailed { index: usize, title: String },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

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
    use std::sync::{Arc, Mutex};

    #[test]
    fn reporter_without_callback_is_silent() {
        ProgressReporter::new().report(Progress::PipelineFinish);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p| {
            sink.lock().unwrap().push(p);
        }));

        reporter.report(Progress::PipelineStart { total: 2 });
        reporter.report(Progress::Message("hello".to_string()));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                Progress::PipelineStart { total: 2 },
                Progress::Message("hello".to_string())
            ]
        );
    }
}
