use crate::ui;
use dandelion::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::warn;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Drives one stage-level bar from pipeline progress events.
///
/// Stage separators and finish lines go to the output writer (stdout by
/// default) with the bar suspended, so they are written even when the bar
/// itself is hidden because stderr is not a terminal. The bar only redraws on
/// events, so output written by a stage's program is not interleaved with
/// spinner frames.
#[derive(Clone)]
pub struct CliProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
    out: SharedWriter,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        Self::with_targets(ProgressDrawTarget::stderr(), Box::new(std::io::stdout()))
    }

    fn with_targets(target: ProgressDrawTarget, out: Box<dyn Write + Send>) -> Self {
        let pb = ProgressBar::with_draw_target(Some(0), target)
            .with_style(Self::bar_style())
            .with_message("Initializing...");
        Self {
            pb: Arc::new(Mutex::new(pb)),
            out: Arc::new(Mutex::new(out)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();
        let out_clone = self.out.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb_guard) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };
            let emit = |text: String| {
                pb_guard.suspend(|| match out_clone.lock() {
                    Ok(mut out) => {
                        if let Err(e) = writeln!(out, "{}", text).and_then(|_| out.flush()) {
                            warn!("Failed to write progress output: {}", e);
                        }
                    }
                    Err(_) => warn!("Progress output mutex was poisoned."),
                });
            };

            match progress {
                Progress::PipelineStart { total } => {
                    pb_guard.reset();
                    pb_guard.set_length(total as u64);
                    pb_guard.set_position(0);
                }
                Progress::PhaseStart { title, .. } => {
                    emit(format!(
                        "\n{}\n",
                        ui::render_separator(&title, ui::DEFAULT_WIDTH)
                    ));
                    pb_guard.set_message(title);
                }
                Progress::PhaseFinish { title, elapsed, .. } => {
                    pb_guard.inc(1);
                    emit(format!("✓ {} ({:.1}s)", title, elapsed.as_secs_f64()));
                }
                Progress::PhaseFailed { title, .. } => {
                    pb_guard.abandon_with_message(format!("✗ {}", title));
                }
                Progress::PipelineFinish => {
                    pb_guard.finish_with_message("✓ Done");
                }
                Progress::Message(msg) => {
                    emit(format!("  {}", msg));
                }
            }
        })
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<30} [{bar:30.cyan/blue}] {pos}/{len} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn hidden_handler() -> (CliProgressHandler, Captured) {
        let captured = Captured::default();
        let handler = CliProgressHandler::with_targets(
            ProgressDrawTarget::hidden(),
            Box::new(captured.clone()),
        );
        (handler, captured)
    }

    #[test]
    fn handler_initializes_in_a_clean_state() {
        let (handler, _) = hidden_handler();
        let pb = handler.pb.lock().unwrap();
        assert_eq!(pb.length(), Some(0));
        assert_eq!(pb.position(), 0);
        assert!(!pb.is_finished());
    }

    #[test]
    fn callback_tracks_phases_through_the_pipeline() {
        let (handler, _) = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PipelineStart { total: 6 });
        assert_eq!(handler.pb.lock().unwrap().length(), Some(6));

        callback(Progress::PhaseStart {
            index: 0,
            title: "1. Creating GSM".to_string(),
        });
        assert_eq!(handler.pb.lock().unwrap().message(), "1. Creating GSM");

        callback(Progress::Message("Running dandelion-create-gsm".to_string()));
        callback(Progress::PhaseFinish {
            index: 0,
            title: "1. Creating GSM".to_string(),
            elapsed: Duration::from_millis(1500),
        });
        assert_eq!(handler.pb.lock().unwrap().position(), 1);

        callback(Progress::PipelineFinish);
        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
    }

    #[test]
    fn stage_lines_are_written_while_the_bar_is_hidden() {
        let (handler, captured) = hidden_handler();
        assert!(handler.pb.lock().unwrap().is_hidden());
        let callback = handler.get_callback();

        callback(Progress::PipelineStart { total: 6 });
        callback(Progress::PhaseStart {
            index: 0,
            title: "1. Creating GSM".to_string(),
        });
        callback(Progress::Message("Running dandelion-create-gsm".to_string()));
        callback(Progress::PhaseFinish {
            index: 0,
            title: "1. Creating GSM".to_string(),
            elapsed: Duration::from_millis(1500),
        });

        let text = captured.text();
        assert!(text.contains(&ui::render_separator("1. Creating GSM", ui::DEFAULT_WIDTH)));
        assert!(text.contains("  Running dandelion-create-gsm"));
        assert!(text.contains("✓ 1. Creating GSM (1.5s)"));
    }

    #[test]
    fn failed_phase_abandons_the_bar() {
        let (handler, _) = hidden_handler();
        let callback = handler.get_callback();

        callback(Progress::PipelineStart { total: 6 });
        callback(Progress::PhaseFailed {
            index: 3,
            title: "4. Running NEB".to_string(),
        });

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✗ 4. Running NEB");
        assert_eq!(pb.position(), 0);
    }

    #[test]
    fn callback_is_thread_safe() {
        let (handler, captured) = hidden_handler();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PipelineStart { total: 1 });
            callback(Progress::PhaseStart {
                index: 0,
                title: "Thread Test".to_string(),
            });
            callback(Progress::PipelineFinish);
        })
        .join()
        .unwrap();

        let pb = handler.pb.lock().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.message(), "✓ Done");
        assert!(captured.text().contains("Thread Test"));
    }
}
