use super::config::{EffectiveConfiguration, Resolver};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use super::registry::PhaseRegistry;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Position of the sequencer within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Pending(usize),
    Running(usize),
    Done(usize),
    Complete,
    Aborted(usize),
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Pending(i) => write!(f, "PENDING[{}]", i),
            PipelineState::Running(i) => write!(f, "RUNNING[{}]", i),
            PipelineState::Done(i) => write!(f, "DONE[{}]", i),
            PipelineState::Complete => f.write_str("COMPLETE"),
            PipelineState::Aborted(i) => write!(f, "ABORTED[{}]", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseRecord {
    pub title: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineReport {
    pub phases: Vec<PhaseRecord>,
}

impl PipelineReport {
    pub fn total_elapsed(&self) -> Duration {
        self.phases.iter().map(|p| p.elapsed).sum()
    }
}

/// A phase's configuration as it would be handed to the entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPhase {
    pub key: String,
    pub title: String,
    pub config: EffectiveConfiguration,
}

/// Runs the phases of a registry one after another.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    resolver: Resolver,
    pause: Duration,
}

impl Sequencer {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            pause: Duration::ZERO,
        }
    }

    /// Waits this long before every phase except the first.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Resolves and invokes every phase in registry order.
    ///
    /// The first failure, whether in resolution or inside a phase, aborts the
    /// run; no later phase is resolved or invoked.
    pub fn run_all(
        &self,
        registry: &PhaseRegistry,
        reporter: &ProgressReporter,
    ) -> Result<PipelineReport, EngineError> {
        let mut report = PipelineReport::default();
        let mut state = PipelineState::Pending(0);
        reporter.report(Progress::PipelineStart {
            total: registry.len(),
        });

        for (index, descriptor) in registry.iter().enumerate() {
            if index > 0 && !self.pause.is_zero() {
                std::thread::sleep(self.pause);
            }
            transition(&mut state, PipelineState::Pending(index));

            let title = descriptor.title().to_string();
            reporter.report(Progress::PhaseStart {
                index,
                title: title.clone(),
            });
            info!(phase = title.as_str(), "Starting phase {}/{}.", index + 1, registry.len());

            let config = match self
                .resolver
                .resolve(&descriptor.phase().schema(), descriptor.overrides())
            {
                Ok(config) => config,
                Err(source) => {
                    transition(&mut state, PipelineState::Aborted(index));
                    error!(
                        phase = title.as_str(),
                        "Configuration could not be resolved: {}", source
                    );
                    reporter.report(Progress::PhaseFailed {
                        index,
                        title: title.clone(),
                    });
                    return Err(EngineError::SchemaResolution {
                        phase: title,
                        source,
                    });
                }
            };
            debug!(phase = title.as_str(), ?config, "Effective configuration.");

            transition(&mut state, PipelineState::Running(index));
            let started = Instant::now();
            if let Err(source) = descriptor.phase().run(config, reporter) {
                transition(&mut state, PipelineState::Aborted(index));
                error!(phase = title.as_str(), "Phase failed: {}", source);
                reporter.report(Progress::PhaseFailed {
                    index,
                    title: title.clone(),
                });
                return Err(EngineError::PhaseExecution {
                    phase: title,
                    source,
                });
            }
            let elapsed = started.elapsed();
            transition(&mut state, PipelineState::Done(index));

            info!(
                phase = title.as_str(),
                elapsed_secs = elapsed.as_secs_f64(),
                "Phase finished."
            );
            reporter.report(Progress::PhaseFinish {
                index,
                title: title.clone(),
                elapsed,
            });
            report.phases.push(PhaseRecord { title, elapsed });
        }

        transition(&mut state, PipelineState::Complete);
        reporter.report(Progress::PipelineFinish);
        Ok(report)
    }

    /// Resolves every phase without invoking any of them.
    pub fn plan(&self, registry: &PhaseRegistry) -> Result<Vec<PlannedPhase>, EngineError> {
        registry
            .iter()
            .map(|descriptor| {
                let config = self
                    .resolver
                    .resolve(&descriptor.phase().schema(), descriptor.overrides())
                    .map_err(|source| EngineError::SchemaResolution {
                        phase: descriptor.title().to_string(),
                        source,
                    })?;
                Ok(PlannedPhase {
                    key: descriptor.key().to_string(),
                    title: descriptor.title().to_string(),
                    config,
                })
            })
            .collect()
    }
}

fn transition(state: &mut PipelineState, next: PipelineState) {
    debug!(from = %state, to = %next, "Pipeline state transition.");
    *state = next;
}

/// Runs a registry with the default [`Sequencer`].
pub fn run_all(
    registry: &PhaseRegistry,
    reporter: &ProgressReporter,
) -> Result<PipelineReport, EngineError> {
    Sequencer::default().run_all(registry, reporter)
}
