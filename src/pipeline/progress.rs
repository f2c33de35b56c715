use super::core::AnalysisStage;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Started {
        stage: AnalysisStage,
        step: usize,
        total: usize,
    },
    Finished {
        stage: AnalysisStage,
        elapsed: Duration,
    },
}

/// Receives stage notifications in execution order.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Logs `Step n/N: ...` lines.
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { stage, step, total } => {
                info!("Step {}/{}: {}", step, total, stage.description());
            }
            ProgressEvent::Finished { stage, elapsed } => {
                info!("{} finished in {}us", stage.as_str(), elapsed.as_micros());
            }
        }
    }
}

impl<F> ProgressReporter for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Forwards events to an async consumer; a closed receiver is ignored.
pub struct ChannelProgress {
    sender: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(sender: UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressReporter for ChannelProgress {
    fn report(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}
