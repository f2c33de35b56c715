pub mod core;
pub mod orchestrator;
pub mod progress;
pub mod service;
pub mod stage_timings;

pub use self::core::{AnalysisResult, AnalysisStage};
pub use orchestrator::{CoralAnalysisOrchestrator, OrchestratorBuilder};
pub use progress::{ChannelProgress, NoopProgress, ProgressEvent, ProgressReporter, TracingProgress};
pub use service::CoralAnalysisService;
pub use stage_timings::StageTimings;
