pub mod archive;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod link_index;
pub mod link_rewriter;
pub mod pipeline;
pub mod probe;
pub mod revalidate;
pub mod scheduler;
pub mod throttle;
pub mod utils;

pub use archive::{ArchiveResolver, SnapshotUrls};
pub use config::{LinkCheckConfig, LinkCheckConfigBuilder};
pub use error::{LinkrotError, LinkrotResult};
pub use heuristics::{Candidate, CandidateKind, HeuristicResolver, HostRule, variants_for};
pub use link_index::{ExtractionStats, LinkIndex, LinkStatus, Occurrence, UrlExtractor, UrlRecord};
pub use link_rewriter::{
    ApplySummary, FileCache, ReplacementAction, ReplacementApplier, ReplacementLog,
    ReplacementNote, ReplacementPair,
};
pub use pipeline::{LinkPipeline, LivenessReport, ReplacementReport, RunSummary};
pub use probe::{ErrorKind, FailureCategory, HttpProber, LivenessProbe, ProbeOutcome};
pub use revalidate::{RevalidationEntry, RevalidationRun, Revalidator, Verdict};
pub use scheduler::{
    Checkpoint, CheckpointWriter, LivenessScheduler, LogProgress, NoOpProgress,
    ProgressReporter, SchedulerSummary, WorkerPool,
};
pub use throttle::{RequestGate, RetryPolicy, retry_with_backoff};
