pub mod pipeline;
pub mod scheduler;
pub mod service;
pub mod stages;
pub mod state;

pub use pipeline::{Pipeline, DEFAULT_LLM_CONCURRENCY};
pub use scheduler::{AggregationScheduler, SchedulerHandle, DEFAULT_AGGREGATION_INTERVAL};
pub use service::{NewsService, ResponseCache, DEFAULT_RESPONSE_TTL};
pub use state::{PipelineRunState, PipelineStage, RunStatus};

pub mod prelude {
    pub use super::{AggregationScheduler, NewsService, Pipeline, PipelineRunState, PipelineStage, RunStatus};
    pub use nf_core::{Error, Result};
}
