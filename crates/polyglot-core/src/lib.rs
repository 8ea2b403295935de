pub mod cache;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod preprocess;
pub mod rate_limit;
pub mod sink;
pub mod worker;

pub use cache::{TranslationCache, TranslationKey};
pub use context::PipelineContext;
pub use dispatcher::{Dispatcher, ProgressReport, RunSummary, format_minutes};
pub use error::{CacheError, InputError, KeyError, PipelineError, SinkError};
pub use rate_limit::RateLimiter;
pub use sink::OutputSink;

#[cfg(test)]
mod tests;
