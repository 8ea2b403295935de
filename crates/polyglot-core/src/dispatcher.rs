//! Fans units out to a bounded pool of workers and drives progress, checkpoints
//! and the final flush.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use kanal::{AsyncReceiver, AsyncSender};
use polyglot_config::pipeline::PipelineConfig;
use polyglot_types::TranslationUnit;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::worker::{preview, translate_unit};

/// Outcome of one unit, sent from a worker to the collector
enum Completion {
    Done,
    Failed {
        index: usize,
        unit: String,
        error: String,
    },
}

/// Throughput snapshot logged every `log_interval` completions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub done: usize,
    pub total: usize,
    pub translated: usize,
    pub units_per_sec: f64,
    pub eta: Duration,
}

impl ProgressReport {
    pub fn compute(done: usize, total: usize, translated: usize, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        let units_per_sec = if secs > 0.0 { done as f64 / secs } else { 0.0 };
        let remaining = total.saturating_sub(done) as f64;

        let eta = if units_per_sec > 0.0 {
            Duration::from_secs_f64(remaining / units_per_sec)
        } else {
            Duration::ZERO
        };

        Self {
            done,
            total,
            translated,
            units_per_sec,
            eta,
        }
    }
}

/// Whole minutes and seconds, e.g. `3m 20s`
pub fn format_minutes(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Progress: {}/{} units | {} translated | ETA: {}",
            self.done,
            self.total,
            self.translated,
            format_minutes(self.eta)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Successful translator calls
    pub translated: usize,
    pub fallbacks: usize,
    pub cache_hits: usize,
    /// Entries in the cache after the final persist
    pub cache_entries: usize,
    pub checkpoint_failures: usize,
    pub elapsed: Duration,
    pub interrupted: bool,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.completed == self.total
    }
}

pub struct Dispatcher {
    ctx: Arc<PipelineContext>,
    workers: usize,
    log_interval: usize,
    cancel_token: CancellationToken,
}

impl Dispatcher {
    pub fn new(ctx: Arc<PipelineContext>, config: &PipelineConfig) -> Self {
        Self {
            ctx,
            workers: config.workers.max(1),
            log_interval: config.log_interval.max(1),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Stop feeding new units once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn context(&self) -> &Arc<PipelineContext> {
        &self.ctx
    }

    /// Translate every unit, then persist the cache one last time.
    ///
    /// Per-unit failures are logged and counted. Only the final persist or sink
    /// flush failing makes the run itself fail.
    pub async fn run(&self, units: Vec<TranslationUnit>) -> Result<RunSummary, PipelineError> {
        let start = Instant::now();
        let total = units.len();

        tracing::info!(
            units = total,
            languages = self.ctx.languages.targets().len(),
            workers = self.workers,
            "Starting translation run"
        );

        let (job_tx, job_rx) = kanal::bounded_async::<TranslationUnit>(self.workers * 2);
        let (done_tx, done_rx) = kanal::unbounded_async::<Completion>();

        let mut tasks = JoinSet::new();
        for id in 0..self.workers {
            tasks.spawn(worker_loop(
                id,
                self.ctx.clone(),
                job_rx.clone(),
                done_tx.clone(),
                self.cancel_token.child_token(),
            ));
        }
        // Workers hold the only remaining ends
        drop(job_rx);
        drop(done_tx);

        let feeder = tokio::spawn(feed(units, job_tx, self.cancel_token.child_token()));

        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut checkpoint_failures = 0usize;

        while let Ok(completion) = done_rx.recv().await {
            match completion {
                Completion::Done => completed += 1,
                Completion::Failed { index, unit, error } => {
                    failed += 1;
                    tracing::error!(index, unit = %unit, error = %error, "Unit failed");
                }
            }

            let done = completed + failed;
            if done % self.log_interval == 0 {
                let report =
                    ProgressReport::compute(done, total, self.ctx.translated(), start.elapsed());
                tracing::info!("{report}");

                if let Err(e) = self.checkpoint().await {
                    checkpoint_failures += 1;
                    tracing::error!(error = %e, "Checkpoint failed, continuing in memory");
                }
            }
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!("Worker task panicked: {e}");
            }
        }
        if let Err(e) = feeder.await {
            tracing::error!("Feeder task panicked: {e}");
        }

        let interrupted = self.cancel_token.is_cancelled() && completed + failed < total;
        if interrupted {
            tracing::warn!(
                done = completed + failed,
                total,
                "Run interrupted, flushing progress"
            );
        }

        let cache_entries = self.checkpoint().await?;

        let summary = RunSummary {
            total,
            completed,
            failed,
            translated: self.ctx.translated(),
            fallbacks: self.ctx.fallbacks(),
            cache_hits: self.ctx.cache_hits(),
            cache_entries,
            checkpoint_failures,
            elapsed: start.elapsed(),
            interrupted,
        };

        tracing::info!(
            completed = summary.completed,
            failed = summary.failed,
            translated = summary.translated,
            fallbacks = summary.fallbacks,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "Translation run finished"
        );

        Ok(summary)
    }

    /// Persist the cache and sync the output file; returns the entries written
    async fn checkpoint(&self) -> Result<usize, PipelineError> {
        let cache = self.ctx.cache.clone();
        let entries = tokio::task::spawn_blocking(move || cache.persist()).await??;

        let sink = self.ctx.sink.clone();
        tokio::task::spawn_blocking(move || sink.sync()).await??;

        Ok(entries)
    }
}

async fn feed(
    units: Vec<TranslationUnit>,
    job_tx: AsyncSender<TranslationUnit>,
    cancel_token: CancellationToken,
) {
    for unit in units {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                tracing::info!("Cancellation requested, no new units will be started");
                break;
            }
            sent = job_tx.send(unit) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}

async fn worker_loop(
    id: usize,
    ctx: Arc<PipelineContext>,
    job_rx: AsyncReceiver<TranslationUnit>,
    done_tx: AsyncSender<Completion>,
    cancel_token: CancellationToken,
) {
    tracing::debug!(worker = id, "Worker started");

    while let Ok(unit) = job_rx.recv().await {
        // Queued units are left for the next run
        if cancel_token.is_cancelled() {
            break;
        }

        let index = unit.index;
        let text = unit.text.clone();

        // Own task per unit so a panic is contained to that unit
        let task_ctx = ctx.clone();
        let handle = tokio::spawn(async move { translate_unit(&task_ctx, &unit).await });

        let completion = match handle.await {
            Ok(Ok(_)) => Completion::Done,
            Ok(Err(e)) => Completion::Failed {
                index,
                unit: preview(&text),
                error: e.to_string(),
            },
            Err(e) => Completion::Failed {
                index,
                unit: preview(&text),
                error: format!("task aborted: {e}"),
            },
        };

        if done_tx.send(completion).await.is_err() {
            break;
        }
    }

    tracing::debug!(worker = id, "Worker stopped");
}
