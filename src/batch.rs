//! Ordered parallel execution of independent, fallible jobs.
//!
//! Both media fan-outs in the pipeline (slide image rendering and narration
//! synthesis) share the same shape: N independent API calls that should run
//! with bounded concurrency, whose results must line up with the slides that
//! produced them, and where one slide failing must not sink the rest of the
//! batch. [`BatchRunner`] is that shape, hoisted into one place.
//!
//! # Guarantees
//!
//! - The output slot vector has exactly the same length as the job list.
//! - `slots[i]` holds the outcome of job `i`, regardless of completion order.
//! - A failing (or panicking) job degrades to an absent slot plus a recorded
//!   [`JobFailure`]; under the default policy no error escapes `run` unless
//!   every job failed.
//! - Each job runs at most once. There are no retries and no cancellation;
//!   a caller wanting a batch deadline wraps the whole call in
//!   `tokio::time::timeout`.
//!
//! # Example
//!
//! ```rust,no_run
//! use ampora::batch::BatchRunner;
//!
//! # async fn example() -> Result<(), ampora::batch::BatchError> {
//! let jobs: Vec<_> = (0..4)
//!     .map(|i| move || async move { Ok::<_, std::io::Error>(i * 10) })
//!     .collect();
//!
//! let output = BatchRunner::new(2).run(jobs).await?;
//! assert_eq!(output.len(), 4);
//! assert_eq!(output.slots()[3], Some(30));
//! # Ok(())
//! # }
//! ```

use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

/// Default worker bound, sized for typical third-party API rate limits.
pub const DEFAULT_MAX_WORKERS: usize = 5;

/// What `run` should do once every job has reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Absent slots for failures. If every single job failed, the batch
    /// itself errors: an all-absent batch almost always means a systemic
    /// problem (bad credentials, service outage) rather than N independent
    /// content problems.
    #[default]
    ErrorOnTotalFailure,

    /// Absent slots for failures, even when all of them failed.
    Lenient,

    /// The batch still runs to completion, but any failure at all turns
    /// into an error carrying the lowest failing index.
    ErrorOnAnyFailure,
}

/// A single job's failure, kept alongside the absent slot it produced.
#[derive(Debug, Clone)]
pub struct JobFailure {
    /// Position of the job in the submitted batch.
    pub index: usize,
    /// Rendered error message from the job.
    pub message: String,
}

/// Batch-level errors, produced only by the non-default policies or by a
/// total wipeout under the default policy.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Every job in a non-empty batch failed.
    #[error("all {attempted} jobs in the batch failed")]
    TotalFailure { attempted: usize },

    /// `FailurePolicy::ErrorOnAnyFailure` and at least one job failed.
    #[error("job {index} failed: {message}")]
    JobFailed { index: usize, message: String },
}

/// Index-aligned outcome of a batch.
#[derive(Debug)]
pub struct BatchOutput<T> {
    slots: Vec<Option<T>>,
    failures: Vec<JobFailure>,
}

impl<T> BatchOutput<T> {
    /// Number of submitted jobs. Always equals the input length.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of jobs that produced a value.
    pub fn succeeded(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Number of absent slots.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// The index-aligned outcome slots.
    pub fn slots(&self) -> &[Option<T>] {
        &self.slots
    }

    /// Consumes the output, yielding the slot vector.
    pub fn into_slots(self) -> Vec<Option<T>> {
        self.slots
    }

    /// Per-job failures, ascending by index.
    pub fn failures(&self) -> &[JobFailure] {
        &self.failures
    }
}

/// Runs a batch of independent async jobs with a bounded worker count,
/// collecting outcomes index-aligned with the input.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    max_workers: usize,
    policy: FailurePolicy,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS)
    }
}

impl BatchRunner {
    /// Creates a runner with the given concurrency bound. A bound of zero is
    /// treated as one.
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Executes all jobs and blocks until every one has succeeded or failed.
    ///
    /// Jobs are spawned up front; a semaphore holds concurrent execution to
    /// `max_workers`. Completion order is unspecified, slot order is not.
    pub async fn run<F, Fut, T, E>(&self, jobs: Vec<F>) -> Result<BatchOutput<T>, BatchError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let total = jobs.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut pending: JoinSet<(usize, Result<T, String>)> = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            pending.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (index, Err("worker pool closed".to_string())),
                };
                let outcome = AssertUnwindSafe(job()).catch_unwind().await;
                let outcome = match outcome {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(err)) => Err(err.to_string()),
                    Err(panic) => Err(describe_panic(panic)),
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
        let mut failures: Vec<JobFailure> = Vec::new();

        while let Some(joined) = pending.join_next().await {
            match joined {
                Ok((index, Ok(value))) => {
                    debug!(index, "batch job succeeded");
                    slots[index] = Some(value);
                }
                Ok((index, Err(message))) => {
                    warn!(index, error = %message, "batch job failed");
                    failures.push(JobFailure { index, message });
                }
                Err(join_err) => {
                    // Tasks are never aborted and panics are caught above,
                    // so this branch should be unreachable in practice.
                    error!(error = %join_err, "batch task terminated abnormally");
                }
            }
        }

        failures.sort_by_key(|f| f.index);

        let succeeded = slots.iter().filter(|s| s.is_some()).count();
        match self.policy {
            FailurePolicy::Lenient => {}
            FailurePolicy::ErrorOnTotalFailure => {
                if total > 0 && succeeded == 0 {
                    return Err(BatchError::TotalFailure { attempted: total });
                }
            }
            FailurePolicy::ErrorOnAnyFailure => {
                if let Some(first) = failures.first() {
                    return Err(BatchError::JobFailed {
                        index: first.index,
                        message: first.message.clone(),
                    });
                }
            }
        }

        Ok(BatchOutput { slots, failures })
    }
}

/// Intersects two index-aligned result sequences, keeping only the indices
/// present on both sides, in ascending index order.
///
/// A slide whose image failed but whose narration succeeded (or the other
/// way around) cannot be rendered; it is dropped here with a warning, never
/// padded with placeholder content.
pub fn pair_surviving<A, B>(left: Vec<Option<A>>, right: Vec<Option<B>>) -> Vec<(usize, A, B)> {
    let mut pairs = Vec::new();
    let mut right = right.into_iter();

    for (index, a) in left.into_iter().enumerate() {
        let b = right.next().flatten();
        match (a, b) {
            (Some(a), Some(b)) => pairs.push((index, a, b)),
            (None, None) => {
                warn!(index, "slide dropped: absent on both sides");
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!(index, "slide dropped: present on only one side");
            }
        }
    }

    for _ in right {
        // Callers always feed equal-length batches; anything extra on the
        // right has no partner by definition.
        warn!("pairing input had unmatched trailing entries");
    }

    pairs
}

fn describe_panic(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("job panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("job panicked: {message}")
    } else {
        "job panicked".to_string()
    }
}
