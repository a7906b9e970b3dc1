//! Completion polling for work the remote system finishes out of band.
//!
//! A [`CompletionPoller`] re-fetches an entity until a predicate holds or the
//! retry budget runs out. [`settle_all_last_wins`] runs several polls
//! concurrently and keeps the snapshot of whichever finished last.

use crate::error::{CmaError, CmaResult};
use crate::params::Params;
use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Milliseconds between processing checks.
pub const DEFAULT_PROCESSING_CHECK_WAIT_MS: u64 = 3000;

/// Checks after the first before giving up.
pub const DEFAULT_PROCESSING_CHECK_RETRIES: u32 = 10;

/// Suspends between poll attempts. Injectable so tests need no real timers.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Caller-tunable polling options, read from the `options` param.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Wait between checks, in milliseconds.
    #[serde(default = "default_wait")]
    pub processing_check_wait: u64,
    #[serde(default = "default_retries")]
    pub processing_check_retries: u32,
}

fn default_wait() -> u64 {
    DEFAULT_PROCESSING_CHECK_WAIT_MS
}

fn default_retries() -> u32 {
    DEFAULT_PROCESSING_CHECK_RETRIES
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            processing_check_wait: DEFAULT_PROCESSING_CHECK_WAIT_MS,
            processing_check_retries: DEFAULT_PROCESSING_CHECK_RETRIES,
        }
    }
}

impl ProcessingOptions {
    /// Reads `params.options`, falling back to defaults when absent or null.
    pub fn from_params(params: &Params) -> CmaResult<Self> {
        match params.get("options") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(options) => Ok(serde_json::from_value(options.clone())?),
        }
    }

    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.processing_check_wait)
    }
}

/// Bounded re-fetch loop.
#[derive(Clone)]
pub struct CompletionPoller {
    options: ProcessingOptions,
    delay: Arc<dyn Delay>,
}

impl CompletionPoller {
    pub fn new(options: ProcessingOptions, delay: Arc<dyn Delay>) -> Self {
        Self { options, delay }
    }

    pub fn options(&self) -> ProcessingOptions {
        self.options
    }

    /// Fetches until `is_complete` holds.
    ///
    /// The first fetch runs immediately; every later fetch follows one wait.
    /// The check count starts at 0 and the poll gives up when a failed check
    /// happens at `processing_check_retries`, so a timeout costs exactly
    /// `processing_check_retries + 1` fetches. Fetch errors end the poll
    /// unchanged.
    pub async fn poll<F, Fut, P>(&self, label: &str, mut fetch: F, is_complete: P) -> CmaResult<Value>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CmaResult<Value>>,
        P: Fn(&Value) -> bool,
    {
        let retries = self.options.processing_check_retries;
        let mut check_count: u32 = 0;

        loop {
            let entity = fetch().await?;
            if is_complete(&entity) {
                debug!(label, check_count, "processing complete");
                return Ok(entity);
            }
            if check_count == retries {
                warn!(label, retries, "processing did not complete within the retry budget");
                return Err(CmaError::AssetProcessingTimeout);
            }
            check_count += 1;
            debug!(label, check_count, "not processed yet, waiting");
            self.delay.wait(self.options.wait()).await;
        }
    }
}

impl std::fmt::Debug for CompletionPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionPoller")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Runs every task concurrently and resolves with the value of whichever
/// task succeeded last in wall-clock order.
///
/// Each task is spawned on its own tokio task. Successful tasks overwrite a
/// shared "last resolved" slot as they finish; the slot starts as `initial`.
/// The first failure is returned immediately, and the remaining tasks are
/// not cancelled: they run on until they finish or exhaust their own budget.
/// The result is therefore not a merge of the per-task results.
pub async fn settle_all_last_wins<I, Fut>(initial: Value, tasks: I) -> CmaResult<Value>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = CmaResult<Value>> + Send + 'static,
{
    let last_resolved = Arc::new(Mutex::new(initial));

    let mut pending: FuturesUnordered<_> = tasks
        .into_iter()
        .map(|task| {
            let slot = Arc::clone(&last_resolved);
            tokio::spawn(async move {
                let value = task.await?;
                *slot.lock().unwrap_or_else(|e| e.into_inner()) = value;
                Ok::<(), CmaError>(())
            })
        })
        .collect();

    while let Some(joined) = pending.next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(err),
            Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
            Err(join_err) => return Err(CmaError::Network(format!("poll task aborted: {join_err}"))),
        }
    }

    let value = last_resolved.lock().unwrap_or_else(|e| e.into_inner()).clone();
    Ok(value)
}
