//! Bounded channels and fixed-size worker pools for the pipeline stages.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full, the sender will block, providing backpressure
/// all the way back to the directory walk.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size)
}

/// A pipeline stage served by a fixed number of workers.
///
/// All workers pull from one shared input queue and push into clones of one
/// output sender. Each worker exits when the input queue is closed and empty,
/// when the downstream queue is gone, or when the run is cancelled; only the
/// last counts as interrupted. The
/// output queue closes once the last worker has dropped its sender, which is
/// how "producer done" propagates from stage to stage.
pub struct StagePool<I, O = ()> {
    name: &'static str,
    workers: usize,
    input: mpsc::Receiver<I>,
    output: Option<mpsc::Sender<O>>,
}

impl<I, O> StagePool<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Create a stage that forwards handler results to `output`.
    pub fn new(
        name: &'static str,
        workers: usize,
        input: mpsc::Receiver<I>,
        output: mpsc::Sender<O>,
    ) -> Self {
        Self {
            name,
            workers,
            input,
            output: Some(output),
        }
    }

    /// Number of workers this stage will run.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Spawn the workers onto the current runtime.
    ///
    /// The handler is called once per input item. `Some(output)` is sent
    /// downstream; `None` drops the item (the handler is expected to have
    /// logged why).
    pub fn spawn<F, Fut>(self, handler: F, cancel: CancellationToken) -> StageHandle
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<O>> + Send + 'static,
    {
        let StagePool {
            name,
            workers,
            input,
            output,
        } = self;

        let input = Arc::new(Mutex::new(input));
        let handler = Arc::new(handler);
        let mut set = JoinSet::new();

        for worker_id in 0..workers {
            let input = Arc::clone(&input);
            let handler = Arc::clone(&handler);
            let output = output.clone();
            let cancel = cancel.clone();

            set.spawn(async move {
                let mut interrupted = false;
                loop {
                    let next = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            interrupted = true;
                            break;
                        }
                        item = async { input.lock().await.recv().await } => item,
                    };
                    // Input closed and drained
                    let Some(item) = next else { break };

                    let Some(result) = handler(item).await else {
                        continue;
                    };

                    if let Some(output) = &output {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => {
                                interrupted = true;
                                break;
                            }
                            sent = output.send(result) => {
                                if sent.is_err() {
                                    // Downstream closed, stop processing
                                    break;
                                }
                            }
                        }
                    }
                }
                tracing::trace!("{name} worker {worker_id} finished");
                interrupted
            });
        }

        StageHandle { name, set }
    }
}

impl<I> StagePool<I, ()>
where
    I: Send + 'static,
{
    /// Create a terminal stage with no output queue.
    pub fn sink(name: &'static str, workers: usize, input: mpsc::Receiver<I>) -> Self {
        Self {
            name,
            workers,
            input,
            output: None,
        }
    }
}

/// Running workers of one stage.
pub struct StageHandle {
    name: &'static str,
    set: JoinSet<bool>,
}

impl StageHandle {
    /// Wait for every worker of the stage to finish.
    ///
    /// Returns `true` if cancellation stopped any worker before its input
    /// drained. A panicked worker is logged; the remaining workers keep
    /// draining.
    pub async fn join(mut self) -> bool {
        let mut interrupted = false;
        while let Some(result) = self.set.join_next().await {
            match result {
                Ok(stopped) => interrupted |= stopped,
                Err(e) => tracing::error!("{} worker failed: {}", self.name, e),
            }
        }
        if interrupted {
            tracing::debug!("{} stage interrupted", self.name);
        } else {
            tracing::debug!("{} stage drained", self.name);
        }
        interrupted
    }
}
