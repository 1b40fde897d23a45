use crate::TaskId;
use crate::error::{DispatchError, Result};
use crate::handle::TaskHandle;
use crate::registry::TaskRegistry;
use futures::channel::oneshot;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    /// Number of worker threads; 0 means one per available core.
    pub workers: usize,
    /// Deadline applied by [`Dispatcher::submit`], in milliseconds.
    pub default_timeout_ms: Option<u64>,
    /// Prefix of the worker thread names.
    pub thread_name: String,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            default_timeout_ms: None,
            thread_name: "strata-worker".to_string(),
        }
    }
}

impl PoolOptions {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        thread::available_parallelism().map_or(1, |n| n.get())
    }
}

struct Job {
    id: TaskId,
    name: String,
    args: Vec<Value>,
}

enum Event {
    Submit {
        job: Job,
        reply: oneshot::Sender<Result<Value>>,
        deadline: Option<Instant>,
    },
    Completed {
        worker: usize,
        id: TaskId,
        result: Result<Value>,
    },
    Cancel {
        id: TaskId,
    },
    Shutdown,
}

/// A fixed set of worker threads executing registered tasks.
///
/// Tasks are dispatched in submission order, at most one per worker at a time. A coordinator
/// thread owns the queue and the table of pending results; workers only ever see their own job and
/// hand the result back as an owned value.
pub struct Dispatcher {
    registry: Arc<TaskRegistry>,
    events: Sender<Event>,
    next_id: AtomicU64,
    default_timeout: Option<Duration>,
    workers: usize,
    coordinator: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(registry: TaskRegistry, options: &PoolOptions) -> Result<Self> {
        let registry = Arc::new(registry);
        let count = options.worker_count();
        let (events_tx, events_rx) = mpsc::channel();

        let mut job_senders = Vec::with_capacity(count);
        let mut threads = Vec::with_capacity(count);
        for index in 0..count {
            let (job_tx, job_rx) = mpsc::sync_channel::<Job>(1);
            let registry = Arc::clone(&registry);
            let events = events_tx.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-{index}", options.thread_name))
                .spawn(move || worker_loop(index, &registry, job_rx, events))?;
            job_senders.push(job_tx);
            threads.push(handle);
        }

        let coordinator = Coordinator {
            events: events_rx,
            workers: job_senders,
            threads,
            free: vec![true; count],
            queue: VecDeque::new(),
            pending: HashMap::default(),
        };
        let coordinator = thread::Builder::new()
            .name(format!("{}-coordinator", options.thread_name))
            .spawn(move || coordinator.run())?;
        tracing::debug!(workers = count, "dispatcher started");

        Ok(Self {
            registry,
            events: events_tx,
            next_id: AtomicU64::new(0),
            default_timeout: options.default_timeout_ms.map(Duration::from_millis),
            workers: count,
            coordinator: Some(coordinator),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Queues `name(args)`; the handle resolves to the task's result.
    pub fn submit(&self, name: &str, args: Vec<Value>) -> TaskHandle {
        self.enqueue(name, args, self.default_timeout)
    }

    /// Like [`Dispatcher::submit`], resolving to [`DispatchError::TimedOut`] if the task has not
    /// finished within `timeout`.
    pub fn submit_with_timeout(&self, name: &str, args: Vec<Value>, timeout: Duration) -> TaskHandle {
        self.enqueue(name, args, Some(timeout))
    }

    /// Resolves the task to [`DispatchError::Cancelled`] unless it has already finished. A task
    /// that is already running keeps its worker busy; its result is discarded.
    pub fn cancel(&self, id: TaskId) {
        let _ = self.events.send(Event::Cancel { id });
    }

    fn enqueue(&self, name: &str, args: Vec<Value>, timeout: Option<Duration>) -> TaskHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (reply, rx) = oneshot::channel();
        if !self.registry.contains(name) {
            let _ = reply.send(Err(DispatchError::UnknownTask {
                name: name.to_string(),
            }));
            return TaskHandle::new(id, rx);
        }

        let job = Job {
            id,
            name: name.to_string(),
            args,
        };
        let deadline = timeout.map(|t| Instant::now() + t);
        // If the coordinator is gone the reply sender is dropped and the handle resolves to
        // `Shutdown`.
        let _ = self.events.send(Event::Submit {
            job,
            reply,
            deadline,
        });
        TaskHandle::new(id, rx)
    }

    /// Stops the workers, resolving every outstanding task to [`DispatchError::Shutdown`].
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(coordinator) = self.coordinator.take() else {
            return;
        };
        let _ = self.events.send(Event::Shutdown);
        if coordinator.join().is_err() {
            tracing::warn!("dispatcher coordinator panicked");
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("workers", &self.workers)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

struct Pending {
    reply: oneshot::Sender<Result<Value>>,
    deadline: Option<Instant>,
}

struct Coordinator {
    events: Receiver<Event>,
    workers: Vec<SyncSender<Job>>,
    threads: Vec<JoinHandle<()>>,
    free: Vec<bool>,
    queue: VecDeque<Job>,
    pending: HashMap<TaskId, Pending>,
}

impl Coordinator {
    fn run(mut self) {
        loop {
            let event = match self.next_deadline() {
                Some(deadline) => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match self.events.recv_timeout(wait) {
                        Ok(event) => Some(event),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.events.recv() {
                    Ok(event) => Some(event),
                    Err(_) => break,
                },
            };

            match event {
                Some(Event::Submit {
                    job,
                    reply,
                    deadline,
                }) => {
                    tracing::trace!(id = job.id, name = %job.name, "task queued");
                    self.pending.insert(job.id, Pending { reply, deadline });
                    self.queue.push_back(job);
                }
                Some(Event::Completed { worker, id, result }) => {
                    self.free[worker] = true;
                    match self.pending.remove(&id) {
                        Some(pending) => {
                            let _ = pending.reply.send(result);
                        }
                        None => tracing::trace!(id, "discarding result of a resolved task"),
                    }
                }
                Some(Event::Cancel { id }) => self.resolve(id, DispatchError::Cancelled { id }),
                Some(Event::Shutdown) => break,
                None => {}
            }

            self.expire();
            self.dispatch();
        }
        self.finish();
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().filter_map(|p| p.deadline).min()
    }

    /// Removes `id` from the queue and the pending table and resolves it with `err`.
    fn resolve(&mut self, id: TaskId, err: DispatchError) {
        if let Some(pending) = self.pending.remove(&id) {
            self.queue.retain(|job| job.id != id);
            let _ = pending.reply.send(Err(err));
        }
    }

    fn expire(&mut self) {
        let now = Instant::now();
        let expired: Vec<TaskId> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline.is_some_and(|d| d <= now))
            .map(|(&id, _)| id)
            .collect();
        for id in expired {
            tracing::debug!(id, "task timed out");
            self.resolve(id, DispatchError::TimedOut { id });
        }
    }

    fn dispatch(&mut self) {
        while !self.queue.is_empty() {
            let Some(worker) = self.free.iter().position(|&free| free) else {
                return;
            };
            let Some(job) = self.queue.pop_front() else {
                return;
            };
            let id = job.id;
            self.free[worker] = false;
            if self.workers[worker].send(job).is_err() {
                tracing::warn!(worker, "worker is gone");
                self.resolve(id, DispatchError::Shutdown);
            } else {
                tracing::trace!(id, worker, "task dispatched");
            }
        }
    }

    fn finish(self) {
        let Coordinator {
            events,
            workers,
            threads,
            free,
            queue,
            pending,
        } = self;
        drop(queue);
        for (_, p) in pending {
            let _ = p.reply.send(Err(DispatchError::Shutdown));
        }
        drop(workers);
        drop(events);
        // A busy worker may still run a timed-out or cancelled task. It is detached and exits
        // once the task returns.
        let mut detached = 0;
        for (handle, idle) in threads.into_iter().zip(free) {
            if idle {
                let _ = handle.join();
            } else {
                detached += 1;
            }
        }
        tracing::debug!(detached, "dispatcher stopped");
    }
}

fn worker_loop(index: usize, registry: &TaskRegistry, jobs: Receiver<Job>, events: Sender<Event>) {
    while let Ok(job) = jobs.recv() {
        let result = run_job(registry, &job);
        let completed = Event::Completed {
            worker: index,
            id: job.id,
            result,
        };
        if events.send(completed).is_err() {
            break;
        }
    }
}

fn run_job(registry: &TaskRegistry, job: &Job) -> Result<Value> {
    let Some(task) = registry.get(&job.name) else {
        return Err(DispatchError::UnknownTask {
            name: job.name.clone(),
        });
    };
    match catch_unwind(AssertUnwindSafe(|| task(job.args.as_slice()))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(message)) => Err(DispatchError::Task {
            name: job.name.clone(),
            message,
        }),
        Err(payload) => Err(DispatchError::WorkerPanicked {
            name: job.name.clone(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
