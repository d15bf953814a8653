//! Deferred continuations for the spin animation window.

use std::sync::Mutex;
use std::time::Duration;

use log::debug;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once, some time after `delay` has passed.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task);
}

/// Sleeps on the tokio runtime, then runs the task.
///
/// Must be called from inside a runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

/// Holds tasks until [`ManualScheduler::fire_all`] is called. Delays are ignored.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<Vec<(Duration, Task)>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Delays requested so far by tasks that have not fired yet.
    pub fn pending_delays(&self) -> Vec<Duration> {
        self.queue
            .lock()
            .map(|q| q.iter().map(|(delay, _)| *delay).collect())
            .unwrap_or_default()
    }

    /// Runs queued tasks in the order they were scheduled, returning how many ran.
    pub fn fire_all(&self) -> usize {
        // Take the queue first so a task may schedule again without deadlocking.
        let tasks = match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        debug!("fired {count} deferred task(s)");
        count
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut queue = match self.queue.lock() {
            Ok(queue) => queue,
            Err(poisoned) => poisoned.into_inner(),
        };
        queue.push((delay, task));
    }
}
