use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Periodic progress while time remains.
    Tick { remaining: Duration },
    /// Sent exactly once, unless the countdown is cancelled first.
    Finished,
}

pub struct Countdown;

impl Countdown {
    /// Spawn a countdown on the current tokio runtime.
    ///
    /// Events are handed to `sink` from the countdown task; callers forward
    /// them into their own event loop.
    pub fn start<F>(duration: Duration, tick_interval: Duration, mut sink: F) -> CountdownHandle
    where
        F: FnMut(CountdownEvent) + Send + 'static,
    {
        let tick_interval = tick_interval.max(Duration::from_millis(1));
        let started_at = Instant::now();
        let deadline = started_at + duration;
        debug!(
            millis = duration.as_millis() as u64,
            tick_millis = tick_interval.as_millis() as u64,
            "countdown started"
        );

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(started_at + tick_interval, tick_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let expiry = tokio::time::sleep_until(deadline);
            tokio::pin!(expiry);

            loop {
                tokio::select! {
                    biased;
                    _ = &mut expiry => {
                        debug!("countdown finished");
                        sink(CountdownEvent::Finished);
                        break;
                    }
                    at = ticks.tick() => {
                        let remaining = deadline.saturating_duration_since(at);
                        if !remaining.is_zero() {
                            sink(CountdownEvent::Tick { remaining });
                        }
                    }
                }
            }
        });

        CountdownHandle {
            duration,
            deadline,
            task,
        }
    }
}

/// Owner of a running countdown. Dropping the handle cancels it.
#[derive(Debug)]
pub struct CountdownHandle {
    duration: Duration,
    deadline: Instant,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the countdown. Returns false if it had already finished.
    pub fn cancel(&self) -> bool {
        let was_pending = !self.task.is_finished();
        self.task.abort();
        if was_pending {
            debug!("countdown cancelled");
        }
        was_pending
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
