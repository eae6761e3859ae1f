//! Timed auto-advance. At most one timer runs per handle: starting again
//! aborts the previous task, and dropping the handle stops it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{Carousel, Track};

#[derive(Debug, Default)]
pub struct AutoAdvance {
    handle: Option<JoinHandle<()>>,
}

impl AutoAdvance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick `track` every `period`, replacing any running timer
    pub fn start<T>(&mut self, carousel: Arc<Mutex<Carousel<T>>>, track: Track, period: Duration)
    where
        T: Send + 'static,
    {
        self.stop();

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                if let Some(index) = carousel.lock().await.tick(track) {
                    tracing::trace!(?track, index, "auto-advance");
                }
            }
        });

        self.handle = Some(handle);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutoAdvance {
    fn drop(&mut self) {
        self.stop();
    }
}
