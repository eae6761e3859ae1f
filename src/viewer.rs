//! Viewer sessions: one carousel and one auto-advance timer per visitor.
//!
//! The registry lives in `AppState`. Sessions idle for longer than the
//! configured TTL are evicted by a sweep task the registry starts with its
//! first session, and again on every create. The number of live sessions is
//! capped; creation past the cap is refused.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::carousel::autoplay::AutoAdvance;
use crate::carousel::{Carousel, Track, TrackSnapshot};
use crate::site::Slide;

/// State of both tracks as sent to the browser
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub visible_count: usize,
    pub video: TrackSnapshot,
    pub image: TrackSnapshot,
}

impl ViewerSnapshot {
    pub fn of<T>(id: Option<Uuid>, carousel: &Carousel<T>, item_width: Option<f64>) -> Self {
        Self {
            id,
            visible_count: carousel.visible_count(),
            video: carousel.snapshot(Track::Video, item_width),
            image: carousel.snapshot(Track::Image, item_width),
        }
    }
}

pub struct ViewerSession {
    pub id: Uuid,
    carousel: Arc<Mutex<Carousel<Slide>>>,
    autoplay: Mutex<AutoAdvance>,
    period: Duration,
    last_seen: std::sync::Mutex<Instant>,
}

impl ViewerSession {
    fn new(carousel: Carousel<Slide>, period: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            carousel: Arc::new(Mutex::new(carousel)),
            autoplay: Mutex::new(AutoAdvance::new()),
            period,
            last_seen: std::sync::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        if let Ok(mut last_seen) = self.last_seen.lock() {
            *last_seen = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }

    /// (Re)start auto-advance on the image track
    pub async fn restart_autoplay(&self) {
        self.autoplay
            .lock()
            .await
            .start(self.carousel.clone(), Track::Image, self.period);
    }

    pub async fn stop_autoplay(&self) {
        self.autoplay.lock().await.stop();
    }

    pub async fn autoplay_running(&self) -> bool {
        self.autoplay.lock().await.is_running()
    }

    pub async fn snapshot(&self, item_width: Option<f64>) -> ViewerSnapshot {
        self.touch();
        ViewerSnapshot::of(Some(self.id), &*self.carousel.lock().await, item_width)
    }

    /// Apply `f` to the carousel under the lock
    pub async fn update<R>(&self, f: impl FnOnce(&mut Carousel<Slide>) -> R) -> R {
        self.touch();
        let mut carousel = self.carousel.lock().await;
        f(&mut *carousel)
    }

    /// Swap in a freshly loaded feed and restart the timer
    pub async fn refresh(&self, videos: Vec<Slide>, images: Vec<Slide>) {
        {
            let mut carousel = self.carousel.lock().await;
            carousel.replace_items(Track::Video, videos);
            carousel.replace_items(Track::Image, images);
        }
        self.touch();
        self.restart_autoplay().await;
    }
}

pub struct ViewerRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<ViewerSession>>>,
    ttl: Duration,
    period: Duration,
    max_sessions: usize,
    sweeper: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ViewerRegistry {
    pub fn new(ttl: Duration, period: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            period,
            max_sessions,
            sweeper: std::sync::Mutex::new(None),
        }
    }

    /// Sweep interval: the TTL, kept between one second and one minute
    fn sweep_every(&self) -> Duration {
        self.ttl.clamp(Duration::from_secs(1), Duration::from_secs(60))
    }

    /// Start the idle sweep once. The task only holds a weak handle and is
    /// aborted when the registry drops.
    fn ensure_sweeper(self: &Arc<Self>) {
        let mut sweeper = match self.sweeper.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if sweeper.is_some() {
            return;
        }

        let registry: Weak<Self> = Arc::downgrade(self);
        let every = self.sweep_every();
        *sweeper = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                registry.sweep().await;
            }
        }));
    }

    /// Drop sessions idle longer than the TTL and stop their timers
    pub async fn sweep(&self) -> usize {
        let expired: Vec<Arc<ViewerSession>> = {
            let mut sessions = self.sessions.write().await;
            let idle: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, s)| s.idle_for() > self.ttl)
                .map(|(id, _)| *id)
                .collect();
            idle.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            session.stop_autoplay().await;
        }
        if !expired.is_empty() {
            tracing::debug!(evicted = expired.len(), "Evicted idle viewer sessions");
        }
        expired.len()
    }

    /// Register a session for `carousel` and start its timer. `None` when the
    /// registry is full even after evicting idle sessions.
    pub async fn create(self: &Arc<Self>, carousel: Carousel<Slide>) -> Option<Arc<ViewerSession>> {
        self.ensure_sweeper();
        self.sweep().await;

        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.max_sessions {
            tracing::warn!(limit = self.max_sessions, "Viewer session limit reached");
            return None;
        }

        let session = Arc::new(ViewerSession::new(carousel, self.period));
        session.restart_autoplay().await;
        sessions.insert(session.id, session.clone());

        Some(session)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<ViewerSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drop a session, cancelling its timer. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        match self.sessions.write().await.remove(&id) {
            Some(session) => {
                session.stop_autoplay().await;
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Drop for ViewerRegistry {
    fn drop(&mut self) {
        if let Ok(mut sweeper) = self.sweeper.lock() {
            if let Some(handle) = sweeper.take() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::Direction;

    const PERIOD: Duration = Duration::from_secs(5);
    const MAX: usize = 16;

    fn registry(ttl: Duration) -> Arc<ViewerRegistry> {
        Arc::new(ViewerRegistry::new(ttl, PERIOD, MAX))
    }

    fn slide(n: usize) -> Slide {
        Slide {
            title: format!("slide {}", n),
            description: String::new(),
            media: None,
        }
    }

    fn carousel(images: usize) -> Carousel<Slide> {
        Carousel::with_items(1280, vec![slide(0)], (0..images).map(slide).collect())
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_auto_advances_images() {
        let registry = registry(Duration::from_secs(60));
        let session = registry.create(carousel(4)).await.unwrap();
        assert!(session.autoplay_running().await);

        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
        let snap = session.snapshot(None).await;
        assert_eq!(snap.image.index, 1);
        assert_eq!(snap.video.index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_reclamps_and_keeps_single_timer() {
        let registry = registry(Duration::from_secs(60));
        let session = registry.create(carousel(6)).await.unwrap();
        session.update(|c| c.go_to(Track::Image, 4)).await;

        session.refresh(vec![], (0..3).map(slide).collect()).await;
        session.refresh(vec![], (0..3).map(slide).collect()).await;
        assert_eq!(session.snapshot(None).await.image.index, 1);

        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
        assert_eq!(session.snapshot(None).await.image.index, 0);
    }

    #[tokio::test]
    async fn test_remove_stops_timer() {
        let registry = registry(Duration::from_secs(60));
        let session = registry.create(carousel(3)).await.unwrap();
        assert!(registry.remove(session.id).await);
        assert!(!session.autoplay_running().await);
        assert!(registry.get(session.id).await.is_none());
        assert!(!registry.remove(session.id).await);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted_on_create() {
        let registry = registry(Duration::ZERO);
        let first = registry.create(carousel(2)).await.unwrap();
        std::thread::sleep(Duration::from_millis(5));
        let second = registry.create(carousel(2)).await.unwrap();
        assert!(registry.get(first.id).await.is_none());
        assert!(registry.get(second.id).await.is_some());
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_are_swept_without_new_sessions() {
        let registry = registry(Duration::from_secs(10));
        let session = registry.create(carousel(3)).await.unwrap();
        assert!(session.autoplay_running().await);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert!(registry.get(session.id).await.is_none());
        assert_eq!(registry.len().await, 0);
        assert!(!session.autoplay_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polled_session_survives_sweep() {
        let registry = registry(Duration::from_secs(10));
        let session = registry.create(carousel(3)).await.unwrap();

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_secs(5)).await;
            session.snapshot(None).await;
        }
        assert!(registry.get(session.id).await.is_some());
    }

    #[tokio::test]
    async fn test_create_is_refused_at_capacity() {
        let registry = Arc::new(ViewerRegistry::new(Duration::from_secs(60), PERIOD, 2));
        let first = registry.create(carousel(2)).await.unwrap();
        registry.create(carousel(2)).await.unwrap();
        assert!(registry.create(carousel(2)).await.is_none());
        assert_eq!(registry.len().await, 2);

        registry.remove(first.id).await;
        assert!(registry.create(carousel(2)).await.is_some());
    }

    #[tokio::test]
    async fn test_snapshot_serializes_camel_case() {
        let registry = registry(Duration::from_secs(60));
        let session = registry.create(carousel(3)).await.unwrap();
        session.update(|c| c.slide(Track::Image, Direction::Next)).await;
        let json = serde_json::to_value(session.snapshot(Some(200.0)).await).unwrap();
        assert_eq!(json["visibleCount"], 2);
        assert_eq!(json["image"]["index"], 1);
        assert_eq!(json["image"]["offsetPx"], 224.0);
        assert_eq!(json["image"]["track"], "image");
    }
}
