//! Carousel engine for the video and image tracks.
//!
//! Pure state: item lists, per-track index and the visible count derived
//! from viewport width. Rendering concerns (dots, pixel offset) are computed
//! from that state, never stored. The timer lives in [`autoplay`].

pub mod autoplay;

use serde::{Deserialize, Serialize};

/// Viewports at or below this width show a single item
pub const NARROW_BREAKPOINT_PX: u32 = 968;

/// Horizontal gap between rendered items
pub const ITEM_GAP_PX: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Video,
    Image,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Video, Track::Image];
}

/// Manual navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    fn apply(self, index: usize) -> usize {
        match self {
            Direction::Prev => index.saturating_sub(1),
            Direction::Next => index.saturating_add(1),
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = String;

    fn try_from(step: i32) -> Result<Self, Self::Error> {
        match step {
            -1 => Ok(Direction::Prev),
            1 => Ok(Direction::Next),
            other => Err(format!("direction must be -1 or 1, got {}", other)),
        }
    }
}

/// Number of items shown side by side
pub fn visible_count(viewport_width: u32) -> usize {
    if viewport_width <= NARROW_BREAKPOINT_PX {
        1
    } else {
        2
    }
}

/// Pagination dot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dot {
    pub index: usize,
    pub active: bool,
}

/// Rendered state of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub track: Track,
    pub index: usize,
    pub max_index: usize,
    pub visible_count: usize,
    pub item_count: usize,
    pub dots: Vec<Dot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_px: Option<f64>,
}

/// Items and position of one track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Default for TrackState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: 0,
        }
    }
}

impl<T> TrackState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn index(&self) -> usize {
        self.index
    }

    fn max_index(&self, visible: usize) -> usize {
        self.items.len().saturating_sub(visible)
    }
}

/// Both tracks plus the shared visible count
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel<T> {
    video: TrackState<T>,
    image: TrackState<T>,
    visible: usize,
}

impl<T> Carousel<T> {
    pub fn new(viewport_width: u32) -> Self {
        Self {
            video: TrackState::default(),
            image: TrackState::default(),
            visible: visible_count(viewport_width),
        }
    }

    pub fn with_items(viewport_width: u32, videos: Vec<T>, images: Vec<T>) -> Self {
        let mut carousel = Self::new(viewport_width);
        carousel.replace_items(Track::Video, videos);
        carousel.replace_items(Track::Image, images);
        carousel
    }

    pub fn track(&self, track: Track) -> &TrackState<T> {
        match track {
            Track::Video => &self.video,
            Track::Image => &self.image,
        }
    }

    fn track_mut(&mut self, track: Track) -> &mut TrackState<T> {
        match track {
            Track::Video => &mut self.video,
            Track::Image => &mut self.image,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn index(&self, track: Track) -> usize {
        self.track(track).index
    }

    /// Largest index reachable by navigation
    pub fn max_index(&self, track: Track) -> usize {
        self.track(track).max_index(self.visible)
    }

    /// Step one item without wrapping
    pub fn slide(&mut self, track: Track, direction: Direction) -> usize {
        let visible = self.visible;
        let state = self.track_mut(track);
        state.index = direction.apply(state.index).min(state.max_index(visible));
        state.index
    }

    /// Jump to a dot; out-of-range targets are clamped
    pub fn go_to(&mut self, track: Track, index: usize) -> usize {
        let visible = self.visible;
        let state = self.track_mut(track);
        state.index = index.min(state.max_index(visible));
        state.index
    }

    /// Auto-advance step. Wraps to the start once the last page has been
    /// shown; tracks with at most one item never move.
    pub fn tick(&mut self, track: Track) -> Option<usize> {
        let visible = self.visible;
        let state = self.track_mut(track);
        if state.items.len() <= 1 {
            return None;
        }

        let next = state.index + 1;
        state.index = if next > state.max_index(visible) { 0 } else { next };
        Some(state.index)
    }

    /// New viewport width: recompute the visible count and rewind both tracks
    pub fn resize(&mut self, viewport_width: u32) {
        self.visible = visible_count(viewport_width);
        for track in Track::ALL {
            self.track_mut(track).index = 0;
        }
    }

    /// Swap a track's items (feed refresh). The index is kept when still
    /// reachable, otherwise clamped.
    pub fn replace_items(&mut self, track: Track, items: Vec<T>) {
        let visible = self.visible;
        let state = self.track_mut(track);
        state.items = items;
        state.index = state.index.min(state.max_index(visible));
    }

    /// One dot per reachable position, the current one active
    pub fn dots(&self, track: Track) -> Vec<Dot> {
        let current = self.index(track);
        (0..=self.max_index(track))
            .map(|index| Dot {
                index,
                active: index == current,
            })
            .collect()
    }

    /// Translate offset for the track given the measured width of its first
    /// rendered item. `None` when nothing is rendered.
    pub fn offset_px(&self, track: Track, item_width: Option<f64>) -> Option<f64> {
        let state = self.track(track);
        if state.items.is_empty() {
            return None;
        }
        item_width.map(|width| state.index as f64 * (width + ITEM_GAP_PX))
    }

    pub fn snapshot(&self, track: Track, item_width: Option<f64>) -> TrackSnapshot {
        TrackSnapshot {
            track,
            index: self.index(track),
            max_index: self.max_index(track),
            visible_count: self.visible,
            item_count: self.track(track).items.len(),
            dots: self.dots(track),
            offset_px: self.offset_px(track, item_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE: u32 = 1280;
    const NARROW: u32 = 800;

    fn carousel(videos: usize, images: usize, width: u32) -> Carousel<usize> {
        Carousel::with_items(width, (0..videos).collect(), (0..images).collect())
    }

    #[test]
    fn test_visible_count_breakpoint() {
        assert_eq!(visible_count(968), 1);
        assert_eq!(visible_count(969), 2);
        assert_eq!(visible_count(0), 1);
    }

    #[test]
    fn test_slide_stays_in_bounds() {
        for width in [NARROW, WIDE] {
            for n in 0..7 {
                let mut c = carousel(n, n, width);
                let max = n.saturating_sub(c.visible_count());
                for _ in 0..10 {
                    let i = c.slide(Track::Video, Direction::Next);
                    assert!(i <= max, "n={} width={} index={}", n, width, i);
                }
                assert_eq!(c.index(Track::Video), max);
                for _ in 0..10 {
                    c.slide(Track::Video, Direction::Prev);
                }
                assert_eq!(c.index(Track::Video), 0);
            }
        }
    }

    #[test]
    fn test_go_to_clamps() {
        let mut c = carousel(4, 0, WIDE);
        assert_eq!(c.go_to(Track::Video, 1), 1);
        assert_eq!(c.go_to(Track::Video, 99), 2);
        assert_eq!(c.go_to(Track::Image, 3), 0);
    }

    #[test]
    fn test_go_to_then_dots_marks_single_active() {
        let mut c = carousel(0, 6, WIDE);
        c.go_to(Track::Image, 3);
        let dots = c.dots(Track::Image);
        assert_eq!(dots.len(), 5);
        let active: Vec<usize> = dots.iter().filter(|d| d.active).map(|d| d.index).collect();
        assert_eq!(active, vec![3]);
    }

    #[test]
    fn test_dot_count() {
        assert_eq!(carousel(0, 0, WIDE).dots(Track::Video).len(), 1);
        assert_eq!(carousel(1, 0, WIDE).dots(Track::Video).len(), 1);
        assert_eq!(carousel(5, 0, WIDE).dots(Track::Video).len(), 4);
        assert_eq!(carousel(5, 0, NARROW).dots(Track::Video).len(), 5);
    }

    #[test]
    fn test_tick_wraps_after_last_page() {
        let mut c = carousel(0, 5, WIDE);
        c.go_to(Track::Image, 3);
        assert_eq!(c.tick(Track::Image), Some(0));

        assert_eq!(c.tick(Track::Image), Some(1));
        assert_eq!(c.tick(Track::Image), Some(2));
        assert_eq!(c.tick(Track::Image), Some(3));
        assert_eq!(c.tick(Track::Image), Some(0));
    }

    #[test]
    fn test_tick_ignores_short_tracks() {
        let mut c = carousel(0, 1, NARROW);
        assert_eq!(c.tick(Track::Image), None);
        assert_eq!(c.index(Track::Image), 0);

        let mut two = carousel(0, 2, WIDE);
        assert_eq!(two.tick(Track::Image), Some(0));
    }

    #[test]
    fn test_resize_rewinds_both_tracks() {
        let mut c = carousel(5, 5, WIDE);
        c.go_to(Track::Video, 2);
        c.go_to(Track::Image, 3);
        c.resize(NARROW);
        assert_eq!(c.visible_count(), 1);
        assert_eq!(c.index(Track::Video), 0);
        assert_eq!(c.index(Track::Image), 0);
        assert!(c.dots(Track::Image)[0].active);
        assert_eq!(c.dots(Track::Image).len(), 5);
    }

    #[test]
    fn test_replace_items_reclamps() {
        let mut c = carousel(0, 6, WIDE);
        c.go_to(Track::Image, 4);
        c.replace_items(Track::Image, vec![1, 2, 3]);
        assert_eq!(c.index(Track::Image), 1);
        c.replace_items(Track::Image, vec![]);
        assert_eq!(c.index(Track::Image), 0);
    }

    #[test]
    fn test_offset() {
        let mut c = carousel(3, 0, NARROW);
        c.go_to(Track::Video, 2);
        assert_eq!(c.offset_px(Track::Video, Some(300.0)), Some(648.0));
        assert_eq!(c.offset_px(Track::Video, None), None);
        assert_eq!(c.offset_px(Track::Image, Some(300.0)), None);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut c = carousel(4, 0, WIDE);
        c.slide(Track::Video, Direction::Next);
        let snap = c.snapshot(Track::Video, Some(100.0));
        assert_eq!(snap.index, 1);
        assert_eq!(snap.max_index, 2);
        assert_eq!(snap.item_count, 4);
        assert_eq!(snap.dots.len(), 3);
        assert_eq!(snap.offset_px, Some(124.0));
    }

    #[test]
    fn test_direction_from_step() {
        assert_eq!(Direction::try_from(-1), Ok(Direction::Prev));
        assert_eq!(Direction::try_from(1), Ok(Direction::Next));
        assert!(Direction::try_from(2).is_err());
    }
}
