//! Scroll-triggered continuation
//!
//! A headless stand-in for a visibility observer. The caller reports the viewport
//! and the position of the sentinel row (the last rendered row); the trigger says
//! when the sentinel has just become visible enough to warrant loading the next page.
//!
//! All geometry is in content coordinates: `offset` is how far the viewport has
//! scrolled from the top of the list, and a row's `top` is its distance from the
//! top of the list.

use serde::Deserialize;

/// Observation options
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScrollOptions {
    /// Fraction of the sentinel that must be visible, `0.0..=1.0`
    #[serde(default = "ScrollOptions::default_threshold")]
    pub threshold: f32,
    /// Distance by which the viewport is grown on both ends before testing
    #[serde(default = "ScrollOptions::default_root_margin")]
    pub root_margin: f32,
}

impl ScrollOptions {
    fn default_threshold() -> f32 {
        0.1
    }

    fn default_root_margin() -> f32 {
        100.0
    }
}

impl Default for ScrollOptions {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
            root_margin: Self::default_root_margin(),
        }
    }
}

/// The visible window onto the list
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub offset: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(offset: f32, height: f32) -> Self {
        Self { offset, height }
    }
}

/// Position of the sentinel row
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SentinelRect {
    pub top: f32,
    pub height: f32,
}

impl SentinelRect {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }
}

/// What the list reports about itself when the trigger is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStatus {
    pub has_more: bool,
    pub in_flight: bool,
}

impl LoadStatus {
    fn can_load(&self) -> bool {
        self.has_more && !self.in_flight
    }
}

/// Fires once each time the sentinel crosses into view
#[derive(Debug, Clone, Default)]
pub struct ScrollTrigger {
    options: ScrollOptions,
    sentinel: Option<String>,
    intersecting: bool,
}

impl ScrollTrigger {
    pub fn new(options: ScrollOptions) -> Self {
        Self {
            options,
            sentinel: None,
            intersecting: false,
        }
    }

    pub fn options(&self) -> ScrollOptions {
        self.options
    }

    /// Key of the row currently observed
    pub fn sentinel(&self) -> Option<&str> {
        self.sentinel.as_deref()
    }

    pub fn is_observing(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Attach to the row identified by `key`
    ///
    /// Re-attaching to a different row starts a fresh observation. Returns whether the
    /// observed row changed.
    pub fn observe(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.sentinel.as_deref() == Some(key.as_str()) {
            return false;
        }
        log::trace!("Observing sentinel {key}");
        self.sentinel = Some(key);
        self.intersecting = false;
        true
    }

    /// Stop observing; a disconnected trigger never fires
    pub fn disconnect(&mut self) {
        if let Some(key) = self.sentinel.take() {
            log::trace!("Disconnected sentinel {key}");
        }
        self.intersecting = false;
    }

    /// Follow the current last row of the list
    ///
    /// `None` (an empty list) disconnects.
    pub fn sync_sentinel(&mut self, last_key: Option<&str>) -> bool {
        match last_key {
            Some(key) => self.observe(key),
            None => {
                let was_observing = self.is_observing();
                self.disconnect();
                was_observing
            }
        }
    }

    /// Fraction of `rect` inside the margin-expanded `viewport`
    pub fn visible_ratio(&self, viewport: Viewport, rect: SentinelRect) -> f32 {
        let root_top = viewport.offset - self.options.root_margin;
        let root_bottom = viewport.offset + viewport.height + self.options.root_margin;
        let rect_bottom = rect.top + rect.height;

        if rect.height <= 0.0 {
            return if rect.top >= root_top && rect.top <= root_bottom {
                1.0
            } else {
                0.0
            };
        }

        let overlap = rect_bottom.min(root_bottom) - rect.top.max(root_top);
        (overlap.max(0.0) / rect.height).min(1.0)
    }

    /// Evaluate the trigger for the current geometry
    ///
    /// Returns `true` exactly once per crossing into view, and only if the list can
    /// load more at that moment. A crossing that happens while loading is impossible
    /// is consumed without firing.
    pub fn check(&mut self, viewport: Viewport, rect: SentinelRect, status: LoadStatus) -> bool {
        if self.sentinel.is_none() {
            return false;
        }

        let ratio = self.visible_ratio(viewport, rect);
        let now_intersecting = ratio > 0.0 && ratio >= self.options.threshold;
        let crossed = now_intersecting && !self.intersecting;
        self.intersecting = now_intersecting;

        crossed && status.can_load()
    }
}
