//! Platform glue
//!
//! Viewport bookkeeping for resize notifications. The browser entry point
//! feeds raw resize events through [`ResizeDebouncer`]; the scene only sees
//! the settled size.

use crate::consts::{CANVAS_MIN_SIZED_LEN, RESIZE_DEBOUNCE_MS};

/// Drawing area size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Width over height; 1 for a collapsed viewport
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Large enough on both sides to be worth drawing into
    pub fn is_sized(&self) -> bool {
        self.width > CANVAS_MIN_SIZED_LEN && self.height > CANVAS_MIN_SIZED_LEN
    }

    /// Drawing buffer size for a device pixel ratio
    pub fn physical(&self, pixel_ratio: f64) -> (u32, u32) {
        (
            ((self.width as f64 * pixel_ratio) as u32).max(1),
            ((self.height as f64 * pixel_ratio) as u32).max(1),
        )
    }
}

/// Coalesces bursts of resize events; only the last size is delivered once
/// no new event arrived for the debounce window.
#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    delay_ms: f64,
    pending: Option<(Viewport, f64)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE_MS)
    }
}

impl ResizeDebouncer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Record a raw resize event
    pub fn notify(&mut self, width: u32, height: u32, now_ms: f64) {
        self.pending = Some((Viewport::new(width, height), now_ms));
    }

    /// Settled size, if the window has elapsed since the last event
    pub fn poll(&mut self, now_ms: f64) -> Option<Viewport> {
        match self.pending {
            Some((viewport, at)) if now_ms - at >= self.delay_ms => {
                self.pending = None;
                Some(viewport)
            }
            _ => None,
        }
    }
}
