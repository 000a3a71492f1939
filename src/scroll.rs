//! Scroll synchronization between the time header, channel sidebar and
//! program body.
//!
//! The body owns both axes. The header mirrors the body's horizontal offset
//! and the sidebar mirrors its vertical offset. A scroll event on any surface
//! is written into the body first and then projected onto the other two, so
//! no axis is ever driven by two surfaces in one event. Surfaces re-reporting
//! the offset they were just given are no-ops, which keeps programmatic
//! updates from echoing back as new events.

use chrono::{DateTime, Utc};

use crate::time_axis::TimeAxis;

/// One of the three scroll-capable guide surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollSurface {
    /// Time axis header, horizontal only
    Header,
    /// Channel list, vertical only
    Sidebar,
    /// Program cells, both axes
    Body,
}

/// A two-axis scroll offset in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f32,
    pub y: f32,
}

impl ScrollOffset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Keeps the three surfaces' offsets consistent.
///
/// Invariant after every call: `header_x == body.x` and `sidebar_y == body.y`.
#[derive(Debug, Clone, Default)]
pub struct ScrollCoordinator {
    body: ScrollOffset,
    header_x: f32,
    sidebar_y: f32,
    /// Scrollable content size of the body; zero means unknown
    content_width: f32,
    content_height: f32,
    viewport_width: f32,
    viewport_height: f32,
}

impl ScrollCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Queries =====

    pub fn body(&self) -> ScrollOffset {
        self.body
    }

    pub fn header_x(&self) -> f32 {
        self.header_x
    }

    pub fn sidebar_y(&self) -> f32 {
        self.sidebar_y
    }

    /// Offset a surface should currently display.
    pub fn offset_for(&self, surface: ScrollSurface) -> ScrollOffset {
        match surface {
            ScrollSurface::Header => ScrollOffset::new(self.header_x, 0.0),
            ScrollSurface::Sidebar => ScrollOffset::new(0.0, self.sidebar_y),
            ScrollSurface::Body => self.body,
        }
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    // ===== Extents =====

    /// Records the body's content and viewport sizes and re-clamps offsets.
    pub fn set_extents(
        &mut self,
        content_width: f32,
        content_height: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) {
        self.content_width = content_width.max(0.0);
        self.content_height = content_height.max(0.0);
        self.viewport_width = viewport_width.max(0.0);
        self.viewport_height = viewport_height.max(0.0);
        let body = self.body;
        self.apply(body);
    }

    fn max_x(&self) -> Option<f32> {
        (self.content_width > 0.0).then(|| (self.content_width - self.viewport_width).max(0.0))
    }

    fn max_y(&self) -> Option<f32> {
        (self.content_height > 0.0).then(|| (self.content_height - self.viewport_height).max(0.0))
    }

    // ===== Events =====

    /// Handles a user scroll on `surface`.
    ///
    /// Only the axes the surface owns are read from `offset`. Returns `true`
    /// when any surface's offset changed.
    pub fn on_scroll(&mut self, surface: ScrollSurface, offset: ScrollOffset) -> bool {
        let mut target = self.body;
        match surface {
            ScrollSurface::Header => target.x = offset.x,
            ScrollSurface::Sidebar => target.y = offset.y,
            ScrollSurface::Body => target = offset,
        }
        self.apply(target)
    }

    /// Reconciles the offsets the three surfaces ended a frame with.
    ///
    /// Every surface was drawn at `shown` (the body offset at the start of
    /// the frame) and reports back what it displays now. A surface whose own
    /// axes still match `shown` did not move and is not forwarded, so its
    /// stale report cannot undo a scroll made on another surface.
    pub fn reconcile_frame(
        &mut self,
        shown: ScrollOffset,
        header_x: f32,
        sidebar_y: f32,
        body: ScrollOffset,
    ) -> bool {
        let mut changed = false;
        if body != shown {
            changed |= self.on_scroll(ScrollSurface::Body, body);
        }
        if header_x != shown.x {
            changed |= self.on_scroll(ScrollSurface::Header, ScrollOffset::new(header_x, 0.0));
        }
        if sidebar_y != shown.y {
            changed |= self.on_scroll(ScrollSurface::Sidebar, ScrollOffset::new(0.0, sidebar_y));
        }
        changed
    }

    /// Sets the body's horizontal offset directly.
    pub fn set_x(&mut self, x: f32) -> bool {
        self.apply(ScrollOffset::new(x, self.body.y))
    }

    /// Sets the body's vertical offset directly.
    pub fn set_y(&mut self, y: f32) -> bool {
        self.apply(ScrollOffset::new(self.body.x, y))
    }

    /// Scrolls horizontally so `instant` sits at the left edge.
    ///
    /// Instants outside the axis window clamp to the window start.
    pub fn scroll_to_instant(&mut self, axis: &TimeAxis, instant: DateTime<Utc>) -> bool {
        let x = if axis.is_visible(instant) {
            axis.offset_of(instant)
        } else {
            0.0
        };
        self.set_x(x)
    }

    /// Scrolls horizontally to the current time.
    pub fn scroll_to_now(&mut self, axis: &TimeAxis, now: DateTime<Utc>) -> bool {
        self.scroll_to_instant(axis, now)
    }

    /// Scrolls vertically just enough to bring `row` fully into view.
    pub fn scroll_to_row(&mut self, row: usize, row_height: f32) -> bool {
        let top = row as f32 * row_height;
        let bottom = top + row_height;
        let y = if top < self.body.y {
            top
        } else if self.viewport_height > 0.0 && bottom > self.body.y + self.viewport_height {
            bottom - self.viewport_height
        } else {
            return false;
        };
        self.set_y(y)
    }

    /// Resets every surface to the origin.
    pub fn reset(&mut self) {
        self.apply(ScrollOffset::default());
    }

    fn apply(&mut self, target: ScrollOffset) -> bool {
        let x = clamp_axis(target.x, self.max_x());
        let y = clamp_axis(target.y, self.max_y());

        let changed = x != self.body.x
            || y != self.body.y
            || x != self.header_x
            || y != self.sidebar_y;

        self.body = ScrollOffset::new(x, y);
        self.header_x = x;
        self.sidebar_y = y;
        changed
    }
}

fn clamp_axis(value: f32, max: Option<f32>) -> f32 {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    match max {
        Some(max) => value.min(max),
        None => value,
    }
}
