//! Row virtualization for the guide body and channel sidebar.
//!
//! Only the rows intersecting the viewport (plus an overscan margin on each
//! side) are materialized. Padding helpers let a scroll surface reserve the
//! space of the rows it skips so the scroll extent stays correct.

/// Default number of rows rendered above/below the viewport.
pub const DEFAULT_OVERSCAN_ROWS: usize = 10;

/// Half-open row range `[start, end)` to materialize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleRowRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRowRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, row: usize) -> bool {
        self.start <= row && row < self.end
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Computes the rows to materialize for a vertical scroll position.
///
/// `start = max(0, floor(scroll_top / row_height) - overscan)` and
/// `end = min(total_rows, ceil((scroll_top + viewport_height) / row_height) + overscan)`.
/// The result always satisfies `0 <= start <= end <= total_rows`, also for
/// scroll positions past the last row and for degenerate inputs.
pub fn compute_range(
    scroll_top: f32,
    viewport_height: f32,
    row_height: f32,
    total_rows: usize,
    overscan: usize,
) -> VisibleRowRange {
    if total_rows == 0 || !(row_height > 0.0) {
        return VisibleRowRange::default();
    }

    let scroll_top = if scroll_top.is_finite() { scroll_top.max(0.0) } else { 0.0 };
    let viewport_height = if viewport_height.is_finite() {
        viewport_height.max(0.0)
    } else {
        0.0
    };

    let first_row = row_index((scroll_top / row_height).floor());
    let last_row = row_index(((scroll_top + viewport_height) / row_height).ceil());

    let end = last_row.saturating_add(overscan).min(total_rows);
    let start = first_row.saturating_sub(overscan).min(end);

    VisibleRowRange { start, end }
}

fn row_index(value: f32) -> usize {
    if value >= usize::MAX as f32 {
        usize::MAX
    } else {
        value as usize
    }
}

/// Height reserved above the materialized rows.
pub fn top_padding(range: VisibleRowRange, row_height: f32) -> f32 {
    range.start as f32 * row_height
}

/// Height reserved below the materialized rows.
pub fn bottom_padding(range: VisibleRowRange, total_rows: usize, row_height: f32) -> f32 {
    total_rows.saturating_sub(range.end) as f32 * row_height
}

/// Full scrollable height of `total_rows` rows.
pub fn content_height(total_rows: usize, row_height: f32) -> f32 {
    total_rows as f32 * row_height
}

/// Row height and overscan for one scroll surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowVirtualizer {
    pub row_height: f32,
    pub overscan: usize,
}

impl Default for RowVirtualizer {
    fn default() -> Self {
        Self {
            row_height: 72.0,
            overscan: DEFAULT_OVERSCAN_ROWS,
        }
    }
}

impl RowVirtualizer {
    pub fn new(row_height: f32, overscan: usize) -> Self {
        Self { row_height, overscan }
    }

    pub fn range(
        &self,
        scroll_top: f32,
        viewport_height: f32,
        total_rows: usize,
    ) -> VisibleRowRange {
        compute_range(scroll_top, viewport_height, self.row_height, total_rows, self.overscan)
    }

    /// Vertical offset of the top edge of `row`.
    pub fn row_top(&self, row: usize) -> f32 {
        row as f32 * self.row_height
    }

    /// Row under a content-space y coordinate.
    pub fn row_at(&self, y: f32, total_rows: usize) -> Option<usize> {
        if y < 0.0 || !(self.row_height > 0.0) {
            return None;
        }
        let row = row_index((y / self.row_height).floor());
        (row < total_rows).then_some(row)
    }

    pub fn content_height(&self, total_rows: usize) -> f32 {
        content_height(total_rows, self.row_height)
    }
}
