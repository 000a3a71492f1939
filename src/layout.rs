//! Program cell layout for one channel row.
//!
//! Each program intersecting the window becomes a cell with a start offset
//! and width on the time axis, clipped to the window edges. Programs wholly
//! outside the window, and malformed programs, produce no cell.
//!
//! The calculator assumes a channel's programs are sorted and do not overlap;
//! it does not defend against overlap.

use crate::model::Program;
use crate::time_axis::TimeAxis;

/// Default minimum cell width so very short programs stay clickable.
pub const DEFAULT_MIN_CELL_WIDTH: f32 = 4.0;

/// Horizontal placement of one program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramCell<'a> {
    pub program: &'a Program,
    pub start_offset_px: f32,
    pub width_px: f32,
    /// Program began before the window start
    pub clipped_start: bool,
    /// Program runs past the window end
    pub clipped_end: bool,
}

impl<'a> ProgramCell<'a> {
    pub fn end_offset_px(&self) -> f32 {
        self.start_offset_px + self.width_px
    }

    pub fn contains_offset(&self, offset_px: f32) -> bool {
        self.start_offset_px <= offset_px && offset_px < self.end_offset_px()
    }
}

/// What a channel row shows for the current window.
#[derive(Debug, Clone, PartialEq)]
pub enum RowContent<'a> {
    Programs(Vec<ProgramCell<'a>>),
    /// The channel has guide data, but nothing in this window
    NoProgramsInWindow,
    /// The guide returned no data for this channel at all
    NoGuideData,
}

/// Lays out programs against an axis with a minimum cell width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgramLayoutCalculator {
    pub min_cell_width: f32,
}

impl Default for ProgramLayoutCalculator {
    fn default() -> Self {
        Self {
            min_cell_width: DEFAULT_MIN_CELL_WIDTH,
        }
    }
}

impl ProgramLayoutCalculator {
    pub fn new(min_cell_width: f32) -> Self {
        Self {
            min_cell_width: min_cell_width.max(0.0),
        }
    }

    /// Computes cells for every program intersecting the axis window.
    ///
    /// Widths are raised to the minimum but never extend past the window end.
    pub fn layout<'a>(&self, programs: &'a [Program], axis: &TimeAxis) -> Vec<ProgramCell<'a>> {
        let window = axis.window();
        let window_end_px = axis.total_width();

        programs
            .iter()
            .filter(|p| p.is_well_formed() && window.intersects(p.start, p.end))
            .map(|program| {
                let visible_start = program.start.max(window.start());
                let visible_end = program.end.min(window.end());

                let start_offset_px = axis.offset_of(visible_start).max(0.0);
                let raw_width = axis.offset_of(visible_end) - start_offset_px;
                let room = (window_end_px - start_offset_px).max(0.0);
                let width_px = raw_width.max(self.min_cell_width).min(room);

                ProgramCell {
                    program,
                    start_offset_px,
                    width_px,
                    clipped_start: program.start < window.start(),
                    clipped_end: program.end > window.end(),
                }
            })
            .collect()
    }

    /// Lays out a channel's row, distinguishing the two empty states.
    ///
    /// `programs` is the channel's list in the guide for this window, `None`
    /// when the guide returned nothing for it. Guide sources only return
    /// programs intersecting the window, so a missing list on a channel with
    /// EPG data means a quiet window, not missing data.
    pub fn layout_row<'a>(
        &self,
        programs: Option<&'a [Program]>,
        has_epg_data: bool,
        axis: &TimeAxis,
    ) -> RowContent<'a> {
        match programs {
            Some(list) if has_programs_in_window(list, axis) => {
                RowContent::Programs(self.layout(list, axis))
            }
            Some(list) if !list.is_empty() => RowContent::NoProgramsInWindow,
            _ if has_epg_data => RowContent::NoProgramsInWindow,
            _ => RowContent::NoGuideData,
        }
    }
}

/// True when any well-formed program overlaps the axis window.
pub fn has_programs_in_window(programs: &[Program], axis: &TimeAxis) -> bool {
    let window = axis.window();
    programs
        .iter()
        .any(|p| p.is_well_formed() && window.intersects(p.start, p.end))
}

/// Cell under a horizontal content offset, for click hit-testing.
pub fn program_at<'c, 'a>(
    cells: &'c [ProgramCell<'a>],
    offset_px: f32,
) -> Option<&'c ProgramCell<'a>> {
    let idx = cells.partition_point(|cell| cell.end_offset_px() <= offset_px);
    cells.get(idx).filter(|cell| cell.contains_offset(offset_px))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgramFlags;
    use crate::time_axis::{PixelDensity, TimeWindow};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, 0).unwrap()
    }

    fn program(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Program {
        Program {
            id,
            channel_id: "c".into(),
            title: format!("P{}", id),
            subtitle: None,
            description: None,
            start,
            end,
            category: None,
            flags: ProgramFlags::default(),
        }
    }

    fn axis() -> TimeAxis {
        TimeAxis::new(TimeWindow::new(at(10, 0), at(14, 0)).unwrap(), PixelDensity::new(4, 1), 30)
    }

    #[test]
    fn test_program_straddling_window_start_is_clipped() {
        let programs = vec![program(1, at(9, 30), at(10, 30))];
        let a = axis();
        let cells = ProgramLayoutCalculator::default().layout(&programs, &a);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].start_offset_px, 0.0);
        assert_eq!(cells[0].width_px, a.offset_of(at(10, 30)) - a.offset_of(at(10, 0)));
        assert!(cells[0].clipped_start);
        assert!(!cells[0].clipped_end);
    }

    #[test]
    fn test_programs_outside_window_skipped() {
        let programs = vec![
            program(1, at(8, 0), at(10, 0)),
            program(2, at(10, 0), at(11, 0)),
            program(3, at(14, 0), at(15, 0)),
        ];
        let cells = ProgramLayoutCalculator::default().layout(&programs, &axis());
        assert_eq!(cells.iter().map(|c| c.program.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_malformed_programs_dropped_silently() {
        let programs = vec![program(1, at(11, 0), at(11, 0)), program(2, at(12, 0), at(11, 0))];
        assert!(ProgramLayoutCalculator::default().layout(&programs, &axis()).is_empty());
    }

    #[test]
    fn test_program_straddling_window_end() {
        let programs = vec![program(1, at(13, 30), at(15, 0))];
        let a = axis();
        let cells = ProgramLayoutCalculator::default().layout(&programs, &a);
        assert_eq!(cells[0].start_offset_px, 840.0);
        assert_eq!(cells[0].end_offset_px(), a.total_width());
        assert!(cells[0].clipped_end);
    }

    #[test]
    fn test_min_width_floor_never_passes_window_end() {
        let short = program(1, at(11, 0), at(11, 0) + chrono::Duration::seconds(20));
        let tail = program(2, at(14, 0) - chrono::Duration::seconds(10), at(14, 5));
        let programs = vec![short, tail];
        let a = axis();
        let cells = ProgramLayoutCalculator::new(6.0).layout(&programs, &a);
        assert_eq!(cells[0].width_px, 6.0);
        assert!(cells[1].end_offset_px() <= a.total_width());
        assert!(cells[1].width_px < 6.0);
    }

    #[test]
    fn test_row_content_states() {
        let calc = ProgramLayoutCalculator::default();
        let a = axis();
        let outside = vec![program(1, at(6, 0), at(7, 0))];
        let inside = vec![program(2, at(12, 0), at(13, 0))];

        assert_eq!(calc.layout_row(None, false, &a), RowContent::NoGuideData);
        assert_eq!(calc.layout_row(Some(&[][..]), false, &a), RowContent::NoGuideData);
        assert_eq!(
            calc.layout_row(Some(outside.as_slice()), false, &a),
            RowContent::NoProgramsInWindow
        );
        assert!(matches!(
            calc.layout_row(Some(inside.as_slice()), true, &a),
            RowContent::Programs(cells) if cells.len() == 1
        ));
        assert!(!has_programs_in_window(&outside, &a));
        assert!(has_programs_in_window(&inside, &a));
    }

    #[test]
    fn test_mapped_channel_absent_from_guide_is_a_quiet_window() {
        let calc = ProgramLayoutCalculator::default();
        let a = axis();
        assert_eq!(calc.layout_row(None, true, &a), RowContent::NoProgramsInWindow);
        assert_eq!(calc.layout_row(Some(&[][..]), true, &a), RowContent::NoProgramsInWindow);
    }

    #[test]
    fn test_program_at_hit_testing() {
        let programs = vec![
            program(1, at(10, 0), at(10, 30)),
            program(2, at(10, 30), at(11, 30)),
            program(3, at(12, 0), at(13, 0)),
        ];
        let cells = ProgramLayoutCalculator::default().layout(&programs, &axis());
        assert_eq!(program_at(&cells, 0.0).map(|c| c.program.id), Some(1));
        assert_eq!(program_at(&cells, 120.0).map(|c| c.program.id), Some(2));
        assert_eq!(program_at(&cells, 400.0), None);
        assert_eq!(program_at(&cells, 500.0).map(|c| c.program.id), Some(3));
    }
}
