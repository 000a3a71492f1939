use chrono::{DateTime, Duration, TimeZone, Utc};
use guidegrid::channel_filter::filter;
use guidegrid::now_indicator::position;
use guidegrid::{
    compute_range, Channel, FilterCriteria, PixelDensity, Program, ProgramFlags,
    ProgramLayoutCalculator, ScrollCoordinator, ScrollOffset, ScrollSurface, Selection, TimeAxis,
    TimeWindow,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

const GROUPS: &[&str] = &["News", "Sports", "Movies", "Kids"];
const SOURCES: &[&str] = &["Antenna", "Cable"];

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn axis(window_start_min: i64, hours: u32) -> TimeAxis {
    let start = base() + Duration::minutes(window_start_min);
    let window = TimeWindow::from_hours(start, hours).unwrap();
    TimeAxis::new(window, PixelDensity::default(), 30)
}

/// Back-to-back programs starting at `first_min`, one per duration.
fn programs(first_min: i64, durations: &[i64]) -> Vec<Program> {
    let mut cursor = base() + Duration::minutes(first_min);
    durations
        .iter()
        .enumerate()
        .map(|(i, minutes)| {
            let start = cursor;
            cursor += Duration::minutes(*minutes);
            Program {
                id: i as i64 + 1,
                channel_id: "k".to_string(),
                title: format!("P{}", i),
                subtitle: None,
                description: None,
                start,
                end: cursor,
                category: None,
                flags: ProgramFlags::default(),
            }
        })
        .collect()
}

fn channel_strategy() -> impl Strategy<Value = Channel> {
    (1_i64..1000, 0..GROUPS.len(), 0..SOURCES.len(), "[a-z ]{0,8}", any::<bool>()).prop_map(
        |(id, group, source, name, mapped)| Channel {
            id,
            channel_id: format!("k{}", id),
            number: id.to_string(),
            name,
            logo: None,
            group: GROUPS[group].to_string(),
            source_name: SOURCES[source].to_string(),
            stream_url: None,
            enabled: true,
            epg_mapped: mapped,
        },
    )
}

fn selection_strategy(values: &'static [&'static str]) -> impl Strategy<Value = Selection> {
    prop_oneof![
        Just(Selection::All),
        (0..values.len()).prop_map(move |i| Selection::Only(values[i].to_string())),
    ]
}

fn criteria_strategy() -> impl Strategy<Value = FilterCriteria> {
    (selection_strategy(GROUPS), selection_strategy(SOURCES), "[a-z]{0,2}", any::<bool>()).prop_map(
        |(group, source, search, unmapped_only)| FilterCriteria {
            group,
            source,
            search,
            unmapped_only,
        },
    )
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn intersecting_programs_get_one_cell_within_bounds(
        window_start in 0_i64..600,
        first in 0_i64..900,
        durations in prop::collection::vec(1_i64..180, 0..24),
        min_width in 0.0_f32..20.0
    ) {
        let axis = axis(window_start, 4);
        let list = programs(first, &durations);
        let cells = ProgramLayoutCalculator::new(min_width).layout(&list, &axis);
        let window = axis.window();

        let intersecting: Vec<i64> = list
            .iter()
            .filter(|p| window.intersects(p.start, p.end))
            .map(|p| p.id)
            .collect();
        let laid_out: Vec<i64> = cells.iter().map(|c| c.program.id).collect();
        prop_assert_eq!(laid_out, intersecting);

        for cell in &cells {
            prop_assert!(cell.start_offset_px >= 0.0);
            prop_assert!(cell.width_px >= 0.0);
            prop_assert!(cell.end_offset_px() <= axis.total_width() + 0.01);
        }
    }

    #[test]
    fn programs_outside_window_produce_no_cells(
        durations in prop::collection::vec(1_i64..120, 1..12),
        gap in 0_i64..300
    ) {
        let axis = axis(24 * 60, 4);
        let total: i64 = durations.iter().sum();

        // Entirely before the window, ending at or before its start
        let before = programs(24 * 60 - total - gap, &durations);
        prop_assert!(ProgramLayoutCalculator::default().layout(&before, &axis).is_empty());

        // Entirely after, starting at or after its end
        let after = programs(28 * 60 + gap, &durations);
        prop_assert!(ProgramLayoutCalculator::default().layout(&after, &axis).is_empty());
    }

    #[test]
    fn virtualized_range_stays_in_bounds(
        scroll_top in -1000.0_f32..100_000.0,
        viewport in 0.0_f32..4000.0,
        row_height in 1.0_f32..200.0,
        total in 0_usize..5000,
        overscan in 0_usize..30
    ) {
        let range = compute_range(scroll_top, viewport, row_height, total, overscan);
        prop_assert!(range.start <= range.end);
        prop_assert!(range.end <= total);
    }

    #[test]
    fn filter_is_idempotent_and_preserves_order(
        channels in prop::collection::vec(channel_strategy(), 0..40),
        criteria in criteria_strategy()
    ) {
        let has_epg = |c: &Channel| c.epg_mapped;
        let once: Vec<Channel> =
            filter(&channels, &criteria, has_epg).into_iter().cloned().collect();
        let twice: Vec<Channel> = filter(&once, &criteria, has_epg).into_iter().cloned().collect();
        prop_assert_eq!(&once, &twice);

        // Output is a subsequence of the input
        let mut remaining = channels.iter();
        for kept in &once {
            prop_assert!(remaining.any(|c| c == kept));
        }
    }

    #[test]
    fn header_and_sidebar_follow_body(
        events in prop::collection::vec((0_u8..3, 0.0_f32..5000.0, 0.0_f32..5000.0), 1..20)
    ) {
        let mut scroll = ScrollCoordinator::new();
        for (surface, x, y) in events {
            let surface = match surface {
                0 => ScrollSurface::Header,
                1 => ScrollSurface::Sidebar,
                _ => ScrollSurface::Body,
            };
            scroll.on_scroll(surface, ScrollOffset::new(x, y));
            prop_assert_eq!(scroll.header_x(), scroll.body().x);
            prop_assert_eq!(scroll.sidebar_y(), scroll.body().y);
        }
    }

    #[test]
    fn now_line_visible_exactly_inside_window(
        window_start in 0_i64..1440,
        now_min in -240_i64..1920,
        now_sec in 0_i64..60
    ) {
        let axis = axis(window_start, 4);
        let now = base() + Duration::minutes(now_min) + Duration::seconds(now_sec);
        let window = axis.window();
        let expected = window.start() <= now && now < window.end();
        prop_assert_eq!(position(&axis, now).visible, expected);
    }
}
