//! Integration tests for coordinate mapping, navigation, ticks and layout.

use specview::viewport::{axis_ticks, nice_interval};
use specview::{
    Axis, AxisRange, ChartLayout, PixelPoint, Region, SelectionPolicy, SurfaceSize, ViewportError,
    ViewportMapper, WorldPoint,
};

fn mapper() -> ViewportMapper {
    ViewportMapper::new(
        (0.0, 10_000.0),
        (-150.0, 30.0),
        500,
        4800,
        SurfaceSize::new(400, 200),
    )
    .unwrap()
}

// ==================== Mapping ====================

#[test]
fn test_pixel_round_trip_within_one_pixel() {
    let mut m = mapper();
    m.set_view_freq_range(2_000.0, 6_000.0).unwrap();

    for x in 0..400 {
        let x = x as f64;
        let freq = m.pixel_to_value(Axis::Freq, x);
        assert!((2_000.0..6_000.0).contains(&freq));
        let back = m.value_to_pixel(Axis::Freq, freq);
        assert!((back - x).abs() <= 1.0, "x={x} came back as {back}");
    }
}

#[test]
fn test_world_round_trip() {
    let mut m = mapper();
    m.set_view_level_range(-120.0, -20.0).unwrap();
    let world = WorldPoint {
        freq: 7_250.0,
        level: -45.0,
        time: 0.0,
    };
    let pixel = m.world_to_pixel(world);
    let back = m.pixel_to_world(pixel);
    assert!((back.freq - world.freq).abs() < 1e-6);
    assert!((back.level - world.level).abs() < 1e-6);
}

#[test]
fn test_waterfall_pixels_run_down_in_time() {
    let m = mapper();
    let newest = m.world_to_waterfall_pixel(WorldPoint {
        freq: 0.0,
        level: 0.0,
        time: 0.0,
    });
    let older = m.world_to_waterfall_pixel(WorldPoint {
        freq: 0.0,
        level: 0.0,
        time: 250.0,
    });
    assert_eq!(newest.y, 0.0);
    assert_eq!(older.y, 100.0);
}

#[test]
fn test_bin_and_freq_conversion() {
    let m = mapper();
    assert_eq!(m.freq_to_index(5_000.0), 2400);
    assert_eq!(m.index_to_freq(2400), 5_000.0);
    // Out-of-range frequencies are not clamped
    assert!(m.freq_to_index(-100.0) < 0);
    assert!(m.freq_to_index(11_000.0) > 4800);
}

// ==================== Range Validation ====================

#[test]
fn test_rejected_ranges_leave_view_unchanged() {
    let mut m = mapper();
    m.set_view_freq_range(2_000.0, 6_000.0).unwrap();
    let before = m.view_space();

    let err = m.set_view_freq_range(6_000.0, 2_000.0).unwrap_err();
    assert_eq!(
        err,
        ViewportError::Range {
            axis: Axis::Freq,
            start: 6_000.0,
            end: 2_000.0
        }
    );
    assert!(m.set_view_freq_range(-1.0, 5_000.0).is_err());
    assert!(m.set_view_level_range(-200.0, 0.0).is_err());
    assert!(m.set_view_time_range(0.0, 501.0).is_err());

    assert_eq!(m.view_space(), before);
}

#[test]
fn test_data_range_change_resets_only_its_axis() {
    let mut m = mapper();
    m.set_view_freq_range(1_000.0, 2_000.0).unwrap();
    m.set_view_level_range(-100.0, -50.0).unwrap();
    m.set_data_range(100e6, 101e6).unwrap();

    assert_eq!(m.view_space().freq, AxisRange::new(100e6, 101e6));
    assert_eq!(m.view_space().level, AxisRange::new(-100.0, -50.0));
}

// ==================== Navigation ====================

#[test]
fn test_zoom_in_then_out_restores_view() {
    let mut m = mapper();
    m.set_view_freq_range(2_000.0, 6_000.0).unwrap();
    m.zoom_around_point(4_000.0, 0.5, Axis::Freq).unwrap();
    assert_eq!(m.view_space().freq, AxisRange::new(3_000.0, 5_000.0));
    m.zoom_around_point(4_000.0, 2.0, Axis::Freq).unwrap();
    assert_eq!(m.view_space().freq, AxisRange::new(2_000.0, 6_000.0));
}

#[test]
fn test_zoom_never_leaves_data_bounds() {
    let mut m = mapper();
    for anchor in [0.0, 1_234.0, 9_999.0] {
        m.zoom_around_point(anchor, 3.0, Axis::Freq).unwrap();
        let view = m.view_space().freq;
        assert!(m.data_space().freq.encloses(&view));
    }
    assert!(matches!(
        m.zoom_around_point(0.0, f64::NAN, Axis::Level),
        Err(ViewportError::InvalidScale(s)) if s.is_nan()
    ));
    assert!(m.zoom_around_point(0.0, -2.0, Axis::Freq).is_err());
}

#[test]
fn test_pan_preserves_span() {
    let mut m = mapper();
    m.set_view_freq_range(4_000.0, 5_000.0).unwrap();
    for delta in [-37.0, 120.0, -5_000.0, 5_000.0, 3.5] {
        m.pan_by(delta, Axis::Freq).unwrap();
        let view = m.view_space().freq;
        assert!((view.span() - 1_000.0).abs() < 1e-9);
        assert!(m.data_space().freq.encloses(&view));
    }
}

#[test]
fn test_time_axis_pan() {
    let mut m = mapper();
    m.set_view_time_range(0.0, 100.0).unwrap();
    // 200 px cover 100 rows: dragging up 20 px reveals older rows
    m.pan_by(-20.0, Axis::Time).unwrap();
    assert_eq!(m.view_space().time, AxisRange::new(10.0, 110.0));
}

#[test]
fn test_drag_selection_zoom() {
    let mut m = mapper();
    m.select_range_zoom(PixelPoint::new(100.0, 10.0), PixelPoint::new(300.0, 150.0))
        .unwrap();
    assert_eq!(m.view_space().freq, AxisRange::new(2_500.0, 7_500.0));

    // Selections are relative to the current view
    m.select_range_zoom(PixelPoint::new(0.0, 0.0), PixelPoint::new(200.0, 0.0))
        .unwrap();
    assert_eq!(m.view_space().freq, AxisRange::new(2_500.0, 5_000.0));
}

#[test]
fn test_reverse_selection_policies() {
    let mut m = mapper();
    m.select_range_zoom(PixelPoint::new(300.0, 0.0), PixelPoint::new(100.0, 0.0))
        .unwrap();
    assert_eq!(m.view_space().freq, AxisRange::new(2_500.0, 7_500.0));

    m.reset_all();
    m.set_selection_policy(SelectionPolicy::ReverseResets);
    m.set_view_freq_range(2_500.0, 7_500.0).unwrap();
    m.select_range_zoom(PixelPoint::new(300.0, 0.0), PixelPoint::new(100.0, 0.0))
        .unwrap();
    assert_eq!(m.view_space().freq, AxisRange::new(0.0, 10_000.0));
}

// ==================== Ticks ====================

#[test]
fn test_ticks_cover_view_at_readable_spacing() {
    let mut m = mapper();
    m.set_view_freq_range(1_000.0, 5_000.0).unwrap();
    let ticks = m.ticks(Axis::Freq);
    assert_eq!(
        ticks.iter().map(|t| t.value).collect::<Vec<_>>(),
        vec![1_000.0, 2_000.0, 3_000.0, 4_000.0, 5_000.0]
    );
    assert_eq!(ticks[0].pixel, 0.0);
    assert_eq!(ticks[4].pixel, 400.0);
}

#[test]
fn test_level_ticks_count_from_bottom() {
    let m = mapper();
    let ticks = m.ticks(Axis::Level);
    assert!(!ticks.is_empty());
    // Pixel rows decrease as levels rise
    for pair in ticks.windows(2) {
        assert!(pair[1].value > pair[0].value);
        assert!(pair[1].pixel < pair[0].pixel);
    }
}

#[test]
fn test_tick_edge_cases() {
    assert_eq!(nice_interval(0.0, 100.0), None);
    assert_eq!(nice_interval(100.0, 0.0), None);
    assert!(axis_ticks(AxisRange::new(5.0, 5.0), 100.0).is_empty());
    // A plot narrower than one cell still gets a tick interval
    assert_eq!(nice_interval(10.0, 20.0), Some(10.0));
}

// ==================== Layout ====================

#[test]
fn test_layout_regions_and_plot_mapping() {
    let layout = ChartLayout::new(850, 450, 50, 50, 15);
    assert_eq!(layout.plot_size(), SurfaceSize::new(800, 400));
    assert_eq!(layout.region_at(425.0, 200.0), Region::Plot);
    assert_eq!(layout.region_at(25.0, 200.0), Region::LevelAxis);
    assert_eq!(layout.region_at(425.0, 420.0), Region::FreqAxis);
    assert_eq!(layout.region_at(425.0, 440.0), Region::Scrollbar);
    assert_eq!(layout.region_at(900.0, 10.0), Region::Outside);
    assert_eq!(layout.to_plot(50.0, 30.0), PixelPoint::new(0.0, 30.0));
}

#[test]
fn test_scrollbar_thumb_tracks_view() {
    let layout = ChartLayout::new(450, 250, 50, 50, 15);
    let mut m = ViewportMapper::new((0.0, 10_000.0), (-150.0, 30.0), 10, 100, layout.plot_size())
        .unwrap();
    assert_eq!(layout.scrollbar_thumb(&m), (50.0, 450.0));
    m.set_view_freq_range(2_500.0, 5_000.0).unwrap();
    assert_eq!(layout.scrollbar_thumb(&m), (150.0, 250.0));
}
