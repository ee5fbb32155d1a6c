use super::*;

fn layout() -> ChartLayout {
    ChartLayout::new(&ChartStyle::default(), 50).unwrap()
}

#[test]
fn layout_uses_figure_size_and_dpi() {
    let l = layout();
    assert_eq!(l.canvas, Canvas { width: 450, height: 276 });
    assert!(l.plot.x0 > 0.0 && l.plot.x1 < 450.0);
    assert!(l.plot.y0 > 0.0 && l.plot.y1 < 276.0);
    assert!((l.pt(72.0) - 50.0).abs() < 1e-12);
}

#[test]
fn to_px_maps_axis_corners() {
    let l = layout();
    let origin = l.to_px(0.0, 0.0);
    assert!((origin.x - l.plot.x0).abs() < 1e-9);
    assert!((origin.y - l.plot.y1).abs() < 1e-9);

    let top_right = l.to_px(365.0, 10.0);
    assert!((top_right.x - l.plot.x1).abs() < 1e-9);
    assert!((top_right.y - l.plot.y0).abs() < 1e-9);
}

#[test]
fn grid_and_ticks_follow_the_chart_axes() {
    let l = layout();
    let days = l.grid_days();
    assert_eq!(days.len(), 11);
    assert_eq!(days[0], 30.0);
    assert_eq!(days[10], 335.0);

    let values = l.grid_values();
    assert_eq!(values.len(), 10);
    assert_eq!(values[9], 10.0);

    assert_eq!(l.month_ticks().len(), MONTHS.len());
    assert_eq!(l.value_ticks(), (0..=10).map(f64::from).collect::<Vec<_>>());
}

#[test]
fn value_ticks_thin_out_for_wide_ranges() {
    let style = ChartStyle {
        y_min: -30.0,
        y_max: 30.0,
        ..ChartStyle::default()
    };
    let l = ChartLayout::new(&style, 50).unwrap();
    assert_eq!(
        l.value_ticks(),
        vec![-30.0, -24.0, -18.0, -12.0, -6.0, 0.0, 6.0, 12.0, 18.0, 24.0, 30.0]
    );
}

#[test]
fn polyline_inside_range_is_one_subpath() {
    let l = layout();
    let path = l.polyline([(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
    let moves = path
        .elements()
        .iter()
        .filter(|e| matches!(e, kurbo::PathEl::MoveTo(_)))
        .count();
    assert_eq!(moves, 1);
    assert_eq!(path.elements().len(), 3);
}

#[test]
fn polyline_is_clipped_to_value_range() {
    let l = layout();
    // Goes above the range and comes back.
    let path = l.polyline([(1.0, 5.0), (2.0, 20.0), (3.0, 5.0)]);
    for el in path.elements() {
        if let kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) = el {
            assert!(p.y >= l.plot.y0 - 1e-9 && p.y <= l.plot.y1 + 1e-9);
        }
    }
    let moves = path
        .elements()
        .iter()
        .filter(|e| matches!(e, kurbo::PathEl::MoveTo(_)))
        .count();
    assert_eq!(moves, 2);
}

#[test]
fn value_ticks_terminate_for_huge_offsets() {
    let style = ChartStyle {
        y_min: 1e17,
        y_max: 1.000_000_000_000_000_64e17,
        ..ChartStyle::default()
    };
    let l = ChartLayout::new(&style, 50).unwrap();
    let ticks = l.value_ticks();
    assert!(!ticks.is_empty());
    assert!(ticks.len() <= 11);
    assert!(ticks.windows(2).all(|w| w[0] < w[1]));
    assert!(ticks.iter().all(|v| *v <= style.y_max));
}

#[test]
fn polyline_fully_outside_is_empty() {
    let l = layout();
    assert!(l.polyline([(1.0, -5.0), (2.0, -6.0)]).elements().is_empty());
    assert!(l.polyline([(1.0, 5.0)]).elements().is_empty());
}

#[test]
fn style_validation_rejects_inverted_range() {
    let style = ChartStyle {
        y_min: 5.0,
        y_max: 5.0,
        ..ChartStyle::default()
    };
    assert!(ChartLayout::new(&style, 50).is_err());
}

#[test]
fn linspace_endpoints() {
    assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
    assert!(linspace(0.0, 1.0, 0).is_empty());
    assert_eq!(linspace(2.0, 9.0, 1), vec![2.0]);
}
