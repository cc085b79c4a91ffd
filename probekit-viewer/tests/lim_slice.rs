#![allow(clippy::float_cmp, clippy::cast_precision_loss)]
use ndarray::Array2;
use probekit_core::{Bounds, Raster, PALETTE};
use probekit_viewer::{
    Button, Error, ExportReport, Interactive, LimSlice, PointerEvent, Probe, ProbeSession,
    RegionId, TextEdit, ViewBox, ViewerConfig,
};

/// 50x50 channel whose value is the column index.
fn columns() -> Raster {
    Raster::from_plane(Array2::from_shape_fn((50, 50), |(_, c)| c as f64)).unwrap()
}

fn lim_slice() -> Interactive<LimSlice> {
    let config = ViewerConfig::new().with_input_scale(1).with_output_size(100, 80);
    let input = config.input_surface("channel", columns());
    let crop = config.output_surface("crop", ViewBox::image(50, 50));
    let profile = config.output_surface("profile", ViewBox::new((0.0, 50.0), (0.0, 1.0)));
    Interactive::new(LimSlice::new(input, crop, profile, config.image_colormap))
}

fn drag(probe: &mut Interactive<LimSlice>, from: (f64, f64), to: (f64, f64), button: Button) {
    probe.press(PointerEvent::new(from.0, from.1, button)).unwrap();
    probe.motion(PointerEvent::new(to.0, to.1, button)).unwrap();
    probe.release(PointerEvent::new(to.0, to.1, button)).unwrap();
}

fn click(probe: &mut Interactive<LimSlice>, at: (f64, f64), button: Button) {
    probe.press(PointerEvent::new(at.0, at.1, button)).unwrap();
    probe.release(PointerEvent::new(at.0, at.1, button)).unwrap();
}

/// Drops a line on the crop surface through its own session.
fn drop_line(probe: &mut Interactive<LimSlice>, from: f64, to: f64) {
    let mut session = ProbeSession::new();
    let container = probe.probe_mut().container_mut();
    session
        .press(container, &PointerEvent::new(from, 3.0, Button::Primary))
        .unwrap();
    session
        .motion(container, &PointerEvent::new(to, 3.0, Button::Primary))
        .unwrap();
    session
        .release(container, &PointerEvent::new(to, 3.0, Button::Primary))
        .unwrap();
}

/// R0 at (10,10,30,25) with one stored line at crop column 7.
fn with_first_region() -> (Interactive<LimSlice>, RegionId) {
    let mut probe = lim_slice();
    drag(&mut probe, (10.0, 10.0), (30.0, 25.0), Button::Primary);
    let first = probe.probe().window().selected().unwrap();
    drop_line(&mut probe, 5.2, 7.0);
    (probe, first)
}

#[test]
fn test_crop_follows_rectangle() {
    let (probe, first) = with_first_region();
    let probe = probe.probe();
    assert_eq!(probe.window().points(), Some(Bounds::new(10, 10, 30, 25)));
    assert_eq!(probe.image().extent(), (20, 15));
    assert_eq!(probe.container().key(), Some(first));
    assert_eq!(probe.bounds_text(), "x0=10 y0=10 x1=30 y1=25");
}

#[test]
fn test_released_line_is_stored_under_the_selected_rectangle() {
    let (probe, first) = with_first_region();
    let container = probe.probe().container();
    assert_eq!(container.positions(first), &[7]);
    assert_eq!(container.text(), "7");
    assert_eq!(container.slice().curves().len(), 1);
}

#[test]
fn test_reselecting_same_key_causes_no_actor_churn() {
    let (mut probe, first) = with_first_region();
    let before = (
        probe.probe().pane(probekit_viewer::Pane::Output).unwrap().stats(),
        probe.probe().pane(probekit_viewer::Pane::Detail).unwrap().stats(),
    );
    let lines: Vec<_> = probe.probe().container().slice().lines().committed().to_vec();

    assert!(!probe.probe_mut().container_mut().set_key(Some(first)));
    click(&mut probe, (20.0, 20.0), Button::Secondary);

    let after = (
        probe.probe().pane(probekit_viewer::Pane::Output).unwrap().stats(),
        probe.probe().pane(probekit_viewer::Pane::Detail).unwrap().stats(),
    );
    assert_eq!(before.0.actors_added, after.0.actors_added);
    assert_eq!(before.0.actors_removed, after.0.actors_removed);
    assert_eq!(before.1.actors_added, after.1.actors_added);
    assert_eq!(before.1.actors_removed, after.1.actors_removed);
    assert_eq!(probe.probe().container().slice().lines().committed(), lines.as_slice());
}

#[test]
fn test_switching_keys_restores_lines() {
    let (mut probe, first) = with_first_region();
    drag(&mut probe, (35.0, 35.0), (45.0, 45.0), Button::Primary);
    let second = probe.probe().window().selected().unwrap();
    assert_ne!(first, second);
    assert!(probe.probe().container().slice().positions().is_empty());
    assert_eq!(probe.probe().lines_text(), "");

    click(&mut probe, (20.0, 20.0), Button::Secondary);
    let container = probe.probe().container();
    assert_eq!(container.key(), Some(first));
    assert_eq!(container.slice().positions(), vec![7]);
    assert_eq!(container.slice().lines().committed()[0].color, PALETTE[0]);
    assert_eq!(probe.probe().image().extent(), (20, 15));
}

#[test]
fn test_shrinking_clamps_drawn_lines_but_keeps_stored_positions() {
    let (mut probe, first) = with_first_region();
    let edit = probe
        .probe_mut()
        .apply_bounds_text("x0=10 y0=10 x1=15 y1=25")
        .unwrap();
    assert_eq!(edit, TextEdit::Applied);
    assert_eq!(probe.probe().image().extent(), (5, 15));
    assert_eq!(probe.probe().container().slice().positions(), vec![4]);
    assert_eq!(probe.probe().container().positions(first), &[7]);

    let ExportReport::LimSlice { regions, lines } =
        probekit_viewer::export::lim_slice_report(probe.probe())
    else {
        panic!("wrong report kind");
    };
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].area, 75);
    assert_eq!(lines[0].stored, 7);
    assert_eq!(lines[0].x, 4);
    assert_eq!(lines[0].x_abs, 14);
    assert_eq!(lines[0].values, vec![14.0; 15]);
}

#[test]
fn test_export_reports_the_sampled_column_after_shrinking() {
    let config = ViewerConfig::new().with_input_scale(1).with_output_size(100, 80);
    let channel =
        Raster::from_plane(Array2::from_shape_fn((50, 50), |(r, c)| (r + c + 1) as f64)).unwrap();
    let input = config.input_surface("channel", channel);
    let crop = config.output_surface("crop", ViewBox::image(50, 50));
    let profile = config.output_surface("profile", ViewBox::new((0.0, 50.0), (0.0, 1.0)));
    let mut probe = Interactive::new(LimSlice::new(input, crop, profile, config.image_colormap));

    drag(&mut probe, (9.0, 9.0), (30.0, 30.0), Button::Primary);
    assert_eq!(probe.probe_mut().apply_lines_text("4 8 13"), Ok(TextEdit::Applied));
    assert_eq!(
        probe.probe_mut().apply_bounds_text("x0=9 y0=9 x1=12 y1=30"),
        Ok(TextEdit::Applied)
    );

    let ExportReport::LimSlice { regions, lines } =
        probekit_viewer::export::lim_slice_report(probe.probe())
    else {
        panic!("wrong report kind");
    };
    let (x0, x1) = (regions[0].x0, regions[0].x1);
    assert_eq!((x0, x1), (9, 12));
    assert_eq!(
        lines.iter().map(|l| l.stored).collect::<Vec<_>>(),
        vec![4, 8, 13]
    );
    for line in &lines {
        assert_eq!(line.x, 2);
        assert!((x0..x1).contains(&line.x_abs));
        assert_eq!(line.values.len(), 21);
        // Row 9 of column x_abs.
        assert_eq!(line.values[0], (9 + line.x_abs + 1) as f64);
    }
}

#[test]
fn test_line_text_round_trip() {
    let (mut probe, first) = with_first_region();
    let edit = probe.probe_mut().apply_lines_text("3 9").unwrap();
    assert_eq!(edit, TextEdit::Applied);
    assert_eq!(probe.probe().container().positions(first), &[3, 9]);
    assert_eq!(probe.probe().lines_text(), "3 9");
    assert_eq!(probe.probe().container().slice().positions(), vec![3, 9]);

    assert_eq!(probe.probe_mut().apply_lines_text("3 9"), Ok(TextEdit::Unchanged));

    assert!(matches!(
        probe.probe_mut().apply_lines_text("3 x"),
        Err(Error::Core(probekit_core::Error::InputParse { .. }))
    ));
    assert!(probe.probe_mut().apply_lines_text("30").is_err());
    assert_eq!(probe.probe().container().positions(first), &[3, 9]);
    assert_eq!(probe.probe().container().slice().positions(), vec![3, 9]);
}

#[test]
fn test_text_edits_need_a_region() {
    let mut probe = lim_slice();
    assert_eq!(probe.probe_mut().apply_lines_text("1 2"), Err(Error::NoRegion));
    assert_eq!(
        probe.probe_mut().apply_bounds_text("x0=1 y0=1 x1=5 y1=5"),
        Err(Error::NoRegion)
    );
}

#[test]
fn test_empty_bounds_text_removes_region_and_lines() {
    let (mut probe, first) = with_first_region();
    assert_eq!(probe.probe_mut().apply_bounds_text(""), Ok(TextEdit::Removed));
    let probe = probe.probe();
    assert!(probe.window().regions().is_empty());
    assert_eq!(probe.container().key(), None);
    assert!(probe.container().positions(first).is_empty());
    assert!(probe.container().slice().positions().is_empty());
    assert_eq!(probe.bounds_text(), "");
}

#[test]
fn test_moving_rectangle_resamples_stored_lines() {
    let (mut probe, first) = with_first_region();
    drag(&mut probe, (15.0, 15.0), (20.0, 15.0), Button::Secondary);
    assert_eq!(probe.probe().window().selected(), Some(first));
    assert_eq!(probe.probe().bounds_text(), "x0=15 y0=10 x1=35 y1=25");
    assert_eq!(probe.probe().container().positions(first), &[7]);

    let slice = probe.probe().container().slice();
    let curve = slice.profile().actor(slice.curves()[0]).unwrap();
    let probekit_viewer::Geometry::Curve { points } = curve.geometry() else {
        panic!("profile is not a curve");
    };
    assert!(points.iter().all(|p| p[1] == 22.0));
}

#[test]
fn test_new_channel_resamples_profiles() {
    let (mut probe, _) = with_first_region();
    let doubled = Raster::from_plane(Array2::from_shape_fn((50, 50), |(_, c)| 2.0 * c as f64)).unwrap();
    probe.probe_mut().set_channel(doubled).unwrap();
    let slice = probe.probe().container().slice();
    let curve = slice.profile().actor(slice.curves()[0]).unwrap();
    let probekit_viewer::Geometry::Curve { points } = curve.geometry() else {
        panic!("profile is not a curve");
    };
    assert!(points.iter().all(|p| p[1] == 34.0));
}
