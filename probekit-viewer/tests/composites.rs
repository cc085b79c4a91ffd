#![allow(clippy::float_cmp, clippy::cast_precision_loss)]
use std::rc::Rc;

use approx::assert_relative_eq;
use ndarray::{Array2, Array3};
use probekit_core::{Pixel, Raster};
use probekit_viewer::{
    Button, Colormap, Error, Geometry, HoverSlice, Interactive, Lumen, MeanSign, PointerAction,
    PointerEvent, Probe, Roi, Slice, Surface, SurfaceStyle, TextEdit, ViewBox,
};
use probekit_algorithms::SpectralConfig;

fn input(raster: Raster) -> Surface {
    Surface::scaled("input", raster, 1, Colormap::Grayscale, SurfaceStyle::default())
}

fn output(name: &str, view: ViewBox) -> Surface {
    Surface::fixed(name, 64, 48, view, SurfaceStyle::default())
}

fn drag<P: Probe>(probe: &mut Interactive<P>, from: (f64, f64), to: (f64, f64), button: Button) {
    probe.press(PointerEvent::new(from.0, from.1, button)).unwrap();
    probe.motion(PointerEvent::new(to.0, to.1, button)).unwrap();
    probe.release(PointerEvent::new(to.0, to.1, button)).unwrap();
}

/// Cube with value `10 * row + col + band` at every pixel.
fn gradient_cube(height: usize, width: usize, depth: usize) -> Raster {
    Raster::new(Array3::from_shape_fn((height, width, depth), |(r, c, b)| {
        (10 * r + c + b) as f64
    }))
    .unwrap()
}

#[test]
fn test_slice_line_rounds_and_follows_release() {
    let channel = Raster::from_plane(Array2::from_shape_fn((50, 50), |(r, _)| r as f64)).unwrap();
    let profile = output("profile", ViewBox::new((0.0, 50.0), (0.0, 1.0)));
    let mut slice = Interactive::new(Slice::new(input(channel), profile));

    slice
        .press(PointerEvent::new(12.6, 5.0, Button::Primary))
        .unwrap();
    assert_eq!(slice.probe().lines().current().map(|m| m.x), Some(13));
    slice
        .motion(PointerEvent::new(40.2, 5.0, Button::Primary))
        .unwrap();
    slice
        .release(PointerEvent::new(40.2, 5.0, Button::Primary))
        .unwrap();

    assert_eq!(slice.probe().positions(), vec![40]);
    assert!(!slice.probe().surface().is_animating());
    let curve = slice.probe().profile().actor(slice.probe().curves()[0]).unwrap();
    let Geometry::Curve { points } = curve.geometry() else {
        panic!("profile is not a curve");
    };
    assert_eq!(points.len(), 50);
    assert_eq!(points[20], [20.0, 20.0]);
}

#[test]
fn test_slice_fix_lim_uses_height_and_range() {
    let channel = Raster::from_plane(Array2::from_shape_fn((20, 30), |(r, c)| (r * c) as f64)).unwrap();
    let mut slice = Slice::new(input(channel), output("profile", ViewBox::new((0.0, 1.0), (0.0, 1.0))));
    slice.fix_lim();
    let view = slice.profile().view();
    assert_eq!(view.x, (0.0, 20.0));
    assert!(view.y.0 <= 0.0);
    assert!(view.y.1 >= 19.0 * 29.0);
}

#[test]
fn test_hover_preview_commit_and_leave() {
    let channel = Raster::filled(20, 30, 1, 1.0).unwrap();
    let profile = output("profile", ViewBox::new((0.0, 20.0), (0.0, 2.0)));
    let mut hover = Interactive::new(HoverSlice::new(input(channel), profile));
    assert!(!hover.probe().is_previewing());

    hover.motion(PointerEvent::hover(5.0, 3.0)).unwrap();
    assert!(hover.probe().is_previewing());
    assert!(hover.session().is_hovering());

    hover.handle(PointerAction::Leave).unwrap();
    assert!(!hover.probe().is_previewing());
    assert!(!hover.session().is_hovering());

    hover.motion(PointerEvent::hover(7.0, 3.0)).unwrap();
    hover
        .press(PointerEvent::new(8.0, 3.0, Button::Primary))
        .unwrap();
    assert_eq!(hover.probe().positions(), vec![8]);
    assert!(!hover.probe().is_previewing());
    assert!(!hover.session().is_active());
}

#[test]
fn test_roi_crop_of_zero_raster() {
    let channel = Raster::filled(50, 50, 1, 0.0).unwrap();
    let crop = output("crop", ViewBox::image(50, 50));
    let mut roi = Interactive::new(Roi::new(input(channel), crop, Colormap::Viridis));
    drag(&mut roi, (10.0, 10.0), (30.0, 25.0), Button::Primary);

    let sub = roi.probe().roi().unwrap();
    assert_eq!((sub.width(), sub.height()), (20, 15));
    assert!(sub.plane().iter().all(|v| *v == 0.0));
    assert_eq!(roi.probe().image().extent(), (20, 15));
    assert_eq!(roi.probe().crop().view(), ViewBox::image(20, 15));
}

#[test]
fn test_roi_ignores_degenerate_rectangle() {
    let channel = Raster::filled(50, 50, 1, 0.0).unwrap();
    let crop = output("crop", ViewBox::image(50, 50));
    let mut roi = Interactive::new(Roi::new(input(channel), crop, Colormap::Viridis));
    roi.press(PointerEvent::new(10.0, 10.0, Button::Primary))
        .unwrap();
    assert!(roi.probe().roi().is_none());
    assert_eq!(roi.probe().image().extent(), (50, 50));
}

#[test]
fn test_lumen_curve_follows_point_and_fits_limits() {
    let cube = Rc::new(gradient_cube(10, 10, 4));
    let channel = Raster::from_plane(cube.band(0).unwrap().to_owned()).unwrap();
    let spectra = output("spectra", ViewBox::new((0.0, 3.0), (0.0, 1.0)));
    let mut lumen = Interactive::new(Lumen::new(input(channel), Rc::clone(&cube), spectra, 0.05));

    lumen
        .press(PointerEvent::new(2.4, 3.6, Button::Primary))
        .unwrap();
    assert_eq!(
        lumen.probe().points().current().map(|m| m.pixel),
        Some(Pixel::new(2, 4))
    );
    lumen
        .motion(PointerEvent::new(5.0, 5.0, Button::Primary))
        .unwrap();
    lumen
        .release(PointerEvent::new(5.0, 5.0, Button::Primary))
        .unwrap();

    assert_eq!(lumen.probe().points().points(), vec![Pixel::new(5, 5)]);
    assert_eq!(lumen.probe().curves().len(), 1);
    assert_eq!(lumen.probe().spectrum(Pixel::new(5, 5)), vec![55.0, 56.0, 57.0, 58.0]);
    let view = lumen.probe().spectra().view();
    assert_relative_eq!(view.y.0, -0.05);
    assert_relative_eq!(view.y.1, 58.05, epsilon = 1e-12);
}

#[test]
fn test_lumen_low_curves_keep_unit_range() {
    let cube = Rc::new(Raster::filled(4, 4, 3, 0.25).unwrap());
    let channel = Raster::filled(4, 4, 1, 0.25).unwrap();
    let spectra = output("spectra", ViewBox::new((0.0, 2.0), (0.0, 1.0)));
    let mut lumen = Lumen::new(input(channel), cube, spectra, 0.05);
    lumen.set_points(&[Pixel::new(1, 1), Pixel::new(2, 2)]);
    assert_eq!(lumen.curves().len(), 2);
    assert_relative_eq!(lumen.spectra().view().y.1, 1.1, epsilon = 1e-12);
}

fn mean_sign(cube: Raster) -> Interactive<MeanSign> {
    let channel = Raster::from_plane(cube.band(0).unwrap().to_owned()).unwrap();
    let depth = cube.depth();
    let probe = MeanSign::new(
        input(channel),
        Rc::new(cube),
        output("mean", ViewBox::new((0.0, 2.0), (0.0, 1.0))),
        output("matrix", ViewBox::image(depth, depth)),
        probekit_core::Color::rgb(0, 255, 0),
        Colormap::Spectral,
        SpectralConfig::default(),
    )
    .unwrap();
    Interactive::new(probe)
}

#[test]
fn test_mean_sign_all_ones_region() {
    let mut probe = mean_sign(Raster::filled(10, 10, 3, 1.0).unwrap());
    drag(&mut probe, (2.0, 2.0), (6.0, 6.0), Button::Primary);

    assert_eq!(probe.probe().spectrum().to_vec(), vec![1.0, 1.0, 1.0]);
    let matrix = probe.probe().matrix().unwrap();
    assert_eq!(matrix.dim(), (3, 3));
    assert!(matrix.iter().all(|v| *v == 0.0));
    assert_eq!(probe.probe().text(), "x0=2 y0=2 x1=6 y1=6");
}

#[test]
fn test_mean_sign_ratio_matrix_and_removal() {
    let mut data = Array3::<f64>::zeros((8, 8, 3));
    for ((r, c, b), value) in data.indexed_iter_mut() {
        *value = if r < 4 && c < 4 { (b + 1) as f64 } else { 0.0 };
    }
    let mut probe = mean_sign(Raster::new(data).unwrap());
    drag(&mut probe, (0.0, 0.0), (4.0, 4.0), Button::Primary);

    let matrix = probe.probe().matrix().unwrap().clone();
    assert_relative_eq!(matrix[[0, 1]], -1.0 / 3.0, epsilon = 1e-12);
    assert_relative_eq!(matrix[[2, 0]], 0.5);

    assert_eq!(probe.probe_mut().apply_text(""), Ok(TextEdit::Removed));
    assert!(probe.probe().window().regions().is_empty());
    let whole: Vec<f64> = probe.probe().spectrum().to_vec();
    assert_relative_eq!(whole[0], 0.25);
    assert_relative_eq!(whole[2], 0.75);
    assert_eq!(probe.probe_mut().apply_text("x0=1 y0=1 x1=2 y1=2"), Err(Error::NoRegion));
}

#[test]
fn test_mean_sign_bounds_text_moves_region() {
    let mut probe = mean_sign(gradient_cube(10, 10, 2));
    drag(&mut probe, (0.0, 0.0), (2.0, 2.0), Button::Primary);
    assert_eq!(
        probe.probe_mut().apply_text("x0=4 y0=4 x1=6 y1=6"),
        Ok(TextEdit::Applied)
    );
    assert_eq!(probe.probe().text(), "x0=4 y0=4 x1=6 y1=6");
    // Mean of rows 4..6 and columns 4..6 in band 0.
    assert_relative_eq!(probe.probe().spectrum()[0], 49.5);
    assert_eq!(
        probe.probe_mut().apply_text("x0=4 y0=4 x1=6 y1=6"),
        Ok(TextEdit::Unchanged)
    );
    assert!(probe.probe_mut().apply_text("x0=4 y0=").is_err());
    assert_eq!(probe.probe().text(), "x0=4 y0=4 x1=6 y1=6");
}
