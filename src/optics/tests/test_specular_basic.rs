use crate::optics::{RoundedRect, SpecularOptions, Vec2, compute_specular_2d, specular_intensity};

fn slab() -> RoundedRect {
    RoundedRect::new(100.0, 60.0, 0.0, 10.0).expect("valid shape")
}

#[test]
fn default_light_comes_from_upper_right() {
    let light = SpecularOptions::default().light();
    assert!((light.length() - 1.0).abs() < 1e-12);
    assert!(light.x > 0.0);
    assert!(light.y < 0.0, "screen y grows downward");
}

#[test]
fn rim_band_peaks_in_its_middle() {
    let options = SpecularOptions::default().angle(0.0).rim_width(1.5);
    let shape = slab();

    let peak = specular_intensity(&shape, Vec2::new(-49.25, 0.0), &options);
    assert!((peak - 1.0).abs() < 1e-9, "got {peak}");

    let edge = specular_intensity(&shape, Vec2::new(-49.9, 0.0), &options);
    assert!(edge > 0.0 && edge < peak);

    // Light along +x grazes the top edge.
    let top = specular_intensity(&shape, Vec2::new(0.0, -29.25), &options);
    assert!(top.abs() < 1e-9);
}

#[test]
fn interior_and_exterior_are_dark() {
    let options = SpecularOptions::default();
    let shape = slab();
    assert_eq!(specular_intensity(&shape, Vec2::ZERO, &options), 0.0);
    assert_eq!(specular_intensity(&shape, Vec2::new(-60.0, 0.0), &options), 0.0);
    assert_eq!(
        specular_intensity(&shape, Vec2::new(-49.25, 0.0), &options.rim_width(0.0)),
        0.0
    );
}

#[test]
fn specular_layer_is_transparent_off_the_rim() {
    let options = SpecularOptions::default().angle(0.0);
    let layer = compute_specular_2d(100, 60, &slab(), &options).expect("valid layer");
    assert_eq!(layer.data.len(), 100 * 60 * 4);

    assert_eq!(layer.pixel(50, 30), Some([0, 0, 0, 0]));

    let lit = layer.pixel(0, 30).expect("in bounds");
    assert!(lit[0] > 200, "left rim faces the light: {lit:?}");
    assert_eq!(lit[0], lit[1]);
    assert_eq!(lit[1], lit[2]);
    assert!(lit[3] > 0 && lit[3] <= lit[0]);

    for pixel in layer.data.chunks_exact(4) {
        assert!(pixel[3] <= pixel[0], "alpha never exceeds brightness");
    }
}
