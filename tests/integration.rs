use glass_engine::Simulator;
use glass_engine::optics::{
    GlassGeometry, NEUTRAL_CHANNEL, ProfileKind, RasterBuffer, RoundedRect, SpecularOptions,
    TraceOutcome, compute_displacement_1d, compute_displacement_2d, compute_specular_2d,
    trace_rays,
};

#[test]
fn simulator_initializes_with_stale_result() {
    let mut sim = Simulator::new();
    assert!(sim.displacement_map().is_err());
    sim.evaluate().expect("default parameters evaluate");
    assert!(sim.displacement_map().is_ok());
}

#[test]
fn parameter_updates_require_known_name() {
    let mut sim = Simulator::new();
    sim.set_param("refractive_index", 1.33).expect("valid name");
    assert!((sim.params().refractive_index - 1.33).abs() < 1e-9);
    assert!(sim.set_param("onbekend", 1.0).is_err());

    sim.set_param("corner_radius", 10_000.0).expect("valid name");
    assert_eq!(sim.params().corner_radius, 512.0, "values clamp to slider max");
}

#[test]
fn simulator_matches_direct_pipeline() {
    let mut sim = Simulator::new();
    sim.set_profile("convex_circle").expect("known profile");
    sim.set_param("object_width", 120.0).unwrap();
    sim.set_param("object_height", 80.0).unwrap();
    sim.set_param("bevel_width", 20.0).unwrap();
    sim.set_param("glass_thickness", 30.0).unwrap();
    sim.set_param("corner_radius", 24.0).unwrap();
    sim.set_param("sample_count", 64.0).unwrap();
    sim.evaluate().unwrap();

    let params = sim.params();
    let table = compute_displacement_1d(
        &params.profile,
        params.bevel_width,
        params.glass_thickness,
        params.refractive_index,
        params.sample_count,
    );
    let direct = compute_displacement_2d(
        120,
        80,
        120.0,
        80.0,
        24.0,
        20.0,
        table.max_abs,
        &table.values,
    )
    .expect("valid map");

    assert_eq!(sim.profile_values().unwrap(), table.values);
    assert_eq!(sim.displacement_map().unwrap(), direct.data);
    assert_eq!(sim.raster_width(), 120);
    assert_eq!(sim.raster_height(), 80);
}

#[test]
fn card_map_is_neutral_outside_the_bevel() {
    let table = compute_displacement_1d(&ProfileKind::ConvexSquircle, 30.0, 60.0, 1.5, 128);
    let map = compute_displacement_2d(300, 200, 300.0, 200.0, 40.0, 30.0, table.max_abs, &table.values)
        .expect("valid map");

    let mut displaced = 0usize;
    for y in 0..map.height {
        for x in 0..map.width {
            let px = map.pixel(x, y).expect("in bounds");
            let interior = (41..259).contains(&x) && (41..159).contains(&y);
            if interior {
                assert_eq!(px[0], NEUTRAL_CHANNEL, "interior pixel ({x}, {y}) displaced");
                assert_eq!(px[1], NEUTRAL_CHANNEL, "interior pixel ({x}, {y}) displaced");
            }
            if px[0] != NEUTRAL_CHANNEL || px[1] != NEUTRAL_CHANNEL {
                displaced += 1;
            }
        }
    }
    assert!(displaced > 0, "bevel band should displace something");

    let scale = table.max_abs;
    let dx = RasterBuffer::decode_channel(map.pixel(0, 100).unwrap()[0], scale);
    assert!(dx > 0.0 && dx <= scale + 1e-9);
}

#[test]
fn ray_diagram_follows_glass_regions() {
    let glass = GlassGeometry::new(40.0, 320.0, 60.0, 50.0, 200.0).expect("valid geometry");
    let rays = trace_rays(&ProfileKind::ConvexSquircle, &glass, (0.0, 400.0), 41, 1.0, 1.5);
    assert_eq!(rays.len(), 41);

    for ray in &rays {
        let path = ray.path();
        assert_eq!(path[0].y, 0.0);
        assert_eq!(path.last().map(|p| p.y), Some(200.0));
        if glass.contains(ray.origin_x) {
            assert!(matches!(ray.outcome, TraceOutcome::Refracted { .. }));
        } else {
            assert_eq!(ray.outcome, TraceOutcome::Missed);
        }
    }

    let left: f64 = rays.iter().filter(|r| r.origin_x < 200.0).map(|r| r.displacement).sum();
    let right: f64 = rays.iter().filter(|r| r.origin_x > 200.0).map(|r| r.displacement).sum();
    assert!(left > 0.0 && right < 0.0, "both bevels bend toward the middle");
}

#[test]
fn specular_layer_lights_only_the_rim() {
    let shape = RoundedRect::new(200.0, 120.0, 30.0, 20.0).expect("valid shape");
    let layer = compute_specular_2d(200, 120, &shape, &SpecularOptions::default())
        .expect("valid layer");

    let lit = layer.data.chunks_exact(4).filter(|px| px[3] > 0).count();
    assert!(lit > 0);
    assert!(lit < 200 * 120 / 10, "rim band is thin, got {lit} lit pixels");
    assert_eq!(layer.pixel(100, 60), Some([0, 0, 0, 0]));
}
