use crate::optics::{
    DisplacementProfile, ProfileKind, compute_displacement_1d, lookup_displacement, max_abs,
};

#[test]
fn convex_circle_bevel_vanishes_at_both_ends() {
    let table = compute_displacement_1d(&ProfileKind::ConvexCircle, 60.0, 50.0, 1.5, 512);

    assert_eq!(table.len(), 512);
    assert!(table.values[0].abs() < 1e-9, "rim sample: {}", table.values[0]);
    assert!(table.values[511].abs() < 1e-9, "flat-top sample: {}", table.values[511]);
    assert!(table.max_abs > 0.0);

    let expected = table.values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    assert_eq!(table.max_abs, expected);
    assert!(table.values.iter().all(|v| v.is_finite()));
}

#[test]
fn convex_profiles_displace_inward() {
    for kind in [ProfileKind::ConvexCircle, ProfileKind::ConvexSquircle] {
        let table = compute_displacement_1d(&kind, 40.0, 30.0, 1.5, 64);
        assert!(
            table.values.iter().all(|v| *v >= 0.0),
            "{kind} produced outward displacement"
        );
    }
}

#[test]
fn concave_profile_displaces_outward() {
    let table = compute_displacement_1d(&ProfileKind::Concave, 40.0, 30.0, 1.5, 64);
    assert!(table.values.iter().all(|v| *v <= 0.0));
    assert!(table.max_abs > 0.0);
}

#[test]
fn degenerate_glass_produces_zero_table() {
    let no_bevel = compute_displacement_1d(&ProfileKind::ConvexCircle, 0.0, 50.0, 1.5, 32);
    assert_eq!(no_bevel.len(), 32);
    assert!(no_bevel.values.iter().all(|v| *v == 0.0));
    assert_eq!(no_bevel.max_abs, 0.0);

    let no_thickness = compute_displacement_1d(&ProfileKind::Lip, 40.0, 0.0, 1.5, 32);
    assert!(no_thickness.values.iter().all(|v| *v == 0.0));

    let air = compute_displacement_1d(&ProfileKind::ConvexSquircle, 40.0, 30.0, 1.0, 32);
    assert!(air.max_abs < 1e-6, "index 1 should not bend rays: {}", air.max_abs);
}

#[test]
fn sample_counts_zero_and_one() {
    let empty = compute_displacement_1d(&ProfileKind::ConvexCircle, 60.0, 50.0, 1.5, 0);
    assert!(empty.is_empty());
    assert_eq!(empty.max_abs, 0.0);

    let single = compute_displacement_1d(&ProfileKind::ConvexCircle, 60.0, 50.0, 1.5, 1);
    assert_eq!(single.values, vec![0.0]);
}

#[test]
fn higher_index_bends_further() {
    let low = compute_displacement_1d(&ProfileKind::ConvexSquircle, 40.0, 30.0, 1.2, 64);
    let high = compute_displacement_1d(&ProfileKind::ConvexSquircle, 40.0, 30.0, 1.9, 64);
    assert!(high.max_abs > low.max_abs);
}

#[test]
fn lookup_maps_depth_onto_table() {
    let values = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(lookup_displacement(&values, 0.0), 1.0);
    assert_eq!(lookup_displacement(&values, 0.3), 2.0);
    assert_eq!(lookup_displacement(&values, 0.99), 4.0);
    assert_eq!(lookup_displacement(&values, 0.5), 3.0);
    assert_eq!(lookup_displacement(&values, 0.1), 1.0);
    assert_eq!(lookup_displacement(&values, 1.0), 0.0);
    assert_eq!(lookup_displacement(&values, -0.1), 0.0);
    assert_eq!(lookup_displacement(&values, f64::NAN), 0.0);
    assert_eq!(lookup_displacement(&[], 0.5), 0.0);

    let profile = DisplacementProfile::from_values(vec![0.5, -3.0, f64::NAN, 2.0]);
    assert_eq!(profile.max_abs, 3.0);
    assert_eq!(profile.lookup(0.3), -3.0);
    assert_eq!(max_abs(&[]), 0.0);
}

#[test]
fn lookup_at_sample_positions_returns_that_sample() {
    let table = compute_displacement_1d(&ProfileKind::ConvexCircle, 60.0, 50.0, 1.5, 64);
    let last = (table.len() - 1) as f64;
    for i in 0..table.len() - 1 {
        assert_eq!(table.lookup(i as f64 / last), table.values[i], "sample {i}");
    }
    // The last bucket no longer collapses onto the flat top.
    assert_eq!(table.lookup(62.4 / 63.0), table.values[62]);
}
