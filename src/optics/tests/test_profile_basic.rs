use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::optics::{
    ProfileError, ProfileKind, SurfaceProfile, concave, convex_circle, convex_squircle, lip,
    sample_profile, smootherstep,
};

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn profile_endpoints_match_their_shapes() {
    assert!(approx_eq(convex_circle(0.0), 0.0, 1e-12));
    assert!(approx_eq(convex_circle(1.0), 1.0, 1e-12));
    assert!(approx_eq(convex_squircle(0.0), 0.0, 1e-12));
    assert!(approx_eq(convex_squircle(1.0), 1.0, 1e-12));
    assert!(approx_eq(concave(0.0), 1.0, 1e-12));
    assert!(approx_eq(concave(1.0), 0.0, 1e-12));
    assert!(approx_eq(lip(0.0), 0.0, 1e-12));
    assert!(approx_eq(lip(1.0), 0.1, 1e-12), "lip ends on the lifted dip");
}

#[test]
fn convex_profiles_rise_monotonically() {
    let mut prev_circle = convex_circle(0.0);
    let mut prev_squircle = convex_squircle(0.0);
    for i in 1..=200 {
        let x = f64::from(i) / 200.0;
        let circle = convex_circle(x);
        let squircle = convex_squircle(x);
        assert!(circle >= prev_circle, "convex_circle dips at x={x}");
        assert!(squircle >= prev_squircle, "convex_squircle dips at x={x}");
        assert!(squircle + 1e-12 >= circle, "squircle should sit above the circle at x={x}");
        prev_circle = circle;
        prev_squircle = squircle;
    }
}

#[test]
fn profiles_stay_in_range_on_the_domain() {
    for kind in ProfileKind::ALL {
        for i in 0..=100 {
            let x = f64::from(i) / 100.0;
            let h = kind.height(x);
            assert!(h.is_finite(), "{kind} is not finite at x={x}");
            assert!(h >= -1e-12, "{kind} is negative at x={x}: {h}");
            assert!(h <= 1.1 + 1e-12, "{kind} is too high at x={x}: {h}");
        }
    }
}

#[test]
fn out_of_domain_inputs_do_not_produce_nan() {
    for kind in ProfileKind::ALL {
        for x in [-0.5, -3.0, 1.5, 4.0] {
            let h = kind.height(x);
            assert!(!h.is_nan(), "{kind} produced NaN at x={x}");
            let clamped = kind.height_clamped(x);
            assert!((0.0..=1.0).contains(&clamped));
        }
    }
    assert_eq!((|_x: f64| f64::NAN).height_clamped(0.5), 0.0);
}

#[test]
fn smootherstep_is_a_blend_weight() {
    assert!(approx_eq(smootherstep(0.0), 0.0, 1e-12));
    assert!(approx_eq(smootherstep(0.5), 0.5, 1e-12));
    assert!(approx_eq(smootherstep(1.0), 1.0, 1e-12));
}

#[test]
fn profile_kind_parses_loose_names() {
    assert_eq!("convex_circle".parse::<ProfileKind>(), Ok(ProfileKind::ConvexCircle));
    assert_eq!("Convex-Squircle".parse::<ProfileKind>(), Ok(ProfileKind::ConvexSquircle));
    assert_eq!(" squircle ".parse::<ProfileKind>(), Ok(ProfileKind::ConvexSquircle));
    assert_eq!("CONCAVE".parse::<ProfileKind>(), Ok(ProfileKind::Concave));
    assert_eq!("lip".parse::<ProfileKind>(), Ok(ProfileKind::Lip));
    assert_eq!(
        "wave".parse::<ProfileKind>(),
        Err(ProfileError::Unknown("wave".to_owned()))
    );

    for kind in ProfileKind::ALL {
        assert_eq!(kind.to_string().parse::<ProfileKind>(), Ok(kind));
    }
}

#[test]
fn sample_profile_includes_both_ends() {
    let samples = sample_profile(&ProfileKind::ConvexCircle, 5);
    assert_eq!(samples.len(), 5);
    assert!(approx_eq(samples[0], 0.0, 1e-12));
    assert!(approx_eq(samples[4], 1.0, 1e-12));
    assert!(approx_eq(samples[2], convex_circle(0.5), 1e-12));

    assert!(sample_profile(&ProfileKind::Lip, 0).is_empty());
    assert_eq!(sample_profile(&|x: f64| x * 2.0, 1), vec![0.0]);
}

#[test]
fn concave_inverts_convex_circle() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..500 {
        let x: f64 = rng.random();
        assert_eq!(concave(x), 1.0 - convex_circle(x), "mismatch at x={x}");
    }
}
