use super::*;

fn canvas() -> Canvas {
    Canvas::new(32, 24).unwrap()
}

fn ev(x: i32, y: i32, t: i64, positive: bool) -> Event {
    Event { x, y, t, positive }
}

#[test]
fn rejects_non_positive_tau() {
    assert!(DecaySurfaces::new(canvas(), 0.0).is_err());
    assert!(DecaySurfaces::new(canvas(), -1.0).is_err());
    assert!(DecaySurfaces::new(canvas(), f64::NAN).is_err());
}

#[test]
fn decay_factor_is_strictly_between_zero_and_one() {
    for tau_ms in [0.5, 1.0, 30.0, 1000.0] {
        let s = DecaySurfaces::new(canvas(), tau_ms).unwrap();
        for dt in [1_000, 8_333_333, 33_333_333] {
            let a = s.decay_factor(dt);
            assert!(a > 0.0 && a < 1.0, "tau={tau_ms} dt={dt} a={a}");
        }
    }
}

#[test]
fn single_event_weight_matches_exponential() {
    let mut s = DecaySurfaces::new(canvas(), 30.0).unwrap();
    s.decay(10_000_000);
    s.accumulate(&[ev(10, 10, 0, true)], 10_000_000);
    let expected = (-1.0f64 / 3.0).exp() as f32;
    assert!((s.positive_at(10, 10) - expected).abs() < 1e-6);
    assert!((s.positive_at(10, 10) - 0.7165).abs() < 1e-4);
    assert_eq!(s.negative_at(10, 10), 0.0);
}

#[test]
fn same_polarity_burst_merges_by_maximum() {
    let mut s = DecaySurfaces::new(canvas(), 30.0).unwrap();
    let burst: Vec<_> = (0..50).map(|i| ev(3, 4, i * 1_000, false)).collect();
    s.accumulate(&burst, 100_000);
    let newest = (-(100_000.0 - 49_000.0) / 30e6f64).exp() as f32;
    assert!((s.negative_at(3, 4) - newest).abs() < 1e-6);
    assert!(s.negative_at(3, 4) <= 1.0);
}

#[test]
fn out_of_bounds_events_never_touch_surfaces() {
    let mut s = DecaySurfaces::new(canvas(), 30.0).unwrap();
    s.accumulate(
        &[
            ev(-1, 0, 0, true),
            ev(0, -1, 0, false),
            ev(32, 0, 0, true),
            ev(0, 24, 0, false),
            ev(i32::MAX, i32::MAX, 0, true),
        ],
        1,
    );
    assert!(s.positive().iter().all(|&v| v == 0.0));
    assert!(s.negative().iter().all(|&v| v == 0.0));
}

#[test]
fn cells_stay_in_unit_interval_over_many_windows() {
    let mut s = DecaySurfaces::new(canvas(), 5.0).unwrap();
    let dt = 1_000_000;
    let mut seed = 0x2545_f491_u64;
    for w in 0..200i64 {
        s.decay(dt);
        let end = (w + 1) * dt;
        let mut events = Vec::new();
        for k in 0..40 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let x = ((seed >> 33) % 32) as i32;
            let y = ((seed >> 17) % 24) as i32;
            events.push(ev(x, y, w * dt + k * 20_000, seed & 1 == 0));
        }
        s.accumulate(&events, end);
        assert!(
            s.positive()
                .iter()
                .chain(s.negative())
                .all(|&v| (0.0..=1.0).contains(&v))
        );
    }
}

#[test]
fn decay_fades_previous_activity() {
    let mut s = DecaySurfaces::new(canvas(), 10.0).unwrap();
    s.accumulate(&[ev(1, 1, 10_000_000, true)], 10_000_000);
    assert_eq!(s.positive_at(1, 1), 1.0);
    s.decay(10_000_000);
    assert!((s.positive_at(1, 1) - (-1.0f32).exp()).abs() < 1e-6);
}
