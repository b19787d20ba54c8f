use super::*;

const EVENTS: (i64, i64) = (1_000, 2_000);

#[test]
fn timestamps_extend_by_median_step() {
    let ts = TimestampSeries::from_secs(&[0.0, 0.01, 0.03]);
    let range = RenderRange::resolve(Some(&ts), 1, EVENTS).unwrap();
    assert_eq!(range.start_ns, 0);
    assert_eq!(range.end_ns, 40_000_000);
}

#[test]
fn timestamps_without_positive_step_fall_back_to_dt() {
    let ts = TimestampSeries::from_ns(vec![100, 100]);
    let range = RenderRange::resolve(Some(&ts), 7, EVENTS).unwrap();
    assert_eq!(range, RenderRange { start_ns: 100, end_ns: 107 });
}

#[test]
fn single_timestamp_uses_event_range() {
    let ts = TimestampSeries::from_ns(vec![5]);
    let range = RenderRange::resolve(Some(&ts), 7, (10, 20)).unwrap();
    assert_eq!(range, RenderRange { start_ns: 10, end_ns: 20 });
    let range = RenderRange::resolve(None, 7, (1, 2)).unwrap();
    assert_eq!(range, RenderRange { start_ns: 1, end_ns: 2 });
}

#[test]
fn last_timestamp_plus_step_overflow_is_rejected() {
    let ts = TimestampSeries::from_ns(vec![i64::MAX - 10, i64::MAX - 5]);
    let err = RenderRange::resolve(Some(&ts), 7, EVENTS).unwrap_err();
    assert!(matches!(err, EvError::Validation(_)), "{err}");
}

#[test]
fn windows_past_i64_are_rejected() {
    let range = RenderRange { start_ns: 5, end_ns: 10 };
    let err = WindowSchedule::new(range, i64::MAX, None).unwrap_err();
    assert!(matches!(err, EvError::Validation(_)), "{err}");

    let wide = RenderRange { start_ns: -i64::MAX, end_ns: i64::MAX };
    let sched = WindowSchedule::new(wide, i64::MAX, None).unwrap();
    assert_eq!(sched.frame_count(), 2);
    assert_eq!(sched.window(1).start_ns, 0);
    assert_eq!(sched.window(1).end_ns, i64::MAX);

    let zero_start = RenderRange { start_ns: 0, end_ns: 5 };
    let sched = WindowSchedule::new(zero_start, i64::MAX, None).unwrap();
    assert_eq!(sched.window(0).end_ns, i64::MAX);
}

#[test]
fn frame_count_is_ceiling_and_capped() {
    let range = RenderRange { start_ns: 0, end_ns: 25 };
    assert_eq!(WindowSchedule::new(range, 10, None).unwrap().frame_count(), 3);
    assert_eq!(WindowSchedule::new(range, 10, Some(2)).unwrap().frame_count(), 2);
    assert_eq!(WindowSchedule::new(range, 10, Some(99)).unwrap().frame_count(), 3);

    let exact = RenderRange { start_ns: 0, end_ns: 30 };
    assert_eq!(WindowSchedule::new(exact, 10, None).unwrap().frame_count(), 3);

    let empty = RenderRange { start_ns: 30, end_ns: 30 };
    assert_eq!(WindowSchedule::new(empty, 10, None).unwrap().frame_count(), 0);
}

#[test]
fn windows_are_contiguous_and_half_open() {
    let sched = WindowSchedule::new(RenderRange { start_ns: 5, end_ns: 35 }, 10, None).unwrap();
    let windows: Vec<_> = sched.windows().collect();
    assert_eq!(windows.len(), 3);
    assert_eq!(windows[0].start_ns, 5);
    assert_eq!(windows[0].end_ns, 15);
    for pair in windows.windows(2) {
        assert_eq!(pair[0].end_ns, pair[1].start_ns);
        assert_eq!(pair[1].index.0, pair[0].index.0 + 1);
    }
}

#[test]
fn non_positive_dt_is_rejected() {
    let range = RenderRange { start_ns: 0, end_ns: 10 };
    assert!(WindowSchedule::new(range, 0, None).is_err());
}
