use super::*;

#[test]
fn parse_skips_blank_and_comment_lines() {
    let text = "# header\n0.0\n\n  0.5 extra columns\n#0.7\n1.25\n";
    let ts = TimestampSeries::parse(text).unwrap().unwrap();
    assert_eq!(ts.as_ns(), &[0, 500_000_000, 1_250_000_000]);
}

#[test]
fn parse_rounds_to_nanoseconds() {
    let ts = TimestampSeries::parse("0.0000000016\n0.01\n").unwrap().unwrap();
    assert_eq!(ts.as_ns(), &[2, 10_000_000]);
}

#[test]
fn parse_without_values_is_none() {
    assert!(TimestampSeries::parse("# only comments\n\n").unwrap().is_none());
}

#[test]
fn parse_reports_bad_line() {
    let err = TimestampSeries::parse("0.1\nabc\n").unwrap_err();
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn missing_file_is_not_found() {
    let err = TimestampSeries::read(Path::new("target/definitely/missing/ts.txt")).unwrap_err();
    assert!(matches!(err, EvError::NotFound(_)));
}

#[test]
fn median_ignores_non_positive_steps() {
    let ts = TimestampSeries::from_ns(vec![0, 10, 30, 30, 25]);
    // positive diffs: 10, 20 -> lower middle
    assert_eq!(ts.median_positive_step_ns(), Some(10));

    let irregular = TimestampSeries::from_secs(&[0.0, 0.01, 0.03]);
    assert_eq!(irregular.median_positive_step_ns(), Some(10_000_000));

    let odd = TimestampSeries::from_ns(vec![0, 10, 20, 50]);
    assert_eq!(odd.median_positive_step_ns(), Some(10));

    let flat = TimestampSeries::from_ns(vec![5, 5, 5]);
    assert_eq!(flat.median_positive_step_ns(), None);
}
