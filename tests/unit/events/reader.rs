use super::*;

fn ev(t: i64) -> Event {
    Event {
        x: (t % 7) as i32,
        y: 0,
        t,
        positive: t % 2 == 0,
    }
}

fn write_shards(name: &str, shards: &[Vec<i64>]) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_reader").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for (i, times) in shards.iter().enumerate() {
        let shard = EventShard::from_events(times.iter().map(|&t| ev(t)).collect()).unwrap();
        shard
            .write_npz(&dir.join(format!("events_{i:04}.npz")))
            .unwrap();
    }
    dir
}

fn times(events: &[Event]) -> Vec<i64> {
    events.iter().map(|e| e.t).collect()
}

#[test]
fn empty_list_is_not_found() {
    assert!(matches!(
        EventShardReader::open(Vec::new()),
        Err(EvError::NotFound(_))
    ));
}

#[test]
fn seek_then_pop_spans_shards() {
    let dir = write_shards(
        "seek_span",
        &[
            vec![1_000_000, 4_000_000, 6_000_000],
            vec![8_000_000, 9_999_999, 10_000_000, 12_000_000],
        ],
    );
    let mut reader = EventShardReader::from_dir(&dir).unwrap();
    reader.seek(5_000_000).unwrap();
    let got = reader.pop_until(10_000_000).unwrap();
    assert_eq!(times(&got), vec![6_000_000, 8_000_000, 9_999_999]);
    assert!(!reader.is_exhausted());
}

#[test]
fn seek_past_first_shard_lands_in_second() {
    let dir = write_shards("seek_second", &[vec![1, 2, 3], vec![10, 20]]);
    let mut reader = EventShardReader::from_dir(&dir).unwrap();
    reader.seek(15).unwrap();
    assert_eq!(reader.position(), (1, 1));
    assert_eq!(times(&reader.pop_until(100).unwrap()), vec![20]);
}

#[test]
fn seek_beyond_stream_exhausts() {
    let dir = write_shards("seek_beyond", &[vec![1, 2], vec![3]]);
    let mut reader = EventShardReader::from_dir(&dir).unwrap();
    reader.seek(1_000).unwrap();
    assert!(reader.is_exhausted());
    assert!(reader.pop_until(i64::MAX).unwrap().is_empty());
}

#[test]
fn event_exactly_at_end_is_left_for_next_window() {
    let dir = write_shards("half_open", &[vec![0, 5, 10, 15]]);
    let mut reader = EventShardReader::from_dir(&dir).unwrap();
    assert_eq!(times(&reader.pop_until(10).unwrap()), vec![0, 5]);
    assert_eq!(times(&reader.pop_until(20).unwrap()), vec![10, 15]);
}

#[test]
fn exhaustion_is_signalled_after_last_event_is_consumed() {
    let dir = write_shards("exhaust", &[vec![1, 2], vec![3, 4]]);
    let mut reader = EventShardReader::from_dir(&dir).unwrap();
    assert_eq!(times(&reader.pop_until(3).unwrap()), vec![1, 2]);
    assert!(!reader.is_exhausted());
    assert_eq!(times(&reader.pop_until(100).unwrap()), vec![3, 4]);
    assert!(reader.is_exhausted());
    assert!(reader.pop_until(200).unwrap().is_empty());
}

#[test]
fn empty_middle_shard_is_skipped() {
    let dir = write_shards("empty_middle", &[vec![1], vec![], vec![5]]);
    let mut reader = EventShardReader::from_dir(&dir).unwrap();
    assert_eq!(times(&reader.pop_until(10).unwrap()), vec![1, 5]);
}

#[test]
fn time_range_reads_first_and_last_shards() {
    let dir = write_shards("range", &[vec![7, 8], vec![9], vec![11, 42]]);
    let reader = EventShardReader::from_dir(&dir).unwrap();
    assert_eq!(reader.event_time_range().unwrap(), (7, 42));
}

#[test]
fn time_range_with_empty_edge_shard_is_empty_data() {
    let dir = write_shards("range_empty", &[vec![], vec![3]]);
    let reader = EventShardReader::from_dir(&dir).unwrap();
    assert!(matches!(
        reader.event_time_range(),
        Err(EvError::EmptyData(_))
    ));
}
