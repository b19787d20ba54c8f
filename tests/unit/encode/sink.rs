use super::*;
use crate::foundation::core::Rgb8;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30.0).unwrap(),
    }
}

#[test]
fn in_memory_sink_keeps_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(2, 2)).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGB::filled(2, 2, Rgb8::gray(1)))
        .unwrap();
    sink.push_frame(FrameIndex(1), &FrameRGB::filled(2, 2, Rgb8::gray(2)))
        .unwrap();
    sink.end().unwrap();

    assert!(sink.ended());
    assert_eq!(sink.config().unwrap().width, 2);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1]);
    assert_eq!(sink.frames()[1].1.pixel(0, 0), Rgb8::gray(2));
}

#[test]
fn out_of_order_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg(1, 1)).unwrap();
    let f = FrameRGB::filled(1, 1, Rgb8::gray(0));
    sink.push_frame(FrameIndex(3), &f).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &f).is_err());
    assert!(sink.push_frame(FrameIndex(2), &f).is_err());
    sink.push_frame(FrameIndex(4), &f).unwrap();
}

#[test]
fn wrong_size_and_unstarted_pushes_fail() {
    let mut sink = InMemorySink::new();
    let f = FrameRGB::filled(2, 2, Rgb8::gray(0));
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
    sink.begin(cfg(3, 2)).unwrap();
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
}

#[test]
fn zero_sized_config_is_rejected() {
    let mut sink = InMemorySink::new();
    assert!(sink.begin(cfg(0, 2)).is_err());
}
