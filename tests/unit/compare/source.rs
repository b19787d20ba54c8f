use super::*;
use crate::foundation::core::Rgb8;

fn info(width: u32, height: u32) -> SourceInfo {
    SourceInfo {
        width,
        height,
        fps: Some(30.0),
    }
}

#[test]
fn frame_rate_parsing_handles_ffprobe_forms() {
    assert_eq!(parse_frame_rate("30/1"), Some(30.0));
    assert_eq!(parse_frame_rate("25"), Some(25.0));
    let ntsc = parse_frame_rate("30000/1001").unwrap();
    assert!((ntsc - 29.97).abs() < 1e-3);
    assert_eq!(parse_frame_rate("0/0"), None);
    assert_eq!(parse_frame_rate("0/1"), None);
    assert_eq!(parse_frame_rate("-5/1"), None);
    assert_eq!(parse_frame_rate("n/a"), None);
    assert_eq!(parse_frame_rate("30/0"), None);
    assert_eq!(parse_frame_rate("0"), None);
}

#[test]
fn in_memory_source_yields_frames_in_order_then_none() {
    let frames = vec![
        FrameRGB::filled(2, 2, Rgb8::gray(1)),
        FrameRGB::filled(2, 2, Rgb8::gray(2)),
    ];
    let mut src = InMemorySource::new(info(2, 2), frames).unwrap();
    assert_eq!(src.remaining(), 2);
    assert_eq!(src.next_frame().unwrap().unwrap().pixel(0, 0), Rgb8::gray(1));
    assert_eq!(src.next_frame().unwrap().unwrap().pixel(1, 1), Rgb8::gray(2));
    assert!(src.next_frame().unwrap().is_none());
    assert!(src.next_frame().unwrap().is_none());
}

#[test]
fn in_memory_source_rejects_wrong_sized_frames() {
    let frames = vec![FrameRGB::filled(3, 2, Rgb8::gray(0))];
    assert!(matches!(
        InMemorySource::new(info(2, 2), frames),
        Err(EvError::Validation(_))
    ));
}

#[test]
fn opening_a_missing_video_is_not_found() {
    let err = FfmpegSource::open(Path::new("target/unit_source/does_not_exist.mp4")).unwrap_err();
    assert!(matches!(err, EvError::NotFound(_)), "{err}");
}
