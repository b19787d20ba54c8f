use super::*;
use crate::foundation::core::{Fps, Rgb8};

#[test]
fn writes_numbered_pngs_that_decode_back() {
    let dir = PathBuf::from("target").join("unit_png").join("seq");
    let _ = std::fs::remove_dir_all(&dir);

    let mut sink = PngSequenceSink::new(&dir).with_prefix("ev_");
    sink.begin(SinkConfig {
        width: 3,
        height: 2,
        fps: Fps::new(60.0).unwrap(),
    })
    .unwrap();
    let mut frame = FrameRGB::filled(3, 2, Rgb8::gray(10));
    frame.data[0..3].copy_from_slice(&[200, 100, 50]);
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(7), &frame).unwrap();
    sink.end().unwrap();

    assert_eq!(
        sink.written(),
        &[dir.join("ev_000000.png"), dir.join("ev_000007.png")]
    );
    let img = image::open(dir.join("ev_000007.png")).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50]);
    assert_eq!(img.get_pixel(2, 1).0, [10, 10, 10]);
}

#[test]
fn file_in_place_of_directory_fails_to_open() {
    let dir = PathBuf::from("target").join("unit_png");
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("occupied");
    std::fs::write(&file, b"x").unwrap();

    let mut sink = PngSequenceSink::new(&file);
    let err = sink
        .begin(SinkConfig {
            width: 1,
            height: 1,
            fps: Fps::new(1.0).unwrap(),
        })
        .unwrap_err();
    assert!(matches!(err, EvError::SinkOpen(_)));
}
