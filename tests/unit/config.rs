use super::*;
use crate::foundation::core::Rgb8;

#[test]
fn render_defaults_match_cli_defaults() {
    let cfg = RenderConfig::default();
    assert_eq!((cfg.sensor_width, cfg.sensor_height), (320, 256));
    assert_eq!(cfg.fps, 120.0);
    assert_eq!(cfg.tau_ms, 30.0);
    assert_eq!(cfg.codec, "mp4v");
    assert_eq!(cfg.palette, Palette::default());
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: RenderConfig = serde_json::from_str(
        r#"{ "events_dir": "ev", "fps": 60, "palette": { "positive": [1, 2, 3] } }"#,
    )
    .unwrap();
    assert_eq!(cfg.events_dir, PathBuf::from("ev"));
    assert_eq!(cfg.fps, 60.0);
    assert_eq!(cfg.tau_ms, 30.0);
    assert_eq!(cfg.palette.positive, Rgb8([1, 2, 3]));
    assert_eq!(cfg.palette.overlap, Palette::default().overlap);
}

#[test]
fn render_validation_rejects_bad_scalars() {
    let ok = RenderConfig {
        events_dir: "ev".into(),
        ..RenderConfig::default()
    };
    assert!(ok.validate().is_ok());
    assert!(
        RenderConfig {
            fps: 0.0,
            ..ok.clone()
        }
        .validate()
        .is_err()
    );
    assert!(
        RenderConfig {
            tau_ms: -3.0,
            ..ok.clone()
        }
        .validate()
        .is_err()
    );
    assert!(
        RenderConfig {
            sensor_width: 0,
            ..ok.clone()
        }
        .validate()
        .is_err()
    );
    assert!(RenderConfig::default().validate().is_err());
}

#[test]
fn compare_json_parses_end_mode() {
    let cfg: CompareConfig =
        serde_json::from_str(r#"{ "end_mode": "hold", "fps_out": 24.0 }"#).unwrap();
    assert_eq!(cfg.end_mode, EndMode::Hold);
    assert_eq!(cfg.fps_out, Some(24.0));
    assert_eq!(cfg.gap, 15);
    assert_eq!(cfg.canvas, Canvas { width: 1920, height: 1080 });
}

#[test]
fn compare_validation_rejects_bad_values() {
    assert!(CompareConfig::default().validate().is_ok());
    assert!(
        CompareConfig {
            fps_out: Some(0.0),
            ..CompareConfig::default()
        }
        .validate()
        .is_err()
    );
    assert!(
        CompareConfig {
            gap: 1920,
            ..CompareConfig::default()
        }
        .validate()
        .is_err()
    );
}

#[test]
fn load_json_reports_invalid_files() {
    let dir = PathBuf::from("target").join("unit_config");
    std::fs::create_dir_all(&dir).unwrap();
    let bad = dir.join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    assert!(matches!(
        load_json::<RenderConfig>(&bad),
        Err(EvError::Validation(_))
    ));
    assert!(load_json::<RenderConfig>(&dir.join("missing.json")).is_err());

    let good = dir.join("good.json");
    std::fs::write(&good, r#"{ "tau_ms": 12.5 }"#).unwrap();
    assert_eq!(load_json::<RenderConfig>(&good).unwrap().tau_ms, 12.5);
}
