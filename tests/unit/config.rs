use super::*;

#[test]
fn defaults_match_batch_run() {
    let cfg = YoyConfig::default();
    assert_eq!(cfg.fps, 30.0);
    assert_eq!(cfg.dpi, 50);
    assert_eq!(cfg.image_dir, PathBuf::from("images"));
    assert_eq!(cfg.audio_path, Some(PathBuf::from("music.mp3")));
    assert_eq!(cfg.output_path, PathBuf::from("generated_video_sound.mp4"));
    assert_eq!(cfg.refresh, SettledRefresh::PerFrame);
    cfg.validate().unwrap();
}

#[test]
fn partial_json_keeps_other_defaults() {
    let cfg = YoyConfig::from_json(
        r#"{
            "fps": 24,
            "years": 3,
            "audio_path": null,
            "refresh": "per_curve",
            "curve": { "decay_rate": 5.0 },
            "chart": { "y_min": -20, "y_max": 25 }
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.fps, 24.0);
    assert_eq!(cfg.years, Some(3));
    assert_eq!(cfg.audio_path, None);
    assert_eq!(cfg.refresh, SettledRefresh::PerCurve);
    assert_eq!(cfg.curve.decay_rate, 5.0);
    assert_eq!(cfg.curve.base_alpha, 1.0);
    assert_eq!(cfg.chart.y_min, -20.0);
    assert_eq!(cfg.chart.title, "HELSINKI KAISANIEMI");
    assert_eq!(cfg.dpi, 50);
    cfg.validate().unwrap();
}

#[test]
fn unknown_keys_are_rejected() {
    let err = YoyConfig::from_json(r#"{ "fsp": 30 }"#).unwrap_err();
    assert!(matches!(err, YoyError::Validation(_)));
}

#[test]
fn malformed_color_is_rejected() {
    assert!(YoyConfig::from_json(r#"{ "curve": { "color": [1, 0, 0] } }"#).is_err());
    assert!(YoyConfig::from_json(r#"{ "curve": { "color": [1, 0, 2, 1] } }"#).is_err());
}

#[test]
fn validate_catches_bad_values() {
    let bad = [
        YoyConfig {
            fps: 0.0,
            ..YoyConfig::default()
        },
        YoyConfig {
            dpi: 0,
            ..YoyConfig::default()
        },
        YoyConfig {
            seconds_per_year: -1.0,
            ..YoyConfig::default()
        },
        YoyConfig {
            years: Some(0),
            ..YoyConfig::default()
        },
    ];
    for cfg in bad {
        assert!(cfg.validate().is_err(), "{cfg:?}");
    }

    let mut cfg = YoyConfig::default();
    cfg.curve.decay_rate = 0.0;
    assert!(cfg.validate().is_err());
}

#[test]
fn derived_options_follow_config() {
    let mut cfg = YoyConfig::default();
    cfg.fps = 29.97;
    cfg.audio_path = None;

    let seq = cfg.sequencer_opts().unwrap();
    assert_eq!(seq.fps, Fps::new(2997, 100).unwrap());

    let enc = cfg.encode_opts().unwrap();
    assert_eq!(enc.audio_path, None);
    assert_eq!(enc.bg_rgba, [0, 0, 0, 255]);
    assert_eq!(enc.video_path, PathBuf::from("generated_video.mp4"));
    assert_eq!(cfg.frame_dir().root(), Path::new("images"));
}
