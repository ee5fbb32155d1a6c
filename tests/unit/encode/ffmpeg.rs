use super::*;
use crate::foundation::core::FrameIndex;

fn temp_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_ffmpeg").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
    let data: Vec<u8> = rgba
        .iter()
        .copied()
        .cycle()
        .take((w * h * 4) as usize)
        .collect();
    image::save_buffer_with_format(
        path,
        &data,
        w,
        h,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .unwrap();
}

fn opts(dir: &Path) -> EncodeOpts {
    EncodeOpts::new(dir.join("video.mp4"), Fps::new(30, 1).unwrap())
}

#[test]
fn empty_image_dir_fails_before_ffmpeg() {
    let dir = temp_dir("empty");
    let frames = FrameDir::new(dir.join("images"));
    frames.prepare(true).unwrap();

    let err = VideoEncoder::new(opts(&dir)).encode(&frames).unwrap_err();
    assert!(matches!(err, YoyError::Validation(_)), "{err}");
    assert!(!dir.join("video.mp4").exists());
}

#[test]
fn missing_image_dir_is_a_validation_error() {
    let dir = temp_dir("missing");
    let frames = FrameDir::new(dir.join("nope"));
    let err = VideoEncoder::new(opts(&dir)).encode(&frames).unwrap_err();
    assert!(matches!(err, YoyError::Validation(_)), "{err}");
}

#[test]
fn missing_audio_fails_before_ffmpeg() {
    let dir = temp_dir("no_audio");
    let frames = FrameDir::new(dir.join("images"));
    frames.prepare(true).unwrap();
    write_png(&frames.path_for(FrameIndex(0)), 4, 4, [0, 0, 0, 255]);

    let o = opts(&dir).with_audio(dir.join("music.mp3"), dir.join("out.mp4"));
    let err = VideoEncoder::new(o).encode(&frames).unwrap_err();
    assert!(err.to_string().contains("music.mp3"), "{err}");
    assert!(!dir.join("video.mp4").exists());
    assert!(!dir.join("out.mp4").exists());
}

#[test]
fn odd_frame_size_is_rejected() {
    let dir = temp_dir("odd");
    let frames = FrameDir::new(dir.join("images"));
    frames.prepare(true).unwrap();
    write_png(&frames.path_for(FrameIndex(0)), 5, 4, [0, 0, 0, 255]);

    let err = VideoEncoder::new(opts(&dir)).encode(&frames).unwrap_err();
    assert!(err.to_string().contains("even"), "{err}");
}

#[test]
fn mux_rejects_non_positive_duration() {
    let dir = temp_dir("mux_duration");
    let err = mux_audio(
        &dir.join("v.mp4"),
        &dir.join("a.mp3"),
        &dir.join("o.mp4"),
        0.0,
        true,
    )
    .unwrap_err();
    assert!(matches!(err, YoyError::Validation(_)));
}

#[test]
fn refuses_to_overwrite_when_disabled() {
    let dir = temp_dir("no_overwrite");
    let existing = dir.join("video.mp4");
    std::fs::write(&existing, b"x").unwrap();
    assert!(check_output(&existing, false).is_err());
    assert!(check_output(&existing, true).is_ok());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = temp_dir("parents");
    let out = dir.join("a").join("b").join("video.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(dir.join("a").join("b").is_dir());
    ensure_parent_dir(Path::new("video.mp4")).unwrap();
}

#[test]
fn encodes_silent_video_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("ffmpeg not on PATH, skipping");
        return;
    }
    let dir = temp_dir("silent");
    let frames = FrameDir::new(dir.join("images"));
    frames.prepare(true).unwrap();
    for i in 0..3 {
        write_png(&frames.path_for(FrameIndex(i)), 16, 8, [255, 0, 0, 128]);
    }

    let out = VideoEncoder::new(opts(&dir)).encode(&frames).unwrap();
    assert_eq!(out.frames, 3);
    assert_eq!((out.width, out.height), (16, 8));
    assert_eq!(out.output_path, None);
    assert!(std::fs::metadata(&out.video_path).unwrap().len() > 0);
}

#[cfg(unix)]
#[test]
fn failed_frame_write_reports_encoder_stderr() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo boom >&2; exit 1"]);
    let (w, h) = (1024, 1024);
    let mut stream = FfmpegStream::start(cmd, w, h, [0, 0, 0, 255]).unwrap();

    // Larger than any pipe buffer, so the write cannot complete after the child exits.
    let frame = vec![255u8; (w * h * 4) as usize];
    let err = match stream.push(&frame) {
        Err(e) => e,
        Ok(()) => stream.finish().unwrap_err(),
    };
    let msg = err.to_string();
    assert!(matches!(err, YoyError::Encode(_)), "{msg}");
    assert!(msg.contains("boom"), "{msg}");
}
