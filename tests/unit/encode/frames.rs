use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_frames").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn frame_file_names_are_zero_padded() {
    assert_eq!(frame_file_name(FrameIndex(0)), "0000000000.png");
    assert_eq!(frame_file_name(FrameIndex(42)), "0000000042.png");
    assert_eq!(frame_file_name(FrameIndex(1234567890)), "1234567890.png");
}

#[test]
fn lexical_order_matches_numeric_order() {
    let mut names: Vec<String> = [10u64, 2, 100, 1, 99]
        .into_iter()
        .map(|i| frame_file_name(FrameIndex(i)))
        .collect();
    names.sort();
    assert_eq!(names[0], frame_file_name(FrameIndex(1)));
    assert_eq!(names[4], frame_file_name(FrameIndex(100)));
}

#[test]
fn counter_is_monotonic() {
    let mut c = FrameCounter::new();
    assert_eq!(c.advance(), FrameIndex(0));
    assert_eq!(c.advance(), FrameIndex(1));
    assert_eq!(c.peek(), FrameIndex(2));

    let mut other = FrameCounter::starting_at(FrameIndex(7));
    assert_eq!(other.advance(), FrameIndex(7));
    // Independent counters do not interfere.
    assert_eq!(c.peek(), FrameIndex(2));
}

#[test]
fn list_pngs_sorts_and_filters() {
    let dir = temp_dir("list");
    let frames = FrameDir::new(&dir);
    frames.prepare(false).unwrap();
    for name in ["0000000002.png", "0000000001.png", "notes.txt", "cover.PNG"] {
        std::fs::write(dir.join(name), b"x").unwrap();
    }
    let listed: Vec<String> = frames
        .list_pngs()
        .unwrap()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(listed, vec!["0000000001.png", "0000000002.png", "cover.PNG"]);
}

#[test]
fn prepare_clean_only_removes_frame_files() {
    let dir = temp_dir("clean");
    let frames = FrameDir::new(&dir);
    frames.prepare(false).unwrap();
    std::fs::write(frames.path_for(FrameIndex(3)), b"x").unwrap();
    std::fs::write(dir.join("logo.png"), b"x").unwrap();

    frames.prepare(true).unwrap();
    assert!(!frames.path_for(FrameIndex(3)).exists());
    assert!(dir.join("logo.png").exists());
}

#[test]
fn missing_directory_is_a_validation_error() {
    let frames = FrameDir::new(temp_dir("missing"));
    let err = frames.list_pngs().unwrap_err();
    assert!(matches!(err, YoyError::Validation(_)));
}
