use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};

use crate::encode::frames::FrameDir;
use crate::foundation::core::Fps;
use crate::foundation::error::{YoyError, YoyResult};
use crate::render::composite::flatten_straight_over_bg;

/// Options for [`VideoEncoder`].
#[derive(Clone, Debug)]
pub struct EncodeOpts {
    /// Silent MP4 assembled from the frame sequence.
    pub video_path: PathBuf,
    /// Final MP4 with the music track.
    pub output_path: PathBuf,
    /// Music track; `None` stops after the silent video.
    pub audio_path: Option<PathBuf>,
    pub fps: Fps,
    /// Overwrite output files if they already exist.
    pub overwrite: bool,
    /// Background used to flatten frame alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl EncodeOpts {
    pub fn new(video_path: impl Into<PathBuf>, fps: Fps) -> Self {
        Self {
            video_path: video_path.into(),
            output_path: PathBuf::from("generated_video_sound.mp4"),
            audio_path: None,
            fps,
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    pub fn with_audio(mut self, audio: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        self.audio_path = Some(audio.into());
        self.output_path = output.into();
        self
    }
}

/// What [`VideoEncoder::encode`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOutput {
    pub video_path: PathBuf,
    /// Set when a music track was muxed.
    pub output_path: Option<PathBuf>,
    pub frames: u64,
    pub width: u32,
    pub height: u32,
}

/// Turns an image directory into an MP4 with the system `ffmpeg`, then adds music.
#[derive(Clone, Debug)]
pub struct VideoEncoder {
    opts: EncodeOpts,
}

impl VideoEncoder {
    pub fn new(opts: EncodeOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> &EncodeOpts {
        &self.opts
    }

    /// Encode every `.png` in `frames` (lexical order) and mux the music track if configured.
    ///
    /// Inputs are checked before `ffmpeg` is started: an empty directory or a missing audio
    /// file fails without producing any output.
    #[tracing::instrument(skip_all, fields(dir = %frames.root().display()))]
    pub fn encode(&self, frames: &FrameDir) -> YoyResult<EncodeOutput> {
        let pngs = frames.list_pngs()?;
        let Some(first) = pngs.first() else {
            return Err(YoyError::validation(format!(
                "no .png frames found in '{}'",
                frames.root().display()
            )));
        };
        if let Some(audio) = &self.opts.audio_path
            && !audio.is_file()
        {
            return Err(YoyError::validation(format!(
                "audio file '{}' does not exist",
                audio.display()
            )));
        }

        let (width, height) = image::image_dimensions(first).map_err(|e| {
            YoyError::encode(format!("read frame '{}': {e}", first.display()))
        })?;
        check_dimensions(width, height)?;

        tracing::info!(
            frames = pngs.len(),
            width,
            height,
            fps = self.opts.fps.as_f64(),
            "encoding video"
        );
        let mut stream = FfmpegStream::spawn(&self.opts, width, height)?;
        for png in &pngs {
            let img = image::open(png)
                .map_err(|e| YoyError::encode(format!("read frame '{}': {e}", png.display())))?
                .into_rgba8();
            if img.width() != width || img.height() != height {
                return Err(YoyError::validation(format!(
                    "frame '{}' is {}x{}, expected {}x{}",
                    png.display(),
                    img.width(),
                    img.height(),
                    width,
                    height
                )));
            }
            stream.push(img.as_raw())?;
        }
        stream.finish()?;

        let n = pngs.len() as u64;
        let output_path = match &self.opts.audio_path {
            Some(audio) => {
                let duration = self.opts.fps.frames_to_secs(n);
                mux_audio(
                    &self.opts.video_path,
                    audio,
                    &self.opts.output_path,
                    duration,
                    self.opts.overwrite,
                )?;
                Some(self.opts.output_path.clone())
            }
            None => None,
        };

        Ok(EncodeOutput {
            video_path: self.opts.video_path.clone(),
            output_path,
            frames: n,
            width,
            height,
        })
    }
}

fn check_dimensions(width: u32, height: u32) -> YoyResult<()> {
    if width == 0 || height == 0 {
        return Err(YoyError::validation("frame width/height must be non-zero"));
    }
    if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
        return Err(YoyError::validation(format!(
            "frame size {width}x{height} must be even (required for yuv420p mp4 output)"
        )));
    }
    Ok(())
}

fn check_output(path: &Path, overwrite: bool) -> YoyResult<()> {
    ensure_parent_dir(path)?;
    if !overwrite && path.exists() {
        return Err(YoyError::validation(format!(
            "output file '{}' already exists",
            path.display()
        )));
    }
    Ok(())
}

/// Raw RGBA frames piped into an `ffmpeg` child.
struct FfmpegStream {
    child: Child,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    bg_rgba: [u8; 4],
}

impl FfmpegStream {
    fn spawn(opts: &EncodeOpts, width: u32, height: u32) -> YoyResult<Self> {
        check_output(&opts.video_path, opts.overwrite)?;
        if !is_ffmpeg_on_path() {
            return Err(YoyError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if opts.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{width}x{height}"),
            "-r",
            &format!("{}/{}", opts.fps.num, opts.fps.den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&opts.video_path);
        Self::start(cmd, width, height, opts.bg_rgba)
    }

    /// Run `cmd` with piped stdin/stderr, expecting `width`x`height` RGBA frames on stdin.
    fn start(mut cmd: Command, width: u32, height: u32, bg_rgba: [u8; 4]) -> YoyResult<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| {
            YoyError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| YoyError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| YoyError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            child,
            stdin: Some(stdin),
            stderr_drain: Some(stderr_drain),
            scratch: vec![0u8; (width as usize) * (height as usize) * 4],
            bg_rgba,
        })
    }

    /// Flatten one straight-alpha frame over the background and write it.
    ///
    /// A failed write usually means ffmpeg already exited; the child is reaped and its
    /// stderr becomes part of the error.
    fn push(&mut self, rgba: &[u8]) -> YoyResult<()> {
        flatten_straight_over_bg(&mut self.scratch, rgba, self.bg_rgba)?;
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(YoyError::encode("ffmpeg stream is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&self.scratch) {
            let detail = match self.close() {
                Ok((status, stderr)) if stderr.is_empty() => format!("ffmpeg exited with {status}"),
                Ok((status, stderr)) => format!("ffmpeg exited with {status}: {stderr}"),
                Err(close_err) => close_err.to_string(),
            };
            return Err(YoyError::encode(format!(
                "failed to write frame to ffmpeg stdin: {e} ({detail})"
            )));
        }
        Ok(())
    }

    /// Close stdin, wait for the child and collect its stderr text.
    fn close(&mut self) -> YoyResult<(ExitStatus, String)> {
        drop(self.stdin.take());
        let status = self.child.wait().map_err(|e| {
            YoyError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| YoyError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| YoyError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        Ok((status, String::from_utf8_lossy(&stderr_bytes).trim().to_string()))
    }

    fn finish(mut self) -> YoyResult<()> {
        let (status, stderr) = self.close()?;
        if !status.success() {
            return Err(YoyError::encode(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }
        Ok(())
    }
}

/// Combine `video` with the first `duration_secs` of `audio` into `out`.
///
/// The video stream is copied as-is; the audio is re-encoded to AAC.
#[tracing::instrument(skip_all, fields(out = %out.display()))]
pub fn mux_audio(
    video: &Path,
    audio: &Path,
    out: &Path,
    duration_secs: f64,
    overwrite: bool,
) -> YoyResult<()> {
    if !(duration_secs.is_finite() && duration_secs > 0.0) {
        return Err(YoyError::validation(format!(
            "mux duration must be > 0, got {duration_secs}"
        )));
    }
    if !audio.is_file() {
        return Err(YoyError::validation(format!(
            "audio file '{}' does not exist",
            audio.display()
        )));
    }
    check_output(out, overwrite)?;

    tracing::info!(
        audio = %audio.display(),
        duration_secs,
        "muxing music track"
    );
    let output = Command::new("ffmpeg")
        .arg(if overwrite { "-y" } else { "-n" })
        .args(["-loglevel", "error", "-i"])
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-t",
            &format!("{duration_secs:.3}"),
            "-movflags",
            "+faststart",
        ])
        .arg(out)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .output()
        .map_err(|e| {
            YoyError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(YoyError::encode(format!(
            "ffmpeg mux exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> YoyResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
