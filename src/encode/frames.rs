use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{YoyError, YoyResult};

/// Digits in an exported frame file name.
pub const FRAME_INDEX_WIDTH: usize = 10;

/// `0000000042.png` for frame 42.
pub fn frame_file_name(idx: FrameIndex) -> String {
    format!("{:0width$}.png", idx.0, width = FRAME_INDEX_WIDTH)
}

/// Monotonic frame counter owned by a single run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCounter {
    next: u64,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `start` (e.g. to append to an existing sequence).
    pub fn starting_at(start: FrameIndex) -> Self {
        Self { next: start.0 }
    }

    /// Index the next exported frame will get.
    pub fn peek(&self) -> FrameIndex {
        FrameIndex(self.next)
    }

    /// Claim the next index.
    pub fn advance(&mut self) -> FrameIndex {
        let idx = FrameIndex(self.next);
        self.next += 1;
        idx
    }
}

/// Directory holding exported still frames.
#[derive(Clone, Debug)]
pub struct FrameDir {
    root: PathBuf,
}

impl FrameDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory; with `clean`, delete frames left by a previous run.
    ///
    /// Only files named like exported frames are removed.
    pub fn prepare(&self, clean: bool) -> YoyResult<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("create image directory '{}'", self.root.display()))?;
        if !clean {
            return Ok(());
        }
        let mut removed = 0usize;
        for path in self.list_pngs()? {
            if !is_frame_file(&path) {
                continue;
            }
            std::fs::remove_file(&path)
                .with_context(|| format!("remove stale frame '{}'", path.display()))?;
            removed += 1;
        }
        if removed > 0 {
            tracing::info!(removed, dir = %self.root.display(), "removed stale frames");
        }
        Ok(())
    }

    pub fn path_for(&self, idx: FrameIndex) -> PathBuf {
        self.root.join(frame_file_name(idx))
    }

    /// All `.png` files in lexical order, which is frame order given fixed-width names.
    pub fn list_pngs(&self) -> YoyResult<Vec<PathBuf>> {
        let rd = match std::fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(YoyError::validation(format!(
                    "image directory '{}' does not exist",
                    self.root.display()
                )));
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read image directory '{}'", self.root.display()))
                    .into());
            }
        };

        let mut out = Vec::new();
        for entry in rd {
            let entry = entry
                .with_context(|| format!("read image directory '{}'", self.root.display()))?;
            let path = entry.path();
            let is_png = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
            if is_png && path.is_file() {
                out.push(path);
            }
        }
        out.sort();
        Ok(out)
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.len() == FRAME_INDEX_WIDTH && s.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/frames.rs"]
mod tests;
