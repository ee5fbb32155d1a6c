//! Chart text drawn as an SVG overlay and rasterized with resvg.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::core::{Canvas, Rgba};
use crate::foundation::error::{YoyError, YoyResult};

/// Horizontal anchor of a text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_svg(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// One positioned run of text, in pixels.
#[derive(Clone, Debug)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    /// Baseline y.
    pub y: f64,
    pub size_px: f64,
    pub weight: u16,
    pub color: Rgba,
    pub anchor: Anchor,
    /// Clockwise rotation in degrees around `(x, y)`.
    pub rotate_deg: f64,
}

impl TextRun {
    pub fn new(text: impl Into<String>, x: f64, y: f64, size_px: f64, color: Rgba) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size_px,
            weight: 400,
            color,
            anchor: Anchor::Start,
            rotate_deg: 0.0,
        }
    }

    /// Position by the top of the glyph box instead of the baseline.
    pub fn top(mut self) -> Self {
        self.y += self.size_px * 0.8;
        self
    }

    pub fn weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn rotate(mut self, deg: f64) -> Self {
        self.rotate_deg = deg;
        self
    }
}

/// Build an SVG document with the given text runs over a transparent canvas.
pub fn svg_document(canvas: Canvas, font_family: &str, runs: &[TextRun]) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = canvas.width,
        h = canvas.height
    );
    for run in runs {
        let [r, g, b, a] = run.color.to_rgba8(1.0);
        let _ = write!(
            svg,
            r#"<text x="{x:.2}" y="{y:.2}" font-family="{family}, sans-serif" font-size="{size:.2}" font-weight="{weight}" text-anchor="{anchor}" fill="rgb({r},{g},{b})" fill-opacity="{opacity:.3}""#,
            x = run.x,
            y = run.y,
            family = escape_xml(font_family),
            size = run.size_px,
            weight = run.weight,
            anchor = run.anchor.as_svg(),
            opacity = f64::from(a) / 255.0,
        );
        if run.rotate_deg != 0.0 {
            let _ = write!(
                svg,
                r#" transform="rotate({deg:.2} {x:.2} {y:.2})""#,
                deg = run.rotate_deg,
                x = run.x,
                y = run.y
            );
        }
        let _ = write!(svg, ">{}</text>", escape_xml(&run.text));
    }
    svg.push_str("</svg>");
    svg
}

pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rasterizes SVG text overlays with a shared font database.
pub struct TextRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl std::fmt::Debug for TextRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRasterizer")
            .field("faces", &self.fontdb.faces().count())
            .finish()
    }
}

impl TextRasterizer {
    /// System fonts plus any `.ttf`/`.otf`/`.ttc` files found in `font_dirs`.
    pub fn with_system_fonts(font_dirs: &[PathBuf]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.faces().count(), "loaded font database");
        Self {
            fontdb: Arc::new(db),
        }
    }

    /// Use an existing database (an empty one draws no text).
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }

    pub fn face_count(&self) -> usize {
        self.fontdb.faces().count()
    }

    /// Rasterize `svg` into premultiplied RGBA8 of exactly `canvas` size.
    pub fn rasterize(&self, svg: &str, canvas: Canvas) -> YoyResult<Vec<u8>> {
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            font_resolver: make_font_resolver(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &opts)
            .map_err(|e| YoyError::render(format!("parse text overlay svg: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| YoyError::render("failed to allocate text overlay pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap.data().to_vec())
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "font directory not readable, skipping");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::debug!(path = %path.display(), error = %e, "failed to load font");
        }
    }
}

/// Resolve requested families, then generic families, then any face at all.
fn make_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            if let Some(id) = fontdb.query(&query) {
                return Some(id);
            }
            fontdb.faces().next().map(|f| f.id)
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
