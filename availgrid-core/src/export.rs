//! Export of a rendered timetable as a standalone image file.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::surface::{NodeKind, Rgb, Surface};

/// File name, without extension, of every exported timetable.
pub const EXPORT_FILE_STEM: &str = "Hiring_Schedule";

/// Capture settings. The defaults are what exports always use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    /// Output pixels per logical pixel.
    pub scale: u32,
    /// Opaque fill behind the whole surface.
    pub background: Rgb,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2,
            background: Rgb::WHITE,
        }
    }
}

/// Turns a laid-out surface into image bytes.
///
/// Implementations must skip nodes marked `capture_excluded`.
pub trait Capture {
    /// File extension of the produced image.
    fn extension(&self) -> &'static str;

    fn capture(&self, surface: &Surface, options: &CaptureOptions) -> Result<Vec<u8>, ExportError>;
}

/// Encodes a surface as an SVG document.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgCapture;

impl Capture for SvgCapture {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn capture(&self, surface: &Surface, options: &CaptureOptions) -> Result<Vec<u8>, ExportError> {
        if surface.width == 0 || surface.height == 0 {
            return Err(ExportError::EmptySurface);
        }

        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            surface.width * options.scale,
            surface.height * options.scale,
            surface.width,
            surface.height,
        )?;
        writeln!(
            out,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            surface.width, surface.height, options.background,
        )?;

        for node in surface.captured() {
            let r = node.rect;
            match &node.kind {
                NodeKind::Box { fill, stroke } => {
                    write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                        r.x, r.y, r.width, r.height, fill,
                    )?;
                    if let Some(stroke) = stroke {
                        write!(out, r#" stroke="{}" stroke-width="1""#, stroke)?;
                    }
                    writeln!(out, "/>")?;
                }
                NodeKind::Text {
                    content,
                    size,
                    bold,
                    color,
                } => {
                    let weight = if *bold { "bold" } else { "normal" };
                    writeln!(
                        out,
                        r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" font-weight="{}" fill="{}" dominant-baseline="hanging">{}</text>"#,
                        r.x,
                        r.y,
                        size,
                        weight,
                        color,
                        escape(content),
                    )?;
                }
            }
        }

        writeln!(out, "</svg>")?;
        Ok(out.into_bytes())
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Captures `surface` at the fixed export settings and writes it to
/// `dir/Hiring_Schedule.<ext>`, returning the written path.
pub fn export_image<C: Capture + ?Sized>(
    surface: &Surface,
    capture: &C,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = capture.capture(surface, &CaptureOptions::default())?;
    let path = dir.join(format!("{}.{}", EXPORT_FILE_STEM, capture.extension()));
    std::fs::write(&path, &bytes).map_err(|source| ExportError::Save {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), bytes = bytes.len(), "timetable exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day::Weekday;
    use crate::grid::{DisplayCell, DisplayColumn, DisplayGrid};
    use crate::surface::{render, DOWNLOAD_LABEL};
    use crate::time::Time24;

    fn sample() -> Surface {
        let grid = DisplayGrid {
            columns: vec![DisplayColumn {
                day: Weekday::Mon,
                cells: vec![DisplayCell {
                    start: Time24::from_hm(9, 0),
                    end: Time24::from_hm(9, 30),
                    names: vec!["Ann & Bo <3".to_string()],
                    is_free: true,
                }],
            }],
            selected: vec!["Ann & Bo <3".to_string()],
        };
        render(&grid, "Schedule")
    }

    fn svg(surface: &Surface) -> String {
        let bytes = SvgCapture
            .capture(surface, &CaptureOptions::default())
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn svg_is_upscaled_on_white() {
        let surface = sample();
        let doc = svg(&surface);
        assert!(doc.starts_with(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}""#,
            surface.width * 2,
            surface.height * 2
        )));
        assert!(doc.contains(&format!(
            r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##,
            surface.width, surface.height
        )));
    }

    #[test]
    fn svg_skips_excluded_nodes_and_escapes_text() {
        let doc = svg(&sample());
        assert!(!doc.contains(DOWNLOAD_LABEL));
        assert!(doc.contains("Ann &amp; Bo &lt;3"));
        assert!(doc.contains("9:00 AM - 9:30 AM"));
    }

    #[test]
    fn capture_is_reproducible() {
        assert_eq!(svg(&sample()), svg(&sample()));
    }

    #[test]
    fn empty_surface_fails() {
        let surface = Surface {
            width: 0,
            height: 0,
            nodes: vec![],
        };
        assert!(matches!(
            SvgCapture.capture(&surface, &CaptureOptions::default()),
            Err(ExportError::EmptySurface)
        ));
    }

    #[test]
    fn export_writes_fixed_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_image(&sample(), &SvgCapture, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Hiring_Schedule.svg"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("</svg>\n"));
    }

    #[test]
    fn export_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            export_image(&sample(), &SvgCapture, &missing),
            Err(ExportError::Save { .. })
        ));
    }
}
