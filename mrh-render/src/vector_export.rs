/*!
# Vector Export

SVG rendition of a heatmap surface. Every `fill_rect` becomes one `<rect>`
element so the output stays diffable and deterministic for identical input.
*/

use crate::surface::{clip_rect, RenderSurface};
use anyhow::{Context, Result};
use mrh_core::{CanvasSize, Color, PixelRect};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct SvgSurface {
    width: u32,
    height: u32,
    elements: Vec<String>,
    top_comments: Vec<String>,
}

fn fill_attrs(color: &Color) -> String {
    let [r, g, b, _] = color.to_rgba8();
    if color.is_opaque() {
        format!(r##"fill="#{:02x}{:02x}{:02x}""##, r, g, b)
    } else {
        format!(
            r##"fill="#{:02x}{:02x}{:02x}" fill-opacity="{:.3}""##,
            r,
            g,
            b,
            color.alpha.clamp(0.0, 1.0)
        )
    }
}

impl SvgSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            width: size.width,
            height: size.height,
            elements: Vec::new(),
            top_comments: Vec::new(),
        }
    }

    /// Attach a comment written right after the `<svg>` tag.
    pub fn add_comment(&mut self, text: &str) {
        self.top_comments.push(text.to_string());
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            out,
            r#"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg" shape-rendering="crispEdges">"#,
            self.width, self.height, self.width, self.height
        );
        for c in &self.top_comments {
            for line in c.lines() {
                let _ = writeln!(out, "  <!-- {} -->", line.replace("--", "- -"));
            }
        }
        for element in &self.elements {
            let _ = writeln!(out, "  {}", element);
        }
        out.push_str("</svg>\n");
        out
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        file.write_all(self.to_svg_string().as_bytes())?;
        Ok(())
    }
}

impl RenderSurface for SvgSurface {
    fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }

    fn clear(&mut self, color: &Color) {
        self.elements.clear();
        self.elements.push(format!(
            r#"<rect width="{}" height="{}" {}/>"#,
            self.width,
            self.height,
            fill_attrs(color)
        ));
    }

    fn fill_rect(&mut self, rect: &PixelRect, color: &Color) {
        let Some((x0, y0, x1, y1)) = clip_rect(rect, self.size()) else {
            return;
        };
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" {}/>"#,
            x0,
            y0,
            x1 - x0,
            y1 - y0,
            fill_attrs(color)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_elements() {
        let mut svg = SvgSurface::new(CanvasSize::new(10, 10));
        let white: Color = "ffffff".parse().unwrap();
        svg.fill_rect(&PixelRect { x: 0, y: 0, width: 2, height: 2 }, &white);
        svg.clear(&"888888".parse().unwrap());
        assert_eq!(svg.element_count(), 1);
        assert!(svg.to_svg_string().contains(r##"fill="#888888""##));
    }

    #[test]
    fn test_comments_survive_clear() {
        let mut svg = SvgSurface::new(CanvasSize::new(10, 10));
        svg.add_comment("view a--b");
        svg.clear(&"888888".parse().unwrap());
        let out = svg.to_svg_string();
        assert!(out.contains("<!-- view a- -b -->"));
        assert!(out.find("<!--").unwrap() < out.find("<rect").unwrap());
    }

    #[test]
    fn test_rects_are_clipped() {
        let mut svg = SvgSurface::new(CanvasSize::new(10, 10));
        let c: Color = "ff0000".parse().unwrap();
        svg.fill_rect(&PixelRect { x: 8, y: -2, width: 5, height: 4 }, &c);
        svg.fill_rect(&PixelRect { x: 3, y: 3, width: 0, height: 4 }, &c);
        let out = svg.to_svg_string();
        assert!(out.contains(r##"<rect x="8" y="0" width="2" height="2" fill="#ff0000"/>"##));
        assert_eq!(svg.element_count(), 1);
    }

    #[test]
    fn test_translucent_fill_opacity() {
        let mut svg = SvgSurface::new(CanvasSize::new(4, 4));
        let c = Color::from_channels([0.0, 0.0, 255.0]).unwrap().with_alpha(0.25).unwrap();
        svg.clear(&c);
        assert!(svg.to_svg_string().contains(r#"fill-opacity="0.250""#));
    }
}
