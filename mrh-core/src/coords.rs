//! Mapping between canvas pixels and (chrom1, chrom2) sequence space.
//!
//! The x axis always follows chrom1 and the y axis chrom2. The two axes keep
//! independent scales, so a non-square genomic window stretches to fill the canvas.

use crate::types::*;

/// Bases removed from (or added to) each span per unit of zoom level.
pub const SCALE_FACTOR: f64 = 1000.0;

/// Zooming in never shrinks a span below this many bases.
pub const MIN_SPAN: GenomicPos = 1;

/// Convert a canvas pixel to sequence coordinates. Prone to small rounding errors.
pub fn canvas_to_sequence(point: PixelPoint, viewport: &Viewport, canvas: CanvasSize) -> SequencePoint {
    let perc_x = if canvas.width == 0 { 0.0 } else { point.x / canvas.width as f64 };
    let perc_y = if canvas.height == 0 { 0.0 } else { point.y / canvas.height as f64 };
    SequencePoint {
        x: viewport.start1 as f64 + perc_x * viewport.width() as f64,
        y: viewport.start2 as f64 + perc_y * viewport.height() as f64,
    }
}

/// Pixels per base on each axis.
pub fn viewport_to_canvas_ratio(viewport: &Viewport, canvas: CanvasSize) -> (f64, f64) {
    let ratio = |pixels: u32, span: GenomicPos| {
        if span <= 0 {
            0.0
        } else {
            pixels as f64 / span as f64
        }
    };
    (ratio(canvas.width, viewport.width()), ratio(canvas.height, viewport.height()))
}

/// Unfloored inverse of [`canvas_to_sequence`].
pub fn sequence_to_canvas(point: SequencePoint, viewport: &Viewport, canvas: CanvasSize) -> PixelPoint {
    let (rx, ry) = viewport_to_canvas_ratio(viewport, canvas);
    PixelPoint {
        x: (point.x - viewport.start1 as f64) * rx,
        y: (point.y - viewport.start2 as f64) * ry,
    }
}

/// Pixel rectangle covered by a genomic cell, floored the way cells are painted.
pub fn cell_to_pixel_rect(cell: &DataPoint, viewport: &Viewport, canvas: CanvasSize) -> PixelRect {
    let (rx, ry) = viewport_to_canvas_ratio(viewport, canvas);
    let offset = |pos: GenomicPos, origin: GenomicPos, ratio: f64| {
        (pos.saturating_sub(origin) as f64 * ratio).floor() as i64
    };
    let x1 = offset(cell.x1, viewport.start1, rx);
    let y1 = offset(cell.y1, viewport.start2, ry);
    let x2 = offset(cell.x2, viewport.start1, rx);
    let y2 = offset(cell.y2, viewport.start2, ry);
    PixelRect {
        x: x1,
        y: y1,
        width: x2.saturating_sub(x1),
        height: y2.saturating_sub(y1),
    }
}

/// Translate a start so `[start, start + span)` fits inside the header.
/// When the chromosome is shorter than the span the lower bound wins.
pub fn clamp_axis(start: GenomicPos, span: GenomicPos, header: &Header) -> GenomicPos {
    let upper = header.stop.saturating_sub(span);
    if upper < header.start {
        log::warn!(
            "span {} exceeds {} ({}..{}), pinning to chromosome start",
            span,
            header.name,
            header.start,
            header.stop
        );
        return header.start;
    }
    start.max(header.start).min(upper)
}

/// Keep both spans and slide each axis into its chromosome bounds.
pub fn clamp_viewport(candidate: &Viewport, header1: &Header, header2: &Header) -> Viewport {
    let width = candidate.width();
    let height = candidate.height();
    let start1 = clamp_axis(candidate.start1, width, header1);
    let start2 = clamp_axis(candidate.start2, height, header2);
    Viewport {
        start1,
        stop1: start1.saturating_add(width),
        start2,
        stop2: start2.saturating_add(height),
        ..candidate.clone()
    }
}

/// Zoom both axes around the pixel under the pointer.
///
/// Positive levels zoom in (smaller spans), negative levels zoom out. Each span
/// changes by `zoom_level * scale_factor` bases and is recentered on the
/// sequence point under `center` before clamping.
pub fn compute_zoom_viewport(
    center: PixelPoint,
    zoom_level: f64,
    scale_factor: f64,
    current: &Viewport,
    canvas: CanvasSize,
    header1: &Header,
    header2: &Header,
) -> Viewport {
    let adjustment = zoom_level * scale_factor;
    if !adjustment.is_finite() {
        return clamp_viewport(current, header1, header2);
    }

    let new_width = ((current.width() as f64 - adjustment).round() as GenomicPos).max(MIN_SPAN);
    let new_height = ((current.height() as f64 - adjustment).round() as GenomicPos).max(MIN_SPAN);

    let anchor = canvas_to_sequence(center, current, canvas);
    let start1 = (anchor.x - new_width as f64 / 2.0).floor() as GenomicPos;
    let start2 = (anchor.y - new_height as f64 / 2.0).floor() as GenomicPos;

    let candidate = Viewport {
        start1,
        stop1: start1.saturating_add(new_width),
        start2,
        stop2: start2.saturating_add(new_height),
        ..current.clone()
    };
    clamp_viewport(&candidate, header1, header2)
}

/// Drag the view by a pixel delta; content follows the pointer.
pub fn pan_viewport(
    delta: PixelDelta,
    current: &Viewport,
    canvas: CanvasSize,
    header1: &Header,
    header2: &Header,
) -> Viewport {
    let perc_x = if canvas.width == 0 { 0.0 } else { delta.x / canvas.width as f64 };
    let perc_y = if canvas.height == 0 { 0.0 } else { delta.y / canvas.height as f64 };
    let dx = (perc_x * current.width() as f64).floor() as GenomicPos;
    let dy = (perc_y * current.height() as f64).floor() as GenomicPos;
    let (width, height) = (current.width(), current.height());
    let start1 = clamp_axis(current.start1.saturating_sub(dx), width, header1);
    let start2 = clamp_axis(current.start2.saturating_sub(dy), height, header2);
    Viewport {
        start1,
        stop1: start1.saturating_add(width),
        start2,
        stop2: start2.saturating_add(height),
        ..current.clone()
    }
}
