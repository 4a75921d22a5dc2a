//! Shading returned cells onto a surface.

use crate::surface::RenderSurface;
use mrh_core::coords::cell_to_pixel_rect;
use mrh_core::{DataPoint, LinearRamp, Viewport};

/// Outcome of painting one layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub painted: usize,
    /// Cells whose floored rectangle had no area.
    pub degenerate: usize,
}

/// Paint each cell at its floored pixel rect with its ramp color.
///
/// Later cells overwrite earlier ones where they overlap.
pub fn paint_cells(
    surface: &mut dyn RenderSurface,
    cells: &[DataPoint],
    viewport: &Viewport,
    ramp: &LinearRamp,
) -> PaintStats {
    let canvas = surface.size();
    let mut stats = PaintStats::default();
    for cell in cells {
        let rect = cell_to_pixel_rect(cell, viewport, canvas);
        if rect.is_empty() {
            stats.degenerate += 1;
            continue;
        }
        surface.fill_rect(&rect, &ramp.map_color(cell.value));
        stats.painted += 1;
    }
    stats
}
