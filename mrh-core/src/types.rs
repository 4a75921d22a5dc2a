use serde::{Deserialize, Serialize};

pub type GenomicPos = i64;

/// Fallback pixel resolution used when a caller requests resolution 0.
pub const DEFAULT_RESOLUTION: u32 = 100;

/// Window shown when a dataset is first opened.
pub const DEFAULT_WINDOW_SIZE: GenomicPos = 100_000;

/// Per-chromosome bounds and score range, owned by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub start: GenomicPos,
    pub stop: GenomicPos,
    pub minscore: f64,
    pub maxscore: f64,
}

impl Header {
    pub fn new(name: impl Into<String>, start: GenomicPos, stop: GenomicPos, minscore: f64, maxscore: f64) -> Self {
        Self {
            name: name.into(),
            start,
            stop,
            minscore,
            maxscore,
        }
    }

    pub fn length(&self) -> GenomicPos {
        self.stop - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.stop && self.minscore.is_finite() && self.maxscore.is_finite()
    }
}

/// The genomic rectangle currently displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub chrom1: String,
    pub start1: GenomicPos,
    pub stop1: GenomicPos,
    pub chrom2: String,
    pub start2: GenomicPos,
    pub stop2: GenomicPos,
}

impl Viewport {
    pub fn new(
        chrom1: impl Into<String>,
        start1: GenomicPos,
        stop1: GenomicPos,
        chrom2: impl Into<String>,
        start2: GenomicPos,
        stop2: GenomicPos,
    ) -> Self {
        Self {
            chrom1: chrom1.into(),
            start1,
            stop1,
            chrom2: chrom2.into(),
            start2,
            stop2,
        }
    }

    /// Square window on a single chromosome against itself.
    pub fn square(chrom: impl Into<String>, start: GenomicPos, stop: GenomicPos) -> Self {
        let chrom = chrom.into();
        Self::new(chrom.clone(), start, stop, chrom, start, stop)
    }

    pub fn width(&self) -> GenomicPos {
        self.stop1.saturating_sub(self.start1)
    }

    pub fn height(&self) -> GenomicPos {
        self.stop2.saturating_sub(self.start2)
    }

    /// False when either span does not fit in a `GenomicPos`.
    pub fn spans_fit(&self) -> bool {
        self.stop1.checked_sub(self.start1).is_some() && self.stop2.checked_sub(self.start2).is_some()
    }

    pub fn is_ordered(&self) -> bool {
        self.start1 < self.stop1 && self.start2 < self.stop2
    }
}

/// Pixel dimensions and gradient endpoints. Never touched by gestures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub min_color: String,
    pub max_color: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_width: 320,
            canvas_height: 320,
            min_color: "000000".to_string(),
            max_color: "ffffff".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn canvas_size(&self) -> CanvasSize {
        CanvasSize::new(self.canvas_width, self.canvas_height)
    }
}

/// One returned cell: a genomic rectangle and its intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x1: GenomicPos,
    pub y1: GenomicPos,
    pub x2: GenomicPos,
    pub y2: GenomicPos,
    pub value: f64,
}

impl DataPoint {
    pub fn new(x1: GenomicPos, y1: GenomicPos, x2: GenomicPos, y2: GenomicPos, value: f64) -> Self {
        Self { x1, y1, x2, y2, value }
    }

    pub fn intersects(&self, viewport: &Viewport) -> bool {
        self.x1 < viewport.stop1 && viewport.start1 < self.x2 && self.y1 < viewport.stop2 && viewport.start2 < self.y2
    }
}

/// Request parameters derived from the viewport span; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionPair {
    pub min_resolution: GenomicPos,
    pub max_resolution: GenomicPos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelDelta {
    pub x: f64,
    pub y: f64,
}

impl PixelDelta {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl std::ops::Add for PixelDelta {
    type Output = PixelDelta;

    fn add(self, rhs: PixelDelta) -> PixelDelta {
        PixelDelta::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// A position in (chrom1, chrom2) sequence space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SequencePoint {
    pub x: f64,
    pub y: f64,
}

/// Integer pixel rectangle. Width or height may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl PixelRect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}
