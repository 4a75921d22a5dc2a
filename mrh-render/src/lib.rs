/*!
# MRH Rendering Pipeline

Progressive rendering of multi-resolution heatmaps onto fixed-size surfaces.

## Architecture

Every viewport change starts a render pass with one fetch per layer:
1. **Blurred layers**: resolutions at fractions of the canvas width, cheap to serve
2. **Final layer**: one resolution step per canvas pixel

Layers are painted as they arrive, coarse or fine, and a generation counter keeps
responses for an abandoned viewport off the surface. Surfaces are raster
(`PixelSurface`, PNG output) or vector (`SvgSurface`).
*/

pub mod fetch;
pub mod paint;
pub mod pattern;
pub mod progressive;
pub mod surface;
pub mod vector_export;
pub mod visualization;

pub use fetch::{DataFetcher, Delayed, FetchError, FetchResult, StaticProvider};
pub use paint::{paint_cells, PaintStats};
pub use pattern::test_pattern;
pub use progressive::{Generation, LayerOutcome, LayerRequest, ProgressiveRenderer, RenderPass};
pub use surface::{PixelSurface, RenderSurface};
pub use vector_export::SvgSurface;
pub use visualization::{run_pass, run_until, run_until_idle, InFlight, LayerResponse, PassSummary, Signal, Visualization};
