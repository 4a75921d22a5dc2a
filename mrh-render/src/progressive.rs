//! Coarse-to-fine layer scheduling.
//!
//! A pass is started for every viewport change. It snapshots the viewport and
//! color ramp, bumps the generation counter and hands back one request per
//! layer. Responses are applied in whatever order they complete; anything
//! tagged with an older generation is dropped unpainted.

use crate::fetch::FetchResult;
use crate::paint::{paint_cells, PaintStats};
use crate::surface::RenderSurface;
use mrh_core::{Color, FetchRequest, LinearRamp, MrhConfig, MrhResult, Viewport};

pub type Generation = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct LayerRequest {
    pub generation: Generation,
    pub layer: usize,
    pub target_resolution: u32,
    pub request: FetchRequest,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub generation: Generation,
    pub requests: Vec<LayerRequest>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutcome {
    Painted { stats: PaintStats, is_final: bool },
    Stale,
    Failed { message: String },
}

/// Pixel resolutions for each layer: `floor(width * f)` per factor, then the
/// full width. Zero targets are skipped.
pub fn layer_targets(canvas_width: u32, blur_factors: &[f64]) -> Vec<u32> {
    let mut targets: Vec<u32> = blur_factors
        .iter()
        .filter(|f| f.is_finite() && **f > 0.0)
        .map(|f| (canvas_width as f64 * f).floor() as u32)
        .filter(|t| *t > 0)
        .collect();
    targets.push(canvas_width);
    targets
}

#[derive(Debug)]
struct ActivePass {
    generation: Generation,
    viewport: Viewport,
    ramp: LinearRamp,
    cleared: bool,
    final_layer: usize,
    outstanding: usize,
}

pub struct ProgressiveRenderer {
    blur_factors: Vec<f64>,
    background: Color,
    generation: Generation,
    active: Option<ActivePass>,
}

impl ProgressiveRenderer {
    pub fn new(blur_factors: Vec<f64>, background: Color) -> Self {
        Self {
            blur_factors,
            background,
            generation: 0,
            active: None,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// True once every layer of the current pass has been applied or failed.
    pub fn is_idle(&self) -> bool {
        self.active.as_ref().map_or(true, |p| p.outstanding == 0)
    }

    /// Start a pass for the configuration's current viewport.
    pub fn begin(&mut self, config: &MrhConfig) -> MrhResult<RenderPass> {
        let ramp = config.ramp()?;
        self.generation += 1;
        let generation = self.generation;

        let targets = layer_targets(config.render().canvas_width, &self.blur_factors);
        let final_layer = targets.len() - 1;
        let requests: Vec<LayerRequest> = targets
            .into_iter()
            .enumerate()
            .map(|(layer, target)| LayerRequest {
                generation,
                layer,
                target_resolution: target,
                request: config.data.fetch_request(target),
                is_final: layer == final_layer,
            })
            .collect();

        log::debug!(
            "pass {} for {:?}: targets {:?}",
            generation,
            config.viewport(),
            requests.iter().map(|r| r.target_resolution).collect::<Vec<_>>()
        );

        self.active = Some(ActivePass {
            generation,
            viewport: config.viewport().clone(),
            ramp,
            cleared: false,
            final_layer,
            outstanding: requests.len(),
        });
        Ok(RenderPass { generation, requests })
    }

    /// Apply one completed fetch to the surface.
    pub fn apply(
        &mut self,
        surface: &mut dyn RenderSurface,
        generation: Generation,
        layer: usize,
        result: FetchResult,
    ) -> LayerOutcome {
        let pass = match self.active.as_mut() {
            Some(pass) if pass.generation == generation => pass,
            _ => {
                log::warn!(
                    "dropping layer {} of generation {} (current {})",
                    layer,
                    generation,
                    self.generation
                );
                return LayerOutcome::Stale;
            }
        };
        pass.outstanding = pass.outstanding.saturating_sub(1);

        match result {
            Ok(response) => {
                if !pass.cleared {
                    surface.clear(&self.background);
                    pass.cleared = true;
                }
                let stats = paint_cells(surface, &response.data, &pass.viewport, &pass.ramp);
                log::debug!(
                    "generation {} layer {}: {} cells painted, {} degenerate",
                    generation,
                    layer,
                    stats.painted,
                    stats.degenerate
                );
                LayerOutcome::Painted {
                    stats,
                    is_final: layer == pass.final_layer,
                }
            }
            Err(err) => {
                log::error!("fetch failed for generation {} layer {}: {}", generation, layer, err);
                LayerOutcome::Failed {
                    message: err.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use crate::surface::PixelSurface;
    use mrh_core::{CanvasSize, DataConfig, DataPoint, FetchResponse, Header, HeaderPolicy, RenderConfig, Source};

    fn config() -> MrhConfig {
        let source = Source::new("ds", vec![Header::new("chr1", 0, 10_000, 0.0, 10.0)]).unwrap();
        let data = DataConfig::new(source, Viewport::square("chr1", 0, 1000), HeaderPolicy::Chrom1).unwrap();
        MrhConfig::new(data, RenderConfig::default()).unwrap()
    }

    fn renderer() -> ProgressiveRenderer {
        ProgressiveRenderer::new(vec![0.1, 0.2, 0.5], "888888".parse().unwrap())
    }

    fn full(value: f64) -> FetchResult {
        Ok(FetchResponse { data: vec![DataPoint::new(0, 0, 1000, 1000, value)] })
    }

    #[test]
    fn test_layer_targets() {
        assert_eq!(layer_targets(320, &[0.1, 0.2, 0.5]), vec![32, 64, 160, 320]);
        assert_eq!(layer_targets(5, &[0.1, 0.5]), vec![2, 5]);
    }

    #[test]
    fn test_begin_builds_requests() {
        let mut r = renderer();
        let pass = r.begin(&config()).unwrap();
        assert_eq!(pass.generation, 1);
        assert_eq!(pass.requests.len(), 4);
        assert_eq!(pass.requests[0].request.max_resolution, 31);
        assert_eq!(pass.requests[3].request.max_resolution, 3);
        assert!(pass.requests[3].is_final);
        assert!(!r.is_idle());
    }

    #[test]
    fn test_nothing_cleared_before_first_layer() {
        let mut r = renderer();
        let mut s = PixelSurface::new(CanvasSize::new(320, 320));
        let pass = r.begin(&config()).unwrap();
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 0]);

        let outcome = r.apply(&mut s, pass.generation, 0, Ok(FetchResponse::default()));
        assert!(matches!(outcome, LayerOutcome::Painted { is_final: false, .. }));
        assert_eq!(s.pixel(0, 0), [0x88, 0x88, 0x88, 255]);
    }

    #[test]
    fn test_stale_generation_discarded() {
        let mut r = renderer();
        let mut s = PixelSurface::new(CanvasSize::new(320, 320));
        let old = r.begin(&config()).unwrap();
        let new = r.begin(&config()).unwrap();

        assert_eq!(r.apply(&mut s, old.generation, 3, full(10.0)), LayerOutcome::Stale);
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 0]);

        r.apply(&mut s, new.generation, 3, full(0.0));
        assert_eq!(s.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn test_failure_keeps_previous_layer() {
        let mut r = renderer();
        let mut s = PixelSurface::new(CanvasSize::new(320, 320));
        let pass = r.begin(&config()).unwrap();
        r.apply(&mut s, pass.generation, 0, full(10.0));

        let outcome = r.apply(&mut s, pass.generation, 1, Err(FetchError::Transport("reset".into())));
        assert!(matches!(outcome, LayerOutcome::Failed { .. }));
        assert_eq!(s.pixel(5, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn test_out_of_order_last_applied_wins() {
        let mut r = renderer();
        let mut s = PixelSurface::new(CanvasSize::new(320, 320));
        let pass = r.begin(&config()).unwrap();
        r.apply(&mut s, pass.generation, 3, full(0.0));
        r.apply(&mut s, pass.generation, 0, full(10.0));
        assert_eq!(s.pixel(100, 100), [255, 255, 255, 255]);
        r.apply(&mut s, pass.generation, 1, full(0.0));
        r.apply(&mut s, pass.generation, 2, full(0.0));
        assert!(r.is_idle());
    }
}
