//! Visualization state: which dataset, which region, how to draw it.
//!
//! `MrhConfig` is a plain aggregate. The data half (`DataConfig`) owns the
//! current viewport together with a read-only `Source`; the render half
//! (`RenderConfig`) holds canvas size and gradient endpoints. Every viewport
//! write is clamped against the chromosome headers before it is stored.

use crate::color::LinearRamp;
use crate::coords::{clamp_viewport, compute_zoom_viewport, pan_viewport};
use crate::error::{MrhError, MrhResult};
use crate::request::FetchRequest;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which header bounds the chrom2 axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    /// Both axes use chrom1's header.
    #[default]
    Chrom1,
    /// Each axis uses its own chromosome's header.
    PerAxis,
}

/// Dataset identity plus chromosome metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub dataset_id: String,
    pub chroms: Vec<String>,
    pub headers: HashMap<String, Header>,
}

impl Source {
    /// Build from headers, keeping their order as the chromosome order.
    pub fn new(dataset_id: impl Into<String>, headers: Vec<Header>) -> MrhResult<Self> {
        let chroms = headers.iter().map(|h| h.name.clone()).collect();
        let headers = headers.into_iter().map(|h| (h.name.clone(), h)).collect();
        let source = Self {
            dataset_id: dataset_id.into(),
            chroms,
            headers,
        };
        source.validate()?;
        Ok(source)
    }

    pub fn validate(&self) -> MrhResult<()> {
        for chrom in &self.chroms {
            let header = self.header(chrom)?;
            if !header.is_valid() {
                return Err(MrhError::InvalidHeader {
                    name: chrom.clone(),
                    reason: format!(
                        "expected start < stop and finite scores, got {}..{} [{}, {}]",
                        header.start, header.stop, header.minscore, header.maxscore
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn available_chroms(&self) -> &[String] {
        &self.chroms
    }

    pub fn header(&self, chrom: &str) -> MrhResult<&Header> {
        self.headers
            .get(chrom)
            .ok_or_else(|| MrhError::UnknownChromosome(chrom.to_string()))
    }
}

/// Source plus the region requested from the data provider.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    source: Source,
    viewport: Viewport,
    header_policy: HeaderPolicy,
    default_resolution: u32,
}

impl DataConfig {
    pub fn new(source: Source, viewport: Viewport, header_policy: HeaderPolicy) -> MrhResult<Self> {
        let mut config = Self {
            source,
            viewport: viewport.clone(),
            header_policy,
            default_resolution: DEFAULT_RESOLUTION,
        };
        config.set_viewport(viewport)?;
        Ok(config)
    }

    /// First chromosome against itself, starting at its first base.
    pub fn with_default_view(source: Source, header_policy: HeaderPolicy) -> MrhResult<Self> {
        let chrom = source
            .available_chroms()
            .first()
            .cloned()
            .ok_or_else(|| MrhError::InvalidViewport("source has no chromosomes".into()))?;
        let header = source.header(&chrom)?;
        let stop = (header.start + DEFAULT_WINDOW_SIZE).min(header.stop);
        let viewport = Viewport::square(chrom, header.start, stop);
        Self::new(source, viewport, header_policy)
    }

    pub fn with_default_resolution(mut self, resolution: u32) -> Self {
        self.default_resolution = resolution;
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn dataset_id(&self) -> &str {
        &self.source.dataset_id
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn header_policy(&self) -> HeaderPolicy {
        self.header_policy
    }

    /// Header for the active chrom1.
    pub fn current_header(&self) -> MrhResult<&Header> {
        self.source.header(&self.viewport.chrom1)
    }

    fn headers_for<'a>(&'a self, viewport: &Viewport) -> MrhResult<(&'a Header, &'a Header)> {
        let header1 = self.source.header(&viewport.chrom1)?;
        let header2 = match self.header_policy {
            HeaderPolicy::Chrom1 => {
                // still reject unknown names on the second axis
                self.source.header(&viewport.chrom2)?;
                header1
            }
            HeaderPolicy::PerAxis => self.source.header(&viewport.chrom2)?,
        };
        Ok((header1, header2))
    }

    pub fn axis_headers(&self) -> MrhResult<(&Header, &Header)> {
        self.headers_for(&self.viewport)
    }

    /// Clamp and store a candidate viewport. Returns whether anything changed.
    pub fn set_viewport(&mut self, candidate: Viewport) -> MrhResult<bool> {
        if !candidate.is_ordered() {
            return Err(MrhError::InvalidViewport(format!(
                "start must be below stop on both axes: {}..{} x {}..{}",
                candidate.start1, candidate.stop1, candidate.start2, candidate.stop2
            )));
        }
        if !candidate.spans_fit() {
            return Err(MrhError::InvalidViewport(format!(
                "span out of range: {}..{} x {}..{}",
                candidate.start1, candidate.stop1, candidate.start2, candidate.stop2
            )));
        }
        let (header1, header2) = self.headers_for(&candidate)?;
        let clamped = clamp_viewport(&candidate, header1, header2);
        if clamped == self.viewport {
            return Ok(false);
        }
        log::debug!("viewport: {:?}", clamped);
        self.viewport = clamped;
        Ok(true)
    }

    /// Switch chrom1 (mirrored onto chrom2) keeping the current spans.
    pub fn set_chromosome(&mut self, chrom: &str) -> MrhResult<bool> {
        self.source.header(chrom)?;
        let candidate = Viewport {
            chrom1: chrom.to_string(),
            chrom2: chrom.to_string(),
            ..self.viewport.clone()
        };
        self.set_viewport(candidate)
    }

    pub fn pan(&mut self, delta: PixelDelta, canvas: CanvasSize) -> MrhResult<bool> {
        let (header1, header2) = self.axis_headers()?;
        let next = pan_viewport(delta, &self.viewport, canvas, header1, header2);
        self.set_viewport(next)
    }

    pub fn zoom(&mut self, center: PixelPoint, level: f64, scale_factor: f64, canvas: CanvasSize) -> MrhResult<bool> {
        let (header1, header2) = self.axis_headers()?;
        let next = compute_zoom_viewport(center, level, scale_factor, &self.viewport, canvas, header1, header2);
        self.set_viewport(next)
    }

    /// Coarsest and finest cell sizes for a target pixel resolution.
    ///
    /// The span counts bases inclusively along chrom1.
    pub fn request_resolution(&self, target: u32) -> ResolutionPair {
        let target = if target == 0 { self.default_resolution.max(1) } else { target };
        let span = self.viewport.width().saturating_add(1);
        ResolutionPair {
            min_resolution: span,
            max_resolution: (span - 1).div_euclid(target as GenomicPos),
        }
    }

    pub fn fetch_request(&self, target: u32) -> FetchRequest {
        FetchRequest::new(self.dataset_id(), &self.viewport, self.request_resolution(target))
    }
}

/// Everything the visualization needs: data settings and render settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MrhConfig {
    pub data: DataConfig,
    render: RenderConfig,
}

impl MrhConfig {
    pub fn new(data: DataConfig, render: RenderConfig) -> MrhResult<Self> {
        validate_render_config(&render)?;
        Ok(Self { data, render })
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    /// Replace render settings; rejected configs leave the current one in place.
    pub fn set_render(&mut self, render: RenderConfig) -> MrhResult<()> {
        validate_render_config(&render)?;
        self.render = render;
        Ok(())
    }

    pub fn viewport(&self) -> &Viewport {
        self.data.viewport()
    }

    pub fn canvas_size(&self) -> CanvasSize {
        self.render.canvas_size()
    }

    /// Ramp over the current header's score range.
    pub fn ramp(&self) -> MrhResult<LinearRamp> {
        let header = self.data.current_header()?;
        LinearRamp::from_css(&self.render.min_color, &self.render.max_color, header.minscore, header.maxscore)
    }
}

pub fn validate_render_config(render: &RenderConfig) -> MrhResult<()> {
    if render.canvas_width == 0 || render.canvas_height == 0 {
        return Err(MrhError::InvalidRenderConfig(format!(
            "canvas must be non-empty, got {}x{}",
            render.canvas_width, render.canvas_height
        )));
    }
    LinearRamp::from_css(&render.min_color, &render.max_color, 0.0, 1.0)?;
    Ok(())
}
