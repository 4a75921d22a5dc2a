//! Command implementations for the MRH CLI

pub mod chroms;
pub mod pattern;
pub mod render;
pub mod replay;

use anyhow::{anyhow, Context, Result};
use mrh_core::query::{parse_query, MemoryHistory};
use mrh_core::{CanvasSize, DataConfig, MrhConfig, RenderConfig, Source, ViewerSettings, Viewport};
use mrh_render::{run_pass, DataFetcher, PassSummary, PixelSurface, RenderPass, RenderSurface, Signal, SvgSurface, Visualization};
use std::path::Path;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

pub fn detect_output_format(path: &Path) -> OutputFormat {
    match path.extension().map(|e| e.to_string_lossy().to_lowercase()) {
        Some(ext) if ext == "png" => OutputFormat::Png,
        Some(ext) if ext == "svg" => OutputFormat::Svg,
        Some(_) => {
            log::warn!("Unknown output format, defaulting to PNG");
            OutputFormat::Png
        }
        None => {
            log::warn!("No file extension found, defaulting to PNG");
            OutputFormat::Png
        }
    }
}

/// A surface the CLI knows how to create and write out.
pub trait SurfaceOutput: RenderSurface + Sized {
    fn create(size: CanvasSize) -> Self;
    fn write(&self, path: &Path) -> Result<()>;

    /// Attach a human-readable note, if the format has room for one.
    fn annotate(&mut self, _note: &str) {}
}

impl SurfaceOutput for PixelSurface {
    fn create(size: CanvasSize) -> Self {
        PixelSurface::new(size)
    }

    fn write(&self, path: &Path) -> Result<()> {
        self.save_png(path)
    }
}

impl SurfaceOutput for SvgSurface {
    fn create(size: CanvasSize) -> Self {
        SvgSurface::new(size)
    }

    fn write(&self, path: &Path) -> Result<()> {
        self.write_to_file(path)
    }

    fn annotate(&mut self, note: &str) {
        self.add_comment(note);
    }
}

/// Where the first view comes from, in priority order.
#[derive(Debug, Clone, Default)]
pub struct ViewSelection {
    /// A shared link or bare query string
    pub link: Option<String>,
    /// Region like `chr1:0-100K` or `chr1:0-1M vs chr2:0-1M`
    pub view: Option<String>,
}

pub fn initial_data_config(source: Source, settings: &ViewerSettings, selection: &ViewSelection) -> Result<DataConfig> {
    let policy = settings.header_policy;
    let config = if let Some(link) = &selection.link {
        let query = link.split_once('?').map_or(link.as_str(), |(_, q)| q);
        let (dataset_id, viewport) = parse_query(query).map_err(CliError::from)?;
        if dataset_id != source.dataset_id {
            log::warn!("Link targets dataset {}, rendering {}", dataset_id, source.dataset_id);
        }
        DataConfig::new(source, viewport, policy).map_err(CliError::from)?
    } else if let Some(view) = &selection.view {
        DataConfig::new(source, parse_view(view)?, policy).map_err(CliError::from)?
    } else {
        DataConfig::with_default_view(source, policy).map_err(CliError::from)?
    };
    Ok(config.with_default_resolution(settings.default_resolution))
}

pub fn build_visualization<S: SurfaceOutput>(
    data: DataConfig,
    render: RenderConfig,
    settings: &ViewerSettings,
    base_url: &str,
) -> Result<Visualization<S>> {
    let config = MrhConfig::new(data, render).map_err(|e| CliError::config(e.to_string()))?;
    let surface = S::create(config.canvas_size());
    let vis = Visualization::new(config, settings.clone(), surface)?
        .with_address_bar(Box::new(MemoryHistory::new(base_url)));
    Ok(vis)
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")
}

/// Run one pass to completion and report what happened.
pub fn drive_pass<S, F>(
    rt: &tokio::runtime::Runtime,
    vis: &mut Visualization<S>,
    fetcher: &F,
    pass: RenderPass,
) -> PassSummary
where
    S: RenderSurface,
    F: DataFetcher + ?Sized,
{
    let generation = pass.generation;
    let summary = rt.block_on(run_pass(vis, fetcher, pass));
    log_signals(vis);
    log::debug!(
        "generation {}: {} painted, {} failed, {} stale",
        generation,
        summary.painted,
        summary.failed,
        summary.stale
    );
    summary
}

/// Report and discard the signals raised so far.
pub fn log_signals<S: RenderSurface>(vis: &mut Visualization<S>) {
    for signal in vis.drain_signals() {
        match signal {
            Signal::Data { generation, layer, cells } => {
                log::debug!("generation {} layer {}: {} cells", generation, layer, cells)
            }
            Signal::Error { layer, message, .. } => log::error!("layer {} failed: {}", layer, message),
            Signal::Rendered { url: Some(url), .. } => log::info!("Link: {}", url),
            Signal::Rendered { url: None, .. } => {}
        }
    }
}

/// Parse `chr1:0-100K`, or two regions joined by `vs`.
/// A single region is shown against itself.
pub fn parse_view(view: &str) -> Result<Viewport> {
    let parts: Vec<&str> = view.split(" vs ").map(str::trim).collect();
    match parts.as_slice() {
        [single] => {
            let (chrom, start, stop) = parse_single_region(single)?;
            Ok(Viewport::new(chrom.clone(), start, stop, chrom, start, stop))
        }
        [first, second] => {
            let (chrom1, start1, stop1) = parse_single_region(first)?;
            let (chrom2, start2, stop2) = parse_single_region(second)?;
            Ok(Viewport::new(chrom1, start1, stop1, chrom2, start2, stop2))
        }
        _ => Err(CliError::view(format!("Invalid view: {}", view)).into()),
    }
}

fn parse_single_region(region: &str) -> Result<(String, i64, i64)> {
    let (contig, range) = region
        .split_once(':')
        .ok_or_else(|| CliError::view(format!("Invalid region format: {}. Expected 'contig:start-end'", region)))?;
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| CliError::view(format!("Invalid region range: {}. Expected 'start-end'", range)))?;

    let start = parse_position(start)?;
    let end = parse_position(end)?;
    if start >= end {
        return Err(CliError::view(format!("Region start ({}) must be less than end ({})", start, end)).into());
    }
    Ok((contig.to_string(), start, end))
}

fn parse_position(pos: &str) -> Result<i64> {
    let pos = pos.trim().to_uppercase();
    let (digits, scale) = if let Some(n) = pos.strip_suffix('K') {
        (n, 1_000.0)
    } else if let Some(n) = pos.strip_suffix('M') {
        (n, 1_000_000.0)
    } else if let Some(n) = pos.strip_suffix('G') {
        (n, 1_000_000_000.0)
    } else {
        return pos.replace(',', "").parse::<i64>().map_err(|_| anyhow!("Invalid number format: {}", pos));
    };
    let num: f64 = digits.parse().with_context(|| format!("Invalid number format: {}", pos))?;
    Ok((num * scale).round() as i64)
}
