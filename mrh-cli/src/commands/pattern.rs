//! Pattern command implementation - draw the four-quadrant test pattern
//!
//! Useful for checking a color ramp and canvas geometry without real data.

use anyhow::Result;
use mrh_render::{test_pattern, PixelSurface, StaticProvider, SvgSurface};
use std::path::PathBuf;

use super::render::write_output;
use super::{build_visualization, detect_output_format, drive_pass, initial_data_config, runtime, OutputFormat, SurfaceOutput, ViewSelection};
use crate::config::{Config, RenderOverrides};
use crate::dataset::Dataset;
use crate::error::CliError;

pub struct PatternArgs {
    /// Headers come from here; the synthetic dataset is used otherwise
    pub dataset: Option<PathBuf>,
    pub output: PathBuf,
    pub selection: ViewSelection,
    pub overrides: RenderOverrides,
}

pub fn execute(config: &Config, args: PatternArgs) -> Result<()> {
    match detect_output_format(&args.output) {
        OutputFormat::Png => pattern_with::<PixelSurface>(config, &args),
        OutputFormat::Svg => pattern_with::<SvgSurface>(config, &args),
    }
}

fn pattern_with<S: SurfaceOutput>(config: &Config, args: &PatternArgs) -> Result<()> {
    let dataset = match &args.dataset {
        Some(path) => Dataset::load(path)?,
        None => Dataset::synthetic(),
    };
    let data = initial_data_config(dataset.source()?, &config.viewer, &args.selection)?;
    let cells = test_pattern(data.viewport());
    log::info!("Test pattern over {:?}", data.viewport());
    let provider = StaticProvider::new(dataset.dataset_id.clone(), cells);

    let render = config.render_config(&args.overrides);
    let mut vis = build_visualization::<S>(data, render, &config.viewer, "")?;
    let rt = runtime()?;
    let pass = vis.render()?;
    let summary = drive_pass(&rt, &mut vis, &provider, pass);
    if summary.painted == 0 {
        return Err(CliError::rendering("Test pattern could not be rendered").into());
    }
    write_output(vis, &args.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_pattern_png_quadrants() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("pattern.png");
        let args = PatternArgs {
            dataset: None,
            output: output.clone(),
            selection: ViewSelection::default(),
            overrides: RenderOverrides {
                width: Some(40),
                height: Some(40),
                ..RenderOverrides::default()
            },
        };
        execute(&Config::default(), args).unwrap();

        let img = image::open(&output).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (40, 40));
        // -8 maps to the min color, 8 to the max color
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(35, 35).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_pattern_svg() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("pattern.svg");
        let args = PatternArgs {
            dataset: None,
            output: output.clone(),
            selection: ViewSelection {
                link: None,
                view: Some("chr1:0-1000".into()),
            },
            overrides: RenderOverrides::default(),
        };
        execute(&Config::default(), args).unwrap();
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
        assert!(svg.contains("<rect"));
    }
}
