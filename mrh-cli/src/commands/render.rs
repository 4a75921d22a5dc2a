//! Render command implementation - draw one view of a dataset to PNG or SVG

use anyhow::Result;
use mrh_core::MrhConfig;
use mrh_render::{PixelSurface, SvgSurface, Visualization};
use std::path::{Path, PathBuf};

use super::{build_visualization, detect_output_format, drive_pass, initial_data_config, runtime, OutputFormat, SurfaceOutput, ViewSelection};
use crate::config::{Config, RenderOverrides};
use crate::dataset::Dataset;
use crate::error::CliError;

pub struct RenderArgs {
    pub dataset: PathBuf,
    pub output: PathBuf,
    pub selection: ViewSelection,
    pub overrides: RenderOverrides,
    pub base_url: String,
}

/// Returns the shareable link for the rendered view, if one was published.
pub fn execute(config: &Config, args: RenderArgs) -> Result<Option<String>> {
    log::info!("Rendering {} to {}", args.dataset.display(), args.output.display());
    match detect_output_format(&args.output) {
        OutputFormat::Png => render_with::<PixelSurface>(config, &args),
        OutputFormat::Svg => render_with::<SvgSurface>(config, &args),
    }
}

fn render_with<S: SurfaceOutput>(config: &Config, args: &RenderArgs) -> Result<Option<String>> {
    let dataset = Dataset::load(&args.dataset)?;
    let data = initial_data_config(dataset.source()?, &config.viewer, &args.selection)?;
    let render = config.render_config(&args.overrides);
    let mut vis = build_visualization::<S>(data, render, &config.viewer, &args.base_url)?;

    let rt = runtime()?;
    let provider = dataset.provider();
    let pass = vis.render()?;
    let summary = drive_pass(&rt, &mut vis, &provider, pass);
    if summary.painted == 0 {
        return Err(CliError::rendering(format!("No layer could be rendered ({} failed)", summary.failed)).into());
    }

    log::info!("View: {:?}", vis.config().viewport());
    let link = if config.viewer.embedded {
        None
    } else {
        vis.address_bar().map(|bar| bar.current_url())
    };
    write_output(vis, &args.output)?;
    Ok(link)
}

/// One-line description of the dataset and region on screen.
pub fn describe_view(config: &MrhConfig) -> String {
    let vp = config.viewport();
    format!(
        "dataset {}: {}:{}-{} vs {}:{}-{}",
        config.data.dataset_id(),
        vp.chrom1,
        vp.start1,
        vp.stop1,
        vp.chrom2,
        vp.start2,
        vp.stop2
    )
}

/// Write the final image, tagged with the view it shows.
pub fn write_output<S: SurfaceOutput>(vis: Visualization<S>, path: &Path) -> Result<()> {
    let note = describe_view(vis.config());
    let mut surface = vis.into_surface();
    surface.annotate(&note);
    surface.write(path)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use mrh_core::{DataPoint, Header};
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn dataset_file(data: Vec<DataPoint>) -> NamedTempFile {
        let dataset = Dataset {
            dataset_id: "hic".into(),
            headers: vec![Header::new("chr1", 0, 1000, 0.0, 10.0)],
            data,
        };
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{}", serde_json::to_string(&dataset).unwrap()).unwrap();
        f
    }

    fn args(dataset: &Path, output: PathBuf) -> RenderArgs {
        RenderArgs {
            dataset: dataset.to_path_buf(),
            output,
            selection: ViewSelection {
                link: None,
                view: Some("chr1:0-1000".into()),
            },
            overrides: RenderOverrides {
                width: Some(10),
                height: Some(10),
                ..RenderOverrides::default()
            },
            base_url: "http://host/mrh".into(),
        }
    }

    #[test]
    fn test_render_png_and_link() {
        let f = dataset_file(vec![DataPoint::new(0, 0, 500, 500, 10.0)]);
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("view.png");

        let link = execute(&Config::default(), args(f.path(), output.clone())).unwrap();
        assert_eq!(
            link.as_deref(),
            Some("http://host/mrh?dataset_id=hic&chrom1=chr1&start1=0&stop1=1000&chrom2=chr1&start2=0&stop2=1000")
        );

        let img = image::open(&output).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 255]);
        // Outside any cell the background shows through
        assert_eq!(img.get_pixel(8, 8).0, [0x88, 0x88, 0x88, 255]);
    }

    #[test]
    fn test_embedded_has_no_link() {
        let f = dataset_file(Vec::new());
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.viewer.embedded = true;
        let link = execute(&config, args(f.path(), dir.path().join("view.svg"))).unwrap();
        assert!(link.is_none());
        assert!(dir.path().join("view.svg").exists());
    }

    #[test]
    fn test_svg_names_dataset_and_view() {
        let f = dataset_file(Vec::new());
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("view.svg");
        execute(&Config::default(), args(f.path(), output.clone())).unwrap();
        let svg = std::fs::read_to_string(&output).unwrap();
        let comment = "<!-- dataset hic: chr1:0-1000 vs chr1:0-1000 -->";
        assert!(svg.contains(comment), "{}", svg);
        // the note sits above the drawing
        assert!(svg.find(comment).unwrap() < svg.find("<rect").unwrap());
    }
}
