//! Replay command implementation - feed a recorded interaction through the viewer
//!
//! Scripts are JSON arrays of timed steps played on the wall clock. Layers of
//! a pass keep arriving while later steps are applied, so with a provider
//! latency (`--latency-ms`) a gesture can land mid-pass and supersede it.
//!
//! ```json
//! [
//!   {"at_ms": 0,   "pointer": {"type": "down", "x": 160, "y": 160}},
//!   {"at_ms": 40,  "pointer": {"type": "move", "x": 120, "y": 160}},
//!   {"at_ms": 60,  "pointer": {"type": "up", "x": 120, "y": 160}},
//!   {"at_ms": 900, "pointer": {"type": "wheel", "x": 160, "y": 160, "delta_y": -1}},
//!   {"at_ms": 2000, "chromosome": "chr2"},
//!   {"at_ms": 3000, "form": {"start1": "0", "stop1": "5000"}}
//! ]
//! ```

use anyhow::{Context, Result};
use mrh_core::controls::on_chrom1_changed;
use mrh_core::{PointerEvent, Viewport};
use mrh_render::{
    run_until, run_until_idle, DataFetcher, Delayed, InFlight, PassSummary, PixelSurface, RenderSurface, SvgSurface,
    Visualization,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::Instant as TokioInstant;

use super::render::write_output;
use super::{
    build_visualization, detect_output_format, initial_data_config, log_signals, runtime, OutputFormat, SurfaceOutput,
    ViewSelection,
};
use crate::config::{Config, RenderOverrides};
use crate::dataset::Dataset;
use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    Pointer(PointerEvent),
    /// Pick a chromosome from the select
    Chromosome(String),
    /// Fill in form fields and press Draw
    Form(BTreeMap<String, String>),
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    let content = std::fs::read_to_string(path)?;
    let mut steps: Vec<ScriptStep> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse script: {}", path.display()))?;
    steps.sort_by_key(|s| s.at_ms);
    Ok(steps)
}

pub struct ReplayArgs {
    pub dataset: PathBuf,
    pub script: PathBuf,
    pub output: PathBuf,
    pub selection: ViewSelection,
    pub overrides: RenderOverrides,
    pub base_url: String,
    /// Simulated provider latency per layer
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    pub passes: usize,
    pub summary: PassSummary,
    pub viewport: Viewport,
    pub link: Option<String>,
}

/// Totals from one [`play`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Playback {
    pub passes: usize,
    pub summary: PassSummary,
}

pub fn execute(config: &Config, args: ReplayArgs) -> Result<ReplayReport> {
    match detect_output_format(&args.output) {
        OutputFormat::Png => replay_with::<PixelSurface>(config, &args),
        OutputFormat::Svg => replay_with::<SvgSurface>(config, &args),
    }
}

fn replay_with<S: SurfaceOutput>(config: &Config, args: &ReplayArgs) -> Result<ReplayReport> {
    let dataset = Dataset::load(&args.dataset)?;
    let steps = load_script(&args.script)?;
    log::info!("Replaying {} steps from {}", steps.len(), args.script.display());

    let data = initial_data_config(dataset.source()?, &config.viewer, &args.selection)?;
    let render = config.render_config(&args.overrides);
    let mut vis = build_visualization::<S>(data, render, &config.viewer, &args.base_url)?;
    let fetcher = Delayed::new(dataset.provider(), Duration::from_millis(args.latency_ms));

    let rt = runtime()?;
    let playback = rt.block_on(play(&mut vis, &fetcher, steps))?;
    log::info!(
        "{} passes: {} layers painted, {} failed, {} superseded",
        playback.passes,
        playback.summary.painted,
        playback.summary.failed,
        playback.summary.stale
    );

    let link = if config.viewer.embedded {
        None
    } else {
        vis.address_bar().map(|bar| bar.current_url())
    };
    let viewport = vis.config().viewport().clone();
    write_output(vis, &args.output)?;
    Ok(ReplayReport {
        passes: playback.passes,
        summary: playback.summary,
        viewport,
        link,
    })
}

/// Run `steps` on the runtime clock, starting with a render of the current view.
///
/// Responses and gesture deadlines are handled between steps, so a step that
/// moves the view while layers are outstanding supersedes their pass.
pub async fn play<S, F>(vis: &mut Visualization<S>, fetcher: &F, steps: Vec<ScriptStep>) -> Result<Playback>
where
    S: RenderSurface,
    F: DataFetcher + ?Sized,
{
    let mut in_flight = InFlight::new();
    in_flight.submit(fetcher, vis.render()?);
    let start = TokioInstant::now();
    let mut summary = PassSummary::default();

    for step in steps {
        let at = start + Duration::from_millis(step.at_ms);
        summary += run_until(vis, fetcher, &mut in_flight, at).await?;
        log_signals(vis);
        match step.action {
            ScriptAction::Pointer(event) => vis.handle_pointer(event, at.into_std()),
            ScriptAction::Chromosome(chrom) => {
                vis.form_mut().set_field("chrom1", &chrom);
                on_chrom1_changed(vis.form_mut());
                let pass = vis.set_chromosome(&chrom)?;
                in_flight.submit(fetcher, pass);
            }
            ScriptAction::Form(fields) => {
                for (name, value) in &fields {
                    vis.form_mut().set_field(name, value);
                }
                if fields.contains_key("chrom1") {
                    on_chrom1_changed(vis.form_mut());
                }
                let pass = vis.submit_controls()?;
                in_flight.submit(fetcher, pass);
            }
        }
    }

    summary += run_until_idle(vis, fetcher, &mut in_flight).await?;
    log_signals(vis);
    Ok(Playback {
        passes: in_flight.passes(),
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrh_core::{DataConfig, DataPoint, Header, HeaderPolicy, RenderConfig, Source, ViewerSettings};
    use mrh_render::StaticProvider;

    fn viewer() -> Visualization<PixelSurface> {
        let source = Source::new("contacts", vec![Header::new("chr1", 0, 5000, -8.0, 8.0)]).unwrap();
        let data = DataConfig::new(source, Viewport::square("chr1", 0, 1000), HeaderPolicy::Chrom1).unwrap();
        build_visualization(data, RenderConfig::default(), &ViewerSettings::default(), "http://localhost/mrh").unwrap()
    }

    fn slow_provider(ms: u64) -> Delayed<StaticProvider> {
        Delayed::new(
            StaticProvider::new("contacts", vec![DataPoint::new(0, 0, 5000, 5000, 8.0)]),
            Duration::from_millis(ms),
        )
    }

    fn pointer(at_ms: u64, event: PointerEvent) -> ScriptStep {
        ScriptStep {
            at_ms,
            action: ScriptAction::Pointer(event),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pan_during_slow_pass_supersedes_it() {
        let mut vis = viewer();
        // layers answer at 1000 ms; the drag ends at 60 ms and settles well before that
        let steps = vec![
            pointer(0, PointerEvent::Down { x: 100.0, y: 100.0 }),
            pointer(40, PointerEvent::Move { x: 68.0, y: 100.0 }),
            pointer(60, PointerEvent::Up { x: 68.0, y: 100.0 }),
        ];
        let playback = play(&mut vis, &slow_provider(1000), steps).await.unwrap();

        assert_eq!(playback.passes, 2);
        assert!(playback.summary.stale > 0);
        assert_eq!(playback.summary.painted, 4);
        assert_eq!(vis.config().viewport(), &Viewport::new("chr1", 100, 1100, "chr1", 0, 1000));
        assert_eq!(vis.surface().pixel(0, 0), [255, 255, 255, 255]);
        let link = vis.address_bar().unwrap().current_url();
        assert!(link.contains("start1=100"), "{}", link);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_after_the_pass_do_not_supersede_it() {
        let mut vis = viewer();
        let mut fields = BTreeMap::new();
        fields.insert("start1".to_string(), "2000".to_string());
        fields.insert("stop1".to_string(), "3000".to_string());
        let steps = vec![ScriptStep {
            at_ms: 500,
            action: ScriptAction::Form(fields),
        }];
        let playback = play(&mut vis, &slow_provider(100), steps).await.unwrap();

        assert_eq!(playback.passes, 2);
        assert_eq!(playback.summary.stale, 0);
        assert_eq!(playback.summary.painted, 8);
        assert_eq!(vis.config().viewport(), &Viewport::new("chr1", 2000, 3000, "chr1", 0, 1000));
    }

    #[test]
    fn test_script_step_format() {
        let json = r#"[
            {"at_ms": 50, "pointer": {"type": "wheel", "x": 1, "y": 2, "delta_y": -3}},
            {"at_ms": 10, "chromosome": "chr2"},
            {"at_ms": 20, "form": {"start1": "5"}}
        ]"#;
        let steps: Vec<ScriptStep> = serde_json::from_str(json).unwrap();
        assert_eq!(steps[0].action, ScriptAction::Pointer(PointerEvent::Wheel { x: 1.0, y: 2.0, delta_y: -3.0 }));
        assert_eq!(steps[1].action, ScriptAction::Chromosome("chr2".into()));
        assert!(matches!(&steps[2].action, ScriptAction::Form(f) if f["start1"] == "5"));
    }

    #[test]
    fn test_load_script_sorts_by_time() {
        let f = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            f.path(),
            r#"[{"at_ms": 90, "chromosome": "b"}, {"at_ms": 5, "chromosome": "a"}]"#,
        )
        .unwrap();
        let steps = load_script(f.path()).unwrap();
        assert_eq!(steps[0].at_ms, 5);
    }
}
