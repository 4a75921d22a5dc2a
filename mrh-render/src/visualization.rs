//! The single owner of viewer state.
//!
//! `Visualization` ties gestures, configuration, controls and the progressive
//! renderer together. Nothing else mutates the viewport. Fetching happens
//! outside: callers take the `RenderPass` returned by a state change, run its
//! requests however they like and feed results back through `apply_layer`.
//! [`run_pass`] drives one pass to completion. [`run_until`] and
//! [`run_until_idle`] also fire gesture deadlines between responses, so a
//! gesture can supersede a pass whose layers are still in flight.

use crate::fetch::{DataFetcher, FetchResult};
use crate::progressive::{Generation, LayerOutcome, ProgressiveRenderer, RenderPass};
use crate::surface::RenderSurface;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use mrh_core::controls::{self, ControlForm, FormState};
use mrh_core::query::{to_query, with_query, AddressBar};
use mrh_core::{Color, GestureCommand, GestureInterpreter, MrhConfig, PointerEvent, ViewerSettings};
use std::time::Instant;
use tokio::time::Instant as TokioInstant;

/// Notifications raised while layers are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Data { generation: Generation, layer: usize, cells: usize },
    Error { generation: Generation, layer: usize, message: String },
    Rendered { generation: Generation, url: Option<String> },
}

pub struct Visualization<S: RenderSurface> {
    config: MrhConfig,
    settings: ViewerSettings,
    gestures: GestureInterpreter,
    renderer: ProgressiveRenderer,
    surface: S,
    form: Box<dyn ControlForm>,
    address_bar: Option<Box<dyn AddressBar>>,
    signals: Vec<Signal>,
}

impl<S: RenderSurface> Visualization<S> {
    pub fn new(config: MrhConfig, settings: ViewerSettings, surface: S) -> Result<Self> {
        let background: Color = settings
            .background
            .parse()
            .with_context(|| format!("invalid background color {:?}", settings.background))?;
        let canvas = config.canvas_size();
        if surface.size() != canvas {
            anyhow::bail!(
                "surface is {}x{} but the render config asks for {}x{}",
                surface.size().width,
                surface.size().height,
                canvas.width,
                canvas.height
            );
        }
        let mut form: Box<dyn ControlForm> = Box::new(FormState::new());
        controls::update_controls(form.as_mut(), &config.data);
        Ok(Self {
            gestures: GestureInterpreter::new(settings.gesture_settings()),
            renderer: ProgressiveRenderer::new(settings.blur_factors.clone(), background),
            config,
            settings,
            surface,
            form,
            address_bar: None,
            signals: Vec::new(),
        })
    }

    pub fn with_form(mut self, form: Box<dyn ControlForm>) -> Self {
        self.form = form;
        controls::update_controls(self.form.as_mut(), &self.config.data);
        self
    }

    pub fn with_address_bar(mut self, bar: Box<dyn AddressBar>) -> Self {
        self.address_bar = Some(bar);
        self
    }

    pub fn config(&self) -> &MrhConfig {
        &self.config
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn form(&self) -> &dyn ControlForm {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> &mut dyn ControlForm {
        self.form.as_mut()
    }

    pub fn address_bar(&self) -> Option<&dyn AddressBar> {
        self.address_bar.as_deref()
    }

    pub fn generation(&self) -> Generation {
        self.renderer.generation()
    }

    /// Start a pass for the current viewport and refresh the form.
    pub fn render(&mut self) -> Result<RenderPass> {
        controls::update_controls(self.form.as_mut(), &self.config.data);
        let pass = self.renderer.begin(&self.config)?;
        Ok(pass)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        self.gestures.handle(event, now);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.gestures.next_deadline()
    }

    /// Apply due gesture commands. Returns a pass when the viewport moved.
    pub fn tick(&mut self, now: Instant) -> Result<Option<RenderPass>> {
        let commands = self.gestures.poll(now);
        self.apply_commands(commands)
    }

    /// Apply every pending gesture regardless of its deadline.
    pub fn flush_gestures(&mut self) -> Result<Option<RenderPass>> {
        let commands = self.gestures.flush();
        self.apply_commands(commands)
    }

    fn apply_commands(&mut self, commands: Vec<GestureCommand>) -> Result<Option<RenderPass>> {
        let canvas = self.config.canvas_size();
        let mut changed = false;
        for command in commands {
            log::debug!("gesture: {:?}", command);
            changed |= match command {
                GestureCommand::Pan(delta) => self.config.data.pan(delta, canvas)?,
                GestureCommand::Zoom { center, level } => {
                    self.config.data.zoom(center, level, self.settings.scale_factor, canvas)?
                }
            };
        }
        if changed {
            self.render().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read the form, clamp, and redraw even if nothing moved.
    pub fn submit_controls(&mut self) -> Result<RenderPass> {
        let candidate = controls::read_controls(self.form.as_ref()).context("reading controls")?;
        self.config.data.set_viewport(candidate)?;
        self.render()
    }

    pub fn set_chromosome(&mut self, chrom: &str) -> Result<RenderPass> {
        self.config.data.set_chromosome(chrom)?;
        self.render()
    }

    /// Feed one fetch result back in.
    pub fn apply_layer(&mut self, generation: Generation, layer: usize, result: FetchResult) -> LayerOutcome {
        let outcome = self.renderer.apply(&mut self.surface, generation, layer, result);
        match &outcome {
            LayerOutcome::Painted { stats, is_final } => {
                self.signals.push(Signal::Data {
                    generation,
                    layer,
                    cells: stats.painted,
                });
                if *is_final {
                    let url = self.publish_url();
                    log::info!("rendered generation {} at {:?}", generation, self.config.viewport());
                    self.signals.push(Signal::Rendered { generation, url });
                }
            }
            LayerOutcome::Failed { message } => self.signals.push(Signal::Error {
                generation,
                layer,
                message: message.clone(),
            }),
            LayerOutcome::Stale => {}
        }
        outcome
    }

    fn publish_url(&mut self) -> Option<String> {
        if self.settings.embedded {
            return None;
        }
        let bar = self.address_bar.as_mut()?;
        let url = with_query(&bar.current_url(), &to_query(&self.config.data));
        bar.push_state(url.clone());
        Some(url)
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}

/// Counts from driven layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub painted: usize,
    pub failed: usize,
    pub stale: usize,
}

impl PassSummary {
    fn record(&mut self, outcome: &LayerOutcome) {
        match outcome {
            LayerOutcome::Painted { .. } => self.painted += 1,
            LayerOutcome::Failed { .. } => self.failed += 1,
            LayerOutcome::Stale => self.stale += 1,
        }
    }
}

impl std::ops::AddAssign for PassSummary {
    fn add_assign(&mut self, rhs: PassSummary) {
        self.painted += rhs.painted;
        self.failed += rhs.failed;
        self.stale += rhs.stale;
    }
}

/// A fetch result tagged with the layer it answers.
pub type LayerResponse = (Generation, usize, FetchResult);

/// Layer fetches that have been issued but not yet applied.
///
/// Kept apart from the [`Visualization`] so input can be handled, and new
/// passes started, while earlier layers are still outstanding.
#[derive(Default)]
pub struct InFlight {
    pending: FuturesUnordered<BoxFuture<'static, LayerResponse>>,
    passes: usize,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue every layer of `pass` at once.
    pub fn submit<F: DataFetcher + ?Sized>(&mut self, fetcher: &F, pass: RenderPass) {
        for req in pass.requests {
            let fut = fetcher.fetch(req.request);
            let (generation, layer) = (req.generation, req.layer);
            self.pending.push(Box::pin(async move { (generation, layer, fut.await) }));
        }
        self.passes += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Passes submitted so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Next response in completion order, `None` once nothing is outstanding.
    pub async fn next(&mut self) -> Option<LayerResponse> {
        self.pending.next().await
    }
}

/// Issue every layer of `pass` at once and apply responses as they complete.
pub async fn run_pass<S, F>(vis: &mut Visualization<S>, fetcher: &F, pass: RenderPass) -> PassSummary
where
    S: RenderSurface,
    F: DataFetcher + ?Sized,
{
    let mut in_flight = InFlight::new();
    in_flight.submit(fetcher, pass);
    let mut summary = PassSummary::default();
    while let Some((generation, layer, result)) = in_flight.next().await {
        summary.record(&vis.apply_layer(generation, layer, result));
    }
    summary
}

/// Apply responses and fire gesture deadlines as they come due, up to `until`.
///
/// A gesture that moves the viewport starts a new pass right away; layers of
/// the pass it replaces keep arriving and are dropped as stale.
pub async fn run_until<S, F>(
    vis: &mut Visualization<S>,
    fetcher: &F,
    in_flight: &mut InFlight,
    until: TokioInstant,
) -> Result<PassSummary>
where
    S: RenderSurface,
    F: DataFetcher + ?Sized,
{
    let mut summary = PassSummary::default();
    loop {
        let deadline = vis
            .next_deadline()
            .map(TokioInstant::from_std)
            .filter(|d| *d <= until);
        let wake = deadline.unwrap_or(until);

        tokio::select! {
            biased;
            Some((generation, layer, result)) = in_flight.next(), if !in_flight.is_empty() => {
                summary.record(&vis.apply_layer(generation, layer, result));
            }
            _ = tokio::time::sleep_until(wake) => match deadline {
                Some(due) => {
                    if let Some(pass) = vis.tick(due.into_std())? {
                        in_flight.submit(fetcher, pass);
                    }
                }
                None => return Ok(summary),
            },
        }
    }
}

/// Keep driving until no layer is outstanding and no gesture is pending.
pub async fn run_until_idle<S, F>(vis: &mut Visualization<S>, fetcher: &F, in_flight: &mut InFlight) -> Result<PassSummary>
where
    S: RenderSurface,
    F: DataFetcher + ?Sized,
{
    let mut summary = PassSummary::default();
    loop {
        match vis.next_deadline() {
            Some(due) => summary += run_until(vis, fetcher, in_flight, TokioInstant::from_std(due)).await?,
            None => match in_flight.next().await {
                Some((generation, layer, result)) => summary.record(&vis.apply_layer(generation, layer, result)),
                None => return Ok(summary),
            },
        }
    }
}
