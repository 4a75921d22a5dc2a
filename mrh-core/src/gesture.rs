//! Pointer gesture interpretation.
//!
//! Dragging pans, the wheel and double-click zoom. Both outputs are debounced so a
//! burst of input settles into a single downstream viewport change (and thus a
//! single progressive fetch). Time is passed in explicitly so the state machine
//! can be driven from any event loop, or from a test.

use crate::types::{PixelDelta, PixelPoint};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_DBLCLICK_ZOOM: f64 = 500.0;

/// How pan deltas arriving inside one debounce window are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanCoalesce {
    /// Sum every delta so no motion is lost.
    #[default]
    Accumulate,
    /// Keep only the trailing delta.
    LastWins,
}

/// Raw input in canvas-relative pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up { x: f64, y: f64 },
    Wheel { x: f64, y: f64, delta_y: f64 },
    /// `alt` reverses the zoom direction.
    DoubleClick {
        x: f64,
        y: f64,
        #[serde(default)]
        alt: bool,
    },
}

/// Settled gesture output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCommand {
    Pan(PixelDelta),
    /// `level` is in accumulated wheel units; positive zooms in.
    Zoom { center: PixelPoint, level: f64 },
}

/// Trailing-edge debounce holding one coalesced value.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    /// Replace any pending value and restart the timer.
    pub fn push(&mut self, now: Instant, value: T) {
        self.pending = Some(value);
        self.deadline = Some(now + self.delay);
    }

    /// Merge into the pending value (`merge(pending, value)`) and restart the timer.
    pub fn push_with(&mut self, now: Instant, value: T, merge: impl FnOnce(T, T) -> T) {
        let next = match self.pending.take() {
            Some(pending) => merge(pending, value),
            None => value,
        };
        self.push(now, next);
    }

    /// Fire if the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => None,
        }
    }

    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct GestureSettings {
    pub debounce: Duration,
    pub dblclick_zoom: f64,
    pub pan_coalesce: PanCoalesce,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            dblclick_zoom: DEFAULT_DBLCLICK_ZOOM,
            pan_coalesce: PanCoalesce::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { last: PixelPoint },
}

#[derive(Debug, Clone, Copy)]
struct ZoomAccumulator {
    center: PixelPoint,
    level: f64,
}

pub struct GestureInterpreter {
    settings: GestureSettings,
    state: DragState,
    pan: Debouncer<PixelDelta>,
    zoom: Debouncer<ZoomAccumulator>,
}

impl GestureInterpreter {
    pub fn new(settings: GestureSettings) -> Self {
        let pan = Debouncer::new(settings.debounce);
        let zoom = Debouncer::new(settings.debounce);
        Self {
            settings,
            state: DragState::Idle,
            pan,
            zoom,
        }
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn handle(&mut self, event: PointerEvent, now: Instant) {
        match event {
            PointerEvent::Down { x, y } => {
                self.state = DragState::Dragging { last: PixelPoint::new(x, y) };
            }
            PointerEvent::Move { x, y } => {
                if let DragState::Dragging { last } = self.state {
                    let delta = PixelDelta::new(x - last.x, y - last.y);
                    self.state = DragState::Dragging { last: PixelPoint::new(x, y) };
                    if !delta.is_zero() {
                        log::debug!("pan delta: {:?}", delta);
                        self.push_pan(now, delta);
                    }
                }
            }
            PointerEvent::Up { .. } => {
                self.state = DragState::Idle;
            }
            PointerEvent::Wheel { x, y, delta_y } => {
                if delta_y != 0.0 {
                    self.push_zoom(now, PixelPoint::new(x, y), -delta_y);
                }
            }
            PointerEvent::DoubleClick { x, y, alt } => {
                let step = if alt { -self.settings.dblclick_zoom } else { self.settings.dblclick_zoom };
                self.push_zoom(now, PixelPoint::new(x, y), step);
            }
        }
    }

    fn push_pan(&mut self, now: Instant, delta: PixelDelta) {
        match self.settings.pan_coalesce {
            PanCoalesce::Accumulate => self.pan.push_with(now, delta, |acc, d| acc + d),
            PanCoalesce::LastWins => self.pan.push(now, delta),
        }
    }

    fn push_zoom(&mut self, now: Instant, center: PixelPoint, level: f64) {
        let step = ZoomAccumulator { center, level };
        self.zoom.push_with(now, step, |acc, next| ZoomAccumulator {
            center: next.center,
            level: acc.level + next.level,
        });
        log::debug!("zoom accumulator: {:?}", self.zoom.pending.map(|z| z.level));
    }

    /// Earliest instant at which [`poll`](Self::poll) may produce output.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pan.deadline(), self.zoom.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Commands whose debounce window has closed, in firing order.
    pub fn poll(&mut self, now: Instant) -> Vec<GestureCommand> {
        let mut fired = Vec::new();
        if let Some(deadline) = self.pan.deadline() {
            if let Some(delta) = self.pan.poll(now) {
                fired.push((deadline, Self::pan_command(delta)));
            }
        }
        if let Some(deadline) = self.zoom.deadline() {
            if let Some(zoom) = self.zoom.poll(now) {
                fired.push((deadline, Self::zoom_command(zoom)));
            }
        }
        fired.sort_by_key(|(deadline, _)| *deadline);
        fired.into_iter().filter_map(|(_, cmd)| cmd).collect()
    }

    /// Fire everything pending regardless of deadlines.
    pub fn flush(&mut self) -> Vec<GestureCommand> {
        let pan = self.pan.flush().and_then(Self::pan_command);
        let zoom = self.zoom.flush().and_then(Self::zoom_command);
        pan.into_iter().chain(zoom).collect()
    }

    fn pan_command(delta: PixelDelta) -> Option<GestureCommand> {
        (!delta.is_zero()).then_some(GestureCommand::Pan(delta))
    }

    fn zoom_command(zoom: ZoomAccumulator) -> Option<GestureCommand> {
        (zoom.level != 0.0).then_some(GestureCommand::Zoom {
            center: zoom.center,
            level: zoom.level,
        })
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_debouncer_trailing_edge() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(300));
        d.push(t0, 1);
        d.push(t0 + ms(100), 2);
        assert_eq!(d.poll(t0 + ms(300)), None);
        assert_eq!(d.poll(t0 + ms(400)), Some(2));
        assert_eq!(d.poll(t0 + ms(800)), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn test_rapid_moves_coalesce_into_one_cumulative_pan() {
        let t0 = Instant::now();
        let mut g = GestureInterpreter::default();
        g.handle(PointerEvent::Down { x: 100.0, y: 100.0 }, t0);
        for i in 1..=5u64 {
            g.handle(
                PointerEvent::Move { x: 100.0 + 10.0 * i as f64, y: 100.0 - 2.0 * i as f64 },
                t0 + ms(i * 40),
            );
        }
        g.handle(PointerEvent::Up { x: 150.0, y: 90.0 }, t0 + ms(210));

        assert!(g.poll(t0 + ms(250)).is_empty());
        let cmds = g.poll(t0 + ms(600));
        assert_eq!(cmds, vec![GestureCommand::Pan(PixelDelta::new(50.0, -10.0))]);
        assert!(g.poll(t0 + ms(2000)).is_empty());
    }

    #[test]
    fn test_last_wins_drops_intermediate_deltas() {
        let t0 = Instant::now();
        let mut g = GestureInterpreter::new(GestureSettings {
            pan_coalesce: PanCoalesce::LastWins,
            ..Default::default()
        });
        g.handle(PointerEvent::Down { x: 0.0, y: 0.0 }, t0);
        g.handle(PointerEvent::Move { x: 10.0, y: 0.0 }, t0 + ms(10));
        g.handle(PointerEvent::Move { x: 15.0, y: 0.0 }, t0 + ms(20));
        let cmds = g.flush();
        assert_eq!(cmds, vec![GestureCommand::Pan(PixelDelta::new(5.0, 0.0))]);
    }

    #[test]
    fn test_moves_without_button_are_ignored() {
        let t0 = Instant::now();
        let mut g = GestureInterpreter::default();
        g.handle(PointerEvent::Move { x: 10.0, y: 10.0 }, t0);
        assert!(!g.is_dragging());
        assert!(g.next_deadline().is_none());
        assert!(g.flush().is_empty());
    }

    #[test]
    fn test_wheel_accumulates_until_flush() {
        let t0 = Instant::now();
        let mut g = GestureInterpreter::default();
        g.handle(PointerEvent::Wheel { x: 10.0, y: 10.0, delta_y: -3.0 }, t0);
        g.handle(PointerEvent::Wheel { x: 20.0, y: 30.0, delta_y: -2.0 }, t0 + ms(100));
        assert_eq!(g.next_deadline(), Some(t0 + ms(400)));
        let cmds = g.poll(t0 + ms(400));
        assert_eq!(
            cmds,
            vec![GestureCommand::Zoom { center: PixelPoint::new(20.0, 30.0), level: 5.0 }]
        );

        // accumulator resets after firing
        g.handle(PointerEvent::Wheel { x: 0.0, y: 0.0, delta_y: 1.0 }, t0 + ms(500));
        let cmds = g.poll(t0 + ms(800));
        assert_eq!(cmds, vec![GestureCommand::Zoom { center: PixelPoint::new(0.0, 0.0), level: -1.0 }]);
    }

    #[test]
    fn test_wheel_without_vertical_delta_is_ignored() {
        let t0 = Instant::now();
        let mut g = GestureInterpreter::default();
        g.handle(PointerEvent::Wheel { x: 0.0, y: 0.0, delta_y: 0.0 }, t0);
        assert!(g.next_deadline().is_none());
    }

    #[test]
    fn test_double_click_zoom_and_reverse() {
        let t0 = Instant::now();
        let mut g = GestureInterpreter::default();
        g.handle(PointerEvent::DoubleClick { x: 5.0, y: 5.0, alt: false }, t0);
        assert_eq!(
            g.flush(),
            vec![GestureCommand::Zoom { center: PixelPoint::new(5.0, 5.0), level: 500.0 }]
        );

        g.handle(PointerEvent::DoubleClick { x: 5.0, y: 5.0, alt: true }, t0);
        assert_eq!(
            g.flush(),
            vec![GestureCommand::Zoom { center: PixelPoint::new(5.0, 5.0), level: -500.0 }]
        );
    }

    #[test]
    fn test_opposite_wheel_steps_cancel_out() {
        let t0 = Instant::now();
        let mut g = GestureInterpreter::default();
        g.handle(PointerEvent::Wheel { x: 0.0, y: 0.0, delta_y: 4.0 }, t0);
        g.handle(PointerEvent::Wheel { x: 0.0, y: 0.0, delta_y: -4.0 }, t0 + ms(10));
        assert!(g.poll(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn test_pointer_event_json() {
        let ev: PointerEvent = serde_json::from_str(r#"{"type":"double_click","x":1,"y":2}"#).unwrap();
        assert_eq!(ev, PointerEvent::DoubleClick { x: 1.0, y: 2.0, alt: false });
        let ev: PointerEvent = serde_json::from_str(r#"{"type":"wheel","x":1,"y":2,"delta_y":-100}"#).unwrap();
        assert_eq!(ev, PointerEvent::Wheel { x: 1.0, y: 2.0, delta_y: -100.0 });
    }
}
